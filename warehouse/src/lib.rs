//! Warehouse order-picking simulation.
//!
//! Wires the waypoint graph, path finder and job tracker into a tick-driven
//! [`Session`], and drives it with a simulated [`Walker`].

pub mod config;
pub mod error;
pub mod layout;
pub mod report;
pub mod session;
pub mod walker;

pub use config::SimConfig;
pub use error::{AppError, Result};
pub use session::{Mode, Session, SimMsg};
pub use walker::{Walker, drive};
