//! Order-picking job tracking.
//!
//! A job is a set of [`Item`]s to collect. [`JobTracker`] routes the picker
//! to whichever remaining item is closest by walking distance, counts
//! collected items, sends the picker back to where the job started and
//! restarts a default job after a delay.
//!
//! Walking distance is abstracted by [`PathMetric`], implemented for
//! [`pickar_nav::PathFinder`] and for plain [`StraightLine`] distance.

mod error;
mod item;
mod joblog;
mod metric;
pub mod schedule;
mod tracker;

pub use error::{JobError, Result};
pub use item::{AisleEntry, Inventory, Item, ItemId, Shelf};
pub use joblog::{JobLog, JobReport, LoggedItem};
pub use metric::{PathMetric, StraightLine};
pub use tracker::{JobConfig, JobEvent, JobState, JobTracker};
