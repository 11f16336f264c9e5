//! Waypoint navigation for warehouse order picking.
//!
//! The navigable floor is a graph of [`Waypoint`]s. [`WaypointGraph`] keeps
//! a dense all-pairs shortest-path index (Floyd-Warshall) that is rebuilt in
//! full after every structural edit, which is cheap at warehouse scale (tens
//! to low hundreds of waypoints).
//!
//! - **Graph** construction, edits and node-to-node queries ([`WaypointGraph`], [`PathTable`])
//! - **Routing** between arbitrary points ([`PathFinder`])
//! - **Authoring** selection/connection flow ([`WaypointEditor`])
//! - **Storage** as JSON records ([`storage`])
//!
//! Unreachable pairs are not errors: they report [`NO_PATH`] and empty
//! paths. Queries against an empty graph return `None`.

mod editor;
mod error;
mod finder;
mod graph;
pub mod storage;

pub use editor::{Connection, WaypointEditor};
pub use error::{NavError, Result};
pub use finder::{PathFinder, SteeringConfig, TurnCue};
pub use graph::{NO_PATH, NodeId, PathTable, Waypoint, WaypointGraph};
pub use storage::{WaypointFile, WaypointRecord};
