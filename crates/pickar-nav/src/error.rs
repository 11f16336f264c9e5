use thiserror::Error;

use crate::graph::NodeId;

pub type Result<T> = std::result::Result<T, NavError>;

/// Errors raised by graph queries, mutators and waypoint storage.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("waypoint {id} does not exist (graph has {len} waypoints)")]
    InvalidNode { id: NodeId, len: usize },

    #[error("waypoint {0} cannot be connected to itself")]
    SelfLoop(NodeId),

    #[error("waypoint record {referenced_by} references unknown index {index}")]
    UnknownIndex { index: usize, referenced_by: usize },

    #[error("waypoint index {0} appears more than once")]
    DuplicateIndex(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
