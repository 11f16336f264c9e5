//! Interactive waypoint authoring.
//!
//! The editor holds selection and drag state by [`NodeId`] and applies every
//! change through [`WaypointGraph`]'s mutators, so the graph remains the only
//! source of truth for edges.

use std::path::Path;

use log::info;
use pickar_core::Vec3;

use crate::error::Result;
use crate::graph::{NodeId, Waypoint, WaypointGraph};
use crate::storage;

/// Outcome of toggling the edge between two waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Created,
    Removed,
}

/// Authoring state for placing and connecting waypoints.
#[derive(Debug, Clone, Default)]
pub struct WaypointEditor {
    selected: Option<NodeId>,
    dragging: Option<NodeId>,
}

impl WaypointEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The waypoint that new connections start from.
    #[inline]
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// The waypoint currently being dragged.
    #[inline]
    pub fn dragging(&self) -> Option<NodeId> {
        self.dragging
    }

    /// Create a waypoint and select it.
    ///
    /// If another waypoint was selected, the two are connected, so repeated
    /// creation lays down a chain.
    pub fn create_node(&mut self, graph: &mut WaypointGraph, position: Vec3) -> Result<NodeId> {
        let id = graph.add_node(position);
        self.select(graph, id)?;
        Ok(id)
    }

    /// Delete a waypoint and every edge that references it.
    ///
    /// Selection and drag references follow the id reassignment.
    pub fn delete_node(&mut self, graph: &mut WaypointGraph, id: NodeId) -> Result<Waypoint> {
        let removed = graph.remove_node(id)?;
        let remap = |slot: Option<NodeId>| match slot {
            Some(s) if s == id => None,
            Some(s) if s > id => Some(s - 1),
            other => other,
        };
        self.selected = remap(self.selected);
        self.dragging = remap(self.dragging);
        Ok(removed)
    }

    /// Add the undirected edge `a - b` if neither direction exists, remove
    /// both directions otherwise.
    pub fn toggle_connection(
        &mut self,
        graph: &mut WaypointGraph,
        a: NodeId,
        b: NodeId,
    ) -> Result<Connection> {
        let connected = graph.waypoint(a)?.is_adjacent(b) || graph.waypoint(b)?.is_adjacent(a);
        if connected {
            graph.unlink(a, b)?;
            Ok(Connection::Removed)
        } else {
            graph.link(a, b)?;
            Ok(Connection::Created)
        }
    }

    /// Select a waypoint.
    ///
    /// Selecting the selected waypoint clears the selection. Selecting a
    /// different waypoint toggles the connection from the previous one.
    pub fn select(&mut self, graph: &mut WaypointGraph, id: NodeId) -> Result<Option<Connection>> {
        graph.waypoint(id)?;
        self.dragging = None;
        match self.selected {
            Some(prev) if prev == id => {
                self.selected = None;
                Ok(None)
            }
            Some(prev) => {
                let change = self.toggle_connection(graph, prev, id)?;
                self.selected = Some(id);
                Ok(Some(change))
            }
            None => {
                self.selected = Some(id);
                Ok(None)
            }
        }
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Start dragging a waypoint. Dragging drops the selection.
    pub fn begin_drag(&mut self, graph: &WaypointGraph, id: NodeId) -> Result<()> {
        graph.waypoint(id)?;
        self.selected = None;
        self.dragging = Some(id);
        Ok(())
    }

    /// Move the dragged waypoint. Returns whether anything was dragged.
    pub fn drag_to(&mut self, graph: &mut WaypointGraph, position: Vec3) -> Result<bool> {
        match self.dragging {
            Some(id) => {
                graph.move_node(id, position)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn end_drag(&mut self) {
        self.dragging = None;
    }

    /// Clear all authoring state, e.g. when leaving placement mode.
    pub fn reset(&mut self) {
        self.selected = None;
        self.dragging = None;
    }

    /// Undirected edges `(a, b)` with `a < b`, one per connected pair.
    ///
    /// This is the overlay an authoring view draws; it is derived from the
    /// graph on every call.
    pub fn connectors(&self, graph: &WaypointGraph) -> Vec<(NodeId, NodeId)> {
        let mut pairs: Vec<_> = graph
            .edges()
            .map(|(a, b)| if a < b { (a, b) } else { (b, a) })
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        pairs
    }

    /// Persist the graph. See [`storage::save`].
    pub fn save(&self, graph: &WaypointGraph, path: &Path) -> Result<()> {
        storage::save(graph, path)
    }

    /// Replace `graph` with the one stored at `path` and reset authoring
    /// state. See [`storage::load`].
    pub fn load(&mut self, graph: &mut WaypointGraph, path: &Path) -> Result<()> {
        let loaded = storage::load(path)?;
        info!("editor loaded {} waypoints", loaded.len());
        *graph = loaded;
        self.reset();
        Ok(())
    }
}
