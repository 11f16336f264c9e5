use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, warn};
use pickar_core::Vec3;

use crate::error::{NavError, Result};

/// Dense waypoint index in `[0, len)`.
///
/// Ids are reassigned whenever a waypoint is removed, so they are only valid
/// for the graph snapshot they were obtained from.
pub type NodeId = usize;

/// Distance reported for unreachable waypoint pairs.
pub const NO_PATH: f32 = f32::INFINITY;

// ---------------------------------------------------------------------------
// Waypoint
// ---------------------------------------------------------------------------

/// A junction point in the navigable area.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub(crate) position: Vec3,
    pub(crate) adjacent: BTreeSet<NodeId>,
}

impl Waypoint {
    /// A waypoint with no outgoing edges.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            adjacent: BTreeSet::new(),
        }
    }

    /// A waypoint with the given outgoing edges.
    pub fn with_adjacent(position: Vec3, adjacent: impl IntoIterator<Item = NodeId>) -> Self {
        Self {
            position,
            adjacent: adjacent.into_iter().collect(),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Outgoing neighbours in ascending id order.
    pub fn adjacent(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacent.iter().copied()
    }

    #[inline]
    pub fn is_adjacent(&self, id: NodeId) -> bool {
        self.adjacent.contains(&id)
    }

    /// Distance from this waypoint to an arbitrary position.
    #[inline]
    pub fn distance_to(&self, position: Vec3) -> f32 {
        self.position.distance(position)
    }
}

// ---------------------------------------------------------------------------
// PathTable
// ---------------------------------------------------------------------------

/// All-pairs shortest-path tables for one graph snapshot.
///
/// Both tables are flat row-major `n * n` buffers. `dist[i][i]` is 0 and
/// unreachable pairs hold [`NO_PATH`]. `next[i][j]` defaults to `j` even
/// when `j` is unreachable from `i`; "no path" is only ever signalled by the
/// distance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathTable {
    n: usize,
    dist: Vec<f32>,
    next: Vec<NodeId>,
}

impl PathTable {
    /// Run Floyd-Warshall over `nodes`.
    ///
    /// Edge weights are seeded from each node's own adjacency only, so a
    /// one-directional edge yields a one-directional distance.
    pub fn compute(nodes: &[Waypoint]) -> Self {
        let n = nodes.len();
        let mut dist = vec![NO_PATH; n * n];
        let mut next = vec![0; n * n];

        for i in 0..n {
            let row = i * n;
            for j in 0..n {
                next[row + j] = j;
            }
            dist[row + i] = 0.0;
        }

        for (i, node) in nodes.iter().enumerate() {
            for &j in &node.adjacent {
                if j < n {
                    dist[i * n + j] = node.position.distance(nodes[j].position);
                }
            }
        }

        for k in 0..n {
            for i in 0..n {
                let d_ik = dist[i * n + k];
                if d_ik == NO_PATH {
                    continue;
                }
                for j in 0..n {
                    let through = d_ik + dist[k * n + j];
                    if through < dist[i * n + j] {
                        dist[i * n + j] = through;
                        next[i * n + j] = next[i * n + k];
                    }
                }
            }
        }

        Self { n, dist, next }
    }

    /// Number of waypoints the tables were computed for.
    #[inline]
    pub fn len(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    fn idx(&self, i: NodeId, j: NodeId) -> Option<usize> {
        (i < self.n && j < self.n).then(|| i * self.n + j)
    }

    /// Shortest path cost from `i` to `j`, or `None` for out-of-range ids.
    #[inline]
    pub fn distance(&self, i: NodeId, j: NodeId) -> Option<f32> {
        self.idx(i, j).map(|ix| self.dist[ix])
    }

    /// Next hop on the shortest path from `i` to `j`.
    ///
    /// This is `j` itself for unreachable pairs; check [`distance`](Self::distance).
    #[inline]
    pub fn next_hop(&self, i: NodeId, j: NodeId) -> Option<NodeId> {
        self.idx(i, j).map(|ix| self.next[ix])
    }

    /// Reconstruct the node sequence from `start` to `end`, both included.
    ///
    /// Returns an empty vector when `end` is unreachable or either id is out
    /// of range.
    pub fn path(&self, start: NodeId, end: NodeId) -> Vec<NodeId> {
        match self.distance(start, end) {
            Some(d) if d != NO_PATH => {}
            _ => return Vec::new(),
        }
        let mut path = vec![start];
        let mut current = start;
        while current != end {
            current = self.next[current * self.n + end];
            path.push(current);
            if path.len() > self.n {
                // Only reachable through a corrupted table.
                return Vec::new();
            }
        }
        path
    }
}

// ---------------------------------------------------------------------------
// WaypointGraph
// ---------------------------------------------------------------------------

/// The navigable graph of a warehouse floor plus its shortest-path index.
///
/// Every structural mutator recomputes the tables before returning, so
/// queries always see a complete index. The tables are published as a fresh
/// [`Arc<PathTable>`]; a [`snapshot`](Self::snapshot) taken earlier keeps
/// observing the old graph.
#[derive(Debug, Clone, Default)]
pub struct WaypointGraph {
    nodes: Vec<Waypoint>,
    table: Arc<PathTable>,
    check_two_way: bool,
}

impl WaypointGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from positions and undirected edges.
    ///
    /// Waypoint `i` is `positions[i]`. Each `(a, b)` pair is recorded on
    /// both endpoints.
    pub fn build(positions: &[Vec3], edges: &[(NodeId, NodeId)]) -> Result<Self> {
        let mut nodes: Vec<Waypoint> = positions.iter().copied().map(Waypoint::new).collect();
        let len = nodes.len();
        for &(a, b) in edges {
            for id in [a, b] {
                if id >= len {
                    return Err(NavError::InvalidNode { id, len });
                }
            }
            if a == b {
                return Err(NavError::SelfLoop(a));
            }
            nodes[a].adjacent.insert(b);
            nodes[b].adjacent.insert(a);
        }
        let mut graph = Self {
            nodes,
            ..Self::default()
        };
        graph.recompute();
        Ok(graph)
    }

    /// Build a graph from waypoints carrying their own (possibly one-way)
    /// adjacency, as loaded from storage.
    pub fn from_waypoints(nodes: Vec<Waypoint>) -> Result<Self> {
        let len = nodes.len();
        for node in &nodes {
            if let Some(&id) = node.adjacent.iter().find(|&&id| id >= len) {
                return Err(NavError::InvalidNode { id, len });
            }
        }
        let mut graph = Self {
            nodes,
            ..Self::default()
        };
        graph.recompute();
        Ok(graph)
    }

    /// Enable or disable the two-way edge check run on every recompute.
    pub fn with_two_way_check(mut self, check: bool) -> Self {
        self.set_check_two_way(check);
        self
    }

    /// Enable or disable the two-way edge check, rerunning it if enabled.
    pub fn set_check_two_way(&mut self, check: bool) {
        self.check_two_way = check;
        if check {
            self.warn_one_way_edges();
        }
    }

    /// Rebuild the shortest-path tables from the current node set.
    pub fn recompute(&mut self) {
        if self.check_two_way {
            self.warn_one_way_edges();
        }
        self.table = Arc::new(PathTable::compute(&self.nodes));
        debug!(
            "recomputed shortest paths for {} waypoints ({} edges)",
            self.nodes.len(),
            self.edge_count()
        );
    }

    fn warn_one_way_edges(&self) {
        for (a, b) in self.one_way_edges() {
            warn!("missing edge between waypoint {b} and waypoint {a}");
        }
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    /// Append a new unconnected waypoint and return its id.
    pub fn add_node(&mut self, position: Vec3) -> NodeId {
        self.nodes.push(Waypoint::new(position));
        self.recompute();
        self.nodes.len() - 1
    }

    /// Remove a waypoint and every edge that references it.
    ///
    /// Waypoints after `id` shift down by one. The returned waypoint's
    /// adjacency still uses the ids from before the removal.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Waypoint> {
        self.check(id)?;
        let removed = self.nodes.remove(id);
        for node in &mut self.nodes {
            node.adjacent = node
                .adjacent
                .iter()
                .filter(|&&other| other != id)
                .map(|&other| if other > id { other - 1 } else { other })
                .collect();
        }
        self.recompute();
        Ok(removed)
    }

    /// Add the one-directional edge `a -> b`.
    ///
    /// Returns whether the edge was new.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        self.check_pair(a, b)?;
        let added = self.nodes[a].adjacent.insert(b);
        if added {
            self.recompute();
        }
        Ok(added)
    }

    /// Remove the one-directional edge `a -> b`.
    ///
    /// Returns whether the edge existed.
    pub fn disconnect(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        self.check(a)?;
        self.check(b)?;
        let removed = self.nodes[a].adjacent.remove(&b);
        if removed {
            self.recompute();
        }
        Ok(removed)
    }

    /// Add the edge in both directions with a single recompute.
    ///
    /// Returns whether either direction was new.
    pub fn link(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        self.check_pair(a, b)?;
        let ab = self.nodes[a].adjacent.insert(b);
        let ba = self.nodes[b].adjacent.insert(a);
        if ab || ba {
            self.recompute();
        }
        Ok(ab || ba)
    }

    /// Remove the edge in both directions with a single recompute.
    ///
    /// Returns whether either direction existed.
    pub fn unlink(&mut self, a: NodeId, b: NodeId) -> Result<bool> {
        self.check(a)?;
        self.check(b)?;
        let ab = self.nodes[a].adjacent.remove(&b);
        let ba = self.nodes[b].adjacent.remove(&a);
        if ab || ba {
            self.recompute();
        }
        Ok(ab || ba)
    }

    /// Move a waypoint. Edge weights change, so the tables are rebuilt.
    pub fn move_node(&mut self, id: NodeId, position: Vec3) -> Result<()> {
        self.check(id)?;
        self.nodes[id].position = position;
        self.recompute();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All waypoints in id order.
    #[inline]
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.nodes
    }

    pub fn waypoint(&self, id: NodeId) -> Result<&Waypoint> {
        self.check(id)?;
        Ok(&self.nodes[id])
    }

    pub fn position(&self, id: NodeId) -> Result<Vec3> {
        self.waypoint(id).map(Waypoint::position)
    }

    /// Every directed edge `(from, to)` in ascending order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .flat_map(|(a, node)| node.adjacent().map(move |b| (a, b)))
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.adjacent.len()).sum()
    }

    /// Directed edges `a -> b` with no matching `b -> a`.
    pub fn one_way_edges(&self) -> Vec<(NodeId, NodeId)> {
        self.edges()
            .filter(|&(a, b)| !self.nodes[b].is_adjacent(a))
            .collect()
    }

    /// Length of the direct edge `a -> b`, if there is one.
    pub fn edge_weight(&self, a: NodeId, b: NodeId) -> Result<Option<f32>> {
        self.check(a)?;
        self.check(b)?;
        let node = &self.nodes[a];
        Ok(node
            .is_adjacent(b)
            .then(|| node.position.distance(self.nodes[b].position)))
    }

    /// Shortest path cost, [`NO_PATH`] if unreachable.
    pub fn distance(&self, a: NodeId, b: NodeId) -> Result<f32> {
        self.table
            .distance(a, b)
            .ok_or_else(|| self.invalid_pair(a, b))
    }

    /// Next hop from `a` towards `b`. Defaults to `b` for unreachable pairs.
    pub fn next_hop(&self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.table
            .next_hop(a, b)
            .ok_or_else(|| self.invalid_pair(a, b))
    }

    /// Node sequence of the shortest path from `start` to `end`, both
    /// included. Empty if `end` is unreachable.
    pub fn shortest_path(&self, start: NodeId, end: NodeId) -> Result<Vec<NodeId>> {
        self.check(start)?;
        self.check(end)?;
        Ok(self.table.path(start, end))
    }

    /// The current shortest-path tables.
    #[inline]
    pub fn table(&self) -> &PathTable {
        &self.table
    }

    /// A shared handle to the current tables, unaffected by later edits.
    #[inline]
    pub fn snapshot(&self) -> Arc<PathTable> {
        Arc::clone(&self.table)
    }

    // -----------------------------------------------------------------------
    // Id validation
    // -----------------------------------------------------------------------

    #[inline]
    fn check(&self, id: NodeId) -> Result<()> {
        if id < self.nodes.len() {
            Ok(())
        } else {
            Err(NavError::InvalidNode {
                id,
                len: self.nodes.len(),
            })
        }
    }

    fn check_pair(&self, a: NodeId, b: NodeId) -> Result<()> {
        self.check(a)?;
        self.check(b)?;
        if a == b {
            return Err(NavError::SelfLoop(a));
        }
        Ok(())
    }

    fn invalid_pair(&self, a: NodeId, b: NodeId) -> NavError {
        let id = if a >= self.nodes.len() { a } else { b };
        NavError::InvalidNode {
            id,
            len: self.nodes.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn v(x: f32, z: f32) -> Vec3 {
        Vec3::new(x, 0.0, z)
    }

    /// A(0) -- B(10) -- C(20) on a line, plus D far away with no edges.
    fn chain_with_island() -> WaypointGraph {
        WaypointGraph::build(
            &[v(0.0, 0.0), v(10.0, 0.0), v(20.0, 0.0), v(50.0, 50.0)],
            &[(0, 1), (1, 2)],
        )
        .unwrap()
    }

    /// A 3x3 lattice with 5 m spacing and a diagonal shortcut 0-8.
    fn lattice() -> WaypointGraph {
        let mut positions = Vec::new();
        for row in 0..3 {
            for col in 0..3 {
                positions.push(v(col as f32 * 5.0, row as f32 * 5.0));
            }
        }
        let mut edges = Vec::new();
        for row in 0..3 {
            for col in 0..3 {
                let id = row * 3 + col;
                if col < 2 {
                    edges.push((id, id + 1));
                }
                if row < 2 {
                    edges.push((id, id + 3));
                }
            }
        }
        edges.push((0, 8));
        WaypointGraph::build(&positions, &edges).unwrap()
    }

    #[test]
    fn linear_chain() {
        let g = chain_with_island();
        assert!((g.distance(0, 2).unwrap() - 20.0).abs() < EPS);
        assert_eq!(g.shortest_path(0, 2).unwrap(), vec![0, 1, 2]);
        assert_eq!(g.shortest_path(2, 0).unwrap(), vec![2, 1, 0]);
    }

    #[test]
    fn disconnected_node_is_unreachable() {
        let g = chain_with_island();
        assert_eq!(g.distance(0, 3).unwrap(), NO_PATH);
        assert!(g.shortest_path(0, 3).unwrap().is_empty());
        // The next-hop table keeps its direct default for unreachable pairs.
        assert_eq!(g.next_hop(0, 3).unwrap(), 3);
    }

    #[test]
    fn self_distance_is_zero() {
        let g = lattice();
        for i in 0..g.len() {
            assert_eq!(g.distance(i, i).unwrap(), 0.0);
            assert_eq!(g.shortest_path(i, i).unwrap(), vec![i]);
        }
    }

    #[test]
    fn triangle_inequality_holds() {
        let g = lattice();
        let n = g.len();
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let direct = g.distance(i, j).unwrap();
                    let via = g.distance(i, k).unwrap() + g.distance(k, j).unwrap();
                    assert!(direct <= via + EPS, "{i}->{j} via {k}");
                }
            }
        }
    }

    #[test]
    fn path_weights_sum_to_distance() {
        let g = lattice();
        let n = g.len();
        for i in 0..n {
            for j in 0..n {
                let path = g.shortest_path(i, j).unwrap();
                let total: f32 = path
                    .windows(2)
                    .map(|w| g.edge_weight(w[0], w[1]).unwrap().unwrap())
                    .sum();
                assert!((total - g.distance(i, j).unwrap()).abs() < EPS);
            }
        }
    }

    #[test]
    fn diagonal_shortcut_is_taken() {
        let g = lattice();
        assert_eq!(g.shortest_path(0, 8).unwrap(), vec![0, 8]);
        let diag = (200.0f32).sqrt();
        assert!((g.distance(0, 8).unwrap() - diag).abs() < EPS);
    }

    #[test]
    fn linked_graph_is_symmetric() {
        let g = lattice();
        for i in 0..g.len() {
            for j in 0..g.len() {
                assert_eq!(g.distance(i, j).unwrap(), g.distance(j, i).unwrap());
            }
        }
        assert!(g.one_way_edges().is_empty());
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut g = lattice();
        let before = g.table().clone();
        g.recompute();
        assert_eq!(*g.table(), before);
        g.recompute();
        assert_eq!(*g.table(), before);
    }

    #[test]
    fn one_way_edge_gives_one_way_distance() {
        let mut g = WaypointGraph::build(&[v(0.0, 0.0), v(3.0, 4.0)], &[]).unwrap();
        assert!(g.connect(0, 1).unwrap());
        assert!(!g.connect(0, 1).unwrap());
        assert!((g.distance(0, 1).unwrap() - 5.0).abs() < EPS);
        assert_eq!(g.distance(1, 0).unwrap(), NO_PATH);
        assert_eq!(g.one_way_edges(), vec![(0, 1)]);

        assert!(g.disconnect(0, 1).unwrap());
        assert_eq!(g.distance(0, 1).unwrap(), NO_PATH);
    }

    #[test]
    fn remove_node_reindexes_and_drops_edges() {
        let mut g = chain_with_island();
        let removed = g.remove_node(1).unwrap();
        assert_eq!(removed.position(), v(10.0, 0.0));
        assert_eq!(g.len(), 3);
        // C moved from id 2 to id 1, D from 3 to 2.
        assert_eq!(g.position(1).unwrap(), v(20.0, 0.0));
        assert_eq!(g.position(2).unwrap(), v(50.0, 50.0));
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.distance(0, 1).unwrap(), NO_PATH);
    }

    #[test]
    fn remove_node_shifts_surviving_adjacency() {
        let mut g = lattice();
        g.remove_node(4).unwrap();
        // Old node 5 (now 4) was linked to old 2 and old 8 (now 7).
        let adj: Vec<_> = g.waypoint(4).unwrap().adjacent().collect();
        assert_eq!(adj, vec![2, 7]);
        assert!(g.one_way_edges().is_empty());
    }

    #[test]
    fn add_and_link_nodes() {
        let mut g = WaypointGraph::new();
        let a = g.add_node(v(0.0, 0.0));
        let b = g.add_node(v(0.0, 6.0));
        assert_eq!(g.distance(a, b).unwrap(), NO_PATH);
        assert!(g.link(a, b).unwrap());
        assert!((g.distance(b, a).unwrap() - 6.0).abs() < EPS);
        assert!(g.unlink(a, b).unwrap());
        assert!(!g.unlink(a, b).unwrap());
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn move_node_updates_weights() {
        let mut g = chain_with_island();
        g.move_node(2, v(30.0, 0.0)).unwrap();
        assert!((g.distance(0, 2).unwrap() - 30.0).abs() < EPS);
    }

    #[test]
    fn invalid_ids_are_rejected() {
        let mut g = chain_with_island();
        assert!(matches!(
            g.distance(0, 9),
            Err(NavError::InvalidNode { id: 9, len: 4 })
        ));
        assert!(matches!(
            g.shortest_path(7, 0),
            Err(NavError::InvalidNode { id: 7, .. })
        ));
        assert!(matches!(g.connect(0, 0), Err(NavError::SelfLoop(0))));
        assert!(g.remove_node(4).is_err());
        assert!(WaypointGraph::build(&[v(0.0, 0.0)], &[(0, 1)]).is_err());
        assert!(
            WaypointGraph::from_waypoints(vec![Waypoint::with_adjacent(v(0.0, 0.0), [3])])
                .is_err()
        );
    }

    #[test]
    fn snapshot_is_not_affected_by_edits() {
        let mut g = chain_with_island();
        let snap = g.snapshot();
        g.link(2, 3).unwrap();
        assert_eq!(snap.distance(0, 3), Some(NO_PATH));
        assert!(g.distance(0, 3).unwrap().is_finite());
        assert_eq!(snap.len(), 4);
    }

    #[test]
    fn empty_graph_tables() {
        let g = WaypointGraph::new();
        assert!(g.table().is_empty());
        assert_eq!(g.table().distance(0, 0), None);
        assert!(g.table().path(0, 0).is_empty());
    }
}
