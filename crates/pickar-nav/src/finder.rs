use pickar_core::Vec3;
use serde::{Deserialize, Serialize};

use crate::graph::{NO_PATH, NodeId, WaypointGraph};

/// Tuning for the user-facing direction hints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Turn (in degrees) between walking to the nearest waypoint and leaving
    /// it along the route above which the nearest waypoint is skipped.
    pub angle_threshold_deg: f32,
    /// Heading error (in degrees) above which a turn cue is shown.
    pub turn_cue_threshold_deg: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            angle_threshold_deg: 115.0,
            turn_cue_threshold_deg: 45.0,
        }
    }
}

/// Direction hint for a user facing the wrong way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnCue {
    /// Heading is within the threshold.
    None,
    Left,
    Right,
    /// The steering point is roughly behind the user.
    Reverse,
}

/// Point-to-point routing over a [`WaypointGraph`].
///
/// Users and items are rarely standing on a waypoint, so every query first
/// snaps its endpoints to the nearest waypoint. A `PathFinder` is a cheap
/// view: build one per tick from the current graph.
#[derive(Debug, Clone, Copy)]
pub struct PathFinder<'g> {
    graph: &'g WaypointGraph,
    config: SteeringConfig,
}

impl<'g> PathFinder<'g> {
    pub fn new(graph: &'g WaypointGraph, config: SteeringConfig) -> Self {
        Self { graph, config }
    }

    #[inline]
    pub fn graph(&self) -> &'g WaypointGraph {
        self.graph
    }

    #[inline]
    pub fn config(&self) -> SteeringConfig {
        self.config
    }

    /// The waypoint closest to `point`, or `None` on an empty graph.
    ///
    /// Ties resolve to the lowest id.
    pub fn nearest_node(&self, point: Vec3) -> Option<NodeId> {
        let mut best: Option<(NodeId, f32)> = None;
        for (id, waypoint) in self.graph.waypoints().iter().enumerate() {
            let d = waypoint.distance_to(point);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((id, d));
            }
        }
        best.map(|(id, _)| id)
    }

    fn snap(&self, from: Vec3, to: Vec3) -> Option<(NodeId, NodeId)> {
        Some((self.nearest_node(from)?, self.nearest_node(to)?))
    }

    /// Walking distance from `from` to `to` through the graph.
    ///
    /// When both points snap to the same waypoint the straight-line distance
    /// is returned. Unreachable pairs give [`NO_PATH`]; an empty graph gives
    /// `None`.
    pub fn path_distance(&self, from: Vec3, to: Vec3) -> Option<f32> {
        let (start, end) = self.snap(from, to)?;
        if start == end {
            return Some(from.distance(to));
        }
        let table = self.graph.table();
        let graph_dist = table.distance(start, end).unwrap_or(NO_PATH);
        if graph_dist == NO_PATH {
            return Some(NO_PATH);
        }
        let waypoints = self.graph.waypoints();
        Some(
            waypoints[start].distance_to(from) + graph_dist + waypoints[end].distance_to(to),
        )
    }

    /// Polyline from `from` to `to`: `from`, the waypoints along the route,
    /// then `to`.
    ///
    /// Same-waypoint queries give `[from, to]`. Unreachable pairs give an
    /// empty vector and an empty graph gives `None`.
    pub fn render_path(&self, from: Vec3, to: Vec3) -> Option<Vec<Vec3>> {
        let (start, end) = self.snap(from, to)?;
        if start == end {
            return Some(vec![from, to]);
        }
        let nodes = self.graph.table().path(start, end);
        if nodes.is_empty() {
            return Some(Vec::new());
        }
        let waypoints = self.graph.waypoints();
        let mut points = Vec::with_capacity(nodes.len() + 2);
        points.push(from);
        points.extend(nodes.iter().map(|&id| waypoints[id].position()));
        points.push(to);
        Some(points)
    }

    /// The first point the user should walk towards on the way to `to`.
    ///
    /// Normally the nearest waypoint. If reaching it means turning back by
    /// more than the configured angle relative to the route's next leg, the
    /// following point is used instead. Angles are measured on the floor
    /// plane.
    pub fn next_steering_point(&self, from: Vec3, to: Vec3) -> Option<Vec3> {
        let points = self.render_path(from, to)?;
        match points.len() {
            0 | 1 => None,
            2 => Some(points[1]),
            _ => {
                let approach = (points[1] - points[0]).flat();
                let leave = (points[2] - points[1]).flat();
                if approach.length() <= f32::EPSILON
                    || approach.angle_deg(leave) > self.config.angle_threshold_deg
                {
                    Some(points[2])
                } else {
                    Some(points[1])
                }
            }
        }
    }

    /// Classify the heading error between `facing` and the direction from
    /// `user` to `steering`.
    pub fn turn_cue(&self, facing: Vec3, user: Vec3, steering: Vec3) -> TurnCue {
        let angle = facing.signed_yaw_deg(steering - user);
        let abs = angle.abs();
        let threshold = self.config.turn_cue_threshold_deg;
        if abs <= threshold {
            TurnCue::None
        } else if abs > 180.0 - (180.0 - threshold) / 3.0 {
            TurnCue::Reverse
        } else if angle > 0.0 {
            TurnCue::Left
        } else {
            TurnCue::Right
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

    /// A(0,0) - B(10,0) - C(20,0), island D(0,40).
    fn chain() -> WaypointGraph {
        WaypointGraph::build(
            &[v(0.0, 0.0), v(10.0, 0.0), v(20.0, 0.0), v(0.0, 40.0)],
            &[(0, 1), (1, 2)],
        )
        .unwrap()
    }

    fn finder(g: &WaypointGraph) -> PathFinder<'_> {
        PathFinder::new(g, SteeringConfig::default())
    }

    #[test]
    fn nearest_node_scans_all_waypoints() {
        let g = chain();
        let f = finder(&g);
        assert_eq!(f.nearest_node(v(1.0, 1.0)), Some(0));
        assert_eq!(f.nearest_node(v(14.0, -2.0)), Some(1));
        assert_eq!(f.nearest_node(v(2.0, 35.0)), Some(3));
    }

    #[test]
    fn nearest_node_tie_is_stable() {
        let g = WaypointGraph::build(&[v(-5.0, 0.0), v(5.0, 0.0)], &[(0, 1)]).unwrap();
        let f = finder(&g);
        for _ in 0..10 {
            assert_eq!(f.nearest_node(v(0.0, 0.0)), Some(0));
        }
    }

    #[test]
    fn empty_graph_has_no_results() {
        let g = WaypointGraph::new();
        let f = finder(&g);
        assert_eq!(f.nearest_node(v(0.0, 0.0)), None);
        assert_eq!(f.path_distance(v(0.0, 0.0), v(1.0, 0.0)), None);
        assert_eq!(f.render_path(v(0.0, 0.0), v(1.0, 0.0)), None);
        assert_eq!(f.next_steering_point(v(0.0, 0.0), v(1.0, 0.0)), None);
    }

    #[test]
    fn same_waypoint_uses_straight_line() {
        let g = chain();
        let f = finder(&g);
        let a = v(1.0, 1.0);
        let b = v(2.0, -2.0);
        let d = f.path_distance(a, b).unwrap();
        assert!((d - a.distance(b)).abs() < EPS);
        assert_eq!(f.render_path(a, b).unwrap(), vec![a, b]);
        assert_eq!(f.next_steering_point(a, b), Some(b));
    }

    #[test]
    fn path_distance_goes_through_graph() {
        let g = chain();
        let f = finder(&g);
        // 3 to reach A, 20 along the chain, 4 from C to the target.
        let d = f.path_distance(v(0.0, 3.0), v(20.0, -4.0)).unwrap();
        assert!((d - 27.0).abs() < EPS);
    }

    #[test]
    fn render_path_lists_route_waypoints() {
        let g = chain();
        let f = finder(&g);
        let from = v(0.0, 3.0);
        let to = v(20.0, -4.0);
        let path = f.render_path(from, to).unwrap();
        assert_eq!(path, vec![from, v(0.0, 0.0), v(10.0, 0.0), v(20.0, 0.0), to]);
    }

    #[test]
    fn unreachable_target() {
        let g = chain();
        let f = finder(&g);
        let from = v(0.0, 1.0);
        let to = v(0.0, 39.0);
        assert_eq!(f.path_distance(from, to), Some(NO_PATH));
        assert!(f.render_path(from, to).unwrap().is_empty());
        assert_eq!(f.next_steering_point(from, to), None);
    }

    #[test]
    fn steering_heads_for_nearest_waypoint_when_on_the_way() {
        let g = chain();
        let f = finder(&g);
        // Nearest is B, which lies ahead of the user on the way to C.
        assert_eq!(f.next_steering_point(v(8.0, 0.5), v(21.0, 0.0)), Some(v(10.0, 0.0)));
    }

    #[test]
    fn steering_skips_waypoint_behind_the_user() {
        let g = chain();
        let f = finder(&g);
        // Nearest is B but the user has already passed it heading to C.
        assert_eq!(f.next_steering_point(v(11.0, 0.0), v(21.0, 0.0)), Some(v(20.0, 0.0)));
        // Standing on B also moves on to the next point.
        assert_eq!(f.next_steering_point(v(10.0, 0.0), v(21.0, 0.0)), Some(v(20.0, 0.0)));
    }

    #[test]
    fn steering_ignores_height() {
        let g = chain();
        let f = finder(&g);
        let head = Vec3::new(8.0, 1.7, 0.0);
        assert_eq!(f.next_steering_point(head, v(21.0, 0.0)), Some(v(10.0, 0.0)));
    }

    #[test]
    fn turn_cues() {
        let g = chain();
        let f = finder(&g);
        let east = v(1.0, 0.0);
        let user = v(0.0, 0.0);
        assert_eq!(f.turn_cue(east, user, v(10.0, 1.0)), TurnCue::None);
        assert_eq!(f.turn_cue(east, user, v(0.0, 10.0)), TurnCue::Left);
        assert_eq!(f.turn_cue(east, user, v(0.0, -10.0)), TurnCue::Right);
        assert_eq!(f.turn_cue(east, user, v(-10.0, 1.0)), TurnCue::Reverse);
    }
}
