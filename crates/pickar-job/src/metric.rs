use pickar_core::Vec3;
use pickar_nav::PathFinder;

/// Walking distance between two points, used to rank job targets.
pub trait PathMetric {
    /// Cost of walking from `from` to `to`. Unreachable is `f32::INFINITY`.
    fn walking_distance(&self, from: Vec3, to: Vec3) -> f32;
}

/// Routes through the waypoint graph. Without any waypoints the user is
/// assumed to walk straight.
impl PathMetric for PathFinder<'_> {
    fn walking_distance(&self, from: Vec3, to: Vec3) -> f32 {
        self.path_distance(from, to)
            .unwrap_or_else(|| from.distance(to))
    }
}

/// Straight-line distance, ignoring the floor layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLine;

impl PathMetric for StraightLine {
    fn walking_distance(&self, from: Vec3, to: Vec3) -> f32 {
        from.distance(to)
    }
}
