//! Simulated picker.

use log::{debug, trace};
use pickar_core::Vec3;
use pickar_job::{JobEvent, JobReport};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimConfig;
use crate::error::Result;
use crate::session::{Session, SimMsg};

/// A picker that walks towards the session's steering point at constant
/// speed, with some tracking noise.
#[derive(Debug, Clone)]
pub struct Walker {
    position: Vec3,
    facing: Vec3,
    speed: f32,
    jitter: f32,
    pick_radius: f32,
    rng: StdRng,
}

impl Walker {
    pub fn new(start: Vec3, config: &SimConfig) -> Self {
        Self {
            position: start.flat(),
            facing: Vec3::new(0.0, 0.0, 1.0),
            speed: config.walk_speed.max(0.0),
            jitter: config.jitter.abs(),
            pick_radius: config.pick_radius,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn facing(&self) -> Vec3 {
        self.facing
    }

    /// Walk for `dt` seconds towards `steering`, staying on the floor.
    pub fn step(&mut self, steering: Option<Vec3>, dt: f32) {
        if let Some(target) = steering {
            let next = self.position.move_towards(target.flat(), self.speed * dt);
            let moved = next - self.position;
            if moved.length() > f32::EPSILON {
                self.facing = moved.normalized();
            }
            self.position = next;
        }
        if self.jitter > 0.0 {
            let dx = self.rng.random_range(-self.jitter..=self.jitter);
            let dz = self.rng.random_range(-self.jitter..=self.jitter);
            self.position += Vec3::new(dx, 0.0, dz);
        }
    }

    /// Whether `point` is within picking reach, measured on the floor.
    pub fn can_reach(&self, point: Vec3) -> bool {
        (point - self.position).flat().length() <= self.pick_radius
    }
}

/// Run `session` with `walker` until `jobs` jobs have completed or
/// `max_ticks` ticks have passed. Returns the finished jobs' reports.
///
/// The walker picks its current target as soon as it is within reach.
pub fn drive(
    session: &mut Session,
    walker: &mut Walker,
    jobs: usize,
    max_ticks: u64,
) -> Result<Vec<JobReport>> {
    let dt = session.config().tick().as_secs_f32();
    let mut reports = Vec::new();
    for tick in 0..max_ticks {
        walker.step(session.steering_point(), dt);
        let mut events = session.update(SimMsg::Tick {
            user: walker.position(),
            facing: walker.facing(),
        })?;
        trace!("tick {tick}: user {} cue {:?}", walker.position(), session.turn_cue());

        let reachable = session
            .current_target()
            .filter(|item| walker.can_reach(item.position))
            .map(|item| item.id);
        if let Some(id) = reachable {
            events.extend(session.update(SimMsg::Select(id))?);
        }

        for event in events {
            match event {
                JobEvent::Collected { item, remaining } => {
                    debug!("picked {item} at tick {tick}, {remaining} left");
                }
                JobEvent::Completed(report) => reports.push(report),
                _ => {}
            }
        }
        if reports.len() >= jobs {
            break;
        }
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout;
    use pickar_job::JobState;

    #[test]
    fn step_moves_at_walking_speed() {
        let config = SimConfig {
            jitter: 0.0,
            walk_speed: 2.0,
            ..SimConfig::default()
        };
        let mut w = Walker::new(Vec3::ZERO, &config);
        w.step(Some(Vec3::new(0.0, 3.0, 10.0)), 0.5);
        assert_eq!(w.position(), Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(w.facing(), Vec3::new(0.0, 0.0, 1.0));
        w.step(None, 0.5);
        assert_eq!(w.position(), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn jitter_is_bounded_and_seeded() {
        let config = SimConfig {
            jitter: 0.1,
            ..SimConfig::default()
        };
        let mut a = Walker::new(Vec3::ZERO, &config);
        let mut b = Walker::new(Vec3::ZERO, &config);
        for _ in 0..10 {
            a.step(None, 0.1);
            b.step(None, 0.1);
        }
        assert_eq!(a.position(), b.position());
        assert!(a.position().length() <= 10.0 * 0.1 * 2.0_f32.sqrt() + 1e-4);
        assert_eq!(a.position().y, 0.0);
    }

    #[test]
    fn reach_ignores_shelf_height() {
        let w = Walker::new(Vec3::ZERO, &SimConfig::default());
        assert!(w.can_reach(Vec3::new(1.0, 2.0, 0.0)));
        assert!(!w.can_reach(Vec3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn walker_completes_the_demo_job() {
        let config = SimConfig::default();
        let mut session = Session::open(config.clone()).unwrap();
        let mut walker = Walker::new(layout::START, &config);
        session.start(walker.position()).unwrap();

        let reports = drive(&mut session, &mut walker, 1, 20_000).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].items.len(), 6);
        assert_eq!(session.state(), JobState::Completed);
        assert_eq!(session.progress(), 1.0);
        assert!(reports[0].total_time > 0.0);
    }

    #[test]
    fn walker_runs_back_to_back_jobs() {
        let config = SimConfig {
            jitter: 0.0,
            ..SimConfig::default()
        };
        let mut session = Session::open(config.clone()).unwrap();
        let mut walker = Walker::new(layout::START, &config);
        session.start(walker.position()).unwrap();

        let reports = drive(&mut session, &mut walker, 2, 40_000).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(session.state(), JobState::Completed);
    }

    #[test]
    fn back_to_back_jobs_keep_every_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = SimConfig {
            jitter: 0.0,
            report_dir: Some(dir.path().to_path_buf()),
            ..SimConfig::default()
        };
        let mut session = Session::open(config.clone()).unwrap();
        let mut walker = Walker::new(layout::START, &config);
        session.start(walker.position()).unwrap();

        let reports = drive(&mut session, &mut walker, 2, 40_000).unwrap();
        assert_eq!(reports.len(), 2);
        let written = session.reports();
        assert_eq!(written.len(), 2);
        assert_ne!(written[0], written[1]);
        assert!(written.iter().all(|p| p.exists()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }
}
