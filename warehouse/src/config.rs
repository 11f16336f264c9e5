//! Simulation settings, read from an optional JSON file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use pickar_job::JobConfig;
use pickar_nav::SteeringConfig;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Everything a session and its simulated picker need.
///
/// Missing fields take their defaults, so `{}` is a valid config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Waypoint graph to load at startup and store after authoring.
    pub waypoint_file: Option<PathBuf>,
    /// Folder for job reports. Reports are not written when unset.
    pub report_dir: Option<PathBuf>,
    /// Warn about one-directional edges after each recompute.
    pub check_two_way: bool,
    /// Simulated seconds per tick.
    pub tick_seconds: f32,
    /// Walking speed in metres per second.
    pub walk_speed: f32,
    /// Largest per-tick tracking error added to the walker's position.
    pub jitter: f32,
    /// Seed for the walker's jitter.
    pub seed: u64,
    /// Distance at which the walker picks up an item.
    pub pick_radius: f32,
    pub steering: SteeringConfig,
    pub job: JobConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            waypoint_file: None,
            report_dir: None,
            check_two_way: true,
            tick_seconds: 0.1,
            walk_speed: 1.4,
            jitter: 0.02,
            seed: 7,
            pick_radius: 1.2,
            steering: SteeringConfig::default(),
            job: JobConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&text)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Tick length, never zero.
    pub fn tick(&self) -> Duration {
        Duration::try_from_secs_f32(self.tick_seconds)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_millis(100))
    }
}
