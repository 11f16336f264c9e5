use std::time::Duration;

use log::{debug, info};
use pickar_core::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{JobError, Result};
use crate::item::{AisleEntry, Item, ItemId};
use crate::joblog::{JobLog, JobReport};
use crate::metric::PathMetric;
use crate::schedule::Timers;

/// Lifecycle of a picking job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// No job.
    Idle,
    /// Items remain to be collected.
    Active,
    /// Everything is collected; the user walks back to the start point.
    Returning,
    /// Back at the start point; a restart is pending.
    Completed,
}

/// Something collaborators (sound, UI, logging) may want to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum JobEvent {
    Started { targets: usize },
    /// The routed-to item changed. `None` once every item is collected.
    TargetChanged { target: Option<ItemId> },
    Collected { item: ItemId, remaining: usize },
    /// The selected item is not part of the job.
    IncorrectSelection { item: ItemId },
    Returning,
    Completed(JobReport),
    Cancelled,
}

/// Job tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Distance from the start point that counts as being back.
    pub completion_radius: f32,
    /// Seconds between completion and the automatic restart.
    pub restart_delay_secs: f32,
    /// Restart the default job after completion instead of going idle.
    pub auto_restart: bool,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            completion_radius: 1.0,
            restart_delay_secs: 5.0,
            auto_restart: true,
        }
    }
}

impl JobConfig {
    pub fn restart_delay(&self) -> Duration {
        Duration::try_from_secs_f32(self.restart_delay_secs).unwrap_or(Duration::ZERO)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    Restart,
}

/// Tracks the user's current picking job.
///
/// The tracker is driven by [`tick`](Self::tick) once per frame with the
/// frame's time and the user's position. While a job is active every tick
/// re-ranks the remaining targets by walking distance and routes to the
/// closest one (greedy nearest-next, not an optimal tour).
#[derive(Debug)]
pub struct JobTracker {
    config: JobConfig,
    state: JobState,
    targets: Vec<Item>,
    total: usize,
    current: Option<ItemId>,
    start_point: Option<Vec3>,
    user_position: Vec3,
    now: Duration,
    default_job: Vec<Item>,
    timers: Timers<Deferred>,
    log: JobLog,
}

impl JobTracker {
    pub fn new(config: JobConfig) -> Self {
        Self {
            config,
            state: JobState::Idle,
            targets: Vec::new(),
            total: 0,
            current: None,
            start_point: None,
            user_position: Vec3::ZERO,
            now: Duration::ZERO,
            default_job: Vec::new(),
            timers: Timers::new(),
            log: JobLog::new(),
        }
    }

    /// The job started by [`start_default_job`](Self::start_default_job) and
    /// by the automatic restart.
    pub fn set_default_job(&mut self, items: Vec<Item>) {
        self.default_job = items;
    }

    pub fn default_job(&self) -> &[Item] {
        &self.default_job
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Start a job at the user's current position.
    ///
    /// Duplicate item ids are collapsed. Fails with
    /// [`JobError::JobInProgress`] unless the tracker is idle or completed.
    pub fn create_job<M: PathMetric>(
        &mut self,
        items: Vec<Item>,
        user_position: Vec3,
        metric: &M,
    ) -> Result<Vec<JobEvent>> {
        if matches!(self.state, JobState::Active | JobState::Returning) {
            return Err(JobError::JobInProgress);
        }
        let mut targets: Vec<Item> = Vec::with_capacity(items.len());
        for item in items {
            if !targets.iter().any(|t| t.id == item.id) {
                targets.push(item);
            }
        }
        if targets.is_empty() {
            return Err(JobError::EmptyJob);
        }

        self.timers.clear();
        self.user_position = user_position;
        self.start_point = Some(user_position);
        self.total = targets.len();
        self.targets = targets;
        self.current = None;
        self.state = JobState::Active;
        self.log.start(self.now);
        info!("job started with {} items at {}", self.total, user_position);

        let mut events = vec![JobEvent::Started { targets: self.total }];
        events.extend(self.select_target(metric));
        Ok(events)
    }

    /// Start the default job. Fails with [`JobError::EmptyJob`] if none is set.
    pub fn start_default_job<M: PathMetric>(
        &mut self,
        user_position: Vec3,
        metric: &M,
    ) -> Result<Vec<JobEvent>> {
        self.create_job(self.default_job.clone(), user_position, metric)
    }

    /// Drop the current job and any pending restart.
    pub fn cancel_job(&mut self) -> Vec<JobEvent> {
        let was_idle = self.state == JobState::Idle;
        self.timers.clear();
        self.targets.clear();
        self.total = 0;
        self.current = None;
        self.start_point = None;
        self.log.clear();
        self.state = JobState::Idle;
        if was_idle {
            Vec::new()
        } else {
            info!("job cancelled");
            vec![JobEvent::Cancelled]
        }
    }

    /// Handle a picked (scanned or clicked) item.
    ///
    /// A matching target is collected and the next target chosen. Anything
    /// else yields [`JobEvent::IncorrectSelection`] and changes nothing.
    pub fn select_item<M: PathMetric>(&mut self, id: ItemId, metric: &M) -> Result<Vec<JobEvent>> {
        match self.state {
            JobState::Idle | JobState::Completed => return Err(JobError::NoActiveJob),
            JobState::Returning => return Ok(vec![JobEvent::IncorrectSelection { item: id }]),
            JobState::Active => {}
        }
        let Some(pos) = self.targets.iter().position(|t| t.id == id) else {
            debug!("item {id} is not a target");
            return Ok(vec![JobEvent::IncorrectSelection { item: id }]);
        };

        self.targets.remove(pos);
        self.log.record(id, self.now);
        let remaining = self.targets.len();
        info!("collected item {id}, {remaining} left");
        let mut events = vec![JobEvent::Collected { item: id, remaining }];

        if self.targets.is_empty() {
            self.current = None;
            self.state = JobState::Returning;
            info!("all items collected, returning to start");
            events.push(JobEvent::TargetChanged { target: None });
            events.push(JobEvent::Returning);
        } else {
            events.extend(self.select_target(metric));
        }
        Ok(events)
    }

    /// Advance the tracker to tick time `now` with the user at `user_position`.
    pub fn tick<M: PathMetric>(
        &mut self,
        now: Duration,
        user_position: Vec3,
        metric: &M,
    ) -> Vec<JobEvent> {
        self.now = now;
        self.user_position = user_position;
        match self.state {
            JobState::Idle => Vec::new(),
            JobState::Active => self.select_target(metric).into_iter().collect(),
            JobState::Returning => self.check_return(),
            JobState::Completed => self.run_deferred(metric),
        }
    }

    fn check_return(&mut self) -> Vec<JobEvent> {
        let Some(start) = self.start_point else {
            return Vec::new();
        };
        if self.user_position.distance(start) >= self.config.completion_radius {
            return Vec::new();
        }
        let report = self.log.finish(self.now);
        self.state = JobState::Completed;
        let at = self.now + self.config.restart_delay();
        self.timers.schedule(Deferred::Restart, at);
        info!(
            "job completed in {:.1}s, next job at {:.1}s",
            report.total_time,
            at.as_secs_f32()
        );
        vec![JobEvent::Completed(report)]
    }

    fn run_deferred<M: PathMetric>(&mut self, metric: &M) -> Vec<JobEvent> {
        let mut events = Vec::new();
        while let Some(deferred) = self.timers.pop_due(self.now) {
            match deferred {
                Deferred::Restart => {
                    if self.config.auto_restart && !self.default_job.is_empty() {
                        let items = self.default_job.clone();
                        match self.create_job(items, self.user_position, metric) {
                            Ok(started) => events.extend(started),
                            Err(e) => {
                                debug!("restart skipped: {e}");
                                events.extend(self.cancel_job());
                            }
                        }
                    } else {
                        events.extend(self.cancel_job());
                    }
                }
            }
        }
        events
    }

    /// Re-rank the remaining targets from the user's position.
    ///
    /// The first target with the strictly smallest distance wins, so ties
    /// keep job order.
    fn select_target<M: PathMetric>(&mut self, metric: &M) -> Option<JobEvent> {
        let mut best: Option<(ItemId, f32)> = None;
        for target in &self.targets {
            let d = metric.walking_distance(self.user_position, target.position);
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((target.id, d));
            }
        }
        let next = best.map(|(id, _)| id);
        if next == self.current {
            return None;
        }
        if let Some((id, d)) = best {
            debug!("routing to item {id} ({d:.1} away)");
        }
        self.current = next;
        Some(JobEvent::TargetChanged { target: next })
    }

    // -----------------------------------------------------------------------
    // Exposed state
    // -----------------------------------------------------------------------

    #[inline]
    pub fn state(&self) -> JobState {
        self.state
    }

    /// Whether a job is running (collecting or returning).
    pub fn is_active(&self) -> bool {
        matches!(self.state, JobState::Active | JobState::Returning)
    }

    /// Fraction of the job done, forced to 1 once every item is collected.
    pub fn progress(&self) -> f32 {
        match self.state {
            JobState::Idle => 0.0,
            JobState::Active => {
                (self.total - self.targets.len()) as f32 / self.total as f32
            }
            JobState::Returning | JobState::Completed => 1.0,
        }
    }

    pub fn remaining_count(&self) -> usize {
        self.targets.len()
    }

    pub fn total_count(&self) -> usize {
        self.total
    }

    /// Items not collected yet, in job order.
    pub fn targets(&self) -> &[Item] {
        &self.targets
    }

    pub fn current_target(&self) -> Option<&Item> {
        let id = self.current?;
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn current_target_position(&self) -> Option<Vec3> {
        self.current_target().map(|t| t.position)
    }

    /// Shelf location of the current target.
    pub fn current_aisle(&self) -> Option<&AisleEntry> {
        self.current_target().map(|t| &t.aisle)
    }

    /// Where the user was when the job began.
    pub fn start_point(&self) -> Option<Vec3> {
        self.start_point
    }

    /// The point to route to: the current target, or the start point while
    /// returning.
    pub fn navigation_goal(&self) -> Option<Vec3> {
        match self.state {
            JobState::Active => self.current_target_position(),
            JobState::Returning => self.start_point,
            JobState::Idle | JobState::Completed => None,
        }
    }

    /// Tick time at which the pending restart fires.
    pub fn restart_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn log(&self) -> &JobLog {
        &self.log
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }
}
