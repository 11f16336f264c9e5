//! Tick-driven picking session.
//!
//! A [`Session`] owns the waypoint graph, the authoring editor, the job
//! tracker and the inventory, and wires them together explicitly. Drivers
//! feed it [`SimMsg`]s and read the exposed state (goal, steering point,
//! route, progress) back out.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use log::{debug, info};
use pickar_core::Vec3;
use pickar_job::{Inventory, Item, ItemId, JobEvent, JobState, JobTracker};
use pickar_nav::{
    Connection, NodeId, PathFinder, TurnCue, WaypointEditor, WaypointGraph, storage,
};
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::{AppError, Result};
use crate::layout;
use crate::report::ReportFile;

/// What the application is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Guiding the picker through jobs.
    OrderPicking,
    /// Editing the waypoint graph. No job runs.
    WaypointPlacement,
}

/// Input to [`Session::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum SimMsg {
    /// Advance one tick with the user at `user`, looking along `facing`.
    Tick { user: Vec3, facing: Vec3 },
    /// An item was picked (scanned).
    Select(ItemId),
    SwitchMode,
    /// Place a waypoint, connecting it to the selected one.
    PlaceWaypoint(Vec3),
    /// Click a waypoint: select it, or toggle its edge to the selection.
    ClickWaypoint(NodeId),
    DeleteWaypoint(NodeId),
    BeginDrag(NodeId),
    DragTo(Vec3),
    EndDrag,
}

pub struct Session {
    config: SimConfig,
    graph: WaypointGraph,
    editor: WaypointEditor,
    tracker: JobTracker,
    inventory: Inventory,
    mode: Mode,
    clock: Duration,
    user: Vec3,
    facing: Vec3,
    job_started: Option<DateTime<Local>>,
    reports: Vec<PathBuf>,
}

impl Session {
    /// Build a session in order-picking mode. No job runs until
    /// [`start`](Self::start).
    pub fn new(
        config: SimConfig,
        mut graph: WaypointGraph,
        inventory: Inventory,
        default_job: &[ItemId],
    ) -> Result<Self> {
        graph.set_check_two_way(config.check_two_way);
        let mut tracker = JobTracker::new(config.job.clone());
        tracker.set_default_job(inventory.resolve(default_job)?);
        Ok(Self {
            config,
            graph,
            editor: WaypointEditor::new(),
            tracker,
            inventory,
            mode: Mode::OrderPicking,
            clock: Duration::ZERO,
            user: layout::START,
            facing: Vec3::new(0.0, 0.0, 1.0),
            job_started: None,
            reports: Vec::new(),
        })
    }

    /// Session over the built-in warehouse. The graph comes from the
    /// configured waypoint file when it holds any waypoints.
    pub fn open(config: SimConfig) -> Result<Self> {
        let stored = match &config.waypoint_file {
            Some(path) => storage::load(path)?,
            None => WaypointGraph::new(),
        };
        let graph = if stored.is_empty() {
            layout::graph()?
        } else {
            stored
        };
        Self::new(config, graph, layout::inventory(), &layout::default_job())
    }

    /// Start the default job with the user at `user`.
    pub fn start(&mut self, user: Vec3) -> Result<Vec<JobEvent>> {
        self.user = user;
        self.start_default_job()
    }

    pub fn update(&mut self, msg: SimMsg) -> Result<Vec<JobEvent>> {
        match msg {
            SimMsg::Tick { user, facing } => self.tick(user, facing),
            SimMsg::Select(id) => {
                self.expect_mode(Mode::OrderPicking)?;
                let finder = PathFinder::new(&self.graph, self.config.steering);
                Ok(self.tracker.select_item(id, &finder)?)
            }
            SimMsg::SwitchMode => self.switch_mode(),
            msg => {
                self.expect_mode(Mode::WaypointPlacement)?;
                self.edit(msg)?;
                Ok(Vec::new())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    fn tick(&mut self, user: Vec3, facing: Vec3) -> Result<Vec<JobEvent>> {
        self.clock += self.config.tick();
        self.user = user;
        if facing.flat().length() > f32::EPSILON {
            self.facing = facing;
        }
        let finder = PathFinder::new(&self.graph, self.config.steering);
        let events = self.tracker.tick(self.clock, user, &finder);
        self.observe(&events)?;
        Ok(events)
    }

    fn start_default_job(&mut self) -> Result<Vec<JobEvent>> {
        let finder = PathFinder::new(&self.graph, self.config.steering);
        let events = self.tracker.start_default_job(self.user, &finder)?;
        self.observe(&events)?;
        Ok(events)
    }

    fn observe(&mut self, events: &[JobEvent]) -> Result<()> {
        for event in events {
            match event {
                JobEvent::Started { .. } => self.job_started = Some(Local::now()),
                JobEvent::Completed(report) => {
                    let started = self.job_started.take().unwrap_or_else(Local::now);
                    if let Some(dir) = &self.config.report_dir {
                        let file = ReportFile::new(report.clone(), started, Local::now());
                        self.reports.push(file.write(dir)?);
                    }
                }
                JobEvent::TargetChanged { target: Some(id) } => {
                    if let Some(label) = self.inventory.aisle_label(*id) {
                        debug!("next item {id} at {label}");
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn switch_mode(&mut self) -> Result<Vec<JobEvent>> {
        match self.mode {
            Mode::OrderPicking => {
                self.mode = Mode::WaypointPlacement;
                self.job_started = None;
                info!("switched to waypoint placement");
                Ok(self.tracker.cancel_job())
            }
            Mode::WaypointPlacement => {
                if let Some(path) = &self.config.waypoint_file {
                    storage::save(&self.graph, path)?;
                }
                self.graph.recompute();
                let events = self.start_default_job()?;
                self.mode = Mode::OrderPicking;
                self.editor.reset();
                info!("switched to order picking with {} waypoints", self.graph.len());
                Ok(events)
            }
        }
    }

    fn edit(&mut self, msg: SimMsg) -> Result<()> {
        let graph = &mut self.graph;
        match msg {
            SimMsg::PlaceWaypoint(position) => {
                let id = self.editor.create_node(graph, position)?;
                debug!("placed waypoint {id} at {position}");
            }
            SimMsg::ClickWaypoint(id) => match self.editor.select(graph, id)? {
                Some(Connection::Created) => debug!("connected waypoint {id}"),
                Some(Connection::Removed) => debug!("disconnected waypoint {id}"),
                None => {}
            },
            SimMsg::DeleteWaypoint(id) => {
                self.editor.delete_node(graph, id)?;
            }
            SimMsg::BeginDrag(id) => self.editor.begin_drag(graph, id)?,
            SimMsg::DragTo(position) => {
                self.editor.drag_to(graph, position)?;
            }
            SimMsg::EndDrag => self.editor.end_drag(),
            SimMsg::Tick { .. } | SimMsg::Select(_) | SimMsg::SwitchMode => {}
        }
        Ok(())
    }

    fn expect_mode(&self, expected: Mode) -> Result<()> {
        if self.mode == expected {
            Ok(())
        } else {
            Err(AppError::WrongMode { expected })
        }
    }

    fn finder(&self) -> PathFinder<'_> {
        PathFinder::new(&self.graph, self.config.steering)
    }

    // -----------------------------------------------------------------------
    // Exposed state
    // -----------------------------------------------------------------------

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn graph(&self) -> &WaypointGraph {
        &self.graph
    }

    pub fn editor(&self) -> &WaypointEditor {
        &self.editor
    }

    pub fn tracker(&self) -> &JobTracker {
        &self.tracker
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Simulated time since the session started.
    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn user(&self) -> Vec3 {
        self.user
    }

    pub fn state(&self) -> JobState {
        self.tracker.state()
    }

    pub fn progress(&self) -> f32 {
        self.tracker.progress()
    }

    pub fn remaining_count(&self) -> usize {
        self.tracker.remaining_count()
    }

    pub fn current_target(&self) -> Option<&Item> {
        self.tracker.current_target()
    }

    pub fn target_position(&self) -> Option<Vec3> {
        self.tracker.current_target_position()
    }

    /// Shelf label of the current target, e.g. `B3`.
    pub fn current_aisle(&self) -> Option<String> {
        self.tracker.current_aisle().map(|aisle| aisle.to_string())
    }

    /// The point the user should head for right now. Falls back to the goal
    /// itself when the graph cannot route there.
    pub fn steering_point(&self) -> Option<Vec3> {
        let goal = self.tracker.navigation_goal()?;
        Some(
            self.finder()
                .next_steering_point(self.user, goal)
                .unwrap_or(goal),
        )
    }

    /// Points for drawing the route from the user to the goal.
    pub fn render_path(&self) -> Vec<Vec3> {
        let Some(goal) = self.tracker.navigation_goal() else {
            return Vec::new();
        };
        self.finder()
            .render_path(self.user, goal)
            .unwrap_or_else(|| vec![self.user, goal])
    }

    pub fn turn_cue(&self) -> TurnCue {
        match self.steering_point() {
            Some(steering) => self.finder().turn_cue(self.facing, self.user, steering),
            None => TurnCue::None,
        }
    }

    /// Report files written so far.
    pub fn reports(&self) -> &[PathBuf] {
        &self.reports
    }
}
