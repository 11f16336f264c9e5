//! Per-job timing history.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::item::ItemId;

/// Time spent on one collected item, measured from the previous event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggedItem {
    pub id: ItemId,
    /// Seconds since the job started or the previous item was collected.
    pub time_taken: f32,
}

/// Summary of a finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub items: Vec<LoggedItem>,
    /// Seconds from the last collected item back to the start point.
    pub return_time: f32,
    /// Seconds from job start to completion.
    pub total_time: f32,
}

/// Records collection times while a job runs.
#[derive(Debug, Clone, Default)]
pub struct JobLog {
    started_at: Duration,
    last_event: Duration,
    items: Vec<LoggedItem>,
}

impl JobLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh log at tick time `now`.
    pub fn start(&mut self, now: Duration) {
        self.started_at = now;
        self.last_event = now;
        self.items.clear();
    }

    pub fn record(&mut self, id: ItemId, now: Duration) {
        let time_taken = now.saturating_sub(self.last_event).as_secs_f32();
        self.items.push(LoggedItem { id, time_taken });
        self.last_event = now;
    }

    /// Close the log and produce its report.
    pub fn finish(&mut self, now: Duration) -> JobReport {
        let report = JobReport {
            items: std::mem::take(&mut self.items),
            return_time: now.saturating_sub(self.last_event).as_secs_f32(),
            total_time: now.saturating_sub(self.started_at).as_secs_f32(),
        };
        self.last_event = now;
        report
    }

    pub fn items(&self) -> &[LoggedItem] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_are_relative_to_previous_event() {
        let mut log = JobLog::new();
        log.start(Duration::from_secs(10));
        log.record(ItemId(1), Duration::from_secs(14));
        log.record(ItemId(2), Duration::from_secs(20));
        let report = log.finish(Duration::from_secs(27));
        assert_eq!(
            report.items,
            vec![
                LoggedItem { id: ItemId(1), time_taken: 4.0 },
                LoggedItem { id: ItemId(2), time_taken: 6.0 },
            ]
        );
        assert_eq!(report.return_time, 7.0);
        assert_eq!(report.total_time, 17.0);
        assert!(log.items().is_empty());
    }

    #[test]
    fn report_json_uses_camel_case() {
        let report = JobReport {
            items: vec![LoggedItem { id: ItemId(3), time_taken: 1.5 }],
            return_time: 2.0,
            total_time: 3.5,
        };
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["items"][0]["timeTaken"], 1.5);
        assert_eq!(value["items"][0]["id"], 3);
        assert_eq!(value["returnTime"], 2.0);
    }
}
