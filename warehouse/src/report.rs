//! Job reports written to disk.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::info;
use pickar_job::{JobReport, LoggedItem};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// On-disk form of a finished job: the tracker's timings stamped with wall
/// clock start and end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFile {
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub items: Vec<LoggedItem>,
    pub return_time: f32,
    pub total_time: f32,
}

impl ReportFile {
    pub fn new(report: JobReport, start_time: DateTime<Local>, end_time: DateTime<Local>) -> Self {
        Self {
            start_time,
            end_time,
            items: report.items,
            return_time: report.return_time,
            total_time: report.total_time,
        }
    }

    /// `Log_<start>.json`, with the start time down to the second.
    pub fn file_name(&self) -> String {
        format!("Log_{}.json", self.start_time.format("%Y%m%d_%H%M%S"))
    }

    /// File name for the `n`th report started in the same second.
    fn numbered_file_name(&self, n: u32) -> String {
        match n {
            0 => self.file_name(),
            n => format!("Log_{}_{n}.json", self.start_time.format("%Y%m%d_%H%M%S")),
        }
    }

    /// Write the report as pretty JSON into `dir`, creating it if needed.
    ///
    /// Existing reports are never overwritten: if `Log_<start>.json` is
    /// taken the name gets a `_1`, `_2`, ... suffix.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(self)?;
        let mut n = 0;
        let (path, mut file) = loop {
            let path = dir.join(self.numbered_file_name(n));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
                Err(e) => return Err(e.into()),
            }
        };
        file.write_all(json.as_bytes())?;
        info!("wrote job report {}", path.display());
        Ok(path)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
