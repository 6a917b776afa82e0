use crate::status::Status;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use thiserror::Error;

const DEFAULT_RECENT_LEN: usize = 48;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to access history file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode history record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read access to past measurements, keyed by metric stable id.
pub trait History: Send + Sync {
    /// Most recent values, oldest first.
    fn recent_history(&self, metric_id: &str) -> Vec<f64>;

    /// Start of the latest unbroken run of `status`, or `None` when the metric
    /// was not last recorded with that status.
    fn status_start_date(&self, metric_id: &str, status: Status) -> Option<DateTime<Local>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub metric_id: String,
    pub status: Status,
    pub value: f64,
    pub date: DateTime<Local>,
}

/// Append-only history kept as JSON lines.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    records: Vec<HistoryRecord>,
    recent_len: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            recent_len: DEFAULT_RECENT_LEN,
        }
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<HistoryRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn with_recent_len(mut self, recent_len: usize) -> Self {
        self.recent_len = recent_len.max(1);
        self
    }

    /// Load a history file. A file that does not exist yet is an empty history.
    pub fn load(path: &Path) -> Result<Self, HistoryError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => log::warn!(
                    "skipping unreadable history line {} in {}: {}",
                    lineno + 1,
                    path.display(),
                    e
                ),
            }
        }
        Ok(Self::from_records(records))
    }

    /// Append records to the history file, creating it if needed.
    pub fn append_to(path: &Path, records: &[HistoryRecord]) -> Result<(), HistoryError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        for record in records {
            writeln!(file, "{}", serde_json::to_string(record)?)?;
        }
        log::debug!("appended {} record(s) to {}", records.len(), path.display());
        Ok(())
    }

    pub fn push(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    fn records_for<'a>(
        &'a self,
        metric_id: &'a str,
    ) -> impl DoubleEndedIterator<Item = &'a HistoryRecord> {
        self.records.iter().filter(move |r| r.metric_id == metric_id)
    }
}

impl History for HistoryLog {
    fn recent_history(&self, metric_id: &str) -> Vec<f64> {
        let mut values: Vec<f64> = self
            .records_for(metric_id)
            .rev()
            .take(self.recent_len)
            .map(|r| r.value)
            .collect();
        values.reverse();
        values
    }

    fn status_start_date(&self, metric_id: &str, status: Status) -> Option<DateTime<Local>> {
        let mut start = None;
        for record in self.records_for(metric_id).rev() {
            if record.status != status {
                break;
            }
            start = Some(record.date);
        }
        start
    }
}
