use crate::history::HistoryRecord;
use crate::metric::Links;
use crate::status::Status;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardSnapshot {
    pub generated_at_epoch_secs: i64,
    pub project: String,
    pub overview: OverviewMetrics,
    pub alerts: Vec<DashboardAlert>,
    pub rows: Vec<MetricRow>,
}

impl DashboardSnapshot {
    pub fn has_red(&self) -> bool {
        self.overview.red > 0
    }

    pub fn rows_with_status(&self, status: Status) -> impl Iterator<Item = &MetricRow> {
        self.rows.iter().filter(move |r| r.status == status)
    }

    /// History entries for every row, dated `date`.
    pub fn history_records(&self, date: DateTime<Local>) -> Vec<HistoryRecord> {
        self.rows.iter().map(|r| r.history_record(date)).collect()
    }

    /// One line with the count per status, most urgent first.
    pub fn summary_line(&self) -> String {
        let counts: Vec<String> = Status::all()
            .iter()
            .map(|s| format!("{} {}", self.overview.count(*s), s))
            .collect();
        format!(
            "{}: {} metrics ({})",
            self.project,
            self.overview.total_metrics,
            counts.join(", ")
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct OverviewMetrics {
    pub total_metrics: usize,
    pub perfect: usize,
    pub green: usize,
    pub yellow: usize,
    pub red: usize,
    pub grey: usize,
    pub missing: usize,
    pub missing_source: usize,
}

impl OverviewMetrics {
    pub fn record(&mut self, status: Status) {
        self.total_metrics += 1;
        *self.slot(status) += 1;
    }

    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::Perfect => self.perfect,
            Status::Green => self.green,
            Status::Yellow => self.yellow,
            Status::Red => self.red,
            Status::Grey => self.grey,
            Status::Missing => self.missing,
            Status::MissingSource => self.missing_source,
        }
    }

    fn slot(&mut self, status: Status) -> &mut usize {
        match status {
            Status::Perfect => &mut self.perfect,
            Status::Green => &mut self.green,
            Status::Yellow => &mut self.yellow,
            Status::Red => &mut self.red,
            Status::Grey => &mut self.grey,
            Status::Missing => &mut self.missing,
            Status::MissingSource => &mut self.missing_source,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardAlert {
    pub severity: String,
    pub title: String,
    pub detail: String,
    pub metric: Option<String>,
}

/// One evaluated metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricRow {
    pub id: String,
    pub stable_id: String,
    pub class_name: String,
    pub name: String,
    pub subject: String,
    pub status: Status,
    pub value: f64,
    pub numerical_value: f64,
    pub unit: String,
    pub report: String,
    pub norm: String,
    pub comment: String,
    pub urls: Links,
    pub url_label: Option<String>,
    pub comment_urls: Links,
    pub comment_url_label: Option<String>,
    pub target: f64,
    pub low_target: f64,
    pub status_start: Option<DateTime<Local>>,
    pub y_axis_range: (f64, f64),
}

impl MetricRow {
    pub fn history_record(&self, date: DateTime<Local>) -> HistoryRecord {
        HistoryRecord {
            metric_id: self.stable_id.clone(),
            status: self.status,
            value: self.numerical_value,
            date,
        }
    }
}
