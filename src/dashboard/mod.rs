pub mod builder;
pub mod models;

pub use builder::{build_snapshot, evaluate};
pub use models::{DashboardAlert, DashboardSnapshot, MetricRow, OverviewMetrics};
