//! Quality dashboard engine: turns facts gathered from development tooling
//! into metric statuses, reports and norms.

pub mod config;
pub mod dashboard;
pub mod domain;
pub mod history;
pub mod metric;
pub mod monitor;
pub mod readings;
pub mod requirement;
pub mod status;
pub mod template;
