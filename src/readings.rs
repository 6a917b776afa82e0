//! Recorded facts from external tooling.
//!
//! Polling scripts write one JSON document mapping each configured source
//! instance name to the facts they could retrieve. Anything that is absent
//! here surfaces as the `-1` sentinel in metric values, never as an error.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadingsError {
    #[error("failed to read readings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse readings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Facts per source instance name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Readings {
    sources: BTreeMap<String, SourceReading>,
}

impl Readings {
    pub fn from_json(s: &str) -> Result<Self, ReadingsError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ReadingsError> {
        let content = std::fs::read_to_string(path)?;
        let readings = Self::from_json(&content)?;
        log::debug!(
            "loaded readings for {} source(s) from {}",
            readings.sources.len(),
            path.display()
        );
        Ok(readings)
    }

    pub fn insert(&mut self, instance: impl Into<String>, reading: SourceReading) {
        self.sources.insert(instance.into(), reading);
    }

    pub fn with(mut self, instance: impl Into<String>, reading: SourceReading) -> Self {
        self.insert(instance, reading);
        self
    }

    pub fn get(&self, instance: &str) -> Option<&SourceReading> {
        self.sources.get(instance)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReading {
    /// When the polling script last retrieved these facts.
    #[serde(default)]
    pub measured_at: Option<DateTime<Local>>,
    pub facts: SourceFacts,
}

impl SourceReading {
    pub fn new(facts: SourceFacts) -> Self {
        Self {
            measured_at: None,
            facts,
        }
    }

    pub fn measured_at(mut self, date: DateTime<Local>) -> Self {
        self.measured_at = Some(date);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceFacts {
    Jenkins(JenkinsFacts),
    HolidayPlanner(HolidayPlannerFacts),
    ZapScanReport(ZapScanFacts),
    OwaspDependencyReport(OwaspDependencyFacts),
    Sonar(SonarFacts),
    PerformanceReport(PerformanceFacts),
    TrelloBoard(TrelloBoardFacts),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JenkinsFacts {
    pub active_jobs: Option<u32>,
    /// Failing job name to job url.
    pub failing_jobs: Option<BTreeMap<String, String>>,
    /// Unused job name to job url.
    pub unused_jobs: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HolidayPlannerFacts {
    /// Longest multi-member absence per team name.
    pub teams: BTreeMap<String, Absence>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Absence {
    /// Consecutive working days during which several members are absent.
    pub days: u32,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub absentees: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZapScanFacts {
    /// Alert counts per report id.
    pub reports: BTreeMap<String, ZapAlerts>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZapAlerts {
    pub high: Option<i64>,
    pub medium: Option<i64>,
    pub low: Option<i64>,
}

impl ZapAlerts {
    pub fn count(&self, risk_level: &str) -> Option<i64> {
        match risk_level {
            "high" => self.high,
            "medium" => self.medium,
            "low" => self.low,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OwaspDependencyFacts {
    /// Warning counts per job name.
    pub jobs: BTreeMap<String, OwaspWarnings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OwaspWarnings {
    pub high: Option<i64>,
    pub normal: Option<i64>,
    pub low: Option<i64>,
}

impl OwaspWarnings {
    pub fn count(&self, priority: &str) -> Option<i64> {
        match priority {
            "high" => self.high,
            "normal" => self.normal,
            "low" => self.low,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SonarFacts {
    /// Measures per Sonar project key.
    pub projects: BTreeMap<String, SonarProject>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SonarProject {
    pub integration_test_line_coverage: Option<f64>,
    pub integration_test_branch_coverage: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceFacts {
    /// Results per performance report id.
    pub reports: BTreeMap<String, PerformanceResults>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceResults {
    pub queries: Option<i64>,
    pub queries_violating_max_responsetime: Option<i64>,
    pub queries_violating_wished_responsetime: Option<i64>,
    pub urls: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrelloBoardFacts {
    pub last_update: Option<DateTime<Local>>,
    /// Card title to card url.
    pub over_due_or_inactive_cards: Option<BTreeMap<String, String>>,
}
