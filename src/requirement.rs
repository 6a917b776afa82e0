use serde::{Deserialize, Serialize};

/// A named bundle of metrics a project opts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    TrackCiJobs,
    TrackAbsence,
    OwaspZap,
    OwaspDependencies,
    UnitTests,
    Performance,
    TrackRisks,
    TrackActions,
}

impl Requirement {
    pub fn all() -> [Requirement; 8] {
        [
            Requirement::TrackCiJobs,
            Requirement::TrackAbsence,
            Requirement::OwaspZap,
            Requirement::OwaspDependencies,
            Requirement::UnitTests,
            Requirement::Performance,
            Requirement::TrackRisks,
            Requirement::TrackActions,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Requirement::TrackCiJobs => "Track CI jobs",
            Requirement::TrackAbsence => "Track absence",
            Requirement::OwaspZap => "OWASP ZAP",
            Requirement::OwaspDependencies => "OWASP dependencies",
            Requirement::UnitTests => "Unit tests",
            Requirement::Performance => "Performance",
            Requirement::TrackRisks => "Track risks",
            Requirement::TrackActions => "Track actions",
        }
    }

    /// Class names of the metrics this requirement enables.
    pub fn metric_classes(self) -> &'static [&'static str] {
        match self {
            Requirement::TrackCiJobs => &["FailingCIJobs", "UnusedCIJobs"],
            Requirement::TrackAbsence => &["TeamAbsence"],
            Requirement::OwaspZap => &[
                "HighRiskZAPScanAlertsMetric",
                "MediumRiskZAPScanAlertsMetric",
            ],
            Requirement::OwaspDependencies => &[
                "HighPriorityOWASPDependencyWarnings",
                "NormalPriorityOWASPDependencyWarnings",
            ],
            Requirement::UnitTests => &[
                "IntegrationtestLineCoverage",
                "IntegrationtestBranchCoverage",
            ],
            Requirement::Performance => &[
                "PerformanceLoadTestWarnings",
                "PerformanceLoadTestErrors",
                "PerformanceEnduranceTestWarnings",
                "PerformanceEnduranceTestErrors",
                "PerformanceScalabilityTestWarnings",
                "PerformanceScalabilityTestErrors",
            ],
            Requirement::TrackRisks => &["RiskLog"],
            Requirement::TrackActions => &["ActionActivity", "ActionAge"],
        }
    }

    pub fn includes(self, metric_class: &str) -> bool {
        self.metric_classes().contains(&metric_class)
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
