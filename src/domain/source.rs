use serde::{Deserialize, Serialize};

/// The kinds of external tooling a metric can draw its facts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Jenkins,
    Sonar,
    VersionControlSystem,
    TestReport,
    HolidayPlanner,
    TrelloActionsBoard,
    TrelloRiskBoard,
    ZapScanReport,
    OwaspDependencyReport,
    PerformanceLoadTestReport,
    PerformanceEnduranceTestReport,
    PerformanceScalabilityTestReport,
}

impl SourceKind {
    /// Type name shown when a project lacks this kind of source.
    pub fn class_name(self) -> &'static str {
        match self {
            SourceKind::Jenkins => "Jenkins",
            SourceKind::Sonar => "Sonar",
            SourceKind::VersionControlSystem => "VersionControlSystem",
            SourceKind::TestReport => "TestReport",
            SourceKind::HolidayPlanner => "HolidayPlanner",
            SourceKind::TrelloActionsBoard => "TrelloActionsBoard",
            SourceKind::TrelloRiskBoard => "TrelloRiskBoard",
            SourceKind::ZapScanReport => "ZAPScanReport",
            SourceKind::OwaspDependencyReport => "OWASPDependencyReport",
            SourceKind::PerformanceLoadTestReport => "PerformanceLoadTestReport",
            SourceKind::PerformanceEnduranceTestReport => "PerformanceEnduranceTestReport",
            SourceKind::PerformanceScalabilityTestReport => "PerformanceScalabilityTestReport",
        }
    }

    /// Label used for links into the source.
    pub fn display_name(self) -> &'static str {
        match self {
            SourceKind::Jenkins => "Jenkins",
            SourceKind::Sonar => "SonarQube",
            SourceKind::VersionControlSystem => "Versiebeheer",
            SourceKind::TestReport => "Testrapport",
            SourceKind::HolidayPlanner => "Vakantieplanner",
            SourceKind::TrelloActionsBoard => "Trello acties",
            SourceKind::TrelloRiskBoard => "Trello risico's",
            SourceKind::ZapScanReport => "ZAP Scan rapport",
            SourceKind::OwaspDependencyReport => "OWASP dependency rapport",
            SourceKind::PerformanceLoadTestReport
            | SourceKind::PerformanceEnduranceTestReport
            | SourceKind::PerformanceScalabilityTestReport => "Performancerapport",
        }
    }

    /// Whether each subject must name its own id within this source.
    pub fn needs_metric_source_id(self) -> bool {
        match self {
            SourceKind::Sonar
            | SourceKind::VersionControlSystem
            | SourceKind::TestReport
            | SourceKind::ZapScanReport
            | SourceKind::OwaspDependencyReport
            | SourceKind::PerformanceLoadTestReport
            | SourceKind::PerformanceEnduranceTestReport
            | SourceKind::PerformanceScalabilityTestReport => true,
            SourceKind::Jenkins
            | SourceKind::HolidayPlanner
            | SourceKind::TrelloActionsBoard
            | SourceKind::TrelloRiskBoard => false,
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.class_name())
    }
}

/// One configured instance of a source, e.g. a particular Jenkins server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInstance {
    pub kind: SourceKind,
    /// Unique within the project; subjects refer to it for their ids and
    /// readings are keyed by it.
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl SourceInstance {
    pub fn new(kind: SourceKind, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            url: url.into(),
        }
    }
}
