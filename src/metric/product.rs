//! Metrics about products: security scans, dependency warnings, integration
//! test coverage and performance tests.

use super::{Links, Metric, MetricDefinition, MetricKind};
use crate::domain::{SourceInstance, SourceKind, Subject};
use crate::readings::{PerformanceResults, SonarProject, SourceFacts};
use crate::template::Parameters;
use std::sync::Arc;

/// ZAP scan alerts of one risk level.
pub struct ZapScanAlerts {
    definition: MetricDefinition,
    risk_level: &'static str,
    risk_level_key: &'static str,
}

impl ZapScanAlerts {
    fn with(
        class_name: &str,
        name: &str,
        risk_level: &'static str,
        key: &'static str,
        low: f64,
    ) -> Self {
        Self {
            definition: MetricDefinition::lower_is_better(
                class_name,
                name,
                "security waarschuwingen",
            )
            .norm(
                "Het product heeft geen {risk_level} risico ZAP Scan {unit}. Meer dan \
                 {low_target} is rood.",
            )
            .template("{name} heeft {value} {risk_level} risico {unit}.")
            .targets(0.0, low)
            .sources(&[SourceKind::ZapScanReport]),
            risk_level,
            risk_level_key: key,
        }
    }

    pub fn high() -> Self {
        Self::with(
            "HighRiskZAPScanAlertsMetric",
            "Hoeveelheid ZAP Scan waarschuwingen met hoog risiconiveau",
            "hoog",
            "high",
            3.0,
        )
    }

    pub fn medium() -> Self {
        Self::with(
            "MediumRiskZAPScanAlertsMetric",
            "Hoeveelheid ZAP Scan waarschuwingen met medium risiconiveau",
            "medium",
            "medium",
            10.0,
        )
    }
}

impl MetricKind for ZapScanAlerts {
    fn definition(&self) -> &MetricDefinition {
        &self.definition
    }

    fn value(&self, metric: &Metric<'_>) -> f64 {
        let (Some(SourceFacts::ZapScanReport(zap)), Some(report)) =
            (metric.facts(), metric.metric_source_id())
        else {
            return -1.0;
        };
        zap.reports
            .get(report)
            .and_then(|alerts| alerts.count(self.risk_level_key))
            .filter(|n| *n >= 0)
            .map_or(-1.0, |n| n as f64)
    }

    fn parameters(&self, _metric: &Metric<'_>, params: &mut Parameters) {
        params.insert("risk_level", self.risk_level);
    }

    fn norm_defaults(&self, params: &mut Parameters) {
        params.insert("risk_level", self.risk_level);
    }

    fn url(&self, metric: &Metric<'_>) -> Links {
        report_links(metric)
    }
}

/// OWASP dependency-check warnings of one priority.
pub struct OwaspDependencyWarnings {
    definition: MetricDefinition,
    priority: &'static str,
    priority_key: &'static str,
}

impl OwaspDependencyWarnings {
    fn with(
        class_name: &str,
        name: &str,
        priority: &'static str,
        key: &'static str,
        low: f64,
    ) -> Self {
        Self {
            definition: MetricDefinition::lower_is_better(class_name, name, "waarschuwingen")
                .norm(
                    "Dependencies van het product hebben geen {priority} prioriteit OWASP {unit}. \
                     Meer dan {low_target} is rood.",
                )
                .template("Dependencies van {name} hebben {value} {priority} prioriteit {unit}.")
                .targets(0.0, low)
                .sources(&[SourceKind::OwaspDependencyReport]),
            priority,
            priority_key: key,
        }
    }

    pub fn high() -> Self {
        Self::with(
            "HighPriorityOWASPDependencyWarnings",
            "Hoeveelheid OWASP dependency waarschuwingen met hoge prioriteit",
            "hoge",
            "high",
            3.0,
        )
    }

    pub fn normal() -> Self {
        Self::with(
            "NormalPriorityOWASPDependencyWarnings",
            "Hoeveelheid OWASP dependency waarschuwingen met normale prioriteit",
            "normale",
            "normal",
            10.0,
        )
    }
}

impl MetricKind for OwaspDependencyWarnings {
    fn definition(&self) -> &MetricDefinition {
        &self.definition
    }

    fn value(&self, metric: &Metric<'_>) -> f64 {
        let (Some(SourceFacts::OwaspDependencyReport(owasp)), Some(job)) =
            (metric.facts(), metric.metric_source_id())
        else {
            return -1.0;
        };
        owasp
            .jobs
            .get(job)
            .and_then(|warnings| warnings.count(self.priority_key))
            .filter(|n| *n >= 0)
            .map_or(-1.0, |n| n as f64)
    }

    fn parameters(&self, _metric: &Metric<'_>, params: &mut Parameters) {
        params.insert("priority", self.priority);
    }

    fn norm_defaults(&self, params: &mut Parameters) {
        params.insert("priority", self.priority);
    }

    fn url(&self, metric: &Metric<'_>) -> Links {
        metric.source_links()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    Line,
    Branch,
}

/// Sonar coverage of a product's integration tests. Only used for products
/// that have integration tests but no unit tests; otherwise combined
/// coverage applies.
pub struct IntegrationTestCoverage {
    definition: MetricDefinition,
    coverage: Coverage,
}

impl IntegrationTestCoverage {
    pub fn line() -> Self {
        Self {
            definition: MetricDefinition::higher_percentage_is_better(
                "IntegrationtestLineCoverage",
                "Integratietest broncode dekking (line coverage)",
            )
            .norm(
                "Minimaal {target}{unit} van de regels code wordt gedekt door integratietests. \
                 Lager dan {low_target}{unit} is rood.",
            )
            .template("{name} integratietest line coverage is {value:.0f}{unit}.")
            .targets(98.0, 90.0)
            .sources(&[SourceKind::Sonar]),
            coverage: Coverage::Line,
        }
    }

    pub fn branch() -> Self {
        Self {
            definition: MetricDefinition::higher_percentage_is_better(
                "IntegrationtestBranchCoverage",
                "Integratietest broncode dekking (branch coverage)",
            )
            .norm(
                "Minimaal {target}{unit} van de code branches wordt gedekt door \
                 integratietests. Lager dan {low_target}{unit} is rood.",
            )
            .template("{name} integratietest branch coverage is {value:.0f}{unit}.")
            .targets(80.0, 60.0)
            .sources(&[SourceKind::Sonar]),
            coverage: Coverage::Branch,
        }
    }

    fn measure(&self, project: &SonarProject) -> Option<f64> {
        match self.coverage {
            Coverage::Line => project.integration_test_line_coverage,
            Coverage::Branch => project.integration_test_branch_coverage,
        }
    }
}

impl MetricKind for IntegrationTestCoverage {
    fn definition(&self) -> &MetricDefinition {
        &self.definition
    }

    fn value(&self, metric: &Metric<'_>) -> f64 {
        let (Some(SourceFacts::Sonar(sonar)), Some(key)) =
            (metric.facts(), metric.metric_source_id())
        else {
            return -1.0;
        };
        sonar
            .projects
            .get(key)
            .and_then(|p| self.measure(p))
            .map_or(-1.0, f64::round)
    }

    fn url(&self, metric: &Metric<'_>) -> Links {
        metric.source_links()
    }

    /// The Sonar id belongs to the integration test component.
    fn metric_source_id<'s>(
        &self,
        subject: &Subject<'s>,
        instance: &SourceInstance,
    ) -> Option<&'s str> {
        subject
            .as_product()?
            .integration_tests()?
            .metric_source_id(&instance.name)
    }

    fn is_applicable(&self, subject: &Subject<'_>) -> bool {
        subject
            .as_product()
            .is_some_and(|p| p.integration_tests().is_some() && p.unittests().is_none())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceTest {
    Load,
    Endurance,
    Scalability,
}

impl PerformanceTest {
    fn source_kind(self) -> SourceKind {
        match self {
            PerformanceTest::Load => SourceKind::PerformanceLoadTestReport,
            PerformanceTest::Endurance => SourceKind::PerformanceEnduranceTestReport,
            PerformanceTest::Scalability => SourceKind::PerformanceScalabilityTestReport,
        }
    }

    fn class_prefix(self) -> &'static str {
        match self {
            PerformanceTest::Load => "PerformanceLoadTest",
            PerformanceTest::Endurance => "PerformanceEnduranceTest",
            PerformanceTest::Scalability => "PerformanceScalabilityTest",
        }
    }

    fn unit(self) -> &'static str {
        match self {
            PerformanceTest::Load => "performanceloadtestqueries",
            PerformanceTest::Endurance => "performanceduurtestqueries",
            PerformanceTest::Scalability => "performanceschaalbaarheidstestqueries",
        }
    }

    fn label(self) -> &'static str {
        match self {
            PerformanceTest::Load => "performanceloadtest",
            PerformanceTest::Endurance => "performanceduurtest",
            PerformanceTest::Scalability => "performanceschaalbaarheidstest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// Queries slower than the wished response time.
    Warnings,
    /// Queries slower than the maximum response time.
    Errors,
}

/// Performance test queries that exceed a response time limit.
pub struct PerformanceViolations {
    definition: MetricDefinition,
    test: PerformanceTest,
    violation: Violation,
}

impl PerformanceViolations {
    pub fn new(test: PerformanceTest, violation: Violation) -> Self {
        let (suffix, level, low) = match violation {
            Violation::Warnings => ("Warnings", "gewenste responsetijd", 5.0),
            Violation::Errors => ("Errors", "maximale responsetijd", 0.0),
        };
        let definition = MetricDefinition::lower_is_better(
            format!("{}{}", test.class_prefix(), suffix),
            format!(
                "Hoeveelheid {} queries die de {} overschrijden",
                test.label(),
                level
            ),
            test.unit(),
        )
        .norm(format!(
            "Het product heeft geen {{unit}} die de {level} overschrijden. Meer dan \
             {{low_target}} {{unit}} die de {level} overschrijden is rood.",
            level = level
        ))
        .template(format!(
            "{{value}} van de {{total}} {{unit}} van {{name}} overschrijden de {}.",
            level
        ))
        .targets(0.0, low)
        .sources(&[test.source_kind()]);
        Self {
            definition,
            test,
            violation,
        }
    }

    fn results<'m>(metric: &Metric<'m>) -> Option<&'m PerformanceResults> {
        let SourceFacts::PerformanceReport(facts) = metric.facts()? else {
            return None;
        };
        facts.reports.get(metric.metric_source_id()?)
    }

    fn violating(&self, results: &PerformanceResults) -> Option<i64> {
        match self.violation {
            Violation::Warnings => results.queries_violating_wished_responsetime,
            Violation::Errors => results.queries_violating_max_responsetime,
        }
    }
}

impl MetricKind for PerformanceViolations {
    fn definition(&self) -> &MetricDefinition {
        &self.definition
    }

    fn value(&self, metric: &Metric<'_>) -> f64 {
        Self::results(metric)
            .filter(|r| r.queries.is_some_and(|q| q >= 0))
            .and_then(|r| self.violating(r))
            .filter(|n| *n >= 0)
            .map_or(-1.0, |n| n as f64)
    }

    fn parameters(&self, metric: &Metric<'_>, params: &mut Parameters) {
        let total = Self::results(metric)
            .and_then(|r| r.queries)
            .unwrap_or(-1);
        params.insert("total", total);
    }

    fn url(&self, metric: &Metric<'_>) -> Links {
        let Some(results) = Self::results(metric) else {
            return Links::new();
        };
        let label = self.test.source_kind().display_name();
        let count = results.urls.len();
        results
            .urls
            .iter()
            .enumerate()
            .map(|(i, url)| {
                let key = if count > 1 {
                    format!("{} ({}/{})", label, i + 1, count)
                } else {
                    label.to_string()
                };
                (key, url.clone())
            })
            .collect()
    }
}

/// Links to the reports named by the subject's id.
fn report_links(metric: &Metric<'_>) -> Links {
    let mut links = Links::new();
    if let (Some(instance), Some(id)) = (metric.metric_source(), metric.metric_source_id()) {
        links.insert(instance.kind.display_name().to_string(), id.to_string());
    }
    links
}

pub fn kinds() -> Vec<Arc<dyn MetricKind>> {
    let mut kinds: Vec<Arc<dyn MetricKind>> = vec![
        Arc::new(ZapScanAlerts::high()),
        Arc::new(ZapScanAlerts::medium()),
        Arc::new(OwaspDependencyWarnings::high()),
        Arc::new(OwaspDependencyWarnings::normal()),
        Arc::new(IntegrationTestCoverage::line()),
        Arc::new(IntegrationTestCoverage::branch()),
    ];
    for test in [
        PerformanceTest::Load,
        PerformanceTest::Endurance,
        PerformanceTest::Scalability,
    ] {
        for violation in [Violation::Warnings, Violation::Errors] {
            kinds.push(Arc::new(PerformanceViolations::new(test, violation)));
        }
    }
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Product, Project};
    use crate::history::HistoryLog;
    use crate::metric::{default_norm, Context};
    use crate::readings::{
        OwaspDependencyFacts, OwaspWarnings, PerformanceFacts, Readings, SonarFacts,
        SourceReading, ZapAlerts, ZapScanFacts,
    };
    use crate::status::Status;

    fn project_with(kind: SourceKind, instance: &str) -> Project {
        Project::new("Organization", "Project").with_metric_source(SourceInstance::new(
            kind,
            instance,
            format!("http://{}", instance),
        ))
    }

    #[test]
    fn zap_alerts_per_risk_level() {
        let project = project_with(SourceKind::ZapScanReport, "zap");
        let mut facts = ZapScanFacts::default();
        facts.reports.insert(
            "http://zap/report".into(),
            ZapAlerts {
                high: Some(2),
                medium: Some(4),
                low: None,
            },
        );
        let readings =
            Readings::default().with("zap", SourceReading::new(SourceFacts::ZapScanReport(facts)));
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history);
        let product = Product::new("FakeSubject").with_metric_source_id("zap", "http://zap/report");

        let high = ZapScanAlerts::high();
        let metric = Metric::new(&high, Subject::Product(&product), &ctx);
        assert_eq!(metric.value(), 2.0);
        assert_eq!(metric.status(), Status::Yellow);
        assert_eq!(
            metric.report().unwrap(),
            "FakeSubject heeft 2 hoog risico security waarschuwingen."
        );
        assert_eq!(
            metric.url().get("ZAP Scan rapport").map(String::as_str),
            Some("http://zap/report")
        );

        let medium = ZapScanAlerts::medium();
        let metric = Metric::new(&medium, Subject::Product(&product), &ctx);
        assert_eq!(metric.value(), 4.0);
        assert_eq!(metric.status(), Status::Yellow);
    }

    #[test]
    fn zap_norm_uses_risk_level() {
        assert_eq!(
            default_norm(&ZapScanAlerts::high()).unwrap(),
            "Het product heeft geen hoog risico ZAP Scan security waarschuwingen. Meer dan 3 is \
             rood."
        );
    }

    #[test]
    fn zap_without_report_id_is_missing_source() {
        let project = project_with(SourceKind::ZapScanReport, "zap");
        let readings = Readings::default();
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history);
        let product = Product::new("FakeSubject");
        let kind = ZapScanAlerts::high();
        let metric = Metric::new(&kind, Subject::Product(&product), &ctx);
        assert_eq!(metric.status(), Status::MissingSource);
        assert!(metric
            .report()
            .unwrap()
            .ends_with("Configureer ids voor de volgende bronnen: ZAPScanReport."));
    }

    #[test]
    fn owasp_warnings_per_priority() {
        let project = project_with(SourceKind::OwaspDependencyReport, "owasp");
        let mut facts = OwaspDependencyFacts::default();
        facts.jobs.insert(
            "product-owasp".into(),
            OwaspWarnings {
                high: Some(0),
                normal: Some(12),
                low: Some(1),
            },
        );
        let readings = Readings::default().with(
            "owasp",
            SourceReading::new(SourceFacts::OwaspDependencyReport(facts)),
        );
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history);
        let product = Product::new("Product").with_metric_source_id("owasp", "product-owasp");

        let high = OwaspDependencyWarnings::high();
        let metric = Metric::new(&high, Subject::Product(&product), &ctx);
        assert_eq!(metric.status(), Status::Perfect);

        let normal = OwaspDependencyWarnings::normal();
        let metric = Metric::new(&normal, Subject::Product(&product), &ctx);
        assert_eq!(metric.status(), Status::Red);
        assert_eq!(
            metric.report().unwrap(),
            "Dependencies van Product hebben 12 normale prioriteit waarschuwingen."
        );
    }

    fn coverage_readings(line: Option<f64>) -> Readings {
        let mut facts = SonarFacts::default();
        facts.projects.insert(
            "nl.product:it".into(),
            SonarProject {
                integration_test_line_coverage: line,
                integration_test_branch_coverage: Some(70.0),
            },
        );
        Readings::default().with("sonar", SourceReading::new(SourceFacts::Sonar(facts)))
    }

    fn product_with_integration_tests() -> Product {
        Product::new("Product").with_integration_tests(
            Product::new("Product IT").with_metric_source_id("sonar", "nl.product:it"),
        )
    }

    #[test]
    fn integration_test_coverage_uses_component_id() {
        let project = project_with(SourceKind::Sonar, "sonar");
        let readings = coverage_readings(Some(94.6));
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history);
        let product = product_with_integration_tests();

        let line = IntegrationTestCoverage::line();
        let metric = Metric::new(&line, Subject::Product(&product), &ctx);
        assert_eq!(metric.metric_source_id(), Some("nl.product:it"));
        assert_eq!(metric.value(), 95.0);
        assert_eq!(metric.status(), Status::Yellow);
        assert_eq!(
            metric.report().unwrap(),
            "Product integratietest line coverage is 95%."
        );
        assert_eq!(metric.y_axis_range(), (0.0, 100.0));

        let branch = IntegrationTestCoverage::branch();
        let metric = Metric::new(&branch, Subject::Product(&product), &ctx);
        assert_eq!(metric.status(), Status::Yellow);
    }

    #[test]
    fn unknown_coverage_is_missing() {
        let project = project_with(SourceKind::Sonar, "sonar");
        let readings = coverage_readings(None);
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history);
        let product = product_with_integration_tests();
        let line = IntegrationTestCoverage::line();
        let metric = Metric::new(&line, Subject::Product(&product), &ctx);
        assert_eq!(metric.status(), Status::Missing);
    }

    #[test]
    fn integration_coverage_applicability() {
        let kind = IntegrationTestCoverage::line();
        let only_it = product_with_integration_tests();
        let both = product_with_integration_tests().with_unittests(Product::new("Product UT"));
        assert!(kind.is_applicable(&Subject::Product(&only_it)));
        assert!(!kind.is_applicable(&Subject::Product(&both)));
        assert!(!kind.is_applicable(&Subject::Product(&Product::new("Plain"))));
    }

    fn performance_readings(violations: i64) -> Readings {
        let mut facts = PerformanceFacts::default();
        facts.reports.insert(
            "performance report id".into(),
            PerformanceResults {
                queries: Some(10),
                queries_violating_max_responsetime: Some(violations),
                queries_violating_wished_responsetime: Some(violations),
                urls: vec!["http://report1".into(), "http://report2".into()],
            },
        );
        Readings::default().with(
            "perf",
            SourceReading::new(SourceFacts::PerformanceReport(facts)),
        )
    }

    #[test]
    fn performance_violations() {
        let readings = performance_readings(4);
        let history = HistoryLog::new();
        for test in [
            PerformanceTest::Load,
            PerformanceTest::Endurance,
            PerformanceTest::Scalability,
        ] {
            let project = project_with(test.source_kind(), "perf");
            let ctx = Context::new(&project, &readings, &history);
            let product =
                Product::new("FakeSubject").with_metric_source_id("perf", "performance report id");
            for (violation, expected, level) in [
                (Violation::Warnings, Status::Yellow, "gewenste responsetijd"),
                (Violation::Errors, Status::Red, "maximale responsetijd"),
            ] {
                let kind = PerformanceViolations::new(test, violation);
                let metric = Metric::new(&kind, Subject::Product(&product), &ctx);
                assert_eq!(metric.value(), 4.0);
                assert_eq!(metric.status(), expected);
                assert_eq!(
                    metric.report().unwrap(),
                    format!(
                        "4 van de 10 {} van FakeSubject overschrijden de {}.",
                        test.unit(),
                        level
                    )
                );
                let urls = metric.url();
                assert_eq!(
                    urls.get("Performancerapport (1/2)").map(String::as_str),
                    Some("http://report1")
                );
                assert_eq!(
                    urls.get("Performancerapport (2/2)").map(String::as_str),
                    Some("http://report2")
                );
            }
        }
    }

    #[test]
    fn performance_norm_with_defaults() {
        let kind = PerformanceViolations::new(PerformanceTest::Load, Violation::Warnings);
        assert_eq!(
            default_norm(&kind).unwrap(),
            "Het product heeft geen performanceloadtestqueries die de gewenste responsetijd \
             overschrijden. Meer dan 5 performanceloadtestqueries die de gewenste responsetijd \
             overschrijden is rood."
        );
    }

    #[test]
    fn missing_performance_report() {
        let project = project_with(SourceKind::PerformanceLoadTestReport, "perf");
        let readings = performance_readings(-1);
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history);
        let product =
            Product::new("FakeSubject").with_metric_source_id("perf", "performance report id");
        let kind = PerformanceViolations::new(PerformanceTest::Load, Violation::Errors);
        let metric = Metric::new(&kind, Subject::Product(&product), &ctx);
        assert!(metric
            .report()
            .unwrap()
            .ends_with("kon niet gemeten worden omdat niet alle benodigde bronnen beschikbaar zijn."));
    }
}
