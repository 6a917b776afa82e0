use crate::dashboard::models::{DashboardAlert, DashboardSnapshot, MetricRow, OverviewMetrics};
use crate::metric::Metric;
use crate::status::Status;
use crate::template::TemplateError;

const MAX_ALERTS: usize = 120;

/// Evaluate a metric into a dashboard row.
pub fn evaluate(metric: &Metric<'_>) -> Result<MetricRow, TemplateError> {
    let status = metric.status();
    let row = MetricRow {
        id: metric.id_string(),
        stable_id: metric.stable_id(),
        class_name: metric.definition().class_name.clone(),
        name: metric.name().to_string(),
        subject: metric.subject().name(),
        status,
        value: metric.value(),
        numerical_value: metric.numerical_value(),
        unit: metric.unit().to_string(),
        report: metric.report()?,
        norm: metric.norm()?,
        comment: metric.comment(),
        urls: metric.url(),
        url_label: metric.url_label().map(str::to_string),
        comment_urls: metric.comment_urls(),
        comment_url_label: metric.comment_url_label().map(str::to_string),
        target: metric.target(),
        low_target: metric.low_target(),
        status_start: metric.status_start_date(),
        y_axis_range: metric.y_axis_range(),
    };
    log::debug!("{}: {} ({})", row.stable_id, row.status, row.value);
    Ok(row)
}

pub fn build_snapshot(project: &str, mut rows: Vec<MetricRow>) -> DashboardSnapshot {
    let mut overview = OverviewMetrics::default();
    for row in &rows {
        overview.record(row.status);
    }

    rows.sort_by(|a, b| {
        b.status
            .severity()
            .cmp(&a.status.severity())
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.subject.cmp(&b.subject))
    });

    let mut alerts = build_alerts(&rows);
    alerts.sort_by(|a, b| {
        severity_rank(&b.severity)
            .cmp(&severity_rank(&a.severity))
            .then_with(|| a.title.cmp(&b.title))
    });
    alerts.truncate(MAX_ALERTS);

    DashboardSnapshot {
        generated_at_epoch_secs: chrono::Utc::now().timestamp(),
        project: project.to_string(),
        overview,
        alerts,
        rows,
    }
}

fn build_alerts(rows: &[MetricRow]) -> Vec<DashboardAlert> {
    let mut alerts: Vec<DashboardAlert> = rows
        .iter()
        .filter(|r| r.status == Status::Red)
        .map(|r| DashboardAlert {
            severity: "high".to_string(),
            title: format!("{} ({})", r.name, r.subject),
            detail: r.report.clone(),
            metric: Some(r.id.clone()),
        })
        .collect();

    let unconfigured = rows
        .iter()
        .filter(|r| r.status == Status::MissingSource)
        .count();
    if unconfigured > 0 {
        alerts.push(DashboardAlert {
            severity: "warn".to_string(),
            title: "Metric sources not configured".to_string(),
            detail: format!(
                "{} metric(s) lack a source or source id in the project configuration",
                unconfigured
            ),
            metric: None,
        });
    }

    let unmeasured = rows
        .iter()
        .filter(|r| r.status == Status::Missing)
        .count();
    if unmeasured > 0 {
        alerts.push(DashboardAlert {
            severity: "info".to_string(),
            title: "Measurements unavailable".to_string(),
            detail: format!("{} metric(s) have no data in the readings", unmeasured),
            metric: None,
        });
    }

    alerts
}

fn severity_rank(severity: &str) -> u8 {
    match severity {
        "high" => 3,
        "warn" => 2,
        "info" => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric::Links;

    fn row(name: &str, status: Status) -> MetricRow {
        MetricRow {
            id: name.to_string(),
            stable_id: name.to_string(),
            class_name: name.to_string(),
            name: name.to_string(),
            subject: "Product".to_string(),
            status,
            value: 1.0,
            numerical_value: 1.0,
            unit: "x".to_string(),
            report: format!("{} report", name),
            norm: String::new(),
            comment: String::new(),
            urls: Links::new(),
            url_label: None,
            comment_urls: Links::new(),
            comment_url_label: None,
            target: 0.0,
            low_target: 0.0,
            status_start: None,
            y_axis_range: (0.0, 100.0),
        }
    }

    #[test]
    fn rows_sorted_by_severity_then_name() {
        let snapshot = build_snapshot(
            "Project",
            vec![
                row("b", Status::Green),
                row("z", Status::Red),
                row("a", Status::Green),
                row("m", Status::Missing),
            ],
        );
        let names: Vec<&str> = snapshot.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["z", "m", "a", "b"]);
        assert_eq!(snapshot.overview.total_metrics, 4);
        assert_eq!(snapshot.overview.green, 2);
    }

    #[test]
    fn alerts_for_red_and_missing() {
        let snapshot = build_snapshot(
            "Project",
            vec![
                row("red", Status::Red),
                row("gone", Status::MissingSource),
                row("nodata", Status::Missing),
                row("fine", Status::Perfect),
            ],
        );
        let severities: Vec<&str> = snapshot.alerts.iter().map(|a| a.severity.as_str()).collect();
        assert_eq!(severities, vec!["high", "warn", "info"]);
        assert_eq!(snapshot.alerts[0].detail, "red report");
        assert_eq!(snapshot.alerts[0].metric.as_deref(), Some("red"));
        assert!(snapshot.has_red());
    }

    #[test]
    fn empty_dashboard_has_no_alerts() {
        let snapshot = build_snapshot("Project", Vec::new());
        assert!(snapshot.alerts.is_empty());
        assert_eq!(snapshot.overview, OverviewMetrics::default());
    }
}
