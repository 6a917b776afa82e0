//! Project management metrics kept on Trello boards.

use super::{Links, Metric, MetricDefinition, MetricKind, Scope};
use crate::domain::SourceKind;
use crate::readings::{SourceFacts, TrelloBoardFacts};
use std::sync::Arc;

fn board<'m>(metric: &Metric<'m>) -> Option<&'m TrelloBoardFacts> {
    match metric.facts()? {
        SourceFacts::TrelloBoard(facts) => Some(facts),
        _ => None,
    }
}

/// Whole days since the board was last updated, `-1` when unknown.
fn days_since_update(metric: &Metric<'_>) -> f64 {
    board(metric)
        .and_then(|b| b.last_update)
        .map_or(-1.0, |updated| {
            (metric.context().now - updated).num_days().max(0) as f64
        })
}

/// Days since the risk log was last updated.
pub struct RiskLog {
    definition: MetricDefinition,
}

impl Default for RiskLog {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskLog {
    pub fn new() -> Self {
        Self {
            definition: MetricDefinition::lower_is_better(
                "RiskLog",
                "Hoeveelheid dagen sinds laatste update van het risicolog",
                "dagen",
            )
            .norm(
                "Het risicolog wordt minimaal een keer per {target} {unit} bijgewerkt. Langer \
                 dan {low_target} {unit} niet bijgewerkt is rood.",
            )
            .template("Het risicolog is {value} {unit} geleden bijgewerkt.")
            .targets(14.0, 28.0)
            .sources(&[SourceKind::TrelloRiskBoard])
            .scope(Scope::Project),
        }
    }
}

impl MetricKind for RiskLog {
    fn definition(&self) -> &MetricDefinition {
        &self.definition
    }

    fn value(&self, metric: &Metric<'_>) -> f64 {
        days_since_update(metric)
    }

    fn url(&self, metric: &Metric<'_>) -> Links {
        metric.source_links()
    }
}

/// Days since anything happened on the action list.
pub struct ActionActivity {
    definition: MetricDefinition,
}

impl Default for ActionActivity {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionActivity {
    pub fn new() -> Self {
        Self {
            definition: MetricDefinition::lower_is_better(
                "ActionActivity",
                "Hoeveelheid dagen sinds laatste update van de actielijst",
                "dagen",
            )
            .norm(
                "De actielijst wordt minimaal een keer per {target} {unit} bijgewerkt. Langer \
                 dan {low_target} {unit} niet bijgewerkt is rood.",
            )
            .template("De actielijst is {value} {unit} geleden bijgewerkt.")
            .targets(3.0, 10.0)
            .sources(&[SourceKind::TrelloActionsBoard])
            .scope(Scope::Project),
        }
    }
}

impl MetricKind for ActionActivity {
    fn definition(&self) -> &MetricDefinition {
        &self.definition
    }

    fn value(&self, metric: &Metric<'_>) -> f64 {
        days_since_update(metric)
    }

    fn url(&self, metric: &Metric<'_>) -> Links {
        metric.source_links()
    }
}

/// Actions that are over due or were not updated for too long.
pub struct ActionAge {
    definition: MetricDefinition,
}

impl Default for ActionAge {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionAge {
    pub fn new() -> Self {
        Self {
            definition: MetricDefinition::lower_is_better(
                "ActionAge",
                "Hoeveelheid verlopen of inactieve acties",
                "acties",
            )
            .norm(
                "Geen van de {unit} is te laat of langer dan 14 dagen niet bijgewerkt. Meer dan \
                 {low_target} {unit} is rood.",
            )
            .template(
                "{value} {unit} uit de actielijst zijn te laat of te lang (14 dagen) niet \
                 bijgewerkt.",
            )
            .url_label("Verlopen of inactieve acties")
            .targets(0.0, 3.0)
            .sources(&[SourceKind::TrelloActionsBoard])
            .scope(Scope::Project),
        }
    }
}

impl MetricKind for ActionAge {
    fn definition(&self) -> &MetricDefinition {
        &self.definition
    }

    fn value(&self, metric: &Metric<'_>) -> f64 {
        board(metric)
            .and_then(|b| b.over_due_or_inactive_cards.as_ref())
            .map_or(-1.0, |cards| cards.len() as f64)
    }

    /// The cards themselves, or the board when they could not be listed.
    fn url(&self, metric: &Metric<'_>) -> Links {
        match board(metric).and_then(|b| b.over_due_or_inactive_cards.as_ref()) {
            Some(cards) => cards.clone(),
            None => metric.source_links(),
        }
    }
}

pub fn kinds() -> Vec<Arc<dyn MetricKind>> {
    vec![
        Arc::new(RiskLog::new()),
        Arc::new(ActionActivity::new()),
        Arc::new(ActionAge::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Project, SourceInstance, Subject};
    use crate::history::HistoryLog;
    use crate::metric::Context;
    use crate::readings::{Readings, SourceReading};
    use crate::requirement::Requirement;
    use crate::status::Status;
    use chrono::{DateTime, Duration, Local, TimeZone};
    use std::collections::BTreeMap;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap()
    }

    fn project(kind: SourceKind, requirement: Requirement) -> Project {
        Project::new("Organization", "Project")
            .with_requirement(requirement)
            .with_metric_source(SourceInstance::new(kind, "board", "http://trello/board"))
    }

    fn readings(facts: TrelloBoardFacts) -> Readings {
        Readings::default().with(
            "board",
            SourceReading::new(SourceFacts::TrelloBoard(facts)).measured_at(now()),
        )
    }

    fn active_board() -> TrelloBoardFacts {
        let cards: BTreeMap<String, String> = [
            ("Some card", "http://trello/some_card"),
            ("Some other card", "http://trello/other_card"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        TrelloBoardFacts {
            last_update: Some(now() - Duration::minutes(1)),
            over_due_or_inactive_cards: Some(cards),
        }
    }

    #[test]
    fn risk_log_updated_today() {
        let project = project(SourceKind::TrelloRiskBoard, Requirement::TrackRisks);
        let readings = readings(active_board());
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history).at(now());
        let kind = RiskLog::new();
        let metric = Metric::new(&kind, Subject::Project(&project), &ctx);
        assert_eq!(metric.value(), 0.0);
        assert_eq!(metric.status(), Status::Perfect);
        assert_eq!(
            metric.url().get("Trello risico's").map(String::as_str),
            Some("http://trello/board")
        );
        assert!(kind.should_be_measured(&project));
    }

    #[test]
    fn risk_log_without_source_is_missing() {
        let project = Project::new("Organization", "Project").with_requirement(Requirement::TrackRisks);
        let readings = Readings::default();
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history);
        let kind = RiskLog::new();
        let metric = Metric::new(&kind, Subject::Project(&project), &ctx);
        assert_eq!(metric.value(), -1.0);
        assert_eq!(metric.status(), Status::MissingSource);
    }

    #[test]
    fn stale_action_list() {
        let project = project(SourceKind::TrelloActionsBoard, Requirement::TrackActions);
        let readings = readings(TrelloBoardFacts {
            last_update: Some(now() - Duration::days(12)),
            over_due_or_inactive_cards: None,
        });
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history).at(now());
        let kind = ActionActivity::new();
        let metric = Metric::new(&kind, Subject::Project(&project), &ctx);
        assert_eq!(metric.value(), 12.0);
        assert_eq!(metric.status(), Status::Red);
        assert_eq!(
            metric.report().unwrap(),
            "De actielijst is 12 dagen geleden bijgewerkt."
        );
    }

    #[test]
    fn action_age_lists_cards() {
        let project = project(SourceKind::TrelloActionsBoard, Requirement::TrackActions);
        let readings = readings(active_board());
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history).at(now());
        let kind = ActionAge::new();
        let metric = Metric::new(&kind, Subject::Project(&project), &ctx);
        assert_eq!(metric.value(), 2.0);
        assert_eq!(metric.status(), Status::Yellow);
        assert_eq!(metric.url().len(), 2);
        assert!(metric.url_label().is_some());
        assert!(kind.should_be_measured(&project));
    }

    #[test]
    fn unreachable_board() {
        let project = project(SourceKind::TrelloActionsBoard, Requirement::TrackActions);
        let readings = readings(TrelloBoardFacts::default());
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history).at(now());
        let kind = ActionAge::new();
        let metric = Metric::new(&kind, Subject::Project(&project), &ctx);
        assert_eq!(metric.value(), -1.0);
        assert_eq!(metric.status(), Status::Missing);
        assert_eq!(
            metric.url().get("Trello acties").map(String::as_str),
            Some("http://trello/board")
        );
        let activity = ActionActivity::new();
        let metric = Metric::new(&activity, Subject::Project(&project), &ctx);
        assert_eq!(metric.value(), -1.0);
    }
}
