//! Metrics about teams.

use super::{Links, Metric, MetricDefinition, MetricKind, Scope};
use crate::domain::{SourceKind, Subject};
use crate::readings::{Absence, SourceFacts};
use crate::template::Parameters;
use std::sync::Arc;

/// Longest run of working days during which several team members are
/// planned to be absent at the same time.
pub struct TeamAbsence {
    definition: MetricDefinition,
}

impl Default for TeamAbsence {
    fn default() -> Self {
        Self::new()
    }
}

impl TeamAbsence {
    pub fn new() -> Self {
        Self {
            definition: MetricDefinition::lower_is_better("TeamAbsence", "Absentie", "werkdagen")
                .norm(
                    "Het aantal aaneengesloten {unit} dat meerdere teamleden tegelijk gepland \
                     afwezig zijn is lager dan {target} {unit}. Meer dan {low_target} {unit} is \
                     rood. Het team bestaat uit {team}.",
                )
                .template(
                    "De langste periode dat meerdere teamleden tegelijk gepland afwezig zijn is \
                     {value} {unit} ({start} tot en met {end}). Afwezig zijn: {absentees}.",
                )
                .perfect_template("Er zijn geen teamleden tegelijk gepland afwezig.")
                .targets(5.0, 10.0)
                .sources(&[SourceKind::HolidayPlanner])
                .scope(Scope::Team),
        }
    }

    /// `None` when the planner could not be read. A team the planner knows
    /// nothing about has no overlapping absence.
    fn absence(metric: &Metric<'_>) -> Option<Absence> {
        let SourceFacts::HolidayPlanner(planner) = metric.facts()? else {
            return None;
        };
        let team = metric.subject().as_team()?;
        Some(planner.teams.get(team.name()).cloned().unwrap_or_default())
    }
}

impl MetricKind for TeamAbsence {
    fn definition(&self) -> &MetricDefinition {
        &self.definition
    }

    fn value(&self, metric: &Metric<'_>) -> f64 {
        Self::absence(metric).map_or(-1.0, |a| f64::from(a.days))
    }

    fn parameters(&self, metric: &Metric<'_>, params: &mut Parameters) {
        if let Some(team) = metric.subject().as_team() {
            let members: Vec<&str> = team.members().iter().map(|p| p.name()).collect();
            params.insert("team", members.join(", "));
        }
        let absence = Self::absence(metric).unwrap_or_default();
        let date = |d: Option<chrono::NaiveDate>| {
            d.map_or_else(|| "onbekend".to_string(), |d| d.to_string())
        };
        params.insert("start", date(absence.start));
        params.insert("end", date(absence.end));
        let mut absentees = absence.absentees;
        absentees.sort();
        if absentees.is_empty() {
            params.insert("absentees", "niemand");
        } else {
            params.insert("absentees", absentees.join(", "));
        }
    }

    fn norm_defaults(&self, params: &mut Parameters) {
        params.insert("team", "(Lijst van teamleden)");
    }

    fn url(&self, metric: &Metric<'_>) -> Links {
        metric.source_links()
    }

    fn is_applicable(&self, subject: &Subject<'_>) -> bool {
        subject.as_team().is_some_and(|t| t.members().len() > 1)
    }
}

pub fn kinds() -> Vec<Arc<dyn MetricKind>> {
    vec![Arc::new(TeamAbsence::new())]
}
