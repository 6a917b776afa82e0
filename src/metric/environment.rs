//! Metrics about the development environment.

use super::{Links, Metric, MetricDefinition, MetricKind, Scope};
use crate::domain::SourceKind;
use crate::readings::{JenkinsFacts, SourceFacts};
use crate::template::Parameters;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiJobSelection {
    /// Last build failed and nothing succeeded in the past day.
    Failing,
    /// No builds in the past six months.
    Unused,
}

/// Number of active CI jobs that fail or are never used.
pub struct CiJobs {
    definition: MetricDefinition,
    selection: CiJobSelection,
}

impl CiJobs {
    pub fn failing() -> Self {
        Self {
            definition: MetricDefinition::lower_is_better(
                "FailingCIJobs",
                "Hoeveelheid falende CI-jobs",
                "CI-jobs",
            )
            .norm(
                "Maximaal {target} van de actieve {unit} faalt. Meer dan {low_target} {unit} is \
                 rood. Een CI-job faalt als de laatste bouwpoging niet is geslaagd en er de \
                 afgelopen 24 uur geen geslaagde bouwpogingen zijn geweest. Inactieve jobs \
                 worden genegeerd.",
            )
            .template("{value} van de {number_of_jobs} actieve {unit} faalt.")
            .url_label("Falende jobs")
            .targets(0.0, 2.0)
            .sources(&[SourceKind::Jenkins])
            .scope(Scope::Project),
            selection: CiJobSelection::Failing,
        }
    }

    pub fn unused() -> Self {
        Self {
            definition: MetricDefinition::lower_is_better(
                "UnusedCIJobs",
                "Hoeveelheid ongebruikte CI-jobs",
                "CI-jobs",
            )
            .norm(
                "Maximaal {target} van de actieve {unit} is ongebruikt. Meer dan {low_target} \
                 {unit} is rood. Een CI-job is ongebruikt als er de afgelopen 6 maanden geen \
                 bouwpogingen zijn geweest. Inactieve {unit} worden genegeerd.",
            )
            .template("{value} van de {number_of_jobs} actieve {unit} is ongebruikt.")
            .url_label("Ongebruikte jobs")
            .targets(0.0, 2.0)
            .sources(&[SourceKind::Jenkins])
            .scope(Scope::Project),
            selection: CiJobSelection::Unused,
        }
    }

    fn jenkins<'m>(metric: &Metric<'m>) -> Option<&'m JenkinsFacts> {
        match metric.facts()? {
            SourceFacts::Jenkins(facts) => Some(facts),
            _ => None,
        }
    }

    fn jobs<'m>(&self, metric: &Metric<'m>) -> Option<&'m BTreeMap<String, String>> {
        let facts = Self::jenkins(metric)?;
        match self.selection {
            CiJobSelection::Failing => facts.failing_jobs.as_ref(),
            CiJobSelection::Unused => facts.unused_jobs.as_ref(),
        }
    }
}

impl MetricKind for CiJobs {
    fn definition(&self) -> &MetricDefinition {
        &self.definition
    }

    fn value(&self, metric: &Metric<'_>) -> f64 {
        self.jobs(metric).map_or(-1.0, |jobs| jobs.len() as f64)
    }

    fn parameters(&self, metric: &Metric<'_>, params: &mut Parameters) {
        let active = Self::jenkins(metric)
            .and_then(|facts| facts.active_jobs)
            .map_or(-1.0, f64::from);
        params.insert("number_of_jobs", active);
    }

    fn url(&self, metric: &Metric<'_>) -> Links {
        self.jobs(metric).cloned().unwrap_or_default()
    }
}

pub fn kinds() -> Vec<Arc<dyn MetricKind>> {
    vec![Arc::new(CiJobs::failing()), Arc::new(CiJobs::unused())]
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

    fn project() -> Project {
        Project::new("Organization", "Project")
            .with_requirement(Requirement::TrackCiJobs)
            .with_metric_source(SourceInstance::new(SourceKind::Jenkins, "jenkins", "http://jenkins"))
    }

    fn readings(failing: Option<usize>) -> Readings {
        let failing_jobs = failing.map(|n| {
            (0..n)
                .map(|i| (format!("job{}", i), format!("http://jenkins/job{}/", i)))
                .collect()
        });
        Readings::default().with(
            "jenkins",
            SourceReading::new(SourceFacts::Jenkins(JenkinsFacts {
                active_jobs: Some(10),
                failing_jobs,
                unused_jobs: None,
            })),
        )
    }

    #[test]
    fn counts_failing_jobs() {
        let project = project();
        let readings = readings(Some(2));
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history);
        let kind = CiJobs::failing();
        let metric = Metric::new(&kind, Subject::Project(&project), &ctx);
        assert_eq!(metric.value(), 2.0);
        assert_eq!(metric.status(), Status::Yellow);
        assert_eq!(
            metric.report().unwrap(),
            "2 van de 10 actieve CI-jobs faalt."
        );
        assert_eq!(metric.url().len(), 2);
        assert_eq!(metric.url_label(), Some("Falende jobs"));
    }

    #[test]
    fn no_failing_jobs_is_perfect() {
        let project = project();
        let readings = readings(Some(0));
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history);
        let kind = CiJobs::failing();
        let metric = Metric::new(&kind, Subject::Project(&project), &ctx);
        assert_eq!(metric.status(), Status::Perfect);
    }

    #[test]
    fn unknown_job_list_is_missing() {
        let project = project();
        let readings = readings(None);
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history);
        let kind = CiJobs::unused();
        let metric = Metric::new(&kind, Subject::Project(&project), &ctx);
        assert_eq!(metric.value(), -1.0);
        assert_eq!(metric.status(), Status::Missing);
        assert!(metric.url().is_empty());
    }

    #[test]
    fn norm_mentions_targets() {
        let project = project();
        let readings = Readings::default();
        let history = HistoryLog::new();
        let ctx = Context::new(&project, &readings, &history);
        let kind = CiJobs::unused();
        let metric = Metric::new(&kind, Subject::Project(&project), &ctx);
        assert!(metric
            .norm()
            .unwrap()
            .starts_with("Maximaal 0 van de actieve CI-jobs is ongebruikt. Meer dan 2 CI-jobs is rood."));
        assert!(kind.should_be_measured(&project));
    }
}
