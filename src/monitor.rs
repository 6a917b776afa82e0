use crate::config::Config;
use crate::dashboard::{build_snapshot, evaluate, DashboardSnapshot, MetricRow};
use crate::domain::{Project, Subject};
use crate::history::{History, HistoryLog};
use crate::metric::{catalog, Context, Metric, MetricKind, Scope};
use crate::readings::Readings;
use crate::template::TemplateError;
use anyhow::Context as _;
use chrono::{DateTime, Local};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;

const MAX_CONCURRENT: usize = 20;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("metric {metric}: {source}")]
    Template {
        metric: String,
        #[source]
        source: TemplateError,
    },

    #[error("evaluation task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Everything needed to evaluate the dashboard, shared between tasks.
pub struct Workspace {
    pub project: Project,
    pub readings: Readings,
    pub history: Box<dyn History>,
    pub kinds: Vec<Arc<dyn MetricKind>>,
    pub max_subject_length: usize,
}

impl Workspace {
    pub fn new(project: Project, readings: Readings, history: Box<dyn History>) -> Self {
        Self {
            project,
            readings,
            history,
            kinds: catalog(),
            max_subject_length: crate::metric::DEFAULT_MAX_SUBJECT_LENGTH,
        }
    }

    /// Build the project and load readings and history named by `config`.
    /// A missing readings file yields an empty dashboard of missing values.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let project = config.project().context("invalid project configuration")?;
        let readings = if config.readings_file.exists() {
            Readings::load(&config.readings_file)
                .with_context(|| format!("loading {}", config.readings_file.display()))?
        } else {
            log::warn!(
                "readings file {} not found; every metric will be missing",
                config.readings_file.display()
            );
            Readings::default()
        };
        let history = HistoryLog::load(&config.history_file)
            .with_context(|| format!("loading {}", config.history_file.display()))?
            .with_recent_len(config.recent_history_len);
        let mut workspace = Self::new(project, readings, Box::new(history));
        workspace.max_subject_length = config.max_subject_length;
        Ok(workspace)
    }

    pub fn context(&self, now: DateTime<Local>) -> Context<'_> {
        Context::new(&self.project, &self.readings, self.history.as_ref())
            .at(now)
            .with_max_subject_length(self.max_subject_length)
    }
}

/// Which subject of the project a metric measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectKey {
    Project,
    Product(usize),
    Team(usize),
}

impl SubjectKey {
    pub fn resolve(self, project: &Project) -> Option<Subject<'_>> {
        match self {
            SubjectKey::Project => Some(Subject::Project(project)),
            SubjectKey::Product(i) => project.products().get(i).map(Subject::Product),
            SubjectKey::Team(i) => project.teams().get(i).map(Subject::Team),
        }
    }
}

/// Pairs of (index into `kinds`, subject) that should be evaluated.
pub fn plan(kinds: &[Arc<dyn MetricKind>], project: &Project) -> Vec<(usize, SubjectKey)> {
    let mut planned = Vec::new();
    for (index, kind) in kinds.iter().enumerate() {
        if !kind.should_be_measured(project) {
            continue;
        }
        let keys: Vec<SubjectKey> = match kind.definition().scope {
            Scope::Project => vec![SubjectKey::Project],
            Scope::Product => (0..project.products().len())
                .map(SubjectKey::Product)
                .collect(),
            Scope::Team => (0..project.teams().len()).map(SubjectKey::Team).collect(),
        };
        for key in keys {
            let applicable = key
                .resolve(project)
                .is_some_and(|subject| kind.is_applicable(&subject));
            if applicable {
                planned.push((index, key));
            }
        }
    }
    planned
}

/// Evaluate every planned metric concurrently and build the dashboard.
/// A metric whose texts cannot be rendered aborts the run.
pub async fn evaluate_all(
    workspace: Arc<Workspace>,
    now: DateTime<Local>,
) -> Result<DashboardSnapshot, MonitorError> {
    let planned = plan(&workspace.kinds, &workspace.project);
    log::debug!("evaluating {} metric(s)", planned.len());

    let mut rows: Vec<MetricRow> = Vec::with_capacity(planned.len());
    for chunk in planned.chunks(MAX_CONCURRENT) {
        let mut set: JoinSet<Result<Option<MetricRow>, MonitorError>> = JoinSet::new();
        for &(index, key) in chunk {
            let workspace = Arc::clone(&workspace);
            set.spawn(async move {
                let ctx = workspace.context(now);
                let Some(subject) = key.resolve(&workspace.project) else {
                    return Ok(None);
                };
                let kind = workspace.kinds[index].as_ref();
                let metric = Metric::new(kind, subject, &ctx);
                evaluate(&metric)
                    .map(Some)
                    .map_err(|source| MonitorError::Template {
                        metric: metric.stable_id(),
                        source,
                    })
            });
        }
        while let Some(res) = set.join_next().await {
            if let Some(row) = res?? {
                rows.push(row);
            }
        }
    }

    Ok(build_snapshot(workspace.project.name(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Person, Product, SourceInstance, SourceKind, Team};
    use crate::requirement::Requirement;

    fn project() -> Project {
        let mut project = Project::new("Organization", "Project")
            .with_requirement(Requirement::TrackAbsence)
            .with_requirement(Requirement::UnitTests)
            .with_metric_source(SourceInstance::new(SourceKind::HolidayPlanner, "planner", ""));
        project
            .add_product(Product::new("Plain"))
            .unwrap();
        project
            .add_product(Product::new("Tested").with_integration_tests(Product::new("IT")))
            .unwrap();
        project.add_team(Team::new("Solo").with_member(Person::new("A")));
        project.add_team(
            Team::new("Duo")
                .with_member(Person::new("A"))
                .with_member(Person::new("B")),
        );
        project
    }

    #[test]
    fn plan_respects_requirements_and_applicability() {
        let project = project();
        let kinds = catalog();
        let planned: Vec<(String, SubjectKey)> = plan(&kinds, &project)
            .into_iter()
            .map(|(i, key)| (kinds[i].definition().class_name.clone(), key))
            .collect();
        assert_eq!(
            planned,
            vec![
                ("TeamAbsence".to_string(), SubjectKey::Team(1)),
                ("IntegrationtestLineCoverage".to_string(), SubjectKey::Product(1)),
                ("IntegrationtestBranchCoverage".to_string(), SubjectKey::Product(1)),
            ]
        );
    }

    #[test]
    fn resolve_out_of_range_is_none() {
        let project = project();
        assert!(SubjectKey::Product(9).resolve(&project).is_none());
        assert!(SubjectKey::Project.resolve(&project).is_some());
    }

    #[tokio::test]
    async fn evaluates_planned_metrics() {
        let workspace = Arc::new(Workspace::new(
            project(),
            Readings::default(),
            Box::new(HistoryLog::new()),
        ));
        let snapshot = evaluate_all(workspace, Local::now()).await.unwrap();
        assert_eq!(snapshot.overview.total_metrics, 3);
        // No readings for the planner; no Sonar configured at all.
        assert_eq!(snapshot.overview.missing, 1);
        assert_eq!(snapshot.overview.missing_source, 2);
        assert_eq!(snapshot.project, "Project");
    }
}
