//! Metric status engine and the catalog of concrete metrics.
//!
//! A [`MetricKind`] describes one kind of measurement (what it measures, its
//! thresholds and texts). A [`Metric`] binds a kind to a subject within an
//! evaluation [`Context`] and derives value, status, report and norm from it.

pub mod definition;
pub mod environment;
pub mod product;
pub mod project;
pub mod team;

pub use definition::{percentage, Direction, MetricDefinition, Scale, Scope};

use crate::domain::{Project, SourceInstance, SourceKind, Subject};
use crate::history::History;
use crate::readings::{Readings, SourceFacts, SourceReading};
use crate::status::Status;
use crate::template::{render, Parameters, TemplateError};
use chrono::{DateTime, Duration, Local};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const DEFAULT_MAX_SUBJECT_LENGTH: usize = 200;

/// Label to link.
pub type Links = BTreeMap<String, String>;

/// Everything a metric needs besides its kind and subject.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    pub project: &'a Project,
    pub readings: &'a Readings,
    pub history: &'a dyn History,
    pub now: DateTime<Local>,
    pub max_subject_length: usize,
}

impl<'a> Context<'a> {
    pub fn new(project: &'a Project, readings: &'a Readings, history: &'a dyn History) -> Self {
        Self {
            project,
            readings,
            history,
            now: Local::now(),
            max_subject_length: DEFAULT_MAX_SUBJECT_LENGTH,
        }
    }

    /// Evaluate as if it were `now`.
    pub fn at(mut self, now: DateTime<Local>) -> Self {
        self.now = now;
        self
    }

    pub fn with_max_subject_length(mut self, max_subject_length: usize) -> Self {
        self.max_subject_length = max_subject_length;
        self
    }
}

/// Behaviour of one kind of metric. Only `definition` and `value` are
/// required; everything else has the base behaviour as default.
pub trait MetricKind: Send + Sync {
    fn definition(&self) -> &MetricDefinition;

    /// The measurement; `-1` when it could not be taken.
    fn value(&self, metric: &Metric<'_>) -> f64;

    fn numerical_value(&self, metric: &Metric<'_>) -> f64 {
        self.value(metric)
    }

    /// Extra report parameters on top of the common ones.
    fn parameters(&self, _metric: &Metric<'_>, _params: &mut Parameters) {}

    /// Extra norm parameters used when no subject is at hand.
    fn norm_defaults(&self, _params: &mut Parameters) {}

    fn url(&self, _metric: &Metric<'_>) -> Links {
        Links::new()
    }

    fn comment_urls(&self, _metric: &Metric<'_>) -> Links {
        Links::new()
    }

    /// When the facts behind the value were retrieved.
    fn measurement_date(&self, metric: &Metric<'_>) -> Option<DateTime<Local>> {
        metric.reading().and_then(|r| r.measured_at)
    }

    /// The id `subject` has within `instance`.
    fn metric_source_id<'s>(
        &self,
        subject: &Subject<'s>,
        instance: &SourceInstance,
    ) -> Option<&'s str> {
        subject.metric_source_id(instance)
    }

    fn is_applicable(&self, _subject: &Subject<'_>) -> bool {
        true
    }

    fn should_be_measured(&self, project: &Project) -> bool {
        let class_name = self.definition().class_name.as_str();
        project
            .requirements()
            .iter()
            .any(|r| r.includes(class_name))
    }
}

/// A metric kind applied to one subject.
pub struct Metric<'a> {
    kind: &'a dyn MetricKind,
    subject: Subject<'a>,
    ctx: &'a Context<'a>,
    id_string: Option<String>,
}

impl<'a> Metric<'a> {
    pub fn new(kind: &'a dyn MetricKind, subject: Subject<'a>, ctx: &'a Context<'a>) -> Self {
        Self {
            kind,
            subject,
            ctx,
            id_string: None,
        }
    }

    pub fn definition(&self) -> &'a MetricDefinition {
        self.kind.definition()
    }

    pub fn subject(&self) -> Subject<'a> {
        self.subject
    }

    pub fn context(&self) -> &'a Context<'a> {
        self.ctx
    }

    pub fn name(&self) -> &'a str {
        &self.definition().name
    }

    pub fn unit(&self) -> &'a str {
        &self.definition().unit
    }

    pub fn stable_id(&self) -> String {
        let class_name = &self.definition().class_name;
        if self.subject.is_collection() {
            class_name.clone()
        } else {
            format!("{}{}", class_name, self.subject.name())
        }
    }

    pub fn id_string(&self) -> String {
        self.id_string.clone().unwrap_or_else(|| self.stable_id())
    }

    pub fn set_id_string(&mut self, id_string: impl Into<String>) {
        self.id_string = Some(id_string.into());
    }

    pub fn target(&self) -> f64 {
        let def = self.definition();
        self.subject
            .target(&def.class_name)
            .unwrap_or(def.target_value)
    }

    pub fn low_target(&self) -> f64 {
        let def = self.definition();
        self.subject
            .low_target(&def.class_name)
            .unwrap_or(def.low_target_value)
    }

    pub fn value(&self) -> f64 {
        self.kind.value(self)
    }

    pub fn numerical_value(&self) -> f64 {
        self.kind.numerical_value(self)
    }

    /// The source instance the value is read from.
    pub fn metric_source(&self) -> Option<&'a SourceInstance> {
        let kind = *self.definition().metric_source_kinds.first()?;
        let instances = self.ctx.project.metric_sources(kind);
        instances
            .iter()
            .find(|i| self.kind.metric_source_id(&self.subject, i).is_some())
            .or_else(|| instances.first())
    }

    /// The subject's id within [`Metric::metric_source`].
    pub fn metric_source_id(&self) -> Option<&'a str> {
        self.kind
            .metric_source_id(&self.subject, self.metric_source()?)
    }

    pub fn reading(&self) -> Option<&'a SourceReading> {
        self.ctx.readings.get(&self.metric_source()?.name)
    }

    pub fn facts(&self) -> Option<&'a SourceFacts> {
        self.reading().map(|r| &r.facts)
    }

    /// Link to the source instance itself, labelled with the source name.
    pub fn source_links(&self) -> Links {
        let mut links = Links::new();
        if let Some(instance) = self.metric_source() {
            links.insert(
                instance.kind.display_name().to_string(),
                instance.url.clone(),
            );
        }
        links
    }

    /// Required kinds the project has no instance of.
    pub fn missing_source_kinds(&self) -> Vec<SourceKind> {
        self.definition()
            .metric_source_kinds
            .iter()
            .copied()
            .filter(|k| self.ctx.project.metric_sources(*k).is_empty())
            .collect()
    }

    /// Configured kinds for which the subject lacks an id.
    pub fn missing_source_ids(&self) -> Vec<SourceKind> {
        self.definition()
            .metric_source_kinds
            .iter()
            .copied()
            .filter(|k| k.needs_metric_source_id())
            .filter(|k| {
                let instances = self.ctx.project.metric_sources(*k);
                !instances.is_empty()
                    && instances
                        .iter()
                        .all(|i| self.kind.metric_source_id(&self.subject, i).is_none())
            })
            .collect()
    }

    pub fn status(&self) -> Status {
        let def = self.definition();
        if !self.missing_source_kinds().is_empty() || !self.missing_source_ids().is_empty() {
            return Status::MissingSource;
        }
        let value = self.value();
        if value < 0.0 {
            return Status::Missing;
        }
        let value = match def.scale {
            Scale::Percentage => value.clamp(0.0, 100.0),
            Scale::Absolute => value,
        };
        if let Some(debt) = self.subject.technical_debt_target(&def.class_name) {
            if def
                .direction
                .accepts_debt(value, self.target(), debt.target_value)
            {
                return Status::Grey;
            }
        }
        if let Some(perfect) = def.perfect_value {
            if definition::approx_eq(value, perfect) {
                return Status::Perfect;
            }
        }
        let status = def
            .direction
            .classify(value, self.target(), self.low_target());
        self.apply_staleness(status)
    }

    fn apply_staleness(&self, status: Status) -> Status {
        let def = self.definition();
        if let Some(max_old_age) = def.max_old_age {
            if self.is_older_than(max_old_age) {
                log::debug!("{}: measurement older than maximum age", self.stable_id());
                return Status::Red;
            }
        }
        match def.old_age {
            Some(old_age) if status == Status::Green && self.is_older_than(old_age) => {
                Status::Yellow
            }
            _ => status,
        }
    }

    /// Never measured counts as too old.
    fn is_older_than(&self, age: Duration) -> bool {
        match self.kind.measurement_date(self) {
            Some(date) => self.ctx.now - date > age,
            None => true,
        }
    }

    pub fn report(&self) -> Result<String, TemplateError> {
        self.report_with_max_subject_length(self.ctx.max_subject_length)
    }

    pub fn report_with_max_subject_length(
        &self,
        max_subject_length: usize,
    ) -> Result<String, TemplateError> {
        let def = self.definition();
        let subject = truncate(&self.subject.name(), max_subject_length);
        let metric = lowercase_first(&def.name);
        match self.status() {
            Status::MissingSource => {
                let kinds = self.missing_source_kinds();
                Ok(if kinds.is_empty() {
                    format!(
                        "De {} van {} kon niet gemeten worden omdat niet alle benodigde bron-ids \
                         zijn geconfigureerd. Configureer ids voor de volgende bronnen: {}.",
                        metric,
                        subject,
                        join_kinds(&self.missing_source_ids())
                    )
                } else {
                    format!(
                        "De {} van {} kon niet gemeten worden omdat niet alle benodigde bronnen \
                         zijn geconfigureerd. Configureer de volgende bron(nen): {}.",
                        metric,
                        subject,
                        join_kinds(&kinds)
                    )
                })
            }
            Status::Missing => Ok(format!(
                "De {} van {} kon niet gemeten worden omdat niet alle benodigde bronnen \
                 beschikbaar zijn.",
                metric, subject
            )),
            status => {
                let template = match (&def.perfect_template, status) {
                    (Some(perfect), Status::Perfect) => perfect,
                    _ => &def.template,
                };
                render(template, &self.parameters(&subject))
            }
        }
    }

    /// Common report parameters plus those of the kind.
    fn parameters(&self, subject_name: &str) -> Parameters {
        let mut params = Parameters::new();
        params.insert("name", subject_name);
        params.insert("metric", self.name());
        params.insert("unit", self.unit());
        params.insert("target", self.target());
        params.insert("low_target", self.low_target());
        params.insert("value", self.value());
        self.kind.parameters(self, &mut params);
        params
    }

    pub fn norm(&self) -> Result<String, TemplateError> {
        let mut params = norm_default_values(self.kind);
        let subject = truncate(&self.subject.name(), self.ctx.max_subject_length);
        params.merge(self.parameters(&subject));
        render(&self.definition().norm_template, &params)
    }

    pub fn url(&self) -> Links {
        self.kind.url(self)
    }

    pub fn url_label(&self) -> Option<&'a str> {
        self.definition().url_label.as_deref()
    }

    /// Accepted-debt explanation followed by the subject's own comment.
    pub fn comment(&self) -> String {
        let def = self.definition();
        let mut parts = Vec::new();
        if let Some(debt) = self.subject.technical_debt_target(&def.class_name) {
            parts.push(debt.comment(&def.unit));
        }
        if let Some(comment) = self.subject.comment(&def.class_name) {
            parts.push(comment.trim().to_string());
        }
        parts.join(" ")
    }

    fn has_configured_comment(&self) -> bool {
        let class_name = &self.definition().class_name;
        self.subject.technical_debt_target(class_name).is_some()
            || self.subject.comment(class_name).is_some()
    }

    pub fn comment_urls(&self) -> Links {
        if self.has_configured_comment() {
            Links::new()
        } else {
            self.kind.comment_urls(self)
        }
    }

    pub fn comment_url_label(&self) -> Option<&'a str> {
        if self.has_configured_comment() {
            None
        } else {
            self.definition().comment_url_label.as_deref()
        }
    }

    pub fn recent_history(&self) -> Vec<f64> {
        self.ctx.history.recent_history(&self.stable_id())
    }

    pub fn status_start_date(&self) -> Option<DateTime<Local>> {
        self.ctx
            .history
            .status_start_date(&self.stable_id(), self.status())
    }

    /// Range for charting the recent history.
    pub fn y_axis_range(&self) -> (f64, f64) {
        if self.definition().scale == Scale::Percentage {
            return (0.0, 100.0);
        }
        let history = self.recent_history();
        if history.is_empty() {
            return (0.0, 100.0);
        }
        let min = history.iter().copied().fold(f64::INFINITY, f64::min);
        let max = history.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if min == 0.0 && max == 0.0 {
            (-1.0, 1.0)
        } else {
            (min, max)
        }
    }
}

/// Norm parameters available without a subject.
pub fn norm_default_values(kind: &dyn MetricKind) -> Parameters {
    let def = kind.definition();
    let mut params = Parameters::new();
    params.insert("target", def.target_value);
    params.insert("low_target", def.low_target_value);
    params.insert("unit", def.unit.as_str());
    kind.norm_defaults(&mut params);
    params
}

/// The norm as it reads for the kind's default targets.
pub fn default_norm(kind: &dyn MetricKind) -> Result<String, TemplateError> {
    render(&kind.definition().norm_template, &norm_default_values(kind))
}

/// Every metric kind this dashboard knows about.
pub fn catalog() -> Vec<Arc<dyn MetricKind>> {
    let mut kinds: Vec<Arc<dyn MetricKind>> = Vec::new();
    kinds.extend(environment::kinds());
    kinds.extend(team::kinds());
    kinds.extend(product::kinds());
    kinds.extend(project::kinds());
    kinds
}

fn truncate(name: &str, max_len: usize) -> String {
    if name.chars().count() > max_len {
        let mut cut: String = name.chars().take(max_len).collect();
        cut.push_str("...");
        cut
    } else {
        name.to_string()
    }
}

fn lowercase_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn join_kinds(kinds: &[SourceKind]) -> String {
    kinds
        .iter()
        .map(|k| k.class_name())
        .collect::<Vec<_>>()
        .join(", ")
}
