use crate::domain::{Product, Project, SourceInstance, Team};
use crate::template::format_number;
use serde::{Deserialize, Serialize};

/// A temporarily accepted deviation from a metric's norm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TechnicalDebtTarget {
    pub target_value: f64,
    #[serde(default)]
    pub explanation: String,
}

impl TechnicalDebtTarget {
    pub fn new(target_value: f64, explanation: impl Into<String>) -> Self {
        Self {
            target_value,
            explanation: explanation.into(),
        }
    }

    /// Sentence stating the accepted debt, followed by the explanation.
    pub fn comment(&self, unit: &str) -> String {
        let accepted = format!(
            "De op dit moment geaccepteerde technische schuld is {} {}.",
            format_number(self.target_value),
            unit
        );
        if self.explanation.trim().is_empty() {
            accepted
        } else {
            format!("{} {}", accepted, self.explanation.trim())
        }
    }
}

/// Per-metric settings a subject carries in the project definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricOptions {
    pub comment: Option<String>,
    pub debt_target: Option<TechnicalDebtTarget>,
    pub target: Option<f64>,
    pub low_target: Option<f64>,
}

/// The entity a metric measures.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Project(&'a Project),
    Product(&'a Product),
    Team(&'a Team),
    Products(&'a [Product]),
}

impl<'a> Subject<'a> {
    pub fn name(&self) -> String {
        match self {
            Subject::Project(p) => p.name().to_string(),
            Subject::Product(p) => p.name().to_string(),
            Subject::Team(t) => t.name().to_string(),
            Subject::Products(ps) => ps
                .iter()
                .map(|p| p.name())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Collections have no stable identity of their own.
    pub fn is_collection(&self) -> bool {
        matches!(self, Subject::Products(_))
    }

    pub fn metric_options(&self, class_name: &str) -> Option<&'a MetricOptions> {
        match *self {
            Subject::Project(p) => p.metric_options(class_name),
            Subject::Product(p) => p.metric_options(class_name),
            Subject::Team(t) => t.metric_options(class_name),
            Subject::Products(_) => None,
        }
    }

    pub fn technical_debt_target(&self, class_name: &str) -> Option<&'a TechnicalDebtTarget> {
        self.metric_options(class_name)
            .and_then(|o| o.debt_target.as_ref())
    }

    pub fn comment(&self, class_name: &str) -> Option<&'a str> {
        self.metric_options(class_name)
            .and_then(|o| o.comment.as_deref())
            .filter(|c| !c.trim().is_empty())
    }

    pub fn target(&self, class_name: &str) -> Option<f64> {
        self.metric_options(class_name).and_then(|o| o.target)
    }

    pub fn low_target(&self, class_name: &str) -> Option<f64> {
        self.metric_options(class_name).and_then(|o| o.low_target)
    }

    /// The id this subject has within the given source instance.
    pub fn metric_source_id(&self, instance: &SourceInstance) -> Option<&'a str> {
        match *self {
            Subject::Product(p) => p.metric_source_id(&instance.name),
            Subject::Team(t) => t.metric_source_id(&instance.name),
            Subject::Project(_) | Subject::Products(_) => None,
        }
    }

    pub fn as_product(&self) -> Option<&'a Product> {
        match *self {
            Subject::Product(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_team(&self) -> Option<&'a Team> {
        match *self {
            Subject::Team(t) => Some(t),
            _ => None,
        }
    }
}
