use crate::domain::SourceKind;
use crate::status::Status;
use chrono::Duration;

/// Which way is healthier for a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// No thresholds; the metric is green unless it goes stale.
    Neutral,
    LowerIsBetter,
    HigherIsBetter,
}

impl Direction {
    /// Whether `value` is as good as or better than `reference`.
    pub fn at_least_as_good(self, value: f64, reference: f64) -> bool {
        match self {
            Direction::Neutral => approx_eq(value, reference),
            Direction::LowerIsBetter => value <= reference,
            Direction::HigherIsBetter => value >= reference,
        }
    }

    /// Whether an accepted technical debt of `debt` covers `value`: the value
    /// equals the debt, or it misses `target` but is no worse than the debt.
    pub fn accepts_debt(self, value: f64, target: f64, debt: f64) -> bool {
        approx_eq(value, debt)
            || (!self.at_least_as_good(value, target) && self.at_least_as_good(value, debt))
    }

    pub fn classify(self, value: f64, target: f64, low_target: f64) -> Status {
        match self {
            Direction::Neutral => Status::Green,
            Direction::LowerIsBetter | Direction::HigherIsBetter => {
                if self.at_least_as_good(value, target) {
                    Status::Green
                } else if self.at_least_as_good(value, low_target) {
                    Status::Yellow
                } else {
                    Status::Red
                }
            }
        }
    }

    /// The best score a percentage can have in this direction.
    pub fn best_percentage(self) -> f64 {
        match self {
            Direction::LowerIsBetter => 0.0,
            Direction::Neutral | Direction::HigherIsBetter => 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Absolute,
    /// Values live in [0, 100]; out-of-range values are clamped.
    Percentage,
}

/// Which subjects a metric is evaluated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Project,
    Product,
    Team,
}

/// Equality up to a tolerance relative to the operands' magnitude.
pub(crate) fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// `100 * numerator / denominator`. Nothing to measure counts as the best
/// score; a negative operand means the data was missing.
pub fn percentage(direction: Direction, numerator: f64, denominator: f64) -> f64 {
    if numerator < 0.0 || denominator < 0.0 {
        return -1.0;
    }
    if denominator == 0.0 {
        return direction.best_percentage();
    }
    100.0 * numerator / denominator
}

/// Static description of a metric: texts, thresholds and required sources.
#[derive(Debug, Clone)]
pub struct MetricDefinition {
    pub class_name: String,
    pub name: String,
    pub unit: String,
    pub norm_template: String,
    pub template: String,
    pub perfect_template: Option<String>,
    pub url_label: Option<String>,
    pub comment_url_label: Option<String>,
    pub target_value: f64,
    pub low_target_value: f64,
    pub perfect_value: Option<f64>,
    /// Measurements older than this turn green into yellow.
    pub old_age: Option<Duration>,
    /// Measurements older than this are red.
    pub max_old_age: Option<Duration>,
    pub metric_source_kinds: Vec<SourceKind>,
    pub direction: Direction,
    pub scale: Scale,
    pub scope: Scope,
}

impl MetricDefinition {
    pub fn new(
        class_name: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            name: name.into(),
            unit: unit.into(),
            norm_template: String::new(),
            template: "{value} {unit}".to_string(),
            perfect_template: None,
            url_label: None,
            comment_url_label: None,
            target_value: 0.0,
            low_target_value: 0.0,
            perfect_value: None,
            old_age: None,
            max_old_age: None,
            metric_source_kinds: Vec::new(),
            direction: Direction::Neutral,
            scale: Scale::Absolute,
            scope: Scope::Product,
        }
    }

    pub fn lower_is_better(
        class_name: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        let mut def = Self::new(class_name, name, unit);
        def.direction = Direction::LowerIsBetter;
        def.perfect_value = Some(0.0);
        def
    }

    pub fn higher_is_better(
        class_name: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        let mut def = Self::new(class_name, name, unit);
        def.direction = Direction::HigherIsBetter;
        def
    }

    pub fn lower_percentage_is_better(
        class_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let mut def = Self::lower_is_better(class_name, name, "%");
        def.scale = Scale::Percentage;
        def
    }

    pub fn higher_percentage_is_better(
        class_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let mut def = Self::higher_is_better(class_name, name, "%");
        def.scale = Scale::Percentage;
        def.perfect_value = Some(100.0);
        def
    }

    pub fn targets(mut self, target: f64, low_target: f64) -> Self {
        self.target_value = target;
        self.low_target_value = low_target;
        self
    }

    pub fn norm(mut self, template: impl Into<String>) -> Self {
        self.norm_template = template.into();
        self
    }

    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    pub fn perfect_template(mut self, template: impl Into<String>) -> Self {
        self.perfect_template = Some(template.into());
        self
    }

    pub fn url_label(mut self, label: impl Into<String>) -> Self {
        self.url_label = Some(label.into());
        self
    }

    pub fn perfect_value(mut self, value: Option<f64>) -> Self {
        self.perfect_value = value;
        self
    }

    pub fn old_age(mut self, age: Duration) -> Self {
        self.old_age = Some(age);
        self
    }

    pub fn max_old_age(mut self, age: Duration) -> Self {
        self.max_old_age = Some(age);
        self
    }

    pub fn sources(mut self, kinds: &[SourceKind]) -> Self {
        self.metric_source_kinds = kinds.to_vec();
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}
