use crate::domain::MetricOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A software product whose quality is tracked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,

    /// Abbreviation; must be unique within a project. Defaults to the name.
    #[serde(default)]
    pub short_name: Option<String>,

    /// Id of this product per source instance name.
    #[serde(default)]
    pub metric_source_ids: BTreeMap<String, String>,

    /// Options keyed by metric class name.
    #[serde(default)]
    pub metric_options: BTreeMap<String, MetricOptions>,

    #[serde(default)]
    pub unittests: Option<Box<Product>>,

    #[serde(default)]
    pub integration_tests: Option<Box<Product>>,
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_short_name(mut self, short_name: impl Into<String>) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    pub fn with_metric_source_id(
        mut self,
        instance: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        self.metric_source_ids.insert(instance.into(), id.into());
        self
    }

    pub fn with_metric_options(
        mut self,
        metric_class: impl Into<String>,
        options: MetricOptions,
    ) -> Self {
        self.metric_options.insert(metric_class.into(), options);
        self
    }

    pub fn with_unittests(mut self, unittests: Product) -> Self {
        self.unittests = Some(Box::new(unittests));
        self
    }

    pub fn with_integration_tests(mut self, integration_tests: Product) -> Self {
        self.integration_tests = Some(Box::new(integration_tests));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }

    pub fn metric_source_id(&self, instance: &str) -> Option<&str> {
        self.metric_source_ids.get(instance).map(String::as_str)
    }

    pub fn metric_options(&self, metric_class: &str) -> Option<&MetricOptions> {
        self.metric_options.get(metric_class)
    }

    pub fn unittests(&self) -> Option<&Product> {
        self.unittests.as_deref()
    }

    pub fn integration_tests(&self) -> Option<&Product> {
        self.integration_tests.as_deref()
    }
}
