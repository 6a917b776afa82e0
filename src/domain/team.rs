use crate::domain::MetricOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Person {
    pub name: String,
}

impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    #[serde(default)]
    pub members: Vec<Person>,
    #[serde(default)]
    pub metric_source_ids: BTreeMap<String, String>,
    #[serde(default)]
    pub metric_options: BTreeMap<String, MetricOptions>,
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_member(&mut self, person: Person) {
        self.members.push(person);
    }

    pub fn with_member(mut self, person: Person) -> Self {
        self.add_member(person);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Person] {
        &self.members
    }

    pub fn metric_source_id(&self, instance: &str) -> Option<&str> {
        self.metric_source_ids.get(instance).map(String::as_str)
    }

    pub fn metric_options(&self, metric_class: &str) -> Option<&MetricOptions> {
        self.metric_options.get(metric_class)
    }
}
