use crate::domain::{MetricOptions, Product, SourceInstance, SourceKind, Team};
use crate::requirement::Requirement;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectError {
    #[error("a product with short name '{0}' already exists")]
    DuplicateProduct(String),

    #[error("metric source '{0}' is configured more than once")]
    DuplicateSource(String),
}

/// The project whose quality the dashboard reports on.
#[derive(Debug, Clone, Default)]
pub struct Project {
    organization: String,
    name: String,
    metric_sources: BTreeMap<SourceKind, Vec<SourceInstance>>,
    requirements: Vec<Requirement>,
    products: Vec<Product>,
    teams: Vec<Team>,
    metric_options: BTreeMap<String, MetricOptions>,
}

impl Project {
    pub fn new(organization: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_metric_source(&mut self, instance: SourceInstance) -> Result<(), ProjectError> {
        let taken = self
            .metric_sources
            .values()
            .flatten()
            .any(|existing| existing.name == instance.name);
        if taken {
            return Err(ProjectError::DuplicateSource(instance.name));
        }
        self.metric_sources
            .entry(instance.kind)
            .or_default()
            .push(instance);
        Ok(())
    }

    /// Builder form of [`Project::add_metric_source`] for fixed setups.
    pub fn with_metric_source(mut self, instance: SourceInstance) -> Self {
        self.metric_sources
            .entry(instance.kind)
            .or_default()
            .push(instance);
        self
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.add_requirement(requirement);
        self
    }

    pub fn add_requirement(&mut self, requirement: Requirement) {
        if !self.requirements.contains(&requirement) {
            self.requirements.push(requirement);
        }
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn has_requirement(&self, requirement: Requirement) -> bool {
        self.requirements.contains(&requirement)
    }

    /// Configured instances of a kind, in configuration order.
    pub fn metric_sources(&self, kind: SourceKind) -> &[SourceInstance] {
        self.metric_sources
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn metric_source_kinds(&self) -> Vec<SourceKind> {
        self.metric_sources
            .iter()
            .filter(|(_, instances)| !instances.is_empty())
            .map(|(kind, _)| *kind)
            .collect()
    }

    pub fn add_product(&mut self, product: Product) -> Result<(), ProjectError> {
        if self
            .products
            .iter()
            .any(|p| p.short_name() == product.short_name())
        {
            return Err(ProjectError::DuplicateProduct(
                product.short_name().to_string(),
            ));
        }
        self.products.push(product);
        Ok(())
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn get_product(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name() == name)
    }

    pub fn add_team(&mut self, team: Team) {
        self.teams.push(team);
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn set_metric_options(&mut self, metric_class: impl Into<String>, options: MetricOptions) {
        self.metric_options.insert(metric_class.into(), options);
    }

    pub fn metric_options(&self, metric_class: &str) -> Option<&MetricOptions> {
        self.metric_options.get(metric_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project::new("Organization", "Project Name")
    }

    #[test]
    fn name_and_organization() {
        let p = project();
        assert_eq!(p.name(), "Project Name");
        assert_eq!(p.organization(), "Organization");
    }

    #[test]
    fn new_project_has_no_products_or_teams() {
        let p = project();
        assert!(p.products().is_empty());
        assert!(p.teams().is_empty());
    }

    #[test]
    fn add_and_get_product() {
        let mut p = project();
        p.add_product(Product::new("FakeProduct").with_short_name("FP"))
            .unwrap();
        assert_eq!(p.products().len(), 1);
        assert!(p.get_product("FakeProduct").is_some());
        assert!(p.get_product("Missing product").is_none());
    }

    #[test]
    fn duplicate_short_name_is_rejected() {
        let mut p = project();
        p.add_product(Product::new("One").with_short_name("FP"))
            .unwrap();
        let err = p
            .add_product(Product::new("Two").with_short_name("FP"))
            .unwrap_err();
        assert_eq!(err, ProjectError::DuplicateProduct("FP".to_string()));
    }

    #[test]
    fn add_team() {
        let mut p = project();
        p.add_team(Team::new("Team"));
        assert_eq!(p.teams().len(), 1);
    }

    #[test]
    fn unknown_metric_source_kind_is_empty() {
        assert!(project().metric_sources(SourceKind::Jenkins).is_empty());
        assert!(project().metric_source_kinds().is_empty());
    }

    #[test]
    fn known_metric_sources_keep_order() {
        let p = project()
            .with_metric_source(SourceInstance::new(SourceKind::Sonar, "sonar1", ""))
            .with_metric_source(SourceInstance::new(SourceKind::Sonar, "sonar2", ""));
        let names: Vec<&str> = p
            .metric_sources(SourceKind::Sonar)
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["sonar1", "sonar2"]);
        assert_eq!(p.metric_source_kinds(), vec![SourceKind::Sonar]);
    }

    #[test]
    fn duplicate_source_names_are_rejected() {
        let mut p = project();
        p.add_metric_source(SourceInstance::new(SourceKind::Jenkins, "ci", ""))
            .unwrap();
        let err = p
            .add_metric_source(SourceInstance::new(SourceKind::Sonar, "ci", ""))
            .unwrap_err();
        assert_eq!(err, ProjectError::DuplicateSource("ci".to_string()));
    }

    #[test]
    fn requirements_are_not_duplicated() {
        let p = project()
            .with_requirement(Requirement::TrackRisks)
            .with_requirement(Requirement::TrackRisks);
        assert_eq!(p.requirements(), &[Requirement::TrackRisks]);
        assert!(p.has_requirement(Requirement::TrackRisks));
        assert!(!p.has_requirement(Requirement::TrackActions));
    }
}
