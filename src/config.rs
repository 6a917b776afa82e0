use crate::domain::{MetricOptions, Product, Project, ProjectError, SourceInstance, Team};
use crate::metric::DEFAULT_MAX_SUBJECT_LENGTH;
use crate::requirement::Requirement;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub organization: String,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default)]
    pub requirements: Vec<Requirement>,

    #[serde(default)]
    pub metric_sources: Vec<SourceInstance>,

    #[serde(default)]
    pub products: Vec<Product>,

    #[serde(default)]
    pub teams: Vec<Team>,

    /// Options for project-level metrics, keyed by metric class name.
    #[serde(default)]
    pub metric_options: BTreeMap<String, MetricOptions>,

    /// JSON facts written by the polling scripts.
    #[serde(default = "default_readings_file")]
    pub readings_file: PathBuf,

    /// JSON-lines history of earlier evaluations.
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,

    #[serde(default = "default_max_subject_length")]
    pub max_subject_length: usize,

    /// Number of past values kept per metric for trends.
    #[serde(default = "default_recent_history_len")]
    pub recent_history_len: usize,

    /// Data files named in config but not found on disk (populated at load time, never serialised).
    #[serde(skip)]
    pub missing_files: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            organization: String::new(),
            name: default_name(),
            requirements: Vec::new(),
            metric_sources: Vec::new(),
            products: Vec::new(),
            teams: Vec::new(),
            metric_options: BTreeMap::new(),
            readings_file: default_readings_file(),
            history_file: default_history_file(),
            max_subject_length: default_max_subject_length(),
            recent_history_len: default_recent_history_len(),
            missing_files: Vec::new(),
        }
    }
}

impl Config {
    /// Build the project this configuration describes.
    pub fn project(&self) -> Result<Project, ProjectError> {
        let mut project = Project::new(&self.organization, &self.name);
        for requirement in &self.requirements {
            project.add_requirement(*requirement);
        }
        for instance in &self.metric_sources {
            project.add_metric_source(instance.clone())?;
        }
        for product in &self.products {
            project.add_product(product.clone())?;
        }
        for team in &self.teams {
            project.add_team(team.clone());
        }
        for (class_name, options) in &self.metric_options {
            project.set_metric_options(class_name.clone(), options.clone());
        }
        Ok(project)
    }
}

fn default_name() -> String {
    "Project".to_string()
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".config")
        .join("qualitypulse")
}

fn default_readings_file() -> PathBuf {
    config_dir().join("readings.json")
}

fn default_history_file() -> PathBuf {
    config_dir().join("history.jsonl")
}

fn default_max_subject_length() -> usize {
    DEFAULT_MAX_SUBJECT_LENGTH
}

fn default_recent_history_len() -> usize {
    48
}

/// Default config file location: `~/.config/qualitypulse/config.toml`.
pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load config, creating a default file on first run if none exists.
pub fn load_config(config_path: Option<&PathBuf>) -> Result<Config> {
    let path = config_path.cloned().unwrap_or_else(default_config_path);

    if !path.exists() {
        // First run: write a commented sample; an unwritable location just means defaults.
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_ok() {
                if let Err(e) = std::fs::write(&path, default_config_toml()) {
                    log::debug!("could not write sample config {}: {}", path.display(), e);
                }
            }
        }
        let mut config = Config::default();
        config.missing_files = missing(&[&config.readings_file, &config.history_file]);
        return Ok(config);
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let mut config: Config =
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))?;

    let home = dirs::home_dir().unwrap_or_default();
    config.readings_file = expand_home(config.readings_file, &home);
    config.history_file = expand_home(config.history_file, &home);
    config.missing_files = missing(&[&config.readings_file, &config.history_file]);

    Ok(config)
}

fn missing(paths: &[&PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|p| !p.exists())
        .map(|p| (*p).clone())
        .collect()
}

/// Expand `~` and `$HOME` prefixes to the actual home directory.
fn expand_home(path: PathBuf, home: &Path) -> PathBuf {
    let s = path.to_string_lossy();

    if let Some(stripped) = s.strip_prefix("~/") {
        return home.join(stripped);
    }
    if s == "~" {
        return home.to_path_buf();
    }
    if let Some(stripped) = s.strip_prefix("$HOME/") {
        return home.join(stripped);
    }
    if s == "$HOME" {
        return home.to_path_buf();
    }

    path
}

fn default_config_toml() -> &'static str {
    r#"# QualityPulse configuration
# ~/.config/qualitypulse/config.toml

organization = "Organization"
name = "Project"

# Metric bundles to evaluate:
# track_ci_jobs, track_absence, owasp_zap, owasp_dependencies,
# unit_tests, performance, track_risks, track_actions
requirements = ["track_ci_jobs"]

# Facts gathered by the polling scripts, and the evaluation history.
# Supports ~ and $HOME expansion.
readings_file = "~/.config/qualitypulse/readings.json"
history_file = "~/.config/qualitypulse/history.jsonl"

# Subject names longer than this are cut in reports.
max_subject_length = 200

# [[metric_sources]]
# kind = "jenkins"
# name = "jenkins"
# url = "http://jenkins.example.org/"

# [[products]]
# name = "Product"
# short_name = "PR"
# [products.metric_source_ids]
# zap = "http://zap.example.org/product/report.html"
# [products.metric_options.HighRiskZAPScanAlertsMetric]
# comment = "Scanner false positives are being triaged."
# debt_target = { target_value = 2, explanation = "Fix planned for next release." }

# [[teams]]
# name = "Team"
# members = ["Piet Programmeur", "Tina Tester"]
"#
}
