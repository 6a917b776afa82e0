use anyhow::{Context as _, Result};
use chrono::Local;
use clap::Parser;
use qualitypulse::config;
use qualitypulse::dashboard::DashboardSnapshot;
use qualitypulse::history::HistoryLog;
use qualitypulse::metric::default_norm;
use qualitypulse::monitor::{self, Workspace};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "qualitypulse",
    about = "Evaluate software-quality metrics from recorded tooling facts"
)]
struct Cli {
    /// Path to config file (default: ~/.config/qualitypulse/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Readings file to use instead of the configured one
    #[arg(long, value_name = "PATH")]
    readings: Option<PathBuf>,

    /// History file to use instead of the configured one
    #[arg(long, value_name = "PATH")]
    history: Option<PathBuf>,

    /// Output the dashboard snapshot as JSON
    #[arg(long, conflicts_with_all = ["summary", "norms"])]
    json: bool,

    /// Print a one-line summary and exit (exit 1 if any metric is red)
    #[arg(long, conflicts_with = "norms")]
    summary: bool,

    /// Append the evaluated statuses to the history file
    #[arg(long)]
    record: bool,

    /// Print the norm of every enabled metric and exit
    #[arg(long)]
    norms: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let mut cfg = config::load_config(cli.config.as_ref())?;
    if let Some(path) = cli.readings {
        cfg.readings_file = path;
    }
    if let Some(path) = cli.history {
        cfg.history_file = path;
    }
    for path in &cfg.missing_files {
        log::info!("configured file {} does not exist yet", path.display());
    }

    let workspace = Arc::new(Workspace::from_config(&cfg)?);

    if cli.norms {
        print_norms(&workspace)?;
        return Ok(());
    }

    let now = Local::now();
    let snapshot = monitor::evaluate_all(Arc::clone(&workspace), now).await?;

    if cli.record {
        HistoryLog::append_to(&cfg.history_file, &snapshot.history_records(now))
            .with_context(|| format!("recording history in {}", cfg.history_file.display()))?;
    }

    if cli.summary {
        println!("{}", snapshot.summary_line());
        std::process::exit(if snapshot.has_red() { 1 } else { 0 });
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_table(&snapshot);
    }
    Ok(())
}

fn print_norms(workspace: &Workspace) -> Result<()> {
    for kind in &workspace.kinds {
        if !kind.should_be_measured(&workspace.project) {
            continue;
        }
        let definition = kind.definition();
        let norm = default_norm(kind.as_ref())
            .with_context(|| format!("rendering norm of {}", definition.class_name))?;
        println!("{}\n  {}\n", definition.name, norm);
    }
    Ok(())
}

fn print_table(snapshot: &DashboardSnapshot) {
    if snapshot.rows.is_empty() {
        println!("No metrics to evaluate. Enable requirements in your config.");
        return;
    }

    let name_w = snapshot
        .rows
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(6)
        .max(6);
    let subject_w = snapshot
        .rows
        .iter()
        .map(|r| r.subject.chars().count())
        .max()
        .unwrap_or(7)
        .clamp(7, 40);

    println!(
        "{:<nw$}  {:<sw$}  {:>8}  {:<14}  REPORT",
        "METRIC",
        "SUBJECT",
        "VALUE",
        "STATUS",
        nw = name_w,
        sw = subject_w,
    );
    println!("{}", "─".repeat(name_w + subject_w + 40));

    for row in &snapshot.rows {
        let value = if row.status.is_measured() {
            qualitypulse::template::format_number(row.value)
        } else {
            "-".to_string()
        };
        let subject: String = row.subject.chars().take(subject_w).collect();
        println!(
            "{:<nw$}  {:<sw$}  {:>8}  {} {:<12}  {}",
            row.name,
            subject,
            value,
            row.status.indicator(),
            row.status.as_str(),
            row.report,
            nw = name_w,
            sw = subject_w,
        );
    }

    println!();
    println!("{}", snapshot.summary_line());
    for alert in &snapshot.alerts {
        println!("[{}] {}: {}", alert.severity, alert.title, alert.detail);
    }
}
