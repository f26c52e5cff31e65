use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use dbt2lookml_core::{Config, LogLevel, Report, Severity};
use dbt2lookml_dbt::{parse_typed_models, Catalog, DbtProjectConfig, Manifest};
use dbt2lookml_engine::{generate, write_all, GenerateOptions};

/// Config file picked up from the working directory when --config is not given
const DEFAULT_CONFIG_FILE: &str = "dbt2lookml.toml";

/// dbt2lookml - Generate LookML views and explores from a dbt project
#[derive(Parser, Debug)]
#[command(name = "dbt2lookml")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to dbt_project.yml directory [default: ./]
    #[arg(long)]
    project_dir: Option<PathBuf>,

    /// Path to dbt target directory containing manifest.json and catalog.json [default: ./target]
    #[arg(long)]
    target_dir: Option<PathBuf>,

    /// Filter to dbt models using this tag
    #[arg(long)]
    tag: Option<String>,

    /// Tag marking models that also get an explore
    #[arg(long)]
    explore_tag: Option<String>,

    /// Use the dbt model file path to nest LookML files
    #[arg(long)]
    use_file_path: bool,

    /// Set level of logs
    #[arg(long, value_enum, ignore_case = true)]
    log_level: Option<LogLevelArg>,

    /// Path to a directory that will contain the generated lookml files [default: ./lookml]
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Name of the Looker connection to use [default: dbt project name]
    #[arg(long)]
    model_connection: Option<String>,

    /// Path to config file (default: dbt2lookml.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a JSON run report to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
#[value(rename_all = "UPPERCASE")]
enum LogLevelArg {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevelArg> for LogLevel {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Error => LogLevel::Error,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.log_level);

    let result = run(&config).and_then(|report| {
        save_report(&report, cli.report.as_deref())?;
        Ok(report)
    });

    match result {
        Ok(report) => {
            print_summary(&report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Write the JSON report when --report was given
fn save_report(report: &Report, path: Option<&Path>) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    report
        .save_to_file(path)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    tracing::debug!("Report saved to {}", path.display());
    Ok(())
}

/// RUST_LOG wins over --log-level when set
fn init_tracing(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Config file values, overridden by whatever was passed on the command line
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(path) = &cli.config {
        Config::from_file(path).with_context(|| format!("Failed to load config {}", path.display()))?
    } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG_FILE))
            .with_context(|| format!("Failed to load config {}", DEFAULT_CONFIG_FILE))?
    } else {
        Config::default()
    };

    if let Some(dir) = &cli.project_dir {
        config.project_dir = dir.clone();
    }
    if let Some(dir) = &cli.target_dir {
        config.target_dir = dir.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = dir.clone();
    }
    if cli.tag.is_some() {
        config.tag = cli.tag.clone();
    }
    if cli.explore_tag.is_some() {
        config.explore_tag = cli.explore_tag.clone();
    }
    if cli.use_file_path {
        config.use_file_path = true;
    }
    if cli.model_connection.is_some() {
        config.model_connection = cli.model_connection.clone();
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }

    Ok(config)
}

/// Read the dbt artifacts, generate LookML and write it under the output directory
fn run(config: &Config) -> Result<Report> {
    let project = DbtProjectConfig::from_file(&config.project_path())?;
    tracing::debug!("Loaded dbt project {}", project.name);

    let manifest = Manifest::from_file(&config.manifest_path())?;
    let catalog = Catalog::from_file(&config.catalog_path())?;
    let adapter = manifest.adapter()?;
    tracing::debug!("Manifest compiled for {}", adapter);

    let parsed = parse_typed_models(&manifest, &catalog, config.tag.as_deref())
        .context("Failed to read models from manifest.json")?;

    let options = GenerateOptions {
        use_file_path: config.use_file_path,
        explore_tag: config.explore_tag.clone(),
        connection: config.model_connection.clone().unwrap_or_else(|| project.name.clone()),
    };
    let generated = generate(&parsed.models, adapter, &options)?;

    let written = write_all(&config.output_dir, &generated)?;

    let output_dir = config.output_dir.display();
    tracing::info!("Generated {} lookml views in {}/views", generated.views.len(), output_dir);
    tracing::info!("Generated {} lookml models in {}", generated.models.len(), output_dir);
    tracing::info!("Success");

    let mut report = Report::new(adapter.as_str());
    report.summary.models_parsed = parsed.models.len() + parsed.skipped;
    report.summary.models_skipped = parsed.skipped;
    report.summary.views_generated = generated.views.len();
    report.summary.models_generated = generated.models.len();
    report.files = written.iter().map(|p| p.display().to_string()).collect();
    report.extend_diagnostics(parsed.diagnostics);
    report.extend_diagnostics(generated.diagnostics);

    Ok(report)
}

fn print_summary(report: &Report) {
    let summary = &report.summary;

    println!();
    println!("{}", "dbt2lookml run summary".bold().bright_blue());
    println!("  Adapter:  {}", report.adapter);
    println!(
        "  Models:   {} parsed, {} skipped",
        summary.models_parsed,
        if summary.models_skipped > 0 {
            summary.models_skipped.to_string().yellow()
        } else {
            summary.models_skipped.to_string().green()
        }
    );
    println!("  Views:    {}", summary.views_generated);
    println!("  Explores: {}", summary.models_generated);

    if report.diagnostics.is_empty() {
        println!("{}", "✓ No issues found".green().bold());
        return;
    }

    println!();
    for diag in &report.diagnostics {
        let severity = match diag.severity {
            Severity::Warn => "WARN".yellow().bold(),
            Severity::Info => "INFO".cyan(),
        };
        match &diag.location {
            Some(location) => println!("  [{}] {} ({}): {}", severity, diag.code, location, diag.message),
            None => println!("  [{}] {}: {}", severity, diag.code, diag.message),
        }
    }
}
