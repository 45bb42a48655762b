//! seodrill - issue drilldown for SEO site-audit exports
//!
//! A CLI tool that reads a JSON export of scanned pages and reports
//! pages scanned, per-category issue drilldowns and high-severity metrics.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Input file not found, IO or usage error
//!   2 - Input is not valid JSON
//!   3 - Malformed page or issue record

mod analysis;
mod cli;
mod config;
mod error;
mod loader;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::Config;
use error::AuditError;
use models::{ReportMetadata, Summary};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&args, &config);

    info!("seodrill v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let summary = match run(&config) {
        Ok(summary) => summary,
        Err(e) => {
            error!("Audit summary failed: {}", e);
            eprintln!("{}", e);
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = emit_report(&summary, &config) {
        error!("Failed to emit report: {}", e);
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}

/// Handle --init-config: generate a default .seodrill.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(config::CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            config::CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", config::CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", config::CONFIG_FILE_NAME);
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// Logs go to stderr so the report on stdout stays parseable.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber is already installed");
    }
}

/// Load the audit export and compute every statistic.
///
/// Loading short-circuits: nothing is aggregated unless the export was
/// read and decoded successfully.
fn run(config: &Config) -> Result<Summary, AuditError> {
    let input = config.input_path();
    info!("Loading audit export: {}", input.display());

    let dataset = loader::load_dataset(&input)?;
    info!("Pages scanned: {}", dataset.pages_scanned);

    let pages = &dataset.pages;

    let metrics = match analysis::compute_metrics(pages) {
        Ok(metrics) => Some(metrics),
        Err(e) if !config.general.strict => {
            warn!("Skipping severity metrics: {}", e);
            None
        }
        Err(e) => return Err(e.into()),
    };

    let drilldown_all = analysis::drilldown_all(pages);
    let drilldown_high = analysis::drilldown_high(pages);
    debug!("Drilldown (all): {}", drilldown_all);
    debug!("Drilldown (high): {}", drilldown_high);

    let severity = analysis::severity_breakdown(pages);
    let categories = analysis::category_breakdown(pages);
    let page_stats = analysis::page_breakdown(pages, config.report.top_pages);
    let dashboard =
        analysis::dashboard_stats(dataset.pages_scanned, &drilldown_all, &drilldown_high);

    Ok(Summary {
        metadata: ReportMetadata {
            input: input.display().to_string(),
            generated_at: Utc::now(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        pages_scanned: dataset.pages_scanned,
        drilldown_all,
        drilldown_high,
        metrics,
        severity,
        categories,
        pages: page_stats,
        dashboard,
    })
}

/// Render the summary and write it to the configured destination.
fn emit_report(summary: &Summary, config: &Config) -> Result<(), AuditError> {
    let output = report::render(summary, config.report.format, config.report.precision)?;

    match config.output_path() {
        Some(path) => {
            std::fs::write(&path, &output).map_err(|source| AuditError::Output {
                path: path.clone(),
                source,
            })?;
            info!("Report saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    if let Some(line) = console_line(summary, config) {
        println!("{}", line);
    }

    Ok(())
}

/// Extra stdout line when the report itself went to a file.
///
/// A text report on stdout already ends with the drilldown line, and
/// Markdown/JSON on stdout must stay unmixed.
fn console_line(summary: &Summary, config: &Config) -> Option<String> {
    config
        .output_path()
        .map(|_| report::drilldown_line(&summary.drilldown_high))
}

/// Load configuration from file or use defaults, then apply CLI arguments.
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        // Try explicit config path
        Some(ref config_path) => Config::load(config_path)?,
        None => match Config::load_default() {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                eprintln!("Warning: {:#}; using defaults", e);
                Config::default()
            }
        },
    };

    config.merge_with_args(args);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DrilldownCategory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn config_for(path: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.general.input = path.display().to_string();
        config
    }

    fn write_export(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_run_sample() {
        let file = write_export(
            r#"[
                {"issues": [{"type": "H1", "severity": "HIGH"}, {"type": "Canonical", "severity": "LOW"}]},
                {"issues": [{"type": "Meta Description", "severity": "HIGH"}]}
            ]"#,
        );

        let summary = run(&config_for(file.path())).unwrap();

        assert_eq!(summary.pages_scanned, 2);
        assert_eq!(summary.drilldown_all.categorized(), 3);
        assert_eq!(
            summary.drilldown_high.get(DrilldownCategory::Canonical),
            0
        );
        let metrics = summary.metrics.unwrap();
        assert_eq!(metrics.high_severity_count, 2);
        assert_eq!(metrics.total_count, 3);
        assert_eq!(summary.dashboard.critical_issues, 2);
    }

    #[test]
    fn test_run_missing_file_short_circuits() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&config_for(&dir.path().join("sample.json"))).unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().ends_with("not found. Check the path."));
    }

    #[test]
    fn test_run_decode_error() {
        let file = write_export("not json");
        let err = run(&config_for(file.path())).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_run_strict_rejects_missing_severity() {
        let file = write_export(r#"[{"issues": [{"type": "H1"}]}]"#);
        let err = run(&config_for(file.path())).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_run_lenient_skips_metrics() {
        let file = write_export(r#"[{"issues": [{"type": "H1"}]}, {}]"#);
        let mut config = config_for(file.path());
        config.general.strict = false;

        let summary = run(&config).unwrap();
        assert!(summary.metrics.is_none());
        assert_eq!(summary.drilldown_all.get(DrilldownCategory::Heading), 1);
        assert_eq!(summary.pages.without_issues, 1);
    }

    #[test]
    fn test_run_tolerates_oddly_typed_extra_fields() {
        let file = write_export(
            r#"[
                {"title": {"text": "Home"}, "issues": [{"type": "H1", "severity": "HIGH"}]},
                {"issues": [{"type": "Canonical", "severity": "HIGH", "explanation": ["a", "b"]}]}
            ]"#,
        );
        let mut config = config_for(file.path());
        config.general.strict = false;

        let summary = run(&config).unwrap();
        assert_eq!(summary.pages_scanned, 2);
        assert_eq!(summary.drilldown_high.get(DrilldownCategory::Heading), 1);
        assert_eq!(summary.drilldown_high.get(DrilldownCategory::Canonical), 1);
        assert_eq!(summary.metrics.unwrap().high_severity_count, 2);
    }

    #[test]
    fn test_console_line_only_with_output_file() {
        let file = write_export(r#"[{"issues": [{"type": "H2", "severity": "HIGH"}]}]"#);
        let mut config = config_for(file.path());
        let summary = run(&config).unwrap();

        assert_eq!(console_line(&summary, &config), None);

        config.report.format = cli::OutputFormat::Json;
        config.report.output = Some("report.json".to_string());
        assert_eq!(
            console_line(&summary, &config).as_deref(),
            Some("Drilldown Data: {'Heading': 1, 'Canonical': 0, 'Meta Description': 0}")
        );
    }

    #[test]
    fn test_emit_report_to_file() {
        let file = write_export(r#"[{"issues": []}]"#);
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.json");

        let mut config = config_for(file.path());
        config.report.format = cli::OutputFormat::Json;
        config.report.output = Some(output.display().to_string());

        let summary = run(&config).unwrap();
        emit_report(&summary, &config).unwrap();

        let written = std::fs::read_to_string(&output).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["pages_scanned"], 1);
        assert_eq!(value["metrics"]["high_severity_percentage"], 0.0);
    }
}
