//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.seodrill.toml` files.

use crate::cli::OutputFormat;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = ".seodrill.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Audit export to read when no INPUT argument is given.
    #[serde(default = "default_input")]
    pub input: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Abort on records without `issues` or `severity`.
    /// If false, severity metrics are skipped with a warning instead.
    #[serde(default = "default_true")]
    pub strict: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            verbose: false,
            strict: true,
        }
    }
}

fn default_input() -> String {
    "sample.json".to_string()
}

fn default_true() -> bool {
    true
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Report file path; stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Number of most problematic pages to list.
    #[serde(default = "default_top_pages")]
    pub top_pages: usize,

    /// Decimal places for percentages and scores.
    #[serde(default = "default_precision")]
    pub precision: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            output: None,
            top_pages: default_top_pages(),
            precision: default_precision(),
        }
    }
}

fn default_top_pages() -> usize {
    5
}

fn default_precision() -> usize {
    1
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load configuration from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.general.input = input.display().to_string();
        }

        if args.strict {
            self.general.strict = true;
        } else if args.lenient {
            self.general.strict = false;
        }

        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(ref output) = args.output {
            self.report.output = Some(output.display().to_string());
        }
        if let Some(top_pages) = args.top_pages {
            self.report.top_pages = top_pages;
        }
    }

    /// Path of the audit export to read.
    pub fn input_path(&self) -> PathBuf {
        PathBuf::from(&self.general.input)
    }

    /// Path of the report file, if the report is not written to stdout.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.report.output.as_ref().map(PathBuf::from)
    }

    /// Check settings that only make sense once file and CLI are merged.
    pub fn validate(&self) -> Result<()> {
        if let Some(output) = self.output_path() {
            if same_file(&output, &self.input_path()) {
                bail!(
                    "Output file {} must differ from the input file",
                    output.display()
                );
            }
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

/// Whether two paths name the same file, resolving them when both exist.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Args;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.input, "sample.json");
        assert!(config.general.strict);
        assert_eq!(config.report.format, OutputFormat::Text);
        assert_eq!(config.report.top_pages, 5);
        assert!(config.output_path().is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
input = "exports/crawl.json"
strict = false

[report]
format = "markdown"
output = "report.md"
top_pages = 10
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.input_path(), PathBuf::from("exports/crawl.json"));
        assert!(!config.general.strict);
        assert_eq!(config.report.format, OutputFormat::Markdown);
        assert_eq!(config.output_path(), Some(PathBuf::from("report.md")));
        assert_eq!(config.report.top_pages, 10);
        assert_eq!(config.report.precision, 1);
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.report.top_pages = 10;

        let args = Args {
            input: Some(PathBuf::from("crawl.json")),
            format: Some(OutputFormat::Json),
            lenient: true,
            ..Args::default()
        };
        config.merge_with_args(&args);

        assert_eq!(config.general.input, "crawl.json");
        assert_eq!(config.report.format, OutputFormat::Json);
        assert!(!config.general.strict);
        // Not given on the command line, so the file value stays
        assert_eq!(config.report.top_pages, 10);
    }

    #[test]
    fn test_validate_output_from_args_against_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("crawl.json");
        std::fs::write(&input, "[]").unwrap();

        let mut config: Config =
            toml::from_str(&format!("[general]\ninput = {:?}\n", input.display().to_string()))
                .unwrap();
        assert!(config.validate().is_ok());

        let args = Args {
            output: Some(input.clone()),
            ..Args::default()
        };
        config.merge_with_args(&args);
        assert!(config.validate().is_err());

        config.report.output = Some(dir.path().join("report.md").display().to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("crawl.json"), "[]").unwrap();

        let mut config = Config::default();
        config.general.input = dir.path().join("crawl.json").display().to_string();
        config.report.output = Some(
            dir.path()
                .join(".")
                .join("crawl.json")
                .display()
                .to_string(),
        );
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE_NAME)).unwrap();
        writeln!(file, "[report]\nformat = \"json\"").unwrap();

        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.report.format, OutputFormat::Json);
    }

    #[test]
    fn test_load_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[report\nformat = ").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[report]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.general.input, "sample.json");
    }
}
