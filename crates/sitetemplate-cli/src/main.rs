//! sitetemplate - expand a site template against JSON data
//!
//! Reads a template (JSON or YAML) and a data document, runs a build and
//! prints the resolved site and groups to stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use sitetemplate::{BuildOptions, BuildOutput, TemplateBuilder, TemplateNode};

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Output serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Parser, Debug)]
#[clap(
    name = "sitetemplate",
    about = "Expand a site template against JSON data",
    version
)]
struct Cli {
    /// Template file (.json, .yaml or .yml)
    #[clap(long)]
    template: PathBuf,

    /// Data file, or "-" to read from stdin
    #[clap(long)]
    data: PathBuf,

    /// Output format
    #[clap(long, value_enum, default_value = "json")]
    output: OutputFormat,

    /// Build options file (YAML)
    #[clap(long)]
    config: Option<PathBuf>,

    /// Abort the build when a loop iteration fails
    #[clap(long)]
    fail_fast: bool,

    /// Template child holding the site structure
    #[clap(long)]
    site_node: Option<String>,

    /// Set log level
    #[clap(long, value_enum, default_value = "warn")]
    log_level: LogLevel,
}

/// Initialize tracing; logs go to stderr so stdout stays parseable.
fn initialize_tracing(log_level: &LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.to_filter_directive()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level);

    let template = load_template(&cli.template)?;
    let data = load_data(&cli.data)?;
    let options = resolve_options(&cli)?;
    debug!(?options, "build options");

    let output = TemplateBuilder::new(&template, &data)
        .with_options(options)
        .build()
        .with_context(|| format!("Failed to build template {}", cli.template.display()))?;

    for failure in &output.warnings {
        warn!("{}", failure);
    }
    info!(
        entries = output.site.len(),
        groups = output.groups.len(),
        complete = output.is_complete(),
        "build finished"
    );

    println!("{}", render(&output, cli.output)?);
    Ok(())
}

fn load_template(path: &Path) -> Result<TemplateNode> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read template {}", path.display()))?;
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("template");

    let node = if is_yaml(path) {
        TemplateNode::from_yaml_str(name, &source)
    } else {
        TemplateNode::from_json_str(name, &source)
    };
    node.with_context(|| format!("Failed to parse template {}", path.display()))
}

fn load_data(path: &Path) -> Result<serde_json::Value> {
    let source = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read data from stdin")?;
        buffer
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read data {}", path.display()))?
    };
    serde_json::from_str(&source).context("Data is not valid JSON")
}

/// Options file first, then command-line overrides.
fn resolve_options(cli: &Cli) -> Result<BuildOptions> {
    let mut options = match &cli.config {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            BuildOptions::from_yaml_str(&source)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => BuildOptions::default(),
    };
    if cli.fail_fast {
        options = options.fail_fast();
    }
    if let Some(name) = &cli.site_node {
        options = options.site_node(name.as_str());
    }
    Ok(options)
}

fn render(output: &BuildOutput, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(output).context("Failed to serialize output as JSON")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(output).context("Failed to serialize output as YAML")
        }
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_yaml_by_extension() {
        assert!(is_yaml(Path::new("site.yaml")));
        assert!(is_yaml(Path::new("dir/site.yml")));
        assert!(!is_yaml(Path::new("site.json")));
        assert!(!is_yaml(Path::new("site")));
    }

    #[test]
    fn command_line_overrides_defaults() {
        let cli = Cli::parse_from([
            "sitetemplate",
            "--template",
            "t.json",
            "--data",
            "-",
            "--fail-fast",
            "--site-node",
            "pages",
        ]);
        let options = resolve_options(&cli).unwrap();
        assert_eq!(options, BuildOptions::new().fail_fast().site_node("pages"));
        assert_eq!(cli.output, OutputFormat::Json);
    }
}
