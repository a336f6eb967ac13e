//! Render Camel K integration resources from source files
//!
//! Prints the `Integration` the step glue would submit, with explicit and
//! modeline traits merged.

use anyhow::{Context, Result};
use camelk_steps::config::{LOG_FORMAT_ENV, LOG_LEVEL_ENV};
use camelk_steps::core::{init_logging_with_config, init_structured_logging};
use camelk_steps::{IntegrationBuilder, Settings};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "camelk-steps")]
#[command(about = "Render Camel K integration resources")]
#[command(version)]
struct Cli {
    /// Integration source file, e.g. hello.groovy
    source: PathBuf,

    /// Integration name; defaults to the source file stem
    #[arg(short, long)]
    name: Option<String>,

    /// Comma separated trait list, e.g. quarkus.enabled=true,route.enabled=true
    #[arg(short, long)]
    traits: Option<String>,

    /// Comma separated dependency list
    #[arg(short, long)]
    dependencies: Option<String>,

    /// Target namespace; overrides CAMELK_NAMESPACE
    #[arg(long)]
    namespace: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    output: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::from_env().context("Failed to load settings")?;
    // RUST_LOG driven defaults unless logging is configured explicitly
    if std::env::var_os(LOG_LEVEL_ENV).is_some() || std::env::var_os(LOG_FORMAT_ENV).is_some() {
        init_logging_with_config(&settings.logging)?;
    } else {
        init_structured_logging()?;
    }

    if let Some(namespace) = cli.namespace {
        settings.namespace = namespace;
    }

    let content = std::fs::read_to_string(&cli.source)
        .with_context(|| format!("Failed to read {}", cli.source.display()))?;
    let file_name = cli
        .source
        .file_name()
        .and_then(|f| f.to_str())
        .context("Source path has no file name")?;
    let name = match cli.name {
        Some(name) => name,
        None => cli
            .source
            .file_stem()
            .and_then(|s| s.to_str())
            .context("Source path has no file stem")?
            .to_string(),
    };
    debug!("Rendering integration '{}' from {}", name, file_name);

    let mut builder = IntegrationBuilder::with_settings(&settings);
    builder.name(name)?.source(content)?.source_name(file_name)?;
    if let Some(traits) = cli.traits {
        builder.traits(traits)?;
    }
    if let Some(dependencies) = cli.dependencies {
        builder.dependencies(&dependencies)?;
    }
    let integration = builder.build()?;

    let rendered = match cli.output {
        OutputFormat::Yaml => integration.to_yaml()?,
        OutputFormat::Json => serde_json::to_string_pretty(&integration)?,
    };
    println!("{}", rendered);

    Ok(())
}
