//! Checks plugin settings files from the command line.

use std::{
    error::Error,
    path::{Path, PathBuf},
    process,
};

use clap::{Parser, Subcommand};
use plugin_settings::{
    logging::LogLevel,
    settings::{CollectingSink, MapSource, ReloadReport, Setting, SettingsRegistry},
    tracing_config,
    validators::string_form,
};
use serde::Serialize;
use tracing::{debug, instrument};

#[derive(Parser)]
#[command(name = "plugin-settings")]
#[command(about = "Validate plugin settings files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report invalid values and unknown keys in a settings file
    Check {
        file: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the value a setting resolves to
    Get { file: PathBuf, name: String },
}

#[derive(Serialize)]
struct CheckOutput {
    diagnostics: Vec<String>,
    values: toml::Table,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let _logging = tracing_config::init(LogLevel::Warning)?;

    match cli.command {
        Commands::Check { file, json } => {
            let (registry, report, diagnostics) = resolve(&file)?;

            if json {
                let output = CheckOutput {
                    diagnostics,
                    values: registry.snapshot(),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for message in &diagnostics {
                    eprintln!("{message}");
                }
                for name in registry.names() {
                    println!("{} = {}", name, string_form(registry.value(name)?));
                }
            }

            if report.has_diagnostics() {
                process::exit(1);
            }
        }
        Commands::Get { file, name } => {
            let (registry, _report, _diagnostics) = resolve(&file)?;
            println!("{}", string_form(registry.value(&name)?));
        }
    }

    Ok(())
}

/// Builds the plugin settings and reloads them once from `file`.
#[instrument]
fn resolve(file: &Path) -> Result<(SettingsRegistry, ReloadReport, Vec<String>), Box<dyn Error>> {
    let source = MapSource::load(file)?;
    let sink = CollectingSink::new();

    let mut registry = SettingsRegistry::new(sink.clone());
    registry.register(Setting::log_level(
        plugin_settings::settings::LOG_LEVEL,
        &LogLevel::default().to_string(),
    )?)?;

    let report = registry.reload(&source);
    debug!(
        "Resolved {} setting(s), {} change(s)",
        registry.len(),
        report.changes.len()
    );

    Ok((registry, report, sink.take()))
}
