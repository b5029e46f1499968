//! Validate command

use std::path::PathBuf;
use std::process::Command;

use clap::Args;
use console::style;
use serde_json::json;
use tracing::{debug, info};

use gantry_adapters::{AdapterRegistry, CredentialProvider, PythonAdapter, Toolset};
use gantry_core::config::{load_config_or_default, validate_config, Config};

use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Validate configuration and package state
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Package directory
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        info!(path = %self.path.display(), strict = self.strict, "executing validate command");

        let mut errors: Vec<String> = Vec::new();
        let mut warnings: Vec<String> = Vec::new();

        let (config, config_path) = load_config_or_default(&self.path);
        if config_path.is_none() {
            warnings.push("no configuration file found, using defaults".to_string());
        }
        if let Err(e) = validate_config(&config) {
            errors.push(e.to_string());
        }

        // Package layout and metadata, checked with the configured
        // interpreter and output directory
        let mut registry = AdapterRegistry::empty();
        registry.register(
            PythonAdapter::new()
                .with_dist_dir(config.publish.dist_dir.clone())
                .with_interpreter(config.runtime.interpreter.clone()),
        );
        match registry.detect(&self.path) {
            Some(adapter) => match adapter.validate_publishable(&self.path) {
                Ok(result) => {
                    errors.extend(result.errors);
                    warnings.extend(result.warnings);
                }
                Err(e) => errors.push(e.to_string()),
            },
            None => errors.push(format!(
                "no supported package found in {}",
                self.path.display()
            )),
        }

        // Provisioning tools must at least resolve their interpreter
        let toolset = Toolset::new(config.tools.provision.clone());
        for program in toolset.missing_programs() {
            warnings.push(format!("provisioning tool not found on PATH: {}", program));
        }

        if let Some(drift) = runtime_drift(&config) {
            warnings.push(drift);
        }

        let mut credentials = CredentialProvider::new();
        if !credentials.has_credentials("pypi") {
            warnings.push("no upload credentials found (set PYPI_TOKEN or TWINE_PASSWORD)".to_string());
        }

        if self.strict {
            errors.append(&mut warnings);
        }

        self.output(&errors, &warnings, cli)?;

        if !errors.is_empty() {
            return Ok(exit_codes::VALIDATION_ERROR);
        }
        Ok(exit_codes::SUCCESS)
    }

    fn output(&self, errors: &[String], warnings: &[String], cli: &Cli) -> anyhow::Result<()> {
        match cli.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "passed": errors.is_empty(),
                        "errors": errors,
                        "warnings": warnings,
                    }))?
                );
            }
            OutputFormat::Text => {
                for error in errors {
                    crate::cli::output::error(error);
                }
                for warning in warnings {
                    crate::cli::output::warning(warning);
                }
                if !cli.quiet {
                    println!();
                    if errors.is_empty() {
                        println!("{}", style("Validation passed").green().bold());
                    } else {
                        println!("{}", style("Validation failed").red().bold());
                    }
                }
            }
        }
        Ok(())
    }
}

/// Compare the pinned runtime version against what the interpreter on PATH
/// actually reports, MAJOR.MINOR only.
fn runtime_drift(config: &Config) -> Option<String> {
    let output = Command::new(&config.runtime.interpreter)
        .arg("--version")
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    // "Python 3.11.4" on stdout (or stderr for old interpreters)
    let raw = if output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stderr).into_owned()
    } else {
        String::from_utf8_lossy(&output.stdout).into_owned()
    };
    let reported = raw.split_whitespace().last()?;
    let major_minor = reported.splitn(3, '.').take(2).collect::<Vec<_>>().join(".");
    debug!(pinned = %config.runtime.version, reported = %major_minor, "runtime check");
    if major_minor != config.runtime.version {
        Some(format!(
            "runtime drift: config pins {} {} but {} reports {}",
            config.runtime.interpreter, config.runtime.version, config.runtime.interpreter, reported
        ))
    } else {
        None
    }
}
