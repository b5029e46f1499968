//! Version command

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::json;
use tracing::info;

use gantry_adapters::AdapterRegistry;
use gantry_core::trigger::{token_shape_warning, version_from_ref};

use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Derive or inspect the release version
#[derive(Debug, Args)]
pub struct VersionCommand {
    /// Package directory
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Derive the version token from a trigger reference
    #[arg(long = "from-ref", value_name = "REF")]
    pub from_ref: Option<String>,

    /// Show the version currently recorded in the manifest
    #[arg(long)]
    pub current: bool,
}

impl VersionCommand {
    /// Execute the version command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        info!(path = %self.path.display(), from_ref = ?self.from_ref, "executing version command");

        if self.current {
            return self.show_current(cli);
        }

        let git_ref = match &self.from_ref {
            Some(r) => r.clone(),
            None => match std::env::var("GITHUB_REF") {
                Ok(r) => r,
                Err(_) => return self.show_current(cli),
            },
        };

        let version = version_from_ref(&git_ref)?;
        let warning = token_shape_warning(&version);

        match cli.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "git_ref": git_ref,
                        "version": version,
                        "warning": warning,
                    }))?
                );
            }
            OutputFormat::Text => {
                if cli.quiet {
                    println!("{}", version);
                } else {
                    println!(
                        "{} {}",
                        style(&git_ref).dim(),
                        style(&version).green().bold()
                    );
                    if let Some(warning) = warning {
                        crate::cli::output::warning(&warning);
                    }
                }
            }
        }

        Ok(exit_codes::SUCCESS)
    }

    fn show_current(&self, cli: &Cli) -> anyhow::Result<i32> {
        let registry = AdapterRegistry::new();
        let adapter = registry
            .detect(&self.path)
            .ok_or_else(|| anyhow::anyhow!("no supported package found in {}", self.path.display()))?;
        let info = adapter.get_info(&self.path)?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&info)?);
            }
            OutputFormat::Text => {
                if cli.quiet {
                    println!("{}", info.version);
                } else {
                    println!(
                        "{} {}",
                        style(&info.name).bold(),
                        crate::cli::output::version_style().apply_to(&info.version)
                    );
                }
            }
        }

        Ok(exit_codes::SUCCESS)
    }
}
