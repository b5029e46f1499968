//! Status command

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde_json::json;
use tracing::info;

use gantry_adapters::{detect_packages, CredentialProvider, Toolset};
use gantry_core::config::load_config_or_default;
use gantry_core::trigger::ReleaseEvent;

use crate::cli::{output, Cli, OutputFormat};
use crate::exit_codes;

/// Show package and trigger status
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Package directory
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

impl StatusCommand {
    /// Execute the status command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        info!(path = %self.path.display(), "executing status command");

        let (config, config_path) = load_config_or_default(&self.path);
        let packages = detect_packages(&self.path).unwrap_or_default();

        let event = ReleaseEvent::from_ci_env();
        let derived = event.as_ref().and_then(|e| e.resolve_version().ok());

        let mut credentials = CredentialProvider::new();
        let has_credentials = credentials.has_credentials("pypi");

        let toolset = Toolset::new(config.tools.provision.clone());
        let missing_tools = toolset.missing_programs();

        match cli.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({
                        "config": config_path,
                        "registry": config.registry.url,
                        "packages": packages,
                        "trigger": event,
                        "derived_version": derived,
                        "credentials": has_credentials,
                        "missing_tools": missing_tools,
                    }))?
                );
            }
            OutputFormat::Text => {
                println!("{}", style("Gantry status").bold());
                println!();

                match &config_path {
                    Some(path) => {
                        println!("{}", output::key_value("config", &path.display().to_string()))
                    }
                    None => println!("{}", output::key_value("config", "(defaults)")),
                }
                println!("{}", output::key_value("registry", &config.registry.url));
                println!();

                if packages.is_empty() {
                    println!("  {} no supported package detected", style("!").yellow().bold());
                } else {
                    for package in &packages {
                        println!(
                            "  {} {} {} ({})",
                            style("●").cyan(),
                            style(&package.name).bold(),
                            style(&package.version).green(),
                            package.package_type
                        );
                    }
                }
                println!();

                match (&event, &derived) {
                    (Some(event), Some(version)) => {
                        if let Some(git_ref) = &event.git_ref {
                            println!("  Trigger:  {}", style(git_ref).dim());
                        }
                        println!("  Version:  {}", style(version).green().bold());
                    }
                    (Some(event), None) => {
                        if let Some(git_ref) = &event.git_ref {
                            println!("  Trigger:  {} (no version token)", style(git_ref).dim());
                        }
                    }
                    _ => println!("  Trigger:  {}", style("none (not in CI)").dim()),
                }
                println!();

                if has_credentials {
                    println!("  {} upload credentials available", style("✓").green().bold());
                } else {
                    println!("  {} no upload credentials found", style("!").yellow().bold());
                }
                for program in &missing_tools {
                    println!(
                        "  {} tool not on PATH: {}",
                        style("!").yellow().bold(),
                        program
                    );
                }
            }
        }

        Ok(exit_codes::SUCCESS)
    }
}
