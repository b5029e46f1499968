//! Publish command
//!
//! One full publisher run: derive the version token from the trigger,
//! stamp the project metadata, provision the tool set, build, upload.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use gantry_adapters::{
    CredentialProvider, PipelineOptions, PublishPipeline, PythonAdapter, Toolset,
};
use gantry_core::config::load_config_or_default;
use gantry_core::trigger::ReleaseEvent;
use gantry_core::types::PublishReport;

use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Run the release publisher
#[derive(Debug, Args)]
#[command(disable_version_flag = true)]
pub struct PublishCommand {
    /// Package directory
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Trigger reference (e.g. refs/tags/2.3.1)
    #[arg(short = 'r', long = "git-ref", env = "GITHUB_REF")]
    pub git_ref: Option<String>,

    /// Explicit version for manual runs
    #[arg(long)]
    pub version: Option<String>,

    /// Secret upload token (sent as the password behind the username sentinel)
    #[arg(long, env = "PYPI_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Username sent to the upload tool
    #[arg(long)]
    pub username: Option<String>,

    /// Index server upload endpoint
    #[arg(long)]
    pub repository_url: Option<String>,

    /// Validate artifacts without uploading
    #[arg(long)]
    pub dry_run: bool,

    /// Tolerate duplicate-version rejection from the index
    #[arg(long)]
    pub skip_existing: bool,

    /// Skip tool provisioning (tools already installed)
    #[arg(long)]
    pub skip_provision: bool,
}

impl PublishCommand {
    /// Execute the publish command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        info!(
            path = %self.path.display(),
            git_ref = ?self.git_ref,
            dry_run = self.dry_run,
            "executing publish command"
        );

        let (config, _) = load_config_or_default(&self.path);

        let event = ReleaseEvent::from_parts(self.git_ref.clone(), self.version.clone());

        // Credential resolution: explicit flag/env wins, then the provider
        // chain (environment, .pypirc)
        let mut credentials = CredentialProvider::new();
        let (username, token) = match &self.token {
            Some(token) => (None, Some(token.clone())),
            None => match credentials.get("pypi")? {
                Some(cred) => (
                    Some(cred.upload_username().to_string()),
                    Some(cred.upload_password().to_string()),
                ),
                None => (None, None),
            },
        };

        let username = self
            .username
            .clone()
            .or(username)
            .unwrap_or_else(|| config.registry.username.clone());
        let registry = self
            .repository_url
            .clone()
            .unwrap_or_else(|| config.registry.url.clone());

        let options = PipelineOptions {
            dry_run: self.dry_run || config.publish.dry_run,
            skip_provision: self.skip_provision,
            skip_existing: self.skip_existing || config.publish.skip_existing,
            registry: Some(registry),
            username: Some(username),
            token,
        };

        let adapter = PythonAdapter::new()
            .with_dist_dir(config.publish.dist_dir.clone())
            .with_interpreter(config.runtime.interpreter.clone());
        let toolset = Toolset::new(config.tools.provision.clone());
        let pipeline = PublishPipeline::new(&adapter, toolset, options);

        let report = pipeline.run(&self.path, &event);
        self.output_report(&report, cli)?;

        if !report.success() {
            let failed = report
                .stages
                .iter()
                .find(|s| !s.success)
                .map(|s| s.stage)
                .unwrap_or(gantry_core::types::PublishStage::Upload);
            return Ok(exit_codes::for_failed_stage(failed));
        }

        Ok(exit_codes::SUCCESS)
    }

    fn output_report(&self, report: &PublishReport, cli: &Cli) -> anyhow::Result<()> {
        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(report)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    println!(
                        "{} {} {}",
                        if report.dry_run {
                            style("Validating").yellow()
                        } else {
                            style("Publishing").cyan()
                        },
                        style(&report.package).bold(),
                        style(&report.version).green().bold()
                    );
                    if let Some(git_ref) = &report.git_ref {
                        println!("  Trigger:  {}", style(git_ref).dim());
                    }
                    println!();

                    for stage in &report.stages {
                        if stage.success {
                            println!("  {} {}", style("✓").green().bold(), stage.stage);
                        } else {
                            println!(
                                "  {} {}: {}",
                                style("✗").red().bold(),
                                stage.stage,
                                stage.error.as_deref().unwrap_or("failed")
                            );
                        }
                    }

                    for warning in &report.warnings {
                        println!("  {} {}", style("!").yellow().bold(), warning);
                    }

                    println!();
                    if report.success() {
                        if report.published {
                            println!("{}", style("Publish successful!").green().bold());
                            println!("  Artifacts: {}", report.artifacts.len());
                        } else {
                            println!("{}", style("Dry run complete - nothing uploaded").yellow());
                        }
                    } else {
                        println!("{}", style("Publish failed").red().bold());
                    }
                } else if !report.success() {
                    crate::cli::output::error("Publish failed");
                }
            }
        }
        Ok(())
    }
}
