//! CLI definition and command handling

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{
    CompletionsCommand, InitCommand, PublishCommand, StatusCommand, ValidateCommand,
    VersionCommand,
};

/// gantry - Tag-driven package release publisher
#[derive(Debug, Parser)]
#[command(name = "gantry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize a new gantry configuration
    Init(InitCommand),

    /// Derive or inspect the release version
    Version(VersionCommand),

    /// Run the release publisher (stamp, provision, build, upload)
    Publish(PublishCommand),

    /// Show package and trigger status
    Status(StatusCommand),

    /// Validate configuration and package state
    Validate(ValidateCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Execute the CLI command, returning the process exit code
    pub fn execute(self) -> anyhow::Result<i32> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Version(ref cmd) => cmd.execute(&self),
            Commands::Publish(ref cmd) => cmd.execute(&self),
            Commands::Status(ref cmd) => cmd.execute(&self),
            Commands::Validate(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_publish_flags_parse() {
        let cli = Cli::parse_from([
            "gantry",
            "publish",
            "--git-ref",
            "refs/tags/2.3.1",
            "--dry-run",
        ]);
        match cli.command {
            Commands::Publish(cmd) => {
                assert_eq!(cmd.git_ref.as_deref(), Some("refs/tags/2.3.1"));
                assert!(cmd.dry_run);
                assert!(!cmd.skip_existing);
            }
            _ => panic!("expected publish command"),
        }
    }
}
