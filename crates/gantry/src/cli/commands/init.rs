//! Init command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use gantry_core::config::DEFAULT_CONFIG_TEMPLATE;

use crate::cli::Cli;
use crate::exit_codes;

/// Initialize a new gantry configuration
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,

    /// Where to write the configuration
    #[arg(short, long, default_value = "gantry.toml")]
    pub output: PathBuf,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        info!(output = %self.output.display(), force = self.force, "executing init command");

        if self.output.exists() && !self.force {
            anyhow::bail!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            );
        }

        std::fs::write(&self.output, DEFAULT_CONFIG_TEMPLATE)?;

        if !cli.quiet {
            crate::cli::output::success(&format!("Created {}", self.output.display()));
            println!();
            println!(
                "  Edit {} to set your package path, registry, and tool pins.",
                style(self.output.display()).bold()
            );
        }

        Ok(exit_codes::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn quiet_cli() -> Cli {
        Cli::parse_from(["gantry", "--quiet", "init"])
    }

    #[test]
    fn test_init_writes_template() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("gantry.toml");
        let cmd = InitCommand {
            force: false,
            output: output.clone(),
        };

        cmd.execute(&quiet_cli()).unwrap();
        let content = std::fs::read_to_string(&output).unwrap();
        assert!(content.contains("__token__"));
        assert!(content.contains("upload.pypi.org"));
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("gantry.toml");
        std::fs::write(&output, "existing").unwrap();

        let cmd = InitCommand {
            force: false,
            output: output.clone(),
        };
        assert!(cmd.execute(&quiet_cli()).is_err());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "existing");

        let cmd = InitCommand {
            force: true,
            output: output.clone(),
        };
        cmd.execute(&quiet_cli()).unwrap();
        assert!(std::fs::read_to_string(&output)
            .unwrap()
            .contains("__token__"));
    }
}
