//! Shell completions generation command

use std::io;

use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use tracing::info;

use crate::cli::Cli;
use crate::exit_codes;

/// Generate shell completions
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<std::path::PathBuf>,
}

impl CompletionsCommand {
    /// Execute the completions command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<i32> {
        info!(shell = %self.shell, "executing completions command");
        let mut cmd = Cli::command();

        match &self.output {
            Some(output_path) => {
                let mut file = std::fs::File::create(output_path)?;
                generate(self.shell, &mut cmd, "gantry", &mut file);
                if !cli.quiet {
                    println!("Completions written to {}", output_path.display());
                }
            }
            None => generate(self.shell, &mut cmd, "gantry", &mut io::stdout()),
        }

        Ok(exit_codes::SUCCESS)
    }
}
