//! Declared external command set provisioning
//!
//! The build and upload tools are opaque collaborators installed by a fixed
//! list of {program, args} pairs. The list runs in declaration order and
//! short-circuits on the first non-zero exit.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use gantry_core::config::ToolSpec;
use gantry_core::error::{AdapterError, Result};

/// The declared provisioning command set
pub struct Toolset {
    tools: Vec<ToolSpec>,
}

impl Toolset {
    /// Create a toolset from declared specs
    pub fn new(tools: Vec<ToolSpec>) -> Self {
        Self { tools }
    }

    /// The pinned default set: package-installer upgrade, build tool,
    /// upload tool.
    pub fn default_python() -> Self {
        Self::new(gantry_core::config::default_provision_tools())
    }

    /// The declared specs, in execution order
    pub fn specs(&self) -> &[ToolSpec] {
        &self.tools
    }

    /// Run every provisioning command in order, short-circuiting on the
    /// first failure.
    pub fn provision(&self, cwd: &Path) -> Result<()> {
        info!(count = self.tools.len(), "provisioning tool set");
        for spec in &self.tools {
            run_tool(spec, cwd)?;
        }
        Ok(())
    }

    /// Check which declared programs are resolvable on PATH.
    ///
    /// Returns the programs that could not be found.
    pub fn missing_programs(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for spec in &self.tools {
            if which::which(&spec.program).is_err() && !missing.contains(&spec.program) {
                missing.push(spec.program.clone());
            }
        }
        missing
    }
}

impl Default for Toolset {
    fn default() -> Self {
        Self::default_python()
    }
}

/// Run a single declared command, judging it by exit code alone.
fn run_tool(spec: &ToolSpec, cwd: &Path) -> Result<()> {
    debug!(command = %spec.display(), cwd = %cwd.display(), "running provisioning command");
    let output = Command::new(&spec.program)
        .args(&spec.args)
        .current_dir(cwd)
        .output()
        .map_err(|e| AdapterError::CommandFailed {
            command: spec.display(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(AdapterError::CommandFailed {
            command: spec.display(),
            reason: stderr.to_string(),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_toolset_declares_pinned_tools() {
        let toolset = Toolset::default_python();
        let rendered: Vec<String> = toolset.specs().iter().map(|s| s.display()).collect();
        assert_eq!(rendered.len(), 2);
        assert!(rendered[0].contains("pip install --upgrade pip"));
        assert!(rendered[1].contains("pip install build twine"));
    }

    #[cfg(unix)]
    #[test]
    fn test_provision_runs_in_order() {
        let temp = TempDir::new().unwrap();
        let toolset = Toolset::new(vec![
            ToolSpec::new("touch", &["first"]),
            ToolSpec::new("touch", &["second"]),
        ]);

        toolset.provision(temp.path()).unwrap();
        assert!(temp.path().join("first").exists());
        assert!(temp.path().join("second").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_provision_short_circuits_on_failure() {
        let temp = TempDir::new().unwrap();
        let toolset = Toolset::new(vec![
            ToolSpec::new("false", &[]),
            ToolSpec::new("touch", &["never"]),
        ]);

        assert!(toolset.provision(temp.path()).is_err());
        assert!(!temp.path().join("never").exists());
    }

    #[test]
    fn test_missing_program_reported() {
        let toolset = Toolset::new(vec![ToolSpec::new("definitely-not-a-real-tool-xyz", &[])]);
        let missing = toolset.missing_programs();
        assert_eq!(missing, vec!["definitely-not-a-real-tool-xyz".to_string()]);
    }
}
