//! Configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for gantry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version of the config schema
    #[serde(rename = "$schema")]
    pub schema: Option<String>,

    /// Project name
    pub name: Option<String>,

    /// Package location configuration
    pub package: PackageConfig,

    /// Pinned runtime configuration
    pub runtime: RuntimeConfig,

    /// Tool provisioning configuration
    pub tools: ToolsConfig,

    /// Index server configuration
    pub registry: RegistryConfig,

    /// Publishing configuration
    pub publish: PublishConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: None,
            name: None,
            package: PackageConfig::default(),
            runtime: RuntimeConfig::default(),
            tools: ToolsConfig::default(),
            registry: RegistryConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

/// Package location configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// Path to the package root, relative to the config file
    pub path: PathBuf,

    /// Explicit metadata file to stamp; auto-detected when unset
    pub manifest: Option<PathBuf>,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            manifest: None,
        }
    }
}

/// Pinned runtime configuration.
///
/// The host CI provisions the interpreter itself; the pin is recorded here
/// so `validate` can flag drift between the declared and ambient runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Interpreter used to invoke build tooling
    pub interpreter: String,

    /// Pinned minor release (e.g. "3.11")
    pub version: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
            version: "3.11".to_string(),
        }
    }
}

/// A single external command in the provisioning set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Program to invoke
    pub program: String,

    /// Arguments passed to the program
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolSpec {
    /// Create a tool spec from a program and its arguments
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Render the command line for display and error messages
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Tool provisioning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Commands run in order before the build stage, short-circuiting on
    /// the first failure
    pub provision: Vec<ToolSpec>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            provision: default_provision_tools(),
        }
    }
}

/// The pinned tool set: package-installer upgrade, build tool, upload tool
pub fn default_provision_tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new("python", &["-m", "pip", "install", "--upgrade", "pip"]),
        ToolSpec::new("python", &["-m", "pip", "install", "build", "twine"]),
    ]
}

/// Index server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Upload endpoint of the index server
    pub url: String,

    /// Username sentinel sent with the secret token
    pub username: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            url: "https://upload.pypi.org/legacy/".to_string(),
            username: "__token__".to_string(),
        }
    }
}

/// Publishing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Validate artifacts without uploading
    pub dry_run: bool,

    /// Tolerate duplicate-version rejection from the index
    pub skip_existing: bool,

    /// Directory the build tool leaves artifacts in
    pub dist_dir: PathBuf,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            skip_existing: false,
            dist_dir: PathBuf::from("dist"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.registry.username, "__token__");
        assert_eq!(config.registry.url, "https://upload.pypi.org/legacy/");
        assert_eq!(config.publish.dist_dir, PathBuf::from("dist"));
        assert_eq!(config.tools.provision.len(), 2);
    }

    #[test]
    fn test_tool_spec_display() {
        let spec = ToolSpec::new("python", &["-m", "build"]);
        assert_eq!(spec.display(), "python -m build");
        let bare = ToolSpec::new("twine", &[]);
        assert_eq!(bare.display(), "twine");
    }

    #[test]
    fn test_partial_toml_roundtrip() {
        let config: Config = toml::from_str(
            r#"
name = "csae-pyutils"

[registry]
url = "https://test.pypi.org/legacy/"
"#,
        )
        .unwrap();
        assert_eq!(config.name.as_deref(), Some("csae-pyutils"));
        assert_eq!(config.registry.url, "https://test.pypi.org/legacy/");
        // Unspecified sections keep their defaults
        assert_eq!(config.registry.username, "__token__");
        assert_eq!(config.runtime.version, "3.11");
    }
}
