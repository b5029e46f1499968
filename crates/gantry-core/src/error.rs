//! Error types for gantry

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using GantryError
pub type Result<T> = std::result::Result<T, GantryError>;

/// Main error type for gantry operations
#[derive(Debug, Error)]
pub enum GantryError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Trigger-related errors
    #[error(transparent)]
    Trigger(#[from] TriggerError),

    /// Adapter-related errors
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// Workflow-related errors
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {0}")]
    MissingField(String),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Trigger-related errors
///
/// A run is started by exactly one Release Event (a tag push or a manual
/// dispatch). These errors cover malformed or incomplete events, all of
/// which abort the run before any file is touched.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// The trigger carried no reference string at all
    #[error("Trigger reference is empty")]
    EmptyRef,

    /// The reference ends in a separator, leaving no version token
    #[error("No version token in trigger reference '{0}'")]
    EmptyToken(String),

    /// Manual run without an explicit version
    #[error("Manual trigger requires an explicit version (pass --version)")]
    MissingVersion,
}

/// Adapter-related errors
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Package manifest not found
    #[error("Package manifest not found at {0}")]
    ManifestNotFound(PathBuf),

    /// Failed to parse manifest
    #[error("Failed to parse manifest: {0}")]
    ManifestParseError(String),

    /// Failed to update manifest
    #[error("Failed to update manifest: {0}")]
    ManifestUpdateError(String),

    /// Build failed
    #[error("Failed to build package: {0}")]
    BuildFailed(String),

    /// Publish failed
    #[error("Failed to publish package: {0}")]
    PublishFailed(String),

    /// Authentication failed
    #[error("Authentication failed for registry {registry}: {reason}")]
    AuthenticationFailed { registry: String, reason: String },

    /// No artifacts were produced where the build tool should have left them
    #[error("No artifacts found in {0}")]
    NoArtifacts(PathBuf),

    /// Unsupported package type
    #[error("Unsupported package type: {0}")]
    UnsupportedType(String),

    /// Command execution failed
    #[error("Command failed: {command} - {reason}")]
    CommandFailed { command: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Workflow-related errors
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Pre-condition not met
    #[error("Pre-condition not met: {0}")]
    PreConditionFailed(String),

    /// Stage failed
    #[error("Publish stage '{stage}' failed: {reason}")]
    StageFailed { stage: String, reason: String },
}

impl GantryError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}
