//! Upload options and pre-publish validation results

use serde::{Deserialize, Serialize};

/// Everything the upload stage needs to know.
///
/// The username defaults to the index's token sentinel when credentials
/// come from a token; the password carries the secret either way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishOptions {
    /// Check artifacts without uploading
    pub dry_run: bool,
    /// Upload endpoint; adapter default when unset
    pub registry: Option<String>,
    /// Username sent to the upload tool
    pub username: Option<String>,
    /// Secret sent as the password
    pub password: Option<String>,
    /// Tolerate duplicate-version rejection from the index
    pub skip_existing: bool,
}

impl PublishOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn skip_existing(mut self, skip_existing: bool) -> Self {
        self.skip_existing = skip_existing;
        self
    }
}

/// Accumulated outcome of pre-publish checks.
///
/// Errors block publishing; warnings are surfaced but do not.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// A clean result with nothing recorded
    pub fn pass() -> Self {
        Self::default()
    }

    /// A result that already carries one blocking error
    pub fn fail(error: impl Into<String>) -> Self {
        let mut result = Self::default();
        result.add_error(error);
        result
    }

    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// True when no blocking error was recorded
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fold another result's findings into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}
