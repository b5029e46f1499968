//! The package adapter seam

use std::path::{Path, PathBuf};

use gantry_core::error::Result;
use gantry_core::types::PackageInfo;

use crate::credentials::CredentialProvider;
use crate::publish::{PublishOptions, ValidationResult};

/// A package ecosystem the publisher can drive.
///
/// Methods follow the order a run exercises them: detection and manifest
/// reads up front, then the version stamp, then build and upload. The
/// build and upload tools behind an adapter are opaque; they are judged
/// by exit code alone.
pub trait PackageAdapter: Send + Sync {
    /// Adapter name, e.g. "python"
    fn name(&self) -> &'static str;

    /// Upload endpoint used when none is configured
    fn default_registry(&self) -> &'static str;

    /// Whether a directory holds a package this adapter can publish
    fn detect(&self, path: &Path) -> bool;

    /// Metadata file names this adapter reads and stamps
    fn manifest_names(&self) -> &[&str];

    /// Read name and version from the package metadata
    fn get_info(&self, path: &Path) -> Result<PackageInfo>;

    /// Read the version currently recorded in the metadata
    fn get_version(&self, path: &Path) -> Result<String>;

    /// Rewrite the version recorded in the metadata to `version`.
    ///
    /// Implementations must fail rather than silently skip when the
    /// metadata carries no version field.
    fn set_version(&self, path: &Path, version: &str) -> Result<()>;

    /// Build distributable artifacts into the output directory
    fn build(&self, path: &Path) -> Result<()>;

    /// Enumerate the artifacts the build left behind
    fn artifacts(&self, path: &Path) -> Result<Vec<PathBuf>>;

    /// Upload every artifact, or only check them on a dry run
    fn publish_with_options(&self, path: &Path, options: &PublishOptions) -> Result<()>;

    /// Upload with default options
    fn publish(&self, path: &Path, dry_run: bool) -> Result<()> {
        self.publish_with_options(path, &PublishOptions::new().dry_run(dry_run))
    }

    /// Pre-publish checks: manifest readable, version present
    fn validate_publishable(&self, path: &Path) -> Result<ValidationResult> {
        let mut result = ValidationResult::pass();

        if let Err(e) = self.get_info(path) {
            result.add_error(format!("Invalid manifest: {}", e));
            return Ok(result);
        }

        match self.get_version(path) {
            Ok(version) if version.is_empty() => result.add_error("Version is not set"),
            Err(e) => result.add_error(format!("Cannot read version: {}", e)),
            _ => {}
        }

        Ok(result)
    }

    /// Whether upload credentials can be resolved for this adapter
    fn check_auth(&self, credentials: &mut CredentialProvider) -> Result<bool> {
        Ok(credentials.has_credentials(self.name()))
    }
}
