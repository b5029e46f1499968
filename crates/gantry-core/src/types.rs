//! Core types for gantry

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Information about a package read from its manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    /// Package name
    pub name: String,
    /// Current version string as written in the manifest
    pub version: String,
    /// Package type (e.g. "python")
    pub package_type: String,
    /// Path to the manifest the info was read from
    pub manifest_path: PathBuf,
}

/// The five ordered stages of a publisher run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishStage {
    /// Derive the version token from the trigger
    DeriveVersion,
    /// Rewrite the version field in the project metadata
    StampMetadata,
    /// Install the declared build/upload tool set
    Provision,
    /// Build distributable artifacts
    Build,
    /// Upload artifacts to the index server
    Upload,
}

impl PublishStage {
    /// All stages in execution order
    pub fn all() -> [PublishStage; 5] {
        [
            Self::DeriveVersion,
            Self::StampMetadata,
            Self::Provision,
            Self::Build,
            Self::Upload,
        ]
    }

    /// Returns the string representation of the stage
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeriveVersion => "derive-version",
            Self::StampMetadata => "stamp-metadata",
            Self::Provision => "provision",
            Self::Build => "build",
            Self::Upload => "upload",
        }
    }
}

impl std::fmt::Display for PublishStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a single stage in a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutcome {
    /// Which stage this is
    pub stage: PublishStage,
    /// Whether the stage completed successfully
    pub success: bool,
    /// Failure reason, if any
    pub error: Option<String>,
}

impl StageOutcome {
    /// A successful stage outcome
    pub fn ok(stage: PublishStage) -> Self {
        Self {
            stage,
            success: true,
            error: None,
        }
    }

    /// A failed stage outcome
    pub fn failed(stage: PublishStage, error: impl Into<String>) -> Self {
        Self {
            stage,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Result of a publisher run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishReport {
    /// The package name
    pub package: String,
    /// The version that was stamped and published
    pub version: String,
    /// The trigger reference, if the run was tag-driven
    pub git_ref: Option<String>,
    /// Whether artifacts were actually uploaded (false for dry runs)
    pub published: bool,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Artifacts produced by the build stage
    pub artifacts: Vec<PathBuf>,
    /// Per-stage outcomes, in execution order, up to the first failure
    pub stages: Vec<StageOutcome>,
    /// Any notes or warnings
    pub warnings: Vec<String>,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: Option<DateTime<Utc>>,
}

impl PublishReport {
    /// Create a new report for a starting run
    pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            version: version.into(),
            git_ref: None,
            published: false,
            dry_run: false,
            artifacts: Vec::new(),
            stages: Vec::new(),
            warnings: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Set the trigger reference
    pub fn with_git_ref(mut self, git_ref: impl Into<String>) -> Self {
        self.git_ref = Some(git_ref.into());
        self
    }

    /// Mark the run as a dry run
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Record a completed stage
    pub fn record(&mut self, outcome: StageOutcome) {
        self.stages.push(outcome);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Whether every recorded stage succeeded
    pub fn success(&self) -> bool {
        self.stages.iter().all(|s| s.success)
    }

    /// Mark the run finished
    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let stages = PublishStage::all();
        assert_eq!(stages[0], PublishStage::DeriveVersion);
        assert_eq!(stages[4], PublishStage::Upload);
        assert_eq!(stages[2].to_string(), "provision");
    }

    #[test]
    fn test_report_success_tracking() {
        let mut report = PublishReport::new("pkg", "1.2.3");
        report.record(StageOutcome::ok(PublishStage::DeriveVersion));
        assert!(report.success());

        report.record(StageOutcome::failed(PublishStage::Upload, "403 Forbidden"));
        assert!(!report.success());
        assert_eq!(report.stages.len(), 2);
    }
}
