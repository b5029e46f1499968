//! Publish pipeline orchestration
//!
//! A run is a linear sequence of five stages: derive the version token,
//! stamp it into the project metadata, provision the tool set, build, and
//! upload. Any stage failure halts the run; there are no retries and no
//! partial-success semantics. Consecutive releases are serialized by tag
//! uniqueness, and the index server's duplicate-version rejection is the
//! backstop against two runs racing to publish the same version.

use std::path::Path;

use tracing::{error, info};

use gantry_core::error::GantryError;
use gantry_core::trigger::{token_shape_warning, ReleaseEvent};
use gantry_core::types::{PublishReport, PublishStage, StageOutcome};

use crate::publish::PublishOptions;
use crate::toolset::Toolset;
use crate::traits::PackageAdapter;

/// Options for a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Validate artifacts without uploading
    pub dry_run: bool,
    /// Skip the provisioning stage (tools already installed)
    pub skip_provision: bool,
    /// Tolerate duplicate-version rejection from the index
    pub skip_existing: bool,
    /// Upload endpoint of the index server
    pub registry: Option<String>,
    /// Username sentinel sent with the secret
    pub username: Option<String>,
    /// Secret credential used as the password
    pub token: Option<String>,
}

impl PipelineOptions {
    /// Create options for a dry run
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Default::default()
        }
    }

    /// Set the registry URL
    pub fn with_registry(mut self, registry: impl Into<String>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    /// Set the secret credential
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Execute a publisher run over a package adapter
pub struct PublishPipeline<'a> {
    adapter: &'a dyn PackageAdapter,
    toolset: Toolset,
    options: PipelineOptions,
}

impl<'a> PublishPipeline<'a> {
    /// Create a new pipeline
    pub fn new(adapter: &'a dyn PackageAdapter, toolset: Toolset, options: PipelineOptions) -> Self {
        Self {
            adapter,
            toolset,
            options,
        }
    }

    /// Run the five stages in order, fail-fast.
    ///
    /// The report records each completed stage up to and including the
    /// first failure; `report.success()` tells the caller how the run
    /// ended.
    pub fn run(&self, path: &Path, event: &ReleaseEvent) -> PublishReport {
        let package = self
            .adapter
            .get_info(path)
            .map(|info| info.name)
            .unwrap_or_else(|_| "package".to_string());

        info!(
            package = %package,
            trigger = %event.kind,
            dry_run = self.options.dry_run,
            "starting publish run"
        );

        let mut report = PublishReport::new(package, "")
            .with_dry_run(self.options.dry_run);
        if let Some(git_ref) = &event.git_ref {
            report = report.with_git_ref(git_ref.clone());
        }

        // Stage 1: derive the version token
        let version = match event.resolve_version() {
            Ok(version) => {
                if let Some(warning) = token_shape_warning(&version) {
                    report.add_warning(warning);
                }
                report.version = version.clone();
                report.record(StageOutcome::ok(PublishStage::DeriveVersion));
                version
            }
            Err(e) => {
                return self.abort(report, PublishStage::DeriveVersion, e);
            }
        };

        // Stage 2: stamp the metadata file
        if let Err(e) = self.adapter.set_version(path, &version) {
            return self.abort(report, PublishStage::StampMetadata, e);
        }
        report.record(StageOutcome::ok(PublishStage::StampMetadata));

        // Stage 3: provision the declared tool set
        if self.options.skip_provision {
            info!(stage = %PublishStage::Provision, "skipped by request");
            report.record(StageOutcome::ok(PublishStage::Provision));
        } else if let Err(e) = self.toolset.provision(path) {
            return self.abort(report, PublishStage::Provision, e);
        } else {
            report.record(StageOutcome::ok(PublishStage::Provision));
        }

        // Stage 4: build artifacts
        if let Err(e) = self.adapter.build(path) {
            return self.abort(report, PublishStage::Build, e);
        }
        match self.adapter.artifacts(path) {
            Ok(artifacts) => report.artifacts = artifacts,
            Err(e) => {
                return self.abort(report, PublishStage::Build, e);
            }
        }
        report.record(StageOutcome::ok(PublishStage::Build));

        // Stage 5: upload
        let publish_options = self.publish_options();
        if let Err(e) = self.adapter.publish_with_options(path, &publish_options) {
            return self.abort(report, PublishStage::Upload, e);
        }
        report.record(StageOutcome::ok(PublishStage::Upload));
        report.published = !self.options.dry_run;

        report.finish();
        info!(
            version = %report.version,
            artifacts = report.artifacts.len(),
            published = report.published,
            "publish run complete"
        );
        report
    }

    fn publish_options(&self) -> PublishOptions {
        let mut options = PublishOptions::new()
            .dry_run(self.options.dry_run)
            .skip_existing(self.options.skip_existing);
        if let Some(registry) = &self.options.registry {
            options = options.registry(registry.clone());
        }
        options = options.username(
            self.options
                .username
                .clone()
                .unwrap_or_else(|| crate::credentials::TOKEN_USERNAME.to_string()),
        );
        if let Some(token) = &self.options.token {
            options = options.password(token.clone());
        }
        options
    }

    fn abort(&self, mut report: PublishReport, stage: PublishStage, e: GantryError) -> PublishReport {
        error!(stage = %stage, error = %e, "publish stage failed, aborting run");
        report.record(StageOutcome::failed(stage, e.to_string()));
        report.finish();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use gantry_core::error::{AdapterError, Result};
    use gantry_core::types::PackageInfo;

    use crate::publish::ValidationResult;

    /// Adapter double that records calls and fails on request
    struct FakeAdapter {
        calls: Mutex<Vec<String>>,
        fail_stamp: bool,
        fail_build: bool,
        fail_publish: bool,
    }

    impl FakeAdapter {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_stamp: false,
                fail_build: false,
                fail_publish: false,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn log(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }
    }

    impl PackageAdapter for FakeAdapter {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn default_registry(&self) -> &'static str {
            "https://example.invalid/legacy/"
        }

        fn detect(&self, _path: &Path) -> bool {
            true
        }

        fn manifest_names(&self) -> &[&str] {
            &["fake.toml"]
        }

        fn get_info(&self, _path: &Path) -> Result<PackageInfo> {
            Ok(PackageInfo {
                name: "csae-pyutils".to_string(),
                version: "0.0.0".to_string(),
                package_type: "fake".to_string(),
                manifest_path: PathBuf::from("fake.toml"),
            })
        }

        fn get_version(&self, _path: &Path) -> Result<String> {
            Ok("0.0.0".to_string())
        }

        fn set_version(&self, _path: &Path, version: &str) -> Result<()> {
            self.log(format!("set_version {}", version));
            if self.fail_stamp {
                return Err(
                    AdapterError::ManifestUpdateError("no version declaration".to_string()).into(),
                );
            }
            Ok(())
        }

        fn build(&self, _path: &Path) -> Result<()> {
            self.log("build");
            if self.fail_build {
                return Err(AdapterError::BuildFailed("bad layout".to_string()).into());
            }
            Ok(())
        }

        fn artifacts(&self, _path: &Path) -> Result<Vec<PathBuf>> {
            Ok(vec![PathBuf::from("dist/pkg-2.3.1.tar.gz")])
        }

        fn publish_with_options(&self, _path: &Path, options: &PublishOptions) -> Result<()> {
            self.log(format!(
                "publish user={} pass={}",
                options.username.as_deref().unwrap_or("-"),
                options.password.as_deref().unwrap_or("-")
            ));
            if self.fail_publish {
                return Err(AdapterError::PublishFailed("403 duplicate version".to_string()).into());
            }
            Ok(())
        }

        fn validate_publishable(&self, _path: &Path) -> Result<ValidationResult> {
            Ok(ValidationResult::pass())
        }
    }

    fn pipeline_options() -> PipelineOptions {
        PipelineOptions {
            skip_provision: true,
            token: Some("pypi-secret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_tag_release() {
        let adapter = FakeAdapter::new();
        let pipeline = PublishPipeline::new(&adapter, Toolset::new(vec![]), pipeline_options());

        let event = ReleaseEvent::tag_release("refs/tags/2.3.1");
        let report = pipeline.run(Path::new("."), &event);

        assert!(report.success());
        assert!(report.published);
        assert_eq!(report.version, "2.3.1");
        assert_eq!(report.stages.len(), 5);
        assert_eq!(report.artifacts.len(), 1);
        assert_eq!(
            adapter.calls(),
            vec![
                "set_version 2.3.1",
                "build",
                "publish user=__token__ pass=pypi-secret"
            ]
        );
    }

    #[test]
    fn test_upload_failure_fails_run() {
        let mut adapter = FakeAdapter::new();
        adapter.fail_publish = true;
        let pipeline = PublishPipeline::new(&adapter, Toolset::new(vec![]), pipeline_options());

        let event = ReleaseEvent::tag_release("refs/tags/2.3.1");
        let report = pipeline.run(Path::new("."), &event);

        assert!(!report.success());
        assert!(!report.published);
        let last = report.stages.last().unwrap();
        assert_eq!(last.stage, PublishStage::Upload);
        assert!(last.error.as_deref().unwrap().contains("duplicate version"));
    }

    #[test]
    fn test_stamp_failure_short_circuits() {
        let mut adapter = FakeAdapter::new();
        adapter.fail_stamp = true;
        let pipeline = PublishPipeline::new(&adapter, Toolset::new(vec![]), pipeline_options());

        let event = ReleaseEvent::tag_release("refs/tags/2.3.1");
        let report = pipeline.run(Path::new("."), &event);

        assert!(!report.success());
        // Nothing after the failed stage ran
        assert_eq!(adapter.calls(), vec!["set_version 2.3.1"]);
        assert_eq!(
            report.stages.last().unwrap().stage,
            PublishStage::StampMetadata
        );
    }

    #[test]
    fn test_build_failure_prevents_upload() {
        let mut adapter = FakeAdapter::new();
        adapter.fail_build = true;
        let pipeline = PublishPipeline::new(&adapter, Toolset::new(vec![]), pipeline_options());

        let event = ReleaseEvent::tag_release("refs/tags/2.3.1");
        let report = pipeline.run(Path::new("."), &event);

        assert!(!report.success());
        assert_eq!(adapter.calls(), vec!["set_version 2.3.1", "build"]);
    }

    #[test]
    fn test_manual_without_version_aborts_before_stamping() {
        let adapter = FakeAdapter::new();
        let pipeline = PublishPipeline::new(&adapter, Toolset::new(vec![]), pipeline_options());

        let event = ReleaseEvent::from_parts(None, None);
        let report = pipeline.run(Path::new("."), &event);

        assert!(!report.success());
        assert!(adapter.calls().is_empty());
        assert_eq!(
            report.stages.last().unwrap().stage,
            PublishStage::DeriveVersion
        );
    }

    #[test]
    fn test_dry_run_is_not_published() {
        let adapter = FakeAdapter::new();
        let mut options = pipeline_options();
        options.dry_run = true;
        let pipeline = PublishPipeline::new(&adapter, Toolset::new(vec![]), options);

        let event = ReleaseEvent::manual("1.0.0");
        let report = pipeline.run(Path::new("."), &event);

        assert!(report.success());
        assert!(!report.published);
        assert!(report.dry_run);
    }

    #[test]
    fn test_odd_token_shape_warns_but_runs() {
        let adapter = FakeAdapter::new();
        let pipeline = PublishPipeline::new(&adapter, Toolset::new(vec![]), pipeline_options());

        let event = ReleaseEvent::tag_release("refs/tags/nightly");
        let report = pipeline.run(Path::new("."), &event);

        assert!(report.success());
        assert_eq!(report.version, "nightly");
        assert!(!report.warnings.is_empty());
    }
}
