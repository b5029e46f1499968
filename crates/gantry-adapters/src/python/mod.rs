//! Python package adapter

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use gantry_core::error::{AdapterError, Result};
use gantry_core::types::PackageInfo;
use toml_edit::{value, DocumentMut};

use crate::publish::{PublishOptions, ValidationResult};
use crate::stamp;
use crate::traits::PackageAdapter;

/// Python package adapter (pyproject.toml with setup.py fallback)
pub struct PythonAdapter {
    /// Directory the build tool leaves artifacts in, relative to the package
    dist_dir: PathBuf,
    /// Interpreter used to invoke the build tool
    interpreter: String,
}

impl PythonAdapter {
    /// Create a new Python adapter
    pub fn new() -> Self {
        Self {
            dist_dir: PathBuf::from("dist"),
            interpreter: "python".to_string(),
        }
    }

    /// Override the artifact output directory
    pub fn with_dist_dir(mut self, dist_dir: impl Into<PathBuf>) -> Self {
        self.dist_dir = dist_dir.into();
        self
    }

    /// Override the interpreter the build stage invokes
    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    fn pyproject_path(&self, path: &Path) -> PathBuf {
        path.join("pyproject.toml")
    }

    fn setup_py_path(&self, path: &Path) -> PathBuf {
        path.join("setup.py")
    }

    /// Parse pyproject.toml preserving formatting
    fn load_pyproject(&self, path: &Path) -> Result<DocumentMut> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| AdapterError::ManifestNotFound(path.to_path_buf()))?;

        content.parse().map_err(|e: toml_edit::TomlError| {
            AdapterError::ManifestParseError(e.to_string()).into()
        })
    }

    /// Read a string field from the `[project]` table
    fn project_field(&self, doc: &DocumentMut, field: &str) -> Option<String> {
        doc.get("project")
            .and_then(|p| p.get(field))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    }

    fn dist_path(&self, path: &Path) -> PathBuf {
        path.join(&self.dist_dir)
    }

    fn has_pyproject(&self, path: &Path) -> bool {
        self.pyproject_path(path).exists()
    }

    fn has_setup_py(&self, path: &Path) -> bool {
        self.setup_py_path(path).exists()
    }
}

impl Default for PythonAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageAdapter for PythonAdapter {
    fn name(&self) -> &'static str {
        "python"
    }

    fn default_registry(&self) -> &'static str {
        "https://upload.pypi.org/legacy/"
    }

    fn detect(&self, path: &Path) -> bool {
        let found = if self.has_pyproject(path) {
            // pyproject must carry a [project] section to be publishable
            self.load_pyproject(&self.pyproject_path(path))
                .map(|doc| doc.get("project").is_some())
                .unwrap_or(false)
        } else {
            self.has_setup_py(path)
        };
        debug!(adapter = "python", path = %path.display(), found, "detecting package");
        found
    }

    fn manifest_names(&self) -> &[&str] {
        &["pyproject.toml", "setup.py"]
    }

    fn get_info(&self, path: &Path) -> Result<PackageInfo> {
        if self.has_pyproject(path) {
            let manifest_path = self.pyproject_path(path);
            let doc = self.load_pyproject(&manifest_path)?;

            let name = self.project_field(&doc, "name").ok_or_else(|| {
                AdapterError::ManifestParseError("No project.name found".to_string())
            })?;

            let version = self.project_field(&doc, "version").ok_or_else(|| {
                AdapterError::ManifestParseError("No project.version found".to_string())
            })?;

            return Ok(PackageInfo {
                name,
                version,
                package_type: "python".to_string(),
                manifest_path,
            });
        }

        // setup.py packages carry name and version as keyword arguments;
        // only the version declaration is machine-readable here
        let manifest_path = self.setup_py_path(path);
        let content = std::fs::read_to_string(&manifest_path)
            .map_err(|_| AdapterError::ManifestNotFound(manifest_path.clone()))?;

        let version = stamp::extract_version(&content).ok_or_else(|| {
            AdapterError::ManifestParseError("No version=\"...\" declaration found".to_string())
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "package".to_string());

        Ok(PackageInfo {
            name,
            version,
            package_type: "python".to_string(),
            manifest_path,
        })
    }

    fn get_version(&self, path: &Path) -> Result<String> {
        let version = self.get_info(path)?.version;
        debug!(adapter = "python", version = %version, "read version");
        Ok(version)
    }

    fn set_version(&self, path: &Path, version: &str) -> Result<()> {
        info!(adapter = "python", version, path = %path.display(), "setting version");

        if self.has_pyproject(path) {
            let manifest_path = self.pyproject_path(path);
            let mut doc = self.load_pyproject(&manifest_path)?;

            if let Some(table) = doc.get_mut("project").and_then(|p| p.as_table_mut()) {
                table["version"] = value(version);
            } else {
                return Err(AdapterError::ManifestParseError(
                    "No [project] section found".to_string(),
                )
                .into());
            }

            return std::fs::write(&manifest_path, doc.to_string())
                .map_err(|e| AdapterError::ManifestUpdateError(e.to_string()).into());
        }

        stamp::write_stamped(&self.setup_py_path(path), version).map(|_| ())
    }

    fn build(&self, path: &Path) -> Result<()> {
        info!(adapter = "python", interpreter = %self.interpreter, path = %path.display(), "building package");
        let output = Command::new(&self.interpreter)
            .args(["-m", "build"])
            .current_dir(path)
            .output()
            .map_err(|e| AdapterError::CommandFailed {
                command: format!("{} -m build", self.interpreter),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AdapterError::BuildFailed(stderr.to_string()).into());
        }

        Ok(())
    }

    fn artifacts(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let dist = self.dist_path(path);
        if !dist.exists() {
            return Err(AdapterError::NoArtifacts(dist).into());
        }

        let pattern = dist.join("*").to_string_lossy().into_owned();
        let mut artifacts: Vec<PathBuf> = glob::glob(&pattern)
            .map_err(|e| AdapterError::ManifestParseError(e.to_string()))?
            .filter_map(|entry| entry.ok())
            .filter(|p| p.is_file())
            .collect();
        artifacts.sort();

        if artifacts.is_empty() {
            return Err(AdapterError::NoArtifacts(dist).into());
        }

        debug!(adapter = "python", count = artifacts.len(), "collected artifacts");
        Ok(artifacts)
    }

    fn publish_with_options(&self, path: &Path, options: &PublishOptions) -> Result<()> {
        info!(adapter = "python", path = %path.display(), dry_run = options.dry_run, "publishing package");

        let artifacts = self.artifacts(path)?;

        // Dry runs only check the artifacts; real runs hand the credentials
        // to the upload tool on its command line. The artifact arguments
        // already carry the package-directory prefix, so the tool runs in
        // the same working directory the glob resolved against.
        let mut cmd = Command::new("twine");
        let label = if options.dry_run {
            cmd.arg("check");
            "twine check"
        } else {
            cmd.args(["upload", "--non-interactive"]);
            if let Some(registry) = &options.registry {
                cmd.arg("--repository-url").arg(registry);
            }
            if let Some(username) = &options.username {
                cmd.arg("--username").arg(username);
            }
            if let Some(password) = &options.password {
                cmd.arg("--password").arg(password);
            }
            if options.skip_existing {
                cmd.arg("--skip-existing");
            }
            "twine upload"
        };
        cmd.args(&artifacts);

        let output = cmd.output().map_err(|e| AdapterError::CommandFailed {
            command: label.to_string(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AdapterError::PublishFailed(stderr.to_string()).into());
        }

        Ok(())
    }

    fn validate_publishable(&self, path: &Path) -> Result<ValidationResult> {
        debug!(adapter = "python", path = %path.display(), "validating publishable");
        let mut result = ValidationResult::pass();

        if !self.has_pyproject(path) && !self.has_setup_py(path) {
            result.add_error("No pyproject.toml or setup.py found");
            return Ok(result);
        }

        if self.has_pyproject(path) {
            let doc = match self.load_pyproject(&self.pyproject_path(path)) {
                Ok(d) => d,
                Err(e) => {
                    result.add_error(format!("Cannot read pyproject.toml: {}", e));
                    return Ok(result);
                }
            };

            match self.project_field(&doc, "name") {
                Some(name) => {
                    // PEP 503 normalization warning
                    let normalized = name.to_lowercase().replace(['-', '.', '_'], "-");
                    if name != normalized {
                        result.add_warning(format!(
                            "Package name '{}' will be normalized to '{}' on the index",
                            name, normalized
                        ));
                    }
                }
                None => {
                    result.add_error("No project.name found");
                    return Ok(result);
                }
            }

            match self.project_field(&doc, "version") {
                Some(v) if v.is_empty() => {
                    result.add_error("Version is empty");
                }
                None => {
                    result.add_error("No project.version found");
                }
                _ => {}
            }

            if doc.get("build-system").is_none() {
                result.add_warning("No [build-system] section found");
            }
        } else {
            let content = match std::fs::read_to_string(self.setup_py_path(path)) {
                Ok(c) => c,
                Err(e) => {
                    result.add_error(format!("Cannot read setup.py: {}", e));
                    return Ok(result);
                }
            };
            match stamp::extract_version(&content) {
                Some(v) if v.is_empty() => {
                    result.add_error("Version is empty");
                }
                None => {
                    result.add_error("No version=\"...\" declaration found in setup.py");
                }
                _ => {}
            }
        }

        // The interpreter is a hard requirement; the build and upload
        // tools are provisioned later, so their absence is only a warning
        if !tool_available(&self.interpreter, &["--version"]) {
            result.add_error(format!("Interpreter '{}' is not available", self.interpreter));
        }
        if !tool_available(&self.interpreter, &["-m", "build", "--version"]) {
            result.add_warning("python-build is not installed (pip install build)");
        }
        if !tool_available("twine", &["--version"]) {
            result.add_warning("twine is not installed (pip install twine)");
        }

        Ok(result)
    }
}

/// Probe a tool by running it and checking the exit code
fn tool_available(program: &str, args: &[&str]) -> bool {
    Command::new(program)
        .args(args)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
