//! Adapter registry

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use gantry_core::error::Result;
use gantry_core::types::PackageInfo;

use crate::python::PythonAdapter;
use crate::traits::PackageAdapter;

/// Registry of available package adapters
pub struct AdapterRegistry {
    adapters: Vec<Arc<dyn PackageAdapter>>,
}

impl AdapterRegistry {
    /// Create a new registry with all built-in adapters
    pub fn new() -> Self {
        Self {
            adapters: vec![Arc::new(PythonAdapter::new())],
        }
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Register an adapter
    pub fn register<A: PackageAdapter + 'static>(&mut self, adapter: A) {
        self.adapters.push(Arc::new(adapter));
    }

    /// Get adapter by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn PackageAdapter>> {
        self.adapters.iter().find(|a| a.name() == name).cloned()
    }

    /// Detect which adapter applies to a path
    pub fn detect(&self, path: &Path) -> Option<Arc<dyn PackageAdapter>> {
        self.adapters.iter().find(|a| a.detect(path)).cloned()
    }

    /// Get all registered adapters
    pub fn all(&self) -> &[Arc<dyn PackageAdapter>] {
        &self.adapters
    }

    /// Get adapter names
    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect packages in a directory
#[instrument(skip_all, fields(path = %path.display()))]
pub fn detect_packages(path: &Path) -> Result<Vec<PackageInfo>> {
    let registry = AdapterRegistry::new();
    let mut packages = Vec::new();

    for adapter in registry.all() {
        if adapter.detect(path) {
            if let Ok(info) = adapter.get_info(path) {
                packages.push(info);
            }
        }
    }

    debug!(count = packages.len(), "detected packages");
    Ok(packages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_registry_creation() {
        let registry = AdapterRegistry::new();
        assert!(!registry.all().is_empty());
    }

    #[test]
    fn test_get_adapter() {
        let registry = AdapterRegistry::new();

        assert!(registry.get("python").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_detect_python_package() {
        let registry = AdapterRegistry::new();
        let temp = TempDir::new().unwrap();

        assert!(registry.detect(temp.path()).is_none());

        std::fs::write(
            temp.path().join("pyproject.toml"),
            "[project]\nname = \"pkg\"\nversion = \"0.1.0\"\n",
        )
        .unwrap();

        let adapter = registry.detect(temp.path()).unwrap();
        assert_eq!(adapter.name(), "python");
    }

    #[test]
    fn test_detect_packages_reads_info() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("pyproject.toml"),
            "[project]\nname = \"csae-pyutils\"\nversion = \"1.4.0\"\n",
        )
        .unwrap();

        let packages = detect_packages(temp.path()).unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].name, "csae-pyutils");
        assert_eq!(packages[0].version, "1.4.0");
    }
}
