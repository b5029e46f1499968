//! Version stamping for `version = "..."` style metadata
//!
//! The rewrite itself is a pure function over file contents so it can be
//! tested without touching the filesystem; the on-disk update goes through
//! a scoped write that either fully replaces the file or leaves the
//! original untouched.

use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info};

use gantry_core::error::{AdapterError, Result, TriggerError};

/// Line-anchored `version = "..."` declaration, quoted value captured.
fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?m)^(?P<prefix>\s*version\s*=\s*")(?P<value>[^"]*)(?P<suffix>")"#)
            .expect("version pattern is valid")
    })
}

/// Result of a pure stamping pass
#[derive(Debug, Clone)]
pub struct Stamped {
    /// Rewritten file contents
    pub content: String,
    /// How many `version = "..."` declarations were rewritten
    pub replacements: usize,
}

/// Rewrite every `version = "..."` declaration to the given token.
///
/// Only the quoted value changes; every other byte of the input is
/// preserved. An empty token is rejected (it must never reach the file),
/// and a file with no matching declaration is a configuration error
/// rather than a silent no-op.
pub fn stamp_version(contents: &str, version: &str) -> Result<Stamped> {
    if version.is_empty() {
        return Err(TriggerError::MissingVersion.into());
    }

    let mut replacements = 0usize;
    let content = version_pattern()
        .replace_all(contents, |caps: &regex::Captures<'_>| {
            replacements += 1;
            format!("{}{}{}", &caps["prefix"], version, &caps["suffix"])
        })
        .into_owned();

    if replacements == 0 {
        return Err(AdapterError::ManifestUpdateError(
            "no version=\"...\" declaration found".to_string(),
        )
        .into());
    }

    debug!(replacements, version, "stamped version declarations");
    Ok(Stamped {
        content,
        replacements,
    })
}

/// Read the first `version = "..."` value from file contents.
pub fn extract_version(contents: &str) -> Option<String> {
    version_pattern()
        .captures(contents)
        .map(|caps| caps["value"].to_string())
}

/// Stamp a metadata file on disk.
///
/// The rewrite happens in memory and is committed with a temp-file rename
/// in the target directory, so the original is either fully replaced or
/// left untouched on any error.
pub fn write_stamped(path: &Path, version: &str) -> Result<usize> {
    let contents = std::fs::read_to_string(path)
        .map_err(|_| AdapterError::ManifestNotFound(path.to_path_buf()))?;

    let stamped = stamp_version(&contents, version)?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| AdapterError::ManifestUpdateError(e.to_string()))?;
    tmp.write_all(stamped.content.as_bytes())
        .map_err(|e| AdapterError::ManifestUpdateError(e.to_string()))?;
    tmp.persist(path)
        .map_err(|e| AdapterError::ManifestUpdateError(e.to_string()))?;

    info!(path = %path.display(), version, replacements = stamped.replacements, "stamped metadata file");
    Ok(stamped.replacements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SETUP_PY: &str = r#"from setuptools import setup

setup(
    name="csae-pyutils",
    version="0.0.0",
    packages=["csae_pyutils"],
)
"#;

    #[test]
    fn test_stamp_replaces_only_version_line() {
        let stamped = stamp_version(SETUP_PY, "2.3.1").unwrap();
        assert_eq!(stamped.replacements, 1);
        assert!(stamped.content.contains("version=\"2.3.1\""));

        // Every other line is untouched
        for (old, new) in SETUP_PY.lines().zip(stamped.content.lines()) {
            if old.contains("version=") {
                assert_eq!(new.trim(), "version=\"2.3.1\",");
            } else {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn test_stamp_spaced_declaration() {
        let input = "name = \"pkg\"\nversion = \"0.1.0\"\n";
        let stamped = stamp_version(input, "1.0.0").unwrap();
        assert_eq!(stamped.content, "name = \"pkg\"\nversion = \"1.0.0\"\n");
    }

    #[test]
    fn test_no_version_line_is_an_error() {
        let input = "name=\"pkg\"\n";
        assert!(stamp_version(input, "1.0.0").is_err());
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(stamp_version(SETUP_PY, "").is_err());
    }

    #[test]
    fn test_extract_version() {
        assert_eq!(extract_version(SETUP_PY).unwrap(), "0.0.0");
        assert!(extract_version("name=\"pkg\"").is_none());
    }

    #[test]
    fn test_write_stamped_atomic() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("setup.py");
        std::fs::write(&path, SETUP_PY).unwrap();

        let replacements = write_stamped(&path, "2.3.1").unwrap();
        assert_eq!(replacements, 1);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("version=\"2.3.1\""));
    }

    #[test]
    fn test_write_stamped_leaves_file_on_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("setup.py");
        let original = "name=\"pkg\"\n";
        std::fs::write(&path, original).unwrap();

        assert!(write_stamped(&path, "2.3.1").is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_stamp_is_idempotent() {
        let once = stamp_version(SETUP_PY, "1.0.0").unwrap();
        let twice = stamp_version(&once.content, "1.0.0").unwrap();
        assert_eq!(once.content, twice.content);
    }
}
