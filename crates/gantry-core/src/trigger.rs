//! Release Event model and version-token derivation
//!
//! Every run is started by exactly one trigger: a tagged-release event
//! carrying a reference like `refs/tags/1.2.3`, or a manual dispatch with an
//! explicit version. The event is consumed once and nothing about it is
//! persisted across runs.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TriggerError};

/// Kind of trigger that started the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerKind {
    /// Manual dispatch by an operator
    Manual,
    /// A "release created" / tag push event
    TagRelease,
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::TagRelease => write!(f, "tag-release"),
        }
    }
}

/// A single release event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseEvent {
    /// How the run was started
    pub kind: TriggerKind,
    /// The triggering reference (e.g. `refs/tags/1.2.3`), if tag-driven
    pub git_ref: Option<String>,
    /// Explicit version for manual runs
    pub version: Option<String>,
}

impl ReleaseEvent {
    /// Create a tag-driven release event
    pub fn tag_release(git_ref: impl Into<String>) -> Self {
        Self {
            kind: TriggerKind::TagRelease,
            git_ref: Some(git_ref.into()),
            version: None,
        }
    }

    /// Create a manual release event with an explicit version
    pub fn manual(version: impl Into<String>) -> Self {
        Self {
            kind: TriggerKind::Manual,
            git_ref: None,
            version: Some(version.into()),
        }
    }

    /// Build an event from the pieces a CLI invocation provides.
    ///
    /// A reference wins over an explicit version; with neither present the
    /// event is manual and version resolution will fail later rather than
    /// stamping an empty token.
    pub fn from_parts(git_ref: Option<String>, version: Option<String>) -> Self {
        match git_ref {
            Some(r) if !r.is_empty() => Self {
                kind: TriggerKind::TagRelease,
                git_ref: Some(r),
                version,
            },
            _ => Self {
                kind: TriggerKind::Manual,
                git_ref: None,
                version,
            },
        }
    }

    /// Detect a release event from the hosting CI environment.
    ///
    /// Returns None when the environment does not look like a CI run.
    pub fn from_ci_env() -> Option<Self> {
        let git_ref = std::env::var("GITHUB_REF").ok().filter(|r| !r.is_empty())?;
        let event = std::env::var("GITHUB_EVENT_NAME").unwrap_or_default();
        debug!(git_ref = %git_ref, event = %event, "detected CI trigger environment");

        if event == "workflow_dispatch" {
            return Some(Self {
                kind: TriggerKind::Manual,
                git_ref: Some(git_ref),
                version: None,
            });
        }

        Some(Self::tag_release(git_ref))
    }

    /// Resolve the version token for this event.
    ///
    /// Tag-driven events derive the token from the reference; manual events
    /// must carry an explicit version. Either way the token is guaranteed
    /// non-empty.
    pub fn resolve_version(&self) -> Result<String> {
        if let Some(version) = &self.version {
            if version.is_empty() {
                return Err(TriggerError::MissingVersion.into());
            }
            return Ok(version.clone());
        }

        match &self.git_ref {
            Some(git_ref) => version_from_ref(git_ref),
            None => Err(TriggerError::MissingVersion.into()),
        }
    }
}

/// Derive the version token from a trigger reference.
///
/// Takes the suffix after the last `/` separator: `refs/tags/2.3.1` yields
/// `2.3.1`, and a bare `2.3.1` is returned as-is. Empty results are
/// rejected; `version=""` must never reach the metadata file.
pub fn version_from_ref(git_ref: &str) -> Result<String> {
    if git_ref.is_empty() {
        return Err(TriggerError::EmptyRef.into());
    }

    let token = match git_ref.rfind('/') {
        Some(idx) => &git_ref[idx + 1..],
        None => git_ref,
    };

    if token.is_empty() {
        return Err(TriggerError::EmptyToken(git_ref.to_string()).into());
    }

    // Anything non-empty is accepted; odd shapes are only logged.
    if let Some(warning) = token_shape_warning(token) {
        warn!(token, "{}", warning);
    }

    debug!(git_ref, token, "derived version token");
    Ok(token.to_string())
}

/// Returns a warning when the token does not parse as a semantic version
/// (after an optional leading `v`).
pub fn token_shape_warning(token: &str) -> Option<String> {
    let bare = token.strip_prefix('v').unwrap_or(token);
    match semver::Version::parse(bare) {
        Ok(_) => None,
        Err(_) => Some(format!(
            "version token '{}' is not a semantic version",
            token
        )),
    }
}
