//! Credential lookup for the package index
//!
//! Resolution order: cache, environment, then the index's own config file
//! (`~/.pypirc`). A token credential is sent behind the index's username
//! sentinel; an explicit username/password pair is sent as-is.

use std::collections::HashMap;
use std::env;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use gantry_core::error::{AdapterError, Result};

/// Username sentinel the index expects when the password is an API token
pub const TOKEN_USERNAME: &str = "__token__";

/// Resolves upload credentials from the environment and config files
pub struct CredentialProvider {
    env_prefix: String,
    cache: HashMap<String, Credential>,
}

impl CredentialProvider {
    pub fn new() -> Self {
        Self {
            env_prefix: "GANTRY".to_string(),
            cache: HashMap::new(),
        }
    }

    /// Override the `GANTRY_*` environment variable prefix
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Look up credentials for a registry, caching hits
    #[instrument(skip(self), fields(registry))]
    pub fn get(&mut self, registry: &str) -> Result<Option<Credential>> {
        if let Some(cred) = self.cache.get(registry) {
            debug!(registry, source = "cache", "credentials found");
            return Ok(Some(cred.clone()));
        }

        let found = match self.from_env(registry) {
            Some(cred) => {
                debug!(registry, source = "environment", "credentials found");
                Some(cred)
            }
            None => match registry {
                "pypi" | "python" => {
                    let cred = self.from_pypirc()?;
                    if cred.is_some() {
                        debug!(registry, source = "pypirc", "credentials found");
                    }
                    cred
                }
                _ => None,
            },
        };

        match found {
            Some(cred) => {
                self.cache.insert(registry.to_string(), cred.clone());
                Ok(Some(cred))
            }
            None => {
                debug!(registry, "no credentials found");
                Ok(None)
            }
        }
    }

    /// True when `get` would return a credential
    pub fn has_credentials(&mut self, registry: &str) -> bool {
        self.get(registry).ok().flatten().is_some()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn from_env(&self, registry: &str) -> Option<Credential> {
        let key = registry.to_uppercase().replace(['.', '-', '/'], "_");

        if let Ok(token) = env::var(format!("{}_{}_TOKEN", self.env_prefix, key)) {
            return Some(Credential::Token(token));
        }

        // The upload tool's own variables, then the conventional CI secret
        if matches!(registry, "pypi" | "python") {
            if let Ok(password) = env::var("TWINE_PASSWORD") {
                let username =
                    env::var("TWINE_USERNAME").unwrap_or_else(|_| TOKEN_USERNAME.to_string());
                return Some(Credential::UsernamePassword { username, password });
            }
            if let Ok(token) = env::var("PYPI_TOKEN") {
                return Some(Credential::Token(token));
            }
        }

        let username = env::var(format!("{}_{}_USERNAME", self.env_prefix, key)).ok()?;
        let password = env::var(format!("{}_{}_PASSWORD", self.env_prefix, key)).ok()?;
        Some(Credential::UsernamePassword { username, password })
    }

    fn from_pypirc(&self) -> Result<Option<Credential>> {
        let home = dirs::home_dir().ok_or_else(|| AdapterError::AuthenticationFailed {
            registry: "pypi".to_string(),
            reason: "Could not determine home directory".to_string(),
        })?;

        let path = home.join(".pypirc");
        if !path.exists() {
            return Ok(None);
        }

        let content =
            std::fs::read_to_string(&path).map_err(|e| AdapterError::AuthenticationFailed {
                registry: "pypi".to_string(),
                reason: format!("Failed to read .pypirc: {}", e),
            })?;

        Ok(parse_pypirc(&content))
    }
}

impl Default for CredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Pull username/password out of the `[pypi]` section of a .pypirc file
fn parse_pypirc(content: &str) -> Option<Credential> {
    let mut in_section = false;
    let mut username = None;
    let mut password = None;

    for line in content.lines().map(str::trim) {
        if line.starts_with('[') && line.ends_with(']') {
            in_section = line == "[pypi]";
        } else if in_section {
            if let Some((key, value)) = line.split_once('=') {
                match key.trim() {
                    "username" => username = Some(value.trim().to_string()),
                    "password" => password = Some(value.trim().to_string()),
                    _ => {}
                }
            }
        }
    }

    Some(Credential::UsernamePassword {
        username: username?,
        password: password?,
    })
}

/// An upload credential
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credential {
    /// API token, sent behind the username sentinel
    Token(String),
    /// Explicit username and password
    UsernamePassword { username: String, password: String },
}

impl Credential {
    pub fn as_token(&self) -> Option<&str> {
        match self {
            Self::Token(t) => Some(t),
            _ => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::UsernamePassword { username, .. } => Some(username),
            _ => None,
        }
    }

    pub fn password(&self) -> Option<&str> {
        match self {
            Self::UsernamePassword { password, .. } => Some(password),
            _ => None,
        }
    }

    /// The username to hand the upload tool
    pub fn upload_username(&self) -> &str {
        match self {
            Self::Token(_) => TOKEN_USERNAME,
            Self::UsernamePassword { username, .. } => username,
        }
    }

    /// The password to hand the upload tool; tokens double as the password
    pub fn upload_password(&self) -> &str {
        match self {
            Self::Token(t) => t,
            Self::UsernamePassword { password, .. } => password,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_maps_to_sentinel() {
        let cred = Credential::Token("pypi-abc".to_string());
        assert_eq!(cred.as_token(), Some("pypi-abc"));
        assert_eq!(cred.username(), None);
        assert_eq!(cred.upload_username(), TOKEN_USERNAME);
        assert_eq!(cred.upload_password(), "pypi-abc");
    }

    #[test]
    fn test_username_password_passthrough() {
        let cred = Credential::UsernamePassword {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        assert_eq!(cred.username(), Some("user"));
        assert_eq!(cred.password(), Some("pass"));
        assert_eq!(cred.as_token(), None);
        assert_eq!(cred.upload_username(), "user");
        assert_eq!(cred.upload_password(), "pass");
    }

    #[test]
    fn test_parse_pypirc() {
        let content = "[distutils]\nindex-servers = pypi\n\n[pypi]\nusername = __token__\npassword = pypi-secret\n";
        let cred = parse_pypirc(content).unwrap();
        assert_eq!(cred.username(), Some("__token__"));
        assert_eq!(cred.password(), Some("pypi-secret"));
    }

    #[test]
    fn test_parse_pypirc_incomplete_section() {
        let content = "[pypi]\nusername = __token__\n";
        assert!(parse_pypirc(content).is_none());
    }

    #[test]
    fn test_env_credential() {
        env::set_var("GANTRY_PYPI_TOKEN", "test-pypi-token");

        let mut provider = CredentialProvider::new();
        let cred = provider.get("pypi").unwrap();
        assert_eq!(cred.unwrap().as_token(), Some("test-pypi-token"));

        env::remove_var("GANTRY_PYPI_TOKEN");
    }
}
