//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_registry(config)?;
    validate_runtime(config)?;
    validate_tools(config)?;
    validate_publish(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_registry(config: &Config) -> Result<()> {
    if let Err(e) = url::Url::parse(&config.registry.url) {
        return Err(ConfigError::InvalidValue {
            field: "registry.url".to_string(),
            message: format!("not a valid URL: {}", e),
        }
        .into());
    }

    if config.registry.username.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "registry.username".to_string(),
            message: "username cannot be empty".to_string(),
        }
        .into());
    }

    Ok(())
}

fn validate_runtime(config: &Config) -> Result<()> {
    if config.runtime.interpreter.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "runtime.interpreter".to_string(),
            message: "interpreter cannot be empty".to_string(),
        }
        .into());
    }

    // The pin names a minor release: MAJOR.MINOR
    let version = &config.runtime.version;
    let mut parts = version.split('.');
    let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(major), Some(minor), None)
            if !major.is_empty()
                && !minor.is_empty()
                && major.chars().all(|c| c.is_ascii_digit())
                && minor.chars().all(|c| c.is_ascii_digit())
    );
    if !valid {
        return Err(ConfigError::InvalidValue {
            field: "runtime.version".to_string(),
            message: format!("'{}' is not a MAJOR.MINOR pin", version),
        }
        .into());
    }

    Ok(())
}

fn validate_tools(config: &Config) -> Result<()> {
    for (i, tool) in config.tools.provision.iter().enumerate() {
        if tool.program.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("tools.provision[{}].program", i),
                message: "program cannot be empty".to_string(),
            }
            .into());
        }
    }

    Ok(())
}

fn validate_publish(config: &Config) -> Result<()> {
    if config.publish.dist_dir.as_os_str().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "publish.dist_dir".to_string(),
            message: "dist_dir cannot be empty".to_string(),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolSpec;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_bad_registry_url() {
        let mut config = Config::default();
        config.registry.url = "not a url".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_username_rejected() {
        let mut config = Config::default();
        config.registry.username = String::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_runtime_pin_shape() {
        let mut config = Config::default();
        config.runtime.version = "3.11".to_string();
        assert!(validate_config(&config).is_ok());

        config.runtime.version = "3".to_string();
        assert!(validate_config(&config).is_err());

        config.runtime.version = "3.11.2".to_string();
        assert!(validate_config(&config).is_err());

        config.runtime.version = "three.eleven".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_empty_tool_program_rejected() {
        let mut config = Config::default();
        config.tools.provision.push(ToolSpec::new("", &[]));
        assert!(validate_config(&config).is_err());
    }
}
