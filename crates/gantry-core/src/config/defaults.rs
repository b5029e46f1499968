//! Default configuration values

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "gantry.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "gantry.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".gantry.toml",
        ".gantry.yaml",
    ]
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# gantry configuration
# See https://github.com/example/gantry for documentation

[package]
path = "."

[runtime]
interpreter = "python"
version = "3.11"

[[tools.provision]]
program = "python"
args = ["-m", "pip", "install", "--upgrade", "pip"]

[[tools.provision]]
program = "python"
args = ["-m", "pip", "install", "build", "twine"]

[registry]
url = "https://upload.pypi.org/legacy/"
username = "__token__"

[publish]
dry_run = false
skip_existing = false
dist_dir = "dist"
"#;
