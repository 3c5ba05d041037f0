//! TOML configuration parsing and validation.
//!
//! Every section is optional. A missing config file falls back to
//! [`Config::default`], so the CLI works out of the box:
//!
//! ```toml
//! [server]
//! bind = "127.0.0.1:7340"
//! transport = "stdio"
//!
//! [spec]
//! url = "https://raw.githubusercontent.com/open-resource-discovery/specification/main/docs/spec-v1/index.md"
//! timeout_secs = 30
//!
//! [validation]
//! strict = false
//!
//! [scan]
//! exclude_globs = ["**/test/**"]
//! metadata_globs = ["**/ord.json"]
//! follow_symlinks = false
//! max_files = 5000
//!
//! [logging]
//! level = "info"
//! ```

use anyhow::{Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub spec: SpecConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_transport")]
    pub transport: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            transport: default_transport(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}
fn default_transport() -> String {
    "stdio".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpecConfig {
    #[serde(default = "default_spec_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SpecConfig {
    fn default() -> Self {
        Self {
            url: default_spec_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_spec_url() -> String {
    "https://raw.githubusercontent.com/open-resource-discovery/specification/main/docs/spec-v1/index.md"
        .to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ValidationConfig {
    /// Default validation level when a caller does not pass `strict`.
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default = "default_metadata_globs")]
    pub metadata_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
    #[serde(default = "default_max_files")]
    pub max_files: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_globs: Vec::new(),
            metadata_globs: default_metadata_globs(),
            follow_symlinks: false,
            max_files: default_max_files(),
        }
    }
}

fn default_metadata_globs() -> Vec<String> {
    vec![
        "**/ord.json".to_string(),
        "**/ord-document.json".to_string(),
        "**/*.ord.json".to_string(),
    ]
}
fn default_max_files() -> usize {
    5000
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load the config at `path`, or the defaults when the file does not exist.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config(path)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    match config.server.transport.as_str() {
        "stdio" | "http" => {}
        other => anyhow::bail!(
            "Unknown server transport: '{}'. Must be stdio or http.",
            other
        ),
    }

    if config.spec.timeout_secs == 0 {
        anyhow::bail!("spec.timeout_secs must be > 0");
    }

    if config.scan.max_files == 0 {
        anyhow::bail!("scan.max_files must be > 0");
    }

    for pattern in config
        .scan
        .exclude_globs
        .iter()
        .chain(&config.scan.metadata_globs)
    {
        Glob::new(pattern).with_context(|| format!("Invalid glob in [scan]: '{}'", pattern))?;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.server.transport, "stdio");
        assert_eq!(cfg.spec.timeout_secs, 30);
        assert!(!cfg.validation.strict);
        assert_eq!(cfg.scan.metadata_globs.len(), 3);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_partial_sections() {
        let cfg = parse_config(
            r#"
[server]
transport = "http"

[validation]
strict = true
"#,
        )
        .unwrap();
        assert_eq!(cfg.server.transport, "http");
        assert_eq!(cfg.server.bind, "127.0.0.1:7340");
        assert!(cfg.validation.strict);
    }

    #[test]
    fn test_rejects_unknown_transport() {
        let err = parse_config("[server]\ntransport = \"grpc\"\n").unwrap_err();
        assert!(err.to_string().contains("Unknown server transport"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = parse_config("[spec]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_rejects_bad_glob() {
        let err = parse_config("[scan]\nexclude_globs = [\"a[\"]\n").unwrap_err();
        assert!(err.to_string().contains("Invalid glob"));
    }

    #[test]
    fn test_missing_file_falls_back() {
        let cfg = load_or_default(Path::new("/definitely/not/here/ord-assist.toml")).unwrap();
        assert_eq!(cfg.server.bind, "127.0.0.1:7340");
    }
}
