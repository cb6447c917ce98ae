//! Environment-driven configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `MINDSCREEN_MODEL_PATH` | `models` |
//! | `MINDSCREEN_REPORT_DIR` | `reports` |
//! | `MINDSCREEN_MINIMAL_POLICY` | `healthy` (`at-risk` counts "Minimal" labels as mild) |
//! | `MINDSCREEN_REQUIRE_SIGNED_MODEL` | `false` |
//! | `MINDSCREEN_MODEL_PUBKEY_B64` / `MINDSCREEN_MODEL_PUBKEY_B64_FILE` | unset |
//! | `MINDSCREEN_MODEL_MAX_AGE_SECS` | unset |
//! | `MINDSCREEN_LOG_MODE` | `auto` (`file` on a TTY, else `stdout`) |
//! | `MINDSCREEN_LOG_FILE` | `data/mindscreen.log` |

use std::path::PathBuf;

use crate::adapters::IntegrityPolicy;
use crate::domain::MinimalPolicy;
use crate::{MindscreenError, Result};

const DEFAULT_MODEL_PATH: &str = "models";
const DEFAULT_REPORT_DIR: &str = "reports";
const DEFAULT_LOG_FILE: &str = "data/mindscreen.log";

/// Where log output goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    /// File when stdout is a terminal (the TUI owns it), stdout otherwise
    #[default]
    Auto,
    File,
    Stdout,
}

impl LogMode {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "file" => Some(Self::File),
            "stdout" => Some(Self::Stdout),
            _ => None,
        }
    }

    #[must_use]
    pub fn use_file(&self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub mode: LogMode,
    pub file: PathBuf,
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Artifact directory or `model.json` path
    pub model_path: PathBuf,
    pub report_dir: PathBuf,
    pub minimal_policy: MinimalPolicy,
    pub integrity: IntegrityPolicy,
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            minimal_policy: MinimalPolicy::default(),
            integrity: IntegrityPolicy::default(),
            log: LogConfig {
                mode: LogMode::default(),
                file: PathBuf::from(DEFAULT_LOG_FILE),
            },
        }
    }
}

/// "1", "true", "yes" in any case.
#[must_use]
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    /// Returns `MindscreenError::Config` on unparseable values or an
    /// unreadable public key file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// See [`AppConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get("MINDSCREEN_MODEL_PATH") {
            config.model_path = PathBuf::from(v.trim());
        }
        if let Some(v) = get("MINDSCREEN_REPORT_DIR") {
            config.report_dir = PathBuf::from(v.trim());
        }
        if let Some(v) = get("MINDSCREEN_MINIMAL_POLICY") {
            config.minimal_policy = MinimalPolicy::parse(&v).ok_or_else(|| {
                MindscreenError::Config(format!(
                    "MINDSCREEN_MINIMAL_POLICY must be 'healthy' or 'at-risk', got {v:?}"
                ))
            })?;
        }

        config.integrity.require_signed = get("MINDSCREEN_REQUIRE_SIGNED_MODEL")
            .map(|v| parse_bool(&v))
            .unwrap_or(false);

        config.integrity.public_key_b64 = match get("MINDSCREEN_MODEL_PUBKEY_B64_FILE") {
            Some(path) => Some(std::fs::read_to_string(path.trim()).map_err(|e| {
                MindscreenError::Config(format!("Failed reading public key file: {e}"))
            })?),
            None => get("MINDSCREEN_MODEL_PUBKEY_B64"),
        }
        .map(|k| k.trim().to_string());

        if let Some(v) = get("MINDSCREEN_MODEL_MAX_AGE_SECS") {
            let secs = v.trim().parse::<i64>().map_err(|_| {
                MindscreenError::Config(format!(
                    "MINDSCREEN_MODEL_MAX_AGE_SECS must be an integer, got {v:?}"
                ))
            })?;
            config.integrity.max_age_secs = (secs > 0).then_some(secs);
        }

        if let Some(v) = get("MINDSCREEN_LOG_MODE") {
            config.log.mode = LogMode::parse(&v).ok_or_else(|| {
                MindscreenError::Config(format!(
                    "MINDSCREEN_LOG_MODE must be auto, file or stdout, got {v:?}"
                ))
            })?;
        }
        if let Some(v) = get("MINDSCREEN_LOG_FILE") {
            config.log.file = PathBuf::from(v.trim());
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).expect("defaults");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.model_path, PathBuf::from("models"));
        assert_eq!(config.minimal_policy, MinimalPolicy::Healthy);
        assert!(!config.integrity.require_signed);
        assert_eq!(config.log.file, PathBuf::from("data/mindscreen.log"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("MINDSCREEN_MODEL_PATH", "/opt/model/model.json"),
            ("MINDSCREEN_REPORT_DIR", "out"),
            ("MINDSCREEN_MINIMAL_POLICY", "At-Risk"),
            ("MINDSCREEN_REQUIRE_SIGNED_MODEL", "YES"),
            ("MINDSCREEN_MODEL_PUBKEY_B64", " AAAA \n"),
            ("MINDSCREEN_MODEL_MAX_AGE_SECS", "86400"),
            ("MINDSCREEN_LOG_MODE", "stdout"),
        ])
        .expect("valid");

        assert_eq!(config.model_path, PathBuf::from("/opt/model/model.json"));
        assert_eq!(config.report_dir, PathBuf::from("out"));
        assert_eq!(config.minimal_policy, MinimalPolicy::AtRisk);
        assert!(config.integrity.require_signed);
        assert_eq!(config.integrity.public_key_b64.as_deref(), Some("AAAA"));
        assert_eq!(config.integrity.max_age_secs, Some(86400));
        assert_eq!(config.log.mode, LogMode::Stdout);
    }

    #[test]
    fn test_pubkey_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("pub.b64");
        std::fs::write(&path, "BBBB\n").expect("write key");

        let config = config_from(&[
            ("MINDSCREEN_MODEL_PUBKEY_B64_FILE", path.to_str().expect("utf8 path")),
            ("MINDSCREEN_MODEL_PUBKEY_B64", "ignored"),
        ])
        .expect("valid");
        assert_eq!(config.integrity.public_key_b64.as_deref(), Some("BBBB"));

        let err = config_from(&[("MINDSCREEN_MODEL_PUBKEY_B64_FILE", "/nonexistent/key")])
            .expect_err("unreadable");
        assert!(matches!(err, MindscreenError::Config(_)));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(config_from(&[("MINDSCREEN_MINIMAL_POLICY", "sometimes")]).is_err());
        assert!(config_from(&[("MINDSCREEN_MODEL_MAX_AGE_SECS", "a day")]).is_err());
        assert!(config_from(&[("MINDSCREEN_LOG_MODE", "syslog")]).is_err());
    }

    #[test]
    fn test_parse_bool() {
        for v in ["1", "true", "TRUE", "yes", "Yes"] {
            assert!(parse_bool(v), "{v}");
        }
        for v in ["0", "false", "no", "", "on"] {
            assert!(!parse_bool(v), "{v}");
        }
    }

    #[test]
    fn test_log_mode() {
        assert!(LogMode::Auto.use_file(true));
        assert!(!LogMode::Auto.use_file(false));
        assert!(LogMode::File.use_file(false));
        assert!(!LogMode::Stdout.use_file(true));
    }
}
