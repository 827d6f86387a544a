//! TOML-based application configuration.
//!
//! Stores:
//! - Remote document store location (base URL, environment id, timeout)
//! - Defaults applied when no goal has been saved
//!
//! Configuration is stored at `~/.config/studyhabit/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::ConfigError;
use crate::model::{DEFAULT_DAILY_MINUTES, DEFAULT_GOAL_TITLE};

/// Remote document store configuration.
///
/// The remote source is only used when both `base_url` and `env` are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub base_url: String,
    /// Environment id addressed on the remote store.
    #[serde(default)]
    pub env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Defaults shown before the user saves a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalDefaults {
    #[serde(default = "default_title")]
    pub default_title: String,
    #[serde(default = "default_daily_minutes")]
    pub default_daily_minutes: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/studyhabit/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub goal: GoalDefaults,
}

// Default functions
fn default_timeout_secs() -> u64 {
    10
}
fn default_title() -> String {
    DEFAULT_GOAL_TITLE.to_string()
}
fn default_daily_minutes() -> u32 {
    DEFAULT_DAILY_MINUTES
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            env: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for GoalDefaults {
    fn default() -> Self {
        Self {
            default_title: default_title(),
            default_daily_minutes: default_daily_minutes(),
        }
    }
}

impl RemoteConfig {
    /// Capability check: is a remote store configured for this session?
    pub fn is_ready(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.env.trim().is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::InvalidValue {
            key: key.to_string(),
            message: "unknown config key".to_string(),
        };
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(format!("cannot parse '{value}' as bool: {e}")))?,
                    ),
                    serde_json::Value::Number(_) => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as a non-negative integer")))?;
                        serde_json::Value::Number(n.into())
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot overwrite a whole section".to_string()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if missing.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. Returns error if key is unknown
    /// or the value has the wrong type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert!(!parsed.remote.is_ready());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[remote]\nenv = \"prod-1\"\n").unwrap();
        assert_eq!(parsed.remote.env, "prod-1");
        assert_eq!(parsed.remote.timeout_secs, 10);
        assert_eq!(parsed.goal.default_daily_minutes, 60);
    }

    #[test]
    fn remote_ready_needs_url_and_env() {
        let mut remote = RemoteConfig::default();
        remote.env = "prod-1".into();
        assert!(!remote.is_ready());
        remote.base_url = "https://docs.example.com".into();
        assert!(remote.is_ready());
        remote.env = "  ".into();
        assert!(!remote.is_ready());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("remote.timeout_secs").as_deref(), Some("10"));
        assert_eq!(cfg.get("goal.default_title").as_deref(), Some("Study goal"));
        assert!(cfg.get("remote.missing_key").is_none());
    }

    #[test]
    fn set_updates_string_and_number() {
        let mut cfg = Config::default();
        cfg.set("remote.env", "prod-1").unwrap();
        cfg.set("goal.default_daily_minutes", "45").unwrap();
        assert_eq!(cfg.remote.env, "prod-1");
        assert_eq!(cfg.goal.default_daily_minutes, 45);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("remote.nonexistent", "x"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(cfg.set("", "x").is_err());
    }

    #[test]
    fn set_rejects_negative_number() {
        let mut cfg = Config::default();
        assert!(cfg.set("goal.default_daily_minutes", "-5").is_err());
        assert_eq!(cfg.goal.default_daily_minutes, 60);
    }

    #[test]
    fn set_rejects_whole_section() {
        let mut cfg = Config::default();
        assert!(cfg.set("remote", "{}").is_err());
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("remote.base_url", "https://docs.example.com").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), changed);
    }

    #[test]
    fn load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "remote = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }
}
