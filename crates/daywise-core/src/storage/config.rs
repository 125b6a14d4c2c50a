//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Defaults for new agenda events (time of day, duration, step)
//! - Export file name
//! - Default CLI output format
//!
//! Configuration is stored at `~/.config/daywise/config.toml`.

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::data_dir;
use crate::agenda::{parse_time, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};
use crate::error::ConfigError;

/// Defaults for the add-event form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaConfig {
    /// Time of day prefilled for new events (`HH:MM`)
    #[serde(default = "default_time")]
    pub default_time: String,
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: u32,
    /// Increment used by duration inputs
    #[serde(default = "default_duration_step_minutes")]
    pub duration_step_minutes: u32,
}

/// Export configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_file_name")]
    pub file_name: String,
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Print JSON instead of text unless a command says otherwise
    #[serde(default)]
    pub json: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/daywise/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agenda: AgendaConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_time() -> String {
    "10:00".into()
}
fn default_duration_minutes() -> u32 {
    60
}
fn default_duration_step_minutes() -> u32 {
    5
}
fn default_export_file_name() -> String {
    "events.csv".into()
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            default_time: default_time(),
            default_duration_minutes: default_duration_minutes(),
            duration_step_minutes: default_duration_step_minutes(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: default_export_file_name(),
        }
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
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => value
                        .parse::<bool>()
                        .map(serde_json::Value::Bool)
                        .map_err(|e| invalid(format!("'{value}' is not a boolean: {e}")))?,
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|e| invalid(format!("'{value}' is not a number: {e}")))?,
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".to_string()));
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

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::path()?)
    }

    /// Load from `path`, writing defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                cfg.validate()?;
                info!(path = %path.display(), "config loaded");
                Ok(cfg)
            }
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
        self.save_to(Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };

        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        info!(path = %path.display(), "config saved");
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

    /// Set a config value by dot-separated key. The change is validated but
    /// not saved.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation. `self` is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Check value constraints that the types alone do not express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_time(&self.agenda.default_time).map_err(|e| ConfigError::InvalidValue {
            key: "agenda.default_time".to_string(),
            message: e.to_string(),
        })?;

        let duration = self.agenda.default_duration_minutes;
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration) {
            return Err(ConfigError::InvalidValue {
                key: "agenda.default_duration_minutes".to_string(),
                message: format!(
                    "{duration} is outside {MIN_DURATION_MINUTES}..={MAX_DURATION_MINUTES}"
                ),
            });
        }

        if self.agenda.duration_step_minutes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "agenda.duration_step_minutes".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        if self.export.file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "export.file_name".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Default time of day for new events.
    pub fn default_time(&self) -> NaiveTime {
        parse_time(&self.agenda.default_time)
            .unwrap_or_else(|_| NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default())
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
        assert_eq!(parsed.agenda.default_time, "10:00");
        assert_eq!(parsed.agenda.default_duration_minutes, 60);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[agenda]\ndefault_time = \"08:30\"\n").unwrap();
        assert_eq!(parsed.agenda.default_time, "08:30");
        assert_eq!(parsed.agenda.duration_step_minutes, 5);
        assert_eq!(parsed.export.file_name, "events.csv");
        assert!(!parsed.output.json);
    }

    #[test]
    fn get_by_dotted_key() {
        let cfg = Config::default();
        assert_eq!(cfg.get("agenda.default_time").as_deref(), Some("10:00"));
        assert_eq!(cfg.get("agenda.default_duration_minutes").as_deref(), Some("60"));
        assert_eq!(cfg.get("output.json").as_deref(), Some("false"));
        assert_eq!(cfg.get("agenda.missing"), None);
        assert_eq!(cfg.get(""), None);
    }

    #[test]
    fn set_coerces_against_existing_type() {
        let mut cfg = Config::default();
        cfg.set("agenda.default_duration_minutes", "45").unwrap();
        cfg.set("output.json", "true").unwrap();
        cfg.set("export.file_name", "agenda.csv").unwrap();

        assert_eq!(cfg.agenda.default_duration_minutes, 45);
        assert!(cfg.output.json);
        assert_eq!(cfg.export.file_name, "agenda.csv");
    }

    #[test]
    fn set_rejects_unknown_and_invalid_values() {
        let mut cfg = Config::default();
        assert!(matches!(cfg.set("nope", "1"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            cfg.set("agenda.default_duration_minutes", "lots"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("agenda.default_duration_minutes", "700"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("agenda.default_time", "noon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(cfg.set("agenda", "x"), Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.set("agenda.default_time", "07:45").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.default_time(), NaiveTime::from_hms_opt(7, 45, 0).unwrap());
    }

    #[test]
    fn load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "agenda = 3").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseFailed(_))));

        std::fs::write(&path, "[agenda]\ndefault_duration_minutes = 1\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
