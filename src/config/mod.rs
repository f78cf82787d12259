//! Settings and on-disk locations.
//!
//! Settings come from three layers, later ones winning: built-in defaults,
//! the optional `config.json` in the config directory, then `CLIHELPER_*`
//! environment variables. Command-line flags are applied by the binary on
//! top of the result.

mod credential;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, Result};

pub use credential::{Credential, CredentialSource, CredentialStore};

pub const APP_NAME: &str = "clihelper";
pub const SETTINGS_FILE: &str = "config.json";

pub const ENV_CONFIG_DIR: &str = "CLIHELPER_CONFIG_DIR";
pub const ENV_MODEL: &str = "CLIHELPER_MODEL";
pub const ENV_API_BASE: &str = "CLIHELPER_API_BASE";
pub const ENV_API_KEY: &str = "CLIHELPER_API_KEY";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// User-tunable redaction: extra deny patterns and exact allowed values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedactionSettings {
    pub extra_patterns: Vec<String>,
    pub allow: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub model: String,
    pub api_base: String,
    pub max_tokens: u32,
    /// `None` leaves sampling temperature to the provider.
    pub temperature: Option<f32>,
    /// Number of shell history entries to include, 0 disables.
    pub history_lines: usize,
    pub history_file: Option<PathBuf>,
    /// Cap on piped input, keeping the tail. 0 disables.
    pub max_input_bytes: usize,
    pub redaction: RedactionSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            max_tokens: 300,
            temperature: Some(0.0),
            history_lines: 10,
            history_file: None,
            max_input_bytes: 8000,
            redaction: RedactionSettings::default(),
        }
    }
}

impl Settings {
    /// Load `config.json` from `dir`; a missing file yields the defaults.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(SETTINGS_FILE);
        if !path.exists() {
            debug!("no settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path)?;
        serde_json::from_str(&raw)
            .map_err(|e| CliError::Config(format!("invalid settings at {}: {}", path.display(), e)))
    }

    /// Apply `CLIHELPER_MODEL` / `CLIHELPER_API_BASE` style overrides.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(model) = non_empty(ENV_MODEL) {
            self.model = model.trim().to_string();
        }
        if let Some(base) = non_empty(ENV_API_BASE) {
            self.api_base = base.trim().to_string();
        }
    }

    /// Load from the standard location and apply the process environment.
    pub fn resolve() -> Result<(Self, PathBuf)> {
        let dir = config_dir()?;
        let mut settings = Self::load(&dir)?;
        settings.apply_env(|name| std::env::var(name).ok());
        Ok((settings, dir))
    }
}

/// `$CLIHELPER_CONFIG_DIR`, else `<platform config dir>/clihelper`.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(ENV_CONFIG_DIR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|d| d.join(APP_NAME))
        .ok_or_else(|| CliError::Config("cannot determine the user config directory".into()))
}

/// Directory for log files; falls back next to the config directory.
pub fn log_dir() -> Option<PathBuf> {
    dirs::data_local_dir()
        .map(|d| d.join(APP_NAME).join("logs"))
        .or_else(|| config_dir().ok().map(|d| d.join("logs")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.max_tokens, 300);
        assert_eq!(settings.temperature, Some(0.0));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"model": "gpt-4.1-mini", "history_lines": 0, "redaction": {"allow": ["changeme"]}}"#,
        )
        .unwrap();

        let settings = Settings::load(dir.path()).unwrap();
        assert_eq!(settings.model, "gpt-4.1-mini");
        assert_eq!(settings.history_lines, 0);
        assert_eq!(settings.redaction.allow, vec!["changeme".to_string()]);
        assert!(settings.redaction.extra_patterns.is_empty());
        assert_eq!(settings.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        let err = Settings::load(dir.path()).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.apply_env(|name| match name {
            ENV_MODEL => Some(" local-model ".to_string()),
            ENV_API_BASE => Some(String::new()),
            _ => None,
        });
        assert_eq!(settings.model, "local-model");
        assert_eq!(settings.api_base, DEFAULT_API_BASE);
    }
}
