use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use formfill_core::{fields, AppState, FormFields};
use formfill_engine::TransportSettings;
use formfill_logging::formfill_info;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "formfill.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Driver settings. Every field may be omitted from the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub account_id: String,
    pub captcha_response: String,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub max_response_bytes: u64,
    /// Page inputs beyond the standard ones; never tracked.
    pub extra_fields: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let transport = TransportSettings::default();
        Self {
            base_url: transport.base_url,
            account_id: String::new(),
            captcha_response: String::new(),
            connect_timeout_ms: transport.connect_timeout.as_millis() as u64,
            request_timeout_ms: transport.request_timeout.as_millis() as u64,
            max_response_bytes: transport.max_response_bytes,
            extra_fields: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                formfill_info!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            max_response_bytes: self.max_response_bytes,
        }
    }

    /// Page state with the configured inputs and hidden account id.
    pub fn initial_state(&self) -> AppState {
        let mut form = FormFields::standard();
        for name in &self.extra_fields {
            form.add_field(name.clone());
        }
        form.set_programmatic(fields::ACCOUNT_ID, self.account_id.clone());
        AppState::with_form(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.request_timeout_ms, 30_000);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(base_url: "https://jobs.example", account_id: "acct-1", extra_fields: ["coverLetter"])"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.base_url, "https://jobs.example");
        assert_eq!(config.account_id, "acct-1");
        assert_eq!(config.extra_fields, vec!["coverLetter".to_string()]);
        assert_eq!(config.max_response_bytes, 1024 * 1024);
    }

    #[test]
    fn invalid_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(base_url: 42").unwrap();
        assert!(matches!(
            AppConfig::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn initial_state_carries_account_and_extra_fields() {
        let config = AppConfig {
            account_id: "acct-7".to_string(),
            extra_fields: vec!["coverLetter".to_string(), fields::EMAIL.to_string()],
            ..AppConfig::default()
        };
        let state = config.initial_state();
        assert_eq!(state.form().value(fields::ACCOUNT_ID), Some("acct-7"));
        assert_eq!(state.form().value("coverLetter"), Some(""));
        assert!(!state.form().is_touched(fields::EMAIL));
    }

    #[test]
    fn transport_settings_use_millisecond_fields() {
        let config = AppConfig {
            connect_timeout_ms: 250,
            request_timeout_ms: 1_500,
            ..AppConfig::default()
        };
        let settings = config.transport_settings();
        assert_eq!(settings.connect_timeout, Duration::from_millis(250));
        assert_eq!(settings.request_timeout, Duration::from_millis(1_500));
    }
}
