//! Bridge configuration with persistence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridge::default_socket_path;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Failed to read config: {0}")]
  Io(#[from] std::io::Error),
  #[error("Invalid config JSON: {0}")]
  Json(#[from] serde_json::Error),
  #[error("Invalid config: {0}")]
  Invalid(String),
}

/// How to reach the remote application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeConfig {
  /// Custom bridge helper path (None = auto-detect).
  #[serde(default)]
  pub helper_path: Option<String>,

  /// Additional helper command-line arguments.
  #[serde(default)]
  pub helper_args: Vec<String>,

  /// Spawn the helper on start; otherwise connect to one already running.
  #[serde(default = "default_launch_helper")]
  pub launch_helper: bool,

  /// IPC socket (Unix) or named pipe (Windows) path.
  #[serde(default = "default_socket_path")]
  pub socket_path: String,

  /// Name of the scripted application.
  #[serde(default = "default_application")]
  pub application: String,

  /// Per-request timeout in seconds.
  #[serde(default = "default_request_timeout")]
  pub request_timeout_secs: u32,

  /// Connection attempts before giving up.
  #[serde(default = "default_connect_retries")]
  pub connect_retries: u32,
}

fn default_launch_helper() -> bool {
  true
}

fn default_application() -> String {
  "QuickTime Player".to_string()
}

fn default_request_timeout() -> u32 {
  5
}

fn default_connect_retries() -> u32 {
  10
}

impl Default for BridgeConfig {
  fn default() -> Self {
    Self {
      helper_path: None,
      helper_args: Vec::new(),
      launch_helper: default_launch_helper(),
      socket_path: default_socket_path(),
      application: default_application(),
      request_timeout_secs: default_request_timeout(),
      connect_retries: default_connect_retries(),
    }
  }
}

impl BridgeConfig {
  /// Validate configuration values.
  pub fn validate(&self) -> Result<(), String> {
    if self.application.trim().is_empty() {
      return Err("Application name cannot be empty".to_string());
    }
    if self.socket_path.trim().is_empty() {
      return Err("Socket path cannot be empty".to_string());
    }
    if self.request_timeout_secs < 1 || self.request_timeout_secs > 120 {
      return Err("Request timeout must be between 1 and 120 seconds".to_string());
    }
    if self.connect_retries < 1 || self.connect_retries > 50 {
      return Err("Connect retries must be between 1 and 50".to_string());
    }
    Ok(())
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs as u64)
  }

  /// Helper path, if set to something non-empty.
  pub fn helper(&self) -> Option<PathBuf> {
    self
      .helper_path
      .as_ref()
      .filter(|s| !s.is_empty())
      .map(PathBuf::from)
  }

  /// `<config dir>/quicktime-remote/config.json`.
  pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("quicktime-remote").join("config.json"))
  }

  /// Load and validate a config file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    let config: BridgeConfig = serde_json::from_str(&text)?;
    config.validate().map_err(ConfigError::Invalid)?;
    Ok(config)
  }

  /// Load from the default location, falling back to defaults when the file
  /// is missing or broken.
  pub fn load_or_default() -> Self {
    let Some(path) = Self::default_path() else {
      return Self::default();
    };
    if !path.exists() {
      return Self::default();
    }
    match Self::load(&path) {
      Ok(config) => {
        log::info!("Loaded config from {:?}", path);
        config
      }
      Err(e) => {
        log::warn!("Ignoring config at {:?}: {}", path, e);
        Self::default()
      }
    }
  }

  pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
    self.validate().map_err(ConfigError::Invalid)?;
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(self)?)?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_are_valid() {
    let config = BridgeConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.application, "QuickTime Player");
    assert_eq!(config.request_timeout(), Duration::from_secs(5));
    assert_eq!(config.helper(), None);
  }

  #[test]
  fn test_missing_fields_take_defaults() {
    let config: BridgeConfig = serde_json::from_str(r#"{"requestTimeoutSecs": 30}"#).unwrap();
    assert_eq!(config.request_timeout_secs, 30);
    assert!(config.launch_helper);
    assert_eq!(config.connect_retries, 10);
    assert_eq!(config.socket_path, default_socket_path());
  }

  #[test]
  fn test_validation_rejects_out_of_range() {
    let mut config = BridgeConfig::default();
    config.request_timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = BridgeConfig::default();
    config.application = "  ".into();
    assert!(config.validate().is_err());

    let mut config = BridgeConfig::default();
    config.connect_retries = 100;
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_empty_helper_path_means_auto_detect() {
    let config = BridgeConfig {
      helper_path: Some(String::new()),
      ..BridgeConfig::default()
    };
    assert_eq!(config.helper(), None);
  }

  #[test]
  fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.json");
    let config = BridgeConfig {
      application: "QuickTime Player 7".into(),
      launch_helper: false,
      ..BridgeConfig::default()
    };

    config.save(&path).unwrap();
    assert_eq!(BridgeConfig::load(&path).unwrap(), config);
  }

  #[test]
  fn test_load_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"connectRetries": 0}"#).unwrap();
    assert!(matches!(BridgeConfig::load(&path), Err(ConfigError::Invalid(_))));

    std::fs::write(&path, "not json").unwrap();
    assert!(matches!(BridgeConfig::load(&path), Err(ConfigError::Json(_))));
  }
}
