//! Configuration loading for docsight
//!
//! The API address is resolved once at startup, in increasing precedence:
//! built-in defaults, the YAML config file, environment variables, then
//! command-line flags. The resolved [`ClientConfig`] is handed to the client
//! at construction; nothing downstream looks at the environment again.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::client::{ClientConfig, DEFAULT_BASE_URL};

pub const CONFIG_ENV: &str = "DOCSIGHT_CONFIG";
pub const API_URL_ENV: &str = "DOCSIGHT_API_URL";
pub const ENVIRONMENT_ENV: &str = "DOCSIGHT_ENV";
pub const UPLOAD_TIMEOUT_ENV: &str = "DOCSIGHT_UPLOAD_TIMEOUT_SECS";
pub const LIST_TIMEOUT_ENV: &str = "DOCSIGHT_LIST_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("Invalid config file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("Invalid value for {key}: '{value}'")]
  InvalidValue { key: String, value: String },

  #[error("No production_url configured for the production environment")]
  MissingProductionUrl,

  #[error("Invalid API URL '{url}': {reason}")]
  InvalidUrl { url: String, reason: String },
}

/// Deployment the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  #[default]
  Local,
  Production,
}

impl std::str::FromStr for Environment {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_lowercase().as_str() {
      "local" | "development" | "dev" => Ok(Self::Local),
      "production" | "prod" => Ok(Self::Production),
      _ => Err(ConfigError::InvalidValue { key: ENVIRONMENT_ENV.to_string(), value: s.to_string() }),
    }
  }
}

/// Contents of `config.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub environment: Environment,
  pub local_url: String,
  pub production_url: Option<String>,
  /// Explicit address; beats the environment-based choice when set
  pub api_url: Option<String>,
  pub upload_timeout_secs: u64,
  pub list_timeout_secs: u64,
  pub probe_timeout_secs: u64,
}

impl Default for Settings {
  fn default() -> Self {
    let client = ClientConfig::default();
    Self {
      environment: Environment::Local,
      local_url: DEFAULT_BASE_URL.to_string(),
      production_url: None,
      api_url: None,
      upload_timeout_secs: client.upload_timeout_secs,
      list_timeout_secs: client.list_timeout_secs,
      probe_timeout_secs: client.probe_timeout_secs,
    }
  }
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
  pub api_url: Option<String>,
  pub environment: Option<Environment>,
}

/// Where the config file is looked for when no path is given
pub fn default_config_path() -> Option<PathBuf> {
  if let Ok(path) = std::env::var(CONFIG_ENV) {
    return Some(PathBuf::from(path));
  }
  dirs::config_dir().map(|dir| dir.join("docsight").join("config.yaml"))
}

impl Settings {
  /// Load settings from `path`. A missing file yields defaults.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    if !path.exists() {
      tracing::debug!(path = %path.display(), "no config file, using defaults");
      return Ok(Self::default());
    }

    let content = std::fs::read_to_string(path)
      .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    if content.trim().is_empty() {
      return Ok(Self::default());
    }

    serde_yaml::from_str(&content)
      .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
  }

  /// Apply environment overrides read through `lookup`.
  pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(url) = lookup(API_URL_ENV) {
      self.api_url = Some(url);
    }
    if let Some(env) = lookup(ENVIRONMENT_ENV) {
      self.environment = env.parse()?;
    }
    if let Some(secs) = lookup(UPLOAD_TIMEOUT_ENV) {
      self.upload_timeout_secs = parse_secs(UPLOAD_TIMEOUT_ENV, &secs)?;
    }
    if let Some(secs) = lookup(LIST_TIMEOUT_ENV) {
      self.list_timeout_secs = parse_secs(LIST_TIMEOUT_ENV, &secs)?;
    }
    Ok(())
  }

  pub fn apply_env(&mut self) -> Result<(), ConfigError> {
    self.apply_env_with(|key| std::env::var(key).ok())
  }

  pub fn apply_overrides(&mut self, overrides: &Overrides) {
    if let Some(environment) = overrides.environment {
      self.environment = environment;
      // An explicit environment choice outranks a URL pinned by file or env.
      self.api_url = None;
    }
    if let Some(url) = &overrides.api_url {
      self.api_url = Some(url.clone());
    }
  }

  /// Resolve the base URL the client should use
  pub fn base_url(&self) -> Result<String, ConfigError> {
    let url = match (&self.api_url, self.environment) {
      (Some(url), _) => url.clone(),
      (None, Environment::Local) => self.local_url.clone(),
      (None, Environment::Production) => {
        self.production_url.clone().ok_or(ConfigError::MissingProductionUrl)?
      }
    };
    validate_url(&url)?;
    Ok(url)
  }

  pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
    for (key, secs) in [
      ("upload_timeout_secs", self.upload_timeout_secs),
      ("list_timeout_secs", self.list_timeout_secs),
      ("probe_timeout_secs", self.probe_timeout_secs),
    ] {
      if secs == 0 {
        return Err(ConfigError::InvalidValue { key: key.to_string(), value: secs.to_string() });
      }
    }

    Ok(ClientConfig {
      base_url: self.base_url()?,
      upload_timeout_secs: self.upload_timeout_secs,
      list_timeout_secs: self.list_timeout_secs,
      probe_timeout_secs: self.probe_timeout_secs,
    })
  }
}

/// Full resolution: file, then environment, then flags.
pub fn resolve(path: Option<&Path>, overrides: &Overrides) -> Result<ClientConfig, ConfigError> {
  let mut settings = match path.map(Path::to_path_buf).or_else(default_config_path) {
    Some(path) => Settings::load(&path)?,
    None => Settings::default(),
  };
  settings.apply_env()?;
  settings.apply_overrides(overrides);
  settings.client_config()
}

fn parse_secs(key: &str, value: &str) -> Result<u64, ConfigError> {
  match value.trim().parse::<u64>() {
    Ok(secs) if secs > 0 => Ok(secs),
    _ => Err(ConfigError::InvalidValue { key: key.to_string(), value: value.to_string() }),
  }
}

fn validate_url(url: &str) -> Result<(), ConfigError> {
  let parsed = reqwest::Url::parse(url)
    .map_err(|e| ConfigError::InvalidUrl { url: url.to_string(), reason: e.to_string() })?;
  match parsed.scheme() {
    "http" | "https" => Ok(()),
    other => Err(ConfigError::InvalidUrl {
      url: url.to_string(),
      reason: format!("unsupported scheme '{other}'"),
    }),
  }
}
