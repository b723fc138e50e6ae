//! Application settings.
//!
//! Settings come from an optional TOML file, then environment variables
//! override individual keys. Every key has a default, so running without a
//! file is fine.

use crate::{ConfigError, CoreError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "mood-dj.toml";
pub const CONFIG_PATH_ENV: &str = "MOOD_DJ_CONFIG";
pub const ACCOUNT_ENV: &str = "MOOD_DJ_ACCOUNT";
pub const BEARER_TOKEN_ENV: &str = "MOOD_DJ_BEARER_TOKEN";
pub const API_BASE_URL_ENV: &str = "MOOD_DJ_API_BASE_URL";
pub const MODEL_DIR_ENV: &str = "MOOD_DJ_MODEL_DIR";

/// Recent search accepts between 10 and 100 results per page.
pub const MIN_MAX_RESULTS: u32 = 10;
pub const MAX_MAX_RESULTS: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub default_account: String,
    pub bearer_token: Option<String>,
    pub api_base_url: String,
    pub max_results: u32,
    pub request_timeout_secs: Option<u64>,
    pub user_agent: String,
    pub model_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_account: "elonmusk".to_string(),
            bearer_token: None,
            api_base_url: "https://api.twitter.com".to_string(),
            max_results: 10,
            request_timeout_secs: None,
            user_agent: concat!("mood-dj/", env!("CARGO_PKG_VERSION")).to_string(),
            model_dir: PathBuf::from("models/emotion-english-distilroberta-base"),
        }
    }
}

impl AppConfig {
    /// Loads settings the way the application does at startup: the file named
    /// by `MOOD_DJ_CONFIG` (which must exist), else `mood-dj.toml` if present,
    /// then environment overrides.
    pub fn load() -> Result<Self, CoreError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            Err(_) => {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        info!(
            "Configuration loaded (api: {}, max_results: {}, model: {})",
            config.api_base_url,
            config.max_results,
            config.model_dir.display()
        );
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CoreError::Io(e)
            }
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, CoreError> {
        let config: AppConfig = toml::from_str(contents).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Applies overrides from `lookup`, which maps an environment variable
    /// name to its value. Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(account) = get(ACCOUNT_ENV) {
            self.default_account = account;
        }
        if let Some(token) = get(BEARER_TOKEN_ENV) {
            self.bearer_token = Some(token);
        }
        if let Some(base_url) = get(API_BASE_URL_ENV) {
            self.api_base_url = base_url;
        }
        if let Some(model_dir) = get(MODEL_DIR_ENV) {
            self.model_dir = PathBuf::from(model_dir);
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(MIN_MAX_RESULTS..=MAX_MAX_RESULTS).contains(&self.max_results) {
            return Err(ConfigError::InvalidValue {
                field: "max_results".to_string(),
                value: self.max_results.to_string(),
            }
            .into());
        }

        if self.default_account.trim().is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "default_account must not be empty".to_string(),
            }
            .into());
        }

        if Url::parse(&self.api_base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url".to_string(),
                value: self.api_base_url.clone(),
            }
            .into());
        }

        Ok(())
    }
}
