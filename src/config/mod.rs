//! Per-environment configuration.
//!
//! Settings live in one JSON file per environment (`<config_dir>/<env>.json`).
//! A [`ConfigStore`] loads one of them and answers lookups by key until the
//! next load replaces it.

mod settings;

pub use settings::{EnvOverrides, SuiteSettings, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};

use crate::error::{Result, SuiteError};
use lazy_static::lazy_static;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// Name of the environment used when none is requested.
pub const DEFAULT_ENVIRONMENT: &str = "qa";

lazy_static! {
    static ref SHARED_STORE: ConfigStore = ConfigStore::new(default_config_dir());
}

/// Directory holding the environment files shipped with the crate.
pub fn default_config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config")
}

/// Keys that can be looked up in a loaded configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    BaseUrl,
    ApiKey,
    Timeout,
    Password,
}

impl ConfigKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::BaseUrl => "baseUrl",
            ConfigKey::ApiKey => "apiKey",
            ConfigKey::Timeout => "timeout",
            ConfigKey::Password => "password",
        }
    }
}

/// Contents of an environment file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in milliseconds.
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub password: Option<String>,
}

impl EnvConfig {
    fn value(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::BaseUrl => Some(self.base_url.clone()),
            ConfigKey::ApiKey => self.api_key.clone(),
            ConfigKey::Timeout => self.timeout.map(|t| t.to_string()),
            ConfigKey::Password => self.password.clone(),
        }
    }
}

#[derive(Debug)]
struct LoadedConfig {
    environment: String,
    values: EnvConfig,
}

/// Load-once, read-many store of environment settings.
///
/// Lookups take a read lock, loads take the write lock, so concurrent tests
/// never observe a half-replaced configuration.
#[derive(Debug)]
pub struct ConfigStore {
    config_dir: PathBuf,
    loaded: RwLock<Option<LoadedConfig>>,
}

impl ConfigStore {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            loaded: RwLock::new(None),
        }
    }

    /// The process-wide store reading from [`default_config_dir`].
    pub fn shared() -> &'static ConfigStore {
        &SHARED_STORE
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Reads `<config_dir>/<environment>.json`, replacing anything loaded before.
    ///
    /// The file is read again on every call.
    pub fn load(&self, environment: &str) -> Result<()> {
        let path = self
            .config_dir
            .join(format!("{}.json", environment.to_lowercase()));
        if !path.exists() {
            return Err(SuiteError::ConfigNotFound(environment.to_string()));
        }

        let raw = std::fs::read_to_string(&path)?;
        let values: EnvConfig =
            serde_json::from_str(&raw).map_err(|source| SuiteError::ConfigParse {
                environment: environment.to_string(),
                source,
            })?;
        debug!("Loaded config for {} from {:?}", environment, path);

        let mut loaded = self.loaded.write().unwrap_or_else(|e| e.into_inner());
        *loaded = Some(LoadedConfig {
            environment: environment.to_lowercase(),
            values,
        });
        Ok(())
    }

    /// Returns the value for `key` as a string, `None` when the loaded file omits it.
    pub fn get(&self, key: ConfigKey) -> Result<Option<String>> {
        let loaded = self.loaded.read().unwrap_or_else(|e| e.into_inner());
        match loaded.as_ref() {
            Some(config) => Ok(config.values.value(key)),
            None => Err(SuiteError::ConfigNotLoaded),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Lower-cased name of the loaded environment.
    pub fn environment(&self) -> Option<String> {
        self.loaded
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|c| c.environment.clone())
    }
}
