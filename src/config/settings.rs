use super::{ConfigKey, ConfigStore, DEFAULT_ENVIRONMENT};
use crate::data::DEFAULT_PASSWORD;
use crate::error::Result;
use std::time::Duration;

/// Base URL used when neither `BASE_URL` nor the config file provides one.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Request timeout used when the config file does not set one.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Values taken from the process environment.
///
/// Kept separate from [`SuiteSettings`] so resolution can be exercised
/// without touching real environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    /// `ENV`
    pub environment: Option<String>,
    /// `BASE_URL`
    pub base_url: Option<String>,
    /// `API_KEY`
    pub api_key: Option<String>,
    /// `TESTER`
    pub tester: Option<String>,
    /// `CI`
    pub ci: bool,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self {
            environment: non_empty_var("ENV"),
            base_url: non_empty_var("BASE_URL"),
            api_key: non_empty_var("API_KEY"),
            tester: non_empty_var("TESTER"),
            ci: non_empty_var("CI").is_some(),
        }
    }

    pub fn environment_name(&self) -> &str {
        self.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Effective settings for one test run.
#[derive(Debug, Clone)]
pub struct SuiteSettings {
    pub environment: String,
    pub base_url: String,
    pub timeout: Duration,
    pub api_key: Option<String>,
    /// Password used for accounts the tests sign up themselves.
    pub password: String,
    pub tester: String,
    pub ci: bool,
}

impl SuiteSettings {
    /// Resolves settings from the config store and environment overrides.
    ///
    /// Environment variables win over the config file, which wins over the
    /// built-in defaults. The store is (re)loaded only when it does not
    /// already hold the requested environment.
    pub fn resolve(store: &ConfigStore, overrides: &EnvOverrides) -> Result<Self> {
        let environment = overrides.environment_name().to_string();
        if store.environment().as_deref() != Some(environment.to_lowercase().as_str()) {
            store.load(&environment)?;
        }

        let base_url = match &overrides.base_url {
            Some(url) => url.clone(),
            None => store
                .get(ConfigKey::BaseUrl)?
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };

        let timeout_ms = store
            .get(ConfigKey::Timeout)?
            .and_then(|t| t.parse::<u64>().ok())
            .filter(|t| *t > 0)
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        let api_key = match &overrides.api_key {
            Some(key) => Some(key.clone()),
            None => store.get(ConfigKey::ApiKey)?.filter(|k| !k.is_empty()),
        };

        let password = store
            .get(ConfigKey::Password)?
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| DEFAULT_PASSWORD.to_string());

        Ok(Self {
            environment,
            base_url,
            timeout: Duration::from_millis(timeout_ms),
            api_key,
            password,
            tester: overrides
                .tester
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            ci: overrides.ci,
        })
    }

    /// Settings pointing at `base_url` with every other value defaulted.
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            base_url: base_url.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            api_key: None,
            password: DEFAULT_PASSWORD.to_string(),
            tester: "unknown".to_string(),
            ci: false,
        }
    }

    /// Retries a runner should allow; the suite itself never retries.
    pub fn retries(&self) -> u32 {
        if self.ci {
            2
        } else {
            0
        }
    }

    /// Worker count a runner should use, `None` for its own default.
    pub fn workers(&self) -> Option<usize> {
        self.ci.then_some(2)
    }
}
