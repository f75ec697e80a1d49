//! Source configuration
//!
//! Values are layered: the TOML config file first, then `ODATA_*`
//! environment variables (a `.env` file is honoured), then command line
//! flags. Only presence and the shape of the base URL are validated here.

mod error;

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use reqwest::Url;
use serde::Deserialize;

use crate::api::resilience::{ResilienceConfig, ResilienceSettings};
use crate::api::transport::Credentials;

pub use error::ConfigError;

const APP_DIR: &str = "odata-extract";
const CONFIG_FILE: &str = "config.toml";

/// Environment variable for each overridable field
pub const ENV_BASE_URL: &str = "ODATA_BASE_URL";
pub const ENV_ENTITY: &str = "ODATA_ENTITY";
pub const ENV_USERNAME: &str = "ODATA_USERNAME";
pub const ENV_PASSWORD: &str = "ODATA_PASSWORD";
pub const ENV_FILTER: &str = "ODATA_FILTER";
pub const ENV_SELECT: &str = "ODATA_SELECT";
pub const ENV_EXPAND: &str = "ODATA_EXPAND";

/// Where the service lives, what to read and how to authenticate
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: Option<String>,
    pub entity: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub filter: Option<String>,
    /// Comma-separated, e.g. `userId,empInfo/startDate`
    pub select: Option<String>,
    /// Comma-separated, e.g. `empInfo/jobInfoNav`
    pub expand: Option<String>,
    pub page_size: Option<u32>,
    pub max_expand_depth: Option<usize>,
    pub resilience: ResilienceSettings,
}

/// Validated endpoint and credentials
#[derive(Debug, Clone)]
pub struct Connection {
    pub base_url: String,
    pub credentials: Credentials,
}

/// `<config dir>/odata-extract/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

impl SourceConfig {
    /// Load the config file, falling back to defaults when the default file is absent
    ///
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match default_config_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `ODATA_*` variables from the process environment and `.env`
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| dotenvy::var(key).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let fields = [
            (ENV_BASE_URL, &mut self.base_url),
            (ENV_ENTITY, &mut self.entity),
            (ENV_USERNAME, &mut self.username),
            (ENV_PASSWORD, &mut self.password),
            (ENV_FILTER, &mut self.filter),
            (ENV_SELECT, &mut self.select),
            (ENV_EXPAND, &mut self.expand),
        ];
        for (key, field) in fields {
            if let Some(value) = lookup(key) {
                debug!("Using {} from the environment", key);
                *field = Some(value);
            }
        }
    }

    /// Replace every field that `overrides` sets
    pub fn merge(&mut self, overrides: SourceConfig) {
        fn take<T>(target: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *target = value;
            }
        }

        take(&mut self.base_url, overrides.base_url);
        take(&mut self.entity, overrides.entity);
        take(&mut self.username, overrides.username);
        take(&mut self.password, overrides.password);
        take(&mut self.filter, overrides.filter);
        take(&mut self.select, overrides.select);
        take(&mut self.expand, overrides.expand);
        take(&mut self.page_size, overrides.page_size);
        take(&mut self.max_expand_depth, overrides.max_expand_depth);

        let resilience = overrides.resilience;
        take(&mut self.resilience.max_attempts, resilience.max_attempts);
        take(&mut self.resilience.base_delay_secs, resilience.base_delay_secs);
        take(&mut self.resilience.max_delay_secs, resilience.max_delay_secs);
        take(&mut self.resilience.backoff_multiplier, resilience.backoff_multiplier);
        take(&mut self.resilience.timeout_secs, resilience.timeout_secs);
    }

    /// Base URL and credentials, checked for presence and URL shape
    pub fn connection(&self) -> Result<Connection, ConfigError> {
        let base_url = required(&self.base_url, "base_url")?;
        let username = required(&self.username, "username")?;
        let password = required(&self.password, "password")?;

        let url = Url::parse(base_url).map_err(|e| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(Connection {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: Credentials::new(username, password),
        })
    }

    pub fn entity(&self) -> Result<&str, ConfigError> {
        required(&self.entity, "entity")
    }

    pub fn resilience_config(&self) -> ResilienceConfig {
        ResilienceConfig::default().with_settings(&self.resilience)
    }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(field))
}
