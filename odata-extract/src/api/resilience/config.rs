//! Resilience configuration with builder pattern
//!
//! Provides a unified configuration for the retry policy and call timeouts
//! with defaults tuned for the SAP gateway limits.

use serde::Deserialize;
use std::time::Duration;

use super::retry::RetryConfig;

/// Gateway-side timeout of the SuccessFactors OData endpoint
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(300);

/// Global resilience configuration for service calls
#[derive(Debug, Clone, PartialEq)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    /// Applied to connect and to the whole request/response exchange
    pub timeout: Duration,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            timeout: GATEWAY_TIMEOUT,
        }
    }
}

impl ResilienceConfig {
    /// Create a new builder for ResilienceConfig
    pub fn builder() -> ResilienceConfigBuilder {
        ResilienceConfigBuilder::new()
    }

    /// Disable retries (for testing and one-shot diagnostics)
    pub fn disabled() -> Self {
        Self {
            retry: RetryConfig::no_retry(),
            timeout: GATEWAY_TIMEOUT,
        }
    }

    /// Overlay values from a `[resilience]` config file section
    pub fn with_settings(mut self, settings: &ResilienceSettings) -> Self {
        if let Some(max_attempts) = settings.max_attempts {
            self.retry.max_attempts = max_attempts;
        }
        if let Some(secs) = settings.base_delay_secs {
            self.retry.base_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = settings.max_delay_secs {
            self.retry.max_delay = Duration::from_secs(secs);
        }
        if let Some(multiplier) = settings.backoff_multiplier {
            self.retry.backoff_multiplier = multiplier;
        }
        if let Some(secs) = settings.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }
}

/// Optional overrides as read from the config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResilienceSettings {
    pub max_attempts: Option<u32>,
    pub base_delay_secs: Option<u64>,
    pub max_delay_secs: Option<u64>,
    pub backoff_multiplier: Option<f64>,
    pub timeout_secs: Option<u64>,
}

/// Builder for ResilienceConfig
#[derive(Debug)]
pub struct ResilienceConfigBuilder {
    config: ResilienceConfig,
}

impl ResilienceConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ResilienceConfig::default(),
        }
    }

    /// Configure retry behavior
    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set max attempts (including the first call)
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.retry.max_attempts = attempts;
        self
    }

    /// Set the first backoff delay
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.retry.base_delay = delay;
        self
    }

    /// Set the call timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> ResilienceConfig {
        self.config
    }
}

impl Default for ResilienceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResilienceConfig::default();

        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay, Duration::from_secs(5));
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_disabled_config() {
        let config = ResilienceConfig::disabled();

        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_builder_pattern() {
        let config = ResilienceConfig::builder()
            .max_attempts(3)
            .base_delay(Duration::from_secs(1))
            .timeout(Duration::from_secs(60))
            .build();

        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay, Duration::from_secs(1));
        assert_eq!(config.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_settings_overlay_only_touches_present_values() {
        let settings: ResilienceSettings = toml::from_str("max_attempts = 2\ntimeout_secs = 30").unwrap();
        let config = ResilienceConfig::default().with_settings(&settings);

        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry.base_delay, Duration::from_secs(5));
        assert_eq!(config.retry.backoff_multiplier, 2.0);
    }
}
