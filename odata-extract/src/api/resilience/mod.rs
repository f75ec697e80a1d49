//! Resilience features for service calls
//!
//! Provides the retry policy used for data-page fetches and the configuration
//! that carries retry and timeout settings into the transport.

pub mod config;
pub mod retry;

pub use config::{ResilienceConfig, ResilienceConfigBuilder, ResilienceSettings};
pub use retry::{RetryConfig, RetryFailure, RetryPolicy, RetryableError};
