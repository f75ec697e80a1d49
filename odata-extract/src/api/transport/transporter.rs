//! Basic-authenticated GET calls with optional retry

use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::{debug, error};
use std::fmt;

use super::error::TransportError;
use super::executor::{HttpExecutor, HttpRequest, ReqwestExecutor};
use super::response::ResponseContainer;
use crate::api::constants::MEDIA_TYPE_JSON;
use crate::api::resilience::{ResilienceConfig, RetryFailure, RetryPolicy, RetryableError};

/// Purpose of a call, used for logging only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Test,
    Metadata,
    Count,
    Data,
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CallKind::Test => "TEST",
            CallKind::Metadata => "METADATA",
            CallKind::Count => "COUNT",
            CallKind::Data => "DATA",
        };
        f.write_str(label)
    }
}

/// Username/password pair for HTTP Basic authentication
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// `Basic <base64(username:password)>`
    pub fn authorization_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Makes authenticated calls against the OData service
///
/// Credentials are fixed at construction and sent with every call. The
/// transporter holds no per-call state, so concurrent calls on one instance
/// are independent.
#[derive(Debug)]
pub struct Transporter<E = ReqwestExecutor> {
    executor: E,
    credentials: Credentials,
    retry: RetryPolicy,
}

impl Transporter<ReqwestExecutor> {
    /// Create a transporter backed by `reqwest` with the configured timeout
    pub fn new(credentials: Credentials, config: &ResilienceConfig) -> Result<Self, TransportError> {
        let executor = ReqwestExecutor::new(config.timeout)?;
        Ok(Self::with_executor(executor, credentials, config))
    }
}

impl<E: HttpExecutor> Transporter<E> {
    pub fn with_executor(executor: E, credentials: Credentials, config: &ResilienceConfig) -> Self {
        Self {
            executor,
            credentials,
            retry: RetryPolicy::new(config.retry.clone()),
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Issue one GET and return whatever the service answered
    ///
    /// Non-2xx statuses are not errors here; the caller inspects the status.
    /// I/O failures are wrapped in [`TransportError::Call`].
    pub async fn call(
        &self,
        endpoint: &str,
        media_type: &str,
        kind: CallKind,
    ) -> Result<ResponseContainer, TransportError> {
        debug!("Calling the service for {}: {}", kind, endpoint);
        let raw = self
            .executor
            .get(&self.build_request(endpoint, media_type))
            .await?;
        debug!("{} call finished with HTTP {}", kind, raw.status);

        Ok(ResponseContainer::from(raw))
    }

    /// Fetch a data page, retrying any HTTP status of 500 or above
    ///
    /// Transport failures during an attempt are returned immediately. When
    /// every attempt ends with a server error the call fails with
    /// [`TransportError::RetriesExhausted`].
    pub async fn call_with_retry(&self, endpoint: &str) -> Result<ResponseContainer, TransportError> {
        let request = self.build_request(endpoint, MEDIA_TYPE_JSON);
        let request = &request;

        debug!("Calling the service for {}: {}", CallKind::Data, endpoint);
        let outcome = self
            .retry
            .execute(|attempt| async move {
                debug!("{} attempt {}", CallKind::Data, attempt);
                let raw = self
                    .executor
                    .get(request)
                    .await
                    .map_err(RetryableError::Fatal)?;

                if raw.status >= 500 {
                    return Err(RetryableError::Retryable { status: raw.status });
                }
                Ok(raw)
            })
            .await;

        match outcome {
            Ok(raw) => {
                debug!("{} call finished with HTTP {}", CallKind::Data, raw.status);
                Ok(ResponseContainer::from(raw))
            }
            Err(RetryFailure::Exhausted {
                attempts,
                last_status,
            }) => {
                error!("Data recovery failed for URL {}.", endpoint);
                Err(TransportError::RetriesExhausted {
                    url: endpoint.to_string(),
                    attempts,
                    last_status,
                })
            }
            Err(RetryFailure::Fatal(e)) => Err(e),
        }
    }

    fn build_request(&self, endpoint: &str, media_type: &str) -> HttpRequest {
        HttpRequest {
            url: endpoint.to_string(),
            headers: vec![
                (
                    "Authorization".to_string(),
                    self.credentials.authorization_header(),
                ),
                ("Accept".to_string(), media_type.to_string()),
            ],
        }
    }
}
