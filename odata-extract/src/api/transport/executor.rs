//! The HTTP seam used by [`super::Transporter`]

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use super::error::TransportError;

/// A single GET request as handed to an executor
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

/// Raw outcome of one HTTP exchange, before it becomes a `ResponseContainer`
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub reason: String,
    /// Header names are stored lowercase
    pub headers: HashMap<String, String>,
    /// `None` when the service sent no body
    pub body: Option<Vec<u8>>,
}

impl RawResponse {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }
}

/// Performs one HTTP GET
#[async_trait]
pub trait HttpExecutor: Send + Sync {
    async fn get(&self, request: &HttpRequest) -> Result<RawResponse, TransportError>;
}

/// Production executor backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: reqwest::Client,
}

impl ReqwestExecutor {
    /// Build a client whose connect and read timeouts are both `timeout`
    ///
    /// The read timeout applies to each read, so a slow body that keeps
    /// arriving is not cut off.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(|e| TransportError::ClientSetup(Box::new(e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpExecutor for ReqwestExecutor {
    async fn get(&self, request: &HttpRequest) -> Result<RawResponse, TransportError> {
        let mut builder = self.client.get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.map_err(|e| TransportError::Call {
            url: request.url.clone(),
            source: Box::new(e),
        })?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();

        let bytes = response.bytes().await.map_err(|e| TransportError::Call {
            url: request.url.clone(),
            source: Box::new(e),
        })?;

        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: if bytes.is_empty() {
                None
            } else {
                Some(bytes.to_vec())
            },
        })
    }
}
