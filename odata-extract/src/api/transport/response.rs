//! Immutable result of one service call

use std::borrow::Cow;

use super::executor::RawResponse;
use crate::api::constants::SERVICE_VERSION_HEADER;

/// Status, protocol version and raw body of a service response
///
/// Built once per HTTP call and never modified afterwards. The body is kept
/// as raw bytes; decoding is left to the metadata parser or the page reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseContainer {
    http_status_code: u16,
    http_status_msg: String,
    data_service_version: Option<String>,
    response_stream: Option<Vec<u8>>,
}

impl ResponseContainer {
    pub fn new(
        http_status_code: u16,
        http_status_msg: impl Into<String>,
        data_service_version: Option<String>,
        response_stream: Option<Vec<u8>>,
    ) -> Self {
        Self {
            http_status_code,
            http_status_msg: http_status_msg.into(),
            data_service_version,
            response_stream,
        }
    }

    pub fn http_status_code(&self) -> u16 {
        self.http_status_code
    }

    pub fn http_status_msg(&self) -> &str {
        &self.http_status_msg
    }

    /// Value of the `dataserviceversion` response header, if sent
    pub fn data_service_version(&self) -> Option<&str> {
        self.data_service_version.as_deref()
    }

    /// Raw body bytes; `None` when the service returned no body
    pub fn response_stream(&self) -> Option<&[u8]> {
        self.response_stream.as_deref()
    }

    pub fn into_response_stream(self) -> Option<Vec<u8>> {
        self.response_stream
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.http_status_code)
    }

    /// Lossy UTF-8 view of the body, truncated to `limit` characters
    ///
    /// Used for error messages; never for record decoding.
    pub fn body_excerpt(&self, limit: usize) -> Cow<'_, str> {
        let Some(body) = self.response_stream.as_deref() else {
            return Cow::Borrowed("");
        };

        let text = String::from_utf8_lossy(body);
        if text.chars().count() <= limit {
            return text;
        }

        let mut excerpt: String = text.chars().take(limit).collect();
        excerpt.push_str("...");
        Cow::Owned(excerpt)
    }
}

impl From<RawResponse> for ResponseContainer {
    fn from(raw: RawResponse) -> Self {
        let data_service_version = raw.header(SERVICE_VERSION_HEADER).map(str::to_string);
        Self {
            http_status_code: raw.status,
            http_status_msg: raw.reason,
            data_service_version,
            response_stream: raw.body,
        }
    }
}
