//! Paginated reading of entity set data

use log::{debug, info, warn};
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;

use super::constants::{DEFAULT_PAGE_SIZE, MEDIA_TYPE_JSON};
use super::query::{DataQuery, count_url};
use super::transport::{CallKind, HttpExecutor, ResponseContainer, TransportError, Transporter};

const ERROR_BODY_LIMIT: usize = 500;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Service returned HTTP {status} {message}: {body}")]
    Service { status: u16, message: String, body: String },

    #[error("Response from {url} has no body")]
    EmptyBody { url: String },

    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unrecognised payload envelope from {url}")]
    UnexpectedPayload { url: String },

    #[error("Invalid next link '{link}': {reason}")]
    InvalidNextLink { link: String, reason: String },

    #[error("Invalid record count '{0}'")]
    InvalidCount(String),
}

/// One page of records as returned by the service
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub url: String,
    pub records: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Offset(u32),
    Link(String),
    Done,
}

/// Reads all pages of a [`DataQuery`], one request at a time
///
/// A server-driven next link is followed when present. Otherwise `$skip`
/// advances by the page size until the service returns a short page.
pub struct PageReader<'t, E: HttpExecutor> {
    transport: &'t Transporter<E>,
    query: DataQuery,
    page_size: u32,
    cursor: Cursor,
}

impl<'t, E: HttpExecutor> PageReader<'t, E> {
    pub fn new(transport: &'t Transporter<E>, query: DataQuery) -> Self {
        let page_size = query.page_size().unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let cursor = Cursor::Offset(query.offset());
        Self {
            transport,
            query,
            page_size,
            cursor,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetch the next page, or `None` once the entity set is exhausted
    pub async fn next_page(&mut self) -> Result<Option<Page>, ReadError> {
        let url = match &self.cursor {
            Cursor::Done => return Ok(None),
            Cursor::Link(link) => link.clone(),
            Cursor::Offset(offset) => self.query.clone().top(self.page_size).skip(*offset).url(),
        };

        debug!("Reading page {}", url);
        let response = self.transport.call_with_retry(&url).await?;
        let (records, next_link) = decode_page(&url, response)?;

        let full_page = u32::try_from(records.len()).map_or(true, |n| n >= self.page_size);
        self.cursor = match (next_link, &self.cursor) {
            (Some(link), _) => Cursor::Link(resolve_link(&url, &link)?),
            (None, Cursor::Offset(offset)) if full_page => match offset.checked_add(self.page_size) {
                Some(next) => Cursor::Offset(next),
                None => {
                    warn!("$skip would exceed {} after {}; stopping", u32::MAX, url);
                    Cursor::Done
                }
            },
            _ => Cursor::Done,
        };

        debug!("Read {} records from {}", records.len(), url);
        Ok(Some(Page { url, records }))
    }

    /// Read every remaining page, stopping early once `limit` records are held
    pub async fn read_all(&mut self, limit: Option<usize>) -> Result<Vec<Value>, ReadError> {
        let mut records = Vec::new();
        while let Some(page) = self.next_page().await? {
            records.extend(page.records);
            if let Some(limit) = limit.filter(|l| records.len() >= *l) {
                records.truncate(limit);
                break;
            }
        }
        info!("Read {} records of {}", records.len(), self.query.entity());
        Ok(records)
    }
}

/// Number of records in `entity`, honouring the filter when given
///
/// The service answers `$count` with a plain-text number whatever the
/// `Accept` header says.
pub async fn count_records<E: HttpExecutor>(
    transport: &Transporter<E>,
    base_url: &str,
    entity: &str,
    filter: Option<&str>,
) -> Result<u64, ReadError> {
    let url = count_url(base_url, entity, filter);
    let response = transport.call(&url, MEDIA_TYPE_JSON, CallKind::Count).await?;
    let body = success_body(&url, &response)?;

    let text = String::from_utf8_lossy(body);
    text.trim()
        .parse::<u64>()
        .map_err(|_| ReadError::InvalidCount(text.trim().to_string()))
}

fn success_body<'r>(url: &str, response: &'r ResponseContainer) -> Result<&'r [u8], ReadError> {
    if !response.is_success() {
        return Err(ReadError::Service {
            status: response.http_status_code(),
            message: response.http_status_msg().to_string(),
            body: response.body_excerpt(ERROR_BODY_LIMIT).into_owned(),
        });
    }
    response.response_stream().ok_or_else(|| ReadError::EmptyBody {
        url: url.to_string(),
    })
}

/// Split a V2 (`d.results` / `d.__next`) or V4 (`value` / `@odata.nextLink`) envelope
fn decode_page(url: &str, response: ResponseContainer) -> Result<(Vec<Value>, Option<String>), ReadError> {
    let body = success_body(url, &response)?;
    let payload: Value = serde_json::from_slice(body)?;

    let unexpected = || ReadError::UnexpectedPayload { url: url.to_string() };
    let Value::Object(mut envelope) = payload else {
        return Err(unexpected());
    };

    if let Some(d) = envelope.remove("d") {
        return match d {
            // Verbose V1 style: "d" holds the array directly
            Value::Array(records) => Ok((records, None)),
            Value::Object(mut d) => {
                let records = match d.remove("results") {
                    Some(Value::Array(records)) => records,
                    _ => return Err(unexpected()),
                };
                let next = d.remove("__next").and_then(into_string);
                Ok((records, next))
            }
            _ => Err(unexpected()),
        };
    }

    match envelope.remove("value") {
        Some(Value::Array(records)) => {
            let next = envelope.remove("@odata.nextLink").and_then(into_string);
            Ok((records, next))
        }
        _ => {
            warn!("Payload from {} has neither 'd' nor 'value'", url);
            Err(unexpected())
        }
    }
}

fn into_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn resolve_link(current: &str, link: &str) -> Result<String, ReadError> {
    let invalid = |reason: String| ReadError::InvalidNextLink {
        link: link.to_string(),
        reason,
    };
    let base = Url::parse(current).map_err(|e| invalid(e.to_string()))?;
    base.join(link)
        .map(String::from)
        .map_err(|e| invalid(e.to_string()))
}
