//! Authenticated HTTP transport
//!
//! Performs Basic-authenticated GET calls against the service and normalizes
//! every outcome into a [`ResponseContainer`] or a classified [`TransportError`].
//! Data-page fetches go through [`Transporter::call_with_retry`], which retries
//! gateway failures (HTTP 5xx) with exponential backoff.

mod error;
mod executor;
mod response;
mod transporter;

pub use error::{BoxError, TransportError};
pub use executor::{HttpExecutor, HttpRequest, RawResponse, ReqwestExecutor};
pub use response::ResponseContainer;
pub use transporter::{CallKind, Credentials, Transporter};

#[cfg(test)]
pub(crate) mod testing;
