//! Retrieval of the service metadata document

use log::{debug, info};

use super::error::MetadataError;
use super::models::ServiceMetadata;
use super::parse::parse_metadata;
use crate::api::constants::{MEDIA_TYPE_XML, SUPPORTED_SERVICE_VERSION};
use crate::api::query::metadata_url;
use crate::api::transport::{CallKind, HttpExecutor, TransportError, Transporter};

const ERROR_BODY_LIMIT: usize = 500;

/// Result of probing the service root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Ok,
    Unauthorized,
    Failed { status: u16, message: String },
}

/// Fetch `$metadata`, check the protocol version and parse the document
pub async fn fetch_metadata<E: HttpExecutor>(
    transport: &Transporter<E>,
    base_url: &str,
) -> Result<ServiceMetadata, MetadataError> {
    let url = metadata_url(base_url);
    debug!("Fetching metadata from {}", url);

    let response = transport.call(&url, MEDIA_TYPE_XML, CallKind::Metadata).await?;

    if !response.is_success() {
        return Err(MetadataError::Service {
            status: response.http_status_code(),
            message: response.http_status_msg().to_string(),
            body: response.body_excerpt(ERROR_BODY_LIMIT).into_owned(),
        });
    }

    match response.data_service_version() {
        None => return Err(MetadataError::MissingServiceVersion),
        Some(version) if version.trim() != SUPPORTED_SERVICE_VERSION => {
            return Err(MetadataError::UnsupportedVersion(version.to_string()));
        }
        Some(_) => {}
    }

    let body = response
        .response_stream()
        .ok_or(MetadataError::EmptyDocument)?;
    let metadata = parse_metadata(body)?;

    info!(
        "Loaded metadata: {} entity types, {} entity sets",
        metadata.entity_type_count(),
        metadata.entity_sets().count()
    );
    Ok(metadata)
}

/// Probe the service root with the configured credentials
pub async fn test_connection<E: HttpExecutor>(
    transport: &Transporter<E>,
    base_url: &str,
) -> Result<ConnectionStatus, TransportError> {
    let response = transport
        .call(base_url, MEDIA_TYPE_XML, CallKind::Test)
        .await?;

    Ok(match response.http_status_code() {
        200..=299 => ConnectionStatus::Ok,
        401 => ConnectionStatus::Unauthorized,
        status => ConnectionStatus::Failed {
            status,
            message: response.http_status_msg().to_string(),
        },
    })
}
