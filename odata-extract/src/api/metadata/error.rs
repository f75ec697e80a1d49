//! Metadata access and retrieval failures

use thiserror::Error;

use crate::api::transport::TransportError;

/// Failures while fetching, parsing or traversing service metadata
///
/// A lookup that simply finds nothing is not an error; accessors return
/// `Ok(None)` for that. These variants cover broken or unreachable metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("failed to parse the metadata document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("the metadata document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("malformed metadata document: {0}")]
    Malformed(String),

    #[error("entity set '{entity_set}' refers to unknown entity type '{entity_type}'")]
    UnresolvedEntityType {
        entity_set: String,
        entity_type: String,
    },

    #[error("navigation property '{navigation}' refers to unknown association '{relationship}'")]
    UnresolvedAssociation {
        navigation: String,
        relationship: String,
    },

    #[error("association '{association}' has no end with role '{role}'")]
    UnresolvedRole { association: String, role: String },

    #[error("association '{association}' points at unknown entity type '{entity_type}'")]
    UnresolvedEndType {
        association: String,
        entity_type: String,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("metadata request failed with HTTP {status} {message}: {body}")]
    Service {
        status: u16,
        message: String,
        body: String,
    },

    #[error("the service response carries no dataserviceversion header")]
    MissingServiceVersion,

    #[error("unsupported OData service version '{0}', only 2.0 is supported")]
    UnsupportedVersion(String),

    #[error("the metadata response has no body")]
    EmptyDocument,
}
