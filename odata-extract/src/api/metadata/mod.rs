//! Service metadata: models, parsing, retrieval and navigation

mod error;
pub mod models;
pub mod parse;
pub mod provider;
pub mod service;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::MetadataError;
pub use models::{
    Association, AssociationEnd, ComplexType, EntityContainer, EntitySet, EntityType, Facets,
    Multiplicity, NavigationProperty, Property, QualifiedName, SapAnnotations, ServiceMetadata,
};
pub use parse::{parse_metadata, parse_metadata_str};
pub use provider::EntityProvider;
pub use service::{ConnectionStatus, fetch_metadata, test_connection};
