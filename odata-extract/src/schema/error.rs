use thiserror::Error;

use crate::api::metadata::MetadataError;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Entity '{0}' not found in the service metadata")]
    EntityNotFound(String),

    #[error("Invalid expand path '{path}' for entity '{entity}'")]
    InvalidExpandPath { entity: String, path: String },

    #[error("Invalid select field '{field}' for entity '{entity}'")]
    InvalidSelectField { entity: String, field: String },

    #[error("Complex type '{0}' contains itself")]
    CyclicComplexType(String),

    #[error("Expand path '{path}' is deeper than the allowed {max} levels")]
    ExpandTooDeep { path: String, max: usize },

    #[error(transparent)]
    Metadata(#[from] MetadataError),
}
