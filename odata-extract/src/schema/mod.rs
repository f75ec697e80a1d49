//! Column schema of an extraction: the column metadata tree and the walk
//! that builds it from service metadata

mod builder;
mod column;
mod error;

pub use builder::{DEFAULT_MAX_EXPAND_DEPTH, SchemaBuilder};
pub use column::{ColumnAttributes, ColumnKind, ColumnMetadata, ColumnMetadataBuilder};
pub use error::SchemaError;
