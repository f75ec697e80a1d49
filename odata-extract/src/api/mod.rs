//! OData API client: transport, metadata, query building and page reading
//!
//! The layers build on each other bottom-up. [`transport`] issues
//! authenticated GETs and owns the retry loop, [`metadata`] fetches and
//! navigates the service's EDMX document, [`query`] produces resource URLs,
//! and [`reader`] walks data pages for one entity set.

pub mod constants;
pub mod metadata;
pub mod query;
pub mod reader;
pub mod resilience;
pub mod transport;

pub use metadata::{
    ConnectionStatus, EntityProvider, MetadataError, ServiceMetadata, fetch_metadata, test_connection,
};
pub use query::{DataQuery, ExpandTree, count_url, metadata_url};
pub use reader::{Page, PageReader, ReadError, count_records};
pub use resilience::{ResilienceConfig, RetryConfig, RetryPolicy};
pub use transport::{CallKind, Credentials, ResponseContainer, TransportError, Transporter};
