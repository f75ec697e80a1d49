//! Wire-level constants shared by the transport, metadata and query layers

/// Response header carrying the OData protocol version of the payload
pub const SERVICE_VERSION_HEADER: &str = "dataserviceversion";

/// The only protocol version the metadata parser understands
pub const SUPPORTED_SERVICE_VERSION: &str = "2.0";

pub const MEDIA_TYPE_JSON: &str = "application/json";
pub const MEDIA_TYPE_XML: &str = "application/xml";

/// Path segment of the service metadata document
pub const METADATA_PATH: &str = "$metadata";

/// Path segment of the record count resource
pub const COUNT_PATH: &str = "$count";

/// Page size used when a data query does not set `$top`
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
