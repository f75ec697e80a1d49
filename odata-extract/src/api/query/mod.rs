//! OData query construction
//!
//! Builds resource URLs with system query options and merges expand/select
//! paths into a tree the schema walk can follow.

pub mod expand;
pub mod url;

pub use expand::{ExpandNode, ExpandTree};
pub use url::{DataQuery, count_url, metadata_url};
