//! Batch extraction from metadata-described OData services
//!
//! The crate resolves entity sets, navigation paths and complex types from a
//! service's `$metadata` document, turns a select/expand request into a
//! column tree, and reads data pages over Basic-authenticated HTTP with
//! retry on server errors.

pub mod api;
pub mod config;
pub mod schema;
