//! Command handlers

pub mod connection;
pub mod count;
pub mod entities;
pub mod fetch;
pub mod schema;

use anyhow::{Context, Result};

use odata_extract::api::metadata::{ServiceMetadata, fetch_metadata};
use odata_extract::api::transport::Transporter;
use odata_extract::config::{Connection, SourceConfig};

use super::{GlobalArgs, QueryArgs, SourceArgs};

/// Config file, then environment, then command line flags
pub fn resolve_config(global: &GlobalArgs, source: &SourceArgs, query: Option<&QueryArgs>) -> Result<SourceConfig> {
    let mut config = SourceConfig::load(global.config.as_deref()).context("Failed to load configuration")?;
    config.apply_env();
    config.merge(source.overrides());
    if let Some(query) = query {
        query.apply(&mut config);
    }
    Ok(config)
}

/// Validated connection plus a transporter built from the resilience settings
pub fn connect(config: &SourceConfig) -> Result<(Connection, Transporter)> {
    let connection = config.connection().context("Invalid connection settings")?;
    let transport = Transporter::new(connection.credentials.clone(), &config.resilience_config())
        .context("Failed to create HTTP client")?;
    Ok((connection, transport))
}

pub async fn load_metadata(transport: &Transporter, connection: &Connection) -> Result<ServiceMetadata> {
    fetch_metadata(transport, &connection.base_url)
        .await
        .with_context(|| format!("Failed to load metadata from {}", connection.base_url))
}
