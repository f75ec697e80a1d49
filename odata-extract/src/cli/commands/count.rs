use anyhow::{Context, Result};
use colored::*;

use odata_extract::api::reader::count_records;
use odata_extract::config::SourceConfig;

use super::connect;

pub async fn handle(config: &SourceConfig) -> Result<()> {
    let entity = config.entity()?;
    let (connection, transport) = connect(config)?;

    let count = count_records(&transport, &connection.base_url, entity, config.filter.as_deref())
        .await
        .with_context(|| format!("Failed to count {}", entity))?;

    println!("{}: {}", entity.bold(), count.to_string().bright_green());
    Ok(())
}
