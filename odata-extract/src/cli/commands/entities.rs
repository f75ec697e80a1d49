use anyhow::Result;
use colored::*;

use odata_extract::api::metadata::{EntityProvider, EntitySet};
use odata_extract::config::SourceConfig;

use super::{connect, load_metadata};

pub async fn handle(config: &SourceConfig, all: bool) -> Result<()> {
    let (connection, transport) = connect(config)?;
    let metadata = load_metadata(&transport, &connection).await?;
    let provider = EntityProvider::new(&metadata);

    let sets: Vec<&EntitySet> = if all {
        metadata.entity_sets().collect()
    } else {
        provider.get_default_entity_set().iter().collect()
    };

    if sets.is_empty() {
        println!("{}", "No entity sets found".yellow());
        return Ok(());
    }

    let width = sets.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for set in &sets {
        let label = set.sap.label.as_deref().unwrap_or("");
        println!(
            "{}  {}  {}",
            format!("{:width$}", set.name, width = width).bold(),
            set.entity_type.to_string().dimmed(),
            label
        );
    }
    println!();
    println!("{} entity sets", sets.len().to_string().cyan());
    Ok(())
}
