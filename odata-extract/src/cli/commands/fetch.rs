use std::io::{self, Write};
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use odata_extract::api::metadata::EntityProvider;
use odata_extract::api::query::{DataQuery, ExpandTree};
use odata_extract::api::reader::PageReader;
use odata_extract::config::SourceConfig;
use odata_extract::schema::SchemaBuilder;

use super::{connect, load_metadata};

/// Stream records to stdout as JSON lines; progress goes to the log
pub async fn handle(config: &SourceConfig, limit: Option<usize>) -> Result<()> {
    let entity = config.entity()?;
    let (connection, transport) = connect(config)?;
    let metadata = load_metadata(&transport, &connection).await?;

    let mut builder = SchemaBuilder::new(EntityProvider::new(&metadata));
    if let Some(depth) = config.max_expand_depth {
        builder = builder.with_max_expand_depth(depth);
    }
    let schema = builder
        .build(entity, config.select.as_deref(), config.expand.as_deref())
        .with_context(|| format!("Invalid select/expand for {}", entity))?;
    info!("Extracting {} columns of {}", schema.leaf_paths().len(), entity);

    let (tree, _) = ExpandTree::parse(config.expand.as_deref(), config.select.as_deref());
    let mut query = DataQuery::new(&connection.base_url, entity)
        .select(tree.build_select_clauses())
        .expand(tree.build_expand_clauses())
        .filter(config.filter.as_deref());
    if let Some(page_size) = config.page_size {
        query = query.top(page_size);
    }

    let start = Instant::now();
    let mut reader = PageReader::new(&transport, query);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut written = 0usize;

    'pages: while let Some(page) = reader.next_page().await? {
        for record in page.records {
            if limit.is_some_and(|limit| written >= limit) {
                break 'pages;
            }
            serde_json::to_writer(&mut out, &record).context("Failed to write record")?;
            writeln!(out).context("Failed to write record")?;
            written += 1;
        }
        info!("{} records so far", written);
        if limit.is_some_and(|limit| written >= limit) {
            break;
        }
    }
    out.flush().context("Failed to flush output")?;

    info!(
        "Wrote {} records of {} in {:.1}s",
        written,
        entity,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
