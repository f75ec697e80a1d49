use anyhow::{Context, Result};
use colored::*;

use odata_extract::api::metadata::EntityProvider;
use odata_extract::config::SourceConfig;
use odata_extract::schema::{ColumnMetadata, SchemaBuilder};

use super::{connect, load_metadata};

pub async fn handle(config: &SourceConfig, paths: bool) -> Result<()> {
    let entity = config.entity()?;
    let (connection, transport) = connect(config)?;
    let metadata = load_metadata(&transport, &connection).await?;

    let mut builder = SchemaBuilder::new(EntityProvider::new(&metadata));
    if let Some(depth) = config.max_expand_depth {
        builder = builder.with_max_expand_depth(depth);
    }
    let root = builder
        .build(entity, config.select.as_deref(), config.expand.as_deref())
        .with_context(|| format!("Failed to build the schema of {}", entity))?;

    if paths {
        for path in root.leaf_paths() {
            println!("{}", path);
        }
        return Ok(());
    }

    println!("{} {}", root.name().bold(), root.type_name().dimmed());
    print_children(&root, 1);
    Ok(())
}

fn print_children(column: &ColumnMetadata, depth: usize) {
    for child in column.child_list() {
        let indent = "  ".repeat(depth);
        println!("{}{} {}{}", indent, child.name().cyan(), child.type_name().dimmed(), describe(child));
        print_children(child, depth + 1);
    }
}

fn describe(column: &ColumnMetadata) -> String {
    let mut notes = Vec::new();
    if let Some(kind) = column.kind_name().filter(|k| *k != "Simple") {
        notes.push(kind.to_lowercase());
    }
    if let Some(ordinal) = column.multiplicity_ordinal() {
        notes.push(format!("multiplicity {}", ordinal));
    }
    if !column.is_nullable() {
        notes.push("not null".to_string());
    }
    if let Some(max_length) = column.max_length() {
        notes.push(format!("max {}", max_length));
    }
    if column.is_required_in_filter() {
        notes.push("filter required".to_string());
    }
    if let Some(label) = column.label() {
        notes.push(format!("\"{}\"", label));
    }

    if notes.is_empty() {
        String::new()
    } else {
        format!(" {}", format!("[{}]", notes.join(", ")).dimmed())
    }
}
