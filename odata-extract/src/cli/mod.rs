//! Command line interface

pub mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use odata_extract::config::SourceConfig;

#[derive(Parser, Debug)]
#[command(
    name = "odata-extract",
    version,
    about = "Inspect and extract entity sets from SAP SuccessFactors OData services"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Config file (default: <config dir>/odata-extract/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Connection settings; each one overrides the config file and environment
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Service root, e.g. https://api4.successfactors.com/odata/v2
    #[arg(long)]
    pub base_url: Option<String>,

    /// User in `user@companyId` form
    #[arg(short, long)]
    pub username: Option<String>,

    #[arg(long)]
    pub password: Option<String>,

    /// Maximum attempts per data page
    #[arg(long)]
    pub max_attempts: Option<u32>,
}

/// What to read from the entity set
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Entity set name, e.g. User
    #[arg(short, long)]
    pub entity: Option<String>,

    /// OData $filter expression
    #[arg(long)]
    pub filter: Option<String>,

    /// Comma-separated fields, e.g. userId,empInfo/startDate
    #[arg(long)]
    pub select: Option<String>,

    /// Comma-separated navigation paths, e.g. empInfo/jobInfoNav
    #[arg(long)]
    pub expand: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check that the service accepts the credentials
    Test {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// List the entity sets of the service
    Entities {
        #[command(flatten)]
        source: SourceArgs,

        /// Include entity sets of every container, not only the default one
        #[arg(long)]
        all: bool,
    },
    /// Show the column tree an extraction would produce
    Schema {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        query: QueryArgs,

        /// Print slash-joined leaf column paths instead of the tree
        #[arg(long)]
        paths: bool,

        /// Maximum navigation depth below the entity
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Count the records of an entity set
    Count {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        query: QueryArgs,
    },
    /// Read records and print them as JSON lines
    Fetch {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        query: QueryArgs,

        /// Records per page ($top)
        #[arg(long)]
        page_size: Option<u32>,

        /// Stop after this many records
        #[arg(long)]
        limit: Option<usize>,
    },
}

impl SourceArgs {
    fn overrides(&self) -> SourceConfig {
        let mut config = SourceConfig {
            base_url: self.base_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            ..SourceConfig::default()
        };
        config.resilience.max_attempts = self.max_attempts;
        config
    }
}

impl QueryArgs {
    fn apply(&self, config: &mut SourceConfig) {
        config.merge(SourceConfig {
            entity: self.entity.clone(),
            filter: self.filter.clone(),
            select: self.select.clone(),
            expand: self.expand.clone(),
            ..SourceConfig::default()
        });
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    if cli.global.no_color {
        colored::control::set_override(false);
    }

    let global = cli.global;
    match cli.command {
        Commands::Test { source } => {
            let config = commands::resolve_config(&global, &source, None)?;
            commands::connection::handle(&config).await
        }
        Commands::Entities { source, all } => {
            let config = commands::resolve_config(&global, &source, None)?;
            commands::entities::handle(&config, all).await
        }
        Commands::Schema {
            source,
            query,
            paths,
            max_depth,
        } => {
            let mut config = commands::resolve_config(&global, &source, Some(&query))?;
            if max_depth.is_some() {
                config.max_expand_depth = max_depth;
            }
            commands::schema::handle(&config, paths).await
        }
        Commands::Count { source, query } => {
            let config = commands::resolve_config(&global, &source, Some(&query))?;
            commands::count::handle(&config).await
        }
        Commands::Fetch {
            source,
            query,
            page_size,
            limit,
        } => {
            let mut config = commands::resolve_config(&global, &source, Some(&query))?;
            if page_size.is_some() {
                config.page_size = page_size;
            }
            commands::fetch::handle(&config, limit).await
        }
    }
}
