use anyhow::{Result, bail};
use colored::*;

use odata_extract::api::metadata::{ConnectionStatus, test_connection};
use odata_extract::config::SourceConfig;

use super::connect;

pub async fn handle(config: &SourceConfig) -> Result<()> {
    let (connection, transport) = connect(config)?;

    println!("Testing connection to {}", connection.base_url.cyan());
    match test_connection(&transport, &connection.base_url).await? {
        ConnectionStatus::Ok => {
            println!(
                "{} Connected as {}",
                "✓".bright_green().bold(),
                connection.credentials.username().bold()
            );
            Ok(())
        }
        ConnectionStatus::Unauthorized => {
            println!("{} Credentials were rejected (HTTP 401)", "✗".bright_red().bold());
            bail!("Authentication failed for {}", connection.credentials.username())
        }
        ConnectionStatus::Failed { status, message } => {
            println!("{} Service answered HTTP {} {}", "✗".bright_red().bold(), status, message);
            bail!("Connection test failed with HTTP {}", status)
        }
    }
}
