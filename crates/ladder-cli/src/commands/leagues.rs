//! League listing command.

use anyhow::{Context, Result};
use ladder_core::{HttpClient, ShutdownSignal, TrackerConfig, fetch_leagues};

pub async fn run(config: TrackerConfig) -> Result<()> {
    let client = HttpClient::new(&config)?;
    let leagues = fetch_leagues(&client, &config, &ShutdownSignal::new())
        .await
        .context("Failed to fetch league list")?;

    if leagues.is_empty() {
        println!("No leagues found.");
        return Ok(());
    }

    for league in leagues {
        println!("{}", league);
    }
    Ok(())
}
