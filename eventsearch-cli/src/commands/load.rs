use anyhow::{Context, Result};
use eventsearch::geocode::create_geocoder;
use eventsearch::ingest::{geocode_events, load_events, store_events};
use eventsearch::Config;
use std::path::Path;

use super::connect;

/// Store events from a fixture file with ids 0..n
pub async fn run_load(config: &Config, file: &Path) -> Result<()> {
    let events = load_events(file)
        .with_context(|| format!("Failed to read events from {}", file.display()))?;
    tracing::info!("Loaded {} events from {}", events.len(), file.display());

    let client = connect(config)?;
    let stored = store_events(&client, &config.backend.index, &events).await?;

    let missing = events.iter().filter(|e| e.location.is_none()).count();
    println!("Stored {} events in '{}'", stored, config.backend.index);
    if missing > 0 {
        println!("{} events have no location yet; run 'eventsearch geocode'", missing);
    }
    Ok(())
}

pub async fn run_geocode(config: &Config, concurrency: Option<usize>) -> Result<()> {
    let geocoder = create_geocoder(&config.geocoding)?;
    let client = connect(config)?;
    let concurrency = concurrency.unwrap_or(config.geocoding.concurrency);

    let report = geocode_events(&client, geocoder.as_ref(), &config.backend.index, concurrency).await?;

    println!("Updated:  {}", report.updated);
    println!("Skipped:  {} (no address)", report.skipped.len());
    println!("Failed:   {}", report.failed.len());
    for (id, reason) in &report.failed {
        println!("  {}: {}", id, reason);
    }

    if !report.is_complete() {
        anyhow::bail!("{} documents could not be geocoded", report.failed.len());
    }
    Ok(())
}
