use anyhow::{bail, Context, Result};
use eventsearch::backends::SearchBackend;
use eventsearch::provision::{provision_if_absent, recreate_index, ProvisionOutcome};
use eventsearch::{build_index_config, Config, FieldContract, IndexConfig};

use super::connect;

fn index_config(config: &Config) -> IndexConfig {
    build_index_config(FieldContract::global(), &config.analysis)
}

pub async fn run_provision(config: &Config) -> Result<()> {
    let client = connect(config)?;
    let index = &config.backend.index;

    match provision_if_absent(&client, index, &index_config(config)).await? {
        ProvisionOutcome::Created => println!("Created index '{}'", index),
        ProvisionOutcome::AlreadyExists => {
            println!("Index '{}' already exists, nothing changed", index);
            println!("Use 'eventsearch recreate --yes' to drop and rebuild it.");
        }
    }
    Ok(())
}

pub async fn run_recreate(config: &Config, confirmed: bool) -> Result<()> {
    let index = &config.backend.index;
    if !confirmed {
        bail!(
            "Recreating '{}' deletes every document in it. Re-run with --yes to confirm.",
            index
        );
    }

    let client = connect(config)?;
    let outcome = recreate_index(&client, index, &index_config(config)).await?;
    if outcome.deleted_existing {
        println!("Deleted and recreated index '{}'", index);
    } else {
        println!("Index '{}' did not exist, created it", index);
    }
    Ok(())
}

pub fn run_mapping(config: &Config) -> Result<()> {
    let body = serde_json::to_string_pretty(&index_config(config))
        .context("Failed to serialize index configuration")?;
    println!("{}", body);
    Ok(())
}

pub async fn run_count(config: &Config) -> Result<()> {
    let client = connect(config)?;
    let count = client.count(&config.backend.index).await?;
    println!("{}", count);
    Ok(())
}
