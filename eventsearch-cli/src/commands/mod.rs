pub mod index;
pub mod load;
pub mod query;

pub use index::{run_count, run_mapping, run_provision, run_recreate};
pub use load::{run_geocode, run_load};
pub use query::{run_analyze, run_search, run_suggest, SearchArgs};

use anyhow::{Context, Result};
use eventsearch::backends::ElasticsearchClient;
use eventsearch::Config;

pub(crate) fn connect(config: &Config) -> Result<ElasticsearchClient> {
    ElasticsearchClient::from_config(&config.backend)
        .with_context(|| format!("Invalid backend url {}", config.backend.url))
}
