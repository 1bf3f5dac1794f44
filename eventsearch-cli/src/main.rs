use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eventsearch::config::{expand_tilde, Config, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::SearchArgs;

#[derive(Parser, Debug)]
#[command(name = "eventsearch")]
#[command(about = "Eventsearch CLI - event index administration and query tools")]
#[command(version)]
struct Cli {
    /// Config file (created with defaults if missing)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Index name, overrides [backend] index
    #[arg(short, long, global = true)]
    index: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the index if it does not exist yet
    Provision,

    /// Delete the index and all of its documents, then create it again
    Recreate {
        /// Confirm data loss
        #[arg(long)]
        yes: bool,
    },

    /// Print the index configuration (settings + mappings) as JSON
    Mapping,

    /// Store events from a JSON array or JSONL file
    Load {
        /// Input file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Geocode stored event addresses and write back their locations
    Geocode {
        /// Concurrent geocoding requests, overrides [geocoding] concurrency
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Compile and run a search
    Search(SearchArgs),

    /// Autocomplete event names
    Suggest {
        /// Partial user input
        prefix: String,
    },

    /// Show the tokens an analyzer produces for some text
    Analyze {
        text: String,

        /// Analyzer name, defaults to the configured analyzer
        #[arg(long)]
        analyzer: Option<String>,
    },

    /// Count documents in the index
    Count,
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.logging.level.clone()),
    );
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| config.logging.format.clone());

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = expand_tilde(&cli.config)?;
    let mut config = Config::load_or_create(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    config.apply_env_overrides();
    if let Some(index) = cli.index {
        config.backend.index = index;
    }
    config.validate()?;

    init_tracing(&config);
    tracing::debug!("Using index {} at {}", config.backend.index, config.backend.url);

    match cli.command {
        Commands::Provision => commands::run_provision(&config).await?,
        Commands::Recreate { yes } => commands::run_recreate(&config, yes).await?,
        Commands::Mapping => commands::run_mapping(&config)?,
        Commands::Load { file } => commands::run_load(&config, &expand_tilde(&file)?).await?,
        Commands::Geocode { concurrency } => commands::run_geocode(&config, concurrency).await?,
        Commands::Search(args) => commands::run_search(&config, args).await?,
        Commands::Suggest { prefix } => commands::run_suggest(&config, &prefix).await?,
        Commands::Analyze { text, analyzer } => {
            commands::run_analyze(&config, &text, analyzer.as_deref()).await?
        }
        Commands::Count => commands::run_count(&config).await?,
    }

    Ok(())
}
