use anyhow::{bail, Context, Result};
use clap::Args;
use eventsearch::backends::SearchBackend;
use eventsearch::query::{
    AutocompleteBuilder, CostRange, Distance, Fuzziness, GeoFilter, QueryComposer, SearchIntent,
};
use eventsearch::search::{autocomplete, search_events};
use eventsearch::Config;

use super::connect;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Free-text keywords
    pub keywords: Option<String>,

    /// Match events with any of these tags (repeatable)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Minimum cost, inclusive
    #[arg(long, allow_hyphen_values = true)]
    pub min_cost: Option<i64>,

    /// Maximum cost, exclusive
    #[arg(long, allow_hyphen_values = true)]
    pub max_cost: Option<i64>,

    /// Latitude of the search center
    #[arg(long, requires_all = ["lon", "radius"], allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude of the search center
    #[arg(long, requires_all = ["lat", "radius"], allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Radius such as 6mi or 10km
    #[arg(long, requires_all = ["lat", "lon"])]
    pub radius: Option<Distance>,

    /// auto or off, overrides [relevance] fuzziness
    #[arg(long)]
    pub fuzziness: Option<Fuzziness>,

    #[arg(long)]
    pub from: Option<usize>,

    #[arg(long)]
    pub size: Option<usize>,

    /// Print the compiled request instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

impl SearchArgs {
    fn into_intent(self, default_fuzziness: Fuzziness) -> SearchIntent {
        let mut intent = SearchIntent::new()
            .with_tags(self.tags)
            .with_fuzziness(self.fuzziness.unwrap_or(default_fuzziness));

        if let Some(keywords) = self.keywords {
            intent = intent.with_keywords(keywords);
        }
        if self.min_cost.is_some() || self.max_cost.is_some() {
            intent = intent.with_cost(CostRange {
                min: self.min_cost,
                max: self.max_cost,
            });
        }
        if let (Some(lat), Some(lon), Some(radius)) = (self.lat, self.lon, self.radius) {
            intent = intent.with_geo(GeoFilter::new(lat, lon, radius));
        }
        intent.from = self.from;
        intent.size = self.size;
        intent
    }
}

pub async fn run_search(config: &Config, args: SearchArgs) -> Result<()> {
    let composer = QueryComposer::new(config.relevance.clone())?;
    let dry_run = args.dry_run;
    let intent = args.into_intent(config.relevance.fuzziness);

    if dry_run {
        let compiled = composer.compile(&intent)?;
        println!("{}", serde_json::to_string_pretty(&compiled)?);
        return Ok(());
    }

    let client = connect(config)?;
    let response = search_events(&client, &composer, &config.backend.index, &intent).await?;

    println!("{} hits", response.total());
    for hit in &response.hits.hits {
        let score = hit
            .score
            .map(|s| format!("{:.3}", s))
            .unwrap_or_else(|| "-".to_string());
        match hit.event() {
            Ok(event) => println!(
                "  [{}] {:>7}  {}  ({}, cost {})",
                hit.id,
                score,
                event.name,
                event.tags.join(", "),
                event.cost
            ),
            Err(_) => println!("  [{}] {:>7}  {}", hit.id, score, hit.source),
        }
    }
    Ok(())
}

pub async fn run_suggest(config: &Config, prefix: &str) -> Result<()> {
    let builder = AutocompleteBuilder::new(config.autocomplete.clone());
    let client = connect(config)?;

    let suggestions = autocomplete(&client, &builder, &config.backend.index, prefix).await?;
    if suggestions.is_empty() {
        println!("No suggestions for '{}'", prefix);
    }
    for suggestion in suggestions {
        println!("{}", suggestion.text);
    }
    Ok(())
}

pub async fn run_analyze(config: &Config, text: &str, analyzer: Option<&str>) -> Result<()> {
    if text.trim().is_empty() {
        bail!("Nothing to analyze");
    }
    let analyzer = analyzer.unwrap_or(&config.analysis.analyzer);
    let client = connect(config)?;

    let tokens = client
        .analyze(Some(&config.backend.index), analyzer, text)
        .await
        .with_context(|| format!("Analyzer '{}' failed", analyzer))?;
    println!("{}", tokens.join(" | "));
    Ok(())
}
