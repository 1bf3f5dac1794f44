//! Compile-then-execute helpers.
//!
//! Composition errors surface before any request is sent. Backend results
//! come back exactly as the backend ordered and scored them.

use crate::backends::{SearchBackend, SearchResponse, Suggestion};
use crate::error::Result;
use crate::query::{AutocompleteBuilder, QueryComposer, SearchIntent};

pub async fn search_events(
    backend: &dyn SearchBackend,
    composer: &QueryComposer,
    index: &str,
    intent: &SearchIntent,
) -> Result<SearchResponse> {
    let compiled = composer.compile(intent)?;
    let response = backend.search(index, &compiled).await?;
    tracing::debug!(
        "Search on {} returned {} of {} hits",
        index,
        response.hits.hits.len(),
        response.total()
    );
    Ok(response)
}

pub async fn autocomplete(
    backend: &dyn SearchBackend,
    builder: &AutocompleteBuilder,
    index: &str,
    input: &str,
) -> Result<Vec<Suggestion>> {
    let request = builder.build(input)?;
    backend.suggest(index, &request).await
}
