//! Fixture loading, bulk storing and location backfill

use futures::stream::{self, StreamExt};
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

use crate::backends::SearchBackend;
use crate::document::EventDocument;
use crate::error::{Error, Result};
use crate::geocode::Geocoder;
use crate::schema::EventField;

/// Outcome of a geocoding pass over an index
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeocodeReport {
    pub updated: usize,
    /// Documents without an address
    pub skipped: Vec<String>,
    /// (document id, reason)
    pub failed: Vec<(String, String)>,
}

impl GeocodeReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Read events from a JSON array or a JSON Lines file
pub fn load_events(path: &Path) -> Result<Vec<EventDocument>> {
    let content = fs::read_to_string(path)?;
    parse_events(&content)
}

pub fn parse_events(content: &str) -> Result<Vec<EventDocument>> {
    let trimmed = content.trim_start();
    if trimmed.starts_with('[') {
        return Ok(serde_json::from_str(trimmed)?);
    }

    let mut events = Vec::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event = serde_json::from_str(line).map_err(|e| {
            Error::validation(format!("line {}: invalid event record: {}", lineno + 1, e))
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Store events with sequential ids starting at 0, then refresh the index.
/// Returns the number of documents written.
///
/// Every event is checked before the first write, so an invalid record
/// leaves the index untouched.
pub async fn store_events(
    backend: &dyn SearchBackend,
    index: &str,
    events: &[EventDocument],
) -> Result<usize> {
    for (id, event) in events.iter().enumerate() {
        if let Some(location) = &event.location {
            location.validate().map_err(|e| match e {
                Error::Validation(reason) => {
                    Error::validation(format!("event {} ({}): {}", id, event.name, reason))
                }
                other => other,
            })?;
        }
    }

    for (id, event) in events.iter().enumerate() {
        let doc = serde_json::to_value(event)?;
        backend.put_document(index, &id.to_string(), &doc).await?;
        tracing::debug!(id, name = %event.name, "Stored event");
    }
    backend.refresh(index).await?;
    tracing::info!("Stored {} events in {}", events.len(), index);
    Ok(events.len())
}

/// Geocode the address of every stored document and write `location` back.
///
/// Ids are walked in `0..count`, matching what [`store_events`] writes.
/// Failures are collected in the report; no document ever gets a default
/// coordinate.
pub async fn geocode_events(
    backend: &dyn SearchBackend,
    geocoder: &dyn Geocoder,
    index: &str,
    concurrency: usize,
) -> Result<GeocodeReport> {
    let total = backend.count(index).await?;
    tracing::info!(
        "Geocoding {} documents in {} via {}",
        total,
        index,
        geocoder.provider_name()
    );

    let outcomes: Vec<(String, Result<bool>)> = stream::iter(0..total)
        .map(|id| async move {
            let id = id.to_string();
            let outcome = geocode_one(backend, geocoder, index, &id).await;
            (id, outcome)
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut report = GeocodeReport::default();
    for (id, outcome) in outcomes {
        match outcome {
            Ok(true) => report.updated += 1,
            Ok(false) => report.skipped.push(id),
            // Losing the backend aborts the pass
            Err(e @ Error::BackendUnavailable(_)) => return Err(e),
            Err(e) => {
                tracing::warn!("Could not geocode document {}: {}", id, e);
                report.failed.push((id, e.to_string()));
            }
        }
    }
    report.skipped.sort();
    report.failed.sort();

    backend.refresh(index).await?;
    tracing::info!(
        "Geocoded {} documents ({} skipped, {} failed)",
        report.updated,
        report.skipped.len(),
        report.failed.len()
    );
    Ok(report)
}

/// Ok(false) when the document has no address
async fn geocode_one(
    backend: &dyn SearchBackend,
    geocoder: &dyn Geocoder,
    index: &str,
    id: &str,
) -> Result<bool> {
    let source = backend.get_document(index, id).await?;
    let address = source
        .get(EventField::Address.as_str())
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or_default();
    if address.is_empty() {
        return Ok(false);
    }

    let point = geocoder.geocode(address).await?;
    let mut partial = Map::new();
    partial.insert(EventField::Location.as_str().to_string(), json!(point));
    let partial = Value::Object(partial);
    backend.update_document(index, id, &partial).await?;
    Ok(true)
}
