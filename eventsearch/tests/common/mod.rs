//! Shared test doubles: an in-memory search backend and a table-driven geocoder.

#![allow(dead_code)]

use async_trait::async_trait;
use eventsearch::backends::response::{Hits, TotalHits};
use eventsearch::backends::{Hit, SearchBackend, SearchResponse, Suggestion};
use eventsearch::geocode::Geocoder;
use eventsearch::query::dsl::{Query, RangeParams};
use eventsearch::query::{Distance, DistanceUnit, SuggestRequest};
use eventsearch::{CompiledQuery, Error, GeoPoint, IndexConfig, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Default)]
struct StoredIndex {
    config: Option<IndexConfig>,
    docs: BTreeMap<String, Value>,
}

/// Keeps indexes and documents in memory and evaluates the filter part of
/// compiled queries so tests can check which documents a request admits.
#[derive(Default)]
pub struct InMemoryBackend {
    indexes: Mutex<BTreeMap<String, StoredIndex>>,
    suggestions: Mutex<Vec<Suggestion>>,
    pub create_calls: Mutex<usize>,
    pub delete_calls: Mutex<usize>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(self, index: &str) -> Self {
        self.indexes
            .lock()
            .unwrap()
            .insert(index.to_string(), StoredIndex::default());
        self
    }

    pub fn with_suggestions(self, suggestions: Vec<Suggestion>) -> Self {
        *self.suggestions.lock().unwrap() = suggestions;
        self
    }

    pub fn insert(&self, index: &str, id: &str, doc: Value) {
        self.indexes
            .lock()
            .unwrap()
            .entry(index.to_string())
            .or_default()
            .docs
            .insert(id.to_string(), doc);
    }

    pub fn doc(&self, index: &str, id: &str) -> Option<Value> {
        self.indexes
            .lock()
            .unwrap()
            .get(index)
            .and_then(|i| i.docs.get(id).cloned())
    }

    pub fn doc_count(&self, index: &str) -> usize {
        self.indexes
            .lock()
            .unwrap()
            .get(index)
            .map(|i| i.docs.len())
            .unwrap_or(0)
    }

    pub fn config(&self, index: &str) -> Option<IndexConfig> {
        self.indexes
            .lock()
            .unwrap()
            .get(index)
            .and_then(|i| i.config.clone())
    }

    /// Ids of stored documents admitted by `query`, in id order
    pub fn matching_ids(&self, index: &str, query: &Query) -> Vec<String> {
        self.indexes
            .lock()
            .unwrap()
            .get(index)
            .map(|i| {
                i.docs
                    .iter()
                    .filter(|(_, doc)| matches(query, doc))
                    .map(|(id, _)| id.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn missing_index(index: &str) -> Error {
    Error::NotFound(format!("index {}", index))
}

#[async_trait]
impl SearchBackend for InMemoryBackend {
    async fn index_exists(&self, index: &str) -> Result<bool> {
        Ok(self.indexes.lock().unwrap().contains_key(index))
    }

    async fn create_index(&self, index: &str, config: &IndexConfig) -> Result<()> {
        *self.create_calls.lock().unwrap() += 1;
        let mut indexes = self.indexes.lock().unwrap();
        if indexes.contains_key(index) {
            return Err(Error::IndexAlreadyExists(index.to_string()));
        }
        indexes.insert(
            index.to_string(),
            StoredIndex {
                config: Some(config.clone()),
                docs: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        *self.delete_calls.lock().unwrap() += 1;
        self.indexes
            .lock()
            .unwrap()
            .remove(index)
            .map(|_| ())
            .ok_or_else(|| missing_index(index))
    }

    async fn refresh(&self, index: &str) -> Result<()> {
        if self.indexes.lock().unwrap().contains_key(index) {
            Ok(())
        } else {
            Err(missing_index(index))
        }
    }

    async fn put_document(&self, index: &str, id: &str, doc: &Value) -> Result<()> {
        self.insert(index, id, doc.clone());
        Ok(())
    }

    async fn update_document(&self, index: &str, id: &str, partial: &Value) -> Result<()> {
        let mut indexes = self.indexes.lock().unwrap();
        let doc = indexes
            .get_mut(index)
            .and_then(|i| i.docs.get_mut(id))
            .ok_or_else(|| Error::NotFound(format!("document {}/{}", index, id)))?;
        if let (Some(target), Some(fields)) = (doc.as_object_mut(), partial.as_object()) {
            for (k, v) in fields {
                target.insert(k.clone(), v.clone());
            }
        }
        Ok(())
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Value> {
        self.doc(index, id)
            .ok_or_else(|| Error::NotFound(format!("document {}/{}", index, id)))
    }

    async fn count(&self, index: &str) -> Result<u64> {
        let indexes = self.indexes.lock().unwrap();
        let stored = indexes.get(index).ok_or_else(|| missing_index(index))?;
        Ok(stored.docs.len() as u64)
    }

    async fn search(&self, index: &str, query: &CompiledQuery) -> Result<SearchResponse> {
        if !self.index_exists(index).await? {
            return Err(missing_index(index));
        }
        let hits: Vec<Hit> = self
            .matching_ids(index, query.query())
            .into_iter()
            .filter_map(|id| {
                self.doc(index, &id).map(|source| Hit {
                    index: Some(index.to_string()),
                    id,
                    score: Some(1.0),
                    source,
                    extra: Default::default(),
                })
            })
            .collect();
        Ok(SearchResponse {
            took: Some(0),
            timed_out: false,
            hits: Hits {
                total: Some(TotalHits::Object {
                    value: hits.len() as u64,
                    relation: "eq".to_string(),
                }),
                max_score: Some(1.0),
                hits,
            },
            extra: Default::default(),
        })
    }

    async fn suggest(&self, _index: &str, request: &SuggestRequest) -> Result<Vec<Suggestion>> {
        let prefix = request.prefix().unwrap_or_default().to_lowercase();
        Ok(self
            .suggestions
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.text.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect())
    }

    async fn analyze(&self, _index: Option<&str>, _analyzer: &str, text: &str) -> Result<Vec<String>> {
        Ok(text.split_whitespace().map(str::to_lowercase).collect())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

/// Resolves addresses from a fixed table; anything else fails
#[derive(Default)]
pub struct TableGeocoder {
    table: HashMap<String, GeoPoint>,
    pub calls: Mutex<Vec<String>>,
}

impl TableGeocoder {
    pub fn new<'a>(entries: impl IntoIterator<Item = (&'a str, f64, f64)>) -> Self {
        Self {
            table: entries
                .into_iter()
                .map(|(addr, lat, lon)| (addr.to_string(), GeoPoint { lat, lon }))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Geocoder for TableGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint> {
        self.calls.lock().unwrap().push(address.to_string());
        self.table
            .get(address)
            .copied()
            .ok_or_else(|| Error::GeocodeFailure(format!("no results for '{}'", address)))
    }

    fn provider_name(&self) -> &str {
        "table"
    }
}

/// Filter semantics of the query subset the composer emits.
/// Keyword clauses admit a document when any query word appears in any field.
pub fn matches(query: &Query, doc: &Value) -> bool {
    match query {
        Query::MatchAll(_) => true,
        Query::Terms(fields) => fields.iter().all(|(field, wanted)| {
            let values = string_values(doc, base_field(field));
            wanted
                .iter()
                .any(|w| values.iter().any(|v| v.to_lowercase() == w.to_lowercase()))
        }),
        Query::Range(fields) => fields.iter().all(|(field, params)| {
            doc.get(base_field(field))
                .and_then(Value::as_i64)
                .map(|v| in_range(v, params))
                .unwrap_or(false)
        }),
        Query::GeoDistance(geo) => {
            let Ok(radius) = geo.distance.parse::<Distance>() else {
                return false;
            };
            geo.points.iter().all(|(field, center)| {
                doc.get(base_field(field))
                    .and_then(|v| serde_json::from_value::<GeoPoint>(v.clone()).ok())
                    .map(|p| haversine_m(center, &p) <= to_meters(&radius))
                    .unwrap_or(false)
            })
        }
        Query::MultiMatch(mm) => {
            let words: Vec<String> = mm.query.split_whitespace().map(str::to_lowercase).collect();
            mm.fields.iter().any(|field| {
                let field = field.split('^').next().unwrap_or(field);
                string_values(doc, base_field(field)).iter().any(|v| {
                    let v = v.to_lowercase();
                    words.iter().any(|w| v.contains(w.as_str()))
                })
            })
        }
        Query::Bool(b) => {
            b.must.iter().all(|q| matches(q, doc))
                && b.filter.iter().all(|q| matches(q, doc))
                && !b.must_not.iter().any(|q| matches(q, doc))
                && (b.should.is_empty() || b.should.iter().any(|q| matches(q, doc)))
        }
        Query::ConstantScore(cs) => matches(&cs.filter, doc),
    }
}

fn base_field(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

fn string_values(doc: &Value, field: &str) -> Vec<String> {
    match doc.get(field) {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn in_range(v: i64, p: &RangeParams) -> bool {
    p.gte.map_or(true, |b| v >= b)
        && p.gt.map_or(true, |b| v > b)
        && p.lte.map_or(true, |b| v <= b)
        && p.lt.map_or(true, |b| v < b)
}

fn to_meters(d: &Distance) -> f64 {
    let factor = match d.unit {
        DistanceUnit::Miles => 1609.344,
        DistanceUnit::Kilometers => 1000.0,
        DistanceUnit::Meters => 1.0,
        DistanceUnit::Yards => 0.9144,
        DistanceUnit::Feet => 0.3048,
    };
    d.value * factor
}

fn haversine_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_008.8;
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}
