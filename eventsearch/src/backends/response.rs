//! Backend response bodies, deserialized as-is

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::document::EventDocument;
use crate::error::Result;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: Option<u64>,
    #[serde(default)]
    pub timed_out: bool,
    pub hits: Hits,
    /// `_shards`, `aggregations` and anything else the backend sends
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Hits {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub max_score: Option<f32>,
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// `total` is a bare number on old servers and an object on 7.x+
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object { value: u64, relation: String },
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            Self::Count(n) => *n,
            Self::Object { value, .. } => *value,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Hit {
    #[serde(rename = "_index", default)]
    pub index: Option<String>,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f32>,
    #[serde(rename = "_source", default)]
    pub source: Value,
    /// `sort`, `highlight`, `_routing` and so on
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Hit {
    pub fn event(&self) -> Result<EventDocument> {
        Ok(serde_json::from_value(self.source.clone())?)
    }
}

impl SearchResponse {
    pub fn total(&self) -> u64 {
        self.hits
            .total
            .as_ref()
            .map(TotalHits::value)
            .unwrap_or(self.hits.hits.len() as u64)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SuggestResponse {
    #[serde(default)]
    pub suggest: BTreeMap<String, Vec<SuggestEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestEntry {
    pub text: String,
    #[serde(default)]
    pub options: Vec<Suggestion>,
}

/// One completion option, in backend order
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Suggestion {
    pub text: String,
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(rename = "_score", default)]
    pub score: Option<f32>,
    #[serde(rename = "_source", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
}

impl SuggestResponse {
    pub fn into_suggestions(mut self, suggester: &str) -> Vec<Suggestion> {
        self.suggest
            .remove(suggester)
            .unwrap_or_default()
            .into_iter()
            .flat_map(|entry| entry.options)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub tokens: Vec<AnalyzeToken>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeToken {
    pub token: String,
    #[serde(default)]
    pub start_offset: usize,
    #[serde(default)]
    pub end_offset: usize,
    #[serde(default)]
    pub position: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GetResponse {
    #[serde(default)]
    pub found: bool,
    #[serde(rename = "_source", default)]
    pub source: Option<Value>,
}

/// Elasticsearch-style error envelope
#[derive(Debug, Deserialize)]
pub struct EsErrorResponse {
    pub error: EsErrorBody,
    #[serde(default)]
    pub status: Option<u16>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EsErrorBody {
    Detail {
        #[serde(rename = "type")]
        error_type: String,
        reason: String,
    },
    Message(String),
}

impl EsErrorBody {
    pub fn into_parts(self) -> (Option<String>, String) {
        match self {
            Self::Detail { error_type, reason } => (Some(error_type), reason),
            Self::Message(reason) => (None, reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_search_response() {
        let body = json!({
            "took": 3,
            "timed_out": false,
            "hits": {
                "total": {"value": 2, "relation": "eq"},
                "max_score": 1.2,
                "hits": [
                    {"_index": "event_test", "_id": "7", "_score": 1.2,
                     "_source": {"name": "Cheaper Than Therapy", "tags": ["Comedy"], "cost": -1}},
                    {"_index": "event_test", "_id": "0", "_score": 0.4,
                     "_source": {"name": "Secret Improv Society", "cost": 19}}
                ]
            }
        });
        let response: SearchResponse = serde_json::from_value(body).unwrap();
        assert_eq!(response.total(), 2);
        assert_eq!(response.hits.hits[0].id, "7");
        assert_eq!(response.hits.hits[1].event().unwrap().cost, 19);
    }

    #[test]
    fn test_unmodeled_fields_are_kept() {
        let body = json!({
            "took": 1,
            "timed_out": false,
            "_shards": {"total": 1, "successful": 1, "skipped": 0, "failed": 0},
            "hits": {
                "total": {"value": 1, "relation": "eq"},
                "hits": [{
                    "_index": "event_test", "_id": "3", "_score": null,
                    "_source": {"name": "Jazz Brunch"},
                    "sort": [19],
                    "highlight": {"name": ["<em>Jazz</em> Brunch"]}
                }]
            }
        });
        let response: SearchResponse = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(response.extra["_shards"]["successful"], 1);
        let hit = &response.hits.hits[0];
        assert_eq!(hit.extra["sort"], json!([19]));
        assert_eq!(hit.extra["highlight"]["name"][0], "<em>Jazz</em> Brunch");

        let reserialized = serde_json::to_value(&response).unwrap();
        assert_eq!(reserialized["_shards"], body["_shards"]);
        assert_eq!(reserialized["hits"]["hits"][0]["highlight"], body["hits"]["hits"][0]["highlight"]);
    }

    #[test]
    fn test_legacy_total() {
        let response: SearchResponse =
            serde_json::from_value(json!({"hits": {"total": 5, "hits": []}})).unwrap();
        assert_eq!(response.total(), 5);
    }

    #[test]
    fn test_suggestions_keep_backend_order() {
        let body = json!({
            "suggest": {
                "event-suggest": [{
                    "text": "jaz",
                    "offset": 0,
                    "length": 3,
                    "options": [
                        {"text": "Jazz Brunch", "_id": "4", "_score": 2.0},
                        {"text": "Jazz at Pearl's", "_id": "1", "_score": 1.0}
                    ]
                }]
            }
        });
        let response: SuggestResponse = serde_json::from_value(body).unwrap();
        let suggestions = response.into_suggestions("event-suggest");
        let texts: Vec<_> = suggestions.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Jazz Brunch", "Jazz at Pearl's"]);
    }

    #[test]
    fn test_error_envelope() {
        let body = json!({
            "error": {
                "root_cause": [],
                "type": "resource_already_exists_exception",
                "reason": "index [event_test/abc] already exists"
            },
            "status": 400
        });
        let err: EsErrorResponse = serde_json::from_value(body).unwrap();
        let (kind, reason) = err.error.into_parts();
        assert_eq!(kind.as_deref(), Some("resource_already_exists_exception"));
        assert!(reason.contains("already exists"));
    }
}
