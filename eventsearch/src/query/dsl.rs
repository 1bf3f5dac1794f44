//! Elasticsearch Query DSL types
//!
//! These types represent the subset of the Query DSL the composer emits.
//! Field-keyed maps are ordered so serialization is stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::document::GeoPoint;

/// Root search request body
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SearchRequest {
    pub query: Query,

    /// Starting offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<usize>,

    /// Maximum number of results
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    /// Match all documents
    MatchAll(MatchAllQuery),

    /// Analyzed match across several fields
    MultiMatch(MultiMatchQuery),

    /// Any of several exact values
    Terms(BTreeMap<String, Vec<String>>),

    /// Numeric bounds
    Range(BTreeMap<String, RangeParams>),

    /// Circle around a point
    GeoDistance(GeoDistanceQuery),

    /// Bool query (must, should, must_not, filter)
    Bool(BoolQuery),

    /// Filter whose matches all score the same
    ConstantScore(ConstantScoreQuery),
}

impl Query {
    pub fn match_all() -> Self {
        Query::MatchAll(MatchAllQuery::default())
    }

    pub fn terms(field: impl Into<String>, values: Vec<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(field.into(), values);
        Query::Terms(map)
    }

    pub fn range(field: impl Into<String>, params: RangeParams) -> Self {
        let mut map = BTreeMap::new();
        map.insert(field.into(), params);
        Query::Range(map)
    }

    pub fn geo_distance(field: impl Into<String>, point: GeoPoint, distance: String) -> Self {
        let mut points = BTreeMap::new();
        points.insert(field.into(), point);
        Query::GeoDistance(GeoDistanceQuery { distance, points })
    }

    pub fn constant_score(filter: Query) -> Self {
        Query::ConstantScore(ConstantScoreQuery {
            filter: Box::new(filter),
            boost: None,
        })
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Query::MatchAll(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MatchAllQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiMatchType {
    #[default]
    BestFields,
    MostFields,
    CrossFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MultiMatchQuery {
    pub query: String,
    pub fields: Vec<String>,
    #[serde(default, rename = "type")]
    pub match_type: MultiMatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuzziness: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RangeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<i64>,
}

/// `{"distance": "6mi", "<field>": {"lat": .., "lon": ..}}`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GeoDistanceQuery {
    pub distance: String,
    #[serde(flatten)]
    pub points: BTreeMap<String, GeoPoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct BoolQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Query>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Query>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<Query>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Query>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ConstantScoreQuery {
    pub filter: Box<Query>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}
