//! Compiles a [`SearchIntent`] into a single backend search request.
//!
//! Inclusion constraints (tags, cost, geo) become filter clauses that never
//! affect ranking. Keywords become one relevance clause. When both exist the
//! filters sit inside the same bool query as the relevance clause; when only
//! filters exist they are wrapped in `constant_score`.

use serde::{Deserialize, Serialize};

use super::dsl::{BoolQuery, MultiMatchQuery, MultiMatchType, Query, RangeParams, SearchRequest};
use super::intent::{CostRange, Fuzziness, GeoFilter, SearchIntent};
use crate::error::{Error, Result};
use crate::schema::{EventField, SubField};

/// Field weighting for the keyword clause (`[relevance]` in the config file)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RelevanceConfig {
    #[serde(default = "default_boost")]
    pub name_boost: f32,
    #[serde(default = "default_boost")]
    pub tags_boost: f32,
    /// Description is only searched when a boost is set
    #[serde(default)]
    pub description_boost: Option<f32>,
    #[serde(default)]
    pub fuzziness: Fuzziness,
    #[serde(default = "default_size")]
    pub default_size: usize,
}

fn default_boost() -> f32 {
    1.0
}

fn default_size() -> usize {
    10
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            name_boost: default_boost(),
            tags_boost: default_boost(),
            description_boost: None,
            fuzziness: Fuzziness::default(),
            default_size: default_size(),
        }
    }
}

impl RelevanceConfig {
    pub fn validate(&self) -> Result<()> {
        let boosts = [
            ("name_boost", Some(self.name_boost)),
            ("tags_boost", Some(self.tags_boost)),
            ("description_boost", self.description_boost),
        ];
        for (name, boost) in boosts {
            if let Some(b) = boost {
                if !b.is_finite() || b <= 0.0 {
                    return Err(Error::Config(format!("{} must be positive, got {}", name, b)));
                }
            }
        }
        Ok(())
    }
}

/// A compiled search request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CompiledQuery {
    request: SearchRequest,
}

impl CompiledQuery {
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    pub fn query(&self) -> &Query {
        &self.request.query
    }

    pub fn to_json(&self) -> serde_json::Value {
        // SearchRequest holds only strings, numbers and maps keyed by strings
        serde_json::to_value(&self.request).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone)]
pub struct QueryComposer {
    relevance: RelevanceConfig,
}

impl Default for QueryComposer {
    fn default() -> Self {
        Self {
            relevance: RelevanceConfig::default(),
        }
    }
}

impl QueryComposer {
    pub fn new(relevance: RelevanceConfig) -> Result<Self> {
        relevance.validate()?;
        Ok(Self { relevance })
    }

    pub fn relevance(&self) -> &RelevanceConfig {
        &self.relevance
    }

    /// Compile an intent. Any invalid part fails the whole compile.
    pub fn compile(&self, intent: &SearchIntent) -> Result<CompiledQuery> {
        let filters = self.filter_clauses(intent)?;
        let relevance = intent
            .effective_keywords()
            .map(|keywords| self.relevance_clause(keywords, intent.fuzziness));

        let query = match (relevance, filters.is_empty()) {
            (Some(relevance), true) => relevance,
            (Some(relevance), false) => Query::Bool(BoolQuery {
                must: vec![relevance],
                filter: filters,
                ..Default::default()
            }),
            (None, false) => Query::constant_score(Self::combine_filters(filters)),
            (None, true) => Query::match_all(),
        };

        let request = SearchRequest {
            query,
            from: intent.from,
            size: Some(intent.size.unwrap_or(self.relevance.default_size)),
        };
        tracing::debug!(
            query = %serde_json::to_string(&request).unwrap_or_default(),
            "Compiled search intent"
        );
        Ok(CompiledQuery { request })
    }

    fn filter_clauses(&self, intent: &SearchIntent) -> Result<Vec<Query>> {
        let mut filters = Vec::new();

        if !intent.tags.is_empty() {
            if intent.tags.iter().any(|t| t.trim().is_empty()) {
                return Err(Error::validation("tags must not be blank"));
            }
            // BTreeSet iteration is sorted, so tag order never leaks into the request
            let tags = intent.tags.iter().cloned().collect();
            filters.push(Query::terms(EventField::Tags.sub_path(SubField::Exact), tags));
        }

        if let Some(cost) = &intent.cost {
            if let Some(range) = Self::cost_clause(cost)? {
                filters.push(range);
            }
        }

        if let Some(geo) = &intent.geo {
            filters.push(Self::geo_clause(geo)?);
        }

        Ok(filters)
    }

    fn cost_clause(cost: &CostRange) -> Result<Option<Query>> {
        cost.validate()?;
        if cost.is_unbounded() {
            return Ok(None);
        }
        let params = RangeParams {
            gte: cost.min,
            lt: cost.max,
            ..Default::default()
        };
        Ok(Some(Query::range(EventField::Cost.as_str(), params)))
    }

    fn geo_clause(geo: &GeoFilter) -> Result<Query> {
        geo.validate()?;
        Ok(Query::geo_distance(
            EventField::Location.as_str(),
            geo.center,
            geo.radius.to_string(),
        ))
    }

    fn relevance_clause(&self, keywords: &str, fuzziness: Fuzziness) -> Query {
        let mut fields = vec![
            weighted(EventField::Name, self.relevance.name_boost),
            weighted(EventField::Tags, self.relevance.tags_boost),
        ];
        if let Some(boost) = self.relevance.description_boost {
            fields.push(weighted(EventField::Description, boost));
        }

        Query::MultiMatch(MultiMatchQuery {
            query: keywords.to_string(),
            fields,
            match_type: MultiMatchType::BestFields,
            fuzziness: match fuzziness {
                Fuzziness::Auto => Some("AUTO".to_string()),
                Fuzziness::Off => None,
            },
        })
    }

    /// Single filter stays bare, several are AND-ed in a bool filter
    fn combine_filters(mut filters: Vec<Query>) -> Query {
        if filters.len() == 1 {
            filters.remove(0)
        } else {
            Query::Bool(BoolQuery {
                filter: filters,
                ..Default::default()
            })
        }
    }
}

fn weighted(field: EventField, boost: f32) -> String {
    if (boost - 1.0).abs() < f32::EPSILON {
        field.as_str().to_string()
    } else {
        format!("{}^{}", field.as_str(), boost)
    }
}
