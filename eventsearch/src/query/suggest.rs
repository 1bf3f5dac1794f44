//! Prefix completion requests against the event name

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::schema::{EventField, SubField};

/// Name of the suggester inside the request and response
pub const SUGGESTER_NAME: &str = "event-suggest";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AutocompleteConfig {
    #[serde(default = "default_size")]
    pub size: usize,
    #[serde(default = "default_true")]
    pub skip_duplicates: bool,
}

fn default_size() -> usize {
    5
}

fn default_true() -> bool {
    true
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            skip_duplicates: true,
        }
    }
}

/// `{"suggest": {"event-suggest": {"prefix": .., "completion": {..}}}}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SuggestRequest {
    pub suggest: BTreeMap<String, Suggester>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Suggester {
    pub prefix: String,
    pub completion: CompletionParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompletionParams {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(default)]
    pub skip_duplicates: bool,
}

impl SuggestRequest {
    pub fn prefix(&self) -> Option<&str> {
        self.suggest.get(SUGGESTER_NAME).map(|s| s.prefix.as_str())
    }

    pub fn field(&self) -> Option<&str> {
        self.suggest
            .get(SUGGESTER_NAME)
            .map(|s| s.completion.field.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AutocompleteBuilder {
    config: AutocompleteConfig,
}

impl AutocompleteBuilder {
    pub fn new(config: AutocompleteConfig) -> Self {
        Self { config }
    }

    /// Build a completion request for partial user input.
    ///
    /// Blank input is rejected: it would ask for arbitrary suggestions.
    pub fn build(&self, input: &str) -> Result<SuggestRequest> {
        if input.trim().is_empty() {
            return Err(Error::validation("autocomplete prefix must not be empty"));
        }
        if self.config.size == 0 {
            return Err(Error::validation("autocomplete size must be at least 1"));
        }

        let mut suggest = BTreeMap::new();
        suggest.insert(
            SUGGESTER_NAME.to_string(),
            Suggester {
                prefix: input.to_string(),
                completion: CompletionParams {
                    field: EventField::Name.sub_path(SubField::Completion),
                    size: Some(self.config.size),
                    skip_duplicates: self.config.skip_duplicates,
                },
            },
        );
        Ok(SuggestRequest { suggest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_prefix_rejected() {
        let builder = AutocompleteBuilder::default();
        assert!(builder.build("").unwrap_err().is_validation());
        assert!(builder.build("  \t").unwrap_err().is_validation());
    }

    #[test]
    fn test_prefix_request_on_name() {
        let request = AutocompleteBuilder::default().build("jaz").unwrap();
        assert_eq!(request.prefix(), Some("jaz"));
        assert_eq!(request.field(), Some("name.completion"));
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "suggest": {
                    "event-suggest": {
                        "prefix": "jaz",
                        "completion": {
                            "field": "name.completion",
                            "size": 5,
                            "skip_duplicates": true
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_zero_size_rejected() {
        let builder = AutocompleteBuilder::new(AutocompleteConfig {
            size: 0,
            skip_duplicates: false,
        });
        assert!(builder.build("jaz").is_err());
    }
}
