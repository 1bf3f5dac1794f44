//! Text analysis settings sent with index creation

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const STOP_FILTER: &str = "english_stop";
pub const STEMMER_FILTER: &str = "english_stemmer";
pub const POSSESSIVE_FILTER: &str = "english_possessive_stemmer";
pub const SYNONYM_FILTER: &str = "synonym";
pub const EXACT_NORMALIZER: &str = "lowercase_exact";

/// User-facing analyzer configuration (`[analysis]` in the config file)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// Name the custom analyzer is registered under
    #[serde(default = "default_analyzer")]
    pub analyzer: String,
    /// WordNet synonyms file, resolved by the backend node and sent as
    /// written. The synonym filter is only emitted when this is set.
    #[serde(default)]
    pub synonyms_path: Option<String>,
    #[serde(default = "default_true")]
    pub strip_html: bool,
    #[serde(default = "default_true")]
    pub fold_ascii: bool,
}

fn default_analyzer() -> String {
    "english_synonym".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            analyzer: default_analyzer(),
            synonyms_path: None,
            strip_html: true,
            fold_ascii: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Analysis {
    pub filter: BTreeMap<String, TokenFilter>,
    pub analyzer: BTreeMap<String, CustomAnalyzer>,
    pub normalizer: BTreeMap<String, CustomNormalizer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TokenFilter {
    Stop { stopwords: String },
    Stemmer { language: String },
    Synonym { format: String, synonyms_path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CustomAnalyzer {
    #[serde(rename = "type")]
    pub kind: String,
    pub tokenizer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub char_filter: Vec<String>,
    pub filter: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CustomNormalizer {
    #[serde(rename = "type")]
    pub kind: String,
    pub filter: Vec<String>,
}

impl Analysis {
    /// English stemming, possessives, stop words and optional synonyms.
    /// Filter order matters: synonyms see raw tokens, stemming runs last.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let mut filter = BTreeMap::new();
        filter.insert(
            STOP_FILTER.to_string(),
            TokenFilter::Stop {
                stopwords: "_english_".to_string(),
            },
        );
        filter.insert(
            STEMMER_FILTER.to_string(),
            TokenFilter::Stemmer {
                language: "english".to_string(),
            },
        );
        filter.insert(
            POSSESSIVE_FILTER.to_string(),
            TokenFilter::Stemmer {
                language: "possessive_english".to_string(),
            },
        );

        let mut chain = Vec::new();
        if let Some(path) = &config.synonyms_path {
            filter.insert(
                SYNONYM_FILTER.to_string(),
                TokenFilter::Synonym {
                    format: "wordnet".to_string(),
                    synonyms_path: path.clone(),
                },
            );
            chain.push(SYNONYM_FILTER.to_string());
        }
        if config.fold_ascii {
            chain.push("asciifolding".to_string());
        }
        chain.extend(
            [POSSESSIVE_FILTER, "lowercase", STOP_FILTER, STEMMER_FILTER]
                .iter()
                .map(|s| s.to_string()),
        );

        let char_filter = if config.strip_html {
            vec!["html_strip".to_string()]
        } else {
            Vec::new()
        };

        let mut analyzer = BTreeMap::new();
        analyzer.insert(
            config.analyzer.clone(),
            CustomAnalyzer {
                kind: "custom".to_string(),
                tokenizer: "standard".to_string(),
                char_filter,
                filter: chain,
            },
        );

        let mut normalizer = BTreeMap::new();
        normalizer.insert(
            EXACT_NORMALIZER.to_string(),
            CustomNormalizer {
                kind: "custom".to_string(),
                filter: vec!["lowercase".to_string(), "asciifolding".to_string()],
            },
        );

        Self {
            filter,
            analyzer,
            normalizer,
        }
    }
}
