use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::analysis::{Analysis, AnalysisConfig, EXACT_NORMALIZER};
use super::fields::{FieldContract, FieldKind, FieldSpec, SubField};

/// Index creation payload: analysis settings plus field mappings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IndexConfig {
    pub settings: IndexSettings,
    pub mappings: Mappings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct IndexSettings {
    pub analysis: Analysis,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Mappings {
    #[serde(default)]
    pub properties: BTreeMap<String, FieldMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingType {
    Keyword,
    Text,
    Long,
    GeoPoint,
    Completion,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FieldMapping {
    #[serde(rename = "type")]
    pub field_type: MappingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalizer: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldMapping>,
}

impl FieldMapping {
    fn of(field_type: MappingType) -> Self {
        Self {
            field_type,
            analyzer: None,
            normalizer: None,
            fields: BTreeMap::new(),
        }
    }
}

impl IndexConfig {
    /// Analyzer registered for analyzed text fields
    pub fn analyzer_name(&self) -> Option<&str> {
        self.settings.analysis.analyzer.keys().next().map(String::as_str)
    }
}

/// Build the index payload from the field contract.
///
/// Pure and deterministic: the result depends only on the contract's
/// contents and the analysis config, never on insertion order.
pub fn build_index_config(contract: &FieldContract, analysis: &AnalysisConfig) -> IndexConfig {
    let properties = contract
        .iter()
        .map(|spec| (spec.field.as_str().to_string(), field_mapping(spec, analysis)))
        .collect();

    IndexConfig {
        settings: IndexSettings {
            analysis: Analysis::from_config(analysis),
        },
        mappings: Mappings { properties },
    }
}

fn field_mapping(spec: &FieldSpec, analysis: &AnalysisConfig) -> FieldMapping {
    let mut mapping = match spec.kind {
        FieldKind::Keyword => FieldMapping::of(MappingType::Keyword),
        FieldKind::Text => FieldMapping {
            analyzer: Some(analysis.analyzer.clone()),
            ..FieldMapping::of(MappingType::Text)
        },
        FieldKind::Integer => FieldMapping::of(MappingType::Long),
        FieldKind::GeoPoint => FieldMapping::of(MappingType::GeoPoint),
    };

    for sub in &spec.sub_fields {
        let sub_mapping = match sub {
            SubField::Exact => FieldMapping {
                normalizer: Some(EXACT_NORMALIZER.to_string()),
                ..FieldMapping::of(MappingType::Keyword)
            },
            SubField::Completion => FieldMapping::of(MappingType::Completion),
        };
        mapping.fields.insert(sub.as_str().to_string(), sub_mapping);
    }

    mapping
}
