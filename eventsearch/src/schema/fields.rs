//! Logical event fields and their storage kinds.
//!
//! Every other module addresses the index through [`EventField`] and
//! [`SubField`]; field names as string literals live only here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Logical fields of a persisted event record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventField {
    Name,
    Tags,
    Cost,
    Location,
    Address,
    Date,
    Time,
    Link,
    ImageUrl,
    Description,
    Venue,
}

impl EventField {
    pub const ALL: [EventField; 11] = [
        EventField::Name,
        EventField::Tags,
        EventField::Cost,
        EventField::Location,
        EventField::Address,
        EventField::Date,
        EventField::Time,
        EventField::Link,
        EventField::ImageUrl,
        EventField::Description,
        EventField::Venue,
    ];

    /// Name of the field in the index and in stored documents
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Tags => "tags",
            Self::Cost => "cost",
            Self::Location => "location",
            Self::Address => "address",
            Self::Date => "date",
            Self::Time => "time",
            Self::Link => "link",
            Self::ImageUrl => "image_url",
            Self::Description => "description",
            Self::Venue => "venue",
        }
    }

    /// Dotted path to a sub-field, e.g. `name.completion`
    pub fn sub_path(self, sub: SubField) -> String {
        format!("{}.{}", self.as_str(), sub.as_str())
    }
}

impl fmt::Display for EventField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the backend stores and analyzes a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Exact-match, not analyzed
    Keyword,
    /// Analyzed with the configured analyzer
    Text,
    Integer,
    GeoPoint,
}

/// Secondary index structures hanging off a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubField {
    /// Keyword copy (lowercase-normalized on tags)
    Exact,
    /// Prefix completion structure
    Completion,
}

impl SubField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Completion => "completion",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field: EventField,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_fields: Vec<SubField>,
}

impl FieldSpec {
    pub fn new(field: EventField, kind: FieldKind) -> Self {
        Self {
            field,
            kind,
            sub_fields: Vec::new(),
        }
    }

    pub fn with_sub_field(mut self, sub: SubField) -> Self {
        if !self.sub_fields.contains(&sub) {
            self.sub_fields.push(sub);
        }
        self
    }
}

/// Mapping from logical field to storage kind.
///
/// Keyed by [`EventField`], so iteration order never depends on the order in
/// which specs were added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContract {
    fields: BTreeMap<EventField, FieldSpec>,
}

impl FieldContract {
    /// Build a contract from specs. A later spec for the same field replaces
    /// an earlier one.
    pub fn from_specs(specs: impl IntoIterator<Item = FieldSpec>) -> Self {
        let fields = specs.into_iter().map(|s| (s.field, s)).collect();
        Self { fields }
    }

    /// The event index contract
    pub fn events() -> Self {
        Self::from_specs([
            FieldSpec::new(EventField::Name, FieldKind::Text)
                .with_sub_field(SubField::Exact)
                .with_sub_field(SubField::Completion),
            FieldSpec::new(EventField::Tags, FieldKind::Text).with_sub_field(SubField::Exact),
            FieldSpec::new(EventField::Cost, FieldKind::Integer),
            FieldSpec::new(EventField::Location, FieldKind::GeoPoint),
            FieldSpec::new(EventField::Address, FieldKind::Keyword),
            FieldSpec::new(EventField::Date, FieldKind::Keyword),
            FieldSpec::new(EventField::Time, FieldKind::Keyword),
            FieldSpec::new(EventField::Link, FieldKind::Keyword),
            FieldSpec::new(EventField::ImageUrl, FieldKind::Keyword),
            FieldSpec::new(EventField::Description, FieldKind::Text),
            FieldSpec::new(EventField::Venue, FieldKind::Keyword),
        ])
    }

    /// Process-wide read-only contract
    pub fn global() -> &'static FieldContract {
        static CONTRACT: OnceLock<FieldContract> = OnceLock::new();
        CONTRACT.get_or_init(FieldContract::events)
    }

    pub fn get(&self, field: EventField) -> Option<&FieldSpec> {
        self.fields.get(&field)
    }

    pub fn kind(&self, field: EventField) -> Option<FieldKind> {
        self.get(field).map(|s| s.kind)
    }

    pub fn has_sub_field(&self, field: EventField, sub: SubField) -> bool {
        self.get(field)
            .map(|s| s.sub_fields.contains(&sub))
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_contract_covers_every_field() {
        let contract = FieldContract::events();
        assert_eq!(contract.len(), EventField::ALL.len());
        for field in EventField::ALL {
            assert!(contract.get(field).is_some(), "missing {}", field);
        }
    }

    #[test]
    fn test_kinds() {
        let contract = FieldContract::events();
        assert_eq!(contract.kind(EventField::Name), Some(FieldKind::Text));
        assert_eq!(contract.kind(EventField::Tags), Some(FieldKind::Text));
        assert_eq!(contract.kind(EventField::Cost), Some(FieldKind::Integer));
        assert_eq!(contract.kind(EventField::Location), Some(FieldKind::GeoPoint));
        assert_eq!(contract.kind(EventField::Venue), Some(FieldKind::Keyword));
    }

    #[test]
    fn test_sub_paths() {
        assert_eq!(EventField::Name.sub_path(SubField::Completion), "name.completion");
        assert_eq!(EventField::Tags.sub_path(SubField::Exact), "tags.exact");
        assert_eq!(EventField::ImageUrl.as_str(), "image_url");
    }

    #[test]
    fn test_later_spec_replaces_earlier() {
        let contract = FieldContract::from_specs([
            FieldSpec::new(EventField::Venue, FieldKind::Keyword),
            FieldSpec::new(EventField::Venue, FieldKind::Text),
        ]);
        assert_eq!(contract.len(), 1);
        assert_eq!(contract.kind(EventField::Venue), Some(FieldKind::Text));
    }

    #[test]
    fn test_global_is_events() {
        assert_eq!(FieldContract::global(), &FieldContract::events());
    }
}
