//! Search intent modeling and request composition

pub mod composer;
pub mod dsl;
pub mod intent;
pub mod suggest;

pub use composer::{CompiledQuery, QueryComposer, RelevanceConfig};
pub use dsl::{Query, SearchRequest};
pub use intent::{CostRange, Distance, DistanceUnit, Fuzziness, GeoFilter, SearchIntent};
pub use suggest::{AutocompleteBuilder, AutocompleteConfig, SuggestRequest, SUGGESTER_NAME};
