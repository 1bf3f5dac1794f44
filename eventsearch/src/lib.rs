pub mod backends;
pub mod config;
pub mod document;
pub mod error;
pub mod geocode;
pub mod ingest;
pub mod provision;
pub mod query;
pub mod schema;
pub mod search;

pub use config::Config;
pub use document::{EventDocument, GeoPoint};
pub use error::{Error, Result};
pub use query::{CompiledQuery, QueryComposer, SearchIntent};
pub use schema::{build_index_config, FieldContract, IndexConfig};
