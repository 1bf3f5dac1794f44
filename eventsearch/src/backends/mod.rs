pub mod elasticsearch;
pub mod response;
pub mod r#trait;

pub use elasticsearch::{Credentials, ElasticsearchClient};
pub use r#trait::SearchBackend;
pub use response::{Hit, SearchResponse, Suggestion};
