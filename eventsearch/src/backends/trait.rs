use async_trait::async_trait;
use serde_json::Value;

use super::response::{SearchResponse, Suggestion};
use crate::query::{CompiledQuery, SuggestRequest};
use crate::schema::IndexConfig;
use crate::Result;

/// Document-search service the crate talks to.
///
/// Passed explicitly to every operation that needs it, so callers can hand
/// in a test double or share one client across tasks.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn index_exists(&self, index: &str) -> Result<bool>;

    /// Fails with `IndexAlreadyExists` when the index is present
    async fn create_index(&self, index: &str, config: &IndexConfig) -> Result<()>;

    /// Fails with `NotFound` when the index is absent
    async fn delete_index(&self, index: &str) -> Result<()>;

    /// Make recent writes visible to search and count
    async fn refresh(&self, index: &str) -> Result<()>;

    /// Insert or replace a document
    async fn put_document(&self, index: &str, id: &str, doc: &Value) -> Result<()>;

    /// Merge `partial` into an existing document
    async fn update_document(&self, index: &str, id: &str, partial: &Value) -> Result<()>;

    async fn get_document(&self, index: &str, id: &str) -> Result<Value>;

    async fn count(&self, index: &str) -> Result<u64>;

    async fn search(&self, index: &str, query: &CompiledQuery) -> Result<SearchResponse>;

    async fn suggest(&self, index: &str, request: &SuggestRequest) -> Result<Vec<Suggestion>>;

    /// Tokens produced by `analyzer` for `text`. Diagnostics only.
    async fn analyze(&self, index: Option<&str>, analyzer: &str, text: &str) -> Result<Vec<String>>;

    fn backend_name(&self) -> &str;
}
