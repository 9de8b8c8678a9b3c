use crate::context::CallContext;
use crate::error::Result;
use crate::types::{Document, IndexOptions, Query};
use async_trait::async_trait;

/// The capability set exposed to callers (CLI, service handlers).
///
/// Implemented by the replicated engine and by decorators wrapping it, so
/// cross-cutting layers compose without changing behavior.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Create `index_name` with `config` on every cluster where it is missing.
    async fn create_index(
        &self,
        ctx: &CallContext,
        index_name: &str,
        config: &serde_json::Value,
    ) -> Result<()>;

    /// Remove `index_name` from every cluster.
    async fn delete_index(&self, ctx: &CallContext, index_name: &str) -> Result<()>;

    /// Add or replace a document, stamping it with its identifiers.
    async fn put_document(
        &self,
        ctx: &CallContext,
        instance_id: &str,
        index_name: &str,
        entity_name: &str,
        entity_id: &str,
        document: &Document,
        options: IndexOptions,
    ) -> Result<()>;

    async fn delete_document(
        &self,
        ctx: &CallContext,
        instance_id: &str,
        index_name: &str,
        entity_name: &str,
        entity_id: &str,
    ) -> Result<()>;

    /// Fetch a single document. Fails rather than returning a document the
    /// configured clusters disagree on.
    async fn find_document(
        &self,
        ctx: &CallContext,
        instance_id: &str,
        index_name: &str,
        entity_name: &str,
        entity_id: &str,
    ) -> Result<Document>;

    /// Run `query` restricted to documents of `instance_id`.
    async fn search(&self, ctx: &CallContext, instance_id: &str, query: &Query)
        -> Result<Vec<Document>>;
}
