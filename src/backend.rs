use crate::context::CallContext;
use crate::error::BackendFailure;
use crate::key::DocumentKey;
use crate::types::{Document, Query};
use async_trait::async_trait;

pub type BackendResult<T> = std::result::Result<T, BackendFailure>;

/// Operations against one search cluster.
///
/// Implementations classify every response as success, [`BackendFailure::NotFound`]
/// or [`BackendFailure::Other`]; callers depend on nothing finer than that.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    async fn index_exists(&self, ctx: &CallContext, index_name: &str) -> BackendResult<bool>;

    async fn create_index(
        &self,
        ctx: &CallContext,
        index_name: &str,
        config: &serde_json::Value,
    ) -> BackendResult<()>;

    async fn index_document(
        &self,
        ctx: &CallContext,
        index_name: &str,
        key: &DocumentKey,
        body: &serde_json::Value,
        refresh: bool,
    ) -> BackendResult<()>;

    async fn get_document(
        &self,
        ctx: &CallContext,
        index_name: &str,
        key: &DocumentKey,
    ) -> BackendResult<Document>;

    async fn delete_document(
        &self,
        ctx: &CallContext,
        index_name: &str,
        key: &DocumentKey,
    ) -> BackendResult<()>;

    async fn delete_index(&self, ctx: &CallContext, index_name: &str) -> BackendResult<()>;

    /// Full-text search filtered to `instance_id`, in the cluster's ranking order.
    async fn search(
        &self,
        ctx: &CallContext,
        instance_id: &str,
        query: &Query,
    ) -> BackendResult<Vec<Document>>;
}
