use crate::context::CallContext;
use crate::engine::SearchEngine;
use crate::error::Result;
use crate::types::{Document, IndexOptions, Query};
use async_trait::async_trait;
use std::time::Instant;

/// Wraps any [`SearchEngine`] and emits one structured event per call.
///
/// Arguments and results pass through untouched.
pub struct LoggingEngine<E> {
    inner: E,
    component: &'static str,
}

impl<E: SearchEngine> LoggingEngine<E> {
    pub fn new(inner: E) -> Self {
        Self::with_component(inner, "opensearch")
    }

    /// `component` is attached to every event as the `search` field.
    pub fn with_component(inner: E, component: &'static str) -> Self {
        Self { inner, component }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

fn took_ms(begin: Instant) -> f64 {
    begin.elapsed().as_secs_f64() * 1000.0
}

macro_rules! log_outcome {
    ($self:ident, $result:expr, $begin:expr, $method:literal $(, $field:ident = $value:expr)*) => {{
        let took_ms = took_ms($begin);
        match &$result {
            Ok(_) => tracing::info!(
                search = $self.component,
                method = $method,
                $($field = $value,)*
                took_ms,
                "search engine call"
            ),
            Err(e) => tracing::warn!(
                search = $self.component,
                method = $method,
                $($field = $value,)*
                took_ms,
                err = %e,
                "search engine call failed"
            ),
        }
        $result
    }};
}

#[async_trait]
impl<E: SearchEngine> SearchEngine for LoggingEngine<E> {
    async fn create_index(
        &self,
        ctx: &CallContext,
        index_name: &str,
        config: &serde_json::Value,
    ) -> Result<()> {
        let begin = Instant::now();
        let result = self.inner.create_index(ctx, index_name, config).await;
        log_outcome!(self, result, begin, "CreateIndex", index_name = index_name)
    }

    async fn delete_index(&self, ctx: &CallContext, index_name: &str) -> Result<()> {
        let begin = Instant::now();
        let result = self.inner.delete_index(ctx, index_name).await;
        log_outcome!(self, result, begin, "DeleteIndex", index_name = index_name)
    }

    async fn put_document(
        &self,
        ctx: &CallContext,
        instance_id: &str,
        index_name: &str,
        entity_name: &str,
        entity_id: &str,
        document: &Document,
        options: IndexOptions,
    ) -> Result<()> {
        let begin = Instant::now();
        let result = self
            .inner
            .put_document(ctx, instance_id, index_name, entity_name, entity_id, document, options)
            .await;
        log_outcome!(
            self,
            result,
            begin,
            "PutDocument",
            index_name = index_name,
            instance_id = instance_id,
            entity_name = entity_name,
            entity_id = entity_id,
            refresh = options.refresh
        )
    }

    async fn delete_document(
        &self,
        ctx: &CallContext,
        instance_id: &str,
        index_name: &str,
        entity_name: &str,
        entity_id: &str,
    ) -> Result<()> {
        let begin = Instant::now();
        let result = self
            .inner
            .delete_document(ctx, instance_id, index_name, entity_name, entity_id)
            .await;
        log_outcome!(
            self,
            result,
            begin,
            "DeleteDocument",
            index_name = index_name,
            instance_id = instance_id,
            entity_name = entity_name,
            entity_id = entity_id
        )
    }

    async fn find_document(
        &self,
        ctx: &CallContext,
        instance_id: &str,
        index_name: &str,
        entity_name: &str,
        entity_id: &str,
    ) -> Result<Document> {
        let begin = Instant::now();
        let result = self
            .inner
            .find_document(ctx, instance_id, index_name, entity_name, entity_id)
            .await;
        log_outcome!(
            self,
            result,
            begin,
            "FindDocument",
            index_name = index_name,
            instance_id = instance_id,
            entity_name = entity_name,
            entity_id = entity_id
        )
    }

    async fn search(
        &self,
        ctx: &CallContext,
        instance_id: &str,
        query: &Query,
    ) -> Result<Vec<Document>> {
        let begin = Instant::now();
        let result = self.inner.search(ctx, instance_id, query).await;
        let hits = result.as_ref().map(|docs| docs.len()).unwrap_or(0);
        log_outcome!(
            self,
            result,
            begin,
            "Search",
            instance_id = instance_id,
            query = query.value.as_str(),
            hits = hits
        )
    }
}
