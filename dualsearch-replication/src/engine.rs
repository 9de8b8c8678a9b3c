use super::client::OpenSearchClient;
use super::config::ClusterConfig;
use super::types::ClusterTarget;
use async_trait::async_trait;
use dualsearch::{
    Backend, BackendFailure, CallContext, ClusterRole, Document, DocumentKey, DualSearchError,
    IndexOptions, Query, Result, SearchEngine,
};
use std::sync::Arc;
use std::time::Duration;

/// Writes every operation to the primary cluster and, when configured, to the
/// secondary one; reads verify that both copies agree.
///
/// Fan-out is sequential and fail-fast: the primary step completes before the
/// secondary starts, and a primary failure leaves the secondary untouched.
/// A secondary failure after a successful primary step is reported as a
/// secondary-tagged error and leaves the clusters in split state. Nothing is
/// rolled back or retried.
pub struct ReplicatedEngine {
    primary: Arc<dyn Backend>,
    secondary: Option<Arc<dyn Backend>>,
}

impl ReplicatedEngine {
    pub fn new(primary: Arc<dyn Backend>) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn with_secondary(primary: Arc<dyn Backend>, secondary: Arc<dyn Backend>) -> Self {
        Self {
            primary,
            secondary: Some(secondary),
        }
    }

    /// Build HTTP clients for the configured clusters.
    pub fn from_config(config: &ClusterConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let primary: Arc<dyn Backend> =
            Arc::new(OpenSearchClient::new("primary", &config.primary.url, timeout)?);

        let engine = match &config.secondary {
            Some(secondary) => {
                let secondary: Arc<dyn Backend> =
                    Arc::new(OpenSearchClient::new("secondary", &secondary.url, timeout)?);
                Self::with_secondary(primary, secondary)
            }
            None => Self::new(primary),
        };

        tracing::info!(cluster_target = ?engine.target(), "replicated engine ready");
        Ok(engine)
    }

    pub fn target(&self) -> ClusterTarget {
        if self.secondary.is_some() {
            ClusterTarget::PrimaryAndSecondary
        } else {
            ClusterTarget::Primary
        }
    }

    fn backend(&self, role: ClusterRole) -> Option<&Arc<dyn Backend>> {
        match role {
            ClusterRole::Primary => Some(&self.primary),
            ClusterRole::Secondary => self.secondary.as_ref(),
        }
    }

    /// Configured clusters in fan-out order.
    fn clusters(&self) -> impl Iterator<Item = (ClusterRole, &Arc<dyn Backend>)> + '_ {
        self.target()
            .roles()
            .iter()
            .filter_map(move |&role| self.backend(role).map(|backend| (role, backend)))
    }

    async fn ensure_index(
        &self,
        ctx: &CallContext,
        role: ClusterRole,
        backend: &dyn Backend,
        index_name: &str,
        config: &serde_json::Value,
    ) -> Result<()> {
        let exists = backend.index_exists(ctx, index_name).await.map_err(|e| {
            fan_out_error(role, "create_index", format!("failed to check if index exists: {}", e))
        })?;
        if exists {
            tracing::debug!(%role, cluster = backend.name(), index_name, "index already exists");
            return Ok(());
        }

        checkpoint(ctx, role, "create_index")?;
        backend
            .create_index(ctx, index_name, config)
            .await
            .map_err(|e| fan_out_error(role, "create_index", format!("failed to create index: {}", e)))
    }
}

/// Report a failed fan-out step. A secondary failure means the primary step
/// already took effect.
fn fan_out_error(role: ClusterRole, op: &str, message: String) -> DualSearchError {
    if role == ClusterRole::Secondary {
        tracing::warn!(op, error = %message, "secondary failed after primary succeeded, clusters in split state");
    }
    DualSearchError::backend(role, message)
}

/// Context check ahead of a fan-out step. Past the primary step a cancelled or
/// expired context leaves the clusters split, so it is reported against the
/// secondary.
fn checkpoint(ctx: &CallContext, role: ClusterRole, op: &str) -> Result<()> {
    match role {
        ClusterRole::Primary => ctx.check(),
        ClusterRole::Secondary => ctx
            .check()
            .map_err(|e| fan_out_error(role, op, e.to_string())),
    }
}

#[async_trait]
impl SearchEngine for ReplicatedEngine {
    async fn create_index(
        &self,
        ctx: &CallContext,
        index_name: &str,
        config: &serde_json::Value,
    ) -> Result<()> {
        for (role, backend) in self.clusters() {
            checkpoint(ctx, role, "create_index")?;
            self.ensure_index(ctx, role, backend.as_ref(), index_name, config)
                .await?;
            tracing::debug!(%role, cluster = backend.name(), index_name, "index ensured");
        }
        Ok(())
    }

    async fn delete_index(&self, ctx: &CallContext, index_name: &str) -> Result<()> {
        for (role, backend) in self.clusters() {
            checkpoint(ctx, role, "delete_index")?;
            backend
                .delete_index(ctx, index_name)
                .await
                .map_err(|e| fan_out_error(role, "delete_index", e.to_string()))?;
            tracing::debug!(%role, cluster = backend.name(), index_name, "index deleted");
        }
        Ok(())
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
        let stamped = document.with_metadata(instance_id, entity_name, entity_id)?;
        let key = DocumentKey::derive(instance_id, entity_name, entity_id)?;
        // Serialized once so both clusters receive an identical body.
        let body = stamped.to_json();

        for (role, backend) in self.clusters() {
            checkpoint(ctx, role, "put_document")?;
            backend
                .index_document(ctx, index_name, &key, &body, options.refresh)
                .await
                .map_err(|e| fan_out_error(role, "put_document", e.to_string()))?;
            tracing::debug!(%role, cluster = backend.name(), index_name, %key, "document written");
        }
        Ok(())
    }

    async fn delete_document(
        &self,
        ctx: &CallContext,
        instance_id: &str,
        index_name: &str,
        entity_name: &str,
        entity_id: &str,
    ) -> Result<()> {
        let key = DocumentKey::derive(instance_id, entity_name, entity_id)?;

        for (role, backend) in self.clusters() {
            checkpoint(ctx, role, "delete_document")?;
            backend
                .delete_document(ctx, index_name, &key)
                .await
                .map_err(|e| fan_out_error(role, "delete_document", e.to_string()))?;
            tracing::debug!(%role, cluster = backend.name(), index_name, %key, "document deleted");
        }
        Ok(())
    }

    async fn find_document(
        &self,
        ctx: &CallContext,
        instance_id: &str,
        index_name: &str,
        entity_name: &str,
        entity_id: &str,
    ) -> Result<Document> {
        let key = DocumentKey::derive(instance_id, entity_name, entity_id)?;

        ctx.check()?;
        let primary_doc = match self.primary.get_document(ctx, index_name, &key).await {
            Ok(doc) => doc,
            Err(BackendFailure::NotFound) => {
                return Err(DualSearchError::DocumentNotFound(key.into_string()))
            }
            Err(e) => return Err(e.into_error(ClusterRole::Primary)),
        };

        let Some(secondary) = &self.secondary else {
            return Ok(primary_doc);
        };

        ctx.check()
            .map_err(|e| DualSearchError::backend(ClusterRole::Secondary, e.to_string()))?;
        let secondary_doc = match secondary.get_document(ctx, index_name, &key).await {
            Ok(doc) => doc,
            Err(BackendFailure::NotFound) => {
                tracing::warn!(cluster = secondary.name(), index_name, %key, "document missing on secondary");
                return Err(DualSearchError::DocumentMismatch(entity_id.to_string()));
            }
            Err(e) => return Err(e.into_error(ClusterRole::Secondary)),
        };

        if !documents_match(&primary_doc, &secondary_doc) {
            tracing::warn!(index_name, %key, "primary and secondary documents differ");
            return Err(DualSearchError::DocumentMismatch(entity_id.to_string()));
        }

        Ok(primary_doc)
    }

    async fn search(
        &self,
        ctx: &CallContext,
        instance_id: &str,
        query: &Query,
    ) -> Result<Vec<Document>> {
        if instance_id.is_empty() {
            return Err(DualSearchError::MissingField("instance_id".to_string()));
        }
        ctx.check()?;
        self.primary
            .search(ctx, instance_id, query)
            .await
            .map_err(|e| e.into_error(ClusterRole::Primary))
    }
}

/// Same field names, and every value equal under [`dualsearch::FieldValue`]'s
/// exact equality.
pub fn documents_match(a: &Document, b: &Document) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| other == value))
}
