//! In-process [`Backend`] used for tests and dry runs.
//!
//! Mimics the parts of cluster behavior the engine relies on: writes
//! auto-create missing indices, reads of unknown keys are not-found, and
//! search is filtered by the `instance_id` term.

use crate::backend::{Backend, BackendResult};
use crate::context::CallContext;
use crate::error::BackendFailure;
use crate::key::DocumentKey;
use crate::types::{Document, FieldValue, Query, INSTANCE_ID_FIELD};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

pub struct MemoryBackend {
    name: String,
    /// index name -> document key -> document
    indices: DashMap<String, DashMap<String, Document>>,
    /// Number of upcoming calls that fail with an injected error.
    pending_faults: AtomicUsize,
    calls: AtomicU64,
}

impl MemoryBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            indices: DashMap::new(),
            pending_faults: AtomicUsize::new(0),
            calls: AtomicU64::new(0),
        }
    }

    /// Make the next `count` calls fail with [`BackendFailure::Other`].
    pub fn fail_next(&self, count: usize) {
        self.pending_faults.store(count, Ordering::SeqCst);
    }

    /// Total calls received, including failed ones.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn has_index(&self, index_name: &str) -> bool {
        self.indices.contains_key(index_name)
    }

    pub fn document_count(&self, index_name: &str) -> usize {
        self.indices
            .get(index_name)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    /// Store a document as-is, bypassing metadata stamping and fault injection.
    pub fn put_raw(&self, index_name: &str, key: &DocumentKey, document: Document) {
        self.indices
            .entry(index_name.to_string())
            .or_default()
            .insert(key.as_str().to_string(), document);
    }

    /// Read a stored document directly, bypassing fault injection.
    pub fn get_raw(&self, index_name: &str, key: &DocumentKey) -> Option<Document> {
        self.indices
            .get(index_name)
            .and_then(|docs| docs.get(key.as_str()).map(|d| d.value().clone()))
    }

    fn begin_call(&self) -> BackendResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let faulted = self
            .pending_faults
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if faulted {
            tracing::debug!(backend = %self.name, "injected failure");
            return Err(BackendFailure::other(format!(
                "request failed: {} unavailable",
                self.name
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn index_exists(&self, _ctx: &CallContext, index_name: &str) -> BackendResult<bool> {
        self.begin_call()?;
        Ok(self.indices.contains_key(index_name))
    }

    async fn create_index(
        &self,
        _ctx: &CallContext,
        index_name: &str,
        _config: &serde_json::Value,
    ) -> BackendResult<()> {
        self.begin_call()?;
        if self.indices.contains_key(index_name) {
            return Err(BackendFailure::other(format!(
                "resource_already_exists_exception: index [{}]",
                index_name
            )));
        }
        self.indices.insert(index_name.to_string(), DashMap::new());
        Ok(())
    }

    async fn index_document(
        &self,
        _ctx: &CallContext,
        index_name: &str,
        key: &DocumentKey,
        body: &serde_json::Value,
        _refresh: bool,
    ) -> BackendResult<()> {
        self.begin_call()?;
        let document = Document::from_json(body).map_err(|e| BackendFailure::other(e.to_string()))?;
        self.put_raw(index_name, key, document);
        Ok(())
    }

    async fn get_document(
        &self,
        _ctx: &CallContext,
        index_name: &str,
        key: &DocumentKey,
    ) -> BackendResult<Document> {
        self.begin_call()?;
        self.get_raw(index_name, key).ok_or(BackendFailure::NotFound)
    }

    async fn delete_document(
        &self,
        _ctx: &CallContext,
        index_name: &str,
        key: &DocumentKey,
    ) -> BackendResult<()> {
        self.begin_call()?;
        let docs = self.indices.get(index_name).ok_or(BackendFailure::NotFound)?;
        docs.remove(key.as_str())
            .map(|_| ())
            .ok_or(BackendFailure::NotFound)
    }

    async fn delete_index(&self, _ctx: &CallContext, index_name: &str) -> BackendResult<()> {
        self.begin_call()?;
        self.indices
            .remove(index_name)
            .map(|_| ())
            .ok_or(BackendFailure::NotFound)
    }

    async fn search(
        &self,
        _ctx: &CallContext,
        instance_id: &str,
        query: &Query,
    ) -> BackendResult<Vec<Document>> {
        self.begin_call()?;
        let terms = tokenize(&query.value);

        let mut hits: Vec<(usize, String, Document)> = Vec::new();
        for index in self.indices.iter() {
            for entry in index.value().iter() {
                let doc = entry.value();
                if doc.get_text(INSTANCE_ID_FIELD) != Some(instance_id) {
                    continue;
                }
                let score = score_document(doc, &terms);
                if terms.is_empty() || score > 0 {
                    hits.push((score, entry.key().clone(), doc.clone()));
                }
            }
        }

        hits.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        Ok(hits.into_iter().map(|(_, _, doc)| doc).collect())
    }
}

/// Lowercased alphanumeric terms. `*` alone matches everything.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn score_document(doc: &Document, terms: &[String]) -> usize {
    let mut tokens = Vec::new();
    for (_, value) in doc.iter() {
        collect_text(value, &mut tokens);
    }
    terms
        .iter()
        .map(|term| tokens.iter().filter(|t| *t == term).count())
        .sum()
}

fn collect_text(value: &FieldValue, out: &mut Vec<String>) {
    match value {
        FieldValue::Text(s) => out.extend(tokenize(s)),
        FieldValue::Array(items) => items.iter().for_each(|v| collect_text(v, out)),
        FieldValue::Object(map) => map.values().for_each(|v| collect_text(v, out)),
        _ => {}
    }
}
