#![allow(dead_code)]

use dualsearch::{Document, MemoryBackend};
use dualsearch_replication::ReplicatedEngine;
use std::sync::Arc;

pub const INDEX: &str = "neodxp-test";

/// Two in-memory clusters and an engine replicating across them.
/// The backend handles stay available for direct inspection.
pub struct Clusters {
    pub primary: Arc<MemoryBackend>,
    pub secondary: Arc<MemoryBackend>,
    pub engine: ReplicatedEngine,
}

pub fn clusters() -> Clusters {
    let primary = Arc::new(MemoryBackend::new("primary"));
    let secondary = Arc::new(MemoryBackend::new("secondary"));
    let engine = ReplicatedEngine::with_secondary(primary.clone(), secondary.clone());
    Clusters {
        primary,
        secondary,
        engine,
    }
}

pub fn primary_only() -> (Arc<MemoryBackend>, ReplicatedEngine) {
    let primary = Arc::new(MemoryBackend::new("primary"));
    let engine = ReplicatedEngine::new(primary.clone());
    (primary, engine)
}

pub fn person(name: &str) -> Document {
    Document::from_json(&serde_json::json!({
        "entity_type": "person",
        "name": name,
        "assigned_sales_rep": "eyan@test.com",
        "field_1_string": "random text",
        "field_2_int": 42,
        "field_3_boolean": true,
        "tags": ["lead", "vip"],
        "custom_fields": {"region": "emea"}
    }))
    .unwrap()
}
