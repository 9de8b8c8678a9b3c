//! Primary/secondary replication over OpenSearch clusters.

pub mod client;
pub mod config;
pub mod engine;
pub mod types;

pub use client::OpenSearchClient;
pub use config::{ClusterConfig, EndpointConfig};
pub use engine::{documents_match, ReplicatedEngine};
pub use types::ClusterTarget;
