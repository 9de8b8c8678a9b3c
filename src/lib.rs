//! Document indexing over one or two search clusters.
//!
//! Every write goes to a primary cluster and, when configured, to a
//! secondary one. Reads fetch from both and refuse to answer when the copies
//! disagree. The replicated engine itself lives in `dualsearch-replication`;
//! this crate holds the data model, the capability traits and the
//! cross-cutting pieces they share.
//!
//! ```
//! use dualsearch::{Document, DocumentKey};
//!
//! let key = DocumentKey::derive("tenant-1", "person", "42").unwrap();
//! assert_eq!(key.as_str(), "tenant-1-person-42");
//!
//! let doc = Document::new()
//!     .with_field("name", "Jane Doe")
//!     .with_metadata("tenant-1", "person", "42")
//!     .unwrap();
//! assert_eq!(doc.get_text("instance_id"), Some("tenant-1"));
//! ```

pub mod backend;
pub mod context;
pub mod engine;
pub mod error;
pub mod key;
pub mod logging;
pub mod memory;
pub mod types;

pub use backend::{Backend, BackendResult};
pub use context::CallContext;
pub use engine::SearchEngine;
pub use error::{BackendFailure, ClusterRole, DualSearchError, Result};
pub use key::{DocumentKey, KEY_SEPARATOR};
pub use logging::LoggingEngine;
pub use memory::MemoryBackend;
pub use types::{
    Document, FieldValue, IndexOptions, Query, ENTITY_NAME_FIELD, ID_FIELD, INSTANCE_ID_FIELD,
};
