use dualsearch::{ClusterRole, Document};
use serde::{Deserialize, Serialize};

/// Which clusters an engine writes to. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClusterTarget {
    Primary,
    PrimaryAndSecondary,
}

impl ClusterTarget {
    /// Roles in the order every fan-out visits them.
    pub fn roles(&self) -> &'static [ClusterRole] {
        match self {
            ClusterTarget::Primary => &[ClusterRole::Primary],
            ClusterTarget::PrimaryAndSecondary => &[ClusterRole::Primary, ClusterRole::Secondary],
        }
    }
}

/// `GET /{index}/_doc/{id}` response body.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GetDocumentResponse {
    #[serde(rename = "_source")]
    pub source: Document,
}

/// `POST /_search` response body, reduced to the hits.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchResponse {
    pub hits: SearchHits,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchHits {
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SearchHit {
    #[serde(rename = "_source", default)]
    pub source: Document,
}
