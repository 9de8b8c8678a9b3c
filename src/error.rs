use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Which configured cluster an operation was talking to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterRole {
    Primary,
    Secondary,
}

impl ClusterRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterRole::Primary => "primary",
            ClusterRole::Secondary => "secondary",
        }
    }
}

impl fmt::Display for ClusterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} client", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DualSearchError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Documents mismatch for id {0:?}")]
    DocumentMismatch(String),

    #[error("{cluster}: {message}")]
    Backend {
        cluster: ClusterRole,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,
}

pub type Result<T> = std::result::Result<T, DualSearchError>;

impl From<serde_json::Error> for DualSearchError {
    fn from(e: serde_json::Error) -> Self {
        DualSearchError::Json(e.to_string())
    }
}

impl DualSearchError {
    pub fn backend(cluster: ClusterRole, message: impl Into<String>) -> Self {
        DualSearchError::Backend {
            cluster,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            DualSearchError::MissingField(_) => StatusCode::BAD_REQUEST,
            DualSearchError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
            DualSearchError::DocumentMismatch(_) => StatusCode::CONFLICT,
            DualSearchError::Backend { .. } => StatusCode::BAD_GATEWAY,
            DualSearchError::Json(_) => StatusCode::BAD_REQUEST,
            DualSearchError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            DualSearchError::Cancelled => StatusCode::REQUEST_TIMEOUT,
            DualSearchError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// The cluster that produced this error, if it came from a backend call.
    pub fn cluster(&self) -> Option<ClusterRole> {
        match self {
            DualSearchError::Backend { cluster, .. } => Some(*cluster),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DualSearchError::DocumentNotFound(_))
    }

    pub fn is_mismatch(&self) -> bool {
        matches!(self, DualSearchError::DocumentMismatch(_))
    }
}

/// Outcome classification for a single cluster call. Success is the `Ok` side.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendFailure {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Other(String),
}

impl BackendFailure {
    pub fn other(message: impl Into<String>) -> Self {
        BackendFailure::Other(message.into())
    }

    /// Tag this failure with the cluster that produced it.
    pub fn into_error(self, cluster: ClusterRole) -> DualSearchError {
        DualSearchError::backend(cluster, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_names_cluster() {
        let err = DualSearchError::backend(ClusterRole::Secondary, "request failed: 500");
        assert_eq!(err.to_string(), "secondary client: request failed: 500");
        assert_eq!(err.cluster(), Some(ClusterRole::Secondary));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_backend_failure_tagging() {
        let err = BackendFailure::NotFound.into_error(ClusterRole::Primary);
        assert_eq!(err.to_string(), "primary client: not found");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            DualSearchError::MissingField("entityID".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            DualSearchError::DocumentNotFound("k".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            DualSearchError::DocumentMismatch("k".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(DualSearchError::DeadlineExceeded.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_json_error_conversion() {
        let err: DualSearchError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, DualSearchError::Json(_)));
    }
}
