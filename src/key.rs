use crate::error::Result;
use crate::types::require_identifiers;
use std::fmt;

/// Joins the three identifiers of a [`DocumentKey`].
pub const KEY_SEPARATOR: char = '-';

/// Storage-level primary key of a document on every cluster.
///
/// Components containing [`KEY_SEPARATOR`] can make two distinct triples
/// derive the same key; callers own that constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentKey(String);

impl DocumentKey {
    /// Derive the key for `(instance_id, entity_name, entity_id)`.
    ///
    /// Empty components are rejected with `MissingField` since they would
    /// yield ambiguous keys such as `inst--42`.
    pub fn derive(instance_id: &str, entity_name: &str, entity_id: &str) -> Result<Self> {
        require_identifiers(instance_id, entity_name, entity_id)?;
        Ok(DocumentKey(format!(
            "{instance_id}{KEY_SEPARATOR}{entity_name}{KEY_SEPARATOR}{entity_id}"
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DualSearchError;

    #[test]
    fn test_derive_layout() {
        let key = DocumentKey::derive("instance-id", "person", "person-id-1").unwrap();
        assert_eq!(key.as_str(), "instance-id-person-person-id-1");
    }

    #[test]
    fn test_derive_is_deterministic() {
        let triples = [("a", "b", "c"), ("tenant", "company", "42"), ("x", "y", "z9")];
        for (i, e, id) in triples {
            assert_eq!(
                DocumentKey::derive(i, e, id).unwrap(),
                DocumentKey::derive(i, e, id).unwrap()
            );
        }
    }

    #[test]
    fn test_distinct_triples_distinct_keys() {
        let a = DocumentKey::derive("t1", "person", "1").unwrap();
        let b = DocumentKey::derive("t2", "person", "1").unwrap();
        let c = DocumentKey::derive("t1", "company", "1").unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_derive_rejects_empty_components() {
        assert_eq!(
            DocumentKey::derive("t", "person", "").unwrap_err(),
            DualSearchError::MissingField("entity_id".into())
        );
        assert_eq!(
            DocumentKey::derive("", "person", "1").unwrap_err(),
            DualSearchError::MissingField("instance_id".into())
        );
        assert_eq!(
            DocumentKey::derive("t", "", "1").unwrap_err(),
            DualSearchError::MissingField("entity_name".into())
        );
    }
}
