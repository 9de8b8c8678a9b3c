use crate::error::{DualSearchError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

/// Reserved field holding the caller's entity id.
pub const ID_FIELD: &str = "id";
/// Reserved field holding the tenant id. Every search is filtered on it.
pub const INSTANCE_ID_FIELD: &str = "instance_id";
/// Reserved field holding the entity type name.
pub const ENTITY_NAME_FIELD: &str = "entity_name";

/// A flat bag of named fields representing one indexable entity.
///
/// Field order is irrelevant: two documents are equal when they hold the same
/// field names with equal [`FieldValue`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: HashMap<String, FieldValue>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a [`Document`] from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`DualSearchError::Json`] if the value is not a JSON object.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let obj = json
            .as_object()
            .ok_or_else(|| DualSearchError::Json("Expected JSON object".to_string()))?;

        Ok(obj
            .iter()
            .map(|(key, val)| (key.clone(), json_value_to_field_value(val)))
            .collect())
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, field_value) in &self.fields {
            map.insert(key.clone(), field_value_to_json_value(field_value));
        }
        serde_json::Value::Object(map)
    }

    /// Set a field, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.fields.insert(key.into(), value.into())
    }

    /// Builder-style [`Document::insert`].
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Return a copy of this document stamped with the three reserved metadata
    /// fields. Caller values already stored under those names are overwritten.
    ///
    /// The copy holds every value in its stored form (see
    /// [`FieldValue::stored`]), so it equals what a later read returns. The
    /// receiver is left untouched, so a failed call never leaves a partially
    /// stamped document behind.
    ///
    /// # Errors
    ///
    /// Returns [`DualSearchError::MissingField`] naming the first empty
    /// identifier (checked in the order entity id, instance id, entity name),
    /// and [`DualSearchError::Json`] if a field holds a NaN or infinite float.
    pub fn with_metadata(
        &self,
        instance_id: &str,
        entity_name: &str,
        entity_id: &str,
    ) -> Result<Document> {
        require_identifiers(instance_id, entity_name, entity_id)?;

        if let Some((name, _)) = self.fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(DualSearchError::Json(format!(
                "field {:?} holds a non-finite number",
                name
            )));
        }

        let mut stamped: Document = self
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), value.stored()))
            .collect();
        stamped.insert(ID_FIELD, entity_id);
        stamped.insert(INSTANCE_ID_FIELD, instance_id);
        stamped.insert(ENTITY_NAME_FIELD, entity_name);
        Ok(stamped)
    }
}

pub(crate) fn require_identifiers(instance_id: &str, entity_name: &str, entity_id: &str) -> Result<()> {
    if entity_id.is_empty() {
        return Err(DualSearchError::MissingField("entity_id".to_string()));
    }
    if instance_id.is_empty() {
        return Err(DualSearchError::MissingField("instance_id".to_string()));
    }
    if entity_name.is_empty() {
        return Err(DualSearchError::MissingField("entity_name".to_string()));
    }
    Ok(())
}

impl FromIterator<(String, FieldValue)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Document {
            fields: iter.into_iter().collect(),
        }
    }
}

impl From<HashMap<String, FieldValue>> for Document {
    fn from(fields: HashMap<String, FieldValue>) -> Self {
        Document { fields }
    }
}

impl IntoIterator for Document {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::hash_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(map
            .iter()
            .map(|(key, val)| (key.clone(), json_value_to_field_value(val)))
            .collect())
    }
}

/// A dynamically-typed field value stored in a [`Document`].
///
/// Equality is exact: `Integer(1)` and `Float(1.0)` are different values.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Clusters hold dates as RFC 3339 text, so a `Date` is written and read
    /// back as [`FieldValue::Text`]. Stamping applies that conversion up front.
    Date(DateTime<Utc>),
    Array(Vec<FieldValue>),
    Object(HashMap<String, FieldValue>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as a cluster returns it: dates become RFC 3339 text.
    pub fn stored(&self) -> FieldValue {
        match self {
            FieldValue::Date(d) => FieldValue::Text(format_date(d)),
            FieldValue::Array(items) => {
                FieldValue::Array(items.iter().map(FieldValue::stored).collect())
            }
            FieldValue::Object(map) => FieldValue::Object(
                map.iter().map(|(k, v)| (k.clone(), v.stored())).collect(),
            ),
            other => other.clone(),
        }
    }

    /// False when this value, or any nested one, is a NaN or infinite float.
    /// JSON has no encoding for those.
    pub fn is_finite(&self) -> bool {
        match self {
            FieldValue::Float(f) => f.is_finite(),
            FieldValue::Array(items) => items.iter().all(FieldValue::is_finite),
            FieldValue::Object(map) => map.values().all(FieldValue::is_finite),
            _ => true,
        }
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339()
}

/// Dates travel as RFC 3339 strings, so a stored `Date` reads back as `Text`.
pub fn json_value_to_field_value(val: &serde_json::Value) -> FieldValue {
    match val {
        serde_json::Value::Null => FieldValue::Null,
        serde_json::Value::Bool(b) => FieldValue::Bool(*b),
        serde_json::Value::String(s) => FieldValue::Text(s.clone()),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                FieldValue::Integer(i)
            } else {
                n.as_f64().map(FieldValue::Float).unwrap_or(FieldValue::Null)
            }
        }
        serde_json::Value::Array(arr) => {
            FieldValue::Array(arr.iter().map(json_value_to_field_value).collect())
        }
        serde_json::Value::Object(obj) => FieldValue::Object(
            obj.iter()
                .map(|(k, v)| (k.clone(), json_value_to_field_value(v)))
                .collect(),
        ),
    }
}

pub fn field_value_to_json_value(field_value: &FieldValue) -> serde_json::Value {
    match field_value {
        FieldValue::Null => serde_json::Value::Null,
        FieldValue::Bool(b) => serde_json::Value::Bool(*b),
        FieldValue::Integer(i) => serde_json::json!(i),
        FieldValue::Float(f) => serde_json::json!(f),
        FieldValue::Text(s) => serde_json::Value::String(s.clone()),
        FieldValue::Date(d) => serde_json::Value::String(format_date(d)),
        FieldValue::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(field_value_to_json_value).collect())
        }
        FieldValue::Object(obj) => {
            let mut map = serde_json::Map::new();
            for (k, v) in obj {
                map.insert(k.clone(), field_value_to_json_value(v));
            }
            serde_json::Value::Object(map)
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        field_value_to_json_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(json_value_to_field_value(&value))
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Integer(i)
    }
}

impl From<i32> for FieldValue {
    fn from(i: i32) -> Self {
        FieldValue::Integer(i64::from(i))
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(d: DateTime<Utc>) -> Self {
        FieldValue::Date(d)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(items: Vec<FieldValue>) -> Self {
        FieldValue::Array(items)
    }
}

/// A free-text search expression. Always scoped to one instance at search time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub value: String,
}

impl Query {
    pub fn new(value: impl Into<String>) -> Self {
        Query {
            value: value.into(),
        }
    }
}

/// Per-write options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Make the write visible to subsequent reads immediately. Default `false`.
    pub refresh: bool,
}

impl IndexOptions {
    pub fn refreshed() -> Self {
        IndexOptions { refresh: true }
    }
}
