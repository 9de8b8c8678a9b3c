use serde_json::{json, Value};
use std::path::Path;

/// Index settings and mappings used when `create-index` gets no `--config`.
///
/// Custom fields are typed by name suffix, e.g. `field_3_int` or
/// `field_1_string_list`.
pub fn default_index_config() -> Value {
    json!({
        "settings": {
            "index": {
                "number_of_shards": 1,
                "number_of_replicas": 1
            }
        },
        "mappings": {
            "dynamic_templates": [
                {"boolean_fields": {"match": "field_*_boolean", "mapping": {"type": "boolean"}}},
                {"int_fields": {"match": "field_*_int", "mapping": {"type": "integer"}}},
                {"string_fields": {"match": "field_*_string", "mapping": {"type": "text"}}},
                {"date_fields": {"match": "field_*_datetime", "mapping": {"type": "date"}}},
                {"string_list_fields": {"match": "field_*_string_list", "mapping": {"type": "keyword"}}}
            ],
            "properties": {
                "id": {"type": "keyword"},
                "instance_id": {"type": "keyword"},
                "entity_name": {"type": "keyword"},
                "name": {"type": "text"},
                "assigned_sales_rep": {"type": "keyword"},
                "created_at": {"type": "date"},
                "updated_at": {"type": "date"},
                "custom_fields": {"type": "object", "dynamic": true}
            }
        }
    })
}

pub fn load_index_config(path: Option<&Path>) -> Result<Value, String> {
    let Some(path) = path else {
        return Ok(default_index_config());
    };
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let config: Value = serde_json::from_str(&content)
        .map_err(|e| format!("failed to parse {}: {}", path.display(), e))?;
    if !config.is_object() {
        return Err(format!("{} must hold a JSON object", path.display()));
    }
    Ok(config)
}
