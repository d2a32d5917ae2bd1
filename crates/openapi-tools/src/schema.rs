//! `OpenAPI` schema to JSON Schema conversion for tool listings.
//!
//! Works on the serialized JSON form of a schema: local `$ref`s are inlined, `nullable` becomes a
//! `"null"` type alternative, and `OpenAPI`-only keywords are dropped. Recursive refs stop at the
//! first repeat with an open object schema. This is a presentation step, not a validator.

use crate::resolver::RefResolver;
use serde::Serialize;
use serde_json::{Map, Value, json};

const OPENAPI_ONLY_KEYWORDS: &[&str] = &[
    "nullable",
    "discriminator",
    "xml",
    "externalDocs",
    "example",
    "deprecated",
];

const SCHEMA_MAP_KEYWORDS: &[&str] = &["properties", "patternProperties"];
const SCHEMA_LIST_KEYWORDS: &[&str] = &["allOf", "oneOf", "anyOf"];
const SCHEMA_KEYWORDS: &[&str] = &["items", "additionalProperties", "not"];

/// Convert any serializable `OpenAPI` schema (or `ReferenceOr` of one) to JSON Schema.
///
/// Values that fail to serialize map to the empty (accept-anything) schema.
#[must_use]
pub fn to_json_schema<S: Serialize>(schema: &S, resolver: &RefResolver) -> Value {
    match serde_json::to_value(schema) {
        Ok(value) => convert(&value, resolver, &mut Vec::new()),
        Err(e) => {
            tracing::debug!(error = %e, "schema is not serializable; using an open schema");
            json!({})
        }
    }
}

/// Object schema with non-empty `properties`, as `(properties, required)`.
#[must_use]
pub fn object_properties(schema: &Value) -> Option<(&Map<String, Value>, Vec<&str>)> {
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return None;
    }
    let properties = schema.get("properties")?.as_object()?;
    if properties.is_empty() {
        return None;
    }
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    Some((properties, required))
}

fn convert(value: &Value, resolver: &RefResolver, stack: &mut Vec<String>) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };

    if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
        return inline_ref(reference, resolver, stack);
    }

    let mut out = Map::with_capacity(map.len());
    for (key, child) in map {
        let k = key.as_str();
        if OPENAPI_ONLY_KEYWORDS.contains(&k) || k.starts_with("x-") {
            continue;
        }

        let converted = if SCHEMA_MAP_KEYWORDS.contains(&k) {
            match child {
                Value::Object(props) => Value::Object(
                    props
                        .iter()
                        .map(|(name, s)| (name.clone(), convert(s, resolver, stack)))
                        .collect(),
                ),
                other => other.clone(),
            }
        } else if SCHEMA_LIST_KEYWORDS.contains(&k) {
            match child {
                Value::Array(items) => Value::Array(
                    items
                        .iter()
                        .map(|s| convert(s, resolver, stack))
                        .collect(),
                ),
                other => other.clone(),
            }
        } else if SCHEMA_KEYWORDS.contains(&k) {
            convert(child, resolver, stack)
        } else {
            child.clone()
        };
        out.insert(key.clone(), converted);
    }

    if map.get("nullable") == Some(&Value::Bool(true))
        && let Some(Value::String(ty)) = out.get("type").cloned()
    {
        out.insert("type".to_string(), json!([ty, "null"]));
    }

    Value::Object(out)
}

fn inline_ref(reference: &str, resolver: &RefResolver, stack: &mut Vec<String>) -> Value {
    if stack.iter().any(|r| r == reference) {
        return json!({ "type": "object" });
    }

    match resolver.lookup(reference) {
        Ok(target) => {
            stack.push(reference.to_string());
            let inlined = convert(target, resolver, stack);
            stack.pop();
            inlined
        }
        Err(e) => {
            tracing::debug!(reference, error = %e, "leaving unresolvable schema open");
            json!({})
        }
    }
}
