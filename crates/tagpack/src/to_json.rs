//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! Meant for inspecting payloads. JSON has no binary type, so binary and
//! extension payloads render as base64 data URIs and do not convert back.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map as JsonMap, Number};

use crate::value::Value;

const BIN_URI_START: &str = "data:application/octet-stream;base64,";

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Nil,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    Value::Float64(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Map(
                obj.into_iter()
                    .map(|(k, v)| (Value::Str(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Uint(u) => serde_json::Value::from(u),
            Value::Float32(f) => float(f as f64),
            Value::Float64(f) => float(f),
            Value::Str(s) => serde_json::Value::String(s),
            Value::Binary(b) => data_uri(&b, None),
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Map(pairs) => {
                let mut obj = JsonMap::with_capacity(pairs.len());
                for (k, v) in pairs {
                    obj.insert(key_string(k), serde_json::Value::from(v));
                }
                serde_json::Value::Object(obj)
            }
            Value::Extension(ext) => data_uri(&ext.data, Some(ext.kind)),
        }
    }
}

fn float(f: f64) -> serde_json::Value {
    Number::from_f64(f)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn data_uri(bytes: &[u8], ext: Option<i8>) -> serde_json::Value {
    let mut uri = String::from(BIN_URI_START);
    uri.push_str(&STANDARD.encode(bytes));
    if let Some(kind) = ext {
        uri.push_str(&format!(";ext={kind}"));
    }
    serde_json::Value::String(uri)
}

fn key_string(key: Value) -> String {
    match key {
        Value::Str(s) => s,
        other => serde_json::Value::from(other).to_string(),
    }
}

/// Renders a value as compact JSON text.
pub fn to_json_string(value: &Value) -> String {
    serde_json::Value::from(value.clone()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Extension;
    use serde_json::json;

    #[test]
    fn json_document_converts_both_ways() {
        let doc = json!({"Int": -123, "String": "hi", "Array": [1, 2.5, null, true]});
        let value = Value::from(doc.clone());
        assert_eq!(value.get("Int"), Some(&Value::Int(-123)));
        assert_eq!(serde_json::Value::from(value), doc);
    }

    #[test]
    fn binary_renders_as_data_uri() {
        let out = serde_json::Value::from(Value::Binary(vec![1, 2, 3]));
        assert_eq!(out, json!("data:application/octet-stream;base64,AQID"));
        let ext = serde_json::Value::from(Value::Extension(Extension::new(5, vec![0xff])));
        assert_eq!(ext, json!("data:application/octet-stream;base64,/w==;ext=5"));
    }

    #[test]
    fn non_string_keys_are_stringified() {
        let map = Value::Map(vec![(Value::Int(1), Value::Bool(true))]);
        assert_eq!(to_json_string(&map), r#"{"1":true}"#);
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(
            serde_json::Value::from(Value::Float64(f64::NAN)),
            serde_json::Value::Null
        );
    }
}
