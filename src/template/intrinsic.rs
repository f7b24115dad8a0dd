// Copyright (c) 2025 - Cowboy AI, Inc.
//! Intrinsic function builders
//!
//! References between resources are plain JSON values in the rendered
//! template. [`collect_references`] recovers the implicit dependency edges
//! from them.

use serde_json::{json, Value};
use std::collections::BTreeSet;

use crate::domain::{ExportName, LogicalId};

/// `{ "Ref": id }`
pub fn reference(id: &LogicalId) -> Value {
    json!({ "Ref": id.as_str() })
}

/// `{ "Ref": "AWS::<name>" }`
pub fn pseudo(name: &str) -> Value {
    json!({ "Ref": format!("AWS::{}", name) })
}

/// `{ "Fn::GetAtt": [id, attribute] }`
pub fn get_att(id: &LogicalId, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [id.as_str(), attribute] })
}

/// `{ "Fn::Join": [separator, parts] }`
///
/// `parts` may be an array or a list-valued intrinsic such as a `GetAtt` of
/// `NameServers`.
pub fn join(separator: &str, parts: Value) -> Value {
    json!({ "Fn::Join": [separator, parts] })
}

/// `{ "Fn::ImportValue": export }`
pub fn import_value(export: &ExportName) -> Value {
    json!({ "Fn::ImportValue": export.as_str() })
}

/// Logical ids referenced through `Ref` or `Fn::GetAtt` anywhere in `value`
///
/// Pseudo parameters (`AWS::Region`, ...) are not resources and are skipped.
pub fn collect_references(value: &Value) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    walk(value, &mut found);
    found
}

/// Export names consumed through `Fn::ImportValue` anywhere in `value`
pub fn collect_imports(value: &Value) -> BTreeSet<String> {
    match value {
        Value::Object(map) => {
            let mut found: BTreeSet<String> = map.values().flat_map(collect_imports).collect();
            if let Some(Value::String(export)) = map.get("Fn::ImportValue") {
                found.insert(export.clone());
            }
            found
        }
        Value::Array(items) => items.iter().flat_map(collect_imports).collect(),
        _ => BTreeSet::new(),
    }
}

fn walk(value: &Value, found: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(target)) = map.get("Ref") {
                if !target.starts_with("AWS::") {
                    found.insert(target.clone());
                }
            }
            if let Some(Value::Array(parts)) = map.get("Fn::GetAtt") {
                if let Some(Value::String(target)) = parts.first() {
                    found.insert(target.clone());
                }
            }
            map.values().for_each(|nested| walk(nested, found));
        }
        Value::Array(items) => items.iter().for_each(|nested| walk(nested, found)),
        _ => {}
    }
}
