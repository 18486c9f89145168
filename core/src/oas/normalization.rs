#![deny(missing_docs)]

//! # Schema Normalization
//!
//! Two kinds of helpers live here:
//!
//! - Value-level rewrites applied to raw schema JSON before it is deserialized
//!   into shims. They only touch known compatibility gaps.
//! - Composition flattening over the interned arena (`allOf`/`anyOf` merging).

use crate::oas::arena::SchemaId;
use crate::oas::document::Document;
use indexmap::{IndexMap, IndexSet};
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Normalizes one raw schema value and all nested schemas, in place.
///
/// - Boolean schemas: `true` becomes `{}`, `false` becomes `{"not": {}}`.
/// - `const` becomes a single-value `enum`, inferring `type` when absent.
/// - `type: [T, "null"]` sets `nullable: true`.
/// - `anyOf: [{$ref: X}, {type: "null"}]` collapses into a nullable `$ref: X`.
pub(crate) fn normalize_schema(value: &mut Value) {
    match value {
        Value::Bool(true) => {
            *value = json!({});
            return;
        }
        Value::Bool(false) => {
            *value = json!({"not": {}});
            return;
        }
        _ => {}
    }

    let Value::Object(map) = value else {
        return;
    };

    normalize_const(map);
    normalize_null_type(map);
    collapse_nullable_ref(map);

    for (key, child) in map.iter_mut() {
        match key.as_str() {
            "items" | "not" => normalize_schema(child),
            // `additionalProperties: true` is meaningful to the classifier.
            "additionalProperties" => {
                if child.is_object() {
                    normalize_schema(child);
                }
            }
            "properties" => {
                if let Value::Object(props) = child {
                    for prop in props.values_mut() {
                        normalize_schema(prop);
                    }
                }
            }
            "allOf" | "anyOf" | "oneOf" => {
                if let Value::Array(members) = child {
                    for member in members.iter_mut() {
                        normalize_schema(member);
                    }
                }
            }
            _ => {}
        }
    }
}

fn normalize_const(map: &mut Map<String, Value>) {
    let Some(const_val) = map.remove("const") else {
        return;
    };
    if !map.contains_key("enum") {
        map.insert("enum".to_string(), Value::Array(vec![const_val.clone()]));
    }
    if !map.contains_key("type") {
        if let Some(type_name) = infer_schema_type(&const_val) {
            map.insert("type".to_string(), Value::String(type_name.to_string()));
        }
    }
}

fn infer_schema_type(value: &Value) -> Option<&'static str> {
    match value {
        Value::String(_) => Some("string"),
        Value::Bool(_) => Some("boolean"),
        Value::Number(num) if num.is_i64() || num.is_u64() => Some("integer"),
        Value::Number(_) => Some("number"),
        Value::Array(_) => Some("array"),
        Value::Object(_) => Some("object"),
        Value::Null => None,
    }
}

fn normalize_null_type(map: &mut Map<String, Value>) {
    let has_null = match map.get("type") {
        Some(Value::Array(types)) => types.iter().any(|t| t == "null"),
        _ => false,
    };
    if has_null && !map.contains_key("nullable") {
        map.insert("nullable".to_string(), Value::Bool(true));
    }
}

fn collapse_nullable_ref(map: &mut Map<String, Value>) {
    let Some(Value::Array(members)) = map.get("anyOf") else {
        return;
    };
    if members.len() != 2 {
        return;
    }
    let reference = members
        .iter()
        .find_map(|m| m.get("$ref").and_then(Value::as_str))
        .map(str::to_string);
    let has_null = members.iter().any(is_null_schema);

    if let (Some(reference), true) = (reference, has_null) {
        map.remove("anyOf");
        map.insert("$ref".to_string(), Value::String(reference));
        map.insert("nullable".to_string(), Value::Bool(true));
    }
}

fn is_null_schema(value: &Value) -> bool {
    match value.get("type") {
        Some(Value::String(t)) => t == "null",
        Some(Value::Array(types)) => types.iter().any(|t| t == "null"),
        _ => false,
    }
}

/// Flattened view of an object schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedProperties {
    /// Property name -> schema, merged in declaration order.
    pub properties: IndexMap<String, SchemaId>,
    /// Required property names.
    pub required: IndexSet<String>,
}

/// Merges `allOf` members, `anyOf` members, then the schema's own properties.
///
/// `$ref`s are followed; `oneOf` schemas contribute nothing. `required` is taken
/// from `allOf` members and the schema itself, since an `anyOf` member is optional.
pub fn resolve_properties(document: &Document, id: SchemaId) -> ResolvedProperties {
    let mut out = ResolvedProperties::default();
    let mut visited = HashSet::new();
    collect_properties(document, id, true, &mut visited, &mut out);
    out
}

fn collect_properties(
    document: &Document,
    id: SchemaId,
    with_required: bool,
    visited: &mut HashSet<SchemaId>,
    out: &mut ResolvedProperties,
) {
    if !visited.insert(id) {
        return;
    }
    let node = &document.arena[id];

    if let Some(reference) = &node.reference {
        if let Some(target) = document.resolve_ref(reference) {
            collect_properties(document, target, with_required, visited, out);
        }
        return;
    }
    if !node.one_of.is_empty() {
        return;
    }

    for member in &node.all_of {
        collect_properties(document, *member, with_required, visited, out);
    }
    for member in &node.any_of {
        collect_properties(document, *member, false, visited, out);
    }
    for (name, schema) in &node.properties {
        out.properties.insert(name.clone(), *schema);
    }
    if with_required {
        out.required.extend(node.required.iter().cloned());
    }
}

/// Properties declared by the schema itself or by its inline `allOf`/`anyOf` members.
///
/// Referenced members are skipped: their properties belong to another named schema.
pub fn own_properties(document: &Document, id: SchemaId) -> IndexMap<String, SchemaId> {
    let mut out = IndexMap::new();
    collect_own(document, id, &mut out);
    out
}

fn collect_own(document: &Document, id: SchemaId, out: &mut IndexMap<String, SchemaId>) {
    let node = &document.arena[id];
    for member in node.all_of.iter().chain(&node.any_of) {
        if document.arena[*member].reference.is_none() {
            collect_own(document, *member, out);
        }
    }
    for (name, schema) in &node.properties {
        out.insert(name.clone(), *schema);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use crate::oas::document::load_document;

    #[test]
    fn test_own_properties_skip_referenced_members() {
        let yaml = r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    Base:
      type: object
      properties:
        id: {type: string}
    Dog:
      allOf:
        - $ref: '#/components/schemas/Base'
        - type: object
          properties:
            bark: {type: string}
      properties:
        name: {type: string}
"#;
        let doc = load_document(yaml, &ConversionOptions::default()).unwrap();
        let own = own_properties(&doc, doc.schemas["Dog"]);
        let names: Vec<&str> = own.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["bark", "name"]);
    }

    #[test]
    fn test_boolean_schemas() {
        let mut t = json!(true);
        normalize_schema(&mut t);
        assert_eq!(t, json!({}));

        let mut f = json!(false);
        normalize_schema(&mut f);
        assert_eq!(f, json!({"not": {}}));
    }

    #[test]
    fn test_const_becomes_enum() {
        let mut value = json!({"const": "dog"});
        normalize_schema(&mut value);
        assert_eq!(value, json!({"enum": ["dog"], "type": "string"}));
    }

    #[test]
    fn test_null_type_sets_nullable() {
        let mut value = json!({"type": ["string", "null"]});
        normalize_schema(&mut value);
        assert_eq!(value["nullable"], json!(true));
    }

    #[test]
    fn test_nullable_ref_collapse() {
        let mut value = json!({
            "properties": {
                "owner": {
                    "anyOf": [{"$ref": "#/components/schemas/User"}, {"type": "null"}],
                    "description": "Owner"
                }
            }
        });
        normalize_schema(&mut value);
        assert_eq!(
            value["properties"]["owner"],
            json!({
                "$ref": "#/components/schemas/User",
                "nullable": true,
                "description": "Owner"
            })
        );
    }

    #[test]
    fn test_two_non_null_members_untouched() {
        let mut value = json!({"anyOf": [{"$ref": "#/components/schemas/A"}, {"type": "string"}]});
        let before = value.clone();
        normalize_schema(&mut value);
        assert_eq!(value, before);
    }

    #[test]
    fn test_resolve_properties_merges_composition() {
        let yaml = r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    Base:
      type: object
      required: [id]
      properties:
        id: {type: string}
    Extra:
      type: object
      required: [note]
      properties:
        note: {type: string}
    Pet:
      allOf:
        - $ref: '#/components/schemas/Base'
      anyOf:
        - $ref: '#/components/schemas/Extra'
      required: [name]
      properties:
        name: {type: string}
"#;
        let doc = load_document(yaml, &ConversionOptions::default()).unwrap();
        let pet = doc.schemas["Pet"];
        let resolved = resolve_properties(&doc, pet);
        let names: Vec<&str> = resolved.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["id", "note", "name"]);
        assert!(resolved.required.contains("id"));
        assert!(resolved.required.contains("name"));
        assert!(!resolved.required.contains("note"));
    }

    #[test]
    fn test_resolve_properties_terminates_on_cycles() {
        let yaml = r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    A:
      allOf:
        - $ref: '#/components/schemas/B'
      properties:
        a: {type: string}
    B:
      allOf:
        - $ref: '#/components/schemas/A'
      properties:
        b: {type: string}
"#;
        let doc = load_document(yaml, &ConversionOptions::default()).unwrap();
        let resolved = resolve_properties(&doc, doc.schemas["A"]);
        assert_eq!(resolved.properties.len(), 2);
    }
}
