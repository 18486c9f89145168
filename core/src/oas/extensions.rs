#![deny(missing_docs)]

//! # Vendor Extensions
//!
//! Typed access to the `x-` keys the pipeline understands. Values are validated
//! once while the document is loaded; a value of the wrong JSON type becomes a
//! diagnostic and is otherwise ignored.

use indexmap::IndexMap;
use serde_json::Value;

/// Keeps an unreachable component schema in the model.
pub const FORCE_INCLUDE: &str = "x-kgen-force-create";
/// Keeps an unreachable component schema in the model (alternate spelling).
pub const FORCE_INCLUDE_ALIAS: &str = "x-force-include";
/// Display names for enum constants.
pub const ENUM_NAMES: &str = "x-enumNames";
/// Display names for enum constants (alternate spelling).
pub const ENUM_VARNAMES: &str = "x-enum-varnames";

/// The recognized extensions of one schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaExtensions {
    force_include: Option<bool>,
    enum_names: Option<Vec<String>>,
}

impl SchemaExtensions {
    /// Extracts the recognized keys from a schema's raw extension map.
    ///
    /// Problems are appended to `diagnostics` with `location` as context.
    pub fn from_raw(
        raw: &IndexMap<String, Value>,
        location: &str,
        diagnostics: &mut Vec<String>,
    ) -> Self {
        let force_include = [FORCE_INCLUDE, FORCE_INCLUDE_ALIAS]
            .iter()
            .find_map(|key| raw.get(*key).map(|value| (*key, value)))
            .and_then(|(key, value)| match value {
                Value::Bool(flag) => Some(*flag),
                other => {
                    diagnostics.push(format!(
                        "{location}: '{key}' must be a boolean, found {other}"
                    ));
                    None
                }
            });

        let enum_names = [ENUM_NAMES, ENUM_VARNAMES]
            .iter()
            .find_map(|key| raw.get(*key).map(|value| (*key, value)))
            .and_then(|(key, value)| match string_list(value) {
                Some(names) => Some(names),
                None => {
                    diagnostics.push(format!(
                        "{location}: '{key}' must be a list of strings"
                    ));
                    None
                }
            });

        Self {
            force_include,
            enum_names,
        }
    }

    /// `x-kgen-force-create` / `x-force-include`, if present and well typed.
    pub fn force_include(&self) -> Option<bool> {
        self.force_include
    }

    /// `x-enumNames` / `x-enum-varnames`, if present and well typed.
    pub fn enum_names(&self) -> Option<&[String]> {
        self.enum_names.as_deref()
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> IndexMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_force_include_flag() {
        let mut diags = Vec::new();
        let ext =
            SchemaExtensions::from_raw(&raw(json!({"x-kgen-force-create": true})), "#", &mut diags);
        assert_eq!(ext.force_include(), Some(true));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_force_include_alias() {
        let mut diags = Vec::new();
        let ext = SchemaExtensions::from_raw(&raw(json!({"x-force-include": true})), "#", &mut diags);
        assert_eq!(ext.force_include(), Some(true));

        let ext = SchemaExtensions::from_raw(
            &raw(json!({"x-kgen-force-create": false, "x-force-include": true})),
            "#",
            &mut diags,
        );
        assert_eq!(ext.force_include(), Some(false));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_wrong_type_is_a_diagnostic() {
        let mut diags = Vec::new();
        let ext =
            SchemaExtensions::from_raw(&raw(json!({"x-kgen-force-create": "yes"})), "#/a", &mut diags);
        assert_eq!(ext.force_include(), None);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].starts_with("#/a"));
    }

    #[test]
    fn test_enum_names_prefers_camel_key() {
        let mut diags = Vec::new();
        let ext = SchemaExtensions::from_raw(
            &raw(json!({"x-enum-varnames": ["B"], "x-enumNames": ["A"]})),
            "#",
            &mut diags,
        );
        assert_eq!(ext.enum_names(), Some(&["A".to_string()][..]));
    }

    #[test]
    fn test_unrelated_keys_ignored() {
        let mut diags = Vec::new();
        let ext = SchemaExtensions::from_raw(&raw(json!({"minimum": 3})), "#", &mut diags);
        assert_eq!(ext, SchemaExtensions::default());
        assert!(diags.is_empty());
    }
}
