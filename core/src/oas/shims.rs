#![deny(missing_docs)]

//! # Document Shims
//!
//! Intermediate deserialization layer. These structs map directly onto the
//! OpenAPI YAML/JSON objects the pipeline consumes; everything else is ignored.
//!
//! Note: shims holding `utoipa::openapi::RefOr` do not derive `Debug` because
//! `RefOr` does not implement it.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use utoipa::openapi::RefOr;

/// A Schema Object, recursively.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShimSchema {
    /// `$ref` pointer.
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// `type`, either a single name or an OAS 3.1 list.
    #[serde(rename = "type")]
    pub schema_type: Option<ShimSchemaType>,
    /// `format`
    pub format: Option<String>,
    /// OAS 3.0 `nullable`
    pub nullable: Option<bool>,
    /// `description`
    pub description: Option<String>,
    /// `deprecated`
    pub deprecated: Option<bool>,
    /// `enum`
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    /// `items`
    pub items: Option<Box<ShimSchema>>,
    /// `additionalProperties`
    pub additional_properties: Option<ShimAdditionalProperties>,
    /// `properties`
    pub properties: Option<IndexMap<String, ShimSchema>>,
    /// `required`
    pub required: Option<Vec<String>>,
    /// `allOf`
    pub all_of: Option<Vec<ShimSchema>>,
    /// `anyOf`
    pub any_of: Option<Vec<ShimSchema>>,
    /// `oneOf`
    pub one_of: Option<Vec<ShimSchema>>,
    /// `not`
    pub not: Option<Box<ShimSchema>>,
    /// `discriminator`
    pub discriminator: Option<ShimDiscriminator>,
    /// `example`
    pub example: Option<Value>,
    /// `examples` (OAS 3.1 list)
    pub examples: Option<Value>,
    /// Every other key, including `x-` extensions.
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// The `type` keyword.
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum ShimSchemaType {
    /// `type: string`
    Single(String),
    /// `type: [string, "null"]`
    Multiple(Vec<String>),
}

impl ShimSchemaType {
    /// Declared type names in order.
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::Single(name) => vec![name.clone()],
            Self::Multiple(names) => names.clone(),
        }
    }
}

/// The `additionalProperties` keyword.
#[derive(Deserialize, Clone, Debug)]
#[serde(untagged)]
pub enum ShimAdditionalProperties {
    /// `additionalProperties: true|false`
    Allowed(bool),
    /// `additionalProperties: {schema}`
    Schema(Box<ShimSchema>),
}

/// The Discriminator Object.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShimDiscriminator {
    /// Property carrying the tag.
    pub property_name: Option<String>,
    /// Tag -> `$ref` (or bare schema name).
    #[serde(default)]
    pub mapping: IndexMap<String, String>,
}

/// The Info Object.
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShimInfo {
    /// API title.
    pub title: Option<String>,
    /// API description.
    pub description: Option<String>,
    /// API version.
    pub version: Option<String>,
    /// Contact information.
    pub contact: Option<ShimContact>,
    /// License information.
    pub license: Option<ShimLicense>,
}

/// Contact information for the exposed API.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ShimContact {
    /// Identifying name.
    pub name: Option<String>,
    /// Contact URL.
    pub url: Option<String>,
    /// Contact email.
    pub email: Option<String>,
}

/// License information for the exposed API.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ShimLicense {
    /// License name.
    pub name: Option<String>,
    /// License URL.
    pub url: Option<String>,
}

/// A Server Object.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ShimServer {
    /// URL template.
    pub url: String,
    /// Server description.
    pub description: Option<String>,
    /// Variables substituted into `url`.
    #[serde(default)]
    pub variables: IndexMap<String, ShimServerVariable>,
}

/// A Server Variable Object.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ShimServerVariable {
    /// Allowed values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<String>>,
    /// Substitution default.
    pub default: Option<String>,
}

/// A Parameter Object.
#[derive(Deserialize, Clone, Debug)]
pub struct ShimParameter {
    /// Parameter name.
    pub name: String,
    /// Location (`path`, `query`, `header`, `cookie`).
    #[serde(rename = "in")]
    pub location: String,
    /// Parameter description.
    pub description: Option<String>,
    /// Mandatory parameter.
    pub required: Option<bool>,
    /// Value schema, kept raw until interned.
    pub schema: Option<Value>,
    /// Alternative to `schema`.
    pub content: Option<IndexMap<String, ShimMediaType>>,
}

/// A Media Type Object.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ShimMediaType {
    /// Payload schema, kept raw until interned.
    pub schema: Option<Value>,
}

/// A Request Body Object.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ShimRequestBody {
    /// Body description.
    pub description: Option<String>,
    /// Mandatory body.
    pub required: Option<bool>,
    /// Media type -> payload.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
}

/// A Header Object.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ShimHeader {
    /// Header description.
    pub description: Option<String>,
    /// Mandatory header.
    pub required: Option<bool>,
    /// Value schema, kept raw until interned.
    pub schema: Option<Value>,
    /// Alternative to `schema`.
    pub content: Option<IndexMap<String, ShimMediaType>>,
}

/// A Response Object.
#[derive(Deserialize, Clone, Default)]
pub struct ShimResponse {
    /// Response description.
    pub description: Option<String>,
    /// Media type -> payload.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
    /// Response headers.
    #[serde(default)]
    pub headers: IndexMap<String, RefOr<ShimHeader>>,
}

/// An Operation Object.
#[derive(Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShimOperation {
    /// Tags grouping the operation.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Unique operation id.
    pub operation_id: Option<String>,
    /// Operation parameters.
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// Request body.
    pub request_body: Option<RefOr<ShimRequestBody>>,
    /// Status code -> response.
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<ShimResponse>>,
    /// Marked deprecated.
    pub deprecated: Option<bool>,
    /// Security requirements; an empty list disables security.
    pub security: Option<Vec<IndexMap<String, Vec<String>>>>,
    /// Server override.
    pub servers: Option<Vec<ShimServer>>,
}

/// The Path Item fields that are not operations.
#[derive(Deserialize, Clone, Default)]
pub struct ShimPathItem {
    /// Parameters shared by every operation.
    #[serde(default)]
    pub parameters: Vec<RefOr<ShimParameter>>,
    /// Server override.
    pub servers: Option<Vec<ShimServer>>,
}

/// A Security Scheme Object.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ShimSecurityScheme {
    /// `apiKey`, `http`, `oauth2`, `openIdConnect`, `mutualTLS`.
    #[serde(rename = "type")]
    pub scheme_type: String,
    /// Header, query, or cookie name for `apiKey`.
    pub name: Option<String>,
    /// Location for `apiKey`.
    #[serde(rename = "in")]
    pub location: Option<String>,
    /// HTTP auth scheme for `http`.
    pub scheme: Option<String>,
    /// Scheme description.
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_type_forms() {
        let single: ShimSchema = serde_json::from_value(json!({"type": "string"})).unwrap();
        assert_eq!(single.schema_type.unwrap().names(), vec!["string"]);

        let multi: ShimSchema =
            serde_json::from_value(json!({"type": ["integer", "null"]})).unwrap();
        assert_eq!(multi.schema_type.unwrap().names(), vec!["integer", "null"]);
    }

    #[test]
    fn test_additional_properties_forms() {
        let allowed: ShimSchema =
            serde_json::from_value(json!({"additionalProperties": true})).unwrap();
        assert!(matches!(
            allowed.additional_properties,
            Some(ShimAdditionalProperties::Allowed(true))
        ));

        let schema: ShimSchema =
            serde_json::from_value(json!({"additionalProperties": {"type": "integer"}})).unwrap();
        assert!(matches!(
            schema.additional_properties,
            Some(ShimAdditionalProperties::Schema(_))
        ));
    }

    #[test]
    fn test_extensions_are_collected() {
        let schema: ShimSchema =
            serde_json::from_value(json!({"type": "object", "x-force-include": true})).unwrap();
        assert_eq!(schema.extensions.get("x-force-include"), Some(&json!(true)));
    }

    #[test]
    fn test_parameter_ref_or_inline() {
        let params: Vec<RefOr<ShimParameter>> = serde_json::from_value(json!([
            {"$ref": "#/components/parameters/Limit"},
            {"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}
        ]))
        .unwrap();
        assert!(matches!(&params[0], RefOr::Ref(r) if r.ref_location == "#/components/parameters/Limit"));
        assert!(matches!(&params[1], RefOr::T(p) if p.name == "id"));
    }
}
