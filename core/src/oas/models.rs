#![deny(missing_docs)]

//! # Spec Model
//!
//! The Intermediate Representation (IR) produced by a conversion run.
//!
//! Every entity is built once and never mutated afterwards. A downstream emitter
//! consumes these types (usually as JSON) to render client source code.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Ordered path of name segments identifying one named schema.
///
/// Nested schemas extend their parent's path, e.g. `["Pet", "Owner"]`.
/// Serialized as the dot-joined path so it can key JSON objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TypeNames(Vec<String>);

impl TypeNames {
    /// Creates a path from its segments.
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// A single-segment path.
    pub fn root(name: impl Into<String>) -> Self {
        Self(vec![name.into()])
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// The path segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The innermost segment.
    pub fn last(&self) -> &str {
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    /// All segments concatenated, e.g. `PetOwner`.
    pub fn joined(&self) -> String {
        self.0.concat()
    }
}

impl fmt::Display for TypeNames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl Serialize for TypeNames {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Terminal scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PrimitiveType {
    /// `boolean`
    Boolean,
    /// `integer` / `int32`
    Int32,
    /// `int64`
    Int64,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `string` without a recognized format.
    String,
    /// `string` / `date`
    Date,
    /// `string` / `time`
    Time,
    /// `string` / `date-time`
    DateTime,
    /// `string` / `byte` or `base64`
    Base64,
    /// `string` / `uuid`
    Uuid,
}

/// A type usage: what a property, parameter, or payload refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SimpleType {
    /// Untyped JSON value.
    Any,
    /// Non-JSON payload passed through as bytes.
    Raw,
    /// No payload.
    Unit,
    /// A named schema in the model.
    Ref {
        /// Target path; always present in the schema forest.
        #[serde(rename = "typeNames")]
        type_names: TypeNames,
    },
    /// A scalar.
    Primitive {
        /// Scalar flavour.
        primitive: PrimitiveType,
    },
    /// A list.
    Array {
        /// Element type.
        items: Box<SimpleType>,
        /// Elements may be null.
        #[serde(rename = "itemsNullable")]
        items_nullable: bool,
    },
    /// A string-keyed map.
    Map {
        /// Value type.
        items: Box<SimpleType>,
        /// Values may be null.
        #[serde(rename = "itemsNullable")]
        items_nullable: bool,
    },
}

/// One constant of an enum schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumConstant {
    /// Identifier for the constant.
    pub name: String,
    /// Wire value.
    pub value: String,
}

/// One member of a sealed union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SealedVariant {
    /// Discriminator value selecting this variant.
    pub tag: String,
    /// The variant schema.
    pub type_names: TypeNames,
}

/// A property of an object schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecProperty {
    /// Field-cased name.
    pub name: String,
    /// Name as written in the document.
    pub raw_name: String,
    /// Marked deprecated.
    pub deprecated: bool,
    /// May be absent or null.
    pub nullable: bool,
    /// Value type.
    #[serde(rename = "type")]
    pub ty: SimpleType,
    /// Description including examples.
    pub description: Option<String>,
}

/// The shape of a named schema. Exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum SchemaKind {
    /// Alias of a scalar.
    Primitive {
        /// Scalar flavour.
        subtype: PrimitiveType,
    },
    /// String enumeration.
    Enum {
        /// Constants in declaration order.
        constants: Vec<EnumConstant>,
    },
    /// Alias of a list.
    Array {
        /// Element type.
        items: SimpleType,
        /// Elements may be null.
        items_nullable: bool,
    },
    /// Alias of a map.
    Map {
        /// Value type.
        items: SimpleType,
        /// Values may be null.
        items_nullable: bool,
    },
    /// Record type.
    Object {
        /// Flattened properties.
        properties: Vec<SpecProperty>,
        /// Nested named schemas.
        children: Vec<NamedSchema>,
    },
    /// Tagged union.
    Sealed {
        /// Property carrying the tag.
        discriminator_field: String,
        /// One entry per `oneOf` member.
        variants: Vec<SealedVariant>,
        /// Inline variants and moved referenced variants.
        children: Vec<NamedSchema>,
    },
    /// Alias of another named schema.
    Ref {
        /// Target path.
        target: TypeNames,
    },
    /// Untyped payload.
    Raw,
    /// No payload.
    Unit,
}

/// A schema with a final, unique name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedSchema {
    /// Unique composite key.
    pub type_names: TypeNames,
    /// Marked deprecated.
    pub deprecated: bool,
    /// Description including examples.
    pub description: Option<String>,
    /// Shape.
    #[serde(flatten)]
    pub kind: SchemaKind,
}

impl NamedSchema {
    /// Nested schemas, if the kind carries any.
    pub fn children(&self) -> &[NamedSchema] {
        match &self.kind {
            SchemaKind::Object { children, .. } | SchemaKind::Sealed { children, .. } => children,
            _ => &[],
        }
    }

    /// Depth-first iterator over this schema and all descendants.
    pub fn walk(&self) -> Vec<&NamedSchema> {
        let mut out = vec![self];
        for child in self.children() {
            out.extend(child.walk());
        }
        out
    }
}

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ParameterLocation {
    /// `in: cookie`
    Cookie,
    /// `in: header`
    Header,
    /// `in: path`
    Path,
    /// `in: query`
    Query,
}

impl ParameterLocation {
    /// Parses the `in` field of a Parameter Object.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "cookie" => Some(Self::Cookie),
            "header" => Some(Self::Header),
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            _ => None,
        }
    }

    /// Sort key; path parameters must precede query parameters.
    pub fn priority(self) -> u8 {
        match self {
            Self::Cookie => 0,
            Self::Header => 1,
            Self::Path => 2,
            Self::Query => 3,
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cookie => "Cookie",
            Self::Header => "Header",
            Self::Path => "Path",
            Self::Query => "Query",
        };
        f.write_str(s)
    }
}

/// A normalized operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecParameter {
    /// Field-cased, collision-free name.
    pub name: String,
    /// Name as written in the document.
    pub raw_name: String,
    /// Transport location.
    pub location: ParameterLocation,
    /// Value type.
    pub schema: SimpleType,
    /// Optional parameter.
    pub nullable: bool,
    /// Parameter description.
    pub description: Option<String>,
}

/// A resolved request or response payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaInfo {
    /// Payload type.
    #[serde(rename = "type")]
    pub ty: SimpleType,
    /// Payload may be absent or null.
    pub nullable: bool,
    /// Body or response description.
    pub description: Option<String>,
}

/// Encoding of the selected request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RequestType {
    /// JSON or no body.
    Default,
    /// `multipart/form-data`
    Multipart,
    /// `application/x-www-form-urlencoded`
    UrlEncoded,
    /// Anything else.
    Unknown,
}

/// HTTP verbs of a Path Item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// Path Item keys in the order operations are read.
    pub const ALL: [HttpMethod; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// Lowercase Path Item key.
    pub fn key(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key().to_ascii_uppercase())
    }
}

/// One HTTP operation ready for emission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecOperation {
    /// Function-cased name.
    pub name: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Path template.
    pub path: String,
    /// Encoding of the request body.
    pub request_type: RequestType,
    /// Ordered Cookie, Header, Path, Query.
    pub parameters: Vec<SpecParameter>,
    /// Request body, if declared.
    pub body: Option<SchemaInfo>,
    /// Selected response payload.
    pub response: SchemaInfo,
    /// Marked deprecated.
    pub deprecated: bool,
    /// Type-cased security scheme names.
    pub security_ids: Vec<String>,
    /// Base URL overriding the document default.
    pub server_override: Option<String>,
}

/// Operations grouped under one tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecApi {
    /// Type-cased tag.
    pub name: String,
    /// Operations carrying the tag.
    pub operations: Vec<SpecOperation>,
}

/// Supported authentication flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SecuritySchemeType {
    /// HTTP basic.
    Basic,
    /// HTTP bearer.
    Bearer,
    /// API key in a header.
    Header,
    /// API key in the query string.
    Query,
    /// API key in a cookie.
    Cookie,
}

/// A supported security scheme.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    /// Type-cased name.
    pub name: String,
    /// Name as declared under `components.securitySchemes`.
    pub raw_name: String,
    /// Header, query, or cookie name for API keys.
    pub property_name: Option<String>,
    /// Flavour.
    #[serde(rename = "type")]
    pub ty: SecuritySchemeType,
    /// Scheme description.
    pub description: Option<String>,
}

/// Document-level facts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecMetadata {
    /// `info.title`
    pub title: String,
    /// `info.description`
    pub description: Option<String>,
    /// `info.version`
    pub version: String,
    /// Base URLs of the document servers.
    pub servers: Vec<String>,
    /// Target package of the generated code.
    pub package_name: String,
    /// Generation timestamp, second precision.
    pub created_at: DateTime<Utc>,
}

/// Aggregate root handed to the emitter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecModel {
    /// Document-level facts.
    pub metadata: SpecMetadata,
    /// Header comment for generated files.
    pub file_header: String,
    /// Operations grouped by tag.
    pub apis: Vec<SpecApi>,
    /// Top-level named schema forest.
    pub schemas: Vec<NamedSchema>,
    /// Supported security schemes.
    pub security_schemes: Vec<SecurityScheme>,
    /// Discriminator tags of referenced union variants.
    pub model_serial_names: IndexMap<TypeNames, String>,
    /// Unions each variant belongs to.
    pub model_interfaces: IndexMap<TypeNames, Vec<TypeNames>>,
}

impl SpecModel {
    /// Every named schema in the forest, depth first.
    pub fn all_schemas(&self) -> Vec<&NamedSchema> {
        self.schemas.iter().flat_map(NamedSchema::walk).collect()
    }

    /// Finds a named schema by its full path.
    pub fn find_schema(&self, type_names: &TypeNames) -> Option<&NamedSchema> {
        self.all_schemas()
            .into_iter()
            .find(|schema| &schema.type_names == type_names)
    }
}

/// Nullability rule shared by properties, items, parameters and payloads.
///
/// An explicit `nullable: true` always wins; otherwise only a required value is non-null.
pub fn is_nullable(required: Option<bool>, nullable: Option<bool>) -> bool {
    !required.unwrap_or(false) || nullable.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nullability_matrix() {
        let cases = [
            (None, None, true),
            (None, Some(false), true),
            (None, Some(true), true),
            (Some(false), None, true),
            (Some(false), Some(false), true),
            (Some(false), Some(true), true),
            (Some(true), None, false),
            (Some(true), Some(false), false),
            (Some(true), Some(true), true),
        ];
        for (required, nullable, expected) in cases {
            assert_eq!(
                is_nullable(required, nullable),
                expected,
                "required={required:?} nullable={nullable:?}"
            );
        }
    }

    #[test]
    fn test_type_names_helpers() {
        let parent = TypeNames::root("Pet");
        let child = parent.child("Owner");
        assert_eq!(child.joined(), "PetOwner");
        assert_eq!(child.to_string(), "Pet.Owner");
        assert_eq!(child.last(), "Owner");
        assert_eq!(child.segments(), &["Pet".to_string(), "Owner".to_string()]);
    }

    #[test]
    fn test_type_names_serialize_as_map_key() {
        let mut map = IndexMap::new();
        map.insert(TypeNames::root("Cat"), "cat".to_string());
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"Cat":"cat"}"#);
    }

    #[test]
    fn test_parameter_location_order() {
        let mut locations = vec![
            ParameterLocation::Query,
            ParameterLocation::Cookie,
            ParameterLocation::Path,
            ParameterLocation::Header,
        ];
        locations.sort_by_key(|l| l.priority());
        assert_eq!(
            locations,
            vec![
                ParameterLocation::Cookie,
                ParameterLocation::Header,
                ParameterLocation::Path,
                ParameterLocation::Query
            ]
        );
    }
}
