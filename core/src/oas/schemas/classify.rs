#![deny(missing_docs)]

//! # Schema Classifier
//!
//! Maps one schema node onto exactly one [`SchemaClass`]. The checks run in a
//! fixed order and the first match wins:
//!
//! 1. `$ref` -> `Ref`
//! 2. `additionalProperties` is a schema or `true` -> `Map`
//! 3. `string` with a non-empty `enum` -> `Enum`
//! 4. `string`/`integer`/`number`/`boolean` -> `Primitive`
//! 5. `array` -> `Array`
//! 6. non-empty `oneOf` -> `Sealed`
//! 7. non-empty `allOf`/`anyOf`, or any `properties` -> `Object`
//! 8. anything else -> `Raw`

use crate::error::{AppError, AppResult};
use crate::oas::arena::{AdditionalProperties, SchemaNode};
use crate::oas::models::PrimitiveType;

/// Kind of a raw schema node as seen by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaClass {
    /// Scalar with a resolved subtype.
    Primitive(PrimitiveType),
    /// String enumeration.
    Enum,
    /// List.
    Array,
    /// String-keyed map.
    Map,
    /// Record.
    Object,
    /// `oneOf` union.
    Sealed,
    /// Reference to a component.
    Ref,
    /// Untyped payload.
    Raw,
}

impl SchemaClass {
    /// Classes that must become named schemas when they appear inline.
    pub fn needs_name(self) -> bool {
        matches!(self, Self::Enum | Self::Object | Self::Sealed)
    }
}

const KNOWN_TYPES: [&str; 6] = ["object", "array", "string", "integer", "number", "boolean"];

/// First known entry of `type`, defaulting to `object`.
fn resolved_type(node: &SchemaNode) -> &str {
    node.types
        .iter()
        .map(String::as_str)
        .find(|t| KNOWN_TYPES.contains(t))
        .unwrap_or("object")
}

/// Classifies a schema node.
///
/// Fails with `UnsupportedSchema` for an integer or number format outside
/// `int32`, `int64`, `float`, `double`. Unknown string formats are plain strings.
pub fn classify(node: &SchemaNode) -> AppResult<SchemaClass> {
    if node.reference.is_some() {
        return Ok(SchemaClass::Ref);
    }
    if matches!(
        node.additional_properties,
        AdditionalProperties::Schema(_) | AdditionalProperties::Allowed(true)
    ) {
        return Ok(SchemaClass::Map);
    }

    let ty = resolved_type(node);
    if ty == "string" && !node.enum_values.is_empty() {
        return Ok(SchemaClass::Enum);
    }
    if let Some(primitive) = primitive_type(ty, node)? {
        return Ok(SchemaClass::Primitive(primitive));
    }
    if ty == "array" {
        return Ok(SchemaClass::Array);
    }
    if !node.one_of.is_empty() {
        return Ok(SchemaClass::Sealed);
    }
    if !node.all_of.is_empty() || !node.any_of.is_empty() || !node.properties.is_empty() {
        return Ok(SchemaClass::Object);
    }
    Ok(SchemaClass::Raw)
}

fn primitive_type(ty: &str, node: &SchemaNode) -> AppResult<Option<PrimitiveType>> {
    let format = node.format.as_deref();
    let primitive = match ty {
        "boolean" => PrimitiveType::Boolean,
        "integer" | "number" => match format {
            Some("int32") => PrimitiveType::Int32,
            Some("int64") => PrimitiveType::Int64,
            Some("float") => PrimitiveType::Float,
            Some("double") => PrimitiveType::Double,
            None if ty == "integer" => PrimitiveType::Int32,
            None => PrimitiveType::Float,
            Some(other) => {
                return Err(AppError::unsupported(
                    &node.location,
                    format!("unrecognized {ty} format '{other}'"),
                ))
            }
        },
        "string" => match format {
            Some("date") => PrimitiveType::Date,
            Some("time") => PrimitiveType::Time,
            Some("date-time") => PrimitiveType::DateTime,
            Some("byte") | Some("base64") => PrimitiveType::Base64,
            Some("uuid") => PrimitiveType::Uuid,
            _ => PrimitiveType::String,
        },
        _ => return Ok(None),
    };
    Ok(Some(primitive))
}
