#![deny(missing_docs)]

//! # Named Schema Conversion
//!
//! Renders the model tree as the [`NamedSchema`] forest of the IR.

use crate::error::{AppError, AppResult};
use crate::naming::{as_field_name, as_type_name};
use crate::oas::arena::{AdditionalProperties, SchemaId, SchemaNode};
use crate::oas::context::ConversionContext;
use crate::oas::models::{is_nullable, EnumConstant, NamedSchema, SchemaKind, SpecProperty};
use crate::oas::normalization::resolve_properties;
use crate::oas::resolver::types::{element, resolve_simple_type};
use crate::oas::schemas::classify::SchemaClass;
use serde_json::Value;

/// Converts every root of the model tree, in order.
pub fn convert_schemas(ctx: &ConversionContext<'_>) -> AppResult<Vec<NamedSchema>> {
    ctx.tree
        .roots()
        .iter()
        .map(|&root| convert_node(ctx, root))
        .collect()
}

fn convert_node(ctx: &ConversionContext<'_>, index: usize) -> AppResult<NamedSchema> {
    let tree_node = ctx.tree.node(index);
    let node = ctx.node(tree_node.id);
    let children = tree_node
        .children
        .iter()
        .map(|&child| convert_node(ctx, child))
        .collect::<AppResult<Vec<_>>>()?;

    let kind = match tree_node.class {
        SchemaClass::Primitive(subtype) => SchemaKind::Primitive { subtype },
        SchemaClass::Enum => SchemaKind::Enum {
            constants: enum_constants(node),
        },
        SchemaClass::Array => {
            let (items, items_nullable) = element(ctx, node.items)?;
            SchemaKind::Array {
                items,
                items_nullable,
            }
        }
        SchemaClass::Map => {
            let values = match node.additional_properties {
                AdditionalProperties::Schema(values) => Some(values),
                _ => None,
            };
            let (items, items_nullable) = element(ctx, values)?;
            SchemaKind::Map {
                items,
                items_nullable,
            }
        }
        SchemaClass::Object => SchemaKind::Object {
            properties: properties(ctx, tree_node.id)?,
            children: Vec::new(),
        },
        SchemaClass::Sealed => {
            let resolution = ctx.unions.sealed.get(&index).ok_or_else(|| {
                AppError::InternalInvariant(format!(
                    "union '{}' has no resolved variants",
                    tree_node.type_names
                ))
            })?;
            SchemaKind::Sealed {
                discriminator_field: resolution.discriminator_field.clone(),
                variants: resolution.variants.clone(),
                children: Vec::new(),
            }
        }
        SchemaClass::Ref => {
            let reference = node.reference.as_deref().ok_or_else(|| {
                AppError::InternalInvariant(format!("alias at {} has no target", node.location))
            })?;
            SchemaKind::Ref {
                target: ctx.resolve_named_ref(reference, &node.location)?,
            }
        }
        SchemaClass::Raw => SchemaKind::Raw,
    };

    let kind = match (kind, children.is_empty()) {
        (kind, true) => kind,
        (SchemaKind::Object { properties, .. }, false) => SchemaKind::Object {
            properties,
            children,
        },
        (
            SchemaKind::Sealed {
                discriminator_field,
                variants,
                ..
            },
            false,
        ) => SchemaKind::Sealed {
            discriminator_field,
            variants,
            children,
        },
        (_, false) => {
            return Err(AppError::InternalInvariant(format!(
                "'{}' cannot hold nested schemas",
                tree_node.type_names
            )))
        }
    };

    Ok(NamedSchema {
        type_names: tree_node.type_names.clone(),
        deprecated: node.deprecated,
        description: node.full_description(),
        kind,
    })
}

fn properties(ctx: &ConversionContext<'_>, id: SchemaId) -> AppResult<Vec<SpecProperty>> {
    let resolved = resolve_properties(ctx.document, id);
    resolved
        .properties
        .iter()
        .map(|(raw_name, &property)| {
            let node = ctx.node(property);
            Ok(SpecProperty {
                name: as_field_name(raw_name),
                raw_name: raw_name.clone(),
                deprecated: node.deprecated,
                nullable: is_nullable(Some(resolved.required.contains(raw_name)), node.nullable),
                ty: resolve_simple_type(ctx, property)?,
                description: node.full_description(),
            })
        })
        .collect()
}

/// Enum constants, named by `x-enumNames` when it covers every value.
fn enum_constants(node: &SchemaNode) -> Vec<EnumConstant> {
    let overrides = node
        .extensions
        .enum_names()
        .filter(|names| names.len() == node.enum_values.len());

    node.enum_values
        .iter()
        .enumerate()
        .filter(|(_, value)| !value.is_null())
        .map(|(i, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let name = match overrides {
                Some(names) => names[i].clone(),
                None => constant_name(&value),
            };
            EnumConstant { name, value }
        })
        .collect()
}

fn constant_name(value: &str) -> String {
    let name = as_type_name(value);
    if name.is_empty() {
        "Empty".to_string()
    } else {
        name
    }
}
