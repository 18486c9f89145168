#![deny(missing_docs)]

//! # Type Resolution
//!
//! Turns a schema usage (property, item, parameter, payload) into a
//! [`SimpleType`]. Anything that needs a name must already have one in the
//! model tree; finding an unnamed object, enum or union here is a pipeline bug.

use crate::error::{AppError, AppResult};
use crate::oas::arena::{AdditionalProperties, SchemaId};
use crate::oas::context::ConversionContext;
use crate::oas::models::{is_nullable, SimpleType};
use crate::oas::schemas::classify::SchemaClass;

/// Resolves the type of a schema usage.
pub fn resolve_simple_type(ctx: &ConversionContext<'_>, id: SchemaId) -> AppResult<SimpleType> {
    let node = ctx.node(id);

    if let Some(reference) = &node.reference {
        return Ok(SimpleType::Ref {
            type_names: ctx.resolve_named_ref(reference, &node.location)?,
        });
    }
    if let Some(type_names) = ctx.type_names(id) {
        return Ok(SimpleType::Ref {
            type_names: type_names.clone(),
        });
    }

    let ty = match ctx.classify(id)? {
        SchemaClass::Primitive(primitive) => SimpleType::Primitive { primitive },
        SchemaClass::Array => {
            let (items, items_nullable) = element(ctx, node.items)?;
            SimpleType::Array {
                items: Box::new(items),
                items_nullable,
            }
        }
        SchemaClass::Map => {
            let values = match node.additional_properties {
                AdditionalProperties::Schema(values) => Some(values),
                _ => None,
            };
            let (items, items_nullable) = element(ctx, values)?;
            SimpleType::Map {
                items: Box::new(items),
                items_nullable,
            }
        }
        SchemaClass::Raw => SimpleType::Any,
        class @ (SchemaClass::Enum | SchemaClass::Object | SchemaClass::Sealed | SchemaClass::Ref) => {
            return Err(AppError::InternalInvariant(format!(
                "{class:?} schema at {} was never named",
                node.location
            )))
        }
    };
    Ok(ty)
}

/// Element type of an array or map and whether elements may be null.
///
/// A missing element schema is an untyped, nullable value.
pub(crate) fn element(
    ctx: &ConversionContext<'_>,
    id: Option<SchemaId>,
) -> AppResult<(SimpleType, bool)> {
    match id {
        Some(id) => Ok((
            resolve_simple_type(ctx, id)?,
            is_nullable(Some(true), ctx.node(id).nullable),
        )),
        None => Ok((SimpleType::Any, true)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use crate::oas::document::{load_document, Document};
    use crate::oas::models::{PrimitiveType, TypeNames};
    use crate::oas::schemas::tree::build_model_tree;
    use crate::oas::schemas::visitor::collect_reachable;

    const DOC: &str = r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    Pet:
      type: object
      x-kgen-force-create: true
      properties:
        tags:
          type: array
          items: {type: string, nullable: true}
        scores:
          type: object
          additionalProperties: {type: integer, format: int64}
        free:
          type: object
          additionalProperties: true
        owner: {$ref: '#/components/schemas/Owner'}
        blob: {}
        address:
          type: object
          properties:
            city: {type: string}
    Owner:
      type: object
      properties:
        name: {type: string}
"#;

    fn with_ctx<T>(doc: &Document, f: impl FnOnce(&ConversionContext<'_>) -> T) -> T {
        let options = ConversionOptions::default();
        let mut ctx = ConversionContext::new(doc, &options);
        let reachable = collect_reachable(&ctx).unwrap();
        ctx.tree = build_model_tree(&ctx, &reachable).unwrap();
        f(&ctx)
    }

    fn property(doc: &Document, name: &str) -> SchemaId {
        doc.arena[doc.schemas["Pet"]].properties[name]
    }

    #[test]
    fn test_containers() {
        let doc = load_document(DOC, &ConversionOptions::default()).unwrap();
        with_ctx(&doc, |ctx| {
            assert_eq!(
                resolve_simple_type(ctx, property(&doc, "tags")).unwrap(),
                SimpleType::Array {
                    items: Box::new(SimpleType::Primitive {
                        primitive: PrimitiveType::String
                    }),
                    items_nullable: true,
                }
            );
            assert_eq!(
                resolve_simple_type(ctx, property(&doc, "scores")).unwrap(),
                SimpleType::Map {
                    items: Box::new(SimpleType::Primitive {
                        primitive: PrimitiveType::Int64
                    }),
                    items_nullable: false,
                }
            );
            assert_eq!(
                resolve_simple_type(ctx, property(&doc, "free")).unwrap(),
                SimpleType::Map {
                    items: Box::new(SimpleType::Any),
                    items_nullable: true,
                }
            );
            assert_eq!(
                resolve_simple_type(ctx, property(&doc, "blob")).unwrap(),
                SimpleType::Any
            );
        });
    }

    #[test]
    fn test_named_usages_become_refs() {
        let doc = load_document(DOC, &ConversionOptions::default()).unwrap();
        with_ctx(&doc, |ctx| {
            assert_eq!(
                resolve_simple_type(ctx, property(&doc, "owner")).unwrap(),
                SimpleType::Ref {
                    type_names: TypeNames::root("Owner")
                }
            );
            assert_eq!(
                resolve_simple_type(ctx, property(&doc, "address")).unwrap(),
                SimpleType::Ref {
                    type_names: TypeNames::root("Pet").child("Address")
                }
            );
        });
    }

    #[test]
    fn test_unnamed_object_is_an_invariant_violation() {
        let doc = load_document(DOC, &ConversionOptions::default()).unwrap();
        let options = ConversionOptions::default();
        let ctx = ConversionContext::new(&doc, &options);
        let err = resolve_simple_type(&ctx, property(&doc, "address")).unwrap_err();
        assert!(matches!(err, AppError::InternalInvariant(_)));
    }
}
