#![deny(missing_docs)]

//! # Union Resolver
//!
//! Resolves the discriminator tag of every `oneOf` member of every placed union.
//!
//! A referenced member takes the tag of the mapping entry pointing at it, or its
//! declared component name. It is then nested under the first union that
//! claims it. An inline member is already a `OneOf<i>` child of its union and is
//! tagged with its joined name.

use crate::error::{AppError, AppResult};
use crate::oas::context::ConversionContext;
use crate::oas::models::{SealedVariant, TypeNames};
use crate::oas::ref_utils::{extract_component_name, SCHEMAS};
use crate::oas::schemas::classify::SchemaClass;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Discriminator property used when the union declares none.
pub const DEFAULT_DISCRIMINATOR: &str = "type";

/// Resolved discriminator data of one union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedResolution {
    /// Property carrying the tag.
    pub discriminator_field: String,
    /// One entry per `oneOf` member, in order.
    pub variants: Vec<SealedVariant>,
}

/// Discriminator data for every union of a run.
#[derive(Debug, Clone, Default)]
pub struct UnionResolution {
    /// Keyed by model tree node index.
    pub sealed: HashMap<usize, SealedResolution>,
    /// Tag of each referenced variant.
    pub serial_names: IndexMap<TypeNames, String>,
    /// Unions each variant belongs to.
    pub interfaces: IndexMap<TypeNames, Vec<TypeNames>>,
}

/// Resolves all unions placed in `ctx.tree`, nesting referenced variants.
pub fn resolve_unions(ctx: &mut ConversionContext<'_>) -> AppResult<UnionResolution> {
    let document = ctx.document;
    let mut out = UnionResolution::default();

    let sealed: Vec<usize> = ctx
        .tree
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, n)| n.class == SchemaClass::Sealed)
        .map(|(i, _)| i)
        .collect();

    for index in sealed {
        let union_names = ctx.tree.node(index).type_names.clone();
        let node = ctx.node(ctx.tree.node(index).id);
        let (discriminator_field, mapping) = match &node.discriminator {
            Some(d) => (
                d.property_name
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DISCRIMINATOR.to_string()),
                d.mapping.clone(),
            ),
            None => (DEFAULT_DISCRIMINATOR.to_string(), IndexMap::new()),
        };

        let mut tags = HashSet::new();
        let mut variants = Vec::with_capacity(node.one_of.len());

        for member in &node.one_of {
            let member_node = ctx.node(*member);
            let variant = match &member_node.reference {
                Some(reference) => {
                    let type_names = ctx.resolve_named_ref(reference, &member_node.location)?;
                    let declared = document
                        .component_name(reference)
                        .ok_or_else(|| AppError::unresolved(reference, &member_node.location))?;
                    let tag = mapping_tag(&mapping, reference, &declared).unwrap_or(declared);

                    out.serial_names
                        .entry(type_names.clone())
                        .or_insert_with(|| tag.clone());
                    nest_variant(ctx, &type_names, index)?;
                    SealedVariant { tag, type_names }
                }
                None => {
                    let type_names = ctx.type_names(*member).cloned().ok_or_else(|| {
                        AppError::InternalInvariant(format!(
                            "inline member at {} of '{}' was never named",
                            member_node.location, union_names
                        ))
                    })?;
                    SealedVariant {
                        tag: type_names.joined(),
                        type_names,
                    }
                }
            };

            if !tags.insert(variant.tag.clone()) {
                return Err(AppError::DuplicateDiscriminatorTag {
                    schema: union_names.joined(),
                    tag: variant.tag,
                });
            }
            out.interfaces
                .entry(variant.type_names.clone())
                .or_default()
                .push(union_names.clone());
            variants.push(variant);
        }

        out.sealed.insert(
            index,
            SealedResolution {
                discriminator_field,
                variants,
            },
        );
    }

    Ok(out)
}

/// First mapping entry pointing at the member, by full reference or by component name.
fn mapping_tag(mapping: &IndexMap<String, String>, reference: &str, declared: &str) -> Option<String> {
    mapping
        .iter()
        .find(|(_, target)| {
            target.as_str() == reference
                || target.as_str() == declared
                || extract_component_name(target, SCHEMAS).as_deref() == Some(declared)
        })
        .map(|(tag, _)| tag.clone())
}

/// Moves a top-level variant under the union, unless that would create a cycle.
fn nest_variant(ctx: &mut ConversionContext<'_>, variant: &TypeNames, union: usize) -> AppResult<()> {
    let Some(index) = ctx.tree.find(variant) else {
        return Err(AppError::InternalInvariant(format!(
            "variant '{variant}' has no tree node"
        )));
    };
    if ctx.tree.node(index).parent.is_some() || ctx.tree.is_ancestor(index, union) {
        return Ok(());
    }
    tracing::debug!("nest variant '{}' under '{}'", variant, ctx.tree.node(union).type_names);
    ctx.tree.move_under(index, union)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use crate::oas::document::{load_document, Document};
    use crate::oas::schemas::tree::build_model_tree;
    use crate::oas::schemas::visitor::collect_reachable;
    use pretty_assertions::assert_eq;

    fn resolve(doc: &Document) -> AppResult<(UnionResolution, Vec<String>)> {
        let options = ConversionOptions::default().with_generate_all_named_schemas(true);
        let mut ctx = ConversionContext::new(doc, &options);
        let reachable = collect_reachable(&ctx)?;
        ctx.tree = build_model_tree(&ctx, &reachable)?;
        let unions = resolve_unions(&mut ctx)?;
        let roots = ctx
            .tree
            .roots()
            .iter()
            .map(|&r| ctx.tree.node(r).type_names.to_string())
            .collect();
        Ok((unions, roots))
    }

    const PETS: &str = r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    Cat:
      type: object
      properties:
        lives: {type: integer}
    Dog:
      type: object
      properties:
        bark: {type: string}
    Pet:
      oneOf:
        - $ref: '#/components/schemas/Cat'
        - $ref: '#/components/schemas/Dog'
        - type: object
          properties:
            wings: {type: integer}
      discriminator:
        propertyName: petType
        mapping:
          kitty: '#/components/schemas/Cat'
"#;

    #[test]
    fn test_mapping_and_fallback_tags() {
        let doc = load_document(PETS, &ConversionOptions::default()).unwrap();
        let (unions, roots) = resolve(&doc).unwrap();
        let pet = unions.sealed.values().next().unwrap();

        assert_eq!(pet.discriminator_field, "petType");
        let tags: Vec<&str> = pet.variants.iter().map(|v| v.tag.as_str()).collect();
        assert_eq!(tags, vec!["kitty", "Dog", "PetOneOf2"]);
        assert_eq!(roots, vec!["Pet"]);

        assert_eq!(unions.serial_names[&TypeNames::root("Cat")], "kitty");
        assert_eq!(unions.serial_names[&TypeNames::root("Dog")], "Dog");
        assert!(!unions
            .serial_names
            .contains_key(&TypeNames::root("Pet").child("OneOf2")));
        assert_eq!(
            unions.interfaces[&TypeNames::root("Cat")],
            vec![TypeNames::root("Pet")]
        );
    }

    #[test]
    fn test_default_discriminator_field() {
        let yaml = r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    A:
      type: object
      properties:
        a: {type: string}
    U:
      oneOf:
        - $ref: '#/components/schemas/A'
"#;
        let doc = load_document(yaml, &ConversionOptions::default()).unwrap();
        let (unions, _) = resolve(&doc).unwrap();
        let u = unions.sealed.values().next().unwrap();
        assert_eq!(u.discriminator_field, DEFAULT_DISCRIMINATOR);
        assert_eq!(u.variants.len(), 1);
    }

    #[test]
    fn test_duplicate_tag_is_rejected() {
        let yaml = r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    A:
      type: object
      properties:
        a: {type: string}
    B:
      type: object
      properties:
        b: {type: string}
    U:
      oneOf:
        - $ref: '#/components/schemas/A'
        - $ref: '#/components/schemas/B'
      discriminator:
        propertyName: kind
        mapping:
          B: '#/components/schemas/A'
"#;
        let doc = load_document(yaml, &ConversionOptions::default()).unwrap();
        match resolve(&doc) {
            Err(AppError::DuplicateDiscriminatorTag { schema, tag }) => {
                assert_eq!(schema, "U");
                assert_eq!(tag, "B");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_shared_variant_nests_under_first_union() {
        let yaml = r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    A:
      type: object
      properties:
        a: {type: string}
    First:
      oneOf:
        - $ref: '#/components/schemas/A'
    Second:
      oneOf:
        - $ref: '#/components/schemas/A'
"#;
        let doc = load_document(yaml, &ConversionOptions::default()).unwrap();
        let (unions, roots) = resolve(&doc).unwrap();
        assert_eq!(roots, vec!["First", "Second"]);
        assert_eq!(
            unions.interfaces[&TypeNames::root("A")],
            vec![TypeNames::root("First"), TypeNames::root("Second")]
        );
    }
}
