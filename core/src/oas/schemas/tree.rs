#![deny(missing_docs)]

//! # Model Tree Builder
//!
//! Gives every reachable schema that needs a name its final, unique
//! [`TypeNames`] path.
//!
//! Reachable component schemas become roots under their declared name.
//! Anonymous objects, enums and unions are then attached under the object that
//! owns them as a property (or as the element of a property's arrays and maps),
//! one level per scan, until a scan places nothing.
//! Whatever is still unplaced at that point is promoted to a root named after
//! its structural path and the scan resumes.

use crate::error::{AppError, AppResult};
use crate::naming::as_type_name;
use crate::oas::arena::{AdditionalProperties, SchemaId, SchemaNode};
use crate::oas::context::ConversionContext;
use crate::oas::document::Document;
use crate::oas::models::TypeNames;
use crate::oas::normalization::own_properties;
use crate::oas::schemas::classify::{classify, SchemaClass};
use crate::oas::schemas::visitor::Reachability;
use std::collections::{HashMap, HashSet};

/// One placed schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelNode {
    /// The schema.
    pub id: SchemaId,
    /// Final name.
    pub type_names: TypeNames,
    /// Classification at placement time.
    pub class: SchemaClass,
    /// Index of the parent node, `None` for roots.
    pub parent: Option<usize>,
    /// Indices of child nodes in attachment order.
    pub children: Vec<usize>,
}

/// Hands out unique names.
///
/// A taken candidate gets `2`, `3`, ... appended to its last segment.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    taken: HashSet<TypeNames>,
}

impl NameRegistry {
    /// Reserves `candidate`, or the first free suffixed variant of it.
    pub fn claim(&mut self, candidate: TypeNames) -> TypeNames {
        if self.taken.insert(candidate.clone()) {
            return candidate;
        }
        let segments = candidate.segments();
        let (last, parent) = segments
            .split_last()
            .map(|(last, rest)| (last.as_str(), rest.to_vec()))
            .unwrap_or(("", Vec::new()));
        let mut suffix = 2usize;
        loop {
            let mut attempt = parent.clone();
            attempt.push(format!("{last}{suffix}"));
            let attempt = TypeNames::new(attempt);
            if self.taken.insert(attempt.clone()) {
                tracing::debug!("renamed '{}' to '{}'", candidate, attempt);
                return attempt;
            }
            suffix += 1;
        }
    }
}

/// Forest of named schemas.
#[derive(Debug, Clone, Default)]
pub struct ModelTree {
    nodes: Vec<ModelNode>,
    roots: Vec<usize>,
    by_schema: HashMap<SchemaId, usize>,
    by_names: HashMap<TypeNames, usize>,
    registry: NameRegistry,
}

impl ModelTree {
    /// All nodes in placement order.
    pub fn nodes(&self) -> &[ModelNode] {
        &self.nodes
    }

    /// Node by index.
    pub fn node(&self, index: usize) -> &ModelNode {
        &self.nodes[index]
    }

    /// Root indices in order.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Index of the node placed for a schema.
    pub fn index_of(&self, id: SchemaId) -> Option<usize> {
        self.by_schema.get(&id).copied()
    }

    /// Index of the node with the given name.
    pub fn find(&self, names: &TypeNames) -> Option<usize> {
        self.by_names.get(names).copied()
    }

    /// Name of the node placed for a schema.
    pub fn type_names(&self, id: SchemaId) -> Option<&TypeNames> {
        self.index_of(id).map(|i| &self.nodes[i].type_names)
    }

    /// True if the schema has a node.
    pub fn contains(&self, id: SchemaId) -> bool {
        self.by_schema.contains_key(&id)
    }

    /// True if `ancestor` is `index` or one of its parents.
    pub fn is_ancestor(&self, ancestor: usize, index: usize) -> bool {
        let mut current = Some(index);
        while let Some(i) = current {
            if i == ancestor {
                return true;
            }
            current = self.nodes[i].parent;
        }
        false
    }

    /// Detaches a root and appends it to `parent`'s children. Names are unchanged.
    pub fn move_under(&mut self, index: usize, parent: usize) -> AppResult<()> {
        if self.nodes[index].parent.is_some() {
            return Err(AppError::InternalInvariant(format!(
                "'{}' is already nested",
                self.nodes[index].type_names
            )));
        }
        if self.is_ancestor(index, parent) {
            return Err(AppError::InternalInvariant(format!(
                "'{}' cannot be nested under its own descendant",
                self.nodes[index].type_names
            )));
        }
        self.roots.retain(|&r| r != index);
        self.nodes[index].parent = Some(parent);
        self.nodes[parent].children.push(index);
        Ok(())
    }

    /// Places a schema. Inline `oneOf` members of a union come along as `OneOf<i>` children.
    fn add(
        &mut self,
        document: &Document,
        id: SchemaId,
        candidate: TypeNames,
        class: SchemaClass,
        parent: Option<usize>,
    ) -> AppResult<usize> {
        let type_names = self.registry.claim(candidate);
        let index = self.nodes.len();
        self.nodes.push(ModelNode {
            id,
            type_names: type_names.clone(),
            class,
            parent,
            children: Vec::new(),
        });
        self.by_schema.insert(id, index);
        self.by_names.insert(type_names.clone(), index);
        match parent {
            Some(p) => self.nodes[p].children.push(index),
            None => self.roots.push(index),
        }

        if class == SchemaClass::Sealed {
            for (i, member) in document.arena[id].one_of.iter().enumerate() {
                let node = &document.arena[*member];
                if node.reference.is_some() || self.contains(*member) {
                    continue;
                }
                let member_class = classify(node)?;
                self.add(
                    document,
                    *member,
                    type_names.child(format!("OneOf{i}")),
                    member_class,
                    Some(index),
                )?;
            }
        }
        Ok(index)
    }

    /// Finds the placed object owning `id` as a property value, or as the element
    /// of a property's array/map chain (one `Item` suffix per container level).
    fn owner_of(&self, document: &Document, id: SchemaId) -> Option<(usize, String)> {
        for (index, node) in self.nodes.iter().enumerate() {
            if node.class != SchemaClass::Object {
                continue;
            }
            for (name, property) in own_properties(document, node.id) {
                let mut segment = as_type_name(&name);
                let mut current = property;
                loop {
                    if current == id {
                        return Some((index, segment));
                    }
                    match container_element(&document.arena[current]) {
                        Some(element) => {
                            segment.push_str("Item");
                            current = element;
                        }
                        None => break,
                    }
                }
            }
        }
        None
    }
}

/// Element schema of an inline array or map.
fn container_element(node: &SchemaNode) -> Option<SchemaId> {
    if node.reference.is_some() {
        return None;
    }
    match node.additional_properties {
        AdditionalProperties::Schema(values) => Some(values),
        _ => node.items,
    }
}

/// Builds the model tree for the reachable set.
pub fn build_model_tree(
    ctx: &ConversionContext<'_>,
    reachable: &Reachability,
) -> AppResult<ModelTree> {
    let document = ctx.document;
    let mut tree = ModelTree::default();

    for (name, &id) in &document.schemas {
        match reachable.get(id) {
            Some(entry) => {
                if !tree.contains(id) {
                    tree.add(document, id, TypeNames::root(as_type_name(name)), entry.class, None)?;
                }
            }
            None => tracing::debug!("remove unused schema '{}'", name),
        }
    }

    loop {
        let mut placed = false;
        for entry in reachable.entries() {
            if !entry.class.needs_name() || tree.contains(entry.id) {
                continue;
            }
            if let Some((parent, segment)) = tree.owner_of(document, entry.id) {
                let candidate = tree.nodes[parent].type_names.child(segment);
                tree.add(document, entry.id, candidate, entry.class, Some(parent))?;
                placed = true;
            }
        }
        if placed {
            continue;
        }

        let leftover = reachable
            .entries()
            .iter()
            .find(|e| e.class.needs_name() && !tree.contains(e.id));
        match leftover {
            Some(entry) => {
                let name = as_type_name(&entry.path.join(" "));
                tracing::debug!("promote anonymous schema at {} to '{}'", document.arena[entry.id].location, name);
                tree.add(document, entry.id, TypeNames::root(name), entry.class, None)?;
            }
            None => break,
        }
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use crate::oas::document::load_document;
    use crate::oas::schemas::visitor::collect_reachable;

    fn build(yaml: &str) -> (Document, ModelTree) {
        let options = ConversionOptions::default();
        let doc = load_document(yaml, &options).unwrap();
        let tree = {
            let ctx = ConversionContext::new(&doc, &options);
            let reachable = collect_reachable(&ctx).unwrap();
            build_model_tree(&ctx, &reachable).unwrap()
        };
        (doc, tree)
    }

    fn names(tree: &ModelTree) -> Vec<String> {
        tree.nodes()
            .iter()
            .map(|n| n.type_names.to_string())
            .collect()
    }

    #[test]
    fn test_name_registry_suffixes() {
        let mut registry = NameRegistry::default();
        assert_eq!(registry.claim(TypeNames::root("Pet")), TypeNames::root("Pet"));
        assert_eq!(registry.claim(TypeNames::root("Pet")), TypeNames::root("Pet2"));
        assert_eq!(registry.claim(TypeNames::root("Pet")), TypeNames::root("Pet3"));
        let nested = TypeNames::root("Pet").child("Owner");
        assert_eq!(registry.claim(nested.clone()), nested);
        assert_eq!(
            registry.claim(nested),
            TypeNames::root("Pet").child("Owner2")
        );
    }

    #[test]
    fn test_nested_anonymous_objects_reach_fixpoint() {
        let (doc, tree) = build(
            r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths:
  /a:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/A'}
components:
  schemas:
    A:
      type: object
      properties:
        b:
          type: object
          properties:
            c:
              type: object
              properties:
                leaf: {type: string}
"#,
        );
        assert_eq!(names(&tree), vec!["A", "A.B", "A.B.C"]);
        let a = tree.index_of(doc.schemas["A"]).unwrap();
        let b = tree.node(a).children[0];
        let c = tree.node(b).children[0];
        assert_eq!(tree.node(c).parent, Some(b));
        assert_eq!(tree.node(c).type_names.joined(), "ABC");
        assert_eq!(tree.roots(), &[a]);
    }

    #[test]
    fn test_array_items_and_leftovers() {
        let (_, tree) = build(
            r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths:
  /orders:
    post:
      operationId: createOrder
      requestBody:
        content:
          application/json:
            schema:
              type: object
              properties:
                lines:
                  type: array
                  items:
                    type: object
                    properties:
                      sku: {type: string}
                status:
                  type: string
                  enum: [open, closed]
      responses:
        '204':
          description: none
"#,
        );
        assert_eq!(
            names(&tree),
            vec![
                "CreateOrderRequest",
                "CreateOrderRequest.LinesItem",
                "CreateOrderRequest.Status"
            ]
        );
    }

    #[test]
    fn test_container_elements_are_nested_with_item_suffix() {
        let (_, tree) = build(
            r#"
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
          items:
            type: object
            properties:
              label: {type: string}
        attrs:
          type: object
          additionalProperties:
            type: object
            properties:
              value: {type: string}
        matrix:
          type: array
          items:
            type: array
            items:
              type: object
              properties:
                cell: {type: integer}
"#,
        );
        assert_eq!(
            names(&tree),
            vec!["Pet", "Pet.TagsItem", "Pet.AttrsItem", "Pet.MatrixItemItem"]
        );
        assert_eq!(tree.roots().len(), 1);
    }

    #[test]
    fn test_union_members_attach_as_one_of_children() {
        let (_, tree) = build(
            r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths:
  /shapes:
    get:
      responses:
        '200':
          description: ok
          content:
            application/json:
              schema: {$ref: '#/components/schemas/Shape'}
components:
  schemas:
    Circle:
      type: object
      properties:
        radius: {type: number}
    Shape:
      oneOf:
        - $ref: '#/components/schemas/Circle'
        - type: object
          properties:
            side: {type: number}
            corner:
              type: object
              properties:
                x: {type: number}
"#,
        );
        assert_eq!(
            names(&tree),
            vec!["Circle", "Shape", "Shape.OneOf1", "Shape.OneOf1.Corner"]
        );
    }

    #[test]
    fn test_colliding_property_names_are_suffixed() {
        let (_, tree) = build(
            r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    Pet:
      type: object
      x-kgen-force-create: true
      properties:
        owner_info:
          type: object
          properties:
            a: {type: string}
        ownerInfo:
          type: object
          properties:
            b: {type: string}
"#,
        );
        assert_eq!(names(&tree), vec!["Pet", "Pet.OwnerInfo", "Pet.OwnerInfo2"]);
    }

    #[test]
    fn test_move_under_rejects_cycles() {
        let (doc, mut tree) = build(
            r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    A:
      type: object
      x-kgen-force-create: true
      properties:
        b:
          type: object
          properties:
            x: {type: string}
    C:
      type: object
      x-kgen-force-create: true
      properties:
        y: {type: string}
"#,
        );
        let a = tree.index_of(doc.schemas["A"]).unwrap();
        let c = tree.index_of(doc.schemas["C"]).unwrap();
        let b = tree.node(a).children[0];
        assert!(tree.move_under(a, b).is_err());
        tree.move_under(c, a).unwrap();
        assert_eq!(tree.roots(), &[a]);
        assert_eq!(tree.node(c).type_names, TypeNames::root("C"));
        assert!(tree.move_under(c, b).is_err());
    }
}
