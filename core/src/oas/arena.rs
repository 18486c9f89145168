#![deny(missing_docs)]

//! # Schema Arena
//!
//! Every Schema Object occurrence in the document is interned exactly once and
//! addressed by a [`SchemaId`]. Identity is the index: two structurally equal
//! schemas written at different places get different ids, and a shared component
//! (parameter, response, ...) keeps one id wherever it is used.

use crate::oas::extensions::SchemaExtensions;
use crate::oas::shims::{ShimAdditionalProperties, ShimDiscriminator, ShimSchema};
use indexmap::IndexMap;
use serde_json::Value;
use std::ops::Index;

/// Stable index of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub usize);

/// The `additionalProperties` keyword after interning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdditionalProperties {
    /// Not specified.
    #[default]
    Absent,
    /// `true` or `false`.
    Allowed(bool),
    /// A value schema.
    Schema(SchemaId),
}

/// Discriminator of a `oneOf` schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discriminator {
    /// Property carrying the tag.
    pub property_name: Option<String>,
    /// Tag -> target reference.
    pub mapping: IndexMap<String, String>,
}

/// One interned Schema Object.
#[derive(Debug, Clone, Default)]
pub struct SchemaNode {
    /// JSON pointer of the occurrence, e.g. `#/components/schemas/Pet/properties/tag`.
    pub location: String,
    /// Component name when this node is the root of `components.schemas.<name>`.
    pub component_name: Option<String>,
    /// `$ref`
    pub reference: Option<String>,
    /// Declared types in order.
    pub types: Vec<String>,
    /// `format`
    pub format: Option<String>,
    /// `nullable` (also set by `type: [.., "null"]`).
    pub nullable: Option<bool>,
    /// `description`
    pub description: Option<String>,
    /// `deprecated`
    pub deprecated: bool,
    /// `enum`
    pub enum_values: Vec<Value>,
    /// `items`
    pub items: Option<SchemaId>,
    /// `additionalProperties`
    pub additional_properties: AdditionalProperties,
    /// `properties` in declaration order.
    pub properties: IndexMap<String, SchemaId>,
    /// `required`
    pub required: Vec<String>,
    /// `allOf`
    pub all_of: Vec<SchemaId>,
    /// `anyOf`
    pub any_of: Vec<SchemaId>,
    /// `oneOf`
    pub one_of: Vec<SchemaId>,
    /// `not`
    pub not: Option<SchemaId>,
    /// `discriminator`
    pub discriminator: Option<Discriminator>,
    /// `example`
    pub example: Option<Value>,
    /// `examples`
    pub examples: Vec<Value>,
    /// Recognized vendor extensions.
    pub extensions: SchemaExtensions,
}

impl SchemaNode {
    /// Description followed by example lines, or `None` if all are absent.
    pub fn full_description(&self) -> Option<String> {
        let mut lines = Vec::new();
        if let Some(description) = &self.description {
            lines.push(description.clone());
        }
        if let Some(example) = &self.example {
            lines.push(format!("Example: {}", render_example(example)));
        }
        if !self.examples.is_empty() {
            let rendered: Vec<String> = self.examples.iter().map(render_example).collect();
            lines.push(format!("Examples:\n\t{}", rendered.join("\n\t")));
        }
        let joined = lines.join("\n");
        if joined.trim().is_empty() {
            None
        } else {
            Some(joined)
        }
    }
}

fn render_example(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Owner of all schema nodes of one document.
#[derive(Debug, Clone, Default)]
pub struct SchemaArena {
    nodes: Vec<SchemaNode>,
}

impl SchemaArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of interned nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing has been interned.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up a node.
    pub fn get(&self, id: SchemaId) -> Option<&SchemaNode> {
        self.nodes.get(id.0)
    }

    /// Mutable access, used to tag component roots.
    pub fn get_mut(&mut self, id: SchemaId) -> Option<&mut SchemaNode> {
        self.nodes.get_mut(id.0)
    }

    /// Interns `shim` and all nested schemas depth first.
    ///
    /// Extension problems are appended to `diagnostics`.
    pub fn intern(
        &mut self,
        shim: ShimSchema,
        location: &str,
        diagnostics: &mut Vec<String>,
    ) -> SchemaId {
        let id = SchemaId(self.nodes.len());
        self.nodes.push(SchemaNode::default());

        let extensions = SchemaExtensions::from_raw(&shim.extensions, location, diagnostics);
        let types = shim
            .schema_type
            .as_ref()
            .map(|t| t.names())
            .unwrap_or_default();

        let items = shim
            .items
            .map(|items| self.intern(*items, &format!("{location}/items"), diagnostics));
        let additional_properties = match shim.additional_properties {
            None => AdditionalProperties::Absent,
            Some(ShimAdditionalProperties::Allowed(flag)) => AdditionalProperties::Allowed(flag),
            Some(ShimAdditionalProperties::Schema(schema)) => AdditionalProperties::Schema(
                self.intern(*schema, &format!("{location}/additionalProperties"), diagnostics),
            ),
        };
        let properties = shim
            .properties
            .unwrap_or_default()
            .into_iter()
            .map(|(name, schema)| {
                let pointer = format!("{location}/properties/{}", escape_pointer(&name));
                let child = self.intern(schema, &pointer, diagnostics);
                (name, child)
            })
            .collect();
        let all_of = self.intern_list(shim.all_of, location, "allOf", diagnostics);
        let any_of = self.intern_list(shim.any_of, location, "anyOf", diagnostics);
        let one_of = self.intern_list(shim.one_of, location, "oneOf", diagnostics);
        let not = shim
            .not
            .map(|not| self.intern(*not, &format!("{location}/not"), diagnostics));

        let examples = match shim.examples {
            Some(Value::Array(values)) => values,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![other],
        };

        self.nodes[id.0] = SchemaNode {
            location: location.to_string(),
            component_name: None,
            reference: shim.reference,
            types,
            format: shim.format,
            nullable: shim.nullable,
            description: shim.description,
            deprecated: shim.deprecated.unwrap_or(false),
            enum_values: shim.enum_values.unwrap_or_default(),
            items,
            additional_properties,
            properties,
            required: shim.required.unwrap_or_default(),
            all_of,
            any_of,
            one_of,
            not,
            discriminator: shim.discriminator.map(convert_discriminator),
            example: shim.example,
            examples,
            extensions,
        };
        id
    }

    fn intern_list(
        &mut self,
        schemas: Option<Vec<ShimSchema>>,
        location: &str,
        keyword: &str,
        diagnostics: &mut Vec<String>,
    ) -> Vec<SchemaId> {
        schemas
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, schema)| {
                self.intern(schema, &format!("{location}/{keyword}/{index}"), diagnostics)
            })
            .collect()
    }
}

impl Index<SchemaId> for SchemaArena {
    type Output = SchemaNode;

    fn index(&self, id: SchemaId) -> &SchemaNode {
        &self.nodes[id.0]
    }
}

fn convert_discriminator(shim: ShimDiscriminator) -> Discriminator {
    Discriminator {
        property_name: shim.property_name,
        mapping: shim.mapping,
    }
}

/// Encodes one JSON pointer segment (`~` -> `~0`, `/` -> `~1`).
pub(crate) fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
