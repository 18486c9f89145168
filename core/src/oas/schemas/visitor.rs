#![deny(missing_docs)]

//! # Reachability Visitor
//!
//! Walks the API surface in document order and records every schema node that a
//! client could actually encounter, together with the structural path it was
//! first reached through.
//!
//! - Each node is visited at most once (identity, not equality).
//! - A `$ref` node is followed but never recorded; the path restarts at the
//!   component name.
//! - Inline `allOf`/`anyOf` members dissolve into their parent: their contents
//!   are walked, the member itself is not recorded.
//! - Component schemas nobody reaches are dropped unless force-included.

use crate::error::{AppError, AppResult};
use crate::oas::arena::{AdditionalProperties, SchemaId};
use crate::oas::context::ConversionContext;
use crate::oas::document::{Operation, PathItem};
use crate::oas::schemas::classify::SchemaClass;
use std::collections::{HashMap, HashSet};

/// One recorded schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachableSchema {
    /// The node.
    pub id: SchemaId,
    /// Structural path of the first visit.
    pub path: Vec<String>,
    /// Classification of the node.
    pub class: SchemaClass,
}

/// Recorded schemas in first-visit order.
#[derive(Debug, Clone, Default)]
pub struct Reachability {
    entries: Vec<ReachableSchema>,
    index: HashMap<SchemaId, usize>,
}

impl Reachability {
    /// All entries in first-visit order.
    pub fn entries(&self) -> &[ReachableSchema] {
        &self.entries
    }

    /// Entry for a node, if it was recorded.
    pub fn get(&self, id: SchemaId) -> Option<&ReachableSchema> {
        self.index.get(&id).map(|&i| &self.entries[i])
    }

    /// True if the node was recorded.
    pub fn contains(&self, id: SchemaId) -> bool {
        self.index.contains_key(&id)
    }

    fn record(&mut self, entry: ReachableSchema) {
        if self.index.contains_key(&entry.id) {
            return;
        }
        self.index.insert(entry.id, self.entries.len());
        self.entries.push(entry);
    }
}

/// Collects the reachable schema set of a document.
pub fn collect_reachable(ctx: &ConversionContext<'_>) -> AppResult<Reachability> {
    let mut visitor = SchemaVisitor {
        ctx,
        visited: HashSet::new(),
        out: Reachability::default(),
    };

    for item in &ctx.document.paths {
        visitor.visit_path_item(item)?;
    }

    for (name, &id) in &ctx.document.schemas {
        let node = ctx.node(id);
        let forced = ctx.options.generate_all_named_schemas
            || node.extensions.force_include() == Some(true);
        if !forced {
            continue;
        }
        if let Some(reference) = &node.reference {
            // An explicitly kept alias becomes a named schema of its own.
            ctx.document.resolve_ref_chain(reference, &node.location)?;
            visitor.out.record(ReachableSchema {
                id,
                path: vec![name.clone()],
                class: SchemaClass::Ref,
            });
        }
        visitor.visit(id, vec![name.clone()])?;
    }

    Ok(visitor.out)
}

struct SchemaVisitor<'c, 'a> {
    ctx: &'c ConversionContext<'a>,
    visited: HashSet<SchemaId>,
    out: Reachability,
}

impl SchemaVisitor<'_, '_> {
    fn visit_path_item(&mut self, item: &PathItem) -> AppResult<()> {
        let selected: Vec<&Operation> = item
            .operations
            .iter()
            .filter(|op| op.is_selected(self.ctx.options))
            .collect();
        if selected.is_empty() {
            return Ok(());
        }

        let base: Vec<String> = item
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| s.trim_matches(|c| c == '{' || c == '}').to_string())
            .collect();
        for parameter in &item.parameters {
            if let Some(schema) = parameter.schema {
                self.visit(schema, with(&base, &parameter.name))?;
            }
        }

        for op in selected {
            self.visit_operation(&item.path, op)?;
        }
        Ok(())
    }

    fn visit_operation(&mut self, path: &str, op: &Operation) -> AppResult<()> {
        let key = vec![op.key(path)];

        for parameter in &op.parameters {
            if let Some(schema) = parameter.schema {
                self.visit(schema, with(&key, &parameter.name))?;
            }
        }
        if let Some(body) = &op.request_body {
            for media in body.content.values() {
                if let Some(schema) = media.schema {
                    self.visit(schema, with(&key, "request"))?;
                }
            }
        }
        for (code, response) in &op.responses {
            let response_path = with(&with(&key, code), "response");
            for media in response.content.values() {
                if let Some(schema) = media.schema {
                    self.visit(schema, response_path.clone())?;
                }
            }
            for (name, header) in &response.headers {
                if let Some(schema) = header.schema {
                    self.visit(schema, with(&response_path, name))?;
                }
            }
        }
        Ok(())
    }

    fn visit(&mut self, id: SchemaId, path: Vec<String>) -> AppResult<()> {
        if !self.visited.insert(id) {
            return Ok(());
        }
        let node = self.ctx.node(id);

        if let Some(reference) = &node.reference {
            let document = self.ctx.document;
            let target = document
                .resolve_ref(reference)
                .ok_or_else(|| AppError::unresolved(reference, &node.location))?;
            let name = document.component_name(reference).unwrap_or_default();
            return self.visit(target, vec![name]);
        }

        let class = self.ctx.classify(id)?;
        self.out.record(ReachableSchema {
            id,
            path: path.clone(),
            class,
        });
        self.visit_children(id, &path)
    }

    /// `allOf`/`anyOf` member: references are followed, inline members dissolve.
    fn visit_member(&mut self, id: SchemaId, path: &[String]) -> AppResult<()> {
        if self.ctx.node(id).reference.is_some() {
            return self.visit(id, path.to_vec());
        }
        if !self.visited.insert(id) {
            return Ok(());
        }
        self.ctx.classify(id)?;
        self.visit_children(id, path)
    }

    fn visit_children(&mut self, id: SchemaId, path: &[String]) -> AppResult<()> {
        let node = self.ctx.node(id);

        if let Some(items) = node.items {
            self.visit(items, with(path, "items"))?;
        }
        if let AdditionalProperties::Schema(values) = node.additional_properties {
            self.visit(values, with(path, "additionalProperties"))?;
        }
        for (index, member) in node.one_of.iter().enumerate() {
            self.visit(*member, with(path, &format!("OneOf{index}")))?;
        }
        for member in node.all_of.iter().chain(&node.any_of) {
            self.visit_member(*member, path)?;
        }
        if let Some(not) = node.not {
            self.visit(not, with(path, "not"))?;
        }
        for (name, property) in &node.properties {
            self.visit(*property, with(path, name))?;
        }
        Ok(())
    }
}

fn with(path: &[String], segment: &str) -> Vec<String> {
    let mut out = path.to_vec();
    out.push(segment.to_string());
    out
}
