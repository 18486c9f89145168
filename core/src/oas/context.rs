#![deny(missing_docs)]

//! # Conversion Context
//!
//! State of one conversion run, threaded explicitly through every stage. Nothing
//! here is shared between runs.

use crate::config::ConversionOptions;
use crate::error::{AppError, AppResult};
use crate::oas::arena::{SchemaId, SchemaNode};
use crate::oas::document::Document;
use crate::oas::models::TypeNames;
use crate::oas::schemas::classify::{classify, SchemaClass};
use crate::oas::schemas::tree::ModelTree;
use crate::oas::schemas::unions::UnionResolution;

/// Document, options, and the naming tables built so far.
pub struct ConversionContext<'a> {
    /// The loaded document.
    pub document: &'a Document,
    /// Run options.
    pub options: &'a ConversionOptions,
    /// Placement of every named schema.
    pub tree: ModelTree,
    /// Discriminator data for every sealed node.
    pub unions: UnionResolution,
}

impl<'a> ConversionContext<'a> {
    /// Starts a run with empty naming tables.
    pub fn new(document: &'a Document, options: &'a ConversionOptions) -> Self {
        Self {
            document,
            options,
            tree: ModelTree::default(),
            unions: UnionResolution::default(),
        }
    }

    /// Schema node by id.
    pub fn node(&self, id: SchemaId) -> &'a SchemaNode {
        &self.document.arena[id]
    }

    /// Classifies a schema node.
    pub fn classify(&self, id: SchemaId) -> AppResult<SchemaClass> {
        classify(self.node(id))
    }

    /// Name assigned by the tree builder, if any.
    pub fn type_names(&self, id: SchemaId) -> Option<&TypeNames> {
        self.tree.type_names(id)
    }

    /// Follows a `$ref` (and component aliases) to the first named schema.
    ///
    /// Unknown targets and alias cycles fail before any name is looked up.
    pub fn resolve_named_ref(&self, reference: &str, location: &str) -> AppResult<TypeNames> {
        self.document.resolve_ref_chain(reference, location)?;

        let mut current = reference.to_string();
        loop {
            let id = self
                .document
                .resolve_ref(&current)
                .ok_or_else(|| AppError::unresolved(&current, location))?;
            if let Some(names) = self.type_names(id) {
                return Ok(names.clone());
            }
            match &self.node(id).reference {
                Some(next) => current = next.clone(),
                None => {
                    return Err(AppError::InternalInvariant(format!(
                        "'{current}' referenced at {location} was never named"
                    )))
                }
            }
        }
    }
}
