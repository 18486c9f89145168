#![deny(missing_docs)]

//! # Model Dump
//!
//! Human readable summary of a converted model, logged in verbose mode.

use crate::oas::models::{NamedSchema, SchemaKind, SpecModel};
use std::fmt::Write;

impl SpecModel {
    /// Renders named aliases, the schema tree and the selected APIs.
    pub fn dump(&self) -> String {
        let mut out = String::new();

        let sections: [(&str, fn(&SchemaKind) -> bool); 4] = [
            ("Named Primitives", |k| matches!(k, SchemaKind::Primitive { .. })),
            ("Named Arrays", |k| matches!(k, SchemaKind::Array { .. })),
            ("Named Maps", |k| matches!(k, SchemaKind::Map { .. })),
            ("Enums", |k| matches!(k, SchemaKind::Enum { .. })),
        ];
        for (title, accepts) in sections {
            let matching: Vec<&NamedSchema> = self
                .all_schemas()
                .into_iter()
                .filter(|s| accepts(&s.kind))
                .collect();
            if matching.is_empty() {
                continue;
            }
            let _ = writeln!(out, "### {title} ###");
            for schema in matching {
                let _ = writeln!(out, "\t{}", schema.type_names);
            }
            let _ = writeln!(out);
        }

        let tree: Vec<&NamedSchema> = self
            .schemas
            .iter()
            .filter(|s| matches!(s.kind, SchemaKind::Object { .. } | SchemaKind::Sealed { .. }))
            .collect();
        if !tree.is_empty() {
            let _ = writeln!(out, "### Object Tree ###");
            for schema in tree {
                write_tree(&mut out, schema, 1);
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(out, "### Selected APIs ###");
        for api in &self.apis {
            let _ = writeln!(out, "{}", api.name);
            for op in &api.operations {
                let _ = writeln!(out, "\t{} {} -> {}", op.method, op.path, op.name);
            }
        }
        out
    }
}

fn write_tree(out: &mut String, schema: &NamedSchema, depth: usize) {
    let marker = match &schema.kind {
        SchemaKind::Sealed { variants, .. } => format!(" (oneOf: {})", variants.len()),
        _ => String::new(),
    };
    let _ = writeln!(
        out,
        "{}{}{}",
        "\t".repeat(depth),
        schema.type_names.last(),
        marker
    );
    for child in schema.children() {
        write_tree(out, child, depth + 1);
    }
}
