#![deny(missing_docs)]

//! # OpenAPI Conversion Module
//!
//! - **document**: tolerant loader producing an interned schema arena.
//! - **schemas**: classification, reachability, naming and unions.
//! - **resolver**: operations, payloads and the final [`SpecModel`].
//! - **models**: the Intermediate Representation handed to emitters.

pub mod arena;
pub mod context;
pub mod document;
pub mod dump;
pub mod extensions;
pub mod header;
pub mod models;
pub mod normalization;
pub mod ref_utils;
pub mod resolver;
pub mod schemas;
pub mod servers;
pub mod shims;

pub use arena::{SchemaArena, SchemaId, SchemaNode};
pub use context::ConversionContext;
pub use document::{load_document, Document};
pub use models::{
    is_nullable, NamedSchema, SchemaKind, SimpleType, SpecApi, SpecModel, SpecOperation,
    TypeNames,
};
pub use resolver::{convert, convert_at, convert_str};
