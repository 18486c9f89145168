#![deny(missing_docs)]

//! # Spec IR Core
//!
//! Converts an OpenAPI 3.x document into a resolved, uniquely named
//! intermediate model that a client code emitter can consume directly.

/// Shared error types.
pub mod error;

/// Conversion options.
pub mod config;

/// Identifier case conversion.
pub mod naming;

/// OpenAPI (OAS) loading and conversion.
pub mod oas;

pub use config::ConversionOptions;
pub use error::{AppError, AppResult};
pub use oas::{
    convert, convert_at, convert_str, load_document, Document, NamedSchema, SchemaKind,
    SimpleType, SpecModel, TypeNames,
};
