//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Every conversion failure aborts the whole run. Variants carry the document
//! location (a JSON pointer) or the schema path that triggered them.

use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Only `std::io::Error` converts implicitly; every pipeline error is built explicitly.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The input document is malformed.
    #[from(ignore)]
    #[display("Document Parse Error: {_0}")]
    DocumentParse(String),

    /// A `$ref` does not point at a known component.
    #[from(ignore)]
    #[display("Unresolved Reference: '{reference}' at {location}")]
    UnresolvedReference {
        /// The reference string as written in the document.
        reference: String,
        /// Where the reference was found.
        location: String,
    },

    /// A schema (or security scheme) that cannot be mapped onto the model.
    #[from(ignore)]
    #[display("Unsupported Schema at {location}: {reason}")]
    UnsupportedSchema {
        /// Where the offending fragment lives.
        location: String,
        /// Human readable explanation.
        reason: String,
    },

    /// Two variants of one union resolved to the same discriminator tag.
    #[from(ignore)]
    #[display("Duplicate discriminator tag '{tag}' in {schema}")]
    DuplicateDiscriminatorTag {
        /// Joined type name of the union.
        schema: String,
        /// The clashing tag.
        tag: String,
    },

    /// A pipeline stage produced a state a later stage cannot handle.
    #[from(ignore)]
    #[display("Internal Invariant Violation: {_0}")]
    InternalInvariant(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Builds an [`AppError::UnresolvedReference`].
    pub fn unresolved(reference: impl Into<String>, location: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
            location: location.into(),
        }
    }

    /// Builds an [`AppError::UnsupportedSchema`].
    pub fn unsupported(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedSchema {
            location: location.into(),
            reason: reason.into(),
        }
    }
}
