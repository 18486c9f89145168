#![deny(missing_docs)]

//! # Identifier Naming
//!
//! Case conversion for the identifiers stored in the model. The emitter relies on
//! these being valid identifiers, so a leading digit gets an `_` prefix.

use heck::{ToLowerCamelCase, ToUpperCamelCase};

/// `pet-store item` -> `PetStoreItem`.
pub fn as_type_name(raw: &str) -> String {
    guard_leading_digit(raw.to_upper_camel_case())
}

/// `pet_id` -> `petId`.
pub fn as_field_name(raw: &str) -> String {
    guard_leading_digit(raw.to_lower_camel_case())
}

/// `GET /pets/{id}` -> `getPetsId`.
pub fn as_function_name(raw: &str) -> String {
    as_field_name(raw)
}

fn guard_leading_digit(name: String) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}
