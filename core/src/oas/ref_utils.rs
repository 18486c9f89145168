#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Helpers for decoding local `$ref` pointers of the form
//! `#/components/{section}/{name}`. External documents are never fetched, so any
//! reference with a document part is treated as unresolvable.

use percent_encoding::percent_decode_str;

/// Section holding reusable Schema Objects.
pub(crate) const SCHEMAS: &str = "schemas";
/// Section holding reusable Parameter Objects.
pub(crate) const PARAMETERS: &str = "parameters";
/// Section holding reusable Request Body Objects.
pub(crate) const REQUEST_BODIES: &str = "requestBodies";
/// Section holding reusable Response Objects.
pub(crate) const RESPONSES: &str = "responses";
/// Section holding reusable Header Objects.
pub(crate) const HEADERS: &str = "headers";

/// Extracts a component name from a `$ref` if it points to `#/components/{section}/{name}`.
///
/// Returns `None` for external references, other sections, and pointers that
/// reach inside a component.
pub(crate) fn extract_component_name(ref_str: &str, section: &str) -> Option<String> {
    let pointer = ref_str.strip_prefix("#/")?;
    let segments: Vec<&str> = pointer.split('/').collect();

    if segments.len() != 3 {
        return None;
    }
    if segments[0] != "components" || segments[1] != section {
        return None;
    }

    let name = decode_pointer_segment(segments[2]);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Decodes a JSON Pointer segment (handles `~1` and `~0`).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_component_name_success() {
        let name = extract_component_name("#/components/parameters/Limit", PARAMETERS).unwrap();
        assert_eq!(name, "Limit");
    }

    #[test]
    fn test_extract_component_name_wrong_section() {
        let name = extract_component_name("#/components/responses/Limit", PARAMETERS);
        assert!(name.is_none());
    }

    #[test]
    fn test_external_reference_is_rejected() {
        let name = extract_component_name("other.yaml#/components/schemas/Pet", SCHEMAS);
        assert!(name.is_none());
    }

    #[test]
    fn test_nested_pointer_is_rejected() {
        let name = extract_component_name("#/components/schemas/Pet/properties/id", SCHEMAS);
        assert!(name.is_none());
    }

    #[test]
    fn test_decode_pointer_segment_percent_encoding() {
        let encoded = "User%20Profile~1details";
        let decoded = decode_pointer_segment(encoded);
        assert_eq!(decoded, "User Profile/details");
    }

    #[test]
    fn test_escaped_schema_name() {
        let name = extract_component_name("#/components/schemas/a~1b", SCHEMAS);
        assert_eq!(name.as_deref(), Some("a/b"));
    }
}
