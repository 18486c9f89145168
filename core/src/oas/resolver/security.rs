#![deny(missing_docs)]

//! # Security Resolution
//!
//! Declared schemes with an unsupported type are left out of the scheme table
//! without complaint. An operation that requires one of them fails.

use crate::error::{AppError, AppResult};
use crate::naming::as_type_name;
use crate::oas::arena::escape_pointer;
use crate::oas::document::{Document, Operation};
use crate::oas::models::{SecurityScheme, SecuritySchemeType};
use crate::oas::shims::ShimSecurityScheme;
use indexmap::IndexSet;

/// Maps a declared scheme onto a supported flavour.
///
/// `apiKey` in a header, query or cookie, and `http` with `basic` or `bearer`.
pub fn supported_type(scheme: &ShimSecurityScheme) -> Option<SecuritySchemeType> {
    match scheme.scheme_type.as_str() {
        "apiKey" => match scheme.location.as_deref() {
            Some("header") => Some(SecuritySchemeType::Header),
            Some("query") => Some(SecuritySchemeType::Query),
            Some("cookie") => Some(SecuritySchemeType::Cookie),
            _ => None,
        },
        "http" => match scheme.scheme.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("basic") => Some(SecuritySchemeType::Basic),
            Some("bearer") => Some(SecuritySchemeType::Bearer),
            _ => None,
        },
        _ => None,
    }
}

/// The supported schemes of `components.securitySchemes`, in declaration order.
pub fn convert_security_schemes(document: &Document) -> Vec<SecurityScheme> {
    document
        .security_schemes
        .iter()
        .filter_map(|(raw_name, scheme)| {
            let Some(ty) = supported_type(scheme) else {
                tracing::debug!("skip unsupported security scheme '{}'", raw_name);
                return None;
            };
            let property_name = match ty {
                SecuritySchemeType::Header
                | SecuritySchemeType::Query
                | SecuritySchemeType::Cookie => scheme.name.clone(),
                SecuritySchemeType::Basic | SecuritySchemeType::Bearer => None,
            };
            Some(SecurityScheme {
                name: as_type_name(raw_name),
                raw_name: raw_name.clone(),
                property_name,
                ty,
                description: scheme.description.clone(),
            })
        })
        .collect()
}

/// Distinct, type-cased scheme names an operation requires.
///
/// The operation's own `security` wins, even when empty; without one the
/// document-level list applies.
pub fn security_ids(document: &Document, path: &str, op: &Operation) -> AppResult<Vec<String>> {
    let Some(requirements) = op.security.as_ref().or(document.security.as_ref()) else {
        return Ok(Vec::new());
    };
    let location = format!("#/paths/{}/{}/security", escape_pointer(path), op.method.key());

    let names: IndexSet<&String> = requirements.iter().flat_map(|r| r.keys()).collect();
    names
        .into_iter()
        .map(|name| {
            let scheme = document
                .security_schemes
                .get(name)
                .ok_or_else(|| AppError::unresolved(name.as_str(), location.as_str()))?;
            if supported_type(scheme).is_none() {
                return Err(AppError::unsupported(
                    location.as_str(),
                    format!("security scheme '{name}' of type '{}'", scheme.scheme_type),
                ));
            }
            Ok(as_type_name(name))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use crate::oas::document::load_document;

    const DOC: &str = r#"
openapi: 3.0.3
info: {title: t, version: "1"}
security:
  - api_key: []
paths:
  /inherit:
    get:
      responses: {'200': {description: ok}}
  /public:
    get:
      security: []
      responses: {'200': {description: ok}}
  /both:
    get:
      security:
        - bearer_auth: []
          api_key: []
        - bearer_auth: []
      responses: {'200': {description: ok}}
  /oauth:
    get:
      security:
        - oauth: [read]
      responses: {'200': {description: ok}}
  /missing:
    get:
      security:
        - nope: []
      responses: {'200': {description: ok}}
components:
  securitySchemes:
    api_key:
      type: apiKey
      name: X-Api-Key
      in: header
    bearer_auth:
      type: http
      scheme: Bearer
    oauth:
      type: oauth2
      flows: {}
"#;

    fn ids(doc: &Document, index: usize) -> AppResult<Vec<String>> {
        let item = &doc.paths[index];
        security_ids(doc, &item.path, &item.operations[0])
    }

    #[test]
    fn test_scheme_table_skips_unsupported() {
        let doc = load_document(DOC, &ConversionOptions::default()).unwrap();
        let schemes = convert_security_schemes(&doc);
        let names: Vec<(&str, SecuritySchemeType)> =
            schemes.iter().map(|s| (s.name.as_str(), s.ty)).collect();
        assert_eq!(
            names,
            vec![
                ("ApiKey", SecuritySchemeType::Header),
                ("BearerAuth", SecuritySchemeType::Bearer)
            ]
        );
        assert_eq!(schemes[0].property_name.as_deref(), Some("X-Api-Key"));
        assert_eq!(schemes[1].property_name, None);
    }

    #[test]
    fn test_inherited_and_explicitly_empty() {
        let doc = load_document(DOC, &ConversionOptions::default()).unwrap();
        assert_eq!(ids(&doc, 0).unwrap(), vec!["ApiKey"]);
        assert!(ids(&doc, 1).unwrap().is_empty());
        assert_eq!(ids(&doc, 2).unwrap(), vec!["BearerAuth", "ApiKey"]);
    }

    #[test]
    fn test_usage_of_unsupported_or_unknown_scheme_fails() {
        let doc = load_document(DOC, &ConversionOptions::default()).unwrap();
        assert!(matches!(
            ids(&doc, 3),
            Err(AppError::UnsupportedSchema { .. })
        ));
        match ids(&doc, 4) {
            Err(AppError::UnresolvedReference { reference, location }) => {
                assert_eq!(reference, "nope");
                assert_eq!(location, "#/paths/~1missing/get/security");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
