#![deny(missing_docs)]

//! # Body Resolution
//!
//! Selects the request body media type and derives the request encoding.
//! Preference: `application/json`, `multipart/form-data`,
//! `application/x-www-form-urlencoded`, then the first declared entry.

use crate::error::AppResult;
use crate::oas::context::ConversionContext;
use crate::oas::document::{MediaType, RequestBody};
use crate::oas::models::{RequestType, SchemaInfo, SimpleType};
use crate::oas::resolver::types::resolve_simple_type;
use indexmap::IndexMap;

const JSON: &str = "application/json";
const MULTIPART: &str = "multipart/form-data";
const URL_ENCODED: &str = "application/x-www-form-urlencoded";

/// Media type without parameters, lowercased: `Application/JSON; charset=utf-8` -> `application/json`.
pub(crate) fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// `application/json` or any `+json` structured syntax suffix.
pub(crate) fn is_json(media_type: &str) -> bool {
    let essence = essence(media_type);
    essence == JSON || essence.ends_with("+json")
}

fn request_type(media_type: &str) -> RequestType {
    match essence(media_type).as_str() {
        MULTIPART => RequestType::Multipart,
        URL_ENCODED => RequestType::UrlEncoded,
        _ if is_json(media_type) => RequestType::Default,
        _ => RequestType::Unknown,
    }
}

fn select_media(content: &IndexMap<String, MediaType>) -> Option<(&String, &MediaType)> {
    [JSON, MULTIPART, URL_ENCODED]
        .iter()
        .find_map(|preferred| content.iter().find(|(key, _)| essence(key) == *preferred))
        .or_else(|| content.first())
}

/// Resolves the request body of an operation.
///
/// Without a body (or with an empty `content`) the request type is `Default`
/// and no payload is returned.
pub fn resolve_body(
    ctx: &ConversionContext<'_>,
    body: Option<&RequestBody>,
) -> AppResult<(RequestType, Option<SchemaInfo>)> {
    let Some(body) = body else {
        return Ok((RequestType::Default, None));
    };
    let Some((media_type, media)) = select_media(&body.content) else {
        return Ok((RequestType::Default, None));
    };

    let request_type = request_type(media_type);
    let ty = match (request_type, media.schema) {
        (RequestType::Unknown, _) => SimpleType::Raw,
        (_, Some(schema)) => resolve_simple_type(ctx, schema)?,
        (_, None) => SimpleType::Any,
    };

    Ok((
        request_type,
        Some(SchemaInfo {
            ty,
            nullable: body.required != Some(true),
            description: body.description.clone(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use crate::oas::document::Document;

    fn body(types: &[&str], required: Option<bool>) -> RequestBody {
        RequestBody {
            description: None,
            required,
            content: types
                .iter()
                .map(|t| (t.to_string(), MediaType { schema: None }))
                .collect(),
        }
    }

    fn run(body: Option<&RequestBody>) -> (RequestType, Option<SchemaInfo>) {
        let doc = Document::default();
        let options = ConversionOptions::default();
        let ctx = ConversionContext::new(&doc, &options);
        resolve_body(&ctx, body).unwrap()
    }

    #[test]
    fn test_essence() {
        assert_eq!(essence("Application/JSON; charset=utf-8"), "application/json");
        assert!(is_json("application/problem+json"));
        assert!(!is_json("text/plain"));
    }

    #[test]
    fn test_media_preference() {
        let (ty, _) = run(Some(&body(&[URL_ENCODED, MULTIPART], Some(true))));
        assert_eq!(ty, RequestType::Multipart);

        let (ty, _) = run(Some(&body(&["text/plain", "application/json; charset=utf-8"], None)));
        assert_eq!(ty, RequestType::Default);

        let (ty, info) = run(Some(&body(&["application/octet-stream"], Some(true))));
        assert_eq!(ty, RequestType::Unknown);
        let info = info.unwrap();
        assert_eq!(info.ty, SimpleType::Raw);
        assert!(!info.nullable);
    }

    #[test]
    fn test_absent_body() {
        assert_eq!(run(None), (RequestType::Default, None));
        assert_eq!(run(Some(&body(&[], None))), (RequestType::Default, None));
    }

    #[test]
    fn test_optional_body_is_nullable() {
        let (_, info) = run(Some(&body(&[JSON], None)));
        let info = info.unwrap();
        assert!(info.nullable);
        assert_eq!(info.ty, SimpleType::Any);
    }
}
