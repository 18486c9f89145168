#![deny(missing_docs)]

//! # Response Resolution
//!
//! Picks the response an operation is modelled after and resolves its payload.

use crate::error::AppResult;
use crate::oas::context::ConversionContext;
use crate::oas::document::Response;
use crate::oas::models::{is_nullable, SchemaInfo, SimpleType};
use crate::oas::resolver::body::is_json;
use crate::oas::resolver::types::resolve_simple_type;
use indexmap::IndexMap;

/// The numerically smallest `2xx` code, else the first declared response.
pub fn select_response(responses: &IndexMap<String, Response>) -> Option<(&String, &Response)> {
    responses
        .iter()
        .filter_map(|(code, response)| {
            let numeric = code.parse::<u16>().ok().filter(|c| (200..=299).contains(c))?;
            Some((numeric, (code, response)))
        })
        .min_by_key(|(numeric, _)| *numeric)
        .map(|(_, selected)| selected)
        .or_else(|| responses.first())
}

/// Resolves the payload of the selected response.
///
/// JSON content resolves to its schema type, other content to `Raw`, and no
/// content (or no response at all) to `Unit`.
pub fn resolve_response(
    ctx: &ConversionContext<'_>,
    responses: &IndexMap<String, Response>,
) -> AppResult<SchemaInfo> {
    let Some((_, response)) = select_response(responses) else {
        return Ok(SchemaInfo {
            ty: SimpleType::Unit,
            nullable: false,
            description: None,
        });
    };

    let json = response.content.iter().find(|(key, _)| is_json(key));
    let (ty, nullable) = match json {
        Some((_, media)) => match media.schema {
            Some(schema) => (
                resolve_simple_type(ctx, schema)?,
                is_nullable(Some(true), ctx.node(schema).nullable),
            ),
            None => (SimpleType::Any, false),
        },
        None if response.content.is_empty() => (SimpleType::Unit, false),
        None => (SimpleType::Raw, false),
    };

    Ok(SchemaInfo {
        ty,
        nullable,
        description: response.description.clone(),
    })
}
