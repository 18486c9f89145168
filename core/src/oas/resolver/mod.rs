#![deny(missing_docs)]

//! # Resolver Module
//!
//! Runs one conversion from a loaded [`Document`] to a [`SpecModel`]:
//!
//! 1. collect the reachable schemas,
//! 2. place them in the model tree,
//! 3. resolve union variants,
//! 4. convert named schemas and operations.
//!
//! Any error aborts the run; there is no partial model.

pub mod body;
pub mod named;
pub mod params;
pub mod responses;
pub mod security;
pub mod types;

use crate::config::ConversionOptions;
use crate::error::AppResult;
use crate::naming::{as_function_name, as_type_name};
use crate::oas::context::ConversionContext;
use crate::oas::document::{load_document, Document, Operation, PathItem};
use crate::oas::header::file_header;
use crate::oas::models::{SpecApi, SpecMetadata, SpecModel, SpecOperation};
use crate::oas::schemas::tree::build_model_tree;
use crate::oas::schemas::unions::resolve_unions;
use crate::oas::schemas::visitor::collect_reachable;
use crate::oas::servers::{base_url, first_base_url};
use chrono::{DateTime, Timelike, Utc};
use indexmap::IndexMap;

pub use body::resolve_body;
pub use named::convert_schemas;
pub use params::resolve_parameters;
pub use responses::{resolve_response, select_response};
pub use security::{convert_security_schemes, security_ids};
pub use types::resolve_simple_type;

/// Title used when `info.title` is missing.
pub const UNDEFINED_TITLE: &str = "<undefined>";
/// Version used when `info.version` is missing.
pub const UNDEFINED_VERSION: &str = "0.0.0";

/// Loads and converts a document.
pub fn convert_str(text: &str, options: &ConversionOptions) -> AppResult<SpecModel> {
    let document = load_document(text, options)?;
    convert(&document, options)
}

/// Converts a loaded document, stamped with the current time.
pub fn convert(document: &Document, options: &ConversionOptions) -> AppResult<SpecModel> {
    convert_at(document, options, Utc::now())
}

/// Converts a loaded document with an explicit generation timestamp.
pub fn convert_at(
    document: &Document,
    options: &ConversionOptions,
    generated_at: DateTime<Utc>,
) -> AppResult<SpecModel> {
    let created_at = generated_at.with_nanosecond(0).unwrap_or(generated_at);

    let mut ctx = ConversionContext::new(document, options);
    let reachable = collect_reachable(&ctx)?;
    ctx.tree = build_model_tree(&ctx, &reachable)?;
    ctx.unions = resolve_unions(&mut ctx)?;

    let schemas = convert_schemas(&ctx)?;
    let apis = convert_apis(&ctx)?;
    let metadata = convert_metadata(document, options, created_at);
    let file_header = file_header(
        &document.info,
        &metadata.title,
        &metadata.version,
        created_at,
    );

    let model = SpecModel {
        metadata,
        file_header,
        apis,
        schemas,
        security_schemes: convert_security_schemes(document),
        model_serial_names: ctx.unions.serial_names,
        model_interfaces: ctx.unions.interfaces,
    };

    if options.verbose {
        tracing::info!("\n{}", model.dump());
    }
    Ok(model)
}

fn convert_metadata(
    document: &Document,
    options: &ConversionOptions,
    created_at: DateTime<Utc>,
) -> SpecMetadata {
    let info = &document.info;
    SpecMetadata {
        title: info
            .title
            .clone()
            .unwrap_or_else(|| UNDEFINED_TITLE.to_string()),
        description: info.description.clone(),
        version: info
            .version
            .clone()
            .unwrap_or_else(|| UNDEFINED_VERSION.to_string()),
        servers: document.servers.iter().map(base_url).collect(),
        package_name: options.package_name.clone(),
        created_at,
    }
}

/// Groups the selected operations by type-cased tag, in first-seen order.
fn convert_apis(ctx: &ConversionContext<'_>) -> AppResult<Vec<SpecApi>> {
    let mut apis: IndexMap<String, Vec<SpecOperation>> = IndexMap::new();

    for item in &ctx.document.paths {
        for op in &item.operations {
            if !op.is_selected(ctx.options) {
                continue;
            }
            let converted = convert_operation(ctx, item, op)?;
            for tag in op.effective_tags() {
                if ctx.options.accepts_tag(tag) {
                    apis.entry(as_type_name(tag))
                        .or_default()
                        .push(converted.clone());
                }
            }
        }
    }

    Ok(apis
        .into_iter()
        .map(|(name, operations)| SpecApi { name, operations })
        .collect())
}

fn convert_operation(
    ctx: &ConversionContext<'_>,
    item: &PathItem,
    op: &Operation,
) -> AppResult<SpecOperation> {
    let parameters = resolve_parameters(ctx, &item.parameters, &op.parameters)?;
    let (request_type, body) = resolve_body(ctx, op.request_body.as_ref())?;
    let response = resolve_response(ctx, &op.responses)?;
    // A declared operation list wins even when empty.
    let server_override = match op.servers.as_deref() {
        Some(servers) => first_base_url(servers),
        None => item.servers.as_deref().and_then(first_base_url),
    };

    Ok(SpecOperation {
        name: as_function_name(&op.key(&item.path)),
        method: op.method,
        path: item.path.clone(),
        request_type,
        parameters,
        body,
        response,
        deprecated: op.deprecated,
        security_ids: security_ids(ctx.document, &item.path, op)?,
        server_override,
    })
}
