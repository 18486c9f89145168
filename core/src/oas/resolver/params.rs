#![deny(missing_docs)]

//! # Parameter Resolution
//!
//! Merges path-level and operation-level parameters into the final, ordered
//! parameter list of one operation.
//!
//! - An operation parameter replaces a path parameter with the same name and location.
//! - A name used more than once is disambiguated as `{Location}.{name}`.
//! - The result is ordered Cookie, Header, Path, Query (stable within a location).

use crate::error::AppResult;
use crate::naming::as_field_name;
use crate::oas::context::ConversionContext;
use crate::oas::document::Parameter;
use crate::oas::models::{SimpleType, SpecParameter};
use crate::oas::resolver::types::resolve_simple_type;
use std::collections::HashMap;

/// Resolves the parameters of one operation.
pub fn resolve_parameters(
    ctx: &ConversionContext<'_>,
    path_params: &[Parameter],
    op_params: &[Parameter],
) -> AppResult<Vec<SpecParameter>> {
    let merged: Vec<&Parameter> = path_params
        .iter()
        .filter(|p| {
            !op_params
                .iter()
                .any(|o| o.name == p.name && o.location == p.location)
        })
        .chain(op_params)
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for param in &merged {
        *counts.entry(param.name.as_str()).or_default() += 1;
    }

    let mut resolved = merged
        .into_iter()
        .map(|param| {
            let name = if counts[param.name.as_str()] > 1 {
                as_field_name(&format!("{}.{}", param.location, param.name))
            } else {
                as_field_name(&param.name)
            };
            let schema = match param.schema {
                Some(id) => resolve_simple_type(ctx, id)?,
                None => SimpleType::Any,
            };
            Ok(SpecParameter {
                name,
                raw_name: param.name.clone(),
                location: param.location,
                schema,
                nullable: param.required != Some(true),
                description: param.description.clone(),
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    resolved.sort_by_key(|p| p.location.priority());
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionOptions;
    use crate::oas::document::Document;
    use crate::oas::models::{ParameterLocation, PrimitiveType};
    use pretty_assertions::assert_eq;

    fn param(name: &str, location: ParameterLocation, required: Option<bool>) -> Parameter {
        Parameter {
            name: name.to_string(),
            location,
            required,
            description: None,
            schema: None,
        }
    }

    fn run(path_params: &[Parameter], op_params: &[Parameter]) -> Vec<SpecParameter> {
        let doc = Document::default();
        let options = ConversionOptions::default();
        let ctx = ConversionContext::new(&doc, &options);
        resolve_parameters(&ctx, path_params, op_params).unwrap()
    }

    #[test]
    fn test_collision_is_disambiguated_and_path_precedes_query() {
        let resolved = run(
            &[param("id", ParameterLocation::Path, Some(true))],
            &[param("id", ParameterLocation::Query, None)],
        );
        let names: Vec<(&str, ParameterLocation)> = resolved
            .iter()
            .map(|p| (p.name.as_str(), p.location))
            .collect();
        assert_eq!(
            names,
            vec![
                ("pathId", ParameterLocation::Path),
                ("queryId", ParameterLocation::Query)
            ]
        );
        assert!(!resolved[0].nullable);
        assert!(resolved[1].nullable);
        assert_eq!(resolved[0].raw_name, "id");
    }

    #[test]
    fn test_operation_parameter_overrides_path_parameter() {
        let mut op_param = param("limit", ParameterLocation::Query, Some(true));
        op_param.description = Some("page size".into());
        let resolved = run(
            &[param("limit", ParameterLocation::Query, None)],
            &[op_param],
        );
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "limit");
        assert_eq!(resolved[0].description.as_deref(), Some("page size"));
        assert!(!resolved[0].nullable);
    }

    #[test]
    fn test_location_order_is_stable() {
        let resolved = run(
            &[],
            &[
                param("q", ParameterLocation::Query, None),
                param("X-Trace-Id", ParameterLocation::Header, None),
                param("session", ParameterLocation::Cookie, None),
                param("petId", ParameterLocation::Path, Some(true)),
                param("page", ParameterLocation::Query, None),
            ],
        );
        let names: Vec<&str> = resolved.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["session", "xTraceId", "petId", "q", "page"]);
    }

    #[test]
    fn test_parameter_schema_is_resolved() {
        let yaml = r#"
openapi: 3.0.3
info: {title: t, version: "1"}
paths:
  /pets/{petId}:
    get:
      parameters:
        - name: petId
          in: path
          required: true
          schema: {type: integer, format: int64}
      responses:
        '200': {description: ok}
"#;
        let options = ConversionOptions::default();
        let doc = crate::oas::document::load_document(yaml, &options).unwrap();
        let ctx = ConversionContext::new(&doc, &options);
        let op = &doc.paths[0].operations[0];
        let resolved = resolve_parameters(&ctx, &doc.paths[0].parameters, &op.parameters).unwrap();
        assert_eq!(
            resolved[0].schema,
            SimpleType::Primitive {
                primitive: PrimitiveType::Int64
            }
        );
    }
}
