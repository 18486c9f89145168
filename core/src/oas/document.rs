#![deny(missing_docs)]

//! # Document Loader
//!
//! Turns YAML/JSON text into a navigable [`Document`]: every Schema Object is
//! interned into a [`SchemaArena`], shared components (parameters, request
//! bodies, responses, headers) are resolved, and `$ref`s to component schemas
//! stay indexable through [`Document::resolve_ref`].
//!
//! Loading is tolerant: each section is parsed independently and problems are
//! collected as diagnostics. They abort the load unless `allow_parse_errors` is
//! set, in which case they are logged and the section is skipped.

use crate::config::ConversionOptions;
use crate::error::{AppError, AppResult};
use crate::oas::arena::{escape_pointer, SchemaArena, SchemaId};
use crate::oas::models::{HttpMethod, ParameterLocation};
use crate::oas::normalization::normalize_schema;
use crate::oas::ref_utils::{
    extract_component_name, HEADERS, PARAMETERS, REQUEST_BODIES, RESPONSES, SCHEMAS,
};
use crate::oas::shims::{
    ShimHeader, ShimInfo, ShimMediaType, ShimOperation, ShimParameter, ShimPathItem,
    ShimRequestBody, ShimResponse, ShimSchema, ShimSecurityScheme, ShimServer,
};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashSet;
use utoipa::openapi::RefOr;

/// One security requirement: scheme name -> scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// A loaded OpenAPI document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// The `openapi` version string.
    pub openapi: String,
    /// `info`
    pub info: ShimInfo,
    /// Document-level servers.
    pub servers: Vec<ShimServer>,
    /// Document-level security requirements.
    pub security: Option<Vec<SecurityRequirement>>,
    /// Path items in document order.
    pub paths: Vec<PathItem>,
    /// `components.schemas`, name -> root node.
    pub schemas: IndexMap<String, SchemaId>,
    /// `components.securitySchemes`
    pub security_schemes: IndexMap<String, ShimSecurityScheme>,
    /// Owner of every schema node.
    pub arena: SchemaArena,
}

/// A Path Item with its operations.
#[derive(Debug, Clone)]
pub struct PathItem {
    /// Path template, e.g. `/pets/{id}`.
    pub path: String,
    /// Parameters shared by all operations.
    pub parameters: Vec<Parameter>,
    /// Operations in `get, put, post, delete, options, head, patch, trace` order.
    pub operations: Vec<Operation>,
    /// Path-level server override.
    pub servers: Option<Vec<ShimServer>>,
}

/// An Operation Object.
#[derive(Debug, Clone)]
pub struct Operation {
    /// HTTP verb.
    pub method: HttpMethod,
    /// `operationId`
    pub operation_id: Option<String>,
    /// Tags as declared.
    pub tags: Vec<String>,
    /// Operation-level parameters.
    pub parameters: Vec<Parameter>,
    /// Request body.
    pub request_body: Option<RequestBody>,
    /// Status code -> response, in declaration order.
    pub responses: IndexMap<String, Response>,
    /// Marked deprecated.
    pub deprecated: bool,
    /// Operation-level security (`Some(vec![])` disables security).
    pub security: Option<Vec<SecurityRequirement>>,
    /// Operation-level server override.
    pub servers: Option<Vec<ShimServer>>,
}

/// A Parameter Object with its schema interned.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Name as declared.
    pub name: String,
    /// Transport location.
    pub location: ParameterLocation,
    /// Mandatory parameter.
    pub required: Option<bool>,
    /// Parameter description.
    pub description: Option<String>,
    /// Value schema.
    pub schema: Option<SchemaId>,
}

/// A Media Type Object.
#[derive(Debug, Clone, Default)]
pub struct MediaType {
    /// Payload schema.
    pub schema: Option<SchemaId>,
}

/// A Request Body Object.
#[derive(Debug, Clone, Default)]
pub struct RequestBody {
    /// Body description.
    pub description: Option<String>,
    /// Mandatory body.
    pub required: Option<bool>,
    /// Media type -> payload, in declaration order.
    pub content: IndexMap<String, MediaType>,
}

/// A Response Object.
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// Response description.
    pub description: Option<String>,
    /// Media type -> payload, in declaration order.
    pub content: IndexMap<String, MediaType>,
    /// Header name -> header.
    pub headers: IndexMap<String, Header>,
}

/// A Header Object.
#[derive(Debug, Clone, Default)]
pub struct Header {
    /// Header description.
    pub description: Option<String>,
    /// Mandatory header.
    pub required: Option<bool>,
    /// Value schema.
    pub schema: Option<SchemaId>,
}

impl Document {
    /// Resolves `#/components/schemas/<Name>` to its root node.
    pub fn resolve_ref(&self, reference: &str) -> Option<SchemaId> {
        let name = extract_component_name(reference, SCHEMAS)?;
        self.schemas.get(&name).copied()
    }

    /// Follows component aliases (`A: {$ref: B}`) to the terminal schema.
    ///
    /// Fails for unknown targets and alias cycles.
    pub fn resolve_ref_chain(&self, reference: &str, location: &str) -> AppResult<SchemaId> {
        let mut seen = HashSet::new();
        let mut current = reference.to_string();
        loop {
            let id = self
                .resolve_ref(&current)
                .ok_or_else(|| AppError::unresolved(&current, location))?;
            if !seen.insert(id) {
                return Err(AppError::unresolved(
                    reference,
                    format!("{location} (cyclic alias)"),
                ));
            }
            match &self.arena[id].reference {
                Some(next) => current = next.clone(),
                None => return Ok(id),
            }
        }
    }

    /// Declared component name a schema reference points at.
    pub fn component_name(&self, reference: &str) -> Option<String> {
        extract_component_name(reference, SCHEMAS)
    }
}

/// Tag used for operations that declare none.
pub const FALLBACK_TAG: &str = "default";

impl Operation {
    /// `operationId`, or `METHOD path` when absent.
    pub fn key(&self, path: &str) -> String {
        self.operation_id
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.method, path))
    }

    /// Declared tags, or the fallback tag.
    pub fn effective_tags(&self) -> Vec<&str> {
        if self.tags.is_empty() {
            vec![FALLBACK_TAG]
        } else {
            self.tags.iter().map(String::as_str).collect()
        }
    }

    /// True if at least one tag passes the tag filter.
    pub fn is_selected(&self, options: &ConversionOptions) -> bool {
        self.effective_tags()
            .iter()
            .any(|tag| options.accepts_tag(tag))
    }
}

/// Parses and interns an OpenAPI 3.x document.
///
/// # Arguments
///
/// * `text` - YAML or JSON source.
/// * `options` - Only `allow_parse_errors` is consulted.
pub fn load_document(text: &str, options: &ConversionOptions) -> AppResult<Document> {
    let root: Value = serde_yaml::from_str(text)
        .map_err(|e| AppError::DocumentParse(format!("Invalid YAML/JSON: {}", e)))?;
    let Value::Object(root) = root else {
        return Err(AppError::DocumentParse(
            "Document root must be a mapping".into(),
        ));
    };

    let mut loader = Loader::default();
    let document = loader.load(root);

    if !loader.diagnostics.is_empty() {
        if !options.allow_parse_errors {
            return Err(AppError::DocumentParse(loader.diagnostics.join("; ")));
        }
        for diagnostic in &loader.diagnostics {
            tracing::warn!("{}", diagnostic);
        }
    }

    Ok(document)
}

#[derive(Default)]
struct Loader {
    diagnostics: Vec<String>,
    arena: SchemaArena,
    parameters: IndexMap<String, Parameter>,
    request_bodies: IndexMap<String, RequestBody>,
    responses: IndexMap<String, Response>,
    headers: IndexMap<String, Header>,
}

impl Loader {
    fn load(&mut self, mut root: Map<String, Value>) -> Document {
        let openapi = match root.get("openapi").and_then(Value::as_str) {
            Some(version) if version.starts_with("3.") => version.to_string(),
            Some(version) => {
                self.diag(format!("#/openapi: unsupported version '{version}'"));
                version.to_string()
            }
            None => {
                self.diag("#/openapi: missing version field".into());
                String::new()
            }
        };

        let info = match root.remove("info") {
            Some(value) => self.parse::<ShimInfo>(value, "#/info").unwrap_or_default(),
            None => {
                self.diag("#/info: missing required object".into());
                ShimInfo::default()
            }
        };
        let servers = root
            .remove("servers")
            .and_then(|value| self.parse::<Vec<ShimServer>>(value, "#/servers"))
            .unwrap_or_default();
        let security = root
            .remove("security")
            .and_then(|value| self.parse::<Vec<SecurityRequirement>>(value, "#/security"));

        let mut components = match root.remove("components") {
            Some(Value::Object(map)) => map,
            Some(_) => {
                self.diag("#/components: expected an object".into());
                Map::new()
            }
            None => Map::new(),
        };

        let schemas = self.load_component_schemas(components.remove(SCHEMAS));
        let security_schemes = self.load_security_schemes(components.remove("securitySchemes"));
        self.load_headers(components.remove(HEADERS));
        self.load_parameters(components.remove(PARAMETERS));
        self.load_request_bodies(components.remove(REQUEST_BODIES));
        self.load_responses(components.remove(RESPONSES));

        let paths = match root.remove("paths") {
            Some(Value::Object(map)) => map
                .into_iter()
                .filter(|(key, _)| !key.starts_with("x-"))
                .filter_map(|(path, value)| self.path_item(path, value))
                .collect(),
            Some(_) => {
                self.diag("#/paths: expected an object".into());
                Vec::new()
            }
            None => Vec::new(),
        };

        Document {
            openapi,
            info,
            servers,
            security,
            paths,
            schemas,
            security_schemes,
            arena: std::mem::take(&mut self.arena),
        }
    }

    fn diag(&mut self, message: String) {
        self.diagnostics.push(message);
    }

    fn parse<T: DeserializeOwned>(&mut self, value: Value, location: &str) -> Option<T> {
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.diag(format!("{location}: {e}"));
                None
            }
        }
    }

    fn section(&mut self, value: Option<Value>, location: &str) -> Map<String, Value> {
        match value {
            Some(Value::Object(map)) => map,
            Some(_) => {
                self.diag(format!("{location}: expected an object"));
                Map::new()
            }
            None => Map::new(),
        }
    }

    fn schema(&mut self, mut value: Value, location: &str) -> Option<SchemaId> {
        normalize_schema(&mut value);
        let shim = self.parse::<ShimSchema>(value, location)?;
        Some(self.arena.intern(shim, location, &mut self.diagnostics))
    }

    fn load_component_schemas(&mut self, value: Option<Value>) -> IndexMap<String, SchemaId> {
        let mut schemas = IndexMap::new();
        for (name, raw) in self.section(value, "#/components/schemas") {
            let location = format!("#/components/schemas/{}", escape_pointer(&name));
            if let Some(id) = self.schema(raw, &location) {
                if let Some(node) = self.arena.get_mut(id) {
                    node.component_name = Some(name.clone());
                }
                schemas.insert(name, id);
            }
        }
        schemas
    }

    fn load_security_schemes(
        &mut self,
        value: Option<Value>,
    ) -> IndexMap<String, ShimSecurityScheme> {
        let mut schemes = IndexMap::new();
        for (name, raw) in self.section(value, "#/components/securitySchemes") {
            let location = format!("#/components/securitySchemes/{}", escape_pointer(&name));
            if let Some(scheme) = self.parse::<ShimSecurityScheme>(raw, &location) {
                schemes.insert(name, scheme);
            }
        }
        schemes
    }

    fn load_headers(&mut self, value: Option<Value>) {
        for (name, raw) in self.section(value, "#/components/headers") {
            let location = format!("#/components/headers/{}", escape_pointer(&name));
            if let Some(shim) = self.parse::<RefOr<ShimHeader>>(raw, &location) {
                if let Some(header) = self.header(shim, &location) {
                    self.headers.insert(name, header);
                }
            }
        }
    }

    fn load_parameters(&mut self, value: Option<Value>) {
        for (name, raw) in self.section(value, "#/components/parameters") {
            let location = format!("#/components/parameters/{}", escape_pointer(&name));
            if let Some(shim) = self.parse::<RefOr<ShimParameter>>(raw, &location) {
                if let Some(parameter) = self.parameter(shim, &location) {
                    self.parameters.insert(name, parameter);
                }
            }
        }
    }

    fn load_request_bodies(&mut self, value: Option<Value>) {
        for (name, raw) in self.section(value, "#/components/requestBodies") {
            let location = format!("#/components/requestBodies/{}", escape_pointer(&name));
            if let Some(shim) = self.parse::<RefOr<ShimRequestBody>>(raw, &location) {
                if let Some(body) = self.request_body(shim, &location) {
                    self.request_bodies.insert(name, body);
                }
            }
        }
    }

    fn load_responses(&mut self, value: Option<Value>) {
        for (name, raw) in self.section(value, "#/components/responses") {
            let location = format!("#/components/responses/{}", escape_pointer(&name));
            if let Some(shim) = self.parse::<RefOr<ShimResponse>>(raw, &location) {
                if let Some(response) = self.response(shim, &location) {
                    self.responses.insert(name, response);
                }
            }
        }
    }

    /// Looks up an already loaded component; unknown names become diagnostics.
    fn component<T: Clone>(
        &mut self,
        reference: &str,
        section: &str,
        location: &str,
        pick: impl Fn(&Self) -> &IndexMap<String, T>,
    ) -> Option<T> {
        let found = extract_component_name(reference, section)
            .and_then(|name| pick(self).get(&name).cloned());
        if found.is_none() {
            self.diag(format!("{location}: cannot resolve '{reference}'"));
        }
        found
    }

    fn content(
        &mut self,
        content: IndexMap<String, ShimMediaType>,
        location: &str,
    ) -> IndexMap<String, MediaType> {
        content
            .into_iter()
            .map(|(mime, media)| {
                let pointer = format!("{location}/content/{}/schema", escape_pointer(&mime));
                let schema = media.schema.and_then(|raw| self.schema(raw, &pointer));
                (mime, MediaType { schema })
            })
            .collect()
    }

    /// Schema of a parameter or header: `schema`, else the first `content` entry.
    fn value_schema(
        &mut self,
        schema: Option<Value>,
        content: Option<IndexMap<String, ShimMediaType>>,
        location: &str,
    ) -> Option<SchemaId> {
        if let Some(raw) = schema {
            return self.schema(raw, &format!("{location}/schema"));
        }
        let (mime, media) = content?.into_iter().next()?;
        let pointer = format!("{location}/content/{}/schema", escape_pointer(&mime));
        media.schema.and_then(|raw| self.schema(raw, &pointer))
    }

    fn parameter(&mut self, shim: RefOr<ShimParameter>, location: &str) -> Option<Parameter> {
        let shim = match shim {
            RefOr::Ref(r) => {
                return self.component(&r.ref_location, PARAMETERS, location, |l| &l.parameters)
            }
            RefOr::T(p) => p,
        };
        let Some(parameter_location) = ParameterLocation::parse(&shim.location) else {
            self.diag(format!(
                "{location}: unknown parameter location '{}'",
                shim.location
            ));
            return None;
        };
        let schema = self.value_schema(shim.schema, shim.content, location);
        Some(Parameter {
            name: shim.name,
            location: parameter_location,
            required: shim.required,
            description: shim.description,
            schema,
        })
    }

    fn header(&mut self, shim: RefOr<ShimHeader>, location: &str) -> Option<Header> {
        match shim {
            RefOr::Ref(r) => self.component(&r.ref_location, HEADERS, location, |l| &l.headers),
            RefOr::T(h) => {
                let schema = self.value_schema(h.schema, h.content, location);
                Some(Header {
                    description: h.description,
                    required: h.required,
                    schema,
                })
            }
        }
    }

    fn request_body(&mut self, shim: RefOr<ShimRequestBody>, location: &str) -> Option<RequestBody> {
        match shim {
            RefOr::Ref(r) => {
                self.component(&r.ref_location, REQUEST_BODIES, location, |l| &l.request_bodies)
            }
            RefOr::T(b) => Some(RequestBody {
                description: b.description,
                required: b.required,
                content: self.content(b.content, location),
            }),
        }
    }

    fn response(&mut self, shim: RefOr<ShimResponse>, location: &str) -> Option<Response> {
        match shim {
            RefOr::Ref(r) => self.component(&r.ref_location, RESPONSES, location, |l| &l.responses),
            RefOr::T(r) => {
                let content = self.content(r.content, location);
                let headers = r
                    .headers
                    .into_iter()
                    .filter_map(|(name, header)| {
                        let pointer = format!("{location}/headers/{}", escape_pointer(&name));
                        self.header(header, &pointer).map(|h| (name, h))
                    })
                    .collect();
                Some(Response {
                    description: r.description,
                    content,
                    headers,
                })
            }
        }
    }

    fn parameters(
        &mut self,
        shims: Vec<RefOr<ShimParameter>>,
        location: &str,
    ) -> Vec<Parameter> {
        shims
            .into_iter()
            .enumerate()
            .filter_map(|(index, shim)| {
                self.parameter(shim, &format!("{location}/parameters/{index}"))
            })
            .collect()
    }

    fn path_item(&mut self, path: String, value: Value) -> Option<PathItem> {
        let location = format!("#/paths/{}", escape_pointer(&path));
        let Value::Object(mut raw) = value else {
            self.diag(format!("{location}: expected an object"));
            return None;
        };
        if raw.contains_key("$ref") {
            self.diag(format!("{location}: path item references are not supported"));
            return None;
        }

        let mut operations = Vec::new();
        for method in HttpMethod::ALL {
            let Some(op_value) = raw.remove(method.key()) else {
                continue;
            };
            let op_location = format!("{location}/{}", method.key());
            if let Some(shim) = self.parse::<ShimOperation>(op_value, &op_location) {
                operations.push(self.operation(method, shim, &op_location));
            }
        }

        let shim = self
            .parse::<ShimPathItem>(Value::Object(raw), &location)
            .unwrap_or_default();
        let parameters = self.parameters(shim.parameters, &location);

        Some(PathItem {
            path,
            parameters,
            operations,
            servers: shim.servers,
        })
    }

    fn operation(&mut self, method: HttpMethod, shim: ShimOperation, location: &str) -> Operation {
        let parameters = self.parameters(shim.parameters, location);
        let request_body = shim
            .request_body
            .and_then(|body| self.request_body(body, &format!("{location}/requestBody")));
        let responses = shim
            .responses
            .into_iter()
            .filter(|(code, _)| !code.starts_with("x-"))
            .filter_map(|(code, response)| {
                let pointer = format!("{location}/responses/{}", escape_pointer(&code));
                self.response(response, &pointer).map(|r| (code, r))
            })
            .collect();

        Operation {
            method,
            operation_id: shim.operation_id,
            tags: shim.tags,
            parameters,
            request_body,
            responses,
            deprecated: shim.deprecated.unwrap_or(false),
            security: shim.security,
            servers: shim.servers,
        }
    }
}
