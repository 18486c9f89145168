#![deny(missing_docs)]

//! # Conversion Options
//!
//! The knobs recognized by the conversion entry point.

use indexmap::IndexSet;
use serde::Deserialize;

/// Settings for a single conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionOptions {
    /// Package (namespace) the emitter places generated code into.
    pub package_name: String,
    /// Tag filter. Empty means every tag is accepted.
    pub limit_apis: IndexSet<String>,
    /// Keep every component schema, bypassing reachability pruning.
    pub generate_all_named_schemas: bool,
    /// Log document diagnostics instead of failing on them.
    pub allow_parse_errors: bool,
    /// Log a human readable dump of the resolved model.
    pub verbose: bool,
}

impl ConversionOptions {
    /// Creates options with the given package name and everything else defaulted.
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            ..Self::default()
        }
    }

    /// Restricts conversion to operations carrying one of `tags`.
    pub fn with_limit_apis<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.limit_apis = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Sets [`ConversionOptions::generate_all_named_schemas`].
    pub fn with_generate_all_named_schemas(mut self, value: bool) -> Self {
        self.generate_all_named_schemas = value;
        self
    }

    /// Sets [`ConversionOptions::allow_parse_errors`].
    pub fn with_allow_parse_errors(mut self, value: bool) -> Self {
        self.allow_parse_errors = value;
        self
    }

    /// Sets [`ConversionOptions::verbose`].
    pub fn with_verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }

    /// True when `tag` passes the tag filter.
    pub fn accepts_tag(&self, tag: &str) -> bool {
        self.limit_apis.is_empty() || self.limit_apis.contains(tag)
    }
}
