#![deny(missing_docs)]

//! # Server URLs
//!
//! Turns Server Objects into base URLs: `{variable}` placeholders are substituted
//! and the result always ends with `/`.

use crate::oas::shims::ShimServer;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

/// Resolves a server into a base URL.
///
/// Variables take their `default`, else their first `enum` value; unknown
/// placeholders are left as written. Absolute URLs are kept, root-relative
/// URLs stay relative, and bare hosts get an `http://` scheme.
pub fn base_url(server: &ShimServer) -> String {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    let placeholder =
        PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^{}\s]+)\}").expect("Invalid regex"));

    let resolved = placeholder.replace_all(&server.url, |caps: &regex::Captures<'_>| {
        let key = &caps[1];
        server
            .variables
            .get(key)
            .and_then(|var| {
                var.default
                    .clone()
                    .or_else(|| var.enum_values.as_ref().and_then(|v| v.first().cloned()))
            })
            .unwrap_or_else(|| caps[0].to_string())
    });
    normalize_base(&resolved)
}

fn normalize_base(url: &str) -> String {
    let is_absolute = url.contains("://") && Url::parse(url).is_ok();
    let mut out = if is_absolute || url.starts_with('/') {
        url.to_string()
    } else {
        format!("http://{url}")
    };
    if !out.ends_with('/') {
        out.push('/');
    }
    out
}

/// Base URL of the first server, if any.
pub fn first_base_url(servers: &[ShimServer]) -> Option<String> {
    servers.first().map(base_url)
}
