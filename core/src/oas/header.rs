//! # File Header
//!
//! The comment block an emitter places at the top of every generated file.

use crate::oas::shims::ShimInfo;
use chrono::{DateTime, Utc};

/// First line of every header.
pub const FILE_HEADER_NOTE: &str = "NOTE: This file is auto generated. Do not edit the file manually!";

/// Identifies the generator in the header.
pub fn generator_info() -> String {
    format!("spec-ir (version {})", env!("CARGO_PKG_VERSION"))
}

/// Renders the header for a document, one line per entry, each ending in `\n`.
pub fn file_header(info: &ShimInfo, title: &str, version: &str, generated_at: DateTime<Utc>) -> String {
    let mut lines: Vec<String> = vec![FILE_HEADER_NOTE.to_string(), String::new(), title.to_string()];
    if let Some(description) = &info.description {
        lines.extend(description.split('\n').map(str::to_string));
    }
    lines.push(format!("Version {version}"));

    if let Some(contact) = &info.contact {
        lines.push(String::new());
        lines.push("Contact".to_string());
        lines.extend(contact.name.iter().map(|name| format!("  {name}")));
        lines.extend(contact.email.iter().map(|email| format!("  Mail: {email}")));
        lines.extend(contact.url.iter().map(|url| format!("  URL: {url}")));
    }
    if let Some(license) = &info.license {
        lines.push(String::new());
        lines.push("Spec License".to_string());
        lines.extend(license.name.iter().map(|name| format!("  {name}")));
        lines.extend(license.url.iter().map(|url| format!("  {url}")));
    }

    lines.push(String::new());
    lines.push(format!("Generated {}", generated_at.to_rfc2822()));
    lines.push(generator_info());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
