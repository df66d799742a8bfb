//! Property serialization for keyframe declaration blocks.
//!
//! Declarations are emitted as `name:value`, lexically sorted and joined with
//! `;`. Sorting makes two property maps with the same content serialize to the
//! same text regardless of insertion order, which the content-addressed
//! stylesheet registry relies on.

use std::collections::BTreeMap;

use super::types::PropertyValue;

/// Convert a camelCase property name to its hyphenated CSS form.
///
/// A leading `ms` segment becomes the vendor prefix `-ms-`; other vendor
/// prefixes (`Webkit`, `Moz`) already start with an uppercase letter.
pub fn hyphenate(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    match out.strip_prefix("ms-") {
        Some(rest) => format!("-ms-{rest}"),
        None => out,
    }
}

/// Serialize one offset's property map into a canonical declaration list.
///
/// `None` values are omitted.
pub fn declarations(properties: &BTreeMap<String, Option<PropertyValue>>) -> String {
    let mut rules: Vec<String> = properties
        .iter()
        .filter_map(|(name, value)| {
            value
                .as_ref()
                .map(|v| format!("{}:{}", hyphenate(name.trim()), v.to_css()))
        })
        .collect();
    rules.sort();
    rules.join(";")
}
