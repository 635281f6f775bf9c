//! Literal `{{var}}` placeholder substitution for email bodies.
//!
//! This is deliberately not a template language: no control flow, no
//! recursion, no HTML escaping. Placeholders with no matching variable
//! render as the empty string.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("placeholder regex is valid"));

/// Replaces every `{{ key }}` occurrence in `template` with the stringified
/// variable value.
///
/// A `None` variable map returns the template unchanged; an empty template
/// returns the empty string. Strings substitute without quotes, `null` as
/// the empty string, and other scalars as their JSON rendering.
pub fn render(template: &str, variables: Option<&HashMap<String, serde_json::Value>>) -> String {
    if template.is_empty() {
        return String::new();
    }
    let Some(vars) = variables else {
        return template.to_string();
    };

    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            match vars.get(&caps[1]) {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Null) | None => String::new(),
                Some(value) => value.to_string(),
            }
        })
        .into_owned()
}
