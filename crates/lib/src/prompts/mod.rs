//! # Prompt Template Modules
//!
//! This module organizes all prompt templates used throughout the `askdb` library.
//! It is divided into sub-modules based on the context or purpose of the prompts.

pub mod tasks;

/// Renders a template by substituting `{name}` placeholders in a single pass.
///
/// Unknown placeholders are left untouched, and substituted values are never
/// scanned again, so braces inside questions, schema text or observations pass
/// through unchanged.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(var, _)| *var == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
