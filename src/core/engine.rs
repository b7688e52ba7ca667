//! Template engine - placeholder extraction and story rendering.

use log::debug;
use rustc_hash::FxHashSet;
use std::collections::HashMap;

use crate::core::scanner::{scan, Token};

/// Result of scanning authored text for placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Distinct placeholder names in order of first appearance.
    pub placeholders: Vec<String>,
    /// The scanned text, unchanged.
    pub body: String,
}

/// Extract the distinct placeholders of `text`, keeping first-occurrence order.
///
/// Names are taken verbatim: `[Noun]` and `[noun]` are different placeholders.
/// The text itself is returned untouched; substitution happens at render time.
pub fn extract(text: &str) -> Extraction {
    let placeholders = placeholders_in(text);
    debug!("extracted {} distinct placeholders", placeholders.len());
    Extraction {
        placeholders,
        body: text.to_string(),
    }
}

/// Distinct placeholder names in `text`, in order of first appearance.
pub fn placeholders_in(text: &str) -> Vec<String> {
    let mut seen = FxHashSet::default();
    let mut placeholders = Vec::new();
    for token in scan(text) {
        if let Token::Placeholder(name) = token {
            if seen.insert(name) {
                placeholders.push(name.to_string());
            }
        }
    }
    placeholders
}

/// Substitute `values` into `body`.
///
/// Every `[name]` token whose name has an entry in `values` is replaced by that
/// value; tokens without an entry stay as literal `[name]` text. Inserted
/// values are not scanned again, so the result does not depend on the order in
/// which names are applied.
pub fn render(body: &str, values: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(body.len());
    for token in scan(body) {
        match token {
            Token::Literal(text) => out.push_str(text),
            Token::Placeholder(name) => match values.get(name) {
                Some(value) => out.push_str(value),
                None => {
                    out.push('[');
                    out.push_str(name);
                    out.push(']');
                }
            },
        }
    }
    out
}
