use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::engine::{extract, placeholders_in};
use crate::schema::fill::FillIn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("template text must not be empty")]
    EmptyBody,
    #[error("template has no [placeholders]")]
    NoPlaceholders,
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
    #[error("placeholder '{0}' does not appear in the template")]
    UnknownPlaceholder(String),
    #[error("placeholder list does not match the template text")]
    PlaceholderMismatch,
    #[error("no value supplied for: {}", .0.join(", "))]
    MissingValues(Vec<String>),
}

/// A stored fill-in-the-blank story.
///
/// `title` is the key within a library. `placeholders` holds the distinct
/// token names of `body` in order of first appearance. On disk the body is
/// stored under the field name `template`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub title: String,
    #[serde(rename = "template")]
    pub body: String,
    pub placeholders: Vec<String>,
}

impl TemplateRecord {
    /// Build a publishable record from authored text.
    ///
    /// Title and body are trimmed. Fails if either is empty or the body has
    /// no placeholders.
    pub fn author(title: &str, body: &str) -> Result<TemplateRecord, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(ValidationError::EmptyBody);
        }
        let extraction = extract(body);
        if extraction.placeholders.is_empty() {
            return Err(ValidationError::NoPlaceholders);
        }
        Ok(TemplateRecord {
            title: title.to_string(),
            body: extraction.body,
            placeholders: extraction.placeholders,
        })
    }

    /// Check that the record is publishable and its placeholder list is the
    /// extraction of its body.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.body.trim().is_empty() {
            return Err(ValidationError::EmptyBody);
        }
        if self.placeholders.is_empty() {
            return Err(ValidationError::NoPlaceholders);
        }
        let found = placeholders_in(&self.body);
        if let Some(missing) = self.placeholders.iter().find(|p| !found.contains(p)) {
            return Err(ValidationError::UnknownPlaceholder(missing.clone()));
        }
        if found != self.placeholders {
            return Err(ValidationError::PlaceholderMismatch);
        }
        Ok(())
    }

    /// Replace the body, re-deriving the placeholder list from it.
    pub fn reextract(&mut self, body: &str) {
        let extraction = extract(body);
        self.body = extraction.body;
        self.placeholders = extraction.placeholders;
    }

    /// Start a fill-in for this record with no values yet.
    pub fn fill(&self) -> FillIn {
        FillIn::new(self.placeholders.clone())
    }

    /// The first `max_chars` characters of the body, with `...` appended when cut.
    pub fn preview(&self, max_chars: usize) -> String {
        match self.body.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &self.body[..cut]),
            None => self.body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_trims_and_extracts() {
        let rec = TemplateRecord::author("  Greeting ", " Hi [name], [name]! \n").unwrap();
        assert_eq!(rec.title, "Greeting");
        assert_eq!(rec.body, "Hi [name], [name]!");
        assert_eq!(rec.placeholders, vec!["name"]);
    }

    #[test]
    fn author_rejects_empty_title() {
        assert_eq!(
            TemplateRecord::author("   ", "[a]"),
            Err(ValidationError::EmptyTitle)
        );
    }

    #[test]
    fn author_rejects_empty_body() {
        assert_eq!(
            TemplateRecord::author("T", "  \n"),
            Err(ValidationError::EmptyBody)
        );
    }

    #[test]
    fn author_rejects_no_placeholders() {
        assert_eq!(
            TemplateRecord::author("T", "no blanks here"),
            Err(ValidationError::NoPlaceholders)
        );
    }

    #[test]
    fn validate_catches_unknown_placeholder() {
        let rec = TemplateRecord {
            title: "X".to_string(),
            body: "[a] only".to_string(),
            placeholders: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            rec.validate(),
            Err(ValidationError::UnknownPlaceholder("b".to_string()))
        );
    }

    #[test]
    fn validate_catches_order_mismatch() {
        let rec = TemplateRecord {
            title: "X".to_string(),
            body: "[a] [b]".to_string(),
            placeholders: vec!["b".to_string(), "a".to_string()],
        };
        assert_eq!(rec.validate(), Err(ValidationError::PlaceholderMismatch));
    }

    #[test]
    fn reextract_replaces_body_and_placeholders() {
        let mut rec = TemplateRecord::author("X", "[a]").unwrap();
        rec.reextract("[b] then [c] then [b]");
        assert_eq!(rec.body, "[b] then [c] then [b]");
        assert_eq!(rec.placeholders, vec!["b", "c"]);
        assert!(rec.validate().is_ok());
    }

    #[test]
    fn serializes_body_as_template_field() {
        let rec = TemplateRecord::author("X", "[a]").unwrap();
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["template"], "[a]");
        assert!(json.get("body").is_none());
    }

    #[test]
    fn preview_cuts_long_bodies() {
        let rec = TemplateRecord::author("X", "[a] abcdefghij").unwrap();
        assert_eq!(rec.preview(5), "[a] a...");
        assert_eq!(rec.preview(100), "[a] abcdefghij");
    }

    #[test]
    fn missing_values_message_lists_names() {
        let err = ValidationError::MissingValues(vec!["noun".to_string(), "verb".to_string()]);
        assert_eq!(err.to_string(), "no value supplied for: noun, verb");
    }
}
