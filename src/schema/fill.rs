use rustc_hash::FxHashSet;
use std::collections::HashMap;

use crate::core::engine::render;
use crate::schema::template::{TemplateRecord, ValidationError};

/// Values collected for one play-through of a template. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillIn {
    placeholders: Vec<String>,
    values: HashMap<String, String>,
}

impl FillIn {
    /// Repeated names are asked for once, at their first position.
    pub fn new(placeholders: Vec<String>) -> Self {
        let mut seen = FxHashSet::default();
        let placeholders = placeholders
            .into_iter()
            .filter(|p| seen.insert(p.clone()))
            .collect();
        Self {
            placeholders,
            values: HashMap::new(),
        }
    }

    /// Placeholder names in the order they should be asked for.
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Record a value for `name`. The value is trimmed; names the template
    /// does not ask for are ignored and `false` is returned.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        if !self.placeholders.iter().any(|p| p == name) {
            return false;
        }
        self.values.insert(name.to_string(), value.trim().to_string());
        true
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Placeholders still lacking a non-empty value, in placeholder order.
    pub fn missing(&self) -> Vec<String> {
        self.placeholders
            .iter()
            .filter(|p| self.values.get(p.as_str()).map_or(true, |v| v.is_empty()))
            .cloned()
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    pub fn values(&self) -> &HashMap<String, String> {
        &self.values
    }

    /// Render `record` with the collected values, refusing while any blank is unfilled.
    pub fn render(&self, record: &TemplateRecord) -> Result<String, ValidationError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(ValidationError::MissingValues(missing));
        }
        Ok(render(&record.body, &self.values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeting() -> TemplateRecord {
        TemplateRecord::author("Greeting", "Hi [name], you are [adjective]!").unwrap()
    }

    #[test]
    fn fill_renders_when_complete() {
        let record = greeting();
        let mut fill = record.fill();
        assert!(fill.set("name", "Ann"));
        assert!(fill.set("adjective", " brave "));
        assert!(fill.is_complete());
        assert_eq!(fill.render(&record).unwrap(), "Hi Ann, you are brave!");
    }

    #[test]
    fn fill_reports_missing_in_order() {
        let record = greeting();
        let mut fill = record.fill();
        fill.set("adjective", "bold");
        assert_eq!(fill.missing(), vec!["name"]);
        assert_eq!(
            fill.render(&record),
            Err(ValidationError::MissingValues(vec!["name".to_string()]))
        );
    }

    #[test]
    fn whitespace_value_counts_as_missing() {
        let record = greeting();
        let mut fill = record.fill();
        fill.set("name", "   ");
        fill.set("adjective", "bold");
        assert_eq!(fill.missing(), vec!["name"]);
    }

    #[test]
    fn repeated_names_asked_once() {
        let fill = FillIn::new(vec!["verb".into(), "noun".into(), "verb".into()]);
        assert_eq!(fill.placeholders(), ["verb", "noun"]);
    }

    #[test]
    fn unknown_names_are_ignored() {
        let mut fill = greeting().fill();
        assert!(!fill.set("colour", "red"));
        assert_eq!(fill.get("colour"), None);
    }
}
