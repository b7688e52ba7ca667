//! Template generation through an injected collaborator.
//!
//! The engine never talks to a text-generation service itself. A caller supplies
//! a [`TemplateGenerator`] that turns a [`GenerationRequest`] into raw response
//! text; the engine finds the JSON object in that text and accepts it only if it
//! describes a publishable template.

use log::{debug, warn};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::core::engine::placeholders_in;
use crate::schema::template::{TemplateRecord, ValidationError};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("theme description must not be empty")]
    EmptyTheme,
    #[error("generator failed: {0}")]
    Collaborator(String),
    #[error("response contains no JSON object")]
    NoJsonObject,
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid template: {0}")]
    Validation(#[from] ValidationError),
}

/// Tone requested from the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Funny,
    Serious,
    Mysterious,
    Educational,
    Silly,
}

/// How elaborate the generated story should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Complexity {
    Simple,
    #[default]
    Medium,
    Complex,
}

impl Style {
    pub const ALL: [Style; 5] = [
        Style::Funny,
        Style::Serious,
        Style::Mysterious,
        Style::Educational,
        Style::Silly,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Style::Funny => "funny",
            Style::Serious => "serious",
            Style::Mysterious => "mysterious",
            Style::Educational => "educational",
            Style::Silly => "silly",
        }
    }
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [Complexity::Simple, Complexity::Medium, Complexity::Complex];

    pub fn name(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Medium => "medium",
            Complexity::Complex => "complex",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown style '{}'", s))
    }
}

impl FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Complexity::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown complexity '{}'", s))
    }
}

/// Sample theme descriptions offered to users who want inspiration.
pub const EXAMPLE_THEMES: [&str; 4] = [
    "Create a Mad Lib about a haunted house adventure with ghosts and secret passages.",
    "Make a funny Mad Lib about someone's first day at a new job.",
    "Write a Mad Lib about an alien visiting Earth for the first time.",
    "Create a Mad Lib about a cooking competition that goes hilariously wrong.",
];

/// What the user asked the generator for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub theme: String,
    pub style: Style,
    pub complexity: Complexity,
}

impl GenerationRequest {
    pub fn new(theme: impl Into<String>) -> Self {
        Self {
            theme: theme.into(),
            style: Style::default(),
            complexity: Complexity::default(),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    /// Instructions describing the expected response shape.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are a creative Mad Libs template generator.\n\
             Create a {complexity} complexity, {style}-style Mad Lib template based on the user's description.\n\
             \n\
             Your response should be in JSON format with the following structure:\n\
             {{\n  \"title\": \"Title of the Mad Lib\",\n  \"template\": \"The template text with [placeholder] words in brackets\",\n  \"placeholders\": [\"placeholder1\", \"placeholder2\", ...]\n}}\n\
             \n\
             Guidelines:\n\
             1. Use [noun], [verb], [adjective], etc. for placeholders\n\
             2. Be specific with placeholders like [animal], [color], [food], etc.\n\
             3. Include 10-20 placeholders depending on complexity\n\
             4. Make sure each placeholder in the template is also in the placeholders list\n\
             5. The template should be coherent and fun to play\n\
             6. Ensure the story makes sense when placeholders are filled in\n\
             7. Use creative and varied placeholders\n",
            complexity = self.complexity,
            style = self.style,
        )
    }
}

/// A source of candidate templates, typically a wrapper around a text-generation service.
pub trait TemplateGenerator {
    /// Return the raw response text for `request`.
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

impl<F> TemplateGenerator for F
where
    F: Fn(&GenerationRequest) -> Result<String, GenerationError>,
{
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self(request)
    }
}

/// Ask `generator` for a template and validate what comes back.
pub fn generate_template(
    generator: &dyn TemplateGenerator,
    request: &GenerationRequest,
) -> Result<TemplateRecord, GenerationError> {
    if request.theme.trim().is_empty() {
        return Err(GenerationError::EmptyTheme);
    }
    debug!(
        "requesting {} {} template",
        request.complexity, request.style
    );
    let raw = generator.generate(request)?;
    parse_candidate(&raw)
}

/// The outermost `{ ... }` span of `text`, if any.
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse and validate a candidate template from raw collaborator output.
///
/// The payload must carry `title`, `template` and `placeholders` with the
/// right types, and every declared placeholder must occur as a `[token]` in
/// the template. The accepted record's placeholder list is re-derived from the
/// template so it is always distinct and in order of first appearance.
pub fn parse_candidate(raw: &str) -> Result<TemplateRecord, GenerationError> {
    let json = find_json_object(raw).ok_or(GenerationError::NoJsonObject)?;
    let value: Value = serde_json::from_str(json)?;
    Ok(validate_candidate(&value)?)
}

/// Validate an already-parsed payload. See [`parse_candidate`].
pub fn validate_candidate(value: &Value) -> Result<TemplateRecord, ValidationError> {
    let title = string_field(value, "title")?;
    let body = string_field(value, "template")?;
    let declared = match value.get("placeholders") {
        None | Some(Value::Null) => return Err(ValidationError::MissingField("placeholders")),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().ok_or(ValidationError::InvalidField {
                    field: "placeholders",
                    expected: "a list of strings",
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => {
            return Err(ValidationError::InvalidField {
                field: "placeholders",
                expected: "a list of strings",
            })
        }
    };

    let found = placeholders_in(body);
    if let Some(unknown) = declared.iter().find(|p| !found.iter().any(|f| f == *p)) {
        return Err(ValidationError::UnknownPlaceholder(unknown.to_string()));
    }
    for extra in found.iter().filter(|f| !declared.contains(&f.as_str())) {
        warn!("generated template uses undeclared placeholder '{}'", extra);
    }

    let record = TemplateRecord::author(title, body)?;
    debug!(
        "accepted generated template '{}' with {} placeholders",
        record.title,
        record.placeholders.len()
    );
    Ok(record)
}

fn string_field<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, ValidationError> {
    match value.get(field) {
        None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(ValidationError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}
