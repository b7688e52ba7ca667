//! Session state: the library, where it lives, and the template being authored.
//!
//! A driver (CLI, request handler, UI controller) owns one `Session` and routes
//! every user action through it.

use log::{debug, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::Config;
use crate::core::engine::{extract, placeholders_in};
use crate::core::generation::{
    generate_template, parse_candidate, GenerationError, GenerationRequest, TemplateGenerator,
};
use crate::core::library::{Library, LibraryError, Upserted};
use crate::genre_templates;
use crate::schema::fill::FillIn;
use crate::schema::template::{TemplateRecord, ValidationError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("library error: {0}")]
    Library(#[from] LibraryError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no library file chosen; use save-as first")]
    NoDestination,
    #[error("no template generator configured")]
    NoGenerator,
}

/// The template currently being authored. Not part of the library until saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub body: String,
    pub placeholders: Vec<String>,
}

impl Draft {
    /// The placeholder list is re-derived from the body, so records from older
    /// files that list a name more than once can be saved again.
    fn from_record(record: TemplateRecord) -> Self {
        let placeholders = placeholders_in(&record.body);
        Self {
            title: record.title,
            body: record.body,
            placeholders,
        }
    }
}

/// One user's working state.
pub struct Session {
    library: Library,
    library_path: Option<PathBuf>,
    draft: Draft,
    generator: Option<Box<dyn TemplateGenerator>>,
}

/// Builder for constructing a `Session`.
pub struct SessionBuilder {
    library_path: Option<PathBuf>,
    seed_examples: bool,
    /// Directly provided library (skips loading from `library_path`).
    library: Option<Library>,
    generator: Option<Box<dyn TemplateGenerator>>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder {
            library_path: None,
            seed_examples: false,
            library: None,
            generator: None,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn library_path(&self) -> Option<&Path> {
        self.library_path.as_deref()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn titles(&self) -> Vec<&str> {
        self.library.list()
    }

    pub fn find(&self, title: &str) -> Option<&TemplateRecord> {
        self.library.find(title)
    }

    // --- authoring -------------------------------------------------------

    /// Discard the draft and start an empty one.
    pub fn new_draft(&mut self) {
        self.draft = Draft::default();
    }

    pub fn set_title(&mut self, title: &str) {
        self.draft.title = title.trim().to_string();
    }

    /// Set the draft body and extract its placeholders.
    pub fn extract(&mut self, body: &str) -> Result<&[String], SessionError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ValidationError::EmptyBody.into());
        }
        let extraction = extract(body);
        self.draft.body = extraction.body;
        self.draft.placeholders = extraction.placeholders;
        Ok(&self.draft.placeholders)
    }

    /// Store the draft under its title, replacing any record with that title,
    /// and persist the library.
    pub fn save_draft(&mut self) -> Result<Upserted, SessionError> {
        let record = self.publishable_draft()?;
        let destination = self.destination()?;
        let snapshot = self.library.clone();
        let outcome = self.library.upsert(record);
        self.persist_or_restore(&destination, snapshot)?;
        Ok(outcome)
    }

    /// Load a stored record into the draft for editing.
    pub fn edit(&mut self, title: &str) -> Result<&Draft, SessionError> {
        let record = self
            .library
            .find(title)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(title.to_string()))?;
        self.draft = Draft::from_record(record);
        Ok(&self.draft)
    }

    /// Read a single template file into the draft. The file is validated the
    /// same way as generated output.
    pub fn import_template(&mut self, path: &Path) -> Result<&Draft, SessionError> {
        let contents = std::fs::read_to_string(path)?;
        let record = parse_candidate(&contents)?;
        debug!("imported '{}' from {}", record.title, path.display());
        self.draft = Draft::from_record(record);
        Ok(&self.draft)
    }

    /// Ask the configured generator for a template and make it the draft.
    pub fn generate(&mut self, request: &GenerationRequest) -> Result<&Draft, SessionError> {
        let generator = self.generator.as_deref().ok_or(SessionError::NoGenerator)?;
        let record = generate_template(generator, request)?;
        self.draft = Draft::from_record(record);
        Ok(&self.draft)
    }

    // --- managing --------------------------------------------------------

    /// Rename a stored record and persist. A draft opened from `from` follows
    /// the rename.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), SessionError> {
        let to = to.trim();
        if to.is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        let destination = self.destination()?;
        let snapshot = self.library.clone();
        self.library.rename(from, to)?;
        self.persist_or_restore(&destination, snapshot)?;
        if self.draft.title == from {
            self.draft.title = to.to_string();
        }
        Ok(())
    }

    /// Delete a stored record and persist. Callers should confirm first.
    pub fn delete(&mut self, title: &str) -> Result<TemplateRecord, SessionError> {
        let destination = self.destination()?;
        let snapshot = self.library.clone();
        let removed = self.library.remove(title)?;
        self.persist_or_restore(&destination, snapshot)?;
        Ok(removed)
    }

    /// Add every catalog example whose title is not already in the library.
    /// Returns how many were added.
    pub fn install_examples(&mut self) -> Result<usize, SessionError> {
        let destination = self.destination()?;
        let snapshot = self.library.clone();
        let mut added = 0;
        for record in genre_templates::all() {
            if !self.library.contains(&record.title) {
                self.library.add(record)?;
                added += 1;
            }
        }
        if added > 0 {
            self.persist_or_restore(&destination, snapshot)?;
        }
        info!("installed {} example templates", added);
        Ok(added)
    }

    /// Replace the library with the one stored at `path` and save there from now on.
    pub fn open(&mut self, path: &Path) -> Result<(), SessionError> {
        self.library = Library::try_load(path)?;
        self.library_path = Some(path.to_path_buf());
        info!("opened {} ({} templates)", path.display(), self.library.len());
        Ok(())
    }

    /// Write the library to `path` and save there from now on.
    pub fn save_as(&mut self, path: &Path) -> Result<(), SessionError> {
        self.library.save(path)?;
        self.library_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Write the library to its current path.
    pub fn save(&self) -> Result<(), SessionError> {
        let destination = self.destination()?;
        self.library.save(&destination)?;
        Ok(())
    }

    // --- playing ---------------------------------------------------------

    /// Start filling in the stored template `title`.
    pub fn start_play(&self, title: &str) -> Result<FillIn, SessionError> {
        let record = self
            .library
            .find(title)
            .ok_or_else(|| LibraryError::NotFound(title.to_string()))?;
        Ok(record.fill())
    }

    /// Render the stored template `title` with `fill`.
    pub fn render(&self, title: &str, fill: &FillIn) -> Result<String, SessionError> {
        let record = self
            .library
            .find(title)
            .ok_or_else(|| LibraryError::NotFound(title.to_string()))?;
        Ok(fill.render(record)?)
    }

    fn publishable_draft(&self) -> Result<TemplateRecord, ValidationError> {
        if self.draft.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.draft.body.trim().is_empty() {
            return Err(ValidationError::EmptyBody);
        }
        if self.draft.placeholders.is_empty() {
            return Err(ValidationError::NoPlaceholders);
        }
        let record = TemplateRecord {
            title: self.draft.title.clone(),
            body: self.draft.body.clone(),
            placeholders: self.draft.placeholders.clone(),
        };
        record.validate()?;
        Ok(record)
    }

    fn destination(&self) -> Result<PathBuf, SessionError> {
        self.library_path.clone().ok_or(SessionError::NoDestination)
    }

    fn persist_or_restore(
        &mut self,
        destination: &Path,
        snapshot: Library,
    ) -> Result<(), SessionError> {
        if let Err(e) = self.library.save(destination) {
            self.library = snapshot;
            return Err(e.into());
        }
        Ok(())
    }
}

impl SessionBuilder {
    pub fn library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    /// Start with the example catalog when the loaded library is empty.
    pub fn seed_examples(mut self, seed: bool) -> Self {
        self.seed_examples = seed;
        self
    }

    /// Provide the library directly instead of loading it.
    pub fn with_library(mut self, library: Library) -> Self {
        self.library = Some(library);
        self
    }

    pub fn with_generator(mut self, generator: impl TemplateGenerator + 'static) -> Self {
        self.generator = Some(Box::new(generator));
        self
    }

    /// Apply `library_path` and `seed_examples` from `config`.
    pub fn config(self, config: &Config) -> Self {
        self.library_path(config.library_path())
            .seed_examples(config.seed_examples)
    }

    pub fn build(self) -> Session {
        let mut library = match (self.library, &self.library_path) {
            (Some(library), _) => library,
            (None, Some(path)) => Library::load(path),
            (None, None) => Library::default(),
        };

        if self.seed_examples && library.is_empty() {
            library = Library::from_records(genre_templates::all());
            debug!("seeded library with {} examples", library.len());
        }

        Session {
            library,
            library_path: self.library_path,
            draft: Draft::default(),
            generator: self.generator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_in(dir: &Path) -> Session {
        Session::builder()
            .library_path(dir.join("madlibs.json"))
            .build()
    }

    #[test]
    fn save_draft_requires_title_and_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());

        session.extract("Hi [name]").unwrap();
        assert!(matches!(
            session.save_draft(),
            Err(SessionError::Validation(ValidationError::EmptyTitle))
        ));

        session.set_title("Greeting");
        session.extract("no blanks").unwrap();
        assert!(matches!(
            session.save_draft(),
            Err(SessionError::Validation(ValidationError::NoPlaceholders))
        ));
        assert!(session.library().is_empty());
    }

    #[test]
    fn extract_rejects_blank_body() {
        let mut session = Session::builder().build();
        assert!(matches!(
            session.extract("  "),
            Err(SessionError::Validation(ValidationError::EmptyBody))
        ));
    }

    #[test]
    fn save_draft_inserts_then_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        session.set_title("Greeting");
        session.extract("Hi [name]").unwrap();
        assert_eq!(session.save_draft().unwrap(), Upserted::Inserted);

        session.extract("Bye [name], [friend]").unwrap();
        assert_eq!(session.save_draft().unwrap(), Upserted::Replaced);
        assert_eq!(session.titles(), vec!["Greeting"]);
        assert_eq!(
            session.find("Greeting").unwrap().placeholders,
            vec!["name", "friend"]
        );
    }

    #[test]
    fn mutations_need_a_destination() {
        let mut session = Session::builder().build();
        session.set_title("T");
        session.extract("[x]").unwrap();
        assert!(matches!(session.save_draft(), Err(SessionError::NoDestination)));
        assert!(session.library().is_empty());
    }

    #[test]
    fn failed_persist_restores_library() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::builder()
            .library_path(dir.path().join("missing_dir").join("madlibs.json"))
            .build();
        session.set_title("T");
        session.extract("[x]").unwrap();
        assert!(matches!(session.save_draft(), Err(SessionError::Library(_))));
        assert!(session.library().is_empty());
    }

    #[test]
    fn edit_loads_record_into_draft() {
        let mut library = Library::new();
        library.upsert(TemplateRecord::author("Story", "A [noun] story").unwrap());
        let mut session = Session::builder().with_library(library).build();
        let draft = session.edit("Story").unwrap();
        assert_eq!(draft.body, "A [noun] story");
        assert!(matches!(
            session.edit("Other"),
            Err(SessionError::Library(LibraryError::NotFound(_)))
        ));
    }

    #[test]
    fn play_unknown_title_is_not_found() {
        let session = Session::builder().build();
        assert!(matches!(
            session.start_play("Nope"),
            Err(SessionError::Library(LibraryError::NotFound(_)))
        ));
    }

    #[test]
    fn generate_without_generator() {
        let mut session = Session::builder().build();
        assert!(matches!(
            session.generate(&GenerationRequest::new("pirates")),
            Err(SessionError::NoGenerator)
        ));
    }

    #[test]
    fn seed_examples_only_when_empty() {
        let session = Session::builder().seed_examples(true).build();
        assert_eq!(session.library().len(), 15);

        let mut library = Library::new();
        library.upsert(TemplateRecord::author("Mine", "[x]").unwrap());
        let session = Session::builder()
            .with_library(library)
            .seed_examples(true)
            .build();
        assert_eq!(session.titles(), vec!["Mine"]);
    }

    #[test]
    fn rename_carries_the_open_draft() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        session.set_title("A");
        session.extract("[x] and [y]").unwrap();
        session.save_draft().unwrap();

        session.edit("A").unwrap();
        session.rename("A", " B ").unwrap();
        assert_eq!(session.draft().title, "B");

        assert_eq!(session.save_draft().unwrap(), Upserted::Replaced);
        assert_eq!(session.titles(), vec!["B"]);
    }

    #[test]
    fn rename_leaves_unrelated_draft_alone() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session_in(dir.path());
        for title in ["A", "C"] {
            session.set_title(title);
            session.extract("[x]").unwrap();
            session.save_draft().unwrap();
        }
        session.rename("A", "B").unwrap();
        assert_eq!(session.draft().title, "C");
    }

    #[test]
    fn edit_repairs_repeated_placeholder_list() {
        let mut library = Library::new();
        library
            .add(TemplateRecord {
                title: "Old".to_string(),
                body: "[verb] then [noun] then [verb]".to_string(),
                placeholders: vec!["verb".into(), "noun".into(), "verb".into()],
            })
            .unwrap();
        let mut session = Session::builder().with_library(library).build();

        let draft = session.edit("Old").unwrap();
        assert_eq!(draft.placeholders, vec!["verb", "noun"]);
    }
}
