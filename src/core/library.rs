//! Library store - the user's ordered collection of templates, keyed by title,
//! persisted as a flat JSON array of `{title, template, placeholders}` objects.

use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::schema::template::TemplateRecord;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("a template titled '{0}' already exists")]
    DuplicateTitle(String),
    #[error("no template titled '{0}'")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not replace library file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Whether an upsert replaced an existing record or appended a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Replaced,
}

/// Ordered collection of templates with unique titles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Library {
    records: Vec<TemplateRecord>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from records, keeping the first of any repeated title.
    pub fn from_records(records: Vec<TemplateRecord>) -> Self {
        let mut seen = FxHashSet::default();
        let mut kept = Vec::with_capacity(records.len());
        for record in records {
            if seen.insert(record.title.clone()) {
                kept.push(record);
            } else {
                warn!("dropping duplicate template title '{}'", record.title);
            }
        }
        Self { records: kept }
    }

    /// Append a record. Fails if the title is already taken.
    pub fn add(&mut self, record: TemplateRecord) -> Result<(), LibraryError> {
        if self.position(&record.title).is_some() {
            return Err(LibraryError::DuplicateTitle(record.title));
        }
        info!("adding template '{}'", record.title);
        self.records.push(record);
        Ok(())
    }

    /// Replace the record with the same title in place, or append it.
    pub fn upsert(&mut self, record: TemplateRecord) -> Upserted {
        match self.position(&record.title) {
            Some(idx) => {
                info!("replacing template '{}'", record.title);
                self.records[idx] = record;
                Upserted::Replaced
            }
            None => {
                info!("adding template '{}'", record.title);
                self.records.push(record);
                Upserted::Inserted
            }
        }
    }

    /// Delete the record titled `title`, returning it.
    pub fn remove(&mut self, title: &str) -> Result<TemplateRecord, LibraryError> {
        let idx = self
            .position(title)
            .ok_or_else(|| LibraryError::NotFound(title.to_string()))?;
        info!("removing template '{}'", title);
        Ok(self.records.remove(idx))
    }

    /// Give the record titled `from` the title `to`, keeping its position.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<(), LibraryError> {
        let idx = self
            .position(from)
            .ok_or_else(|| LibraryError::NotFound(from.to_string()))?;
        if from == to {
            return Ok(());
        }
        if self.position(to).is_some() {
            return Err(LibraryError::DuplicateTitle(to.to_string()));
        }
        info!("renaming template '{}' to '{}'", from, to);
        self.records[idx].title = to.to_string();
        Ok(())
    }

    /// Exact, case-sensitive lookup.
    pub fn find(&self, title: &str) -> Option<&TemplateRecord> {
        self.records.iter().find(|r| r.title == title)
    }

    pub fn contains(&self, title: &str) -> bool {
        self.position(title).is_some()
    }

    /// Titles in display order.
    pub fn list(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.title.as_str()).collect()
    }

    pub fn records(&self) -> &[TemplateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pick a record uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&TemplateRecord> {
        self.records.choose(rng)
    }

    /// Parse a library from its JSON form.
    pub fn from_json(input: &str) -> Result<Library, LibraryError> {
        let records: Vec<TemplateRecord> = serde_json::from_str(input)?;
        Ok(Self::from_records(records))
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, LibraryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a library file, reporting any failure.
    pub fn try_load(path: &Path) -> Result<Library, LibraryError> {
        let contents = std::fs::read_to_string(path)?;
        let library = Self::from_json(&contents)?;
        debug!("loaded {} templates from {}", library.len(), path.display());
        Ok(library)
    }

    /// Load a library file, falling back to an empty library if it is
    /// missing or unreadable.
    pub fn load(path: &Path) -> Library {
        match Self::try_load(path) {
            Ok(library) => library,
            Err(LibraryError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                debug!("no library at {}, starting empty", path.display());
                Library::default()
            }
            Err(e) => {
                warn!(
                    "could not load library from {}: {}; starting empty",
                    path.display(),
                    e
                );
                Library::default()
            }
        }
    }

    /// Write the library to `path`.
    ///
    /// The content goes to a temporary file in the same directory which is
    /// then renamed over `path`, so a failed save leaves the old file intact.
    /// An existing file keeps its permissions.
    pub fn save(&self, path: &Path) -> Result<(), LibraryError> {
        let json = self.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        if let Ok(existing) = std::fs::metadata(path) {
            tmp.as_file().set_permissions(existing.permissions())?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(path)?;
        debug!("saved {} templates to {}", self.len(), path.display());
        Ok(())
    }

    fn position(&self, title: &str) -> Option<usize> {
        self.records.iter().position(|r| r.title == title)
    }
}
