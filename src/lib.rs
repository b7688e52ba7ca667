//! Mad Libs engine - fill-in-the-blank story templates.
//!
//! Extracts `[placeholder]` tokens from authored stories, keeps a persisted
//! library of templates keyed by title, and renders finished stories from
//! user-supplied words.

pub mod core;
pub mod genre_templates;
pub mod schema;
