//! Authoring core for TuneInCrew radio projects.
//!
//! A project is one XML file: the FMOD Designer path, the radio's identity,
//! its jingles and its songs. [`session::EditorSession`] ties the pieces
//! together; the other modules are usable on their own.

pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod metadata;
pub mod platform;
pub mod runner;
pub mod session;
pub mod xml;

pub use document::{DocumentDefaults, Jingle, ProjectDocument, Radio, Song, SongField};
pub use error::{ProjectError, Result};
pub use filter::SongFilter;
pub use metadata::{AudioFormat, MetadataExtractor, PartialMetadata};
pub use session::EditorSession;
