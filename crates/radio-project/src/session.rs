//! The document being edited plus where it lives on disk.
//!
//! Everything here runs synchronously on the caller's thread. The only
//! background work is a TuneInCrew run, which hands back a [`ToolRun`].

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::document::{DocumentDefaults, ProjectDocument, Song, SongField};
use crate::error::{ProjectError, Result};
use crate::filter::SongFilter;
use crate::metadata::{AudioFormat, LoftyTags, MetadataExtractor, TagSource};
use crate::platform::TEMP_PROJECT_FILE;
use crate::runner::{self, ToolRun};
use crate::xml;

pub struct EditorSession<S = LoftyTags> {
    document: ProjectDocument,
    current_file: Option<PathBuf>,
    filter: SongFilter,
    extractor: MetadataExtractor<S>,
}

impl EditorSession<LoftyTags> {
    pub fn new(defaults: &DocumentDefaults) -> Self {
        Self::with_extractor(defaults, MetadataExtractor::new())
    }

    /// Session over an existing project file.
    pub fn open(path: &Path) -> Result<Self> {
        let mut session = Self::new(&DocumentDefaults::default());
        session.load(path)?;
        Ok(session)
    }
}

impl<S: TagSource> EditorSession<S> {
    pub fn with_extractor(defaults: &DocumentDefaults, extractor: MetadataExtractor<S>) -> Self {
        Self {
            document: ProjectDocument::with_defaults(defaults),
            current_file: None,
            filter: SongFilter::default(),
            extractor,
        }
    }

    pub fn document(&self) -> &ProjectDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut ProjectDocument {
        &mut self.document
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    pub fn filter(&self) -> &SongFilter {
        &self.filter
    }

    // ── Load / save ──────────────────────────────────────────────────────────

    /// Replace the document with the contents of `path`.
    ///
    /// The file is fully parsed before anything is touched; on error the
    /// session keeps its previous document and file.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let document = xml::read_file(path)?;
        self.document = document;
        self.current_file = Some(path.to_path_buf());
        Ok(())
    }

    /// Write to the file the document came from.
    pub fn save(&self) -> Result<&Path> {
        let path = self
            .current_file
            .as_deref()
            .ok_or(ProjectError::NoCurrentFile)?;
        xml::write_file(&self.document, path)?;
        Ok(path)
    }

    /// Write to `path` and make it the current file.
    pub fn save_as(&mut self, path: &Path) -> Result<()> {
        xml::write_file(&self.document, path)?;
        self.current_file = Some(path.to_path_buf());
        Ok(())
    }

    // ── Search ───────────────────────────────────────────────────────────────

    /// Apply a search. Hidden songs are also left out of the next save.
    pub fn set_filter(&mut self, filter: SongFilter) -> usize {
        self.filter = filter;
        let shown = self.filter.apply(self.document.songs_mut());
        debug!(
            "Search {:?} (case sensitive: {}) shows {} of {} songs",
            self.filter.query,
            self.filter.case_sensitive,
            shown,
            self.document.songs().len()
        );
        shown
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(SongFilter::default());
    }

    // ── Songs ────────────────────────────────────────────────────────────────

    /// Set a song's audio path, then fill its empty fields from the file's
    /// tags.
    ///
    /// Returns `None` for a bad index, otherwise the fields extraction filled
    /// (empty when the file is missing, unsupported or unreadable).
    pub fn set_song_file(&mut self, index: usize, path: &str) -> Option<Vec<SongField>> {
        let song = self.document.song_mut(index)?;
        song.set(SongField::File, path);
        Some(fill_from_tags(&self.extractor, song))
    }

    /// Append a song for `path`, pre-filled from its tags.
    pub fn add_song_from_file(&mut self, path: &str) -> (usize, Vec<SongField>) {
        let mut song = Song::with_file(path);
        let filled = fill_from_tags(&self.extractor, &mut song);
        (self.document.add_song(song), filled)
    }

    // ── TuneInCrew ───────────────────────────────────────────────────────────

    /// Launch TuneInCrew on this project, using the working directory for
    /// the scratch file when the project was never saved.
    pub fn run_tool(&self, tool: &Path) -> Result<ToolRun> {
        let cwd = std::env::current_dir().map_err(|e| ProjectError::io(".", e))?;
        self.run_tool_in(tool, &cwd)
    }

    /// Launch TuneInCrew on the current file, or on a fresh
    /// `temp_radio.xml` in `scratch_dir` when there is none.
    ///
    /// A project that already has a file is run as last saved.
    pub fn run_tool_in(&self, tool: &Path, scratch_dir: &Path) -> Result<ToolRun> {
        runner::validate_tool_path(tool)?;

        let xml_path = match &self.current_file {
            Some(path) => path.clone(),
            None => {
                let temp = scratch_dir.join(TEMP_PROJECT_FILE);
                xml::write_file(&self.document, &temp)?;
                temp
            }
        };

        runner::spawn(tool, &xml_path)
    }
}

fn fill_from_tags<S: TagSource>(
    extractor: &MetadataExtractor<S>,
    song: &mut Song,
) -> Vec<SongField> {
    let path = Path::new(song.file_path());
    if song.is_placeholder() || AudioFormat::from_path(path).is_err() || !path.is_file() {
        return Vec::new();
    }

    match extractor.extract(path) {
        Ok(meta) if meta.is_empty() => {
            debug!("No metadata found in {}", song.file_path());
            Vec::new()
        }
        Ok(meta) => {
            let filled = song.fill_missing(&meta);
            if !filled.is_empty() {
                info!("Filled {:?} from tags of {}", filled, song.file_path());
            }
            filled
        }
        Err(e) => {
            warn!("Metadata extraction error: {}", e);
            Vec::new()
        }
    }
}
