//! In-memory project document: FMOD path, radio identity, jingles and songs.
//!
//! All setters are total over strings. The only normalisation applied is the
//! radio id limit; years, lengths and force values are stored verbatim and
//! left for TuneInCrew to validate.

use serde::Serialize;

use crate::metadata::{format_length, PartialMetadata};

pub const RADIO_ID_MAX_CHARS: usize = 4;
pub const DEFAULT_FMOD_PATH: &str =
    r"C:\Program Files (x86)\FMOD SoundSystem\FMOD Designer\fmod_designercl.exe";
pub const DEFAULT_RADIO_ID: &str = "EXMP";
pub const DEFAULT_RADIO_NAME: &str = "default";
pub const DEFAULT_FORCE: &str = "0";

// ── Song ──────────────────────────────────────────────────────────────────────

/// The six editable song columns, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SongField {
    File,
    Name,
    Artist,
    Year,
    Length,
    Force,
}

impl SongField {
    pub const ALL: [SongField; 6] = [
        Self::File,
        Self::Name,
        Self::Artist,
        Self::Year,
        Self::Length,
        Self::Force,
    ];

    /// Element name used in the project XML.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Name => "name",
            Self::Artist => "artist",
            Self::Year => "year",
            Self::Length => "length",
            Self::Force => "force",
        }
    }
}

/// One song row.
///
/// `visible` and `search_key` are derived: the filter owns `visible`, and
/// `search_key` is rebuilt on every field write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Song {
    file_path: String,
    name: String,
    artist: String,
    year: String,
    length: String,
    force: String,
    visible: bool,
    #[serde(skip)]
    search_key: String,
}

impl Default for Song {
    fn default() -> Self {
        let mut song = Self {
            file_path: String::new(),
            name: String::new(),
            artist: String::new(),
            year: String::new(),
            length: String::new(),
            force: DEFAULT_FORCE.to_string(),
            visible: true,
            search_key: String::new(),
        };
        song.refresh_search_key();
        song
    }
}

impl Song {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(path: impl Into<String>) -> Self {
        let mut song = Self::default();
        song.file_path = path.into();
        song
    }

    pub fn get(&self, field: SongField) -> &str {
        match field {
            SongField::File => &self.file_path,
            SongField::Name => &self.name,
            SongField::Artist => &self.artist,
            SongField::Year => &self.year,
            SongField::Length => &self.length,
            SongField::Force => &self.force,
        }
    }

    pub fn set(&mut self, field: SongField, value: impl Into<String>) {
        let value = value.into();
        match field {
            SongField::File => self.file_path = value,
            SongField::Name => self.name = value,
            SongField::Artist => self.artist = value,
            SongField::Year => self.year = value,
            SongField::Length => self.length = value,
            SongField::Force => self.force = value,
        }
        self.refresh_search_key();
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artist(&self) -> &str {
        &self.artist
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn length(&self) -> &str {
        &self.length
    }

    pub fn force(&self) -> &str {
        &self.force
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Lowercased `"name artist"`, used for case-insensitive search.
    pub fn search_key(&self) -> &str {
        &self.search_key
    }

    /// `"name artist"` as typed, used for case-sensitive search.
    pub(crate) fn raw_search_text(&self) -> String {
        format!("{} {}", self.name, self.artist)
    }

    /// Rows without an audio file are placeholders and never written out.
    pub fn is_placeholder(&self) -> bool {
        self.file_path.is_empty()
    }

    /// Whether this row ends up in the saved XML.
    pub fn is_persisted(&self) -> bool {
        self.visible && !self.is_placeholder()
    }

    /// Copy extracted metadata into fields that are still empty.
    ///
    /// Returns the fields that were written. Running it twice is a no-op the
    /// second time.
    pub fn fill_missing(&mut self, meta: &PartialMetadata) -> Vec<SongField> {
        let mut filled = Vec::new();
        let length = meta.duration_secs.map(format_length);
        let candidates = [
            (SongField::Name, meta.title.as_deref()),
            (SongField::Artist, meta.artist.as_deref()),
            (SongField::Year, meta.date.as_deref()),
            (SongField::Length, length.as_deref()),
        ];
        for (field, value) in candidates {
            let Some(value) = value.filter(|v| !v.is_empty()) else {
                continue;
            };
            if self.get(field).is_empty() {
                self.set(field, value);
                filled.push(field);
            }
        }
        filled
    }

    fn refresh_search_key(&mut self) {
        self.search_key = self.raw_search_text().to_lowercase();
    }
}

// ── Jingle / Radio ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Jingle {
    pub file_path: String,
}

impl Jingle {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }
}

/// Station identity block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Radio {
    id: String,
    name: String,
    logo_path: String,
}

impl Radio {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn logo_path(&self) -> &str {
        &self.logo_path
    }
}

// ── Document ──────────────────────────────────────────────────────────────────

/// Values a freshly created document starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDefaults {
    pub fmod_path: String,
    pub radio_id: String,
    pub radio_name: String,
}

impl Default for DocumentDefaults {
    fn default() -> Self {
        Self {
            fmod_path: DEFAULT_FMOD_PATH.to_string(),
            radio_id: DEFAULT_RADIO_ID.to_string(),
            radio_name: DEFAULT_RADIO_NAME.to_string(),
        }
    }
}

/// The whole project. `Default` is the blank document the parser fills in;
/// [`ProjectDocument::new`] is what a user gets from "new project".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectDocument {
    fmod_path: String,
    radio: Radio,
    jingles: Vec<Jingle>,
    songs: Vec<Song>,
}

impl ProjectDocument {
    pub fn new() -> Self {
        Self::with_defaults(&DocumentDefaults::default())
    }

    /// Fresh document with one empty jingle row and one empty song row.
    pub fn with_defaults(defaults: &DocumentDefaults) -> Self {
        let mut doc = Self::default();
        doc.set_fmod_path(defaults.fmod_path.as_str());
        doc.set_radio_id(&defaults.radio_id);
        doc.set_radio_name(defaults.radio_name.as_str());
        doc.add_jingle("");
        doc.add_song(Song::new());
        doc
    }

    pub fn fmod_path(&self) -> &str {
        &self.fmod_path
    }

    pub fn set_fmod_path(&mut self, path: impl Into<String>) {
        self.fmod_path = path.into();
    }

    pub fn radio(&self) -> &Radio {
        &self.radio
    }

    /// Stores at most [`RADIO_ID_MAX_CHARS`] characters; the rest is dropped.
    pub fn set_radio_id(&mut self, id: &str) {
        self.radio.id = id.chars().take(RADIO_ID_MAX_CHARS).collect();
    }

    pub fn set_radio_name(&mut self, name: impl Into<String>) {
        self.radio.name = name.into();
    }

    pub fn set_radio_logo(&mut self, path: impl Into<String>) {
        self.radio.logo_path = path.into();
    }

    pub fn jingles(&self) -> &[Jingle] {
        &self.jingles
    }

    /// Appends a jingle row and returns its index.
    pub fn add_jingle(&mut self, path: impl Into<String>) -> usize {
        self.jingles.push(Jingle::new(path));
        self.jingles.len() - 1
    }

    pub fn remove_jingle(&mut self, index: usize) -> Option<Jingle> {
        (index < self.jingles.len()).then(|| self.jingles.remove(index))
    }

    pub fn set_jingle_file(&mut self, index: usize, path: impl Into<String>) -> bool {
        match self.jingles.get_mut(index) {
            Some(jingle) => {
                jingle.file_path = path.into();
                true
            }
            None => false,
        }
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn songs_mut(&mut self) -> &mut [Song] {
        &mut self.songs
    }

    pub fn song(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    pub fn song_mut(&mut self, index: usize) -> Option<&mut Song> {
        self.songs.get_mut(index)
    }

    /// Appends a song row and returns its index.
    pub fn add_song(&mut self, song: Song) -> usize {
        self.songs.push(song);
        self.songs.len() - 1
    }

    pub fn remove_song(&mut self, index: usize) -> Option<Song> {
        (index < self.songs.len()).then(|| self.songs.remove(index))
    }

    pub fn set_song_field(
        &mut self,
        index: usize,
        field: SongField,
        value: impl Into<String>,
    ) -> bool {
        match self.songs.get_mut(index) {
            Some(song) => {
                song.set(field, value);
                true
            }
            None => false,
        }
    }

    /// Jingles that will be written: non-empty paths only.
    pub fn persisted_jingles(&self) -> impl Iterator<Item = &Jingle> {
        self.jingles.iter().filter(|j| !j.file_path.is_empty())
    }

    /// Songs that will be written: visible and with an audio path.
    pub fn persisted_songs(&self) -> impl Iterator<Item = &Song> {
        self.songs.iter().filter(|s| s.is_persisted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document_defaults() {
        let doc = ProjectDocument::new();
        assert_eq!(doc.fmod_path(), DEFAULT_FMOD_PATH);
        assert_eq!(doc.radio().id(), "EXMP");
        assert_eq!(doc.radio().name(), "default");
        assert_eq!(doc.radio().logo_path(), "");
        assert_eq!(doc.jingles(), &[Jingle::new("")]);
        assert_eq!(doc.songs().len(), 1);
        assert_eq!(doc.songs()[0].force(), "0");
        assert!(doc.songs()[0].is_placeholder());
    }

    #[test]
    fn test_radio_id_truncates_to_four_chars() {
        let mut doc = ProjectDocument::default();
        doc.set_radio_id("ABCDEFG");
        assert_eq!(doc.radio().id(), "ABCD");
        let stored = doc.radio().id().to_string();
        doc.set_radio_id(&stored);
        assert_eq!(doc.radio().id(), "ABCD");
        doc.set_radio_id("XY");
        assert_eq!(doc.radio().id(), "XY");
    }

    #[test]
    fn test_radio_id_counts_chars_not_bytes() {
        let mut doc = ProjectDocument::default();
        doc.set_radio_id("ÄÖÜßé");
        assert_eq!(doc.radio().id(), "ÄÖÜß");
    }

    #[test]
    fn test_search_key_follows_name_and_artist() {
        let mut song = Song::new();
        song.set(SongField::Name, "Like A Rolling Stone");
        song.set(SongField::Artist, "Bob Dylan");
        assert_eq!(song.search_key(), "like a rolling stone bob dylan");

        song.set(SongField::Artist, "The Band");
        assert_eq!(song.search_key(), "like a rolling stone the band");
        assert_eq!(song.raw_search_text(), "Like A Rolling Stone The Band");
    }

    #[test]
    fn test_values_stored_verbatim() {
        let mut doc = ProjectDocument::default();
        let idx = doc.add_song(Song::with_file("a.mp3"));
        assert!(doc.set_song_field(idx, SongField::Year, "nineteen-ninety"));
        assert!(doc.set_song_field(idx, SongField::Length, "3:7"));
        assert!(doc.set_song_field(idx, SongField::Force, "-1.5"));
        let song = doc.song(idx).unwrap();
        assert_eq!(song.year(), "nineteen-ninety");
        assert_eq!(song.length(), "3:7");
        assert_eq!(song.force(), "-1.5");
    }

    #[test]
    fn test_out_of_range_edits_are_rejected() {
        let mut doc = ProjectDocument::default();
        assert!(doc.remove_song(0).is_none());
        assert!(doc.remove_jingle(3).is_none());
        assert!(!doc.set_song_field(0, SongField::Name, "x"));
        assert!(!doc.set_jingle_file(0, "x.wav"));
    }

    #[test]
    fn test_order_preserved_across_removal() {
        let mut doc = ProjectDocument::default();
        for path in ["a.mp3", "b.mp3", "c.mp3"] {
            doc.add_song(Song::with_file(path));
        }
        let removed = doc.remove_song(1).unwrap();
        assert_eq!(removed.file_path(), "b.mp3");
        let paths: Vec<_> = doc.songs().iter().map(|s| s.file_path()).collect();
        assert_eq!(paths, ["a.mp3", "c.mp3"]);
    }

    #[test]
    fn test_fill_missing_keeps_user_values() {
        let meta = PartialMetadata {
            title: Some("Y".into()),
            artist: Some("Tag Artist".into()),
            date: Some("1999".into()),
            duration_secs: Some(185),
        };

        let mut song = Song::with_file("x.mp3");
        song.set(SongField::Name, "X");
        let filled = song.fill_missing(&meta);
        assert_eq!(song.name(), "X");
        assert_eq!(song.artist(), "Tag Artist");
        assert_eq!(song.year(), "1999");
        assert_eq!(song.length(), "3:05");
        assert_eq!(
            filled,
            vec![SongField::Artist, SongField::Year, SongField::Length]
        );

        let mut empty = Song::with_file("x.mp3");
        empty.fill_missing(&meta);
        assert_eq!(empty.name(), "Y");

        assert!(empty.fill_missing(&meta).is_empty());
    }

    #[test]
    fn test_persisted_rows_skip_placeholders_and_hidden() {
        let mut doc = ProjectDocument::new();
        doc.add_jingle("j.wav");
        doc.add_song(Song::with_file("shown.mp3"));
        let hidden = doc.add_song(Song::with_file("hidden.mp3"));
        doc.song_mut(hidden).unwrap().set_visible(false);

        assert_eq!(doc.persisted_jingles().count(), 1);
        let songs: Vec<_> = doc.persisted_songs().map(|s| s.file_path()).collect();
        assert_eq!(songs, ["shown.mp3"]);
    }
}
