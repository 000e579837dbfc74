//! Best-effort song metadata from audio tags, using lofty.
//!
//! Each container has an ordered list of candidate tag keys per field: the
//! container's native spelling first, then generic aliases. The first key
//! present with a non-empty value wins; values are never merged across keys.
//! Duration comes from the stream properties, not from tags.

use lofty::prelude::*;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag, TagType};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::error::{ProjectError, Result};

/// Native tag key -> first text value.
pub type TagMap = HashMap<String, String>;

/// Audio containers the extractor knows candidate keys for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Flac,
    Wav,
}

impl AudioFormat {
    /// Dispatch on the (case-insensitive) file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "mp3" => Ok(Self::Mp3),
            "flac" => Ok(Self::Flac),
            "wav" => Ok(Self::Wav),
            _ => Err(ProjectError::UnsupportedFormat(ext)),
        }
    }

    pub fn title_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Mp3 => &["TIT2", "TITLE", "Title", "title"],
            Self::Flac => &["TITLE", "Title", "title"],
            Self::Wav => &["TIT2", "INAM", "TITLE", "Title", "title"],
        }
    }

    pub fn artist_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Mp3 => &["TPE1", "ARTIST", "Artist", "artist"],
            Self::Flac => &["ARTIST", "Artist", "artist"],
            Self::Wav => &["TPE1", "IART", "ARTIST", "Artist", "artist"],
        }
    }

    pub fn date_keys(&self) -> &'static [&'static str] {
        match self {
            Self::Mp3 => &["TDRC", "DATE", "Date", "date", "YEAR", "Year", "year"],
            Self::Flac => &["DATE", "Date", "date", "YEAR", "Year", "year"],
            Self::Wav => &[
                "TDRC", "ICRD", "DATE", "Date", "date", "YEAR", "Year", "year",
            ],
        }
    }
}

/// What the extractor managed to find. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub date: Option<String>,
    pub duration_secs: Option<u64>,
}

impl PartialMetadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.date.is_none()
            && self.duration_secs.is_none()
    }
}

/// Raw view of one audio file as returned by a [`TagSource`].
#[derive(Debug, Clone, Default)]
pub struct RawTags {
    pub entries: TagMap,
    pub duration_secs: Option<u64>,
}

/// Tag backend seam. Production code uses [`LoftyTags`].
pub trait TagSource {
    fn probe(&self, path: &Path) -> Result<RawTags>;
}

/// lofty-backed tag reader.
///
/// Keys are reported in the native spelling of the tag they came from
/// (`TIT2` for ID3v2, `TITLE` for Vorbis comments, `INAM` for RIFF INFO).
/// ID3v1 has no key names of its own and is reported with ID3v2 frame ids.
/// The primary tag is read first; the first occurrence of a key wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTags;

impl TagSource for LoftyTags {
    fn probe(&self, path: &Path) -> Result<RawTags> {
        let failed = |e: lofty::error::LoftyError| ProjectError::ExtractionFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let tagged_file = Probe::open(path).map_err(failed)?.read().map_err(failed)?;

        let primary = tagged_file.primary_tag_type();
        let mut tags: Vec<&Tag> = tagged_file.tags().iter().collect();
        tags.sort_by_key(|t| t.tag_type() != primary);

        let mut entries = TagMap::new();
        for tag in tags {
            let tag_type = tag.tag_type();
            for item in tag.items() {
                let Some(text) = item.value().text() else {
                    continue;
                };
                let key = match tag_type {
                    TagType::Id3v1 => id3v1_frame_id(item.key()),
                    _ => item.key().map_key(tag_type, true),
                };
                let Some(key) = key else {
                    continue;
                };
                // Multi-value ID3v2 frames are NUL separated; keep the first.
                let first = text.split('\0').next().unwrap_or_default();
                entries
                    .entry(key.to_string())
                    .or_insert_with(|| first.to_string());
            }
        }

        Ok(RawTags {
            entries,
            duration_secs: Some(tagged_file.properties().duration().as_secs()),
        })
    }
}

/// ID3v2 frame id for the fields an ID3v1 tag can hold.
fn id3v1_frame_id(key: &ItemKey) -> Option<&'static str> {
    match key {
        ItemKey::TrackTitle => Some("TIT2"),
        ItemKey::TrackArtist => Some("TPE1"),
        ItemKey::AlbumTitle => Some("TALB"),
        ItemKey::Year | ItemKey::RecordingDate => Some("TDRC"),
        ItemKey::TrackNumber => Some("TRCK"),
        ItemKey::Genre => Some("TCON"),
        ItemKey::Comment => Some("COMM"),
        _ => None,
    }
}

/// Walks the candidate key chains for one file.
#[derive(Debug, Clone, Default)]
pub struct MetadataExtractor<S = LoftyTags> {
    source: S,
}

impl MetadataExtractor<LoftyTags> {
    pub fn new() -> Self {
        Self { source: LoftyTags }
    }
}

impl<S: TagSource> MetadataExtractor<S> {
    pub fn with_source(source: S) -> Self {
        Self { source }
    }

    /// `UnsupportedFormat` for unknown extensions, `ExtractionFailed` when the
    /// backend cannot read the file. Callers treat both as "nothing found".
    pub fn extract(&self, path: &Path) -> Result<PartialMetadata> {
        let format = AudioFormat::from_path(path)?;
        let raw = self.source.probe(path)?;

        let meta = PartialMetadata {
            title: first_present(&raw.entries, format.title_keys()),
            artist: first_present(&raw.entries, format.artist_keys()),
            date: first_present(&raw.entries, format.date_keys()),
            duration_secs: raw.duration_secs,
        };

        debug!(
            file = %path.display(),
            format = ?format,
            title = ?meta.title,
            artist = ?meta.artist,
            date = ?meta.date,
            duration_s = ?meta.duration_secs,
            "Extracted metadata"
        );

        Ok(meta)
    }
}

/// First key in `keys` that maps to a non-empty value.
pub fn first_present(tags: &TagMap, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| tags.get(*key).filter(|v| !v.is_empty()).cloned())
}

/// `M:SS`, seconds zero-padded.
pub fn format_length(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
