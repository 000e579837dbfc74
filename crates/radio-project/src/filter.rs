//! Song search: substring match over "name artist".

use crate::document::Song;

/// Active search query. An empty query shows everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongFilter {
    pub query: String,
    pub case_sensitive: bool,
}

impl SongFilter {
    pub fn new(query: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            query: query.into(),
            case_sensitive,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    pub fn matches(&self, song: &Song) -> bool {
        if self.is_empty() {
            return true;
        }
        if self.case_sensitive {
            song.raw_search_text().contains(self.query.as_str())
        } else {
            song.search_key().contains(&self.query.to_lowercase())
        }
    }

    /// Recompute `visible` on every song. Returns how many are visible.
    pub fn apply(&self, songs: &mut [Song]) -> usize {
        let mut shown = 0;
        for song in songs.iter_mut() {
            let visible = self.matches(song);
            song.set_visible(visible);
            if visible {
                shown += 1;
            }
        }
        shown
    }
}
