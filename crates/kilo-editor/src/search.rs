//! Search — incremental, directional, wrap-around literal search.
//!
//! The controller is driven one key at a time by the search prompt. Each
//! call restores the previous match overlay, updates the direction from the
//! key, and scans rows from the last match with wraparound at both ends.
//!
//! # Key handling
//!
//! | Key             | Effect                                  |
//! |-----------------|-----------------------------------------|
//! | Enter / Escape  | End the search; forget the last match   |
//! | Right / Down    | Next match forward                      |
//! | Left / Up       | Next match backward                     |
//! | anything else   | Query changed: scan forward from row 0  |
//!
//! Matching is case-sensitive against rendered content and finds the first
//! occurrence in a row. Restoring the cursor on cancel is the caller's job.

use kilo_term::input::KeyCode;
use tracing::debug;

use crate::document::Document;
use crate::highlight::Highlight;

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

// ---------------------------------------------------------------------------
// SearchHit
// ---------------------------------------------------------------------------

/// Where a scan landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    /// Matching row.
    pub row: usize,
    /// Raw offset of the match (cursor position).
    pub offset: usize,
    /// Rendered column of the match.
    pub column: usize,
}

// ---------------------------------------------------------------------------
// SearchState
// ---------------------------------------------------------------------------

/// Highlight bytes replaced by the match overlay.
#[derive(Debug, Clone)]
struct Overlay {
    row: usize,
    saved: Vec<Highlight>,
}

/// State carried between keystrokes of one search session.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    last_match: Option<usize>,
    direction: SearchDirection,
    overlay: Option<Overlay>,
}

impl SearchState {
    /// A fresh session: no match yet, scanning forward.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Row of the most recent match.
    #[inline]
    #[must_use]
    pub const fn last_match(&self) -> Option<usize> {
        self.last_match
    }

    /// Current scan direction.
    #[inline]
    #[must_use]
    pub const fn direction(&self) -> SearchDirection {
        self.direction
    }

    /// Handle one key of the search prompt with the current `query`.
    ///
    /// Returns the new match, or `None` when the session ended or nothing
    /// matched (in which case the last match is kept).
    pub fn on_key(&mut self, doc: &mut Document, query: &[u8], key: KeyCode) -> Option<SearchHit> {
        self.restore(doc);

        match key {
            KeyCode::Enter | KeyCode::Escape => {
                self.last_match = None;
                self.direction = SearchDirection::Forward;
                return None;
            }
            KeyCode::Right | KeyCode::Down => self.direction = SearchDirection::Forward,
            KeyCode::Left | KeyCode::Up => self.direction = SearchDirection::Backward,
            _ => {
                self.last_match = None;
                self.direction = SearchDirection::Forward;
            }
        }
        if self.last_match.is_none() {
            self.direction = SearchDirection::Forward;
        }

        let hit = self.scan(doc, query)?;
        self.last_match = Some(hit.row);
        self.apply(doc, hit, query.len());
        debug!(row = hit.row, column = hit.column, "search match");
        Some(hit)
    }

    /// Put back the highlight bytes the overlay replaced, if any.
    pub fn restore(&mut self, doc: &mut Document) {
        let Some(overlay) = self.overlay.take() else {
            return;
        };
        if let Some(tags) = doc.highlight_mut(overlay.row) {
            if tags.len() == overlay.saved.len() {
                tags.copy_from_slice(&overlay.saved);
            }
        }
    }

    fn scan(&self, doc: &Document, query: &[u8]) -> Option<SearchHit> {
        let total = doc.len();
        if total == 0 || query.is_empty() {
            return None;
        }
        let mut current = self.last_match;
        for _ in 0..total {
            let next = match (current, self.direction) {
                (None, _) => 0,
                (Some(r), SearchDirection::Forward) if r + 1 < total => r + 1,
                (Some(_), SearchDirection::Forward) => 0,
                (Some(r), SearchDirection::Backward) if r > 0 && r <= total => r - 1,
                (Some(_), SearchDirection::Backward) => total - 1,
            };
            current = Some(next);

            let row = doc.row(next)?;
            if let Some(column) = find(row.rendered(), query) {
                return Some(SearchHit {
                    row: next,
                    offset: row.column_to_offset(column, doc.tab_stop()),
                    column,
                });
            }
        }
        None
    }

    fn apply(&mut self, doc: &mut Document, hit: SearchHit, len: usize) {
        let Some(tags) = doc.highlight_mut(hit.row) else {
            return;
        };
        self.overlay = Some(Overlay {
            row: hit.row,
            saved: tags.to_vec(),
        });
        let end = (hit.column + len).min(tags.len());
        tags[hit.column..end].fill(Highlight::Match);
    }
}

/// Byte offset of the first occurrence of `needle` in `haystack`.
///
/// An empty needle matches nothing, even though every row trivially
/// contains the empty string. Erasing the whole query therefore leaves the
/// cursor where the last match put it instead of jumping to row 0.
#[must_use]
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}
