//! Document — the row store.
//!
//! An ordered, mutable sequence of [`Row`]s plus the language used to
//! highlight them. Every mutation:
//!
//! - keeps each row's stored index equal to its position,
//! - rebuilds the touched row's rendered bytes and highlight,
//! - carries block-comment state forward to following rows for as long as
//!   a row's end-of-row state changes,
//! - bumps the dirty counter.
//!
//! Out-of-range rows or offsets never fail: inserts clamp to the end,
//! deletes do nothing.
//!
//! Cross-row highlight invalidation is a loop, not recursion, so a comment
//! opened at the top of a long file cannot grow the stack.

use tracing::debug;

use crate::error::Result;
use crate::highlight::{Highlight, highlight_line};
use crate::row::Row;
use crate::syntax::Syntax;

/// The rows of one open file.
#[derive(Debug, Clone, Default)]
pub struct Document {
    rows: Vec<Row>,
    syntax: Option<&'static Syntax>,
    tab_stop: usize,
    dirty: usize,
}

impl Document {
    /// An empty document.
    #[must_use]
    pub fn new(tab_stop: usize) -> Self {
        Self {
            rows: Vec::new(),
            syntax: None,
            tab_stop: tab_stop.max(1),
            dirty: 0,
        }
    }

    /// Seed a document from newline-stripped lines.
    ///
    /// Renders and highlights every row once; the result is clean.
    #[must_use]
    pub fn from_lines<I>(lines: I, syntax: Option<&'static Syntax>, tab_stop: usize) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut doc = Self::new(tab_stop);
        doc.syntax = syntax;
        doc.rows = lines
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Row::new(index, raw))
            .collect();
        let tab_stop = doc.tab_stop;
        for row in &mut doc.rows {
            row.rerender(tab_stop);
        }
        doc.rehighlight_all();
        doc
    }

    // -- Accessors ------------------------------------------------------------

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the document has no rows at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `at`, if it exists.
    #[inline]
    #[must_use]
    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    /// All rows in order.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Tab width used for rendering.
    #[inline]
    #[must_use]
    pub const fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// The active language, if any.
    #[inline]
    #[must_use]
    pub const fn syntax(&self) -> Option<&'static Syntax> {
        self.syntax
    }

    /// Number of changes since the last load or save.
    #[inline]
    #[must_use]
    pub const fn dirty(&self) -> usize {
        self.dirty
    }

    /// Whether there are unsaved changes.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty != 0
    }

    /// Forget unsaved changes (after a successful save).
    pub const fn mark_clean(&mut self) {
        self.dirty = 0;
    }

    /// Switch language and re-highlight every row.
    pub fn set_syntax(&mut self, syntax: Option<&'static Syntax>) {
        debug!(filetype = syntax.map(|s| s.filetype), "language selected");
        self.syntax = syntax;
        self.rehighlight_all();
    }

    // -- Mutations ------------------------------------------------------------

    /// Insert a new row containing `text` before row `at` (clamped to the end).
    pub fn insert_row(&mut self, at: usize, text: &[u8]) {
        let at = at.min(self.rows.len());
        self.insert_row_raw(at, text.to_vec());
        self.dirty += 1;
    }

    /// Remove row `at`. No-op when out of range.
    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.renumber_from(at);
        self.rehighlight(at, at);
        self.dirty += 1;
    }

    /// Insert `byte` into row `row` at `offset` (clamped to the row's end).
    /// No-op when the row does not exist.
    pub fn insert_char(&mut self, row: usize, offset: usize, byte: u8) {
        let Some(target) = self.rows.get_mut(row) else {
            return;
        };
        let offset = offset.min(target.raw.len());
        target.raw.insert(offset, byte);
        self.update_row(row);
        self.dirty += 1;
    }

    /// Delete the byte at `offset` in row `row`. No-op when out of range.
    pub fn delete_char(&mut self, row: usize, offset: usize) {
        let Some(target) = self.rows.get_mut(row) else {
            return;
        };
        if offset >= target.raw.len() {
            return;
        }
        target.raw.remove(offset);
        self.update_row(row);
        self.dirty += 1;
    }

    /// Append `text` to the end of row `row`. No-op when the row does not exist.
    pub fn append_text(&mut self, row: usize, text: &[u8]) {
        let Some(target) = self.rows.get_mut(row) else {
            return;
        };
        target.raw.extend_from_slice(text);
        self.update_row(row);
        self.dirty += 1;
    }

    /// Break row `row` at `offset`: the row keeps the bytes before the
    /// offset and a new row after it receives the rest.
    ///
    /// Splitting the position just past the last row appends an empty row.
    pub fn split_row(&mut self, row: usize, offset: usize) {
        if row >= self.rows.len() {
            self.insert_row_raw(self.rows.len(), Vec::new());
            self.dirty += 1;
            return;
        }
        let target = &mut self.rows[row];
        let offset = offset.min(target.raw.len());
        let tail = target.raw.split_off(offset);
        target.rerender(self.tab_stop);
        self.insert_row_raw(row + 1, tail);
        // The shortened row may have stopped (or started) opening a comment.
        self.rehighlight(row, row + 2);
        self.dirty += 1;
    }

    /// Join row `row + 1` onto the end of row `row`. No-op when there is
    /// no next row.
    pub fn join_with_next(&mut self, row: usize) {
        if row + 1 >= self.rows.len() {
            return;
        }
        let next = self.rows.remove(row + 1);
        self.renumber_from(row + 1);
        self.rows[row].raw.extend_from_slice(&next.raw);
        self.rows[row].rerender(self.tab_stop);
        self.rehighlight(row, row + 1);
        self.dirty += 1;
    }

    /// Serialize every row followed by a newline.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`](crate::error::Error::OutOfMemory) if the
    /// output buffer cannot be allocated.
    pub fn to_text(&self) -> Result<Vec<u8>> {
        let total: usize = self.rows.iter().map(|row| row.raw.len() + 1).sum();
        let mut text = Vec::new();
        text.try_reserve_exact(total)?;
        for row in &self.rows {
            text.extend_from_slice(&row.raw);
            text.push(b'\n');
        }
        Ok(text)
    }

    // -- Overlay access -------------------------------------------------------

    /// Mutable highlight of row `at`, for temporary overlays.
    pub(crate) fn highlight_mut(&mut self, at: usize) -> Option<&mut [Highlight]> {
        self.rows.get_mut(at).map(|row| row.highlight.as_mut_slice())
    }

    // -- Internals ------------------------------------------------------------

    fn insert_row_raw(&mut self, at: usize, raw: Vec<u8>) {
        let mut row = Row::new(at, raw);
        row.rerender(self.tab_stop);
        self.rows.insert(at, row);
        self.renumber_from(at + 1);
        // The row after the new one now inherits its comment state.
        self.rehighlight(at, at + 1);
    }

    fn update_row(&mut self, at: usize) {
        self.rows[at].rerender(self.tab_stop);
        self.rehighlight(at, at);
    }

    fn renumber_from(&mut self, start: usize) {
        for (index, row) in self.rows.iter_mut().enumerate().skip(start) {
            row.index = index;
        }
    }

    fn rehighlight_all(&mut self) {
        let last = self.rows.len().saturating_sub(1);
        self.rehighlight(0, last);
    }

    /// Re-highlight from `start`, always through `force_until`, then onward
    /// while a row's end-of-row comment state keeps changing.
    fn rehighlight(&mut self, start: usize, force_until: usize) {
        let syntax = self.syntax;
        let mut at = start;
        while at < self.rows.len() {
            let carried = at > 0 && self.rows[at - 1].comment_continues;
            let row = &mut self.rows[at];
            let result = highlight_line(&row.rendered, syntax, carried);
            let changed = row.comment_continues != result.open_comment;
            row.highlight = result.tags;
            row.comment_continues = result.open_comment;
            if !changed && at >= force_until {
                break;
            }
            at += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::Highlight::{BlockComment as B, KeywordSecondary as K2, Normal as N};
    use crate::syntax::select;
    use pretty_assertions::assert_eq;

    fn doc(lines: &[&str]) -> Document {
        Document::from_lines(lines.iter().map(|l| l.as_bytes().to_vec()), None, 8)
    }

    fn c_doc(lines: &[&str]) -> Document {
        Document::from_lines(lines.iter().map(|l| l.as_bytes().to_vec()), select("x.c"), 8)
    }

    fn raws(doc: &Document) -> Vec<String> {
        doc.rows()
            .iter()
            .map(|r| String::from_utf8(r.raw().to_vec()).unwrap())
            .collect()
    }

    fn assert_consistent(doc: &Document) {
        for (i, row) in doc.rows().iter().enumerate() {
            assert_eq!(row.index(), i, "index of row {i}");
            assert_eq!(row.highlight().len(), row.rendered().len(), "row {i}");
            assert!(row.rendered().len() >= row.raw().len());
        }
    }

    // -- Loading --------------------------------------------------------------

    #[test]
    fn from_lines_is_clean_and_rendered() {
        let d = doc(&["a\tb", "c"]);
        assert_eq!(d.len(), 2);
        assert!(!d.is_dirty());
        assert_eq!(d.row(0).unwrap().rendered(), b"a       b");
        assert_consistent(&d);
    }

    #[test]
    fn empty_document() {
        let d = Document::new(8);
        assert!(d.is_empty());
        assert!(d.row(0).is_none());
        assert_eq!(d.to_text().unwrap(), b"");
    }

    // -- Row insert / delete --------------------------------------------------

    #[test]
    fn insert_row_clamps_to_end() {
        let mut d = doc(&["a"]);
        d.insert_row(99, b"z");
        d.insert_row(0, b"first");
        assert_eq!(raws(&d), ["first", "a", "z"]);
        assert_eq!(d.dirty(), 2);
        assert_consistent(&d);
    }

    #[test]
    fn delete_row_renumbers() {
        let mut d = doc(&["a", "b", "c"]);
        d.delete_row(0);
        assert_eq!(raws(&d), ["b", "c"]);
        assert_consistent(&d);
    }

    #[test]
    fn delete_row_out_of_range_is_noop() {
        let mut d = doc(&["a"]);
        d.delete_row(1);
        assert_eq!(raws(&d), ["a"]);
        assert!(!d.is_dirty());
    }

    // -- Character edits ------------------------------------------------------

    #[test]
    fn insert_then_delete_restores_bytes() {
        let mut d = doc(&["hello\tworld"]);
        let before = d.row(0).unwrap().clone();
        for k in 0..=before.raw().len() {
            d.insert_char(0, k, b'c');
            d.delete_char(0, k);
            assert_eq!(d.row(0).unwrap().raw(), before.raw(), "offset {k}");
        }
        assert_eq!(d.row(0).unwrap().rendered(), before.rendered());
    }

    #[test]
    fn insert_char_clamps_offset() {
        let mut d = doc(&["ab"]);
        d.insert_char(0, 100, b'!');
        assert_eq!(raws(&d), ["ab!"]);
    }

    #[test]
    fn insert_char_missing_row_is_noop() {
        let mut d = doc(&["ab"]);
        d.insert_char(5, 0, b'!');
        assert_eq!(raws(&d), ["ab"]);
        assert!(!d.is_dirty());
    }

    #[test]
    fn delete_char_out_of_range_is_noop() {
        let mut d = doc(&["ab"]);
        d.delete_char(0, 2);
        d.delete_char(3, 0);
        assert_eq!(raws(&d), ["ab"]);
        assert!(!d.is_dirty());
    }

    #[test]
    fn insert_tab_rerenders() {
        let mut d = doc(&["ab"]);
        d.insert_char(0, 1, b'\t');
        assert_eq!(d.row(0).unwrap().rendered(), b"a       b");
        assert_consistent(&d);
    }

    #[test]
    fn append_text_extends() {
        let mut d = doc(&["ab"]);
        d.append_text(0, b"cd");
        assert_eq!(raws(&d), ["abcd"]);
        assert_eq!(d.dirty(), 1);
    }

    // -- Split / join ---------------------------------------------------------

    #[test]
    fn split_then_join_round_trip() {
        let original = "int x = 10; // note";
        for k in 0..=original.len() {
            let mut d = c_doc(&[original]);
            let before = d.row(0).unwrap().clone();
            d.split_row(0, k);
            assert_eq!(d.len(), 2);
            assert_eq!(d.row(0).unwrap().raw(), &original.as_bytes()[..k]);
            assert_eq!(d.row(1).unwrap().raw(), &original.as_bytes()[k..]);
            d.join_with_next(0);
            assert_eq!(d.len(), 1);
            assert_eq!(d.row(0).unwrap(), &before);
        }
    }

    #[test]
    fn split_past_last_row_appends_empty() {
        let mut d = doc(&["a"]);
        d.split_row(1, 0);
        assert_eq!(raws(&d), ["a", ""]);
        assert_consistent(&d);
    }

    #[test]
    fn split_in_middle_renumbers() {
        let mut d = doc(&["ab", "cd", "ef"]);
        d.split_row(1, 1);
        assert_eq!(raws(&d), ["ab", "c", "d", "ef"]);
        assert_consistent(&d);
    }

    #[test]
    fn join_last_row_is_noop() {
        let mut d = doc(&["a", "b"]);
        d.join_with_next(1);
        assert_eq!(raws(&d), ["a", "b"]);
        assert!(!d.is_dirty());
    }

    // -- Serialization --------------------------------------------------------

    #[test]
    fn to_text_terminates_each_row() {
        let d = doc(&["a", "", "b\tc"]);
        assert_eq!(d.to_text().unwrap(), b"a\n\nb\tc\n");
    }

    #[test]
    fn mark_clean_resets_dirty() {
        let mut d = doc(&["a"]);
        d.insert_char(0, 0, b'x');
        assert!(d.is_dirty());
        d.mark_clean();
        assert!(!d.is_dirty());
    }

    // -- Highlight propagation ------------------------------------------------

    #[test]
    fn block_comment_spans_rows() {
        let d = c_doc(&["/* start", "middle", "end */ code"]);
        let rows = d.rows();
        assert!(rows[0].highlight().iter().all(|&t| t == B));
        assert!(rows[1].highlight().iter().all(|&t| t == B));
        assert_eq!(rows[2].highlight()[..6], [B; 6]);
        assert_eq!(rows[2].highlight()[6..], [N; 5]);
        assert!(rows[0].comment_continues());
        assert!(rows[1].comment_continues());
        assert!(!rows[2].comment_continues());
    }

    #[test]
    fn removing_comment_start_cascades() {
        let mut d = c_doc(&["/* start", "middle", "end */ int"]);
        // Without the leading "/" the row no longer opens a comment.
        d.delete_char(0, 0);
        let rows = d.rows();
        assert!(!rows[0].comment_continues());
        assert!(!rows[1].comment_continues());
        assert!(rows[1].highlight().iter().all(|&t| t == N));
        // "end */ int": "*/" is no longer a comment end, "int" is a keyword.
        assert_eq!(rows[2].highlight()[7..], [K2; 3]);
    }

    #[test]
    fn adding_comment_start_cascades() {
        let mut d = c_doc(&["x", "y", "z"]);
        d.append_text(0, b" /*");
        assert!(d.rows().iter().all(Row::comment_continues));
        assert!(d.row(2).unwrap().highlight().iter().all(|&t| t == B));
    }

    #[test]
    fn inserting_closing_row_inside_comment() {
        let mut d = c_doc(&["/*", "a", "b"]);
        d.insert_row(1, b"*/");
        let rows = d.rows();
        assert!(!rows[1].comment_continues());
        assert!(rows[2].highlight().iter().all(|&t| t == N));
        assert!(rows[3].highlight().iter().all(|&t| t == N));
    }

    #[test]
    fn deleting_opening_row_uncovers_code() {
        let mut d = c_doc(&["/*", "int"]);
        d.delete_row(0);
        assert_eq!(d.row(0).unwrap().highlight(), [K2; 3]);
    }

    #[test]
    fn set_syntax_rehighlights_everything() {
        let mut d = doc(&["int x;", "/* a", "b */"]);
        assert!(d.rows().iter().all(|r| r.highlight().iter().all(|&t| t == N)));
        d.set_syntax(select("a.c"));
        assert_eq!(d.row(0).unwrap().highlight()[..3], [K2; 3]);
        assert!(d.row(2).unwrap().highlight().iter().all(|&t| t == B));
        assert!(!d.is_dirty());
    }

    #[test]
    fn highlight_mut_exposes_tags() {
        let mut d = doc(&["abc"]);
        d.highlight_mut(0).unwrap()[1] = Highlight::Match;
        assert_eq!(d.row(0).unwrap().highlight(), [N, Highlight::Match, N]);
        assert!(d.highlight_mut(1).is_none());
    }
}
