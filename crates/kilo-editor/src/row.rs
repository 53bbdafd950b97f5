//! Row — one line of the document in its raw, rendered and highlighted forms.
//!
//! `raw` is authoritative. `rendered` and `highlight` are derived from it and
//! are rebuilt by the owning [`Document`](crate::document::Document) after
//! every change; nothing else writes them (except the search overlay, which
//! restores what it replaced).

use crate::highlight::Highlight;
use crate::render;

/// A single line of text, without its trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    pub(crate) index: usize,
    pub(crate) raw: Vec<u8>,
    pub(crate) rendered: Vec<u8>,
    pub(crate) highlight: Vec<Highlight>,
    pub(crate) comment_continues: bool,
}

impl Row {
    pub(crate) fn new(index: usize, raw: Vec<u8>) -> Self {
        Self {
            index,
            raw,
            ..Self::default()
        }
    }

    /// Position of this row in its document.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Raw content as stored in the file.
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Length of the raw content in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Whether the raw content is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Display content with tabs expanded.
    #[inline]
    #[must_use]
    pub fn rendered(&self) -> &[u8] {
        &self.rendered
    }

    /// One classification per rendered byte.
    #[inline]
    #[must_use]
    pub fn highlight(&self) -> &[Highlight] {
        &self.highlight
    }

    /// The row ends inside an unterminated block comment.
    #[inline]
    #[must_use]
    pub const fn comment_continues(&self) -> bool {
        self.comment_continues
    }

    /// Rendered column of raw `offset`.
    #[inline]
    #[must_use]
    pub fn offset_to_column(&self, offset: usize, tab_stop: usize) -> usize {
        render::offset_to_column(&self.raw, offset, tab_stop)
    }

    /// Raw offset displayed at rendered `column`.
    #[inline]
    #[must_use]
    pub fn column_to_offset(&self, column: usize, tab_stop: usize) -> usize {
        render::column_to_offset(&self.raw, column, tab_stop)
    }

    /// Rebuild `rendered` from `raw`.
    pub(crate) fn rerender(&mut self, tab_stop: usize) {
        self.rendered = render::project(&self.raw, tab_stop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_row_has_only_raw() {
        let row = Row::new(3, b"abc".to_vec());
        assert_eq!(row.index(), 3);
        assert_eq!(row.raw(), b"abc");
        assert_eq!(row.len(), 3);
        assert!(!row.is_empty());
        assert!(row.rendered().is_empty());
        assert!(!row.comment_continues());
    }

    #[test]
    fn rerender_expands_tabs() {
        let mut row = Row::new(0, b"a\tb".to_vec());
        row.rerender(8);
        assert_eq!(row.rendered(), b"a       b");
    }

    #[test]
    fn column_conversions_use_raw() {
        let row = Row::new(0, b"\tx".to_vec());
        assert_eq!(row.offset_to_column(1, 4), 4);
        assert_eq!(row.column_to_offset(4, 4), 1);
        assert_eq!(row.column_to_offset(2, 4), 0);
    }
}
