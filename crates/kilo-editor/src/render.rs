//! Render projector — raw bytes to display bytes.
//!
//! A row's raw content is what the file holds; its rendered content is what
//! the terminal shows. The only difference is tab expansion: each tab
//! becomes one or more spaces, advancing to the next multiple of the tab
//! width (at least one space).
//!
//! Every byte is one display column. Multi-byte UTF-8 sequences are not
//! grouped into characters — a known limitation, not an oversight.
//!
//! The two conversions map a raw offset (where edits happen) to a rendered
//! column (where the cursor is drawn) and back.

/// Expand tabs in `raw` to spaces, advancing to the next tab stop.
///
/// Non-tab bytes are copied through unchanged, so the result is the
/// identity for tab-free input and never shorter than `raw`.
#[must_use]
pub fn project(raw: &[u8], tab_stop: usize) -> Vec<u8> {
    let tab_stop = tab_stop.max(1);
    let tabs = raw.iter().filter(|&&b| b == b'\t').count();
    let mut rendered = Vec::with_capacity(raw.len() + tabs * (tab_stop - 1));

    for &byte in raw {
        if byte == b'\t' {
            rendered.push(b' ');
            while rendered.len() % tab_stop != 0 {
                rendered.push(b' ');
            }
        } else {
            rendered.push(byte);
        }
    }
    rendered
}

/// Rendered column of the byte at raw `offset`.
///
/// Walks the bytes before `offset`, widening each tab to its tab stop.
/// An offset past the end is treated as the end of the row.
#[must_use]
pub fn offset_to_column(raw: &[u8], offset: usize, tab_stop: usize) -> usize {
    let tab_stop = tab_stop.max(1);
    raw.iter().take(offset).fold(0, |col, &byte| {
        if byte == b'\t' {
            col + tab_stop - (col % tab_stop)
        } else {
            col + 1
        }
    })
}

/// Smallest raw offset whose rendered span ends past `column`.
///
/// This is the inverse of [`offset_to_column`] for columns that start a
/// byte; a column inside a tab's expansion maps to that tab. Columns past
/// the end of the row map to `raw.len()`.
#[must_use]
pub fn column_to_offset(raw: &[u8], column: usize, tab_stop: usize) -> usize {
    let tab_stop = tab_stop.max(1);
    let mut col = 0;
    for (offset, &byte) in raw.iter().enumerate() {
        if byte == b'\t' {
            col += tab_stop - (col % tab_stop);
        } else {
            col += 1;
        }
        if col > column {
            return offset;
        }
    }
    raw.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- project --------------------------------------------------------------

    #[test]
    fn no_tabs_is_identity() {
        for raw in [&b""[..], b"hello", b"a b  c", b"\x01\x7f"] {
            assert_eq!(project(raw, 8), raw);
        }
    }

    #[test]
    fn tab_after_one_char() {
        let rendered = project(b"a\tb", 8);
        assert_eq!(rendered, b"a       b");
        assert_eq!(rendered.len(), 9);
    }

    #[test]
    fn tab_at_stop_is_full_width() {
        assert_eq!(project(b"\t", 8), b"        ");
        assert_eq!(project(b"12345678\tx", 8), b"12345678        x");
    }

    #[test]
    fn tab_just_before_stop_is_one_space() {
        assert_eq!(project(b"1234567\tx", 8), b"1234567 x");
    }

    #[test]
    fn consecutive_tabs() {
        assert_eq!(project(b"\t\t", 4), b"        ");
    }

    #[test]
    fn rendered_never_shorter() {
        for raw in [&b"\t"[..], b"x\ty\tz", b"abc", b"\t\t\t"] {
            assert!(project(raw, 8).len() >= raw.len());
        }
    }

    #[test]
    fn zero_tab_stop_acts_as_one() {
        assert_eq!(project(b"a\tb", 0), b"a b");
    }

    // -- offset_to_column -----------------------------------------------------

    #[test]
    fn offsets_around_a_tab() {
        let raw = b"a\tb";
        assert_eq!(offset_to_column(raw, 0, 8), 0);
        assert_eq!(offset_to_column(raw, 1, 8), 1);
        assert_eq!(offset_to_column(raw, 2, 8), 8);
        assert_eq!(offset_to_column(raw, 3, 8), 9);
    }

    #[test]
    fn offset_past_end_clamps() {
        assert_eq!(offset_to_column(b"ab", 10, 8), 2);
    }

    #[test]
    fn offset_to_column_is_monotonic() {
        let raw = b"\tx\t\tyz\t";
        let cols: Vec<_> = (0..=raw.len()).map(|o| offset_to_column(raw, o, 4)).collect();
        assert!(cols.windows(2).all(|w| w[0] < w[1]));
    }

    // -- column_to_offset -----------------------------------------------------

    #[test]
    fn columns_around_a_tab() {
        let raw = b"a\tb";
        assert_eq!(column_to_offset(raw, 0, 8), 0);
        assert_eq!(column_to_offset(raw, 1, 8), 1);
        // Inside the tab's expansion.
        assert_eq!(column_to_offset(raw, 5, 8), 1);
        assert_eq!(column_to_offset(raw, 8, 8), 2);
        assert_eq!(column_to_offset(raw, 9, 8), 3);
        assert_eq!(column_to_offset(raw, 50, 8), 3);
    }

    #[test]
    fn conversions_agree_on_byte_boundaries() {
        let raw = b"if\t(x)\t{ y;\t}";
        for offset in 0..=raw.len() {
            let col = offset_to_column(raw, offset, 8);
            assert_eq!(column_to_offset(raw, col, 8), offset);
        }
    }

    #[test]
    fn round_trip_lands_on_a_boundary_at_or_before() {
        let raw = b"\tab\tc";
        let rendered_len = project(raw, 4).len();
        for col in 0..rendered_len {
            let offset = column_to_offset(raw, col, 4);
            let back = offset_to_column(raw, offset, 4);
            let next = offset_to_column(raw, offset + 1, 4);
            assert!(back <= col && col < next, "col {col} -> {offset} -> {back}");
        }
    }
}
