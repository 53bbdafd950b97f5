//! Compose — scrolling policy and the frame compositor.
//!
//! A frame is built into one [`OutputBuffer`] and written by the event loop
//! in a single call:
//!
//! ```text
//! hide cursor, home
//! ┌──────────────────────────────┐
//! │ text rows / ~ filler         │ ← viewport.screen_rows()
//! ├──────────────────────────────┤
//! │ status line (inverted)       │
//! │ message bar                  │
//! └──────────────────────────────┘
//! cursor position, show cursor
//! ```
//!
//! Color escapes are emitted only when the classification changes from
//! one byte to the next.

use std::io::Write;

use kilo_term::ansi::{self, Color};
use kilo_term::output::OutputBuffer;
use kilo_term::terminal::Size;

use crate::document::Document;
use crate::error::Result;
use crate::highlight::Highlight;

/// Rows taken by the status line and the message bar.
pub const CHROME_ROWS: usize = 2;

/// Longest filename prefix shown on the status line.
const STATUS_FILENAME_MAX: usize = 20;

/// Most bytes one text cell can expand to: a control byte drawn inverted
/// (`ESC[7m`, symbol, `ESC[0m`) followed by the color it interrupted.
const MAX_CELL_BYTES: usize = 4 + 1 + 4 + 5;

/// Default color, clear-line and CRLF closing every text row.
const ROW_TRAILER_BYTES: usize = 5 + 3 + 2;

/// Hide, home, a cursor move with two `usize` coordinates, and show.
const FRAME_FIXED_BYTES: usize = 6 + 3 + (2 + 20 + 1 + 20 + 1) + 6;

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Scroll offsets and the size of the text area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    row_offset: usize,
    col_offset: usize,
    screen_rows: usize,
    screen_cols: usize,
}

impl Viewport {
    /// A viewport at the top-left of a `screen_rows` × `screen_cols` text area.
    #[must_use]
    pub const fn new(screen_rows: usize, screen_cols: usize) -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
            screen_rows,
            screen_cols,
        }
    }

    /// A viewport for a whole terminal, leaving room for the status line
    /// and message bar.
    #[must_use]
    pub fn for_terminal(size: Size) -> Self {
        let mut viewport = Self::default();
        viewport.resize(size);
        viewport
    }

    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    #[inline]
    #[must_use]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    /// Height of the text area.
    #[inline]
    #[must_use]
    pub const fn screen_rows(&self) -> usize {
        self.screen_rows
    }

    /// Width of the text area.
    #[inline]
    #[must_use]
    pub const fn screen_cols(&self) -> usize {
        self.screen_cols
    }

    pub const fn set_row_offset(&mut self, row: usize) {
        self.row_offset = row;
    }

    pub const fn set_col_offset(&mut self, col: usize) {
        self.col_offset = col;
    }

    /// Adopt a new terminal size.
    pub fn resize(&mut self, size: Size) {
        self.screen_rows = usize::from(size.rows).saturating_sub(CHROME_ROWS);
        self.screen_cols = usize::from(size.cols);
    }

    /// Clamp the offsets so (`row`, rendered `column`) is on screen.
    pub const fn scroll(&mut self, row: usize, column: usize) {
        if row < self.row_offset {
            self.row_offset = row;
        }
        if self.screen_rows > 0 && row >= self.row_offset + self.screen_rows {
            self.row_offset = row + 1 - self.screen_rows;
        }
        if column < self.col_offset {
            self.col_offset = column;
        }
        if self.screen_cols > 0 && column >= self.col_offset + self.screen_cols {
            self.col_offset = column + 1 - self.screen_cols;
        }
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Everything one frame shows.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub doc: &'a Document,
    pub viewport: &'a Viewport,
    /// Cursor row (may equal the row count).
    pub cursor_row: usize,
    /// Cursor position in rendered columns.
    pub cursor_column: usize,
    pub filename: Option<&'a str>,
    /// Message-bar content, already filtered for freshness.
    pub message: Option<&'a [u8]>,
}

/// Compose a complete frame into `out`.
///
/// # Errors
///
/// [`Error::OutOfMemory`](crate::error::Error::OutOfMemory) if the frame
/// buffer cannot grow.
pub fn compose(frame: &Frame<'_>, out: &mut OutputBuffer) -> Result<()> {
    let vp = frame.viewport;
    // Nothing below can outgrow this, so the pushes never reallocate.
    out.try_reserve(frame_capacity(vp))?;

    ansi::cursor_hide(out)?;
    ansi::cursor_home(out)?;
    draw_rows(frame, out)?;
    draw_status(frame, out)?;
    draw_message(frame, out)?;
    ansi::cursor_to(
        out,
        frame.cursor_column.saturating_sub(vp.col_offset),
        frame.cursor_row.saturating_sub(vp.row_offset),
    )?;
    ansi::cursor_show(out)?;
    Ok(())
}

/// Upper bound on the bytes [`compose`] writes for `vp`.
const fn frame_capacity(vp: &Viewport) -> usize {
    let text_row = vp.screen_cols * MAX_CELL_BYTES + ROW_TRAILER_BYTES;
    // inverse + line + reset + CRLF, then clear-line + message
    let status = 4 + vp.screen_cols + 4 + 2;
    let message = 3 + vp.screen_cols;
    vp.screen_rows * text_row + status + message + FRAME_FIXED_BYTES
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

fn draw_rows(frame: &Frame<'_>, out: &mut OutputBuffer) -> Result<()> {
    let vp = frame.viewport;
    for y in 0..vp.screen_rows {
        let file_row = y + vp.row_offset;
        match frame.doc.row(file_row) {
            Some(row) => {
                let start = vp.col_offset.min(row.rendered().len());
                let end = (start + vp.screen_cols).min(row.rendered().len());
                draw_text(
                    &row.rendered()[start..end],
                    &row.highlight()[start..end],
                    out,
                )?;
            }
            None if frame.doc.is_empty() && y == vp.screen_rows / 3 => {
                draw_welcome(vp.screen_cols, out);
            }
            None => out.push(b'~'),
        }
        ansi::clear_line(out)?;
        out.push_bytes(b"\r\n");
    }
    Ok(())
}

/// Draw one windowed slice of a row, switching colors only on change.
fn draw_text(text: &[u8], tags: &[Highlight], out: &mut OutputBuffer) -> Result<()> {
    let mut current: Option<Color> = None;
    for (&byte, &tag) in text.iter().zip(tags) {
        if byte.is_ascii_control() {
            let symbol = if byte <= 26 { b'@' + byte } else { b'?' };
            ansi::inverse(out)?;
            out.push(symbol);
            ansi::reset(out)?;
            if let Some(color) = current {
                ansi::fg(out, color)?;
            }
        } else if tag == Highlight::Normal {
            if current.take().is_some() {
                ansi::fg(out, Color::Default)?;
            }
            out.push(byte);
        } else {
            let color = tag.color();
            if current != Some(color) {
                ansi::fg(out, color)?;
                current = Some(color);
            }
            out.push(byte);
        }
    }
    ansi::fg(out, Color::Default)?;
    Ok(())
}

fn draw_welcome(width: usize, out: &mut OutputBuffer) {
    let banner = format!("Kilo editor -- version {}", env!("CARGO_PKG_VERSION"));
    let banner = &banner.as_bytes()[..banner.len().min(width)];
    let mut padding = (width - banner.len()) / 2;
    if padding > 0 {
        out.push(b'~');
        padding -= 1;
    }
    out.push_bytes(&b" ".repeat(padding));
    out.push_bytes(banner);
}

// ---------------------------------------------------------------------------
// Status line and message bar
// ---------------------------------------------------------------------------

fn draw_status(frame: &Frame<'_>, out: &mut OutputBuffer) -> Result<()> {
    let width = frame.viewport.screen_cols;
    let doc = frame.doc;

    let mut left = Vec::with_capacity(64);
    match frame.filename {
        Some(name) => {
            let name = name.as_bytes();
            left.extend_from_slice(&name[..name.len().min(STATUS_FILENAME_MAX)]);
        }
        None => left.extend_from_slice(b"[No Name]"),
    }
    write!(left, " - {} lines", doc.len())?;
    if doc.is_dirty() {
        left.extend_from_slice(b" (modified)");
    }
    let filetype = doc.syntax().map_or("no ft", |s| s.filetype);
    let right = format!("{filetype} | {}/{}", frame.cursor_row + 1, doc.len());

    ansi::inverse(out)?;
    let mut len = left.len().min(width);
    out.push_bytes(&left[..len]);
    while len < width {
        if width - len == right.len() {
            out.push_bytes(right.as_bytes());
            break;
        }
        out.push(b' ');
        len += 1;
    }
    ansi::reset(out)?;
    out.push_bytes(b"\r\n");
    Ok(())
}

fn draw_message(frame: &Frame<'_>, out: &mut OutputBuffer) -> Result<()> {
    ansi::clear_line(out)?;
    if let Some(message) = frame.message {
        let len = message.len().min(frame.viewport.screen_cols);
        out.push_bytes(&message[..len]);
    }
    Ok(())
}
