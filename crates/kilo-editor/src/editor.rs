//! Editor — the explicit context every operation runs against.
//!
//! Holds the document, cursor, viewport, filename, status message, quit
//! countdown, active prompt, search state and options. Implements the
//! event loop's [`App`] trait: keys go to [`handle_key`](Editor::handle_key)
//! and frames come from [`refresh_screen`](Editor::refresh_screen).
//!
//! # Key bindings
//!
//! | Key                   | Action                                   |
//! |-----------------------|------------------------------------------|
//! | Enter                 | Split the row at the cursor              |
//! | Ctrl-Q                | Quit (confirm again when modified)       |
//! | Ctrl-S                | Save, prompting for a name if needed     |
//! | Ctrl-F                | Incremental search                       |
//! | Backspace, Ctrl-H     | Delete left, joining rows at column 0    |
//! | Delete                | Delete right                             |
//! | Arrows                | Move, wrapping at row ends               |
//! | Home / End            | Start / end of row                       |
//! | PageUp / PageDown     | One screen up / down                     |
//! | Ctrl-L, Escape        | Ignored                                  |
//! | anything else         | Insert the byte                          |

use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use kilo_term::event_loop::{Action, App};
use kilo_term::input::KeyCode;
use kilo_term::output::OutputBuffer;
use kilo_term::terminal::Size;
use tracing::{debug, info, warn};

use crate::compose::{self, Frame, Viewport};
use crate::document::Document;
use crate::error::{Error, Result};
use crate::file;
use crate::options::Options;
use crate::prompt::{Prompt, PromptEvent, PromptKind};
use crate::search::SearchState;
use crate::syntax;

/// A status message and when it was set.
#[derive(Debug, Clone)]
struct StatusMessage {
    text: Vec<u8>,
    set_at: Instant,
}

/// Cursor and scroll position to return to when a search is cancelled.
#[derive(Debug, Clone, Copy)]
struct SavedView {
    row: usize,
    offset: usize,
    row_offset: usize,
    col_offset: usize,
}

/// The whole editing session.
#[derive(Debug)]
pub struct Editor {
    doc: Document,
    /// Cursor row, in `0..=doc.len()`.
    row: usize,
    /// Cursor raw offset, in `0..=row len`.
    offset: usize,
    /// Cursor rendered column, recomputed on every refresh.
    column: usize,
    viewport: Viewport,
    filename: Option<PathBuf>,
    status: Option<StatusMessage>,
    quit_times: u32,
    prompt: Option<Prompt>,
    search: SearchState,
    saved_view: Option<SavedView>,
    options: Options,
}

impl Editor {
    /// An editor with an empty, unnamed document and a zero-sized viewport
    /// (the event loop reports the real size before the first frame).
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            doc: Document::new(options.tab_stop),
            row: 0,
            offset: 0,
            column: 0,
            viewport: Viewport::default(),
            filename: None,
            status: None,
            quit_times: options.quit_times,
            prompt: None,
            search: SearchState::new(),
            saved_view: None,
            options,
        }
    }

    // -- Accessors ------------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    /// Cursor as (row, raw offset).
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> (usize, usize) {
        (self.row, self.offset)
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    #[must_use]
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// The active prompt, if one is open.
    #[inline]
    #[must_use]
    pub const fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    /// The current status message, regardless of age.
    #[must_use]
    pub fn status_message(&self) -> Option<&[u8]> {
        self.status.as_ref().map(|s| s.text.as_slice())
    }

    // -- File operations ------------------------------------------------------

    /// Load `path` into a fresh document and bind the editor to it.
    ///
    /// A file that does not exist yet opens as an empty document; saving
    /// creates it.
    ///
    /// # Errors
    ///
    /// Any read failure other than the file not existing.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let lines = match file::load_lines(path) {
            Ok(lines) => lines,
            Err(Error::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "new file");
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        let syntax = syntax::select(&path.to_string_lossy());
        debug!(filetype = syntax.map(|s| s.filetype), "language selected");
        self.doc = Document::from_lines(lines, syntax, self.options.tab_stop);
        self.filename = Some(path.to_path_buf());
        self.row = 0;
        self.offset = 0;
        self.column = 0;
        self.viewport.set_row_offset(0);
        self.viewport.set_col_offset(0);
        Ok(())
    }

    /// Write the document to its file, or ask for a name first.
    ///
    /// The outcome is reported on the status line; a failed save keeps
    /// the document modified.
    pub fn save(&mut self) {
        let Some(path) = self.filename.clone() else {
            self.prompt = Some(Prompt::new(PromptKind::SaveAs));
            return;
        };
        match self.write_to(&path) {
            Ok(written) => {
                self.doc.mark_clean();
                self.set_status_message(format!("{written} bytes written to disk"));
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "save failed");
                self.set_status_message(format!("Can't save! I/O error: {err}"));
            }
        }
    }

    fn write_to(&self, path: &Path) -> Result<usize> {
        let text = self.doc.to_text()?;
        file::persist(path, &text)
    }

    // -- Status ---------------------------------------------------------------

    /// Show `message` on the message bar for the configured timeout.
    pub fn set_status_message(&mut self, message: impl Into<Vec<u8>>) {
        self.status = Some(StatusMessage {
            text: message.into(),
            set_at: Instant::now(),
        });
    }

    fn fresh_status(&self) -> Option<&[u8]> {
        self.status
            .as_ref()
            .filter(|s| s.set_at.elapsed() < self.options.message_timeout)
            .map(|s| s.text.as_slice())
    }

    /// Drop an expired status message. Returns `true` if one was dropped.
    fn expire_status(&mut self) -> bool {
        let expired = self
            .status
            .as_ref()
            .is_some_and(|s| s.set_at.elapsed() >= self.options.message_timeout);
        if expired {
            self.status = None;
        }
        expired
    }

    // -- Screen ---------------------------------------------------------------

    /// Adopt a new terminal size.
    pub fn resize(&mut self, size: Size) {
        self.viewport.resize(size);
    }

    /// Scroll so the cursor is visible, then compose a frame into `out`.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`] if the frame buffer cannot grow.
    pub fn refresh_screen(&mut self, out: &mut OutputBuffer) -> Result<()> {
        self.column = self
            .doc
            .row(self.row)
            .map_or(0, |row| row.offset_to_column(self.offset, self.doc.tab_stop()));
        self.viewport.scroll(self.row, self.column);

        let filename = self.filename.as_deref().map(Path::to_string_lossy);
        let prompt_line = self.prompt.as_ref().map(Prompt::message);
        let frame = Frame {
            doc: &self.doc,
            viewport: &self.viewport,
            cursor_row: self.row,
            cursor_column: self.column,
            filename: filename.as_deref(),
            message: prompt_line.as_deref().or_else(|| self.fresh_status()),
        };
        compose::compose(&frame, out)
    }

    // -- Keys -----------------------------------------------------------------

    /// Apply one key.
    pub fn handle_key(&mut self, key: KeyCode) -> Action {
        if self.prompt.is_some() {
            self.handle_prompt_key(key);
            return Action::Continue;
        }

        match key {
            KeyCode::Enter => self.insert_newline(),
            k if k.is_ctrl(b'q') => {
                if self.doc.is_dirty() && self.quit_times > 0 {
                    self.set_status_message(format!(
                        "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                        self.quit_times
                    ));
                    self.quit_times -= 1;
                    return Action::Continue;
                }
                return Action::Quit;
            }
            k if k.is_ctrl(b's') => self.save(),
            k if k.is_ctrl(b'f') => self.start_search(),
            KeyCode::Home => self.offset = 0,
            KeyCode::End => {
                self.offset = self.doc.row(self.row).map_or(0, |row| row.len());
            }
            KeyCode::Backspace => self.delete_left(),
            k if k.is_ctrl(b'h') => self.delete_left(),
            KeyCode::Delete => {
                self.move_cursor(KeyCode::Right);
                self.delete_left();
            }
            KeyCode::PageUp | KeyCode::PageDown => self.page(key),
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => self.move_cursor(key),
            KeyCode::Escape => {}
            k if k.is_ctrl(b'l') => {}
            other => {
                if let Some(byte) = other.insertable_byte() {
                    self.insert_byte(byte);
                }
            }
        }

        self.quit_times = self.options.quit_times;
        Action::Continue
    }

    fn handle_prompt_key(&mut self, key: KeyCode) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        let event = prompt.handle_key(key);
        let kind = prompt.kind();

        if kind == PromptKind::Search {
            if let Some(hit) = self.search.on_key(&mut self.doc, prompt.input(), key) {
                self.row = hit.row;
                self.offset = hit.offset;
                // Past the end, so the next scroll puts the match at the top.
                self.viewport.set_row_offset(self.doc.len());
            }
        }

        match event {
            PromptEvent::Accepted => {
                let input = self.prompt.take().map(|p| p.input().to_vec());
                self.status = None;
                match (kind, input) {
                    (PromptKind::SaveAs, Some(name)) => self.save_as(&name),
                    _ => self.saved_view = None,
                }
            }
            PromptEvent::Cancelled => {
                self.prompt = None;
                match kind {
                    PromptKind::SaveAs => self.set_status_message("Save aborted"),
                    PromptKind::Search => {
                        self.status = None;
                        self.restore_view();
                    }
                }
            }
            PromptEvent::Edited | PromptEvent::Ignored => {}
        }
    }

    fn save_as(&mut self, name: &[u8]) {
        let name = String::from_utf8_lossy(name).into_owned();
        self.doc.set_syntax(syntax::select(&name));
        self.filename = Some(PathBuf::from(name));
        self.save();
    }

    fn start_search(&mut self) {
        self.saved_view = Some(SavedView {
            row: self.row,
            offset: self.offset,
            row_offset: self.viewport.row_offset(),
            col_offset: self.viewport.col_offset(),
        });
        self.search = SearchState::new();
        self.prompt = Some(Prompt::new(PromptKind::Search));
    }

    fn restore_view(&mut self) {
        if let Some(saved) = self.saved_view.take() {
            self.row = saved.row;
            self.offset = saved.offset;
            self.viewport.set_row_offset(saved.row_offset);
            self.viewport.set_col_offset(saved.col_offset);
        }
    }

    // -- Editing --------------------------------------------------------------

    fn insert_byte(&mut self, byte: u8) {
        if self.row == self.doc.len() {
            self.doc.insert_row(self.doc.len(), b"");
        }
        self.doc.insert_char(self.row, self.offset, byte);
        self.offset += 1;
    }

    fn insert_newline(&mut self) {
        self.doc.split_row(self.row, self.offset);
        self.row += 1;
        self.offset = 0;
    }

    fn delete_left(&mut self) {
        if self.row == self.doc.len() || (self.row == 0 && self.offset == 0) {
            return;
        }
        if self.offset > 0 {
            self.doc.delete_char(self.row, self.offset - 1);
            self.offset -= 1;
        } else {
            let previous = self.row - 1;
            self.offset = self.doc.row(previous).map_or(0, |row| row.len());
            self.doc.join_with_next(previous);
            self.row = previous;
        }
    }

    // -- Movement -------------------------------------------------------------

    fn row_len(&self, row: usize) -> Option<usize> {
        self.doc.row(row).map(|r| r.len())
    }

    fn move_cursor(&mut self, key: KeyCode) {
        let current = self.row_len(self.row);
        match key {
            KeyCode::Left => {
                if self.offset > 0 {
                    self.offset -= 1;
                } else if self.row > 0 {
                    self.row -= 1;
                    self.offset = self.row_len(self.row).unwrap_or(0);
                }
            }
            KeyCode::Right => match current {
                Some(len) if self.offset < len => self.offset += 1,
                Some(_) => {
                    self.row += 1;
                    self.offset = 0;
                }
                None => {}
            },
            KeyCode::Up => self.row = self.row.saturating_sub(1),
            KeyCode::Down => {
                if self.row < self.doc.len() {
                    self.row += 1;
                }
            }
            _ => {}
        }
        self.offset = self.offset.min(self.row_len(self.row).unwrap_or(0));
    }

    fn page(&mut self, key: KeyCode) {
        let screen = self.viewport.screen_rows();
        let step = if key == KeyCode::PageUp {
            self.row = self.viewport.row_offset();
            KeyCode::Up
        } else {
            self.row = (self.viewport.row_offset() + screen)
                .saturating_sub(1)
                .min(self.doc.len());
            KeyCode::Down
        };
        for _ in 0..screen {
            self.move_cursor(step);
        }
    }
}

impl App for Editor {
    fn on_key(&mut self, key: KeyCode) -> Action {
        self.handle_key(key)
    }

    fn on_resize(&mut self, size: Size) {
        debug!(cols = size.cols, rows = size.rows, "resize");
        self.resize(size);
    }

    fn on_tick(&mut self) -> bool {
        self.expire_status()
    }

    fn paint(&mut self, out: &mut OutputBuffer) -> io::Result<()> {
        self.refresh_screen(out).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::Highlight;
    use kilo_term::input::ctrl;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::time::Duration;

    fn editor() -> Editor {
        let mut ed = Editor::new(Options::default());
        ed.on_resize(Size { cols: 80, rows: 12 });
        ed
    }

    fn editor_with(lines: &[&str]) -> Editor {
        let mut ed = editor();
        ed.doc = Document::from_lines(lines.iter().map(|l| l.as_bytes().to_vec()), None, 8);
        ed
    }

    fn press(ed: &mut Editor, key: KeyCode) -> Action {
        ed.handle_key(key)
    }

    fn type_bytes(ed: &mut Editor, text: &[u8]) {
        for &b in text {
            press(ed, KeyCode::from_byte(b));
        }
    }

    fn raws(ed: &Editor) -> Vec<String> {
        ed.document()
            .rows()
            .iter()
            .map(|r| String::from_utf8(r.raw().to_vec()).unwrap())
            .collect()
    }

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("kilo_editor_test");
        let _ = fs::create_dir_all(&dir);
        dir.join(name)
    }

    fn status(ed: &Editor) -> String {
        String::from_utf8(ed.status_message().unwrap_or_default().to_vec()).unwrap()
    }

    // -- Editing --------------------------------------------------------------

    #[test]
    fn typing_into_empty_document_appends_row() {
        let mut ed = editor();
        type_bytes(&mut ed, b"hi");
        assert_eq!(raws(&ed), ["hi"]);
        assert_eq!(ed.cursor(), (0, 2));
        assert!(ed.document().is_dirty());
    }

    #[test]
    fn tab_and_control_bytes_insert() {
        let mut ed = editor();
        press(&mut ed, KeyCode::Tab);
        press(&mut ed, KeyCode::Control(ctrl(b'a')));
        assert_eq!(ed.document().row(0).unwrap().raw(), b"\t\x01");
    }

    #[test]
    fn enter_splits_row() {
        let mut ed = editor_with(&["hello"]);
        press(&mut ed, KeyCode::Right);
        press(&mut ed, KeyCode::Right);
        press(&mut ed, KeyCode::Enter);
        assert_eq!(raws(&ed), ["he", "llo"]);
        assert_eq!(ed.cursor(), (1, 0));
    }

    #[test]
    fn enter_past_last_row_appends() {
        let mut ed = editor_with(&["a"]);
        press(&mut ed, KeyCode::Down);
        press(&mut ed, KeyCode::Enter);
        assert_eq!(raws(&ed), ["a", ""]);
        assert_eq!(ed.cursor(), (2, 0));
    }

    #[test]
    fn backspace_deletes_and_joins() {
        let mut ed = editor_with(&["ab", "cd"]);
        press(&mut ed, KeyCode::Down);
        press(&mut ed, KeyCode::End);
        press(&mut ed, KeyCode::Backspace);
        assert_eq!(raws(&ed), ["ab", "c"]);
        press(&mut ed, KeyCode::Control(ctrl(b'h')));
        press(&mut ed, KeyCode::Backspace);
        assert_eq!(raws(&ed), ["ab"]);
        assert_eq!(ed.cursor(), (0, 2));
    }

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut ed = editor_with(&["ab"]);
        press(&mut ed, KeyCode::Backspace);
        assert_eq!(raws(&ed), ["ab"]);
        assert!(!ed.document().is_dirty());
    }

    #[test]
    fn delete_removes_right_and_joins_at_end() {
        let mut ed = editor_with(&["ab", "cd"]);
        press(&mut ed, KeyCode::Delete);
        assert_eq!(raws(&ed), ["b", "cd"]);
        press(&mut ed, KeyCode::End);
        press(&mut ed, KeyCode::Delete);
        assert_eq!(raws(&ed), ["bcd"]);
        assert_eq!(ed.cursor(), (0, 1));
    }

    // -- Movement -------------------------------------------------------------

    #[test]
    fn arrows_wrap_at_row_ends() {
        let mut ed = editor_with(&["ab", "c"]);
        press(&mut ed, KeyCode::End);
        press(&mut ed, KeyCode::Right);
        assert_eq!(ed.cursor(), (1, 0));
        press(&mut ed, KeyCode::Left);
        assert_eq!(ed.cursor(), (0, 2));
        press(&mut ed, KeyCode::Left);
        press(&mut ed, KeyCode::Left);
        press(&mut ed, KeyCode::Left);
        assert_eq!(ed.cursor(), (0, 0));
    }

    #[test]
    fn vertical_moves_clamp_offset() {
        let mut ed = editor_with(&["long line", "x"]);
        press(&mut ed, KeyCode::End);
        press(&mut ed, KeyCode::Down);
        assert_eq!(ed.cursor(), (1, 1));
        press(&mut ed, KeyCode::Down);
        assert_eq!(ed.cursor(), (2, 0));
        press(&mut ed, KeyCode::Down);
        assert_eq!(ed.cursor(), (2, 0));
        press(&mut ed, KeyCode::Right);
        assert_eq!(ed.cursor(), (2, 0));
    }

    #[test]
    fn page_down_and_up() {
        let lines: Vec<String> = (0..30).map(|i| i.to_string()).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut ed = editor_with(&refs);
        // 12 rows - 2 for the status line and message bar.
        assert_eq!(ed.viewport().screen_rows(), 10);
        press(&mut ed, KeyCode::PageDown);
        assert_eq!(ed.cursor().0, 19);
        let mut out = OutputBuffer::new();
        ed.refresh_screen(&mut out).unwrap();
        assert_eq!(ed.viewport().row_offset(), 10);
        press(&mut ed, KeyCode::PageUp);
        assert_eq!(ed.cursor().0, 0);
    }

    // -- Quit -----------------------------------------------------------------

    #[test]
    fn quit_clean_document_immediately() {
        let mut ed = editor_with(&["a"]);
        assert_eq!(press(&mut ed, KeyCode::Control(ctrl(b'q'))), Action::Quit);
    }

    #[test]
    fn quit_dirty_document_needs_confirmation() {
        let mut ed = editor();
        type_bytes(&mut ed, b"x");
        let quit = KeyCode::Control(ctrl(b'q'));
        for remaining in [3, 2, 1] {
            assert_eq!(press(&mut ed, quit), Action::Continue);
            assert_eq!(
                status(&ed),
                format!(
                    "WARNING!!! File has unsaved changes. Press Ctrl-Q {remaining} more times to quit."
                )
            );
        }
        assert_eq!(press(&mut ed, quit), Action::Quit);
    }

    #[test]
    fn other_key_resets_quit_countdown() {
        let mut ed = editor();
        type_bytes(&mut ed, b"x");
        let quit = KeyCode::Control(ctrl(b'q'));
        press(&mut ed, quit);
        press(&mut ed, quit);
        press(&mut ed, KeyCode::Left);
        press(&mut ed, quit);
        assert!(status(&ed).contains("Press Ctrl-Q 3 more times"));
    }

    // -- Files ----------------------------------------------------------------

    #[test]
    fn open_missing_file_binds_name() {
        let path = temp_path("does_not_exist_yet.c");
        let _ = fs::remove_file(&path);
        let mut ed = editor();
        ed.open(&path).unwrap();
        assert!(ed.document().is_empty());
        assert_eq!(ed.filename(), Some(path.as_path()));
        assert_eq!(ed.document().syntax().map(|s| s.filetype), Some("c"));
    }

    #[test]
    fn open_and_save_roundtrip() {
        let path = temp_path("roundtrip.py");
        fs::write(&path, "x = 1\r\n# note\n").unwrap();
        let mut ed = editor();
        ed.open(&path).unwrap();
        assert_eq!(raws(&ed), ["x = 1", "# note"]);
        assert_eq!(ed.document().syntax().map(|s| s.filetype), Some("python"));
        assert!(!ed.document().is_dirty());

        type_bytes(&mut ed, b"y");
        press(&mut ed, KeyCode::Control(ctrl(b's')));
        assert_eq!(status(&ed), "14 bytes written to disk");
        assert!(!ed.document().is_dirty());
        assert_eq!(fs::read(&path).unwrap(), b"yx = 1\n# note\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn failed_save_stays_dirty() {
        let mut ed = editor();
        ed.filename = Some(PathBuf::from("/nonexistent/kilo/dir/out.txt"));
        type_bytes(&mut ed, b"x");
        ed.save();
        assert!(status(&ed).starts_with("Can't save! I/O error: "));
        assert!(ed.document().is_dirty());
    }

    #[test]
    fn save_unnamed_prompts_for_name() {
        let path = temp_path("save_as.rs");
        let _ = fs::remove_file(&path);
        let mut ed = editor();
        type_bytes(&mut ed, b"fn");
        press(&mut ed, KeyCode::Control(ctrl(b's')));
        assert_eq!(ed.prompt().map(Prompt::kind), Some(PromptKind::SaveAs));

        type_bytes(&mut ed, path.to_str().unwrap().as_bytes());
        press(&mut ed, KeyCode::Enter);
        assert!(ed.prompt().is_none());
        assert_eq!(ed.filename(), Some(path.as_path()));
        assert_eq!(ed.document().syntax().map(|s| s.filetype), Some("rust"));
        assert_eq!(
            ed.document().row(0).unwrap().highlight(),
            [Highlight::KeywordPrimary; 2]
        );
        assert_eq!(fs::read(&path).unwrap(), b"fn\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn save_as_escape_aborts() {
        let mut ed = editor();
        type_bytes(&mut ed, b"x");
        press(&mut ed, KeyCode::Control(ctrl(b's')));
        type_bytes(&mut ed, b"name");
        press(&mut ed, KeyCode::Escape);
        assert!(ed.prompt().is_none());
        assert_eq!(status(&ed), "Save aborted");
        assert!(ed.filename().is_none());
        assert!(ed.document().is_dirty());
    }

    // -- Search ---------------------------------------------------------------

    #[test]
    fn search_moves_cursor_and_enter_keeps_it() {
        let mut ed = editor_with(&["foo", "bar", "baz foo"]);
        press(&mut ed, KeyCode::Control(ctrl(b'f')));
        type_bytes(&mut ed, b"foo");
        assert_eq!(ed.cursor(), (0, 0));
        press(&mut ed, KeyCode::Down);
        assert_eq!(ed.cursor(), (2, 4));
        press(&mut ed, KeyCode::Enter);
        assert!(ed.prompt().is_none());
        assert_eq!(ed.cursor(), (2, 4));
        let row = ed.document().row(2).unwrap();
        assert!(!row.highlight().contains(&Highlight::Match));
    }

    #[test]
    fn search_escape_restores_view() {
        let mut ed = editor_with(&["abc", "def", "xyz"]);
        press(&mut ed, KeyCode::Down);
        press(&mut ed, KeyCode::Right);
        press(&mut ed, KeyCode::Control(ctrl(b'f')));
        type_bytes(&mut ed, b"xy");
        assert_eq!(ed.cursor(), (2, 0));
        assert_eq!(ed.viewport().row_offset(), 3);
        press(&mut ed, KeyCode::Escape);
        assert_eq!(ed.cursor(), (1, 1));
        assert_eq!(ed.viewport().row_offset(), 0);
        assert!(!ed.document().row(2).unwrap().highlight().contains(&Highlight::Match));
    }

    #[test]
    fn erasing_search_query_keeps_cursor() {
        let mut ed = editor_with(&["x", "foo"]);
        press(&mut ed, KeyCode::Control(ctrl(b'f')));
        type_bytes(&mut ed, b"f");
        assert_eq!(ed.cursor(), (1, 0));
        press(&mut ed, KeyCode::Backspace);
        assert_eq!(ed.cursor(), (1, 0));
    }

    #[test]
    fn search_prompt_does_not_edit_document() {
        let mut ed = editor_with(&["abc"]);
        press(&mut ed, KeyCode::Control(ctrl(b'f')));
        type_bytes(&mut ed, b"zz");
        press(&mut ed, KeyCode::Backspace);
        press(&mut ed, KeyCode::Escape);
        assert_eq!(raws(&ed), ["abc"]);
        assert!(!ed.document().is_dirty());
    }

    // -- Screen ---------------------------------------------------------------

    #[test]
    fn paint_shows_prompt_on_message_bar() {
        let mut ed = editor_with(&["abc"]);
        press(&mut ed, KeyCode::Control(ctrl(b'f')));
        type_bytes(&mut ed, b"b");
        let mut out = OutputBuffer::new();
        ed.paint(&mut out).unwrap();
        let frame = String::from_utf8(out.as_bytes().to_vec()).unwrap();
        assert!(frame.contains("Search: b (Use ESC/Arrows/Enter)"));
        assert!(frame.contains("[No Name] - 1 lines"));
    }

    #[test]
    fn cursor_column_follows_tabs() {
        let mut ed = editor_with(&["\tx"]);
        press(&mut ed, KeyCode::End);
        let mut out = OutputBuffer::new();
        ed.refresh_screen(&mut out).unwrap();
        assert!(out.as_bytes().ends_with(b"\x1b[1;10H\x1b[?25h"));
    }

    #[test]
    fn status_message_expires_on_tick() {
        let options = Options {
            message_timeout: Duration::ZERO,
            ..Options::default()
        };
        let mut ed = Editor::new(options);
        ed.set_status_message("hello");
        assert_eq!(ed.fresh_status(), None);
        assert!(ed.on_tick());
        assert!(ed.status_message().is_none());
        assert!(!ed.on_tick());
    }

    #[test]
    fn status_message_visible_while_fresh() {
        let mut ed = editor();
        ed.set_status_message("hello");
        assert_eq!(ed.fresh_status(), Some(&b"hello"[..]));
        assert!(!ed.on_tick());
    }
}
