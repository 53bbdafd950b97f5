//! Prompt — single-line input on the message bar.
//!
//! Used for *Save as* and incremental *Search*. The prompt only edits its
//! own input; the editor decides what an accepted or cancelled prompt
//! means and, for search, forwards every key to the search controller.

use kilo_term::input::KeyCode;

/// What the prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// A filename for an unnamed document.
    SaveAs,
    /// An incremental search query.
    Search,
}

impl PromptKind {
    const fn label(self) -> &'static str {
        match self {
            Self::SaveAs => "Save as",
            Self::Search => "Search",
        }
    }

    const fn hint(self) -> &'static str {
        match self {
            Self::SaveAs => "(ESC to cancel)",
            Self::Search => "(Use ESC/Arrows/Enter)",
        }
    }
}

/// Outcome of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptEvent {
    /// The input changed.
    Edited,
    /// The key did not change the input.
    Ignored,
    /// Enter on non-empty input.
    Accepted,
    /// Escape.
    Cancelled,
}

/// An active prompt and its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    kind: PromptKind,
    input: Vec<u8>,
}

impl Prompt {
    /// Start an empty prompt.
    #[must_use]
    pub const fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn kind(&self) -> PromptKind {
        self.kind
    }

    /// Input typed so far.
    #[inline]
    #[must_use]
    pub fn input(&self) -> &[u8] {
        &self.input
    }

    /// Apply one key to the input.
    ///
    /// Printable ASCII appends; Backspace, Delete and Ctrl-H remove the last
    /// byte; Enter accepts only when the input is non-empty.
    pub fn handle_key(&mut self, key: KeyCode) -> PromptEvent {
        match key {
            KeyCode::Backspace | KeyCode::Delete => self.pop(),
            k if k.is_ctrl(b'h') => self.pop(),
            KeyCode::Escape => PromptEvent::Cancelled,
            KeyCode::Enter if !self.input.is_empty() => PromptEvent::Accepted,
            KeyCode::Char(b) if b.is_ascii() && !b.is_ascii_control() => {
                self.input.push(b);
                PromptEvent::Edited
            }
            _ => PromptEvent::Ignored,
        }
    }

    /// The message-bar line: label, input and a usage hint.
    #[must_use]
    pub fn message(&self) -> Vec<u8> {
        let mut line = Vec::with_capacity(self.input.len() + 40);
        line.extend_from_slice(self.kind.label().as_bytes());
        line.extend_from_slice(b": ");
        line.extend_from_slice(&self.input);
        line.push(b' ');
        line.extend_from_slice(self.kind.hint().as_bytes());
        line
    }

    fn pop(&mut self) -> PromptEvent {
        if self.input.pop().is_some() {
            PromptEvent::Edited
        } else {
            PromptEvent::Ignored
        }
    }
}
