//! Highlight engine — per-byte classification of a rendered row.
//!
//! The engine is a small state machine run once per row over the rendered
//! bytes. Exactly one piece of state crosses row boundaries: whether the
//! row ends inside an unterminated block comment. The caller seeds
//! `in_block_comment` from the previous row's result and, when a row's
//! result changes, re-runs the engine on the following rows (see
//! [`Document`](crate::document::Document)).
//!
//! # Scan order at each position
//!
//! 1. Single-line comment marker (outside strings and block comments):
//!    the rest of the row is [`Highlight::Comment`].
//! 2. Block comments: inside one, everything up to and including the end
//!    marker is [`Highlight::BlockComment`]; a start marker enters one.
//! 3. Strings: `"` or `'` opens, a matching unescaped quote closes, `\`
//!    escapes the next byte.
//! 4. Numbers: a digit after a separator or after another number byte, and
//!    a `.` directly after a number byte.
//! 5. Keywords, only right after a separator, longest match first, and only
//!    when followed by a separator (or the end of the row).
//! 6. Anything else is [`Highlight::Normal`].

use kilo_term::ansi::Color;

use crate::syntax::{KeywordClass, Syntax, SyntaxFlags};

/// Classification of one rendered byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Highlight {
    #[default]
    Normal,
    Comment,
    BlockComment,
    KeywordPrimary,
    KeywordSecondary,
    String,
    Number,
    /// Overlay for the current search match.
    Match,
}

impl Highlight {
    /// Terminal color used to draw this class.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Normal => Color::Default,
            Self::Comment | Self::BlockComment => Color::Cyan,
            Self::KeywordPrimary => Color::Yellow,
            Self::KeywordSecondary => Color::Green,
            Self::String => Color::Magenta,
            Self::Number => Color::Red,
            Self::Match => Color::Blue,
        }
    }
}

/// Whether `byte` delimits keywords and numbers.
///
/// Whitespace, NUL, or one of `,.()+-/*=~%<>[];`.
#[inline]
#[must_use]
pub fn is_separator(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c | 0)
        || b",.()+-/*=~%<>[];".contains(&byte)
}

/// Result of highlighting one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineHighlight {
    /// One tag per rendered byte.
    pub tags: Vec<Highlight>,
    /// The row ends inside an unterminated block comment.
    pub open_comment: bool,
}

/// Classify every byte of `rendered`.
///
/// `in_block_comment` is the previous row's `open_comment`. With no
/// language every byte is [`Highlight::Normal`] and nothing stays open.
#[must_use]
pub fn highlight_line(
    rendered: &[u8],
    syntax: Option<&Syntax>,
    in_block_comment: bool,
) -> LineHighlight {
    let mut tags = vec![Highlight::Normal; rendered.len()];
    let Some(syntax) = syntax else {
        return LineHighlight {
            tags,
            open_comment: false,
        };
    };

    let scs = syntax.singleline_comment.as_bytes();
    let mcs = syntax.block_comment_start.as_bytes();
    let mce = syntax.block_comment_end.as_bytes();
    let block_comments = syntax.has_block_comments();

    let mut prev_sep = true;
    let mut in_string: Option<u8> = None;
    let mut in_comment = in_block_comment && block_comments;

    let mut i = 0;
    while i < rendered.len() {
        let byte = rendered[i];
        let prev_hl = if i > 0 { tags[i - 1] } else { Highlight::Normal };
        let rest = &rendered[i..];

        if !scs.is_empty() && in_string.is_none() && !in_comment && rest.starts_with(scs) {
            tags[i..].fill(Highlight::Comment);
            break;
        }

        if block_comments && in_string.is_none() {
            if in_comment {
                if rest.starts_with(mce) {
                    tags[i..i + mce.len()].fill(Highlight::BlockComment);
                    i += mce.len();
                    in_comment = false;
                    prev_sep = true;
                } else {
                    tags[i] = Highlight::BlockComment;
                    i += 1;
                }
                continue;
            } else if rest.starts_with(mcs) {
                tags[i..i + mcs.len()].fill(Highlight::BlockComment);
                i += mcs.len();
                in_comment = true;
                continue;
            }
        }

        if syntax.flags.contains(SyntaxFlags::STRINGS) {
            if let Some(quote) = in_string {
                tags[i] = Highlight::String;
                if byte == b'\\' && i + 1 < rendered.len() {
                    tags[i + 1] = Highlight::String;
                    i += 2;
                    continue;
                }
                if byte == quote {
                    in_string = None;
                }
                i += 1;
                prev_sep = true;
                continue;
            } else if byte == b'"' || byte == b'\'' {
                in_string = Some(byte);
                tags[i] = Highlight::String;
                i += 1;
                continue;
            }
        }

        if syntax.flags.contains(SyntaxFlags::NUMBERS)
            && ((byte.is_ascii_digit() && (prev_sep || prev_hl == Highlight::Number))
                || (byte == b'.' && prev_hl == Highlight::Number))
        {
            tags[i] = Highlight::Number;
            i += 1;
            prev_sep = false;
            continue;
        }

        if prev_sep {
            if let Some((len, class)) = match_keyword(syntax, rest) {
                let tag = match class {
                    KeywordClass::Primary => Highlight::KeywordPrimary,
                    KeywordClass::Secondary => Highlight::KeywordSecondary,
                };
                tags[i..i + len].fill(tag);
                i += len;
                prev_sep = false;
                continue;
            }
        }

        prev_sep = is_separator(byte);
        i += 1;
    }

    LineHighlight {
        tags,
        open_comment: in_comment,
    }
}

/// Longest keyword that prefixes `rest` and is followed by a separator or
/// the end of the row.
fn match_keyword(syntax: &Syntax, rest: &[u8]) -> Option<(usize, KeywordClass)> {
    syntax
        .keywords()
        .filter(|(kw, _)| {
            !kw.is_empty()
                && rest.starts_with(kw)
                && rest.get(kw.len()).is_none_or(|&next| is_separator(next))
        })
        .max_by_key(|(kw, _)| kw.len())
        .map(|(kw, class)| (kw.len(), class))
}
