// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns the raw byte stream from a [`ByteSource`] into logical keys. A
// single byte that is not ESC is a key on its own: printable bytes become
// [`KeyCode::Char`], the usual control bytes get names (Enter, Tab,
// Backspace) and the rest stay [`KeyCode::Control`].
//
// ESC starts a short lookahead using the same read timeout. If the
// follow-up bytes don't arrive in time, the user pressed Escape by itself.
// Recognized sequences:
//
// | Bytes           | Key                                  |
// |-----------------|--------------------------------------|
// | `ESC [ A..D`    | Up, Down, Right, Left                |
// | `ESC [ H / F`   | Home / End                           |
// | `ESC O H / F`   | Home / End                           |
// | `ESC [ n ~`     | 1,7 Home · 3 Delete · 4,8 End ·      |
// |                 | 5 PageUp · 6 PageDown                |
//
// Home and End each have several encodings because terminal emulators
// disagree. Anything else decodes to a bare Escape — a malformed or
// unknown sequence is never an error.

use std::io;

use tracing::trace;

use crate::reader::ByteSource;

/// The escape byte (0x1B).
pub const ESC: u8 = 0x1b;

/// The byte a terminal sends for Ctrl + `letter`.
#[inline]
#[must_use]
pub const fn ctrl(letter: u8) -> u8 {
    letter & 0x1f
}

// ─── KeyCode ────────────────────────────────────────────────────────────────

/// Identity of a decoded key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable byte (or any byte ≥ 0x80 — no multi-byte decoding).
    Char(u8),
    /// A control byte without a dedicated name, e.g. `ctrl(b'q')`.
    Control(u8),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

impl KeyCode {
    /// Classify a single byte that is not the start of an escape sequence.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            b'\r' => Self::Enter,
            b'\t' => Self::Tab,
            127 => Self::Backspace,
            ESC => Self::Escape,
            0..=31 => Self::Control(byte),
            _ => Self::Char(byte),
        }
    }

    /// Whether this is Ctrl + `letter`.
    #[inline]
    #[must_use]
    pub const fn is_ctrl(self, letter: u8) -> bool {
        matches!(self, Self::Control(b) if b == ctrl(letter))
    }

    /// The byte this key inserts into a row, if it inserts one.
    ///
    /// Navigation keys, Enter, Escape and the delete keys insert nothing.
    #[must_use]
    pub const fn insertable_byte(self) -> Option<u8> {
        match self {
            Self::Char(b) | Self::Control(b) => Some(b),
            Self::Tab => Some(b'\t'),
            _ => None,
        }
    }
}

// ─── KeyDecoder ─────────────────────────────────────────────────────────────

/// Pulls bytes from a [`ByteSource`] and decodes them into [`KeyCode`]s.
pub struct KeyDecoder<S> {
    source: S,
}

impl<S: ByteSource> KeyDecoder<S> {
    /// Wrap a byte source.
    #[must_use]
    pub const fn new(source: S) -> Self {
        Self { source }
    }

    /// Access the underlying byte source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Decode the next key, or `None` if no byte arrived before the timeout.
    ///
    /// # Errors
    ///
    /// Propagates read failures from the byte source.
    pub fn next_key(&mut self) -> io::Result<Option<KeyCode>> {
        let Some(first) = self.source.read_byte()? else {
            return Ok(None);
        };
        let key = if first == ESC {
            self.decode_escape()?
        } else {
            KeyCode::from_byte(first)
        };
        trace!(?key, "decoded key");
        Ok(Some(key))
    }

    /// Block until a key arrives.
    ///
    /// # Errors
    ///
    /// Propagates read failures from the byte source.
    pub fn read_key(&mut self) -> io::Result<KeyCode> {
        loop {
            if let Some(key) = self.next_key()? {
                return Ok(key);
            }
        }
    }

    /// Decode what follows an ESC byte. Any timeout or unknown byte
    /// degrades to [`KeyCode::Escape`].
    fn decode_escape(&mut self) -> io::Result<KeyCode> {
        let Some(first) = self.source.read_byte()? else {
            return Ok(KeyCode::Escape);
        };
        let Some(second) = self.source.read_byte()? else {
            return Ok(KeyCode::Escape);
        };

        let key = match (first, second) {
            (b'[', digit @ b'0'..=b'9') => {
                if self.source.read_byte()? != Some(b'~') {
                    return Ok(KeyCode::Escape);
                }
                match digit {
                    b'1' | b'7' => KeyCode::Home,
                    b'3' => KeyCode::Delete,
                    b'4' | b'8' => KeyCode::End,
                    b'5' => KeyCode::PageUp,
                    b'6' => KeyCode::PageDown,
                    _ => KeyCode::Escape,
                }
            }
            (b'[', b'A') => KeyCode::Up,
            (b'[', b'B') => KeyCode::Down,
            (b'[', b'C') => KeyCode::Right,
            (b'[', b'D') => KeyCode::Left,
            (b'[' | b'O', b'H') => KeyCode::Home,
            (b'[' | b'O', b'F') => KeyCode::End,
            _ => KeyCode::Escape,
        };
        Ok(key)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
