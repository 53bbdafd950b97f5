// SPDX-License-Identifier: MIT
//
// kilo-term — Terminal layer for kilo.
//
// Everything that touches the terminal directly lives here: raw mode
// via termios, the window size query, a timed raw-byte source, the
// escape-sequence key decoder, ANSI escape generation, and a byte
// buffer that turns a whole frame into a single write.
//
// No TUI framework sits underneath. The editor core composes its frame
// with the functions in `ansi` and hands the finished buffer to the
// event loop, which writes it in one go.

pub mod ansi;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
