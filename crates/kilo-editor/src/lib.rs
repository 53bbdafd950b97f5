//! # kilo-editor — Editor core for kilo
//!
//! This crate turns keystrokes into document edits and document state into
//! terminal frames:
//!
//! - **[`document`]** — the row store: rows, edits, dirty counter
//! - **[`render`]** — tab expansion and offset/column conversion
//! - **[`highlight`]** — the per-row highlight automaton
//! - **[`syntax`]** — the built-in language table
//! - **[`search`]** — incremental wrap-around search with match overlay
//! - **[`compose`]** — scrolling and the frame compositor
//! - **[`editor`]** — the context object and key bindings
//!
//! One byte is one column everywhere except for tabs; multi-byte
//! characters are not decoded.

pub mod compose;
pub mod document;
pub mod editor;
pub mod error;
pub mod file;
pub mod highlight;
pub mod options;
pub mod prompt;
pub mod render;
pub mod row;
pub mod search;
pub mod syntax;

pub use editor::Editor;
pub use error::{Error, Result};
