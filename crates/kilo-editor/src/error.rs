//! Error type for the editor core.

use std::collections::TryReserveError;
use std::io;

/// Everything that can go wrong in the editor core.
///
/// Out-of-range rows and offsets are not errors — edits clamp or do
/// nothing. Malformed escape sequences are not errors either.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a file, or the terminal, failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// A buffer could not grow.
    #[error("out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// Save was requested for a document that has no filename yet.
    #[error("no filename")]
    NoFilename,

    /// An option override named an unknown option or carried a bad value.
    #[error("invalid value {value:?} for option {name}")]
    InvalidOption { name: String, value: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(inner) => inner,
            Error::OutOfMemory(_) => Self::new(io::ErrorKind::OutOfMemory, err),
            Error::NoFilename | Error::InvalidOption { .. } => {
                Self::new(io::ErrorKind::InvalidInput, err)
            }
        }
    }
}
