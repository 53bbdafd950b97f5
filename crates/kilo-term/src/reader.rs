// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Timed raw-byte source — the only place the editor blocks.
//
// The key decoder pulls bytes one at a time through [`ByteSource`]. Each
// call waits at most a short, fixed timeout and reports "no byte yet" when
// nothing arrives, so a lone Escape keypress can be told apart from the
// start of an escape sequence and the control loop gets an idle moment to
// notice resizes and expiring status messages.
//
// On unix the stdin descriptor is polled with a timeout before reading,
// so read() never blocks longer than the poll.

use std::io;

/// How long a single read waits for a byte (milliseconds).
pub const READ_TIMEOUT_MS: i32 = 100;

/// A source of raw terminal bytes with bounded blocking.
pub trait ByteSource {
    /// Read one byte, waiting at most a short timeout.
    ///
    /// Returns `Ok(None)` when the timeout elapses with no input.
    ///
    /// # Errors
    ///
    /// Any read failure other than "would block" / "interrupted".
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Reads raw bytes from the process's stdin.
#[derive(Debug)]
pub struct StdinSource {
    timeout_ms: i32,
}

impl StdinSource {
    /// A source using the default [`READ_TIMEOUT_MS`].
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout_ms: READ_TIMEOUT_MS,
        }
    }

    /// A source with a custom timeout (milliseconds).
    #[must_use]
    pub const fn with_timeout(timeout_ms: i32) -> Self {
        Self { timeout_ms }
    }
}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteSource for StdinSource {
    #[cfg(unix)]
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd: libc::STDIN_FILENO,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, self.timeout_ms)
        };

        if ready < 0 {
            let err = io::Error::last_os_error();
            return match err.kind() {
                io::ErrorKind::Interrupted => Ok(None),
                _ => Err(err),
            };
        }
        if ready == 0 {
            return Ok(None);
        }

        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };
        match n {
            1 => Ok(Some(byte)),
            0 => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed")),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }

    /// Non-unix fallback: a plain blocking read with no timeout.
    #[cfg(not(unix))]
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read;

        let _ = self.timeout_ms;
        let mut buf = [0u8; 1];
        match io::stdin().lock().read(&mut buf) {
            Ok(0) => Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed")),
            Ok(_) => Ok(Some(buf[0])),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(None),
            Err(err) => Err(err),
        }
    }
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
