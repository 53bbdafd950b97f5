// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop — one thread, one frame, one key at a time.
//
// The loop alternates two steps:
//
//   1. Ask the application to compose a frame into the output buffer and
//      write it to the terminal in a single write().
//   2. Block (with the byte source's short timeout) for the next key and
//      hand it to the application.
//
// When the timeout fires with no input, the loop checks the SIGWINCH flag
// and gives the application a tick; it repaints only if one of them says
// something changed. There is no background thread and no shared mutable
// state — a long paste is just many keys processed in order.
//
// # SIGWINCH Handling
//
// Terminal resize is detected via a SIGWINCH handler that sets an
// `AtomicBool`. The loop checks the flag on every idle timeout, so the
// worst-case latency from resize to redraw is one read timeout.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error};

use crate::input::{KeyCode, KeyDecoder};
use crate::output::OutputBuffer;
use crate::reader::{ByteSource, StdinSource};
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Global flag set by the SIGWINCH handler.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install a signal handler for SIGWINCH (terminal resize).
///
/// The handler only stores to an atomic, which is async-signal-safe.
#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// Only [`on_key`](App::on_key) and [`paint`](App::paint) are required.
pub trait App {
    /// Handle one decoded key. Return [`Action::Quit`] to exit.
    fn on_key(&mut self, key: KeyCode) -> Action;

    /// Handle terminal resize.
    fn on_resize(&mut self, _size: Size) {}

    /// Called when a read times out with no input.
    ///
    /// Return `true` if state changed and a repaint is needed.
    fn on_tick(&mut self) -> bool {
        false
    }

    /// Compose a complete frame into `out`.
    ///
    /// The buffer is empty on entry; the loop writes it in one call
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Implementations report failures that should end the session
    /// (e.g. running out of memory for the frame).
    fn paint(&mut self, out: &mut OutputBuffer) -> io::Result<()>;
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the terminal, the key decoder and the output buffer. Call
/// [`run`](Self::run) to enter the loop — it returns when the application
/// signals [`Action::Quit`] or an I/O error occurs. The terminal is
/// restored either way.
///
/// # Example
///
/// ```no_run
/// use std::io;
/// use kilo_term::event_loop::{Action, App, EventLoop};
/// use kilo_term::input::KeyCode;
/// use kilo_term::output::OutputBuffer;
///
/// struct MyApp;
///
/// impl App for MyApp {
///     fn on_key(&mut self, key: KeyCode) -> Action {
///         if key == KeyCode::Char(b'q') {
///             return Action::Quit;
///         }
///         Action::Continue
///     }
///
///     fn paint(&mut self, out: &mut OutputBuffer) -> io::Result<()> {
///         out.push_bytes(b"press q");
///         Ok(())
///     }
/// }
///
/// let mut event_loop = EventLoop::new()?;
/// event_loop.run(&mut MyApp)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop<S = StdinSource> {
    terminal: Terminal,
    decoder: KeyDecoder<S>,
    out: OutputBuffer,
}

impl EventLoop<StdinSource> {
    /// Create an event loop reading keys from stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn new() -> io::Result<Self> {
        Self::with_source(StdinSource::new())
    }
}

impl<S: ByteSource> EventLoop<S> {
    /// Create an event loop reading keys from an arbitrary byte source.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn with_source(source: S) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            decoder: KeyDecoder::new(source),
            out: OutputBuffer::new(),
        })
    }

    /// The current terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run the event loop until the application returns [`Action::Quit`].
    ///
    /// Enters raw mode, reports the initial size to the application, and
    /// restores the terminal on exit (even on error).
    ///
    /// # Errors
    ///
    /// Returns an error if terminal enter/leave, reading a key, or writing
    /// a frame fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();
        app.on_resize(self.terminal.size());

        let result = self.run_inner(app);
        if let Err(err) = &result {
            error!(%err, "event loop failed");
        }

        // Always clean up, even if the loop errored.
        self.terminal.leave()?;
        result
    }

    /// The inner loop, separated so cleanup runs regardless of outcome.
    fn run_inner(&mut self, app: &mut impl App) -> io::Result<()> {
        let mut dirty = true;

        loop {
            if dirty {
                self.out.clear();
                app.paint(&mut self.out)?;
                self.out.flush_stdout()?;
                dirty = false;
            }

            if let Some(key) = self.decoder.next_key()? {
                if app.on_key(key) == Action::Quit {
                    debug!("quit requested");
                    return Ok(());
                }
                dirty = true;
                continue;
            }

            // Idle: no byte before the timeout.
            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                debug!(cols = size.cols, rows = size.rows, "terminal resized");
                app.on_resize(size);
                dirty = true;
            }
            if app.on_tick() {
                dirty = true;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
