// SPDX-License-Identifier: MIT
//
// The editor's hold on the tty: raw mode, the alternate screen, window
// size, and guaranteed restore.
//
// Safety: termios (tcgetattr/tcsetattr), the TIOCGWINSZ ioctl, isatty and
// the panic hook's raw write(2) are libc calls. Every unsafe block wraps a
// single call.
#![allow(unsafe_code)]
//
// Terminal owns the saved termios. It enters raw mode via termios,
// switches to the alternate screen, and guarantees cleanup on drop — even if
// the editor panics mid-frame.
//
// The panic hook bypasses Rust's stdout lock and writes a pre-built restore
// sequence directly to fd 1, so a panic raised while a frame is being
// flushed cannot deadlock. Then the original handler prints its message to
// a working terminal.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use tracing::{debug, warn};

use crate::ansi;
use crate::reader::{ByteSource, StdinSource};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Window size in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Columns.
    pub cols: u16,
    /// Rows.
    pub rows: u16,
}

impl Size {
    /// Fallback when neither the ioctl nor the cursor report works.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Window size from `ioctl(TIOCGWINSZ)` on stdout.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Ask the terminal itself where its bottom-right corner is.
///
/// Moves the cursor as far right and down as it goes, requests a cursor
/// position report, and parses the `ESC [ rows ; cols R` reply. Only
/// meaningful in raw mode; the reply would otherwise be line-buffered.
///
/// # Errors
///
/// Returns an error if writing the request or reading the reply fails.
pub fn query_size_via_cursor(source: &mut impl ByteSource) -> io::Result<Option<Size>> {
    let mut stdout = io::stdout().lock();
    ansi::cursor_to_far_corner(&mut stdout)?;
    ansi::request_cursor_position(&mut stdout)?;
    stdout.flush()?;
    drop(stdout);

    let mut reply = Vec::with_capacity(32);
    while reply.len() < 32 {
        match source.read_byte()? {
            Some(b'R') | None => break,
            Some(byte) => reply.push(byte),
        }
    }
    Ok(parse_cursor_report(&reply))
}

/// Parse a cursor position report body: `ESC [ rows ; cols` (the trailing
/// `R` already stripped).
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?;
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;
    let size = Size {
        cols: cols.parse().ok()?,
        rows: rows.parse().ok()?,
    };
    (size.cols > 0 && size.rows > 0).then_some(size)
}

/// Whether stdin is a tty.
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Copy of the cooked-mode termios for the panic hook.
///
/// The [`Terminal`] struct owns its own copy, but the panic hook can't
/// access it. This global backup lets the hook restore cooked mode
/// without the struct.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Put the cooked-mode termios back, ignoring failures.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Bytes written by the panic hook before the panic message.
///
/// Reset SGR attributes, show cursor, exit alternate screen. Alternate
/// screen exit is last so the shell content comes back clean.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[0m\x1b[?25h\x1b[?1049l";

/// The panic hook is installed once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Chain a hook that restores the tty in front of the existing panic hook.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the restore sequence directly to stdout's file descriptor.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Owner of raw mode for the lifetime of an editing session.
///
/// Call [`enter`](Self::enter) to switch to editor mode (raw mode plus the
/// alternate screen). The terminal is restored when the handle is dropped —
/// even on panic.
///
/// # Example
///
/// ```no_run
/// use kilo_term::terminal::Terminal;
///
/// let mut term = Terminal::new()?;
/// term.enter()?;
/// // ... render frames, handle keys ...
/// // Terminal is restored automatically on drop.
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    /// Cooked-mode settings to restore on leave.
    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    /// Last known window size; see [`refresh_size`](Self::refresh_size).
    size: Size,

    /// Whether raw mode and the alternate screen are active.
    active: bool,
}

impl Terminal {
    /// A handle in cooked mode with the current window size.
    ///
    /// Does **not** enter raw mode — call [`enter`](Self::enter) for that.
    /// Falls back to 80×24 if the size cannot be determined yet; the
    /// cursor-report fallback needs raw mode and runs in `enter`.
    ///
    /// # Errors
    ///
    /// Currently infallible, but returns `Result` for forward compatibility.
    pub fn new() -> io::Result<Self> {
        let size = get_size().unwrap_or(Size::FALLBACK);

        Ok(Self {
            #[cfg(unix)]
            original_termios: None,
            size,
            active: false,
        })
    }

    /// Last known window size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Ask the OS for the window size again.
    ///
    /// Call this after SIGWINCH. When the ioctl fails and raw mode is
    /// active, the terminal is asked for a cursor position report instead.
    /// Returns and caches the result.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(s) = get_size() {
            self.size = s;
        } else if self.active {
            match query_size_via_cursor(&mut StdinSource::new()) {
                Ok(Some(s)) => self.size = s,
                Ok(None) => warn!("terminal did not answer the cursor position request"),
                Err(err) => warn!(%err, "cursor position request failed"),
            }
        }
        self.size
    }

    /// Whether we're currently in editor mode.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter editor mode: raw mode, alternate screen, cleared screen.
    ///
    /// Does nothing when already entered.
    ///
    /// # Errors
    ///
    /// Fails if termios cannot be changed or stdout cannot be written.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.enable_raw_mode()?;

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::enter_alt_screen(&mut lock)?;
        ansi::clear_screen(&mut lock)?;
        ansi::cursor_home(&mut lock)?;
        lock.flush()?;
        drop(lock);

        self.active = true;
        self.refresh_size();
        debug!(cols = self.size.cols, rows = self.size.rows, "entered raw mode");
        Ok(())
    }

    /// Leave editor mode and restore the terminal.
    ///
    /// Idempotent: calling `leave()` while inactive is a no-op.
    ///
    /// # Errors
    ///
    /// Fails if stdout cannot be written or termios cannot be restored.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::reset(&mut lock)?;
        ansi::clear_screen(&mut lock)?;
        ansi::cursor_home(&mut lock)?;
        ansi::cursor_show(&mut lock)?;
        ansi::exit_alt_screen(&mut lock)?;
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()?;
        self.active = false;
        debug!("left raw mode");
        Ok(())
    }

    // ── termios ─────────────────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if !is_tty() {
            return Ok(());
        }

        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            // No break signal, no CR→NL, no parity check, no 8th-bit strip,
            // no Ctrl-S/Ctrl-Q flow control.
            termios.c_iflag &=
                !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            // No "\n" → "\r\n" translation on output.
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;
            // No echo, byte-at-a-time input, no Ctrl-C/Ctrl-Z, no Ctrl-V.
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

            // VMIN=1, VTIME=0: the byte source polls first, so read()
            // only runs when a byte is ready.
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            use std::os::unix::io::AsRawFd;
            let fd = io::stdin().as_raw_fd();

            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.original_termios = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
