// SPDX-License-Identifier: MIT
//
// kilo — a small terminal text editor.
//
// This is the main binary that wires together the two crates:
//
//   kilo-term   → raw mode, key decoding, output buffer, event loop
//   kilo-editor → rows, highlighting, search, prompts, frame composition
//
// The Editor implements kilo-term's App trait. Each keypress flows through:
//
//   stdin → KeyDecoder → Editor::handle_key → Document mutation
//   paint → Editor::refresh_screen → OutputBuffer → one write()
//
// Logging goes to a file only (the terminal belongs to the editor):
//
//   KILO_LOG_FILE=/tmp/kilo.log KILO_LOG=kilo_editor=trace kilo foo.c

use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use kilo_editor::options::Options;
use kilo_editor::{Editor, Result};
use kilo_term::event_loop::EventLoop;
use tracing::{error, info};

const HELP: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";
const USAGE: &str = "Usage: kilo [file]";

/// Filter used when `KILO_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "kilo=debug,kilo_editor=debug,kilo_term=debug";

// ─── Arguments ──────────────────────────────────────────────────────────────

/// The optional file to open, or `None` for a usage error.
fn parse_args<I>(args: I) -> Option<Option<PathBuf>>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args = args.into_iter().skip(1);
    let path = args.next().map(PathBuf::from);
    if args.next().is_some() {
        return None;
    }
    Some(path)
}

// ─── Logging ────────────────────────────────────────────────────────────────

fn setup_tracing() {
    use std::fs::OpenOptions;

    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let Some(log_path) = env::var_os("KILO_LOG_FILE").map(PathBuf::from) else {
        return;
    };
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) else {
        return;
    };

    let filter =
        EnvFilter::try_from_env("KILO_LOG").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    info!(path = %log_path.display(), pid = process::id(), "tracing initialized");
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn run(path: Option<PathBuf>) -> Result<()> {
    let mut editor = Editor::new(Options::from_env());
    if let Some(path) = path {
        editor.open(&path)?;
    }
    editor.set_status_message(HELP);

    let mut event_loop = EventLoop::new()?;
    event_loop.run(&mut editor)?;
    info!("exiting");
    Ok(())
}

fn main() {
    setup_tracing();

    let Some(path) = parse_args(env::args_os()) else {
        eprintln!("{USAGE}");
        process::exit(2);
    };

    // `run` returns before exiting so the terminal is restored by Drop.
    if let Err(err) = run(path) {
        error!(%err, "fatal");
        eprintln!("kilo: {err}");
        process::exit(1);
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
