//! Editor options.
//!
//! A handful of numeric settings with fixed defaults, overridable from the
//! environment at startup. There are no configuration files.
//!
//! | Name             | Abbrev | Env var                | Default |
//! |------------------|--------|------------------------|---------|
//! | `tabstop`        | `ts`   | `KILO_TABSTOP`         | 8       |
//! | `quittimes`      | `qt`   | `KILO_QUIT_TIMES`      | 3       |
//! | `messagetimeout` | `mt`   | `KILO_MESSAGE_TIMEOUT` | 5 (s)   |

use std::ops::RangeInclusive;
use std::time::Duration;

use tracing::warn;

use crate::error::{Error, Result};

/// Accepted tab widths; values outside are clamped.
pub const TAB_STOP_RANGE: RangeInclusive<usize> = 1..=16;

/// Environment variables consulted by [`Options::from_env`], with the
/// option each one sets.
const ENV_OVERRIDES: [(&str, &str); 3] = [
    ("KILO_TABSTOP", "tabstop"),
    ("KILO_QUIT_TIMES", "quittimes"),
    ("KILO_MESSAGE_TIMEOUT", "messagetimeout"),
];

/// Editor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Tab width used by the render projector.
    pub tab_stop: usize,
    /// Extra Ctrl-Q presses required to quit with unsaved changes.
    pub quit_times: u32,
    /// How long a status message stays visible.
    pub message_timeout: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tab_stop: 8,
            quit_times: 3,
            message_timeout: Duration::from_secs(5),
        }
    }
}

impl Options {
    /// Defaults overridden by whatever `KILO_*` variables are set.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden through an arbitrary variable lookup.
    ///
    /// Bad values are logged and skipped.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        for (var, name) in ENV_OVERRIDES {
            let Some(value) = lookup(var) else {
                continue;
            };
            if let Err(err) = options.assign(name, &value) {
                warn!(var, %err, "ignoring environment override");
            }
        }
        options
    }

    /// Set one option by full name or abbreviation.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOption`] for an unknown name or a value that is not
    /// a non-negative integer.
    pub fn assign(&mut self, name: &str, value: &str) -> Result<()> {
        let invalid = || Error::InvalidOption {
            name: name.to_string(),
            value: value.to_string(),
        };
        let number: u64 = value.trim().parse().map_err(|_| invalid())?;
        match name {
            "tabstop" | "ts" => {
                let width = usize::try_from(number).unwrap_or(usize::MAX);
                self.tab_stop = width.clamp(*TAB_STOP_RANGE.start(), *TAB_STOP_RANGE.end());
            }
            "quittimes" | "qt" => {
                self.quit_times = u32::try_from(number).unwrap_or(u32::MAX);
            }
            "messagetimeout" | "mt" => {
                self.message_timeout = Duration::from_secs(number);
            }
            _ => return Err(invalid()),
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
