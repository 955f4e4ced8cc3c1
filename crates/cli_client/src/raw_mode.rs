//! Raw mode terminal wrapper for crossterm
//!
//! The terminal is restored on drop, including during a panic unwind.

use anyhow::{Context, Result};
use crossterm::{cursor, execute, terminal};
use std::io::Write;

/// Keys arrive one at a time without echo while this guard lives.
/// Ctrl-C is delivered as a key event, not a signal.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        // Best-effort restore, leaving the shell prompt on a fresh line
        let _ = terminal::disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = execute!(stdout, cursor::Show);
        let _ = writeln!(stdout);
    }
}
