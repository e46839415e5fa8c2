//! Terminal state guard for guaranteed cleanup.
//!
//! Raw mode, the alternate screen and mouse capture are undone when the
//! guard drops, whether the App returns normally, bails out with `?`, or
//! panics (with [`install_panic_hook`]).

use std::io::{self, Write};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

pub struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen with mouse capture
    pub fn enter() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let guard = Self { active: true };
        execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture)?;
        Ok(guard)
    }

    /// Restore the terminal now, reporting errors. Drop becomes a no-op.
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        restore()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.active {
            if let Err(e) = restore() {
                tracing::debug!(error = %e, "Terminal cleanup failed in Drop");
            }
        }
    }
}

fn restore() -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    disable_raw_mode()?;
    execute!(stdout, LeaveAlternateScreen, DisableMouseCapture)?;
    stdout.flush()?;
    Ok(())
}

/// Restore the terminal before the default hook prints the panic message.
///
/// Call early in main, before the terminal is set up.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        if let Err(e) = restore() {
            tracing::debug!(error = %e, "Terminal cleanup failed in panic hook");
        }
        original_hook(panic_info);
    }));
}
