use std::io::{self, Stdout};

use anyhow::{Context, Result};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, warn};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Owns raw mode and the alternate screen for the lifetime of the UI.
///
/// Dropping the session always puts the terminal back into normal mode, including when the
/// loop unwinds from a panic.
pub struct TerminalSession {
    terminal: Tui,
    active: bool,
}

impl std::fmt::Debug for TerminalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TerminalSession{{active:{}}}", self.active)
    }
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        terminal.hide_cursor()?;
        Ok(Self {
            terminal,
            active: true,
        })
    }

    pub fn terminal(&mut self) -> &mut Tui {
        &mut self.terminal
    }

    /// Hand the terminal back to the shell: cooked mode, main screen, visible cursor.
    pub fn suspend(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        debug!("suspending terminal session");
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        self.active = false;
        Ok(())
    }

    /// Re-enter UI mode after [`suspend`](Self::suspend) and force a full repaint.
    pub fn resume(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        debug!("resuming terminal session");
        enable_raw_mode()?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        self.active = true;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = self.suspend() {
            warn!(error = %e, "failed to restore terminal");
        }
    }
}

/// Best-effort reset for paths that no longer hold a session (handoff, fatal errors).
pub fn reset_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
}
