//! Running external commands with the real terminal attached.
//!
//! Two flavours: [`run_and_resume`] suspends the UI, runs the child with inherited stdio and
//! comes back to the same view; [`run_and_exit`] gives the terminal to the child for good.

use std::ffi::OsString;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::msg::CommandOutcome;
use crate::term::{TerminalSession, reset_terminal};

/// A program plus flattened argument list, with a short label for status lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub label: String,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(label: impl Into<String>, program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            label: label.into(),
            program: program.into(),
            args,
        }
    }

    /// Shell-ish rendering for logs and titles. Not meant to be re-parsed.
    #[must_use]
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().map(|a| {
            if a.is_empty() || a.contains(char::is_whitespace) {
                format!("'{}'", a.replace('\'', r"'\''"))
            } else {
                a.clone()
            }
        }));
        parts.join(" ")
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args.iter().map(OsString::from));
        if let Ok(cwd) = std::env::current_dir() {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

/// Run `spec` with stdin/stdout/stderr inherited. The terminal must already be in normal
/// mode.
pub fn run_attached(spec: &CommandSpec) -> CommandOutcome {
    info!(command = %spec.display(), "running attached command");
    let status = spec.to_command().status();
    let outcome = match status {
        Ok(st) => CommandOutcome {
            label: spec.label.clone(),
            code: st.code(),
            error: None,
        },
        Err(e) => CommandOutcome {
            label: spec.label.clone(),
            code: None,
            error: Some(format!("failed to start {}: {e}", spec.program.display())),
        },
    };
    info!(label = %outcome.label, code = ?outcome.code, "attached command finished");
    outcome
}

fn pause_for_enter(outcome: &CommandOutcome) {
    if !io::stdin().is_terminal() {
        return;
    }
    let mut out = io::stdout();
    let _ = writeln!(out);
    if let Some(e) = &outcome.error {
        let _ = writeln!(out, "\x1b[31m[✖] {e}\x1b[0m");
    }
    let _ = write!(out, "\x1b[97;1mPress Enter to return\x1b[0m ");
    let _ = out.flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

/// Suspend the UI, run the child attached to the terminal, then re-enter UI mode.
///
/// Waits for Enter before resuming so short-lived output is not wiped by the repaint.
pub fn run_and_resume(session: &mut TerminalSession, spec: &CommandSpec) -> Result<CommandOutcome> {
    session.suspend()?;
    let outcome = run_attached(spec);
    pause_for_enter(&outcome);
    session.resume()?;
    Ok(outcome)
}

/// Restore the terminal and hand it to `spec` permanently.
///
/// On Unix the current process image is replaced, so this only returns on failure. Elsewhere
/// the child is awaited and its exit code returned for the caller to exit with.
pub fn run_and_exit(spec: &CommandSpec) -> Result<i32> {
    reset_terminal();
    info!(command = %spec.display(), "handing terminal to child");
    let mut cmd = spec.to_command();
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let err = cmd.exec();
        warn!(error = %err, "exec failed");
        Err(err).with_context(|| format!("exec {}", spec.program.display()))
    }
    #[cfg(not(unix))]
    {
        let status = cmd
            .status()
            .with_context(|| format!("spawn {}", spec.program.display()))?;
        Ok(status.code().unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let spec = CommandSpec::new(
            "attach",
            "/usr/bin/tool",
            vec!["attach".into(), "--path".into(), "my dir".into()],
        );
        assert_eq!(spec.display(), "/usr/bin/tool attach --path 'my dir'");
    }

    #[test]
    fn missing_program_reports_error_outcome() {
        let spec = CommandSpec::new("nope", "/definitely/not/a/program", vec![]);
        let out = run_attached(&spec);
        assert!(out.error.is_some());
        assert!(!out.success());
    }
}
