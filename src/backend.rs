use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::bridge::CommandSpec;
use crate::task::BoxFuture;

/// The program whose subcommands the UI fronts.
///
/// `capture` buffers a subcommand's stdout for display; `command` describes how to run one
/// with the terminal attached.
pub trait Backend: Send + Sync {
    fn capture(&self, args: Vec<String>) -> BoxFuture<Result<String>>;

    fn command(&self, label: &str, args: Vec<String>) -> CommandSpec;
}

/// Drives a real executable (by default the current binary re-executing itself).
#[derive(Debug, Clone)]
pub struct ProgramBackend {
    program: PathBuf,
    color: bool,
}

impl ProgramBackend {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>, color: bool) -> Self {
        Self {
            program: program.into(),
            color,
        }
    }
}

impl Backend for ProgramBackend {
    fn capture(&self, args: Vec<String>) -> BoxFuture<Result<String>> {
        let program = self.program.clone();
        let color = self.color;
        Box::pin(async move {
            debug!(program = %program.display(), ?args, "capturing subcommand output");
            let mut cmd = tokio::process::Command::new(&program);
            cmd.args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true);
            if color {
                cmd.env("CLICOLOR_FORCE", "1").env("FORCE_COLOR", "1");
            } else {
                cmd.env("NO_COLOR", "1");
            }
            let out = cmd
                .output()
                .await
                .with_context(|| format!("failed to run {}", program.display()))?;
            if !out.status.success() {
                let stderr = String::from_utf8_lossy(&out.stderr);
                let stderr = stderr.trim();
                match (stderr.is_empty(), out.status.code()) {
                    (false, _) => bail!("{stderr}"),
                    (true, Some(code)) => bail!("{} exited with status {code}", args.join(" ")),
                    (true, None) => bail!("{} was terminated by a signal", args.join(" ")),
                }
            }
            Ok(String::from_utf8_lossy(&out.stdout).into_owned())
        })
    }

    fn command(&self, label: &str, args: Vec<String>) -> CommandSpec {
        CommandSpec::new(label, self.program.clone(), args)
    }
}
