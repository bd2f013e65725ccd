//! The event loop: terminal events and task results in, frames and effects out.

use std::collections::VecDeque;

use anyhow::{Context, Result};
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use ratatui::layout::{Constraint, Direction, Layout};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, warn};

use crate::bridge::{self, CommandSpec};
use crate::components::statusbar::Statusbar;
use crate::config::Settings;
use crate::msg::{CommandOutcome, Msg};
use crate::nav::{Dispatch, NavStack, STATUS_BAR_HEIGHT};
use crate::term::TerminalSession;
use crate::view::{Effect, View};

/// How the loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    Quit,
    /// The terminal has been restored; the caller hands it to this command and exits with
    /// its status.
    Handoff(CommandSpec),
}

/// Lazily opened system clipboard.
#[derive(Default)]
struct Clipboard {
    inner: Option<arboard::Clipboard>,
}

impl Clipboard {
    fn set(&mut self, text: &str) -> Result<()> {
        let clipboard = match &mut self.inner {
            Some(c) => c,
            slot => slot.insert(arboard::Clipboard::new().context("open clipboard")?),
        };
        clipboard
            .set_text(text.to_string())
            .context("write clipboard")
    }
}

struct Runtime<'s> {
    settings: &'s Settings,
    session: TerminalSession,
    stack: NavStack,
    tx: UnboundedSender<Msg>,
    rx: UnboundedReceiver<Msg>,
    last_outcome: Option<CommandOutcome>,
    clipboard: Clipboard,
}

/// Run the UI with `root` at the bottom of the stack until it quits or hands off.
///
/// Must be called from within a tokio runtime; background tasks are spawned onto it.
pub fn run(settings: &Settings, root: Box<dyn View>) -> Result<Exit> {
    let session = TerminalSession::enter()?;
    let (tx, rx) = unbounded_channel();
    let mut rt = Runtime {
        settings,
        session,
        stack: NavStack::new(root),
        tx,
        rx,
        last_outcome: None,
        clipboard: Clipboard::default(),
    };
    let exit = rt.run_loop();
    drop(rt);
    info!(?exit, "ui loop finished");
    exit
}

impl Runtime<'_> {
    fn run_loop(&mut self) -> Result<Exit> {
        let tasks = self.stack.start();
        self.spawn_all(tasks);
        let resize = self.resize_msg()?;
        if let Some(exit) = self.process(resize)? {
            return Ok(exit);
        }
        loop {
            while let Ok(msg) = self.rx.try_recv() {
                if let Some(exit) = self.process(msg)? {
                    return Ok(exit);
                }
            }
            self.draw()?;
            if !event::poll(self.settings.tick)? {
                continue;
            }
            let msg = match event::read()? {
                CEvent::Key(key) if key.kind == KeyEventKind::Press => Msg::Key(key),
                CEvent::Resize(width, height) => Msg::Resize { width, height },
                _ => continue,
            };
            if let Some(exit) = self.process(msg)? {
                return Ok(exit);
            }
        }
    }

    fn resize_msg(&mut self) -> Result<Msg> {
        let size = self.session.terminal().size()?;
        Ok(Msg::Resize {
            width: size.width,
            height: size.height,
        })
    }

    fn spawn_all(&self, tasks: Vec<crate::task::Task>) {
        for t in tasks {
            t.spawn(self.tx.clone());
        }
    }

    /// Route `msg` and everything it causes, one message at a time.
    fn process(&mut self, msg: Msg) -> Result<Option<Exit>> {
        let mut queue = VecDeque::from([msg]);
        while let Some(msg) = queue.pop_front() {
            debug!(?msg, "dispatch");
            let Dispatch {
                tasks,
                effects,
                quit,
            } = self.stack.dispatch(msg);
            self.spawn_all(tasks);
            for effect in effects {
                match effect {
                    Effect::Copy(text) => {
                        if let Err(e) = self.clipboard.set(&text) {
                            warn!(error = %format!("{e:#}"), "clipboard write failed");
                        }
                    }
                    Effect::RunAndResume(spec) => {
                        let outcome = bridge::run_and_resume(&mut self.session, &spec)?;
                        self.last_outcome = Some(outcome.clone());
                        queue.push_back(Msg::CommandFinished(outcome));
                        queue.push_back(self.resize_msg()?);
                    }
                    Effect::RunAndExit(spec) => return Ok(Some(Exit::Handoff(spec))),
                }
            }
            if quit {
                return Ok(Some(Exit::Quit));
            }
        }
        Ok(None)
    }

    fn draw(&mut self) -> Result<()> {
        let theme = self.settings.theme;
        let crumbs = self.stack.titles();
        let fullscreen = self.stack.top().fullscreen();
        let outcome = self.last_outcome.clone();
        let stack = &mut self.stack;
        self.session.terminal().draw(|f| {
            let area = f.area();
            if fullscreen {
                stack.render(f, area, &theme);
                return;
            }
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
                .split(area);
            stack.render(f, chunks[0], &theme);
            Statusbar::render(f, chunks[1], &crumbs, outcome.as_ref(), &theme);
        })?;
        Ok(())
    }
}
