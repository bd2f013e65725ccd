use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::msg::Msg;
use crate::task::Task;
use crate::theme::ThemeTokens;
use crate::view::{Effect, Nav, Update, View};

/// Rows the root reserves under non-fullscreen views for the status bar.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Everything the loop has to act on after one message was routed.
#[derive(Debug, Default)]
pub struct Dispatch {
    pub tasks: Vec<Task>,
    pub effects: Vec<Effect>,
    pub quit: bool,
}

impl Dispatch {
    fn absorb(&mut self, other: Dispatch) {
        self.tasks.extend(other.tasks);
        self.effects.extend(other.effects);
        self.quit |= other.quit;
    }
}

/// Ordered stack of views. Never empty: popping the last view ends the program instead.
pub struct NavStack {
    root: Box<dyn View>,
    above: Vec<Box<dyn View>>,
    size: Option<(u16, u16)>,
}

impl NavStack {
    #[must_use]
    pub fn new(root: Box<dyn View>) -> Self {
        Self {
            root,
            above: Vec::new(),
            size: None,
        }
    }

    /// Initialise the root view. Call once before the first dispatch.
    pub fn start(&mut self) -> Vec<Task> {
        self.top_mut().init().into_iter().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.above.len() + 1
    }

    #[must_use]
    pub fn top(&self) -> &dyn View {
        match self.above.last() {
            Some(v) => v.as_ref(),
            None => self.root.as_ref(),
        }
    }

    fn top_mut(&mut self) -> &mut Box<dyn View> {
        match self.above.last_mut() {
            Some(v) => v,
            None => &mut self.root,
        }
    }

    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        std::iter::once(&self.root)
            .chain(self.above.iter())
            .map(|v| v.title())
            .collect()
    }

    /// Append `view`, size it to the current terminal and run its `init`.
    pub fn push(&mut self, mut view: Box<dyn View>) -> Dispatch {
        info!(view = %view.title(), depth = self.len() + 1, "push view");
        let mut out = Dispatch::default();
        if let Some((w, h)) = self.size {
            let (w, h) = content_size(view.as_ref(), w, h);
            out.absorb(self.apply(&mut view, Msg::Resize { width: w, height: h }));
        }
        out.tasks.extend(view.init());
        self.above.push(view);
        out
    }

    /// Remove the top view. Returns `true` when it was the only one, i.e. the program
    /// should terminate; the stack itself is left intact in that case.
    pub fn pop(&mut self) -> bool {
        match self.above.pop() {
            Some(v) => {
                info!(view = %v.title(), depth = self.len(), "pop view");
                false
            }
            None => {
                info!("pop on root view; terminating");
                true
            }
        }
    }

    /// Route one message and apply any navigation it caused.
    pub fn dispatch(&mut self, msg: Msg) -> Dispatch {
        match msg {
            Msg::Push(view) => self.push(view),
            Msg::Pop => self.pop_and_refresh(),
            Msg::Key(key) if is_interrupt(key) => {
                debug!("interrupt key; quitting");
                Dispatch {
                    quit: true,
                    ..Dispatch::default()
                }
            }
            Msg::Resize { width, height } => {
                self.size = Some((width, height));
                self.resize_top()
            }
            other => {
                let update = self.top_mut().update(other);
                self.settle(update)
            }
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, theme: &ThemeTokens) {
        self.top_mut().render(f, area, theme);
    }

    /// Pop, then let the uncovered view re-derive its geometry in case the terminal
    /// changed size while it was hidden.
    fn pop_and_refresh(&mut self) -> Dispatch {
        if self.pop() {
            return Dispatch {
                quit: true,
                ..Dispatch::default()
            };
        }
        self.resize_top()
    }

    fn resize_top(&mut self) -> Dispatch {
        let Some((width, height)) = self.size else {
            return Dispatch::default();
        };
        let (w, h) = content_size(self.top(), width, height);
        let update = self.top_mut().update(Msg::Resize {
            width: w,
            height: h,
        });
        self.settle(update)
    }

    fn apply(&mut self, view: &mut Box<dyn View>, msg: Msg) -> Dispatch {
        let update = view.update(msg);
        self.settle(update)
    }

    fn settle(&mut self, update: Update) -> Dispatch {
        let Update { tasks, nav, effect } = update;
        let mut out = Dispatch {
            tasks,
            effects: effect.into_iter().collect(),
            quit: false,
        };
        match nav {
            None => {}
            Some(Nav::Push(view)) => out.absorb(self.push(view)),
            Some(Nav::Pop) => out.absorb(self.pop_and_refresh()),
            Some(Nav::Quit) => out.quit = true,
        }
        out
    }
}

/// Area a view is drawn into for a given terminal size.
#[must_use]
pub fn content_size(view: &dyn View, width: u16, height: u16) -> (u16, u16) {
    if view.fullscreen() {
        (width, height)
    } else {
        (width, height.saturating_sub(STATUS_BAR_HEIGHT))
    }
}

fn is_interrupt(key: KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}
