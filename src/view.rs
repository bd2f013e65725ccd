use ratatui::Frame;
use ratatui::layout::Rect;

use crate::bridge::CommandSpec;
use crate::msg::Msg;
use crate::task::Task;
use crate::theme::ThemeTokens;

/// Lifecycle contract shared by every screen on the navigation stack.
pub trait View: Send {
    /// Short name used in breadcrumbs and logs.
    fn title(&self) -> String;

    /// Called once when the view becomes part of the stack.
    fn init(&mut self) -> Option<Task> {
        None
    }

    fn update(&mut self, msg: Msg) -> Update;

    fn render(&mut self, f: &mut Frame, area: Rect, theme: &ThemeTokens);

    /// Fullscreen views get the whole terminal; others are framed by the status bar.
    fn fullscreen(&self) -> bool {
        true
    }
}

/// Navigation instruction applied by the root before the next message.
pub enum Nav {
    Push(Box<dyn View>),
    Pop,
    Quit,
}

/// Side effects that need the terminal or the host environment and therefore run on the
/// loop itself rather than as background tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    RunAndResume(CommandSpec),
    RunAndExit(CommandSpec),
    Copy(String),
}

/// What handling one message produced.
#[derive(Default)]
pub struct Update {
    pub tasks: Vec<Task>,
    pub nav: Option<Nav>,
    pub effect: Option<Effect>,
}

impl std::fmt::Debug for Update {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nav = match &self.nav {
            None => "none".to_string(),
            Some(Nav::Push(v)) => format!("push({})", v.title()),
            Some(Nav::Pop) => "pop".to_string(),
            Some(Nav::Quit) => "quit".to_string(),
        };
        f.debug_struct("Update")
            .field("tasks", &self.tasks)
            .field("nav", &nav)
            .field("effect", &self.effect)
            .finish()
    }
}

impl Update {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn task(task: Task) -> Self {
        Self {
            tasks: vec![task],
            ..Self::default()
        }
    }

    #[must_use]
    pub fn push(view: impl View + 'static) -> Self {
        Self {
            nav: Some(Nav::Push(Box::new(view))),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn pop() -> Self {
        Self {
            nav: Some(Nav::Pop),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn quit() -> Self {
        Self {
            nav: Some(Nav::Quit),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn effect(effect: Effect) -> Self {
        Self {
            effect: Some(effect),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_task(mut self, task: Option<Task>) -> Self {
        self.tasks.extend(task);
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }

    #[must_use]
    pub fn is_pop(&self) -> bool {
        matches!(self.nav, Some(Nav::Pop))
    }

    #[must_use]
    pub fn pushed_title(&self) -> Option<String> {
        match &self.nav {
            Some(Nav::Push(v)) => Some(v.title()),
            _ => None,
        }
    }
}
