use std::fmt;

use crossterm::event::KeyEvent;

use crate::components::chart::ChartEntry;
use crate::screens::sessions::SessionSummary;
use crate::view::View;

/// Everything the root controller can route. Each message is consumed exactly once.
pub enum Msg {
    /// Terminal size changed; carries the area the receiving view will be drawn into.
    Resize { width: u16, height: u16 },
    Key(KeyEvent),
    Push(Box<dyn View>),
    Pop,
    Loaded(Loaded),
    CopyFlashExpired { seq: u64 },
    CommandFinished(CommandOutcome),
}

impl fmt::Debug for Msg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resize { width, height } => write!(f, "Resize({width}x{height})"),
            Self::Key(k) => write!(f, "Key({:?}, {:?})", k.code, k.modifiers),
            Self::Push(v) => write!(f, "Push({})", v.title()),
            Self::Pop => f.write_str("Pop"),
            Self::Loaded(l) => write!(
                f,
                "Loaded({:?}, gen={}, ok={})",
                l.tag,
                l.generation,
                l.payload.is_ok()
            ),
            Self::CopyFlashExpired { seq } => write!(f, "CopyFlashExpired({seq})"),
            Self::CommandFinished(o) => write!(f, "CommandFinished({}, {:?})", o.label, o.code),
        }
    }
}

/// Result of a background load, tagged with the context that requested it.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub tag: LoadTag,
    pub generation: u64,
    pub payload: Result<Payload, String>,
}

/// Which slot of the receiving view a load belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTag {
    Content,
    Tab(usize),
    Suggestions { field: usize },
    Sessions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Cost {
        chart: Vec<ChartEntry>,
        table: String,
    },
    Suggestions(Vec<String>),
    Sessions(Vec<SessionSummary>),
}

/// How an attached child process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub label: String,
    pub code: Option<i32>,
    pub error: Option<String>,
}

impl CommandOutcome {
    #[must_use]
    pub fn success(&self) -> bool {
        self.error.is_none() && self.code == Some(0)
    }

    #[must_use]
    pub fn summary(&self) -> String {
        match (&self.error, self.code) {
            (Some(e), _) => format!("✖ {}: {e}", self.label),
            (None, Some(0)) => format!("✔ {} (exit 0)", self.label),
            (None, Some(code)) => format!("✖ {} (exit {code})", self.label),
            (None, None) => format!("⛔ {} (terminated)", self.label),
        }
    }
}
