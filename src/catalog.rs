use std::collections::HashSet;
use std::fmt::Write as _;

/// Which form screen an entry opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    AddServer,
    Attach,
    Sandbox,
    Upgrade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the UI and give the terminal to the subcommand for good.
    RunAndExit(&'static [&'static str]),
    /// Capture the subcommand's output into a scrollable viewer.
    View {
        args: &'static [&'static str],
        markdown: bool,
    },
    Cost,
    Sessions,
    Form(FormKind),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub key: char,
    pub title: &'static str,
    pub description: &'static str,
    pub action: Action,
}

impl CatalogEntry {
    /// The subcommand line the entry runs, if it runs one directly.
    #[must_use]
    pub fn command_line(&self) -> Option<String> {
        match self.action {
            Action::RunAndExit(args) | Action::View { args, .. } => Some(args.join(" ")),
            Action::Cost => Some("cost <window>".to_string()),
            Action::Sessions => Some("sessions".to_string()),
            Action::Form(kind) => Some(kind.command_stem().to_string()),
            Action::Help | Action::Quit => None,
        }
    }
}

impl FormKind {
    #[must_use]
    pub fn command_stem(self) -> &'static str {
        match self {
            Self::AddServer => "mcp add",
            Self::Attach => "attach",
            Self::Sandbox => "sandbox create",
            Self::Upgrade => "upgrade",
        }
    }
}

pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        key: 's',
        title: "Setup",
        description: "Run the interactive setup wizard",
        action: Action::RunAndExit(&["setup"]),
    },
    CatalogEntry {
        key: 'd',
        title: "Doctor",
        description: "Check installation and environment health",
        action: Action::View {
            args: &["doctor"],
            markdown: false,
        },
    },
    CatalogEntry {
        key: 'c',
        title: "Cost",
        description: "Usage and cost by day, week, month, session or block",
        action: Action::Cost,
    },
    CatalogEntry {
        key: 'l',
        title: "Sessions",
        description: "Browse recorded sessions and open transcripts",
        action: Action::Sessions,
    },
    CatalogEntry {
        key: 'm',
        title: "Memory",
        description: "Inspect the memory layers in effect for this directory",
        action: Action::View {
            args: &["memory", "show"],
            markdown: true,
        },
    },
    CatalogEntry {
        key: 'i',
        title: "Skills",
        description: "List installed skills",
        action: Action::View {
            args: &["skills", "list"],
            markdown: false,
        },
    },
    CatalogEntry {
        key: 'v',
        title: "MCP servers",
        description: "List configured MCP servers",
        action: Action::View {
            args: &["mcp", "list"],
            markdown: false,
        },
    },
    CatalogEntry {
        key: 'n',
        title: "Add MCP server",
        description: "Register a new MCP server",
        action: Action::Form(FormKind::AddServer),
    },
    CatalogEntry {
        key: 't',
        title: "Statusline",
        description: "Preview the configured status line",
        action: Action::View {
            args: &["statusline", "preview"],
            markdown: false,
        },
    },
    CatalogEntry {
        key: 'a',
        title: "Attach assets",
        description: "Copy templates and assets into a project",
        action: Action::Form(FormKind::Attach),
    },
    CatalogEntry {
        key: 'b',
        title: "Sandbox",
        description: "Create an isolated sandbox workspace",
        action: Action::Form(FormKind::Sandbox),
    },
    CatalogEntry {
        key: 'u',
        title: "Upgrade",
        description: "Update to the latest release",
        action: Action::Form(FormKind::Upgrade),
    },
    CatalogEntry {
        key: '?',
        title: "Help",
        description: "Key bindings",
        action: Action::Help,
    },
    CatalogEntry {
        key: 'q',
        title: "Quit",
        description: "Leave devdeck",
        action: Action::Quit,
    },
];

/// Problems with a catalogue: duplicate shortcut keys or titles.
#[must_use]
pub fn validate_catalog(entries: &[CatalogEntry]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut keys = HashSet::new();
    let mut titles = HashSet::new();
    for e in entries {
        if !keys.insert(e.key) {
            errors.push(format!("duplicate key '{}' ({})", e.key, e.title));
        }
        if !titles.insert(e.title) {
            errors.push(format!("duplicate title '{}'", e.title));
        }
    }
    errors
}

/// Text rendering of the launcher for non-interactive and accessible use.
#[must_use]
pub fn plain_catalogue(program: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{program}: available commands\n");
    let width = CATALOG.iter().map(|e| e.title.len()).max().unwrap_or(0);
    for e in CATALOG {
        let _ = write!(out, "  [{}] {:<width$}  {}", e.key, e.title, e.description);
        if let Some(cmd) = e.command_line() {
            let _ = write!(out, "  ({program} {cmd})");
        }
        out.push('\n');
    }
    out
}
