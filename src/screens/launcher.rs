use std::collections::HashMap;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{List, ListItem, ListState};

use crate::catalog::{Action, CATALOG, CatalogEntry};
use crate::config::AppContext;
use crate::frame::padded_block;
use crate::msg::{CommandOutcome, Msg};
use crate::screens::cost::CostView;
use crate::screens::form::FormScreen;
use crate::screens::help::HelpView;
use crate::screens::sessions::SessionsView;
use crate::screens::viewer::Viewer;
use crate::theme::ThemeTokens;
use crate::view::{Effect, Update, View};

/// Root view: the command catalogue.
pub struct Launcher {
    ctx: Arc<AppContext>,
    entries: &'static [CatalogEntry],
    selected: usize,
    outcomes: HashMap<String, CommandOutcome>,
}

impl Launcher {
    #[must_use]
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            entries: CATALOG,
            selected: 0,
            outcomes: HashMap::new(),
        }
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn outcome(&self, title: &str) -> Option<&CommandOutcome> {
        self.outcomes.get(title)
    }

    fn open(&self, entry: &CatalogEntry) -> Update {
        let ctx = Arc::clone(&self.ctx);
        let owned = |args: &[&str]| args.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();
        match entry.action {
            Action::RunAndExit(args) => Update::effect(Effect::RunAndExit(
                self.ctx.backend.command(entry.title, owned(args)),
            )),
            Action::View { args, markdown } => {
                let viewer = Viewer::new(ctx, entry.title, owned(args));
                if markdown {
                    Update::push(viewer.markdown())
                } else {
                    Update::push(viewer)
                }
            }
            Action::Cost => Update::push(CostView::new(ctx)),
            Action::Sessions => Update::push(SessionsView::new(ctx)),
            Action::Form(kind) => Update::push(FormScreen::new(ctx, kind)),
            Action::Help => Update::push(HelpView::new()),
            Action::Quit => Update::quit(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Update {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => Update::pop(),
            (KeyCode::Up | KeyCode::Char('k'), _) => {
                self.selected = self.selected.saturating_sub(1);
                Update::none()
            }
            (KeyCode::Down | KeyCode::Char('j'), _) => {
                if self.selected + 1 < self.entries.len() {
                    self.selected += 1;
                }
                Update::none()
            }
            (KeyCode::Home, _) => {
                self.selected = 0;
                Update::none()
            }
            (KeyCode::End, _) => {
                self.selected = self.entries.len().saturating_sub(1);
                Update::none()
            }
            (KeyCode::Enter, _) => match self.entries.get(self.selected) {
                Some(entry) => self.open(entry),
                None => Update::none(),
            },
            (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
                let entries = self.entries;
                match entries.iter().position(|e| e.key == c) {
                    Some(idx) => {
                        self.selected = idx;
                        self.open(&entries[idx])
                    }
                    None => Update::none(),
                }
            }
            _ => Update::none(),
        }
    }

    fn item(&self, entry: &CatalogEntry, selected: bool, theme: &ThemeTokens) -> ListItem<'static> {
        let bar_style = if selected {
            Style::default().fg(theme.selection_fg)
        } else {
            Style::default().fg(theme.border).add_modifier(Modifier::DIM)
        };
        let bar = Span::styled("│ ", bar_style);
        let mut head = vec![
            bar.clone(),
            Span::styled(format!("[{}] ", entry.key), theme.muted()),
            Span::styled(entry.title, Style::default().fg(theme.title)),
        ];
        if let Some(o) = self.outcomes.get(entry.title) {
            let (glyph, color) = if o.success() {
                ("  ✔", theme.accent_success)
            } else {
                ("  ✖", theme.accent_danger)
            };
            head.push(Span::styled(glyph, Style::default().fg(color)));
        }
        let desc = Line::from(vec![
            bar,
            Span::styled(entry.description, theme.muted().add_modifier(Modifier::DIM)),
        ]);
        ListItem::new(Text::from(vec![Line::from(head), desc, Line::raw("")]))
    }
}

impl View for Launcher {
    fn title(&self) -> String {
        "devdeck".to_string()
    }

    fn fullscreen(&self) -> bool {
        false
    }

    fn update(&mut self, msg: Msg) -> Update {
        match msg {
            Msg::Key(key) => self.on_key(key),
            Msg::CommandFinished(outcome) => {
                self.outcomes.insert(outcome.label.clone(), outcome);
                Update::none()
            }
            _ => Update::none(),
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, theme: &ThemeTokens) {
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| self.item(e, i == self.selected, theme))
            .collect();
        let list = List::new(items)
            .block(padded_block("devdeck · enter open · ? help · q quit", theme))
            .highlight_style(Style::default().bg(theme.selection_bg));
        let mut state = ListState::default().with_selected(Some(self.selected));
        f.render_stateful_widget(list, area, &mut state);
    }
}
