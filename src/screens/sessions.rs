use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use serde::Deserialize;

use crate::config::AppContext;
use crate::frame::{self, split_footer};
use crate::loader::{LoadState, Loader};
use crate::msg::{LoadTag, Loaded, Msg, Payload};
use crate::screens::viewer::Viewer;
use crate::task::Task;
use crate::theme::ThemeTokens;
use crate::view::{Update, View};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    #[serde(default)]
    pub project: String,
    /// RFC 3339 start time.
    #[serde(default)]
    pub started: String,
    #[serde(default)]
    pub messages: u64,
    #[serde(default)]
    pub summary: String,
}

impl SessionSummary {
    fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        [&self.project, &self.summary, &self.id]
            .iter()
            .any(|s| s.to_lowercase().contains(&needle))
    }
}

/// `"just now"`, `"5m ago"`, `"3h ago"`, `"2d ago"`, or the date for anything older than a
/// month. Unparseable input is returned unchanged.
#[must_use]
pub fn relative_age(started: &str, now: DateTime<Utc>) -> String {
    let Ok(at) = DateTime::parse_from_rfc3339(started) else {
        return started.to_string();
    };
    let at = at.with_timezone(&Utc);
    let secs = (now - at).num_seconds();
    match secs {
        s if s < 60 => "just now".to_string(),
        s if s < 3_600 => format!("{}m ago", s / 60),
        s if s < 86_400 => format!("{}h ago", s / 3_600),
        s if s < 30 * 86_400 => format!("{}d ago", s / 86_400),
        _ => at.format("%Y-%m-%d").to_string(),
    }
}

pub struct SessionsView {
    ctx: Arc<AppContext>,
    loader: Loader<Vec<SessionSummary>>,
    selected: usize,
    filter: String,
    filtering: bool,
    started: Instant,
}

impl SessionsView {
    #[must_use]
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            loader: Loader::new(),
            selected: 0,
            filter: String::new(),
            filtering: false,
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn visible(&self) -> Vec<&SessionSummary> {
        self.loader
            .content()
            .map(|all| all.iter().filter(|s| s.matches(&self.filter)).collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn state(&self) -> &LoadState<Vec<SessionSummary>> {
        self.loader.state()
    }

    fn load(&mut self) -> Task {
        self.started = Instant::now();
        let ticket = self.loader.begin();
        let backend = Arc::clone(&self.ctx.backend);
        ticket.task("sessions", LoadTag::Sessions, async move {
            let json = backend
                .capture(vec!["sessions".into(), "--json".into()])
                .await
                .map_err(|e| format!("{e:#}"))?;
            serde_json::from_str::<Vec<SessionSummary>>(json.trim())
                .map(Payload::Sessions)
                .map_err(|e| format!("invalid session list: {e}"))
        })
    }

    fn on_loaded(&mut self, loaded: Loaded) {
        if loaded.tag != LoadTag::Sessions {
            return;
        }
        let result = match loaded.payload {
            Ok(Payload::Sessions(list)) => Ok(list),
            Ok(other) => Err(format!("unexpected payload {other:?}")),
            Err(e) => Err(e),
        };
        if self.loader.accept(loaded.generation, result) {
            self.clamp();
        }
    }

    fn clamp(&mut self) {
        let n = self.visible().len();
        self.selected = self.selected.min(n.saturating_sub(1));
    }

    fn open_selected(&self) -> Update {
        let Some(s) = self.visible().get(self.selected).copied() else {
            return Update::none();
        };
        let short: String = s.id.chars().take(8).collect();
        let title = if s.project.is_empty() {
            format!("Session {short}")
        } else {
            format!("Session {short} · {}", s.project)
        };
        Update::push(Viewer::new(
            Arc::clone(&self.ctx),
            title,
            vec!["sessions".into(), "show".into(), s.id.clone()],
        ))
    }

    fn on_filter_key(&mut self, key: KeyEvent) -> Update {
        match key.code {
            KeyCode::Esc => {
                self.filter.clear();
                self.filtering = false;
            }
            KeyCode::Enter => self.filtering = false,
            KeyCode::Backspace => {
                self.filter.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.filter.push(c);
            }
            _ => {}
        }
        self.clamp();
        Update::none()
    }

    fn on_key(&mut self, key: KeyEvent) -> Update {
        if self.filtering {
            return self.on_filter_key(key);
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Update::pop(),
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
                Update::none()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected += 1;
                self.clamp();
                Update::none()
            }
            KeyCode::Char('/') => {
                self.filtering = true;
                Update::none()
            }
            KeyCode::Char('r') => Update::task(self.load()),
            KeyCode::Enter => self.open_selected(),
            _ => Update::none(),
        }
    }

    fn item(s: &SessionSummary, now: DateTime<Utc>, theme: &ThemeTokens, selected: bool) -> ListItem<'static> {
        let bar = if selected {
            Span::styled("│ ", Style::default().fg(theme.selection_fg))
        } else {
            Span::styled("│ ", Style::default().fg(theme.border).add_modifier(Modifier::DIM))
        };
        let project = if s.project.is_empty() { "(no project)" } else { s.project.as_str() };
        let head = Line::from(vec![
            bar.clone(),
            Span::styled(project.to_string(), Style::default().fg(theme.title)),
            Span::styled(
                format!("  {} · {} msgs", relative_age(&s.started, now), s.messages),
                theme.muted(),
            ),
        ]);
        let summary = if s.summary.is_empty() { s.id.clone() } else { s.summary.clone() };
        let body = Line::from(vec![bar, Span::styled(summary, theme.muted().add_modifier(Modifier::DIM))]);
        ListItem::new(Text::from(vec![head, body, Line::raw("")]))
    }
}

impl View for SessionsView {
    fn title(&self) -> String {
        "Sessions".to_string()
    }

    fn init(&mut self) -> Option<Task> {
        Some(self.load())
    }

    fn fullscreen(&self) -> bool {
        false
    }

    fn update(&mut self, msg: Msg) -> Update {
        match msg {
            Msg::Loaded(loaded) => {
                self.on_loaded(loaded);
                Update::none()
            }
            Msg::Key(key) => self.on_key(key),
            _ => Update::none(),
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, theme: &ThemeTokens) {
        let inner = frame::render_border_block("Sessions", area, f, theme);
        let (body, footer) = split_footer(inner);
        match self.loader.state() {
            LoadState::Idle | LoadState::Loading => {
                let msg = format!("{} Scanning sessions…", frame::spinner(self.started));
                f.render_widget(Paragraph::new(Span::styled(msg, theme.muted())), body);
            }
            LoadState::Failed(err) => {
                let lines = vec![
                    Line::from(Span::styled(format!("✖ {err}"), theme.error())),
                    Line::raw(""),
                    Line::from(Span::styled("press esc/q to go back, r to retry", theme.muted())),
                ];
                f.render_widget(Paragraph::new(lines), body);
            }
            LoadState::Ready(_) => {
                let now = Utc::now();
                let visible = self.visible();
                if visible.is_empty() {
                    let msg = if self.filter.is_empty() {
                        "No sessions recorded yet.".to_string()
                    } else {
                        format!("No sessions match '{}'.", self.filter)
                    };
                    f.render_widget(Paragraph::new(Span::styled(msg, theme.muted())), body);
                } else {
                    let items: Vec<ListItem> = visible
                        .iter()
                        .enumerate()
                        .map(|(i, s)| Self::item(s, now, theme, i == self.selected))
                        .collect();
                    let list = List::new(items).highlight_style(Style::default().bg(theme.selection_bg));
                    let mut state = ListState::default().with_selected(Some(self.selected));
                    f.render_stateful_widget(list, body, &mut state);
                }
            }
        }
        let footer_line = if self.filtering {
            Line::from(vec![
                Span::styled("/", Style::default().fg(theme.border_focus)),
                Span::styled(self.filter.clone(), Style::default().fg(theme.text_primary)),
                Span::styled("▏  enter keep · esc clear", theme.muted()),
            ])
        } else {
            Line::from(Span::styled(
                "j/k move · enter open · / filter · r reload · esc back",
                theme.muted(),
            ))
        };
        f.render_widget(Paragraph::new(footer_line), footer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ages_are_relative() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(relative_age("2026-03-10T11:59:30Z", now), "just now");
        assert_eq!(relative_age("2026-03-10T11:15:00Z", now), "45m ago");
        assert_eq!(relative_age("2026-03-10T09:00:00+00:00", now), "3h ago");
        assert_eq!(relative_age("2026-03-08T12:00:00Z", now), "2d ago");
        assert_eq!(relative_age("2025-12-01T00:00:00Z", now), "2025-12-01");
        assert_eq!(relative_age("yesterday", now), "yesterday");
    }

    #[test]
    fn filter_matches_project_summary_and_id() {
        let s = SessionSummary {
            id: "abc123".into(),
            project: "devdeck".into(),
            started: String::new(),
            messages: 3,
            summary: "Fix the chart axis".into(),
        };
        assert!(s.matches("DECK"));
        assert!(s.matches("axis"));
        assert!(s.matches("abc"));
        assert!(!s.matches("zzz"));
    }
}
