//! Multi-field form with required-field validation and path autocompletion.
//!
//! The form never talks to the navigation stack itself: key handling yields a [`FormUpdate`]
//! whose `outcome` tells the owning screen that the user submitted or cancelled, and whose
//! `task` lists directory entries for path fields in the background.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use tracing::debug;

use crate::components::input::{INPUT_HEIGHT, Input};
use crate::components::paths::{list_path_suggestions, window};
use crate::loader::Loader;
use crate::msg::{LoadTag, Loaded, Msg, Payload};
use crate::task::Task;
use crate::theme::ThemeTokens;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub required: bool,
    pub path: bool,
}

impl FieldSpec {
    #[must_use]
    pub const fn text(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            placeholder: "",
            required: false,
            path: false,
        }
    }

    #[must_use]
    pub const fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = placeholder;
        self
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn path(mut self) -> Self {
        self.path = true;
        self
    }
}

#[derive(Debug)]
struct Field {
    spec: FieldSpec,
    input: Input,
    suggestions: Vec<String>,
    selected: usize,
}

impl Field {
    fn new(spec: FieldSpec) -> Self {
        let mut input = Input::new(spec.label);
        input.placeholder = spec.placeholder.to_string();
        input.required = spec.required;
        Self {
            spec,
            input,
            suggestions: Vec::new(),
            selected: 0,
        }
    }

    fn pending(&self) -> bool {
        self.spec.path && !self.suggestions.is_empty()
    }
}

/// What the owning screen should do after a form message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMsg {
    /// `(key, value)` for every field, in declaration order.
    Submit(Vec<(String, String)>),
    Cancel,
}

#[derive(Debug, Default)]
pub struct FormUpdate {
    pub outcome: Option<FormMsg>,
    pub task: Option<Task>,
}

impl FormUpdate {
    fn outcome(msg: FormMsg) -> Self {
        Self {
            outcome: Some(msg),
            task: None,
        }
    }

    fn task(task: Option<Task>) -> Self {
        Self {
            outcome: None,
            task,
        }
    }
}

#[derive(Debug)]
pub struct Form {
    fields: Vec<Field>,
    focus: usize,
    suggest: Loader<Vec<String>>,
    home: Option<PathBuf>,
    visible: usize,
    error: Option<String>,
}

impl Form {
    #[must_use]
    pub fn new(specs: Vec<FieldSpec>) -> Self {
        let mut form = Self {
            fields: specs.into_iter().map(Field::new).collect(),
            focus: 0,
            suggest: Loader::new(),
            home: dirs::home_dir(),
            visible: crate::config::DEFAULT_SUGGESTIONS_VISIBLE,
            error: None,
        };
        form.sync_focus();
        form
    }

    /// Directory `~` expands to. `None` makes `~` suggestions fail.
    #[must_use]
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    #[must_use]
    pub fn with_visible_suggestions(mut self, visible: usize) -> Self {
        self.visible = visible.max(1);
        self
    }

    #[must_use]
    pub fn focus(&self) -> usize {
        self.focus
    }

    #[must_use]
    pub fn value(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(|f| f.input.value.as_str())
    }

    #[must_use]
    pub fn suggestions(&self, idx: usize) -> &[String] {
        self.fields.get(idx).map_or(&[], |f| f.suggestions.as_slice())
    }

    #[must_use]
    pub fn selected_suggestion(&self) -> Option<&str> {
        let f = self.fields.get(self.focus)?;
        f.suggestions.get(f.selected).map(String::as_str)
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn values(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|f| (f.spec.key.to_string(), f.input.value.trim().to_string()))
            .collect()
    }

    pub fn update(&mut self, msg: Msg) -> FormUpdate {
        match msg {
            Msg::Key(key) => self.on_key(key),
            Msg::Loaded(loaded) => {
                self.on_loaded(loaded);
                FormUpdate::default()
            }
            _ => FormUpdate::default(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> FormUpdate {
        if self.fields.is_empty() {
            return match key.code {
                KeyCode::Esc => FormUpdate::outcome(FormMsg::Cancel),
                KeyCode::Enter => FormUpdate::outcome(FormMsg::Submit(Vec::new())),
                _ => FormUpdate::default(),
            };
        }
        let pending = self.fields[self.focus].pending();
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => FormUpdate::outcome(FormMsg::Cancel),
            (KeyCode::Tab, _) if pending => FormUpdate::task(self.accept_suggestion()),
            (KeyCode::Tab, _) => {
                self.move_focus(1);
                FormUpdate::default()
            }
            (KeyCode::BackTab, _) => {
                self.move_focus(-1);
                FormUpdate::default()
            }
            (KeyCode::Up, _) if pending => {
                let f = &mut self.fields[self.focus];
                f.selected = f.selected.checked_sub(1).unwrap_or(f.suggestions.len() - 1);
                FormUpdate::default()
            }
            (KeyCode::Down, _) if pending => {
                let f = &mut self.fields[self.focus];
                f.selected = (f.selected + 1) % f.suggestions.len();
                FormUpdate::default()
            }
            (KeyCode::Up, _) => {
                self.move_focus(-1);
                FormUpdate::default()
            }
            (KeyCode::Down, _) => {
                self.move_focus(1);
                FormUpdate::default()
            }
            (KeyCode::Enter, _) if pending && self.focus + 1 < self.fields.len() => {
                FormUpdate::task(self.accept_suggestion())
            }
            (KeyCode::Enter, _) => self.submit(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.fields[self.focus].input.clear();
                FormUpdate::task(self.value_changed())
            }
            (KeyCode::Char(c), m) if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                self.fields[self.focus].input.push(c);
                FormUpdate::task(self.value_changed())
            }
            (KeyCode::Backspace, _) => {
                if self.fields[self.focus].input.backspace() {
                    FormUpdate::task(self.value_changed())
                } else {
                    FormUpdate::default()
                }
            }
            _ => FormUpdate::default(),
        }
    }

    /// Validate required fields in order; the first blank one takes focus instead of submitting.
    fn submit(&mut self) -> FormUpdate {
        if let Some(idx) = self.fields.iter().position(|f| f.spec.required && f.input.is_blank()) {
            debug!(field = self.fields[idx].spec.key, "required field missing");
            self.error = Some(format!("{} is required", self.fields[idx].spec.label));
            if idx != self.focus {
                self.set_focus(idx);
            }
            return FormUpdate::default();
        }
        self.error = None;
        self.suggest.cancel();
        FormUpdate::outcome(FormMsg::Submit(self.values()))
    }

    fn accept_suggestion(&mut self) -> Option<Task> {
        let f = &mut self.fields[self.focus];
        let choice = f.suggestions.get(f.selected).cloned()?;
        f.input.set(choice);
        self.value_changed()
    }

    fn move_focus(&mut self, delta: isize) {
        let n = self.fields.len();
        let next = (self.focus as isize + delta).rem_euclid(n as isize) as usize;
        self.set_focus(next);
    }

    fn set_focus(&mut self, idx: usize) {
        self.clear_suggestions();
        self.focus = idx;
        self.sync_focus();
    }

    fn sync_focus(&mut self) {
        for (i, f) in self.fields.iter_mut().enumerate() {
            f.input.focused = i == self.focus;
        }
    }

    fn clear_suggestions(&mut self) {
        self.suggest.cancel();
        if let Some(f) = self.fields.get_mut(self.focus) {
            f.suggestions.clear();
            f.selected = 0;
        }
    }

    /// Drop stale suggestions and, for path fields, list entries for the new value.
    fn value_changed(&mut self) -> Option<Task> {
        self.error = None;
        self.clear_suggestions();
        let field = self.focus;
        let f = &self.fields[field];
        if !f.spec.path || f.input.value.is_empty() {
            return None;
        }
        let input = f.input.value.clone();
        let home = self.home.clone();
        let ticket = self.suggest.begin();
        Some(ticket.task(
            "path-suggestions",
            LoadTag::Suggestions { field },
            async move {
                let listed = tokio::task::spawn_blocking(move || {
                    list_path_suggestions(&input, home.as_deref())
                })
                .await
                .map_err(|e| e.to_string())?;
                listed
                    .map(Payload::Suggestions)
                    .map_err(|e| format!("{e:#}"))
            },
        ))
    }

    fn on_loaded(&mut self, loaded: Loaded) {
        let LoadTag::Suggestions { field } = loaded.tag else {
            return;
        };
        if field != self.focus {
            return;
        }
        let result = match loaded.payload {
            Ok(Payload::Suggestions(list)) => Ok(list),
            Ok(_) => return,
            Err(e) => Err(e),
        };
        if !self.suggest.accept(loaded.generation, result) {
            return;
        }
        if let Some(err) = self.suggest.error() {
            self.error = Some(err.to_string());
            return;
        }
        let list = self.suggest.content().cloned().unwrap_or_default();
        let f = &mut self.fields[field];
        // A lone exact match is already what the user typed.
        f.suggestions = if list.len() == 1 && list[0] == f.input.value {
            Vec::new()
        } else {
            list
        };
        f.selected = 0;
    }

    pub fn render(&self, f: &mut Frame, area: Rect, theme: &ThemeTokens) {
        let mut y = area.y;
        let bottom = area.y + area.height;
        for (i, field) in self.fields.iter().enumerate() {
            if y + INPUT_HEIGHT > bottom {
                break;
            }
            field.input.render(
                f,
                Rect {
                    x: area.x,
                    y,
                    width: area.width,
                    height: INPUT_HEIGHT,
                },
                theme,
            );
            y += INPUT_HEIGHT;
            if i == self.focus && field.pending() {
                let lines = self.suggestion_lines(field, theme);
                let h = u16::try_from(lines.len()).unwrap_or(u16::MAX).min(bottom - y);
                f.render_widget(
                    Paragraph::new(lines),
                    Rect {
                        x: area.x + 2,
                        y,
                        width: area.width.saturating_sub(2),
                        height: h,
                    },
                );
                y += h;
            }
        }
        if let Some(err) = &self.error {
            if y < bottom {
                f.render_widget(
                    Paragraph::new(Line::from(Span::styled(format!("✖ {err}"), theme.error()))),
                    Rect {
                        x: area.x,
                        y,
                        width: area.width,
                        height: 1,
                    },
                );
            }
        }
    }

    fn suggestion_lines(&self, field: &Field, theme: &ThemeTokens) -> Vec<Line<'static>> {
        let w = window(&field.suggestions, field.selected, self.visible);
        let mut lines = Vec::new();
        if w.more_above {
            lines.push(Line::from(Span::styled("…", theme.muted())));
        }
        for (idx, s) in &w.items {
            let line = if *idx == field.selected {
                Line::from(Span::styled(
                    format!("› {s}"),
                    theme.selected().add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(Span::styled(
                    format!("  {s}"),
                    Style::default().fg(theme.text_primary),
                ))
            };
            lines.push(line);
        }
        if w.more_below || w.counter.is_some() {
            let mut spans = Vec::new();
            if w.more_below {
                spans.push(Span::styled("… ", theme.muted()));
            }
            if let Some(c) = w.counter {
                spans.push(Span::styled(c, theme.muted()));
            }
            lines.push(Line::from(spans));
        }
        lines
    }
}
