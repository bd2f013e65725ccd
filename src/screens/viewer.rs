use std::sync::Arc;
use std::time::Instant;

use ansi_to_tui::IntoText;
use crossterm::event::KeyCode;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use tracing::debug;

use crate::components::viewport::Viewport;
use crate::config::AppContext;
use crate::frame::{self, split_footer};
use crate::loader::{LoadState, Loader};
use crate::markdown::markdown_to_text;
use crate::msg::{LoadTag, Loaded, Msg, Payload};
use crate::task::Task;
use crate::theme::ThemeTokens;
use crate::view::{Update, View};

/// Read-only pane over one subcommand's captured output.
pub struct Viewer {
    ctx: Arc<AppContext>,
    title: String,
    args: Vec<String>,
    loader: Loader<String>,
    viewport: Viewport,
    markdown_capable: bool,
    markdown: bool,
    started: Instant,
    dirty: bool,
}

impl Viewer {
    pub fn new(ctx: Arc<AppContext>, title: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            ctx,
            title: title.into(),
            args,
            loader: Loader::new(),
            viewport: Viewport::new(),
            markdown_capable: false,
            markdown: false,
            started: Instant::now(),
            dirty: false,
        }
    }

    /// Render the output as markdown by default; `m` toggles back to raw text.
    #[must_use]
    pub fn markdown(mut self) -> Self {
        self.markdown_capable = true;
        self.markdown = true;
        self
    }

    #[must_use]
    pub fn state(&self) -> &LoadState<String> {
        self.loader.state()
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn load(&mut self) -> Task {
        self.started = Instant::now();
        let ticket = self.loader.begin();
        let backend = Arc::clone(&self.ctx.backend);
        let args = self.args.clone();
        ticket.task("capture", LoadTag::Content, async move {
            backend
                .capture(args)
                .await
                .map(Payload::Text)
                .map_err(|e| format!("{e:#}"))
        })
    }

    fn on_loaded(&mut self, loaded: Loaded) {
        if loaded.tag != LoadTag::Content {
            return;
        }
        let result = match loaded.payload {
            Ok(Payload::Text(s)) => Ok(s),
            Ok(other) => Err(format!("unexpected payload {other:?}")),
            Err(e) => Err(e),
        };
        if self.loader.accept(loaded.generation, result) {
            debug!(view = %self.title, ok = self.loader.error().is_none(), "viewer content loaded");
            self.viewport.top();
            self.dirty = true;
        }
    }

    fn refresh_text(&mut self, theme: &ThemeTokens) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        let Some(raw) = self.loader.content() else {
            self.viewport.set_content(Text::default(), String::new());
            return;
        };
        let text = if self.markdown {
            markdown_to_text(raw, theme)
        } else {
            raw.into_text().unwrap_or_else(|_| Text::from(raw.clone()))
        };
        let raw = raw.clone();
        self.viewport.set_content(text, raw);
    }

    fn title_line(&self, theme: &ThemeTokens) -> Line<'static> {
        let mut spans = vec![Span::raw(format!("{} ", self.title))];
        match self.loader.state() {
            LoadState::Loading | LoadState::Idle => spans.push(Span::styled(
                frame::spinner(self.started),
                Style::default().fg(theme.accent_warning),
            )),
            LoadState::Ready(_) => {
                spans.push(Span::styled("✔", Style::default().fg(theme.accent_success)));
            }
            LoadState::Failed(_) => {
                spans.push(Span::styled("✖", Style::default().fg(theme.accent_danger)));
            }
        }
        if self.markdown {
            spans.push(Span::styled(" [MD]", theme.muted()));
        }
        Line::from(spans)
    }
}

impl View for Viewer {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn init(&mut self) -> Option<Task> {
        Some(self.load())
    }

    fn update(&mut self, msg: Msg) -> Update {
        match msg {
            Msg::Loaded(loaded) => {
                self.on_loaded(loaded);
                Update::none()
            }
            Msg::Key(key) => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => Update::pop(),
                KeyCode::Char('r') => {
                    self.dirty = true;
                    Update::task(self.load())
                }
                KeyCode::Char('m') if self.markdown_capable => {
                    self.markdown = !self.markdown;
                    self.dirty = true;
                    Update::none()
                }
                _ => self.viewport.update(Msg::Key(key), self.ctx.copy_flash),
            },
            other => self.viewport.update(other, self.ctx.copy_flash),
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, theme: &ThemeTokens) {
        self.refresh_text(theme);
        let inner = frame::render_border_block(self.title_line(theme), area, f, theme);
        let (body, footer) = split_footer(inner);
        match self.loader.state() {
            LoadState::Loading | LoadState::Idle => {
                let msg = format!("{} Loading {}…", frame::spinner(self.started), self.title);
                f.render_widget(Paragraph::new(Span::styled(msg, theme.muted())), body);
                f.render_widget(
                    Paragraph::new(Span::styled("esc back", theme.muted())),
                    footer,
                );
            }
            LoadState::Failed(err) => {
                let mut lines = vec![Line::from(Span::styled("✖ Failed to load", theme.error()))];
                lines.extend(
                    err.lines()
                        .map(|l| Line::from(Span::styled(l.to_string(), theme.error()))),
                );
                lines.push(Line::raw(""));
                lines.push(Line::from(Span::styled(
                    "press esc/q to go back, r to retry",
                    theme.muted(),
                )));
                f.render_widget(Paragraph::new(lines), body);
            }
            LoadState::Ready(_) => {
                self.viewport.render(f, body, theme);
                let extra = if self.markdown_capable { "m markdown · r reload" } else { "r reload" };
                f.render_widget(Paragraph::new(self.viewport.footer(theme, extra)), footer);
            }
        }
    }
}
