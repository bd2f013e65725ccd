use std::sync::Arc;
use std::time::Instant;

use ansi_to_tui::IntoText;
use crossterm::event::KeyCode;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Tabs};
use tracing::{debug, info};

use crate::components::chart::{self, CHART_HEIGHT, ChartEntry};
use crate::components::viewport::{CHROME_ROWS, Viewport};
use crate::config::AppContext;
use crate::frame::{self, BOX_COLS, split_footer};
use crate::loader::{LoadState, Loader};
use crate::msg::{LoadTag, Loaded, Msg, Payload};
use crate::task::Task;
use crate::theme::ThemeTokens;
use crate::view::{Update, View};

/// `(tab title, window argument)` in display order.
pub const TABS: [(&str, &str); 5] = [
    ("Daily", "daily"),
    ("Weekly", "weekly"),
    ("Monthly", "monthly"),
    ("Session", "session"),
    ("Blocks", "blocks"),
];

/// Tab bar plus the blank line under it.
const TAB_ROWS: u16 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct CostData {
    pub chart: Vec<ChartEntry>,
    pub table: String,
}

/// Usage and cost over five time windows. Each tab switch starts a fresh load and makes any
/// result still in flight for another tab stale.
pub struct CostView {
    ctx: Arc<AppContext>,
    tab: usize,
    loader: Loader<CostData>,
    viewport: Viewport,
    size: (u16, u16),
    started: Instant,
}

impl CostView {
    #[must_use]
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self {
            ctx,
            tab: 0,
            loader: Loader::new(),
            viewport: Viewport::with_chrome(CHROME_ROWS + TAB_ROWS, BOX_COLS + 1),
            size: (0, 0),
            started: Instant::now(),
        }
    }

    #[must_use]
    pub fn active_tab(&self) -> usize {
        self.tab
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.loader.generation()
    }

    #[must_use]
    pub fn state(&self) -> &LoadState<CostData> {
        self.loader.state()
    }

    fn load(&mut self) -> Task {
        self.started = Instant::now();
        self.viewport.set_content(Text::default(), String::new());
        let ticket = self.loader.begin();
        let tab = self.tab;
        let window = TABS[tab].1;
        let backend = Arc::clone(&self.ctx.backend);
        info!(tab = window, generation = ticket.generation, "loading cost tab");
        ticket.task("cost-tab", LoadTag::Tab(tab), async move {
            // One subprocess at a time: chart data first, then the table.
            let json = backend
                .capture(vec!["cost".into(), window.into(), "--json".into()])
                .await
                .map_err(|e| format!("{e:#}"))?;
            let chart: Vec<ChartEntry> = serde_json::from_str(json.trim())
                .map_err(|e| format!("invalid cost data for {window}: {e}"))?;
            let table = backend
                .capture(vec!["cost".into(), window.into()])
                .await
                .map_err(|e| format!("{e:#}"))?;
            Ok(Payload::Cost { chart, table })
        })
    }

    fn select(&mut self, tab: usize) -> Update {
        if tab == self.tab && self.loader.error().is_none() {
            return Update::none();
        }
        self.tab = tab;
        Update::task(self.load())
    }

    fn on_loaded(&mut self, loaded: Loaded) {
        let LoadTag::Tab(tab) = loaded.tag else {
            return;
        };
        if tab != self.tab {
            debug!(tab, active = self.tab, "discarding result for inactive tab");
            return;
        }
        let result = match loaded.payload {
            Ok(Payload::Cost { chart, table }) => Ok(CostData { chart, table }),
            Ok(other) => Err(format!("unexpected payload {other:?}")),
            Err(e) => Err(e),
        };
        if !self.loader.accept(loaded.generation, result) {
            return;
        }
        if let Some(data) = self.loader.content() {
            let text = data
                .table
                .into_text()
                .unwrap_or_else(|_| Text::from(data.table.clone()));
            let raw = data.table.clone();
            self.viewport.set_content(text, raw);
        } else {
            self.viewport.set_content(Text::default(), String::new());
        }
        self.resize_viewport();
    }

    /// The chart takes rows from the table only when it has something to show.
    fn chart_rows(&self) -> u16 {
        let has_chart = self.loader.content().is_some_and(|d| {
            !chart::render(&d.chart, usize::from(self.size.0.saturating_sub(BOX_COLS))).is_empty()
        });
        if has_chart {
            u16::try_from(CHART_HEIGHT).unwrap_or(u16::MAX) + 1
        } else {
            0
        }
    }

    fn resize_viewport(&mut self) {
        self.viewport
            .set_chrome_rows(CHROME_ROWS + TAB_ROWS + self.chart_rows());
        let (w, h) = self.size;
        self.viewport.set_size(w, h);
    }

    fn tabs(&self, theme: &ThemeTokens) -> Tabs<'static> {
        let titles: Vec<Line> = TABS
            .iter()
            .enumerate()
            .map(|(i, (name, _))| Line::from(format!("{} {name}", i + 1)))
            .collect();
        Tabs::new(titles)
            .select(self.tab)
            .style(Style::default().fg(theme.tab_inactive))
            .highlight_style(
                Style::default()
                    .fg(theme.tab_active)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            )
            .divider("│")
    }
}

impl View for CostView {
    fn title(&self) -> String {
        "Cost".to_string()
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
            Msg::Resize { width, height } => {
                self.size = (width, height);
                self.resize_viewport();
                Update::none()
            }
            Msg::Key(key) => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => Update::pop(),
                KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => {
                    self.select((self.tab + 1) % TABS.len())
                }
                KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => {
                    self.select((self.tab + TABS.len() - 1) % TABS.len())
                }
                KeyCode::Char(c @ '1'..='5') => {
                    let idx = c as usize - '1' as usize;
                    self.select(idx)
                }
                KeyCode::Char('r') => Update::task(self.load()),
                _ => self.viewport.update(Msg::Key(key), self.ctx.copy_flash),
            },
            other => self.viewport.update(other, self.ctx.copy_flash),
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, theme: &ThemeTokens) {
        let title = Line::from(vec![
            Span::raw("Cost "),
            Span::styled(TABS[self.tab].0, Style::default().fg(theme.tab_active)),
        ]);
        let inner = frame::render_border_block(title, area, f, theme);
        let (body, footer) = split_footer(inner);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(TAB_ROWS), Constraint::Min(0)])
            .split(body);
        f.render_widget(self.tabs(theme), chunks[0]);
        let content = chunks[1];

        match self.loader.state() {
            LoadState::Idle | LoadState::Loading => {
                let msg = format!(
                    "{} Loading {} usage…",
                    frame::spinner(self.started),
                    TABS[self.tab].0.to_lowercase()
                );
                f.render_widget(Paragraph::new(Span::styled(msg, theme.muted())), content);
            }
            LoadState::Failed(err) => {
                let lines = vec![
                    Line::from(Span::styled(format!("✖ {err}"), theme.error())),
                    Line::raw(""),
                    Line::from(Span::styled(
                        "press esc/q to go back, r to retry, tab for another window",
                        theme.muted(),
                    )),
                ];
                f.render_widget(Paragraph::new(lines), content);
            }
            LoadState::Ready(data) => {
                let chart_text = chart::render_text(&data.chart, usize::from(content.width), theme);
                let chart_h = u16::try_from(chart_text.lines.len()).unwrap_or(0);
                let table_area = if chart_h == 0 {
                    content
                } else {
                    let parts = Layout::default()
                        .direction(Direction::Vertical)
                        .constraints([Constraint::Length(chart_h + 1), Constraint::Min(0)])
                        .split(content);
                    f.render_widget(Paragraph::new(chart_text), parts[0]);
                    parts[1]
                };
                self.viewport.render(f, table_area, theme);
            }
        }
        let hint = "tab/h/l switch · 1-5 jump · r reload";
        f.render_widget(Paragraph::new(self.viewport.footer(theme, hint)), footer);
    }
}
