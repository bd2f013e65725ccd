use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::theme::ThemeTokens;

pub const PAD_X: u16 = 2; // left/right padding inside boxes
pub const PAD_Y: u16 = 1; // top/bottom padding inside boxes

/// Columns and rows a padded, bordered box takes from its area.
pub const BOX_COLS: u16 = 2 + PAD_X * 2;
pub const BOX_ROWS: u16 = 2 + PAD_Y * 2;

pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner frame for something that started at `since`, advancing every 100ms.
#[must_use]
pub fn spinner(since: Instant) -> &'static str {
    let idx = (since.elapsed().as_millis() / 100) as usize % SPINNER_FRAMES.len();
    SPINNER_FRAMES[idx]
}

#[must_use]
pub fn padded_block<'a>(title: impl Into<Line<'a>>, theme: &ThemeTokens) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(false))
        .title(title)
        .title_style(Style::default().fg(theme.title))
        .padding(Padding::new(PAD_X, PAD_X, PAD_Y, PAD_Y))
}

/// Draw a padded, bordered box and return the area inside it.
pub fn render_border_block<'a>(
    title: impl Into<Line<'a>>,
    area: Rect,
    f: &mut Frame,
    theme: &ThemeTokens,
) -> Rect {
    let block = padded_block(title, theme);
    let inner = block.inner(area);
    f.render_widget(block, area);
    inner
}

/// Split an inner area into a body and a one-line footer.
#[must_use]
pub fn split_footer(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

#[must_use]
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

pub fn render_modal<'a>(
    title: impl Into<Line<'a>>,
    body: Text<'a>,
    area: Rect,
    f: &mut Frame,
    theme: &ThemeTokens,
) {
    let modal = Paragraph::new(body).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
            .title(title)
            .title_style(Style::default().fg(theme.title).add_modifier(Modifier::BOLD))
            .padding(Padding::new(PAD_X, PAD_X, PAD_Y, PAD_Y)),
    );
    f.render_widget(Clear, area);
    f.render_widget(modal, area);
}

pub fn render_status_bar(spans: Line, area: Rect, f: &mut Frame, theme: &ThemeTokens) {
    let status_para =
        Paragraph::new(spans).style(Style::default().fg(theme.status_fg).bg(theme.status_bg));
    f.render_widget(Clear, area);
    f.render_widget(status_para, area);
}
