//! Scrollable read-only text pane with a proportional scrollbar column.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;

use crate::frame::{BOX_COLS, BOX_ROWS};
use crate::loader::next_generation;
use crate::msg::Msg;
use crate::task::Task;
use crate::theme::ThemeTokens;
use crate::view::{Effect, Update};

pub const THUMB: &str = "┃";
pub const TRACK: &str = "│";

/// Rows a standard viewer spends outside the text: box border, padding and footer line.
pub const CHROME_ROWS: u16 = BOX_ROWS + 1;
/// Columns spent outside the text: box border, padding and the scrollbar column.
pub const CHROME_COLS: u16 = BOX_COLS + 1;

/// Thumb `(start, size)` for a track of `track` rows, or `None` when everything fits.
#[must_use]
pub fn thumb_geometry(track: usize, total: usize, visible: usize, fraction: f64) -> Option<(usize, usize)> {
    if total <= visible || track == 0 {
        return None;
    }
    let size = (track * visible / total).clamp(1, track);
    let room = track - size;
    let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let start = ((fraction * room as f64).round() as usize).min(room);
    Some((start, size))
}

/// One glyph per track row; empty when the content fits.
#[must_use]
pub fn scrollbar(track: usize, total: usize, visible: usize, fraction: f64) -> Vec<&'static str> {
    let Some((start, size)) = thumb_geometry(track, total, visible, fraction) else {
        return Vec::new();
    };
    (0..track)
        .map(|row| if row >= start && row < start + size { THUMB } else { TRACK })
        .collect()
}

#[derive(Debug)]
pub struct Viewport {
    text: Text<'static>,
    raw: String,
    offset: usize,
    width: u16,
    height: u16,
    chrome_rows: u16,
    chrome_cols: u16,
    flash: Option<u64>,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl Viewport {
    #[must_use]
    pub fn new() -> Self {
        Self::with_chrome(CHROME_ROWS, CHROME_COLS)
    }

    /// Viewport whose owner draws `rows`/`cols` of its own decoration around the text.
    #[must_use]
    pub fn with_chrome(rows: u16, cols: u16) -> Self {
        Self {
            text: Text::default(),
            raw: String::new(),
            offset: 0,
            width: 0,
            height: 0,
            chrome_rows: rows,
            chrome_cols: cols,
            flash: None,
        }
    }

    /// Replace the content; keeps the scroll position when it is still in range.
    pub fn set_content(&mut self, text: Text<'static>, raw: impl Into<String>) {
        self.text = text;
        self.raw = raw.into();
        self.clamp();
    }

    pub fn set_chrome_rows(&mut self, rows: u16) {
        self.chrome_rows = rows;
    }

    /// Re-derive the visible text area from the space the owning view was given.
    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width.saturating_sub(self.chrome_cols);
        self.height = height.saturating_sub(self.chrome_rows);
        self.clamp();
    }

    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.text.lines.len()
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn visible(&self) -> usize {
        usize::from(self.height)
    }

    fn max_offset(&self) -> usize {
        self.total_lines().saturating_sub(self.visible())
    }

    fn clamp(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn scroll_by(&mut self, delta: isize) {
        self.offset = self.offset.saturating_add_signed(delta).min(self.max_offset());
    }

    pub fn page_down(&mut self) {
        self.scroll_by(isize::try_from(self.visible().max(1)).unwrap_or(isize::MAX));
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-isize::try_from(self.visible().max(1)).unwrap_or(isize::MAX));
    }

    pub fn top(&mut self) {
        self.offset = 0;
    }

    pub fn bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// Position in `[0, 1]`; 0 when nothing scrolls.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scroll_fraction(&self) -> f64 {
        let max = self.max_offset();
        if max == 0 {
            0.0
        } else {
            self.offset as f64 / max as f64
        }
    }

    #[must_use]
    pub fn flashing(&self) -> bool {
        self.flash.is_some()
    }

    /// Handle scrolling, copy and flash expiry. Anything else is ignored.
    pub fn update(&mut self, msg: Msg, flash_for: Duration) -> Update {
        match msg {
            Msg::Resize { width, height } => {
                self.set_size(width, height);
                Update::none()
            }
            Msg::CopyFlashExpired { seq } => {
                if self.flash == Some(seq) {
                    self.flash = None;
                }
                Update::none()
            }
            Msg::Key(key) => match (key.code, key.modifiers) {
                (KeyCode::Down | KeyCode::Char('j'), _) => {
                    self.scroll_by(1);
                    Update::none()
                }
                (KeyCode::Up | KeyCode::Char('k'), _) => {
                    self.scroll_by(-1);
                    Update::none()
                }
                (KeyCode::PageDown | KeyCode::Char(' '), _)
                | (KeyCode::Char('f' | 'd'), KeyModifiers::CONTROL) => {
                    self.page_down();
                    Update::none()
                }
                (KeyCode::PageUp, _) | (KeyCode::Char('b' | 'u'), KeyModifiers::CONTROL) => {
                    self.page_up();
                    Update::none()
                }
                (KeyCode::Home | KeyCode::Char('g'), _) => {
                    self.top();
                    Update::none()
                }
                (KeyCode::End | KeyCode::Char('G'), _) => {
                    self.bottom();
                    Update::none()
                }
                (KeyCode::Char('c'), m) if !m.contains(KeyModifiers::CONTROL) => self.copy(flash_for),
                _ => Update::none(),
            },
            _ => Update::none(),
        }
    }

    fn copy(&mut self, flash_for: Duration) -> Update {
        if self.raw.is_empty() {
            return Update::none();
        }
        let seq = next_generation();
        self.flash = Some(seq);
        Update::effect(Effect::Copy(self.raw.clone())).with_task(Some(Task::after(
            "copy-flash",
            flash_for,
            Msg::CopyFlashExpired { seq },
        )))
    }

    /// Draw the visible slice into `area`, reserving its last column for the scrollbar.
    pub fn render(&self, f: &mut Frame, area: Rect, theme: &ThemeTokens) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let text_area = Rect {
            width: area.width.saturating_sub(1),
            ..area
        };
        #[allow(clippy::cast_possible_truncation)]
        let para = Paragraph::new(self.text.clone())
            .style(Style::default().fg(theme.text_primary))
            .scroll((self.offset.min(usize::from(u16::MAX)) as u16, 0));
        f.render_widget(para, text_area);

        let track = usize::from(area.height);
        let glyphs = scrollbar(track, self.total_lines(), track, self.scroll_fraction());
        if glyphs.is_empty() {
            return;
        }
        let lines: Vec<Line> = glyphs
            .into_iter()
            .map(|g| {
                let color = if g == THUMB {
                    theme.scrollbar_thumb
                } else {
                    theme.scrollbar_track
                };
                Line::from(Span::styled(g, Style::default().fg(color)))
            })
            .collect();
        let bar_area = Rect {
            x: area.x + area.width - 1,
            width: 1,
            ..area
        };
        f.render_widget(Paragraph::new(lines), bar_area);
    }

    /// Footer line: copy acknowledgement while flashing, otherwise key hints and position.
    #[must_use]
    pub fn footer(&self, theme: &ThemeTokens, extra: &str) -> Line<'static> {
        if self.flashing() {
            return Line::from(Span::styled(
                "✔ copied to clipboard",
                Style::default()
                    .fg(theme.accent_success)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        let total = self.total_lines();
        let pos = if total == 0 {
            String::new()
        } else {
            let last = (self.offset + self.visible()).min(total);
            format!("  {}-{last}/{total}", self.offset + 1)
        };
        let mut hint = String::from("j/k scroll · space/pgdn page · g/G ends · c copy");
        if !extra.is_empty() {
            hint.push_str(" · ");
            hint.push_str(extra);
        }
        hint.push_str(" · esc back");
        Line::from(vec![
            Span::styled(hint, theme.muted()),
            Span::styled(pos, theme.muted().add_modifier(Modifier::DIM)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn lines(n: usize) -> Text<'static> {
        Text::from((0..n).map(|i| Line::from(format!("line {i}"))).collect::<Vec<_>>())
    }

    fn key(code: KeyCode) -> Msg {
        Msg::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn resize_subtracts_chrome() {
        let mut vp = Viewport::new();
        vp.set_size(80, 24);
        assert_eq!(vp.size(), (80 - CHROME_COLS, 24 - CHROME_ROWS));
    }

    #[test]
    fn scrolling_stays_in_range() {
        let mut vp = Viewport::with_chrome(0, 0);
        vp.set_size(40, 10);
        vp.set_content(lines(25), "x");
        vp.update(key(KeyCode::Char('G')), Duration::ZERO);
        assert_eq!(vp.offset(), 15);
        assert!((vp.scroll_fraction() - 1.0).abs() < f64::EPSILON);
        vp.update(key(KeyCode::PageDown), Duration::ZERO);
        assert_eq!(vp.offset(), 15);
        vp.update(key(KeyCode::PageUp), Duration::ZERO);
        assert_eq!(vp.offset(), 5);
        vp.update(key(KeyCode::Char('g')), Duration::ZERO);
        vp.update(key(KeyCode::Up), Duration::ZERO);
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn growing_the_window_pulls_offset_back() {
        let mut vp = Viewport::with_chrome(0, 0);
        vp.set_size(40, 5);
        vp.set_content(lines(10), "x");
        vp.bottom();
        assert_eq!(vp.offset(), 5);
        vp.set_size(40, 8);
        assert_eq!(vp.offset(), 2);
    }

    #[test]
    fn copy_flashes_until_matching_expiry() {
        let mut vp = Viewport::new();
        vp.set_content(lines(1), "payload");
        let up = vp.update(key(KeyCode::Char('c')), Duration::from_secs(2));
        assert_eq!(up.effect, Some(Effect::Copy("payload".into())));
        assert_eq!(up.tasks.len(), 1);
        assert!(vp.flashing());
        vp.update(Msg::CopyFlashExpired { seq: 0 }, Duration::ZERO);
        assert!(vp.flashing());
        let seq = vp.flash.unwrap();
        vp.update(Msg::CopyFlashExpired { seq }, Duration::ZERO);
        assert!(!vp.flashing());
    }

    #[test]
    fn copy_with_nothing_loaded_is_a_no_op() {
        let mut vp = Viewport::new();
        let up = vp.update(key(KeyCode::Char('c')), Duration::from_secs(2));
        assert!(up.effect.is_none());
        assert!(!vp.flashing());
    }
}
