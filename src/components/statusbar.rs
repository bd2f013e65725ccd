use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::frame;
use crate::msg::CommandOutcome;
use crate::theme::ThemeTokens;

/// One-line bar under non-fullscreen views: breadcrumb on the left, last command result on
/// the right.
pub struct Statusbar;

impl Statusbar {
    #[must_use]
    pub fn line(
        crumbs: &[String],
        outcome: Option<&CommandOutcome>,
        width: u16,
        theme: &ThemeTokens,
    ) -> Line<'static> {
        let crumb = format!(" {}", crumbs.join(" › "));
        let mut spans = vec![Span::styled(
            crumb.clone(),
            Style::default().fg(theme.status_fg).add_modifier(Modifier::BOLD),
        )];
        if let Some(o) = outcome {
            let summary = o.summary();
            let color = if o.success() {
                theme.accent_success
            } else {
                theme.accent_danger
            };
            let used = crumb.chars().count() + summary.chars().count() + 1;
            let gap = usize::from(width).saturating_sub(used).max(2);
            spans.push(Span::raw(" ".repeat(gap)));
            spans.push(Span::styled(summary, Style::default().fg(color)));
        }
        Line::from(spans)
    }

    pub fn render(
        f: &mut Frame,
        area: Rect,
        crumbs: &[String],
        outcome: Option<&CommandOutcome>,
        theme: &ThemeTokens,
    ) {
        let line = Self::line(crumbs, outcome, area.width, theme);
        frame::render_status_bar(line, area, f, theme);
    }
}
