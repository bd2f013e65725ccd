use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::theme::ThemeTokens;

/// Height of one boxed input row.
pub const INPUT_HEIGHT: u16 = 3;

/// Single-line text box. Editing always happens at the end of the value.
#[derive(Debug, Clone, Default)]
pub struct Input {
    pub label: String,
    pub value: String,
    pub placeholder: String,
    pub required: bool,
    pub focused: bool,
}

impl Input {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    /// Remove the last character. Returns `false` when already empty.
    pub fn backspace(&mut self) -> bool {
        self.value.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn render(&self, f: &mut Frame, area: Rect, theme: &ThemeTokens) {
        let title = if self.required {
            format!("{} *", self.label)
        } else {
            self.label.clone()
        };
        let line = if self.value.is_empty() {
            Line::from(Span::styled(
                self.placeholder.clone(),
                theme.muted().add_modifier(Modifier::ITALIC),
            ))
        } else {
            let mut spans = vec![Span::styled(
                self.value.clone(),
                Style::default().fg(theme.text_primary),
            )];
            if self.focused {
                spans.push(Span::styled("▏", Style::default().fg(theme.border_focus)));
            }
            Line::from(spans)
        };
        let para = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(self.focused))
                .title(title),
        );
        f.render_widget(para, area);
    }
}
