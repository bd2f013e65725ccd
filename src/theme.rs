use std::collections::HashMap;

use ratatui::style::{Color, Modifier, Style};

/// Color tokens shared by every screen and widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeTokens {
    pub text_primary: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,

    pub title: Color,
    pub selection_fg: Color,
    pub selection_bg: Color,

    pub tab_active: Color,
    pub tab_inactive: Color,

    pub chart_bar: Color,
    pub chart_axis: Color,

    pub scrollbar_thumb: Color,
    pub scrollbar_track: Color,

    pub link: Color,
    pub code: Color,
    pub md_heading1: Color,
    pub md_heading2: Color,
    pub md_heading3: Color,
    pub rule: Color,

    pub status_fg: Color,
    pub status_bg: Color,

    pub accent_success: Color,
    pub accent_warning: Color,
    pub accent_danger: Color,
}

impl Default for ThemeTokens {
    fn default() -> Self {
        Self::builtin_dark()
    }
}

impl ThemeTokens {
    #[must_use]
    pub fn builtin_dark() -> Self {
        Self {
            text_primary: Color::White,
            text_muted: Color::Gray,
            border: Color::DarkGray,
            border_focus: Color::Cyan,

            title: Color::White,
            selection_fg: Color::White,
            selection_bg: Color::Rgb(40, 40, 48),

            tab_active: Color::Cyan,
            tab_inactive: Color::DarkGray,

            chart_bar: Color::Rgb(95, 175, 255),
            chart_axis: Color::DarkGray,

            scrollbar_thumb: Color::Gray,
            scrollbar_track: Color::DarkGray,

            link: Color::Blue,
            code: Color::Cyan,
            md_heading1: Color::Yellow,
            md_heading2: Color::LightYellow,
            md_heading3: Color::Green,
            rule: Color::DarkGray,

            status_fg: Color::White,
            status_bg: Color::Rgb(24, 24, 24),

            accent_success: Color::Green,
            accent_warning: Color::Yellow,
            accent_danger: Color::Red,
        }
    }

    #[must_use]
    pub fn builtin_light() -> Self {
        Self {
            text_primary: Color::Black,
            text_muted: Color::DarkGray,
            border: Color::Gray,
            border_focus: Color::Blue,

            title: Color::Black,
            selection_fg: Color::Black,
            selection_bg: Color::Rgb(220, 220, 230),

            tab_active: Color::Blue,
            tab_inactive: Color::Gray,

            chart_bar: Color::Rgb(30, 100, 200),
            chart_axis: Color::Gray,

            scrollbar_thumb: Color::DarkGray,
            scrollbar_track: Color::Gray,

            link: Color::Blue,
            code: Color::Magenta,
            md_heading1: Color::Rgb(150, 90, 0),
            md_heading2: Color::Rgb(120, 90, 0),
            md_heading3: Color::Green,
            rule: Color::Gray,

            status_fg: Color::Black,
            status_bg: Color::Rgb(230, 230, 230),

            accent_success: Color::Green,
            accent_warning: Color::Rgb(180, 120, 0),
            accent_danger: Color::Red,
        }
    }

    /// Every token mapped to `Color::Reset`; used when color output is disabled.
    #[must_use]
    pub fn monochrome() -> Self {
        let c = Color::Reset;
        Self {
            text_primary: c,
            text_muted: c,
            border: c,
            border_focus: c,
            title: c,
            selection_fg: c,
            selection_bg: c,
            tab_active: c,
            tab_inactive: c,
            chart_bar: c,
            chart_axis: c,
            scrollbar_thumb: c,
            scrollbar_track: c,
            link: c,
            code: c,
            md_heading1: c,
            md_heading2: c,
            md_heading3: c,
            rule: c,
            status_fg: c,
            status_bg: c,
            accent_success: c,
            accent_warning: c,
            accent_danger: c,
        }
    }

    /// Apply a single `token = color` override. Unknown tokens and unparsable colors are
    /// reported back so the config validator can warn about them.
    pub fn apply_token(&mut self, key: &str, value: &str) -> bool {
        let Some(color) = parse_color(value) else {
            return false;
        };
        let slot = match key {
            "text_primary" => &mut self.text_primary,
            "text_muted" => &mut self.text_muted,
            "border" => &mut self.border,
            "border_focus" => &mut self.border_focus,
            "title" => &mut self.title,
            "selection_fg" => &mut self.selection_fg,
            "selection_bg" => &mut self.selection_bg,
            "tab_active" => &mut self.tab_active,
            "tab_inactive" => &mut self.tab_inactive,
            "chart_bar" => &mut self.chart_bar,
            "chart_axis" => &mut self.chart_axis,
            "scrollbar_thumb" => &mut self.scrollbar_thumb,
            "scrollbar_track" => &mut self.scrollbar_track,
            "link" => &mut self.link,
            "code" => &mut self.code,
            "md_heading1" => &mut self.md_heading1,
            "md_heading2" => &mut self.md_heading2,
            "md_heading3" => &mut self.md_heading3,
            "rule" => &mut self.rule,
            "status_fg" => &mut self.status_fg,
            "status_bg" => &mut self.status_bg,
            "accent_success" => &mut self.accent_success,
            "accent_warning" => &mut self.accent_warning,
            "accent_danger" => &mut self.accent_danger,
            _ => return false,
        };
        *slot = color;
        true
    }

    #[must_use]
    pub fn muted(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    #[must_use]
    pub fn error(&self) -> Style {
        Style::default()
            .fg(self.accent_danger)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn selected(&self) -> Style {
        Style::default().fg(self.selection_fg).bg(self.selection_bg)
    }

    #[must_use]
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focus)
        } else {
            Style::default().fg(self.border)
        }
    }
}

/// Resolve a theme by builtin name and apply overrides on top.
#[must_use]
pub fn load_theme<S: ::std::hash::BuildHasher>(
    name: Option<&str>,
    overrides: Option<&HashMap<String, String, S>>,
) -> ThemeTokens {
    let mut tokens = match name.map(str::to_ascii_lowercase) {
        Some(n) if n == "light" => ThemeTokens::builtin_light(),
        _ => ThemeTokens::builtin_dark(),
    };
    if let Some(map) = overrides {
        for (k, v) in map {
            tokens.apply_token(k, v);
        }
    }
    tokens
}

#[must_use]
pub fn parse_color(spec: &str) -> Option<Color> {
    let s = spec.trim();
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[0..2], 16),
            u8::from_str_radix(&hex[2..4], 16),
            u8::from_str_radix(&hex[4..6], 16),
        ) {
            return Some(Color::Rgb(r, g, b));
        }
    }
    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        "lightred" => Some(Color::LightRed),
        "lightgreen" => Some(Color::LightGreen),
        "lightyellow" => Some(Color::LightYellow),
        "lightblue" => Some(Color::LightBlue),
        "lightmagenta" => Some(Color::LightMagenta),
        "lightcyan" => Some(Color::LightCyan),
        "white" => Some(Color::White),
        _ => None,
    }
}
