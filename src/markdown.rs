//! Markdown to styled terminal text, for memory files and the help screen.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};

use crate::theme::ThemeTokens;

#[must_use]
pub fn markdown_to_text(input: &str, theme: &ThemeTokens) -> Text<'static> {
    markdown_to_text_with_links(input, theme).0
}

/// Render `input`, numbering links inline and listing their targets at the end.
#[must_use]
pub fn markdown_to_text_with_links(input: &str, theme: &ThemeTokens) -> (Text<'static>, Vec<String>) {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_TASKLISTS);

    let mut r = Renderer::new(theme);
    for ev in Parser::new_ext(input, opts) {
        r.event(ev);
    }
    r.finish()
}

#[derive(Default)]
struct Inline {
    strong: bool,
    emph: bool,
    strike: bool,
    heading: u8,
    code_block: bool,
    list_depth: u16,
}

struct Renderer<'t> {
    theme: &'t ThemeTokens,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    links: Vec<String>,
    open_link: Option<String>,
    st: Inline,
}

impl<'t> Renderer<'t> {
    fn new(theme: &'t ThemeTokens) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current: Vec::new(),
            links: Vec::new(),
            open_link: None,
            st: Inline::default(),
        }
    }

    fn flush(&mut self) {
        self.lines.push(Line::from(std::mem::take(&mut self.current)));
    }

    fn flush_nonempty(&mut self) {
        if !self.current.is_empty() {
            self.flush();
        }
    }

    fn blank(&mut self, n: usize) {
        for _ in 0..n {
            self.lines.push(Line::raw(""));
        }
    }

    fn link_style(&self) -> Style {
        Style::default()
            .fg(self.theme.link)
            .add_modifier(Modifier::UNDERLINED)
    }

    fn event(&mut self, ev: Event<'_>) {
        match ev {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(t) => self.text(&t),
            Event::Code(code) => self
                .current
                .push(Span::styled(code.to_string(), Style::default().fg(self.theme.code))),
            Event::SoftBreak | Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush_nonempty();
                self.current
                    .push(Span::styled("─".repeat(40), Style::default().fg(self.theme.rule)));
                self.flush();
                self.blank(1);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.current.push(Span::styled(html.to_string(), self.theme.muted()));
            }
            Event::TaskListMarker(done) => {
                self.current.push(Span::raw(if done { "[x] " } else { "[ ] " }));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_nonempty();
                self.st.heading = match level {
                    HeadingLevel::H1 => 1,
                    HeadingLevel::H2 => 2,
                    HeadingLevel::H3 => 3,
                    _ => 4,
                };
                let top = match self.st.heading {
                    1 => 1,
                    2 | 3 if !self.lines.is_empty() => 1,
                    _ => 0,
                };
                self.blank(top);
            }
            Tag::Emphasis => self.st.emph = true,
            Tag::Strong => self.st.strong = true,
            Tag::Strikethrough => self.st.strike = true,
            Tag::Link { dest_url, .. } => {
                self.open_link = Some(dest_url.to_string());
            }
            Tag::CodeBlock(_) => {
                self.st.code_block = true;
                self.flush_nonempty();
            }
            Tag::List(_) => {
                if self.st.list_depth == 0 {
                    self.flush_nonempty();
                }
                self.st.list_depth = self.st.list_depth.saturating_add(1);
            }
            Tag::Item => {
                self.flush_nonempty();
                let indent = "  ".repeat(usize::from(self.st.list_depth.saturating_sub(1)));
                self.current.push(Span::raw(format!("{indent}• ")));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                let width: usize = self.current.iter().map(|s| s.content.chars().count()).sum();
                let level = self.st.heading;
                self.flush();
                let underline = match level {
                    1 => Some("═"),
                    2 => Some("─"),
                    _ => None,
                };
                if let (Some(ch), true) = (underline, width > 0) {
                    self.lines.push(Line::from(Span::styled(
                        ch.repeat(width),
                        Style::default().fg(self.theme.rule),
                    )));
                }
                self.blank(usize::from(level <= 3));
                self.st.heading = 0;
            }
            TagEnd::Paragraph => {
                self.flush_nonempty();
                if self.st.list_depth == 0 {
                    self.blank(1);
                }
            }
            TagEnd::Emphasis => self.st.emph = false,
            TagEnd::Strong => self.st.strong = false,
            TagEnd::Strikethrough => self.st.strike = false,
            TagEnd::Link => {
                if let Some(url) = self.open_link.take() {
                    self.links.push(url);
                    self.current.push(Span::styled(
                        format!(" [{}]", self.links.len()),
                        self.theme.muted(),
                    ));
                }
            }
            TagEnd::CodeBlock => {
                self.st.code_block = false;
                self.flush_nonempty();
                self.blank(1);
            }
            TagEnd::List(_) => {
                self.st.list_depth = self.st.list_depth.saturating_sub(1);
                if self.st.list_depth == 0 {
                    self.flush_nonempty();
                    self.blank(1);
                }
            }
            TagEnd::Item => self.flush_nonempty(),
            _ => {}
        }
    }

    fn text(&mut self, t: &str) {
        if self.st.code_block {
            let code = Style::default().fg(self.theme.code);
            let mut parts = t.split('\n').peekable();
            while let Some(part) = parts.next() {
                if !part.is_empty() {
                    self.current.push(Span::styled(format!("  {part}"), code));
                }
                if parts.peek().is_some() {
                    self.flush();
                }
            }
            return;
        }
        let mut style = Style::default();
        if self.st.strong {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.st.emph {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.st.strike {
            style = style.add_modifier(Modifier::CROSSED_OUT);
        }
        if self.open_link.is_some() {
            style = style.patch(self.link_style());
        }
        let text = match self.st.heading {
            1 => {
                style = style.fg(self.theme.md_heading1).add_modifier(Modifier::BOLD);
                t.to_uppercase()
            }
            2 => {
                style = style.fg(self.theme.md_heading2).add_modifier(Modifier::BOLD);
                t.to_string()
            }
            3 => {
                style = style.fg(self.theme.md_heading3).add_modifier(Modifier::BOLD);
                t.to_string()
            }
            _ => t.to_string(),
        };
        self.current.push(Span::styled(text, style));
    }

    fn finish(mut self) -> (Text<'static>, Vec<String>) {
        self.flush_nonempty();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        if !self.links.is_empty() {
            self.blank(1);
            self.lines
                .push(Line::from(Span::styled("Links:", self.theme.muted())));
            for (i, url) in self.links.iter().enumerate() {
                self.lines.push(Line::from(vec![
                    Span::styled(format!("[{}] ", i + 1), self.theme.muted()),
                    Span::styled(url.clone(), self.link_style()),
                ]));
            }
        }
        (Text::from(self.lines), self.links)
    }
}
