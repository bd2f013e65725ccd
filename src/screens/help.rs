use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::Line;

use crate::frame::{BOX_COLS, BOX_ROWS, centered_rect_fixed, render_modal};
use crate::markdown::markdown_to_text;
use crate::msg::Msg;
use crate::theme::ThemeTokens;
use crate::view::{Update, View};

const KEYMAP: &str = "\
## Everywhere

- `ctrl+c` quit immediately
- `esc` / `q` go back; on the launcher this quits

## Launcher

- `j`/`k` or arrows to move, `enter` to open
- the letter in brackets opens an entry directly

## Viewers

- `j`/`k` scroll, `space`/`pgdn` page, `g`/`G` top and bottom
- `c` copy the whole output, `r` reload, `m` toggle markdown

## Cost

- `tab`/`l` next window, `shift+tab`/`h` previous, `1`-`5` jump

## Forms

- `tab` accept a path suggestion or move to the next field
- `up`/`down` pick a suggestion, `enter` submit, `esc` cancel
";

/// Key map shown over a blank screen; any key closes it.
#[derive(Debug, Default)]
pub struct HelpView;

impl HelpView {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl View for HelpView {
    fn title(&self) -> String {
        "Help".to_string()
    }

    fn fullscreen(&self) -> bool {
        false
    }

    fn update(&mut self, msg: Msg) -> Update {
        match msg {
            Msg::Key(_) => Update::pop(),
            _ => Update::none(),
        }
    }

    fn render(&mut self, f: &mut Frame, area: Rect, theme: &ThemeTokens) {
        let body = markdown_to_text(KEYMAP, theme);
        let width = body.width() as u16 + BOX_COLS + 2;
        let height = body.lines.len() as u16 + BOX_ROWS + 1;
        let rect = centered_rect_fixed(width.max(40), height, area);
        let mut body = body;
        body.lines.push(Line::raw(""));
        render_modal(" Keys · press any key to close ", body, rect, f, theme);
    }
}
