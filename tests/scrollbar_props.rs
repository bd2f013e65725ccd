use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use devdeck::components::viewport::{THUMB, TRACK, Viewport, scrollbar, thumb_geometry};
use devdeck::msg::Msg;
use devdeck::theme::ThemeTokens;
use devdeck::view::Effect;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use ratatui::text::Text;

fn numbered(n: usize) -> Text<'static> {
    Text::from((0..n).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n"))
}

fn key(code: KeyCode) -> Msg {
    Msg::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

#[test]
fn no_thumb_when_content_fits() {
    assert_eq!(thumb_geometry(10, 10, 10, 0.0), None);
    assert_eq!(thumb_geometry(10, 3, 10, 0.5), None);
    assert_eq!(thumb_geometry(0, 100, 10, 0.5), None);
    assert!(scrollbar(10, 5, 10, 0.0).is_empty());
}

#[test]
fn thumb_size_is_proportional_and_at_least_one() {
    assert_eq!(thumb_geometry(10, 20, 10, 0.0), Some((0, 5)));
    assert_eq!(thumb_geometry(10, 100, 10, 0.0), Some((0, 1)));
    assert_eq!(thumb_geometry(10, 10_000, 10, 0.0), Some((0, 1)));
}

#[test]
fn thumb_travels_the_whole_track() {
    for total in [11, 25, 80, 500] {
        let (start, size) = thumb_geometry(12, total, 10, 1.0).unwrap();
        assert_eq!(start + size, 12, "total {total}");
        let mut last = 0;
        for step in 0..=20 {
            let (start, _) = thumb_geometry(12, total, 10, f64::from(step) / 20.0).unwrap();
            assert!(start >= last);
            last = start;
        }
    }
}

#[test]
fn out_of_range_fractions_are_clamped() {
    assert_eq!(thumb_geometry(10, 40, 10, -1.0), Some((0, 2)));
    assert_eq!(thumb_geometry(10, 40, 10, 7.0), Some((8, 2)));
    assert_eq!(thumb_geometry(10, 40, 10, f64::NAN), Some((0, 2)));
}

#[test]
fn scrollbar_has_one_glyph_per_row() {
    let bar = scrollbar(8, 32, 8, 0.5);
    assert_eq!(bar.len(), 8);
    assert_eq!(bar.iter().filter(|g| **g == THUMB).count(), 2);
    assert_eq!(bar.iter().filter(|g| **g == TRACK).count(), 6);
}

#[test]
fn viewport_keys_move_the_offset_within_bounds() {
    let mut vp = Viewport::with_chrome(0, 0);
    vp.set_content(numbered(30), "");
    vp.set_size(20, 10);
    let flash = Duration::from_millis(10);

    let _ = vp.update(key(KeyCode::End), flash);
    assert_eq!(vp.offset(), 20);
    assert!((vp.scroll_fraction() - 1.0).abs() < f64::EPSILON);
    let _ = vp.update(key(KeyCode::Char('j')), flash);
    assert_eq!(vp.offset(), 20);
    let _ = vp.update(key(KeyCode::PageUp), flash);
    assert_eq!(vp.offset(), 10);
    let _ = vp.update(key(KeyCode::Char('g')), flash);
    assert_eq!(vp.offset(), 0);
    let _ = vp.update(key(KeyCode::Char('k')), flash);
    assert_eq!(vp.offset(), 0);
}

#[test]
fn copy_emits_raw_text_and_schedules_expiry() {
    let mut vp = Viewport::new();
    vp.set_content(numbered(3), "\x1b[1mraw\x1b[0m");
    let update = vp.update(key(KeyCode::Char('c')), Duration::from_millis(10));
    assert_eq!(update.effect, Some(Effect::Copy("\x1b[1mraw\x1b[0m".into())));
    assert_eq!(update.tasks.len(), 1);
    assert!(vp.flashing());
}

#[test]
fn rendered_scrollbar_sits_in_the_last_column() {
    let mut vp = Viewport::with_chrome(0, 0);
    vp.set_content(numbered(40), "");
    vp.set_size(20, 10);
    let theme = ThemeTokens::default();
    let mut terminal = Terminal::new(TestBackend::new(20, 10)).unwrap();
    terminal
        .draw(|f| vp.render(f, Rect::new(0, 0, 20, 10), &theme))
        .unwrap();
    let buf = terminal.backend().buffer();
    let column: Vec<&str> = (0..10).map(|y| buf[(19, y)].symbol()).collect();
    assert_eq!(column[0], THUMB);
    assert_eq!(column[9], TRACK);
    assert_eq!(buf[(0, 0)].symbol(), "l");
}
