mod common;

use crossterm::event::KeyCode;
use devdeck::loader::LoadState;
use devdeck::msg::Msg;
use devdeck::screens::viewer::Viewer;
use devdeck::theme::ThemeTokens;
use devdeck::view::{Effect, View};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

use common::{FakeBackend, ch, ctx, finish, key};

fn draw(view: &mut Viewer, width: u16, height: u16) -> String {
    let theme = ThemeTokens::default();
    let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
    terminal
        .draw(|f| {
            let area = f.area();
            view.render(f, area, &theme)
        })
        .unwrap();
    let buf = terminal.backend().buffer();
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| buf[(x, y)].symbol())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

async fn loaded(backend: FakeBackend, title: &str, args: &[&str], markdown: bool) -> Viewer {
    let args = args.iter().map(|s| (*s).to_string()).collect();
    let mut view = Viewer::new(ctx(backend), title, args);
    if markdown {
        view = view.markdown();
    }
    let task = view.init().expect("viewer loads on init");
    let _ = view.update(Msg::Resize {
        width: 60,
        height: 16,
    });
    let msg = finish(task).await;
    let _ = view.update(msg);
    view
}

#[tokio::test]
async fn failure_renders_error_and_back_hint() {
    let backend = FakeBackend::new().fail("doctor", "doctor exited with status 2");
    let mut view = loaded(backend, "Doctor", &["doctor"], false).await;
    assert!(matches!(view.state(), LoadState::Failed(_)));

    let screen = draw(&mut view, 60, 16);
    assert!(screen.contains("Failed to load"), "{screen}");
    assert!(screen.contains("doctor exited with status 2"), "{screen}");
    assert!(screen.contains("esc/q"), "{screen}");

    assert!(view.update(key(KeyCode::Esc)).is_pop());
}

#[tokio::test]
async fn retry_after_failure_starts_a_new_load() {
    let backend = FakeBackend::new().fail("doctor", "boom");
    let mut view = loaded(backend, "Doctor", &["doctor"], false).await;
    let update = view.update(ch('r'));
    assert_eq!(update.tasks.len(), 1);
    assert!(matches!(view.state(), LoadState::Loading));
}

#[tokio::test]
async fn ansi_output_is_rendered_without_escape_codes() {
    let backend = FakeBackend::new().ok("skills list", "\x1b[32mreviewer\x1b[0m\nplanner\n");
    let mut view = loaded(backend, "Skills", &["skills", "list"], false).await;
    let screen = draw(&mut view, 60, 16);
    assert!(screen.contains("reviewer"), "{screen}");
    assert!(screen.contains("planner"), "{screen}");
    assert!(!screen.contains("[32m"), "{screen}");
}

#[tokio::test]
async fn markdown_toggle_switches_rendering() {
    let backend = FakeBackend::new().ok("memory show", "# Project\n\n- first rule\n");
    let mut view = loaded(backend, "Memory", &["memory", "show"], true).await;
    let screen = draw(&mut view, 60, 16);
    assert!(screen.contains("PROJECT"), "{screen}");
    assert!(screen.contains("• first rule"), "{screen}");
    assert!(screen.contains("[MD]"), "{screen}");

    let _ = view.update(ch('m'));
    let screen = draw(&mut view, 60, 16);
    assert!(screen.contains("# Project"), "{screen}");
    assert!(!screen.contains("[MD]"), "{screen}");
}

#[tokio::test(start_paused = true)]
async fn copy_shows_acknowledgement_until_expiry() {
    let backend = FakeBackend::new().ok("doctor", "ok\n");
    let mut view = loaded(backend, "Doctor", &["doctor"], false).await;
    let _ = draw(&mut view, 60, 16);
    let mut update = view.update(ch('c'));
    assert_eq!(update.effect, Some(Effect::Copy("ok\n".into())));
    let screen = draw(&mut view, 60, 16);
    assert!(screen.contains("copied to clipboard"), "{screen}");

    let expiry = finish(update.tasks.remove(0)).await;
    let _ = view.update(expiry);
    let screen = draw(&mut view, 60, 16);
    assert!(!screen.contains("copied to clipboard"), "{screen}");
}

#[tokio::test]
async fn stale_reload_result_is_ignored() {
    let backend = FakeBackend::new().ok("doctor", "fresh\n");
    let mut view = Viewer::new(ctx(backend), "Doctor", vec!["doctor".into()]);
    let first = view.init().unwrap();
    let mut update = view.update(ch('r'));
    assert!(first.run().await.is_none());
    let msg = finish(update.tasks.remove(0)).await;
    let _ = view.update(msg);
    assert_eq!(view.state(), &LoadState::Ready("fresh\n".to_string()));
}
