mod common;

use crossterm::event::KeyCode;
use devdeck::loader::LoadState;
use devdeck::screens::sessions::SessionsView;
use devdeck::view::View;

use common::{FakeBackend, ch, ctx, finish, key};

const SESSIONS: &str = r#"[
  {"id": "a1b2c3d4e5", "project": "devdeck", "started": "2026-03-10T11:00:00Z", "messages": 12, "summary": "chart axis labels"},
  {"id": "ffee0011", "project": "website", "started": "2026-03-09T08:00:00Z", "messages": 4, "summary": "fix footer"},
  {"id": "99887766", "summary": "scratch"}
]"#;

async fn loaded() -> SessionsView {
    let backend = FakeBackend::new().ok("sessions --json", SESSIONS);
    let mut view = SessionsView::new(ctx(backend));
    let task = view.init().unwrap();
    let _ = view.update(finish(task).await);
    view
}

#[tokio::test]
async fn list_loads_with_defaults_for_missing_fields() {
    let view = loaded().await;
    let visible = view.visible();
    assert_eq!(visible.len(), 3);
    assert_eq!(visible[2].project, "");
    assert_eq!(visible[2].messages, 0);
}

#[tokio::test]
async fn filter_narrows_and_clamps_selection() {
    let mut view = loaded().await;
    let _ = view.update(key(KeyCode::Down));
    let _ = view.update(key(KeyCode::Down));
    assert_eq!(view.selected(), 2);

    let _ = view.update(ch('/'));
    for c in "foot".chars() {
        let _ = view.update(ch(c));
    }
    assert_eq!(view.visible().len(), 1);
    assert_eq!(view.selected(), 0);

    // While filtering, `q` is text rather than a back key.
    assert!(!view.update(ch('q')).is_pop());
    let _ = view.update(key(KeyCode::Esc));
    assert_eq!(view.visible().len(), 3);
}

#[tokio::test]
async fn enter_opens_the_transcript_viewer() {
    let mut view = loaded().await;
    let update = view.update(key(KeyCode::Enter));
    assert_eq!(
        update.pushed_title().as_deref(),
        Some("Session a1b2c3d4 · devdeck")
    );
}

#[tokio::test]
async fn malformed_json_is_a_load_error() {
    let backend = FakeBackend::new().ok("sessions --json", "not json");
    let mut view = SessionsView::new(ctx(backend));
    let task = view.init().unwrap();
    let _ = view.update(finish(task).await);
    match view.state() {
        LoadState::Failed(e) => assert!(e.starts_with("invalid session list")),
        other => panic!("unexpected state {other:?}"),
    }
    assert!(view.update(key(KeyCode::Esc)).is_pop());
}
