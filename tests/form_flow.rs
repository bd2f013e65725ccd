mod common;

use std::fs;

use crossterm::event::KeyCode;
use devdeck::catalog::FormKind;
use devdeck::components::form::{FieldSpec, Form, FormMsg};
use devdeck::screens::form::FormScreen;
use devdeck::view::{Effect, View};

use common::{FakeBackend, ch, ctrl, ctx, finish, key};

fn two_field_form() -> Form {
    Form::new(vec![
        FieldSpec::text("name", "Name").required(),
        FieldSpec::text("note", "Note"),
    ])
    .with_home(None)
}

fn type_str(form: &mut Form, s: &str) {
    for c in s.chars() {
        let out = form.update(ch(c));
        assert!(out.outcome.is_none());
    }
}

#[test]
fn empty_required_field_blocks_submit() {
    let mut form = two_field_form();
    let _ = form.update(key(KeyCode::Tab));
    assert_eq!(form.focus(), 1);

    let out = form.update(key(KeyCode::Enter));
    assert!(out.outcome.is_none());
    assert_eq!(form.focus(), 0);
    assert_eq!(form.error(), Some("Name is required"));
}

#[test]
fn filled_form_submits_exactly_once_with_values() {
    let mut form = two_field_form();
    type_str(&mut form, "demo");
    let _ = form.update(key(KeyCode::Tab));
    type_str(&mut form, "  hi ");

    let out = form.update(key(KeyCode::Enter));
    match out.outcome {
        Some(FormMsg::Submit(values)) => assert_eq!(
            values,
            vec![
                ("name".to_string(), "demo".to_string()),
                ("note".to_string(), "hi".to_string()),
            ]
        ),
        other => panic!("expected submit, got {other:?}"),
    }
    assert!(form.error().is_none());
}

#[test]
fn typing_clears_the_validation_error() {
    let mut form = two_field_form();
    let _ = form.update(key(KeyCode::Enter));
    assert!(form.error().is_some());
    type_str(&mut form, "x");
    assert!(form.error().is_none());
}

#[test]
fn ctrl_u_clears_and_backtab_wraps() {
    let mut form = two_field_form();
    type_str(&mut form, "abc");
    let _ = form.update(ctrl('u'));
    assert_eq!(form.value(0), Some(""));
    let _ = form.update(key(KeyCode::BackTab));
    assert_eq!(form.focus(), 1);
}

#[test]
fn escape_cancels() {
    let mut form = two_field_form();
    let out = form.update(key(KeyCode::Esc));
    assert!(matches!(out.outcome, Some(FormMsg::Cancel)));
}

#[test]
fn non_path_fields_never_spawn_suggestion_tasks() {
    let mut form = two_field_form();
    let out = form.update(ch('a'));
    assert!(out.task.is_none());
}

#[tokio::test]
async fn path_suggestions_expand_home_and_accept_with_tab() {
    let home = tempfile::tempdir().unwrap();
    fs::create_dir(home.path().join("projects")).unwrap();
    fs::create_dir(home.path().join("photos")).unwrap();
    fs::write(home.path().join("notes.txt"), "x").unwrap();
    fs::create_dir(home.path().join(".config")).unwrap();

    let mut form = Form::new(vec![
        FieldSpec::text("dir", "Directory").path(),
        FieldSpec::text("other", "Other"),
    ])
    .with_home(Some(home.path().to_path_buf()));

    let _ = form.update(ch('~'));
    let _ = form.update(ch('/'));
    let out = form.update(ch('p'));
    let msg = finish(out.task.expect("path field spawns a task")).await;
    let _ = form.update(msg);
    assert_eq!(
        form.suggestions(0),
        &["~/photos/".to_string(), "~/projects/".to_string()]
    );

    let _ = form.update(key(KeyCode::Down));
    assert_eq!(form.selected_suggestion(), Some("~/projects/"));
    let out = form.update(key(KeyCode::Tab));
    assert_eq!(form.value(0), Some("~/projects/"));
    assert_eq!(form.focus(), 0);
    // Accepting re-lists the new directory; it is empty.
    let msg = finish(out.task.expect("accept re-lists")).await;
    let _ = form.update(msg);
    assert!(form.suggestions(0).is_empty());

    let _ = form.update(key(KeyCode::Tab));
    assert_eq!(form.focus(), 1);
}

#[tokio::test]
async fn late_suggestions_for_an_old_value_are_dropped() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("alpha")).unwrap();
    fs::create_dir(dir.path().join("beta")).unwrap();
    let base = format!("{}/", dir.path().display());

    let mut form = Form::new(vec![FieldSpec::text("dir", "Directory").path()]).with_home(None);
    let mut first = None;
    for c in base.chars() {
        first = form.update(ch(c)).task;
    }
    let stale = first.expect("task for the directory prefix");
    let out = form.update(ch('b'));
    let fresh = out.task.expect("task for the longer value");

    // The superseded task was cancelled, so it produces nothing.
    assert!(stale.run().await.is_none());
    let msg = finish(fresh).await;
    let _ = form.update(msg);
    assert_eq!(form.suggestions(0), &[format!("{base}beta/")]);
}

#[tokio::test]
async fn missing_home_surfaces_an_error_message() {
    let mut form = Form::new(vec![FieldSpec::text("dir", "Directory").path()]).with_home(None);
    let _ = form.update(ch('~'));
    let out = form.update(ch('/'));
    let msg = finish(out.task.unwrap()).await;
    let _ = form.update(msg);
    assert!(form.suggestions(0).is_empty());
    assert!(form.error().unwrap_or_default().contains("home directory"));
}

#[test]
fn form_screen_submit_pops_and_runs_command() {
    let mut screen = FormScreen::new(ctx(FakeBackend::new()), FormKind::Attach);
    for c in "./site".chars() {
        let _ = screen.update(ch(c));
    }
    let _ = screen.update(key(KeyCode::Tab));
    for c in "blog".chars() {
        let _ = screen.update(ch(c));
    }
    let update = screen.update(key(KeyCode::Enter));
    assert!(update.is_pop());
    match update.effect {
        Some(Effect::RunAndResume(spec)) => {
            assert_eq!(spec.label, "Attach assets");
            assert_eq!(spec.args, vec!["attach", "./site", "--template", "blog"]);
        }
        other => panic!("expected run-and-resume, got {other:?}"),
    }
}

#[test]
fn form_screen_escape_pops_without_effect() {
    let mut screen = FormScreen::new(ctx(FakeBackend::new()), FormKind::Upgrade);
    let update = screen.update(key(KeyCode::Esc));
    assert!(update.is_pop());
    assert!(update.effect.is_none());
}
