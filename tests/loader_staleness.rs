use std::time::Duration;

use devdeck::loader::{LoadState, Loader, next_generation};
use devdeck::msg::{LoadTag, Msg, Payload};
use devdeck::task::Task;
use tokio::sync::mpsc::unbounded_channel;

fn text(s: &str) -> Result<Payload, String> {
    Ok(Payload::Text(s.to_string()))
}

#[test]
fn generations_are_unique_and_increasing() {
    let a = next_generation();
    let b = next_generation();
    assert!(b > a);
    let mut one: Loader<String> = Loader::new();
    let mut two: Loader<String> = Loader::new();
    let t1 = one.begin();
    let t2 = two.begin();
    assert_ne!(t1.generation, t2.generation);
}

#[tokio::test]
async fn only_the_latest_spawned_result_is_accepted() {
    let (tx, mut rx) = unbounded_channel();
    let mut loader: Loader<String> = Loader::new();

    let slow = loader.begin();
    let slow_gen = slow.generation;
    let slow_task = slow.task("slow", LoadTag::Content, async {
        tokio::time::sleep(Duration::from_millis(30)).await;
        text("old")
    });
    let fast = loader.begin();
    let fast_task = fast.task("fast", LoadTag::Content, async { text("new") });

    slow_task.spawn(tx.clone()).await.unwrap();
    fast_task.spawn(tx).await.unwrap();

    let mut accepted = Vec::new();
    while let Some(msg) = rx.recv().await {
        let Msg::Loaded(loaded) = msg else {
            panic!("unexpected message");
        };
        assert_ne!(loaded.generation, slow_gen, "cancelled task delivered a result");
        let payload = loaded.payload.map(|p| match p {
            Payload::Text(s) => s,
            other => panic!("unexpected payload {other:?}"),
        });
        if loader.accept(loaded.generation, payload) {
            accepted.push(loader.content().cloned());
        }
    }
    assert_eq!(accepted, vec![Some("new".to_string())]);
}

#[tokio::test]
async fn dropping_the_loader_cancels_in_flight_work() {
    let mut loader: Loader<String> = Loader::new();
    let ticket = loader.begin();
    let token = ticket.token();
    let task = ticket.task("orphan", LoadTag::Content, async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        text("never")
    });
    drop(loader);
    assert!(token.is_cancelled());
    assert!(task.run().await.is_none());
}

#[tokio::test]
async fn errors_are_stored_and_retry_starts_clean() {
    let mut loader: Loader<String> = Loader::new();
    let ticket = loader.begin();
    let first = ticket.generation;
    let msg = ticket
        .task("fail", LoadTag::Content, async { Err("exit status 2".to_string()) })
        .run()
        .await
        .unwrap();
    let Msg::Loaded(loaded) = msg else {
        panic!("expected Loaded");
    };
    assert_eq!(loaded.generation, first);
    assert!(loader.accept(loaded.generation, loaded.payload.map(|_| String::new())));
    assert_eq!(loader.state(), &LoadState::Failed("exit status 2".to_string()));

    let retry = loader.begin();
    assert!(loader.is_loading());
    assert!(!loader.accept(first, Ok("late".into())));
    assert!(loader.accept(retry.generation, Ok("fresh".into())));
    assert_eq!(loader.content().map(String::as_str), Some("fresh"));
}

#[tokio::test]
async fn delayed_task_delivers_after_its_delay() {
    let start = tokio::time::Instant::now();
    let msg = Task::after("tick", Duration::from_millis(20), Msg::CopyFlashExpired { seq: 7 })
        .run()
        .await;
    assert!(start.elapsed() >= Duration::from_millis(20));
    assert!(matches!(msg, Some(Msg::CopyFlashExpired { seq: 7 })));
}
