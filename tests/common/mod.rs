#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use devdeck::backend::Backend;
use devdeck::bridge::CommandSpec;
use devdeck::config::AppContext;
use devdeck::msg::Msg;
use devdeck::task::{BoxFuture, Task};

/// Canned subcommand output keyed by the space-joined argument list.
#[derive(Default)]
pub struct FakeBackend {
    responses: HashMap<String, Result<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(mut self, args: &str, out: &str) -> Self {
        self.responses.insert(args.to_string(), Ok(out.to_string()));
        self
    }

    pub fn fail(mut self, args: &str, err: &str) -> Self {
        self.responses.insert(args.to_string(), Err(err.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Backend for FakeBackend {
    fn capture(&self, args: Vec<String>) -> BoxFuture<anyhow::Result<String>> {
        let key = args.join(" ");
        self.calls.lock().unwrap().push(key.clone());
        let res = self
            .responses
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(format!("unknown subcommand: {key}")));
        Box::pin(async move { res.map_err(anyhow::Error::msg) })
    }

    fn command(&self, label: &str, args: Vec<String>) -> CommandSpec {
        CommandSpec::new(label, "/fake/program", args)
    }
}

pub fn ctx(backend: FakeBackend) -> Arc<AppContext> {
    AppContext::new(Arc::new(backend))
}

pub fn shared(backend: FakeBackend) -> (Arc<FakeBackend>, Arc<AppContext>) {
    let backend = Arc::new(backend);
    let ctx = AppContext::new(backend.clone());
    (backend, ctx)
}

pub fn key(code: KeyCode) -> Msg {
    Msg::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn ctrl(c: char) -> Msg {
    Msg::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

pub fn ch(c: char) -> Msg {
    key(KeyCode::Char(c))
}

/// Drive a task to completion and return the message it produced.
pub async fn finish(task: Task) -> Msg {
    task.run().await.expect("task produced no message")
}
