use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::msg::Msg;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Deferred unit of work that resolves to at most one message.
///
/// Tasks never touch UI state; they compute a value off the event loop and hand it back as a
/// [`Msg`]. A cancelled task resolves to `None`.
pub struct Task {
    name: &'static str,
    fut: BoxFuture<Option<Msg>>,
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Task({})", self.name)
    }
}

impl Task {
    pub fn new<F>(name: &'static str, fut: F) -> Self
    where
        F: Future<Output = Msg> + Send + 'static,
    {
        Self {
            name,
            fut: Box::pin(async move { Some(fut.await) }),
        }
    }

    /// Deliver `msg` once `delay` has elapsed.
    #[must_use]
    pub fn after(name: &'static str, delay: Duration, msg: Msg) -> Self {
        Self::new(name, async move {
            tokio::time::sleep(delay).await;
            msg
        })
    }

    /// Race `fut` against `token`; when the token fires first the work is dropped
    /// (killing any `kill_on_drop` child) and nothing is delivered.
    pub fn cancellable<F>(name: &'static str, token: CancellationToken, fut: F) -> Self
    where
        F: Future<Output = Msg> + Send + 'static,
    {
        Self {
            name,
            fut: Box::pin(async move {
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        debug!(task = name, "task cancelled");
                        None
                    }
                    msg = fut => Some(msg),
                }
            }),
        }
    }

    pub async fn run(self) -> Option<Msg> {
        self.fut.await
    }

    /// Run on the tokio runtime and forward the result to the loop's queue.
    pub fn spawn(self, tx: UnboundedSender<Msg>) -> JoinHandle<()> {
        let name = self.name;
        debug!(task = name, "task spawned");
        tokio::spawn(async move {
            if let Some(msg) = self.fut.await {
                if tx.send(msg).is_err() {
                    debug!(task = name, "event loop gone; dropping result");
                }
            }
        })
    }
}
