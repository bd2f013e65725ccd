//! Background loading with generation-based staleness rejection.
//!
//! Every time a loading context changes (first load, reload, tab switch, cancel) the
//! [`Loader`] takes a fresh generation id and cancels whatever was in flight. Results carry
//! the generation that was current when their task was created; anything that no longer
//! matches is dropped without touching state.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::msg::{LoadTag, Loaded, Msg, Payload};
use crate::task::Task;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique generation id.
///
/// Ids are unique across views so a late result from a popped view can never be mistaken
/// for one belonging to whatever view replaced it.
#[must_use]
pub fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

/// Handed out by [`Loader::begin`]; turns a unit of work into a cancellable [`Task`].
#[derive(Debug)]
pub struct Ticket {
    pub generation: u64,
    token: CancellationToken,
}

impl Ticket {
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Wrap `work` so its result arrives as a [`Msg::Loaded`] stamped with this ticket.
    pub fn task<F>(self, name: &'static str, tag: LoadTag, work: F) -> Task
    where
        F: Future<Output = Result<Payload, String>> + Send + 'static,
    {
        let generation = self.generation;
        Task::cancellable(name, self.token, async move {
            let payload = work.await;
            Msg::Loaded(Loaded {
                tag,
                generation,
                payload,
            })
        })
    }
}

#[derive(Debug)]
pub struct Loader<T> {
    state: LoadState<T>,
    generation: u64,
    cancel: Option<CancellationToken>,
}

impl<T> Default for Loader<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Loader<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: LoadState::Idle,
            generation: 0,
            cancel: None,
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn state(&self) -> &LoadState<T> {
        &self.state
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoadState::Loading)
    }

    #[must_use]
    pub fn content(&self) -> Option<&T> {
        match &self.state {
            LoadState::Ready(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoadState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Start a new load: cancel the previous one, advance the generation, clear any error.
    pub fn begin(&mut self) -> Ticket {
        self.abort_in_flight();
        self.generation = next_generation();
        let token = CancellationToken::new();
        self.cancel = Some(token.clone());
        self.state = LoadState::Loading;
        Ticket {
            generation: self.generation,
            token,
        }
    }

    /// Offer a result. Returns `false` (and changes nothing) when `generation` is stale.
    pub fn accept(&mut self, generation: u64, result: Result<T, String>) -> bool {
        if generation != self.generation {
            debug!(
                current = self.generation,
                got = generation,
                "discarding stale load result"
            );
            return false;
        }
        self.cancel = None;
        self.state = match result {
            Ok(v) => LoadState::Ready(v),
            Err(e) => LoadState::Failed(e),
        };
        true
    }

    /// Abandon the in-flight load. Any result it still produces is stale.
    pub fn cancel(&mut self) {
        if self.cancel.is_none() {
            return;
        }
        self.abort_in_flight();
        self.generation = next_generation();
        if self.is_loading() {
            self.state = LoadState::Idle;
        }
    }

    fn abort_in_flight(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }
}

impl<T> Drop for Loader<T> {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_generation_is_ignored() {
        let mut loader: Loader<String> = Loader::new();
        let first = loader.begin();
        let second = loader.begin();
        assert!(first.token().is_cancelled());
        assert!(!loader.accept(first.generation, Ok("old".into())));
        assert!(loader.is_loading());
        assert!(loader.accept(second.generation, Ok("new".into())));
        assert_eq!(loader.content().map(String::as_str), Some("new"));
    }

    #[test]
    fn cancel_invalidates_pending_result() {
        let mut loader: Loader<String> = Loader::new();
        let ticket = loader.begin();
        loader.cancel();
        assert!(ticket.token().is_cancelled());
        assert!(!loader.accept(ticket.generation, Ok("late".into())));
        assert_eq!(loader.state(), &LoadState::Idle);
    }

    #[test]
    fn begin_clears_previous_error() {
        let mut loader: Loader<String> = Loader::new();
        let t = loader.begin();
        assert!(loader.accept(t.generation, Err("boom".into())));
        assert_eq!(loader.error(), Some("boom"));
        let _t2 = loader.begin();
        assert!(loader.error().is_none());
        assert!(loader.is_loading());
    }
}
