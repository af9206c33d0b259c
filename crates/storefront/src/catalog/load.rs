//! Asynchronous load lifecycle for a single state slot.
//!
//! A [`LoadSlot`] holds `Idle -> Loading -> Loaded | Failed`. Every load gets a
//! [`LoadTicket`] carrying a generation number and a cancellation token;
//! starting a new load cancels the previous ticket, and a result is only
//! written back if its ticket is still the current one. A load that was
//! superseded or cancelled can therefore never overwrite newer state.

use std::fmt::Display;
use std::future::Future;
use std::sync::{PoisonError, RwLock};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Observable state of a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState<T> {
    /// Nothing requested yet (or the only load was cancelled).
    Idle,
    /// First load in flight.
    Loading,
    /// Latest successful value.
    Loaded(T),
    /// No value yet and the last load failed.
    Failed(String),
}

impl<T> LoadState<T> {
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// Handle for one in-flight load.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    token: CancellationToken,
}

impl LoadTicket {
    /// Token cancelled when this load is superseded or the slot is cancelled.
    #[must_use]
    pub const fn token(&self) -> &CancellationToken {
        &self.token
    }
}

struct SlotInner<T> {
    state: LoadState<T>,
    generation: u64,
    in_flight: Option<CancellationToken>,
    last_error: Option<String>,
}

/// A state slot with load lifecycle and cancellation.
pub struct LoadSlot<T> {
    inner: RwLock<SlotInner<T>>,
}

impl<T> Default for LoadSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LoadSlot<T> {
    /// Create an idle slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: RwLock::new(SlotInner {
                state: LoadState::Idle,
                generation: 0,
                in_flight: None,
                last_error: None,
            }),
        }
    }

    /// Start a new load.
    ///
    /// Cancels any load still in flight. A slot that already holds a value
    /// keeps serving it while the new load runs.
    pub fn begin(&self) -> LoadTicket {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = inner.in_flight.take() {
            previous.cancel();
        }

        inner.generation += 1;
        let token = CancellationToken::new();
        inner.in_flight = Some(token.clone());
        if !inner.state.is_loaded() {
            inner.state = LoadState::Loading;
        }

        LoadTicket {
            generation: inner.generation,
            token,
        }
    }

    /// Record the outcome of the load identified by `ticket`.
    ///
    /// Returns `false` and discards the result if the ticket was superseded
    /// or cancelled. A failure after an earlier success keeps the earlier
    /// value and is only recorded in [`last_error`](Self::last_error).
    pub fn finish<E: Display>(&self, ticket: &LoadTicket, result: Result<T, E>) -> bool {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);

        if ticket.token.is_cancelled() || ticket.generation != inner.generation {
            debug!(
                generation = ticket.generation,
                current = inner.generation,
                "Discarding result of superseded load"
            );
            return false;
        }

        inner.in_flight = None;
        match result {
            Ok(value) => {
                inner.state = LoadState::Loaded(value);
                inner.last_error = None;
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Load failed");
                if !inner.state.is_loaded() {
                    inner.state = LoadState::Failed(message.clone());
                }
                inner.last_error = Some(message);
            }
        }
        true
    }

    /// Cancel the load in flight, if any.
    ///
    /// A slot that never loaded goes back to `Idle`.
    pub fn cancel(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(token) = inner.in_flight.take() {
            token.cancel();
            if matches!(inner.state, LoadState::Loading) {
                inner.state = LoadState::Idle;
            }
        }
    }

    /// Error from the most recent failed load, cleared by the next success.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_error
            .clone()
    }

    /// Drive a complete load: begin, await `fut`, finish.
    ///
    /// Returns early with `false` if the ticket is cancelled before `fut`
    /// completes; the future is dropped at that point.
    pub async fn run<F, E>(&self, fut: F) -> bool
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let ticket = self.begin();
        tokio::select! {
            () = ticket.token.cancelled() => {
                debug!(generation = ticket.generation, "Load cancelled");
                false
            }
            result = fut => self.finish(&ticket, result),
        }
    }
}

impl<T: Clone> LoadSlot<T> {
    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> LoadState<T> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            .clone()
    }

    /// The loaded value, if any.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        match self.state() {
            LoadState::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_new_slot_is_idle() {
        let slot: LoadSlot<u32> = LoadSlot::new();
        assert_eq!(slot.state(), LoadState::Idle);
        assert!(slot.value().is_none());
    }

    #[test]
    fn test_begin_then_finish_ok() {
        let slot = LoadSlot::new();
        let ticket = slot.begin();
        assert_eq!(slot.state(), LoadState::Loading);

        assert!(slot.finish::<String>(&ticket, Ok(7)));
        assert_eq!(slot.state(), LoadState::Loaded(7));
    }

    #[test]
    fn test_first_failure_is_failed_state() {
        let slot: LoadSlot<u32> = LoadSlot::new();
        let ticket = slot.begin();

        assert!(slot.finish(&ticket, Err("connection refused")));
        assert_eq!(
            slot.state(),
            LoadState::Failed("connection refused".to_string())
        );
    }

    #[test]
    fn test_failed_reload_keeps_previous_value() {
        let slot = LoadSlot::new();
        let first = slot.begin();
        slot.finish::<String>(&first, Ok(1));

        let second = slot.begin();
        // Still serving the old value while reloading.
        assert_eq!(slot.state(), LoadState::Loaded(1));
        slot.finish(&second, Err("timeout"));

        assert_eq!(slot.state(), LoadState::Loaded(1));
        assert_eq!(slot.last_error().as_deref(), Some("timeout"));
    }

    #[test]
    fn test_superseded_ticket_cannot_write() {
        let slot = LoadSlot::new();
        let stale = slot.begin();
        let current = slot.begin();

        assert!(stale.token().is_cancelled());
        assert!(!slot.finish::<String>(&stale, Ok(1)));
        assert_eq!(slot.state(), LoadState::Loading);

        assert!(slot.finish::<String>(&current, Ok(2)));
        assert_eq!(slot.state(), LoadState::Loaded(2));
    }

    #[test]
    fn test_cancel_returns_unloaded_slot_to_idle() {
        let slot = LoadSlot::<u32>::new();
        let ticket = slot.begin();

        slot.cancel();

        assert!(ticket.token().is_cancelled());
        assert_eq!(slot.state(), LoadState::Idle);
        assert!(!slot.finish::<String>(&ticket, Ok(3)));
        assert_eq!(slot.state(), LoadState::Idle);
    }

    #[tokio::test]
    async fn test_run_records_result() {
        let slot = LoadSlot::new();
        assert!(slot.run(async { Ok::<_, String>(5) }).await);
        assert_eq!(slot.value(), Some(5));
    }

    #[tokio::test]
    async fn test_run_superseded_by_newer_load() {
        let slot = Arc::new(LoadSlot::new());

        let slow = {
            let slot = Arc::clone(&slot);
            tokio::spawn(async move {
                slot.run(async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok::<_, String>("stale")
                })
                .await
            })
        };

        // Let the slow load register its ticket first.
        tokio::task::yield_now().await;
        while slot.state() != LoadState::Loading {
            tokio::task::yield_now().await;
        }

        assert!(slot.run(async { Ok::<_, String>("fresh") }).await);
        assert!(!slow.await.unwrap());
        assert_eq!(slot.value(), Some("fresh"));
    }
}
