//! Page-ready gate: the render sequence runs at most once per page load.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// Loading progress of a page, in the order a page moves through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

/// One page load.
#[derive(Debug)]
pub struct PageLoad {
    state: watch::Sender<ReadyState>,
    fired: AtomicBool,
}

impl PageLoad {
    pub fn new(initial: ReadyState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            fired: AtomicBool::new(false),
        }
    }

    pub fn ready_state(&self) -> ReadyState {
        *self.state.borrow()
    }

    /// Moves the page forward; going back to an earlier state is ignored.
    pub fn advance(&self, next: ReadyState) {
        self.state.send_if_modified(|current| {
            if next > *current {
                tracing::trace!(from = ?*current, to = ?next, "Page ready state changed");
                *current = next;
                true
            } else {
                false
            }
        });
    }

    /// Runs `f` once the page is interactive, immediately if it already is.
    ///
    /// Only the first caller per page load gets to run; every later call
    /// returns `None` without invoking `f`.
    pub async fn on_ready<F, Fut>(&self, f: F) -> Option<Fut::Output>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        let mut rx = self.state.subscribe();
        rx.wait_for(|state| *state != ReadyState::Loading).await.ok()?;

        if self.fired.swap(true, Ordering::AcqRel) {
            tracing::debug!("Ready listener already fired for this page load");
            return None;
        }

        Some(f().await)
    }

    /// Whether the ready listener has fired.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}
