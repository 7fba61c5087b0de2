use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// How the poll loop hands calls to their handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Dispatch and keep polling; handlers run in parallel and replies are
    /// written in whatever order they finish.
    #[default]
    Concurrent,

    /// At most one call in flight per server, across all methods. The next
    /// call is not popped until the current one's reply has been written.
    Queued,
}

/// Single-flight gate between the poll loop and dispatched handlers.
///
/// In queued mode the loop takes the only permit before dispatching, hands
/// it to the dispatched task, and then waits for it to come back.
#[derive(Debug, Clone)]
pub enum ConcurrencyGate {
    Concurrent,
    Queued(Arc<Semaphore>),
}

impl ConcurrencyGate {
    pub fn new(mode: DispatchMode) -> Self {
        match mode {
            DispatchMode::Concurrent => Self::Concurrent,
            DispatchMode::Queued => Self::Queued(Arc::new(Semaphore::new(1))),
        }
    }

    /// Takes the gate. The returned permit must be held until the call's
    /// reply has been written.
    pub async fn acquire(&self) -> Option<OwnedSemaphorePermit> {
        match self {
            Self::Concurrent => None,
            // The semaphore is never closed.
            Self::Queued(semaphore) => semaphore.clone().acquire_owned().await.ok(),
        }
    }

    /// Waits until the permit handed out by [`acquire`](Self::acquire) has
    /// been dropped. Returns immediately in concurrent mode.
    pub async fn wait_for_release(&self) {
        if let Self::Queued(semaphore) = self {
            let _released = semaphore.acquire().await;
        }
    }

    pub fn mode(&self) -> DispatchMode {
        match self {
            Self::Concurrent => DispatchMode::Concurrent,
            Self::Queued(_) => DispatchMode::Queued,
        }
    }
}
