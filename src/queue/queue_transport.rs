use super::QueueError;
use std::time::Duration;

/// An element popped from a named list, together with the list it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueItem {
    pub channel: String,
    pub element: String,
}

/// The durable list store that calls and replies travel through.
///
/// Implementations provide Redis-style list semantics: `push` appends to
/// the tail of a named list, `blocking_pop` removes from the head, and when
/// several consumers wait on the same list exactly one of them receives
/// each element.
///
/// A blocking pop ties up the connection it runs on. Callers that need to
/// keep using the store while they wait must pop on a connection obtained
/// from [`duplicate`](QueueTransport::duplicate); see
/// [`with_connection`](super::with_connection).
#[async_trait::async_trait]
pub trait QueueTransport: Send + Sync + 'static {
    async fn connect(&self) -> Result<(), QueueError>;

    async fn disconnect(&self) -> Result<(), QueueError>;

    fn is_ready(&self) -> bool;

    /// Appends `element` to `channel`, returning the list's new length.
    async fn push(&self, channel: &str, element: String) -> Result<usize, QueueError>;

    /// Removes the head of `channel`, waiting for one to arrive if the list
    /// is empty.
    ///
    /// `None` waits indefinitely. Returns `Ok(None)` when the timeout
    /// elapses or the connection is closed while waiting.
    async fn blocking_pop(
        &self,
        channel: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<QueueItem>, QueueError>;

    /// A fresh, initially disconnected, logical connection to the same store.
    fn duplicate(&self) -> Self
    where
        Self: Sized;
}
