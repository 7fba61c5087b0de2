#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The operation needs a live connection and this one is not connected.
    #[error("queue connection is not connected")]
    NotConnected,

    /// Any failure reported by the backing store itself.
    #[error("queue backend error: {0}")]
    Backend(String),
}
