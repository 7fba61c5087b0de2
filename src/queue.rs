mod memory_queue;
mod queue_error;
mod queue_transport;
mod with_connection;

pub use memory_queue::MemoryQueue;
pub use queue_error::QueueError;
pub use queue_transport::{QueueItem, QueueTransport};
pub use with_connection::with_connection;
