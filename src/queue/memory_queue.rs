use super::{QueueError, QueueItem, QueueTransport};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct MemoryStore {
    lists: Mutex<HashMap<String, VecDeque<String>>>,
    pushed: Notify,
    shut_down: AtomicBool,
}

#[derive(Debug, Default)]
struct ConnectionState {
    connected: AtomicBool,
    closed: Notify,
}

/// An in-process list store with the semantics of [`QueueTransport`].
///
/// Every handle created through [`duplicate`](QueueTransport::duplicate)
/// shares the same lists but has its own connection state, mirroring how a
/// networked client duplicates its connection. Cloning a handle shares both
/// the lists and the connection.
#[derive(Debug, Clone, Default)]
pub struct MemoryQueue {
    store: Arc<MemoryStore>,
    connection: Arc<ConnectionState>,
}

impl MemoryQueue {
    /// Creates an empty store and a disconnected handle to it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements currently waiting in `channel`.
    pub fn list_len(&self, channel: &str) -> usize {
        self.store
            .lists
            .lock()
            .map(|lists| lists.get(channel).map_or(0, VecDeque::len))
            .unwrap_or(0)
    }

    /// Takes the whole store offline, as if the backend went away.
    ///
    /// No handle is ready afterwards, and pops waiting on any of them return
    /// `Ok(None)`.
    pub fn shutdown(&self) {
        self.store.shut_down.store(true, Ordering::Release);
        self.store.pushed.notify_waiters();
    }

    fn try_pop(&self, channel: &str) -> Result<Option<String>, QueueError> {
        let mut lists = self
            .store
            .lists
            .lock()
            .map_err(|_| QueueError::Backend("memory store lock poisoned".to_string()))?;

        let Some(list) = lists.get_mut(channel) else {
            return Ok(None);
        };
        let element = list.pop_front();
        if list.is_empty() {
            lists.remove(channel);
        }

        Ok(element)
    }
}

#[async_trait::async_trait]
impl QueueTransport for MemoryQueue {
    async fn connect(&self) -> Result<(), QueueError> {
        if self.store.shut_down.load(Ordering::Acquire) {
            return Err(QueueError::Backend("memory store is shut down".to_string()));
        }
        self.connection.connected.store(true, Ordering::Release);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), QueueError> {
        self.connection.connected.store(false, Ordering::Release);
        // Wake any pop still parked on this connection.
        self.connection.closed.notify_waiters();
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.connection.connected.load(Ordering::Acquire)
            && !self.store.shut_down.load(Ordering::Acquire)
    }

    async fn push(&self, channel: &str, element: String) -> Result<usize, QueueError> {
        if !self.is_ready() {
            return Err(QueueError::NotConnected);
        }

        let len = {
            let mut lists = self
                .store
                .lists
                .lock()
                .map_err(|_| QueueError::Backend("memory store lock poisoned".to_string()))?;
            let list = lists.entry(channel.to_string()).or_default();
            list.push_back(element);
            list.len()
        };

        self.store.pushed.notify_waiters();
        Ok(len)
    }

    async fn blocking_pop(
        &self,
        channel: &str,
        timeout: Option<Duration>,
    ) -> Result<Option<QueueItem>, QueueError> {
        if !self.is_ready() {
            return Err(QueueError::NotConnected);
        }

        let deadline = timeout.map(|timeout| Instant::now() + timeout);

        loop {
            // Register interest before looking at the list so a push that
            // lands in between is not missed.
            let pushed = self.store.pushed.notified();
            let closed = self.connection.closed.notified();
            tokio::pin!(pushed, closed);
            pushed.as_mut().enable();
            closed.as_mut().enable();

            if !self.is_ready() {
                return Ok(None);
            }

            if let Some(element) = self.try_pop(channel)? {
                return Ok(Some(QueueItem {
                    channel: channel.to_string(),
                    element,
                }));
            }

            let expired = async {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = &mut pushed => continue,
                _ = &mut closed => return Ok(None),
                _ = expired => return Ok(None),
            }
        }
    }

    fn duplicate(&self) -> Self {
        Self {
            store: self.store.clone(),
            connection: Arc::new(ConnectionState::default()),
        }
    }
}
