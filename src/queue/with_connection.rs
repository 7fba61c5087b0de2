use super::{QueueError, QueueTransport};
use std::future::Future;
use std::sync::Arc;

/// Runs `f` on a dedicated connection duplicated from `base`.
///
/// The connection is opened before `f` runs and disconnected after its
/// future completes, whether it succeeded or not. Long blocking pops go
/// through here so they never stall traffic on the base connection.
///
/// If the returned future is dropped before it completes, the connection
/// is disconnected on a spawned task instead.
pub async fn with_connection<T, F, Fut, R, E>(base: &T, f: F) -> Result<R, E>
where
    T: QueueTransport,
    F: FnOnce(Arc<T>) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: From<QueueError>,
{
    let guard = DisconnectGuard::new(Arc::new(base.duplicate()));
    guard.connection().connect().await?;

    let result = f(guard.connection().clone()).await;

    if let Err(err) = guard.connection().disconnect().await {
        tracing::warn!("Failed to disconnect dedicated queue connection: {}", err);
    }
    guard.disarm();

    result
}

/// Disconnects its connection when dropped, unless disarmed first.
struct DisconnectGuard<T: QueueTransport> {
    connection: Arc<T>,
    armed: bool,
}

impl<T: QueueTransport> DisconnectGuard<T> {
    fn new(connection: Arc<T>) -> Self {
        Self {
            connection,
            armed: true,
        }
    }

    fn connection(&self) -> &Arc<T> {
        &self.connection
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T: QueueTransport> Drop for DisconnectGuard<T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let connection = self.connection.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                runtime.spawn(async move {
                    if let Err(err) = connection.disconnect().await {
                        tracing::warn!(
                            "Failed to disconnect abandoned queue connection: {}",
                            err
                        );
                    }
                });
            }
            Err(_) => {
                tracing::warn!("Dedicated queue connection dropped outside a runtime; left open");
            }
        }
    }
}
