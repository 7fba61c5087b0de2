//! Note: This `RpcServer` does not authenticate callers. Anything able to
//! push onto a service's request list can invoke its methods, so it is best
//! suited to a queue reachable only by trusted processes.

use super::{ConcurrencyGate, DispatchMode};
use nanorpc::channel::{request_channel, response_channel};
use nanorpc::envelope::{Call, Envelope, EnvelopeCodec, Reply};
use nanorpc::queue::{QueueTransport, with_connection};
use nanorpc_rpc_service::{
    DEFAULT_POLL_TIMEOUT, RpcError, Validators, describe_violations,
};
use nanorpc_rpc_service_endpoint::{BoxError, RpcServiceEndpoint, RpcServiceEndpointInterface};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Serves the methods registered on it to any caller pushing onto
/// `NanoRPCs:<name>`.
///
/// Several servers may share one name; the queue hands each call to exactly
/// one of them.
pub struct RpcServer<T: QueueTransport> {
    name: String,
    transport: Arc<T>,
    endpoint: Arc<RpcServiceEndpoint>,
    validators: Validators,
    poll_timeout: Duration,
    maintained: bool,
}

impl<T: QueueTransport> RpcServer<T> {
    /// Creates a server that owns its base connection.
    pub fn new(name: &str, transport: T) -> Self {
        Self::build(name, Arc::new(transport), true)
    }

    /// Creates a server on a connection whose lifecycle is managed elsewhere.
    pub fn with_shared_transport(name: &str, transport: Arc<T>) -> Self {
        Self::build(name, transport, false)
    }

    fn build(name: &str, transport: Arc<T>, maintained: bool) -> Self {
        Self {
            name: name.to_string(),
            transport,
            endpoint: Arc::new(RpcServiceEndpoint::new()),
            validators: Validators::new(),
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            maintained,
        }
    }

    /// Bounds each blocking pop, and therefore how long `stop` may take to
    /// be noticed.
    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns an `Arc` clone of the underlying method registry.
    pub fn endpoint(&self) -> Arc<RpcServiceEndpoint> {
        self.endpoint.clone()
    }

    /// Call validators, keyed by method name.
    pub fn validators(&self) -> &Validators {
        &self.validators
    }

    /// Registers an asynchronous handler for `method`.
    ///
    /// Fails with a DuplicateMethod error if `method` is already registered.
    /// Returns `self` so registrations can be chained.
    pub fn on<F, Fut, R, E>(&self, method: &str, handler: F) -> Result<&Self, RpcError>
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Serialize + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        self.endpoint.register(method, handler)?;
        Ok(self)
    }

    /// Registers a synchronous handler for `method`.
    pub fn on_sync<F, R, E>(&self, method: &str, handler: F) -> Result<&Self, RpcError>
    where
        F: Fn(Vec<Value>) -> Result<R, E> + Send + Sync + 'static,
        R: Serialize + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        self.endpoint.register_sync(method, handler)?;
        Ok(self)
    }

    pub async fn connect(&self) -> Result<(), RpcError> {
        if self.maintained {
            self.transport.connect().await?;
            tracing::info!("Server {} connected", self.name);
        }
        Ok(())
    }

    pub async fn close(&self) -> Result<(), RpcError> {
        if self.maintained {
            self.transport.disconnect().await?;
            tracing::info!("Server {} closed", self.name);
        }
        Ok(())
    }

    /// Starts polling for calls in the background.
    ///
    /// Resolves once the poll loop holds its dedicated connection. The
    /// returned handle stops the loop and, for a server that owns its
    /// connection, closes it.
    pub async fn run(&self, mode: DispatchMode) -> Result<RpcServerHandle<T>, RpcError> {
        if !self.transport.is_ready() {
            tracing::warn!(
                "Server {} is starting before its base connection is ready; replies will fail until it connects",
                self.name
            );
        }

        let running = Arc::new(AtomicBool::new(true));
        let poller = Poller {
            name: self.name.clone(),
            transport: self.transport.clone(),
            endpoint: self.endpoint.clone(),
            validators: self.validators.clone(),
            poll_timeout: self.poll_timeout,
            running: running.clone(),
            gate: ConcurrencyGate::new(mode),
        };

        let (ready_tx, ready_rx) = oneshot::channel::<()>();
        let base = self.transport.clone();
        let mut task = tokio::spawn(async move {
            with_connection(&*base, move |connection| async move {
                let _ = ready_tx.send(());
                poller.poll(connection).await;
                Ok::<(), RpcError>(())
            })
            .await
        });

        if ready_rx.await.is_err() {
            running.store(false, Ordering::Release);
            return Err(match (&mut task).await {
                Ok(Err(err)) => err,
                Ok(Ok(())) => RpcError::call_error(format!(
                    "Server {} stopped before it started polling",
                    self.name
                )),
                Err(err) => RpcError::call_error(format!("Server {} failed: {err}", self.name)),
            });
        }

        tracing::info!("Server {} running in {:?} mode", self.name, mode);

        Ok(RpcServerHandle {
            name: self.name.clone(),
            running,
            task: Some(task),
            transport: self.transport.clone(),
            maintained: self.maintained,
        })
    }
}

/// Controls a running poll loop. Dropping the handle signals the loop to
/// stop without waiting for it.
pub struct RpcServerHandle<T: QueueTransport> {
    name: String,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<Result<(), RpcError>>>,
    transport: Arc<T>,
    maintained: bool,
}

impl<T: QueueTransport> RpcServerHandle<T> {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
            && self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stops accepting calls and waits for the poll loop to exit.
    ///
    /// Handlers already dispatched in concurrent mode are left to finish on
    /// their own. The base connection is closed if the server owns it.
    pub async fn stop(mut self) -> Result<(), RpcError> {
        self.running.store(false, Ordering::Release);

        if let Some(task) = self.task.take() {
            match task.await {
                Ok(result) => result?,
                Err(err) => {
                    tracing::error!("Server {} poll loop failed: {}", self.name, err);
                }
            }
        }

        if self.maintained {
            self.transport.disconnect().await?;
        }

        tracing::info!("Server {} stopped", self.name);
        Ok(())
    }
}

impl<T: QueueTransport> Drop for RpcServerHandle<T> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// State moved into the background poll task.
struct Poller<T: QueueTransport> {
    name: String,
    transport: Arc<T>,
    endpoint: Arc<RpcServiceEndpoint>,
    validators: Validators,
    poll_timeout: Duration,
    running: Arc<AtomicBool>,
    gate: ConcurrencyGate,
}

impl<T: QueueTransport> Poller<T> {
    async fn poll(self, connection: Arc<T>) {
        let request = request_channel(&self.name);
        tracing::debug!("Server {} polling {}", self.name, request);

        while self.running.load(Ordering::Acquire) {
            let item = match connection
                .blocking_pop(&request, Some(self.poll_timeout))
                .await
            {
                Ok(Some(item)) => item,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!("Server {} failed to pop {}: {}", self.name, request, err);
                    tokio::time::sleep(self.poll_timeout).await;
                    continue;
                }
            };

            let Some(call) = self.accept(&item.element) else {
                continue;
            };

            let channel = response_channel(&self.name, &call.method, &call.id);
            let permit = self.gate.acquire().await;
            let endpoint = self.endpoint.clone();
            let transport = self.transport.clone();

            // Unknown methods get a MissingMethod reply from the endpoint.
            tokio::spawn(async move {
                let reply = endpoint.dispatch_call(call).await;
                publish_reply(&*transport, &channel, &reply).await;
                drop(permit);
            });

            self.gate.wait_for_release().await;
        }

        tracing::debug!("Server {} stopped polling {}", self.name, request);
    }

    /// Decodes and validates a popped payload. Anything that is not an
    /// acceptable call is logged and dropped without a reply.
    fn accept(&self, element: &str) -> Option<Call> {
        let raw = match EnvelopeCodec::parse(element) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(
                    "Server {} discarded a {}-byte payload: {}",
                    self.name,
                    element.len(),
                    err
                );
                return None;
            }
        };

        let call = match EnvelopeCodec::classify(raw.clone()) {
            Ok(Envelope::Call(call)) => call,
            Ok(Envelope::Reply(reply)) => {
                tracing::warn!(
                    "Server {} discarded reply {} found on its request list",
                    self.name,
                    reply.id
                );
                return None;
            }
            Err(err) => {
                tracing::warn!(
                    "Server {} discarded a {}-byte payload: {}",
                    self.name,
                    element.len(),
                    err
                );
                return None;
            }
        };

        if let Err(violations) = self.validators.validate(&call.method, &raw) {
            tracing::warn!(
                "Server {} discarded invalid call {} to `{}`:\n{}",
                self.name,
                call.id,
                call.method,
                describe_violations(&violations)
            );
            return None;
        }

        Some(call)
    }
}

async fn publish_reply<T: QueueTransport>(transport: &T, channel: &str, reply: &Reply) {
    let payload = match EnvelopeCodec::encode_reply(reply) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::error!("Failed to encode reply {}: {}", reply.id, err);
            return;
        }
    };

    if let Err(err) = transport.push(channel, payload).await {
        tracing::error!("Failed to publish reply to {}: {}", channel, err);
    }
}
