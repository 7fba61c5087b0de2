use nanorpc::queue::QueueTransport;
use nanorpc_rpc_service::{DEFAULT_CALL_TIMEOUT, RpcError, Validators};
use nanorpc_rpc_service_caller::RpcServiceCallerInterface;
use std::sync::Arc;
use std::time::Duration;

/// Issues calls to NanoRPC services through a queue transport.
///
/// A client built with [`RpcClient::new`] owns ("maintains") its base
/// connection and opens and closes it through [`connect`](Self::connect)
/// and [`close`](Self::close). One built with
/// [`with_shared_transport`](Self::with_shared_transport) borrows a
/// connection managed elsewhere and leaves its lifecycle alone.
///
/// Cloning is cheap; clones share the transport and the validators.
pub struct RpcClient<T: QueueTransport> {
    transport: Arc<T>,
    validators: Validators,
    call_timeout: Option<Duration>,
    maintained: bool,
}

impl<T: QueueTransport> Clone for RpcClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            validators: self.validators.clone(),
            call_timeout: self.call_timeout,
            maintained: self.maintained,
        }
    }
}

impl<T: QueueTransport> RpcClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            validators: Validators::new(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            maintained: true,
        }
    }

    pub fn with_shared_transport(transport: Arc<T>) -> Self {
        Self {
            transport,
            validators: Validators::new(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            maintained: false,
        }
    }

    /// Gives up on calls whose reply has not arrived within `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    /// Reply validators, keyed by method name.
    pub fn validators(&self) -> &Validators {
        &self.validators
    }

    pub fn transport(&self) -> Arc<T> {
        self.transport.clone()
    }

    pub fn is_maintained(&self) -> bool {
        self.maintained
    }

    pub async fn connect(&self) -> Result<(), RpcError> {
        if self.maintained {
            self.transport.connect().await?;
            tracing::info!("RPC client connected");
        }
        Ok(())
    }

    pub async fn close(&self) -> Result<(), RpcError> {
        if self.maintained {
            self.transport.disconnect().await?;
            tracing::info!("RPC client closed");
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl<T: QueueTransport> RpcServiceCallerInterface for RpcClient<T> {
    type Transport = T;

    fn get_transport(&self) -> &Self::Transport {
        &self.transport
    }

    fn get_validators(&self) -> &Validators {
        &self.validators
    }

    fn get_call_timeout(&self) -> Option<Duration> {
        self.call_timeout
    }
}
