use super::RpcServiceEndpointInterface;
use serde_json::Value;
use std::collections::HashMap;
use std::{
    future::Future,
    pin::Pin,
    sync::{Arc, RwLock},
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The single effect type every handler is normalized into, whether it was
/// registered as synchronous or asynchronous.
pub type RpcHandlerFuture = Pin<Box<dyn Future<Output = Result<Value, BoxError>> + Send>>;

pub type RpcMethodHandler = Arc<dyn Fn(Vec<Value>) -> RpcHandlerFuture + Send + Sync>;

pub type RpcHandlerMap = RwLock<HashMap<String, RpcMethodHandler>>;

/// A concrete, append-only registry of method handlers.
pub struct RpcServiceEndpoint {
    handlers: Arc<RpcHandlerMap>,
}

impl Default for RpcServiceEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

impl RpcServiceEndpoint {
    /// Creates an endpoint with no registered methods.
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl RpcServiceEndpointInterface for RpcServiceEndpoint {
    fn get_handlers(&self) -> Arc<RpcHandlerMap> {
        self.handlers.clone()
    }
}
