use super::{
    BoxError, RpcHandlerFuture, RpcHandlerMap, RpcMethodHandler, error::RpcServiceEndpointError,
};
use futures::FutureExt;
use nanorpc::envelope::{Call, Reply};
use nanorpc_rpc_service::{RpcError, RpcErrorCode};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::PoisonError;
use std::{collections::hash_map::Entry, future::Future, sync::Arc};

#[async_trait::async_trait]
pub trait RpcServiceEndpointInterface: Send + Sync {
    fn get_handlers(&self) -> Arc<RpcHandlerMap>;

    /// Registers an asynchronous handler for `method`.
    ///
    /// Fails with [`RpcServiceEndpointError::DuplicateMethod`] if `method`
    /// already has a handler; the existing registration is left untouched.
    fn register<F, Fut, R, E>(&self, method: &str, handler: F) -> Result<(), RpcServiceEndpointError>
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: Serialize + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        let handlers = self.get_handlers();
        let mut handlers = handlers.write().unwrap_or_else(PoisonError::into_inner);

        match handlers.entry(method.to_string()) {
            Entry::Occupied(_) => Err(RpcServiceEndpointError::DuplicateMethod(
                method.to_string(),
            )),
            Entry::Vacant(entry) => {
                let wrapped = move |arguments: Vec<Value>| -> RpcHandlerFuture {
                    let output = handler(arguments);
                    Box::pin(async move {
                        let output = output.await.map_err(Into::<BoxError>::into)?;
                        let value = serde_json::to_value(output)?;
                        Ok::<Value, BoxError>(value)
                    })
                };
                entry.insert(Arc::new(wrapped));
                tracing::debug!("Registered handler for method `{}`", method);
                Ok(())
            }
        }
    }

    /// Registers a synchronous handler for `method`.
    fn register_sync<F, R, E>(&self, method: &str, handler: F) -> Result<(), RpcServiceEndpointError>
    where
        F: Fn(Vec<Value>) -> Result<R, E> + Send + Sync + 'static,
        R: Serialize + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        self.register(method, move |arguments| {
            std::future::ready(handler(arguments))
        })
    }

    fn lookup(&self, method: &str) -> Option<RpcMethodHandler> {
        self.get_handlers()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .cloned()
    }

    fn is_registered(&self, method: &str) -> bool {
        self.lookup(method).is_some()
    }

    /// Runs `call` through its handler and builds the reply to send back.
    ///
    /// Never fails: an unknown method yields a MissingMethod reply and any
    /// handler failure, including a panic, yields an Exception reply.
    async fn dispatch_call(&self, call: Call) -> Reply {
        match self.lookup(&call.method) {
            Some(handler) => invoke_handler(handler, call).await,
            None => {
                tracing::debug!("No handler registered for method `{}`", call.method);
                Reply::missing_method(call.id)
            }
        }
    }
}

/// Invokes `handler` with the call's arguments and converts the outcome into
/// a reply.
///
/// A handler returning an [`RpcError`] keeps its code; any other error is
/// reported as [`RpcErrorCode::CallError`] with the error's message.
pub async fn invoke_handler(handler: RpcMethodHandler, call: Call) -> Reply {
    let Call {
        id,
        method,
        arguments,
    } = call;

    // The handler may panic before returning its future, or while it is polled.
    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| handler(arguments))) {
        Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
        Err(panic) => Err(panic),
    };

    match outcome {
        Ok(Ok(value)) => Reply::ok(id, value),
        Ok(Err(err)) => match err.downcast::<RpcError>() {
            Ok(rpc_error) => Reply::exception(id, rpc_error.code, rpc_error.message),
            Err(err) => Reply::exception(id, RpcErrorCode::CallError.value(), err.to_string()),
        },
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!("Handler for method `{}` panicked: {}", method, message);
            Reply::exception(
                id,
                RpcErrorCode::CallError.value(),
                format!("handler panicked: {message}"),
            )
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic payload".to_string()
    }
}
