use super::RpcServiceCallerInterface;
use nanorpc_rpc_service::RpcError;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// A caller with its service and method fixed, as returned by
/// [`RpcServiceCallerInterface::invoke`].
#[derive(Clone)]
pub struct BoundMethod<C> {
    caller: C,
    service: String,
    method: String,
}

impl<C> BoundMethod<C>
where
    C: RpcServiceCallerInterface,
{
    pub fn new(caller: C, service: &str, method: &str) -> Self {
        Self {
            caller,
            service: service.to_string(),
            method: method.to_string(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub async fn apply(&self, arguments: Vec<Value>) -> Result<Value, RpcError> {
        self.caller
            .apply(&self.service, &self.method, arguments)
            .await
    }

    pub async fn call<A, R>(&self, arguments: A) -> Result<R, RpcError>
    where
        A: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        self.caller.call(&self.service, &self.method, arguments).await
    }
}
