use super::BoundMethod;
use nanorpc::channel::{request_channel, response_channel};
use nanorpc::envelope::{Envelope, EnvelopeCodec, RpcStatus};
use nanorpc::queue::{QueueTransport, with_connection};
use nanorpc_rpc_service::{
    RpcError, RpcErrorCode, Validators, describe_violations, encode_arguments,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::time::Duration;

/// Defines a generic capability for making RPC calls over a queue transport.
///
/// Any struct that can hand out a [`QueueTransport`] and its reply
/// [`Validators`] gains `apply`, `call` and `invoke` from this trait.
#[async_trait::async_trait]
pub trait RpcServiceCallerInterface: Send + Sync {
    type Transport: QueueTransport;

    // --- METHODS TO BE IMPLEMENTED BY THE STRUCT (e.g., RpcClient) ---

    /// The base connection calls are pushed through.
    fn get_transport(&self) -> &Self::Transport;

    fn get_validators(&self) -> &Validators;

    /// How long to wait for a reply; `None` waits indefinitely.
    fn get_call_timeout(&self) -> Option<Duration>;

    // --- METHODS PROVIDED AUTOMATICALLY BY THE TRAIT ---

    /// Calls `method` on `service` with an already-encoded argument list and
    /// returns the raw result.
    ///
    /// The call is pushed onto the service's request list while a blocking
    /// pop waits on the call's own response list, on a dedicated
    /// connection. Because replies land on a durable list, a reply that
    /// arrives before the pop is issued is still picked up.
    async fn apply(
        &self,
        service: &str,
        method: &str,
        arguments: Vec<Value>,
    ) -> Result<Value, RpcError> {
        let (call, payload) = EnvelopeCodec::encode_call(method, arguments)?;
        let request = request_channel(service);
        let response = response_channel(service, method, &call.id);
        let timeout = self.get_call_timeout();

        tracing::trace!("Call {}:{} issued with id {}", service, method, call.id);

        let transport = self.get_transport();
        let (popped, still_connected) = with_connection(transport, |connection| async move {
            // A failed push abandons the pop instead of waiting on it.
            let (_, popped) = futures::try_join!(
                transport.push(&request, payload),
                connection.blocking_pop(&response, timeout),
            )?;
            Ok::<_, RpcError>((popped, connection.is_ready()))
        })
        .await?;

        let Some(item) = popped else {
            return Err(match timeout {
                Some(timeout) if still_connected => RpcError::new(
                    RpcErrorCode::Timeout,
                    format!("Call {service}:{method} timed out after {timeout:?}"),
                ),
                _ => RpcError::call_error(format!("Call {service}:{method} received null message")),
            });
        };

        let raw = EnvelopeCodec::parse(&item.element)
            .map_err(|e| RpcError::call_error(format!("Call {service}:{method} {e}")))?;

        if let Err(violations) = self.get_validators().validate(method, &raw) {
            return Err(RpcError::call_error(format!(
                "Call {service}:{method} {}",
                describe_violations(&violations)
            )));
        }

        let reply = match EnvelopeCodec::classify(raw) {
            Ok(Envelope::Reply(reply)) => reply,
            Ok(Envelope::Call(_)) => {
                return Err(RpcError::call_error(format!(
                    "Call {service}:{method} received a call instead of a reply"
                )));
            }
            Err(e) => {
                return Err(RpcError::call_error(format!("Call {service}:{method} {e}")));
            }
        };

        if reply.id != call.id {
            tracing::warn!(
                "Call {}:{} expected reply {} but received {}",
                service,
                method,
                call.id,
                reply.id
            );
        }

        if reply.status != RpcStatus::Ok {
            let (code, message) = reply.error.map_or_else(
                || (RpcErrorCode::CallError.value(), "unknown error".to_string()),
                |error| (error.code, error.message),
            );
            return Err(RpcError::with_raw_code(
                code,
                format!("Call {service}:{method} {message}"),
            ));
        }

        Ok(reply.result.unwrap_or(Value::Null))
    }

    /// Calls `method` on `service` with positional `arguments` (a tuple, a
    /// sequence, or `()`), decoding the result into `R`.
    async fn call<A, R>(&self, service: &str, method: &str, arguments: A) -> Result<R, RpcError>
    where
        A: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        let arguments = encode_arguments(arguments)?;
        let result = self.apply(service, method, arguments).await?;

        serde_json::from_value(result).map_err(|e| {
            RpcError::call_error(format!("Call {service}:{method} invalid result: {e}"))
        })
    }

    /// Binds `service` and `method` for repeated calls.
    fn invoke(&self, service: &str, method: &str) -> BoundMethod<Self>
    where
        Self: Clone + Sized,
    {
        BoundMethod::new(self.clone(), service, method)
    }
}
