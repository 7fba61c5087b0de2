use crate::RpcError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decodes a call's ordered arguments into a typed value, usually a tuple.
///
/// ```rust
/// use nanorpc_rpc_service::decode_arguments;
/// use serde_json::json;
///
/// let (a, b): (i64, i64) = decode_arguments(vec![json!(2), json!(3)]).unwrap();
/// assert_eq!(a + b, 5);
/// ```
pub fn decode_arguments<T>(arguments: Vec<Value>) -> Result<T, RpcError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(Value::Array(arguments))
        .map_err(|e| RpcError::call_error(format!("invalid arguments: {e}")))
}

/// Encodes caller-side arguments into the ordered sequence a call carries.
///
/// Tuples and sequences become their elements, and `()` becomes no
/// arguments. Anything else is rejected, since a call's arguments are
/// always positional.
pub fn encode_arguments<A>(arguments: A) -> Result<Vec<Value>, RpcError>
where
    A: Serialize,
{
    match serde_json::to_value(arguments) {
        Ok(Value::Array(values)) => Ok(values),
        Ok(Value::Null) => Ok(Vec::new()),
        Ok(other) => Err(RpcError::call_error(format!(
            "arguments must serialize to a sequence, got {other}"
        ))),
        Err(e) => Err(RpcError::call_error(format!("invalid arguments: {e}"))),
    }
}
