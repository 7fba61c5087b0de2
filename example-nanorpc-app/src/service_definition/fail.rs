use nanorpc_rpc_service::RpcError;
use serde_json::Value;

/// Always fails, carrying its first argument back as the error message.
pub struct Fail;

impl Fail {
    pub const METHOD: &'static str = "fail";

    pub fn handle(arguments: Vec<Value>) -> Result<Value, RpcError> {
        let message = arguments
            .first()
            .and_then(Value::as_str)
            .unwrap_or("failed on purpose");
        Err(RpcError::call_error(message))
    }
}
