use nanorpc_rpc_service::{RpcError, decode_arguments};
use serde_json::Value;

/// Multiplies any number of numeric arguments.
pub struct Mult;

impl Mult {
    pub const METHOD: &'static str = "mult";

    pub async fn handle(arguments: Vec<Value>) -> Result<f64, RpcError> {
        let numbers: Vec<f64> = decode_arguments(arguments)?;
        Ok(numbers.iter().product())
    }
}
