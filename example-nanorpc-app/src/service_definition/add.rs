use nanorpc_rpc_service::{RpcError, decode_arguments};
use serde_json::Value;

/// Sums any number of numeric arguments.
pub struct Add;

impl Add {
    pub const METHOD: &'static str = "add";

    pub fn handle(arguments: Vec<Value>) -> Result<f64, RpcError> {
        let numbers: Vec<f64> = decode_arguments(arguments)?;
        Ok(numbers.iter().sum())
    }
}
