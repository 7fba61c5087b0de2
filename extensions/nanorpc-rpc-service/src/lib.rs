mod arguments;
pub use arguments::*;
pub mod constants;
pub use constants::*;
mod rpc_error;
pub use rpc_error::*;
mod validators;
pub use validators::*;

pub use nanorpc::envelope::{RpcErrorCode, RpcStatus};
