mod rpc_client;
pub use rpc_client::RpcClient;

pub use nanorpc_rpc_service_caller::{BoundMethod, RpcServiceCallerInterface};
