mod concurrency_gate;
pub use concurrency_gate::*;

mod rpc_server;
pub use rpc_server::*;

pub use nanorpc_rpc_service_endpoint::{RpcServiceEndpoint, RpcServiceEndpointInterface};
