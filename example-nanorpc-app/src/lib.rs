pub mod service_definition;

use nanorpc::queue::QueueTransport;
use nanorpc_rpc_service::RpcError;
use nanorpc_tokio_rpc_server::RpcServer;
use service_definition::{Add, Fail, Mult};

/// Registers every calculator method on `server`.
pub fn register_calculator<T: QueueTransport>(server: &RpcServer<T>) -> Result<(), RpcError> {
    server
        .on_sync(Add::METHOD, Add::handle)?
        .on(Mult::METHOD, Mult::handle)?
        .on_sync(Fail::METHOD, Fail::handle)?;
    Ok(())
}
