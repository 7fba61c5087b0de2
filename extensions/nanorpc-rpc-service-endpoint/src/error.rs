use nanorpc_rpc_service::{RpcError, RpcErrorCode};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RpcServiceEndpointError {
    /// Raised locally at registration time; never sent over the wire.
    #[error("{0} method already registered")]
    DuplicateMethod(String),
}

impl From<RpcServiceEndpointError> for RpcError {
    fn from(err: RpcServiceEndpointError) -> Self {
        match err {
            RpcServiceEndpointError::DuplicateMethod(_) => {
                RpcError::new(RpcErrorCode::DuplicateMethod, err.to_string())
            }
        }
    }
}
