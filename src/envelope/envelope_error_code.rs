use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Specific failure reason carried inside a non-OK reply.
///
/// Distinct from [`RpcStatus`](super::RpcStatus): the status says which class
/// of outcome a reply is, the code says why it failed. Handlers may raise
/// other integer codes; those travel through unchanged and simply fail to
/// convert into this enum.
#[repr(i32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum RpcErrorCode {
    DuplicateMethod = -1,
    MethodNotFound = -2,
    CallError = -3,
    /// The caller's deadline expired before a reply arrived.
    Timeout = -4,
}

impl RpcErrorCode {
    #[inline]
    pub fn value(self) -> i32 {
        self.into()
    }
}
