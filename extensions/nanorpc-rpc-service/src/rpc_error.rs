use nanorpc::envelope::{EnvelopeDecodeError, EnvelopeEncodeError, ReplyError, RpcErrorCode};
use nanorpc::queue::QueueError;

/// A structured RPC failure: a numeric code plus a message.
///
/// This is what callers receive for every failed call, and it is also the
/// error a handler can return to choose the code carried back to the
/// caller. Codes outside [`RpcErrorCode`] are preserved as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (code {code})")]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcError {
    pub fn new(code: RpcErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.value(),
            message: message.into(),
        }
    }

    pub fn with_raw_code(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn call_error(message: impl Into<String>) -> Self {
        Self::new(RpcErrorCode::CallError, message)
    }

    /// The code as a known [`RpcErrorCode`], if it is one.
    pub fn error_code(&self) -> Option<RpcErrorCode> {
        RpcErrorCode::try_from(self.code).ok()
    }

    pub fn is(&self, code: RpcErrorCode) -> bool {
        self.code == code.value()
    }
}

impl From<ReplyError> for RpcError {
    fn from(err: ReplyError) -> Self {
        Self::with_raw_code(err.code, err.message)
    }
}

impl From<QueueError> for RpcError {
    fn from(err: QueueError) -> Self {
        Self::call_error(err.to_string())
    }
}

impl From<EnvelopeEncodeError> for RpcError {
    fn from(err: EnvelopeEncodeError) -> Self {
        Self::call_error(err.to_string())
    }
}

impl From<EnvelopeDecodeError> for RpcError {
    fn from(err: EnvelopeDecodeError) -> Self {
        Self::call_error(err.to_string())
    }
}
