mod envelope_call;
mod envelope_codec;
mod envelope_error;
mod envelope_error_code;
mod envelope_reply;
mod envelope_status;

pub use envelope_call::Call;
pub use envelope_codec::{Envelope, EnvelopeCodec};
pub use envelope_error::{EnvelopeDecodeError, EnvelopeEncodeError};
pub use envelope_error_code::RpcErrorCode;
pub use envelope_reply::{Reply, ReplyError};
pub use envelope_status::RpcStatus;
