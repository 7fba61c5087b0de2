use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

/// Outcome class of a reply, carried on the wire as an integer.
#[repr(u8)]
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum RpcStatus {
    Ok = 0,
    Exception = 1,
    MissingMethod = 2,
}
