use super::{RpcErrorCode, RpcStatus, envelope_call::id_from_string_or_number};
use crate::constants::{REPLY_MISSING_METHOD_MESSAGE, REPLY_OK_MESSAGE};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Failure details carried by a non-OK reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyError {
    pub code: i32,
    pub message: String,
}

/// The answer to a [`Call`](super::Call), pushed onto the call's response list.
///
/// `result` is present iff `status` is [`RpcStatus::Ok`]; `error` is present
/// iff it is not. The constructors below are the only way the server builds
/// replies, which keeps that invariant intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(alias = "code")]
    pub status: RpcStatus,
    #[serde(default)]
    pub message: String,
    #[serde(
        default,
        alias = "value",
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReplyError>,
}

impl Reply {
    pub fn ok(id: impl Into<String>, result: Value) -> Self {
        Self {
            id: id.into(),
            status: RpcStatus::Ok,
            message: REPLY_OK_MESSAGE.to_string(),
            result: Some(result),
            error: None,
        }
    }

    pub fn exception(id: impl Into<String>, code: i32, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            id: id.into(),
            status: RpcStatus::Exception,
            message: message.clone(),
            result: None,
            error: Some(ReplyError { code, message }),
        }
    }

    pub fn missing_method(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: RpcStatus::MissingMethod,
            message: REPLY_MISSING_METHOD_MESSAGE.to_string(),
            result: None,
            error: Some(ReplyError {
                code: RpcErrorCode::MethodNotFound.value(),
                message: REPLY_MISSING_METHOD_MESSAGE.to_string(),
            }),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == RpcStatus::Ok
    }
}

// An explicit `null` result is still a result.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
