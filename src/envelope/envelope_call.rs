use crate::utils::generate_call_id;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single remote invocation as it travels on a request list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    /// Correlates the call with its reply; part of the response list name.
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub method: String,
    #[serde(default, alias = "params", deserialize_with = "null_as_empty")]
    pub arguments: Vec<Value>,
}

impl Call {
    /// Creates a call with a freshly generated id.
    pub fn new(method: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            id: generate_call_id(),
            method: method.into(),
            arguments,
        }
    }
}

// Peers are free to mint numeric ids; they are normalized to their decimal text.
pub(crate) fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "call id must be a string or number, got {other}"
        ))),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}
