use crate::envelope::{Call, EnvelopeDecodeError, EnvelopeEncodeError, Reply};
use serde_json::Value;

/// Either side of an exchange, as recovered from a queue payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Call(Call),
    Reply(Reply),
}

/// Converts calls and replies to and from the UTF-8 JSON text carried by
/// queue payloads.
///
/// Decoding never panics. Anything that is not recognisably a call or a
/// reply comes back as an [`EnvelopeDecodeError`], which the poll loop
/// treats as noise.
pub struct EnvelopeCodec;

impl EnvelopeCodec {
    /// Builds a call with a fresh id and encodes it.
    ///
    /// # Returns
    ///
    /// The call itself (so the caller knows which response list to watch)
    /// together with its wire text.
    pub fn encode_call(
        method: &str,
        arguments: Vec<Value>,
    ) -> Result<(Call, String), EnvelopeEncodeError> {
        let call = Call::new(method, arguments);
        let text = serde_json::to_string(&call)?;
        Ok((call, text))
    }

    pub fn encode_reply(reply: &Reply) -> Result<String, EnvelopeEncodeError> {
        Ok(serde_json::to_string(reply)?)
    }

    pub fn encode(envelope: &Envelope) -> Result<String, EnvelopeEncodeError> {
        match envelope {
            Envelope::Call(call) => Ok(serde_json::to_string(call)?),
            Envelope::Reply(reply) => Self::encode_reply(reply),
        }
    }

    /// Parses payload text into an untyped JSON value.
    ///
    /// Validators run against this raw value, before it is classified.
    pub fn parse(text: &str) -> Result<Value, EnvelopeDecodeError> {
        serde_json::from_str(text).map_err(EnvelopeDecodeError::InvalidText)
    }

    /// Classifies a parsed value as a call or a reply.
    ///
    /// An object with a `method` field is a call, and the field must be a
    /// string. Anything else is tried as a reply.
    pub fn classify(value: Value) -> Result<Envelope, EnvelopeDecodeError> {
        let Some(object) = value.as_object() else {
            return Err(EnvelopeDecodeError::NotAnEnvelope(
                "expected a JSON object".to_string(),
            ));
        };
        let method_is_string = object.get("method").map(Value::is_string);

        match method_is_string {
            Some(true) => serde_json::from_value(value)
                .map(Envelope::Call)
                .map_err(|e| EnvelopeDecodeError::NotAnEnvelope(e.to_string())),
            Some(false) => Err(EnvelopeDecodeError::NotAnEnvelope(
                "`method` is not a string".to_string(),
            )),
            None => serde_json::from_value(value)
                .map(Envelope::Reply)
                .map_err(|e| EnvelopeDecodeError::NotAnEnvelope(e.to_string())),
        }
    }

    pub fn decode(text: &str) -> Result<Envelope, EnvelopeDecodeError> {
        Self::classify(Self::parse(text)?)
    }

    /// Decodes text that must be a call.
    pub fn decode_call(text: &str) -> Result<Call, EnvelopeDecodeError> {
        match Self::decode(text)? {
            Envelope::Call(call) => Ok(call),
            Envelope::Reply(_) => Err(EnvelopeDecodeError::NotAnEnvelope(
                "expected a call, found a reply".to_string(),
            )),
        }
    }

    /// Decodes text that must be a reply.
    pub fn decode_reply(text: &str) -> Result<Reply, EnvelopeDecodeError> {
        match Self::decode(text)? {
            Envelope::Reply(reply) => Ok(reply),
            Envelope::Call(_) => Err(EnvelopeDecodeError::NotAnEnvelope(
                "expected a reply, found a call".to_string(),
            )),
        }
    }
}
