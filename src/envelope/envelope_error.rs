/// Why a queue payload could not be turned into an envelope.
///
/// Both variants are soft failures: the server drops such payloads and
/// keeps polling, the client reports them as a failed call.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeDecodeError {
    /// The payload is not valid JSON text.
    #[error("payload is not valid JSON: {0}")]
    InvalidText(#[source] serde_json::Error),

    /// The payload is JSON but has neither a call's nor a reply's shape.
    #[error("payload is not an RPC envelope: {0}")]
    NotAnEnvelope(String),
}

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeEncodeError {
    #[error("failed to serialize envelope: {0}")]
    Serialize(#[from] serde_json::Error),
}
