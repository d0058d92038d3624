//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning an event into text).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, invalid UTF-8, unknown
    /// event name, missing fields, or wrong field types.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
