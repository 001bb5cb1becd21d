use thiserror::Error;

/// Errors returned by voiceprint operations.
#[derive(Debug, Error)]
pub enum VoiceprintError {
    /// The audio payload could not be parsed.
    #[error("voiceprint: decode error: {0}")]
    Decode(String),

    /// The embedding encoder failed or returned an unusable vector.
    #[error("voiceprint: encoder error: {0}")]
    Encode(String),

    /// The print store failed to read or write.
    #[error("voiceprint: storage error: {0}")]
    Storage(String),

    /// An untargeted match was requested against an empty store.
    #[error("voiceprint: no voiceprints enrolled")]
    NotFound,
}
