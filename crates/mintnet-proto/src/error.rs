//! Protocol error types.

use thiserror::Error;

/// Errors raised while encoding, decoding or parsing shared types.
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Entity ID was not 32 hex characters.
    #[error("invalid entity id: {0}")]
    InvalidId(String),

    /// Unknown entity kind name.
    #[error("unknown entity kind: {0}")]
    UnknownKind(String),
}
