use crate::SchemaType;

/// Errors raised by every fallible operation of the crate.
///
/// None of these are transient: each one reports a logic or input error
/// and is returned synchronously to the immediate caller.
#[derive(Debug, thiserror::Error)]
pub enum HeError {
    /// A value lies outside the representable plaintext or ciphertext range.
    #[error("[Domain error] {0}")]
    Domain(String),

    /// Operands are bound to different public keys.
    #[error("[Key mismatch] {0}")]
    KeyMismatch(String),

    /// The operation is not supported by the scheme or the data layout.
    #[error("[Unsupported operation] {0}")]
    UnsupportedOperation(String),

    /// Encoder output exceeds the plaintext bound.
    #[error("[Encoding overflow] {0}")]
    EncodingOverflow(String),

    /// Array dimensions or indices are invalid.
    #[error("[Shape error] {0}")]
    Shape(String),

    /// The right hand side of a slice assignment cannot be broadcast.
    #[error("[Broadcast error] {0}")]
    Broadcast(String),

    /// Schema name not recognized.
    #[error("[Unknown schema] '{0}', supported schemas: {}", SchemaType::all().iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", "))]
    UnknownSchema(String),

    /// Big integer does not fit the requested fixed width.
    #[error("[Range error] {0}")]
    Range(String),

    /// Bad parameter, e.g. a key size below the scheme minimum.
    #[error("[Invalid argument] {0}")]
    InvalidArgument(String),

    /// Malformed serialized bytes.
    #[error("[Serialization error] {0}")]
    Serialization(String),

    /// Stream failure while (de)serializing.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, HeError>;
