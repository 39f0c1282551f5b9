//! Error types for encoding and decoding.

use crate::format::tag::TagKind;

/// Errors that can occur while encoding or decoding a value stream.
#[derive(Debug, thiserror::Error)]
pub enum SeriError {
    #[error("aggregate nesting exceeds maximum depth of {max_depth}")]
    DepthExceeded { max_depth: usize },

    #[error("unsupported value: {0}")]
    UnsupportedValue(String),

    #[error("invalid serialize stream at offset {offset} ({remaining} bytes remaining): {fault}")]
    InvalidStream {
        offset: usize,
        remaining: usize,
        fault: StreamFault,
    },
}

/// What the decoder found wrong with a stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamFault {
    #[error("need {needed} bytes for {context}")]
    Underflow { needed: usize, context: &'static str },

    #[error("unknown type code {0}")]
    UnknownType(u8),

    #[error("auxiliary value {aux} is not valid for {kind:?}")]
    BadAux { kind: TagKind, aux: u8 },

    #[error("invalid array length: {0}")]
    BadArrayLength(String),

    #[error("aggregate nesting exceeds maximum depth of {max_depth}")]
    TooDeep { max_depth: usize },
}

impl SeriError {
    /// Returns the stream fault if this is a decode-time error.
    pub fn fault(&self) -> Option<&StreamFault> {
        match self {
            Self::InvalidStream { fault, .. } => Some(fault),
            _ => None,
        }
    }

    /// Returns true if this error was raised by the decoder.
    pub fn is_invalid_stream(&self) -> bool {
        matches!(self, Self::InvalidStream { .. })
    }
}
