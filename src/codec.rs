//! Top-level encode/decode entry points and their configuration.

use bytes::Bytes;

use crate::buffer::{ReadCursor, WriteBuffer};
use crate::error::SeriError;
use crate::format::{decode_value, encode_value};
use crate::types::Value;

pub use crate::buffer::writer::BLOCK_SIZE;

/// Default maximum aggregate nesting depth.
pub const MAX_DEPTH: usize = 32;

/// Encoder/decoder configuration.
///
/// ```
/// use seri::{Codec, Value};
///
/// let codec = Codec::builder().block_size(256);
/// let bytes = codec.encode(&[Value::Integer(7), Value::from("seven")]).unwrap();
/// assert_eq!(codec.decode(&bytes).unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    max_depth: usize,
    block_size: usize,
}

impl Codec {
    /// Creates a codec builder with the default limits.
    pub fn builder() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            block_size: BLOCK_SIZE,
        }
    }

    /// Sets the maximum aggregate nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the write buffer block size (clamped to at least 1).
    pub fn block_size(mut self, size: usize) -> Self {
        self.block_size = size.max(1);
        self
    }

    pub fn max_depth_limit(&self) -> usize {
        self.max_depth
    }

    pub fn block_size_limit(&self) -> usize {
        self.block_size
    }

    /// Encodes a sequence of values into one contiguous buffer.
    ///
    /// On failure the partially written buffer is released and nothing is
    /// returned.
    pub fn encode(&self, values: &[Value]) -> Result<Bytes, SeriError> {
        let mut buf = WriteBuffer::with_block_size(self.block_size);
        for value in values {
            if let Err(e) = encode_value(&mut buf, value, 0, self.max_depth) {
                tracing::debug!(error = %e, written = buf.len(), "encode failed");
                buf.release();
                return Err(e);
            }
        }

        let blocks = buf.block_count();
        let bytes = buf.finalize();
        tracing::debug!(items = values.len(), len = bytes.len(), blocks, "encoded values");
        Ok(bytes)
    }

    /// Decodes every value in `bytes`, consuming the whole buffer.
    pub fn decode(&self, bytes: &[u8]) -> Result<Vec<Value>, SeriError> {
        let mut cursor = ReadCursor::new(bytes);
        let mut values = Vec::new();
        while !cursor.is_empty() {
            match decode_value(&mut cursor, self.max_depth) {
                Ok(value) => values.push(value),
                Err(e) => {
                    tracing::debug!(error = %e, decoded = values.len(), "decode failed");
                    return Err(e);
                }
            }
        }

        tracing::debug!(items = values.len(), len = bytes.len(), "decoded values");
        Ok(values)
    }
}

impl Default for Codec {
    fn default() -> Self {
        Self::builder()
    }
}

/// Encodes `values` with the default configuration.
pub fn encode(values: &[Value]) -> Result<Bytes, SeriError> {
    Codec::default().encode(values)
}

/// Decodes every value in `bytes` with the default configuration.
pub fn decode(bytes: &[u8]) -> Result<Vec<Value>, SeriError> {
    Codec::default().decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Aggregate;

    fn nested(levels: usize) -> Value {
        let mut value = Value::Aggregate(Aggregate::new());
        for _ in 1..levels {
            value = Value::Aggregate(Aggregate::from_array(vec![value]));
        }
        value
    }

    #[test]
    fn defaults() {
        let codec = Codec::default();
        assert_eq!(codec.max_depth_limit(), 32);
        assert_eq!(codec.block_size_limit(), 128);
        assert_eq!(Codec::builder().block_size(0).block_size_limit(), 1);
    }

    #[test]
    fn empty_sequence_round_trips() {
        let bytes = encode(&[]).unwrap();
        assert!(bytes.is_empty());
        assert!(decode(&bytes).unwrap().is_empty());
    }

    #[test]
    fn sequence_round_trips() {
        let values = vec![
            Value::Integer(1),
            Value::Absent,
            Value::from("two"),
            Value::Float(3.0),
            Value::Boolean(false),
        ];
        let bytes = encode(&values).unwrap();
        assert_eq!(decode(&bytes).unwrap(), values);
    }

    #[test]
    fn small_blocks_produce_identical_bytes() {
        let values = vec![Value::from("x".repeat(500)), nested(5), Value::Integer(-9)];
        let reference = encode(&values).unwrap();
        let tiny = Codec::builder().block_size(3).encode(&values).unwrap();
        assert_eq!(reference, tiny);
    }

    #[test]
    fn depth_bound() {
        assert!(encode(&[nested(32)]).is_ok());
        let err = encode(&[Value::Integer(1), nested(33)]).unwrap_err();
        assert!(matches!(err, SeriError::DepthExceeded { max_depth: 32 }));
    }

    #[test]
    fn custom_depth_applies_to_decode() {
        let bytes = encode(&[nested(10)]).unwrap();
        let err = Codec::builder().max_depth(4).decode(&bytes).unwrap_err();
        assert!(err.is_invalid_stream());
        assert_eq!(Codec::default().decode(&bytes).unwrap(), vec![nested(10)]);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let mut bytes = encode(&[Value::Integer(300)]).unwrap().to_vec();
        bytes.push(0x25);
        assert!(decode(&bytes).unwrap_err().is_invalid_stream());
    }
}
