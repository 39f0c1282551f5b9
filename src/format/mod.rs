//! The tagged binary format.
//!
//! Multi-byte payloads (integers, lengths, floats, external refs) are written
//! in the host's native byte order and pointer width, so a stream is only
//! portable between hosts that agree on both.

pub mod decode;
pub mod encode;
pub mod tag;

pub use decode::decode_value;
pub use encode::encode_value;
