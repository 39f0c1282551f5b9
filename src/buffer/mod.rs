//! Byte sinks and sources used by the encoder and decoder.

pub mod reader;
pub mod writer;

pub use reader::{ReadCursor, Underflow};
pub use writer::WriteBuffer;
