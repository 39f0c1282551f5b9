//! seri — compact tagged binary serialization for a small dynamic value model.
//!
//! A stream is a sequence of self-describing items. Each item starts with one
//! tag byte (3-bit type, 5-bit auxiliary) that says how many payload bytes
//! follow, and values pick the narrowest encoding that holds them.
//!
//! # Architecture
//!
//! - **`format`** — Tag layout, encoder and decoder
//! - **`buffer`** — Chunked write buffer and bounded read cursor
//! - **`types`** — `Value` and the table-like `Aggregate`
//! - **`codec`** — Configuration and the sequence-level `encode`/`decode`
//!
//! Floats, integers and external refs are written in native byte order and
//! pointer width. A stream is only meaningful to a host with the same layout,
//! and `ExternalRef` only inside the producing address space.
//!
//! ```
//! use seri::{Aggregate, Value};
//!
//! let mut table = Aggregate::from_array(vec![Value::from("a"), Value::from("b")]);
//! table.insert(Value::from("n"), Value::Integer(2));
//!
//! let bytes = seri::encode(&[Value::Aggregate(table.clone()), Value::Boolean(true)]).unwrap();
//! let values = seri::decode(&bytes).unwrap();
//! assert_eq!(values, vec![Value::Aggregate(table), Value::Boolean(true)]);
//! ```

pub mod buffer;
pub mod codec;
pub mod error;
pub mod format;
pub mod types;

pub use codec::{decode, encode, Codec, MAX_DEPTH};
pub use error::{SeriError, StreamFault};
pub use types::{Aggregate, Value};
