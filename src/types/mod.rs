//! Value types handled by the codec.

mod aggregate;
mod value;

pub use aggregate::Aggregate;
pub use value::Value;
