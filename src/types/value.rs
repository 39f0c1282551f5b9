//! The dynamic value model.

use std::fmt;

use bytes::Bytes;

use super::Aggregate;

/// A value that can be serialized.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Absent,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    /// Raw bytes; not required to be UTF-8.
    Text(Bytes),
    /// An opaque pointer-width bit pattern owned by the embedding host.
    ///
    /// Only meaningful inside the address space that produced it.
    ExternalRef(usize),
    Aggregate(Aggregate),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is an `Integer` variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the raw bytes of a `Text` value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Text(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the text as a string slice, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    pub fn as_aggregate(&self) -> Option<&Aggregate> {
        match self {
            Self::Aggregate(a) => Some(a),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::ExternalRef(_) => "external ref",
            Self::Aggregate(_) => "aggregate",
        }
    }
}

// -- Convenience conversions --

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(Bytes::from(s))
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Text(Bytes::copy_from_slice(b))
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Text(Bytes::from(b))
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Self::Text(b)
    }
}

impl From<Aggregate> for Value {
    fn from(a: Aggregate) -> Self {
        Self::Aggregate(a)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Aggregate(Aggregate::from_array(items))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Absent, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Text(b) => write!(f, "\"{}\"", String::from_utf8_lossy(b)),
            Self::ExternalRef(p) => write!(f, "ref({p:#x})"),
            Self::Aggregate(agg) => {
                write!(f, "{{")?;
                let mut first = true;
                for item in agg.array() {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "{item}")?;
                }
                for (k, v) in agg.map() {
                    if !first {
                        write!(f, ", ")?;
                    }
                    first = false;
                    write!(f, "[{k}] = {v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
