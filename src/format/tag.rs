//! Tag byte layout and code constants.
//!
//! Every encoded value starts with one tag byte: bits 0-2 hold the type code,
//! bits 3-7 hold a 5-bit auxiliary value whose meaning depends on the type.

// Type codes (bits 0-2)
pub const TYPE_ABSENT: u8 = 0;
pub const TYPE_BOOLEAN: u8 = 1;
pub const TYPE_NUMERIC: u8 = 2;
pub const TYPE_EXTERNAL_REF: u8 = 3;
pub const TYPE_SHORT_TEXT: u8 = 4;
pub const TYPE_LONG_TEXT: u8 = 5;
pub const TYPE_AGGREGATE: u8 = 6;

// Width codes, shared by Numeric and LongText auxiliaries.
pub const WIDTH_ZERO: u8 = 0;
pub const WIDTH_64: u8 = 1;
pub const WIDTH_32: u8 = 2;
pub const WIDTH_16: u8 = 3;
pub const WIDTH_8: u8 = 4;
pub const WIDTH_FLOAT: u8 = 5;

/// Largest value the auxiliary field can carry.
pub const AUX_MAX: u8 = 0x1F;

/// Text shorter than this is written as ShortText with the length in the tag.
pub const SHORT_TEXT_LIMIT: usize = 32;

/// Aggregate auxiliary meaning "true array length follows as an Integer".
pub const LONG_ARRAY: u8 = AUX_MAX;

const TYPE_MASK: u8 = 0x07;
const AUX_SHIFT: u32 = 3;

/// The type field of a tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Absent,
    Boolean,
    Numeric,
    ExternalRef,
    ShortText,
    LongText,
    Aggregate,
}

impl TagKind {
    pub fn code(self) -> u8 {
        match self {
            Self::Absent => TYPE_ABSENT,
            Self::Boolean => TYPE_BOOLEAN,
            Self::Numeric => TYPE_NUMERIC,
            Self::ExternalRef => TYPE_EXTERNAL_REF,
            Self::ShortText => TYPE_SHORT_TEXT,
            Self::LongText => TYPE_LONG_TEXT,
            Self::Aggregate => TYPE_AGGREGATE,
        }
    }

    /// Maps a 3-bit type code back to a kind. Code 7 is unassigned.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            TYPE_ABSENT => Some(Self::Absent),
            TYPE_BOOLEAN => Some(Self::Boolean),
            TYPE_NUMERIC => Some(Self::Numeric),
            TYPE_EXTERNAL_REF => Some(Self::ExternalRef),
            TYPE_SHORT_TEXT => Some(Self::ShortText),
            TYPE_LONG_TEXT => Some(Self::LongText),
            TYPE_AGGREGATE => Some(Self::Aggregate),
            _ => None,
        }
    }
}

/// Packs a type and auxiliary value into one tag byte.
pub fn pack(kind: TagKind, aux: u8) -> u8 {
    debug_assert!(aux <= AUX_MAX, "tag auxiliary must fit in 5 bits");
    kind.code() | (aux << AUX_SHIFT)
}

/// Splits a tag byte into its raw type code and auxiliary value.
pub fn unpack(byte: u8) -> (u8, u8) {
    (byte & TYPE_MASK, byte >> AUX_SHIFT)
}
