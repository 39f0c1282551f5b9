//! Decoding: bytes → `Value`.

use bytes::{Buf, Bytes};

use super::tag::{self, TagKind};
use crate::buffer::{ReadCursor, Underflow};
use crate::error::{SeriError, StreamFault};
use crate::types::{Aggregate, Value};

const PTR_WIDTH: usize = std::mem::size_of::<usize>();

/// Decodes a single top-level `Value` from the cursor.
///
/// Aggregates nested deeper than `max_depth` are rejected so that a hostile
/// stream cannot drive unbounded recursion.
pub fn decode_value(cursor: &mut ReadCursor<'_>, max_depth: usize) -> Result<Value, SeriError> {
    decode_nested(cursor, 0, max_depth)
}

fn decode_nested(
    cursor: &mut ReadCursor<'_>,
    depth: usize,
    max_depth: usize,
) -> Result<Value, SeriError> {
    ensure(cursor, 1, "tag byte")?;
    let (code, aux) = tag::unpack(cursor.get_u8());
    let Some(kind) = TagKind::from_code(code) else {
        return Err(invalid(cursor, StreamFault::UnknownType(code)));
    };

    match kind {
        TagKind::Absent => {
            expect_aux(cursor, kind, aux, 0)?;
            Ok(Value::Absent)
        }
        TagKind::Boolean => match aux {
            0 => Ok(Value::Boolean(false)),
            1 => Ok(Value::Boolean(true)),
            _ => Err(invalid(cursor, StreamFault::BadAux { kind, aux })),
        },
        TagKind::Numeric => {
            if aux == tag::WIDTH_FLOAT {
                ensure(cursor, 8, "float payload")?;
                Ok(Value::Float(cursor.get_f64_ne()))
            } else {
                Ok(Value::Integer(decode_int_payload(cursor, aux)?))
            }
        }
        TagKind::ExternalRef => {
            expect_aux(cursor, kind, aux, 0)?;
            ensure(cursor, PTR_WIDTH, "external ref payload")?;
            let mut bits = [0u8; PTR_WIDTH];
            cursor.copy_to_slice(&mut bits);
            Ok(Value::ExternalRef(usize::from_ne_bytes(bits)))
        }
        TagKind::ShortText => decode_text_data(cursor, usize::from(aux)),
        TagKind::LongText => {
            let len = decode_text_len(cursor, aux)?;
            decode_text_data(cursor, len)
        }
        TagKind::Aggregate => decode_aggregate(cursor, aux, depth + 1, max_depth),
    }
}

/// Reads an integer payload whose width is given by a Numeric auxiliary.
///
/// The 8-bit and 16-bit forms are unsigned, the 32-bit and 64-bit forms signed.
fn decode_int_payload(cursor: &mut ReadCursor<'_>, width: u8) -> Result<i64, SeriError> {
    match width {
        tag::WIDTH_ZERO => Ok(0),
        tag::WIDTH_64 => {
            ensure(cursor, 8, "64-bit integer")?;
            Ok(cursor.get_i64_ne())
        }
        tag::WIDTH_32 => {
            ensure(cursor, 4, "32-bit integer")?;
            Ok(i64::from(cursor.get_i32_ne()))
        }
        tag::WIDTH_16 => {
            ensure(cursor, 2, "16-bit integer")?;
            Ok(i64::from(cursor.get_u16_ne()))
        }
        tag::WIDTH_8 => {
            ensure(cursor, 1, "8-bit integer")?;
            Ok(i64::from(cursor.get_u8()))
        }
        _ => Err(invalid(
            cursor,
            StreamFault::BadAux {
                kind: TagKind::Numeric,
                aux: width,
            },
        )),
    }
}

fn decode_text_len(cursor: &mut ReadCursor<'_>, width: u8) -> Result<usize, SeriError> {
    let len = match width {
        tag::WIDTH_8 => {
            ensure(cursor, 1, "text length")?;
            u32::from(cursor.get_u8())
        }
        tag::WIDTH_16 => {
            ensure(cursor, 2, "text length")?;
            u32::from(cursor.get_u16_ne())
        }
        tag::WIDTH_32 => {
            ensure(cursor, 4, "text length")?;
            cursor.get_u32_ne()
        }
        _ => {
            return Err(invalid(
                cursor,
                StreamFault::BadAux {
                    kind: TagKind::LongText,
                    aux: width,
                },
            ));
        }
    };
    Ok(usize::try_from(len).unwrap_or(usize::MAX))
}

fn decode_text_data(cursor: &mut ReadCursor<'_>, len: usize) -> Result<Value, SeriError> {
    let data = take(cursor, len, "text payload")?;
    Ok(Value::Text(Bytes::copy_from_slice(data)))
}

fn decode_aggregate(
    cursor: &mut ReadCursor<'_>,
    aux: u8,
    level: usize,
    max_depth: usize,
) -> Result<Value, SeriError> {
    if level > max_depth {
        return Err(invalid(cursor, StreamFault::TooDeep { max_depth }));
    }

    let len = if aux == tag::LONG_ARRAY {
        decode_array_len(cursor)?
    } else {
        usize::from(aux)
    };

    // Every element takes at least one byte, so the remaining length caps
    // how much a declared count can reserve.
    let mut array = Vec::with_capacity(len.min(cursor.remaining()));
    for _ in 0..len {
        array.push(decode_nested(cursor, level, max_depth)?);
    }

    // Pairs go through `insert`, so a key extending the array run joins it,
    // a later duplicate wins and an absent value drops the key.
    let mut agg = Aggregate::from_array(array);
    loop {
        let key = decode_nested(cursor, level, max_depth)?;
        if key.is_absent() {
            break;
        }
        let value = decode_nested(cursor, level, max_depth)?;
        agg.insert(key, value);
    }

    Ok(Value::Aggregate(agg))
}

/// Reads the Integer value that follows a long-array tag.
fn decode_array_len(cursor: &mut ReadCursor<'_>) -> Result<usize, SeriError> {
    ensure(cursor, 1, "array length tag")?;
    let byte = cursor.get_u8();
    let (code, aux) = tag::unpack(byte);
    if code != tag::TYPE_NUMERIC || aux == tag::WIDTH_FLOAT {
        return Err(invalid(
            cursor,
            StreamFault::BadArrayLength(format!("expected an integer tag, got 0x{byte:02X}")),
        ));
    }
    let len = decode_int_payload(cursor, aux)?;
    usize::try_from(len)
        .map_err(|_| invalid(cursor, StreamFault::BadArrayLength(format!("{len} is negative"))))
}

fn expect_aux(
    cursor: &ReadCursor<'_>,
    kind: TagKind,
    aux: u8,
    expected: u8,
) -> Result<(), SeriError> {
    if aux == expected {
        Ok(())
    } else {
        Err(invalid(cursor, StreamFault::BadAux { kind, aux }))
    }
}

fn take<'a>(
    cursor: &mut ReadCursor<'a>,
    n: usize,
    context: &'static str,
) -> Result<&'a [u8], SeriError> {
    cursor.take(n).map_err(|u| underflow(u, context))
}

fn ensure(cursor: &ReadCursor<'_>, n: usize, context: &'static str) -> Result<(), SeriError> {
    cursor.ensure(n).map_err(|u| underflow(u, context))
}

fn underflow(u: Underflow, context: &'static str) -> SeriError {
    SeriError::InvalidStream {
        offset: u.offset,
        remaining: u.remaining,
        fault: StreamFault::Underflow {
            needed: u.needed,
            context,
        },
    }
}

fn invalid(cursor: &ReadCursor<'_>, fault: StreamFault) -> SeriError {
    SeriError::InvalidStream {
        offset: cursor.offset(),
        remaining: cursor.remaining(),
        fault,
    }
}
