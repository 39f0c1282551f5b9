//! Encoding: `Value` → bytes.

use bytes::BufMut;

use super::tag::{self, TagKind};
use crate::buffer::WriteBuffer;
use crate::error::SeriError;
use crate::types::{Aggregate, Value};

/// Encodes one value into the buffer.
///
/// `depth` is the number of aggregates enclosing `value`; top-level values
/// start at 0. An aggregate that would sit deeper than `max_depth` levels
/// fails with [`SeriError::DepthExceeded`].
pub fn encode_value(
    buf: &mut WriteBuffer,
    value: &Value,
    depth: usize,
    max_depth: usize,
) -> Result<(), SeriError> {
    match value {
        Value::Absent => encode_absent(buf),
        Value::Boolean(b) => encode_bool(buf, *b),
        Value::Integer(i) => encode_int(buf, *i),
        Value::Float(f) => encode_float(buf, *f),
        Value::Text(t) => encode_text(buf, t)?,
        Value::ExternalRef(p) => encode_external_ref(buf, *p),
        Value::Aggregate(agg) => encode_aggregate(buf, agg, depth + 1, max_depth)?,
    }
    Ok(())
}

pub fn encode_absent(buf: &mut WriteBuffer) {
    buf.put_u8(tag::pack(TagKind::Absent, 0));
}

pub fn encode_bool(buf: &mut WriteBuffer, value: bool) {
    buf.put_u8(tag::pack(TagKind::Boolean, u8::from(value)));
}

/// Encodes an integer using the narrowest width that holds it.
///
/// Negative values always take the 32-bit or 64-bit form; the 8-bit and
/// 16-bit forms are unsigned.
pub fn encode_int(buf: &mut WriteBuffer, value: i64) {
    if value == 0 {
        buf.put_u8(tag::pack(TagKind::Numeric, tag::WIDTH_ZERO));
    } else if i32::try_from(value).is_err() {
        buf.put_u8(tag::pack(TagKind::Numeric, tag::WIDTH_64));
        buf.put_i64_ne(value);
    } else if value < 0 || value > 0xFFFF {
        buf.put_u8(tag::pack(TagKind::Numeric, tag::WIDTH_32));
        buf.put_i32_ne(value as i32);
    } else if value <= 0xFF {
        buf.put_u8(tag::pack(TagKind::Numeric, tag::WIDTH_8));
        buf.put_u8(value as u8);
    } else {
        buf.put_u8(tag::pack(TagKind::Numeric, tag::WIDTH_16));
        buf.put_u16_ne(value as u16);
    }
}

pub fn encode_float(buf: &mut WriteBuffer, value: f64) {
    buf.put_u8(tag::pack(TagKind::Numeric, tag::WIDTH_FLOAT));
    buf.put_f64_ne(value);
}

/// Encodes text (size = byte length).
pub fn encode_text(buf: &mut WriteBuffer, text: &[u8]) -> Result<(), SeriError> {
    let len = text.len();
    if len < tag::SHORT_TEXT_LIMIT {
        buf.put_u8(tag::pack(TagKind::ShortText, len as u8));
    } else if len <= 0xFF {
        buf.put_u8(tag::pack(TagKind::LongText, tag::WIDTH_8));
        buf.put_u8(len as u8);
    } else if len <= 0xFFFF {
        buf.put_u8(tag::pack(TagKind::LongText, tag::WIDTH_16));
        buf.put_u16_ne(len as u16);
    } else {
        let len = u32::try_from(len).map_err(|_| {
            SeriError::UnsupportedValue(format!("text of {len} bytes exceeds the 32-bit length field"))
        })?;
        buf.put_u8(tag::pack(TagKind::LongText, tag::WIDTH_32));
        buf.put_u32_ne(len);
    }
    buf.put_slice(text);
    Ok(())
}

pub fn encode_external_ref(buf: &mut WriteBuffer, bits: usize) {
    buf.put_u8(tag::pack(TagKind::ExternalRef, 0));
    buf.put_slice(&bits.to_ne_bytes());
}

fn encode_aggregate(
    buf: &mut WriteBuffer,
    agg: &Aggregate,
    level: usize,
    max_depth: usize,
) -> Result<(), SeriError> {
    if level > max_depth {
        return Err(SeriError::DepthExceeded { max_depth });
    }

    let len = agg.len();
    if len >= usize::from(tag::LONG_ARRAY) {
        let count = i64::try_from(len).map_err(|_| {
            SeriError::UnsupportedValue(format!("array segment of {len} elements is too long"))
        })?;
        buf.put_u8(tag::pack(TagKind::Aggregate, tag::LONG_ARRAY));
        encode_int(buf, count);
    } else {
        buf.put_u8(tag::pack(TagKind::Aggregate, len as u8));
    }

    for item in agg.array() {
        encode_value(buf, item, level, max_depth)?;
    }

    for (key, value) in agg.map() {
        // An absent key or value would read back as the segment terminator.
        if key.is_absent() || value.is_absent() {
            return Err(SeriError::UnsupportedValue(
                "absent map key or value cannot be encoded".into(),
            ));
        }
        encode_value(buf, key, level, max_depth)?;
        encode_value(buf, value, level, max_depth)?;
    }

    encode_absent(buf);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::MAX_DEPTH;

    fn encoded(value: &Value) -> Vec<u8> {
        let mut buf = WriteBuffer::new();
        encode_value(&mut buf, value, 0, MAX_DEPTH).expect("encode failed");
        buf.finalize().to_vec()
    }

    fn int_bytes(value: i64) -> Vec<u8> {
        let mut buf = WriteBuffer::new();
        encode_int(&mut buf, value);
        buf.finalize().to_vec()
    }

    #[test]
    fn encode_absent_tag() {
        assert_eq!(encoded(&Value::Absent), vec![0x00]);
    }

    #[test]
    fn encode_booleans() {
        assert_eq!(encoded(&Value::Boolean(false)), vec![0x01]);
        assert_eq!(encoded(&Value::Boolean(true)), vec![0x09]);
    }

    #[test]
    fn encode_zero_has_no_payload() {
        assert_eq!(int_bytes(0), vec![0x02]);
    }

    #[test]
    fn encode_unsigned_small_widths() {
        assert_eq!(int_bytes(1), vec![0x22, 0x01]);
        assert_eq!(int_bytes(255), vec![0x22, 0xFF]);

        let mut expected = vec![0x1A];
        expected.extend_from_slice(&256u16.to_ne_bytes());
        assert_eq!(int_bytes(256), expected);

        let mut expected = vec![0x1A];
        expected.extend_from_slice(&65535u16.to_ne_bytes());
        assert_eq!(int_bytes(65535), expected);
    }

    #[test]
    fn encode_int32() {
        let mut expected = vec![0x12];
        expected.extend_from_slice(&65536i32.to_ne_bytes());
        assert_eq!(int_bytes(65536), expected);

        let mut expected = vec![0x12];
        expected.extend_from_slice(&i32::MAX.to_ne_bytes());
        assert_eq!(int_bytes(i64::from(i32::MAX)), expected);
    }

    #[test]
    fn encode_negative_uses_32_bit() {
        let mut expected = vec![0x12];
        expected.extend_from_slice(&(-1i32).to_ne_bytes());
        assert_eq!(int_bytes(-1), expected);

        let mut expected = vec![0x12];
        expected.extend_from_slice(&i32::MIN.to_ne_bytes());
        assert_eq!(int_bytes(i64::from(i32::MIN)), expected);
    }

    #[test]
    fn encode_int64() {
        for value in [1i64 << 40, i64::from(i32::MAX) + 1, i64::from(i32::MIN) - 1, i64::MIN] {
            let bytes = int_bytes(value);
            assert_eq!(bytes[0], 0x0A, "failed for {value}");
            assert_eq!(&bytes[1..], &value.to_ne_bytes());
        }
    }

    #[test]
    fn encode_float64() {
        let bytes = encoded(&Value::Float(1.23));
        assert_eq!(bytes[0], 0x2A);
        assert_eq!(&bytes[1..], &1.23f64.to_ne_bytes());
    }

    #[test]
    fn encode_empty_text() {
        assert_eq!(encoded(&Value::from("")), vec![0x04]);
    }

    #[test]
    fn encode_short_text() {
        assert_eq!(encoded(&Value::from("A")), vec![0x0C, 0x41]);

        let s = "x".repeat(31);
        let bytes = encoded(&Value::from(s.as_str()));
        assert_eq!(bytes[0], tag::pack(TagKind::ShortText, 31));
        assert_eq!(&bytes[1..], s.as_bytes());
    }

    #[test]
    fn encode_long_text_8() {
        let s = "y".repeat(32);
        let bytes = encoded(&Value::from(s.as_str()));
        assert_eq!(bytes[0], 0x25);
        assert_eq!(bytes[1], 32);
        assert_eq!(&bytes[2..], s.as_bytes());
    }

    #[test]
    fn encode_long_text_16_and_32() {
        let s = vec![b'z'; 300];
        let bytes = encoded(&Value::from(s.clone()));
        assert_eq!(bytes[0], 0x1D);
        assert_eq!(&bytes[1..3], &300u16.to_ne_bytes());
        assert_eq!(&bytes[3..], &s[..]);

        let s = vec![b'w'; 70_000];
        let bytes = encoded(&Value::from(s.clone()));
        assert_eq!(bytes[0], 0x15);
        assert_eq!(&bytes[1..5], &70_000u32.to_ne_bytes());
        assert_eq!(bytes.len(), 5 + 70_000);
    }

    #[test]
    fn encode_external_ref_payload() {
        let bytes = encoded(&Value::ExternalRef(0xDEAD_BEEF));
        assert_eq!(bytes[0], 0x03);
        assert_eq!(&bytes[1..], &0xDEAD_BEEFusize.to_ne_bytes());
    }

    #[test]
    fn encode_empty_aggregate() {
        assert_eq!(encoded(&Value::Aggregate(Aggregate::new())), vec![0x06, 0x00]);
    }

    #[test]
    fn encode_small_array() {
        let agg = Aggregate::from_array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        assert_eq!(
            encoded(&Value::Aggregate(agg)),
            vec![0x1E, 0x22, 0x01, 0x22, 0x02, 0x22, 0x03, 0x00]
        );
    }

    #[test]
    fn encode_map_entries_then_terminator() {
        let agg = Aggregate::from_entries(vec![(Value::from("k"), Value::Boolean(true))]);
        assert_eq!(
            encoded(&Value::Aggregate(agg)),
            vec![0x06, 0x0C, b'k', 0x09, 0x00]
        );
    }

    #[test]
    fn encode_array_of_31_uses_length_prefix() {
        let agg = Aggregate::from_array(vec![Value::Boolean(true); 31]);
        let bytes = encoded(&Value::Aggregate(agg));
        assert_eq!(&bytes[..3], &[0xFE, 0x22, 31]);
        assert_eq!(bytes.len(), 3 + 31 + 1);
    }

    #[test]
    fn encode_array_of_30_is_inline() {
        let agg = Aggregate::from_array(vec![Value::Boolean(true); 30]);
        let bytes = encoded(&Value::Aggregate(agg));
        assert_eq!(bytes[0], tag::pack(TagKind::Aggregate, 30));
        assert_eq!(bytes.len(), 1 + 30 + 1);
    }

    #[test]
    fn absent_map_key_is_rejected() {
        let agg = Aggregate::from_entries(vec![(Value::Absent, Value::Integer(1))]);
        let mut buf = WriteBuffer::new();
        let err = encode_value(&mut buf, &Value::Aggregate(agg), 0, MAX_DEPTH).unwrap_err();
        assert!(matches!(err, SeriError::UnsupportedValue(_)));
    }

    #[test]
    fn depth_limit_counts_aggregates() {
        let mut value = Value::Aggregate(Aggregate::new());
        for _ in 1..3 {
            value = Value::Aggregate(Aggregate::from_array(vec![value]));
        }
        let mut buf = WriteBuffer::new();
        assert!(encode_value(&mut buf, &value, 0, 3).is_ok());

        let deeper = Value::Aggregate(Aggregate::from_array(vec![value]));
        let mut buf = WriteBuffer::new();
        let err = encode_value(&mut buf, &deeper, 0, 3).unwrap_err();
        assert!(matches!(err, SeriError::DepthExceeded { max_depth: 3 }));
    }
}
