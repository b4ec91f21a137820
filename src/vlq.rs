#![doc = r#"
Variable length quantities

Delta-times and meta/sysex lengths are written 7 bits per byte, most
significant group first. Every byte but the last has its leading bit set.

```text
      300 = 0b10_0101100
  ┌──────────┬──────────┐
  │ 1 0000010│ 0 0101100│
  └──────────┴──────────┘
      0x82       0x2C
```

The MIDI file format caps a quantity at four bytes, so the largest value is
[`MAX`] (`0x0FFF_FFFF`).
"#]

use alloc::vec::Vec;

use crate::{
    EncodeError, ParseError,
    reader::{ReadResult, Reader, ReaderError},
};

/// The largest value a four byte quantity can hold
pub const MAX: u32 = 0x0FFF_FFFF;

/// The most bytes a quantity may span
pub const MAX_BYTES: usize = 4;

/// Reads a quantity, returning the value and the number of bytes consumed.
///
/// Fails with [`ParseError::MalformedVlq`] if no terminating byte shows up
/// within [`MAX_BYTES`] or the stream ends first. In strict mode
/// (see [`ReaderConfig`](crate::reader::ReaderConfig)) a quantity padded with
/// leading `0x80` bytes is rejected as well.
///
/// On failure the reader is left where it was.
pub fn decode(reader: &mut Reader<'_>) -> ReadResult<(u32, usize)> {
    let mark = reader.mark();
    let malformed = ReaderError::parse_error(mark.position(), ParseError::MalformedVlq);

    let mut value: u32 = 0;
    let mut overlong = false;
    for count in 1..=MAX_BYTES {
        let Ok(byte) = reader.read_byte() else {
            reader.reset(mark);
            return Err(malformed);
        };
        if count == 1 && byte == 0x80 {
            overlong = true;
        }
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            if overlong {
                if reader.config().strict_vlq {
                    reader.reset(mark);
                    return Err(malformed);
                }
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "Accepted non-canonical variable length quantity at {}; \
                     it will be re-encoded in {} byte(s)",
                    mark.position(),
                    length(value)
                );
            }
            return Ok((value, count));
        }
    }

    reader.reset(mark);
    Err(malformed)
}

/// Encodes `value` in the fewest bytes possible.
///
/// # Errors
/// [`EncodeError::ValueOutOfRange`] if `value` is above [`MAX`]
pub fn encode(value: u32) -> Result<Vec<u8>, EncodeError> {
    let mut bytes = Vec::with_capacity(MAX_BYTES);
    encode_into(value, &mut bytes)?;
    Ok(bytes)
}

/// Appends the minimal encoding of `value` to `out`.
///
/// Nothing is written on failure.
pub fn encode_into(value: u32, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    if value > MAX {
        return Err(EncodeError::ValueOutOfRange(value as u64));
    }
    let len = length(value);
    for group in (0..len).rev() {
        let mut byte = ((value >> (7 * group)) & 0x7F) as u8;
        if group != 0 {
            byte |= 0x80;
        }
        out.push(byte);
    }
    Ok(())
}

/// The number of bytes [`encode`] writes for `value`.
///
/// Values past [`MAX`] report 5, the length they would need if they were
/// representable.
pub const fn length(value: u32) -> u32 {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x001F_FFFF => 3,
        0x0020_0000..=MAX => 4,
        _ => 5,
    }
}

/// Checks a length or delta-time before it is stored on an event
pub(crate) fn check_range(value: u64) -> Result<u32, EncodeError> {
    if value > MAX as u64 {
        return Err(EncodeError::ValueOutOfRange(value));
    }
    Ok(value as u32)
}

#[cfg(feature = "serde")]
pub(crate) fn deserialize_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = <u32 as serde::Deserialize>::deserialize(deserializer)?;
    check_range(value as u64).map_err(serde::de::Error::custom)
}

/// Bytes written after a quantity holding their length
#[cfg(feature = "serde")]
pub(crate) fn deserialize_sized_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let bytes = <Vec<u8> as serde::Deserialize>::deserialize(deserializer)?;
    check_range(bytes.len() as u64).map_err(serde::de::Error::custom)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ReaderConfig;
    use pretty_assertions::assert_eq;

    fn decode_slice(bytes: &[u8]) -> ReadResult<(u32, usize)> {
        decode(&mut Reader::from_byte_slice(bytes))
    }

    #[test]
    fn three_hundred() {
        assert_eq!(encode(300).unwrap(), [0x82, 0x2C]);
        assert_eq!(decode_slice(&[0x82, 0x2C]).unwrap(), (300, 2));
    }

    #[test]
    fn boundaries() {
        let cases: &[(u32, &[u8])] = &[
            (0, &[0x00]),
            (0x40, &[0x40]),
            (0x7F, &[0x7F]),
            (0x80, &[0x81, 0x00]),
            (0x2000, &[0xC0, 0x00]),
            (0x3FFF, &[0xFF, 0x7F]),
            (0x4000, &[0x81, 0x80, 0x00]),
            (0x10_0000, &[0xC0, 0x80, 0x00]),
            (0x1F_FFFF, &[0xFF, 0xFF, 0x7F]),
            (0x20_0000, &[0x81, 0x80, 0x80, 0x00]),
            (0x800_0000, &[0xC0, 0x80, 0x80, 0x00]),
            (MAX, &[0xFF, 0xFF, 0xFF, 0x7F]),
        ];
        for (value, bytes) in cases {
            assert_eq!(encode(*value).unwrap(), *bytes, "encoding {value:#X}");
            assert_eq!(length(*value) as usize, bytes.len());
            assert_eq!(decode_slice(bytes).unwrap(), (*value, bytes.len()));
        }
    }

    #[test]
    fn out_of_range() {
        assert_eq!(encode(MAX + 1), Err(EncodeError::ValueOutOfRange(0x1000_0000)));
        let mut out = alloc::vec![0xAA];
        assert!(encode_into(u32::MAX, &mut out).is_err());
        assert_eq!(out, [0xAA]);
    }

    #[test]
    fn five_bytes_is_malformed() {
        let bytes = [0x81, 0x80, 0x80, 0x80, 0x00];
        let mut reader = Reader::from_byte_slice(&bytes);
        let err = decode(&mut reader).unwrap_err();
        assert!(err.error_kind().is_malformed_vlq());
        assert_eq!(err.position(), 0);
        assert_eq!(reader.buffer_position(), 0);
    }

    #[test]
    fn truncated_is_malformed() {
        let bytes = [0x00, 0x81, 0x80];
        let mut reader = Reader::from_byte_slice(&bytes);
        assert_eq!(decode(&mut reader).unwrap(), (0, 1));
        let err = decode(&mut reader).unwrap_err();
        assert!(err.error_kind().is_malformed_vlq());
        assert_eq!(err.position(), 1);
        assert_eq!(reader.buffer_position(), 1);
    }

    #[test]
    fn overlong_depends_on_config() {
        let bytes = [0x80, 0x80, 0x05];
        assert_eq!(decode_slice(&bytes).unwrap(), (5, 3));

        let mut strict = Reader::from_byte_slice(&bytes).with_config(ReaderConfig::strict());
        assert!(decode(&mut strict).unwrap_err().error_kind().is_malformed_vlq());
        assert_eq!(strict.buffer_position(), 0);
    }

    #[test]
    fn round_trip_sampled_range() {
        let mut value = 0u32;
        while value <= MAX {
            let bytes = encode(value).unwrap();
            assert_eq!(bytes.len() as u32, length(value));
            assert_eq!(decode_slice(&bytes).unwrap(), (value, bytes.len()));
            value = value * 3 + 1;
        }
    }
}
