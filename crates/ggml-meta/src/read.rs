//! Primitive field reads and typed metadata value decoding.
//!
//! Every width-sensitive read takes the container's [`WireVersion`]
//! explicitly; nothing here keeps state between calls.

use std::io::Read;

use byteorder::{ByteOrder, ReadBytesExt};

use crate::types::{DecodeError, GGUFValue, GGUFValueType};

/// How version-dependent fields are laid out on the wire.
///
/// Version 1 uses 32-bit counts and length prefixes that include a
/// trailing terminator byte; every later version uses 64-bit counts and
/// raw length prefixes. The choice is made once from the container's
/// version field and applied to every read that follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireVersion {
    V1,
    V2Plus,
}

impl WireVersion {
    pub fn from_version(version: u32) -> Self {
        if version == 1 { Self::V1 } else { Self::V2Plus }
    }
}

//  Primitive fields

pub fn read_bool<R: Read>(r: &mut R) -> Result<bool, DecodeError> {
    Ok(r.read_u8()? != 0)
}

/// Read one version-width count (u32 under V1, u64 otherwise).
pub fn read_count<B: ByteOrder, R: Read>(
    r: &mut R,
    wire: WireVersion,
) -> Result<u64, DecodeError> {
    match wire {
        WireVersion::V1 => Ok(u64::from(r.read_u32::<B>()?)),
        WireVersion::V2Plus => Ok(r.read_u64::<B>()?),
    }
}

/// Read one length-prefixed string.
///
/// V1 lengths are 32-bit and include a terminator byte, stripped after
/// the read. The read is capped at the declared length via `take`, so a
/// lying prefix can neither over-read nor force a giant allocation; a
/// short stream surfaces as [`DecodeError::Truncated`].
pub fn read_string<B: ByteOrder, R: Read>(
    r: &mut R,
    wire: WireVersion,
) -> Result<String, DecodeError> {
    let len = read_count::<B, R>(r, wire)?;

    let mut buf = Vec::with_capacity(len.min(4096) as usize);
    let got = r.take(len).read_to_end(&mut buf)?;
    if (got as u64) < len {
        return Err(DecodeError::Truncated);
    }

    if wire == WireVersion::V1 {
        buf.pop(); // v1 strings carry a terminator inside the length
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

//  Typed values

/// Decode exactly one value of kind `vtype`.
///
/// The array kind reads a nested element tag plus a version-width count,
/// then recurses per element, strictly in sequence. An unrecognized
/// nested tag aborts with the offending value.
pub fn read_value<B: ByteOrder, R: Read>(
    r: &mut R,
    vtype: GGUFValueType,
    wire: WireVersion,
) -> Result<GGUFValue, DecodeError> {
    match vtype {
        GGUFValueType::Uint8 => Ok(GGUFValue::Uint8(r.read_u8()?)),
        GGUFValueType::Int8 => Ok(GGUFValue::Int8(r.read_i8()?)),
        GGUFValueType::Uint16 => Ok(GGUFValue::Uint16(r.read_u16::<B>()?)),
        GGUFValueType::Int16 => Ok(GGUFValue::Int16(r.read_i16::<B>()?)),
        GGUFValueType::Uint32 => Ok(GGUFValue::Uint32(r.read_u32::<B>()?)),
        GGUFValueType::Int32 => Ok(GGUFValue::Int32(r.read_i32::<B>()?)),
        GGUFValueType::Float32 => Ok(GGUFValue::Float32(r.read_f32::<B>()?)),
        GGUFValueType::Bool => Ok(GGUFValue::Bool(read_bool(r)?)),
        GGUFValueType::String => Ok(GGUFValue::String(read_string::<B, R>(r, wire)?)),
        GGUFValueType::Array => {
            let elem_type = GGUFValueType::try_from(r.read_u32::<B>()?)?;
            let count = read_count::<B, R>(r, wire)?;
            let mut arr = Vec::with_capacity(count.min(1024) as usize);
            for _ in 0..count {
                arr.push(read_value::<B, R>(r, elem_type, wire)?);
            }
            Ok(GGUFValue::Array(arr))
        }
        GGUFValueType::Uint64 => Ok(GGUFValue::Uint64(r.read_u64::<B>()?)),
        GGUFValueType::Int64 => Ok(GGUFValue::Int64(r.read_i64::<B>()?)),
        GGUFValueType::Float64 => Ok(GGUFValue::Float64(r.read_f64::<B>()?)),
    }
}

/// Read one dictionary entry: key string, u32 type tag, one value.
pub fn read_kv<B: ByteOrder, R: Read>(
    r: &mut R,
    wire: WireVersion,
) -> Result<(String, GGUFValue), DecodeError> {
    let key = read_string::<B, R>(r, wire)?;
    let vtype = GGUFValueType::try_from(r.read_u32::<B>()?)?;
    let value = read_value::<B, R>(r, vtype, wire)?;
    Ok((key, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::{BigEndian, LittleEndian};
    use std::io::Cursor;

    #[test]
    fn v1_string_strips_terminator() {
        // "llama\0" with a 32-bit length that counts the terminator
        let mut buf = Vec::new();
        buf.extend_from_slice(&6u32.to_le_bytes());
        buf.extend_from_slice(b"llama\0");

        let mut r = Cursor::new(buf);
        let s = read_string::<LittleEndian, _>(&mut r, WireVersion::V1).unwrap();
        assert_eq!(s, "llama");
    }

    #[test]
    fn v2_string_is_raw_length_prefixed() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&5u64.to_le_bytes());
        buf.extend_from_slice(b"llama");

        let mut r = Cursor::new(buf);
        let s = read_string::<LittleEndian, _>(&mut r, WireVersion::V2Plus).unwrap();
        assert_eq!(s, "llama");
    }

    #[test]
    fn string_shorter_than_declared_is_truncated() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&100u64.to_le_bytes());
        buf.extend_from_slice(b"only this");

        let mut r = Cursor::new(buf);
        match read_string::<LittleEndian, _>(&mut r, WireVersion::V2Plus) {
            Err(DecodeError::Truncated) => {}
            other => panic!("expected Truncated, got {other:?}"),
        }
    }

    #[test]
    fn big_endian_scalar_read() {
        let mut r = Cursor::new(0x0102_0304u32.to_be_bytes().to_vec());
        let v = read_value::<BigEndian, _>(&mut r, GGUFValueType::Uint32, WireVersion::V2Plus)
            .unwrap();
        assert_eq!(v, GGUFValue::Uint32(0x0102_0304));
    }

    #[test]
    fn array_of_u32_decodes_in_order() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(GGUFValueType::Uint32 as u32).to_le_bytes());
        buf.extend_from_slice(&3u64.to_le_bytes());
        for n in [7u32, 8, 9] {
            buf.extend_from_slice(&n.to_le_bytes());
        }

        let mut r = Cursor::new(buf);
        let v = read_value::<LittleEndian, _>(&mut r, GGUFValueType::Array, WireVersion::V2Plus)
            .unwrap();
        assert_eq!(
            v,
            GGUFValue::Array(vec![
                GGUFValue::Uint32(7),
                GGUFValue::Uint32(8),
                GGUFValue::Uint32(9),
            ])
        );
    }

    #[test]
    fn array_count_past_stream_end_is_truncated() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(GGUFValueType::Uint32 as u32).to_le_bytes());
        buf.extend_from_slice(&1_000_000u64.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes()); // one element, then EOF

        let mut r = Cursor::new(buf);
        let err = read_value::<LittleEndian, _>(&mut r, GGUFValueType::Array, WireVersion::V2Plus)
            .unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Io(ref e) if e.kind() == std::io::ErrorKind::UnexpectedEof
        ));
    }

    #[test]
    fn unknown_array_element_tag_carries_value() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&42u32.to_le_bytes()); // bogus element tag
        buf.extend_from_slice(&1u64.to_le_bytes());

        let mut r = Cursor::new(buf);
        match read_value::<LittleEndian, _>(&mut r, GGUFValueType::Array, WireVersion::V2Plus) {
            Err(DecodeError::UnknownTypeTag(42)) => {}
            other => panic!("expected UnknownTypeTag(42), got {other:?}"),
        }
    }

    #[test]
    fn v1_array_count_is_32_bit() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(GGUFValueType::Bool as u32).to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes()); // 32-bit count under V1
        buf.push(1);
        buf.push(0);

        let mut r = Cursor::new(buf);
        let v =
            read_value::<LittleEndian, _>(&mut r, GGUFValueType::Array, WireVersion::V1).unwrap();
        assert_eq!(
            v,
            GGUFValue::Array(vec![GGUFValue::Bool(true), GGUFValue::Bool(false)])
        );
    }
}
