//! Container-family constants, the metadata value model, and errors.

use serde::{Deserialize, Serialize};

//  File magics

/// Magic for unversioned `ggml` files (legacy, rejected).
pub const FILE_MAGIC_GGML: u32 = 0x6767_6d6c;
/// Magic for versioned `ggmf` files (legacy, rejected).
pub const FILE_MAGIC_GGMF: u32 = 0x6767_6d66;
/// Magic for versioned `ggjt` files (legacy, rejected).
pub const FILE_MAGIC_GGJT: u32 = 0x6767_6a74;
/// Magic for `ggla` LoRA adapter files.
pub const FILE_MAGIC_GGLA: u32 = 0x6767_6c61;
/// Magic for `gguf` files with little-endian fields.
pub const FILE_MAGIC_GGUF_LE: u32 = 0x4655_4747;
/// Magic for `gguf` files with big-endian fields.
pub const FILE_MAGIC_GGUF_BE: u32 = 0x4747_5546;

//  Value type tag

/// Wire type tag for one metadata value.
///
/// The tag set is closed: anything outside 0..=12 is a decode error,
/// never silently skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum GGUFValueType {
    Uint8 = 0,
    Int8 = 1,
    Uint16 = 2,
    Int16 = 3,
    Uint32 = 4,
    Int32 = 5,
    Float32 = 6,
    Bool = 7,
    String = 8,
    Array = 9,
    Uint64 = 10,
    Int64 = 11,
    Float64 = 12,
}

impl TryFrom<u32> for GGUFValueType {
    type Error = DecodeError;
    fn try_from(v: u32) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Uint8),
            1 => Ok(Self::Int8),
            2 => Ok(Self::Uint16),
            3 => Ok(Self::Int16),
            4 => Ok(Self::Uint32),
            5 => Ok(Self::Int32),
            6 => Ok(Self::Float32),
            7 => Ok(Self::Bool),
            8 => Ok(Self::String),
            9 => Ok(Self::Array),
            10 => Ok(Self::Uint64),
            11 => Ok(Self::Int64),
            12 => Ok(Self::Float64),
            _ => Err(DecodeError::UnknownTypeTag(v)),
        }
    }
}

//  Metadata value

/// One decoded metadata value. Arrays are homogeneous: every element
/// shares the tag read once for the whole array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GGUFValue {
    Uint8(u8),
    Int8(i8),
    Uint16(u16),
    Int16(i16),
    Uint32(u32),
    Int32(i32),
    Float32(f32),
    Bool(bool),
    String(String),
    Array(Vec<GGUFValue>),
    Uint64(u64),
    Int64(i64),
    Float64(f64),
}

impl GGUFValue {
    /// The value if it is exactly `Uint32`; producers write the
    /// architecture counters at that width.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::Uint32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

//  Error

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported model format: 0x{0:08X}")]
    UnsupportedFormat(u32),

    #[error("invalid file magic: 0x{0:08X}")]
    InvalidMagic(u32),

    #[error("invalid version: {0}")]
    InvalidVersion(u32),

    #[error("invalid type: {0}")]
    UnknownTypeTag(u32),

    #[error("stream ended before declared length")]
    Truncated,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//  File-type ↔ quantization name

/// Map a `general.file_type` value to its quantization scheme name.
///
/// Codes 5 and 6 were never assigned; they fall through to "unknown"
/// along with everything past Q6_K.
pub fn file_type_name(ft: u32) -> &'static str {
    match ft {
        0 => "F32",
        1 => "F16",
        2 => "Q4_0",
        3 => "Q4_1",
        4 => "Q4_1_F16",
        7 => "Q8_0",
        8 => "Q5_0",
        9 => "Q5_1",
        10 => "Q2_K",
        11 => "Q3_K_S",
        12 => "Q3_K_M",
        13 => "Q3_K_L",
        14 => "Q4_K_S",
        15 => "Q4_K_M",
        16 => "Q5_K_S",
        17 => "Q5_K_M",
        18 => "Q6_K",
        _ => "unknown",
    }
}
