//! Magic-number dispatch over the closed set of container formats.

use std::io::Read;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::gguf::GgufModel;
use crate::types::{
    DecodeError, FILE_MAGIC_GGJT, FILE_MAGIC_GGLA, FILE_MAGIC_GGML, FILE_MAGIC_GGMF,
    FILE_MAGIC_GGUF_BE, FILE_MAGIC_GGUF_LE,
};

/// A decoded `ggla` LoRA adapter.
///
/// The adapter format carries no model metadata at this layer — only a
/// version field, and only version 1 is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoraAdapter {
    version: u32,
}

impl LoraAdapter {
    /// Decode a LoRA adapter positioned just past its magic. The
    /// version field is always little-endian.
    pub fn decode<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        let version = r.read_u32::<LittleEndian>()?;
        match version {
            1 => Ok(Self { version }),
            _ => Err(DecodeError::InvalidVersion(version)),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

/// The closed set of decodable containers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Container {
    Gguf(GgufModel),
    Lora(LoraAdapter),
}

impl Container {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gguf(_) => "gguf",
            Self::Lora(_) => "ggla",
        }
    }

    pub fn version(&self) -> u32 {
        match self {
            Self::Gguf(m) => m.version(),
            Self::Lora(a) => a.version(),
        }
    }
}

/// One fully decoded container file: the magic that selected the
/// decoder plus the decoded container. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedFile {
    magic: u32,
    container: Container,
}

impl DecodedFile {
    pub fn magic(&self) -> u32 {
        self.magic
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// The GGUF model view, if this container carries one.
    pub fn model(&self) -> Option<&GgufModel> {
        match &self.container {
            Container::Gguf(m) => Some(m),
            Container::Lora(_) => None,
        }
    }

    //  Metadata queries, delegated to the model view. Containers
    //  without one (LoRA) answer with the same sentinels the view
    //  uses for missing keys.

    pub fn model_family(&self) -> &str {
        self.model().map_or("unknown", |m| m.model_family())
    }

    pub fn model_type(&self) -> String {
        self.model()
            .map_or_else(|| "unknown".to_string(), |m| m.model_type())
    }

    pub fn file_type(&self) -> &'static str {
        self.model().map_or("unknown", |m| m.file_type())
    }

    pub fn num_layers(&self) -> u32 {
        self.model().map_or(0, |m| m.num_layers())
    }
}

/// Decode one container file from `r`, positioned at offset 0.
///
/// The 4-byte magic is always read little-endian and matched exactly:
/// the three pre-GGUF magics are recognized but rejected as
/// unsupported, anything unrecognized is an invalid magic. The GGUF
/// magic's byte order fixes the byte order of every field after it.
pub fn decode<R: Read>(r: &mut R) -> Result<DecodedFile, DecodeError> {
    let magic = r.read_u32::<LittleEndian>()?;

    let container = match magic {
        FILE_MAGIC_GGML | FILE_MAGIC_GGMF | FILE_MAGIC_GGJT => {
            return Err(DecodeError::UnsupportedFormat(magic));
        }
        FILE_MAGIC_GGLA => Container::Lora(LoraAdapter::decode(r)?),
        FILE_MAGIC_GGUF_LE => Container::Gguf(GgufModel::decode::<LittleEndian, R>(r)?),
        FILE_MAGIC_GGUF_BE => Container::Gguf(GgufModel::decode::<BigEndian, R>(r)?),
        _ => return Err(DecodeError::InvalidMagic(magic)),
    };

    debug!(magic, container = container.name(), "file decoded");

    Ok(DecodedFile { magic, container })
}
