//! Read-only metadata decoder for GGML-family model containers.
//!
//! Answers, without touching tensor weights, which container format a
//! file uses, what architecture and rough parameter count it encodes,
//! which quantization scheme was applied, and how many transformer
//! layers it has. The decoder reads headers, the key-value metadata
//! dictionary, and tensor *descriptors* — never tensor data.
//!
//! Opening the file is the caller's job; [`decode`] takes any
//! [`std::io::Read`] positioned at offset 0:
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut reader = BufReader::new(File::open("model.gguf")?);
//! let file = ggml_meta::decode(&mut reader)?;
//! println!(
//!     "{} {} {} ({} layers)",
//!     file.model_family(),
//!     file.model_type(),
//!     file.file_type(),
//!     file.num_layers(),
//! );
//! # Ok(())
//! # }
//! ```

pub mod container;
pub mod gguf;
pub mod read;
pub mod types;

pub use container::{Container, DecodedFile, LoraAdapter, decode};
pub use gguf::GgufModel;
pub use types::{DecodeError, GGUFValue, GGUFValueType, file_type_name};
