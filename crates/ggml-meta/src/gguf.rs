//! GGUF container decoding and the derived model metadata view.

use std::collections::HashMap;
use std::io::Read;

use byteorder::{ByteOrder, ReadBytesExt};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::read::{WireVersion, read_count, read_kv, read_string};
use crate::types::{DecodeError, GGUFValue, file_type_name};

/// A decoded GGUF container: the metadata dictionary plus the parameter
/// total accumulated over the tensor descriptors.
///
/// Tensor descriptors themselves are not retained — the decoder folds
/// each one's element count into `parameters` and drops the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GgufModel {
    version: u32,
    kv: HashMap<String, GGUFValue>,
    parameters: u64,
}

impl GgufModel {
    /// Decode a GGUF container positioned just past its magic.
    ///
    /// `B` is fixed by which magic variant selected this decoder. The
    /// version field picks the count width once; every length-prefixed
    /// read after that depends on it, so the choice is threaded through
    /// explicitly rather than kept as mutable state.
    pub fn decode<B: ByteOrder, R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        let version = r.read_u32::<B>()?;
        let wire = WireVersion::from_version(version);

        let tensor_count = read_count::<B, R>(r, wire)?;
        let kv_count = read_count::<B, R>(r, wire)?;

        let mut kv = HashMap::new();
        for _ in 0..kv_count {
            let (key, value) = read_kv::<B, R>(r, wire)?;
            kv.insert(key, value); // duplicate keys: last write wins
        }

        let mut parameters: u64 = 0;
        for _ in 0..tensor_count {
            read_string::<B, R>(r, wire)?; // tensor name, unused here

            let dimensions = r.read_u32::<B>()?;
            let mut elements: u64 = 1;
            for _ in 0..dimensions {
                elements = elements.wrapping_mul(r.read_u64::<B>()?);
            }

            r.read_u32::<B>()?; // element type
            r.read_u64::<B>()?; // byte offset

            parameters = parameters.wrapping_add(elements);
        }

        debug!(version, kv_count, tensor_count, parameters, "gguf decode complete");

        Ok(Self {
            version,
            kv,
            parameters,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Total element count over all tensors; a fallback size estimate
    /// when no explicit parameter-count key exists.
    pub fn parameters(&self) -> u64 {
        self.parameters
    }

    pub fn metadata(&self) -> &HashMap<String, GGUFValue> {
        &self.kv
    }

    //  Derived queries. All tolerate absent or mistyped keys by
    //  degrading to a sentinel; none perform further I/O.

    /// `general.architecture`, or "unknown".
    pub fn model_family(&self) -> &str {
        self.kv
            .get("general.architecture")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
    }

    /// Approximate size class, e.g. "7B".
    ///
    /// Prefers the accumulated parameter total; otherwise falls back to
    /// per-family block-count tables. The llama branch reports a fixed
    /// "70B" whenever head_count / head_count_kv == 8 — a known
    /// approximation for grouped-query models, kept for compatibility
    /// with what producers of these files expect.
    pub fn model_type(&self) -> String {
        if self.parameters > 0 {
            return human_number(self.parameters);
        }

        let family = self.model_family();
        let blocks = self
            .kv
            .get(&format!("{family}.block_count"))
            .and_then(|v| v.as_u32());

        match (family, blocks) {
            ("llama", Some(blocks)) => {
                let heads = self.kv.get("llama.head_count").and_then(|v| v.as_u32());
                let head_kvs = self.kv.get("llama.head_count_kv").and_then(|v| v.as_u32());
                if let (Some(heads), Some(head_kvs)) = (heads, head_kvs) {
                    if head_kvs != 0 && heads / head_kvs == 8 {
                        return "70B".to_string();
                    }
                }
                llama_model_type(blocks).to_string()
            }
            ("falcon", Some(blocks)) => falcon_model_type(blocks).to_string(),
            ("starcoder", Some(blocks)) => starcoder_model_type(blocks).to_string(),
            _ => "unknown".to_string(),
        }
    }

    /// Quantization scheme name from `general.file_type`, or "unknown".
    pub fn file_type(&self) -> &'static str {
        match self.kv.get("general.file_type").and_then(|v| v.as_u32()) {
            Some(ft) => file_type_name(ft),
            None => "unknown",
        }
    }

    /// `<family>.block_count`, or 0 when absent or mistyped.
    pub fn num_layers(&self) -> u32 {
        self.kv
            .get(&format!("{}.block_count", self.model_family()))
            .and_then(|v| v.as_u32())
            .unwrap_or(0)
    }
}

//  Size labels

/// Format a count with a K/M/B magnitude suffix, no decimals.
fn human_number(n: u64) -> String {
    const THOUSAND: u64 = 1_000;
    const MILLION: u64 = 1_000_000;
    const BILLION: u64 = 1_000_000_000;

    if n > BILLION {
        format!("{:.0}B", (n as f64 / BILLION as f64).round())
    } else if n > MILLION {
        format!("{:.0}M", (n as f64 / MILLION as f64).round())
    } else if n > THOUSAND {
        format!("{:.0}K", (n as f64 / THOUSAND as f64).round())
    } else {
        format!("{n}")
    }
}

fn llama_model_type(blocks: u32) -> &'static str {
    match blocks {
        26 => "3B",
        32 => "7B",
        40 => "13B",
        48 => "34B",
        60 => "30B",
        80 => "65B",
        _ => "unknown",
    }
}

fn falcon_model_type(blocks: u32) -> &'static str {
    match blocks {
        32 => "7B",
        60 => "40B",
        80 => "180B",
        _ => "unknown",
    }
}

fn starcoder_model_type(blocks: u32) -> &'static str {
    match blocks {
        24 => "1B",
        36 => "3B",
        42 => "7B",
        40 => "15B",
        _ => "unknown",
    }
}
