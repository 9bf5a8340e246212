//! Codec selection.
//!
//! A [`CodecConfig`] names one of the codecs in this crate and can be parsed
//! from the short spellings used on the command line:
//!
//! | spelling        | codec                          |
//! |-----------------|--------------------------------|
//! | `raw`, `none`   | [`Passthrough`]                |
//! | `bch`           | [`BchCode`], BCH(15,11)        |
//! | `hamming`       | [`HammingCode`] with `m = 4`   |
//! | `hamming:<m>`   | [`HammingCode`] with `m` parity bits |

use crate::ecc::bch::{bch_decoded_len, bch_encoded_size, BchCode};
use crate::ecc::chunk::{ChunkReport, Decoded};
use crate::ecc::hamming::HammingCode;
use crate::ecc::{ErrorCorrection, Result};
use crate::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Parity bits used when a Hamming codec is asked for without a count
pub const DEFAULT_PARITY_BITS: u32 = 4;

/// Which codec to run over a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecConfig {
    /// Copy the bytes unchanged
    Raw,
    /// BCH(15,11) correcting one error per block
    Bch,
    /// Hamming code with the given number of parity bits
    Hamming { parity_bits: u32 },
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig::Hamming {
            parity_bits: DEFAULT_PARITY_BITS,
        }
    }
}

impl CodecConfig {
    /// Hamming with `m` parity bits, or [`CodecConfig::Raw`] for zero
    pub fn from_parity_bits(m: u32) -> Self {
        if m == 0 {
            CodecConfig::Raw
        } else {
            CodecConfig::Hamming { parity_bits: m }
        }
    }

    /// Whether the selected codec addresses bits most-significant first
    pub fn is_msb_first(&self) -> bool {
        matches!(self, CodecConfig::Bch)
    }

    /// Builds the selected codec.
    ///
    /// # Errors
    ///
    /// Returns an error if the parity bit count is out of range or the BCH
    /// tables cannot be built.
    pub fn build(&self) -> Result<Box<dyn ErrorCorrection>> {
        let codec: Box<dyn ErrorCorrection> = match *self {
            CodecConfig::Raw => Box::new(Passthrough),
            CodecConfig::Bch => Box::new(BchCode::new()?),
            CodecConfig::Hamming { parity_bits } => Box::new(HammingCode::new(parity_bits)?),
        };
        Ok(codec)
    }

    /// Encoded size of `input_len` bytes under the selected codec
    pub fn encoded_len(&self, input_len: usize) -> Result<usize> {
        match *self {
            CodecConfig::Raw => Ok(input_len),
            CodecConfig::Bch => Ok(bch_encoded_size(input_len)),
            CodecConfig::Hamming { parity_bits } => {
                Ok(HammingCode::new(parity_bits)?.encoded_bytes_needed(input_len))
            }
        }
    }

    /// Decoded size of `input_len` encoded bytes under the selected codec
    pub fn decoded_len(&self, input_len: usize) -> Result<usize> {
        match *self {
            CodecConfig::Raw => Ok(input_len),
            CodecConfig::Bch => Ok(bch_decoded_len(input_len)),
            CodecConfig::Hamming { parity_bits } => {
                Ok(HammingCode::new(parity_bits)?.decoded_bytes_needed(input_len))
            }
        }
    }
}

impl FromStr for CodecConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let spelling = s.trim().to_ascii_lowercase();
        match spelling.as_str() {
            "raw" | "none" => Ok(CodecConfig::Raw),
            "bch" => Ok(CodecConfig::Bch),
            "hamming" => Ok(CodecConfig::default()),
            other => {
                let m = other
                    .strip_prefix("hamming:")
                    .ok_or_else(|| Error::InvalidInput(format!("Unknown codec '{}'", s)))?;
                let parity_bits = m.parse::<u32>().map_err(|_| {
                    Error::InvalidInput(format!("Invalid parity bit count '{}'", m))
                })?;
                HammingCode::new(parity_bits)?;
                Ok(CodecConfig::Hamming { parity_bits })
            }
        }
    }
}

impl Display for CodecConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecConfig::Raw => write!(f, "raw"),
            CodecConfig::Bch => write!(f, "bch"),
            CodecConfig::Hamming { parity_bits } => write!(f, "hamming:{}", parity_bits),
        }
    }
}

/// Codec that copies its input unchanged in both directions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Passthrough;

impl ErrorCorrection for Passthrough {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decode_with_report(&self, data: &[u8]) -> Result<Decoded> {
        Ok(Decoded {
            data: data.to_vec(),
            report: ChunkReport {
                output_len: data.len(),
                ..ChunkReport::default()
            },
        })
    }

    fn encoded_len(&self, input_len: usize) -> usize {
        input_len
    }

    fn decoded_len(&self, input_len: usize) -> usize {
        input_len
    }
}
