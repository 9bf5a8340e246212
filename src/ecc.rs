//! Error correction code implementations.
//!
//! This module provides two single-error-correcting block code families that
//! operate on raw bit buffers:
//! - A BCH(15,11) code over GF(2^4), encoded with a linear-feedback shift
//!   register and decoded from its syndromes
//! - The Hamming code family, parametrized by its number of parity bits `m`
//!
//! Both families expand an arbitrary byte buffer block by block. Encoded
//! buffers carry no header: their length follows from the size formulas
//! ([`bch_encoded_size`], [`calculate_encoded_size`]) and the trailing bits
//! of the last byte are zero padding.
//!
//! # Bit addressing
//!
//! The two families pack bits differently and the difference is part of
//! their on-wire format: BCH addresses bits most-significant-bit first within
//! a byte, Hamming least-significant-bit first. See [`bits`].
//!
//! # Examples
//!
//! ```rust
//! use bitfec::ecc::{decode_hamming_array, encode_hamming_array};
//!
//! let data = b"Hello world!";
//! let mut encoded = encode_hamming_array(data, 4).unwrap();
//! encoded[3] ^= 0x10;
//!
//! let decoded = decode_hamming_array(&encoded, 4).unwrap();
//! assert_eq!(&decoded[..data.len()], data);
//! ```

use crate::error::Error;

/// Result type for error correction operations
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for error correction code implementations
pub trait ErrorCorrection {
    /// Encode data with error correction bits
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decode data and correct errors if possible
    fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.decode_with_report(data).map(|decoded| decoded.data)
    }

    /// Decode data and report what the decoder corrected
    fn decode_with_report(&self, data: &[u8]) -> Result<Decoded>;

    /// Exact length of the encoding of `input_len` bytes
    fn encoded_len(&self, input_len: usize) -> usize;

    /// Exact length of the decoding of `input_len` encoded bytes
    fn decoded_len(&self, input_len: usize) -> usize;
}

pub mod bits;
pub use bits::{BitAddressing, LsbFirst, MsbFirst};

pub mod galois;
pub use galois::GaloisField;

pub mod generator;
pub use generator::GeneratorPolynomial;

pub mod scratch;
pub use scratch::ScratchRegion;

pub mod chunk;
pub use chunk::{BlockOutcome, BlockTransform, ChunkReport, Decoded};

pub mod bch;
pub use bch::{
    bch_decoded_len, bch_decoded_size, bch_encoded_size, decode_bch, encode_bch, BchCode,
    BchDecoder, BchEncoder, BCH_K, BCH_M, BCH_N, BCH_T,
};

pub mod hamming;
pub use hamming::{
    calculate_decoded_size, calculate_encoded_size, decode_hamming_array, encode_hamming_array,
    HammingCode, HammingDecoder, HammingEncoder, HammingSyndrome,
};

pub mod config;
pub use config::{CodecConfig, Passthrough};

pub mod noise;
