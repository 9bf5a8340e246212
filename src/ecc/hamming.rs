//! Hamming error correction code implementation.
//!
//! Hamming codes are a family of linear error-correcting codes developed by Richard Hamming in 1950.
//! A code with `m` parity bits has codewords of `n = 2^m - 1` bits carrying `k = n - m` data bits
//! and corrects any single flipped bit. The most common variant is the (7,4) code with `m = 3`.
//!
//! Codeword positions are numbered from 1. Positions that are powers of two hold parity bits,
//! every other position holds the next data bit in ascending order. The parity bit at position
//! `2^p` covers every position whose index has bit `p` set, so the syndrome of a received word
//! is the 1-indexed position of a single flipped bit.
//!
//! This implementation provides:
//! - Encoding and decoding of single blocks for any `m` in `2..=16`
//! - Chunked encoding and decoding of arbitrary byte buffers
//!
//! Bits are addressed least-significant-bit first inside each byte.
//!
//! # Applications
//!
//! - Computer memory (ECC RAM)
//! - Disk images and other raw storage that must survive isolated bit flips

use crate::ecc::bits::LsbFirst;
use crate::ecc::chunk::{self, BlockOutcome, BlockTransform, ChunkReport, Decoded};
use crate::ecc::scratch::ScratchRegion;
use crate::ecc::{ErrorCorrection, Result};
use crate::error::Error;
use bitvec::prelude::*;
use std::fmt::{Display, Formatter};

/// Smallest supported number of parity bits, the (3,1) repetition code
pub const MIN_PARITY_BITS: u32 = 2;

/// Largest supported number of parity bits, 65535-bit codewords
pub const MAX_PARITY_BITS: u32 = 16;

/// Result of checking one received block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HammingSyndrome {
    /// Zero syndrome, the block is taken as received
    Clean,
    /// The bit at this 1-indexed position was flipped back
    Corrected { position: usize },
    /// The syndrome points past the codeword; nothing was flipped
    OutOfRange { syndrome: usize },
}

impl HammingSyndrome {
    /// Raw syndrome value
    pub fn value(&self) -> usize {
        match *self {
            HammingSyndrome::Clean => 0,
            HammingSyndrome::Corrected { position } => position,
            HammingSyndrome::OutOfRange { syndrome } => syndrome,
        }
    }

    fn outcome(&self) -> BlockOutcome {
        match self {
            HammingSyndrome::Clean => BlockOutcome::clean(),
            HammingSyndrome::Corrected { .. } => BlockOutcome::corrected(1),
            HammingSyndrome::OutOfRange { .. } => BlockOutcome::uncorrectable(),
        }
    }
}

/// Represents a Hamming code configuration.
/// A Hamming code with `m` parity bits encodes `2^m - 1 - m` data bits per block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HammingCode {
    /// Number of parity bits per block (m)
    parity_bits: u32,
}

impl HammingCode {
    /// Creates a new Hamming code configuration.
    ///
    /// # Arguments
    ///
    /// * `parity_bits` - Number of parity bits `m` per block
    ///
    /// # Returns
    ///
    /// A new `HammingCode` instance or an error if `m` is outside `2..=16`
    pub fn new(parity_bits: u32) -> Result<Self> {
        if !(MIN_PARITY_BITS..=MAX_PARITY_BITS).contains(&parity_bits) {
            return Err(Error::InvalidInput(format!(
                "Parity bits must be between {} and {}, got {}",
                MIN_PARITY_BITS, MAX_PARITY_BITS, parity_bits
            )));
        }

        Ok(HammingCode { parity_bits })
    }

    /// Creates a standard (7,4) Hamming code
    pub fn standard_7_4() -> Self {
        HammingCode { parity_bits: 3 }
    }

    /// Gets the number of parity bits (m)
    pub fn parity_bits(&self) -> u32 {
        self.parity_bits
    }

    /// Gets the total code word length (n = 2^m - 1)
    pub fn total_bits(&self) -> usize {
        (1usize << self.parity_bits) - 1
    }

    /// Gets the number of data bits per block (k = n - m)
    pub fn data_bits(&self) -> usize {
        self.total_bits() - self.parity_bits as usize
    }

    /// Gets the number of encoded bytes needed for a given number of input bytes
    pub fn encoded_bytes_needed(&self, input_bytes: usize) -> usize {
        chunk::output_len(input_bytes, self.data_bits(), self.total_bits())
    }

    /// Gets the number of decoded bytes produced from a given number of encoded bytes
    pub fn decoded_bytes_needed(&self, encoded_bytes: usize) -> usize {
        chunk::output_len(encoded_bytes, self.total_bits(), self.data_bits())
    }

    /// Encodes a single block of `k` data bits into an `n`-bit codeword.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` is longer than `k` bits or `codeword` is
    /// shorter than `n` bits. Missing data bits are taken as zero.
    pub fn encode_block(
        &self,
        data: &BitSlice<u8, Lsb0>,
        codeword: &mut BitSlice<u8, Lsb0>,
    ) -> Result<()> {
        self.check_lengths(data.len(), codeword.len())?;
        self.write_codeword(data, codeword);
        Ok(())
    }

    /// Corrects a single block in place and extracts its `k` data bits.
    ///
    /// # Errors
    ///
    /// Returns an error if `codeword` is shorter than `n` bits or `data` is
    /// longer than `k` bits.
    pub fn decode_block(
        &self,
        codeword: &mut BitSlice<u8, Lsb0>,
        data: &mut BitSlice<u8, Lsb0>,
    ) -> Result<HammingSyndrome> {
        self.check_lengths(data.len(), codeword.len())?;
        Ok(self.correct_and_extract(codeword, data))
    }

    /// Syndrome of a received block: bit `p` is the parity over every
    /// position with bit `p` set, parity slot included
    pub fn syndrome(&self, codeword: &BitSlice<u8, Lsb0>) -> usize {
        // XOR of the positions of all set bits has exactly these parities as its bits
        let n = self.total_bits().min(codeword.len());
        codeword[..n]
            .iter_ones()
            .fold(0, |syndrome, index| syndrome ^ (index + 1))
    }

    fn check_lengths(&self, data_len: usize, codeword_len: usize) -> Result<()> {
        if data_len > self.data_bits() {
            return Err(Error::InputTooLarge {
                length: data_len,
                max_length: self.data_bits(),
            });
        }
        if codeword_len < self.total_bits() {
            return Err(Error::InvalidInput(format!(
                "Codeword buffer holds {} bits, need {}",
                codeword_len,
                self.total_bits()
            )));
        }
        Ok(())
    }

    fn write_codeword(&self, data: &BitSlice<u8, Lsb0>, codeword: &mut BitSlice<u8, Lsb0>) {
        let n = self.total_bits();

        // Data bits go to the non-power-of-two positions, parity slots start cleared
        let mut data_bits = data.iter().by_vals();
        for position in 1..=n {
            let bit = if position.is_power_of_two() {
                false
            } else {
                data_bits.next().unwrap_or(false)
            };
            codeword.set(position - 1, bit);
        }

        // With the parity slots still clear, bit p of the syndrome is the parity
        // the slot at 2^p must carry
        let coverage = self.syndrome(codeword);
        for p in 0..self.parity_bits {
            let slot = 1usize << p;
            codeword.set(slot - 1, coverage & slot != 0);
        }
    }

    fn correct_and_extract(
        &self,
        codeword: &mut BitSlice<u8, Lsb0>,
        data: &mut BitSlice<u8, Lsb0>,
    ) -> HammingSyndrome {
        let n = self.total_bits();
        let syndrome = self.syndrome(codeword);

        let result = if syndrome == 0 {
            HammingSyndrome::Clean
        } else if syndrome <= n {
            let error_pos = syndrome - 1;
            let current = codeword[error_pos];
            codeword.set(error_pos, !current);
            HammingSyndrome::Corrected { position: syndrome }
        } else {
            HammingSyndrome::OutOfRange { syndrome }
        };

        let mut data_idx = 0;
        for position in 1..=n {
            if position.is_power_of_two() {
                continue;
            }
            if data_idx < data.len() {
                data.set(data_idx, codeword[position - 1]);
            }
            data_idx += 1;
        }

        result
    }

    /// Encodes a byte slice using the configured Hamming code
    ///
    /// # Arguments
    ///
    /// * `data` - Data to encode
    ///
    /// # Returns
    ///
    /// The encoded data, [`encoded_bytes_needed`](Self::encoded_bytes_needed) bytes long
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut scratch = ScratchRegion::default();
        self.encode_with_scratch(data, &mut scratch)
    }

    /// Encodes using block buffers from the given scratch region
    pub fn encode_with_scratch(&self, data: &[u8], scratch: &mut ScratchRegion) -> Result<Vec<u8>> {
        chunk::run(&HammingEncoder::new(*self), data, scratch).map(|encoded| encoded.data)
    }

    /// Encodes into a caller-owned buffer of at least
    /// [`encoded_bytes_needed`](Self::encoded_bytes_needed) bytes
    pub fn encode_into(&self, data: &[u8], output: &mut [u8]) -> Result<ChunkReport> {
        let mut scratch = ScratchRegion::default();
        chunk::run_into(&HammingEncoder::new(*self), data, output, &mut scratch)
    }

    /// Decodes Hamming-encoded data, correcting single-bit errors
    ///
    /// # Arguments
    ///
    /// * `encoded` - Data to decode
    ///
    /// # Returns
    ///
    /// The decoded data with errors corrected
    pub fn decode(&self, encoded: &[u8]) -> Result<Vec<u8>> {
        self.decode_with_report(encoded).map(|decoded| decoded.data)
    }

    /// Decodes and reports which blocks needed correction
    pub fn decode_with_report(&self, encoded: &[u8]) -> Result<Decoded> {
        let mut scratch = ScratchRegion::default();
        self.decode_with_scratch(encoded, &mut scratch)
    }

    /// Decodes using block buffers from the given scratch region
    pub fn decode_with_scratch(
        &self,
        encoded: &[u8],
        scratch: &mut ScratchRegion,
    ) -> Result<Decoded> {
        chunk::run(&HammingDecoder::new(*self), encoded, scratch)
    }

    /// Decodes into a caller-owned buffer of at least
    /// [`decoded_bytes_needed`](Self::decoded_bytes_needed) bytes
    pub fn decode_into(&self, encoded: &[u8], output: &mut [u8]) -> Result<ChunkReport> {
        let mut scratch = ScratchRegion::default();
        chunk::run_into(&HammingDecoder::new(*self), encoded, output, &mut scratch)
    }
}

impl Display for HammingCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Hamming({},{})", self.total_bits(), self.data_bits())
    }
}

impl ErrorCorrection for HammingCode {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        HammingCode::encode(self, data)
    }

    fn decode_with_report(&self, data: &[u8]) -> Result<Decoded> {
        HammingCode::decode_with_report(self, data)
    }

    fn encoded_len(&self, input_len: usize) -> usize {
        self.encoded_bytes_needed(input_len)
    }

    fn decoded_len(&self, input_len: usize) -> usize {
        self.decoded_bytes_needed(input_len)
    }
}

/// Block transform turning `k` data bits into `n`-bit codewords
#[derive(Debug, Clone, Copy)]
pub struct HammingEncoder {
    code: HammingCode,
}

impl HammingEncoder {
    pub fn new(code: HammingCode) -> Self {
        HammingEncoder { code }
    }
}

impl BlockTransform for HammingEncoder {
    type Addressing = LsbFirst;
    const NAME: &'static str = "hamming encode";

    fn input_bits(&self) -> usize {
        self.code.data_bits()
    }

    fn output_bits(&self) -> usize {
        self.code.total_bits()
    }

    fn transform_block(
        &self,
        input: &mut BitSlice<u8, Lsb0>,
        output: &mut BitSlice<u8, Lsb0>,
    ) -> BlockOutcome {
        self.code.write_codeword(input, output);
        BlockOutcome::clean()
    }
}

/// Block transform correcting `n`-bit codewords and emitting their data bits
#[derive(Debug, Clone, Copy)]
pub struct HammingDecoder {
    code: HammingCode,
}

impl HammingDecoder {
    pub fn new(code: HammingCode) -> Self {
        HammingDecoder { code }
    }
}

impl BlockTransform for HammingDecoder {
    type Addressing = LsbFirst;
    const NAME: &'static str = "hamming decode";

    fn input_bits(&self) -> usize {
        self.code.total_bits()
    }

    fn output_bits(&self) -> usize {
        self.code.data_bits()
    }

    fn transform_block(
        &self,
        input: &mut BitSlice<u8, Lsb0>,
        output: &mut BitSlice<u8, Lsb0>,
    ) -> BlockOutcome {
        self.code.correct_and_extract(input, output).outcome()
    }
}

/// Calculate the size of the encoded buffer for `dsize` decoded bytes and `m` parity bits
pub fn calculate_encoded_size(dsize: usize, m: u32) -> Result<usize> {
    Ok(HammingCode::new(m)?.encoded_bytes_needed(dsize))
}

/// Calculate the size of the decoded buffer for `esize` encoded bytes and `m` parity bits
pub fn calculate_decoded_size(esize: usize, m: u32) -> Result<usize> {
    Ok(HammingCode::new(m)?.decoded_bytes_needed(esize))
}

/// Encodes an entire array with `m` parity bits per block
///
/// # Returns
///
/// `calculate_encoded_size(input.len(), m)` encoded bytes
pub fn encode_hamming_array(input: &[u8], m: u32) -> Result<Vec<u8>> {
    HammingCode::new(m)?.encode(input)
}

/// Decodes an entire array encoded with `m` parity bits per block
///
/// # Returns
///
/// `calculate_decoded_size(input.len(), m)` decoded bytes
pub fn decode_hamming_array(input: &[u8], m: u32) -> Result<Vec<u8>> {
    HammingCode::new(m)?.decode(input)
}
