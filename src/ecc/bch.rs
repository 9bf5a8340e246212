//! BCH (Bose-Chaudhuri-Hocquenghem) error correction code implementation.
//!
//! BCH codes are a class of cyclic error-correcting codes constructed using polynomials over finite fields.
//! This module implements the binary BCH(15,11) code over GF(2^4) correcting a single bit error per
//! 15-bit block, the code used by the storage tools to protect raw byte buffers.
//!
//! - The generator polynomial is synthesized once from the field tables and shared read-only
//! - Encoding is systematic: a linear-feedback shift register of length `n - k` divides the message
//!   by the generator, and the codeword is the register contents followed by the message bits
//! - Decoding computes the `2t` syndromes and scans every bit position for a zero locator checksum
//!
//! Bits are addressed most-significant-bit first inside each byte, both when slicing the input
//! into 11-bit messages and when packing 15-bit codewords into the output.
//!
//! Decoding only consumes whole 15-bit codewords. Trailing bits that do not fill a codeword are
//! padding and are ignored, so a decoded buffer is [`bch_decoded_len`] bytes long.
//!
//! # Limitations
//!
//! The locator scan is only sound for a single error. Two or more flipped bits in a block are
//! not detected: the decoder flips a third bit, lands on a different valid codeword and reports
//! one corrected bit.

use crate::ecc::bits::MsbFirst;
use crate::ecc::chunk::{self, BlockOutcome, BlockTransform, ChunkReport, Decoded};
use crate::ecc::galois::GaloisField;
use crate::ecc::generator::GeneratorPolynomial;
use crate::ecc::scratch::ScratchRegion;
use crate::ecc::{ErrorCorrection, Result};
use crate::error::Error;
use bitvec::prelude::*;
use std::fmt::{Display, Formatter};
use std::sync::OnceLock;

/// Field degree m, the code works in GF(2^m)
pub const BCH_M: u32 = 4;

/// Number of correctable bit errors per block (t)
pub const BCH_T: usize = 1;

/// Code length n = 2^m - 1
pub const BCH_N: usize = (1 << BCH_M) - 1;

/// Message length k
pub const BCH_K: usize = 11;

/// Parity bits per codeword, the generator degree
const PARITY_BITS: usize = BCH_N - BCH_K;

/// Syndromes computed per block
const SYNDROMES: usize = 2 * BCH_T;

/// Instance behind the free functions, built on first use
static SHARED: OnceLock<Result<BchCode>> = OnceLock::new();

/// BCH(15,11) code with its field tables and generator polynomial
#[derive(Debug, Clone)]
pub struct BchCode {
    /// GF(2^4) exponent and logarithm tables
    field: GaloisField,
    /// Generator polynomial of degree n - k
    generator: GeneratorPolynomial,
    /// Generator coefficients g_0..g_(n-k) as register taps
    taps: [bool; PARITY_BITS + 1],
}

impl BchCode {
    /// Builds the field tables and the generator polynomial.
    ///
    /// # Returns
    ///
    /// A new, independent `BchCode` instance
    pub fn new() -> Result<Self> {
        Self::with_field(GaloisField::gf16()?)
    }

    /// Builds the code over an existing GF(2^4) field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field does not have `n` nonzero elements or
    /// the synthesized generator does not have degree `n - k`.
    pub fn with_field(field: GaloisField) -> Result<Self> {
        if field.order() != BCH_N {
            return Err(Error::InvalidInput(format!(
                "BCH({},{}) needs a field with {} nonzero elements, got {}",
                BCH_N,
                BCH_K,
                BCH_N,
                field.order()
            )));
        }

        let generator = GeneratorPolynomial::synthesize(&field, BCH_T)?;
        if generator.degree() != PARITY_BITS {
            return Err(Error::InvalidInput(format!(
                "Generator polynomial degree ({}) must equal n - k ({})",
                generator.degree(),
                PARITY_BITS
            )));
        }

        let mut taps = [false; PARITY_BITS + 1];
        for (i, tap) in taps.iter_mut().enumerate() {
            *tap = generator.coefficient(i);
        }

        Ok(BchCode {
            field,
            generator,
            taps,
        })
    }

    /// The process-wide instance, built exactly once on first use
    pub fn shared() -> Result<&'static BchCode> {
        SHARED.get_or_init(BchCode::new).as_ref().map_err(Clone::clone)
    }

    /// Get the code length (n)
    pub fn code_length(&self) -> usize {
        BCH_N
    }

    /// Get the data length (k)
    pub fn data_length(&self) -> usize {
        BCH_K
    }

    /// Get the error correction capability (t)
    pub fn error_correction_capability(&self) -> usize {
        BCH_T
    }

    /// Field the code is defined over
    pub fn field(&self) -> &GaloisField {
        &self.field
    }

    /// Generator polynomial
    pub fn generator(&self) -> &GeneratorPolynomial {
        &self.generator
    }

    /// Encodes one 11-bit message into a 15-bit codeword.
    ///
    /// The message is fed through the shift register bit by bit; afterwards
    /// the register holds the parity bits. The codeword is those parity bits
    /// followed by the unchanged message.
    pub fn encode_block(&self, message: &[bool; BCH_K]) -> [bool; BCH_N] {
        let mut register = [false; PARITY_BITS];

        for &bit in message {
            let feedback = bit ^ register[PARITY_BITS - 1];
            for j in (1..PARITY_BITS).rev() {
                register[j] = register[j - 1] ^ (feedback && self.taps[j]);
            }
            register[0] = feedback && self.taps[0];
        }

        let mut codeword = [false; BCH_N];
        codeword[..PARITY_BITS].copy_from_slice(&register);
        codeword[PARITY_BITS..].copy_from_slice(message);
        codeword
    }

    /// Corrects one received 15-bit block in place.
    ///
    /// # Returns
    ///
    /// The number of bits flipped, 0 when every syndrome is zero
    pub fn decode_block(&self, codeword: &mut [bool; BCH_N]) -> usize {
        self.correct(codeword).corrected_bits
    }

    fn correct(&self, codeword: &mut [bool; BCH_N]) -> BlockOutcome {
        let syndromes = self.syndromes(codeword);
        if syndromes.iter().all(|&s| s == 0) {
            return BlockOutcome::clean();
        }

        let (locations, found) = self.locate_errors(&syndromes);
        if found == 0 {
            return BlockOutcome::uncorrectable();
        }

        for &position in &locations[..found] {
            codeword[position] = !codeword[position];
        }

        BlockOutcome::corrected(found)
    }

    /// Message bits of a codeword
    pub fn message_of(codeword: &[bool; BCH_N]) -> [bool; BCH_K] {
        let mut message = [false; BCH_K];
        message.copy_from_slice(&codeword[PARITY_BITS..]);
        message
    }

    /// Syndromes S_1..S_2t: the received word evaluated at α^1..α^2t
    pub fn syndromes(&self, codeword: &[bool; BCH_N]) -> [u32; SYNDROMES] {
        let mut syndromes = [0u32; SYNDROMES];

        for (i, syndrome) in syndromes.iter_mut().enumerate() {
            for (position, &bit) in codeword.iter().enumerate() {
                if bit {
                    *syndrome ^= self.field.alpha_pow((i + 1) * degree_of(position));
                }
            }
        }

        syndromes
    }

    /// The codeword as a GF(2) polynomial, coefficient of x^i at index i.
    ///
    /// Parity bit `j` is the coefficient of x^j. The register consumes
    /// message bit 0 first, so message bit `i` is the coefficient of
    /// x^(n-1-i).
    pub fn codeword_polynomial(codeword: &[bool; BCH_N]) -> [bool; BCH_N] {
        let mut poly = [false; BCH_N];
        for (position, &bit) in codeword.iter().enumerate() {
            poly[degree_of(position)] = bit;
        }
        poly
    }

    /// Scans positions for a zero locator checksum, stopping after `t` hits.
    ///
    /// For a candidate of degree d the checksum is
    /// `S_1 α^(-d) + S_2 α^(-2d) + ... + S_2t α^(-2t d)`.
    /// A single error at degree e makes every term 1 at d = e, and an even
    /// number of ones sums to zero.
    fn locate_errors(&self, syndromes: &[u32; SYNDROMES]) -> ([usize; BCH_T], usize) {
        let order = self.field.order();
        let mut locations = [0usize; BCH_T];
        let mut found = 0;

        for position in 0..BCH_N {
            if found == BCH_T {
                break;
            }

            let degree = degree_of(position);
            let mut checksum = 0;
            for (j, &syndrome) in syndromes.iter().enumerate() {
                if let Some(log) = self.field.log(syndrome) {
                    let shift = ((j + 1) * degree) % order;
                    checksum ^= self.field.alpha_pow(log + order - shift);
                }
            }

            if checksum == 0 {
                locations[found] = position;
                found += 1;
            }
        }

        (locations, found)
    }

    /// Encode a byte buffer
    ///
    /// # Arguments
    ///
    /// * `data` - Input data bytes to encode
    ///
    /// # Returns
    ///
    /// [`bch_encoded_size`]`(data.len())` encoded bytes
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut scratch = ScratchRegion::default();
        chunk::run(&BchEncoder::new(self), data, &mut scratch).map(|encoded| encoded.data)
    }

    /// Encode into a caller-owned buffer of at least [`bch_encoded_size`] bytes
    pub fn encode_into(&self, data: &[u8], output: &mut [u8]) -> Result<ChunkReport> {
        let mut scratch = ScratchRegion::default();
        chunk::run_into(&BchEncoder::new(self), data, output, &mut scratch)
    }

    /// Decode BCH-encoded data and correct errors
    ///
    /// # Arguments
    ///
    /// * `data` - Encoded data bytes to decode
    ///
    /// # Returns
    ///
    /// [`bch_decoded_len`]`(data.len())` decoded bytes
    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.decode_with_report(data).map(|decoded| decoded.data)
    }

    /// Decode and report how many bits were corrected
    pub fn decode_with_report(&self, data: &[u8]) -> Result<Decoded> {
        let mut scratch = ScratchRegion::default();
        chunk::run(&BchDecoder::new(self), data, &mut scratch)
    }

    /// Decode into a caller-owned buffer of at least [`bch_decoded_len`] bytes
    pub fn decode_into(&self, data: &[u8], output: &mut [u8]) -> Result<ChunkReport> {
        let mut scratch = ScratchRegion::default();
        chunk::run_into(&BchDecoder::new(self), data, output, &mut scratch)
    }
}

impl Display for BchCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BCH({},{},{}) over GF(2^{})", BCH_N, BCH_K, BCH_T, BCH_M)
    }
}

impl ErrorCorrection for BchCode {
    fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        BchCode::encode(self, data)
    }

    fn decode_with_report(&self, data: &[u8]) -> Result<Decoded> {
        BchCode::decode_with_report(self, data)
    }

    fn encoded_len(&self, input_len: usize) -> usize {
        bch_encoded_size(input_len)
    }

    fn decoded_len(&self, input_len: usize) -> usize {
        bch_decoded_len(input_len)
    }
}

/// Polynomial degree carried by a codeword position
fn degree_of(position: usize) -> usize {
    if position < PARITY_BITS {
        position
    } else {
        BCH_N - 1 - (position - PARITY_BITS)
    }
}

/// Block transform turning 11-bit messages into 15-bit codewords
#[derive(Debug, Clone, Copy)]
pub struct BchEncoder<'a> {
    code: &'a BchCode,
}

impl<'a> BchEncoder<'a> {
    pub fn new(code: &'a BchCode) -> Self {
        BchEncoder { code }
    }
}

impl BlockTransform for BchEncoder<'_> {
    type Addressing = MsbFirst;
    const NAME: &'static str = "bch encode";

    fn input_bits(&self) -> usize {
        BCH_K
    }

    fn output_bits(&self) -> usize {
        BCH_N
    }

    fn transform_block(
        &self,
        input: &mut BitSlice<u8, Msb0>,
        output: &mut BitSlice<u8, Msb0>,
    ) -> BlockOutcome {
        let mut message = [false; BCH_K];
        for (slot, bit) in message.iter_mut().zip(input.iter().by_vals()) {
            *slot = bit;
        }

        let codeword = self.code.encode_block(&message);
        for (i, &bit) in codeword.iter().enumerate() {
            output.set(i, bit);
        }

        BlockOutcome::clean()
    }
}

/// Block transform correcting 15-bit codewords and emitting their messages
#[derive(Debug, Clone, Copy)]
pub struct BchDecoder<'a> {
    code: &'a BchCode,
}

impl<'a> BchDecoder<'a> {
    pub fn new(code: &'a BchCode) -> Self {
        BchDecoder { code }
    }
}

impl BlockTransform for BchDecoder<'_> {
    type Addressing = MsbFirst;
    const NAME: &'static str = "bch decode";

    fn input_bits(&self) -> usize {
        BCH_N
    }

    fn output_bits(&self) -> usize {
        BCH_K
    }

    fn whole_blocks_only(&self) -> bool {
        true
    }

    fn transform_block(
        &self,
        input: &mut BitSlice<u8, Msb0>,
        output: &mut BitSlice<u8, Msb0>,
    ) -> BlockOutcome {
        let mut codeword = [false; BCH_N];
        for (slot, bit) in codeword.iter_mut().zip(input.iter().by_vals()) {
            *slot = bit;
        }

        let outcome = self.code.correct(&mut codeword);

        for (i, &bit) in BchCode::message_of(&codeword).iter().enumerate() {
            output.set(i, bit);
        }

        outcome
    }
}

/// Size of the BCH encoding of `input_len` bytes
///
/// `ceil(ceil(input_len * 8 / k) * n / 8)`
pub fn bch_encoded_size(input_len: usize) -> usize {
    chunk::output_len(input_len, BCH_K, BCH_N)
}

/// Buffer size sufficient for the BCH decoding of `input_len` encoded bytes
///
/// `ceil(ceil(input_len * 8 / n) * k / 8)`, at least [`bch_decoded_len`]
pub fn bch_decoded_size(input_len: usize) -> usize {
    chunk::output_len(input_len, BCH_N, BCH_K)
}

/// Exact length of the BCH decoding of `input_len` encoded bytes
///
/// `ceil(floor(input_len * 8 / n) * k / 8)`: a trailing partial codeword is dropped
pub fn bch_decoded_len(input_len: usize) -> usize {
    chunk::whole_block_output_len(input_len, BCH_N, BCH_K)
}

/// Encode data using the shared BCH(15,11) code
///
/// # Arguments
///
/// * `input` - Input data bytes to encode
///
/// # Returns
///
/// Encoded data or an error if encoding fails
pub fn encode_bch(input: &[u8]) -> Result<Vec<u8>> {
    BchCode::shared()?.encode(input)
}

/// Decode data using the shared BCH(15,11) code
///
/// # Arguments
///
/// * `input` - Encoded data bytes to decode
///
/// # Returns
///
/// Decoded data with single-bit errors corrected in every block
pub fn decode_bch(input: &[u8]) -> Result<Vec<u8>> {
    BchCode::shared()?.decode(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_from(value: u16) -> [bool; BCH_K] {
        let mut message = [false; BCH_K];
        for (i, bit) in message.iter_mut().enumerate() {
            *bit = value & (1 << i) != 0;
        }
        message
    }

    #[test]
    fn test_bch_code_creation() {
        let code = BchCode::new().unwrap();
        assert_eq!(code.code_length(), 15);
        assert_eq!(code.data_length(), 11);
        assert_eq!(code.error_correction_capability(), 1);
        assert_eq!(code.generator().degree(), 4);
        assert_eq!(code.to_string(), "BCH(15,11,1) over GF(2^4)");

        let wrong_field = GaloisField::new(5, 0x25).unwrap();
        assert!(BchCode::with_field(wrong_field).is_err());
    }

    #[test]
    fn test_shared_instance_is_built_once() {
        let a = BchCode::shared().unwrap();
        let b = BchCode::shared().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_zero_message() {
        let code = BchCode::new().unwrap();
        assert_eq!(code.encode_block(&[false; BCH_K]), [false; BCH_N]);
    }

    #[test]
    fn test_last_message_bit_yields_generator_low_terms() {
        let code = BchCode::new().unwrap();
        let mut message = [false; BCH_K];
        message[10] = true;

        let codeword = code.encode_block(&message);
        // g(x) = x^4 + x + 1, so the parity prefix is g_0..g_3 = 1100
        assert_eq!(&codeword[..4], &code.generator().coefficients()[..4]);
        assert_eq!(&codeword[..4], &[true, true, false, false]);
        assert_eq!(&codeword[4..], &message);

        // Flipping bit 0 is repaired with exactly one correction
        let mut received = codeword;
        received[0] = !received[0];
        assert_eq!(code.decode_block(&mut received), 1);
        assert_eq!(received, codeword);
        assert_eq!(BchCode::message_of(&received), message);
    }

    #[test]
    fn test_encode_decode_no_errors() {
        let code = BchCode::new().unwrap();
        for value in 0..(1u16 << BCH_K) {
            let message = message_from(value);
            let mut codeword = code.encode_block(&message);
            assert_eq!(code.decode_block(&mut codeword), 0);
            assert_eq!(BchCode::message_of(&codeword), message);
        }
    }

    #[test]
    fn test_single_bit_correction() {
        let code = BchCode::new().unwrap();
        for value in 0..(1u16 << BCH_K) {
            let message = message_from(value);
            let codeword = code.encode_block(&message);

            for position in 0..BCH_N {
                let mut received = codeword;
                received[position] = !received[position];

                assert_eq!(code.decode_block(&mut received), 1);
                assert_eq!(received, codeword, "position {}", position);
            }
        }
    }

    #[test]
    fn test_codewords_divisible_by_generator() {
        let code = BchCode::new().unwrap();
        for value in 0..(1u16 << BCH_K) {
            let codeword = code.encode_block(&message_from(value));
            let poly = BchCode::codeword_polynomial(&codeword);
            assert!(code.generator().divides(&poly).unwrap(), "message {}", value);
            assert_eq!(code.syndromes(&codeword), [0; SYNDROMES]);
        }
    }

    #[test]
    fn test_two_errors_exceed_single_error_guarantee() {
        // The locator only handles one error. Two flips are not detected: the decoder
        // moves to the nearest other codeword and still reports a single correction.
        let code = BchCode::new().unwrap();
        let message = message_from(0b101_1010_0110);
        let codeword = code.encode_block(&message);

        for first in 0..BCH_N {
            for second in first + 1..BCH_N {
                let mut received = codeword;
                received[first] = !received[first];
                received[second] = !received[second];

                assert_eq!(code.decode_block(&mut received), 1);
                assert_eq!(code.syndromes(&received), [0; SYNDROMES]);
                assert_ne!(BchCode::message_of(&received), message);
            }
        }
    }

    #[test]
    fn test_size_formulas() {
        assert_eq!(bch_encoded_size(0), 0);
        assert_eq!(bch_encoded_size(1), 2);
        assert_eq!(bch_encoded_size(11), 15);
        assert_eq!(bch_encoded_size(12), 17);

        assert_eq!(bch_decoded_size(0), 0);
        assert_eq!(bch_decoded_size(2), 3);
        assert_eq!(bch_decoded_size(15), 11);
        assert_eq!(bch_decoded_size(17), 14);

        assert_eq!(bch_decoded_len(0), 0);
        assert_eq!(bch_decoded_len(1), 0);
        assert_eq!(bch_decoded_len(2), 2);
        assert_eq!(bch_decoded_len(15), 11);
        assert_eq!(bch_decoded_len(17), 13);
        for len in 0..64 {
            assert!(bch_decoded_len(len) <= bch_decoded_size(len));
        }
    }

    #[test]
    fn test_msb_first_byte_layout() {
        let code = BchCode::new().unwrap();
        // Message bit 0 alone: parity is x^14 mod g(x) = x^3 + 1
        assert_eq!(code.encode(&[0x80]).unwrap(), vec![0b1001_1000, 0x00]);
        assert_eq!(code.encode(&[0x00]).unwrap(), vec![0x00, 0x00]);
    }

    #[test]
    fn test_encode_decode_bytes() {
        let data = b"Hello world!";
        let encoded = encode_bch(data).unwrap();
        assert_eq!(encoded.len(), bch_encoded_size(data.len()));

        let decoded = decode_bch(&encoded).unwrap();
        assert_eq!(decoded.len(), bch_decoded_len(encoded.len()));
        assert_eq!(decoded.len(), 13);
        assert_eq!(&decoded[..data.len()], data);
        assert!(decoded[data.len()..].iter().all(|&b| b == 0));

        let one_byte = encode_bch(&[0xAB]).unwrap();
        assert_eq!(decode_bch(&one_byte).unwrap(), vec![0xAB, 0x00]);
    }

    #[test]
    fn test_partial_trailing_codeword_is_ignored() {
        // 16 bits hold one codeword of all ones and one stray bit
        let decoded = decode_bch(&[0xFF, 0xFF]).unwrap();
        assert_eq!(decoded, vec![0xFF, 0b1110_0000]);

        // Two codewords in 30 bits, then two nonzero padding bits
        let code = BchCode::new().unwrap();
        let mut encoded = code.encode(&[0x12, 0x34]).unwrap();
        assert_eq!(encoded.len(), 4);
        encoded[3] |= 0b0000_0011;

        let decoded = code.decode_with_report(&encoded).unwrap();
        assert_eq!(decoded.report.blocks, 2);
        assert!(decoded.report.is_clean());
        assert_eq!(decoded.data, vec![0x12, 0x34, 0x00]);

        // Fewer bits than one codeword decode to nothing
        assert!(code.decode(&[0xFF]).unwrap().is_empty());
    }

    #[test]
    fn test_encode_decode_with_errors() {
        let code = BchCode::new().unwrap();
        let data = [0xA5, 0x3C, 0x7E];
        let mut encoded = code.encode(&data).unwrap();

        // Bit 2 of the first codeword, bit 20 of the second
        encoded[0] ^= 0b0010_0000;
        encoded[2] ^= 0b0000_1000;

        let decoded = code.decode_with_report(&encoded).unwrap();
        assert_eq!(&decoded.data[..data.len()], &data);
        assert_eq!(decoded.report.corrected_bits, 2);
        assert_eq!(decoded.report.corrected_blocks, 2);
        assert_eq!(decoded.report.uncorrectable_blocks, 0);
    }

    #[test]
    fn test_empty_input() {
        let code = BchCode::new().unwrap();
        assert!(code.encode(&[]).unwrap().is_empty());
        assert!(code.decode(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_caller_owned_buffers() {
        let code = BchCode::new().unwrap();
        let data = [0x12, 0x34];

        let mut encoded = [0xFFu8; 4];
        let report = code.encode_into(&data, &mut encoded).unwrap();
        assert_eq!(report.output_len, bch_encoded_size(2));
        assert_eq!(&encoded[..report.output_len], &code.encode(&data).unwrap()[..]);

        let mut decoded = [0u8; 1];
        assert!(matches!(
            code.decode_into(&encoded[..3], &mut decoded),
            Err(Error::BufferTooSmall { .. })
        ));
    }
}
