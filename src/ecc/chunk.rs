//! Block chunking drivers.
//!
//! A driver splits an input byte buffer into fixed-size bit blocks, feeds each
//! block through a [`BlockTransform`] and packs the results back to back into
//! an output buffer. The final input block is zero-padded past the end of the
//! input; the output is rounded up to a whole byte with zero padding bits.
//!
//! For an input of `len` bytes, `in` bits per input block and `out` bits per
//! output block the output is exactly
//! `ceil(ceil(len * 8 / in) * out / 8)` bytes long.
//!
//! A transform that only accepts whole blocks (see
//! [`BlockTransform::whole_blocks_only`]) instead ignores a trailing partial
//! block and produces `ceil(floor(len * 8 / in) * out / 8)` bytes.

use crate::ecc::bits::{BitAddressing, OrderOf};
use crate::ecc::scratch::ScratchRegion;
use crate::ecc::Result;
use crate::error::Error;
use bitvec::prelude::*;

/// What a block transform did to one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockOutcome {
    /// Bits flipped by the decoder
    pub corrected_bits: usize,
    /// The decoder saw an error pattern it could not repair
    pub uncorrectable: bool,
}

impl BlockOutcome {
    /// Nothing to correct
    pub fn clean() -> Self {
        Self::default()
    }

    /// `bits` bits were flipped back
    pub fn corrected(bits: usize) -> Self {
        BlockOutcome {
            corrected_bits: bits,
            uncorrectable: false,
        }
    }

    /// The block was left as received
    pub fn uncorrectable() -> Self {
        BlockOutcome {
            corrected_bits: 0,
            uncorrectable: true,
        }
    }
}

/// Summary of one driver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkReport {
    /// Blocks processed, including the padded final block
    pub blocks: usize,
    /// Bytes written to the output
    pub output_len: usize,
    /// Total bits flipped by the decoder
    pub corrected_bits: usize,
    /// Blocks in which at least one bit was flipped
    pub corrected_blocks: usize,
    /// Blocks left uncorrected because their pattern was out of reach
    pub uncorrectable_blocks: usize,
}

impl ChunkReport {
    /// Whether every block decoded without any correction
    pub fn is_clean(&self) -> bool {
        self.corrected_bits == 0 && self.uncorrectable_blocks == 0
    }

    fn absorb(&mut self, block: usize, outcome: BlockOutcome) {
        if outcome.corrected_bits > 0 {
            log::trace!(
                "block {}: corrected {} bit(s)",
                block,
                outcome.corrected_bits
            );
            self.corrected_bits += outcome.corrected_bits;
            self.corrected_blocks += 1;
        }
        if outcome.uncorrectable {
            log::warn!("block {}: uncorrectable error pattern left as is", block);
            self.uncorrectable_blocks += 1;
        }
    }
}

/// Decoded bytes together with what the decoder did to produce them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Decoded bytes, sized by the decoded-size formula
    pub data: Vec<u8>,
    /// Per-run correction summary
    pub report: ChunkReport,
}

/// A per-block codec step the chunk drivers can apply.
pub trait BlockTransform {
    /// Bit addressing convention of both the input and the output buffer
    type Addressing: BitAddressing;

    /// Name used in log output
    const NAME: &'static str;

    /// Bits consumed per block
    fn input_bits(&self) -> usize;

    /// Bits produced per block
    fn output_bits(&self) -> usize;

    /// Whether a trailing partial input block is dropped instead of padded
    fn whole_blocks_only(&self) -> bool {
        false
    }

    /// Transforms one block.
    ///
    /// `input` is a private zero-padded copy the transform may modify (a
    /// decoder corrects it in place). `output` arrives zeroed.
    fn transform_block(
        &self,
        input: &mut BitSlice<u8, OrderOf<Self::Addressing>>,
        output: &mut BitSlice<u8, OrderOf<Self::Addressing>>,
    ) -> BlockOutcome;
}

/// Number of blocks of `block_bits` needed to cover `input_len` bytes
pub fn block_count(input_len: usize, block_bits: usize) -> usize {
    (input_len * 8).div_ceil(block_bits)
}

/// Number of complete blocks of `block_bits` in `input_len` bytes
pub fn whole_block_count(input_len: usize, block_bits: usize) -> usize {
    input_len * 8 / block_bits
}

/// Exact output size in bytes when turning `input_len` bytes of
/// `input_bits`-bit blocks into `output_bits`-bit blocks
pub fn output_len(input_len: usize, input_bits: usize, output_bits: usize) -> usize {
    (block_count(input_len, input_bits) * output_bits).div_ceil(8)
}

/// Output size in bytes when only complete input blocks are transformed
pub fn whole_block_output_len(input_len: usize, input_bits: usize, output_bits: usize) -> usize {
    (whole_block_count(input_len, input_bits) * output_bits).div_ceil(8)
}

fn planned_blocks<T: BlockTransform>(transform: &T, input_len: usize) -> usize {
    if transform.whole_blocks_only() {
        whole_block_count(input_len, transform.input_bits())
    } else {
        block_count(input_len, transform.input_bits())
    }
}

/// Runs `transform` over `input`, writing into the caller-owned `output`.
///
/// Only the first [`output_len`] (or [`whole_block_output_len`]) bytes of
/// `output` are touched; they are zeroed before any block is written.
///
/// # Errors
///
/// Returns [`Error::BufferTooSmall`] if `output` is shorter than the size
/// formula, [`Error::OutOfMemory`] if the scratch region cannot provide the
/// two block buffers, or [`Error::InvalidInput`] for a transform with empty
/// blocks.
pub fn run_into<T: BlockTransform>(
    transform: &T,
    input: &[u8],
    output: &mut [u8],
    scratch: &mut ScratchRegion,
) -> Result<ChunkReport> {
    let in_bits = transform.input_bits();
    let out_bits = transform.output_bits();
    if in_bits == 0 || out_bits == 0 {
        return Err(Error::InvalidInput(format!(
            "{}: block sizes must be positive",
            T::NAME
        )));
    }

    let blocks = planned_blocks(transform, input.len());
    let needed = (blocks * out_bits).div_ceil(8);
    if output.len() < needed {
        return Err(Error::BufferTooSmall {
            needed,
            available: output.len(),
        });
    }

    let output = &mut output[..needed];
    output.fill(0);

    let mut block_in = scratch.allocate::<OrderOf<T::Addressing>>(in_bits)?;
    let mut block_out = match scratch.allocate::<OrderOf<T::Addressing>>(out_bits) {
        Ok(buffer) => buffer,
        Err(err) => {
            scratch.release(block_in);
            return Err(err);
        }
    };

    log::debug!(
        "{} ({}): {} bytes in {} blocks of {} -> {} bits, {} bytes out",
        T::NAME,
        <T::Addressing as BitAddressing>::NAME,
        input.len(),
        blocks,
        in_bits,
        out_bits,
        needed
    );

    let source = T::Addressing::view(input);
    let sink = T::Addressing::view_mut(output);
    let mut report = ChunkReport {
        blocks,
        output_len: needed,
        ..ChunkReport::default()
    };

    for block in 0..blocks {
        let start = block * in_bits;
        let end = (start + in_bits).min(source.len());

        block_in.fill(false);
        block_in[..end - start].copy_from_bitslice(&source[start..end]);
        block_out.fill(false);

        let outcome = transform.transform_block(&mut block_in, &mut block_out);
        report.absorb(block, outcome);

        let at = block * out_bits;
        sink[at..at + out_bits].copy_from_bitslice(&block_out);
    }

    scratch.release(block_in);
    scratch.release(block_out);
    Ok(report)
}

/// Runs `transform` over `input` into a freshly allocated output buffer.
///
/// # Errors
///
/// As [`run_into`]; the output reservation failing is also reported as
/// [`Error::OutOfMemory`].
pub fn run<T: BlockTransform>(
    transform: &T,
    input: &[u8],
    scratch: &mut ScratchRegion,
) -> Result<Decoded> {
    if transform.input_bits() == 0 {
        return Err(Error::InvalidInput(format!(
            "{}: block sizes must be positive",
            T::NAME
        )));
    }
    let needed = (planned_blocks(transform, input.len()) * transform.output_bits()).div_ceil(8);

    let mut data = Vec::new();
    data.try_reserve_exact(needed)
        .map_err(|_| Error::OutOfMemory {
            requested: needed,
            available: 0,
        })?;
    data.resize(needed, 0);

    let report = run_into(transform, input, &mut data, scratch)?;
    Ok(Decoded { data, report })
}
