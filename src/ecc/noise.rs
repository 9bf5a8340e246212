//! Bit-flip fault injection.
//!
//! Utilities for corrupting encoded buffers the way a noisy channel or a
//! scratched medium would: uniformly chosen flips, independent flips with a
//! fixed probability, contiguous bursts, and one flip per codeword.
//! Bit indices follow the addressing strategy `A` so they line up with the
//! codec whose output is being corrupted.

use crate::ecc::bits::BitAddressing;
use crate::ecc::Result;
use crate::error::Error;
use rand::distributions::{Bernoulli, Distribution};
use rand::seq::index;
use rand::Rng;

/// Flips `count` distinct bits chosen uniformly at random.
///
/// Returns the flipped bit indices in ascending order.
///
/// # Errors
///
/// Returns [`Error::InputTooLarge`] if `count` exceeds the number of bits in
/// `buf`.
pub fn flip_random_bits<A: BitAddressing, R: Rng + ?Sized>(
    buf: &mut [u8],
    count: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let total = buf.len() * 8;
    if count > total {
        return Err(Error::InputTooLarge {
            length: count,
            max_length: total,
        });
    }

    let mut flipped = index::sample(rng, total, count).into_vec();
    flipped.sort_unstable();

    let bits = A::view_mut(buf);
    for &bit in &flipped {
        let current = bits[bit];
        bits.set(bit, !current);
    }

    log::debug!("flipped {} of {} bits", count, total);
    Ok(flipped)
}

/// Flips every bit independently with the given probability.
///
/// Returns the number of bits flipped.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `probability` is not within `[0, 1]`.
pub fn flip_with_probability<A: BitAddressing, R: Rng + ?Sized>(
    buf: &mut [u8],
    probability: f64,
    rng: &mut R,
) -> Result<usize> {
    let coin = Bernoulli::new(probability).map_err(|_| {
        Error::InvalidInput(format!(
            "Flip probability must be within [0, 1], got {}",
            probability
        ))
    })?;

    let mut flips = 0;
    for mut bit in A::view_mut(buf).iter_mut() {
        if coin.sample(rng) {
            *bit = !*bit;
            flips += 1;
        }
    }

    log::debug!("white noise at p = {} flipped {} bits", probability, flips);
    Ok(flips)
}

/// Flips the `length` contiguous bits starting at `start_bit`.
///
/// # Errors
///
/// Returns [`Error::BitOutOfRange`] if the run extends past the buffer.
pub fn scratch<A: BitAddressing>(buf: &mut [u8], start_bit: usize, length: usize) -> Result<()> {
    let total = buf.len() * 8;
    let end = start_bit.checked_add(length).unwrap_or(usize::MAX);
    if end > total {
        return Err(Error::BitOutOfRange {
            bit: end - 1,
            len: total,
        });
    }

    for mut bit in A::view_mut(buf)[start_bit..end].iter_mut() {
        *bit = !*bit;
    }
    Ok(())
}

/// Flips exactly one random bit inside every complete `block_bits` block.
///
/// Bits past the last complete block are left alone. Returns the flipped
/// indices in ascending order.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `block_bits` is zero.
pub fn flip_one_per_block<A: BitAddressing, R: Rng + ?Sized>(
    buf: &mut [u8],
    block_bits: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    if block_bits == 0 {
        return Err(Error::invalid("Block size must be positive"));
    }

    let bits = A::view_mut(buf);
    let blocks = bits.len() / block_bits;
    let mut flipped = Vec::with_capacity(blocks);
    for block in 0..blocks {
        let bit = block * block_bits + rng.gen_range(0..block_bits);
        let current = bits[bit];
        bits.set(bit, !current);
        flipped.push(bit);
    }
    Ok(flipped)
}
