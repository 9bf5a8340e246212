//! Fixed-capacity scratch region for per-block working buffers.
//!
//! The chunk drivers need two block-sized bit buffers per call. They obtain
//! them here instead of allocating freely, so that the memory a decode can
//! consume is bounded up front. Exhausting the region is the only failure.

use crate::ecc::Result;
use crate::error::Error;
use bitvec::prelude::*;

/// Default capacity of a scratch region in bytes (128 KiB)
pub const DEFAULT_SCRATCH_CAPACITY: usize = 128 * 1024;

/// A bump-style byte budget handing out zeroed bit buffers.
///
/// Not shareable across threads while in use: every operation takes
/// `&mut self`.
#[derive(Debug, Clone)]
pub struct ScratchRegion {
    /// Total bytes this region may hand out
    capacity: usize,
    /// Bytes currently handed out
    in_use: usize,
}

impl Default for ScratchRegion {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_SCRATCH_CAPACITY)
    }
}

impl ScratchRegion {
    /// Creates a region able to hand out `capacity` bytes at once
    pub fn with_capacity(capacity: usize) -> Self {
        ScratchRegion {
            capacity,
            in_use: 0,
        }
    }

    /// Total capacity in bytes
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently handed out
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Bytes still available
    pub fn available(&self) -> usize {
        self.capacity - self.in_use
    }

    /// Hands out a zeroed buffer of exactly `bits` bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the region cannot cover
    /// `ceil(bits / 8)` more bytes or the reservation itself fails.
    pub fn allocate<O: BitOrder>(&mut self, bits: usize) -> Result<BitVec<u8, O>> {
        let requested = bits.div_ceil(8);
        let available = self.available();
        if requested > available {
            return Err(Error::OutOfMemory {
                requested,
                available,
            });
        }

        let mut storage = Vec::new();
        storage
            .try_reserve_exact(requested)
            .map_err(|_| Error::OutOfMemory {
                requested,
                available,
            })?;
        storage.resize(requested, 0u8);

        let mut buffer = BitVec::from_vec(storage);
        buffer.truncate(bits);
        self.in_use += requested;
        Ok(buffer)
    }

    /// Returns a buffer obtained from [`allocate`](Self::allocate)
    pub fn release<O: BitOrder>(&mut self, buffer: BitVec<u8, O>) {
        let bytes = buffer.len().div_ceil(8);
        self.in_use = self.in_use.saturating_sub(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_release() {
        let mut region = ScratchRegion::with_capacity(8);

        let a = region.allocate::<Lsb0>(15).unwrap();
        assert_eq!(a.len(), 15);
        assert!(a.not_any());
        assert_eq!(region.in_use(), 2);

        let b = region.allocate::<Msb0>(48).unwrap();
        assert_eq!(region.available(), 0);

        region.release(a);
        assert_eq!(region.available(), 2);
        region.release(b);
        assert_eq!(region.in_use(), 0);
    }

    #[test]
    fn test_exhaustion() {
        let mut region = ScratchRegion::with_capacity(2);
        let _held = region.allocate::<Lsb0>(9).unwrap();

        assert!(matches!(
            region.allocate::<Lsb0>(1),
            Err(Error::OutOfMemory {
                requested: 1,
                available: 0
            })
        ));
    }

    #[test]
    fn test_default_capacity() {
        let region = ScratchRegion::default();
        assert_eq!(region.capacity(), 131072);
        assert_eq!(region.available(), 131072);
    }
}
