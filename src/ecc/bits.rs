//! Bit addressing inside byte buffers.
//!
//! A byte buffer is treated as a flat bit address space where global bit `b`
//! lives in byte `b / 8`. Which bit of that byte it is depends on the
//! strategy:
//!
//! - [`MsbFirst`] maps bit `b` to `1 << (7 - b % 8)`; the BCH codec uses it
//! - [`LsbFirst`] maps bit `b` to `1 << (b % 8)`; the Hamming codec uses it
//!
//! Swapping one strategy for the other changes the encoded byte layout of a
//! codec.

use crate::ecc::Result;
use crate::error::Error;
use bitvec::prelude::*;

/// A named convention for addressing single bits inside a byte buffer.
pub trait BitAddressing {
    /// The bitvec ordering implementing this convention
    type Order: BitOrder;

    /// Human readable name, used in log output
    const NAME: &'static str;

    /// Views a byte buffer as a bit slice in this convention
    fn view(buf: &[u8]) -> &BitSlice<u8, Self::Order> {
        buf.view_bits::<Self::Order>()
    }

    /// Views a byte buffer as a mutable bit slice in this convention
    fn view_mut(buf: &mut [u8]) -> &mut BitSlice<u8, Self::Order> {
        buf.view_bits_mut::<Self::Order>()
    }

    /// Reads bit `bit`, or `None` past the end of the buffer
    fn get(buf: &[u8], bit: usize) -> Option<bool> {
        Self::view(buf).get(bit).map(|b| *b)
    }

    /// Writes bit `bit`
    fn set(buf: &mut [u8], bit: usize, value: bool) -> Result<()> {
        let len = buf.len() * 8;
        let bits = Self::view_mut(buf);
        if bit >= len {
            return Err(Error::BitOutOfRange { bit, len });
        }
        bits.set(bit, value);
        Ok(())
    }

    /// Flips bit `bit`
    fn toggle(buf: &mut [u8], bit: usize) -> Result<()> {
        let len = buf.len() * 8;
        let bits = Self::view_mut(buf);
        if bit >= len {
            return Err(Error::BitOutOfRange { bit, len });
        }
        let current = bits[bit];
        bits.set(bit, !current);
        Ok(())
    }
}

/// Most-significant-bit-first addressing (bit 0 is `0x80` of byte 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MsbFirst;

impl BitAddressing for MsbFirst {
    type Order = Msb0;
    const NAME: &'static str = "msb-first";
}

/// Least-significant-bit-first addressing (bit 0 is `0x01` of byte 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LsbFirst;

impl BitAddressing for LsbFirst {
    type Order = Lsb0;
    const NAME: &'static str = "lsb-first";
}

/// The bitvec ordering of an addressing strategy
pub type OrderOf<A> = <A as BitAddressing>::Order;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msb_first_layout() {
        let mut buf = [0u8; 2];
        MsbFirst::set(&mut buf, 0, true).unwrap();
        MsbFirst::set(&mut buf, 9, true).unwrap();
        assert_eq!(buf, [0x80, 0x40]);

        assert_eq!(MsbFirst::get(&buf, 0), Some(true));
        assert_eq!(MsbFirst::get(&buf, 1), Some(false));
        assert_eq!(MsbFirst::get(&buf, 9), Some(true));
        assert_eq!(MsbFirst::get(&buf, 16), None);
    }

    #[test]
    fn test_lsb_first_layout() {
        let mut buf = [0u8; 2];
        LsbFirst::set(&mut buf, 0, true).unwrap();
        LsbFirst::set(&mut buf, 9, true).unwrap();
        assert_eq!(buf, [0x01, 0x02]);

        assert_eq!(LsbFirst::get(&[0xA5], 0), Some(true));
        assert_eq!(LsbFirst::get(&[0xA5], 1), Some(false));
        assert_eq!(LsbFirst::get(&[0xA5], 7), Some(true));
    }

    #[test]
    fn test_same_index_different_byte_bit() {
        let mut msb = [0u8];
        let mut lsb = [0u8];
        MsbFirst::toggle(&mut msb, 2).unwrap();
        LsbFirst::toggle(&mut lsb, 2).unwrap();
        assert_eq!(msb, [0b0010_0000]);
        assert_eq!(lsb, [0b0000_0100]);
    }

    #[test]
    fn test_toggle_and_clear() {
        let mut buf = [0xFFu8];
        LsbFirst::toggle(&mut buf, 3).unwrap();
        assert_eq!(buf, [0xF7]);
        LsbFirst::toggle(&mut buf, 3).unwrap();
        assert_eq!(buf, [0xFF]);
        MsbFirst::set(&mut buf, 7, false).unwrap();
        assert_eq!(buf, [0xFE]);
    }

    #[test]
    fn test_out_of_range() {
        let mut buf = [0u8; 1];
        assert_eq!(
            MsbFirst::set(&mut buf, 8, true),
            Err(Error::BitOutOfRange { bit: 8, len: 8 })
        );
        assert!(LsbFirst::toggle(&mut buf, 100).is_err());
        assert!(LsbFirst::toggle(&mut [], 0).is_err());
    }
}
