//! Finite field GF(2^m) built from exponent and logarithm tables.
//!
//! Nonzero elements are stored twice: as their polynomial bit representation
//! (the "element") and as their discrete logarithm relative to the primitive
//! root α (the "exponent"). Multiplication adds exponents modulo `2^m - 1`,
//! addition is XOR on elements.
//!
//! The tables are generated by a linear-feedback shift: starting from α^0 = 1,
//! each step shifts left by one bit and, when the bit at position `m` comes
//! out set, reduces by XOR with the primitive polynomial.

use crate::ecc::Result;
use crate::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum supported field order (m) for GF(2^m)
pub const MAX_FIELD_ORDER: u32 = 16;

/// Primitive polynomial for GF(2^4): x^4 + x + 1 (0x13)
pub const PRIMITIVE_POLY_4: u32 = 0x13;

/// Logarithm of the zero element, which has none
pub const NO_LOG: i32 = -1;

/// Exponent and logarithm tables of GF(2^m).
///
/// Immutable once built; codecs hold one and share it by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GaloisField {
    /// Field degree m
    degree: u32,
    /// Primitive polynomial defining the field, including the x^m term
    primitive_poly: u32,
    /// exp_table[i] = α^i, with a wrap-around entry α^(2^m - 1) = 1
    exp_table: Vec<u32>,
    /// log_table[e] = i such that α^i = e, NO_LOG for zero
    log_table: Vec<i32>,
}

impl GaloisField {
    /// Builds the tables of GF(2^degree) from a primitive polynomial.
    ///
    /// # Errors
    ///
    /// Returns an error if the degree is outside `2..=MAX_FIELD_ORDER`, if the
    /// polynomial is not of that degree, or if it is not primitive (the shift
    /// sequence repeats before visiting every nonzero element).
    pub fn new(degree: u32, primitive_poly: u32) -> Result<Self> {
        if !(2..=MAX_FIELD_ORDER).contains(&degree) {
            return Err(Error::InvalidInput(format!(
                "Field order must be between 2 and {}, got {}",
                MAX_FIELD_ORDER, degree
            )));
        }

        let size = 1usize << degree;
        let top = 1u32 << degree;
        if primitive_poly & top == 0 || primitive_poly >> (degree + 1) != 0 {
            return Err(Error::InvalidInput(format!(
                "Polynomial {:#x} does not have degree {}",
                primitive_poly, degree
            )));
        }

        let order = size - 1;
        let mut exp_table = vec![0u32; size];
        let mut log_table = vec![NO_LOG; size];

        let mut element = 1u32;
        for (exponent, slot) in exp_table.iter_mut().take(order).enumerate() {
            if log_table[element as usize] != NO_LOG {
                return Err(Error::InvalidInput(format!(
                    "Polynomial {:#x} is not primitive: element {} repeats at α^{}",
                    primitive_poly, element, exponent
                )));
            }
            *slot = element;
            log_table[element as usize] = exponent as i32;

            // Multiply by α
            element <<= 1;
            if element & top != 0 {
                element ^= primitive_poly;
            }
        }

        // Wrap-around so that exp_table[order] == α^0
        exp_table[order] = exp_table[0];

        Ok(GaloisField {
            degree,
            primitive_poly,
            exp_table,
            log_table,
        })
    }

    /// GF(2^4) over x^4 + x + 1, the field of the BCH(15,11) code
    pub fn gf16() -> Result<Self> {
        Self::new(4, PRIMITIVE_POLY_4)
    }

    /// Field degree m
    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// Primitive polynomial the field was built from
    pub fn primitive_poly(&self) -> u32 {
        self.primitive_poly
    }

    /// Number of nonzero elements, `2^m - 1`
    pub fn order(&self) -> usize {
        self.exp_table.len() - 1
    }

    /// Exponent-indexed table, `2^m` entries
    pub fn exp_table(&self) -> &[u32] {
        &self.exp_table
    }

    /// Element-indexed table, `2^m` entries, `NO_LOG` at index 0
    pub fn log_table(&self) -> &[i32] {
        &self.log_table
    }

    /// α^exponent, for any exponent (reduced modulo the order)
    pub fn alpha_pow(&self, exponent: usize) -> u32 {
        self.exp_table[exponent % self.order()]
    }

    /// Discrete logarithm of a nonzero element, `None` for zero or
    /// values outside the field
    pub fn log(&self, element: u32) -> Option<usize> {
        match self.log_table.get(element as usize) {
            Some(&exponent) if exponent != NO_LOG => Some(exponent as usize),
            _ => None,
        }
    }

    /// Field addition (and subtraction)
    pub fn add(&self, a: u32, b: u32) -> u32 {
        a ^ b
    }

    /// Field multiplication through the log tables
    pub fn mul(&self, a: u32, b: u32) -> u32 {
        match (self.log(a), self.log(b)) {
            (Some(log_a), Some(log_b)) => self.alpha_pow(log_a + log_b),
            _ => 0,
        }
    }

    /// Multiplicative inverse of a nonzero element
    pub fn inverse(&self, a: u32) -> Result<u32> {
        let log_a = self.log(a).ok_or_else(|| {
            Error::InvalidInput("Cannot invert zero in the finite field".to_string())
        })?;
        Ok(self.alpha_pow(self.order() - log_a))
    }
}

impl Display for GaloisField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "GF(2^{}) mod {:#x}", self.degree, self.primitive_poly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gf16_tables() {
        let field = GaloisField::gf16().unwrap();
        assert_eq!(field.degree(), 4);
        assert_eq!(field.primitive_poly(), PRIMITIVE_POLY_4);
        assert_eq!(field.order(), 15);
        assert_eq!(field.exp_table().len(), 16);
        assert_eq!(field.log_table().len(), 16);

        // α^4 = α + 1 under x^4 + x + 1
        assert_eq!(
            &field.exp_table()[..8],
            &[0b0001, 0b0010, 0b0100, 0b1000, 0b0011, 0b0110, 0b1100, 0b1011]
        );
        assert_eq!(field.exp_table()[15], 1);
    }

    #[test]
    fn test_table_self_consistency() {
        let field = GaloisField::gf16().unwrap();
        assert_eq!(field.log_table()[0], NO_LOG);
        assert_eq!(field.log(0), None);

        for element in 1..16u32 {
            let exponent = field.log_table()[element as usize];
            assert!(exponent >= 0);
            assert_eq!(field.exp_table()[exponent as usize], element);
        }
    }

    #[test]
    fn test_every_nonzero_element_generated_once() {
        let field = GaloisField::gf16().unwrap();
        let mut seen = [false; 16];
        for &element in &field.exp_table()[..15] {
            assert!(element != 0);
            assert!(!seen[element as usize]);
            seen[element as usize] = true;
        }
    }

    #[test]
    fn test_finite_field_arithmetic() {
        let field = GaloisField::gf16().unwrap();

        assert_eq!(field.mul(0, 7), 0);
        assert_eq!(field.mul(1, 7), 7);
        // α^3 * α^4 = α^7
        assert_eq!(field.mul(0b1000, 0b0011), 0b1011);
        assert_eq!(field.add(0b1010, 0b0110), 0b1100);

        for a in 1..16u32 {
            let a_inv = field.inverse(a).unwrap();
            assert_eq!(field.mul(a, a_inv), 1);
        }
        assert!(field.inverse(0).is_err());
    }

    #[test]
    fn test_larger_fields() {
        let field = GaloisField::new(8, 0x11D).unwrap();
        assert_eq!(field.order(), 255);
        for element in 1..256u32 {
            assert_eq!(field.alpha_pow(field.log(element).unwrap()), element);
        }
    }

    #[test]
    fn test_invalid_fields() {
        assert!(GaloisField::new(1, 0x3).is_err());
        assert!(GaloisField::new(17, 0x1_0000B).is_err());
        // Wrong degree
        assert!(GaloisField::new(4, 0x0B).is_err());
        // x^4 + x^3 + x^2 + x + 1 is irreducible but not primitive
        assert!(GaloisField::new(4, 0x1F).is_err());
    }
}
