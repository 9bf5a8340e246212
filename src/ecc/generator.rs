//! Generator polynomial synthesis for binary BCH codes.
//!
//! A binary BCH code correcting `t` errors has the generator polynomial of
//! least degree with binary coefficients whose roots include
//! α, α^2, ..., α^(2t). Over GF(2) every root drags its conjugates
//! α^(2i), α^(4i), ... along, so the generator is the product of `(x - α^r)`
//! over the union of the cyclotomic cosets of `1..=2t`.

use crate::ecc::galois::GaloisField;
use crate::ecc::Result;
use crate::error::Error;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Generator polynomial of a binary BCH code, coefficients lowest degree first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorPolynomial {
    /// GF(2) coefficients, coefficients[i] belongs to x^i
    coefficients: Vec<bool>,
    /// Exponents r such that α^r is a root
    roots: Vec<usize>,
}

impl GeneratorPolynomial {
    /// Builds the generator polynomial correcting `t` errors over `field`.
    ///
    /// The product is formed in the exponent domain: multiplying a
    /// coefficient by α^r adds r to its logarithm, and like terms are
    /// combined with XOR.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` is zero, if `2t` reaches the field order, or
    /// if the product unexpectedly has a non-binary coefficient.
    pub fn synthesize(field: &GaloisField, t: usize) -> Result<Self> {
        if t == 0 {
            return Err(Error::InvalidInput(
                "Error correction capability must be positive".to_string(),
            ));
        }

        let order = field.order();
        if 2 * t >= order {
            return Err(Error::InvalidInput(format!(
                "Error correction capability too large: 2t must be below {}, got t = {}",
                order, t
            )));
        }

        let mut roots = BTreeSet::new();
        for i in 1..=2 * t {
            roots.extend(cyclotomic_coset(i, order));
        }

        // Running product with field-element coefficients, lowest degree first
        let mut product: Vec<u32> = vec![1];
        for &root in &roots {
            let mut next = vec![0u32; product.len() + 1];
            for (j, &coefficient) in product.iter().enumerate() {
                // x * c_j x^j
                next[j + 1] ^= coefficient;
                // α^root * c_j x^j
                if let Some(log) = field.log(coefficient) {
                    next[j] ^= field.alpha_pow(log + root);
                }
            }
            product = next;
        }

        let mut coefficients = Vec::with_capacity(product.len());
        for (i, &coefficient) in product.iter().enumerate() {
            match coefficient {
                0 => coefficients.push(false),
                1 => coefficients.push(true),
                other => {
                    return Err(Error::InvalidInput(format!(
                        "Generator coefficient of x^{} is {}, not binary",
                        i, other
                    )))
                }
            }
        }

        log::debug!(
            "synthesized BCH generator of degree {} over {} for t = {}",
            coefficients.len() - 1,
            field,
            t
        );

        Ok(GeneratorPolynomial {
            coefficients,
            roots: roots.into_iter().collect(),
        })
    }

    /// Degree of the polynomial (the number of parity bits it produces)
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Coefficients, lowest degree first
    pub fn coefficients(&self) -> &[bool] {
        &self.coefficients
    }

    /// Coefficient of x^i, false past the degree
    pub fn coefficient(&self, i: usize) -> bool {
        self.coefficients.get(i).copied().unwrap_or(false)
    }

    /// Exponents of the roots α^r, ascending
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Remainder of `dividend` divided by this polynomial over GF(2).
    ///
    /// Both polynomials are lowest degree first. The remainder always has
    /// exactly `degree()` coefficients.
    ///
    /// # Errors
    ///
    /// Returns an error if this polynomial has degree zero.
    pub fn remainder(&self, dividend: &[bool]) -> Result<Vec<bool>> {
        let degree = self.degree();
        if degree == 0 {
            return Err(Error::InvalidInput(
                "Cannot divide by a polynomial of degree zero".to_string(),
            ));
        }

        let mut remainder = dividend.to_vec();
        if remainder.len() < degree {
            remainder.resize(degree, false);
        }

        for i in (degree..remainder.len()).rev() {
            if !remainder[i] {
                continue;
            }
            let shift = i - degree;
            for (j, &g) in self.coefficients.iter().enumerate() {
                if g {
                    remainder[shift + j] ^= true;
                }
            }
        }

        remainder.truncate(degree);
        Ok(remainder)
    }

    /// Whether this polynomial divides `poly` exactly
    pub fn divides(&self, poly: &[bool]) -> Result<bool> {
        Ok(self.remainder(poly)?.iter().all(|&bit| !bit))
    }
}

impl Display for GeneratorPolynomial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (i, &bit) in self.coefficients.iter().enumerate().rev() {
            if !bit {
                continue;
            }
            if !first {
                write!(f, " + ")?;
            }
            match i {
                0 => write!(f, "1")?,
                1 => write!(f, "x")?,
                _ => write!(f, "x^{}", i)?,
            }
            first = false;
        }
        if first {
            write!(f, "0")?;
        }
        Ok(())
    }
}

/// Compute the cyclotomic coset of i modulo `order`
fn cyclotomic_coset(i: usize, order: usize) -> Vec<usize> {
    let mut coset = Vec::new();
    let mut x = i % order;

    // Keep multiplying by 2 (mod order) until we cycle back to the start
    while !coset.contains(&x) {
        coset.push(x);
        x = (2 * x) % order;
    }

    coset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gf16() -> GaloisField {
        GaloisField::gf16().unwrap()
    }

    #[test]
    fn test_single_error_generator() {
        let generator = GeneratorPolynomial::synthesize(&gf16(), 1).unwrap();

        // The minimal polynomial of α is the primitive polynomial itself
        assert_eq!(generator.degree(), 4);
        assert_eq!(generator.coefficients(), &[true, true, false, false, true]);
        assert_eq!(generator.roots(), &[1, 2, 4, 8]);
        assert!(generator.coefficient(4));
        assert!(!generator.coefficient(2));
        assert!(!generator.coefficient(5));
        assert_eq!(generator.to_string(), "x^4 + x + 1");
    }

    #[test]
    fn test_double_error_generator() {
        // (15,7) BCH: g(x) = x^8 + x^7 + x^6 + x^4 + 1
        let generator = GeneratorPolynomial::synthesize(&gf16(), 2).unwrap();
        assert_eq!(generator.degree(), 8);
        assert_eq!(generator.to_string(), "x^8 + x^7 + x^6 + x^4 + 1");
    }

    #[test]
    fn test_roots_evaluate_to_zero() {
        let field = gf16();
        let generator = GeneratorPolynomial::synthesize(&field, 1).unwrap();

        for exponent in 1..=2 {
            let mut value = 0;
            for (i, &bit) in generator.coefficients().iter().enumerate() {
                if bit {
                    value ^= field.alpha_pow(i * exponent);
                }
            }
            assert_eq!(value, 0, "α^{} is not a root", exponent);
        }
    }

    #[test]
    fn test_cyclotomic_coset() {
        assert_eq!(cyclotomic_coset(1, 15), vec![1, 2, 4, 8]);
        assert_eq!(cyclotomic_coset(3, 15), vec![3, 6, 12, 9]);
        assert_eq!(cyclotomic_coset(5, 15), vec![5, 10]);
    }

    #[test]
    fn test_remainder() {
        let generator = GeneratorPolynomial::synthesize(&gf16(), 1).unwrap();

        // g(x) * (x + 1) = x^5 + x^4 + x^2 + 1
        let multiple = [true, false, true, false, true, true];
        assert!(generator.divides(&multiple).unwrap());

        // x^4 mod g(x) = x + 1
        let x4 = [false, false, false, false, true];
        assert_eq!(
            generator.remainder(&x4).unwrap(),
            vec![true, true, false, false]
        );

        // Short dividends are their own remainder
        assert_eq!(
            generator.remainder(&[false, true]).unwrap(),
            vec![false, true, false, false]
        );
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(GeneratorPolynomial::synthesize(&gf16(), 0).is_err());
        assert!(GeneratorPolynomial::synthesize(&gf16(), 8).is_err());

        let constant = GeneratorPolynomial {
            coefficients: vec![true],
            roots: Vec::new(),
        };
        assert!(constant.remainder(&[true, false, true]).is_err());
    }
}
