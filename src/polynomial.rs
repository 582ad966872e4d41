//! Integer polynomials in `x`, printed the way computer-algebra systems read them

use std::fmt;

/// Dense integer polynomial, coefficient of `x^i` at index `i`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polynomial {
    coefficients: Vec<i64>,
}

impl Polynomial {
    /// Build from a constant-term-first coefficient list
    ///
    /// Trailing zero coefficients are dropped so that the degree is exact.
    pub fn from_coefficients(coefficients: &[i64]) -> Self {
        let mut coefficients = coefficients.to_vec();
        while coefficients.last() == Some(&0) {
            coefficients.pop();
        }
        Polynomial { coefficients }
    }

    /// Degree, or `None` for the zero polynomial
    pub fn degree(&self) -> Option<usize> {
        self.coefficients.len().checked_sub(1)
    }

    pub fn coefficients(&self) -> &[i64] {
        &self.coefficients
    }
}

impl fmt::Display for Polynomial {
    /// Formats as e.g. `x^2 - 2*x + 1`, highest degree first
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.coefficients.is_empty() {
            return write!(f, "0");
        }

        let mut first = true;
        for (exp, &c) in self.coefficients.iter().enumerate().rev() {
            if c == 0 {
                continue;
            }
            let magnitude = c.unsigned_abs();
            if first {
                if c < 0 {
                    write!(f, "-")?;
                }
            } else if c < 0 {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            first = false;

            match (exp, magnitude) {
                (0, m) => write!(f, "{}", m)?,
                (1, 1) => write!(f, "x")?,
                (1, m) => write!(f, "{}*x", m)?,
                (e, 1) => write!(f, "x^{}", e)?,
                (e, m) => write!(f, "{}*x^{}", m, e)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_basic() {
        assert_eq!(Polynomial::from_coefficients(&[1, 2, 1]).to_string(), "x^2 + 2*x + 1");
        assert_eq!(Polynomial::from_coefficients(&[1, 0, 1]).to_string(), "x^2 + 1");
    }

    #[test]
    fn test_display_negative_coefficients() {
        assert_eq!(Polynomial::from_coefficients(&[1, -2, 1]).to_string(), "x^2 - 2*x + 1");
        assert_eq!(Polynomial::from_coefficients(&[0, -1]).to_string(), "-x");
        assert_eq!(Polynomial::from_coefficients(&[-3, 0, -5]).to_string(), "-5*x^2 - 3");
    }

    #[test]
    fn test_display_weil_polynomial() {
        // 1 - x + 2x^2 over F_2 reversed: the L-polynomial of 1.2.ab
        assert_eq!(
            Polynomial::from_coefficients(&[1, -1, 2]).to_string(),
            "2*x^2 - x + 1"
        );
        assert_eq!(
            Polynomial::from_coefficients(&[1, 0, 0, 0, 9]).to_string(),
            "9*x^4 + 1"
        );
    }

    #[test]
    fn test_zero_polynomial() {
        let p = Polynomial::from_coefficients(&[0, 0]);
        assert_eq!(p.degree(), None);
        assert_eq!(p.to_string(), "0");
    }

    #[test]
    fn test_degree() {
        assert_eq!(Polynomial::from_coefficients(&[5]).degree(), Some(0));
        assert_eq!(Polynomial::from_coefficients(&[1, 2, 0]).degree(), Some(1));
    }
}
