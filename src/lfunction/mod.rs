//! L-function descriptors
//!
//! A [`Descriptor`] is built per request from a URL (see [`source`] and
//! [`builder`]) and carries everything the page, zeros and plot endpoints
//! need. Data that only some families have is held in explicit `Option`
//! fields.

pub mod builder;
pub mod numeric;
pub mod source;
pub mod zeros;

use num_complex::Complex64;
use numeric::HardyZ;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use zeros::StoredZeros;

/// Family an L-function belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LType {
    #[serde(rename = "riemann")]
    Riemann,
    #[serde(rename = "dirichlet")]
    Dirichlet,
    #[serde(rename = "ellipticcurveQ")]
    EllipticCurveQ,
    #[serde(rename = "ellipticmodularform")]
    EllipticModularForm,
    #[serde(rename = "hilbertmodularform")]
    HilbertModularForm,
    #[serde(rename = "maass")]
    Maass,
    #[serde(rename = "siegelnonlift")]
    SiegelNonLift,
    #[serde(rename = "dedekindzeta")]
    DedekindZeta,
    #[serde(rename = "artin")]
    Artin,
    #[serde(rename = "SymmetricPower")]
    SymmetricPower,
    #[serde(rename = "hgmQ")]
    HypergeometricMotive,
    #[serde(rename = "genus2curveQ")]
    Genus2CurveQ,
    #[serde(rename = "lcalcurl")]
    LcalcUrl,
}

impl LType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LType::Riemann => "riemann",
            LType::Dirichlet => "dirichlet",
            LType::EllipticCurveQ => "ellipticcurveQ",
            LType::EllipticModularForm => "ellipticmodularform",
            LType::HilbertModularForm => "hilbertmodularform",
            LType::Maass => "maass",
            LType::SiegelNonLift => "siegelnonlift",
            LType::DedekindZeta => "dedekindzeta",
            LType::Artin => "artin",
            LType::SymmetricPower => "SymmetricPower",
            LType::HypergeometricMotive => "hgmQ",
            LType::Genus2CurveQ => "genus2curveQ",
            LType::LcalcUrl => "lcalcurl",
        }
    }

    /// Families whose Hardy Z function is plotted and searched on the wide range
    pub fn has_wide_range(&self) -> bool {
        matches!(
            self,
            LType::Riemann | LType::Maass | LType::EllipticModularForm | LType::EllipticCurveQ
        )
    }
}

impl fmt::Display for LType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root number of the functional equation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sign {
    Known(Complex64),
    Unknown,
}

impl Sign {
    pub fn real(value: f64) -> Self {
        Sign::Known(Complex64::new(value, 0.0))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Sign::Unknown)
    }
}

/// Render a root number for display inside `$...$`
pub fn style_the_sign(sign: &Sign) -> String {
    let z = match sign {
        Sign::Unknown => return "unknown".to_string(),
        Sign::Known(z) if z.norm() < 1e-10 => return "unknown".to_string(),
        Sign::Known(z) => *z,
    };
    let re = trim_float(z.re);
    if z.im.abs() < 1e-6 {
        return re;
    }
    let im = trim_float(z.im.abs());
    let op = if z.im < 0.0 { "-" } else { "+" };
    if z.re.abs() < 1e-6 {
        let sign = if z.im < 0.0 { "-" } else { "" };
        format!("{}{}i", sign, im)
    } else {
        format!("{} {} {}i", re, op, im)
    }
}

/// Up to five decimals, with trailing zeros removed
fn trim_float(x: f64) -> String {
    let s = format!("{:.5}", x);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Everything known about one L-function for the duration of a request
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub ltype: LType,
    pub title: String,
    pub label: Option<String>,
    /// Path below `/L/` identifying this L-function
    pub url_path: String,
    pub degree: u32,
    pub level: u64,
    pub sign: Sign,
    pub selfdual: bool,
    pub primitive: bool,
    pub algebraic: bool,
    /// Present only when `algebraic`
    pub motivic_weight: Option<u32>,
    pub dirichlet_coefficients: Vec<Complex64>,
    pub stored_zeros: Option<StoredZeros>,
    pub plot_points: Option<Vec<(f64, f64)>>,
    pub numeric: Option<Arc<dyn HardyZ>>,
    pub dual_link: Option<String>,
    pub modform: Option<String>,
    pub ellipticcurve: Option<String>,
    pub from_db: bool,
    pub lcalcfile: Option<String>,
    /// Maass forms: `GL2`, `GL3`, `GL4` or `GSp4`
    pub group: Option<String>,
    /// Holomorphic modular forms only
    pub weight: Option<u32>,
    pub number: Option<u32>,
}

impl Descriptor {
    /// Self-duality from the first Dirichlet coefficients: all `a_n / a_1` real
    pub fn check_selfdual(coefficients: &[Complex64]) -> bool {
        let Some(first) = coefficients.first() else {
            return true;
        };
        if first.norm() == 0.0 {
            return true;
        }
        coefficients
            .iter()
            .take(8)
            .skip(1)
            .all(|a| (a / first).im.abs() <= 0.00001)
    }

    /// Whether this L-function can show zeros and a plot at all
    pub fn has_zero_data(&self) -> bool {
        self.stored_zeros.is_some() || self.numeric.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ltype_names() {
        assert_eq!(LType::EllipticCurveQ.as_str(), "ellipticcurveQ");
        assert_eq!(LType::HypergeometricMotive.to_string(), "hgmQ");
        assert_eq!(
            serde_json::to_value(LType::SymmetricPower).unwrap(),
            serde_json::json!("SymmetricPower")
        );
        assert!(LType::Maass.has_wide_range());
        assert!(!LType::Artin.has_wide_range());
    }

    #[test]
    fn test_style_the_sign() {
        assert_eq!(style_the_sign(&Sign::real(1.0)), "1");
        assert_eq!(style_the_sign(&Sign::real(-1.0)), "-1");
        assert_eq!(style_the_sign(&Sign::Unknown), "unknown");
        assert_eq!(style_the_sign(&Sign::real(0.0)), "unknown");
        assert_eq!(
            style_the_sign(&Sign::Known(Complex64::new(0.6, -0.8))),
            "0.6 - 0.8i"
        );
        assert_eq!(style_the_sign(&Sign::Known(Complex64::new(0.0, 1.0))), "1i");
    }

    #[test]
    fn test_check_selfdual() {
        let real = vec![Complex64::new(1.0, 0.0), Complex64::new(-1.0, 0.0)];
        assert!(Descriptor::check_selfdual(&real));

        let complex = vec![Complex64::new(1.0, 0.0), Complex64::new(0.5, 0.5)];
        assert!(!Descriptor::check_selfdual(&complex));

        assert!(Descriptor::check_selfdual(&[]));
    }
}
