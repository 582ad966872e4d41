//! Core data models for abelian-variety isogeny classes

use crate::error::{LmfdbError, Result};
use crate::polynomial::Polynomial;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.([a-z_]+)$").expect("static regex"));

/// Label of an isogeny class of abelian varieties over a finite field
///
/// Written `g.q.iso`: dimension, field size and the isogeny class identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AbvarLabel {
    pub g: u32,
    pub q: u64,
    pub iso: String,
}

impl AbvarLabel {
    /// Parse and validate a label
    ///
    /// # Returns
    /// * `Ok(AbvarLabel)` if the label has the form `g.q.iso`
    /// * `Err(LmfdbError::InvalidLabel)` describing what is wrong otherwise
    pub fn parse(label: &str) -> Result<Self> {
        validate_label(label)?;
        let (g, q, iso) = split_label(label)
            .ok_or_else(|| LmfdbError::invalid_label(label, "unparseable"))?;
        let g = g
            .parse()
            .map_err(|_| LmfdbError::invalid_label(label, "dimension out of range"))?;
        let q = q
            .parse()
            .map_err(|_| LmfdbError::invalid_label(label, "field size out of range"))?;
        Ok(AbvarLabel {
            g,
            q,
            iso: iso.to_string(),
        })
    }
}

impl std::fmt::Display for AbvarLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", abvar_label(self.g, self.q, &self.iso))
    }
}

/// Combine dimension, field size and isogeny identifier into a label
pub fn abvar_label(g: impl std::fmt::Display, q: impl std::fmt::Display, iso: &str) -> String {
    format!("{}.{}.{}", g, q, iso)
}

/// Split a label into its `(g, q, iso)` parts
///
/// Returns `None` when the label is not of the form `g.q.iso`.
pub fn split_label(label: &str) -> Option<(&str, &str, &str)> {
    let caps = LABEL_REGEX.captures(label)?;
    Some((
        caps.get(1)?.as_str(),
        caps.get(2)?.as_str(),
        caps.get(3)?.as_str(),
    ))
}

/// Check that a label is well formed, explaining the first problem found
pub fn validate_label(label: &str) -> Result<()> {
    let parts: Vec<&str> = label.split('.').collect();
    if parts.len() != 3 {
        return Err(LmfdbError::invalid_label(
            label,
            "it must be of the form g.q.iso, with g a dimension and q a prime power",
        ));
    }
    if parts[0].is_empty() || !parts[0].chars().all(|c| c.is_ascii_digit()) {
        return Err(LmfdbError::invalid_label(label, "g must be a natural number"));
    }
    if parts[1].is_empty() || !parts[1].chars().all(|c| c.is_ascii_digit()) {
        return Err(LmfdbError::invalid_label(label, "q must be a prime power"));
    }
    if parts[2].is_empty() || !parts[2].chars().all(|c| c.is_ascii_lowercase() || c == '_') {
        return Err(LmfdbError::invalid_label(
            label,
            "iso must consist of lower-case letters and underscores",
        ));
    }
    Ok(())
}

/// A stored isogeny class document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsogenyClassRecord {
    pub label: String,
    pub g: u32,
    pub q: u64,
    #[serde(default)]
    pub p: Option<u64>,
    /// Characteristic polynomial coefficients, constant term first
    pub polynomial: Vec<i64>,
    #[serde(default)]
    pub angles: Vec<f64>,
    #[serde(rename = "A_counts", default)]
    pub a_counts: Vec<i64>,
    #[serde(rename = "C_counts", default)]
    pub c_counts: Vec<i64>,
    #[serde(default)]
    pub p_rank: Option<u32>,
    /// Newton polygon slopes as reduced fractions, e.g. `"1/2"`
    #[serde(default)]
    pub slopes: Vec<String>,
    /// Ordered `(factor label, multiplicity)` pairs
    #[serde(default)]
    pub decomposition: Vec<(String, u32)>,
    /// Empty iff the class is primitive
    #[serde(default)]
    pub primitive_models: Vec<String>,
    #[serde(default)]
    pub number_field: Option<String>,
    #[serde(default)]
    pub galois_group: Option<String>,
}

/// Display wrapper around an [`IsogenyClassRecord`]
#[derive(Debug, Clone, Serialize)]
pub struct AbvarFqIsoclass {
    pub label: String,
    pub g: u32,
    pub q: u64,
    pub p: u64,
    pub field: String,
    pub polynomial: String,
    pub p_rank: Option<u32>,
    pub slopes: Vec<String>,
    pub abvar_counts: Vec<i64>,
    pub curve_counts: Vec<i64>,
    pub decomposition: String,
    pub is_simple: bool,
    pub is_primitive: bool,
    pub primitive_models: Vec<String>,
}

impl AbvarFqIsoclass {
    pub fn new(record: &IsogenyClassRecord) -> Self {
        AbvarFqIsoclass {
            label: record.label.clone(),
            g: record.g,
            q: record.q,
            p: record.p.unwrap_or_else(|| characteristic(record.q)),
            field: format!("\\F_{{{}}}", record.q),
            polynomial: Polynomial::from_coefficients(&record.polynomial).to_string(),
            p_rank: record.p_rank,
            slopes: record.slopes.clone(),
            abvar_counts: record.a_counts.clone(),
            curve_counts: record.c_counts.clone(),
            decomposition: decomposition_display(&record.decomposition),
            is_simple: is_simple(&record.decomposition),
            is_primitive: record.primitive_models.is_empty(),
            primitive_models: record.primitive_models.clone(),
        }
    }
}

fn is_simple(factors: &[(String, u32)]) -> bool {
    factors.len() == 1 && factors[0].1 == 1
}

/// Render a decomposition as `simple` or a product of factors
pub fn decomposition_display(factors: &[(String, u32)]) -> String {
    if is_simple(factors) {
        return "simple".to_string();
    }
    factors
        .iter()
        .map(|(label, mult)| {
            if *mult == 1 {
                label.clone()
            } else {
                format!("{}<sup>{}</sup>", label, mult)
            }
        })
        .collect::<Vec<_>>()
        .join(" $\\times$ ")
}

/// Smallest prime factor of q, i.e. the characteristic of F_q
fn characteristic(q: u64) -> u64 {
    if q < 2 {
        return q;
    }
    let mut d = 2;
    while d * d <= q {
        if q % d == 0 {
            return d;
        }
        d += 1;
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_label() {
        assert_eq!(split_label("2.9.ab_c"), Some(("2", "9", "ab_c")));
        assert_eq!(split_label("2.9"), None);
        assert_eq!(split_label("2.9.AB"), None);
    }

    #[test]
    fn test_abvar_label() {
        assert_eq!(abvar_label(1, 2, "ab"), "1.2.ab");
    }

    #[test]
    fn test_validate_label_reasons() {
        assert!(validate_label("1.2.ab").is_ok());
        assert!(validate_label("1.2").is_err());
        assert!(validate_label("x.2.ab").is_err());
        assert!(validate_label("1.y.ab").is_err());
        assert!(validate_label("1.2.A").is_err());
    }

    #[test]
    fn test_parse_label() {
        let label = AbvarLabel::parse("3.16.a_bc").unwrap();
        assert_eq!(label.g, 3);
        assert_eq!(label.q, 16);
        assert_eq!(label.iso, "a_bc");
        assert_eq!(label.to_string(), "3.16.a_bc");
    }

    #[test]
    fn test_decomposition_display() {
        assert_eq!(decomposition_display(&[("1.2.ab".into(), 1)]), "simple");
        assert_eq!(
            decomposition_display(&[("1.2.ab".into(), 2), ("1.2.b".into(), 1)]),
            "1.2.ab<sup>2</sup> $\\times$ 1.2.b"
        );
    }

    #[test]
    fn test_isoclass_from_record() {
        let record: IsogenyClassRecord = serde_json::from_value(serde_json::json!({
            "label": "1.4.ab",
            "g": 1,
            "q": 4,
            "polynomial": [1, -1, 4],
            "A_counts": [4],
            "C_counts": [4],
            "p_rank": 1,
            "slopes": ["0", "1"],
            "decomposition": [["1.4.ab", 1]],
            "primitive_models": []
        }))
        .unwrap();
        let cl = AbvarFqIsoclass::new(&record);
        assert_eq!(cl.p, 2);
        assert_eq!(cl.field, "\\F_{4}");
        assert_eq!(cl.polynomial, "4*x^2 - x + 1");
        assert_eq!(cl.decomposition, "simple");
        assert!(cl.is_primitive);
    }
}
