//! Construction of L-function descriptors from their sources
//!
//! The Riemann zeta function is built natively with the numeric backend.
//! Every other family is read from the `lfunctions` collection after its
//! URL arguments have been checked.

use super::numeric::{HardyZ, RiemannZetaBackend};
use super::source::LfunctionSource;
use super::zeros::StoredZeros;
use super::{Descriptor, LType, Sign};
use crate::error::BuildError;
use crate::store::{find_lfunction, DocumentStore, LfunctionRecord};
use num_complex::Complex64;
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds descriptors for dispatched sources
pub trait LfunctionBuilder: Send + Sync {
    fn build(&self, source: &LfunctionSource) -> Result<Descriptor, BuildError>;
}

/// Builder backed by the document store
pub struct CatalogBuilder {
    store: Arc<dyn DocumentStore>,
    riemann: Arc<dyn HardyZ>,
}

impl CatalogBuilder {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        CatalogBuilder {
            store,
            riemann: Arc::new(RiemannZetaBackend::default()),
        }
    }
}

/// The Riemann zeta function with the built-in numeric backend
pub fn riemann_descriptor() -> Descriptor {
    riemann_with_backend(Arc::new(RiemannZetaBackend::default()))
}

fn riemann_with_backend(numeric: Arc<dyn HardyZ>) -> Descriptor {
    Descriptor {
        ltype: LType::Riemann,
        title: "Riemann Zeta-function: \\(\\zeta(s)\\)".to_string(),
        label: Some("zeta".to_string()),
        url_path: "Riemann".to_string(),
        degree: 1,
        level: 1,
        sign: Sign::real(1.0),
        selfdual: true,
        primitive: true,
        algebraic: true,
        motivic_weight: Some(0),
        dirichlet_coefficients: vec![Complex64::new(1.0, 0.0); 50],
        stored_zeros: None,
        plot_points: None,
        numeric: Some(numeric),
        dual_link: None,
        modform: None,
        ellipticcurve: None,
        from_db: false,
        lcalcfile: None,
        group: None,
        weight: None,
        number: None,
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, BuildError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(BuildError::type_error(format!("missing required argument '{}'", name))),
    }
}

fn parse_positive(value: &str, name: &str) -> Result<u64, BuildError> {
    match value.parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(BuildError::value(format!(
            "{} must be a positive integer, got '{}'",
            name, value
        ))),
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

/// Check the URL arguments of a source before looking anything up
fn validate(source: &LfunctionSource) -> Result<(), BuildError> {
    match source {
        LfunctionSource::Riemann => Ok(()),
        LfunctionSource::Dirichlet { modulus, number } => {
            let modulus = parse_positive(required(modulus, "charactermodulus")?, "charactermodulus")?;
            let number = parse_positive(required(number, "characternumber")?, "characternumber")?;
            if number > modulus || gcd(modulus, number) != 1 {
                return Err(BuildError::value(format!(
                    "Character number {} is not valid for modulus {}",
                    number, modulus
                )));
            }
            Ok(())
        }
        LfunctionSource::EllipticCurveQ { label } => required(label, "label").map(|_| ()),
        LfunctionSource::EllipticModularForm {
            level,
            weight,
            character,
            label,
            number,
        } => {
            parse_positive(required(level, "level")?, "level")?;
            parse_positive(required(weight, "weight")?, "weight")?;
            required(character, "character")?;
            required(label, "label")?;
            required(number, "number")?
                .parse::<u32>()
                .map_err(|_| BuildError::value("number must be a non-negative integer"))?;
            Ok(())
        }
        LfunctionSource::HilbertModularForm {
            field,
            label,
            character,
            number,
        } => {
            required(field, "field")?;
            required(label, "label")?;
            required(character, "character")?;
            required(number, "number")?;
            Ok(())
        }
        LfunctionSource::MaassGl2 { dbid } | LfunctionSource::MaassHighDegree { dbid } => {
            required(dbid, "dbid").map(|_| ())
        }
        LfunctionSource::MaassFromDb {
            level,
            character,
            r,
            ap_id,
            ..
        } => {
            parse_positive(required(level, "level")?, "level")?;
            required(character, "char")?;
            required(r, "R")?;
            required(ap_id, "ap_id")?;
            Ok(())
        }
        LfunctionSource::SiegelScalar {
            weight,
            orbit,
            number,
        } => {
            parse_positive(required(weight, "weight")?, "weight")?;
            required(orbit, "orbit")?;
            required(number, "number")?;
            Ok(())
        }
        LfunctionSource::DedekindZeta { label }
        | LfunctionSource::Artin { label }
        | LfunctionSource::HypergeometricLabel { label }
        | LfunctionSource::Genus2CurveQ { label } => required(label, "label").map(|_| ()),
        LfunctionSource::SymmetricPower {
            power,
            underlying,
            field,
            label,
        } => {
            let power = parse_positive(required(power, "power")?, "power")?;
            if power < 2 {
                return Err(BuildError::value("power must be at least 2"));
            }
            if required(underlying, "underlying_type")? != "EllipticCurve" || required(field, "field")? != "Q" {
                return Err(BuildError::value(
                    "symmetric powers are only available for elliptic curves over Q",
                ));
            }
            required(label, "label").map(|_| ())
        }
        LfunctionSource::HypergeometricFamily { family, .. } => required(family, "family").map(|_| ()),
        LfunctionSource::LcalcUrl { url } => match url {
            Some(u) if !u.is_empty() => Ok(()),
            _ => Err(BuildError::key("url")),
        },
    }
}

/// Turn a stored record into a descriptor
pub fn descriptor_from_record(
    ltype: LType,
    url_path: String,
    record: LfunctionRecord,
) -> Result<Descriptor, BuildError> {
    if record.degree == 0 {
        return Err(BuildError::Defect(format!(
            "stored L-function {} has degree 0",
            record.key
        )));
    }
    let dirichlet_coefficients: Vec<Complex64> = record
        .dirichlet_coefficients
        .iter()
        .map(|[re, im]| Complex64::new(*re, *im))
        .collect();
    let selfdual = record
        .selfdual
        .unwrap_or_else(|| Descriptor::check_selfdual(&dirichlet_coefficients));
    let sign = match record.sign {
        Some([re, im]) => Sign::Known(Complex64::new(re, im)),
        None => Sign::Unknown,
    };
    let stored_zeros = match (record.zeros, record.zeros_message) {
        (Some(zeros), _) if !zeros.is_empty() => Some(StoredZeros::Values(zeros)),
        (Some(_), msg) => Some(StoredZeros::Unavailable(
            msg.unwrap_or_else(|| "zeros not available".to_string()),
        )),
        (None, Some(msg)) => Some(StoredZeros::Unavailable(msg)),
        (None, None) => None,
    };
    let title = record
        .title
        .unwrap_or_else(|| format!("L-function of degree {} and conductor {}", record.degree, record.level));

    Ok(Descriptor {
        ltype,
        title,
        label: record.label,
        url_path,
        degree: record.degree,
        level: record.level,
        sign,
        selfdual,
        primitive: record.primitive,
        algebraic: record.algebraic,
        motivic_weight: if record.algebraic { record.motivic_weight } else { None },
        dirichlet_coefficients,
        stored_zeros,
        plot_points: record
            .plot_points
            .map(|points| points.into_iter().map(|[x, y]| (x, y)).collect()),
        numeric: None,
        dual_link: record.dual_link,
        modform: record.modform,
        ellipticcurve: record.ellipticcurve,
        from_db: record.from_db,
        lcalcfile: record.lcalcfile,
        group: record.group,
        weight: record.weight,
        number: record.number,
    })
}

impl LfunctionBuilder for CatalogBuilder {
    fn build(&self, source: &LfunctionSource) -> Result<Descriptor, BuildError> {
        validate(source)?;
        if *source == LfunctionSource::Riemann {
            return Ok(riemann_with_backend(Arc::clone(&self.riemann)));
        }

        let key = source.lookup_key();
        debug!("looking up stored L-function {}", key);
        let record = find_lfunction(self.store.as_ref(), &key)
            .map_err(|e| BuildError::Defect(e.to_string()))?
            .ok_or_else(|| {
                warn!("no stored L-function for {}", key);
                BuildError::key(format!("No data for the L-function {}", key))
            })?;

        let mut desc = descriptor_from_record(source.ltype(), key, record)?;
        if let LfunctionSource::MaassFromDb { group, .. } = source {
            desc.group.get_or_insert_with(|| group.clone());
        }
        if matches!(source, LfunctionSource::MaassGl2 { .. }) {
            desc.group.get_or_insert_with(|| "GL2".to_string());
        }
        Ok(desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Args;
    use crate::lfunction::source::generate_from_url;
    use crate::store::{JsonStore, LFUNCTION_COLLECTION};
    use serde_json::json;

    fn builder() -> CatalogBuilder {
        let mut store = JsonStore::new();
        store.insert_collection(
            LFUNCTION_COLLECTION,
            vec![
                json!({
                    "key": "EllipticCurve/Q/11.a",
                    "degree": 2, "level": 11, "sign": [1.0, 0.0],
                    "algebraic": true, "motivic_weight": 1,
                    "dirichlet_coefficients": [[1.0, 0.0], [-2.0, 0.0]],
                    "zeros": [6.362613894, 8.603539619]
                }),
                json!({
                    "key": "Character/Dirichlet/5/2",
                    "degree": 1, "level": 5, "sign": [0.8, 0.6],
                    "dirichlet_coefficients": [[1.0, 0.0], [0.0, 1.0]],
                    "zeros_message": "zeros not yet computed"
                }),
                json!({"key": "ModularForm/GL2/Q/Maass/abc", "degree": 0, "level": 1}),
            ],
        );
        CatalogBuilder::new(Arc::new(store))
    }

    fn source(segments: &[&str]) -> LfunctionSource {
        generate_from_url(segments, &Args::new()).unwrap()
    }

    #[test]
    fn test_riemann_is_native() {
        let desc = builder().build(&LfunctionSource::Riemann).unwrap();
        assert_eq!(desc.ltype, LType::Riemann);
        assert!(desc.numeric.is_some());
        assert!(!desc.from_db);
    }

    #[test]
    fn test_stored_elliptic_curve() {
        let desc = builder().build(&source(&["EllipticCurve", "Q", "11.a"])).unwrap();
        assert_eq!(desc.degree, 2);
        assert_eq!(desc.level, 11);
        assert!(desc.selfdual);
        assert_eq!(desc.motivic_weight, Some(1));
        assert_eq!(
            desc.stored_zeros,
            Some(StoredZeros::Values(vec![6.362613894, 8.603539619]))
        );
    }

    #[test]
    fn test_dirichlet_complex_character() {
        let desc = builder().build(&source(&["Character", "Dirichlet", "5", "2"])).unwrap();
        assert!(!desc.selfdual);
        assert_eq!(desc.motivic_weight, None);
        assert_eq!(
            desc.stored_zeros,
            Some(StoredZeros::Unavailable("zeros not yet computed".into()))
        );
    }

    #[test]
    fn test_value_errors() {
        let err = builder()
            .build(&source(&["Character", "Dirichlet", "five", "2"]))
            .unwrap_err();
        assert!(matches!(err, BuildError::Value(_)));

        let err = builder()
            .build(&source(&["Character", "Dirichlet", "6", "3"]))
            .unwrap_err();
        assert!(matches!(err, BuildError::Value(_)));
    }

    #[test]
    fn test_missing_segment_is_type_error() {
        let err = builder().build(&source(&["Character", "Dirichlet", "5"])).unwrap_err();
        assert!(matches!(err, BuildError::Type(_)));
    }

    #[test]
    fn test_missing_record_is_key_error() {
        let err = builder().build(&source(&["EllipticCurve", "Q", "37.a"])).unwrap_err();
        assert_eq!(
            err,
            BuildError::key("No data for the L-function EllipticCurve/Q/37.a")
        );
    }

    #[test]
    fn test_lcalcurl_without_url() {
        let err = builder().build(&source(&["Lcalcurl"])).unwrap_err();
        assert_eq!(err, BuildError::key("url"));
    }

    #[test]
    fn test_corrupt_record_is_defect() {
        let err = builder()
            .build(&source(&["ModularForm", "GL2", "Q", "Maass", "abc"]))
            .unwrap_err();
        assert!(!err.is_recoverable());
    }
}
