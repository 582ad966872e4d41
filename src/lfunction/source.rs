//! URL dispatch for L-functions
//!
//! [`generate_from_url`] maps the path segments below `/L/` (and the query
//! arguments) to the [`LfunctionSource`] that knows how to build the
//! L-function. Segments are taken positionally without validation; a missing
//! segment is `None` and the builder decides whether that is an error.

use super::LType;
use crate::search::Args;
use tracing::debug;

/// Largest number of positional segments a dispatch shape uses
pub const MAX_SEGMENTS: usize = 9;

/// Everything needed to build one L-function
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LfunctionSource {
    Riemann,
    Dirichlet {
        modulus: Option<String>,
        number: Option<String>,
    },
    EllipticCurveQ {
        label: Option<String>,
    },
    EllipticModularForm {
        level: Option<String>,
        weight: Option<String>,
        character: Option<String>,
        label: Option<String>,
        number: Option<String>,
    },
    HilbertModularForm {
        field: Option<String>,
        label: Option<String>,
        character: Option<String>,
        number: Option<String>,
    },
    MaassGl2 {
        dbid: Option<String>,
    },
    /// GL(n) Maass form with n > 2 held outside the main database
    MaassHighDegree {
        dbid: Option<String>,
    },
    MaassFromDb {
        group: String,
        level: Option<String>,
        character: Option<String>,
        r: Option<String>,
        ap_id: Option<String>,
    },
    SiegelScalar {
        weight: Option<String>,
        orbit: Option<String>,
        number: Option<String>,
    },
    DedekindZeta {
        label: Option<String>,
    },
    Artin {
        label: Option<String>,
    },
    SymmetricPower {
        power: Option<String>,
        underlying: Option<String>,
        field: Option<String>,
        label: Option<String>,
    },
    HypergeometricFamily {
        family: Option<String>,
        t: String,
    },
    HypergeometricLabel {
        label: Option<String>,
    },
    Genus2CurveQ {
        label: Option<String>,
    },
    LcalcUrl {
        url: Option<String>,
    },
}

/// Collection holding GL(n) Maass forms that are not in the main database
pub const MAASS_HIGH_DEGREE_COLLECTION: &str = "Lfunction/LemurellMaassHighDegree";

/// Map URL segments to an L-function source
///
/// Returns `None` when the path is not recognized. First match wins.
pub fn generate_from_url<S: AsRef<str>>(segments: &[S], args: &Args) -> Option<LfunctionSource> {
    let seg = |i: usize| -> Option<String> {
        segments
            .get(i)
            .map(|s| s.as_ref().to_string())
    };
    let is = |i: usize, value: &str| segments.get(i).map(|s| s.as_ref()) == Some(value);

    let source = if is(0, "Riemann") {
        LfunctionSource::Riemann
    } else if is(0, "Character") && is(1, "Dirichlet") {
        LfunctionSource::Dirichlet {
            modulus: seg(2),
            number: seg(3),
        }
    } else if is(0, "EllipticCurve") && is(1, "Q") {
        LfunctionSource::EllipticCurveQ { label: seg(2) }
    } else if is(0, "ModularForm") && is(1, "GL2") && is(2, "Q") && is(3, "holomorphic") {
        LfunctionSource::EllipticModularForm {
            level: seg(4),
            weight: seg(5),
            character: seg(6),
            label: seg(7),
            number: seg(8),
        }
    } else if is(0, "ModularForm") && is(1, "GL2") && is(2, "TotallyReal") && is(4, "holomorphic") {
        LfunctionSource::HilbertModularForm {
            field: seg(3),
            label: seg(5),
            character: seg(6),
            number: seg(7),
        }
    } else if is(0, "ModularForm") && is(1, "GL2") && !is(2, "Q") && is(3, "holomorphic") {
        // archaic Hilbert modular form URL with the field in third position
        LfunctionSource::HilbertModularForm {
            field: seg(2),
            label: seg(4),
            character: seg(5),
            number: seg(6),
        }
    } else if is(0, "ModularForm") && is(1, "GL2") && is(2, "Q") && is(3, "Maass") {
        LfunctionSource::MaassGl2 { dbid: seg(4) }
    } else if is(0, "ModularForm")
        && (is(1, "GSp4") || is(1, "GL4") || is(1, "GL3"))
        && is(2, "Q")
        && is(3, "Maass")
    {
        maass_high_degree(segments, seg)
    } else if is(0, "ModularForm") && is(1, "GSp") && is(2, "Q") && is(3, "Sp4Z") {
        LfunctionSource::SiegelScalar {
            weight: seg(4),
            orbit: seg(5),
            number: seg(6),
        }
    } else if is(0, "NumberField") {
        LfunctionSource::DedekindZeta { label: seg(1) }
    } else if is(0, "ArtinRepresentation") {
        LfunctionSource::Artin { label: seg(1) }
    } else if is(0, "SymmetricPower") {
        LfunctionSource::SymmetricPower {
            power: seg(1),
            underlying: seg(2),
            field: seg(3),
            label: seg(4),
        }
    } else if is(0, "Motive") && is(1, "Hypergeometric") && is(2, "Q") {
        match seg(4).filter(|t| !t.is_empty()) {
            Some(t) => LfunctionSource::HypergeometricFamily { family: seg(3), t },
            None => LfunctionSource::HypergeometricLabel { label: seg(3) },
        }
    } else if is(0, "Genus2Curve") && is(1, "Q") {
        let label = match (seg(2), seg(3)) {
            (Some(cond), Some(x)) => Some(format!("{}.{}", cond, x)),
            _ => None,
        };
        LfunctionSource::Genus2CurveQ { label }
    } else if is(0, "Lcalcurl") {
        LfunctionSource::LcalcUrl {
            url: args.get("url").cloned(),
        }
    } else {
        debug!("no L-function source for {:?}", segments.iter().map(|s| s.as_ref()).collect::<Vec<_>>());
        return None;
    };

    debug!("dispatched to {:?}", source);
    Some(source)
}

fn maass_high_degree<S: AsRef<str>>(
    segments: &[S],
    seg: impl Fn(usize) -> Option<String>,
) -> LfunctionSource {
    let r_empty = segments.get(6).map_or(true, |s| s.as_ref().is_empty());
    if r_empty {
        LfunctionSource::MaassHighDegree { dbid: seg(4) }
    } else {
        LfunctionSource::MaassFromDb {
            group: segments[1].as_ref().to_string(),
            level: seg(4),
            character: seg(5),
            r: seg(6),
            ap_id: seg(7),
        }
    }
}

fn opt(s: &Option<String>) -> &str {
    s.as_deref().unwrap_or("")
}

impl LfunctionSource {
    pub fn ltype(&self) -> LType {
        match self {
            LfunctionSource::Riemann => LType::Riemann,
            LfunctionSource::Dirichlet { .. } => LType::Dirichlet,
            LfunctionSource::EllipticCurveQ { .. } => LType::EllipticCurveQ,
            LfunctionSource::EllipticModularForm { .. } => LType::EllipticModularForm,
            LfunctionSource::HilbertModularForm { .. } => LType::HilbertModularForm,
            LfunctionSource::MaassGl2 { .. }
            | LfunctionSource::MaassHighDegree { .. }
            | LfunctionSource::MaassFromDb { .. } => LType::Maass,
            LfunctionSource::SiegelScalar { .. } => LType::SiegelNonLift,
            LfunctionSource::DedekindZeta { .. } => LType::DedekindZeta,
            LfunctionSource::Artin { .. } => LType::Artin,
            LfunctionSource::SymmetricPower { .. } => LType::SymmetricPower,
            LfunctionSource::HypergeometricFamily { .. }
            | LfunctionSource::HypergeometricLabel { .. } => LType::HypergeometricMotive,
            LfunctionSource::Genus2CurveQ { .. } => LType::Genus2CurveQ,
            LfunctionSource::LcalcUrl { .. } => LType::LcalcUrl,
        }
    }

    /// Key of the stored L-function document for this source
    pub fn lookup_key(&self) -> String {
        match self {
            LfunctionSource::Riemann => "Riemann".to_string(),
            LfunctionSource::Dirichlet { modulus, number } => {
                format!("Character/Dirichlet/{}/{}", opt(modulus), opt(number))
            }
            LfunctionSource::EllipticCurveQ { label } => format!("EllipticCurve/Q/{}", opt(label)),
            LfunctionSource::EllipticModularForm {
                level,
                weight,
                character,
                label,
                number,
            } => format!(
                "ModularForm/GL2/Q/holomorphic/{}/{}/{}/{}/{}",
                opt(level),
                opt(weight),
                opt(character),
                opt(label),
                opt(number)
            ),
            LfunctionSource::HilbertModularForm {
                field,
                label,
                character,
                number,
            } => format!(
                "ModularForm/GL2/TotallyReal/{}/holomorphic/{}/{}/{}",
                opt(field),
                opt(label),
                opt(character),
                opt(number)
            ),
            LfunctionSource::MaassGl2 { dbid } => format!("ModularForm/GL2/Q/Maass/{}", opt(dbid)),
            LfunctionSource::MaassHighDegree { dbid } => {
                format!("{}/{}", MAASS_HIGH_DEGREE_COLLECTION, opt(dbid))
            }
            LfunctionSource::MaassFromDb {
                group,
                level,
                character,
                r,
                ap_id,
            } => format!(
                "ModularForm/{}/Q/Maass/{}/{}/{}/{}",
                group,
                opt(level),
                opt(character),
                opt(r),
                opt(ap_id)
            ),
            LfunctionSource::SiegelScalar {
                weight,
                orbit,
                number,
            } => format!(
                "ModularForm/GSp/Q/Sp4Z/{}/{}/{}",
                opt(weight),
                opt(orbit),
                opt(number)
            ),
            LfunctionSource::DedekindZeta { label } => format!("NumberField/{}", opt(label)),
            LfunctionSource::Artin { label } => format!("ArtinRepresentation/{}", opt(label)),
            LfunctionSource::SymmetricPower {
                power,
                underlying,
                field,
                label,
            } => format!(
                "SymmetricPower/{}/{}/{}/{}",
                opt(power),
                opt(underlying),
                opt(field),
                opt(label)
            ),
            LfunctionSource::HypergeometricFamily { family, t } => {
                format!("Motive/Hypergeometric/Q/{}/{}", opt(family), t)
            }
            LfunctionSource::HypergeometricLabel { label } => {
                format!("Motive/Hypergeometric/Q/{}", opt(label))
            }
            LfunctionSource::Genus2CurveQ { label } => {
                format!("Genus2Curve/Q/{}", opt(label).replacen('.', "/", 1))
            }
            LfunctionSource::LcalcUrl { url } => format!("Lcalcurl?url={}", opt(url)),
        }
    }

    /// Precomputed plot store `(domain, condition)` for this source, if any
    pub fn plot_store_key(&self) -> Option<(&'static str, String)> {
        match self {
            LfunctionSource::EllipticCurveQ { label: Some(label) } => {
                Some(("ecplots", format!("label = '{}'", label)))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch(segments: &[&str]) -> Option<LfunctionSource> {
        generate_from_url(segments, &Args::new())
    }

    #[test]
    fn test_riemann() {
        assert_eq!(dispatch(&["Riemann"]), Some(LfunctionSource::Riemann));
    }

    #[test]
    fn test_dirichlet_segments_are_positional() {
        assert_eq!(
            dispatch(&["Character", "Dirichlet", "5", "2"]),
            Some(LfunctionSource::Dirichlet {
                modulus: Some("5".into()),
                number: Some("2".into())
            })
        );
        assert_eq!(
            dispatch(&["Character", "Dirichlet", "5"]),
            Some(LfunctionSource::Dirichlet {
                modulus: Some("5".into()),
                number: None
            })
        );
    }

    #[test]
    fn test_hypergeometric_branches() {
        assert_eq!(
            dispatch(&["Motive", "Hypergeometric", "Q", "A2_B1", "t1.2"]),
            Some(LfunctionSource::HypergeometricFamily {
                family: Some("A2_B1".into()),
                t: "t1.2".into()
            })
        );
        assert_eq!(
            dispatch(&["Motive", "Hypergeometric", "Q", "A2_B1_t1.2", ""]),
            Some(LfunctionSource::HypergeometricLabel {
                label: Some("A2_B1_t1.2".into())
            })
        );
    }

    #[test]
    fn test_genus2_label_joined() {
        assert_eq!(
            dispatch(&["Genus2Curve", "Q", "169", "a"]),
            Some(LfunctionSource::Genus2CurveQ {
                label: Some("169.a".into())
            })
        );
    }

    #[test]
    fn test_lcalcurl_reads_query_argument() {
        let mut args = Args::new();
        args.insert("url".into(), "http://example.org/L.lcalc".into());
        assert_eq!(
            generate_from_url(&["Lcalcurl"], &args),
            Some(LfunctionSource::LcalcUrl {
                url: Some("http://example.org/L.lcalc".into())
            })
        );
    }

    #[test]
    fn test_unrecognized_is_none() {
        assert_eq!(dispatch(&["Nonsense"]), None);
        assert_eq!(dispatch(&["Character", "Hecke", "1"]), None);
        let empty: [&str; 0] = [];
        assert_eq!(dispatch(&empty), None);
    }

    #[test]
    fn test_lookup_keys() {
        let source = dispatch(&["EllipticCurve", "Q", "11.a"]).unwrap();
        assert_eq!(source.lookup_key(), "EllipticCurve/Q/11.a");
        assert_eq!(
            source.plot_store_key(),
            Some(("ecplots", "label = '11.a'".to_string()))
        );

        let source = dispatch(&["Genus2Curve", "Q", "169", "a"]).unwrap();
        assert_eq!(source.lookup_key(), "Genus2Curve/Q/169/a");
        assert_eq!(source.plot_store_key(), None);
    }

    #[test]
    fn test_ltype_of_maass_variants() {
        let source = dispatch(&["ModularForm", "GL3", "Q", "Maass", "1", "1", "", ""]).unwrap();
        assert_eq!(source.ltype(), LType::Maass);
        assert_eq!(
            source.lookup_key(),
            "Lfunction/LemurellMaassHighDegree/1"
        );
    }
}
