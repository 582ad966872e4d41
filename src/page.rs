//! Page contexts
//!
//! Pages are served as the JSON context a template would be rendered with.

use crate::lfunction::source::MAASS_HIGH_DEGREE_COLLECTION;
use crate::lfunction::{style_the_sign, Descriptor, LType, Sign};
use crate::models::AbvarFqIsoclass;
use crate::search::{Condition, Pagination, Query};
use crate::store::{AbvarStats, LfunctionRecord};
use serde::Serialize;

/// Minimum number of coefficients for a GL(2) Maass form to get zeros and a plot
const MAASS_MIN_COEFFICIENTS: usize = 100;

/// Context of an individual L-function page
#[derive(Debug, Clone, Serialize)]
pub struct LfunctionPage {
    pub title: String,
    pub label: String,
    #[serde(rename = "Ltype")]
    pub ltype: LType,
    pub degree: u32,
    pub conductor: u64,
    /// LaTeX factorisation, only for composite conductors
    pub conductor_factored: Option<String>,
    pub sign: String,
    pub selfdual: &'static str,
    pub primitive: &'static str,
    pub algebraic: bool,
    pub motivic_weight: Option<u32>,
    /// Properties box: `(name, value)` rows
    pub properties2: Vec<(String, String)>,
    pub zeroslink: String,
    pub plotlink: String,
    pub downloads: Vec<(String, String)>,
    pub dual_link: Option<String>,
    pub modform: Option<String>,
    pub ellipticcurve: Option<String>,
    pub args: Vec<(String, String)>,
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

/// Deterministic Miller-Rabin for 64-bit integers
fn is_prime(n: u64) -> bool {
    const BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
    if n < 2 {
        return false;
    }
    for p in BASES {
        if n % p == 0 {
            return n == p;
        }
    }
    let mul = |a: u64, b: u64| ((a as u128 * b as u128) % n as u128) as u64;
    let pow = |mut b: u64, mut e: u64| {
        let mut r = 1;
        while e > 0 {
            if e & 1 == 1 {
                r = mul(r, b);
            }
            b = mul(b, b);
            e >>= 1;
        }
        r
    };
    let s = (n - 1).trailing_zeros();
    let d = (n - 1) >> s;
    BASES.iter().all(|&a| {
        let mut x = pow(a, d);
        if x == 1 || x == n - 1 {
            return true;
        }
        for _ in 1..s {
            x = mul(x, x);
            if x == n - 1 {
                return true;
            }
        }
        false
    })
}

/// Prime factorisation as `(p, e)` pairs
fn factor(mut n: u64) -> Vec<(u64, u32)> {
    let mut factors = Vec::new();
    let mut p = 2;
    let mut remaining_prime = is_prime(n);
    while !remaining_prime && p <= n / p {
        if n % p == 0 {
            let mut e = 0;
            while n % p == 0 {
                n /= p;
                e += 1;
            }
            factors.push((p, e));
            remaining_prime = is_prime(n);
        }
        p += if p == 2 { 1 } else { 2 };
    }
    if n > 1 {
        factors.push((n, 1));
    }
    factors
}

fn latex_factors(factors: &[(u64, u32)]) -> String {
    factors
        .iter()
        .map(|&(p, e)| {
            if e == 1 {
                p.to_string()
            } else {
                format!("{}^{{{}}}", p, e)
            }
        })
        .collect::<Vec<_>>()
        .join(" \\cdot ")
}

/// LaTeX factorisation of `n`, e.g. `2^{2} \cdot 3`
pub fn latex_factor(n: u64) -> String {
    latex_factors(&factor(n))
}

/// Factorisation of a conductor, `None` when it is 1 or prime
fn composite_factorisation(n: u64) -> Option<String> {
    let factors = factor(n);
    match factors.as_slice() {
        [] | [(_, 1)] => None,
        _ => Some(latex_factors(&factors)),
    }
}

/// Properties box of an L-function page
pub fn properties(desc: &Descriptor) -> Vec<(String, String)> {
    let mut props = vec![
        ("Degree".to_string(), desc.degree.to_string()),
        ("Conductor".to_string(), desc.level.to_string()),
        ("Sign".to_string(), format!("${}$", style_the_sign(&desc.sign))),
        ("Self-dual".to_string(), yes_no(desc.selfdual).to_string()),
    ];
    if desc.algebraic {
        if let Some(w) = desc.motivic_weight {
            props.push(("Motivic weight".to_string(), w.to_string()));
        }
    }
    props
}

/// Links to the zeros fragment and the plot, empty when not offered
///
/// The plot link also needs something to draw from: stored plot points, a
/// Z function, or a plot store row (`has_cached_plot`).
pub fn zeros_and_plot_links(desc: &Descriptor, has_cached_plot: bool) -> (String, String) {
    if !desc.has_zero_data() {
        return (String::new(), String::new());
    }
    let suppressed = match desc.ltype {
        LType::Maass => {
            desc.group.as_deref() == Some("GL2")
                && desc.dirichlet_coefficients.len() < MAASS_MIN_COEFFICIENTS
        }
        LType::Artin => desc.sign == Sign::Unknown || desc.sign == Sign::real(0.0),
        LType::EllipticModularForm => {
            let number = desc.number.unwrap_or(0) as u64;
            let weight = desc.weight.unwrap_or(0) as u64;
            (number == 1 && (1 + desc.level) * weight > 50)
                || (number > 1 && desc.level * weight > 50)
        }
        _ => false,
    };
    if suppressed {
        return (String::new(), String::new());
    }
    let plottable = has_cached_plot || desc.plot_points.is_some() || desc.numeric.is_some();
    let plotlink = if plottable {
        format!("/L/Plot/{}/", desc.url_path)
    } else {
        String::new()
    };
    (format!("/L/Zeros/{}/", desc.url_path), plotlink)
}

/// Download link for the lcalc file of the page at `request_url`
pub fn lcalc_link(request_url: &str, has_args: bool) -> String {
    if has_args {
        format!("{}&download=lcalcfile", request_url)
    } else {
        format!("{}?download=lcalcfile", request_url)
    }
}

impl LfunctionPage {
    /// Build the context for `desc`, requested at `request_url` with `args`
    pub fn new(
        desc: &Descriptor,
        has_cached_plot: bool,
        request_url: &str,
        args: Vec<(String, String)>,
    ) -> Self {
        let (zeroslink, plotlink) = zeros_and_plot_links(desc, has_cached_plot);
        LfunctionPage {
            title: desc.title.clone(),
            label: desc.label.clone().unwrap_or_default(),
            ltype: desc.ltype,
            degree: desc.degree,
            conductor: desc.level,
            conductor_factored: composite_factorisation(desc.level),
            sign: format!("${}$", style_the_sign(&desc.sign)),
            selfdual: yes_no(desc.selfdual),
            primitive: yes_no(desc.primitive),
            algebraic: desc.algebraic,
            motivic_weight: desc.motivic_weight,
            properties2: properties(desc),
            zeroslink,
            plotlink,
            downloads: vec![(
                "Lcalcfile".to_string(),
                lcalc_link(request_url, !args.is_empty()),
            )],
            dual_link: desc.dual_link.clone(),
            modform: desc.modform.clone(),
            ellipticcurve: desc.ellipticcurve.clone(),
            args,
        }
    }
}

/// The lcalc file of an L-function: the stored one, or one summarising its data
pub fn lcalc_file(desc: &Descriptor, url: &str) -> String {
    if let Some(stored) = &desc.lcalcfile {
        return stored.clone();
    }
    let (sign_re, sign_im) = match desc.sign {
        Sign::Known(z) => (z.re, z.im),
        Sign::Unknown => (0.0, 0.0),
    };
    let mut s = format!("# L-function data for {}\n", url);
    s.push_str(&format!("# {}\n", desc.title));
    s.push_str("3\n0\n");
    s.push_str(&format!("{}\n", desc.dirichlet_coefficients.len()));
    s.push_str("0\n");
    s.push_str(&format!("{}\n", desc.level));
    s.push_str(&format!("{} {}\n", sign_re, sign_im));
    s.push_str(&format!("{}\n", desc.degree));
    for a in &desc.dirichlet_coefficients {
        s.push_str(&format!("{} {}\n", a.re, a.im));
    }
    s
}

/// Top page of the L-function section
#[derive(Debug, Clone, Serialize)]
pub struct LfunctionTopPage {
    pub title: &'static str,
    pub degree_list: Vec<u32>,
    pub type_table: Vec<Vec<(&'static str, &'static str)>>,
}

impl Default for LfunctionTopPage {
    fn default() -> Self {
        LfunctionTopPage {
            title: "L-functions",
            degree_list: (1..=4).collect(),
            type_table: vec![
                vec![
                    ("Riemann zeta function", "/L/Riemann/"),
                    ("Dirichlet L-function", "/L/degree1/"),
                ],
                vec![
                    ("Holomorphic cusp form with trivial character", "/L/degree2/CuspForm/"),
                    ("GL2 Maass form", "/L/degree2/MaassForm/"),
                    ("Elliptic curve", "/L/degree2/EllipticCurve/"),
                ],
                vec![
                    ("GL3 Maass form", "/L/degree3/MaassForm/"),
                    (
                        "Symmetric square L-function of Elliptic curve",
                        "/L/degree3/EllipticCurve/SymmetricSquare/",
                    ),
                ],
                vec![
                    ("GSp4 Maass form", "/L/degree4/MaassForm/#GSp4_Q_Maass"),
                    ("GL4 Maass form", "/L/degree4/MaassForm/"),
                    (
                        "Symmetric cube L-function of Elliptic curve",
                        "/L/degree4/EllipticCurve/SymmetricCube/",
                    ),
                ],
            ],
        }
    }
}

/// Browsing page for L-functions of one degree
#[derive(Debug, Clone, Serialize)]
pub struct DegreePage {
    pub title: String,
    pub degree: u32,
}

impl DegreePage {
    /// Page for a `degree<n>` path segment, `None` if it is not one
    pub fn from_segment(segment: &str) -> Option<Self> {
        let degree: u32 = segment.strip_prefix("degree")?.parse().ok()?;
        Some(DegreePage {
            title: format!("Degree {} L-functions", degree),
            degree,
        })
    }
}

/// A family of stored L-functions listed on a browse page
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseFamily {
    pub title: String,
    pub degree: u32,
    /// Stored keys of the family start with one of these
    pub key_prefixes: Vec<String>,
    /// An empty listing is reported as not found
    pub require_contents: bool,
}

impl BrowseFamily {
    /// Family for the segments of `/L/degree<n>/...`, `None` if there is none
    pub fn from_segments<S: AsRef<str>>(segments: &[S]) -> Option<Self> {
        let (first, rest) = segments.split_first()?;
        let degree: u32 = first.as_ref().strip_prefix("degree")?.parse().ok()?;
        let rest: Vec<&str> = rest.iter().map(|s| s.as_ref()).collect();
        let family = |title: &str, prefixes: &[&str], require_contents: bool| BrowseFamily {
            title: title.to_string(),
            degree,
            key_prefixes: prefixes.iter().map(|p| p.to_string()).collect(),
            require_contents,
        };
        match (degree, rest.as_slice()) {
            (2, ["CuspForm"]) => Some(family(
                "L-functions of Cusp Forms on \\(\\Gamma_0(N)\\) with trivial character",
                &["ModularForm/GL2/Q/holomorphic/"],
                false,
            )),
            (2, ["MaassForm"]) => Some(family(
                "L-functions of GL(2) Maass Forms of weight 0",
                &["ModularForm/GL2/Q/Maass/"],
                false,
            )),
            (2, ["EllipticCurve"]) => Some(family(
                "L-functions of Elliptic Curves",
                &["EllipticCurve/Q/"],
                false,
            )),
            (3, ["EllipticCurve", "SymmetricSquare"]) => Some(family(
                "Symmetric square L-functions of Elliptic Curves",
                &["SymmetricPower/2/EllipticCurve/Q/"],
                false,
            )),
            (4, ["EllipticCurve", "SymmetricCube"]) => Some(family(
                "Symmetric cube L-functions of Elliptic Curves",
                &["SymmetricPower/3/EllipticCurve/Q/"],
                false,
            )),
            (n, ["MaassForm"]) if n > 0 => {
                let gl = format!("ModularForm/GL{}/Q/Maass/", n);
                let high = format!("{}/", MAASS_HIGH_DEGREE_COLLECTION);
                let mut prefixes = vec![gl.as_str(), high.as_str()];
                if n == 4 {
                    prefixes.push("ModularForm/GSp4/Q/Maass/");
                }
                Some(family(
                    &format!("L-functions of GL({}) Maass Forms", n),
                    &prefixes,
                    true,
                ))
            }
            _ => None,
        }
    }

    /// Stored L-functions of this family
    pub fn query(&self) -> Query {
        let mut query = Query::new();
        query.insert("degree", Condition::Eq(self.degree.into()));
        query.insert(
            "key",
            Condition::AnyOf(
                self.key_prefixes
                    .iter()
                    .map(|p| Condition::Prefix(p.clone()))
                    .collect(),
            ),
        );
        query
    }
}

/// Browse page listing the stored L-functions of a family
#[derive(Debug, Clone, Serialize)]
pub struct BrowsePage {
    pub title: String,
    pub degree: u32,
    /// `(title, link)` rows
    pub contents: Vec<(String, String)>,
}

impl BrowsePage {
    pub fn new(family: &BrowseFamily, records: Vec<LfunctionRecord>) -> Self {
        let contents = records
            .into_iter()
            .map(|r| {
                let link = format!("/L/{}/", r.key);
                (r.title.unwrap_or(r.key), link)
            })
            .collect();
        BrowsePage {
            title: family.title.clone(),
            degree: family.degree,
            contents,
        }
    }
}

/// Context of the abelian-variety index page
#[derive(Debug, Clone, Serialize)]
pub struct AbvarIndexPage {
    pub title: &'static str,
    pub col_heads: Vec<u64>,
    pub row_heads: Vec<u32>,
    /// `table[g][q]` counts, rows in `row_heads` order
    pub table: Vec<Vec<usize>>,
}

impl AbvarIndexPage {
    pub fn new(stats: &AbvarStats) -> Self {
        let col_heads: Vec<u64> = stats.qs.iter().copied().take(23).collect();
        let table = stats
            .gs
            .iter()
            .map(|&g| col_heads.iter().map(|&q| stats.count(q, g)).collect())
            .collect();
        AbvarIndexPage {
            title: "Isogeny Classes of Abelian Varieties over Finite Fields",
            col_heads,
            row_heads: stats.gs.clone(),
            table,
        }
    }
}

/// Context of an isogeny class page
#[derive(Debug, Clone, Serialize)]
pub struct AbvarClassPage {
    pub title: String,
    pub cl: AbvarFqIsoclass,
}

impl AbvarClassPage {
    pub fn new(cl: AbvarFqIsoclass) -> Self {
        AbvarClassPage {
            title: format!("Abelian Variety isogeny class {} over ${}$", cl.label, cl.field),
            cl,
        }
    }
}

/// Context of an abelian-variety search results page
#[derive(Debug, Clone, Serialize)]
pub struct AbvarSearchPage {
    pub title: &'static str,
    pub abvars: Vec<AbvarFqIsoclass>,
    pub number: usize,
    pub start: usize,
    pub count: usize,
    pub more: bool,
    pub report: String,
    /// Stored filter, passed back for downloads
    pub query: String,
}

impl AbvarSearchPage {
    pub fn new(abvars: Vec<AbvarFqIsoclass>, pagination: Pagination, query: String) -> Self {
        AbvarSearchPage {
            title: "Abelian Variety search results",
            abvars,
            number: pagination.number,
            start: pagination.start,
            count: pagination.count,
            more: pagination.more(),
            report: pagination.report(),
            query,
        }
    }
}

/// Context of the search-input-error page
#[derive(Debug, Clone, Serialize)]
pub struct SearchInputErrorPage {
    pub title: &'static str,
    pub err: String,
    pub flash: Vec<String>,
}

impl SearchInputErrorPage {
    pub fn new(flash: Vec<String>) -> Self {
        SearchInputErrorPage {
            title: "Abelian Variety search input error",
            err: String::new(),
            flash,
        }
    }
}

/// HTML page explaining why an L-function could not be shown
pub fn lfunction_error_page(explain: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><title>Error displaying L-function</title></head>\
         <body><h1>Error displaying L-function</h1>{}</body></html>\n",
        explain
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lfunction::builder::riemann_descriptor;
    use crate::lfunction::zeros::StoredZeros;
    use num_complex::Complex64;

    #[test]
    fn test_latex_factor() {
        assert_eq!(latex_factor(12), "2^{2} \\cdot 3");
        assert_eq!(latex_factor(11), "11");
        assert_eq!(latex_factor(3 * 3 * 5 * 7), "3^{2} \\cdot 5 \\cdot 7");
        assert_eq!(composite_factorisation(1), None);
        assert_eq!(composite_factorisation(11), None);
        assert_eq!(composite_factorisation(15).as_deref(), Some("3 \\cdot 5"));
        assert_eq!(composite_factorisation(4).as_deref(), Some("2^{2}"));
    }

    #[test]
    fn test_factor_near_u64_max() {
        // 2^64 - 59 is prime; the trial bound must not overflow
        let p = u64::MAX - 58;
        assert_eq!(factor(p), vec![(p, 1)]);
        assert_eq!(composite_factorisation(p), None);
        assert_eq!(factor(1 << 63), vec![(2, 63)]);
        assert!(is_prime(4294967291));
        assert!(!is_prime(4294967291 * 3));
    }

    #[test]
    fn test_riemann_page() {
        let desc = riemann_descriptor();
        let page = LfunctionPage::new(&desc, false, "/L/Riemann/", Vec::new());
        assert_eq!(page.zeroslink, "/L/Zeros/Riemann/");
        assert_eq!(page.plotlink, "/L/Plot/Riemann/");
        assert_eq!(page.sign, "$1$");
        assert_eq!(page.selfdual, "yes");
        assert_eq!(page.conductor_factored, None);
        assert_eq!(
            page.downloads,
            vec![("Lcalcfile".to_string(), "/L/Riemann/?download=lcalcfile".to_string())]
        );
        assert!(page
            .properties2
            .contains(&("Motivic weight".to_string(), "0".to_string())));
    }

    #[test]
    fn test_lcalc_link_with_args() {
        assert_eq!(lcalc_link("/L/x/?a=1", true), "/L/x/?a=1&download=lcalcfile");
    }

    #[test]
    fn test_links_absent_without_zero_data() {
        let mut desc = riemann_descriptor();
        desc.numeric = None;
        assert_eq!(zeros_and_plot_links(&desc, false), (String::new(), String::new()));
    }

    #[test]
    fn test_plot_link_needs_a_plot_source() {
        let mut desc = riemann_descriptor();
        desc.ltype = LType::Artin;
        desc.numeric = None;
        desc.stored_zeros = Some(StoredZeros::Values(vec![14.13]));
        let (zeros, plot) = zeros_and_plot_links(&desc, false);
        assert_eq!(zeros, "/L/Zeros/Riemann/");
        assert_eq!(plot, "");

        assert_eq!(zeros_and_plot_links(&desc, true).1, "/L/Plot/Riemann/");
        desc.plot_points = Some(vec![(0.0, 1.0), (1.0, 0.5)]);
        assert_eq!(zeros_and_plot_links(&desc, false).1, "/L/Plot/Riemann/");
    }

    #[test]
    fn test_maass_gl2_needs_enough_coefficients() {
        let mut desc = riemann_descriptor();
        desc.ltype = LType::Maass;
        desc.group = Some("GL2".into());
        desc.dirichlet_coefficients = vec![Complex64::new(1.0, 0.0); 99];
        assert_eq!(zeros_and_plot_links(&desc, false).0, "");

        desc.dirichlet_coefficients = vec![Complex64::new(1.0, 0.0); 100];
        assert_ne!(zeros_and_plot_links(&desc, false).0, "");

        desc.group = Some("GL3".into());
        desc.dirichlet_coefficients.truncate(10);
        assert_ne!(zeros_and_plot_links(&desc, false).0, "");
    }

    #[test]
    fn test_artin_unknown_sign_has_no_links() {
        let mut desc = riemann_descriptor();
        desc.ltype = LType::Artin;
        desc.sign = Sign::Unknown;
        assert_eq!(zeros_and_plot_links(&desc, false).1, "");
        desc.sign = Sign::real(1.0);
        assert_ne!(zeros_and_plot_links(&desc, false).1, "");
    }

    #[test]
    fn test_large_modular_forms_have_no_links() {
        let mut desc = riemann_descriptor();
        desc.ltype = LType::EllipticModularForm;
        desc.level = 11;
        desc.weight = Some(2);
        desc.number = Some(1);
        // (1 + 11) * 2 = 24
        assert_ne!(zeros_and_plot_links(&desc, false).0, "");
        desc.weight = Some(5);
        assert_eq!(zeros_and_plot_links(&desc, false).0, "");

        desc.number = Some(2);
        desc.weight = Some(4);
        // 11 * 4 = 44
        assert_ne!(zeros_and_plot_links(&desc, false).0, "");
        desc.level = 13;
        assert_eq!(zeros_and_plot_links(&desc, false).0, "");
    }

    #[test]
    fn test_conductor_factored_for_composites() {
        let mut desc = riemann_descriptor();
        desc.level = 12;
        let page = LfunctionPage::new(&desc, false, "/L/x/", Vec::new());
        assert_eq!(page.conductor_factored.as_deref(), Some("2^{2} \\cdot 3"));
    }

    #[test]
    fn test_lcalc_file_prefers_stored() {
        let mut desc = riemann_descriptor();
        assert!(lcalc_file(&desc, "/L/Riemann/").starts_with("# L-function data for /L/Riemann/\n"));
        desc.lcalcfile = Some("stored".into());
        assert_eq!(lcalc_file(&desc, "/L/Riemann/"), "stored");
    }

    #[test]
    fn test_degree_page() {
        assert_eq!(DegreePage::from_segment("degree3").unwrap().degree, 3);
        assert!(DegreePage::from_segment("degreex").is_none());
        assert!(DegreePage::from_segment("Riemann").is_none());
    }

    #[test]
    fn test_browse_families_for_top_page_links() {
        for (_, link) in LfunctionTopPage::default().type_table.concat() {
            let path = link.split('#').next().unwrap_or(link);
            let segments: Vec<&str> = path.trim_matches('/').split('/').skip(1).collect();
            if segments.len() > 1 {
                assert!(BrowseFamily::from_segments(&segments).is_some(), "{}", link);
            }
        }
        assert!(BrowseFamily::from_segments(&["degree4", "Genus2Curve"]).is_none());
        assert!(BrowseFamily::from_segments(&["degree3", "CuspForm"]).is_none());
    }

    #[test]
    fn test_browse_query_filters_degree_and_key() {
        let family = BrowseFamily::from_segments(&["degree4", "MaassForm"]).unwrap();
        assert!(family.require_contents);
        let query = family.query();
        assert!(query.matches(&serde_json::json!({"key": "ModularForm/GSp4/Q/Maass/1", "degree": 4})));
        assert!(query.matches(&serde_json::json!({"key": "ModularForm/GL4/Q/Maass/1/0/2.1/3", "degree": 4})));
        assert!(!query.matches(&serde_json::json!({"key": "ModularForm/GL3/Q/Maass/1", "degree": 4})));
        assert!(!query.matches(&serde_json::json!({"key": "ModularForm/GL4/Q/Maass/1", "degree": 3})));
    }

    #[test]
    fn test_browse_page_rows() {
        let family = BrowseFamily::from_segments(&["degree2", "EllipticCurve"]).unwrap();
        let records: Vec<LfunctionRecord> = serde_json::from_value(serde_json::json!([
            {"key": "EllipticCurve/Q/11.a", "title": "L-function of 11.a", "degree": 2, "level": 11},
            {"key": "EllipticCurve/Q/37.a", "degree": 2, "level": 37}
        ]))
        .unwrap();
        let page = BrowsePage::new(&family, records);
        assert_eq!(page.title, "L-functions of Elliptic Curves");
        assert_eq!(
            page.contents,
            vec![
                ("L-function of 11.a".to_string(), "/L/EllipticCurve/Q/11.a/".to_string()),
                ("EllipticCurve/Q/37.a".to_string(), "/L/EllipticCurve/Q/37.a/".to_string()),
            ]
        );
    }

    #[test]
    fn test_abvar_index_table() {
        let mut stats = AbvarStats::default();
        stats.qs = vec![2, 3];
        stats.gs = vec![1, 2];
        stats.counts.entry(2).or_default().insert(1, 5);
        stats.counts.entry(3).or_default().insert(2, 7);
        let page = AbvarIndexPage::new(&stats);
        assert_eq!(page.table, vec![vec![5, 0], vec![0, 7]]);
    }
}
