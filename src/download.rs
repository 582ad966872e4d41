//! Weil polynomial downloads for computer algebra systems
//!
//! Search results can be downloaded as a source file defining a list
//! `data` of polynomials, in the syntax of Pari/GP, SageMath or Magma.

use crate::polynomial::Polynomial;
use chrono::NaiveDate;

/// Target language of a download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Gp,
    Sage,
    Magma,
}

impl Dialect {
    /// Dialect for the `Submit` argument; anything unrecognised is GP
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "sage" => Dialect::Sage,
            "magma" => Dialect::Magma,
            _ => Dialect::Gp,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Dialect::Gp => "gp",
            Dialect::Sage => "sage",
            Dialect::Magma => "m",
        }
    }

    /// Single-line comment marker, empty for Magma which uses a block comment
    fn line_comment(&self) -> &'static str {
        match self {
            Dialect::Gp => "\\\\",
            Dialect::Sage => "#",
            Dialect::Magma => "",
        }
    }

    fn block_comment(&self) -> (&'static str, &'static str) {
        match self {
            Dialect::Magma => ("/*", "*/"),
            _ => ("", ""),
        }
    }

    fn list_prefix(&self) -> &'static str {
        match self {
            Dialect::Gp => "data = [ ",
            Dialect::Sage => "s = polygen(ZZ) \ndata = [ ",
            Dialect::Magma => "P<x> := PolynomialRing(Integers()); \ndata := [",
        }
    }
}

/// A generated download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFile {
    pub filename: String,
    pub content: String,
}

impl DownloadFile {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename={}", self.filename)
    }
}

/// Format Weil polynomials (constant-term-first coefficients) for download
pub fn format_download(polynomials: &[Vec<i64>], dialect: Dialect, date: NaiveDate) -> DownloadFile {
    let com = dialect.line_comment();
    let (open, close) = dialect.block_comment();

    let mut s = format!("{}\n", open);
    s.push_str(&format!(
        "{} Weil polynomials downloaded from the LMFDB on {}.\n",
        com,
        date.format("%d %B %Y")
    ));
    s.push_str(&format!(
        "{} Below is a list (called data), collecting the weight 1 L-polynomial\n",
        com
    ));
    s.push_str(&format!(
        "{} attached to each isogeny class of an abelian variety.\n",
        com
    ));
    s.push_str(&format!("\n{}\n", close));

    let prefix = dialect.list_prefix();
    if polynomials.is_empty() {
        s.push_str(prefix.trim_end());
    } else {
        s.push_str(prefix);
        s.push_str("\\\n");
        let items: Vec<String> = polynomials
            .iter()
            .map(|coeffs| Polynomial::from_coefficients(coeffs).to_string())
            .collect();
        s.push_str(&items.join(",\\\n"));
    }
    s.push_str("]\n");

    if dialect == Dialect::Magma {
        s = s.replace('[', "[*").replace(']', "*]");
        s.push(';');
    }

    DownloadFile {
        filename: format!("weil_polynomials.{}", dialect.extension()),
        content: s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2017, 3, 5).unwrap()
    }

    #[test]
    fn test_dialect_tags() {
        assert_eq!(Dialect::from_tag("sage"), Dialect::Sage);
        assert_eq!(Dialect::from_tag("magma"), Dialect::Magma);
        assert_eq!(Dialect::from_tag("gp"), Dialect::Gp);
        assert_eq!(Dialect::from_tag("anything"), Dialect::Gp);
    }

    #[test]
    fn test_gp_download() {
        let file = format_download(&[vec![1, 2, 1], vec![1, 0, 1]], Dialect::Gp, date());
        assert_eq!(file.filename, "weil_polynomials.gp");
        assert_eq!(
            file.content,
            "\n\
             \\\\ Weil polynomials downloaded from the LMFDB on 05 March 2017.\n\
             \\\\ Below is a list (called data), collecting the weight 1 L-polynomial\n\
             \\\\ attached to each isogeny class of an abelian variety.\n\
             \n\n\
             data = [ \\\n\
             x^2 + 2*x + 1,\\\n\
             x^2 + 1]\n"
        );
    }

    #[test]
    fn test_sage_download() {
        let file = format_download(&[vec![1, -1, 2]], Dialect::Sage, date());
        assert_eq!(file.filename, "weil_polynomials.sage");
        assert!(file.content.starts_with("\n# Weil polynomials downloaded"));
        assert!(file.content.ends_with("s = polygen(ZZ) \ndata = [ \\\n2*x^2 - x + 1]\n"));
    }

    #[test]
    fn test_magma_download() {
        let file = format_download(&[vec![1, 2, 1], vec![1, 0, 1]], Dialect::Magma, date());
        assert_eq!(file.filename, "weil_polynomials.m");
        assert!(file.content.starts_with("/*\n Weil polynomials downloaded from the LMFDB on 05 March 2017.\n"));
        assert!(file.content.contains("\n*/\n"));
        assert!(file.content.ends_with(
            "P<x> := PolynomialRing(Integers()); \ndata := [*\\\nx^2 + 2*x + 1,\\\nx^2 + 1*]\n;"
        ));
    }

    #[test]
    fn test_empty_download() {
        let file = format_download(&[], Dialect::Gp, date());
        assert!(file.content.ends_with("data = []\n"));
        let file = format_download(&[], Dialect::Magma, date());
        assert!(file.content.ends_with("data := [**]\n;"));
    }

    #[test]
    fn test_content_disposition() {
        let file = format_download(&[], Dialect::Sage, date());
        assert_eq!(
            file.content_disposition(),
            "attachment; filename=weil_polynomials.sage"
        );
    }
}
