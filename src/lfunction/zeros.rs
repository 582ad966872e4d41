//! Zeros of L-functions as shown on the web page

use super::numeric::{counted_zeros, heuristic_zeros};
use super::{Descriptor, LType};
use std::time::Duration;
use tracing::debug;

/// Shown when zeros can neither be loaded nor computed
pub const NOT_AVAILABLE: &str = "not available";

/// Most zeros shown on each side of the real axis
pub const ZERO_TRUNCATION: usize = 25;

/// Zeros with smaller magnitude are shown as exactly 0
const ZERO_EPSILON: f64 = 1e-10;

/// Zeros attached to a stored L-function
#[derive(Debug, Clone, PartialEq)]
pub enum StoredZeros {
    Values(Vec<f64>),
    /// The record has no zeros; the message explains why
    Unavailable(String),
}

/// A zero list ready for display, or a message in place of one
#[derive(Debug, Clone, PartialEq)]
pub enum ZeroData {
    Zeros(Vec<f64>),
    Message(String),
}

impl ZeroData {
    pub fn not_available() -> Self {
        ZeroData::Message(NOT_AVAILABLE.to_string())
    }
}

fn display_zero(z: f64) -> String {
    if z.abs() < ZERO_EPSILON {
        "0".to_string()
    } else {
        z.to_string()
    }
}

/// Render zeros as the HTML fragment shown on L-function pages
///
/// Negative zeros (the last 25) are highlighted separately from the
/// non-negative ones (the first 25). A message is returned verbatim.
pub fn format_zeros(data: &ZeroData) -> String {
    let zeros = match data {
        ZeroData::Message(msg) => return msg.clone(),
        ZeroData::Zeros(zeros) => zeros,
    };

    let mut negative = Vec::new();
    let mut positive = Vec::new();
    for &z in zeros {
        if z.abs() >= ZERO_EPSILON && z < 0.0 {
            negative.push(display_zero(z));
        } else {
            positive.push(display_zero(z));
        }
    }

    let negative = &negative[negative.len().saturating_sub(ZERO_TRUNCATION)..];
    let positive = &positive[..positive.len().min(ZERO_TRUNCATION)];

    let mut negative_html = negative.join(", ");
    if !negative.is_empty() && !positive.is_empty() {
        negative_html.push_str(", ");
    }

    format!(
        "<span class='redhighlight'>{}</span><span class='positivezero'>{}</span>",
        negative_html.replace('-', "&minus;"),
        positive.join(", ")
    )
}

/// Whether the zero search uses the fast grid scan rather than a counted search
fn uses_heuristic_search(desc: &Descriptor) -> bool {
    desc.degree > 2
        || matches!(
            desc.ltype,
            LType::Maass | LType::LcalcUrl | LType::HypergeometricMotive | LType::Artin
        )
}

/// Compute zeros on the fly with the descriptor's numeric backend
pub fn compute_web_zeros(desc: &Descriptor, time_allowed: Duration) -> ZeroData {
    let Some(numeric) = desc.numeric.as_deref() else {
        return ZeroData::not_available();
    };

    let mut zeros = if uses_heuristic_search(desc) {
        let step = 0.02;
        let upper = if desc.ltype.has_wide_range() { 20.0 } else { 10.0 };
        let lower = if desc.selfdual { -step / 2.0 } else { -20.0 };
        debug!("heuristic zero scan over [{}, {}]", lower, upper);
        heuristic_zeros(numeric, lower, upper, step, time_allowed)
    } else {
        let count = if desc.selfdual { 6 } else { 8 };
        debug!("counted zero search for {} zeros", count);
        counted_zeros(numeric, count, !desc.selfdual, 1000.0, time_allowed)
    };
    zeros.sort_by(|a, b| a.total_cmp(b));
    ZeroData::Zeros(zeros)
}

/// The zeros HTML fragment for a descriptor
///
/// Stored zeros take precedence; stored L-functions without zeros show
/// "not available"; everything else is computed.
pub fn zeros_for(desc: &Descriptor, time_allowed: Duration) -> String {
    match &desc.stored_zeros {
        Some(StoredZeros::Values(zeros)) => format_zeros(&ZeroData::Zeros(zeros.clone())),
        Some(StoredZeros::Unavailable(msg)) => format!("<span>{}</span>", msg),
        None if desc.from_db => format_zeros(&ZeroData::not_available()),
        None => format_zeros(&compute_web_zeros(desc, time_allowed)),
    }
}
