// Property: zero lists are truncated to at most 25 entries on each side of
// the origin, magnitudes below 1e-10 display as 0, and the two blocks are
// glued with ", " only when both are non-empty.

use lmfdb_web::lfunction::zeros::{format_zeros, ZeroData, ZERO_TRUNCATION};
use proptest::prelude::*;

fn blocks(html: &str) -> (String, String) {
    let neg = html
        .strip_prefix("<span class='redhighlight'>")
        .and_then(|s| s.split_once("</span>"))
        .map(|(n, _)| n.to_string())
        .unwrap();
    let pos = html
        .split_once("<span class='positivezero'>")
        .and_then(|(_, s)| s.strip_suffix("</span>"))
        .map(str::to_string)
        .unwrap();
    (neg, pos)
}

fn entries(block: &str) -> Vec<String> {
    block
        .split(", ")
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// At most 25 entries per side, and never more than were given
    #[test]
    fn prop_at_most_25_per_side(
        negatives in prop::collection::vec(-100.0f64..-0.001, 0..60),
        positives in prop::collection::vec(0.001f64..100.0, 0..60),
    ) {
        let mut zeros = negatives.clone();
        zeros.extend(positives.iter().copied());
        let html = format_zeros(&ZeroData::Zeros(zeros));
        let (neg, pos) = blocks(&html);

        let neg_entries = entries(&neg);
        let pos_entries = entries(&pos);
        prop_assert_eq!(neg_entries.len(), negatives.len().min(ZERO_TRUNCATION));
        prop_assert_eq!(pos_entries.len(), positives.len().min(ZERO_TRUNCATION));
        prop_assert!(!neg.contains('-'), "minus signs must be escaped: {}", neg);
    }

    /// The glue after the negative block depends only on both blocks being non-empty
    #[test]
    fn prop_glue_iff_both_sides(
        negatives in prop::collection::vec(-100.0f64..-0.001, 0..5),
        positives in prop::collection::vec(0.001f64..100.0, 0..5),
    ) {
        let mut zeros = negatives.clone();
        zeros.extend(positives.iter().copied());
        let (neg, _) = blocks(&format_zeros(&ZeroData::Zeros(zeros)));
        prop_assert_eq!(
            neg.ends_with(", "),
            !negatives.is_empty() && !positives.is_empty()
        );
    }

    /// Magnitudes below 1e-10 render as 0
    #[test]
    fn prop_tiny_zeros_render_as_zero(tiny in -9.9e-11f64..9.9e-11) {
        let html = format_zeros(&ZeroData::Zeros(vec![tiny]));
        prop_assert_eq!(html, "<span class='redhighlight'></span><span class='positivezero'>0</span>");
    }
}

#[test]
fn test_keeps_zeros_nearest_the_origin() {
    let zeros: Vec<f64> = (1..=30).map(|i| -(i as f64)).rev().chain((1..=30).map(|i| i as f64)).collect();
    let (neg, pos) = blocks(&format_zeros(&ZeroData::Zeros(zeros)));
    let neg = entries(&neg);
    let pos = entries(&pos);
    assert_eq!(neg.first().unwrap(), "&minus;25");
    assert_eq!(neg.last().unwrap(), "&minus;1");
    assert_eq!(pos.first().unwrap(), "1");
    assert_eq!(pos.last().unwrap(), "25");
}

#[test]
fn test_message_passes_through() {
    assert_eq!(format_zeros(&ZeroData::not_available()), "not available");
}
