// Property: a label determines (g, q, iso) and is rebuilt from them exactly.

use lmfdb_web::models::{abvar_label, split_label, validate_label, AbvarLabel};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_label_round_trip(g in 1u32..20, q in 2u64..100_000, iso in "[a-z_]{1,8}") {
        let label = abvar_label(g, q, &iso);
        prop_assert!(validate_label(&label).is_ok());

        let parsed = AbvarLabel::parse(&label).unwrap();
        prop_assert_eq!(parsed.g, g);
        prop_assert_eq!(parsed.q, q);
        prop_assert_eq!(&parsed.iso, &iso);
        prop_assert_eq!(parsed.to_string(), label.clone());

        let (sg, sq, siso) = split_label(&label).unwrap();
        prop_assert_eq!(abvar_label(sg, sq, siso), label);
    }

    /// Upper-case letters or digits in the isogeny part are rejected
    #[test]
    fn prop_bad_iso_rejected(g in 1u32..20, q in 2u64..1000, iso in "[a-z]{0,3}[A-Z0-9][a-z]{0,3}") {
        let label = abvar_label(g, q, &iso);
        prop_assert!(validate_label(&label).is_err());
        prop_assert!(AbvarLabel::parse(&label).is_err());
    }
}

#[test]
fn test_wrong_number_of_parts() {
    assert!(validate_label("1.2").is_err());
    assert!(validate_label("1.2.a.b").is_err());
    assert!(validate_label("x.2.a").is_err());
}
