// ABOUTME: Property tests for problem fingerprints.
// ABOUTME: Fingerprints must not depend on the order of configuration values or event parts.

use proptest::prelude::*;
use revdeploy::listener::Identity;

fn value() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9./_-]{1,12}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: shuffling configuration values leaves the fingerprint unchanged.
    #[test]
    fn fingerprint_ignores_value_order(
        values in proptest::collection::vec(value(), 1..=6),
        seed in any::<u64>(),
    ) {
        let mut shuffled = values.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        if seed % 2 == 1 {
            shuffled.reverse();
        }

        let a = Identity::new(&values, None);
        let b = Identity::new(&shuffled, None);
        prop_assert_eq!(a.fingerprint(&["Failed"]), b.fingerprint(&["Failed"]));
    }

    /// PROPERTY: event parts and configuration values are interchangeable in position.
    #[test]
    fn fingerprint_ignores_part_order(a in value(), b in value(), c in value()) {
        let identity = Identity::new([a.as_str()], None);
        prop_assert_eq!(
            identity.fingerprint(&[b.as_str(), c.as_str()]),
            identity.fingerprint(&[c.as_str(), b.as_str()])
        );
        prop_assert_eq!(
            identity.fingerprint(&[b.as_str()]),
            Identity::new([b.as_str()], None).fingerprint(&[a.as_str()])
        );
    }

    /// PROPERTY: surrounding whitespace and letter case do not matter.
    #[test]
    fn fingerprint_normalizes_values(v in value()) {
        let padded = format!("  {}  ", v.to_uppercase());
        prop_assert_eq!(
            Identity::new([v.as_str()], None).fingerprint(&[]),
            Identity::new([padded.as_str()], None).fingerprint(&[])
        );
    }
}
