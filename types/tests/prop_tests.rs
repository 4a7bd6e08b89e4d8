use proptest::prelude::*;

use gratia_types::amount::NANOS_PER_UNIT;
use gratia_types::{Amount, Timestamp, TxSignature};

proptest! {
    /// Amount roundtrip: from_raw -> raw is identity.
    #[test]
    fn amount_raw_roundtrip(raw in 0u128..u128::MAX / 2) {
        prop_assert_eq!(Amount::from_raw(raw).raw(), raw);
    }

    /// Amount decimal rendering roundtrips through parsing.
    #[test]
    fn amount_decimal_roundtrip(raw in 0u128..1_000_000_000_000_000_000u128) {
        let amount = Amount::from_raw(raw);
        let parsed = Amount::from_decimal_str(&amount.to_decimal_string()).unwrap();
        prop_assert_eq!(parsed, amount);
    }

    /// Whole-unit decimal strings parse to exact multiples of the nano scale.
    #[test]
    fn amount_whole_units_are_exact(units in 0u128..1_000_000_000u128) {
        let parsed = Amount::from_decimal_str(&units.to_string()).unwrap();
        prop_assert_eq!(parsed.raw(), units * NANOS_PER_UNIT);
    }

    /// Amount ordering agrees with raw ordering.
    #[test]
    fn amount_ordering(a in 0u128..u128::MAX / 2, b in 0u128..u128::MAX / 2) {
        prop_assert_eq!(Amount::from_raw(a) <= Amount::from_raw(b), a <= b);
    }

    /// Amount bincode serialization roundtrip (the LMDB value encoding).
    #[test]
    fn amount_bincode_roundtrip(raw in 0u128..u128::MAX / 2) {
        let amount = Amount::from_raw(raw);
        let encoded = bincode::serialize(&amount).unwrap();
        let decoded: Amount = bincode::deserialize(&encoded).unwrap();
        prop_assert_eq!(decoded, amount);
    }

    /// Timestamp ordering: from_millis(a) <= from_millis(b) iff a <= b.
    #[test]
    fn timestamp_ordering(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        let ta = Timestamp::from_millis(a);
        let tb = Timestamp::from_millis(b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta == tb, a == b);
    }

    /// Timestamp elapsed_since: elapsed_since(now) = now - self (saturating).
    #[test]
    fn timestamp_elapsed_since(base in 0u64..1_000_000, offset in 0u64..1_000_000) {
        let t = Timestamp::from_millis(base);
        let now = Timestamp::from_millis(base + offset);
        prop_assert_eq!(t.elapsed_since(now), offset);
    }

    /// Well-formed signatures stay well-formed under truncation.
    #[test]
    fn signature_prefix_stays_well_formed(len in 1usize..88) {
        let sig = TxSignature::new("5".repeat(88));
        let prefix = TxSignature::new(&sig.as_str()[..len]);
        prop_assert!(prefix.is_well_formed());
    }
}
