//! Property-based tests for key encoding round-trips and ordering.

#![allow(clippy::expect_used, clippy::float_cmp)]

use proptest::prelude::*;

use crate::encoding::keys::Key;
use crate::encoding::sortable::{decode_sortable, encode_sortable};
use crate::types::Value;

/// Strategy for generating orderable key component values.
fn arb_component() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        // Filter out NaN since NaN != NaN
        any::<f64>().prop_filter("not NaN", |f| !f.is_nan()).prop_map(Value::Float),
    ]
}

/// Strategy for generating compound keys of 1-3 components.
fn arb_key() -> impl Strategy<Value = Key> {
    prop::collection::vec(arb_component(), 1..=3).prop_map(Key::new)
}

proptest! {
    #[test]
    fn component_roundtrip(value in arb_component()) {
        let encoded = encode_sortable(&value).expect("encoding should succeed");
        let decoded = decode_sortable(&encoded).expect("decoding should succeed");
        prop_assert_eq!(value, decoded);
    }

    #[test]
    fn key_roundtrip(key in arb_key()) {
        let encoded = key.encode().expect("encoding should succeed");
        let decoded = Key::decode(&encoded).expect("decoding should succeed");
        prop_assert_eq!(key, decoded);
    }

    #[test]
    fn int_encoding_preserves_order(a in any::<i64>(), b in any::<i64>()) {
        let enc_a = encode_sortable(&Value::Int(a)).expect("encoding should succeed");
        let enc_b = encode_sortable(&Value::Int(b)).expect("encoding should succeed");
        prop_assert_eq!(a.cmp(&b), enc_a.cmp(&enc_b));
    }

    #[test]
    fn float_encoding_preserves_order(
        a in any::<f64>().prop_filter("not NaN", |f| !f.is_nan()),
        b in any::<f64>().prop_filter("not NaN", |f| !f.is_nan()),
    ) {
        let enc_a = encode_sortable(&Value::Float(a)).expect("encoding should succeed");
        let enc_b = encode_sortable(&Value::Float(b)).expect("encoding should succeed");
        let expected = a.partial_cmp(&b).expect("non-NaN floats are comparable");
        prop_assert_eq!(expected, enc_a.cmp(&enc_b));
    }

    #[test]
    fn compound_key_order_is_lexicographic(
        a1 in any::<i64>(), a2 in any::<i64>(),
        b1 in any::<i64>(), b2 in any::<i64>(),
    ) {
        let key_a = Key::from((a1, a2));
        let key_b = Key::from((b1, b2));
        let enc_a = key_a.encode().expect("encoding should succeed");
        let enc_b = key_b.encode().expect("encoding should succeed");
        prop_assert_eq!((a1, a2).cmp(&(b1, b2)), enc_a.cmp(&enc_b));
    }
}
