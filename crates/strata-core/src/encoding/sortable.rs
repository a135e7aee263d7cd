//! Sort-order preserving encoding for key components.
//!
//! Comparing the encoded bytes of two values produces the same ordering as
//! comparing the values themselves, which lets streams keep their events in
//! a plain ordered map keyed by encoded bytes and answer range queries with
//! byte-range scans.
//!
//! # Encoding Design
//!
//! Values are tagged, so within a compound key each component occupies a
//! self-delimiting region:
//! - `Int` (0x01) - sign-flip encoding: XOR with `0x8000_0000_0000_0000`
//!   makes negative numbers sort before positive, stored big-endian.
//! - `Float` (0x02) - IEEE 754 bits, sign bit flipped for positives, all
//!   bits flipped for negatives; NaN encodes as the maximum so it sorts
//!   last.
//!
//! `Null` and `Object` values have no total order and are rejected.
//!
//! # Example
//!
//! ```
//! use strata_core::encoding::sortable::{decode_sortable, encode_sortable};
//! use strata_core::Value;
//!
//! let values = vec![Value::Int(-10), Value::Int(0), Value::Int(10)];
//!
//! let mut encoded: Vec<_> =
//!     values.iter().map(|v| encode_sortable(v).unwrap()).collect();
//! encoded.sort();
//!
//! let decoded: Vec<_> =
//!     encoded.iter().map(|e| decode_sortable(e).unwrap()).collect();
//! assert_eq!(decoded, values);
//! ```

use crate::error::CoreError;
use crate::types::Value;

/// Type tags for sortable encoding.
pub mod tags {
    /// 64-bit signed integers.
    pub const INT: u8 = 0x01;
    /// 64-bit floating point numbers.
    pub const FLOAT: u8 = 0x02;
}

/// Constant for flipping the sign bit of a 64-bit word.
const SIGN_FLIP: u64 = 0x8000_0000_0000_0000;

/// Number of bytes a single encoded component occupies (tag + payload).
pub const COMPONENT_LEN: usize = 9;

/// Encode a value into a sort-order preserving byte representation.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if the value is `Null` or `Object`,
/// which have no total order.
pub fn encode_sortable(value: &Value) -> Result<Vec<u8>, CoreError> {
    let mut buf = Vec::with_capacity(COMPONENT_LEN);
    encode_sortable_to(value, &mut buf)?;
    Ok(buf)
}

/// Encode a value into a pre-allocated buffer.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if the value is `Null` or `Object`.
pub fn encode_sortable_to(value: &Value, buf: &mut Vec<u8>) -> Result<(), CoreError> {
    match value {
        Value::Int(i) => {
            buf.push(tags::INT);
            // Flip sign bit to make negative numbers sort before positive
            let encoded = (*i as u64) ^ SIGN_FLIP;
            buf.extend_from_slice(&encoded.to_be_bytes());
            Ok(())
        }

        Value::Float(f) => {
            buf.push(tags::FLOAT);
            let bits = f.to_bits();
            // NaN encodes as the maximum so it sorts last
            let encoded = if f.is_nan() {
                u64::MAX
            } else if bits & SIGN_FLIP == 0 {
                // Positive float (including +0): flip sign bit
                bits ^ SIGN_FLIP
            } else {
                // Negative float (including -0): flip all bits
                !bits
            };
            buf.extend_from_slice(&encoded.to_be_bytes());
            Ok(())
        }

        Value::Null | Value::Object(_) => Err(CoreError::Encoding(format!(
            "{} values are not orderable",
            value.kind_name()
        ))),
    }
}

/// Decode a sortable-encoded value back to its original form.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if the bytes are malformed or truncated.
pub fn decode_sortable(bytes: &[u8]) -> Result<Value, CoreError> {
    let (value, _) = decode_sortable_with_len(bytes)?;
    Ok(value)
}

/// Decode a sortable-encoded value and return the number of bytes consumed.
///
/// This is the entry point when the encoded value is one component of a
/// larger compound key.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if the bytes are malformed or truncated.
pub fn decode_sortable_with_len(bytes: &[u8]) -> Result<(Value, usize), CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::Encoding("unexpected end of input in sortable decode".into()));
    }

    let tag = bytes[0];
    let rest = &bytes[1..];
    if rest.len() < 8 {
        return Err(CoreError::Encoding("unexpected end of input reading component".into()));
    }
    let payload: [u8; 8] = rest[..8]
        .try_into()
        .map_err(|_| CoreError::Encoding("failed to read component bytes".into()))?;
    let encoded = u64::from_be_bytes(payload);

    match tag {
        tags::INT => {
            // Flip sign bit back
            let value = (encoded ^ SIGN_FLIP) as i64;
            Ok((Value::Int(value), COMPONENT_LEN))
        }

        tags::FLOAT => {
            let bits = if encoded == u64::MAX {
                // NaN was encoded as MAX
                f64::NAN.to_bits()
            } else if encoded & SIGN_FLIP != 0 {
                // Was positive (sign bit is set after XOR): flip sign bit back
                encoded ^ SIGN_FLIP
            } else {
                // Was negative (sign bit is clear): flip all bits back
                !encoded
            };
            Ok((Value::Float(f64::from_bits(bits)), COMPONENT_LEN))
        }

        _ => Err(CoreError::Encoding(format!("unknown sortable type tag: {tag:#x}"))),
    }
}
