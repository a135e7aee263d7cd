//! Primary keys and their ordered byte encoding.
//!
//! A [`Key`] is the tuple of key-property values that addresses an event in
//! a stream. Compound keys compare lexicographically component-by-component,
//! which the byte encoding preserves: each component is encoded with the
//! [sortable](super::sortable) encoding and the results are concatenated, so
//! comparing encoded keys as byte strings matches comparing the tuples.
//!
//! # Example
//!
//! ```
//! use strata_core::Key;
//!
//! let single = Key::from(4i64);
//! let compound = Key::from((10i64, 3i64));
//!
//! assert_eq!(single.to_string(), "4");
//! assert_eq!(compound.to_string(), "10|3");
//!
//! // Byte ordering matches tuple ordering
//! let a = Key::from((10i64, 3i64)).encode().unwrap();
//! let b = Key::from((10i64, 8i64)).encode().unwrap();
//! assert!(a < b);
//! ```

use std::fmt;

use crate::error::CoreError;
use crate::types::{TypeDescriptor, Value};

use super::sortable::{decode_sortable_with_len, encode_sortable_to, COMPONENT_LEN};

/// The primary key of an event: key-property values in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    components: Vec<Value>,
}

impl Key {
    /// Create a key from its components, in key order.
    #[inline]
    #[must_use]
    pub fn new(components: Vec<Value>) -> Self {
        Self { components }
    }

    /// Create a single-component key.
    #[inline]
    #[must_use]
    pub fn single(value: impl Into<Value>) -> Self {
        Self { components: vec![value.into()] }
    }

    /// The key components, in key order.
    #[inline]
    #[must_use]
    pub fn components(&self) -> &[Value] {
        &self.components
    }

    /// Number of components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns `true` if the key has no components.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Encode the key into its order-preserving byte form.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] if a component is not orderable
    /// (`Null` or `Object`).
    pub fn encode(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::with_capacity(self.components.len() * COMPONENT_LEN);
        for component in &self.components {
            encode_sortable_to(component, &mut buf)?;
        }
        Ok(buf)
    }

    /// Decode a key from its byte form.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] if the bytes are malformed or do not
    /// decode to a whole number of components.
    pub fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut components = Vec::new();
        let mut offset = 0;
        while offset < bytes.len() {
            let (value, consumed) = decode_sortable_with_len(&bytes[offset..])?;
            components.push(value);
            offset += consumed;
        }
        Ok(Self { components })
    }

    /// Check this key against a descriptor's key properties, coercing
    /// components to the declared kinds (`Int` widens into a `Float` key
    /// component).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] on arity mismatch and
    /// [`CoreError::TypeMismatch`] if a component does not conform to the
    /// declared key kind.
    pub fn conform(&self, descriptor: &TypeDescriptor) -> Result<Self, CoreError> {
        let key_properties = descriptor.key_properties();
        if self.components.len() != key_properties.len() {
            return Err(CoreError::validation(format!(
                "type '{}' has a {}-component key, got {} components",
                descriptor.id(),
                key_properties.len(),
                self.components.len()
            )));
        }
        let mut components = Vec::with_capacity(self.components.len());
        for (property, component) in key_properties.iter().zip(&self.components) {
            components.push(crate::codec::coerce_value(&property.kind, component.clone())?);
        }
        Ok(Self { components })
    }

    /// The key as a numeric position, for interpolation arithmetic.
    ///
    /// Only single-component `Int`/`Float` keys have a position; compound
    /// keys return `None`.
    #[must_use]
    pub fn scalar_position(&self) -> Option<f64> {
        match self.components.as_slice() {
            [component] => component.as_numeric(),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    /// Components joined with `|`, e.g. `10|3` for a compound key.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, "|")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

impl From<i64> for Key {
    #[inline]
    fn from(value: i64) -> Self {
        Self::single(value)
    }
}

impl From<f64> for Key {
    #[inline]
    fn from(value: f64) -> Self {
        Self::single(value)
    }
}

impl From<Value> for Key {
    #[inline]
    fn from(value: Value) -> Self {
        Self { components: vec![value] }
    }
}

impl From<(i64, i64)> for Key {
    #[inline]
    fn from((first, second): (i64, i64)) -> Self {
        Self { components: vec![Value::Int(first), Value::Int(second)] }
    }
}

impl From<Vec<Value>> for Key {
    #[inline]
    fn from(components: Vec<Value>) -> Self {
        Self { components }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::PropertyDef;

    fn compound_descriptor() -> TypeDescriptor {
        TypeDescriptor::define(
            "Compound",
            vec![
                PropertyDef::int("Order").key_order(1),
                PropertyDef::int("Multiplier").key_order(2),
                PropertyDef::float("Sin"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn roundtrip_single() {
        let key = Key::from(42i64);
        let bytes = key.encode().unwrap();
        assert_eq!(Key::decode(&bytes).unwrap(), key);
    }

    #[test]
    fn roundtrip_compound() {
        let key = Key::from((10, 3));
        let bytes = key.encode().unwrap();
        assert_eq!(Key::decode(&bytes).unwrap(), key);
    }

    #[test]
    fn compound_keys_order_lexicographically() {
        let ordered = [(1, 10), (2, 2), (3, 1), (10, 3), (10, 8), (10, 10)];
        for pair in ordered.windows(2) {
            let a = Key::from(pair[0]).encode().unwrap();
            let b = Key::from(pair[1]).encode().unwrap();
            assert!(a < b, "{:?} should sort before {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn conform_checks_arity() {
        let descriptor = compound_descriptor();
        let err = Key::from(1i64).conform(&descriptor).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn conform_checks_kinds() {
        let descriptor = compound_descriptor();
        let err = Key::new(vec![Value::Int(1), Value::Float(0.5)])
            .conform(&descriptor)
            .unwrap_err();
        assert!(matches!(err, CoreError::TypeMismatch { .. }));

        let ok = Key::from((1, 2)).conform(&descriptor).unwrap();
        assert_eq!(ok.components(), &[Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn scalar_position() {
        assert_eq!(Key::from(4i64).scalar_position(), Some(4.0));
        assert_eq!(Key::from(2.5f64).scalar_position(), Some(2.5));
        assert_eq!(Key::from((1, 2)).scalar_position(), None);
    }

    #[test]
    fn display_uses_pipe_separator() {
        assert_eq!(Key::from(4i64).to_string(), "4");
        assert_eq!(Key::from((2, 1)).to_string(), "2|1");
    }
}
