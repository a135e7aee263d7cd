//! Events: materialized instances of a type descriptor.
//!
//! An [`Event`] holds exactly one value per declared property, in
//! declaration order. Absent inputs are backfilled with zero values during
//! decoding, so a materialized event never contains [`Value::Null`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strata_core::{Event, PropertyDef, TypeDescriptor, Value};
//!
//! let wave = Arc::new(
//!     TypeDescriptor::define(
//!         "Wave",
//!         vec![PropertyDef::int("Order").key(), PropertyDef::float("Sin")],
//!     )
//!     .unwrap(),
//! );
//!
//! let event = Event::from_values(&wave, vec![Value::Int(4), Value::Float(0.5)]).unwrap();
//! assert_eq!(event.get("Order"), Some(&Value::Int(4)));
//! assert_eq!(event.to_string(), "Order: 4, Sin: 0.5");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::codec;
use crate::encoding::keys::Key;
use crate::error::CoreError;

use super::descriptor::TypeDescriptor;
use super::value::Value;

/// A single typed event of a stream.
///
/// Events are cheap to clone: the descriptor is shared behind an [`Arc`]
/// and only the value vector is copied.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    descriptor: Arc<TypeDescriptor>,
    values: Vec<Value>,
}

impl Event {
    /// Build an event from declaration-ordered values.
    ///
    /// Values are coerced against the declared kinds (`Int` widens into a
    /// `Float` property; nothing narrows).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if the value count does not match
    /// the declared property count, or [`CoreError::TypeMismatch`] if a
    /// value does not conform to its property's kind.
    pub fn from_values(
        descriptor: &Arc<TypeDescriptor>,
        values: Vec<Value>,
    ) -> Result<Self, CoreError> {
        let properties = descriptor.properties();
        if values.len() != properties.len() {
            return Err(CoreError::validation(format!(
                "type '{}' declares {} properties, got {} values",
                descriptor.id(),
                properties.len(),
                values.len()
            )));
        }
        let mut coerced = Vec::with_capacity(values.len());
        for (property, value) in properties.iter().zip(values) {
            coerced.push(codec::coerce_value(&property.kind, value)?);
        }
        Ok(Self { descriptor: Arc::clone(descriptor), values: coerced })
    }

    /// The event's type descriptor.
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// The values in declaration order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Get a property value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.descriptor.property(name).map(|(index, _)| &self.values[index])
    }

    /// Get a property value by declaration index.
    #[inline]
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// The event's primary key: key-property values in key order.
    #[must_use]
    pub fn key(&self) -> Key {
        Key::new(
            self.descriptor.key_indices().iter().map(|&i| self.values[i].clone()).collect(),
        )
    }

    /// The event's key in its order-preserving byte encoding.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Encoding`] if a key component is not orderable;
    /// this cannot happen for events of a validly defined type.
    pub fn key_bytes(&self) -> Result<Vec<u8>, CoreError> {
        self.key().encode()
    }
}

impl fmt::Display for Event {
    /// Renders `Name: value` pairs in declaration order, matching the
    /// descriptor exactly so output is deterministic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (property, value)) in
            self.descriptor.properties().iter().zip(&self.values).enumerate()
        {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", property.name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::property::PropertyDef;

    fn wave_descriptor() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptor::define(
                "Wave",
                vec![
                    PropertyDef::int("Order").key(),
                    PropertyDef::float("Radians"),
                    PropertyDef::float("Sin"),
                ],
            )
            .unwrap(),
        )
    }

    fn compound_descriptor() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptor::define(
                "Compound",
                vec![
                    PropertyDef::int("Order").key_order(1),
                    PropertyDef::int("Multiplier").key_order(2),
                    PropertyDef::float("Sin"),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn from_values_and_access() {
        let descriptor = wave_descriptor();
        let event = Event::from_values(
            &descriptor,
            vec![Value::Int(2), Value::Float(0.196), Value::Float(0.39)],
        )
        .unwrap();

        assert_eq!(event.get("Order"), Some(&Value::Int(2)));
        assert_eq!(event.get("Sin"), Some(&Value::Float(0.39)));
        assert_eq!(event.get("Missing"), None);
        assert_eq!(event.value_at(1), Some(&Value::Float(0.196)));
    }

    #[test]
    fn from_values_widens_int_into_float() {
        let descriptor = wave_descriptor();
        let event =
            Event::from_values(&descriptor, vec![Value::Int(2), Value::Int(0), Value::Int(1)])
                .unwrap();
        assert_eq!(event.get("Radians"), Some(&Value::Float(0.0)));
        assert_eq!(event.get("Sin"), Some(&Value::Float(1.0)));
    }

    #[test]
    fn from_values_rejects_wrong_arity() {
        let descriptor = wave_descriptor();
        let err = Event::from_values(&descriptor, vec![Value::Int(2)]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn from_values_rejects_null() {
        let descriptor = wave_descriptor();
        let err = Event::from_values(
            &descriptor,
            vec![Value::Int(2), Value::Null, Value::Float(0.0)],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::TypeMismatch { .. }));
    }

    #[test]
    fn key_extraction() {
        let descriptor = compound_descriptor();
        let event = Event::from_values(
            &descriptor,
            vec![Value::Int(10), Value::Int(3), Value::Float(0.5)],
        )
        .unwrap();

        let key = event.key();
        assert_eq!(key.components(), &[Value::Int(10), Value::Int(3)]);
    }

    #[test]
    fn display_is_declaration_ordered() {
        let descriptor = wave_descriptor();
        let event = Event::from_values(
            &descriptor,
            vec![Value::Int(0), Value::Float(0.0), Value::Float(0.0)],
        )
        .unwrap();
        assert_eq!(event.to_string(), "Order: 0, Radians: 0, Sin: 0");
    }
}
