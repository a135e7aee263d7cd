//! Type descriptors: the declared, ordered schema of an event.
//!
//! A [`TypeDescriptor`] fixes an event's shape up front: an id, an ordered
//! list of typed properties, and which of those properties form the primary
//! key. Replacing runtime reflection with a declared schema keeps decoding,
//! rendering, and key extraction deterministic.
//!
//! # Example
//!
//! ```
//! use strata_core::{PropertyDef, TypeDescriptor};
//!
//! let wave = TypeDescriptor::define(
//!     "WaveData_SampleType",
//!     vec![
//!         PropertyDef::int("Order").key(),
//!         PropertyDef::float("Radians"),
//!         PropertyDef::float("Sin"),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(wave.key_properties().len(), 1);
//! assert!(!wave.is_compound());
//! ```
//!
//! Compound keys declare their component order explicitly:
//!
//! ```
//! use strata_core::{PropertyDef, TypeDescriptor};
//!
//! let compound = TypeDescriptor::define(
//!     "SampleType_Compound",
//!     vec![
//!         PropertyDef::int("Order").key_order(1),
//!         PropertyDef::int("Multiplier").key_order(2),
//!         PropertyDef::float("Sin"),
//!     ],
//! )
//! .unwrap();
//!
//! assert!(compound.is_compound());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

use super::property::PropertyDef;

/// The declared schema of an event type.
///
/// Constructed through [`TypeDescriptor::define`] for stream event types
/// (at least one key property required) or [`TypeDescriptor::shape`] for
/// keyless nested-object shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    id: String,
    name: Option<String>,
    description: Option<String>,
    properties: Vec<PropertyDef>,
    /// Indices into `properties` for the key components, in key order.
    key_indices: Vec<usize>,
}

impl TypeDescriptor {
    /// Define a stream event type.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if:
    /// - two properties share a name,
    /// - no property is marked as a key,
    /// - a key property is not scalar (`Int`/`Float`),
    /// - more than one property is a key and any of them omits `key_order`,
    /// - the declared `key_order` values do not start at 1 or have gaps.
    ///
    /// Equal `key_order` values are permitted; declaration order breaks the
    /// tie.
    pub fn define(
        id: impl Into<String>,
        properties: Vec<PropertyDef>,
    ) -> Result<Self, CoreError> {
        let id = id.into();
        Self::check_unique_names(&id, &properties)?;

        let mut keyed: Vec<usize> = Vec::new();
        for (index, property) in properties.iter().enumerate() {
            if !property.is_key {
                continue;
            }
            if !property.kind.is_scalar() {
                return Err(CoreError::validation(format!(
                    "type '{id}': key property '{}' must be a scalar kind",
                    property.name
                )));
            }
            keyed.push(index);
        }

        if keyed.is_empty() {
            return Err(CoreError::validation(format!(
                "type '{id}' must declare at least one key property"
            )));
        }

        if keyed.len() > 1 {
            for &index in &keyed {
                if properties[index].key_order.is_none() {
                    return Err(CoreError::validation(format!(
                        "type '{id}': compound key property '{}' must declare a key order",
                        properties[index].name
                    )));
                }
            }

            let mut orders: Vec<u32> =
                keyed.iter().filter_map(|&i| properties[i].key_order).collect();
            orders.sort_unstable();
            orders.dedup();
            if orders[0] != 1 {
                return Err(CoreError::validation(format!(
                    "type '{id}': compound key orders must start at 1"
                )));
            }
            if orders.windows(2).any(|w| w[1] != w[0] + 1) {
                return Err(CoreError::validation(format!(
                    "type '{id}': compound key orders must be gapless"
                )));
            }
        }

        // Stable sort: declaration order breaks key-order ties.
        keyed.sort_by_key(|&i| properties[i].key_order.unwrap_or(1));

        Ok(Self { id, name: None, description: None, properties, key_indices: keyed })
    }

    /// Define a keyless shape for nested object properties.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if two properties share a name or
    /// any property is marked as a key.
    pub fn shape(id: impl Into<String>, properties: Vec<PropertyDef>) -> Result<Self, CoreError> {
        let id = id.into();
        Self::check_unique_names(&id, &properties)?;
        if let Some(property) = properties.iter().find(|p| p.is_key) {
            return Err(CoreError::validation(format!(
                "shape '{id}': nested property '{}' cannot be a key",
                property.name
            )));
        }
        Ok(Self { id, name: None, description: None, properties, key_indices: Vec::new() })
    }

    fn check_unique_names(id: &str, properties: &[PropertyDef]) -> Result<(), CoreError> {
        for (index, property) in properties.iter().enumerate() {
            if properties[..index].iter().any(|p| p.name == property.name) {
                return Err(CoreError::validation(format!(
                    "type '{id}': duplicate property name '{}'",
                    property.name
                )));
            }
        }
        Ok(())
    }

    /// Attach a human-readable name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The type id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The human-readable name, if any.
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The description, if any.
    #[inline]
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The declared properties, in declaration order.
    #[inline]
    #[must_use]
    pub fn properties(&self) -> &[PropertyDef] {
        &self.properties
    }

    /// Look up a property by name, returning its declaration index.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<(usize, &PropertyDef)> {
        self.properties.iter().enumerate().find(|(_, p)| p.name == name)
    }

    /// Indices of the key components, in key order.
    #[inline]
    #[must_use]
    pub fn key_indices(&self) -> &[usize] {
        &self.key_indices
    }

    /// The key properties, in key order.
    #[must_use]
    pub fn key_properties(&self) -> Vec<&PropertyDef> {
        self.key_indices.iter().map(|&i| &self.properties[i]).collect()
    }

    /// Returns `true` if the primary key has more than one component.
    #[inline]
    #[must_use]
    pub fn is_compound(&self) -> bool {
        self.key_indices.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::property::ValueKind;

    fn wave_properties() -> Vec<PropertyDef> {
        vec![
            PropertyDef::int("Order").key(),
            PropertyDef::float("Tau"),
            PropertyDef::float("Radians"),
            PropertyDef::float("Sin"),
        ]
    }

    #[test]
    fn define_single_key() {
        let descriptor = TypeDescriptor::define("Wave", wave_properties()).unwrap();
        assert_eq!(descriptor.id(), "Wave");
        assert_eq!(descriptor.key_indices(), &[0]);
        assert!(!descriptor.is_compound());
    }

    #[test]
    fn define_requires_a_key() {
        let err = TypeDescriptor::define("Wave", vec![PropertyDef::float("Sin")]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn define_rejects_duplicate_names() {
        let err = TypeDescriptor::define(
            "Wave",
            vec![PropertyDef::int("Order").key(), PropertyDef::float("Order")],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn compound_key_ordering() {
        let descriptor = TypeDescriptor::define(
            "Compound",
            vec![
                PropertyDef::float("Sin"),
                PropertyDef::int("Multiplier").key_order(2),
                PropertyDef::int("Order").key_order(1),
            ],
        )
        .unwrap();

        assert!(descriptor.is_compound());
        // Key order, not declaration order.
        assert_eq!(descriptor.key_indices(), &[2, 1]);
        let names: Vec<_> = descriptor.key_properties().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Order", "Multiplier"]);
    }

    #[test]
    fn compound_key_order_ties_break_by_declaration() {
        let descriptor = TypeDescriptor::define(
            "Tied",
            vec![
                PropertyDef::int("B").key_order(1),
                PropertyDef::int("A").key_order(1),
                PropertyDef::int("C").key_order(2),
            ],
        )
        .unwrap();
        let names: Vec<_> = descriptor.key_properties().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["B", "A", "C"]);
    }

    #[test]
    fn compound_key_orders_must_start_at_one() {
        let err = TypeDescriptor::define(
            "Bad",
            vec![PropertyDef::int("A").key_order(2), PropertyDef::int("B").key_order(3)],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn compound_key_orders_must_be_gapless() {
        let err = TypeDescriptor::define(
            "Bad",
            vec![PropertyDef::int("A").key_order(1), PropertyDef::int("B").key_order(3)],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn compound_key_requires_declared_orders() {
        let err = TypeDescriptor::define(
            "Bad",
            vec![PropertyDef::int("A").key(), PropertyDef::int("B").key_order(2)],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn key_must_be_scalar() {
        let shape = TypeDescriptor::shape("Point", vec![PropertyDef::float("X")]).unwrap();
        let err = TypeDescriptor::define(
            "Bad",
            vec![PropertyDef::object("Position", shape).key()],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn shape_rejects_keys() {
        let err =
            TypeDescriptor::shape("Point", vec![PropertyDef::int("X").key()]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn property_lookup() {
        let descriptor = TypeDescriptor::define("Wave", wave_properties()).unwrap();
        let (index, property) = descriptor.property("Radians").unwrap();
        assert_eq!(index, 2);
        assert_eq!(property.kind, ValueKind::Float);
        assert!(descriptor.property("Missing").is_none());
    }

    #[test]
    fn metadata_builders() {
        let descriptor = TypeDescriptor::define("Wave", wave_properties())
            .unwrap()
            .with_name("WaveDataSample")
            .with_description("Sample type for storing wave events");
        assert_eq!(descriptor.name(), Some("WaveDataSample"));
        assert!(descriptor.description().is_some());
    }
}
