//! Property definitions: the typed, ordered fields of a type descriptor.
//!
//! # Example
//!
//! ```
//! use strata_core::{PropertyDef, ValueKind};
//!
//! // The primary key of a stream type
//! let order = PropertyDef::int("Order").key();
//! assert!(order.is_key);
//!
//! // A plain measurement
//! let sin = PropertyDef::float("Sin");
//! assert_eq!(sin.kind, ValueKind::Float);
//! assert!(!sin.is_key);
//! ```

use serde::{Deserialize, Serialize};

use super::descriptor::TypeDescriptor;
use super::value::{FieldMap, Value};

/// The declared kind of a property's value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueKind {
    /// 64-bit signed integer.
    Int,
    /// 64-bit floating point number.
    Float,
    /// Nested structured value described by a keyless shape descriptor.
    Object(Box<TypeDescriptor>),
}

impl ValueKind {
    /// A short name for the kind, for error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Object(_) => "object",
        }
    }

    /// Returns `true` for kinds that have a total order (and can therefore
    /// be used as keys or secondary index targets).
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    /// The kind's zero value, used to backfill absent fields.
    ///
    /// Nested objects zero every declared property recursively.
    #[must_use]
    pub fn zero(&self) -> Value {
        match self {
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::Object(shape) => {
                let mut fields = FieldMap::new();
                for property in shape.properties() {
                    fields.insert(property.name.clone(), property.kind.zero());
                }
                Value::Object(fields)
            }
        }
    }
}

/// A typed property declared on a [`TypeDescriptor`].
///
/// Properties marked as keys form the type's primary index. A compound key
/// orders its components by `key_order` (declaration order breaks ties).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDef {
    /// The property name, unique within a type.
    pub name: String,
    /// The declared value kind.
    pub kind: ValueKind,
    /// Whether this property is part of the primary key.
    pub is_key: bool,
    /// Position within a compound key, starting at 1.
    pub key_order: Option<u32>,
}

impl PropertyDef {
    /// Create an integer property.
    #[must_use]
    pub fn int(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: ValueKind::Int, is_key: false, key_order: None }
    }

    /// Create a floating point property.
    #[must_use]
    pub fn float(name: impl Into<String>) -> Self {
        Self { name: name.into(), kind: ValueKind::Float, is_key: false, key_order: None }
    }

    /// Create a nested object property with the given shape.
    #[must_use]
    pub fn object(name: impl Into<String>, shape: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            kind: ValueKind::Object(Box::new(shape)),
            is_key: false,
            key_order: None,
        }
    }

    /// Mark this property as (part of) the primary key.
    #[must_use]
    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }

    /// Mark this property as part of a compound key at the given position.
    ///
    /// Positions start at 1 and must be gapless across the type's key
    /// properties.
    #[must_use]
    pub fn key_order(mut self, order: u32) -> Self {
        self.is_key = true;
        self.key_order = Some(order);
        self
    }
}
