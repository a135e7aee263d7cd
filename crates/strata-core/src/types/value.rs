//! Property values carried by events.
//!
//! This module provides the [`Value`] enum, which represents all value types
//! that a sequential-data event property can hold, and [`FieldMap`], the
//! generic name-to-value representation used as the codec's wire shape.
//!
//! # Example
//!
//! ```
//! use strata_core::Value;
//!
//! // Create values via From trait
//! let order: Value = 12i64.into();
//! let radians: Value = 1.178f64.into();
//!
//! // Access typed values
//! assert_eq!(order.as_int(), Some(12));
//! assert_eq!(radians.as_float(), Some(1.178));
//!
//! // Null marks an absent raw field; it never survives decoding
//! assert!(Value::Null.is_null());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A generic structured representation of an event: property name to value.
///
/// This is the shape raw input arrives in and the shape `encode` produces.
/// A `BTreeMap` keeps the representation deterministic regardless of the
/// order fields were supplied in.
pub type FieldMap = BTreeMap<String, Value>;

/// A value stored on an event property.
///
/// # Supported Types
///
/// | Variant | Rust Type | Use Case |
/// |---------|-----------|----------|
/// | `Null` | - | Absent raw fields (input only) |
/// | `Int` | `i64` | Integer measurements, ordinal keys |
/// | `Float` | `f64` | Continuous measurements |
/// | `Object` | `FieldMap` | Nested structured values |
///
/// A materialized [`Event`](crate::Event) never holds `Null`: the codec
/// backfills absent fields with the property kind's zero value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Absent/missing value in raw input.
    Null,
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit floating point number.
    Float(f64),
    /// Nested structured value.
    Object(FieldMap),
}

impl Value {
    /// Returns `true` if the value is null.
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the value as an integer if it is one.
    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float if it is one.
    #[inline]
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a nested field map if it is one.
    #[inline]
    #[must_use]
    pub const fn as_object(&self) -> Option<&FieldMap> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Returns the value as `f64` if it is numeric (`Int` or `Float`).
    ///
    /// Used by interpolation and filtering, where integers participate in
    /// the same arithmetic as floats.
    #[inline]
    #[must_use]
    pub const fn as_numeric(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// A short name for the value's runtime kind, for error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Object(_) => "object",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, ""),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(fl) => write!(f, "{fl}"),
            Self::Object(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<FieldMap> for Value {
    #[inline]
    fn from(fields: FieldMap) -> Self {
        Self::Object(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_type_checks() {
        assert!(Value::Null.is_null());
        assert!(!Value::Int(0).is_null());
    }

    #[test]
    fn value_conversions() {
        assert_eq!(Value::from(42i64).as_int(), Some(42));
        assert_eq!(Value::from(7i32).as_int(), Some(7));
        assert_eq!(Value::from(2.5f64).as_float(), Some(2.5));
    }

    #[test]
    fn numeric_access() {
        assert_eq!(Value::Int(3).as_numeric(), Some(3.0));
        assert_eq!(Value::Float(1.5).as_numeric(), Some(1.5));
        assert_eq!(Value::Null.as_numeric(), None);
        assert_eq!(Value::Object(FieldMap::new()).as_numeric(), None);
    }

    #[test]
    fn display_forms() {
        assert_eq!(Value::Int(-4).to_string(), "-4");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");

        let mut fields = FieldMap::new();
        fields.insert("X".to_owned(), Value::Int(1));
        fields.insert("Y".to_owned(), Value::Float(2.0));
        assert_eq!(Value::Object(fields).to_string(), "{X: 1, Y: 2}");
    }

    #[test]
    fn kind_names() {
        assert_eq!(Value::Null.kind_name(), "null");
        assert_eq!(Value::Int(0).kind_name(), "int");
        assert_eq!(Value::Float(0.0).kind_name(), "float");
        assert_eq!(Value::Object(FieldMap::new()).kind_name(), "object");
    }
}
