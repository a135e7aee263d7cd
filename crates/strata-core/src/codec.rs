//! The event codec: conversion between raw field maps and typed events.
//!
//! Decoding consults the declared property list, not the input, so every
//! declared property receives a value: present fields are type-checked (and
//! widened where lossless), absent or null fields are backfilled with the
//! property kind's zero value. Encoding is the total, lossless inverse for
//! any decoded event.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strata_core::{codec, FieldMap, PropertyDef, TypeDescriptor, Value};
//!
//! let wave = Arc::new(
//!     TypeDescriptor::define(
//!         "Wave",
//!         vec![PropertyDef::int("Order").key(), PropertyDef::float("Sin")],
//!     )
//!     .unwrap(),
//! );
//!
//! // "Sin" is absent and decodes to its zero value
//! let mut fields = FieldMap::new();
//! fields.insert("Order".to_owned(), Value::Int(4));
//!
//! let event = codec::decode(&wave, &fields).unwrap();
//! assert_eq!(event.get("Sin"), Some(&Value::Float(0.0)));
//!
//! // Encoding restores a complete field map
//! let encoded = codec::encode(&event);
//! assert_eq!(encoded.get("Sin"), Some(&Value::Float(0.0)));
//! ```

use std::sync::Arc;

use crate::error::CoreError;
use crate::types::{Event, FieldMap, TypeDescriptor, Value, ValueKind};

/// Coerce a value against a declared kind.
///
/// `Int` values widen into `Float` properties; nothing narrows. Object
/// values are re-decoded against their declared shape, backfilling absent
/// nested fields.
///
/// # Errors
///
/// Returns [`CoreError::TypeMismatch`] if the value does not conform.
pub fn coerce_value(kind: &ValueKind, value: Value) -> Result<Value, CoreError> {
    match (kind, value) {
        (ValueKind::Int, Value::Int(i)) => Ok(Value::Int(i)),
        (ValueKind::Float, Value::Float(f)) => Ok(Value::Float(f)),
        (ValueKind::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
        (ValueKind::Object(shape), Value::Object(fields)) => {
            Ok(Value::Object(decode_fields(shape, &fields)?))
        }
        (kind, value) => {
            Err(CoreError::type_mismatch_with_value(kind.name(), value.kind_name(), &value))
        }
    }
}

fn decode_fields(shape: &TypeDescriptor, fields: &FieldMap) -> Result<FieldMap, CoreError> {
    let mut decoded = FieldMap::new();
    for property in shape.properties() {
        let value = match fields.get(&property.name) {
            None | Some(Value::Null) => property.kind.zero(),
            Some(value) => coerce_value(&property.kind, value.clone()).map_err(|err| {
                annotate_property(err, shape.id(), &property.name)
            })?,
        };
        decoded.insert(property.name.clone(), value);
    }
    Ok(decoded)
}

fn annotate_property(err: CoreError, type_id: &str, property: &str) -> CoreError {
    match err {
        CoreError::TypeMismatch { expected, actual, value } => CoreError::TypeMismatch {
            expected: format!("{expected} for '{type_id}.{property}'"),
            actual,
            value,
        },
        other => other,
    }
}

/// Decode a raw field map into a typed event.
///
/// Fields not declared on the type are ignored, matching the tolerance of
/// JSON writers that emit extra metadata.
///
/// # Errors
///
/// Returns [`CoreError::TypeMismatch`] if a present field does not conform
/// to its declared kind.
pub fn decode(descriptor: &Arc<TypeDescriptor>, fields: &FieldMap) -> Result<Event, CoreError> {
    let mut values = Vec::with_capacity(descriptor.properties().len());
    for property in descriptor.properties() {
        let value = match fields.get(&property.name) {
            None | Some(Value::Null) => property.kind.zero(),
            Some(value) => coerce_value(&property.kind, value.clone()).map_err(|err| {
                annotate_property(err, descriptor.id(), &property.name)
            })?,
        };
        values.push(value);
    }
    Event::from_values(descriptor, values)
}

/// Encode an event back into its raw field map.
///
/// Total and lossless for events produced by [`decode`]:
/// `decode(T, encode(decode(T, raw)))` equals `decode(T, raw)`.
#[must_use]
pub fn encode(event: &Event) -> FieldMap {
    let mut fields = FieldMap::new();
    for (property, value) in event.descriptor().properties().iter().zip(event.values()) {
        fields.insert(property.name.clone(), value.clone());
    }
    fields
}

/// Convert a JSON object into a raw field map.
///
/// Integral numbers become `Int`, other numbers `Float`, `null` stays
/// `Null` (and will backfill on decode), nested objects recurse.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if the value is not a JSON object or
/// contains a kind with no field-map representation (strings, booleans,
/// arrays).
pub fn from_json(json: &serde_json::Value) -> Result<FieldMap, CoreError> {
    let serde_json::Value::Object(entries) = json else {
        return Err(CoreError::Encoding("expected a JSON object".into()));
    };
    let mut fields = FieldMap::new();
    for (name, entry) in entries {
        fields.insert(name.clone(), json_value(entry)?);
    }
    Ok(fields)
}

fn json_value(json: &serde_json::Value) -> Result<Value, CoreError> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(CoreError::Encoding(format!("unrepresentable JSON number: {n}")))
            }
        }
        serde_json::Value::Object(_) => Ok(Value::Object(from_json(json)?)),
        other => {
            Err(CoreError::Encoding(format!("unsupported JSON value: {other}")))
        }
    }
}

/// Convert a raw field map into a JSON object.
///
/// Non-finite floats have no JSON representation and render as `null`.
#[must_use]
pub fn to_json(fields: &FieldMap) -> serde_json::Value {
    let mut entries = serde_json::Map::new();
    for (name, value) in fields {
        entries.insert(name.clone(), json_of(value));
    }
    serde_json::Value::Object(entries)
}

fn json_of(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Int(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::Object(fields) => to_json(fields),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::PropertyDef;

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

    fn fields(entries: &[(&str, Value)]) -> FieldMap {
        entries.iter().map(|(name, value)| ((*name).to_owned(), value.clone())).collect()
    }

    #[test]
    fn decode_backfills_missing_fields() {
        let descriptor = wave_descriptor();
        let event = decode(&descriptor, &fields(&[("Order", Value::Int(4))])).unwrap();

        assert_eq!(event.get("Order"), Some(&Value::Int(4)));
        assert_eq!(event.get("Radians"), Some(&Value::Float(0.0)));
        assert_eq!(event.get("Sin"), Some(&Value::Float(0.0)));
    }

    #[test]
    fn decode_treats_null_as_missing() {
        let descriptor = wave_descriptor();
        let event = decode(
            &descriptor,
            &fields(&[("Order", Value::Int(4)), ("Sin", Value::Null)]),
        )
        .unwrap();
        assert_eq!(event.get("Sin"), Some(&Value::Float(0.0)));
    }

    #[test]
    fn decode_ignores_undeclared_fields() {
        let descriptor = wave_descriptor();
        let event = decode(
            &descriptor,
            &fields(&[("Order", Value::Int(4)), ("Extra", Value::Float(9.9))]),
        )
        .unwrap();
        assert_eq!(event.get("Extra"), None);
    }

    #[test]
    fn decode_rejects_kind_mismatch() {
        let descriptor = wave_descriptor();
        let err =
            decode(&descriptor, &fields(&[("Order", Value::Float(1.5))])).unwrap_err();
        assert!(matches!(err, CoreError::TypeMismatch { .. }));
    }

    #[test]
    fn decode_widens_int_into_float() {
        let descriptor = wave_descriptor();
        let event = decode(
            &descriptor,
            &fields(&[("Order", Value::Int(4)), ("Sin", Value::Int(1))]),
        )
        .unwrap();
        assert_eq!(event.get("Sin"), Some(&Value::Float(1.0)));
    }

    #[test]
    fn decode_encode_is_idempotent() {
        let descriptor = wave_descriptor();
        let raw = fields(&[("Order", Value::Int(4)), ("Radians", Value::Float(0.39))]);

        let once = decode(&descriptor, &raw).unwrap();
        let again = decode(&descriptor, &encode(&once)).unwrap();
        assert_eq!(once, again);
    }

    #[test]
    fn decode_nested_object_backfills() {
        let shape = TypeDescriptor::shape(
            "Extent",
            vec![PropertyDef::float("Min"), PropertyDef::float("Max")],
        )
        .unwrap();
        let descriptor = Arc::new(
            TypeDescriptor::define(
                "Reading",
                vec![PropertyDef::int("Order").key(), PropertyDef::object("Extent", shape)],
            )
            .unwrap(),
        );

        let nested = fields(&[("Min", Value::Float(1.0))]);
        let event = decode(
            &descriptor,
            &fields(&[("Order", Value::Int(0)), ("Extent", Value::Object(nested))]),
        )
        .unwrap();

        let extent = event.get("Extent").and_then(Value::as_object).unwrap();
        assert_eq!(extent.get("Min"), Some(&Value::Float(1.0)));
        assert_eq!(extent.get("Max"), Some(&Value::Float(0.0)));
    }

    #[test]
    fn json_bridge_roundtrip() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"Order": 4, "Radians": 0.39, "Sin": null}"#).unwrap();
        let raw = from_json(&json).unwrap();
        assert_eq!(raw.get("Order"), Some(&Value::Int(4)));
        assert_eq!(raw.get("Radians"), Some(&Value::Float(0.39)));
        assert_eq!(raw.get("Sin"), Some(&Value::Null));

        let back = to_json(&raw);
        assert_eq!(back.get("Order"), Some(&serde_json::Value::from(4)));
        assert_eq!(back.get("Sin"), Some(&serde_json::Value::Null));
    }

    #[test]
    fn json_rejects_unsupported_kinds() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"Order": "four"}"#).unwrap();
        assert!(from_json(&json).is_err());
    }
}
