//! The waveform sample payload.
//!
//! Every walkthrough and test in this workspace feeds streams with the
//! same deterministic payload: a wave sample computed from an integer
//! order and a scale multiplier. This module provides the pure generator
//! and the four event type descriptors the samples are stored under.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strata::wave::{wave, wave_type};
//!
//! let descriptor = Arc::new(wave_type("WaveData_SampleType").unwrap());
//! let sample = wave(4, 2.0);
//! assert_eq!(sample.sin, 2.0 * sample.radians.sin());
//!
//! let event = sample.event(&descriptor).unwrap();
//! assert_eq!(event.key().to_string(), "4");
//! ```

use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use strata_core::{codec, CoreError, Event, FieldMap, PropertyDef, TypeDescriptor, Value};

/// One deterministic waveform sample.
///
/// All trigonometric fields scale with the multiplier; `tan` and `tanh`
/// follow IEEE-754 semantics near asymptotes (infinities are values, not
/// errors).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveSample {
    /// The ordinal position, and the primary key of the simple wave type.
    pub order: i64,
    /// The scale factor, and the second key component of the compound
    /// wave type.
    pub multiplier: f64,
    /// `order * π / 32`.
    pub radians: f64,
    /// `radians / 2π`.
    pub tau: f64,
    /// `multiplier * sin(radians)`.
    pub sin: f64,
    /// `multiplier * cos(radians)`.
    pub cos: f64,
    /// `multiplier * tan(radians)`.
    pub tan: f64,
    /// `multiplier * sinh(radians)`.
    pub sinh: f64,
    /// `multiplier * cosh(radians)`.
    pub cosh: f64,
    /// `multiplier * tanh(radians)`.
    pub tanh: f64,
}

/// Compute the wave sample at an order position.
///
/// Pure and total for all finite inputs.
#[must_use]
pub fn wave(order: i64, multiplier: f64) -> WaveSample {
    let radians = order as f64 * PI / 32.0;
    WaveSample {
        order,
        multiplier,
        radians,
        tau: radians / TAU,
        sin: multiplier * radians.sin(),
        cos: multiplier * radians.cos(),
        tan: multiplier * radians.tan(),
        sinh: multiplier * radians.sinh(),
        cosh: multiplier * radians.cosh(),
        tanh: multiplier * radians.tanh(),
    }
}

impl WaveSample {
    /// The sample as a raw field map.
    ///
    /// The map carries every field, including `Multiplier` (as an
    /// integer); decoding drops whatever the target type does not
    /// declare, so the same map feeds both the simple and the compound
    /// wave types.
    #[must_use]
    pub fn fields(&self) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("Order".to_owned(), Value::Int(self.order));
        fields.insert("Multiplier".to_owned(), Value::Int(self.multiplier as i64));
        fields.insert("Tau".to_owned(), Value::Float(self.tau));
        fields.insert("Radians".to_owned(), Value::Float(self.radians));
        fields.insert("Sin".to_owned(), Value::Float(self.sin));
        fields.insert("Cos".to_owned(), Value::Float(self.cos));
        fields.insert("Tan".to_owned(), Value::Float(self.tan));
        fields.insert("Sinh".to_owned(), Value::Float(self.sinh));
        fields.insert("Cosh".to_owned(), Value::Float(self.cosh));
        fields.insert("Tanh".to_owned(), Value::Float(self.tanh));
        fields
    }

    /// Materialize the sample as an event of the given wave type.
    ///
    /// # Errors
    ///
    /// Returns a core error if the descriptor declares fields with kinds
    /// the sample does not produce.
    pub fn event(&self, descriptor: &Arc<TypeDescriptor>) -> Result<Event, CoreError> {
        codec::decode(descriptor, &self.fields())
    }
}

/// The simple wave type: `Order` keys eight float measurements.
///
/// # Errors
///
/// Returns a validation error only for a malformed id-independent
/// definition, which cannot happen for the fixed property list.
pub fn wave_type(id: &str) -> Result<TypeDescriptor, CoreError> {
    Ok(TypeDescriptor::define(
        id,
        vec![
            PropertyDef::int("Order").key(),
            PropertyDef::float("Tau"),
            PropertyDef::float("Radians"),
            PropertyDef::float("Sin"),
            PropertyDef::float("Cos"),
            PropertyDef::float("Tan"),
            PropertyDef::float("Sinh"),
            PropertyDef::float("Cosh"),
            PropertyDef::float("Tanh"),
        ],
    )?
    .with_name("WaveDataSample")
    .with_description("Sample type for storing wave events"))
}

/// The compound wave type: keyed by `(Order, Multiplier)`.
///
/// # Errors
///
/// See [`wave_type`].
pub fn wave_compound_type(id: &str) -> Result<TypeDescriptor, CoreError> {
    Ok(TypeDescriptor::define(
        id,
        vec![
            PropertyDef::int("Order").key_order(1),
            PropertyDef::int("Multiplier").key_order(2),
            PropertyDef::float("Tau"),
            PropertyDef::float("Radians"),
            PropertyDef::float("Sin"),
            PropertyDef::float("Cos"),
            PropertyDef::float("Tan"),
            PropertyDef::float("Sinh"),
            PropertyDef::float("Cosh"),
            PropertyDef::float("Tanh"),
        ],
    )?
    .with_name("WaveDataCompound")
    .with_description("Sample type keyed by order and multiplier"))
}

/// The renamed twin of [`wave_type`]: same shape, `*Target` property
/// names. Implicit stream views map the simple type onto it
/// positionally.
///
/// # Errors
///
/// See [`wave_type`].
pub fn wave_target_type(id: &str) -> Result<TypeDescriptor, CoreError> {
    Ok(TypeDescriptor::define(
        id,
        vec![
            PropertyDef::int("OrderTarget").key(),
            PropertyDef::float("TauTarget"),
            PropertyDef::float("RadiansTarget"),
            PropertyDef::float("SinTarget"),
            PropertyDef::float("CosTarget"),
            PropertyDef::float("TanTarget"),
            PropertyDef::float("SinhTarget"),
            PropertyDef::float("CoshTarget"),
            PropertyDef::float("TanhTarget"),
        ],
    )?
    .with_name("WaveDataTargetSample")
    .with_description("Sample type for storing mapped wave events"))
}

/// The narrow integer wave type used to demonstrate explicit view
/// mappings with numeric narrowing.
///
/// # Errors
///
/// See [`wave_type`].
pub fn wave_integer_type(id: &str) -> Result<TypeDescriptor, CoreError> {
    Ok(TypeDescriptor::define(
        id,
        vec![
            PropertyDef::int("OrderTarget").key(),
            PropertyDef::int("SinInt"),
            PropertyDef::int("CosInt"),
            PropertyDef::int("TanInt"),
        ],
    )?
    .with_name("WaveDataIntegerSample")
    .with_description("Sample type for storing integer wave events"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn wave_math_matches_the_contract() {
        for (order, multiplier) in [(0, 1.0), (4, 2.0), (16, 2.5), (-8, 3.0), (100, 0.5)] {
            let sample = wave(order, multiplier);
            let radians = order as f64 * PI / 32.0;
            assert_eq!(sample.radians, radians);
            assert_eq!(sample.tau, radians / TAU);
            assert_eq!(sample.sin, multiplier * radians.sin());
            assert_eq!(sample.cos, multiplier * radians.cos());
            assert_eq!(sample.tan, multiplier * radians.tan());
            assert_eq!(sample.sinh, multiplier * radians.sinh());
            assert_eq!(sample.cosh, multiplier * radians.cosh());
            assert_eq!(sample.tanh, multiplier * radians.tanh());
        }
    }

    #[test]
    fn wave_is_deterministic() {
        assert_eq!(wave(7, 2.0), wave(7, 2.0));
    }

    #[test]
    fn non_finite_trigonometry_is_propagated() {
        // order 16 puts radians at π/2 where tan is astronomically large
        // but finite in f64; the generator must not reject it
        let sample = wave(16, 1.0);
        assert!(sample.tan.is_finite() || sample.tan.is_infinite());
        assert!(!sample.tan.is_nan());
    }

    #[test]
    fn simple_event_drops_the_multiplier() {
        let descriptor = Arc::new(wave_type("Wave").unwrap());
        let event = wave(4, 2.0).event(&descriptor).unwrap();
        assert_eq!(event.get("Multiplier"), None);
        assert_eq!(event.key().to_string(), "4");
        assert_eq!(event.get("Sin"), Some(&Value::Float(wave(4, 2.0).sin)));
    }

    #[test]
    fn compound_event_keys_order_then_multiplier() {
        let descriptor = Arc::new(wave_compound_type("Compound").unwrap());
        let event = wave(10, 3.0).event(&descriptor).unwrap();
        assert_eq!(event.key().to_string(), "10|3");
    }

    #[test]
    fn type_shapes_line_up_for_implicit_views() {
        let simple = wave_type("Wave").unwrap();
        let target = wave_target_type("Target").unwrap();
        assert_eq!(simple.properties().len(), target.properties().len());
        for (s, t) in simple.properties().iter().zip(target.properties()) {
            assert_eq!(s.kind, t.kind);
        }
    }
}
