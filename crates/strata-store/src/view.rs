//! Stream views: read-time projections from one event type to another.
//!
//! A view pairs source properties with target properties, either
//! implicitly (identical name and kind, with a positional fallback when
//! the two types are same-shaped but differently named) or explicitly
//! (declared source→target pairs, which may also convert between numeric
//! kinds). Unmapped target properties read as zero values; unmapped source
//! properties still appear in the view map so the mapping enumeration is
//! complete.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use strata_core::{CoreError, Event, TypeDescriptor, Value, ValueKind};

/// An explicit source→target property pair in a view definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewProperty {
    /// The source property name.
    pub source: String,
    /// The target property name.
    pub target: String,
}

impl ViewProperty {
    /// Create a property pair.
    #[must_use]
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self { source: source.into(), target: target.into() }
    }
}

/// One row of a view's complete property enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewMapEntry {
    /// The source property name.
    pub source: String,
    /// The mapped target property name, or `None` when unmapped.
    pub target: Option<String>,
}

/// A derived mapping from a source event type to a target event type.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamView {
    id: String,
    source: Arc<TypeDescriptor>,
    target: Arc<TypeDescriptor>,
    /// Source property index → target property index.
    pairs: Vec<(usize, usize)>,
}

impl StreamView {
    /// Derive a view between two types.
    ///
    /// Without explicit pairs, properties map by identical name and kind;
    /// if no names match at all and the two types declare the same kind
    /// sequence, properties map positionally instead. Explicit pairs may
    /// additionally convert between numeric kinds (`Float` sources
    /// truncate toward zero into `Int` targets).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if an explicit pair names an
    /// unknown property, repeats a property, or pairs inconvertible kinds.
    pub fn derive(
        id: impl Into<String>,
        source: &Arc<TypeDescriptor>,
        target: &Arc<TypeDescriptor>,
        explicit: Option<&[ViewProperty]>,
    ) -> Result<Self, CoreError> {
        let id = id.into();
        let pairs = match explicit {
            Some(properties) => explicit_pairs(&id, source, target, properties)?,
            None => implicit_pairs(source, target),
        };
        Ok(Self { id, source: Arc::clone(source), target: Arc::clone(target), pairs })
    }

    /// The view id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The source type.
    #[inline]
    #[must_use]
    pub fn source(&self) -> &Arc<TypeDescriptor> {
        &self.source
    }

    /// The target type.
    #[inline]
    #[must_use]
    pub fn target(&self) -> &Arc<TypeDescriptor> {
        &self.target
    }

    /// Project a source event into the target shape.
    ///
    /// Total for any well-formed mapping: mapped properties convert,
    /// unmapped target properties read as zero values.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::TypeMismatch`] if the event is not of the
    /// view's source type.
    pub fn apply(&self, event: &Event) -> Result<Event, CoreError> {
        if **event.descriptor() != *self.source {
            return Err(CoreError::type_mismatch(
                self.source.id(),
                event.descriptor().id(),
            ));
        }
        let mut values: Vec<Value> =
            self.target.properties().iter().map(|p| p.kind.zero()).collect();
        for &(source_index, target_index) in &self.pairs {
            values[target_index] = convert(
                &event.values()[source_index],
                &self.target.properties()[target_index].kind,
            );
        }
        Event::from_values(&self.target, values)
    }

    /// The complete property enumeration, in source declaration order.
    ///
    /// Every source property appears exactly once, mapped or not.
    #[must_use]
    pub fn view_map(&self) -> Vec<ViewMapEntry> {
        self.source
            .properties()
            .iter()
            .enumerate()
            .map(|(source_index, property)| ViewMapEntry {
                source: property.name.clone(),
                target: self
                    .pairs
                    .iter()
                    .find(|(s, _)| *s == source_index)
                    .map(|&(_, t)| self.target.properties()[t].name.clone()),
            })
            .collect()
    }

    /// The target property a source property maps onto, if any.
    #[must_use]
    pub fn target_of(&self, source_property: &str) -> Option<&str> {
        let (source_index, _) = self.source.property(source_property)?;
        self.pairs
            .iter()
            .find(|(s, _)| *s == source_index)
            .map(|&(_, t)| self.target.properties()[t].name.as_str())
    }

    /// Whether the view carries the source's primary key onto the
    /// target's primary key without conversion.
    ///
    /// Required before a stream can be retyped through the view: a lossy
    /// or partial key mapping would reorder the stream.
    #[must_use]
    pub fn maps_primary_key(&self) -> bool {
        let mut mapped_targets = Vec::new();
        for &source_index in self.source.key_indices() {
            let Some(&(_, target_index)) =
                self.pairs.iter().find(|(s, _)| *s == source_index)
            else {
                return false;
            };
            if self.source.properties()[source_index].kind
                != self.target.properties()[target_index].kind
            {
                return false;
            }
            mapped_targets.push(target_index);
        }
        let mut expected = self.target.key_indices().to_vec();
        expected.sort_unstable();
        mapped_targets.sort_unstable();
        mapped_targets == expected
    }
}

/// Pair properties by identical name and kind; fall back to positional
/// pairing when nothing matches by name but the kind sequences align.
fn implicit_pairs(
    source: &TypeDescriptor,
    target: &TypeDescriptor,
) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (source_index, source_property) in source.properties().iter().enumerate() {
        if let Some((target_index, target_property)) = target.property(&source_property.name) {
            if source_property.kind == target_property.kind {
                pairs.push((source_index, target_index));
            }
        }
    }
    if pairs.is_empty()
        && source.properties().len() == target.properties().len()
        && source
            .properties()
            .iter()
            .zip(target.properties())
            .all(|(s, t)| s.kind == t.kind)
    {
        pairs = (0..source.properties().len()).map(|i| (i, i)).collect();
    }
    pairs
}

fn explicit_pairs(
    id: &str,
    source: &TypeDescriptor,
    target: &TypeDescriptor,
    properties: &[ViewProperty],
) -> Result<Vec<(usize, usize)>, CoreError> {
    let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(properties.len());
    for pair in properties {
        let (source_index, source_property) =
            source.property(&pair.source).ok_or_else(|| {
                CoreError::validation(format!(
                    "view '{id}': source type '{}' has no property '{}'",
                    source.id(),
                    pair.source
                ))
            })?;
        let (target_index, target_property) =
            target.property(&pair.target).ok_or_else(|| {
                CoreError::validation(format!(
                    "view '{id}': target type '{}' has no property '{}'",
                    target.id(),
                    pair.target
                ))
            })?;
        if !convertible(&source_property.kind, &target_property.kind) {
            return Err(CoreError::validation(format!(
                "view '{id}': cannot map {} property '{}' to {} property '{}'",
                source_property.kind.name(),
                pair.source,
                target_property.kind.name(),
                pair.target
            )));
        }
        if pairs.iter().any(|&(s, _)| s == source_index) {
            return Err(CoreError::validation(format!(
                "view '{id}': source property '{}' mapped twice",
                pair.source
            )));
        }
        if pairs.iter().any(|&(_, t)| t == target_index) {
            return Err(CoreError::validation(format!(
                "view '{id}': target property '{}' mapped twice",
                pair.target
            )));
        }
        pairs.push((source_index, target_index));
    }
    Ok(pairs)
}

fn convertible(source: &ValueKind, target: &ValueKind) -> bool {
    matches!(
        (source, target),
        (ValueKind::Int | ValueKind::Float, ValueKind::Int | ValueKind::Float)
    ) || matches!((source, target), (ValueKind::Object(_), ValueKind::Object(_)))
}

fn convert(value: &Value, target: &ValueKind) -> Value {
    match (value, target) {
        (Value::Float(f), ValueKind::Int) => Value::Int(f.trunc() as i64),
        (Value::Int(i), ValueKind::Float) => Value::Float(*i as f64),
        _ => value.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strata_core::PropertyDef;

    fn wave_type() -> Arc<TypeDescriptor> {
        Arc::new(
            TypeDescriptor::define(
                "Wave",
                vec![
                    PropertyDef::int("Order").key(),
                    PropertyDef::float("Sin"),
                    PropertyDef::float("Cos"),
                ],
            )
            .unwrap(),
        )
    }

    fn wave_event(order: i64, sin: f64, cos: f64) -> Event {
        Event::from_values(
            &wave_type(),
            vec![Value::Int(order), Value::Float(sin), Value::Float(cos)],
        )
        .unwrap()
    }

    #[test]
    fn implicit_mapping_by_name() {
        let source = wave_type();
        // Same property names, reordered declaration
        let target = Arc::new(
            TypeDescriptor::define(
                "WaveCopy",
                vec![
                    PropertyDef::float("Cos"),
                    PropertyDef::int("Order").key(),
                    PropertyDef::float("Sin"),
                ],
            )
            .unwrap(),
        );

        let view = StreamView::derive("v", &source, &target, None).unwrap();
        let mapped = view.apply(&wave_event(4, 0.5, -0.5)).unwrap();
        assert_eq!(mapped.get("Order"), Some(&Value::Int(4)));
        assert_eq!(mapped.get("Sin"), Some(&Value::Float(0.5)));
        assert_eq!(mapped.get("Cos"), Some(&Value::Float(-0.5)));
    }

    #[test]
    fn implicit_mapping_falls_back_to_position() {
        let source = wave_type();
        // Identical shape, entirely different names
        let target = Arc::new(
            TypeDescriptor::define(
                "WaveTarget",
                vec![
                    PropertyDef::int("OrderTarget").key(),
                    PropertyDef::float("SinTarget"),
                    PropertyDef::float("CosTarget"),
                ],
            )
            .unwrap(),
        );

        let view = StreamView::derive("v", &source, &target, None).unwrap();
        let mapped = view.apply(&wave_event(4, 0.5, -0.5)).unwrap();
        assert_eq!(mapped.get("OrderTarget"), Some(&Value::Int(4)));
        assert_eq!(mapped.get("SinTarget"), Some(&Value::Float(0.5)));
        assert_eq!(mapped.get("CosTarget"), Some(&Value::Float(-0.5)));
        assert!(view.maps_primary_key());
    }

    #[test]
    fn unmatched_target_properties_read_zero() {
        let source = wave_type();
        let target = Arc::new(
            TypeDescriptor::define(
                "Wider",
                vec![
                    PropertyDef::int("Order").key(),
                    PropertyDef::float("Sin"),
                    PropertyDef::float("Tan"), // no source counterpart
                ],
            )
            .unwrap(),
        );

        let view = StreamView::derive("v", &source, &target, None).unwrap();
        let mapped = view.apply(&wave_event(4, 0.5, -0.5)).unwrap();
        assert_eq!(mapped.get("Tan"), Some(&Value::Float(0.0)));
    }

    #[test]
    fn explicit_mapping_truncates_toward_zero() {
        let source = wave_type();
        let target = Arc::new(
            TypeDescriptor::define(
                "WaveInt",
                vec![PropertyDef::int("OrderTarget").key(), PropertyDef::int("SinInt")],
            )
            .unwrap(),
        );
        let view = StreamView::derive(
            "v",
            &source,
            &target,
            Some(&[ViewProperty::new("Order", "OrderTarget"), ViewProperty::new("Sin", "SinInt")]),
        )
        .unwrap();

        let mapped = view.apply(&wave_event(4, 2.9, 0.0)).unwrap();
        assert_eq!(mapped.get("SinInt"), Some(&Value::Int(2)));

        let mapped = view.apply(&wave_event(4, -2.9, 0.0)).unwrap();
        assert_eq!(mapped.get("SinInt"), Some(&Value::Int(-2)));
    }

    #[test]
    fn explicit_mapping_validates_names_and_duplicates() {
        let source = wave_type();
        let target = wave_type();

        let err = StreamView::derive(
            "v",
            &source,
            &target,
            Some(&[ViewProperty::new("Missing", "Order")]),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        let err = StreamView::derive(
            "v",
            &source,
            &target,
            Some(&[ViewProperty::new("Sin", "Sin"), ViewProperty::new("Cos", "Sin")]),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn view_map_covers_every_source_property() {
        let source = wave_type();
        let target = Arc::new(
            TypeDescriptor::define(
                "WaveInt",
                vec![PropertyDef::int("OrderTarget").key(), PropertyDef::int("SinInt")],
            )
            .unwrap(),
        );
        let view = StreamView::derive(
            "v",
            &source,
            &target,
            Some(&[ViewProperty::new("Order", "OrderTarget"), ViewProperty::new("Sin", "SinInt")]),
        )
        .unwrap();

        let map = view.view_map();
        assert_eq!(map.len(), source.properties().len());
        assert_eq!(map[0].target.as_deref(), Some("OrderTarget"));
        assert_eq!(map[1].target.as_deref(), Some("SinInt"));
        assert_eq!(map[2].target, None); // Cos is unmapped but still listed
    }

    #[test]
    fn apply_rejects_foreign_events() {
        let source = wave_type();
        let other = Arc::new(
            TypeDescriptor::define("Other", vec![PropertyDef::int("Key").key()]).unwrap(),
        );
        let view = StreamView::derive("v", &source, &source, None).unwrap();
        let event = Event::from_values(&other, vec![Value::Int(0)]).unwrap();
        assert!(matches!(view.apply(&event), Err(CoreError::TypeMismatch { .. })));
    }

    #[test]
    fn key_mapping_check() {
        let source = wave_type();
        // Sin (float) cannot carry the int key
        let target = Arc::new(
            TypeDescriptor::define(
                "Bad",
                vec![PropertyDef::float("SinTarget").key(), PropertyDef::int("OrderPlain")],
            )
            .unwrap(),
        );
        let view = StreamView::derive(
            "v",
            &source,
            &target,
            Some(&[ViewProperty::new("Order", "OrderPlain"), ViewProperty::new("Sin", "SinTarget")]),
        )
        .unwrap();
        assert!(!view.maps_primary_key());
    }
}
