//! Keyed event streams and the windowed read evaluator.
//!
//! A [`Stream`] keeps events of one type in an ordered map keyed by the
//! order-preserving byte encoding of their primary key, so every read
//! (first/last, windows, directional ranges, interpolated ranges,
//! sampling) is a byte-range walk. Secondary indexes maintain an alternate ordering
//! by a non-key property, and per-property overrides switch interpolation
//! from continuous to discrete at calculated read positions.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use strata_core::encoding::sortable::encode_sortable;
use strata_core::{CoreError, Event, Key, TypeDescriptor, Value, ValueKind};

use crate::error::StoreError;
use crate::filter::FilterExpr;
use crate::interpolate;
use crate::view::StreamView;

/// How a property behaves at a calculated (non-exact) read position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationMode {
    /// Linear interpolation between the two nearest stored events.
    #[default]
    Continuous,
    /// No calculation: the property reads as its kind's zero value.
    Discrete,
}

/// A per-property interpolation override on a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyOverride {
    /// The property the override applies to.
    pub property: String,
    /// The interpolation mode for that property.
    pub mode: InterpolationMode,
}

impl PropertyOverride {
    /// Create an override with an explicit mode.
    #[must_use]
    pub fn new(property: impl Into<String>, mode: InterpolationMode) -> Self {
        Self { property: property.into(), mode }
    }

    /// Create a discrete override, the common case.
    #[must_use]
    pub fn discrete(property: impl Into<String>) -> Self {
        Self::new(property, InterpolationMode::Discrete)
    }
}

/// Policy for a range read whose start position has no stored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Begin at the nearest stored event in the walk direction.
    Exact,
    /// Synthesize an event at the start position by interpolation.
    ExactOrCalculated,
}

/// Walk direction for range reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending key order from the start position.
    Forward,
    /// Descending key order from the start position.
    Backward,
}

/// An alternate ordering of a stream by a non-key scalar property.
///
/// Entries are keyed by the indexed value's sortable encoding followed by
/// the primary key bytes, so equal values stay ordered by primary key.
#[derive(Debug, Clone)]
struct SecondaryIndex {
    property: String,
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

/// An ordered collection of events of one type.
#[derive(Debug, Clone)]
pub struct Stream {
    id: String,
    name: Option<String>,
    description: Option<String>,
    descriptor: Arc<TypeDescriptor>,
    events: BTreeMap<Vec<u8>, Event>,
    indexes: Vec<SecondaryIndex>,
    overrides: Vec<PropertyOverride>,
}

impl Stream {
    /// Create an empty stream of the given type.
    #[must_use]
    pub fn new(id: impl Into<String>, descriptor: Arc<TypeDescriptor>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            descriptor,
            events: BTreeMap::new(),
            indexes: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// The stream id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The stream's event type.
    #[inline]
    #[must_use]
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// The human-readable name, if any.
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the human-readable name.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// The description, if any.
    #[inline]
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Set the description.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Number of stored events.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the stream holds no events.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Properties carrying a secondary index, in index order.
    #[must_use]
    pub fn index_properties(&self) -> Vec<&str> {
        self.indexes.iter().map(|index| index.property.as_str()).collect()
    }

    /// The configured property overrides.
    #[inline]
    #[must_use]
    pub fn overrides(&self) -> &[PropertyOverride] {
        &self.overrides
    }

    /// The interpolation mode in effect for a property.
    #[must_use]
    pub fn mode_of(&self, property: &str) -> InterpolationMode {
        self.overrides
            .iter()
            .find(|o| o.property == property)
            .map_or(InterpolationMode::Continuous, |o| o.mode)
    }

    /// Replace the stream's secondary indexes, rebuilding entries from the
    /// stored events.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if a property does not exist, is
    /// not scalar, is part of the primary key, or appears twice.
    pub fn set_indexes(&mut self, properties: Vec<String>) -> Result<(), StoreError> {
        let mut indexes: Vec<SecondaryIndex> = Vec::with_capacity(properties.len());
        for property in properties {
            let (index, definition) =
                self.descriptor.property(&property).ok_or_else(|| {
                    CoreError::validation(format!(
                        "stream '{}': no property '{property}' to index",
                        self.id
                    ))
                })?;
            if self.descriptor.key_indices().contains(&index) {
                return Err(CoreError::validation(format!(
                    "stream '{}': '{property}' is already part of the primary index",
                    self.id
                ))
                .into());
            }
            if !definition.kind.is_scalar() {
                return Err(CoreError::validation(format!(
                    "stream '{}': cannot index {} property '{property}'",
                    self.id,
                    definition.kind.name()
                ))
                .into());
            }
            if indexes.iter().any(|i| i.property == property) {
                return Err(CoreError::validation(format!(
                    "stream '{}': duplicate index on '{property}'",
                    self.id
                ))
                .into());
            }
            indexes.push(SecondaryIndex { property, entries: BTreeMap::new() });
        }

        for (key_bytes, event) in &self.events {
            for index in &mut indexes {
                if let Some(value) = event.get(&index.property) {
                    let mut entry = encode_sortable(value)?;
                    entry.extend_from_slice(key_bytes);
                    index.entries.insert(entry, key_bytes.clone());
                }
            }
        }

        self.indexes = indexes;
        Ok(())
    }

    /// Replace the stream's property overrides.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] if an override names a property
    /// the stream's type does not declare.
    pub fn set_overrides(&mut self, overrides: Vec<PropertyOverride>) -> Result<(), StoreError> {
        for o in &overrides {
            if self.descriptor.property(&o.property).is_none() {
                return Err(CoreError::validation(format!(
                    "stream '{}': no property '{}' to override",
                    self.id, o.property
                ))
                .into());
            }
        }
        self.overrides = overrides;
        Ok(())
    }

    /// Insert a batch of events; every key must be new.
    ///
    /// The batch is validated in full before anything is applied, so a
    /// failed insert leaves the stream untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Duplicate`] if any key is already stored (or
    /// repeated within the batch), or a core error for events of the wrong
    /// type.
    pub fn insert_all(&mut self, events: Vec<Event>) -> Result<(), StoreError> {
        let mut seen: BTreeSet<Vec<u8>> = BTreeSet::new();
        let mut pending = Vec::with_capacity(events.len());
        for event in events {
            self.check_type(&event)?;
            let bytes = event.key_bytes()?;
            if self.events.contains_key(&bytes) || !seen.insert(bytes.clone()) {
                return Err(StoreError::duplicate(format!(
                    "stream '{}' already has an event at key {}",
                    self.id,
                    event.key()
                )));
            }
            pending.push((bytes, event));
        }
        for (bytes, event) in pending {
            self.index_insert(&bytes, &event)?;
            self.events.insert(bytes, event);
        }
        Ok(())
    }

    /// Insert or overwrite a batch of events.
    ///
    /// # Errors
    ///
    /// Returns a core error for events of the wrong type; the batch is
    /// validated in full before anything is applied.
    pub fn update_all(&mut self, events: Vec<Event>) -> Result<(), StoreError> {
        let mut pending = Vec::with_capacity(events.len());
        for event in events {
            self.check_type(&event)?;
            let bytes = event.key_bytes()?;
            pending.push((bytes, event));
        }
        for (bytes, event) in pending {
            if let Some(previous) = self.events.remove(&bytes) {
                self.index_remove(&bytes, &previous)?;
            }
            self.index_insert(&bytes, &event)?;
            self.events.insert(bytes, event);
        }
        Ok(())
    }

    /// Overwrite a batch of events; every key must already be stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if any key has no stored event; the
    /// batch is validated in full before anything is applied.
    pub fn replace_all(&mut self, events: Vec<Event>) -> Result<(), StoreError> {
        let mut pending = Vec::with_capacity(events.len());
        for event in events {
            self.check_type(&event)?;
            let bytes = event.key_bytes()?;
            if !self.events.contains_key(&bytes) {
                return Err(StoreError::not_found(format!(
                    "stream '{}' has no event at key {} to replace",
                    self.id,
                    event.key()
                )));
            }
            pending.push((bytes, event));
        }
        for (bytes, event) in pending {
            if let Some(previous) = self.events.remove(&bytes) {
                self.index_remove(&bytes, &previous)?;
            }
            self.index_insert(&bytes, &event)?;
            self.events.insert(bytes, event);
        }
        Ok(())
    }

    /// Remove the event at a key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no event is stored at the key.
    pub fn remove(&mut self, key: &Key) -> Result<(), StoreError> {
        let key = key.conform(&self.descriptor)?;
        let bytes = key.encode()?;
        match self.events.remove(&bytes) {
            Some(event) => {
                self.index_remove(&bytes, &event)?;
                Ok(())
            }
            None => Err(StoreError::not_found(format!(
                "stream '{}' has no event at key {key}",
                self.id
            ))),
        }
    }

    /// Remove every event with a key in `[start, end]`.
    ///
    /// Returns the number of events removed; an empty window is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns a core error if the keys do not conform to the stream's key
    /// shape.
    pub fn remove_window(&mut self, start: &Key, end: &Key) -> Result<usize, StoreError> {
        let start_bytes = start.conform(&self.descriptor)?.encode()?;
        let end_bytes = end.conform(&self.descriptor)?.encode()?;
        if start_bytes > end_bytes {
            return Ok(0);
        }
        let doomed: Vec<Vec<u8>> = self
            .events
            .range(start_bytes..=end_bytes)
            .map(|(bytes, _)| bytes.clone())
            .collect();
        for bytes in &doomed {
            if let Some(event) = self.events.remove(bytes) {
                self.index_remove(bytes, &event)?;
            }
        }
        Ok(doomed.len())
    }

    /// The event with the minimum key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the stream is empty.
    pub fn first(&self) -> Result<Event, StoreError> {
        self.events
            .values()
            .next()
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("stream '{}' is empty", self.id)))
    }

    /// The event with the maximum key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the stream is empty.
    pub fn last(&self) -> Result<Event, StoreError> {
        self.events
            .values()
            .next_back()
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("stream '{}' is empty", self.id)))
    }

    /// All events with keys in `[start, end]`, ascending, optionally
    /// restricted by a filter. An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns a core error for malformed keys or a filter referencing
    /// unknown properties.
    pub fn window(
        &self,
        start: &Key,
        end: &Key,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<Event>, StoreError> {
        let start_bytes = start.conform(&self.descriptor)?.encode()?;
        let end_bytes = end.conform(&self.descriptor)?.encode()?;
        if start_bytes > end_bytes {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for event in self.events.range(start_bytes..=end_bytes).map(|(_, e)| e) {
            if let Some(filter) = filter {
                if !filter.matches(event)? {
                    continue;
                }
            }
            out.push(event.clone());
        }
        Ok(out)
    }

    /// Walk `count` events from `start` in the given direction.
    ///
    /// With [`Boundary::ExactOrCalculated`], a start position with no
    /// stored event yields a synthesized event first: continuous
    /// properties interpolate (or extrapolate) between the two nearest
    /// stored events, discrete-override properties read as their zero
    /// value, and the key property takes the query position. An empty
    /// stream yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns a core error if the key does not conform to the stream's
    /// key shape.
    pub fn range(
        &self,
        start: &Key,
        count: usize,
        direction: Direction,
        boundary: Boundary,
    ) -> Result<Vec<Event>, StoreError> {
        let start = start.conform(&self.descriptor)?;
        let bytes = start.encode()?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut out = Vec::with_capacity(count);
        if boundary == Boundary::ExactOrCalculated && !self.events.contains_key(&bytes) {
            if let Some(synthesized) = self.synthesize_at(&start)? {
                out.push(synthesized);
            }
        }

        match direction {
            Direction::Forward => {
                for event in self.events.range(bytes..).map(|(_, e)| e) {
                    if out.len() == count {
                        break;
                    }
                    out.push(event.clone());
                }
            }
            Direction::Backward => {
                for event in self.events.range(..=bytes).rev().map(|(_, e)| e) {
                    if out.len() == count {
                        break;
                    }
                    out.push(event.clone());
                }
            }
        }
        Ok(out)
    }

    /// `count` evenly spaced read positions across `[start, end]`
    /// inclusive; exact hits return the stored event, everything else is
    /// interpolated (or extrapolated outside the stored range).
    ///
    /// Int-keyed streams round positions to the nearest whole key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Range`] when `count` is zero and
    /// [`CoreError::Validation`] on compound-key streams, which have no
    /// scalar positions to space.
    pub fn range_interpolated(
        &self,
        start: &Key,
        end: &Key,
        count: usize,
    ) -> Result<Vec<Event>, StoreError> {
        if self.descriptor.is_compound() {
            return Err(CoreError::validation(format!(
                "stream '{}': interpolated reads require a single-component key",
                self.id
            ))
            .into());
        }
        if count == 0 {
            return Err(StoreError::range("interpolated read count must be positive"));
        }
        let start = start.conform(&self.descriptor)?;
        let end = end.conform(&self.descriptor)?;
        if self.events.is_empty() {
            return Ok(Vec::new());
        }
        let start_position = start.scalar_position().unwrap_or(0.0);
        let end_position = end.scalar_position().unwrap_or(0.0);
        let key_index = self.descriptor.key_indices()[0];
        let key_kind = &self.descriptor.properties()[key_index].kind;

        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let position = if count == 1 {
                start_position
            } else {
                start_position
                    + (end_position - start_position) * i as f64 / (count - 1) as f64
            };
            let key = match key_kind {
                ValueKind::Int => Key::single(position.round() as i64),
                _ => Key::single(position),
            };
            let bytes = key.encode()?;
            if let Some(event) = self.events.get(&bytes) {
                out.push(event.clone());
            } else if let Some(event) = self.synthesize_at(&key)? {
                out.push(event);
            }
        }
        Ok(out)
    }

    /// One representative event per equal-width bucket across
    /// `[start, end]`, chosen by the sample property: the event whose
    /// value lies nearest the midpoint of the bucket's value range
    /// (earliest key wins ties). Empty buckets produce nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Range`] when `intervals` is zero and
    /// [`CoreError::Validation`] for unknown or non-scalar sample
    /// properties or compound-key streams.
    pub fn sampled(
        &self,
        start: &Key,
        end: &Key,
        property: &str,
        intervals: usize,
    ) -> Result<Vec<Event>, StoreError> {
        if intervals == 0 {
            return Err(StoreError::range("sample interval count must be positive"));
        }
        let (_, definition) = self.descriptor.property(property).ok_or_else(|| {
            CoreError::validation(format!(
                "stream '{}': no property '{property}' to sample by",
                self.id
            ))
        })?;
        if !definition.kind.is_scalar() {
            return Err(CoreError::validation(format!(
                "stream '{}': cannot sample by {} property '{property}'",
                self.id,
                definition.kind.name()
            ))
            .into());
        }
        if self.descriptor.is_compound() {
            return Err(CoreError::validation(format!(
                "stream '{}': sampling requires a single-component key",
                self.id
            ))
            .into());
        }
        let start = start.conform(&self.descriptor)?;
        let end = end.conform(&self.descriptor)?;
        let start_bytes = start.encode()?;
        let end_bytes = end.encode()?;
        if start_bytes > end_bytes {
            return Ok(Vec::new());
        }
        let start_position = start.scalar_position().unwrap_or(0.0);
        let end_position = end.scalar_position().unwrap_or(0.0);

        let window: Vec<(f64, f64, &Event)> = self
            .events
            .range(start_bytes..=end_bytes)
            .map(|(_, event)| {
                let position = event.key().scalar_position().unwrap_or(0.0);
                let sample = event.get(property).and_then(Value::as_numeric).unwrap_or(0.0);
                (position, sample, event)
            })
            .collect();
        if window.is_empty() {
            return Ok(Vec::new());
        }

        let width = (end_position - start_position) / intervals as f64;
        let mut out = Vec::new();
        for i in 0..intervals {
            let lo = start_position + width * i as f64;
            let hi = start_position + width * (i + 1) as f64;
            let last = i == intervals - 1;
            let bucket: Vec<(f64, f64, &Event)> = window
                .iter()
                .copied()
                .filter(|(position, _, _)| {
                    *position >= lo && if last { *position <= end_position } else { *position < hi }
                })
                .collect();
            if bucket.is_empty() {
                continue;
            }

            let mut value_min = f64::INFINITY;
            let mut value_max = f64::NEG_INFINITY;
            for (_, sample, _) in &bucket {
                value_min = value_min.min(*sample);
                value_max = value_max.max(*sample);
            }
            let target = (value_min + value_max) / 2.0;

            let mut best: Option<(f64, &Event)> = None;
            for (_, sample, event) in bucket {
                let distance = (sample - target).abs();
                if best.as_ref().is_none_or(|(d, _)| distance < *d) {
                    best = Some((distance, event));
                }
            }
            if let Some((_, event)) = best {
                out.push(event.clone());
            }
        }
        Ok(out)
    }

    /// All events ordered by an indexed property (primary key breaks
    /// ties).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the stream has no index on the
    /// property.
    pub fn index_ordered(&self, property: &str) -> Result<Vec<Event>, StoreError> {
        let index = self.indexes.iter().find(|i| i.property == property).ok_or_else(|| {
            StoreError::not_found(format!(
                "stream '{}' has no secondary index on '{property}'",
                self.id
            ))
        })?;
        Ok(index.entries.values().filter_map(|bytes| self.events.get(bytes).cloned()).collect())
    }

    /// Convert the stream to a view's target type, remapping every stored
    /// event. Overrides and indexes survive where their property has a
    /// target counterpart; the rest are dropped.
    pub(crate) fn retype(&mut self, view: &StreamView) -> Result<(), StoreError> {
        let mut events = BTreeMap::new();
        for event in self.events.values() {
            let mapped = view.apply(event)?;
            let bytes = mapped.key_bytes()?;
            events.insert(bytes, mapped);
        }

        let overrides: Vec<PropertyOverride> = self
            .overrides
            .iter()
            .filter_map(|o| {
                view.target_of(&o.property)
                    .map(|target| PropertyOverride::new(target, o.mode))
            })
            .collect();
        let target = Arc::clone(view.target());
        let index_properties: Vec<String> = self
            .indexes
            .iter()
            .filter_map(|i| view.target_of(&i.property).map(str::to_owned))
            .filter(|property| {
                target.property(property).is_some_and(|(index, definition)| {
                    definition.kind.is_scalar() && !target.key_indices().contains(&index)
                })
            })
            .collect();

        self.descriptor = target;
        self.events = events;
        self.overrides = overrides;
        self.set_indexes(index_properties)?;
        Ok(())
    }

    fn check_type(&self, event: &Event) -> Result<(), StoreError> {
        if **event.descriptor() != *self.descriptor {
            return Err(CoreError::type_mismatch(
                self.descriptor.id(),
                event.descriptor().id(),
            )
            .into());
        }
        Ok(())
    }

    fn index_insert(&mut self, key_bytes: &[u8], event: &Event) -> Result<(), StoreError> {
        for index in &mut self.indexes {
            if let Some(value) = event.get(&index.property) {
                let mut entry = encode_sortable(value)?;
                entry.extend_from_slice(key_bytes);
                index.entries.insert(entry, key_bytes.to_vec());
            }
        }
        Ok(())
    }

    fn index_remove(&mut self, key_bytes: &[u8], event: &Event) -> Result<(), StoreError> {
        for index in &mut self.indexes {
            if let Some(value) = event.get(&index.property) {
                let mut entry = encode_sortable(value)?;
                entry.extend_from_slice(key_bytes);
                index.entries.remove(&entry);
            }
        }
        Ok(())
    }

    /// Synthesize an event at a position with no stored event, per the
    /// calculated-boundary contract. Returns `None` for compound-key
    /// streams and for empty streams.
    fn synthesize_at(&self, key: &Key) -> Result<Option<Event>, StoreError> {
        let Some(position) = key.scalar_position() else {
            return Ok(None);
        };
        let bytes = key.encode()?;

        let mut below = self
            .events
            .range::<[u8], _>((Bound::Unbounded, Bound::Excluded(&bytes[..])))
            .rev()
            .map(|(_, event)| event);
        let mut above = self
            .events
            .range::<[u8], _>((Bound::Excluded(&bytes[..]), Bound::Unbounded))
            .map(|(_, event)| event);

        let (nearest_below, next_below) = (below.next(), below.next());
        let (nearest_above, next_above) = (above.next(), above.next());

        // Interpolate between neighbors when inside the stored range,
        // extrapolate from the two nearest boundary events outside it. A
        // single stored event degenerates to a constant.
        let (first, second) = match (nearest_below, nearest_above) {
            (Some(b), Some(a)) => (b, a),
            (Some(b), None) => (next_below.unwrap_or(b), b),
            (None, Some(a)) => (a, next_above.unwrap_or(a)),
            (None, None) => return Ok(None),
        };

        let k0 = first.key().scalar_position().unwrap_or(position);
        let k1 = second.key().scalar_position().unwrap_or(position);
        let key_index = self.descriptor.key_indices()[0];

        let mut values = Vec::with_capacity(self.descriptor.properties().len());
        for (index, property) in self.descriptor.properties().iter().enumerate() {
            if index == key_index {
                values.push(key.components()[0].clone());
            } else if self.mode_of(&property.name) == InterpolationMode::Discrete {
                values.push(property.kind.zero());
            } else {
                values.push(interpolate::value_at(
                    &property.kind,
                    k0,
                    &first.values()[index],
                    k1,
                    &second.values()[index],
                    position,
                ));
            }
        }
        Event::from_values(&self.descriptor, values).map(Some).map_err(StoreError::from)
    }
}
