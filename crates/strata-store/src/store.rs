//! The store interface and its in-memory implementation.
//!
//! [`SequentialStore`] is the seam a transport-backed client would sit
//! behind; [`MemoryStore`] implements it over plain maps so the full read
//! and write contract can be exercised offline. Namespaces hold three
//! registries (types, streams, and stream views), created on demand.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use strata_core::{CoreError, Event, Key, TypeDescriptor};

use crate::error::StoreError;
use crate::filter::FilterExpr;
use crate::stream::{Boundary, Direction, PropertyOverride, Stream};
use crate::view::{StreamView, ViewMapEntry, ViewProperty};

/// Declarative configuration of a stream: its type plus optional
/// metadata, secondary indexes, and property overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDefinition {
    /// The stream id.
    pub id: String,
    /// The id of the stream's event type.
    pub type_id: String,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Properties to carry a secondary index.
    pub indexes: Vec<String>,
    /// Per-property interpolation overrides.
    pub overrides: Vec<PropertyOverride>,
}

impl StreamDefinition {
    /// Create a definition for a stream of the given type.
    #[must_use]
    pub fn new(id: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_id: type_id.into(),
            name: None,
            description: None,
            indexes: Vec::new(),
            overrides: Vec::new(),
        }
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

    /// Add a secondary index on a property.
    #[must_use]
    pub fn with_index(mut self, property: impl Into<String>) -> Self {
        self.indexes.push(property.into());
        self
    }

    /// Add a property override.
    #[must_use]
    pub fn with_override(mut self, o: PropertyOverride) -> Self {
        self.overrides.push(o);
        self
    }
}

/// Declarative configuration of a stream view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewDefinition {
    /// The view id.
    pub id: String,
    /// The id of the source event type.
    pub source_type_id: String,
    /// The id of the target event type.
    pub target_type_id: String,
    /// Explicit property pairs; `None` derives an implicit mapping.
    pub properties: Option<Vec<ViewProperty>>,
}

impl ViewDefinition {
    /// Create a definition with an implicit mapping.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        source_type_id: impl Into<String>,
        target_type_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_type_id: source_type_id.into(),
            target_type_id: target_type_id.into(),
            properties: None,
        }
    }

    /// Use explicit property pairs instead of the implicit mapping.
    #[must_use]
    pub fn with_properties(mut self, properties: Vec<ViewProperty>) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// The operations a sequential-data store exposes to clients.
///
/// Every method takes a namespace; registries inside a namespace are
/// independent of each other. The in-memory [`MemoryStore`] is the
/// reference implementation and stands in for the remote service in
/// offline tests.
pub trait SequentialStore {
    /// Register a type, or return the existing one with the same id.
    ///
    /// # Errors
    ///
    /// Fails with a validation error if the id is already taken by a
    /// different definition.
    fn get_or_create_type(
        &mut self,
        namespace: &str,
        descriptor: TypeDescriptor,
    ) -> Result<Arc<TypeDescriptor>, StoreError>;

    /// Look up a type by id.
    fn get_type(&self, namespace: &str, type_id: &str)
        -> Result<Arc<TypeDescriptor>, StoreError>;

    /// List types in id order, with paging.
    fn types(
        &self,
        namespace: &str,
        skip: usize,
        take: usize,
    ) -> Result<Vec<Arc<TypeDescriptor>>, StoreError>;

    /// List types whose id matches a `*` wildcard pattern.
    fn find_types(
        &self,
        namespace: &str,
        pattern: &str,
    ) -> Result<Vec<Arc<TypeDescriptor>>, StoreError>;

    /// Delete a type that no stream or view references.
    fn delete_type(&mut self, namespace: &str, type_id: &str) -> Result<(), StoreError>;

    /// Create a stream, or reconfigure an existing one's metadata,
    /// indexes, and overrides.
    fn create_or_update_stream(
        &mut self,
        namespace: &str,
        definition: StreamDefinition,
    ) -> Result<(), StoreError>;

    /// The current definition of a stream.
    fn get_stream(&self, namespace: &str, stream_id: &str)
        -> Result<StreamDefinition, StoreError>;

    /// Delete a stream and its events.
    fn delete_stream(&mut self, namespace: &str, stream_id: &str) -> Result<(), StoreError>;

    /// Convert a stream to a view's target type, remapping stored events.
    fn update_stream_type(
        &mut self,
        namespace: &str,
        stream_id: &str,
        view_id: &str,
    ) -> Result<(), StoreError>;

    /// Insert events; every key must be new.
    fn insert_values(
        &mut self,
        namespace: &str,
        stream_id: &str,
        events: Vec<Event>,
    ) -> Result<(), StoreError>;

    /// Insert or overwrite events.
    fn update_values(
        &mut self,
        namespace: &str,
        stream_id: &str,
        events: Vec<Event>,
    ) -> Result<(), StoreError>;

    /// Overwrite events; every key must already be stored.
    fn replace_values(
        &mut self,
        namespace: &str,
        stream_id: &str,
        events: Vec<Event>,
    ) -> Result<(), StoreError>;

    /// Remove the event at a key.
    fn remove_value(
        &mut self,
        namespace: &str,
        stream_id: &str,
        key: &Key,
    ) -> Result<(), StoreError>;

    /// Remove every event with a key in `[start, end]`.
    fn remove_window_values(
        &mut self,
        namespace: &str,
        stream_id: &str,
        start: &Key,
        end: &Key,
    ) -> Result<(), StoreError>;

    /// The event with the minimum key.
    fn get_first_value(&self, namespace: &str, stream_id: &str) -> Result<Event, StoreError>;

    /// The event with the maximum key.
    fn get_last_value(&self, namespace: &str, stream_id: &str) -> Result<Event, StoreError>;

    /// Events with keys in `[start, end]`, optionally filtered.
    fn get_window_values(
        &self,
        namespace: &str,
        stream_id: &str,
        start: &Key,
        end: &Key,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<Event>, StoreError>;

    /// Walk `count` events from `start`, optionally projected through a
    /// stream view.
    #[allow(clippy::too_many_arguments)]
    fn get_range_values(
        &self,
        namespace: &str,
        stream_id: &str,
        start: &Key,
        count: usize,
        direction: Direction,
        boundary: Boundary,
        view_id: Option<&str>,
    ) -> Result<Vec<Event>, StoreError>;

    /// `count` evenly spaced interpolated reads across `[start, end]`.
    fn get_range_values_interpolated(
        &self,
        namespace: &str,
        stream_id: &str,
        start: &Key,
        end: &Key,
        count: usize,
    ) -> Result<Vec<Event>, StoreError>;

    /// One representative event per bucket across `[start, end]`.
    fn get_sampled_values(
        &self,
        namespace: &str,
        stream_id: &str,
        start: &Key,
        end: &Key,
        property: &str,
        intervals: usize,
    ) -> Result<Vec<Event>, StoreError>;

    /// Events ordered by a secondary-indexed property.
    fn get_index_ordered(
        &self,
        namespace: &str,
        stream_id: &str,
        property: &str,
    ) -> Result<Vec<Event>, StoreError>;

    /// Derive and register a view, or return the existing identical one.
    fn get_or_create_stream_view(
        &mut self,
        namespace: &str,
        definition: ViewDefinition,
    ) -> Result<StreamView, StoreError>;

    /// The complete property enumeration of a view.
    fn get_stream_view_map(
        &self,
        namespace: &str,
        view_id: &str,
    ) -> Result<Vec<ViewMapEntry>, StoreError>;

    /// Delete a stream view.
    fn delete_stream_view(&mut self, namespace: &str, view_id: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
struct Namespace {
    types: BTreeMap<String, Arc<TypeDescriptor>>,
    streams: BTreeMap<String, Stream>,
    views: BTreeMap<String, StreamView>,
}

/// The in-memory reference implementation of [`SequentialStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    namespaces: HashMap<String, Namespace>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn namespace(&self, namespace: &str) -> Result<&Namespace, StoreError> {
        self.namespaces
            .get(namespace)
            .ok_or_else(|| StoreError::not_found(format!("namespace '{namespace}'")))
    }

    fn namespace_mut(&mut self, namespace: &str) -> &mut Namespace {
        self.namespaces.entry(namespace.to_owned()).or_default()
    }

    fn stream<'a>(ns: &'a Namespace, stream_id: &str) -> Result<&'a Stream, StoreError> {
        ns.streams
            .get(stream_id)
            .ok_or_else(|| StoreError::not_found(format!("stream '{stream_id}'")))
    }

    fn stream_mut<'a>(
        ns: &'a mut Namespace,
        stream_id: &str,
    ) -> Result<&'a mut Stream, StoreError> {
        ns.streams
            .get_mut(stream_id)
            .ok_or_else(|| StoreError::not_found(format!("stream '{stream_id}'")))
    }

    fn view<'a>(ns: &'a Namespace, view_id: &str) -> Result<&'a StreamView, StoreError> {
        ns.views
            .get(view_id)
            .ok_or_else(|| StoreError::not_found(format!("stream view '{view_id}'")))
    }
}

impl SequentialStore for MemoryStore {
    fn get_or_create_type(
        &mut self,
        namespace: &str,
        descriptor: TypeDescriptor,
    ) -> Result<Arc<TypeDescriptor>, StoreError> {
        let ns = self.namespace_mut(namespace);
        if let Some(existing) = ns.types.get(descriptor.id()) {
            if **existing != descriptor {
                return Err(CoreError::validation(format!(
                    "type '{}' already exists with a different definition",
                    descriptor.id()
                ))
                .into());
            }
            return Ok(Arc::clone(existing));
        }
        debug!(namespace, type_id = descriptor.id(), "creating type");
        let descriptor = Arc::new(descriptor);
        ns.types.insert(descriptor.id().to_owned(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    fn get_type(
        &self,
        namespace: &str,
        type_id: &str,
    ) -> Result<Arc<TypeDescriptor>, StoreError> {
        self.namespace(namespace)?
            .types
            .get(type_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("type '{type_id}'")))
    }

    fn types(
        &self,
        namespace: &str,
        skip: usize,
        take: usize,
    ) -> Result<Vec<Arc<TypeDescriptor>>, StoreError> {
        Ok(self.namespace(namespace)?.types.values().skip(skip).take(take).cloned().collect())
    }

    fn find_types(
        &self,
        namespace: &str,
        pattern: &str,
    ) -> Result<Vec<Arc<TypeDescriptor>>, StoreError> {
        Ok(self
            .namespace(namespace)?
            .types
            .values()
            .filter(|descriptor| wildcard_match(pattern, descriptor.id()))
            .cloned()
            .collect())
    }

    fn delete_type(&mut self, namespace: &str, type_id: &str) -> Result<(), StoreError> {
        let ns = self.namespace_mut(namespace);
        if !ns.types.contains_key(type_id) {
            return Err(StoreError::not_found(format!("type '{type_id}'")));
        }
        if let Some(stream) = ns.streams.values().find(|s| s.descriptor().id() == type_id) {
            return Err(CoreError::validation(format!(
                "type '{type_id}' is still used by stream '{}'",
                stream.id()
            ))
            .into());
        }
        if let Some(view) = ns
            .views
            .values()
            .find(|v| v.source().id() == type_id || v.target().id() == type_id)
        {
            return Err(CoreError::validation(format!(
                "type '{type_id}' is still used by stream view '{}'",
                view.id()
            ))
            .into());
        }
        debug!(namespace, type_id, "deleting type");
        ns.types.remove(type_id);
        Ok(())
    }

    fn create_or_update_stream(
        &mut self,
        namespace: &str,
        definition: StreamDefinition,
    ) -> Result<(), StoreError> {
        let ns = self.namespace_mut(namespace);
        let descriptor = ns
            .types
            .get(&definition.type_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("type '{}'", definition.type_id)))?;

        match ns.streams.get(&definition.id) {
            Some(existing) if existing.descriptor().id() != definition.type_id => {
                return Err(CoreError::validation(format!(
                    "stream '{}' is of type '{}'; changing type requires a stream view",
                    definition.id,
                    existing.descriptor().id()
                ))
                .into());
            }
            Some(_) => {}
            None => {
                debug!(namespace, stream_id = definition.id.as_str(), "creating stream");
                ns.streams
                    .insert(definition.id.clone(), Stream::new(definition.id.clone(), descriptor));
            }
        }
        let Some(stream) = ns.streams.get_mut(&definition.id) else {
            return Err(StoreError::not_found(format!("stream '{}'", definition.id)));
        };
        stream.set_name(definition.name);
        stream.set_description(definition.description);
        stream.set_indexes(definition.indexes)?;
        stream.set_overrides(definition.overrides)?;
        Ok(())
    }

    fn get_stream(
        &self,
        namespace: &str,
        stream_id: &str,
    ) -> Result<StreamDefinition, StoreError> {
        let stream = Self::stream(self.namespace(namespace)?, stream_id)?;
        Ok(StreamDefinition {
            id: stream.id().to_owned(),
            type_id: stream.descriptor().id().to_owned(),
            name: stream.name().map(str::to_owned),
            description: stream.description().map(str::to_owned),
            indexes: stream.index_properties().iter().map(|&p| p.to_owned()).collect(),
            overrides: stream.overrides().to_vec(),
        })
    }

    fn delete_stream(&mut self, namespace: &str, stream_id: &str) -> Result<(), StoreError> {
        let ns = self.namespace_mut(namespace);
        if ns.streams.remove(stream_id).is_none() {
            return Err(StoreError::not_found(format!("stream '{stream_id}'")));
        }
        debug!(namespace, stream_id, "deleted stream");
        Ok(())
    }

    fn update_stream_type(
        &mut self,
        namespace: &str,
        stream_id: &str,
        view_id: &str,
    ) -> Result<(), StoreError> {
        let ns = self.namespace_mut(namespace);
        let view = ns
            .views
            .get(view_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(format!("stream view '{view_id}'")))?;
        let stream = Self::stream_mut(ns, stream_id)?;
        if *stream.descriptor() != *view.source() {
            return Err(CoreError::validation(format!(
                "stream view '{view_id}' maps type '{}', stream '{stream_id}' is of type '{}'",
                view.source().id(),
                stream.descriptor().id()
            ))
            .into());
        }
        if !view.maps_primary_key() {
            return Err(CoreError::validation(format!(
                "stream view '{view_id}' does not carry the primary key onto the target type"
            ))
            .into());
        }
        debug!(namespace, stream_id, view_id, "updating stream type");
        stream.retype(&view)
    }

    fn insert_values(
        &mut self,
        namespace: &str,
        stream_id: &str,
        events: Vec<Event>,
    ) -> Result<(), StoreError> {
        let count = events.len();
        Self::stream_mut(self.namespace_mut(namespace), stream_id)?.insert_all(events)?;
        debug!(namespace, stream_id, count, "inserted events");
        Ok(())
    }

    fn update_values(
        &mut self,
        namespace: &str,
        stream_id: &str,
        events: Vec<Event>,
    ) -> Result<(), StoreError> {
        Self::stream_mut(self.namespace_mut(namespace), stream_id)?.update_all(events)
    }

    fn replace_values(
        &mut self,
        namespace: &str,
        stream_id: &str,
        events: Vec<Event>,
    ) -> Result<(), StoreError> {
        Self::stream_mut(self.namespace_mut(namespace), stream_id)?.replace_all(events)
    }

    fn remove_value(
        &mut self,
        namespace: &str,
        stream_id: &str,
        key: &Key,
    ) -> Result<(), StoreError> {
        Self::stream_mut(self.namespace_mut(namespace), stream_id)?.remove(key)
    }

    fn remove_window_values(
        &mut self,
        namespace: &str,
        stream_id: &str,
        start: &Key,
        end: &Key,
    ) -> Result<(), StoreError> {
        let removed = Self::stream_mut(self.namespace_mut(namespace), stream_id)?
            .remove_window(start, end)?;
        debug!(namespace, stream_id, removed, "removed window");
        Ok(())
    }

    fn get_first_value(&self, namespace: &str, stream_id: &str) -> Result<Event, StoreError> {
        Self::stream(self.namespace(namespace)?, stream_id)?.first()
    }

    fn get_last_value(&self, namespace: &str, stream_id: &str) -> Result<Event, StoreError> {
        Self::stream(self.namespace(namespace)?, stream_id)?.last()
    }

    fn get_window_values(
        &self,
        namespace: &str,
        stream_id: &str,
        start: &Key,
        end: &Key,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<Event>, StoreError> {
        Self::stream(self.namespace(namespace)?, stream_id)?.window(start, end, filter)
    }

    fn get_range_values(
        &self,
        namespace: &str,
        stream_id: &str,
        start: &Key,
        count: usize,
        direction: Direction,
        boundary: Boundary,
        view_id: Option<&str>,
    ) -> Result<Vec<Event>, StoreError> {
        let ns = self.namespace(namespace)?;
        let stream = Self::stream(ns, stream_id)?;
        let events = stream.range(start, count, direction, boundary)?;
        match view_id {
            None => Ok(events),
            Some(view_id) => {
                let view = Self::view(ns, view_id)?;
                if *view.source() != *stream.descriptor() {
                    return Err(CoreError::validation(format!(
                        "stream view '{view_id}' maps type '{}', stream '{stream_id}' is of type '{}'",
                        view.source().id(),
                        stream.descriptor().id()
                    ))
                    .into());
                }
                events
                    .iter()
                    .map(|event| view.apply(event).map_err(StoreError::from))
                    .collect()
            }
        }
    }

    fn get_range_values_interpolated(
        &self,
        namespace: &str,
        stream_id: &str,
        start: &Key,
        end: &Key,
        count: usize,
    ) -> Result<Vec<Event>, StoreError> {
        Self::stream(self.namespace(namespace)?, stream_id)?
            .range_interpolated(start, end, count)
    }

    fn get_sampled_values(
        &self,
        namespace: &str,
        stream_id: &str,
        start: &Key,
        end: &Key,
        property: &str,
        intervals: usize,
    ) -> Result<Vec<Event>, StoreError> {
        Self::stream(self.namespace(namespace)?, stream_id)?
            .sampled(start, end, property, intervals)
    }

    fn get_index_ordered(
        &self,
        namespace: &str,
        stream_id: &str,
        property: &str,
    ) -> Result<Vec<Event>, StoreError> {
        Self::stream(self.namespace(namespace)?, stream_id)?.index_ordered(property)
    }

    fn get_or_create_stream_view(
        &mut self,
        namespace: &str,
        definition: ViewDefinition,
    ) -> Result<StreamView, StoreError> {
        let ns = self.namespace_mut(namespace);
        let source = ns
            .types
            .get(&definition.source_type_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::not_found(format!("type '{}'", definition.source_type_id))
            })?;
        let target = ns
            .types
            .get(&definition.target_type_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::not_found(format!("type '{}'", definition.target_type_id))
            })?;
        let candidate = StreamView::derive(
            definition.id.clone(),
            &source,
            &target,
            definition.properties.as_deref(),
        )?;
        if let Some(existing) = ns.views.get(&definition.id) {
            if *existing != candidate {
                return Err(CoreError::validation(format!(
                    "stream view '{}' already exists with a different definition",
                    definition.id
                ))
                .into());
            }
            return Ok(existing.clone());
        }
        debug!(namespace, view_id = definition.id.as_str(), "creating stream view");
        ns.views.insert(definition.id, candidate.clone());
        Ok(candidate)
    }

    fn get_stream_view_map(
        &self,
        namespace: &str,
        view_id: &str,
    ) -> Result<Vec<ViewMapEntry>, StoreError> {
        Ok(Self::view(self.namespace(namespace)?, view_id)?.view_map())
    }

    fn delete_stream_view(&mut self, namespace: &str, view_id: &str) -> Result<(), StoreError> {
        let ns = self.namespace_mut(namespace);
        if ns.views.remove(view_id).is_none() {
            return Err(StoreError::not_found(format!("stream view '{view_id}'")));
        }
        debug!(namespace, view_id, "deleted stream view");
        Ok(())
    }
}

/// Match a type id against a `*` wildcard pattern (e.g. `*Target*`).
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == text;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !text.starts_with(first) {
        return false;
    }
    let mut position = first.len();
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match text[position..].find(part) {
            Some(found) => position += found + part.len(),
            None => return false,
        }
    }
    if last.is_empty() {
        return true;
    }
    text.len() >= position + last.len() && text.ends_with(last)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_matching() {
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("*Target*", "WaveDataTarget_SampleType"));
        assert!(wildcard_match("Wave*", "WaveData_SampleType"));
        assert!(wildcard_match("*Type", "WaveData_SampleType"));
        assert!(wildcard_match("Wave*Sample*", "WaveData_SampleType"));
        assert!(wildcard_match("exact", "exact"));

        assert!(!wildcard_match("*Target*", "WaveData_SampleType"));
        assert!(!wildcard_match("exact", "inexact"));
        assert!(!wildcard_match("Wave", "WaveData"));
        assert!(!wildcard_match("*Sample", "WaveData_SampleType"));
    }
}
