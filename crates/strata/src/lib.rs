//! Strata
//!
//! A typed sequential-data store: declared event types with ordered
//! (possibly compound) primary keys, a codec that backfills absent fields
//! with zero values, keyed streams with windowed / interpolated / sampled
//! reads, and stream views that reshape events at read time.
//!
//! The store itself runs in memory behind the [`SequentialStore`] trait,
//! so the whole read and write contract is exercisable offline, through
//! the same seam a transport-backed client would implement.
//!
//! # Example
//!
//! ```
//! use strata::wave::{wave, wave_type};
//! use strata::{Key, MemoryStore, SequentialStore, StreamDefinition};
//!
//! let mut store = MemoryStore::new();
//! let descriptor = store.get_or_create_type("ops", wave_type("Wave")?)?;
//! store.create_or_update_stream("ops", StreamDefinition::new("wave1", "Wave"))?;
//!
//! let events: Result<Vec<_>, _> =
//!     (0..10).map(|i| wave(i * 2, 2.0).event(&descriptor)).collect();
//! store.insert_values("ops", "wave1", events?)?;
//!
//! let window =
//!     store.get_window_values("ops", "wave1", &Key::from(0i64), &Key::from(18i64), None)?;
//! assert_eq!(window.len(), 10);
//! # Ok::<(), strata::StoreError>(())
//! ```

// Re-export core types
pub use strata_core::{
    codec, CoreError, Event, FieldMap, Key, PropertyDef, TypeDescriptor, Value, ValueKind,
};

// Re-export store types
pub use strata_store::{
    Boundary, CompareOp, Direction, FilterExpr, InterpolationMode, MemoryStore, PropertyOverride,
    SequentialStore, StoreError, Stream, StreamDefinition, StreamView, ViewDefinition,
    ViewMapEntry, ViewProperty,
};

pub mod wave;
