//! Strata Store
//!
//! The in-memory sequential-data store: keyed event streams with the full
//! windowed read contract, and stream views for read-time reshaping.
//!
//! # Overview
//!
//! - **Streams**: [`Stream`] keeps events of one type ordered by encoded
//!   primary key, with secondary indexes and per-property interpolation
//!   overrides.
//! - **Reads**: first/last, inclusive windows with [`FilterExpr`]
//!   predicates, directional ranges with [`Boundary`] policies that can
//!   synthesize interpolated events, evenly spaced interpolated ranges,
//!   and per-bucket sampling.
//! - **Views**: [`StreamView`] projects events of one type onto another,
//!   implicitly by name/shape or through explicit property pairs with
//!   numeric narrowing.
//! - **Store**: the [`SequentialStore`] trait is the client-facing seam;
//!   [`MemoryStore`] implements it over namespaced registries so the
//!   whole contract runs offline.
//!
//! # Example
//!
//! ```
//! use strata_core::{codec, FieldMap, Key, PropertyDef, TypeDescriptor, Value};
//! use strata_store::{MemoryStore, SequentialStore, StreamDefinition};
//!
//! let mut store = MemoryStore::new();
//! let wave = store.get_or_create_type(
//!     "ops",
//!     TypeDescriptor::define(
//!         "Wave",
//!         vec![PropertyDef::int("Order").key(), PropertyDef::float("Sin")],
//!     )?,
//! )?;
//! store.create_or_update_stream("ops", StreamDefinition::new("wave1", "Wave"))?;
//!
//! let mut fields = FieldMap::new();
//! fields.insert("Order".to_owned(), Value::Int(0));
//! fields.insert("Sin".to_owned(), Value::Float(0.5));
//! store.insert_values("ops", "wave1", vec![codec::decode(&wave, &fields)?])?;
//!
//! let last = store.get_last_value("ops", "wave1")?;
//! assert_eq!(last.key(), Key::from(0i64));
//! # Ok::<(), strata_store::StoreError>(())
//! ```

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod filter;
mod interpolate;
pub mod store;
pub mod stream;
pub mod view;

// Re-export commonly used types
pub use error::StoreError;
pub use filter::{CompareOp, FilterExpr};
pub use store::{MemoryStore, SequentialStore, StreamDefinition, ViewDefinition};
pub use stream::{Boundary, Direction, InterpolationMode, PropertyOverride, Stream};
pub use view::{StreamView, ViewMapEntry, ViewProperty};
