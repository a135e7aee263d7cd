//! Strata Core
//!
//! This crate provides the typed event data model of a sequential-data
//! store: declared type descriptors with ordered (possibly compound)
//! primary keys, events materialized against those descriptors, the codec
//! that backfills absent fields with zero values, and the order-preserving
//! key encoding that gives streams their total order.
//!
//! # Overview
//!
//! - **Schema**: [`TypeDescriptor`] declares an event's shape up front:
//!   an ordered list of [`PropertyDef`]s and which of them form the key.
//! - **Values**: [`Value`] covers the supported property kinds (`Int`,
//!   `Float`, nested `Object`); [`FieldMap`] is the generic name-to-value
//!   form used as the codec's input and output.
//! - **Events**: [`Event`] holds one value per declared property, in
//!   declaration order, with its key extractable as a [`Key`].
//! - **Codec**: [`codec::decode`] / [`codec::encode`] convert between
//!   field maps and events, consulting the declared zero-value table for
//!   absent input.
//! - **Keys**: [`encoding`] produces byte encodings whose lexicographic
//!   order matches the key tuple order, for range-scan storage.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strata_core::{codec, FieldMap, PropertyDef, TypeDescriptor, Value};
//!
//! let wave = Arc::new(
//!     TypeDescriptor::define(
//!         "WaveData_SampleType",
//!         vec![
//!             PropertyDef::int("Order").key(),
//!             PropertyDef::float("Radians"),
//!             PropertyDef::float("Sin"),
//!         ],
//!     )?
//!     .with_name("WaveDataSample"),
//! );
//!
//! let mut raw = FieldMap::new();
//! raw.insert("Order".to_owned(), Value::Int(4));
//! raw.insert("Sin".to_owned(), Value::Float(0.76));
//!
//! let event = codec::decode(&wave, &raw)?;
//! assert_eq!(event.get("Radians"), Some(&Value::Float(0.0)));
//! assert_eq!(event.key().to_string(), "4");
//! # Ok::<(), strata_core::CoreError>(())
//! ```

// Deny unwrap in library code to ensure proper error handling
#![deny(clippy::unwrap_used)]

pub mod codec;
pub mod encoding;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use encoding::Key;
pub use error::CoreError;
pub use types::{Event, FieldMap, PropertyDef, TypeDescriptor, Value, ValueKind};
