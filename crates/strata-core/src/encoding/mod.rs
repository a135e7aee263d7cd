//! Order-preserving key encoding.
//!
//! Streams keep their events in an ordered map keyed by encoded bytes, so
//! window and range queries become byte-range scans. The [`sortable`]
//! module encodes individual key components (sign-flipped big-endian
//! integers, bit-twiddled IEEE-754 floats) and [`keys`] concatenates
//! components into compound keys whose byte order matches lexicographic
//! tuple order.

pub mod keys;
pub mod sortable;

#[cfg(test)]
mod proptest_tests;

pub use keys::Key;
