//! Error types for the store crate.

use thiserror::Error;

use strata_core::CoreError;

/// Errors that can occur when operating on streams and the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A core validation, type-mismatch, or encoding error occurred.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A requested namespace, type, stream, view, key, or index was absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// An insert collided with an event already stored at the same key.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// A count or interval argument was out of range.
    #[error("range error: {0}")]
    Range(String),
}

impl StoreError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Creates a duplicate-key error.
    #[must_use]
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    /// Creates a range error.
    #[must_use]
    pub fn range(msg: impl Into<String>) -> Self {
        Self::Range(msg.into())
    }
}
