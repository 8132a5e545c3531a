//! Error vocabulary shared by the document store gateway and its callers.

use std::time::Duration;
use thiserror::Error;

/// Errors returned while interacting with the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No document exists for the requested identifier.
    #[error("Listing not found")]
    NotFound,
    /// The driver failed to reach the store or the store rejected the operation.
    #[error("Store request failed: {0}")]
    Driver(#[from] mongodb::error::Error),
    /// An attribute value could not be encoded as BSON.
    #[error("Failed to encode listing: {0}")]
    Encoding(#[from] mongodb::bson::ser::Error),
    /// A stored document could not be translated into a listing.
    #[error("Malformed store document: {0}")]
    MalformedDocument(String),
    /// The store did not answer within the configured bound.
    #[error("Store did not respond within {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    /// Whether the failure is on the store side rather than a missing document.
    pub fn is_transport(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

/// Match and modification counts reported by a replace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceSummary {
    /// Documents whose identifier matched (0 or 1).
    pub matched: u64,
    /// Documents whose contents actually changed (0 or 1).
    pub modified: u64,
}
