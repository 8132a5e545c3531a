//! Document store gateway.
//!
//! [`ListingStore`] is the narrow capability set the HTTP layer depends on; [`StoreGateway`]
//! implements it with the MongoDB driver.

pub mod client;
pub(crate) mod document;
pub mod types;

use crate::listing::{Listing, ListingDocument, ListingId};
use async_trait::async_trait;

pub use client::{StoreGateway, StoreSettings};
pub use types::{ReplaceSummary, StoreError};

/// Capabilities consumed from the document store.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// Store a new document and return the identifier the store assigned to it.
    async fn insert(&self, document: ListingDocument) -> Result<ListingId, StoreError>;

    /// Fetch one listing; [`StoreError::NotFound`] when no document has that id.
    async fn find_by_id(&self, id: &ListingId) -> Result<Listing, StoreError>;

    /// Overwrite the whole document at `id`; unmatched ids report `matched == 0`.
    async fn replace_by_id(
        &self,
        id: &ListingId,
        document: ListingDocument,
    ) -> Result<ReplaceSummary, StoreError>;

    /// Remove the document at `id`, returning how many documents were deleted.
    async fn delete_by_id(&self, id: &ListingId) -> Result<u64, StoreError>;

    /// Every stored listing, in store-defined order.
    async fn find_all(&self) -> Result<Vec<Listing>, StoreError>;

    /// Confirm the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
