//! Storage trait definitions for the review table and integration ledger.

use crate::integration::{IntegrationId, IntegrationRecord};
use crate::review::{ReviewId, ReviewItem};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Review item not found: {0}")]
    ReviewNotFound(String),

    #[error("Integration record not found: {0}")]
    RecordNotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A plain serializable snapshot of everything the process must survive a
/// restart with. No schema versioning beyond the literal structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub review_items: Vec<ReviewItem>,
    pub integration_history: Vec<IntegrationRecord>,
}

/// Trait for review/ledger storage backends.
///
/// Implementations must be thread-safe (Send + Sync) and must make
/// `update_review` atomic per item id: two concurrent updates to the same
/// id are serialized, and the closure observes the latest state.
pub trait StateStore: Send + Sync {
    // === Review item operations ===

    /// Insert or replace a review item
    fn put_review(&self, item: &ReviewItem) -> StorageResult<()>;

    /// Load a review item by id
    fn get_review(&self, id: &ReviewId) -> StorageResult<Option<ReviewItem>>;

    /// All review items, in no particular order
    fn list_reviews(&self) -> StorageResult<Vec<ReviewItem>>;

    /// Delete a review item; returns whether it existed
    fn delete_review(&self, id: &ReviewId) -> StorageResult<bool>;

    /// Atomically mutate a review item in place.
    ///
    /// The closure may refuse with a reason string, which surfaces as
    /// [`StorageError::Conflict`] and leaves the item untouched.
    fn update_review(
        &self,
        id: &ReviewId,
        apply: &mut dyn FnMut(&mut ReviewItem) -> Result<(), String>,
    ) -> StorageResult<ReviewItem>;

    // === Integration ledger operations ===

    /// Append or replace a ledger record
    fn put_record(&self, record: &IntegrationRecord) -> StorageResult<()>;

    /// Load a ledger record by id
    fn get_record(&self, id: &IntegrationId) -> StorageResult<Option<IntegrationRecord>>;

    /// All ledger records, in no particular order
    fn list_records(&self) -> StorageResult<Vec<IntegrationRecord>>;

    /// Atomically mutate a ledger record in place
    fn update_record(
        &self,
        id: &IntegrationId,
        apply: &mut dyn FnMut(&mut IntegrationRecord) -> Result<(), String>,
    ) -> StorageResult<IntegrationRecord>;

    // === Snapshot operations ===

    /// Export the full persisted state
    fn export_state(&self) -> StorageResult<StateSnapshot> {
        Ok(StateSnapshot {
            review_items: self.list_reviews()?,
            integration_history: self.list_records()?,
        })
    }

    /// Import a snapshot, replacing nothing — items are upserted by id
    fn import_state(&self, snapshot: &StateSnapshot) -> StorageResult<()> {
        for item in &snapshot.review_items {
            self.put_review(item)?;
        }
        for record in &snapshot.integration_history {
            self.put_record(record)?;
        }
        Ok(())
    }
}
