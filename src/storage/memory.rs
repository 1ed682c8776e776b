//! In-memory store: the default backend for tests and single-run cycles.

use super::traits::{StateStore, StorageError, StorageResult};
use crate::integration::{IntegrationId, IntegrationRecord};
use crate::review::{ReviewId, ReviewItem};
use dashmap::DashMap;

/// DashMap-backed store. Per-id atomicity comes from the map's per-entry
/// locking: `update_review` holds the entry guard for the whole closure.
#[derive(Debug, Default)]
pub struct MemoryStore {
    reviews: DashMap<ReviewId, ReviewItem>,
    records: DashMap<IntegrationId, IntegrationRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn put_review(&self, item: &ReviewItem) -> StorageResult<()> {
        self.reviews.insert(item.id, item.clone());
        Ok(())
    }

    fn get_review(&self, id: &ReviewId) -> StorageResult<Option<ReviewItem>> {
        Ok(self.reviews.get(id).map(|r| r.clone()))
    }

    fn list_reviews(&self) -> StorageResult<Vec<ReviewItem>> {
        Ok(self.reviews.iter().map(|r| r.value().clone()).collect())
    }

    fn delete_review(&self, id: &ReviewId) -> StorageResult<bool> {
        Ok(self.reviews.remove(id).is_some())
    }

    fn update_review(
        &self,
        id: &ReviewId,
        apply: &mut dyn FnMut(&mut ReviewItem) -> Result<(), String>,
    ) -> StorageResult<ReviewItem> {
        match self.reviews.get_mut(id) {
            Some(mut entry) => {
                apply(entry.value_mut()).map_err(StorageError::Conflict)?;
                Ok(entry.value().clone())
            }
            None => Err(StorageError::ReviewNotFound(id.to_string())),
        }
    }

    fn put_record(&self, record: &IntegrationRecord) -> StorageResult<()> {
        self.records.insert(record.id, record.clone());
        Ok(())
    }

    fn get_record(&self, id: &IntegrationId) -> StorageResult<Option<IntegrationRecord>> {
        Ok(self.records.get(id).map(|r| r.clone()))
    }

    fn list_records(&self) -> StorageResult<Vec<IntegrationRecord>> {
        Ok(self.records.iter().map(|r| r.value().clone()).collect())
    }

    fn update_record(
        &self,
        id: &IntegrationId,
        apply: &mut dyn FnMut(&mut IntegrationRecord) -> Result<(), String>,
    ) -> StorageResult<IntegrationRecord> {
        match self.records.get_mut(id) {
            Some(mut entry) => {
                apply(entry.value_mut()).map_err(StorageError::Conflict)?;
                Ok(entry.value().clone())
            }
            None => Err(StorageError::RecordNotFound(id.to_string())),
        }
    }
}
