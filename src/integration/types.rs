//! Integration ledger types.

use crate::generation::ArtifactId;
use crate::review::{ReviewId, ReviewStatus};
use crate::storage::StorageError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for an integration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntegrationId(Uuid);

impl IntegrationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for IntegrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IntegrationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an integration attempt did to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationAction {
    Created,
    Modified,
    Failed,
}

/// Outcome of one integration attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationResult {
    pub success: bool,
    pub action: IntegrationAction,
    /// Ledger record id, present on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record: Option<IntegrationId>,
    /// Backup taken before the write, retained even when the write failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntegrationResult {
    pub fn failed(error: impl Into<String>, backup: Option<PathBuf>) -> Self {
        Self {
            success: false,
            action: IntegrationAction::Failed,
            record: None,
            backup,
            error: Some(error.into()),
        }
    }
}

/// Audit entry for one successful apply. Retained forever; a rollback
/// flips `rollback_possible` instead of deleting the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationRecord {
    pub id: IntegrationId,
    pub review_item: ReviewId,
    pub artifact: ArtifactId,
    pub target_location: String,
    pub action: IntegrationAction,
    pub integrated_at: DateTime<Utc>,
    pub integrated_by: String,
    pub rollback_possible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<PathBuf>,
}

/// Error types for integration.
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("review item {id} is {status}; only approved or modified items integrate")]
    InvalidState { id: ReviewId, status: ReviewStatus },

    #[error("review item {0} carries no artifact")]
    MissingArtifact(ReviewId),

    #[error("integration record not found: {0}")]
    RecordNotFound(IntegrationId),

    #[error("integration {0} is not rollbackable")]
    NotRollbackable(IntegrationId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
