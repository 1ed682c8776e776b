//! Review item types: the unit of human-in-the-loop decision making.

use crate::analysis::{Gap, Severity};
use crate::generation::{ArtifactPayload, GeneratedArtifact};
use crate::storage::StorageError;
use crate::validation::ValidationResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a review item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewId(Uuid);

impl ReviewId {
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

impl Default for ReviewId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReviewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of decision the item asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewKind {
    /// An artifact with its validation, up for approval
    ArtifactReview,
    /// A gap with no integrable artifact (none generated, or validation
    /// rejected it)
    GapOnlyReview,
    /// A critical rule tension that questions an axiom itself
    RuleTensionReview,
}

/// Review lifecycle. `Pending` is the only non-terminal state; every
/// transition out of it is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
    Modified,
    Expired,
}

impl ReviewStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReviewStatus::Pending)
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Approved => "approved",
            ReviewStatus::Rejected => "rejected",
            ReviewStatus::Modified => "modified",
            ReviewStatus::Expired => "expired",
        };
        write!(f, "{}", name)
    }
}

/// Queue priority. Ordering is ascending: `Low < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl From<Severity> for Priority {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => Priority::Low,
            Severity::Medium => Priority::Medium,
            Severity::High => Priority::High,
            Severity::Critical => Priority::Critical,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        };
        write!(f, "{}", name)
    }
}

/// The decision a reviewer took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
    Modified,
}

/// Reviewer feedback recorded on a decided item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewerFeedback {
    pub decision: ReviewDecision,
    pub reviewer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// The edited payload, when the decision was `Modified`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_payload: Option<ArtifactPayload>,
}

/// One unit of human decision making, wrapping a gap and optionally an
/// artifact with its validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub id: ReviewId,
    pub kind: ReviewKind,
    pub status: ReviewStatus,
    pub gap: Gap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<GeneratedArtifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<ReviewerFeedback>,
}

/// Counts over the review table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewStats {
    pub total: usize,
    pub pending: usize,
    pub by_status: std::collections::HashMap<ReviewStatus, usize>,
    pub by_priority: std::collections::HashMap<Priority, usize>,
}

/// Error types for the review workflow.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("review item not found: {0}")]
    NotFound(ReviewId),

    #[error("review item {id} is {status}, not pending")]
    InvalidState { id: ReviewId, status: ReviewStatus },

    #[error("item {0} carries no artifact to modify")]
    NoArtifact(ReviewId),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
