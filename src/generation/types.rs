//! Artifact types: structured proposals for extending the taxonomy.

use crate::analysis::GapId;
use crate::taxonomy::{ArtifactKind, AxiomId, Stratum};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId(Uuid);

impl ArtifactId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Proposed new domain: a typical descriptor pair plus the strata it is
/// compatible with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSpec {
    pub name: String,
    pub description: String,
    pub typical_closure: f64,
    pub typical_scope: f64,
    /// Must be a contiguous prefix of the canonical stratum order
    pub compatible_strata: Vec<Stratum>,
}

/// Proposed new capability and the stratum it emerges from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySpec {
    pub name: String,
    pub description: String,
    pub emerges_at: Stratum,
    /// Every capability of every stratum below the emergence point
    pub requires: Vec<String>,
}

/// Proposed new relation type with declared algebraic properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationTypeSpec {
    pub name: String,
    pub description: String,
    pub symmetric: bool,
    pub transitive: bool,
    pub examples: Vec<String>,
}

/// Proposed data connector. Always generated inert: `enabled` is false and
/// the rendered skeleton never activates itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorSpec {
    pub name: String,
    pub url: String,
    pub query_format: String,
    pub enabled: bool,
}

/// Typed artifact payload, one variant per generation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactPayload {
    Domain(DomainSpec),
    Capability(CapabilitySpec),
    RelationType(RelationTypeSpec),
    Connector(ConnectorSpec),
}

impl ArtifactPayload {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactPayload::Domain(_) => ArtifactKind::NewDomain,
            ArtifactPayload::Capability(_) => ArtifactKind::NewCapability,
            ArtifactPayload::RelationType(_) => ArtifactKind::NewRelationType,
            ArtifactPayload::Connector(_) => ArtifactKind::NewConnector,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ArtifactPayload::Domain(spec) => &spec.name,
            ArtifactPayload::Capability(spec) => &spec.name,
            ArtifactPayload::RelationType(spec) => &spec.name,
            ArtifactPayload::Connector(spec) => &spec.name,
        }
    }
}

/// How an artifact is applied to its target location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum InsertStrategy {
    /// Add at the end of the target
    Append,
    /// Substitute the marker text with the rendered content
    ReplaceAtMarker { marker: String },
    /// Insert after a named marker, falling back to append
    InsertAfterMarker { marker: String },
    /// Insert before a named marker, falling back to prepend
    InsertBeforeMarker { marker: String },
    /// The target must not exist yet
    CreateNewFile,
}

/// Self-declared status of one axiom for a generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JustificationStatus {
    Respected,
    NotApplicable,
    NeedsReview,
}

/// One line of the generator's self-justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JustificationEntry {
    pub axiom: AxiomId,
    pub status: JustificationStatus,
    pub note: String,
}

/// The generator's advisory self-assessment against the axiom table.
/// Input to the validator, never a substitute for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Justification {
    pub entries: Vec<JustificationEntry>,
    /// Overall compliance estimate in [0, 1]
    pub compliance: f64,
}

/// A structured, machine-generated proposal to extend the taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    pub id: ArtifactId,
    pub name: String,
    pub payload: ArtifactPayload,
    pub target_location: String,
    pub strategy: InsertStrategy,
    pub dependencies: Vec<String>,
    pub justification: Justification,
    /// The gap this artifact answers
    pub source_gap: GapId,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedArtifact {
    pub fn kind(&self) -> ArtifactKind {
        self.payload.kind()
    }
}

/// Error types for candidate generation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("gap '{id}' is malformed: {message}")]
    InvalidGap { id: GapId, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}
