//! Core types for the gap analysis pipeline.

use crate::taxonomy::{AxiomId, AxiomTable, Entity, EntityId, Stratum};
use crate::Config;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a detected gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GapId(Uuid);

impl GapId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for GapId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of anomaly a gap describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    DomainMisfit,
    CapabilityMissing,
    RelationPattern,
    StratumBoundary,
    ClusteringAnomaly,
    RuleTension,
}

impl std::fmt::Display for GapType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GapType::DomainMisfit => "domain_misfit",
            GapType::CapabilityMissing => "capability_missing",
            GapType::RelationPattern => "relation_pattern",
            GapType::StratumBoundary => "stratum_boundary",
            GapType::ClusteringAnomaly => "clustering_anomaly",
            GapType::RuleTension => "rule_tension",
        };
        write!(f, "{}", name)
    }
}

/// How serious a gap is. Ordering is ascending: `Low < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// One piece of evidence supporting a gap: a metric that crossed a
/// threshold, optionally tied to a specific entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityId>,
    pub metric: String,
    pub value: f64,
    pub threshold: f64,
    pub context: String,
}

impl Evidence {
    pub fn new(metric: impl Into<String>, value: f64, threshold: f64) -> Self {
        Self {
            entity: None,
            metric: metric.into(),
            value,
            threshold,
            context: String::new(),
        }
    }

    pub fn for_entity(mut self, entity: EntityId) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

/// What the analyzer suggests doing about a gap.
///
/// `Generate*` variants feed the candidate generator; `ManualReview` and
/// `AxiomReview` never produce artifacts, only review items. The generator
/// and workflow match on this exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum SuggestedAction {
    GenerateDomain {
        name_hint: String,
        /// Free-text characteristics the generator mines for keyword polarity
        characteristics: Vec<String>,
    },
    GenerateCapability {
        name_hint: String,
        description: String,
        emerges_at: Stratum,
    },
    GenerateRelationType {
        name_hint: String,
        examples: Vec<String>,
    },
    GenerateConnector {
        name_hint: String,
        url: String,
        query_format: String,
    },
    ManualReview {
        reason: String,
    },
    AxiomReview {
        axioms: Vec<AxiomId>,
        reason: String,
    },
}

impl SuggestedAction {
    /// True for actions that route to the candidate generator.
    pub fn is_generative(&self) -> bool {
        matches!(
            self,
            SuggestedAction::GenerateDomain { .. }
                | SuggestedAction::GenerateCapability { .. }
                | SuggestedAction::GenerateRelationType { .. }
                | SuggestedAction::GenerateConnector { .. }
        )
    }
}

/// A detected anomaly suggesting the taxonomy is incomplete or
/// inconsistent. Immutable once created; never deleted, only referenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub id: GapId,
    pub gap_type: GapType,
    pub severity: Severity,
    pub description: String,
    pub evidence: Vec<Evidence>,
    pub suggested_action: SuggestedAction,
    /// Detector confidence in [0, 1]
    pub confidence: f64,
    pub detected_at: DateTime<Utc>,
}

impl Gap {
    pub fn new(
        gap_type: GapType,
        severity: Severity,
        description: impl Into<String>,
        suggested_action: SuggestedAction,
    ) -> Self {
        Self {
            id: GapId::new(),
            gap_type,
            severity,
            description: description.into(),
            evidence: Vec::new(),
            suggested_action,
            confidence: 1.0,
            detected_at: Utc::now(),
        }
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence.push(evidence);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

/// Read-only view handed to every detector: the entity snapshot plus the
/// frozen reference data and thresholds.
pub struct AnalysisSnapshot<'a> {
    pub entities: &'a [Entity],
    pub config: &'a Config,
    pub axioms: &'a AxiomTable,
}

/// Output of one full analysis pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GapAnalysisResult {
    pub gaps: Vec<Gap>,
    pub by_type: HashMap<GapType, usize>,
    pub by_severity: HashMap<Severity, usize>,
    /// Non-fatal detector failures (the pass continued without them)
    pub warnings: Vec<String>,
}

impl GapAnalysisResult {
    pub fn new(gaps: Vec<Gap>, warnings: Vec<String>) -> Self {
        let mut by_type: HashMap<GapType, usize> = HashMap::new();
        let mut by_severity: HashMap<Severity, usize> = HashMap::new();
        for gap in &gaps {
            *by_type.entry(gap.gap_type).or_insert(0) += 1;
            *by_severity.entry(gap.severity).or_insert(0) += 1;
        }
        Self {
            gaps,
            by_type,
            by_severity,
            warnings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }
}

/// Error types for analysis.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error("detector '{id}' failed: {message}")]
    Detector { id: String, message: String },

    #[error("invalid entity '{0}': {1}")]
    InvalidEntity(String, String),

    #[error("internal error: {0}")]
    Internal(String),
}
