//! Validation result types.

use crate::taxonomy::AxiomId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A blocking finding: the artifact breaks an axiom.
///
/// Every violation blocks validity. `fatal` marks the subset that cannot
/// be repaired by reviewer edits (broken nesting, name collisions) —
/// non-fatal violations are candidates for modify-and-approve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub axiom: AxiomId,
    pub message: String,
    pub fatal: bool,
}

/// A non-blocking finding. `requires_review` flags the warnings a human
/// must look at before the artifact integrates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub axiom: AxiomId,
    pub message: String,
    pub requires_review: bool,
}

/// Outcome of validating one artifact against the axiom table.
///
/// Produced once per artifact and never mutated; re-validation produces a
/// fresh result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff there are no violations
    pub valid: bool,
    /// `passed / applicable − 0.1 × review-flagged warnings`, floored at 0
    pub score: f64,
    pub violations: Vec<Violation>,
    pub warnings: Vec<ValidationWarning>,
    /// Axioms whose predicate passed with no findings
    pub passed_axioms: Vec<AxiomId>,
    /// True iff a review-flagged warning or a non-fatal violation exists
    pub requires_human_review: bool,
    pub validated_at: DateTime<Utc>,
}

impl ValidationResult {
    pub fn has_fatal_violation(&self) -> bool {
        self.violations.iter().any(|v| v.fatal)
    }
}
