//! The immutable axiom table: versioned rules that every proposed taxonomy
//! extension is validated against.
//!
//! The table is loaded once at startup (builtin or from YAML) and is
//! read-only for the lifetime of the process. Authoring the axioms
//! themselves happens outside this crate.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading the axiom table.
#[derive(Debug, Error)]
pub enum AxiomError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("axiom table is empty")]
    EmptyTable,

    #[error("duplicate axiom id: {0}")]
    DuplicateId(String),
}

/// The kinds of taxonomy extension an artifact can propose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    NewDomain,
    NewCapability,
    NewRelationType,
    NewConnector,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::NewDomain,
        ArtifactKind::NewCapability,
        ArtifactKind::NewRelationType,
        ArtifactKind::NewConnector,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::NewDomain => "new_domain",
            ArtifactKind::NewCapability => "new_capability",
            ArtifactKind::NewRelationType => "new_relation_type",
            ArtifactKind::NewConnector => "new_connector",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Identifier of an axiom in the table (e.g. "A3").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxiomId(String);

impl AxiomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AxiomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for AxiomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The structural predicate an axiom names. The validator dispatches on
/// this exhaustively — there is no default case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxiomCheck {
    /// Payload must carry the essential descriptor fields for its kind
    DescriptorCompleteness,
    /// Closure and scope both high requires human review
    ClosureScopeTension,
    /// Strata must form a contiguous prefix of the canonical order
    StratumNesting,
    /// A capability presupposes every capability of the strata below it
    CapabilityGrounding,
    /// Proposed names must not collide with existing names of the same kind
    NoDuplication,
    /// Near-duplicate names must be verified as irreducible
    Minimality,
    /// Relation types must declare symmetry and transitivity
    RelationTyping,
    /// Connectors are inert until explicitly activated by a human
    ConnectorInertness,
}

/// One immutable rule in the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axiom {
    pub id: AxiomId,
    pub name: String,
    /// Human-readable statement of the rule
    pub statement: String,
    /// Artifact kinds this axiom applies to. Empty means it applies to
    /// every kind.
    #[serde(default)]
    pub applicability: Vec<ArtifactKind>,
    pub check: AxiomCheck,
}

impl Axiom {
    pub fn applies_to(&self, kind: ArtifactKind) -> bool {
        self.applicability.is_empty() || self.applicability.contains(&kind)
    }
}

/// The frozen, ordered axiom table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxiomTable {
    version: String,
    axioms: Vec<Axiom>,
}

impl AxiomTable {
    /// The builtin table shipped with the crate.
    pub fn builtin() -> Self {
        let axiom = |id: &str, name: &str, statement: &str, applicability: &[ArtifactKind], check| {
            Axiom {
                id: AxiomId::new(id),
                name: name.to_string(),
                statement: statement.to_string(),
                applicability: applicability.to_vec(),
                check,
            }
        };

        Self {
            version: "1".to_string(),
            axioms: vec![
                axiom(
                    "A1",
                    "descriptor-completeness",
                    "Every proposed domain declares a typical closure and scope.",
                    &[ArtifactKind::NewDomain],
                    AxiomCheck::DescriptorCompleteness,
                ),
                axiom(
                    "A2",
                    "closure-scope-tension",
                    "High closure combined with high scope requires human review.",
                    &[ArtifactKind::NewDomain],
                    AxiomCheck::ClosureScopeTension,
                ),
                axiom(
                    "A3",
                    "stratum-nesting",
                    "Strata form a strict nesting: a higher stratum presupposes all lower strata.",
                    &[ArtifactKind::NewDomain, ArtifactKind::NewCapability],
                    AxiomCheck::StratumNesting,
                ),
                axiom(
                    "A4",
                    "capability-grounding",
                    "A capability emerging at a stratum requires every capability of the strata below it.",
                    &[ArtifactKind::NewCapability],
                    AxiomCheck::CapabilityGrounding,
                ),
                axiom(
                    "A5",
                    "no-duplication",
                    "Proposed names must not collide with existing names of the same kind.",
                    &[],
                    AxiomCheck::NoDuplication,
                ),
                axiom(
                    "A6",
                    "minimality",
                    "The taxonomy grows only by irreducible additions.",
                    &[],
                    AxiomCheck::Minimality,
                ),
                axiom(
                    "A7",
                    "relation-typing",
                    "Every relation type declares whether it is symmetric and transitive.",
                    &[ArtifactKind::NewRelationType],
                    AxiomCheck::RelationTyping,
                ),
                axiom(
                    "A8",
                    "connector-inertness",
                    "Data connectors are inert until a human activates them.",
                    &[ArtifactKind::NewConnector],
                    AxiomCheck::ConnectorInertness,
                ),
            ],
        }
    }

    /// Load a table from a YAML file, validating non-emptiness and id
    /// uniqueness.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, AxiomError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse a table from a YAML string.
    pub fn from_yaml_str(content: &str) -> Result<Self, AxiomError> {
        let table: AxiomTable = serde_yaml::from_str(content)?;
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), AxiomError> {
        if self.axioms.is_empty() {
            return Err(AxiomError::EmptyTable);
        }
        let mut seen = std::collections::HashSet::new();
        for axiom in &self.axioms {
            if !seen.insert(axiom.id.as_str().to_string()) {
                return Err(AxiomError::DuplicateId(axiom.id.as_str().to_string()));
            }
        }
        Ok(())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn get(&self, id: &AxiomId) -> Option<&Axiom> {
        self.axioms.iter().find(|a| &a.id == id)
    }

    /// Axioms applicable to the given artifact kind, in table order.
    pub fn applicable_to(&self, kind: ArtifactKind) -> Vec<&Axiom> {
        self.axioms.iter().filter(|a| a.applies_to(kind)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Axiom> {
        self.axioms.iter()
    }

    pub fn len(&self) -> usize {
        self.axioms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axioms.is_empty()
    }
}
