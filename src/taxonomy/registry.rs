//! Registry of existing names per artifact kind.
//!
//! Seeded from the frozen taxonomy (domains, canonical capabilities, known
//! relation kinds) and extended as approved artifacts are integrated. The
//! duplication and minimality checks read from here.

use super::axiom::ArtifactKind;
use super::entity::{Domain, Stratum, KNOWN_RELATION_KINDS};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Names the taxonomy already carries, grouped by the artifact kind that
/// would collide with them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameRegistry {
    names: HashMap<ArtifactKind, Vec<String>>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with the frozen taxonomy's names.
    pub fn seeded() -> Self {
        let mut registry = Self::new();
        for domain in Domain::ALL {
            registry.insert(ArtifactKind::NewDomain, domain.name());
        }
        for stratum in Stratum::ORDER {
            for capability in stratum.capabilities() {
                registry.insert(ArtifactKind::NewCapability, *capability);
            }
        }
        for kind in KNOWN_RELATION_KINDS {
            registry.insert(ArtifactKind::NewRelationType, kind);
        }
        registry
    }

    pub fn insert(&mut self, kind: ArtifactKind, name: impl Into<String>) {
        self.names.entry(kind).or_default().push(name.into());
    }

    /// Existing names for a kind, in insertion order.
    pub fn names_for(&self, kind: ArtifactKind) -> &[String] {
        self.names.get(&kind).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, kind: ArtifactKind, name: &str) -> bool {
        let lowered = name.to_lowercase();
        self.names_for(kind)
            .iter()
            .any(|existing| existing.to_lowercase() == lowered)
    }
}
