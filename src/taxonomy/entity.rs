//! Entity representation: classified items with closure, scope, strata,
//! capabilities, relations, and uncertainty.

use serde::{Deserialize, Serialize};

/// Unique identifier for an entity within a snapshot.
///
/// Entity ids are assigned by the entity source, not by this crate, so they
/// are opaque strings rather than generated UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four ordered organizational strata. Each level presupposes all
/// lower levels: an entity at `Logos` is also at `Matter`, `Life`, and
/// `Sentience`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stratum {
    Matter,
    Life,
    Sentience,
    Logos,
}

impl Stratum {
    /// Canonical stratum order, lowest first.
    pub const ORDER: [Stratum; 4] = [
        Stratum::Matter,
        Stratum::Life,
        Stratum::Sentience,
        Stratum::Logos,
    ];

    /// Position in the canonical order (0 = Matter).
    pub fn level(&self) -> usize {
        match self {
            Stratum::Matter => 0,
            Stratum::Life => 1,
            Stratum::Sentience => 2,
            Stratum::Logos => 3,
        }
    }

    /// Canonical capabilities conferred by reaching this stratum.
    pub fn capabilities(&self) -> &'static [&'static str] {
        match self {
            Stratum::Matter => &["cohesion", "persistence"],
            Stratum::Life => &["metabolism", "self_repair"],
            Stratum::Sentience => &["perception", "affect"],
            Stratum::Logos => &["language", "normativity"],
        }
    }

    /// All capabilities belonging to every stratum strictly below this one,
    /// in canonical order. A capability emerging at `Sentience` requires all
    /// of these to already be present.
    pub fn required_below(&self) -> Vec<String> {
        Stratum::ORDER
            .iter()
            .take_while(|s| s.level() < self.level())
            .flat_map(|s| s.capabilities().iter().map(|c| c.to_string()))
            .collect()
    }
}

impl std::fmt::Display for Stratum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stratum::Matter => "matter",
            Stratum::Life => "life",
            Stratum::Sentience => "sentience",
            Stratum::Logos => "logos",
        };
        write!(f, "{}", name)
    }
}

/// Ordered boolean flags over the four strata.
///
/// Invariant: a well-formed profile is a contiguous prefix of the canonical
/// order — if a higher flag is set, every lower flag must be set too.
/// Profiles that break this are representable on purpose: the gap analyzer
/// detects them as critical rule tensions rather than refusing the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrataProfile {
    pub matter: bool,
    pub life: bool,
    pub sentience: bool,
    pub logos: bool,
}

impl StrataProfile {
    /// Profile with every stratum up to and including `highest` active.
    pub fn up_to(highest: Stratum) -> Self {
        let mut profile = Self::default();
        for s in Stratum::ORDER.iter().take(highest.level() + 1) {
            profile.set(*s, true);
        }
        profile
    }

    pub fn set(&mut self, stratum: Stratum, active: bool) {
        match stratum {
            Stratum::Matter => self.matter = active,
            Stratum::Life => self.life = active,
            Stratum::Sentience => self.sentience = active,
            Stratum::Logos => self.logos = active,
        }
    }

    pub fn is_active(&self, stratum: Stratum) -> bool {
        match stratum {
            Stratum::Matter => self.matter,
            Stratum::Life => self.life,
            Stratum::Sentience => self.sentience,
            Stratum::Logos => self.logos,
        }
    }

    /// Active strata in canonical order.
    pub fn active(&self) -> Vec<Stratum> {
        Stratum::ORDER
            .iter()
            .copied()
            .filter(|s| self.is_active(*s))
            .collect()
    }

    /// Highest active stratum, if any.
    pub fn highest_active(&self) -> Option<Stratum> {
        self.active().into_iter().last()
    }

    /// True if the active flags form a contiguous prefix of the canonical
    /// order (the strict nesting invariant).
    pub fn is_contiguous(&self) -> bool {
        let flags = [self.matter, self.life, self.sentience, self.logos];
        let mut seen_inactive = false;
        for active in flags {
            if active && seen_inactive {
                return false;
            }
            if !active {
                seen_inactive = true;
            }
        }
        true
    }
}

/// Fixed categorical tags grouping entities by nature/origin.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Inorganic,
    Living,
    Artifact,
    Institution,
    Symbolic,
}

impl Domain {
    /// All domains, in declaration order.
    pub const ALL: [Domain; 5] = [
        Domain::Inorganic,
        Domain::Living,
        Domain::Artifact,
        Domain::Institution,
        Domain::Symbolic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Domain::Inorganic => "inorganic",
            Domain::Living => "living",
            Domain::Artifact => "artifact",
            Domain::Institution => "institution",
            Domain::Symbolic => "symbolic",
        }
    }

    /// Typical (closure, scope) pair for entities of this domain.
    pub fn typical_profile(&self) -> (f64, f64) {
        match self {
            Domain::Inorganic => (0.2, 0.3),
            Domain::Living => (0.9, 0.4),
            Domain::Artifact => (0.3, 0.5),
            Domain::Institution => (0.6, 0.7),
            Domain::Symbolic => (0.4, 0.8),
        }
    }

    /// Whether this domain is exempt from the closure–scope tension rule.
    ///
    /// Living systems are the documented exemption: operational closure
    /// combined with broad relevance is their normal condition, not a
    /// taxonomy anomaly.
    pub fn tension_exempt(&self) -> bool {
        matches!(self, Domain::Living)
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Relation kinds the taxonomy already knows about. Kinds outside this set
/// are candidates for vocabulary extension once they recur.
pub const KNOWN_RELATION_KINDS: [&str; 6] = [
    "part_of",
    "depends_on",
    "produces",
    "regulates",
    "represents",
    "interacts_with",
];

/// A typed outgoing edge from one entity to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation kind (open vocabulary; see [`KNOWN_RELATION_KINDS`])
    pub kind: String,
    /// Target entity
    pub target: EntityId,
    /// Edge strength in [0, 1]
    pub strength: f32,
}

impl Relation {
    pub fn new(kind: impl Into<String>, target: impl Into<EntityId>, strength: f32) -> Self {
        Self {
            kind: kind.into(),
            target: target.into(),
            strength,
        }
    }
}

/// Configuration record of an entity: the continuous and structural
/// descriptors the analyzers read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Degree of self-maintenance in [0, 1]
    pub closure: f64,
    /// Breadth of relevance, normalized to [0, 1]
    pub scope: f64,
    /// Ordered stratum flags
    pub strata: StrataProfile,
    /// Capability flags (canonical names plus any extensions)
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Outgoing typed relations
    #[serde(default)]
    pub relations: Vec<Relation>,
    /// Classification uncertainty in [0, 1]
    #[serde(default)]
    pub uncertainty: f64,
}

impl EntityConfig {
    pub fn new(closure: f64, scope: f64, strata: StrataProfile) -> Self {
        Self {
            closure,
            scope,
            strata,
            capabilities: Vec::new(),
            relations: Vec::new(),
            uncertainty: 0.0,
        }
    }
}

/// A classified entity: the unit of input to the analysis cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub domain: Domain,
    pub config: EntityConfig,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>, domain: Domain) -> Self {
        let (closure, scope) = domain.typical_profile();
        Self {
            id: id.into(),
            name: name.into(),
            domain,
            config: EntityConfig::new(closure, scope, StrataProfile::up_to(Stratum::Matter)),
        }
    }

    pub fn with_closure(mut self, closure: f64) -> Self {
        self.config.closure = closure;
        self
    }

    pub fn with_scope(mut self, scope: f64) -> Self {
        self.config.scope = scope;
        self
    }

    pub fn with_strata(mut self, strata: StrataProfile) -> Self {
        self.config.strata = strata;
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.config.relations.push(relation);
        self
    }

    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.config.capabilities.push(capability.into());
        self
    }

    pub fn with_uncertainty(mut self, uncertainty: f64) -> Self {
        self.config.uncertainty = uncertainty;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strata_profile_contiguous_prefix() {
        assert!(StrataProfile::up_to(Stratum::Sentience).is_contiguous());
        assert!(StrataProfile::default().is_contiguous());

        let mut broken = StrataProfile::up_to(Stratum::Matter);
        broken.set(Stratum::Logos, true);
        assert!(!broken.is_contiguous());
    }

    #[test]
    fn strata_profile_highest_active() {
        let profile = StrataProfile::up_to(Stratum::Life);
        assert_eq!(profile.highest_active(), Some(Stratum::Life));
        assert_eq!(profile.active(), vec![Stratum::Matter, Stratum::Life]);
        assert_eq!(StrataProfile::default().highest_active(), None);
    }

    #[test]
    fn required_below_accumulates_lower_capabilities() {
        assert!(Stratum::Matter.required_below().is_empty());
        assert_eq!(
            Stratum::Sentience.required_below(),
            vec!["cohesion", "persistence", "metabolism", "self_repair"]
        );
    }

    #[test]
    fn only_living_is_tension_exempt() {
        let exempt: Vec<Domain> = Domain::ALL
            .iter()
            .copied()
            .filter(|d| d.tension_exempt())
            .collect();
        assert_eq!(exempt, vec![Domain::Living]);
    }

    #[test]
    fn entity_builder_defaults_to_domain_profile() {
        let e = Entity::new("e1", "granite", Domain::Inorganic);
        assert_eq!(e.config.closure, 0.2);
        assert_eq!(e.config.scope, 0.3);
        assert!(e.config.strata.matter);
    }
}
