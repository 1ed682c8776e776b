//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use ontogen::{Domain, Entity, Relation, StrataProfile, Stratum};

/// Entities sitting exactly on their domain's typical profile. A cycle
/// over these detects nothing.
pub fn quiet_snapshot() -> Vec<Entity> {
    vec![
        Entity::new("q1", "granite", Domain::Inorganic),
        Entity::new("q2", "fox", Domain::Living),
        Entity::new("q3", "loom", Domain::Artifact),
        Entity::new("q4", "guild", Domain::Institution),
        Entity::new("q5", "alphabet", Domain::Symbolic),
    ]
}

/// A tight cluster of entities that fit no existing domain: high closure
/// and scope inside the inorganic domain.
pub fn misfit_cluster(n: usize) -> Vec<Entity> {
    (0..n)
        .map(|i| {
            Entity::new(format!("m{}", i), format!("oddity-{}", i), Domain::Inorganic)
                .with_closure(0.9)
                .with_scope(0.8)
        })
        .collect()
}

/// An entity whose strata break the strict nesting invariant
/// (logos active without life or sentience).
pub fn nesting_breaker(id: &str, domain: Domain) -> Entity {
    let mut strata = StrataProfile::up_to(Stratum::Matter);
    strata.set(Stratum::Logos, true);
    Entity::new(id, format!("broken-{}", id), domain)
        .with_closure(0.85)
        .with_scope(0.75)
        .with_strata(strata)
}

/// Entities sharing an unknown relation kind often enough to trip the
/// vocabulary detector.
pub fn unknown_relation_users(kind: &str, n: usize) -> Vec<Entity> {
    (0..n)
        .map(|i| {
            Entity::new(format!("r{}", i), format!("node-{}", i), Domain::Living)
                .with_relation(Relation::new(kind, format!("r{}", (i + 1) % n), 0.5))
        })
        .collect()
}
