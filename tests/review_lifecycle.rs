//! Review queue behavior through the engine surface: one-way transitions,
//! ordering, and the capacity policy.

mod common;

use common::{misfit_cluster, nesting_breaker, quiet_snapshot};
use ontogen::review::{Priority, ReviewStatus};
use ontogen::{Config, Domain, OntogenEngine, OntogenError};
use tempfile::TempDir;

// === Scenario: A decided item refuses every further decision ===

#[test]
fn decisions_are_one_way() {
    let dir = TempDir::new().unwrap();
    let engine = OntogenEngine::in_memory(Config::default(), dir.path()).unwrap();

    engine
        .run_cycle(&[nesting_breaker("x1", Domain::Living)])
        .unwrap();
    let pending = engine.list_pending_reviews().unwrap();
    let id = pending[0].id;

    engine.reject(&id, "ada", "needs a different axiom").unwrap();

    for attempt in [
        engine.approve(&id, "bob", None),
        engine.reject(&id, "bob", "again"),
    ] {
        match attempt {
            Err(OntogenError::Review(e)) => {
                assert!(e.to_string().contains("not pending"), "got: {}", e);
            }
            other => panic!("expected a state-conflict error, got {:?}", other.map(|i| i.status)),
        }
    }

    // No second mutation happened
    let stats = engine.review_stats().unwrap();
    assert_eq!(stats.by_status[&ReviewStatus::Rejected], 1);
}

// === Scenario: Pending list is strictly ordered ===

#[test]
fn pending_list_is_strictly_ordered() {
    let dir = TempDir::new().unwrap();
    let engine = OntogenEngine::in_memory(Config::default(), dir.path()).unwrap();

    // Mixed snapshot: critical nesting breakage, low tensions, medium
    // misfit cluster
    let mut entities = misfit_cluster(4);
    entities.push(nesting_breaker("x1", Domain::Living));
    entities.extend(quiet_snapshot());
    engine.run_cycle(&entities).unwrap();

    let pending = engine.list_pending_reviews().unwrap();
    assert!(pending.len() >= 3);

    for window in pending.windows(2) {
        let (a, b) = (&window[0], &window[1]);
        assert!(
            a.priority > b.priority
                || (a.priority == b.priority && a.created_at <= b.created_at),
            "ordering violated: {:?}/{} before {:?}/{}",
            a.priority,
            a.created_at,
            b.priority,
            b.created_at,
        );
    }
}

// === Scenario: Capacity policy expires exactly the oldest low items ===

fn low_gap() -> ontogen::analysis::Gap {
    use ontogen::analysis::{Gap, GapType, Severity, SuggestedAction};
    Gap::new(
        GapType::ClusteringAnomaly,
        Severity::Low,
        "small cross-domain bucket",
        SuggestedAction::ManualReview {
            reason: "inspect".into(),
        },
    )
}

#[test]
fn capacity_policy_expires_only_what_it_must() {
    use ontogen::review::ReviewWorkflow;
    use ontogen::storage::MemoryStore;
    use std::sync::Arc;

    let workflow = ReviewWorkflow::new(
        Arc::new(MemoryStore::new()),
        Config::default().with_max_pending(3),
    );

    let oldest = workflow.add_gap_only_review(low_gap()).unwrap();
    let kept_a = workflow.add_gap_only_review(low_gap()).unwrap();
    let kept_b = workflow.add_gap_only_review(low_gap()).unwrap();
    assert_eq!(workflow.list_pending().unwrap().len(), 3);

    // One more low item pushes the queue over capacity
    let newest = workflow.add_gap_only_review(low_gap()).unwrap();

    let pending = workflow.list_pending().unwrap();
    assert_eq!(pending.len(), 3);

    // Exactly the oldest expired; everything else survived
    for survivor in [&kept_a, &kept_b, &newest] {
        assert!(pending.iter().any(|p| p.id == survivor.id));
    }
    assert_eq!(
        workflow.get(&oldest.id).unwrap().unwrap().status,
        ReviewStatus::Expired
    );

    let stats = workflow.stats().unwrap();
    assert_eq!(stats.by_status[&ReviewStatus::Expired], 1);
    assert_eq!(stats.by_status[&ReviewStatus::Pending], 3);
}

// === Scenario: Low-priority floods never displace higher priorities ===

#[test]
fn capacity_policy_prefers_expiring_low_items() {
    use ontogen::analysis::{Gap, GapType, Severity, SuggestedAction};
    use ontogen::review::ReviewWorkflow;
    use ontogen::storage::MemoryStore;
    use ontogen::taxonomy::AxiomId;
    use std::sync::Arc;

    let workflow = ReviewWorkflow::new(
        Arc::new(MemoryStore::new()),
        Config::default().with_max_pending(2),
    );

    let critical = workflow
        .add_gap_only_review(Gap::new(
            GapType::RuleTension,
            Severity::Critical,
            "nesting broken",
            SuggestedAction::AxiomReview {
                axioms: vec![AxiomId::new("A3")],
                reason: "broken".into(),
            },
        ))
        .unwrap();
    let _first_low = workflow.add_gap_only_review(low_gap()).unwrap();
    let second_low = workflow.add_gap_only_review(low_gap()).unwrap();

    let pending = workflow.list_pending().unwrap();
    assert_eq!(pending.len(), 2);
    // The critical item survived; the oldest low item was expired instead
    assert_eq!(pending[0].id, critical.id);
    assert_eq!(pending[0].priority, Priority::Critical);
    assert_eq!(pending[1].id, second_low.id);
}
