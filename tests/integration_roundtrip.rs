//! Integration behavior through the engine surface: create vs modify,
//! backups, byte-exact rollback, and the persisted-state round trip.

mod common;

use common::misfit_cluster;
use ontogen::review::ReviewStatus;
use ontogen::storage::{SqliteStore, StateStore};
use ontogen::{AxiomTable, Config, OntogenEngine};
use std::sync::Arc;
use tempfile::TempDir;

fn engine(dir: &TempDir) -> OntogenEngine {
    OntogenEngine::in_memory(Config::default(), dir.path()).unwrap()
}

/// Run a cycle over a misfit cluster and approve the artifact review.
fn approve_one_artifact(engine: &OntogenEngine) -> ontogen::review::ReviewId {
    engine.run_cycle(&misfit_cluster(4)).unwrap();
    let pending = engine.list_pending_reviews().unwrap();
    let item = pending
        .iter()
        .find(|i| i.artifact.is_some())
        .expect("artifact review queued");
    engine.approve(&item.id, "ada", None).unwrap();
    item.id
}

// === Scenario: Integrating into a missing target creates it ===

#[tokio::test]
async fn missing_target_is_created() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);

    let id = approve_one_artifact(&engine);
    let result = engine.integrate_approved(&id).await.unwrap();

    assert!(result.success);
    assert_eq!(result.action, ontogen::integration::IntegrationAction::Created);
    assert!(result.backup.is_none());
    assert!(dir.path().join("taxonomy/domains.yaml").exists());

    // The integrated item has left the queue for good; only gap-only
    // tension reviews remain
    assert!(engine
        .list_pending_reviews()
        .unwrap()
        .iter()
        .all(|i| i.artifact.is_none()));
    let stats = engine.review_stats().unwrap();
    assert_eq!(stats.by_status.get(&ReviewStatus::Approved), None);
}

// === Scenario: Integrating into an existing target modifies with backup ===

#[tokio::test]
async fn existing_target_is_backed_up_and_modified() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("taxonomy")).unwrap();
    let original = "# frozen domains\ndomains: [living, artifact]\n";
    std::fs::write(dir.path().join("taxonomy/domains.yaml"), original).unwrap();

    let engine = engine(&dir);
    let id = approve_one_artifact(&engine);
    let result = engine.integrate_approved(&id).await.unwrap();

    assert!(result.success);
    assert_eq!(result.action, ontogen::integration::IntegrationAction::Modified);
    let backup = result.backup.expect("backup path recorded");
    assert_eq!(std::fs::read_to_string(backup).unwrap(), original);

    let after = std::fs::read_to_string(dir.path().join("taxonomy/domains.yaml")).unwrap();
    assert!(after.starts_with(original));
    assert!(after.len() > original.len());
}

// === Scenario: Integrate then rollback restores bytes exactly ===

#[tokio::test]
async fn rollback_round_trip_is_byte_exact() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("taxonomy")).unwrap();
    let original = "domains:\n  - living\n  - symbolic\n";
    std::fs::write(dir.path().join("taxonomy/domains.yaml"), original).unwrap();

    let engine = engine(&dir);
    let id = approve_one_artifact(&engine);
    let result = engine.integrate_approved(&id).await.unwrap();
    let record_id = result.record.expect("record written");

    assert!(engine.rollback(&record_id).await.unwrap());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("taxonomy/domains.yaml")).unwrap(),
        original
    );

    // The record survives for audit, no longer rollbackable
    let history = engine.integration_history().unwrap();
    let record = history.iter().find(|r| r.id == record_id).unwrap();
    assert!(!record.rollback_possible);

    let second = engine.rollback(&record_id).await;
    assert!(second.is_err(), "second rollback must be refused");
}

// === Scenario: integrate_all drains every approval, reporting per-item ===

#[tokio::test]
async fn integrate_all_reports_per_item() {
    let dir = TempDir::new().unwrap();
    let engine = engine(&dir);

    engine.run_cycle(&misfit_cluster(4)).unwrap();
    let pending = engine.list_pending_reviews().unwrap();
    // Approve everything with an artifact; gap-only items stay pending
    for item in pending.iter().filter(|i| i.artifact.is_some()) {
        engine.approve(&item.id, "ada", None).unwrap();
    }

    let results = engine.integrate_all_approved().await.unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.success));

    // Nothing approved is left behind
    let again = engine.integrate_all_approved().await.unwrap();
    assert!(again.is_empty());
}

// === Scenario: State snapshot survives a simulated restart on SQLite ===

#[test]
fn sqlite_state_survives_restart() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("state.db");

    let before = {
        let store = Arc::new(SqliteStore::open(&db_path).unwrap());
        let engine = OntogenEngine::new(
            Config::default(),
            AxiomTable::builtin(),
            store,
            dir.path(),
        )
        .unwrap();
        engine.run_cycle(&misfit_cluster(4)).unwrap();
        engine.list_pending_reviews().unwrap().len()
    };
    assert!(before > 0);

    // Re-open the same database: the queue is still there
    let store = Arc::new(SqliteStore::open(&db_path).unwrap());
    assert_eq!(store.list_reviews().unwrap().len(), before);

    let engine = OntogenEngine::new(
        Config::default(),
        AxiomTable::builtin(),
        store,
        dir.path(),
    )
    .unwrap();
    assert_eq!(engine.list_pending_reviews().unwrap().len(), before);
}
