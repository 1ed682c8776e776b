//! Integrator: applies approved artifacts to the live taxonomy store with
//! backup-before-write and rollback.
//!
//! Writes to the same target location are serialized through a per-location
//! lock, so take-backup-then-write is atomic with respect to other writers
//! of that location. There are no automatic retries: a failed apply is
//! returned as a failed result and a human decides what happens next.

use super::types::{
    IntegrationAction, IntegrationError, IntegrationId, IntegrationRecord, IntegrationResult,
};
use crate::generation::{GeneratedArtifact, InsertStrategy};
use crate::review::{ReviewItem, ReviewStatus};
use crate::storage::StateStore;
use chrono::Utc;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

pub struct Integrator {
    store: Arc<dyn StateStore>,
    /// Base directory target locations resolve against
    root: PathBuf,
    backup_dir: PathBuf,
    backups_enabled: bool,
    /// Per-target-location write locks
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl Integrator {
    pub fn new(store: Arc<dyn StateStore>, root: impl Into<PathBuf>, backups_enabled: bool) -> Self {
        let root = root.into();
        let backup_dir = root.join(".backups");
        Self {
            store,
            root,
            backup_dir,
            backups_enabled,
            locks: DashMap::new(),
        }
    }

    fn lock_for(&self, target: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(target.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Apply an approved or modified review item's artifact to its target.
    ///
    /// State errors fail fast; write failures come back as a failed result
    /// with any already-taken backup retained.
    pub async fn integrate(
        &self,
        item: &ReviewItem,
    ) -> Result<IntegrationResult, IntegrationError> {
        if !matches!(item.status, ReviewStatus::Approved | ReviewStatus::Modified) {
            return Err(IntegrationError::InvalidState {
                id: item.id,
                status: item.status,
            });
        }
        let artifact = item
            .artifact
            .as_ref()
            .ok_or(IntegrationError::MissingArtifact(item.id))?;

        let target = artifact.target_location.clone();
        let lock = self.lock_for(&target);
        let _guard = lock.lock().await;

        let path = self.root.join(&target);
        let rendered = render_artifact(artifact)?;

        let (action, backup) = if path.exists() {
            let backup = if self.backups_enabled {
                match self.take_backup(&path, &target).await {
                    Ok(b) => Some(b),
                    Err(e) => {
                        warn!(location = %target, error = %e, "backup failed, aborting apply");
                        return Ok(IntegrationResult::failed(
                            format!("backup failed: {}", e),
                            None,
                        ));
                    }
                }
            } else {
                None
            };

            let original = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) => {
                    return Ok(IntegrationResult::failed(
                        format!("failed to read target: {}", e),
                        backup,
                    ))
                }
            };
            let updated = match apply_strategy(&original, &rendered, &artifact.strategy) {
                Ok(content) => content,
                Err(reason) => return Ok(IntegrationResult::failed(reason, backup)),
            };
            if let Err(e) = tokio::fs::write(&path, &updated).await {
                return Ok(IntegrationResult::failed(
                    format!("failed to write target: {}", e),
                    backup,
                ));
            }
            (IntegrationAction::Modified, backup)
        } else {
            if let Some(parent) = path.parent() {
                if let Err(e) = tokio::fs::create_dir_all(parent).await {
                    return Ok(IntegrationResult::failed(
                        format!("failed to create target directory: {}", e),
                        None,
                    ));
                }
            }
            if let Err(e) = tokio::fs::write(&path, &rendered).await {
                return Ok(IntegrationResult::failed(
                    format!("failed to create target: {}", e),
                    None,
                ));
            }
            (IntegrationAction::Created, None)
        };

        let record = IntegrationRecord {
            id: IntegrationId::new(),
            review_item: item.id,
            artifact: artifact.id,
            target_location: target.clone(),
            action,
            integrated_at: Utc::now(),
            integrated_by: item
                .feedback
                .as_ref()
                .map(|f| f.reviewer.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            rollback_possible: backup.is_some(),
            backup_path: backup.clone(),
        };
        self.store.put_record(&record)?;
        // The review item's lifecycle ends here, on successful integration.
        self.store.delete_review(&item.id)?;

        info!(location = %target, record = %record.id, ?action, "artifact integrated");
        Ok(IntegrationResult {
            success: true,
            action,
            record: Some(record.id),
            backup,
            error: None,
        })
    }

    /// Restore the backed-up content verbatim and close the record's
    /// rollback window. The record itself is retained for audit.
    pub async fn rollback(&self, id: &IntegrationId) -> Result<bool, IntegrationError> {
        let record = self
            .store
            .get_record(id)?
            .ok_or(IntegrationError::RecordNotFound(*id))?;
        if !record.rollback_possible {
            return Err(IntegrationError::NotRollbackable(*id));
        }
        let backup = record
            .backup_path
            .as_ref()
            .ok_or(IntegrationError::NotRollbackable(*id))?;

        let lock = self.lock_for(&record.target_location);
        let _guard = lock.lock().await;

        let bytes = tokio::fs::read(backup).await?;
        tokio::fs::write(self.root.join(&record.target_location), &bytes).await?;

        self.store.update_record(id, &mut |r| {
            r.rollback_possible = false;
            Ok(())
        })?;

        info!(record = %id, location = %record.target_location, "integration rolled back");
        Ok(true)
    }

    /// The full ledger, newest first.
    pub fn history(&self) -> Result<Vec<IntegrationRecord>, IntegrationError> {
        let mut records = self.store.list_records()?;
        records.sort_by(|a, b| b.integrated_at.cmp(&a.integrated_at));
        Ok(records)
    }

    async fn take_backup(&self, path: &Path, target: &str) -> Result<PathBuf, std::io::Error> {
        tokio::fs::create_dir_all(&self.backup_dir).await?;
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");
        let sanitized = target.replace(['/', '\\'], "_");
        let backup_path = self.backup_dir.join(format!("{}.{}.bak", sanitized, stamp));
        tokio::fs::copy(path, &backup_path).await?;
        Ok(backup_path)
    }
}

/// Render an artifact payload as YAML under a provenance header.
fn render_artifact(artifact: &GeneratedArtifact) -> Result<String, IntegrationError> {
    let yaml = serde_yaml::to_string(&artifact.payload)?;
    Ok(format!(
        "# --- ontogen: {kind} '{name}' ---\n# artifact: {id}\n# source-gap: {gap}\n{yaml}# --- end '{name}' ---\n",
        kind = artifact.kind(),
        name = artifact.name,
        id = artifact.id,
        gap = artifact.source_gap,
    ))
}

/// Apply an insertion strategy to the existing target content.
fn apply_strategy(
    original: &str,
    rendered: &str,
    strategy: &InsertStrategy,
) -> Result<String, String> {
    match strategy {
        InsertStrategy::Append => {
            let mut out = original.to_string();
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(rendered);
            Ok(out)
        }
        InsertStrategy::ReplaceAtMarker { marker } => {
            if original.contains(marker.as_str()) {
                Ok(original.replacen(marker.as_str(), rendered, 1))
            } else {
                Err(format!("marker '{}' not found in target", marker))
            }
        }
        InsertStrategy::InsertAfterMarker { marker } => {
            match original.find(marker.as_str()) {
                Some(pos) => {
                    let end = pos + marker.len();
                    let mut out = String::with_capacity(original.len() + rendered.len() + 1);
                    out.push_str(&original[..end]);
                    out.push('\n');
                    out.push_str(rendered);
                    out.push_str(&original[end..]);
                    Ok(out)
                }
                None => {
                    // Fall back to append, leaving an explicit note
                    let mut out = original.to_string();
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(&format!(
                        "# ontogen: marker '{}' not found; appended\n{}",
                        marker, rendered
                    ));
                    Ok(out)
                }
            }
        }
        InsertStrategy::InsertBeforeMarker { marker } => {
            match original.find(marker.as_str()) {
                Some(pos) => {
                    let mut out = String::with_capacity(original.len() + rendered.len() + 1);
                    out.push_str(&original[..pos]);
                    out.push_str(rendered);
                    out.push_str(&original[pos..]);
                    Ok(out)
                }
                None => Ok(format!(
                    "# ontogen: marker '{}' not found; prepended\n{}{}",
                    marker, rendered, original
                )),
            }
        }
        InsertStrategy::CreateNewFile => {
            Err("target already exists but strategy requires a new file".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Gap, GapType, Severity, SuggestedAction};
    use crate::generation::{ArtifactId, ArtifactPayload, DomainSpec};
    use crate::review::{
        Priority, ReviewDecision, ReviewId, ReviewKind, ReviewerFeedback,
    };
    use crate::storage::MemoryStore;
    use crate::taxonomy::Stratum;
    use tempfile::TempDir;

    fn artifact_for(target: &str, strategy: InsertStrategy) -> GeneratedArtifact {
        let gap = Gap::new(
            GapType::DomainMisfit,
            Severity::Medium,
            "test",
            SuggestedAction::ManualReview { reason: "n/a".into() },
        );
        GeneratedArtifact {
            id: ArtifactId::new(),
            name: "mycelial".to_string(),
            payload: ArtifactPayload::Domain(DomainSpec {
                name: "mycelial".to_string(),
                description: "fungal networks".to_string(),
                typical_closure: 0.7,
                typical_scope: 0.5,
                compatible_strata: vec![Stratum::Matter, Stratum::Life],
            }),
            target_location: target.to_string(),
            strategy,
            dependencies: Vec::new(),
            justification: Default::default(),
            source_gap: gap.id,
            generated_at: Utc::now(),
        }
    }

    fn approved_item(artifact: GeneratedArtifact) -> ReviewItem {
        let now = Utc::now();
        ReviewItem {
            id: ReviewId::new(),
            kind: ReviewKind::ArtifactReview,
            status: ReviewStatus::Approved,
            gap: Gap::new(
                GapType::DomainMisfit,
                Severity::Medium,
                "test",
                SuggestedAction::ManualReview { reason: "n/a".into() },
            ),
            artifact: Some(artifact),
            validation: None,
            priority: Priority::Medium,
            created_at: now,
            updated_at: now,
            expires_at: now + chrono::Duration::days(14),
            feedback: Some(ReviewerFeedback {
                decision: ReviewDecision::Approved,
                reviewer: "ada".to_string(),
                notes: None,
                modified_payload: None,
            }),
        }
    }

    fn integrator_in(dir: &TempDir) -> (Integrator, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let integrator = Integrator::new(store.clone(), dir.path(), true);
        (integrator, store)
    }

    // === Scenario: Missing target is created with a provenance header ===

    #[tokio::test]
    async fn integrating_into_missing_target_creates_it() {
        let dir = TempDir::new().unwrap();
        let (integrator, store) = integrator_in(&dir);
        let item = approved_item(artifact_for("taxonomy/domains.yaml", InsertStrategy::Append));
        store.put_review(&item).unwrap();

        let result = integrator.integrate(&item).await.unwrap();
        assert!(result.success);
        assert_eq!(result.action, IntegrationAction::Created);
        assert!(result.backup.is_none());

        let written =
            std::fs::read_to_string(dir.path().join("taxonomy/domains.yaml")).unwrap();
        assert!(written.starts_with("# --- ontogen: new_domain 'mycelial' ---"));
        assert!(written.contains("typical_closure"));

        // The review item's lifecycle ended with integration
        assert!(store.get_review(&item.id).unwrap().is_none());
    }

    // === Scenario: Existing target is backed up then modified ===

    #[tokio::test]
    async fn integrating_into_existing_target_backs_up_first() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("taxonomy")).unwrap();
        std::fs::write(dir.path().join("taxonomy/domains.yaml"), "existing: true\n").unwrap();

        let (integrator, store) = integrator_in(&dir);
        let item = approved_item(artifact_for("taxonomy/domains.yaml", InsertStrategy::Append));
        store.put_review(&item).unwrap();

        let result = integrator.integrate(&item).await.unwrap();
        assert!(result.success);
        assert_eq!(result.action, IntegrationAction::Modified);

        let backup = result.backup.expect("backup taken");
        assert_eq!(
            std::fs::read_to_string(&backup).unwrap(),
            "existing: true\n"
        );
        let written =
            std::fs::read_to_string(dir.path().join("taxonomy/domains.yaml")).unwrap();
        assert!(written.starts_with("existing: true\n"));
        assert!(written.contains("mycelial"));
    }

    // === Scenario: Integrate then rollback restores bytes exactly ===

    #[tokio::test]
    async fn rollback_restores_byte_identical_content() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("taxonomy")).unwrap();
        let original = "domains:\n  - living\n  - artifact\n";
        std::fs::write(dir.path().join("taxonomy/domains.yaml"), original).unwrap();

        let (integrator, store) = integrator_in(&dir);
        let item = approved_item(artifact_for("taxonomy/domains.yaml", InsertStrategy::Append));
        store.put_review(&item).unwrap();

        let result = integrator.integrate(&item).await.unwrap();
        let record_id = result.record.unwrap();

        assert!(integrator.rollback(&record_id).await.unwrap());
        let restored =
            std::fs::read_to_string(dir.path().join("taxonomy/domains.yaml")).unwrap();
        assert_eq!(restored, original);

        // The record survives with its rollback window closed
        let record = store.get_record(&record_id).unwrap().unwrap();
        assert!(!record.rollback_possible);

        // A second rollback is refused
        let err = integrator.rollback(&record_id).await.unwrap_err();
        assert!(matches!(err, IntegrationError::NotRollbackable(_)));
    }

    // === Scenario: Created targets have no backup and cannot roll back ===

    #[tokio::test]
    async fn created_target_is_not_rollbackable() {
        let dir = TempDir::new().unwrap();
        let (integrator, store) = integrator_in(&dir);
        let item = approved_item(artifact_for("connectors/feed.yaml", InsertStrategy::CreateNewFile));
        store.put_review(&item).unwrap();

        let result = integrator.integrate(&item).await.unwrap();
        let record_id = result.record.unwrap();

        let err = integrator.rollback(&record_id).await.unwrap_err();
        assert!(matches!(err, IntegrationError::NotRollbackable(_)));
    }

    // === Scenario: Pending items fail fast with a state error ===

    #[tokio::test]
    async fn pending_item_is_refused() {
        let dir = TempDir::new().unwrap();
        let (integrator, _store) = integrator_in(&dir);
        let mut item = approved_item(artifact_for("taxonomy/domains.yaml", InsertStrategy::Append));
        item.status = ReviewStatus::Pending;

        let err = integrator.integrate(&item).await.unwrap_err();
        assert!(matches!(
            err,
            IntegrationError::InvalidState {
                status: ReviewStatus::Pending,
                ..
            }
        ));
        assert!(!dir.path().join("taxonomy/domains.yaml").exists());
    }

    // === Scenario: Missing replace marker fails but keeps the backup ===

    #[tokio::test]
    async fn missing_replace_marker_fails_with_backup_retained() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("taxonomy")).unwrap();
        std::fs::write(dir.path().join("taxonomy/domains.yaml"), "untouched\n").unwrap();

        let (integrator, store) = integrator_in(&dir);
        let item = approved_item(artifact_for(
            "taxonomy/domains.yaml",
            InsertStrategy::ReplaceAtMarker {
                marker: "## GENERATED ##".to_string(),
            },
        ));
        store.put_review(&item).unwrap();

        let result = integrator.integrate(&item).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.action, IntegrationAction::Failed);
        assert!(result.error.unwrap().contains("marker"));
        assert!(result.backup.is_some());

        // Target untouched, item still in the queue
        assert_eq!(
            std::fs::read_to_string(dir.path().join("taxonomy/domains.yaml")).unwrap(),
            "untouched\n"
        );
        assert!(store.get_review(&item.id).unwrap().is_some());
    }

    // === Scenario: Absent insert markers fall back with a note ===

    #[tokio::test]
    async fn insert_after_missing_marker_appends_with_note() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("taxonomy")).unwrap();
        std::fs::write(dir.path().join("taxonomy/domains.yaml"), "head\n").unwrap();

        let (integrator, store) = integrator_in(&dir);
        let item = approved_item(artifact_for(
            "taxonomy/domains.yaml",
            InsertStrategy::InsertAfterMarker {
                marker: "## DOMAINS ##".to_string(),
            },
        ));
        store.put_review(&item).unwrap();

        let result = integrator.integrate(&item).await.unwrap();
        assert!(result.success);
        let written =
            std::fs::read_to_string(dir.path().join("taxonomy/domains.yaml")).unwrap();
        assert!(written.contains("marker '## DOMAINS ##' not found; appended"));
    }

    #[test]
    fn replace_substitutes_the_marker_text() {
        let out = apply_strategy(
            "before\n## SLOT ##\nafter\n",
            "payload\n",
            &InsertStrategy::ReplaceAtMarker {
                marker: "## SLOT ##".to_string(),
            },
        )
        .unwrap();
        assert_eq!(out, "before\npayload\n\nafter\n");
    }

    #[test]
    fn insert_before_places_content_ahead_of_marker() {
        let out = apply_strategy(
            "alpha\n## END ##\n",
            "beta\n",
            &InsertStrategy::InsertBeforeMarker {
                marker: "## END ##".to_string(),
            },
        )
        .unwrap();
        assert_eq!(out, "alpha\nbeta\n## END ##\n");
    }
}
