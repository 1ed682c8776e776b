//! Grid clustering for cross-cutting categories.
//!
//! Entities are bucketed on a fixed-resolution grid over (closure, scope).
//! A bucket that is both populated and spans several domains points at a
//! category the domain axis cannot express — a cross-cutting candidate.

use crate::analysis::jitter::Jitter;
use crate::analysis::traits::GapDetector;
use crate::analysis::types::{
    AnalysisError, AnalysisSnapshot, Evidence, Gap, GapType, Severity, SuggestedAction,
};
use crate::taxonomy::{Domain, Entity};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct GridClusterDetector {
    jitter: Arc<dyn Jitter>,
}

impl GridClusterDetector {
    pub fn new(jitter: Arc<dyn Jitter>) -> Self {
        Self { jitter }
    }
}

fn bucket_index(value: f64, resolution: usize) -> usize {
    let clamped = value.clamp(0.0, 1.0);
    ((clamped * resolution as f64) as usize).min(resolution - 1)
}

/// Suggest a name for a cross-cutting bucket from the domains it spans.
fn suggest_name(domains: &BTreeSet<Domain>) -> String {
    let has = |d: Domain| domains.contains(&d);
    if has(Domain::Living) && has(Domain::Artifact) {
        "bio_artificial".to_string()
    } else if has(Domain::Living) && has(Domain::Symbolic) {
        "living_symbolic".to_string()
    } else if has(Domain::Artifact) && has(Domain::Symbolic) {
        "techno_symbolic".to_string()
    } else if has(Domain::Institution) && has(Domain::Artifact) {
        "socio_technical".to_string()
    } else {
        "cross_domain".to_string()
    }
}

/// Keyword characteristics from the bucket's grid position.
fn bucket_characteristics(cell_closure: usize, cell_scope: usize, resolution: usize) -> Vec<String> {
    let mut words = Vec::new();
    let high = resolution.saturating_sub(1);
    if cell_closure >= high {
        words.push("autonomous".to_string());
    } else if cell_closure == 0 {
        words.push("dependent".to_string());
    }
    if cell_scope >= high {
        words.push("global".to_string());
    } else if cell_scope == 0 {
        words.push("local".to_string());
    }
    words
}

impl GapDetector for GridClusterDetector {
    fn id(&self) -> &str {
        "grid-cluster"
    }

    fn priority(&self) -> u32 {
        50
    }

    fn detect(&self, snapshot: &AnalysisSnapshot) -> Result<Vec<Gap>, AnalysisError> {
        let config = snapshot.config;
        let resolution = config.grid_resolution;
        if resolution == 0 {
            return Err(AnalysisError::Internal(
                "grid resolution must be non-zero".to_string(),
            ));
        }

        let mut buckets: BTreeMap<(usize, usize), Vec<&Entity>> = BTreeMap::new();
        for entity in snapshot.entities {
            let cell = (
                bucket_index(entity.config.closure, resolution),
                bucket_index(entity.config.scope, resolution),
            );
            buckets.entry(cell).or_default().push(entity);
        }

        let mut gaps = Vec::new();
        for ((cell_closure, cell_scope), members) in buckets {
            if members.len() < config.grid_min_bucket {
                continue;
            }
            let domains: BTreeSet<Domain> = members.iter().map(|e| e.domain).collect();
            if domains.len() <= config.grid_min_domains {
                continue;
            }

            let name_hint = suggest_name(&domains);
            let domain_list: Vec<&str> = domains.iter().map(|d| d.name()).collect();
            let description = format!(
                "{} entities from {} domains ({}) share grid cell ({}, {})",
                members.len(),
                domains.len(),
                domain_list.join(" + "),
                cell_closure,
                cell_scope,
            );

            // Large coherent buckets propose a domain outright; smaller ones
            // go to a human first.
            let action = if members.len() >= config.grid_generate_size {
                SuggestedAction::GenerateDomain {
                    name_hint,
                    characteristics: bucket_characteristics(cell_closure, cell_scope, resolution),
                }
            } else {
                SuggestedAction::ManualReview {
                    reason: format!("possible cross-cutting category '{}'", name_hint),
                }
            };

            let confidence = self
                .jitter
                .apply((0.4 + 0.08 * members.len() as f64).min(0.9));

            let mut gap = Gap::new(
                GapType::ClusteringAnomaly,
                Severity::Medium,
                description,
                action,
            )
            .with_confidence(confidence);

            for member in &members {
                gap = gap.with_evidence(
                    Evidence::new("grid_bucket_size", members.len() as f64, config.grid_min_bucket as f64)
                        .for_entity(member.id.clone())
                        .with_context(format!("domain: {}", member.domain)),
                );
            }
            gaps.push(gap);
        }

        Ok(gaps)
    }
}
