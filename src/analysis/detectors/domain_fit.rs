//! Domain-fit scoring and misfit clustering.
//!
//! Each domain carries a typical (closure, scope) pair. Entities whose
//! descriptors sit far from their domain's pair are misfits; misfits that
//! cluster together in descriptor space suggest a missing domain.

use crate::analysis::jitter::Jitter;
use crate::analysis::traits::GapDetector;
use crate::analysis::types::{
    AnalysisError, AnalysisSnapshot, Evidence, Gap, GapType, Severity, SuggestedAction,
};
use crate::taxonomy::{Entity, Stratum};
use std::sync::Arc;

/// Fit of an entity to its declared domain, in [0, 1].
///
/// `1 − (|Δclosure| + |Δscope|) / 2` against the domain's typical pair.
pub fn domain_fit(entity: &Entity) -> f64 {
    let (typical_closure, typical_scope) = entity.domain.typical_profile();
    let delta = (entity.config.closure - typical_closure).abs()
        + (entity.config.scope - typical_scope).abs();
    1.0 - delta / 2.0
}

/// Detector for domain-misfit clusters.
pub struct DomainFitDetector {
    jitter: Arc<dyn Jitter>,
}

impl DomainFitDetector {
    pub fn new(jitter: Arc<dyn Jitter>) -> Self {
        Self { jitter }
    }

    /// Pairwise-greedy clustering: the first unassigned misfit seeds a
    /// cluster; every later misfit whose closure and scope both sit within
    /// the band of the seed joins it. Entities with identical descriptors
    /// always land in the same cluster.
    fn cluster<'a>(&self, misfits: &[&'a Entity], band: f64) -> Vec<Vec<&'a Entity>> {
        let mut clusters: Vec<Vec<&Entity>> = Vec::new();
        let mut assigned = vec![false; misfits.len()];

        for i in 0..misfits.len() {
            if assigned[i] {
                continue;
            }
            let seed = misfits[i];
            let mut cluster = vec![seed];
            assigned[i] = true;

            for j in (i + 1)..misfits.len() {
                if assigned[j] {
                    continue;
                }
                let candidate = misfits[j];
                let d_closure = (candidate.config.closure - seed.config.closure).abs();
                let d_scope = (candidate.config.scope - seed.config.scope).abs();
                if d_closure <= band && d_scope <= band {
                    cluster.push(candidate);
                    assigned[j] = true;
                }
            }
            clusters.push(cluster);
        }
        clusters
    }
}

/// Keyword characteristics for a misfit cluster, read later by the
/// candidate generator's polarity inference.
fn cluster_characteristics(members: &[&Entity]) -> Vec<String> {
    let n = members.len() as f64;
    let mean_closure: f64 = members.iter().map(|e| e.config.closure).sum::<f64>() / n;
    let mean_scope: f64 = members.iter().map(|e| e.config.scope).sum::<f64>() / n;

    let mut words = Vec::new();
    if mean_closure > 0.6 {
        words.push("autonomous".to_string());
    } else if mean_closure < 0.4 {
        words.push("dependent".to_string());
    }
    if mean_scope > 0.6 {
        words.push("global".to_string());
    } else if mean_scope < 0.4 {
        words.push("local".to_string());
    }

    // Highest stratum every member reaches, as a keyword the generator
    // maps back onto compatible strata.
    let common_height = members
        .iter()
        .filter_map(|e| e.config.strata.highest_active())
        .min();
    match common_height {
        Some(Stratum::Life) => words.push("living".to_string()),
        Some(Stratum::Sentience) => words.push("sentient".to_string()),
        Some(Stratum::Logos) => words.push("symbolic".to_string()),
        _ => {}
    }
    words
}

impl GapDetector for DomainFitDetector {
    fn id(&self) -> &str {
        "domain-fit"
    }

    fn priority(&self) -> u32 {
        10
    }

    fn detect(&self, snapshot: &AnalysisSnapshot) -> Result<Vec<Gap>, AnalysisError> {
        let config = snapshot.config;

        let misfits: Vec<&Entity> = snapshot
            .entities
            .iter()
            .filter(|e| domain_fit(e) < config.fit_threshold)
            .collect();

        if misfits.is_empty() {
            return Ok(Vec::new());
        }

        let mut gaps = Vec::new();
        for (index, cluster) in self
            .cluster(&misfits, config.cluster_band)
            .into_iter()
            .enumerate()
        {
            if cluster.len() < config.min_cluster_size {
                continue;
            }

            let confidence = self
                .jitter
                .apply((0.5 + 0.1 * cluster.len() as f64).min(0.95));
            let severity = if cluster.len() >= config.min_cluster_size * 2 {
                Severity::High
            } else {
                Severity::Medium
            };

            let mut gap = Gap::new(
                GapType::DomainMisfit,
                severity,
                format!(
                    "{} entities fit no existing domain (cluster around closure {:.2}, scope {:.2})",
                    cluster.len(),
                    cluster[0].config.closure,
                    cluster[0].config.scope,
                ),
                SuggestedAction::GenerateDomain {
                    name_hint: format!("domain_candidate_{}", index + 1),
                    characteristics: cluster_characteristics(&cluster),
                },
            )
            .with_confidence(confidence);

            for member in &cluster {
                gap = gap.with_evidence(
                    Evidence::new("domain_fit", domain_fit(member), config.fit_threshold)
                        .for_entity(member.id.clone())
                        .with_context(format!("declared domain: {}", member.domain)),
                );
            }
            gaps.push(gap);
        }

        Ok(gaps)
    }
}
