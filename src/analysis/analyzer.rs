//! Gap analyzer: runs every registered detector over a snapshot and merges
//! the findings.
//!
//! A failing detector is logged and folded into the result's warnings; the
//! pass continues with the remaining detectors.

use super::detectors::{
    CapabilityVocabDetector, DomainFitDetector, GridClusterDetector, RelationVocabDetector,
    StrataDetector, TensionDetector,
};
use super::jitter::Jitter;
use super::traits::{DetectorRegistry, GapDetector};
use super::types::{AnalysisError, AnalysisSnapshot, GapAnalysisResult};
use crate::taxonomy::{AxiomTable, Entity};
use crate::Config;
use std::sync::Arc;
use tracing::{debug, warn};

/// Runs the detector registry over entity snapshots.
///
/// Pure with respect to its input: the only state an analyzer holds is the
/// frozen reference data and the detector set.
pub struct GapAnalyzer {
    registry: DetectorRegistry,
    config: Config,
    axioms: Arc<AxiomTable>,
}

impl GapAnalyzer {
    /// Analyzer with an empty registry. Mostly useful in tests; production
    /// callers want [`GapAnalyzer::with_default_detectors`].
    pub fn new(config: Config, axioms: Arc<AxiomTable>) -> Self {
        Self {
            registry: DetectorRegistry::new(),
            config,
            axioms,
        }
    }

    /// Analyzer with the full fixed detector set registered.
    pub fn with_default_detectors(
        config: Config,
        axioms: Arc<AxiomTable>,
        jitter: Arc<dyn Jitter>,
    ) -> Self {
        let mut analyzer = Self::new(config, axioms);
        analyzer.register(DomainFitDetector::new(jitter.clone()));
        analyzer.register(RelationVocabDetector);
        analyzer.register(CapabilityVocabDetector);
        analyzer.register(StrataDetector);
        analyzer.register(TensionDetector);
        analyzer.register(GridClusterDetector::new(jitter));
        analyzer
    }

    /// Register an additional detector.
    pub fn register<D: GapDetector + 'static>(&mut self, detector: D) {
        self.registry.register(detector);
    }

    pub fn detector_count(&self) -> usize {
        self.registry.len()
    }

    /// Run all detectors over the snapshot.
    pub fn analyze(&self, entities: &[Entity]) -> Result<GapAnalysisResult, AnalysisError> {
        let snapshot = AnalysisSnapshot {
            entities,
            config: &self.config,
            axioms: &self.axioms,
        };

        let mut gaps = Vec::new();
        let mut warnings = Vec::new();

        for detector in self.registry.detectors() {
            match detector.detect(&snapshot) {
                Ok(found) => {
                    debug!(detector = detector.id(), gaps = found.len(), "detector finished");
                    gaps.extend(found);
                }
                Err(e) => {
                    warn!(detector = detector.id(), error = %e, "detector failed, skipping");
                    warnings.push(format!("detector '{}' failed: {}", detector.id(), e));
                }
            }
        }

        Ok(GapAnalysisResult::new(gaps, warnings))
    }
}
