//! Detector trait and registry defining the gap analysis interface.

use super::types::{AnalysisError, AnalysisSnapshot, Gap};

/// A single gap detector: a pure function of the analysis snapshot.
///
/// Detectors must not mutate shared state; everything they need arrives in
/// the snapshot, and everything they produce is returned. A failing
/// detector is skipped by the analyzer — it never aborts the pass.
pub trait GapDetector: Send + Sync {
    /// Stable identifier, used in logs and failure records.
    fn id(&self) -> &str;

    /// Priority for execution order (lower = earlier).
    ///
    /// Detection order only affects gap ordering in the result, not
    /// detection itself; detectors share no state.
    fn priority(&self) -> u32 {
        100
    }

    /// Scan the snapshot and report any gaps found.
    fn detect(&self, snapshot: &AnalysisSnapshot) -> Result<Vec<Gap>, AnalysisError>;
}

/// Registry of available detectors.
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn GapDetector>>,
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// Register a detector.
    pub fn register<D: GapDetector + 'static>(&mut self, detector: D) {
        self.detectors.push(Box::new(detector));
    }

    /// All detectors sorted by priority.
    pub fn detectors(&self) -> Vec<&dyn GapDetector> {
        let mut detectors: Vec<_> = self.detectors.iter().map(|d| d.as_ref()).collect();
        detectors.sort_by_key(|d| d.priority());
        detectors
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}
