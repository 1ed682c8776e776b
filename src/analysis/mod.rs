//! Gap analysis: scanning an entity snapshot against the frozen taxonomy
//! for anomalies worth extending the taxonomy over.

mod analyzer;
pub mod detectors;
mod jitter;
mod traits;
mod types;

pub use analyzer::GapAnalyzer;
pub use jitter::{Jitter, NoJitter, SeededJitter};
pub use traits::{DetectorRegistry, GapDetector};
pub use types::{
    AnalysisError, AnalysisSnapshot, Evidence, Gap, GapAnalysisResult, GapId, GapType, Severity,
    SuggestedAction,
};
