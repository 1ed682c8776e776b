//! The fixed detector set.

mod capability_vocab;
mod domain_fit;
mod grid;
mod relation_vocab;
mod strata;
mod tension;

pub use capability_vocab::CapabilityVocabDetector;
pub use domain_fit::{domain_fit, DomainFitDetector};
pub use grid::GridClusterDetector;
pub use relation_vocab::RelationVocabDetector;
pub use strata::StrataDetector;
pub use tension::TensionDetector;
