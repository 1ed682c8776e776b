//! Candidate generation: turning actionable gaps into structured,
//! axiom-justified extension proposals.

mod connector;
mod generator;
mod keywords;
mod types;

pub use connector::{ConnectorError, DataConnector, SkeletonConnector};
pub use generator::CandidateGenerator;
pub use types::{
    ArtifactId, ArtifactPayload, CapabilitySpec, ConnectorSpec, DomainSpec, GeneratedArtifact,
    GenerationError, InsertStrategy, Justification, JustificationEntry, JustificationStatus,
    RelationTypeSpec,
};
