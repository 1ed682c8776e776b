//! Ontogen: Self-Extending Taxonomy Engine
//!
//! A fixed taxonomy of entity attributes (closure, scope, strata,
//! capabilities, relations) plus an immutable axiom table, periodically
//! re-examined for gaps. Detected gaps drive deterministic candidate
//! generation; candidates are validated against the axioms, queued for
//! human approval, and integrated into the live taxonomy store with
//! backup and rollback.
//!
//! # Core Concepts
//!
//! - **Entities**: classified items carrying the taxonomy's descriptors
//! - **Gaps**: detected anomalies suggesting the taxonomy is incomplete
//! - **Artifacts**: structured, axiom-justified extension proposals
//! - **Review items**: human-in-the-loop decisions, one-way state machine
//! - **Integration**: applying approved artifacts, with audit and rollback
//!
//! # Example
//!
//! ```
//! use ontogen::{Config, OntogenEngine};
//!
//! let engine = OntogenEngine::in_memory(Config::default(), ".").unwrap();
//! let result = engine.run_cycle(&[]).unwrap();
//! assert_eq!(result.gaps_detected, 0);
//! ```

pub mod analysis;
mod config;
mod engine;
pub mod generation;
pub mod integration;
pub mod review;
pub mod storage;
pub mod taxonomy;
pub mod validation;

pub use config::Config;
pub use engine::{CycleResult, OntogenEngine, OntogenError, OntogenResult};
pub use taxonomy::{
    ArtifactKind, Axiom, AxiomCheck, AxiomError, AxiomId, AxiomTable, Domain, Entity,
    EntityConfig, EntityId, NameRegistry, Relation, StrataProfile, Stratum,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
