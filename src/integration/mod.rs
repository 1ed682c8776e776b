//! Integration: applying approved artifacts to the live taxonomy store,
//! with an audit ledger, backups, and rollback.

mod integrator;
mod types;

pub use integrator::Integrator;
pub use types::{
    IntegrationAction, IntegrationError, IntegrationId, IntegrationRecord, IntegrationResult,
};
