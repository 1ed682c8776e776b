//! Human-in-the-loop review: the pending queue, its state machine, and the
//! capacity/expiry policies.

mod types;
mod workflow;

pub use types::{
    Priority, ReviewDecision, ReviewError, ReviewId, ReviewItem, ReviewKind, ReviewStats,
    ReviewStatus, ReviewerFeedback,
};
pub use workflow::ReviewWorkflow;
