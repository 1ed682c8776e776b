//! Rule validation: structural predicates over typed artifact payloads,
//! scored against the immutable axiom table.

mod checks;
mod types;
mod validator;

pub use checks::dice_similarity;
pub use types::{ValidationResult, ValidationWarning, Violation};
pub use validator::RuleValidator;
