//! Retirement wealth and income projection

mod depletion;
mod engine;
mod growth;
mod result;

pub use depletion::savings_depletion;
pub use engine::ProjectionEngine;
pub use growth::{compound, growing_annuity, SINGULARITY_EPSILON};
pub use result::{CurrentPosition, FuturePosition, ProjectionResult, ProjectionSummary, RetirementStatus};
