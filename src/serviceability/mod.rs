//! Borrowing capacity and proposed-loan serviceability

mod engine;
mod result;

pub use engine::{CapacityRequest, ServiceabilityEngine};
pub use result::{Assessment, BorrowingCapacity, LoanAssessment, ServiceabilityResult, StressTest};
