//! Household Planner - calculation core for client-facing financial planning
//!
//! This library provides:
//! - Loan amortization (repayments, remaining balance, borrowing capacity)
//! - Annual tax with health levy, study-loan repayment, franking and negative gearing
//! - Retirement wealth and income projection by asset class
//! - Borrowing capacity and proposed-loan serviceability with stress testing
//! - Parallel batch evaluation of many households

pub mod amortization;
pub mod assumptions;
pub mod cashflow;
pub mod error;
pub mod profile;
pub mod projection;
pub mod scenario;
pub mod serviceability;
pub mod tax;

// Re-export commonly used types
pub use assumptions::{AssumptionSet, Schedules, TaxSchedule};
pub use cashflow::MonthlySurplus;
pub use error::{PlannerError, Result};
pub use profile::{FinancialProfile, ProposedLoan};
pub use projection::{ProjectionEngine, ProjectionResult};
pub use scenario::{PlanResult, PlanRunner};
pub use serviceability::{ServiceabilityEngine, ServiceabilityResult};
pub use tax::{TaxEngine, TaxResult};
