//! Serviceability result structures

use serde::{Deserialize, Serialize};

/// Lender decision on a proposed loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assessment {
    Approved,
    Declined,
}

/// Largest loan the household could prudently take on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowingCapacity {
    pub viable: bool,
    /// Monthly surplus left for a new commitment after retention
    pub available_surplus: f64,
    /// Shaded net rent from the purchased property counted towards servicing
    pub rental_contribution: f64,
    /// Monthly repayment the capacity is sized on
    pub monthly_capacity: f64,
    pub max_loan: f64,
    pub max_property_value: f64,
    /// Why the household cannot borrow, when not viable
    pub reason: Option<String>,
}

impl BorrowingCapacity {
    pub(crate) fn not_viable(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Default::default()
        }
    }
}

/// Repayment at the stressed rate and what it leaves
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressTest {
    /// Percent
    pub stressed_rate: f64,
    pub stressed_payment: f64,
    /// Net income less expenses and all commitments at the stressed rate
    pub residual: f64,
    pub passed: bool,
}

/// Assessment of one proposed loan against the household's income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanAssessment {
    /// Gross monthly income less income tax
    pub net_monthly_income: f64,
    pub existing_commitments: f64,
    pub new_payment: f64,
    pub total_commitments: f64,
    /// Commitments as a percentage of net income; None without net income
    pub serviceability_ratio: Option<f64>,
    /// Minimum left over each month
    pub buffer_required: f64,
    /// Net income less living expenses and commitments
    pub buffer_remaining: f64,
    pub stress_test: StressTest,
    /// Household surplus after the new repayment
    pub net_cashflow_after_loan: f64,
    pub assessment: Assessment,
    /// One entry per failed check
    pub reasons: Vec<String>,
}

impl LoanAssessment {
    pub fn is_approved(&self) -> bool {
        self.assessment == Assessment::Approved
    }
}

/// Borrowing capacity plus, when a loan was proposed, its assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceabilityResult {
    pub capacity: BorrowingCapacity,
    pub assessment: Option<LoanAssessment>,
}
