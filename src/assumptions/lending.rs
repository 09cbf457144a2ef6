//! Lender serviceability policy

use serde::{Deserialize, Serialize};

/// Serviceability buffers and ratios applied to new borrowing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingPolicy {
    /// Share of gross income kept for living costs and never offered to new debt
    pub retention_fraction: f64,
    /// Share of expected rent a lender counts towards servicing
    pub rental_shading: f64,
    /// Maximum loan-to-value ratio (0.80 = 80%)
    pub max_lvr: f64,
    /// Gross rental yield assumed for a purchased property, percent
    pub rental_yield: f64,
    /// Property running costs as a share of rent
    pub property_expense_ratio: f64,
    /// Percentage points added to the rate for the stress test
    pub stress_margin: f64,
    /// Liquidity buffer required as a share of net income
    pub buffer_fraction: f64,
    /// Maximum commitments as a percentage of net income
    pub serviceability_ceiling: f64,
    /// Rate used when sizing a loan with no rate given, percent
    pub assessment_rate: f64,
    pub loan_term_years: f64,
}

impl LendingPolicy {
    pub fn standard() -> Self {
        Self {
            retention_fraction: 0.70,
            rental_shading: 0.75,
            max_lvr: 0.80,
            rental_yield: 4.0,
            property_expense_ratio: 0.25,
            stress_margin: 3.0,
            buffer_fraction: 0.10,
            serviceability_ceiling: 35.0,
            assessment_rate: 6.5,
            loan_term_years: 30.0,
        }
    }
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
