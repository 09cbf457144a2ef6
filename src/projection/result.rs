//! Projection result structures

use serde::{Deserialize, Serialize};

/// Whether projected retirement income meets the required income
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetirementStatus {
    Surplus,
    Deficit,
}

/// Household position today, broken down by asset class
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPosition {
    pub retirement_fund: f64,
    pub shares: f64,
    pub cash: f64,
    /// Lifestyle property (home, holiday house)
    pub lifestyle_property: f64,
    pub other: f64,
    /// Investment property value less loans
    pub property_equity: f64,
    pub total_assets: f64,
    pub total_debt: f64,
    pub net_worth: f64,
    /// After-tax monthly surplus (may be negative)
    pub monthly_cashflow: f64,
}

/// Household position at the target age
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuturePosition {
    pub retirement_fund: f64,
    pub shares: f64,
    pub other: f64,
    pub lifestyle_property: f64,
    /// Accumulated voluntary contributions
    pub voluntary_savings: f64,
    pub property_equity: f64,
    /// Cash plus accumulated net property cashflow
    pub savings: f64,
    /// Liabilities still owing
    pub remaining_debt: f64,
    /// Investable assets that can fund retirement
    pub lump_sum: f64,
    pub net_worth: f64,
    /// Annual rent at the target age
    pub rental_income: f64,
}

/// Outcome of projecting a household to its target age
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub years_to_target: u32,
    pub current: CurrentPosition,
    pub future: FuturePosition,
    /// Annual income needed in retirement
    pub required_income: f64,
    /// Annual income the projected assets support
    pub projected_income: f64,
    /// Monthly surplus (positive) or deficit (negative) against required income
    pub monthly_gap: f64,
    pub status: RetirementStatus,
    /// Years the lump sum lasts if it alone funds the required income beyond rent,
    /// None if it never runs out
    pub lump_sum_longevity_years: Option<f64>,
}

impl ProjectionResult {
    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        ProjectionSummary {
            years_to_target: self.years_to_target,
            net_worth_today: self.current.net_worth,
            net_worth_at_target: self.future.net_worth,
            lump_sum: self.future.lump_sum,
            required_income: self.required_income,
            projected_income: self.projected_income,
            monthly_gap: self.monthly_gap,
            status: self.status,
        }
    }
}

/// Headline figures for reporting and batch output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub years_to_target: u32,
    pub net_worth_today: f64,
    pub net_worth_at_target: f64,
    pub lump_sum: f64,
    pub required_income: f64,
    pub projected_income: f64,
    pub monthly_gap: f64,
    pub status: RetirementStatus,
}
