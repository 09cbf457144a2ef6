//! Output of a tax calculation

use serde::{Deserialize, Serialize};

/// Annual tax position for one household
///
/// Amounts are annual dollars; `marginal_rate` and `average_rate` are percentages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub gross_income: f64,
    pub total_deductions: f64,
    pub taxable_income: f64,
    /// Bracket tax after the franking offset
    pub income_tax: f64,
    /// Flat health levy
    pub levy: f64,
    /// Surcharge for households without private cover
    pub levy_surcharge: f64,
    /// Compulsory study-loan repayment
    pub repayment: f64,
    pub total_tax: f64,
    pub after_tax_income: f64,
    pub marginal_rate: f64,
    pub average_rate: f64,
    pub franking_offset: f64,
    /// Property holding costs in excess of rent
    pub net_rental_loss: f64,
    /// Tax saved by the net rental loss at the marginal rate
    pub negative_gearing_benefit: f64,
}

impl TaxResult {
    /// Levy plus surcharge
    pub fn total_levy(&self) -> f64 {
        self.levy + self.levy_surcharge
    }

    /// Total tax spread evenly across the year
    pub fn monthly_tax(&self) -> f64 {
        self.total_tax / 12.0
    }

    pub fn monthly_after_tax_income(&self) -> f64 {
        self.after_tax_income / 12.0
    }
}
