//! Retirement fund contribution rules and the retirement income target

use serde::{Deserialize, Serialize};

use crate::amortization::amount;

/// Compulsory contribution rules and the income replacement target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementSchedule {
    /// Employer guarantee contribution as a share of salary
    pub guarantee_rate: f64,
    /// Annual cap on concessional (pre-tax) contributions
    pub concessional_cap: f64,
    /// Tax levied inside the fund on concessional contributions
    pub contributions_tax_rate: f64,
    /// Required retirement income as a share of current gross income
    pub income_replacement_ratio: f64,
}

impl RetirementSchedule {
    /// 2024-25 guarantee rate (11.5%) and cap
    pub fn australia_2024_25() -> Self {
        Self {
            guarantee_rate: 0.115,
            concessional_cap: 30_000.0,
            contributions_tax_rate: 0.15,
            income_replacement_ratio: 0.70,
        }
    }

    /// Net first-year contribution reaching the fund for a given salary
    pub fn annual_contribution(&self, salary: f64) -> f64 {
        let gross = (amount(salary) * self.guarantee_rate).min(self.concessional_cap);
        gross * (1.0 - self.contributions_tax_rate)
    }
}

impl Default for RetirementSchedule {
    fn default() -> Self {
        Self::australia_2024_25()
    }
}
