//! Economic growth and return assumptions

use serde::{Deserialize, Serialize};

use crate::amortization::finite_or_zero;

/// Economic assumptions, each an annual percentage (7.0 = 7% p.a.)
///
/// Every field is required when deserialised; callers wanting the house view
/// start from [`AssumptionSet::standard`] and override what they need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssumptionSet {
    pub inflation: f64,
    pub salary_growth: f64,
    pub retirement_fund_return: f64,
    pub share_return: f64,
    pub property_growth: f64,
    pub rent_growth: f64,
    pub safe_withdrawal_rate: f64,
    /// Share of employment income saved voluntarily each year
    pub voluntary_savings_rate: f64,
    /// Holding return on cash and general savings
    pub cash_return: f64,
}

impl AssumptionSet {
    /// House default used when the advisor has not overridden anything
    pub fn standard() -> Self {
        Self {
            inflation: 2.5,
            salary_growth: 3.0,
            retirement_fund_return: 7.0,
            share_return: 7.5,
            property_growth: 4.0,
            rent_growth: 3.0,
            safe_withdrawal_rate: 4.0,
            voluntary_savings_rate: 0.0,
            cash_return: 4.0,
        }
    }

    /// Convert to decimal rates for the formulas
    ///
    /// NaN and negative inputs become 0 so the growth formulas never see them.
    pub fn rates(&self) -> GrowthRates {
        let rate = |pct: f64| finite_or_zero(pct).max(0.0) / 100.0;
        GrowthRates {
            inflation: rate(self.inflation),
            salary_growth: rate(self.salary_growth),
            retirement_fund_return: rate(self.retirement_fund_return),
            share_return: rate(self.share_return),
            property_growth: rate(self.property_growth),
            rent_growth: rate(self.rent_growth),
            safe_withdrawal_rate: rate(self.safe_withdrawal_rate),
            voluntary_savings_rate: rate(self.voluntary_savings_rate),
            cash_return: rate(self.cash_return),
        }
    }
}

impl Default for AssumptionSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// [`AssumptionSet`] expressed as decimals (0.07 = 7% p.a.)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthRates {
    pub inflation: f64,
    pub salary_growth: f64,
    pub retirement_fund_return: f64,
    pub share_return: f64,
    pub property_growth: f64,
    pub rent_growth: f64,
    pub safe_withdrawal_rate: f64,
    pub voluntary_savings_rate: f64,
    pub cash_return: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_are_decimals() {
        let rates = AssumptionSet::standard().rates();
        assert!((rates.retirement_fund_return - 0.07).abs() < 1e-12);
        assert!((rates.safe_withdrawal_rate - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_rates_are_zeroed() {
        let assumptions = AssumptionSet {
            inflation: f64::NAN,
            share_return: -3.0,
            ..AssumptionSet::standard()
        };
        let rates = assumptions.rates();
        assert_eq!(rates.inflation, 0.0);
        assert_eq!(rates.share_return, 0.0);
    }

    #[test]
    fn test_all_fields_required() {
        let partial = r#"{"inflation": 2.5}"#;
        assert!(serde_json::from_str::<AssumptionSet>(partial).is_err());

        let full = serde_json::to_string(&AssumptionSet::standard()).unwrap();
        let parsed: AssumptionSet = serde_json::from_str(&full).unwrap();
        assert_eq!(parsed, AssumptionSet::standard());
    }
}
