//! Tax engine: deductions → bracket tax → levy → repayment → offsets

use serde::{Deserialize, Serialize};

use super::offsets::{franking_offset, negative_gearing};
use super::result::TaxResult;
use crate::amortization::amount;
use crate::assumptions::TaxSchedule;
use crate::profile::FinancialProfile;

/// Figures the tax calculation needs, independent of how they were collected
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaxInput {
    /// All assessable income including rent and franked dividends
    pub gross_income: f64,
    pub franked_dividends: f64,
    /// Rent from investment properties (already inside `gross_income`)
    pub property_rent: f64,
    /// Interest and running costs on investment properties
    pub property_costs: f64,
    pub other_deductions: f64,
    pub has_private_cover: bool,
    pub hecs_balance: f64,
}

impl TaxInput {
    pub fn from_profile(profile: &FinancialProfile) -> Self {
        Self {
            gross_income: profile.gross_annual_income(),
            franked_dividends: amount(profile.income.franked_dividends),
            property_rent: profile.property_rent(),
            property_costs: profile
                .investment_properties
                .iter()
                .map(|p| p.annual_deductible_costs())
                .sum(),
            other_deductions: amount(profile.other_deductions),
            has_private_cover: profile.has_private_cover,
            hecs_balance: amount(profile.hecs_balance),
        }
    }
}

/// Applies one year's [`TaxSchedule`] to household income
#[derive(Debug, Clone)]
pub struct TaxEngine {
    schedule: TaxSchedule,
}

impl TaxEngine {
    pub fn new(schedule: TaxSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &TaxSchedule {
        &self.schedule
    }

    /// Tax position for a household profile
    pub fn calculate(&self, profile: &FinancialProfile) -> TaxResult {
        self.calculate_input(&TaxInput::from_profile(profile))
    }

    /// Tax position for pre-collected figures
    pub fn calculate_input(&self, input: &TaxInput) -> TaxResult {
        let gross_income = amount(input.gross_income);
        let property_costs = amount(input.property_costs);
        let total_deductions = property_costs + amount(input.other_deductions);
        let taxable_income = (gross_income - total_deductions).max(0.0);

        let bracket_tax = self.bracket_tax(taxable_income);
        let franking = franking_offset(input.franked_dividends, self.schedule.company_tax_rate);
        let income_tax = (bracket_tax - franking).max(0.0);

        let levy = taxable_income * self.schedule.levy.base_rate(taxable_income);
        let levy_surcharge = taxable_income
            * self
                .schedule
                .levy
                .surcharge_rate(taxable_income, input.has_private_cover);

        let repayment = self.repayment(gross_income, input.hecs_balance);

        let total_tax = income_tax + levy + levy_surcharge + repayment;
        let marginal_rate = self.marginal_rate(taxable_income, input.has_private_cover);
        let average_rate = if gross_income > 0.0 {
            total_tax / gross_income * 100.0
        } else {
            0.0
        };

        let gearing = negative_gearing(input.property_rent, property_costs, marginal_rate);

        log::debug!(
            "taxable {:.2}: bracket {:.2}, franking {:.2}, levy {:.2}+{:.2}, repayment {:.2}",
            taxable_income,
            bracket_tax,
            franking,
            levy,
            levy_surcharge,
            repayment
        );

        TaxResult {
            gross_income,
            total_deductions,
            taxable_income,
            income_tax,
            levy,
            levy_surcharge,
            repayment,
            total_tax,
            after_tax_income: gross_income - total_tax,
            marginal_rate,
            average_rate,
            franking_offset: franking,
            net_rental_loss: gearing.net_loss,
            negative_gearing_benefit: gearing.benefit,
        }
    }

    /// Bracket tax before offsets; 0 for non-positive income
    pub fn bracket_tax(&self, taxable_income: f64) -> f64 {
        self.schedule
            .brackets
            .find(taxable_income)
            .map(|b| b.tax_on(taxable_income).max(0.0))
            .unwrap_or(0.0)
    }

    /// Bracket rate plus levy and surcharge rates at `taxable_income`, in percent
    pub fn marginal_rate(&self, taxable_income: f64, has_private_cover: bool) -> f64 {
        let bracket_rate = self
            .schedule
            .brackets
            .find(taxable_income)
            .map(|b| b.rate)
            .unwrap_or(0.0);
        let levy = &self.schedule.levy;
        (bracket_rate
            + levy.base_rate(taxable_income)
            + levy.surcharge_rate(taxable_income, has_private_cover))
            * 100.0
    }

    /// Compulsory repayment on gross income, never more than the balance owing
    pub fn repayment(&self, gross_income: f64, balance: f64) -> f64 {
        let balance = amount(balance);
        if balance <= 0.0 {
            return 0.0;
        }
        let gross_income = amount(gross_income);
        (gross_income * self.schedule.repayment.rate_for(gross_income)).min(balance)
    }
}

impl Default for TaxEngine {
    fn default() -> Self {
        Self::new(TaxSchedule::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{IncomeSources, InvestmentProperty};
    use approx::assert_abs_diff_eq;
    use proptest::prelude::{prop_assert, proptest};

    fn salary(gross: f64) -> TaxInput {
        TaxInput {
            gross_income: gross,
            ..Default::default()
        }
    }

    #[test]
    fn test_hundred_thousand_without_cover() {
        let result = TaxEngine::default().calculate_input(&salary(100_000.0));

        assert_abs_diff_eq!(result.taxable_income, 100_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.income_tax, 20_788.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.levy, 2_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.levy_surcharge, 1_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.total_tax, 23_788.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.after_tax_income, 76_212.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.marginal_rate, 33.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.average_rate, 23.788, epsilon = 1e-9);
    }

    #[test]
    fn test_private_cover_removes_surcharge() {
        let input = TaxInput {
            has_private_cover: true,
            ..salary(100_000.0)
        };
        let result = TaxEngine::default().calculate_input(&input);
        assert_eq!(result.levy_surcharge, 0.0);
        assert_abs_diff_eq!(result.marginal_rate, 32.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_and_invalid_income() {
        let engine = TaxEngine::default();
        for gross in [0.0, -50_000.0, f64::NAN, f64::INFINITY] {
            let result = engine.calculate_input(&salary(gross));
            assert_eq!(result.total_tax, 0.0);
            assert_eq!(result.average_rate, 0.0);
            assert_eq!(result.marginal_rate, 0.0);
        }
    }

    #[test]
    fn test_bracket_continuity_at_every_edge() {
        let engine = TaxEngine::default();
        let edges: Vec<f64> = engine
            .schedule()
            .brackets
            .iter()
            .filter_map(|b| b.max)
            .collect();
        assert_eq!(edges.len(), 4);

        for edge in edges {
            let at = engine.bracket_tax(edge);
            let below = engine.bracket_tax(edge - 0.01);
            let above = engine.bracket_tax(edge + 0.01);
            assert!((at - below).abs() < 0.01, "jump below {}", edge);
            assert!((above - at).abs() < 0.01, "jump above {}", edge);
            assert!(above >= at && at >= below);
        }
    }

    #[test]
    fn test_each_band_ends_at_next_base_tax() {
        let schedule = TaxSchedule::australia_2024_25();
        let brackets: Vec<_> = schedule.brackets.iter().collect();
        for pair in brackets.windows(2) {
            let edge = pair[0].max.unwrap();
            assert_eq!(edge, pair[1].min);
            assert_abs_diff_eq!(pair[0].tax_on(edge), pair[1].base_tax, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_levy_only_above_low_income_threshold() {
        let engine = TaxEngine::default();
        assert_eq!(engine.calculate_input(&salary(27_222.0)).levy, 0.0);
        assert_abs_diff_eq!(
            engine.calculate_input(&salary(30_000.0)).levy,
            600.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_franking_offset_never_negative_tax() {
        let input = TaxInput {
            gross_income: 30_000.0,
            franked_dividends: 30_000.0,
            has_private_cover: true,
            ..Default::default()
        };
        let result = TaxEngine::default().calculate_input(&input);
        assert_abs_diff_eq!(result.franking_offset, 9_000.0, epsilon = 1e-9);
        assert_eq!(result.income_tax, 0.0);
        assert!(result.total_tax >= 0.0);
    }

    #[test]
    fn test_repayment_capped_at_balance() {
        let engine = TaxEngine::default();
        // 100k sits in the 5.5% band
        assert_abs_diff_eq!(engine.repayment(100_000.0, 50_000.0), 5_500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(engine.repayment(100_000.0, 2_000.0), 2_000.0, epsilon = 1e-9);
        assert_eq!(engine.repayment(100_000.0, 0.0), 0.0);
        assert_eq!(engine.repayment(50_000.0, 20_000.0), 0.0);
    }

    #[test]
    fn test_repayment_monotonic_in_balance_then_plateaus() {
        let engine = TaxEngine::default();
        let mut previous = 0.0;
        for step in 0..=200 {
            let balance = step as f64 * 100.0;
            let repayment = engine.repayment(100_000.0, balance);
            assert!(repayment >= previous);
            previous = repayment;
        }
        assert_abs_diff_eq!(previous, 5_500.0, epsilon = 1e-9);
        assert_abs_diff_eq!(engine.repayment(100_000.0, 1e9), 5_500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_profile_with_geared_property() {
        let profile = FinancialProfile {
            income: IncomeSources {
                employment: 120_000.0,
                ..Default::default()
            },
            investment_properties: vec![InvestmentProperty {
                current_value: 700_000.0,
                loan_amount: 500_000.0,
                interest_rate: 6.0,
                loan_term_years: 30.0,
                weekly_rent: 500.0,
                annual_expenses: 10_000.0,
            }],
            ..Default::default()
        };
        let result = TaxEngine::default().calculate(&profile);

        // rent 26,000 against 30,000 interest plus 10,000 expenses
        assert_abs_diff_eq!(result.gross_income, 146_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.total_deductions, 40_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.taxable_income, 106_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.net_rental_loss, 14_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.marginal_rate, 33.0, epsilon = 1e-9);
        assert_abs_diff_eq!(result.negative_gearing_benefit, 4_620.0, epsilon = 1e-6);
    }

    proptest! {
        #[test]
        fn prop_tax_is_monotonic_in_income(gross in 0.0f64..500_000.0, extra in 0.0f64..10_000.0) {
            let engine = TaxEngine::default();
            let lower = engine.calculate_input(&TaxInput { has_private_cover: true, ..salary(gross) });
            let higher = engine.calculate_input(&TaxInput { has_private_cover: true, ..salary(gross + extra) });
            prop_assert!(higher.income_tax + 1e-9 >= lower.income_tax);
            prop_assert!(lower.after_tax_income <= gross + 1e-9);
        }
    }
}
