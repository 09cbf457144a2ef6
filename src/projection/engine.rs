//! Retirement projection engine
//!
//! Grows each asset class at its own assumption from today to the target age,
//! then compares the income the resulting lump sum supports against the
//! household's required retirement income.

use super::depletion::savings_depletion;
use super::growth::{compound, growing_annuity};
use super::result::{CurrentPosition, FuturePosition, ProjectionResult, RetirementStatus};
use crate::amortization::{self, amount, finite_or_zero, pct_to_decimal};
use crate::assumptions::{AssumptionSet, GrowthRates, RetirementSchedule, Schedules};
use crate::cashflow::MonthlySurplus;
use crate::error::Result;
use crate::profile::{AssetClass, FinancialProfile, InvestmentProperty, Liability};
use crate::tax::TaxEngine;

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    assumptions: AssumptionSet,
    rates: GrowthRates,
    retirement: RetirementSchedule,
    tax: TaxEngine,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions and schedules
    pub fn new(assumptions: AssumptionSet, schedules: &Schedules) -> Self {
        Self {
            rates: assumptions.rates(),
            assumptions,
            retirement: schedules.retirement.clone(),
            tax: TaxEngine::new(schedules.tax.clone()),
        }
    }

    pub fn assumptions(&self) -> &AssumptionSet {
        &self.assumptions
    }

    /// Project to the profile's retirement age
    ///
    /// Fails with `InvalidHorizon` when the retirement age is not after the current age.
    pub fn project(&self, profile: &FinancialProfile) -> Result<ProjectionResult> {
        let years = profile.years_to_retirement()?;
        Ok(self.project_years(profile, years))
    }

    /// Project a fixed number of years ahead; zero years reproduces today's position
    pub fn project_years(&self, profile: &FinancialProfile, years: u32) -> ProjectionResult {
        let current = self.current_position(profile);
        let future = self.future_position(profile, &current, years as f64);

        let required_income = self.retirement.income_replacement_ratio * profile.gross_annual_income();
        let projected_income =
            future.lump_sum * self.rates.safe_withdrawal_rate + future.rental_income;
        let monthly_gap = (projected_income - required_income) / 12.0;
        let status = if monthly_gap >= 0.0 {
            RetirementStatus::Surplus
        } else {
            RetirementStatus::Deficit
        };

        let lump_sum_longevity_years = savings_depletion(
            future.lump_sum,
            (required_income - future.rental_income) / 12.0,
            self.assumptions.retirement_fund_return,
        );

        log::debug!(
            "{}: {} years, lump sum {:.0}, income {:.0} vs required {:.0} ({:?})",
            profile.name,
            years,
            future.lump_sum,
            projected_income,
            required_income,
            status
        );

        ProjectionResult {
            years_to_target: years,
            current,
            future,
            required_income,
            projected_income,
            monthly_gap,
            status,
            lump_sum_longevity_years,
        }
    }

    /// Today's balances and after-tax monthly cashflow
    pub fn current_position(&self, profile: &FinancialProfile) -> CurrentPosition {
        let tax = self.tax.calculate(profile);
        let cashflow = MonthlySurplus::from_profile(profile, &tax);

        CurrentPosition {
            retirement_fund: profile.assets_of_class(AssetClass::RetirementFund),
            shares: profile.assets_of_class(AssetClass::Shares),
            cash: profile.assets_of_class(AssetClass::Cash),
            lifestyle_property: profile.assets_of_class(AssetClass::Property),
            other: profile.assets_of_class(AssetClass::Other),
            property_equity: profile.investment_properties.iter().map(|p| p.equity()).sum(),
            total_assets: profile.total_asset_value(),
            total_debt: profile.total_debt(),
            net_worth: profile.net_worth(),
            monthly_cashflow: cashflow.surplus,
        }
    }

    fn future_position(
        &self,
        profile: &FinancialProfile,
        current: &CurrentPosition,
        years: f64,
    ) -> FuturePosition {
        let r = &self.rates;
        let salary = amount(profile.income.employment);

        let retirement_fund = compound(current.retirement_fund, r.retirement_fund_return, years)
            + growing_annuity(
                self.retirement.annual_contribution(salary),
                r.retirement_fund_return,
                r.salary_growth,
                years,
            );
        let shares = compound(current.shares, r.share_return, years);
        let other = compound(current.other, r.inflation, years);
        let lifestyle_property = compound(current.lifestyle_property, r.property_growth, years);
        let voluntary_savings = growing_annuity(
            salary * r.voluntary_savings_rate,
            r.share_return,
            r.salary_growth,
            years,
        );

        let properties = &profile.investment_properties;
        let property_equity: f64 = properties.iter().map(|p| self.equity_at(p, years)).sum();
        let savings = (compound(current.cash, r.cash_return, years)
            + properties
                .iter()
                .map(|p| self.net_property_cashflow(p, years))
                .sum::<f64>())
        .max(0.0);
        let rental_income: f64 = properties
            .iter()
            .map(|p| compound(p.annual_rent(), r.rent_growth, years))
            .sum();
        let remaining_debt: f64 = profile
            .liabilities
            .iter()
            .map(|l| liability_outstanding(l, years))
            .sum();

        let lump_sum = retirement_fund
            + shares
            + other
            + voluntary_savings
            + property_equity
            + savings;

        FuturePosition {
            retirement_fund,
            shares,
            other,
            lifestyle_property,
            voluntary_savings,
            property_equity,
            savings,
            remaining_debt,
            lump_sum,
            net_worth: lump_sum + lifestyle_property - remaining_debt,
            rental_income,
        }
    }

    /// Grown value less the scheduled loan balance, never negative
    fn equity_at(&self, property: &InvestmentProperty, years: f64) -> f64 {
        let value = compound(amount(property.current_value), self.rates.property_growth, years);
        let balance = outstanding(
            property.loan_amount,
            property.interest_rate,
            property.loan_term_years,
            years,
        );
        (value - balance).max(0.0)
    }

    /// Rent less running costs less loan repayments, accumulated in cash
    fn net_property_cashflow(&self, property: &InvestmentProperty, years: f64) -> f64 {
        let r = &self.rates;
        let rent = growing_annuity(property.annual_rent(), r.cash_return, r.rent_growth, years);
        let expenses = growing_annuity(
            amount(property.annual_expenses),
            r.cash_return,
            r.inflation,
            years,
        );

        let term = finite_or_zero(property.loan_term_years);
        let loan_cost = if term > 0.0 {
            let paying_years = years.min(term);
            growing_annuity(
                property.monthly_loan_repayment() * 12.0,
                r.cash_return,
                0.0,
                paying_years,
            ) * (1.0 + r.cash_return).powf(years - paying_years)
        } else {
            // no term: interest only for the whole horizon
            growing_annuity(property.annual_interest(), r.cash_return, 0.0, years)
        };

        rent - expenses - loan_cost
    }
}

/// Scheduled balance after `years`; loans without a term are carried at face value
fn outstanding(principal: f64, rate_pct: f64, term_years: f64, years: f64) -> f64 {
    let term_years = finite_or_zero(term_years);
    if term_years <= 0.0 {
        return amount(principal);
    }
    amortization::remaining_balance(principal, pct_to_decimal(rate_pct), term_years, years)
}

fn liability_outstanding(liability: &Liability, years: f64) -> f64 {
    let term = if liability.years_remaining > 0.0 {
        liability.years_remaining
    } else {
        liability.loan_term_years
    };
    outstanding(liability.balance_owing, liability.interest_rate, term, years)
}
