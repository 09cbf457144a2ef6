//! Household monthly cashflow after tax and existing commitments

use serde::{Deserialize, Serialize};

use crate::amortization::amount;
use crate::profile::FinancialProfile;
use crate::tax::TaxResult;

/// What is left each month once tax, living costs and existing debts are paid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySurplus {
    pub gross_monthly_income: f64,
    pub monthly_tax: f64,
    pub net_monthly_income: f64,
    pub living_expenses: f64,
    /// Liability repayments normalised to monthly
    pub liability_repayments: f64,
    /// Investment property loan repayments plus running costs
    pub property_holding_costs: f64,
    /// May be negative
    pub surplus: f64,
}

impl MonthlySurplus {
    pub fn from_profile(profile: &FinancialProfile, tax: &TaxResult) -> Self {
        let gross_monthly_income = tax.gross_income / 12.0;
        let monthly_tax = tax.monthly_tax();
        let net_monthly_income = gross_monthly_income - monthly_tax;
        let living_expenses = profile.living_expenses();
        let liability_repayments = profile.monthly_liability_repayments();
        let property_holding_costs = profile.monthly_property_repayments()
            + profile
                .investment_properties
                .iter()
                .map(|p| amount(p.annual_expenses) / 12.0)
                .sum::<f64>();

        let surplus =
            net_monthly_income - living_expenses - liability_repayments - property_holding_costs;

        Self {
            gross_monthly_income,
            monthly_tax,
            net_monthly_income,
            living_expenses,
            liability_repayments,
            property_holding_costs,
            surplus,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.surplus > 0.0
    }
}
