//! Household financial profile as supplied by the advisor-facing layer

use serde::{Deserialize, Serialize};

use crate::amortization::{self, amount, finite_or_zero, pct_to_decimal};
use crate::error::{PlannerError, Result};

/// Asset classes the projection engine grows differently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AssetClass {
    /// Superannuation / retirement fund balance
    RetirementFund,
    /// Listed shares and managed funds
    Shares,
    /// Bank deposits and general savings
    #[default]
    Cash,
    /// Lifestyle property (home, holiday house); not income producing
    Property,
    /// Anything else (vehicles, collectables, ...)
    Other,
}

/// A single asset line entered by the advisor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    pub value: f64,
    pub class: AssetClass,
}

impl Asset {
    pub fn new(name: impl Into<String>, value: f64, class: AssetClass) -> Self {
        Self {
            name: name.into(),
            value,
            class,
        }
    }
}

/// How often a liability repayment is made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Frequency {
    Weekly,
    Fortnightly,
    #[default]
    Monthly,
}

impl Frequency {
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Frequency::Weekly => 52.0,
            Frequency::Fortnightly => 26.0,
            Frequency::Monthly => 12.0,
        }
    }
}

/// An existing debt (home loan, car loan, credit card, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Liability {
    pub balance_owing: f64,
    /// Repayment per `frequency` period
    pub repayment_amount: f64,
    pub frequency: Frequency,
    /// Annual interest rate in percent
    pub interest_rate: f64,
    pub loan_term_years: f64,
    pub years_remaining: f64,
}

impl Liability {
    /// Repayment normalised to a monthly amount
    pub fn monthly_repayment(&self) -> f64 {
        amortization::to_monthly(self.repayment_amount, self.frequency.periods_per_year())
    }
}

/// A leveraged rental property
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvestmentProperty {
    pub current_value: f64,
    pub loan_amount: f64,
    /// Annual interest rate in percent
    pub interest_rate: f64,
    pub loan_term_years: f64,
    pub weekly_rent: f64,
    /// Rates, insurance, management, maintenance
    pub annual_expenses: f64,
}

impl InvestmentProperty {
    pub fn annual_rent(&self) -> f64 {
        amount(self.weekly_rent) * 52.0
    }

    /// First-year interest on the outstanding loan
    pub fn annual_interest(&self) -> f64 {
        amount(self.loan_amount) * pct_to_decimal(self.interest_rate).max(0.0)
    }

    /// Deductible holding costs: interest plus running expenses
    pub fn annual_deductible_costs(&self) -> f64 {
        self.annual_interest() + amount(self.annual_expenses)
    }

    /// Scheduled principal-and-interest repayment on the property loan
    pub fn monthly_loan_repayment(&self) -> f64 {
        amortization::loan_payment(
            self.loan_amount,
            pct_to_decimal(self.interest_rate),
            self.loan_term_years,
        )
    }

    pub fn equity(&self) -> f64 {
        (amount(self.current_value) - amount(self.loan_amount)).max(0.0)
    }
}

/// Annual income by source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IncomeSources {
    /// Salary and wages
    pub employment: f64,
    /// Rent from property not modelled as an `InvestmentProperty`
    pub rental: f64,
    /// Interest and unfranked dividends
    pub investment: f64,
    pub franked_dividends: f64,
    pub capital_gains: f64,
    pub other: f64,
}

impl IncomeSources {
    pub fn total(&self) -> f64 {
        amount(self.employment)
            + amount(self.rental)
            + amount(self.investment)
            + amount(self.franked_dividends)
            + amount(self.capital_gains)
            + amount(self.other)
    }
}

/// Snapshot of one household member (or a merged household)
///
/// Every field defaults when absent so a partially completed form still
/// deserialises; the engines treat missing values as zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancialProfile {
    /// Display name, carried through to batch output
    pub name: String,
    pub current_age: u32,
    pub retirement_age: u32,
    pub income: IncomeSources,
    pub monthly_living_expenses: f64,
    pub assets: Vec<Asset>,
    pub liabilities: Vec<Liability>,
    pub investment_properties: Vec<InvestmentProperty>,
    /// Holds private hospital cover (exempts from the levy surcharge)
    pub has_private_cover: bool,
    /// Outstanding income-contingent study loan
    pub hecs_balance: f64,
    /// Deductions other than investment property costs
    pub other_deductions: f64,
}

impl FinancialProfile {
    /// Annual rent across all modelled investment properties
    pub fn property_rent(&self) -> f64 {
        self.investment_properties.iter().map(|p| p.annual_rent()).sum()
    }

    /// Gross annual income: every income source plus property rent
    pub fn gross_annual_income(&self) -> f64 {
        self.income.total() + self.property_rent()
    }

    /// Total value of assets in one class
    pub fn assets_of_class(&self, class: AssetClass) -> f64 {
        self.assets
            .iter()
            .filter(|a| a.class == class)
            .map(|a| amount(a.value))
            .sum()
    }

    pub fn total_asset_value(&self) -> f64 {
        self.assets.iter().map(|a| amount(a.value)).sum::<f64>()
            + self
                .investment_properties
                .iter()
                .map(|p| amount(p.current_value))
                .sum::<f64>()
    }

    /// Balances owing on liabilities and investment property loans
    pub fn total_debt(&self) -> f64 {
        self.liabilities.iter().map(|l| amount(l.balance_owing)).sum::<f64>()
            + self
                .investment_properties
                .iter()
                .map(|p| amount(p.loan_amount))
                .sum::<f64>()
    }

    pub fn net_worth(&self) -> f64 {
        self.total_asset_value() - self.total_debt()
    }

    /// Existing liability repayments normalised to monthly
    pub fn monthly_liability_repayments(&self) -> f64 {
        self.liabilities.iter().map(|l| l.monthly_repayment()).sum()
    }

    /// Scheduled repayments on investment property loans
    pub fn monthly_property_repayments(&self) -> f64 {
        self.investment_properties
            .iter()
            .map(|p| p.monthly_loan_repayment())
            .sum()
    }

    pub fn living_expenses(&self) -> f64 {
        amount(self.monthly_living_expenses)
    }

    /// Years until retirement; rejects a retirement age that is not in the future
    pub fn years_to_retirement(&self) -> Result<u32> {
        if self.retirement_age <= self.current_age {
            return Err(PlannerError::InvalidHorizon {
                current_age: self.current_age,
                target_age: self.retirement_age,
            });
        }
        Ok(self.retirement_age - self.current_age)
    }
}

/// A new loan the household is applying for
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProposedLoan {
    pub amount: f64,
    /// Annual interest rate in percent
    pub interest_rate: f64,
    pub term_years: f64,
}

impl ProposedLoan {
    pub fn new(amount: f64, interest_rate: f64, term_years: f64) -> Self {
        Self {
            amount,
            interest_rate,
            term_years,
        }
    }

    pub fn monthly_payment(&self) -> f64 {
        self.payment_at_rate(self.interest_rate)
    }

    /// Repayment if the rate were `interest_rate` percent instead
    pub fn payment_at_rate(&self, interest_rate: f64) -> f64 {
        amortization::loan_payment(
            self.amount,
            pct_to_decimal(interest_rate),
            finite_or_zero(self.term_years),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample_profile() -> FinancialProfile {
        FinancialProfile {
            name: "Sample".to_string(),
            current_age: 40,
            retirement_age: 67,
            income: IncomeSources {
                employment: 120_000.0,
                investment: 2_000.0,
                ..Default::default()
            },
            monthly_living_expenses: 4_500.0,
            assets: vec![
                Asset::new("Super", 150_000.0, AssetClass::RetirementFund),
                Asset::new("ETF", 40_000.0, AssetClass::Shares),
                Asset::new("Offset", 25_000.0, AssetClass::Cash),
                Asset::new("Home", 900_000.0, AssetClass::Property),
            ],
            liabilities: vec![Liability {
                balance_owing: 500_000.0,
                repayment_amount: 1_500.0,
                frequency: Frequency::Fortnightly,
                interest_rate: 6.2,
                loan_term_years: 30.0,
                years_remaining: 25.0,
            }],
            investment_properties: vec![InvestmentProperty {
                current_value: 650_000.0,
                loan_amount: 520_000.0,
                interest_rate: 6.5,
                loan_term_years: 30.0,
                weekly_rent: 550.0,
                annual_expenses: 6_000.0,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_gross_income_includes_property_rent() {
        let profile = sample_profile();
        assert_abs_diff_eq!(profile.property_rent(), 28_600.0);
        assert_abs_diff_eq!(profile.gross_annual_income(), 150_600.0);
    }

    #[test]
    fn test_asset_subtotals() {
        let profile = sample_profile();
        assert_eq!(profile.assets_of_class(AssetClass::RetirementFund), 150_000.0);
        assert_eq!(profile.assets_of_class(AssetClass::Other), 0.0);
        assert_eq!(profile.total_asset_value(), 1_765_000.0);
        assert_eq!(profile.total_debt(), 1_020_000.0);
        assert_eq!(profile.net_worth(), 745_000.0);
    }

    #[test]
    fn test_frequency_normalisation() {
        let profile = sample_profile();
        assert_abs_diff_eq!(profile.monthly_liability_repayments(), 3_250.0, epsilon = 1e-9);
    }

    #[test]
    fn test_property_costs() {
        let property = &sample_profile().investment_properties[0];
        assert_abs_diff_eq!(property.annual_interest(), 33_800.0, epsilon = 1e-9);
        assert_abs_diff_eq!(property.annual_deductible_costs(), 39_800.0, epsilon = 1e-9);
        assert!(property.monthly_loan_repayment() > 33_800.0 / 12.0);
        assert_eq!(property.equity(), 130_000.0);
    }

    #[test]
    fn test_negative_amounts_are_ignored() {
        let mut profile = sample_profile();
        profile.assets.push(Asset::new("Typo", -50_000.0, AssetClass::Cash));
        profile.income.other = f64::NAN;
        assert_eq!(profile.assets_of_class(AssetClass::Cash), 25_000.0);
        assert_abs_diff_eq!(profile.gross_annual_income(), 150_600.0);
    }

    #[test]
    fn test_years_to_retirement() {
        let mut profile = sample_profile();
        assert_eq!(profile.years_to_retirement().unwrap(), 27);

        profile.retirement_age = 40;
        assert!(matches!(
            profile.years_to_retirement(),
            Err(PlannerError::InvalidHorizon { current_age: 40, target_age: 40 })
        ));
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let profile: FinancialProfile =
            serde_json::from_str(r#"{"currentAge": 35, "income": {"employment": 90000}}"#).unwrap();
        assert_eq!(profile.current_age, 35);
        assert_eq!(profile.retirement_age, 0);
        assert_eq!(profile.income.employment, 90_000.0);
        assert_eq!(profile.monthly_living_expenses, 0.0);
        assert!(profile.assets.is_empty());
        assert!(!profile.has_private_cover);
    }
}
