//! Load household profiles from JSON documents or a flat households CSV
//!
//! The JSON form is the full `FinancialProfile` as produced by the advisor
//! front end. The CSV form is a one-row-per-household summary used for batch
//! runs; it covers the common fields and leaves the itemised lists empty
//! apart from one asset per populated balance column.

use std::fs;
use std::path::Path;

use csv::Reader;

use super::{Asset, AssetClass, FinancialProfile, IncomeSources, Liability};
use crate::error::{PlannerError, Result};

/// Raw CSV row matching the households.csv columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "CurrentAge")]
    current_age: u32,
    #[serde(rename = "RetirementAge")]
    retirement_age: u32,
    #[serde(rename = "EmploymentIncome", default)]
    employment_income: f64,
    #[serde(rename = "InvestmentIncome", default)]
    investment_income: f64,
    #[serde(rename = "FrankedDividends", default)]
    franked_dividends: f64,
    #[serde(rename = "MonthlyExpenses", default)]
    monthly_expenses: f64,
    #[serde(rename = "SuperBalance", default)]
    super_balance: f64,
    #[serde(rename = "Shares", default)]
    shares: f64,
    #[serde(rename = "Cash", default)]
    cash: f64,
    #[serde(rename = "HomeLoanBalance", default)]
    home_loan_balance: f64,
    #[serde(rename = "HomeLoanMonthlyRepayment", default)]
    home_loan_repayment: f64,
    #[serde(rename = "HecsBalance", default)]
    hecs_balance: f64,
    #[serde(rename = "PrivateCover", default)]
    private_cover: String,
}

impl CsvRow {
    fn to_profile(self) -> Result<FinancialProfile> {
        let has_private_cover = match self.private_cover.trim() {
            "" | "N" | "No" | "false" => false,
            "Y" | "Yes" | "true" => true,
            other => {
                return Err(PlannerError::InvalidRecord(format!(
                    "household {}: unknown PrivateCover value {:?}",
                    self.name, other
                )))
            }
        };

        let assets = [
            ("Superannuation", self.super_balance, AssetClass::RetirementFund),
            ("Shares", self.shares, AssetClass::Shares),
            ("Cash", self.cash, AssetClass::Cash),
        ]
        .into_iter()
        .filter(|(_, value, _)| *value > 0.0)
        .map(|(name, value, class)| Asset::new(name, value, class))
        .collect();

        let liabilities = if self.home_loan_balance > 0.0 || self.home_loan_repayment > 0.0 {
            vec![Liability {
                balance_owing: self.home_loan_balance,
                repayment_amount: self.home_loan_repayment,
                ..Default::default()
            }]
        } else {
            Vec::new()
        };

        Ok(FinancialProfile {
            name: self.name,
            current_age: self.current_age,
            retirement_age: self.retirement_age,
            income: IncomeSources {
                employment: self.employment_income,
                investment: self.investment_income,
                franked_dividends: self.franked_dividends,
                ..Default::default()
            },
            monthly_living_expenses: self.monthly_expenses,
            assets,
            liabilities,
            has_private_cover,
            hecs_balance: self.hecs_balance,
            ..Default::default()
        })
    }
}

/// Load a single profile from a JSON file
pub fn load_profile<P: AsRef<Path>>(path: P) -> Result<FinancialProfile> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| PlannerError::io(path, e))?;
    let profile = serde_json::from_str(&text)?;
    log::debug!("Loaded profile from {}", path.display());
    Ok(profile)
}

/// Load a single profile from any reader holding JSON
pub fn load_profile_from_reader<R: std::io::Read>(reader: R) -> Result<FinancialProfile> {
    Ok(serde_json::from_reader(reader)?)
}

/// Load every household from a summary CSV file
pub fn load_households<P: AsRef<Path>>(path: P) -> Result<Vec<FinancialProfile>> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|e| PlannerError::io(path, e))?;
    let households = load_households_from_reader(file)?;
    log::info!("Loaded {} households from {}", households.len(), path.display());
    Ok(households)
}

/// Load households from any reader (e.g., string buffer, uploaded file)
pub fn load_households_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<FinancialProfile>> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut households = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = result?;
        households.push(row.to_profile()?);
    }

    Ok(households)
}
