//! Planning assumptions: economic rates plus the regulatory and lending schedules

mod economic;
mod lending;
mod retirement;
mod tax_tables;
pub mod loader;

pub use economic::{AssumptionSet, GrowthRates};
pub use lending::LendingPolicy;
pub use loader::LoadedSchedules;
pub use retirement::RetirementSchedule;
pub use tax_tables::{
    FinancialYear, LevySchedule, RepaymentBand, RepaymentSchedule, SurchargeTier, TaxBracket,
    TaxBrackets, TaxSchedule,
};

use std::path::Path;

use crate::error::{PlannerError, Result};

/// Container for every domain-constant schedule the engines consult
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Schedules {
    pub tax: TaxSchedule,
    pub retirement: RetirementSchedule,
    pub lending: LendingPolicy,
}

impl Schedules {
    /// Built-in 2024-25 Australian schedules
    pub fn australia_2024_25() -> Self {
        Self {
            tax: TaxSchedule::australia_2024_25(),
            retirement: RetirementSchedule::australia_2024_25(),
            lending: LendingPolicy::standard(),
        }
    }

    /// Load schedules from CSV files in the default location (data/schedules/)
    pub fn from_csv() -> Result<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_SCHEDULES_PATH))
    }

    /// Load schedules from CSV files in a specific directory
    ///
    /// Tables come from the CSV files. Scalar rules are read from settings.csv,
    /// and any key it omits keeps its built-in value.
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let loaded = LoadedSchedules::load_from(path)?;
        let defaults = Self::australia_2024_25();

        let start_year = match loaded.setting("financial_year") {
            None => defaults.tax.financial_year.start_year,
            Some(raw) => raw.parse().map_err(|_| {
                PlannerError::InvalidSchedule(format!("financial_year {:?} is not a year", raw))
            })?,
        };
        let levy_rate = loaded.number("levy_rate", defaults.tax.levy.rate)?;
        let levy_threshold =
            loaded.number("levy_low_income_threshold", defaults.tax.levy.low_income_threshold)?;
        let company_tax_rate = loaded.number("company_tax_rate", defaults.tax.company_tax_rate)?;
        let retirement = retirement_from_settings(&loaded, &defaults.retirement)?;
        let lending = lending_from_settings(&loaded, &defaults.lending)?;

        let LoadedSchedules {
            tax_brackets,
            repayment_bands,
            surcharge_tiers,
            ..
        } = loaded;

        let tax = TaxSchedule {
            financial_year: FinancialYear::new(start_year),
            brackets: TaxBrackets::new(tax_brackets),
            levy: LevySchedule::new(levy_rate, levy_threshold, surcharge_tiers),
            repayment: RepaymentSchedule::new(repayment_bands),
            company_tax_rate,
        };

        log::info!("Loaded {} schedules from {}", tax.financial_year, path.display());

        Ok(Self {
            tax,
            retirement,
            lending,
        })
    }
}

fn retirement_from_settings(
    loaded: &LoadedSchedules,
    defaults: &RetirementSchedule,
) -> Result<RetirementSchedule> {
    Ok(RetirementSchedule {
        guarantee_rate: loaded.number("guarantee_rate", defaults.guarantee_rate)?,
        concessional_cap: loaded.number("concessional_cap", defaults.concessional_cap)?,
        contributions_tax_rate: loaded
            .number("contributions_tax_rate", defaults.contributions_tax_rate)?,
        income_replacement_ratio: loaded
            .number("income_replacement_ratio", defaults.income_replacement_ratio)?,
    })
}

fn lending_from_settings(loaded: &LoadedSchedules, defaults: &LendingPolicy) -> Result<LendingPolicy> {
    Ok(LendingPolicy {
        retention_fraction: loaded.number("retention_fraction", defaults.retention_fraction)?,
        rental_shading: loaded.number("rental_shading", defaults.rental_shading)?,
        max_lvr: loaded.number("max_lvr", defaults.max_lvr)?,
        rental_yield: loaded.number("rental_yield", defaults.rental_yield)?,
        property_expense_ratio: loaded
            .number("property_expense_ratio", defaults.property_expense_ratio)?,
        stress_margin: loaded.number("stress_margin", defaults.stress_margin)?,
        buffer_fraction: loaded.number("buffer_fraction", defaults.buffer_fraction)?,
        serviceability_ceiling: loaded
            .number("serviceability_ceiling", defaults.serviceability_ceiling)?,
        assessment_rate: loaded.number("assessment_rate", defaults.assessment_rate)?,
        loan_term_years: loaded.number("loan_term_years", defaults.loan_term_years)?,
    })
}

impl Default for Schedules {
    fn default() -> Self {
        Self::australia_2024_25()
    }
}
