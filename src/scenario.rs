//! Plan runner for single and batch household evaluations
//!
//! Builds the tax, projection and serviceability engines once from a set of
//! schedules and assumptions, then runs any number of households through them.

use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assumptions::{AssumptionSet, Schedules};
use crate::cashflow::MonthlySurplus;
use crate::error::Result;
use crate::profile::{FinancialProfile, ProposedLoan};
use crate::projection::{ProjectionEngine, ProjectionResult, RetirementStatus};
use crate::serviceability::{ServiceabilityEngine, ServiceabilityResult};
use crate::tax::{TaxEngine, TaxResult};

/// Full evaluation of one household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    pub name: String,
    pub tax: TaxResult,
    pub cashflow: MonthlySurplus,
    /// Absent when the household has no forward horizon
    pub projection: Option<ProjectionResult>,
    pub projection_error: Option<String>,
    pub serviceability: ServiceabilityResult,
}

impl PlanResult {
    /// Flatten to one row for batch output
    pub fn summary(&self) -> PlanSummary {
        let projection = self.projection.as_ref().map(|p| p.summary());
        let projection = projection.as_ref();
        PlanSummary {
            name: self.name.clone(),
            gross_income: self.tax.gross_income,
            total_tax: self.tax.total_tax,
            after_tax_income: self.tax.after_tax_income,
            monthly_surplus: self.cashflow.surplus,
            years_to_retirement: projection.map(|p| p.years_to_target),
            net_worth_at_retirement: projection.map(|p| p.net_worth_at_target),
            lump_sum: projection.map(|p| p.lump_sum),
            projected_income: projection.map(|p| p.projected_income),
            required_income: projection.map(|p| p.required_income),
            monthly_gap: projection.map(|p| p.monthly_gap),
            status: projection.map(|p| p.status),
            max_loan: self.serviceability.capacity.max_loan,
            max_property_value: self.serviceability.capacity.max_property_value,
        }
    }
}

/// One household's headline figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub name: String,
    pub gross_income: f64,
    pub total_tax: f64,
    pub after_tax_income: f64,
    pub monthly_surplus: f64,
    pub years_to_retirement: Option<u32>,
    pub net_worth_at_retirement: Option<f64>,
    pub lump_sum: Option<f64>,
    pub projected_income: Option<f64>,
    pub required_income: Option<f64>,
    pub monthly_gap: Option<f64>,
    pub status: Option<RetirementStatus>,
    pub max_loan: f64,
    pub max_property_value: f64,
}

/// Pre-built engines for repeated household evaluations
///
/// # Example
/// ```ignore
/// let runner = PlanRunner::from_csv()?;
/// let households = load_households("households.csv")?;
/// let results = runner.run_batch(&households);
/// ```
#[derive(Debug, Clone)]
pub struct PlanRunner {
    schedules: Schedules,
    tax: TaxEngine,
    projection: ProjectionEngine,
    serviceability: ServiceabilityEngine,
}

impl PlanRunner {
    /// Create runner with built-in schedules and the standard assumptions
    pub fn new() -> Self {
        Self::with_schedules(Schedules::default(), AssumptionSet::standard())
    }

    /// Create runner by loading schedules from CSV files
    pub fn from_csv() -> Result<Self> {
        Ok(Self::with_schedules(Schedules::from_csv()?, AssumptionSet::standard()))
    }

    /// Create runner from a specific schedules directory
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        Ok(Self::with_schedules(
            Schedules::from_csv_path(path)?,
            AssumptionSet::standard(),
        ))
    }

    /// Create runner with pre-built schedules and assumptions
    pub fn with_schedules(schedules: Schedules, assumptions: AssumptionSet) -> Self {
        Self {
            tax: TaxEngine::new(schedules.tax.clone()),
            projection: ProjectionEngine::new(assumptions, &schedules),
            serviceability: ServiceabilityEngine::new(&schedules),
            schedules,
        }
    }

    /// Evaluate one household, optionally assessing a proposed loan
    pub fn run(&self, profile: &FinancialProfile, loan: Option<&ProposedLoan>) -> PlanResult {
        let tax = self.tax.calculate(profile);
        let cashflow = MonthlySurplus::from_profile(profile, &tax);

        let (projection, projection_error) = match self.projection.project(profile) {
            Ok(result) => (Some(result), None),
            Err(err) => {
                log::warn!("{}: projection skipped: {}", profile.name, err);
                (None, Some(err.to_string()))
            }
        };

        PlanResult {
            name: profile.name.clone(),
            tax,
            cashflow,
            projection,
            projection_error,
            serviceability: self.serviceability.evaluate(profile, loan),
        }
    }

    /// Evaluate many households in parallel
    pub fn run_batch(&self, profiles: &[FinancialProfile]) -> Vec<PlanResult> {
        profiles.par_iter().map(|p| self.run(p, None)).collect()
    }

    pub fn schedules(&self) -> &Schedules {
        &self.schedules
    }

    pub fn assumptions(&self) -> &AssumptionSet {
        self.projection.assumptions()
    }

    pub fn tax_engine(&self) -> &TaxEngine {
        &self.tax
    }

    pub fn projection_engine(&self) -> &ProjectionEngine {
        &self.projection
    }

    pub fn serviceability_engine(&self) -> &ServiceabilityEngine {
        &self.serviceability
    }
}

impl Default for PlanRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Asset, AssetClass, IncomeSources};

    fn test_profile(name: &str, employment: f64) -> FinancialProfile {
        FinancialProfile {
            name: name.to_string(),
            current_age: 35,
            retirement_age: 67,
            income: IncomeSources {
                employment,
                ..Default::default()
            },
            monthly_living_expenses: 3_500.0,
            assets: vec![Asset::new("Super", 120_000.0, AssetClass::RetirementFund)],
            has_private_cover: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_run_single_household() {
        let runner = PlanRunner::new();
        let loan = ProposedLoan::new(400_000.0, 6.0, 30.0);
        let result = runner.run(&test_profile("Chen", 140_000.0), Some(&loan));

        assert_eq!(result.name, "Chen");
        assert!(result.tax.total_tax > 0.0);
        assert!(result.projection.is_some());
        assert!(result.projection_error.is_none());
        assert!(result.serviceability.capacity.viable);
        assert!(result.serviceability.assessment.is_some());
    }

    #[test]
    fn test_invalid_horizon_keeps_other_results() {
        let runner = PlanRunner::new();
        let mut profile = test_profile("Retired", 90_000.0);
        profile.current_age = 70;

        let result = runner.run(&profile, None);
        assert!(result.projection.is_none());
        assert!(result
            .projection_error
            .as_deref()
            .is_some_and(|e| e.contains("must be after")));
        assert!(result.tax.total_tax > 0.0);
        assert!(result.summary().lump_sum.is_none());
    }

    #[test]
    fn test_summary_carries_projection_headlines() {
        let runner = PlanRunner::new();
        let result = runner.run(&test_profile("Chen", 140_000.0), None);
        let projection = result.projection.as_ref().unwrap().summary();

        let summary = result.summary();
        assert_eq!(summary.years_to_retirement, Some(32));
        assert_eq!(summary.net_worth_at_retirement, Some(projection.net_worth_at_target));
        assert_eq!(summary.lump_sum, Some(projection.lump_sum));
        assert_eq!(summary.status, Some(projection.status));
    }

    #[test]
    fn test_run_batch_preserves_order() {
        let runner = PlanRunner::new();
        let profiles: Vec<_> = [60_000.0, 90_000.0, 150_000.0]
            .iter()
            .enumerate()
            .map(|(i, &income)| test_profile(&format!("H{}", i), income))
            .collect();

        let results = runner.run_batch(&profiles);
        assert_eq!(results.len(), 3);
        assert_eq!(results[2].name, "H2");

        // Higher income should support a larger loan
        assert!(results[2].summary().max_loan > results[0].summary().max_loan);
        assert_eq!(results[0], runner.run(&profiles[0], None));
    }
}
