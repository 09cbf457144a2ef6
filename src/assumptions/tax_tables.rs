//! Income tax, levy and study-loan repayment schedules
//!
//! These are the annual regulatory tables. The tax engine only ever looks
//! bands up through the methods here, so a new year's schedule (or another
//! jurisdiction's) is a data change.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Australian financial year, 1 July to 30 June, identified by its start year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FinancialYear {
    pub start_year: i32,
}

impl FinancialYear {
    pub fn new(start_year: i32) -> Self {
        Self { start_year }
    }

    /// Financial year a calendar date falls in
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= 7 {
            Self::new(date.year())
        } else {
            Self::new(date.year() - 1)
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.start_year, 7, 1)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.start_year + 1, 6, 30)
    }
}

impl fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.start_year, (self.start_year + 1) % 100)
    }
}

/// One marginal income tax band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Income above which this band applies
    pub min: f64,
    /// Upper bound of the band (None for the top band)
    pub max: Option<f64>,
    /// Marginal rate as a decimal
    pub rate: f64,
    /// Tax payable on all income up to `min`
    pub base_tax: f64,
}

impl TaxBracket {
    /// Tax on `income`, assuming it falls in this band
    pub fn tax_on(&self, income: f64) -> f64 {
        self.base_tax + (income - self.min) * self.rate
    }
}

/// Ordered, non-overlapping set of tax bands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBrackets {
    /// Sorted ascending by `min`
    brackets: Vec<TaxBracket>,
}

impl TaxBrackets {
    /// Build from bands in any order; they are kept sorted ascending
    pub fn new(mut brackets: Vec<TaxBracket>) -> Self {
        brackets.sort_by(|a, b| a.min.total_cmp(&b.min));
        Self { brackets }
    }

    /// Resident rates for 2024-25
    pub fn resident_2024_25() -> Self {
        Self::new(vec![
            TaxBracket { min: 0.0, max: Some(18_200.0), rate: 0.0, base_tax: 0.0 },
            TaxBracket { min: 18_200.0, max: Some(45_000.0), rate: 0.16, base_tax: 0.0 },
            TaxBracket { min: 45_000.0, max: Some(135_000.0), rate: 0.30, base_tax: 4_288.0 },
            TaxBracket { min: 135_000.0, max: Some(190_000.0), rate: 0.37, base_tax: 31_288.0 },
            TaxBracket { min: 190_000.0, max: None, rate: 0.45, base_tax: 51_638.0 },
        ])
    }

    /// Band containing `income`, scanning from the highest band down
    ///
    /// A band covers `(min, max]`, so income exactly on an edge belongs to the
    /// lower band. Returns None for income ≤ 0.
    pub fn find(&self, income: f64) -> Option<&TaxBracket> {
        if !(income > 0.0) {
            return None;
        }
        self.brackets.iter().rev().find(|b| income > b.min)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaxBracket> {
        self.brackets.iter()
    }

    pub fn len(&self) -> usize {
        self.brackets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.brackets.is_empty()
    }
}

/// One step of the no-private-cover levy surcharge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurchargeTier {
    /// Income above which this tier applies
    pub threshold: f64,
    /// Surcharge rate as a decimal
    pub rate: f64,
}

/// Health levy plus the income-tested surcharge for those without private cover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevySchedule {
    /// Flat levy rate as a decimal
    pub rate: f64,
    /// No levy at or below this taxable income
    pub low_income_threshold: f64,
    /// Surcharge tiers sorted ascending by threshold
    pub surcharge_tiers: Vec<SurchargeTier>,
}

impl LevySchedule {
    /// 2024-25 singles thresholds
    pub fn singles_2024_25() -> Self {
        Self::new(
            0.02,
            27_222.0,
            vec![
                SurchargeTier { threshold: 97_000.0, rate: 0.01 },
                SurchargeTier { threshold: 113_000.0, rate: 0.0125 },
                SurchargeTier { threshold: 151_000.0, rate: 0.015 },
            ],
        )
    }

    pub fn new(rate: f64, low_income_threshold: f64, mut surcharge_tiers: Vec<SurchargeTier>) -> Self {
        surcharge_tiers.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
        Self {
            rate,
            low_income_threshold,
            surcharge_tiers,
        }
    }

    /// Flat levy rate applicable at `taxable_income`
    pub fn base_rate(&self, taxable_income: f64) -> f64 {
        if taxable_income > self.low_income_threshold {
            self.rate
        } else {
            0.0
        }
    }

    /// Surcharge rate at `taxable_income`, highest tier first
    pub fn surcharge_rate(&self, taxable_income: f64, has_private_cover: bool) -> f64 {
        if has_private_cover {
            return 0.0;
        }
        self.surcharge_tiers
            .iter()
            .rev()
            .find(|t| taxable_income > t.threshold)
            .map(|t| t.rate)
            .unwrap_or(0.0)
    }
}

/// Income band for compulsory study-loan repayment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepaymentBand {
    /// Repayment income at or above which this rate applies
    pub threshold: f64,
    /// Rate applied to the whole repayment income
    pub rate: f64,
}

/// Income-contingent repayment table keyed on gross income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentSchedule {
    /// Sorted ascending by threshold
    bands: Vec<RepaymentBand>,
}

impl RepaymentSchedule {
    pub fn new(mut bands: Vec<RepaymentBand>) -> Self {
        bands.sort_by(|a, b| a.threshold.total_cmp(&b.threshold));
        Self { bands }
    }

    /// HELP repayment thresholds for 2024-25
    pub fn help_2024_25() -> Self {
        let table = [
            (54_435.0, 0.010),
            (62_851.0, 0.020),
            (66_621.0, 0.025),
            (70_619.0, 0.030),
            (74_856.0, 0.035),
            (79_347.0, 0.040),
            (84_108.0, 0.045),
            (89_155.0, 0.050),
            (94_504.0, 0.055),
            (100_175.0, 0.060),
            (106_186.0, 0.065),
            (112_557.0, 0.070),
            (119_310.0, 0.075),
            (126_468.0, 0.080),
            (134_057.0, 0.085),
            (142_101.0, 0.090),
            (150_627.0, 0.095),
            (159_664.0, 0.100),
        ];
        Self::new(
            table
                .iter()
                .map(|&(threshold, rate)| RepaymentBand { threshold, rate })
                .collect(),
        )
    }

    /// Repayment rate for `gross_income`; 0 below the lowest band
    pub fn rate_for(&self, gross_income: f64) -> f64 {
        self.bands
            .iter()
            .rev()
            .find(|b| gross_income >= b.threshold)
            .map(|b| b.rate)
            .unwrap_or(0.0)
    }

    pub fn bands(&self) -> &[RepaymentBand] {
        &self.bands
    }
}

/// Every table the tax engine needs for one financial year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxSchedule {
    pub financial_year: FinancialYear,
    pub brackets: TaxBrackets,
    pub levy: LevySchedule,
    pub repayment: RepaymentSchedule,
    /// Company tax rate used to value franking credits
    pub company_tax_rate: f64,
}

impl TaxSchedule {
    pub fn australia_2024_25() -> Self {
        Self {
            financial_year: FinancialYear::new(2024),
            brackets: TaxBrackets::resident_2024_25(),
            levy: LevySchedule::singles_2024_25(),
            repayment: RepaymentSchedule::help_2024_25(),
            company_tax_rate: 0.30,
        }
    }
}

impl Default for TaxSchedule {
    fn default() -> Self {
        Self::australia_2024_25()
    }
}
