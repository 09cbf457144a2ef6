//! CSV-based schedule loader
//!
//! Loads the annual tax tables and the scalar retirement and lending rules
//! from CSV files in data/schedules/ so a new financial year can be dropped
//! in without a rebuild.

use std::fs::File;
use std::path::Path;

use serde::Deserialize;

use super::tax_tables::{RepaymentBand, SurchargeTier, TaxBracket};
use crate::error::{PlannerError, Result};

/// Default path to the schedules directory
pub const DEFAULT_SCHEDULES_PATH: &str = "data/schedules";

/// Tolerance when checking that adjacent bands meet
const EDGE_TOLERANCE: f64 = 0.005;

#[derive(Debug, Deserialize)]
struct BracketRow {
    min: f64,
    max: Option<f64>,
    rate: f64,
    base_tax: f64,
}

#[derive(Debug, Deserialize)]
struct ThresholdRow {
    threshold: f64,
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct SettingRow {
    key: String,
    value: String,
}

fn open(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| PlannerError::io(path, e))?;
    Ok(csv::Reader::from_reader(file))
}

/// Load income tax brackets; rejects gaps, overlaps and discontinuous base tax
pub fn load_tax_brackets(path: &Path) -> Result<Vec<TaxBracket>> {
    let mut reader = open(&path.join("tax_brackets.csv"))?;
    let mut brackets = Vec::new();

    for result in reader.deserialize() {
        let row: BracketRow = result?;
        brackets.push(TaxBracket {
            min: row.min,
            max: row.max,
            rate: row.rate,
            base_tax: row.base_tax,
        });
    }

    validate_brackets(&mut brackets)?;
    Ok(brackets)
}

fn validate_brackets(brackets: &mut [TaxBracket]) -> Result<()> {
    if brackets.is_empty() {
        return Err(PlannerError::InvalidSchedule("tax_brackets.csv has no rows".into()));
    }
    brackets.sort_by(|a, b| a.min.total_cmp(&b.min));

    for pair in brackets.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        let Some(max) = lower.max else {
            return Err(PlannerError::InvalidSchedule(format!(
                "open-ended bracket at {} is not the top bracket",
                lower.min
            )));
        };
        if (max - upper.min).abs() > EDGE_TOLERANCE {
            return Err(PlannerError::InvalidSchedule(format!(
                "bracket ending at {} does not meet bracket starting at {}",
                max, upper.min
            )));
        }
        let carried = lower.tax_on(max);
        if (carried - upper.base_tax).abs() > EDGE_TOLERANCE {
            return Err(PlannerError::InvalidSchedule(format!(
                "base tax {} at {} does not match {} carried from the band below",
                upper.base_tax, upper.min, carried
            )));
        }
    }
    Ok(())
}

/// Load a `threshold,rate` table (repayment bands, surcharge tiers)
fn load_threshold_table(path: &Path, file_name: &str) -> Result<Vec<(f64, f64)>> {
    let mut reader = open(&path.join(file_name))?;
    let mut rows = Vec::new();

    for result in reader.deserialize() {
        let row: ThresholdRow = result?;
        if !(row.rate >= 0.0 && row.rate < 1.0) {
            return Err(PlannerError::InvalidSchedule(format!(
                "{}: rate {} at threshold {} is not a decimal fraction",
                file_name, row.rate, row.threshold
            )));
        }
        rows.push((row.threshold, row.rate));
    }

    Ok(rows)
}

/// Load income-contingent repayment bands
pub fn load_repayment_bands(path: &Path) -> Result<Vec<RepaymentBand>> {
    Ok(load_threshold_table(path, "repayment_bands.csv")?
        .into_iter()
        .map(|(threshold, rate)| RepaymentBand { threshold, rate })
        .collect())
}

/// Load levy surcharge tiers
pub fn load_surcharge_tiers(path: &Path) -> Result<Vec<SurchargeTier>> {
    Ok(load_threshold_table(path, "levy_surcharge.csv")?
        .into_iter()
        .map(|(threshold, rate)| SurchargeTier { threshold, rate })
        .collect())
}

/// Load scalar settings (financial year, levy rate, company tax rate, ...)
pub fn load_settings(path: &Path) -> Result<Vec<(String, String)>> {
    let mut reader = open(&path.join("settings.csv"))?;
    let mut settings = Vec::new();

    for result in reader.deserialize() {
        let row: SettingRow = result?;
        settings.push((row.key.trim().to_string(), row.value.trim().to_string()));
    }

    Ok(settings)
}

/// All schedule tables loaded from one directory
pub struct LoadedSchedules {
    pub tax_brackets: Vec<TaxBracket>,
    pub repayment_bands: Vec<RepaymentBand>,
    pub surcharge_tiers: Vec<SurchargeTier>,
    pub settings: Vec<(String, String)>,
}

impl LoadedSchedules {
    /// Load all tables from the default path
    pub fn load_default() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_SCHEDULES_PATH))
    }

    /// Load all tables from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let loaded = Self {
            tax_brackets: load_tax_brackets(path)?,
            repayment_bands: load_repayment_bands(path)?,
            surcharge_tiers: load_surcharge_tiers(path)?,
            settings: load_settings(path)?,
        };
        log::debug!(
            "Loaded schedules from {}: {} brackets, {} repayment bands, {} surcharge tiers",
            path.display(),
            loaded.tax_brackets.len(),
            loaded.repayment_bands.len(),
            loaded.surcharge_tiers.len()
        );
        Ok(loaded)
    }

    /// Raw value of a setting, if present
    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Numeric setting; missing keys fall back to `default`, unparseable ones are errors
    pub fn number(&self, key: &str, default: f64) -> Result<f64> {
        match self.setting(key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| {
                PlannerError::InvalidSchedule(format!("setting {} = {:?} is not a number", key, raw))
            }),
        }
    }
}
