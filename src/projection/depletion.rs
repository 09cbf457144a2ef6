//! How long a balance lasts under a steady monthly drawdown

use crate::amortization::{amount, finite_or_zero};

/// Years until `savings` is exhausted by `monthly_deficit`, earning
/// `annual_return_pct` (compounded monthly) on the remaining balance
///
/// Solves `months = −ln(1 − B·i/D) / ln(1 + i)` for monthly rate `i`.
///
/// # Returns
/// * `None` when the balance never runs out (no deficit, or earnings cover it)
/// * `Some(0.0)` when there is a deficit but no savings to draw on
pub fn savings_depletion(savings: f64, monthly_deficit: f64, annual_return_pct: f64) -> Option<f64> {
    let balance = amount(savings);
    let deficit = finite_or_zero(monthly_deficit);
    if deficit <= 0.0 {
        return None;
    }
    if balance <= 0.0 {
        return Some(0.0);
    }

    let i = finite_or_zero(annual_return_pct).max(0.0) / 100.0 / 12.0;
    if i <= 0.0 {
        return Some(balance / deficit / 12.0);
    }

    let interest = balance * i;
    if deficit <= interest {
        return None;
    }

    let months = -(1.0 - interest / deficit).ln() / (1.0 + i).ln();
    Some(months / 12.0)
}
