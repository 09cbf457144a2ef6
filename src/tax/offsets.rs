//! Negative gearing and franking credit helpers

use serde::{Deserialize, Serialize};

use crate::amortization::{amount, finite_or_zero};

/// Net rental loss and the tax it saves
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegativeGearing {
    pub net_loss: f64,
    pub benefit: f64,
}

/// Loss when deductible holding costs exceed rent, valued at `marginal_rate_pct`
///
/// A positively geared property has no loss and no benefit.
pub fn negative_gearing(
    annual_rent: f64,
    deductible_expenses: f64,
    marginal_rate_pct: f64,
) -> NegativeGearing {
    let net_loss = (amount(deductible_expenses) - amount(annual_rent)).max(0.0);
    let rate = finite_or_zero(marginal_rate_pct).max(0.0) / 100.0;
    NegativeGearing {
        net_loss,
        benefit: net_loss * rate,
    }
}

/// Credit attached to franked dividends at the company tax rate
pub fn franking_offset(franked_dividends: f64, company_tax_rate: f64) -> f64 {
    amount(franked_dividends) * finite_or_zero(company_tax_rate).max(0.0)
}
