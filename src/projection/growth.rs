//! Compounding and growing-annuity formulas
//!
//! Rates are annual decimals and periods are whole years with contributions
//! made at the end of each year.

/// Spread between return and growth below which the annuity formula is unstable
pub const SINGULARITY_EPSILON: f64 = 1e-4;

/// Future value of `value` after `years` at `rate`
pub fn compound(value: f64, rate: f64, years: f64) -> f64 {
    value * (1.0 + rate).powf(years)
}

/// Future value of a contribution stream starting at `payment` and growing at
/// `growth` per year, invested at `rate`
///
/// `c·[(1+r)^n − (1+g)^n] / (r − g)`. When `r` and `g` are within
/// [`SINGULARITY_EPSILON`] the limit `c·n·(1+r)^(n−1)` is used instead.
pub fn growing_annuity(payment: f64, rate: f64, growth: f64, years: f64) -> f64 {
    if years <= 0.0 || payment == 0.0 {
        return 0.0;
    }
    if (rate - growth).abs() < SINGULARITY_EPSILON {
        log::trace!("growing annuity at r≈g ({:.6}), using limit form", rate);
        return payment * years * (1.0 + rate).powf(years - 1.0);
    }
    payment * ((1.0 + rate).powf(years) - (1.0 + growth).powf(years)) / (rate - growth)
}
