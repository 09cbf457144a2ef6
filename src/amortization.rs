//! Amortization formulas shared by the projection and serviceability engines
//!
//! All rates here are annual decimals (0.06 for 6%) and terms are in years;
//! repayments are monthly. Callers holding percentages convert first.
//!
//! The three loan functions are mutually consistent: feeding the output of
//! [`max_borrowing_capacity`] back through [`loan_payment`] reproduces the
//! monthly capacity to floating-point tolerance.

/// Monthly periodic rates below this are treated as interest free
const ZERO_RATE_EPSILON: f64 = 1e-12;

/// Map NaN and infinities to zero
///
/// Inputs arrive from partially completed forms, so non-finite values are
/// treated as missing rather than propagated.
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Sanitise a monetary amount: non-finite or negative becomes 0
pub(crate) fn amount(value: f64) -> f64 {
    finite_or_zero(value).max(0.0)
}

/// Convert an annual percentage (6.5) to a decimal rate (0.065)
pub fn pct_to_decimal(pct: f64) -> f64 {
    finite_or_zero(pct) / 100.0
}

/// Monthly repayment on a fully amortizing loan
///
/// Standard formula `PMT = P·r(1+r)^n / ((1+r)^n − 1)` with `r = annual_rate / 12`
/// and `n = term_years · 12`. An interest-free loan repays `P / n`.
///
/// # Returns
/// * `0.0` when `principal <= 0` or `term_years <= 0`
pub fn loan_payment(principal: f64, annual_rate: f64, term_years: f64) -> f64 {
    let principal = amount(principal);
    let term_years = finite_or_zero(term_years);
    if principal <= 0.0 || term_years <= 0.0 {
        return 0.0;
    }

    let n = term_years * 12.0;
    let r = finite_or_zero(annual_rate).max(0.0) / 12.0;
    if r < ZERO_RATE_EPSILON {
        return principal / n;
    }

    let growth = (1.0 + r).powf(n);
    principal * r * growth / (growth - 1.0)
}

/// Largest principal a given monthly repayment can service
///
/// Algebraic inverse of [`loan_payment`]: `P = C·((1+r)^n − 1) / (r(1+r)^n)`,
/// falling back to `C·n` when the rate is zero.
pub fn max_borrowing_capacity(monthly_capacity: f64, annual_rate: f64, term_years: f64) -> f64 {
    let capacity = amount(monthly_capacity);
    let term_years = finite_or_zero(term_years);
    if capacity <= 0.0 || term_years <= 0.0 {
        return 0.0;
    }

    let n = term_years * 12.0;
    let r = finite_or_zero(annual_rate).max(0.0) / 12.0;
    if r < ZERO_RATE_EPSILON {
        return capacity * n;
    }

    let growth = (1.0 + r).powf(n);
    capacity * (growth - 1.0) / (r * growth)
}

/// Outstanding balance after `years_elapsed` of scheduled repayments
///
/// Evaluates `B_k = P(1+r)^k − PMT·((1+r)^k − 1)/r` at `k = years_elapsed · 12`.
/// Returns the full principal before the first repayment and 0 once the term
/// has run out.
pub fn remaining_balance(
    principal: f64,
    annual_rate: f64,
    term_years: f64,
    years_elapsed: f64,
) -> f64 {
    let principal = amount(principal);
    let term_years = finite_or_zero(term_years);
    let years_elapsed = finite_or_zero(years_elapsed);
    if principal <= 0.0 || term_years <= 0.0 || years_elapsed >= term_years {
        return 0.0;
    }
    if years_elapsed <= 0.0 {
        return principal;
    }

    let payment = loan_payment(principal, annual_rate, term_years);
    let k = years_elapsed * 12.0;
    let r = finite_or_zero(annual_rate).max(0.0) / 12.0;

    let balance = if r < ZERO_RATE_EPSILON {
        principal - payment * k
    } else {
        let growth = (1.0 + r).powf(k);
        principal * growth - payment * (growth - 1.0) / r
    };

    balance.max(0.0)
}

/// Normalise a repayment made `periods_per_year` times a year to a monthly amount
pub fn to_monthly(amount_per_period: f64, periods_per_year: f64) -> f64 {
    amount(amount_per_period) * finite_or_zero(periods_per_year).max(0.0) / 12.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::{prop_assert, proptest};

    #[test]
    fn test_zero_rate_identity() {
        let payment = loan_payment(120_000.0, 0.0, 10.0);
        assert_abs_diff_eq!(payment, 1000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_standard_payment() {
        // 500k over 30 years at 6% is the textbook 2,997.75/month
        let payment = loan_payment(500_000.0, 0.06, 30.0);
        assert_abs_diff_eq!(payment, 2997.75, epsilon = 0.01);
    }

    #[test]
    fn test_degenerate_inputs_return_zero() {
        assert_eq!(loan_payment(0.0, 0.06, 30.0), 0.0);
        assert_eq!(loan_payment(-10.0, 0.06, 30.0), 0.0);
        assert_eq!(loan_payment(100_000.0, 0.06, 0.0), 0.0);
        assert_eq!(loan_payment(f64::NAN, 0.06, 30.0), 0.0);
        assert_eq!(max_borrowing_capacity(0.0, 0.06, 30.0), 0.0);
        assert_eq!(max_borrowing_capacity(2000.0, 0.06, -1.0), 0.0);
    }

    #[test]
    fn test_max_borrowing_matches_published_figure() {
        let principal = max_borrowing_capacity(2000.0, 0.06, 30.0);
        assert_abs_diff_eq!(principal, 333_583.23, epsilon = 0.01);

        let payment = loan_payment(principal, 0.06, 30.0);
        assert_abs_diff_eq!(payment, 2000.0, epsilon = 0.005);
    }

    #[test]
    fn test_zero_rate_capacity() {
        assert_abs_diff_eq!(max_borrowing_capacity(1000.0, 0.0, 10.0), 120_000.0, epsilon = 1e-9);
    }

    #[test]
    fn test_remaining_balance_endpoints() {
        assert_eq!(remaining_balance(300_000.0, 0.06, 30.0, 0.0), 300_000.0);
        assert_eq!(remaining_balance(300_000.0, 0.06, 30.0, 30.0), 0.0);
        assert_eq!(remaining_balance(300_000.0, 0.06, 30.0, 45.0), 0.0);

        // Interest free: half the term leaves half the principal
        assert_abs_diff_eq!(remaining_balance(120_000.0, 0.0, 10.0, 5.0), 60_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_remaining_balance_front_loaded_interest() {
        // With interest, less than half the principal is repaid at the halfway point
        let balance = remaining_balance(300_000.0, 0.06, 30.0, 15.0);
        assert!(balance > 150_000.0 && balance < 300_000.0, "balance {}", balance);
        assert_abs_diff_eq!(balance, 213_146.6, epsilon = 2.0);
    }

    #[test]
    fn test_remaining_balance_decreases_each_year() {
        let mut previous = f64::MAX;
        for year in 0..=25 {
            let balance = remaining_balance(400_000.0, 0.055, 25.0, year as f64);
            assert!(balance < previous);
            previous = balance;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn test_to_monthly() {
        assert_abs_diff_eq!(to_monthly(100.0, 52.0), 433.333_333, epsilon = 1e-5);
        assert_abs_diff_eq!(to_monthly(100.0, 26.0), 216.666_666, epsilon = 1e-5);
        assert_eq!(to_monthly(100.0, 12.0), 100.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(256))]

        #[test]
        fn prop_payment_capacity_round_trip_within_a_cent(
            principal in 1_000.0_f64..5_000_000.0,
            rate in 0.0_f64..0.99,
            term in 1_u32..=40,
        ) {
            let term = term as f64;
            let payment = loan_payment(principal, rate, term);
            let capacity = max_borrowing_capacity(payment, rate, term);
            let round_trip = loan_payment(capacity, rate, term);
            prop_assert!((round_trip - payment).abs() < 0.01,
                "payment {} round trip {}", payment, round_trip);
        }

        #[test]
        fn prop_balance_bounded_by_principal(
            principal in 1_000.0_f64..2_000_000.0,
            rate in 0.0_f64..0.2,
            term in 1_u32..=40,
            elapsed in 0.0_f64..50.0,
        ) {
            let balance = remaining_balance(principal, rate, term as f64, elapsed);
            prop_assert!(balance.is_finite());
            prop_assert!(balance >= 0.0 && balance <= principal + 1e-6);
        }
    }
}
