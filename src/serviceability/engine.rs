//! Serviceability engine
//!
//! Two entry points share one retention rule: [`ServiceabilityEngine::retained_surplus`]
//! is the only place the living-income retention is applied.

use serde::{Deserialize, Serialize};

use super::result::{
    Assessment, BorrowingCapacity, LoanAssessment, ServiceabilityResult, StressTest,
};
use crate::amortization::{finite_or_zero, max_borrowing_capacity, pct_to_decimal};
use crate::assumptions::{LendingPolicy, Schedules};
use crate::cashflow::MonthlySurplus;
use crate::profile::{FinancialProfile, ProposedLoan};
use crate::tax::{TaxEngine, TaxResult};

/// Inputs for sizing the largest serviceable loan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CapacityRequest {
    pub gross_monthly_income: f64,
    /// After-tax surplus once living costs and existing debts are met
    pub monthly_surplus: f64,
    /// Percent; the policy assessment rate when absent
    pub interest_rate: Option<f64>,
    /// The policy term when absent
    pub term_years: Option<f64>,
    /// Loan-to-value ceiling as a fraction; the policy LVR when absent
    pub max_lvr: Option<f64>,
    /// Percent; the policy yield when absent
    pub rental_yield: Option<f64>,
    /// Share of rent lost to running costs; the policy ratio when absent
    pub property_expense_ratio: Option<f64>,
}

impl CapacityRequest {
    pub fn new(gross_monthly_income: f64, monthly_surplus: f64) -> Self {
        Self {
            gross_monthly_income,
            monthly_surplus,
            ..Default::default()
        }
    }

    pub fn from_surplus(surplus: &MonthlySurplus) -> Self {
        Self::new(surplus.gross_monthly_income, surplus.surplus)
    }
}

/// Applies a [`LendingPolicy`] to household cashflow
#[derive(Debug, Clone)]
pub struct ServiceabilityEngine {
    policy: LendingPolicy,
    tax: TaxEngine,
}

impl ServiceabilityEngine {
    pub fn new(schedules: &Schedules) -> Self {
        Self {
            policy: schedules.lending.clone(),
            tax: TaxEngine::new(schedules.tax.clone()),
        }
    }

    pub fn policy(&self) -> &LendingPolicy {
        &self.policy
    }

    /// Surplus available for a new commitment once the retained share of
    /// income is set aside for living; never negative
    pub fn retained_surplus(&self, gross_monthly_income: f64, monthly_surplus: f64) -> f64 {
        let free_income = gross_monthly_income * (1.0 - self.policy.retention_fraction);
        monthly_surplus.min(free_income).max(0.0)
    }

    /// Largest loan and property value the household's surplus can support
    pub fn max_serviceable_loan(&self, request: &CapacityRequest) -> BorrowingCapacity {
        let income = finite_or_zero(request.gross_monthly_income);
        let surplus = finite_or_zero(request.monthly_surplus);

        if income <= 0.0 {
            return BorrowingCapacity::not_viable("no income to service a loan");
        }
        if surplus <= 0.0 {
            return BorrowingCapacity::not_viable("no monthly surplus after existing commitments");
        }

        let available = self.retained_surplus(income, surplus);
        if available <= 0.0 {
            return BorrowingCapacity::not_viable("no surplus left after retaining living income");
        }

        let p = &self.policy;
        let rate = pct_to_decimal(request.interest_rate.unwrap_or(p.assessment_rate));
        let term = request.term_years.unwrap_or(p.loan_term_years);
        let max_lvr = request.max_lvr.unwrap_or(p.max_lvr);
        let rental_yield = request.rental_yield.unwrap_or(p.rental_yield);
        let expense_ratio = request
            .property_expense_ratio
            .unwrap_or(p.property_expense_ratio);

        // size once on surplus alone, then once more counting the purchase's rent
        let first_value = max_borrowing_capacity(available, rate, term) / max_lvr;
        let implied_rent = first_value * pct_to_decimal(rental_yield) / 12.0;
        let rental_contribution = p.rental_shading * implied_rent * (1.0 - expense_ratio);
        let monthly_capacity = available + rental_contribution;
        let max_loan = max_borrowing_capacity(monthly_capacity, rate, term);
        let max_property_value = max_loan / max_lvr;

        if !(max_loan.is_finite() && max_loan > 0.0)
            || !(max_property_value.is_finite() && max_property_value > 0.0)
            || !rental_contribution.is_finite()
        {
            log::debug!(
                "capacity degenerate: loan {} value {} from surplus {}",
                max_loan,
                max_property_value,
                available
            );
            return BorrowingCapacity::not_viable("borrowing capacity could not be determined");
        }

        log::debug!(
            "capacity: surplus {:.2} + rent {:.2} supports loan {:.0}, property {:.0}",
            available,
            rental_contribution,
            max_loan,
            max_property_value
        );

        BorrowingCapacity {
            viable: true,
            available_surplus: available,
            rental_contribution,
            monthly_capacity,
            max_loan,
            max_property_value,
            reason: None,
        }
    }

    /// Approve or decline a specific loan against the household's income
    pub fn assess_proposed_loan(
        &self,
        profile: &FinancialProfile,
        loan: &ProposedLoan,
    ) -> LoanAssessment {
        let tax = self.tax.calculate(profile);
        let cashflow = MonthlySurplus::from_profile(profile, &tax);
        self.assess_with(profile, &tax, &cashflow, loan)
    }

    /// Capacity for the household and, if given, the assessment of `loan`
    pub fn evaluate(
        &self,
        profile: &FinancialProfile,
        loan: Option<&ProposedLoan>,
    ) -> ServiceabilityResult {
        let tax = self.tax.calculate(profile);
        let cashflow = MonthlySurplus::from_profile(profile, &tax);

        ServiceabilityResult {
            capacity: self.max_serviceable_loan(&CapacityRequest::from_surplus(&cashflow)),
            assessment: loan.map(|loan| self.assess_with(profile, &tax, &cashflow, loan)),
        }
    }

    /// Ratio, buffer and stress checks run on income less income tax; the
    /// cashflow check runs on the full after-tax surplus
    fn assess_with(
        &self,
        profile: &FinancialProfile,
        tax: &TaxResult,
        cashflow: &MonthlySurplus,
        loan: &ProposedLoan,
    ) -> LoanAssessment {
        let p = &self.policy;
        let net = (tax.gross_income - tax.income_tax) / 12.0;
        let expenses = profile.living_expenses();
        let existing = profile.monthly_liability_repayments() + profile.monthly_property_repayments();
        let new_payment = loan.monthly_payment();
        let total = existing + new_payment;
        let buffer_required = p.buffer_fraction * net.max(0.0);

        let mut reasons = Vec::new();

        let serviceability_ratio = if net > 0.0 {
            Some(total / net * 100.0)
        } else {
            None
        };
        match serviceability_ratio {
            None => reasons.push("no net income to service the loan".to_string()),
            Some(ratio) if ratio > p.serviceability_ceiling => reasons.push(format!(
                "commitments are {:.1}% of net income, above the {:.0}% ceiling",
                ratio, p.serviceability_ceiling
            )),
            Some(_) => {}
        }

        let buffer_remaining = net - expenses - total;
        if buffer_remaining < buffer_required {
            reasons.push(format!(
                "leaves {:.0}/month after commitments, below the {:.0} buffer",
                buffer_remaining, buffer_required
            ));
        }

        let stressed_rate = finite_or_zero(loan.interest_rate) + p.stress_margin;
        let stressed_payment = loan.payment_at_rate(stressed_rate);
        let stressed_residual = net - expenses - existing - stressed_payment;
        let stress_test = StressTest {
            stressed_rate,
            stressed_payment,
            residual: stressed_residual,
            passed: stressed_residual >= buffer_required,
        };
        if !stress_test.passed {
            reasons.push(format!(
                "fails stress test at {:.2}%: leaves {:.0}/month, below the {:.0} buffer",
                stressed_rate, stressed_residual, buffer_required
            ));
        }

        let net_cashflow_after_loan = cashflow.surplus - new_payment;
        if net_cashflow_after_loan < 0.0 {
            reasons.push(format!(
                "net cashflow after the loan is negative ({:.0}/month)",
                net_cashflow_after_loan
            ));
        }

        let assessment = if reasons.is_empty() {
            Assessment::Approved
        } else {
            Assessment::Declined
        };
        log::debug!("{}: {:?} {:?}", profile.name, assessment, reasons);

        LoanAssessment {
            net_monthly_income: net,
            existing_commitments: existing,
            new_payment,
            total_commitments: total,
            serviceability_ratio,
            buffer_required,
            buffer_remaining,
            stress_test,
            net_cashflow_after_loan,
            assessment,
            reasons,
        }
    }
}

impl Default for ServiceabilityEngine {
    fn default() -> Self {
        Self::new(&Schedules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::loan_payment;
    use crate::profile::{IncomeSources, Liability};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn household(employment: f64, expenses: f64) -> FinancialProfile {
        FinancialProfile {
            name: "Test".to_string(),
            income: IncomeSources {
                employment,
                ..Default::default()
            },
            monthly_living_expenses: expenses,
            has_private_cover: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_retention_caps_available_surplus() {
        let engine = ServiceabilityEngine::default();
        assert_abs_diff_eq!(engine.retained_surplus(10_000.0, 5_000.0), 3_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(engine.retained_surplus(10_000.0, 2_000.0), 2_000.0, epsilon = 1e-9);
        assert_eq!(engine.retained_surplus(10_000.0, -500.0), 0.0);
    }

    #[test]
    fn test_capacity_not_viable_without_income_or_surplus() {
        let engine = ServiceabilityEngine::default();
        for request in [
            CapacityRequest::new(0.0, 2_000.0),
            CapacityRequest::new(-1.0, 2_000.0),
            CapacityRequest::new(8_000.0, 0.0),
            CapacityRequest::new(8_000.0, -300.0),
            CapacityRequest::new(f64::NAN, 2_000.0),
        ] {
            let capacity = engine.max_serviceable_loan(&request);
            assert!(!capacity.viable);
            assert!(capacity.reason.is_some());
            assert_eq!(capacity.max_loan, 0.0);
            assert_eq!(capacity.max_property_value, 0.0);
        }
    }

    #[test]
    fn test_capacity_includes_one_rental_refinement() {
        let engine = ServiceabilityEngine::default();
        let capacity = engine.max_serviceable_loan(&CapacityRequest::new(10_000.0, 5_000.0));

        let first_value = max_borrowing_capacity(3_000.0, 0.065, 30.0) / 0.80;
        let rent = 0.75 * (first_value * 0.04 / 12.0) * 0.75;
        let expected_loan = max_borrowing_capacity(3_000.0 + rent, 0.065, 30.0);

        assert!(capacity.viable);
        assert_abs_diff_eq!(capacity.available_surplus, 3_000.0, epsilon = 1e-9);
        assert_relative_eq!(capacity.rental_contribution, rent, max_relative = 1e-12);
        assert_relative_eq!(capacity.max_loan, expected_loan, max_relative = 1e-12);
        assert_relative_eq!(capacity.max_property_value, expected_loan / 0.80, max_relative = 1e-12);
        assert_relative_eq!(
            loan_payment(capacity.max_loan, 0.065, 30.0),
            capacity.monthly_capacity,
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_request_overrides_property_assumptions() {
        let engine = ServiceabilityEngine::default();
        let request = CapacityRequest {
            max_lvr: Some(0.90),
            rental_yield: Some(5.0),
            property_expense_ratio: Some(0.0),
            ..CapacityRequest::new(10_000.0, 5_000.0)
        };
        let capacity = engine.max_serviceable_loan(&request);

        let first_value = max_borrowing_capacity(3_000.0, 0.065, 30.0) / 0.90;
        let rent = 0.75 * (first_value * 0.05 / 12.0);
        let expected_loan = max_borrowing_capacity(3_000.0 + rent, 0.065, 30.0);

        assert!(capacity.viable);
        assert_relative_eq!(capacity.rental_contribution, rent, max_relative = 1e-12);
        assert_relative_eq!(capacity.max_loan, expected_loan, max_relative = 1e-12);
        assert_relative_eq!(capacity.max_property_value, expected_loan / 0.90, max_relative = 1e-12);

        let policy_default = engine.max_serviceable_loan(&CapacityRequest::new(10_000.0, 5_000.0));
        assert!(capacity.max_loan > policy_default.max_loan);
    }

    #[test]
    fn test_full_retention_leaves_nothing_to_borrow() {
        let mut schedules = Schedules::default();
        schedules.lending.retention_fraction = 1.0;
        let engine = ServiceabilityEngine::new(&schedules);

        let capacity = engine.max_serviceable_loan(&CapacityRequest::new(10_000.0, 5_000.0));
        assert!(!capacity.viable);
        assert_eq!(capacity.max_loan, 0.0);
        assert_eq!(capacity.available_surplus, 0.0);
        assert!(capacity
            .reason
            .as_deref()
            .is_some_and(|r| r.contains("retaining living income")));
    }

    #[test]
    fn test_zero_lvr_is_not_viable() {
        let mut schedules = Schedules::default();
        schedules.lending.max_lvr = 0.0;
        let engine = ServiceabilityEngine::new(&schedules);
        let capacity = engine.max_serviceable_loan(&CapacityRequest::new(10_000.0, 5_000.0));
        assert!(!capacity.viable);
        assert_eq!(capacity.max_loan, 0.0);
    }

    #[test]
    fn test_strong_household_approved() {
        // 150k: 36,838 income tax, 9,430.17/month net
        let profile = household(150_000.0, 4_000.0);
        let loan = ProposedLoan::new(500_000.0, 6.0, 30.0);
        let result = ServiceabilityEngine::default().assess_proposed_loan(&profile, &loan);

        assert_abs_diff_eq!(result.net_monthly_income, 113_162.0 / 12.0, epsilon = 1e-6);
        assert_abs_diff_eq!(result.new_payment, 2_997.75, epsilon = 0.01);
        assert!(result.serviceability_ratio.unwrap() < 35.0);
        assert!(result.stress_test.passed);
        assert_abs_diff_eq!(result.stress_test.stressed_rate, 9.0, epsilon = 1e-12);
        assert!(result.is_approved(), "reasons: {:?}", result.reasons);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn test_weak_household_declined_with_every_reason() {
        let profile = household(80_000.0, 3_000.0);
        let loan = ProposedLoan::new(600_000.0, 6.5, 30.0);
        let result = ServiceabilityEngine::default().assess_proposed_loan(&profile, &loan);

        assert_eq!(result.assessment, Assessment::Declined);
        assert_eq!(result.reasons.len(), 4);
        assert!(result.net_cashflow_after_loan < 0.0);
    }

    #[test]
    fn test_ratio_breach_alone_declines() {
        // 3,477/month is about 37% of net income but leaves ample buffer
        let profile = household(150_000.0, 1_000.0);
        let loan = ProposedLoan::new(580_000.0, 6.0, 30.0);
        let result = ServiceabilityEngine::default().assess_proposed_loan(&profile, &loan);

        assert_eq!(result.assessment, Assessment::Declined);
        assert_eq!(result.reasons.len(), 1);
        assert!(result.reasons[0].contains("ceiling"));
        assert!(result.stress_test.passed);
    }

    #[test]
    fn test_net_income_excludes_levy_and_study_loan() {
        // 100k without cover and a 40k study balance: 20,788 income tax,
        // plus 3,000 levy and 5,500 repayment that do not reduce net income
        let mut profile = household(100_000.0, 3_000.0);
        profile.has_private_cover = false;
        profile.hecs_balance = 40_000.0;
        let loan = ProposedLoan::new(300_000.0, 6.0, 30.0);
        let result = ServiceabilityEngine::default().assess_proposed_loan(&profile, &loan);

        assert_abs_diff_eq!(result.net_monthly_income, 6_601.0, epsilon = 1e-6);
        assert_relative_eq!(
            result.serviceability_ratio.unwrap(),
            result.new_payment / 6_601.0 * 100.0,
            max_relative = 1e-12
        );
        assert_abs_diff_eq!(result.buffer_required, 660.1, epsilon = 1e-9);
    }

    #[test]
    fn test_existing_commitments_counted() {
        let mut profile = household(150_000.0, 4_000.0);
        profile.liabilities.push(Liability {
            balance_owing: 30_000.0,
            repayment_amount: 1_200.0,
            ..Default::default()
        });
        let loan = ProposedLoan::new(500_000.0, 6.0, 30.0);
        let result = ServiceabilityEngine::default().assess_proposed_loan(&profile, &loan);

        assert_abs_diff_eq!(result.existing_commitments, 1_200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            result.total_commitments,
            1_200.0 + result.new_payment,
            epsilon = 1e-9
        );
        assert!(!result.is_approved());
    }

    #[test]
    fn test_no_income_declined() {
        let profile = household(0.0, 2_000.0);
        let loan = ProposedLoan::new(100_000.0, 6.0, 30.0);
        let result = ServiceabilityEngine::default().assess_proposed_loan(&profile, &loan);
        assert_eq!(result.serviceability_ratio, None);
        assert!(!result.is_approved());
        assert!(result.reasons.iter().any(|r| r.contains("no net income")));
    }

    #[test]
    fn test_evaluate_combines_both_entry_points() {
        let engine = ServiceabilityEngine::default();
        let profile = household(150_000.0, 4_000.0);

        let without = engine.evaluate(&profile, None);
        assert!(without.capacity.viable);
        assert!(without.assessment.is_none());

        let loan = ProposedLoan::new(500_000.0, 6.0, 30.0);
        let with = engine.evaluate(&profile, Some(&loan));
        assert_eq!(with.capacity, without.capacity);
        assert!(with.assessment.unwrap().is_approved());
    }
}
