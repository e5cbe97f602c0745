use super::error::ValidationError;
use super::types::{GoalParameters, MarketParameters, UserProfile};

pub const MIN_TIMELINE_MONTHS: u32 = 12;
pub const MAX_TIMELINE_MONTHS: u32 = 600;
const MAX_INFLATION_RATE: f64 = 0.15;
const MAX_TARGET_TO_CONTRIBUTION_RATIO: f64 = 10.0;

fn goal_violations(goal: &GoalParameters, violations: &mut Vec<String>) {
    if !goal.target_amount.is_finite() || goal.target_amount <= 0.0 {
        violations.push("Target amount must be positive".to_string());
    }
    if !(MIN_TIMELINE_MONTHS..=MAX_TIMELINE_MONTHS).contains(&goal.timeline_months) {
        violations.push(format!(
            "Timeline must be between {MIN_TIMELINE_MONTHS} and {MAX_TIMELINE_MONTHS} months"
        ));
    }
    if !goal.monthly_contribution.is_finite() || goal.monthly_contribution < 0.0 {
        violations.push("Monthly contribution cannot be negative".to_string());
    }
    if !goal.initial_investment.is_finite() || goal.initial_investment < 0.0 {
        violations.push("Initial investment cannot be negative".to_string());
    }
    if !goal.inflation_rate.is_finite() || !(0.0..=MAX_INFLATION_RATE).contains(&goal.inflation_rate)
    {
        violations.push("Inflation rate must be between 0% and 15%".to_string());
    }
    if !(1..=10).contains(&goal.risk_tolerance) {
        violations.push("Risk tolerance must be between 1 and 10".to_string());
    }
    if goal.initial_investment >= goal.target_amount {
        violations.push("Target amount must be greater than initial investment".to_string());
    }

    let planned = goal.planned_contributions();
    if planned.is_finite() && goal.target_amount > planned * MAX_TARGET_TO_CONTRIBUTION_RATIO {
        violations.push("Target amount appears unrealistic given contributions".to_string());
    }
}

fn market_violations(market: &MarketParameters, violations: &mut Vec<String>) {
    if !market.expected_return.is_finite() || !(-0.20..=0.50).contains(&market.expected_return) {
        violations.push("Expected return must be between -20% and 50%".to_string());
    }
    if !market.volatility.is_finite() || !(0.0..=1.0).contains(&market.volatility) {
        violations.push("Volatility must be between 0% and 100%".to_string());
    }
    if !market.risk_free_rate.is_finite() || !(0.0..=0.15).contains(&market.risk_free_rate) {
        violations.push("Risk-free rate must be between 0% and 15%".to_string());
    }
}

fn profile_violations(profile: &UserProfile, violations: &mut Vec<String>) {
    if profile.age > 120 {
        violations.push("Age must be 120 or below".to_string());
    }
    if let Some(income) = profile.current_income {
        if !income.is_finite() || income < 0.0 {
            violations.push("Current income cannot be negative".to_string());
        }
    }
}

fn finish(violations: Vec<String>) -> Result<(), ValidationError> {
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

pub fn validate_simulation_inputs(
    goal: &GoalParameters,
    market: &MarketParameters,
) -> Result<(), ValidationError> {
    let mut violations = Vec::new();
    goal_violations(goal, &mut violations);
    market_violations(market, &mut violations);
    finish(violations)
}

pub fn validate_feasibility_inputs(
    goal: &GoalParameters,
    profile: &UserProfile,
) -> Result<(), ValidationError> {
    let mut violations = Vec::new();
    goal_violations(goal, &mut violations);
    profile_violations(profile, &mut violations);
    finish(violations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_goal() -> GoalParameters {
        GoalParameters {
            target_amount: 1_000_000.0,
            timeline_months: 360,
            monthly_contribution: 2_000.0,
            initial_investment: 10_000.0,
            inflation_rate: 0.03,
            risk_tolerance: 7,
            has_emergency_fund: true,
        }
    }

    #[test]
    fn accepts_reference_goal() {
        assert!(validate_simulation_inputs(&valid_goal(), &MarketParameters::default()).is_ok());
    }

    #[test]
    fn rejects_initial_investment_above_target() {
        let goal = GoalParameters {
            target_amount: 100.0,
            initial_investment: 200.0,
            timeline_months: 24,
            monthly_contribution: 10.0,
            risk_tolerance: 5,
            ..valid_goal()
        };
        let err = validate_feasibility_inputs(&goal, &UserProfile::default())
            .expect_err("must reject");
        assert!(err.mentions("Target amount must be greater than initial investment"));
    }

    #[test]
    fn aggregates_every_violation() {
        let goal = GoalParameters {
            target_amount: -5.0,
            timeline_months: 6,
            monthly_contribution: -1.0,
            initial_investment: -1.0,
            inflation_rate: 0.2,
            risk_tolerance: 11,
            has_emergency_fund: false,
        };
        let market = MarketParameters {
            expected_return: 0.9,
            volatility: 1.5,
            risk_free_rate: -0.01,
        };
        let err = validate_simulation_inputs(&goal, &market).expect_err("must reject");
        for needle in [
            "Target amount must be positive",
            "Timeline must be between 12 and 600 months",
            "Monthly contribution cannot be negative",
            "Initial investment cannot be negative",
            "Inflation rate",
            "Risk tolerance",
            "Expected return",
            "Volatility",
            "Risk-free rate",
        ] {
            assert!(err.mentions(needle), "missing violation {needle}: {err}");
        }
    }

    #[test]
    fn rejects_target_far_beyond_contributions() {
        let goal = GoalParameters {
            target_amount: 5_000_000.0,
            monthly_contribution: 100.0,
            initial_investment: 0.0,
            timeline_months: 120,
            ..valid_goal()
        };
        let err = validate_feasibility_inputs(&goal, &UserProfile::default())
            .expect_err("must reject");
        assert!(err.mentions("unrealistic"));
    }

    #[test]
    fn rejects_negative_income_in_profile() {
        let profile = UserProfile {
            current_income: Some(-10.0),
            ..UserProfile::default()
        };
        let err = validate_feasibility_inputs(&valid_goal(), &profile).expect_err("must reject");
        assert_eq!(err.violations, vec!["Current income cannot be negative".to_string()]);
    }
}
