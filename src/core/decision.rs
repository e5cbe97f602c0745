use serde::Serialize;

use super::config::MarketAssumptions;
use super::types::{ConfidenceLevel, InvestmentExperience, UserProfile, risk_profile};

pub const MAXIMUM_REASONABLE_RETURN: f64 = 0.18;
const MINIMUM_SUCCESS_PROBABILITY: f64 = 0.70;
const FEASIBLE_SCORE: u32 = 70;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnReasonableness {
    VeryReasonable,
    Reasonable,
    Aggressive,
    VeryAggressive,
    Unrealistic,
}

impl ReturnReasonableness {
    fn from_gap(gap: f64) -> Self {
        match gap {
            g if g <= 0.01 => Self::VeryReasonable,
            g if g <= 0.03 => Self::Reasonable,
            g if g <= 0.05 => Self::Aggressive,
            g if g <= 0.08 => Self::VeryAggressive,
            _ => Self::Unrealistic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketComparison {
    pub required_return: f64,
    pub tier_expected_return: f64,
    pub market_average_return: f64,
    pub return_gap: f64,
    pub market_gap: f64,
    pub is_reasonable: bool,
    pub is_achievable: bool,
    pub reasonableness: ReturnReasonableness,
}

pub fn compare_to_market(
    required_return: f64,
    risk_tolerance: u32,
    market: &MarketAssumptions,
) -> MarketComparison {
    let tier = risk_profile(risk_tolerance);
    let return_gap = required_return - tier.expected_return;

    MarketComparison {
        required_return,
        tier_expected_return: tier.expected_return,
        market_average_return: market.historical_average_return,
        return_gap,
        market_gap: required_return - market.historical_average_return,
        is_reasonable: required_return <= tier.expected_return + 0.02,
        is_achievable: required_return <= MAXIMUM_REASONABLE_RETURN,
        reasonableness: ReturnReasonableness::from_gap(return_gap),
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskMatch {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl RiskMatch {
    fn recommendation(self) -> &'static str {
        match self {
            RiskMatch::Excellent | RiskMatch::Good => {
                "Risk tolerance aligns well with goal requirements"
            }
            RiskMatch::Fair => "Goal may require slightly higher risk than current tolerance",
            RiskMatch::Poor => {
                "Goal requires significantly higher risk than current tolerance. Consider goal adjustments or risk education."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub required_volatility: f64,
    pub risk_tolerance: u32,
    pub adjusted_risk_tolerance: u32,
    pub risk_capacity: f64,
    pub capacity_adjustment: i32,
    pub risk_match: RiskMatch,
    pub recommendation: String,
}

pub fn required_volatility(required_return: f64) -> f64 {
    (required_return * 1.6).clamp(0.05, 0.40)
}

pub fn risk_capacity_adjustment(profile: &UserProfile, has_emergency_fund: bool) -> i32 {
    let mut adjustment = 0;
    if profile.age < 30 {
        adjustment += 1;
    } else if profile.age > 50 {
        adjustment -= 1;
    }
    match profile.investment_experience {
        InvestmentExperience::Advanced => adjustment += 1,
        InvestmentExperience::Beginner => adjustment -= 1,
        InvestmentExperience::Intermediate => {}
    }
    if !has_emergency_fund {
        adjustment -= 1;
    }
    if profile.dependents > 2 {
        adjustment -= 1;
    }
    adjustment
}

pub fn assess_risk_alignment(
    required_return: f64,
    risk_tolerance: u32,
    profile: &UserProfile,
    has_emergency_fund: bool,
) -> RiskAssessment {
    let capacity_adjustment = risk_capacity_adjustment(profile, has_emergency_fund);
    let adjusted_risk_tolerance = (risk_tolerance as i32 + capacity_adjustment).clamp(1, 10) as u32;
    let adjusted = risk_profile(adjusted_risk_tolerance);
    let volatility = required_volatility(required_return);

    let return_gap = required_return - adjusted.expected_return;
    let volatility_gap = volatility - adjusted.max_volatility;
    let risk_match = if return_gap <= 0.01 && volatility_gap <= 0.02 {
        RiskMatch::Excellent
    } else if return_gap <= 0.03 && volatility_gap <= 0.04 {
        RiskMatch::Good
    } else if return_gap <= 0.05 && volatility_gap <= 0.06 {
        RiskMatch::Fair
    } else {
        RiskMatch::Poor
    };

    RiskAssessment {
        required_volatility: volatility,
        risk_tolerance,
        adjusted_risk_tolerance,
        risk_capacity: risk_profile(risk_tolerance).max_volatility,
        capacity_adjustment,
        risk_match,
        recommendation: risk_match.recommendation().to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityVerdict {
    pub is_feasible: bool,
    pub score: u32,
    pub factors: Vec<String>,
    pub primary_concerns: Vec<String>,
    pub confidence: ConfidenceLevel,
}

pub fn verdict_gate(score: u32, success_probability: f64) -> bool {
    score >= FEASIBLE_SCORE && success_probability >= MINIMUM_SUCCESS_PROBABILITY
}

pub fn determine_feasibility(
    success_probability: f64,
    simulations: u32,
    comparison: &MarketComparison,
    risk: &RiskAssessment,
) -> FeasibilityVerdict {
    let mut score = 0;
    let mut factors = Vec::with_capacity(4);

    let (points, label) = match success_probability {
        p if p >= 0.80 => (40, "High success probability"),
        p if p >= 0.70 => (30, "Adequate success probability"),
        p if p >= 0.50 => (15, "Moderate success probability"),
        _ => (0, "Low success probability"),
    };
    score += points;
    factors.push(label);

    let (points, label) = if comparison.is_reasonable {
        (30, "Reasonable return expectations")
    } else if comparison.is_achievable {
        (20, "Achievable but aggressive returns")
    } else {
        (0, "Unrealistic return expectations")
    };
    score += points;
    factors.push(label);

    let (points, label) = match risk.risk_match {
        RiskMatch::Excellent => (20, "Excellent risk alignment"),
        RiskMatch::Good => (15, "Good risk alignment"),
        RiskMatch::Fair => (10, "Fair risk alignment"),
        RiskMatch::Poor => (0, "Poor risk alignment"),
    };
    score += points;
    factors.push(label);

    let (points, label) = match comparison.market_gap {
        g if g <= 0.02 => (10, "Aligned with market history"),
        g if g <= 0.05 => (5, "Slightly above market average"),
        _ => (0, "Significantly above market average"),
    };
    score += points;
    factors.push(label);

    let primary_concerns = factors
        .iter()
        .filter(|f| f.contains("Low") || f.contains("Poor") || f.contains("Unrealistic"))
        .map(|f| f.to_string())
        .collect();

    FeasibilityVerdict {
        is_feasible: verdict_gate(score, success_probability),
        score,
        factors: factors.into_iter().map(str::to_string).collect(),
        primary_concerns,
        confidence: confidence_level(success_probability, simulations, comparison, risk),
    }
}

pub fn confidence_level(
    success_probability: f64,
    simulations: u32,
    comparison: &MarketComparison,
    risk: &RiskAssessment,
) -> ConfidenceLevel {
    let mut points = 0;

    points += match simulations {
        n if n >= 5_000 => 25,
        n if n >= 1_000 => 15,
        _ => 0,
    };
    points += if comparison.is_reasonable {
        25
    } else if comparison.is_achievable {
        15
    } else {
        0
    };
    points += match risk.risk_match {
        RiskMatch::Excellent | RiskMatch::Good => 25,
        RiskMatch::Fair => 15,
        RiskMatch::Poor => 0,
    };
    // Decisive probabilities either way are trustworthy; middling ones are not.
    points += if success_probability >= 0.80 || success_probability <= 0.40 {
        25
    } else {
        10
    };

    match points {
        p if p >= 80 => ConfidenceLevel::High,
        p if p >= 60 => ConfidenceLevel::Medium,
        _ => ConfidenceLevel::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            age: 40,
            investment_experience: InvestmentExperience::Intermediate,
            has_emergency_fund: true,
            current_income: None,
            dependents: 0,
        }
    }

    #[test]
    fn market_comparison_classifies_gap_to_tier() {
        let market = MarketAssumptions::default();
        let c = compare_to_market(0.075, 5, &market);
        assert!((c.return_gap + 0.005).abs() < 1e-12);
        assert!((c.market_gap + 0.025).abs() < 1e-12);
        assert!(c.is_reasonable);
        assert!(c.is_achievable);
        assert_eq!(c.reasonableness, ReturnReasonableness::VeryReasonable);

        let c = compare_to_market(0.20, 3, &market);
        assert!(!c.is_reasonable);
        assert!(!c.is_achievable);
        assert_eq!(c.reasonableness, ReturnReasonableness::Unrealistic);

        assert_eq!(
            compare_to_market(0.10, 3, &market).reasonableness,
            ReturnReasonableness::Aggressive
        );
    }

    #[test]
    fn required_volatility_is_clamped() {
        assert_eq!(required_volatility(0.01), 0.05);
        assert!((required_volatility(0.10) - 0.16).abs() < 1e-12);
        assert_eq!(required_volatility(0.40), 0.40);
    }

    #[test]
    fn capacity_adjustments_accumulate() {
        let young_expert = UserProfile {
            age: 25,
            investment_experience: InvestmentExperience::Advanced,
            ..profile()
        };
        assert_eq!(risk_capacity_adjustment(&young_expert, true), 2);

        let stretched = UserProfile {
            age: 55,
            investment_experience: InvestmentExperience::Beginner,
            dependents: 3,
            ..profile()
        };
        assert_eq!(risk_capacity_adjustment(&stretched, false), -4);
    }

    #[test]
    fn risk_match_uses_adjusted_tier() {
        let stretched = UserProfile {
            age: 55,
            investment_experience: InvestmentExperience::Beginner,
            ..profile()
        };
        // Tier 7 drops to 5: 0.08 expected, 0.16 max volatility.
        let r = assess_risk_alignment(0.10, 7, &stretched, true);
        assert_eq!(r.adjusted_risk_tolerance, 5);
        assert_eq!(r.risk_match, RiskMatch::Good);
        assert_eq!(r.risk_capacity, 0.20);

        let r = assess_risk_alignment(0.10, 7, &profile(), true);
        assert_eq!(r.risk_match, RiskMatch::Excellent);

        let r = assess_risk_alignment(0.20, 1, &profile(), true);
        assert_eq!(r.risk_match, RiskMatch::Poor);
        assert!(r.recommendation.contains("significantly higher risk"));
    }

    #[test]
    fn high_score_with_low_success_is_not_feasible() {
        assert!(!verdict_gate(85, 0.50));
        assert!(verdict_gate(70, 0.70));
        assert!(!verdict_gate(69, 0.95));
    }

    #[test]
    fn strong_plan_scores_full_marks() {
        let comparison = compare_to_market(0.06, 7, &MarketAssumptions::default());
        let risk = assess_risk_alignment(0.06, 7, &profile(), true);
        let verdict = determine_feasibility(0.92, 5_000, &comparison, &risk);
        assert_eq!(verdict.score, 100);
        assert!(verdict.is_feasible);
        assert!(verdict.primary_concerns.is_empty());
        assert_eq!(verdict.factors.len(), 4);
        assert_eq!(verdict.confidence, ConfidenceLevel::High);
    }

    #[test]
    fn weak_plan_surfaces_concerns() {
        let comparison = compare_to_market(0.25, 2, &MarketAssumptions::default());
        let risk = assess_risk_alignment(0.25, 2, &profile(), true);
        let verdict = determine_feasibility(0.30, 5_000, &comparison, &risk);
        assert_eq!(verdict.score, 0);
        assert!(!verdict.is_feasible);
        assert_eq!(
            verdict.primary_concerns,
            vec![
                "Low success probability".to_string(),
                "Unrealistic return expectations".to_string(),
                "Poor risk alignment".to_string(),
            ]
        );
        // 25 simulations + 0 + 0 + 25 decisive probability.
        assert_eq!(verdict.confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn middling_probability_lowers_confidence() {
        let comparison = compare_to_market(0.08, 5, &MarketAssumptions::default());
        let risk = assess_risk_alignment(0.08, 5, &profile(), true);
        assert_eq!(
            confidence_level(0.60, 5_000, &comparison, &risk),
            ConfidenceLevel::High
        );
        assert_eq!(
            confidence_level(0.60, 1_000, &comparison, &risk),
            ConfidenceLevel::Medium
        );
    }
}
