use std::collections::HashSet;

use serde::Serialize;

use super::decision::{FeasibilityVerdict, MarketComparison};
use super::engine::SimulationAssessment;
use super::types::{ConfidenceLevel, GoalParameters, MONTHS_PER_YEAR};

const TIMELINE_EXTENSION_LIMIT_MONTHS: u32 = 240;
const TIMELINE_EXTENSION_MONTHS: u32 = 60;
const MAX_EXTENDED_TIMELINE_MONTHS: u32 = 360;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    ExtendTimeline,
    IncreaseContributions,
    ReduceTarget,
    RiskEducation,
    RiskAdjustment,
    StressTestReview,
    OptimizeStrategy,
    AdditionalGoals,
    EmergencyFund,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub current_value: String,
    pub suggested_value: String,
    pub impact: String,
    pub rationale: String,
    pub implementation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineImpact {
    pub current_months: u32,
    pub extended_months: u32,
    pub success_probability_gain: f64,
    pub required_return_reduction: f64,
}

pub fn extended_timeline(timeline_months: u32) -> Option<u32> {
    (timeline_months < TIMELINE_EXTENSION_LIMIT_MONTHS).then(|| {
        (timeline_months + TIMELINE_EXTENSION_MONTHS).min(MAX_EXTENDED_TIMELINE_MONTHS)
    })
}

pub struct FeasibilitySignals<'a> {
    pub goal: &'a GoalParameters,
    pub verdict: &'a FeasibilityVerdict,
    pub comparison: &'a MarketComparison,
    pub success_probability: f64,
    pub has_emergency_fund: bool,
    pub timeline_impact: Option<&'a TimelineImpact>,
}

pub fn feasibility_recommendations(signals: &FeasibilitySignals<'_>) -> Vec<Recommendation> {
    let goal = signals.goal;
    let mut out = Vec::new();

    if !signals.verdict.is_feasible {
        if let Some(impact) = signals.timeline_impact {
            out.push(Recommendation {
                kind: RecommendationKind::ExtendTimeline,
                priority: Priority::High,
                current_value: format_years(impact.current_months),
                suggested_value: format_years(impact.extended_months),
                impact: format!(
                    "{:+.0}% success rate",
                    impact.success_probability_gain * 100.0
                ),
                rationale: "Longer timeline allows for more compound growth and reduces required annual return".to_string(),
                implementation: "Consider extending your investment timeline to improve feasibility".to_string(),
            });
        }

        if signals.success_probability < 0.70 {
            let increase = (goal.monthly_contribution * 0.3).round();
            out.push(Recommendation {
                kind: RecommendationKind::IncreaseContributions,
                priority: Priority::High,
                current_value: format!("{}/month", format_currency(goal.monthly_contribution)),
                suggested_value: format!(
                    "{}/month",
                    format_currency(goal.monthly_contribution + increase)
                ),
                impact: "Significantly improves success probability".to_string(),
                rationale: "Higher contributions reduce dependence on investment returns".to_string(),
                implementation: format!(
                    "Consider increasing monthly contributions by {}",
                    format_currency(increase)
                ),
            });
        }

        if signals.comparison.market_gap > 0.05 {
            out.push(Recommendation {
                kind: RecommendationKind::ReduceTarget,
                priority: Priority::Medium,
                current_value: format_currency(goal.target_amount),
                suggested_value: format_currency((goal.target_amount * 0.8).round()),
                impact: "Makes goal more achievable with current parameters".to_string(),
                rationale: "Reduces required return to more reasonable levels".to_string(),
                implementation: "Consider adjusting target amount to be more realistic".to_string(),
            });
        }

        if signals.comparison.required_return > signals.comparison.tier_expected_return {
            out.push(Recommendation {
                kind: RecommendationKind::RiskEducation,
                priority: Priority::Medium,
                current_value: format!("Risk tolerance: {}/10", goal.risk_tolerance),
                suggested_value: "Consider risk education and assessment".to_string(),
                impact: "May allow for higher expected returns".to_string(),
                rationale: "Required returns may necessitate higher risk investments".to_string(),
                implementation: "Learn about long-term investing and risk-return tradeoffs".to_string(),
            });
        }
    } else {
        if signals.success_probability > 0.90 {
            out.push(Recommendation {
                kind: RecommendationKind::OptimizeStrategy,
                priority: Priority::Low,
                current_value: format!("{:.0}% success rate", signals.success_probability * 100.0),
                suggested_value: "Consider lower-risk investments".to_string(),
                impact: "Reduce portfolio volatility while maintaining goal achievement".to_string(),
                rationale: "Goal is highly achievable, allowing for more conservative approach".to_string(),
                implementation: "You may be able to take less risk while still achieving your goal".to_string(),
            });
        }

        if signals.comparison.market_gap < -0.02 {
            out.push(Recommendation {
                kind: RecommendationKind::AdditionalGoals,
                priority: Priority::Low,
                current_value: "Single investment goal".to_string(),
                suggested_value: "Consider additional financial goals".to_string(),
                impact: "Maximize financial potential".to_string(),
                rationale: "Current goal is very achievable with room for additional objectives".to_string(),
                implementation: "Consider setting additional investment goals or increasing target amount".to_string(),
            });
        }
    }

    if !signals.has_emergency_fund {
        out.push(emergency_fund());
    }

    finalize(out)
}

pub fn simulation_recommendations(
    goal: &GoalParameters,
    required_return: f64,
    assessment: &SimulationAssessment,
) -> Vec<Recommendation> {
    let mut out = Vec::new();
    let success = assessment.success_probability;

    if success < 0.70 {
        if required_return > 0.12 {
            let increase = (((required_return / 0.10) - 1.0) * goal.monthly_contribution).round();
            out.push(Recommendation {
                kind: RecommendationKind::IncreaseContributions,
                priority: Priority::High,
                current_value: format!("{}/month", format_currency(goal.monthly_contribution)),
                suggested_value: format!(
                    "{}/month",
                    format_currency(goal.monthly_contribution + increase)
                ),
                impact: "Reduces the return the plan depends on".to_string(),
                rationale: format!(
                    "Required return of {:.1}% exceeds long-run market averages",
                    required_return * 100.0
                ),
                implementation: format!(
                    "Consider increasing monthly contributions by {}",
                    format_currency(increase)
                ),
            });
        }

        if goal.timeline_months < 120 {
            out.push(Recommendation {
                kind: RecommendationKind::ExtendTimeline,
                priority: Priority::High,
                current_value: format_years(goal.timeline_months),
                suggested_value: "10+ years".to_string(),
                impact: "More time for compound growth".to_string(),
                rationale: "Short timelines leave little room to recover from downturns".to_string(),
                implementation: "Consider extending your investment timeline for better compound growth".to_string(),
            });
        }

        out.push(Recommendation {
            kind: RecommendationKind::RiskAdjustment,
            priority: Priority::Medium,
            current_value: format!("Risk tolerance: {}/10", goal.risk_tolerance),
            suggested_value: "Review investment mix".to_string(),
            impact: "Aligns expected returns with the goal".to_string(),
            rationale: "Goal may require higher-risk investments".to_string(),
            implementation: "Consider whether your risk tolerance supports the required return".to_string(),
        });
    }

    if assessment.confidence == ConfidenceLevel::Low {
        out.push(Recommendation {
            kind: RecommendationKind::StressTestReview,
            priority: Priority::Medium,
            current_value: format!(
                "{:.0}% average crisis survivability",
                assessment.average_stress_survivability * 100.0
            ),
            suggested_value: "Larger cash reserves".to_string(),
            impact: "Cushions the plan against market downturns".to_string(),
            rationale: "Goal is vulnerable to market downturns".to_string(),
            implementation: "Consider building larger cash reserves".to_string(),
        });
    }

    if success > 0.90 {
        out.push(Recommendation {
            kind: RecommendationKind::OptimizeStrategy,
            priority: Priority::Low,
            current_value: format!("{:.0}% success rate", success * 100.0),
            suggested_value: "Consider lower-risk investments or additional goals".to_string(),
            impact: "Reduce portfolio volatility while maintaining goal achievement".to_string(),
            rationale: "Goal is highly achievable".to_string(),
            implementation: "You may be able to take less risk while still achieving your goal".to_string(),
        });
    }

    if !goal.has_emergency_fund {
        out.push(emergency_fund());
    }

    finalize(out)
}

fn emergency_fund() -> Recommendation {
    Recommendation {
        kind: RecommendationKind::EmergencyFund,
        priority: Priority::High,
        current_value: "No emergency fund".to_string(),
        suggested_value: "3-6 months of expenses".to_string(),
        impact: "Protects investment plan from unexpected expenses".to_string(),
        rationale: "Emergency fund prevents need to withdraw from investments during market downturns".to_string(),
        implementation: "Build emergency fund before increasing investment contributions".to_string(),
    }
}

fn finalize(recommendations: Vec<Recommendation>) -> Vec<Recommendation> {
    let mut seen = HashSet::new();
    let mut out: Vec<Recommendation> = recommendations
        .into_iter()
        .filter(|r| seen.insert(r.kind))
        .collect();
    out.sort_by_key(|r| r.priority);
    out
}

fn format_years(months: u32) -> String {
    format!("{:.0} years", months as f64 / MONTHS_PER_YEAR)
}

pub fn format_currency(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MarketAssumptions;
    use crate::core::decision::compare_to_market;

    fn goal() -> GoalParameters {
        GoalParameters {
            target_amount: 250_000.0,
            timeline_months: 120,
            monthly_contribution: 1_000.0,
            initial_investment: 5_000.0,
            inflation_rate: 0.03,
            risk_tolerance: 4,
            has_emergency_fund: false,
        }
    }

    fn verdict(is_feasible: bool) -> FeasibilityVerdict {
        FeasibilityVerdict {
            is_feasible,
            score: if is_feasible { 90 } else { 40 },
            factors: Vec::new(),
            primary_concerns: Vec::new(),
            confidence: ConfidenceLevel::Medium,
        }
    }

    fn assessment(success_probability: f64, confidence: ConfidenceLevel) -> SimulationAssessment {
        SimulationAssessment {
            is_feasible: success_probability >= 0.70,
            success_probability,
            weighted_scenario_probability: success_probability,
            average_stress_survivability: 0.3,
            confidence,
            overall_score: 0.0,
        }
    }

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.4), "$999");
        assert_eq!(format_currency(1_000.0), "$1,000");
        assert_eq!(format_currency(1_234_567.0), "$1,234,567");
        assert_eq!(format_currency(-25_000.0), "-$25,000");
    }

    #[test]
    fn timeline_extension_is_capped_and_limited_to_short_plans() {
        assert_eq!(extended_timeline(120), Some(180));
        assert_eq!(extended_timeline(239), Some(299));
        assert_eq!(extended_timeline(240), None);
        assert_eq!(extended_timeline(330), None);
    }

    #[test]
    fn infeasible_plan_gets_corrective_actions_sorted_by_priority() {
        let goal = goal();
        let comparison = compare_to_market(0.16, goal.risk_tolerance, &MarketAssumptions::default());
        let impact = TimelineImpact {
            current_months: 120,
            extended_months: 180,
            success_probability_gain: 0.18,
            required_return_reduction: 0.03,
        };
        let recs = feasibility_recommendations(&FeasibilitySignals {
            goal: &goal,
            verdict: &verdict(false),
            comparison: &comparison,
            success_probability: 0.45,
            has_emergency_fund: false,
            timeline_impact: Some(&impact),
        });

        let kinds: Vec<RecommendationKind> = recs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::ExtendTimeline,
                RecommendationKind::IncreaseContributions,
                RecommendationKind::EmergencyFund,
                RecommendationKind::ReduceTarget,
                RecommendationKind::RiskEducation,
            ]
        );
        assert_eq!(recs[0].current_value, "10 years");
        assert_eq!(recs[0].suggested_value, "15 years");
        assert_eq!(recs[0].impact, "+18% success rate");
        assert_eq!(recs[1].suggested_value, "$1,300/month");
        assert_eq!(recs[3].suggested_value, "$200,000");
    }

    #[test]
    fn feasible_plan_gets_optimisation_hints_only() {
        let goal = GoalParameters {
            has_emergency_fund: true,
            ..goal()
        };
        let comparison = compare_to_market(0.05, goal.risk_tolerance, &MarketAssumptions::default());
        let recs = feasibility_recommendations(&FeasibilitySignals {
            goal: &goal,
            verdict: &verdict(true),
            comparison: &comparison,
            success_probability: 0.95,
            has_emergency_fund: true,
            timeline_impact: None,
        });
        let kinds: Vec<RecommendationKind> = recs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::OptimizeStrategy,
                RecommendationKind::AdditionalGoals,
            ]
        );
        assert!(recs.iter().all(|r| r.priority == Priority::Low));
    }

    #[test]
    fn struggling_simulation_recommends_contributions_and_review() {
        let goal = GoalParameters {
            timeline_months: 60,
            ..goal()
        };
        let recs = simulation_recommendations(&goal, 0.15, &assessment(0.40, ConfidenceLevel::Low));
        let kinds: Vec<RecommendationKind> = recs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::IncreaseContributions,
                RecommendationKind::ExtendTimeline,
                RecommendationKind::EmergencyFund,
                RecommendationKind::RiskAdjustment,
                RecommendationKind::StressTestReview,
            ]
        );
        assert_eq!(recs[0].implementation, "Consider increasing monthly contributions by $500");
    }

    #[test]
    fn duplicate_kinds_keep_the_first_entry() {
        let mut first = emergency_fund();
        first.impact = "first".to_string();
        let recs = finalize(vec![first, emergency_fund()]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].impact, "first");
    }

    #[test]
    fn priorities_serialize_uppercase() {
        let json = serde_json::to_value(emergency_fund()).expect("serializable");
        assert_eq!(json["priority"], "HIGH");
        assert_eq!(json["type"], "emergency_fund");
        assert!(json.get("currentValue").is_some());
    }
}
