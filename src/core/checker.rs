use serde::Serialize;

use super::config::EngineConfig;
use super::decision::{
    FeasibilityVerdict, MarketComparison, RiskAssessment, assess_risk_alignment,
    compare_to_market, determine_feasibility,
};
use super::engine::{
    BatchRequest, MonteCarloEngine, STREAM_TIMELINE_IMPACT, SimulationReport,
};
use super::error::{Phase, Result};
use super::recommend::{
    FeasibilitySignals, Recommendation, TimelineImpact, extended_timeline,
    feasibility_recommendations,
};
use super::solver::{RequiredReturn, ReturnBracket, required_annual_return};
use super::types::{
    ConfidenceLevel, ContributionMode, GoalParameters, MarketParameters, PerformanceMetrics,
    ScenarioKind, UserProfile,
};
use super::validation::validate_feasibility_inputs;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub trials: u32,
    pub success_probability: f64,
    pub weighted_scenario_probability: f64,
    pub mean_final_value: f64,
    pub median_final_value: f64,
    pub bear_case_mean_final_value: Option<f64>,
    pub bull_case_mean_final_value: Option<f64>,
    pub simulation_confidence: ConfidenceLevel,
}

impl SimulationSummary {
    fn from_report(report: &SimulationReport) -> Self {
        let scenario_mean = |kind: ScenarioKind| {
            report
                .scenarios
                .iter()
                .find(|s| s.scenario == kind)
                .map(|s| s.results.mean_final_value)
        };
        Self {
            trials: report.base.trials,
            success_probability: report.base.success_probability,
            weighted_scenario_probability: report.assessment.weighted_scenario_probability,
            mean_final_value: report.base.mean_final_value,
            median_final_value: report.base.median_final_value,
            bear_case_mean_final_value: scenario_mean(ScenarioKind::Bear),
            bull_case_mean_final_value: scenario_mean(ScenarioKind::Bull),
            simulation_confidence: report.assessment.confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeasibilityReport {
    pub goal: GoalParameters,
    pub profile: UserProfile,
    pub is_feasible: bool,
    pub feasibility_score: u32,
    pub confidence: ConfidenceLevel,
    pub required_return: RequiredReturn,
    pub market_comparison: MarketComparison,
    pub risk_assessment: RiskAssessment,
    pub verdict: FeasibilityVerdict,
    pub simulation: SimulationSummary,
    pub market: MarketParameters,
    pub timeline_impact: Option<TimelineImpact>,
    pub recommendations: Vec<Recommendation>,
    pub seed: u64,
}

#[derive(Debug, Clone, Default)]
pub struct FeasibilityEngine {
    config: EngineConfig,
}

impl FeasibilityEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn simulate_goal_achievement(
        &self,
        goal: &GoalParameters,
        market: &MarketParameters,
        metrics: &mut PerformanceMetrics,
    ) -> Result<SimulationReport> {
        MonteCarloEngine::new(self.config).simulate_goal_achievement(goal, market, metrics)
    }

    pub fn check_goal_feasibility(
        &self,
        goal: &GoalParameters,
        profile: &UserProfile,
        metrics: &mut PerformanceMetrics,
    ) -> Result<FeasibilityReport> {
        self.config.validate()?;
        validate_feasibility_inputs(goal, profile)?;

        let required_return = required_annual_return(goal, ReturnBracket::NARROW);
        let market_comparison =
            compare_to_market(required_return.annual_rate, goal.risk_tolerance, &self.config.market);
        tracing::info!(
            required_return = required_return.annual_rate,
            bracket = ?required_return.status,
            reasonableness = ?market_comparison.reasonableness,
            "checking goal feasibility"
        );

        let market =
            MarketParameters::for_risk_tolerance(goal.risk_tolerance, self.config.market.risk_free_rate);
        let engine = MonteCarloEngine::new(self.config);
        let report = engine.simulate_goal_achievement(goal, &market, metrics)?;
        let success_probability = report.base.success_probability;

        let has_emergency_fund = goal.has_emergency_fund || profile.has_emergency_fund;
        let risk_assessment = assess_risk_alignment(
            required_return.annual_rate,
            goal.risk_tolerance,
            profile,
            has_emergency_fund,
        );
        let verdict = determine_feasibility(
            success_probability,
            report.base.trials,
            &market_comparison,
            &risk_assessment,
        );

        let timeline_impact = match extended_timeline(goal.timeline_months) {
            Some(extended) if !verdict.is_feasible => {
                Some(self.timeline_impact(&engine, goal, &market, extended)?)
            }
            _ => None,
        };

        let recommendations = feasibility_recommendations(&FeasibilitySignals {
            goal,
            verdict: &verdict,
            comparison: &market_comparison,
            success_probability,
            has_emergency_fund,
            timeline_impact: timeline_impact.as_ref(),
        });

        tracing::info!(
            feasible = verdict.is_feasible,
            score = verdict.score,
            confidence = ?verdict.confidence,
            recommendations = recommendations.len(),
            "feasibility check complete"
        );

        Ok(FeasibilityReport {
            goal: *goal,
            profile: profile.clone(),
            is_feasible: verdict.is_feasible,
            feasibility_score: verdict.score,
            confidence: verdict.confidence,
            required_return,
            market_comparison,
            risk_assessment,
            simulation: SimulationSummary::from_report(&report),
            verdict,
            market,
            timeline_impact,
            recommendations,
            seed: engine.seed(),
        })
    }

    fn timeline_impact(
        &self,
        engine: &MonteCarloEngine,
        goal: &GoalParameters,
        market: &MarketParameters,
        extended_months: u32,
    ) -> Result<TimelineImpact> {
        let request = BatchRequest {
            trials: self.config.impact_trials,
            stream: STREAM_TIMELINE_IMPACT,
            contributions: ContributionMode::InflationEscalated,
            crisis: None,
            phase: Phase::TimelineImpact,
        };
        let extended_goal = goal.with_timeline(extended_months);
        let current = engine.run_batch(goal, market, &request)?;
        let extended = engine.run_batch(&extended_goal, market, &request)?;

        let current_rate = required_annual_return(goal, ReturnBracket::NARROW).annual_rate;
        let extended_rate = required_annual_return(&extended_goal, ReturnBracket::NARROW).annual_rate;

        tracing::debug!(
            current_months = goal.timeline_months,
            extended_months,
            current_success = current.success_probability,
            extended_success = extended.success_probability,
            "timeline impact measured"
        );

        Ok(TimelineImpact {
            current_months: goal.timeline_months,
            extended_months,
            success_probability_gain: extended.success_probability - current.success_probability,
            required_return_reduction: current_rate - extended_rate,
        })
    }
}
