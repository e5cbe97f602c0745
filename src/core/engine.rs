use std::time::Instant;

use rand::Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::Serialize;

use super::config::EngineConfig;
use super::error::{EngineError, Phase, Result};
use super::finance::future_value_escalating;
use super::path::{CrisisInjection, simulate_path};
use super::random::{NormalGenerator, entropy_seed, stream_rng};
use super::recommend::{Recommendation, simulation_recommendations};
use super::solver::{RequiredReturn, ReturnBracket, required_annual_return};
use super::stats::analyze_paths;
use super::types::{
    CRISIS_CATALOG, ConfidenceLevel, ContributionMode, CrisisDefinition, GoalParameters,
    MONTHS_PER_YEAR, MarketParameters, PerformanceMetrics, ResultSet, ScenarioKind,
    ScenarioResult, SimulatedPath, StressResult,
};
use super::validation::validate_simulation_inputs;

const STREAM_BASE: u32 = 0;
const STREAM_SCENARIOS: u32 = 100;
const STREAM_STRESS: u32 = 200;
const STREAM_CRISIS_PLACEMENT: u32 = 400;
pub(crate) const STREAM_TIMELINE_IMPACT: u32 = 500;

const FEASIBLE_SUCCESS: f64 = 0.70;
const FEASIBLE_WEIGHTED_SUCCESS: f64 = 0.60;

struct Regime {
    kind: ScenarioKind,
    name: &'static str,
    weight: f64,
}

const REGIMES: [Regime; 4] = [
    Regime {
        kind: ScenarioKind::Bull,
        name: "Bull Market",
        weight: 0.15,
    },
    Regime {
        kind: ScenarioKind::Normal,
        name: "Normal Market",
        weight: 0.60,
    },
    Regime {
        kind: ScenarioKind::Bear,
        name: "Bear Market",
        weight: 0.20,
    },
    Regime {
        kind: ScenarioKind::Stagnant,
        name: "Stagnant Market",
        weight: 0.05,
    },
];

fn scenario_market(kind: ScenarioKind, base: &MarketParameters) -> MarketParameters {
    match kind {
        ScenarioKind::Bull => MarketParameters {
            expected_return: base.expected_return * 1.5,
            volatility: base.volatility * 0.8,
            ..*base
        },
        ScenarioKind::Normal => *base,
        ScenarioKind::Bear => MarketParameters {
            expected_return: base.expected_return * 0.3,
            volatility: base.volatility * 1.4,
            ..*base
        },
        ScenarioKind::Stagnant => MarketParameters {
            expected_return: base.risk_free_rate,
            volatility: base.volatility * 0.6,
            ..*base
        },
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatchRequest {
    pub trials: u32,
    pub stream: u32,
    pub contributions: ContributionMode,
    pub crisis: Option<CrisisInjection>,
    pub phase: Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationAssessment {
    pub is_feasible: bool,
    pub success_probability: f64,
    pub weighted_scenario_probability: f64,
    pub average_stress_survivability: f64,
    pub confidence: ConfidenceLevel,
    pub overall_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceMetrics {
    pub return_buffer: f64,
    pub volatility_risk: f64,
    pub risk_adjusted_buffer: f64,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeterministicProjection {
    pub nominal_final_value: f64,
    pub real_final_value: f64,
    pub meets_target: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationMetrics {
    pub total_trials: u64,
    pub execution_ms: f64,
    pub average_path_value: f64,
    pub observed_coefficient_of_variation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub goal: GoalParameters,
    pub market: MarketParameters,
    pub required_return: RequiredReturn,
    pub base: ResultSet,
    pub scenarios: Vec<ScenarioResult>,
    pub stress_tests: Vec<StressResult>,
    pub assessment: SimulationAssessment,
    pub confidence_metrics: ConfidenceMetrics,
    pub projection: DeterministicProjection,
    pub simulation_metrics: SimulationMetrics,
    pub recommendations: Vec<Recommendation>,
    pub seed: u64,
}

pub struct MonteCarloEngine {
    config: EngineConfig,
    seed: u64,
}

impl MonteCarloEngine {
    pub fn new(config: EngineConfig) -> Self {
        let seed = config.seed.unwrap_or_else(entropy_seed);
        Self { config, seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn run_batch(
        &self,
        goal: &GoalParameters,
        market: &MarketParameters,
        request: &BatchRequest,
    ) -> Result<ResultSet> {
        let paths: Vec<SimulatedPath> = (0..request.trials)
            .into_par_iter()
            .map(|trial| {
                let mut normals = NormalGenerator::new(stream_rng(self.seed, request.stream, trial));
                simulate_path(
                    goal,
                    market,
                    request.contributions,
                    request.crisis.as_ref(),
                    &mut normals,
                    None,
                )
            })
            .collect();
        analyze_paths(&paths, request.phase)
    }

    pub fn run_base(&self, goal: &GoalParameters, market: &MarketParameters) -> Result<ResultSet> {
        self.run_batch(
            goal,
            market,
            &BatchRequest {
                trials: self.config.base_trials,
                stream: STREAM_BASE,
                contributions: ContributionMode::InflationEscalated,
                crisis: None,
                phase: Phase::BaseSimulation,
            },
        )
    }

    pub fn run_scenarios(
        &self,
        goal: &GoalParameters,
        market: &MarketParameters,
    ) -> Result<Vec<ScenarioResult>> {
        REGIMES
            .iter()
            .zip(0u32..)
            .map(|(regime, idx)| {
                let scenario = scenario_market(regime.kind, market);
                let results = self.run_batch(
                    goal,
                    &scenario,
                    &BatchRequest {
                        trials: self.config.scenario_trials,
                        stream: STREAM_SCENARIOS + idx,
                        contributions: ContributionMode::InflationEscalated,
                        crisis: None,
                        phase: Phase::ScenarioEnsemble,
                    },
                )?;
                tracing::debug!(
                    scenario = ?regime.kind,
                    success_probability = results.success_probability,
                    "scenario pass complete"
                );
                Ok(ScenarioResult {
                    scenario: regime.kind,
                    name: regime.name.to_string(),
                    weight: regime.weight,
                    market: scenario,
                    results,
                })
            })
            .collect()
    }

    pub fn crisis_start_month(&self, goal: &GoalParameters, crisis_index: u32, crisis: &CrisisDefinition) -> u32 {
        if goal.timeline_months <= crisis.duration_months {
            return 0;
        }
        let mut rng = stream_rng(self.seed, STREAM_CRISIS_PLACEMENT, crisis_index);
        rng.gen_range(0..goal.timeline_months - crisis.duration_months)
    }

    pub fn run_stress_tests(
        &self,
        goal: &GoalParameters,
        market: &MarketParameters,
    ) -> Result<Vec<StressResult>> {
        CRISIS_CATALOG
            .iter()
            .zip(0u32..)
            .map(|(crisis, idx)| {
                let start_month = self.crisis_start_month(goal, idx, crisis);
                let mut request = BatchRequest {
                    trials: self.config.stress_trials,
                    stream: STREAM_STRESS + idx,
                    contributions: ContributionMode::Level,
                    crisis: Some(CrisisInjection {
                        crisis: *crisis,
                        start_month,
                    }),
                    phase: Phase::StressTest,
                };
                let stressed = self.run_batch(goal, market, &request)?;
                request.crisis = None;
                let baseline = self.run_batch(goal, market, &request)?;

                let impact_on_goal_percent = if baseline.success_probability > 0.0 {
                    ((stressed.success_probability - baseline.success_probability)
                        / baseline.success_probability
                        * 100.0)
                        .round()
                } else {
                    0.0
                };
                tracing::debug!(
                    crisis = crisis.key,
                    start_month,
                    crisis_success = stressed.success_probability,
                    baseline_success = baseline.success_probability,
                    "stress pass complete"
                );

                Ok(StressResult {
                    crisis: crisis.key.to_string(),
                    description: format!("{} starting in month {start_month}", crisis.name),
                    impact_on_goal_percent,
                    survivability_score: survivability_score(stressed.success_probability),
                    worst_case_shortfall: stressed.mean_shortfall,
                    crisis_start_month: start_month,
                    recovery_months: crisis.recovery_months,
                    crisis_success_probability: stressed.success_probability,
                    baseline_success_probability: baseline.success_probability,
                })
            })
            .collect()
    }

    pub fn simulate_goal_achievement(
        &self,
        goal: &GoalParameters,
        market: &MarketParameters,
        metrics: &mut PerformanceMetrics,
    ) -> Result<SimulationReport> {
        self.config.validate()?;
        validate_simulation_inputs(goal, market)?;

        let started = Instant::now();
        tracing::info!(
            seed = self.seed,
            target = goal.target_amount,
            timeline_months = goal.timeline_months,
            expected_return = market.expected_return,
            volatility = market.volatility,
            "starting goal simulation"
        );

        let required_return = required_annual_return(goal, ReturnBracket::WIDE);
        if !required_return.annual_rate.is_finite() {
            return Err(EngineError::computation(
                Phase::RequiredReturn,
                "solver produced a non-finite rate",
            ));
        }

        let base = self.run_base(goal, market)?;
        tracing::debug!(success_probability = base.success_probability, "base pass complete");
        let scenarios = self.run_scenarios(goal, market)?;
        let stress_tests = self.run_stress_tests(goal, market)?;

        let assessment = assess_simulation(&base, &scenarios, &stress_tests);
        let confidence_metrics = confidence_metrics(market, required_return.annual_rate);
        let projection = deterministic_projection(goal, market);
        let recommendations =
            simulation_recommendations(goal, required_return.annual_rate, &assessment);

        let total_trials = self.total_trials();
        let execution_ms = started.elapsed().as_secs_f64() * 1000.0;
        metrics.record(execution_ms, total_trials);

        tracing::info!(
            success_probability = assessment.success_probability,
            weighted_probability = assessment.weighted_scenario_probability,
            feasible = assessment.is_feasible,
            confidence = ?assessment.confidence,
            execution_ms,
            "goal simulation complete"
        );

        Ok(SimulationReport {
            goal: *goal,
            market: *market,
            required_return,
            simulation_metrics: SimulationMetrics {
                total_trials,
                execution_ms,
                average_path_value: base.mean_final_value,
                observed_coefficient_of_variation: base.coefficient_of_variation,
            },
            base,
            scenarios,
            stress_tests,
            assessment,
            confidence_metrics,
            projection,
            recommendations,
            seed: self.seed,
        })
    }

    fn total_trials(&self) -> u64 {
        let passes = REGIMES.len() as u64;
        let crises = CRISIS_CATALOG.len() as u64;
        self.config.base_trials as u64
            + passes * self.config.scenario_trials as u64
            + crises * 2 * self.config.stress_trials as u64
    }
}

pub fn weighted_success_probability(scenarios: &[ScenarioResult]) -> f64 {
    scenarios
        .iter()
        .map(|s| s.results.success_probability * s.weight)
        .sum()
}

pub fn survivability_score(success_probability: f64) -> f64 {
    match success_probability {
        p if p >= 0.8 => 1.0,
        p if p >= 0.6 => 0.8,
        p if p >= 0.4 => 0.5,
        p if p >= 0.2 => 0.2,
        _ => 0.0,
    }
}

pub fn assess_simulation(
    base: &ResultSet,
    scenarios: &[ScenarioResult],
    stress_tests: &[StressResult],
) -> SimulationAssessment {
    let success_probability = base.success_probability;
    let weighted_scenario_probability = weighted_success_probability(scenarios);
    let average_stress_survivability = if stress_tests.is_empty() {
        0.0
    } else {
        stress_tests
            .iter()
            .map(|s| s.survivability_score)
            .sum::<f64>()
            / stress_tests.len() as f64
    };

    let confidence = if success_probability >= 0.85 && average_stress_survivability >= 0.7 {
        ConfidenceLevel::High
    } else if success_probability >= 0.70 && average_stress_survivability >= 0.5 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    };

    SimulationAssessment {
        is_feasible: success_probability >= FEASIBLE_SUCCESS
            && weighted_scenario_probability >= FEASIBLE_WEIGHTED_SUCCESS,
        success_probability,
        weighted_scenario_probability,
        average_stress_survivability,
        confidence,
        overall_score: 0.5 * success_probability
            + 0.3 * weighted_scenario_probability
            + 0.2 * average_stress_survivability,
    }
}

pub fn confidence_metrics(market: &MarketParameters, required_return: f64) -> ConfidenceMetrics {
    let return_buffer = market.expected_return - required_return;
    let volatility_risk = if market.expected_return != 0.0 {
        market.volatility / market.expected_return
    } else {
        0.0
    };
    let risk_adjusted_buffer = if market.volatility != 0.0 {
        return_buffer / market.volatility
    } else {
        0.0
    };

    ConfidenceMetrics {
        return_buffer,
        volatility_risk,
        risk_adjusted_buffer,
        confidence_score: ((return_buffer + 0.02) / 0.1).clamp(0.0, 1.0),
    }
}

pub fn deterministic_projection(
    goal: &GoalParameters,
    market: &MarketParameters,
) -> DeterministicProjection {
    let monthly_inflation = goal.inflation_rate / MONTHS_PER_YEAR;
    let nominal_final_value = future_value_escalating(
        goal.initial_investment,
        goal.monthly_contribution,
        market.expected_return / MONTHS_PER_YEAR,
        monthly_inflation,
        goal.timeline_months,
    );
    let real_final_value =
        nominal_final_value / (1.0 + monthly_inflation).powi(goal.timeline_months as i32);

    DeterministicProjection {
        nominal_final_value,
        real_final_value,
        meets_target: real_final_value >= goal.target_amount,
    }
}
