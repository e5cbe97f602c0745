mod checker;
mod config;
mod decision;
mod engine;
mod error;
mod finance;
mod path;
mod random;
mod recommend;
mod solver;
mod stats;
mod types;
mod validation;

pub use checker::{FeasibilityEngine, FeasibilityReport, SimulationSummary};
pub use config::{EngineConfig, MarketAssumptions};
pub use decision::{
    FeasibilityVerdict, MarketComparison, ReturnReasonableness, RiskAssessment, RiskMatch,
    assess_risk_alignment, compare_to_market, confidence_level, determine_feasibility,
    verdict_gate,
};
pub use engine::{
    BatchRequest, ConfidenceMetrics, DeterministicProjection, MonteCarloEngine,
    SimulationAssessment, SimulationMetrics, SimulationReport, assess_simulation,
    survivability_score, weighted_success_probability,
};
pub use error::{EngineError, Phase, Result, ValidationError};
pub use finance::{future_value, future_value_escalating};
pub use path::{CrisisInjection, simulate_path};
pub use random::{NormalGenerator, UniformSource, derive_seed, stream_rng};
pub use recommend::{Priority, Recommendation, RecommendationKind, TimelineImpact, format_currency};
pub use solver::{BracketStatus, RequiredReturn, ReturnBracket, required_annual_return};
pub use stats::{analyze_paths, mean, percentile, std_dev};
pub use types::{
    CRISIS_CATALOG, ConfidenceInterval, ConfidenceLevel, ContributionMode, CrisisDefinition,
    GoalParameters, InvestmentExperience, MarketParameters, PerformanceMetrics, ResultSet,
    RiskProfile, ScenarioKind, ScenarioResult, SimulatedPath, StressResult, UserProfile,
    risk_profile,
};
pub use validation::{
    MAX_TIMELINE_MONTHS, MIN_TIMELINE_MONTHS, validate_feasibility_inputs,
    validate_simulation_inputs,
};
