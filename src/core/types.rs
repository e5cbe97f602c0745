use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalParameters {
    pub target_amount: f64,
    pub timeline_months: u32,
    pub monthly_contribution: f64,
    pub initial_investment: f64,
    pub inflation_rate: f64,
    pub risk_tolerance: u32,
    pub has_emergency_fund: bool,
}

impl GoalParameters {
    pub fn timeline_years(&self) -> f64 {
        self.timeline_months as f64 / MONTHS_PER_YEAR
    }

    pub fn inflation_adjusted_target(&self) -> f64 {
        self.target_amount * (1.0 + self.inflation_rate).powf(self.timeline_years())
    }

    pub fn planned_contributions(&self) -> f64 {
        self.initial_investment + self.monthly_contribution * self.timeline_months as f64
    }

    pub fn with_timeline(&self, timeline_months: u32) -> Self {
        Self {
            timeline_months,
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketParameters {
    pub expected_return: f64,
    pub volatility: f64,
    pub risk_free_rate: f64,
}

impl Default for MarketParameters {
    fn default() -> Self {
        Self {
            expected_return: 0.10,
            volatility: 0.16,
            risk_free_rate: 0.045,
        }
    }
}

impl MarketParameters {
    pub fn for_risk_tolerance(risk_tolerance: u32, risk_free_rate: f64) -> Self {
        let profile = risk_profile(risk_tolerance);
        Self {
            expected_return: profile.expected_return,
            volatility: profile.max_volatility,
            risk_free_rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub expected_return: f64,
    pub max_volatility: f64,
}

const RISK_PROFILES: [RiskProfile; 10] = [
    RiskProfile {
        expected_return: 0.04,
        max_volatility: 0.08,
    },
    RiskProfile {
        expected_return: 0.05,
        max_volatility: 0.10,
    },
    RiskProfile {
        expected_return: 0.06,
        max_volatility: 0.12,
    },
    RiskProfile {
        expected_return: 0.07,
        max_volatility: 0.14,
    },
    RiskProfile {
        expected_return: 0.08,
        max_volatility: 0.16,
    },
    RiskProfile {
        expected_return: 0.09,
        max_volatility: 0.18,
    },
    RiskProfile {
        expected_return: 0.10,
        max_volatility: 0.20,
    },
    RiskProfile {
        expected_return: 0.12,
        max_volatility: 0.24,
    },
    RiskProfile {
        expected_return: 0.15,
        max_volatility: 0.28,
    },
    RiskProfile {
        expected_return: 0.18,
        max_volatility: 0.32,
    },
];

pub fn risk_profile(risk_tolerance: u32) -> RiskProfile {
    let tier = risk_tolerance.clamp(1, 10) as usize;
    RISK_PROFILES[tier - 1]
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentExperience {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserProfile {
    pub age: u32,
    pub investment_experience: InvestmentExperience,
    pub has_emergency_fund: bool,
    pub current_income: Option<f64>,
    pub dependents: u32,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            age: 35,
            investment_experience: InvestmentExperience::Intermediate,
            has_emergency_fund: false,
            current_income: None,
            dependents: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrisisDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub duration_months: u32,
    pub market_drop: f64,
    pub recovery_months: u32,
    pub volatility_multiplier: f64,
}

pub const CRISIS_CATALOG: [CrisisDefinition; 4] = [
    CrisisDefinition {
        key: "crisis2008",
        name: "Financial Crisis 2008",
        duration_months: 18,
        market_drop: -0.37,
        recovery_months: 22,
        volatility_multiplier: 2.5,
    },
    CrisisDefinition {
        key: "covidCrash",
        name: "COVID-19 Crash 2020",
        duration_months: 2,
        market_drop: -0.34,
        recovery_months: 6,
        volatility_multiplier: 3.0,
    },
    CrisisDefinition {
        key: "dotComBubble",
        name: "Dot-com Bubble 2000",
        duration_months: 30,
        market_drop: -0.49,
        recovery_months: 36,
        volatility_multiplier: 2.0,
    },
    CrisisDefinition {
        key: "greatDepression",
        name: "Great Depression Scenario",
        duration_months: 36,
        market_drop: -0.85,
        recovery_months: 120,
        volatility_multiplier: 4.0,
    },
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ContributionMode {
    Level,
    InflationEscalated,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedPath {
    pub final_nominal_value: f64,
    pub final_real_value: f64,
    pub total_contributions: f64,
    pub max_drawdown: f64,
    pub goal_achieved: bool,
    pub shortfall: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    pub trials: u32,
    pub success_probability: f64,
    pub mean_final_value: f64,
    pub median_final_value: f64,
    pub std_dev_final_value: f64,
    pub ci90: ConfidenceInterval,
    pub ci95: ConfidenceInterval,
    pub mean_shortfall: f64,
    pub coefficient_of_variation: f64,
    pub worst_case: f64,
    pub best_case: f64,
    pub mean_max_drawdown: f64,
    pub mean_total_contributions: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Bull,
    Normal,
    Bear,
    Stagnant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResult {
    pub scenario: ScenarioKind,
    pub name: String,
    pub weight: f64,
    pub market: MarketParameters,
    pub results: ResultSet,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StressResult {
    pub crisis: String,
    pub description: String,
    pub impact_on_goal_percent: f64,
    pub survivability_score: f64,
    pub worst_case_shortfall: f64,
    pub crisis_start_month: u32,
    pub recovery_months: u32,
    pub crisis_success_probability: f64,
    pub baseline_success_probability: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub runs: u64,
    pub trials_simulated: u64,
    pub last_execution_ms: f64,
    pub average_execution_ms: f64,
}

impl PerformanceMetrics {
    const SMOOTHING: f64 = 0.1;

    pub fn record(&mut self, execution_ms: f64, trials: u64) {
        self.runs += 1;
        self.trials_simulated += trials;
        self.last_execution_ms = execution_ms;
        self.average_execution_ms = if self.runs == 1 {
            execution_ms
        } else {
            self.average_execution_ms * (1.0 - Self::SMOOTHING) + execution_ms * Self::SMOOTHING
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_profile_clamps_out_of_range_tiers() {
        assert_eq!(risk_profile(0), risk_profile(1));
        assert_eq!(risk_profile(42), risk_profile(10));
        assert_eq!(risk_profile(7).expected_return, 0.10);
        assert_eq!(risk_profile(7).max_volatility, 0.20);
    }

    #[test]
    fn inflation_adjusted_target_compounds_annually() {
        let goal = GoalParameters {
            target_amount: 1_000.0,
            timeline_months: 24,
            monthly_contribution: 0.0,
            initial_investment: 0.0,
            inflation_rate: 0.10,
            risk_tolerance: 5,
            has_emergency_fund: true,
        };
        assert!((goal.inflation_adjusted_target() - 1_210.0).abs() < 1e-9);
    }

    #[test]
    fn performance_metrics_seed_average_then_smooth() {
        let mut metrics = PerformanceMetrics::default();
        metrics.record(100.0, 10);
        assert_eq!(metrics.average_execution_ms, 100.0);
        metrics.record(200.0, 10);
        assert!((metrics.average_execution_ms - 110.0).abs() < 1e-9);
        assert_eq!(metrics.runs, 2);
        assert_eq!(metrics.trials_simulated, 20);
        assert_eq!(metrics.last_execution_ms, 200.0);
    }
}
