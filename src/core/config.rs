use serde::Serialize;

use super::error::ValidationError;

pub const MAX_TRIALS: u32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAssumptions {
    pub historical_average_return: f64,
    pub risk_free_rate: f64,
}

impl Default for MarketAssumptions {
    fn default() -> Self {
        Self {
            historical_average_return: 0.10,
            risk_free_rate: 0.045,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub base_trials: u32,
    pub scenario_trials: u32,
    pub stress_trials: u32,
    pub impact_trials: u32,
    pub seed: Option<u64>,
    pub market: MarketAssumptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_trials: 5_000,
            scenario_trials: 1_000,
            stress_trials: 500,
            impact_trials: 1_000,
            seed: None,
            market: MarketAssumptions::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        for (label, trials) in [
            ("base trials", self.base_trials),
            ("scenario trials", self.scenario_trials),
            ("stress trials", self.stress_trials),
            ("impact trials", self.impact_trials),
        ] {
            if trials == 0 {
                violations.push(format!("Number of {label} must be > 0"));
            } else if trials > MAX_TRIALS {
                violations.push(format!("Number of {label} must be at most {MAX_TRIALS}"));
            }
        }
        if !(0.0..=0.15).contains(&self.market.risk_free_rate) {
            violations.push("Risk-free rate must be between 0% and 15%".to_string());
        }
        if !self.market.historical_average_return.is_finite() {
            violations.push("Historical average return must be finite".to_string());
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_trials, 5_000);
        assert_eq!(config.scenario_trials, 1_000);
        assert_eq!(config.stress_trials, 500);
    }

    #[test]
    fn zero_trial_counts_are_rejected() {
        let config = EngineConfig {
            base_trials: 0,
            stress_trials: 0,
            ..EngineConfig::default()
        };
        let err = config.validate().expect_err("must reject");
        assert!(err.mentions("base trials"));
        assert!(err.mentions("stress trials"));
    }

    #[test]
    fn oversized_trial_counts_are_rejected() {
        let config = EngineConfig {
            base_trials: 4_000_000_000,
            scenario_trials: MAX_TRIALS,
            ..EngineConfig::default()
        };
        let err = config.validate().expect_err("must reject");
        assert_eq!(
            err.violations,
            vec![format!("Number of base trials must be at most {MAX_TRIALS}")]
        );
    }
}
