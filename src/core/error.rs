use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parameter validation failed: {}", .violations.join(", "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

impl ValidationError {
    pub fn mentions(&self, needle: &str) -> bool {
        self.violations.iter().any(|v| v.contains(needle))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    RequiredReturn,
    BaseSimulation,
    ScenarioEnsemble,
    StressTest,
    TimelineImpact,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::RequiredReturn => "required return calculation",
            Phase::BaseSimulation => "base simulation",
            Phase::ScenarioEnsemble => "scenario ensemble",
            Phase::StressTest => "stress test",
            Phase::TimelineImpact => "timeline impact simulation",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Goal simulation failed during {phase}: {message}")]
    Computation { phase: Phase, message: String },
}

impl EngineError {
    pub fn computation(phase: Phase, message: impl Into<String>) -> Self {
        EngineError::Computation {
            phase,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
