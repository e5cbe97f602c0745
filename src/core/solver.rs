use serde::Serialize;

use super::finance::future_value;
use super::types::{GoalParameters, MONTHS_PER_YEAR};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnBracket {
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl ReturnBracket {
    pub const WIDE: ReturnBracket = ReturnBracket {
        search_min: -0.10,
        search_max: 0.50,
        tolerance: 1e-4,
        max_iterations: 100,
    };

    pub const NARROW: ReturnBracket = ReturnBracket {
        search_min: -0.05,
        search_max: 0.30,
        tolerance: 1e-4,
        max_iterations: 100,
    };
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BracketStatus {
    Solved,
    /// The goal is reachable even at the lower bound.
    BelowBracket,
    /// Even the upper bound falls short of the target.
    AboveBracket,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequiredReturn {
    pub annual_rate: f64,
    pub status: BracketStatus,
    pub iterations: u32,
    pub converged: bool,
}

impl RequiredReturn {
    pub fn is_solvable(&self) -> bool {
        self.status == BracketStatus::Solved
    }
}

fn projected_value(goal: &GoalParameters, annual_rate: f64) -> f64 {
    future_value(
        goal.initial_investment,
        goal.monthly_contribution,
        annual_rate / MONTHS_PER_YEAR,
        goal.timeline_months,
    )
}

pub fn required_annual_return(goal: &GoalParameters, bracket: ReturnBracket) -> RequiredReturn {
    let target = goal.inflation_adjusted_target();

    let status = if projected_value(goal, bracket.search_max) < target {
        BracketStatus::AboveBracket
    } else if projected_value(goal, bracket.search_min) >= target {
        BracketStatus::BelowBracket
    } else {
        BracketStatus::Solved
    };

    let mut lo = bracket.search_min;
    let mut hi = bracket.search_max;
    let mut it = 0;
    while hi - lo > bracket.tolerance && it < bracket.max_iterations {
        let mid = (lo + hi) * 0.5;
        if projected_value(goal, mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
        it += 1;
    }

    let result = RequiredReturn {
        annual_rate: (lo + hi) * 0.5,
        status,
        iterations: it,
        converged: hi - lo <= bracket.tolerance,
    };

    if !result.is_solvable() {
        tracing::warn!(
            status = ?result.status,
            estimate = result.annual_rate,
            search_min = bracket.search_min,
            search_max = bracket.search_max,
            "required return lies outside the search bracket; returning clamped estimate"
        );
    }

    result
}
