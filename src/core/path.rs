use super::random::{NormalGenerator, UniformSource};
use super::types::{
    ContributionMode, CrisisDefinition, GoalParameters, MONTHS_PER_YEAR, MarketParameters,
    SimulatedPath,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrisisInjection {
    pub crisis: CrisisDefinition,
    pub start_month: u32,
}

impl CrisisInjection {
    fn covers(&self, month: u32) -> bool {
        month >= self.start_month && month < self.start_month + self.crisis.duration_months
    }
}

#[derive(Clone, Copy)]
struct MonthlyDynamics {
    drift: f64,
    shock_scale: f64,
}

// `trace` receives the opening value (after any immediate crisis drop), then
// each month-end value.
pub fn simulate_path<S: UniformSource>(
    goal: &GoalParameters,
    market: &MarketParameters,
    contributions: ContributionMode,
    crisis: Option<&CrisisInjection>,
    normals: &mut NormalGenerator<S>,
    mut trace: Option<&mut Vec<f64>>,
) -> SimulatedPath {
    let normal = MonthlyDynamics {
        drift: market.expected_return / MONTHS_PER_YEAR,
        shock_scale: market.volatility / MONTHS_PER_YEAR.sqrt(),
    };
    let stressed = crisis.map(|c| MonthlyDynamics {
        drift: c.crisis.market_drop / c.crisis.duration_months.max(1) as f64,
        shock_scale: normal.shock_scale * c.crisis.volatility_multiplier,
    });
    let monthly_inflation = goal.inflation_rate / MONTHS_PER_YEAR;
    let contribution_growth = match contributions {
        ContributionMode::Level => 1.0,
        ContributionMode::InflationEscalated => 1.0 + monthly_inflation,
    };

    let mut value = goal.initial_investment;
    let mut total_contributions = goal.initial_investment;
    if let Some(c) = crisis {
        if c.start_month == 0 {
            value *= 1.0 + c.crisis.market_drop;
        }
    }
    let mut peak = value;
    let mut max_drawdown: f64 = 0.0;
    if let Some(t) = trace.as_deref_mut() {
        t.clear();
        t.push(value);
    }

    let mut contribution = goal.monthly_contribution;
    for month in 1..=goal.timeline_months {
        value += contribution;
        total_contributions += contribution;
        contribution *= contribution_growth;

        let dynamics = match (crisis, stressed) {
            (Some(c), Some(s)) if c.covers(month) => s,
            _ => normal,
        };
        let realized = (dynamics.drift + dynamics.shock_scale * normals.standard_normal()).max(-1.0);
        value *= 1.0 + realized;

        if value > peak {
            peak = value;
        } else if peak > 0.0 {
            max_drawdown = max_drawdown.max((peak - value) / peak);
        }

        if let Some(t) = trace.as_deref_mut() {
            t.push(value);
        }
    }

    let deflator = (1.0 + monthly_inflation).powi(goal.timeline_months as i32);
    let final_real_value = value / deflator;
    let goal_achieved = final_real_value >= goal.target_amount;

    SimulatedPath {
        final_nominal_value: value,
        final_real_value,
        total_contributions,
        max_drawdown,
        goal_achieved,
        shortfall: if goal_achieved {
            0.0
        } else {
            goal.target_amount - final_real_value
        },
    }
}
