use super::error::{EngineError, Phase, Result};
use super::types::{ConfidenceInterval, ResultSet, SimulatedPath};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() as f64 - 1.0);
    variance.sqrt()
}

// Linear interpolation between the order statistics bracketing
// `p/100·(n−1)`. `sorted` must be ascending.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (n as f64 - 1.0);
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);

    if lower == upper {
        sorted[lower]
    } else {
        let w = rank - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * w
    }
}

pub fn analyze_paths(paths: &[SimulatedPath], phase: Phase) -> Result<ResultSet> {
    if paths.is_empty() {
        return Err(EngineError::computation(phase, "no simulated paths to analyze"));
    }
    if let Some(bad) = paths
        .iter()
        .position(|p| !p.final_real_value.is_finite() || !p.final_nominal_value.is_finite())
    {
        return Err(EngineError::computation(
            phase,
            format!("trial {bad} produced a non-finite portfolio value"),
        ));
    }

    let mut values: Vec<f64> = paths.iter().map(|p| p.final_real_value).collect();
    values.sort_by(|a, b| a.total_cmp(b));

    let successes = paths.iter().filter(|p| p.goal_achieved).count();
    let shortfalls: Vec<f64> = paths
        .iter()
        .map(|p| p.shortfall)
        .filter(|s| *s > 0.0)
        .collect();
    let drawdowns: Vec<f64> = paths.iter().map(|p| p.max_drawdown).collect();
    let contributions: Vec<f64> = paths.iter().map(|p| p.total_contributions).collect();

    let mean_final_value = mean(&values);
    let std_dev_final_value = std_dev(&values);
    let coefficient_of_variation = if mean_final_value.abs() > f64::EPSILON {
        std_dev_final_value / mean_final_value
    } else {
        0.0
    };

    Ok(ResultSet {
        trials: paths.len() as u32,
        success_probability: successes as f64 / paths.len() as f64,
        mean_final_value,
        median_final_value: percentile(&values, 50.0),
        std_dev_final_value,
        ci90: ConfidenceInterval {
            lower: percentile(&values, 5.0),
            upper: percentile(&values, 95.0),
        },
        ci95: ConfidenceInterval {
            lower: percentile(&values, 2.5),
            upper: percentile(&values, 97.5),
        },
        mean_shortfall: mean(&shortfalls),
        coefficient_of_variation,
        worst_case: values[0],
        best_case: values[values.len() - 1],
        mean_max_drawdown: mean(&drawdowns),
        mean_total_contributions: mean(&contributions),
    })
}
