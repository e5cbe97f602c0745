const ZERO_RATE_EPS: f64 = 1e-12;

pub fn future_value(present_value: f64, monthly_payment: f64, monthly_rate: f64, periods: u32) -> f64 {
    if monthly_rate.abs() < ZERO_RATE_EPS {
        return present_value + monthly_payment * periods as f64;
    }

    let growth = (1.0 + monthly_rate).powi(periods as i32);
    present_value * growth + monthly_payment * ((growth - 1.0) / monthly_rate)
}

// Payments grow by `monthly_growth` and are invested before the month's return.
pub fn future_value_escalating(
    present_value: f64,
    monthly_payment: f64,
    monthly_rate: f64,
    monthly_growth: f64,
    periods: u32,
) -> f64 {
    let n = periods as i32;
    let growth = (1.0 + monthly_rate).powi(n);
    let principal = present_value * growth;
    if periods == 0 {
        return principal;
    }

    let ratio = (1.0 + monthly_growth) / (1.0 + monthly_rate);
    let series = if (ratio - 1.0).abs() < ZERO_RATE_EPS {
        periods as f64
    } else {
        (1.0 - ratio.powi(n)) / (1.0 - ratio)
    };
    principal + monthly_payment * growth * series
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert_eq, proptest};

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn future_value_matches_hand_calculation() {
        // 100 for two months at 10% plus 10 at each month end: 121 + 21.
        assert_approx(future_value(100.0, 10.0, 0.10, 2), 142.0);
    }

    #[test]
    fn escalating_future_value_matches_monthly_loop() {
        let (pv, pmt, r, g, n) = (2_500.0, 300.0, 0.006, 0.0025, 48_u32);
        let mut value = pv;
        let mut payment = pmt;
        for _ in 0..n {
            value += payment;
            value *= 1.0 + r;
            payment *= 1.0 + g;
        }
        assert_approx(future_value_escalating(pv, pmt, r, g, n), value);
    }

    #[test]
    fn escalating_future_value_handles_equal_rate_and_growth() {
        let (pv, pmt, r, n) = (0.0, 100.0, 0.01, 12_u32);
        let mut value = pv;
        let mut payment = pmt;
        for _ in 0..n {
            value += payment;
            value *= 1.0 + r;
            payment *= 1.0 + r;
        }
        assert_approx(future_value_escalating(pv, pmt, r, r, n), value);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_zero_rate_future_value_is_exact(
            pv in 0u32..5_000_000,
            pmt in 0u32..50_000,
            n in 0u32..601
        ) {
            let pv = pv as f64;
            let pmt = pmt as f64;
            prop_assert_eq!(future_value(pv, pmt, 0.0, n), pv + pmt * n as f64);
        }
    }
}
