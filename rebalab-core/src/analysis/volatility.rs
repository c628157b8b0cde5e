//! Exponentially weighted volatility — pure functions over close series.
//!
//! Volatility is the average of the EW standard-deviation series of log
//! returns, span parameterized with the adjust=false recursion. Values are
//! on the scale of the sampling granularity, not annualized. The portfolio
//! measure runs the same recursion over the equal-weight mean of per-symbol
//! returns.

/// Log returns ln(p_t / p_{t-1}); NaN where either price is unusable.
pub fn log_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .map(|pair| {
            if pair[0].is_finite() && pair[1].is_finite() && pair[0] > 0.0 && pair[1] > 0.0 {
                (pair[1] / pair[0]).ln()
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Running EW standard deviation, span parameterization, adjust = false:
///
///   alpha  = 2 / (span + 1)
///   mean_t = (1 - alpha) * mean_{t-1} + alpha * x_t
///   var_t  = (1 - alpha) * (var_{t-1} + alpha * (x_t - mean_{t-1})^2)
///
/// Output is aligned with the input. The first usable value seeds the mean
/// and yields NaN; NaN inputs carry the previous estimate forward.
pub fn ewm_std(values: &[f64], span: usize) -> Vec<f64> {
    let span = span.max(1) as f64;
    let alpha = 2.0 / (span + 1.0);

    let mut out = Vec::with_capacity(values.len());
    let mut mean: Option<f64> = None;
    let mut var = 0.0;
    let mut latest = f64::NAN;

    for &x in values {
        if !x.is_finite() {
            out.push(latest);
            continue;
        }
        match mean {
            None => {
                mean = Some(x);
                out.push(f64::NAN);
            }
            Some(m) => {
                let deviation = x - m;
                var = (1.0 - alpha) * (var + alpha * deviation * deviation);
                mean = Some((1.0 - alpha) * m + alpha * x);
                latest = var.sqrt();
                out.push(latest);
            }
        }
    }
    out
}

/// Mean of the finite entries of the EW standard-deviation series of a
/// return series. None when no entry is usable.
pub fn average_ewm_std(returns: &[f64], span: usize) -> Option<f64> {
    let stds = ewm_std(returns, span);
    let finite: Vec<f64> = stds.into_iter().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    Some(finite.iter().sum::<f64>() / finite.len() as f64)
}

/// Average EW volatility of a close series: `average_ewm_std` over its log
/// returns. None when the series is too short or too broken to produce any
/// estimate.
pub fn average_ewm_volatility(closes: &[f64], span: usize) -> Option<f64> {
    average_ewm_std(&log_returns(closes), span)
}

/// Equal-weight portfolio returns: the per-index mean across aligned return
/// series. An index where any series is NaN stays NaN, so the EW recursion
/// skips incomplete rows.
pub fn equal_weight_returns(series: &[Vec<f64>]) -> Vec<f64> {
    let len = series.iter().map(|s| s.len()).min().unwrap_or(0);
    (0..len)
        .map(|i| {
            let mut sum = 0.0;
            for s in series {
                if !s[i].is_finite() {
                    return f64::NAN;
                }
                sum += s[i];
            }
            sum / series.len() as f64
        })
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_returns_basic() {
        let returns = log_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(returns.len(), 2);
        assert!((returns[0] - (1.1f64).ln()).abs() < 1e-12);
        assert!(returns[1] < 0.0);
    }

    #[test]
    fn log_returns_guard_bad_prices() {
        let returns = log_returns(&[100.0, 0.0, 110.0, f64::NAN, 120.0]);
        assert!(returns[0].is_nan());
        assert!(returns[1].is_nan());
        assert!(returns[2].is_nan());
        assert!(returns[3].is_nan());
    }

    #[test]
    fn ewm_std_constant_series_is_zero() {
        let stds = ewm_std(&[0.01, 0.01, 0.01, 0.01], 3);
        assert!(stds[0].is_nan());
        // Constant input has zero deviation from the seeded mean.
        assert!(stds[3].abs() < 1e-12);
    }

    #[test]
    fn ewm_std_rises_with_dispersion() {
        let calm = ewm_std(&[0.001, -0.001, 0.001, -0.001, 0.001], 4);
        let wild = ewm_std(&[0.05, -0.05, 0.05, -0.05, 0.05], 4);
        assert!(wild[4] > calm[4]);
    }

    #[test]
    fn ewm_std_carries_through_nan() {
        let stds = ewm_std(&[0.01, -0.01, f64::NAN, 0.01], 4);
        assert_eq!(stds[2], stds[1]);
        assert!(stds[3].is_finite());
    }

    #[test]
    fn average_volatility_is_mean_of_ewm_series() {
        let closes = [100.0, 110.0, 100.0, 110.0, 100.0];
        let stds = ewm_std(&log_returns(&closes), 3);
        let finite: Vec<f64> = stds.into_iter().filter(|v| v.is_finite()).collect();
        let expected = finite.iter().sum::<f64>() / finite.len() as f64;

        let avg = average_ewm_volatility(&closes, 3).unwrap();
        assert!((avg - expected).abs() < 1e-12);
        // The average is not the last entry of the series.
        assert!((avg - finite[finite.len() - 1]).abs() > 1e-6);
    }

    #[test]
    fn average_volatility_none_without_usable_returns() {
        assert!(average_ewm_volatility(&[100.0], 10).is_none());
        // One return only seeds the recursion, never yields an estimate.
        assert!(average_ewm_volatility(&[100.0, 101.0], 10).is_none());

        let vol = average_ewm_volatility(&[100.0, 101.0, 100.0, 102.0], 3);
        assert!(vol.is_some());
        assert!(vol.unwrap() >= 0.0);
    }

    #[test]
    fn equal_weight_returns_average_across_series() {
        let merged = equal_weight_returns(&[vec![0.02, -0.01], vec![0.04, 0.03]]);
        assert!((merged[0] - 0.03).abs() < 1e-12);
        assert!((merged[1] - 0.01).abs() < 1e-12);
    }

    #[test]
    fn equal_weight_returns_nan_on_incomplete_rows() {
        let merged = equal_weight_returns(&[vec![0.02, f64::NAN], vec![0.04, 0.03]]);
        assert!((merged[0] - 0.03).abs() < 1e-12);
        assert!(merged[1].is_nan());
    }

    #[test]
    fn equal_weight_returns_empty_input() {
        assert!(equal_weight_returns(&[]).is_empty());
    }
}
