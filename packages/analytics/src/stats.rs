//! Descriptive statistics over count series.

use queimadas_analytics_models::SeriesStats;

#[allow(clippy::cast_precision_loss)]
fn as_f64(values: &[u64]) -> Vec<f64> {
    values.iter().map(|&v| v as f64).collect()
}

/// Arithmetic mean, zero for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    values.iter().sum::<f64>() / n
}

/// Sample standard deviation (n - 1 denominator), zero for fewer than two
/// values.
#[must_use]
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    #[allow(clippy::cast_precision_loss)]
    let denom = (values.len() - 1) as f64;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / denom;
    variance.sqrt()
}

/// Median of a sample, `None` when empty.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some(f64::midpoint(sorted[mid - 1], sorted[mid]))
    } else {
        Some(sorted[mid])
    }
}

/// Trailing mean over `window` values using however many are available,
/// so the first entries average fewer values.
#[must_use]
pub fn rolling_mean(counts: &[u64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let values = as_f64(counts);
    (0..values.len())
        .map(|i| mean(&values[(i + 1).saturating_sub(window)..=i]))
        .collect()
}

#[must_use]
pub fn series_stats(counts: &[u64]) -> SeriesStats {
    if counts.is_empty() {
        return SeriesStats::default();
    }
    let values = as_f64(counts);
    SeriesStats {
        mean: mean(&values),
        median: median(&values).unwrap_or(0.0),
        std_dev: sample_std_dev(&values),
        min: counts.iter().copied().min().unwrap_or(0),
        max: counts.iter().copied().max().unwrap_or(0),
        total: counts.iter().sum(),
        count: counts.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_std_dev_matches_hand_computation() {
        // mean 5, squared deviations sum 32, / 7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((sample_std_dev(&values) - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!(sample_std_dev(&[3.0]).abs() < f64::EPSILON);
    }

    #[test]
    fn rolling_mean_uses_available_periods() {
        let means = rolling_mean(&[10, 20, 30, 40], 3);
        assert_eq!(means, vec![10.0, 15.0, 20.0, 30.0]);
    }

    #[test]
    fn rolling_mean_matches_window_definition() {
        let counts = [5u64, 1, 9, 3, 7, 2, 8, 6, 4, 10];
        for window in 1..=12 {
            let means = rolling_mean(&counts, window);
            for (i, m) in means.iter().enumerate() {
                let lo = (i + 1).saturating_sub(window);
                let slice = &counts[lo..=i];
                #[allow(clippy::cast_precision_loss)]
                let expected = slice.iter().sum::<u64>() as f64 / slice.len() as f64;
                assert!((m - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn zero_window_behaves_like_one() {
        assert_eq!(rolling_mean(&[4, 8], 0), vec![4.0, 8.0]);
    }

    #[test]
    fn median_of_even_and_odd_samples() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn stats_of_empty_series_are_zero() {
        assert_eq!(series_stats(&[]), SeriesStats::default());
    }

    #[test]
    fn stats_of_counts() {
        let stats = series_stats(&[10, 5, 3]);
        assert_eq!(stats.total, 18);
        assert_eq!(stats.min, 3);
        assert_eq!(stats.max, 10);
        assert_eq!(stats.count, 3);
        assert!((stats.mean - 6.0).abs() < f64::EPSILON);
        assert!((stats.median - 5.0).abs() < f64::EPSILON);
    }
}
