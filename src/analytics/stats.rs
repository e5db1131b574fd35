//! Statistics helpers for the metrics analyzer.
//!
//! Small, allocation-free routines: ordinary least-squares regression over
//! an index series, quartiles by rounded index, mean and median. Numeric
//! edge cases (empty input, zero denominators) short-circuit to zero rather
//! than raising.

/// Ordinary least-squares fit of `values` against their indices
/// (x = 0..n-1, y = value). Returns `(slope, intercept)`.
///
/// Returns `(0.0, 0.0)` for empty input. The denominator cannot vanish for
/// a strictly increasing index with n > 1, but is guarded anyway.
#[must_use]
pub fn linear_regression(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    if values.is_empty() {
        return (0.0, 0.0);
    }

    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_x2) = (0.0, 0.0, 0.0, 0.0);
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator == 0.0 {
        return (0.0, sum_y / n);
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    (slope, intercept)
}

/// First and third quartile of a sorted sample, taken at the rounded
/// fractional indices `round((n-1)*0.25)` and `round((n-1)*0.75)`.
///
/// The caller guarantees `sorted` is non-empty and ascending.
#[must_use]
pub fn quartiles(sorted: &[f64]) -> (f64, f64) {
    debug_assert!(!sorted.is_empty());
    let last = (sorted.len() - 1) as f64;
    let q1_index = (last * 0.25).round() as usize;
    let q3_index = (last * 0.75).round() as usize;
    (sorted[q1_index], sorted[q3_index])
}

/// Arithmetic mean; 0.0 for empty input.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median of a sorted sample; 0.0 for empty input.
#[must_use]
pub fn median_of_sorted(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Round to one decimal place, half away from zero.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn regression_recovers_exact_line() {
        // y = 2x + 1
        let values = [1.0, 3.0, 5.0, 7.0, 9.0];
        let (slope, intercept) = linear_regression(&values);
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn regression_empty_input() {
        assert_eq!(linear_regression(&[]), (0.0, 0.0));
    }

    #[test]
    fn regression_single_point() {
        let (slope, intercept) = linear_regression(&[4.2]);
        assert_eq!(slope, 0.0);
        assert_eq!(intercept, 4.2);
    }

    #[test]
    fn quartiles_by_rounded_index() {
        // n=4: q1 index round(3*0.25)=1, q3 index round(3*0.75)=2
        assert_eq!(quartiles(&[1.0, 2.0, 3.0, 100.0]), (2.0, 3.0));
        // n=5: q1 index 1, q3 index 3
        assert_eq!(quartiles(&[1.0, 2.0, 3.0, 4.0, 5.0]), (2.0, 4.0));
    }

    #[test]
    fn median_even_and_odd() {
        assert_eq!(median_of_sorted(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(median_of_sorted(&[1.0, 2.0, 3.0, 4.0]), 2.5);
        assert_eq!(median_of_sorted(&[]), 0.0);
    }

    #[test]
    fn round1_half_away_from_zero() {
        assert_eq!(round1(1.25), 1.3);
        assert_eq!(round1(-1.25), -1.3);
        assert_eq!(round1(39.96), 40.0);
    }

    proptest! {
        #[test]
        fn constant_series_has_zero_slope(value in -1e6f64..1e6, len in 2usize..64) {
            let values = vec![value; len];
            let (slope, _) = linear_regression(&values);
            prop_assert!(slope.abs() < 1e-6);
        }

        #[test]
        fn median_within_sample_bounds(mut values in prop::collection::vec(-1e6f64..1e6, 1..64)) {
            values.sort_by(f64::total_cmp);
            let median = median_of_sorted(&values);
            prop_assert!(median >= values[0] && median <= values[values.len() - 1]);
        }
    }
}
