//! Gaussian kernel density estimate on a fixed 200-point grid.

use std::f64::consts::PI;

pub const GRID_POINTS: usize = 200;

/// Bandwidth floor when the rule of thumb degenerates to exactly zero.
pub const MIN_BANDWIDTH: f64 = 1e-6;

/// Returns `(xs, ys)`.
///
/// Empty input gives two empty vectors; a sample with zero variance gives a
/// single spike `([v], [1.0])`. Non-finite samples are ignored.
pub fn estimate_density(samples: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let values: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return (vec![min], vec![1.0]);
    }

    let n = values.len() as f64;
    let h = bandwidth(&values);
    let lo = min - 3.0 * h;
    let hi = max + 3.0 * h;
    let step = (hi - lo) / (GRID_POINTS - 1) as f64;
    let norm = 1.0 / (n * h * (2.0 * PI).sqrt());

    let xs: Vec<f64> = (0..GRID_POINTS).map(|i| lo + step * i as f64).collect();
    let ys = xs
        .iter()
        .map(|&x| {
            let sum: f64 = values
                .iter()
                .map(|&v| {
                    let z = (x - v) / h;
                    (-0.5 * z * z).exp()
                })
                .sum();
            sum * norm
        })
        .collect();

    (xs, ys)
}

/// `1.06 * sd * n^(-1/5)` with the sample standard deviation.
pub fn bandwidth(values: &[f64]) -> f64 {
    let h = 1.06 * sample_std(values) * (values.len() as f64).powf(-0.2);
    if h == 0.0 {
        MIN_BANDWIDTH
    } else {
        h
    }
}

pub(crate) fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (n - 1) as f64).sqrt()
}
