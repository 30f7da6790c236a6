use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (one delta degree of freedom).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let avg = mean(values);
    let sum_sq: f64 = values.iter().map(|value| (value - avg).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Summary {
    pub fn of(values: &[f64]) -> Self {
        Self {
            count: values.len(),
            mean: mean(values),
            std: std_dev(values),
            min: quantile(values, 0.0),
            q25: quantile(values, 0.25),
            median: median(values),
            q75: quantile(values, 0.75),
            max: quantile(values, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins over the value range; the last bin is closed.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let mut result: Vec<Bin> = (0..bins)
        .map(|idx| Bin {
            start: lo + width * idx as f64,
            end: lo + width * (idx + 1) as f64,
            count: 0,
        })
        .collect();
    for value in values {
        let idx = (((value - lo) / width) as usize).min(bins - 1);
        result[idx].count += 1;
    }
    result
}

/// Ordinary least squares with an intercept. Rank-deficient inputs get the
/// minimum-norm fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn fit(features: &[Vec<f64>], targets: &[f64]) -> Result<Self> {
        if features.len() != targets.len() {
            bail!(
                "feature rows ({}) and targets ({}) differ in length",
                features.len(),
                targets.len()
            );
        }
        let Some(width) = features.first().map(Vec::len) else {
            bail!("cannot fit a model without samples");
        };
        if features.iter().any(|row| row.len() != width) {
            bail!("feature rows have inconsistent widths");
        }

        // Normal equations over [1, x1, .., xk]; center first for stability.
        let x_means: Vec<f64> = (0..width)
            .map(|col| mean(&features.iter().map(|row| row[col]).collect::<Vec<f64>>()))
            .collect();
        let y_mean = mean(targets);
        let mut gram = vec![vec![0.0; width]; width];
        let mut rhs = vec![0.0; width];
        for (row, target) in features.iter().zip(targets) {
            let centered: Vec<f64> = row.iter().zip(&x_means).map(|(x, m)| x - m).collect();
            for i in 0..width {
                rhs[i] += centered[i] * (target - y_mean);
                for j in 0..width {
                    gram[i][j] += centered[i] * centered[j];
                }
            }
        }
        let coefficients = solve(&gram, &rhs);
        let intercept = y_mean
            - coefficients
                .iter()
                .zip(&x_means)
                .map(|(b, m)| b * m)
                .sum::<f64>();
        Ok(Self {
            intercept,
            coefficients,
        })
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(b, x)| b * x)
                .sum::<f64>()
    }
}

/// Minimum-norm solution of the normal equations `gram * x = rhs`.
///
/// Columns are scaled to unit diagonal, then eigen-directions whose
/// eigenvalue falls below a tolerance relative to the largest are dropped.
/// Constant columns get a zero weight; collinear ones share theirs.
fn solve(gram: &[Vec<f64>], rhs: &[f64]) -> Vec<f64> {
    let n = rhs.len();
    let scale: Vec<f64> = (0..n)
        .map(|i| match gram[i][i].sqrt() {
            norm if norm > 0.0 && norm.is_finite() => norm,
            _ => 1.0,
        })
        .collect();
    let scaled: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| gram[i][j] / (scale[i] * scale[j])).collect())
        .collect();
    let scaled_rhs: Vec<f64> = rhs.iter().zip(&scale).map(|(b, s)| b / s).collect();

    let (eigenvalues, vectors) = symmetric_eigen(scaled);
    let largest = eigenvalues.iter().copied().fold(0.0, f64::max);
    let tolerance = largest * RANK_TOLERANCE;
    let mut solution = vec![0.0; n];
    for (k, lambda) in eigenvalues.iter().enumerate() {
        if *lambda <= tolerance {
            continue;
        }
        let projection: f64 = (0..n).map(|i| vectors[i][k] * scaled_rhs[i]).sum::<f64>() / lambda;
        for i in 0..n {
            solution[i] += projection * vectors[i][k];
        }
    }
    solution.iter().zip(&scale).map(|(x, s)| x / s).collect()
}

const RANK_TOLERANCE: f64 = 1e-10;

/// Cyclic Jacobi rotations. Returns eigenvalues and the eigenvectors as
/// columns of the second matrix.
fn symmetric_eigen(mut a: Vec<Vec<f64>>) -> (Vec<f64>, Vec<Vec<f64>>) {
    let n = a.len();
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();
    for _sweep in 0..64 {
        let off_diagonal: f64 = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| a[i][j] * a[i][j])
            .sum();
        if off_diagonal < 1e-30 {
            break;
        }
        for p in 0..n {
            for q in (p + 1)..n {
                if a[p][q] == 0.0 {
                    continue;
                }
                let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
                let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                for k in 0..n {
                    let (akp, akq) = (a[k][p], a[k][q]);
                    a[k][p] = c * akp - s * akq;
                    a[k][q] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[p][k], a[q][k]);
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                for row in v.iter_mut() {
                    let (vkp, vkq) = (row[p], row[q]);
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
    }
    ((0..n).map(|i| a[i][i]).collect(), v)
}
