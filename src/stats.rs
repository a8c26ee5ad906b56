//! Descriptive statistics over trial durations.

use serde::{Deserialize, Serialize};

/// Summary of a non-empty sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation (divides by `count`, not `count - 1`).
    pub std_dev: f64,
    pub median: f64,
}

impl Summary {
    /// Returns `None` for an empty sample.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }

        let count = samples.len();
        let n = count as f64;
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = samples.iter().sum::<f64>() / n;
        let variance = samples.iter().map(|t| (t - mean) * (t - mean)).sum::<f64>() / n;

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median = if count % 2 == 1 {
            sorted[count / 2]
        } else {
            (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
        };

        Some(Self {
            count,
            min,
            max,
            mean,
            std_dev: variance.sqrt(),
            median,
        })
    }

    /// Sample standard deviation (divides by `count - 1`); `0` for a single sample.
    pub fn sample_std_dev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        self.std_dev * (n / (n - 1.0)).sqrt()
    }

    /// Two-sided 95% t-interval for the mean, on `count - 1` degrees of freedom.
    ///
    /// A single sample has no spread estimate and yields `(mean, mean)`.
    pub fn ci95(&self) -> (f64, f64) {
        if self.count < 2 {
            return (self.mean, self.mean);
        }
        let standard_error = self.sample_std_dev() / (self.count as f64).sqrt();
        let margin = t_critical_95(self.count - 1) * standard_error;
        (self.mean - margin, self.mean + margin)
    }
}

/// Two-sided 0.975 quantiles of Student's t for 1..=30 degrees of freedom.
const T_TABLE_95: [f64; 30] = [
    12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.201, 2.179, 2.160,
    2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064, 2.060, 2.056,
    2.052, 2.048, 2.045, 2.042,
];

/// Critical value of Student's t for a two-sided 95% interval.
///
/// Degrees of freedom between tabulated points use the next lower entry, which widens the
/// interval slightly. Returns `f64::INFINITY` for `0` degrees of freedom.
pub fn t_critical_95(df: usize) -> f64 {
    match df {
        0 => f64::INFINITY,
        1..=30 => T_TABLE_95[df - 1],
        31..=39 => T_TABLE_95[29],
        40..=59 => 2.021,
        60..=119 => 2.000,
        120..=999 => 1.980,
        _ => 1.960,
    }
}

/// Welch's unequal-variance t-test of `a` against `b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WelchTest {
    pub t: f64,
    /// Welch-Satterthwaite degrees of freedom.
    pub df: f64,
    /// `|t|` exceeds the two-sided 95% critical value for `floor(df)`.
    pub significant: bool,
}

/// Returns `None` when either sample has fewer than two points or both have zero variance.
pub fn welch_t(a: &[f64], b: &[f64]) -> Option<WelchTest> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }

    let (mean_a, var_a) = mean_and_sample_var(a);
    let (mean_b, var_b) = mean_and_sample_var(b);
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (qa, qb) = (var_a / na, var_b / nb);
    let se2 = qa + qb;
    if se2 <= 0.0 {
        return None;
    }

    let t = (mean_a - mean_b) / se2.sqrt();
    let df = se2 * se2 / (qa * qa / (na - 1.0) + qb * qb / (nb - 1.0));
    Some(WelchTest {
        t,
        df,
        significant: t.abs() > t_critical_95(df.floor() as usize),
    })
}

fn mean_and_sample_var(xs: &[f64]) -> (f64, f64) {
    let mean = xs.iter().sum::<f64>() / xs.len() as f64;
    let ss = xs.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>();
    (mean, ss / (xs.len() - 1) as f64)
}

/// Standardized mean difference between two samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectSize {
    pub cohens_d: f64,
    pub magnitude: EffectMagnitude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectMagnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl EffectMagnitude {
    /// Cohen's conventional thresholds: 0.2, 0.5, 0.8.
    pub fn classify(d: f64) -> Self {
        let d = d.abs();
        if d < 0.2 {
            EffectMagnitude::Negligible
        } else if d < 0.5 {
            EffectMagnitude::Small
        } else if d < 0.8 {
            EffectMagnitude::Medium
        } else {
            EffectMagnitude::Large
        }
    }
}

/// Cohen's d of `a` against `b` using the pooled sample standard deviation.
///
/// Returns `None` when either sample has fewer than two points. When the pooled deviation is
/// zero, `d` is reported as `0.0`.
pub fn cohens_d(a: &[f64], b: &[f64]) -> Option<EffectSize> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }

    let (mean_a, var_a) = mean_and_sample_var(a);
    let (mean_b, var_b) = mean_and_sample_var(b);

    let (na, nb) = (a.len() as f64, b.len() as f64);
    let pooled = (((na - 1.0) * var_a + (nb - 1.0) * var_b) / (na + nb - 2.0)).sqrt();
    let cohens_d = if pooled > 0.0 {
        (mean_a - mean_b) / pooled
    } else {
        0.0
    };

    Some(EffectSize {
        cohens_d,
        magnitude: EffectMagnitude::classify(cohens_d),
    })
}
