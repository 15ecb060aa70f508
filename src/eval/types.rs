//! Evaluation primitives: F-measure counts and resampled metric summaries.
//!
//! These are shared by every sink in the scoring network.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign};

/// True-positive, false-positive and false-negative counts.
///
/// Every ratio is 0 when its denominator is 0, so scores are defined for
/// empty inputs.
///
/// ```rust
/// use eal_scorer::eval::FMeasureCounts;
///
/// let counts = FMeasureCounts::new(1, 2, 0);
/// assert!((counts.precision() - 1.0 / 3.0).abs() < 1e-12);
/// assert_eq!(counts.recall(), 1.0);
/// assert!((counts.f1() - 0.5).abs() < 1e-12);
/// assert_eq!(FMeasureCounts::default().f1(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FMeasureCounts {
    /// Items in both gold and system
    pub true_positives: usize,
    /// Items only in system
    pub false_positives: usize,
    /// Items only in gold
    pub false_negatives: usize,
}

impl FMeasureCounts {
    /// Counts from raw values.
    #[must_use]
    pub fn new(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        Self {
            true_positives,
            false_positives,
            false_negatives,
        }
    }

    /// TP / (TP + FP).
    #[must_use]
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.system_count())
    }

    /// TP / (TP + FN).
    #[must_use]
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.gold_count())
    }

    /// Harmonic mean of precision and recall.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Total number of gold items.
    #[must_use]
    pub fn gold_count(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    /// Total number of system items.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.true_positives + self.false_positives
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl AddAssign for FMeasureCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.true_positives += rhs.true_positives;
        self.false_positives += rhs.false_positives;
        self.false_negatives += rhs.false_negatives;
    }
}

impl Add for FMeasureCounts {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl std::iter::Sum for FMeasureCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl fmt::Display for FMeasureCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TP={} FP={} FN={} P={:.4} R={:.4} F1={:.4}",
            self.true_positives,
            self.false_positives,
            self.false_negatives,
            self.precision(),
            self.recall(),
            self.f1()
        )
    }
}

/// Percentiles reported for resampled metrics.
pub const REPORTED_PERCENTILES: [f64; 5] = [0.05, 0.25, 0.5, 0.75, 0.95];

/// Summary of a metric's distribution across resampling rounds.
///
/// ```rust
/// use eal_scorer::eval::MetricWithVariance;
///
/// let metric = MetricWithVariance::from_samples(&[0.2, 0.4, 0.6, 0.8, 1.0]);
/// assert!((metric.mean - 0.6).abs() < 1e-12);
/// assert_eq!(metric.percentile(0.5), Some(0.6));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricWithVariance {
    /// Mean value of the metric
    pub mean: f64,
    /// Sample standard deviation
    pub std_dev: f64,
    /// Minimum observed value
    pub min: f64,
    /// Maximum observed value
    pub max: f64,
    /// Nearest-rank values at [`REPORTED_PERCENTILES`]
    pub percentiles: Vec<(f64, f64)>,
    /// Number of samples
    pub n: usize,
}

impl MetricWithVariance {
    /// Summarise a slice of sample values.
    ///
    /// Uses sample standard deviation (Bessel's correction).
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let n = samples.len();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let std_dev = if n > 1 {
            let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        let percentiles = REPORTED_PERCENTILES
            .iter()
            .map(|&q| (q, nearest_rank(&sorted, q)))
            .collect();

        Self {
            mean,
            std_dev,
            min: sorted[0],
            max: sorted[n - 1],
            percentiles,
            n,
        }
    }

    /// Value at reported percentile `q`, if `q` is one of
    /// [`REPORTED_PERCENTILES`] and there were samples.
    #[must_use]
    pub fn percentile(&self, q: f64) -> Option<f64> {
        self.percentiles
            .iter()
            .find(|(p, _)| (p - q).abs() < 1e-9)
            .map(|(_, v)| *v)
    }

    /// Format as "mean ± std [p5, p95]".
    pub fn format_with_interval(&self) -> String {
        if self.n == 0 {
            return "N/A".to_string();
        }
        match (self.percentile(0.05), self.percentile(0.95)) {
            (Some(lo), Some(hi)) => format!(
                "{:.1}% ± {:.1}% [{:.1}%, {:.1}%]",
                self.mean * 100.0,
                self.std_dev * 100.0,
                lo * 100.0,
                hi * 100.0
            ),
            _ => format!("{:.1}% ± {:.1}%", self.mean * 100.0, self.std_dev * 100.0),
        }
    }
}

impl fmt::Display for MetricWithVariance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_interval())
    }
}

/// Nearest-rank percentile of an ascending, non-empty slice.
fn nearest_rank(sorted: &[f64], q: f64) -> f64 {
    let rank = (q * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_counts() {
        let c = FMeasureCounts::new(1, 0, 0);
        assert_eq!(c.precision(), 1.0);
        assert_eq!(c.recall(), 1.0);
        assert_eq!(c.f1(), 1.0);
    }

    #[test]
    fn test_zero_denominators() {
        let only_missed = FMeasureCounts::new(0, 0, 1);
        assert_eq!(only_missed.precision(), 0.0);
        assert_eq!(only_missed.recall(), 0.0);
        assert_eq!(only_missed.f1(), 0.0);
        let only_spurious = FMeasureCounts::new(0, 3, 0);
        assert_eq!(only_spurious.recall(), 0.0);
        assert_eq!(only_spurious.f1(), 0.0);
    }

    #[test]
    fn test_accumulate() {
        let mut total = FMeasureCounts::default();
        total += FMeasureCounts::new(1, 2, 3);
        total += FMeasureCounts::new(4, 0, 1);
        assert_eq!(total, FMeasureCounts::new(5, 2, 4));
        let summed: FMeasureCounts = vec![total, total].into_iter().sum();
        assert_eq!(summed.true_positives, 10);
        assert_eq!(total.gold_count(), 9);
        assert_eq!(total.system_count(), 7);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            FMeasureCounts::new(1, 1, 0).to_string(),
            "TP=1 FP=1 FN=0 P=0.5000 R=1.0000 F1=0.6667"
        );
    }

    #[test]
    fn test_metric_with_variance() {
        let samples: Vec<f64> = (1..=100).map(|i| i as f64 / 100.0).collect();
        let m = MetricWithVariance::from_samples(&samples);
        assert_eq!(m.n, 100);
        assert!((m.mean - 0.505).abs() < 1e-9);
        assert_eq!(m.min, 0.01);
        assert_eq!(m.max, 1.0);
        assert_eq!(m.percentile(0.05), Some(0.05));
        assert_eq!(m.percentile(0.5), Some(0.5));
        assert_eq!(m.percentile(0.95), Some(0.95));
        assert_eq!(m.percentile(0.1), None);
    }

    #[test]
    fn test_metric_single_and_empty() {
        let single = MetricWithVariance::from_samples(&[0.7]);
        assert_eq!(single.std_dev, 0.0);
        assert_eq!(single.percentile(0.05), Some(0.7));
        let empty = MetricWithVariance::from_samples(&[]);
        assert_eq!(empty.n, 0);
        assert_eq!(empty.to_string(), "N/A");
    }
}
