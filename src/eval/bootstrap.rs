//! Bootstrap breakdown sink.
//!
//! Keeps every document's alignment counts, split by category, and at finish
//! resamples documents with replacement to estimate how much each category's
//! scores depend on the particular document sample.
//!
//! Resampling uses `ChaCha8Rng` seeded from the configured seed, so the same
//! inputs, seed and round count reproduce the same report exactly.

use super::aligner::Alignment;
use super::network::Inspector;
use super::types::{FMeasureCounts, MetricWithVariance};
use super::write_artifact;
use crate::{Error, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Resampled scores for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    /// Category label
    pub category: String,
    /// Counts over the full document set
    pub counts: FMeasureCounts,
    /// Precision over the full document set
    pub precision: f64,
    /// Recall over the full document set
    pub recall: f64,
    /// F1 over the full document set
    pub f1: f64,
    /// Precision across rounds in which the category occurred
    pub resampled_precision: MetricWithVariance,
    /// Recall across rounds in which the category occurred
    pub resampled_recall: MetricWithVariance,
    /// F1 across rounds in which the category occurred
    pub resampled_f1: MetricWithVariance,
}

/// Everything a bootstrap sink reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapReport {
    /// Breakdown name
    pub name: String,
    /// Documents in the original sample
    pub documents: usize,
    /// Resampling rounds
    pub rounds: usize,
    /// Seed the rounds were drawn with
    pub seed: u64,
    /// One entry per category, in category order
    pub categories: Vec<CategoryBreakdown>,
}

impl BootstrapReport {
    /// Breakdown for `category`.
    #[must_use]
    pub fn category(&self, category: &str) -> Option<&CategoryBreakdown> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// Plain-text rendering.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = format!(
            "{} breakdown: {} bootstrap rounds (seed {}) over {} documents\n",
            self.name, self.rounds, self.seed, self.documents
        );
        for c in &self.categories {
            let _ = writeln!(out, "\n{}", c.category);
            let _ = writeln!(out, "  point      {}", c.counts);
            for (label, metric) in [
                ("precision", &c.resampled_precision),
                ("recall", &c.resampled_recall),
                ("f1", &c.resampled_f1),
            ] {
                let _ = write!(
                    out,
                    "  {:<10} n={} mean={:.4} std={:.4}",
                    label, metric.n, metric.mean, metric.std_dev
                );
                for (q, v) in &metric.percentiles {
                    let _ = write!(out, " p{}={:.4}", (q * 100.0).round() as u32, v);
                }
                out.push('\n');
            }
        }
        out
    }
}

/// Per-category bootstrap sink over alignments.
pub struct BootstrapBreakdownSink<T> {
    name: String,
    output_dir: PathBuf,
    rounds: usize,
    seed: u64,
    key_fn: Box<dyn Fn(&T) -> String>,
    documents: Vec<BTreeMap<String, FMeasureCounts>>,
    report: Option<BootstrapReport>,
}

impl<T> BootstrapBreakdownSink<T> {
    /// Sink writing `<output_dir>/<name>.bootstrapped.{txt,json}`, keying
    /// every item by `key_fn`.
    pub fn new(
        name: impl Into<String>,
        output_dir: impl Into<PathBuf>,
        key_fn: impl Fn(&T) -> String + 'static,
        rounds: usize,
        seed: u64,
    ) -> Self {
        Self {
            name: name.into(),
            output_dir: output_dir.into(),
            rounds,
            seed,
            key_fn: Box::new(key_fn),
            documents: Vec::new(),
            report: None,
        }
    }

    /// The report written at finish.
    #[must_use]
    pub fn report(&self) -> Option<&BootstrapReport> {
        self.report.as_ref()
    }

    fn compute(&self) -> BootstrapReport {
        let n = self.documents.len();
        let totals = sum_counts(self.documents.iter());

        // [precision, recall, f1] per round in which the category occurs
        let mut samples: BTreeMap<String, [Vec<f64>; 3]> = BTreeMap::new();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        for _ in 0..self.rounds {
            let draw = (0..n).map(|_| &self.documents[rng.gen_range(0..n)]);
            for (category, counts) in sum_counts(draw) {
                let entry = samples.entry(category).or_default();
                entry[0].push(counts.precision());
                entry[1].push(counts.recall());
                entry[2].push(counts.f1());
            }
        }

        let categories = totals
            .iter()
            .map(|(category, counts)| {
                let empty = [Vec::new(), Vec::new(), Vec::new()];
                let [p, r, f] = samples.get(category.as_str()).unwrap_or(&empty);
                CategoryBreakdown {
                    category: category.clone(),
                    counts: *counts,
                    precision: counts.precision(),
                    recall: counts.recall(),
                    f1: counts.f1(),
                    resampled_precision: MetricWithVariance::from_samples(p),
                    resampled_recall: MetricWithVariance::from_samples(r),
                    resampled_f1: MetricWithVariance::from_samples(f),
                }
            })
            .collect();

        BootstrapReport {
            name: self.name.clone(),
            documents: n,
            rounds: self.rounds,
            seed: self.seed,
            categories,
        }
    }
}

fn sum_counts<'a>(
    docs: impl Iterator<Item = &'a BTreeMap<String, FMeasureCounts>>,
) -> BTreeMap<String, FMeasureCounts> {
    let mut totals: BTreeMap<String, FMeasureCounts> = BTreeMap::new();
    for doc in docs {
        for (category, counts) in doc {
            *totals.entry(category.clone()).or_default() += *counts;
        }
    }
    totals
}

impl<T: Ord + Clone> Inspector<Alignment<T>> for BootstrapBreakdownSink<T> {
    fn inspect(&mut self, alignment: &Alignment<T>) -> Result<()> {
        let mut by_category: BTreeMap<String, FMeasureCounts> = BTreeMap::new();
        for item in &alignment.matched {
            by_category.entry((self.key_fn)(item)).or_default().true_positives += 1;
        }
        for item in &alignment.system_only {
            by_category.entry((self.key_fn)(item)).or_default().false_positives += 1;
        }
        for item in &alignment.gold_only {
            by_category.entry((self.key_fn)(item)).or_default().false_negatives += 1;
        }
        self.documents.push(by_category);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.documents.is_empty() {
            return Err(Error::finish_before_inspect(format!(
                "{} bootstrap breakdown",
                self.name
            )));
        }
        let report = self.compute();
        let stem = format!("{}.bootstrapped", self.name);
        write_artifact(
            &self.output_dir.join(format!("{}.txt", stem)),
            &report.to_text(),
        )?;
        write_artifact(
            &self.output_dir.join(format!("{}.json", stem)),
            &serde_json::to_string_pretty(&report)?,
        )?;
        log::info!(
            "{}: bootstrapped {} categories over {} rounds",
            self.name,
            report.categories.len(),
            self.rounds
        );
        self.report = Some(report);
        Ok(())
    }
}
