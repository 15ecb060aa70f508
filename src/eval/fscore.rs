//! Aggregate F-score sink.

use super::aligner::Alignment;
use super::network::Inspector;
use super::types::FMeasureCounts;
use super::write_artifact;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Micro-averaged scores over every document a sink saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FScoreReport {
    /// Report name
    pub name: String,
    /// Documents inspected
    pub documents: usize,
    /// Summed counts
    pub counts: FMeasureCounts,
    /// Precision over the summed counts
    pub precision: f64,
    /// Recall over the summed counts
    pub recall: f64,
    /// F1 over the summed counts
    pub f1: f64,
}

impl FScoreReport {
    /// Build a report from summed counts.
    #[must_use]
    pub fn new(name: impl Into<String>, documents: usize, counts: FMeasureCounts) -> Self {
        Self {
            name: name.into(),
            documents,
            counts,
            precision: counts.precision(),
            recall: counts.recall(),
            f1: counts.f1(),
        }
    }

    /// Plain-text rendering.
    #[must_use]
    pub fn to_text(&self) -> String {
        format!(
            "{}\n\
             Documents: {}\n\
             True positives: {}\n\
             False positives: {}\n\
             False negatives: {}\n\
             Precision: {:.4}\n\
             Recall: {:.4}\n\
             F1: {:.4}\n",
            self.name,
            self.documents,
            self.counts.true_positives,
            self.counts.false_positives,
            self.counts.false_negatives,
            self.precision,
            self.recall,
            self.f1
        )
    }
}

/// Sums alignment counts across documents and writes `<name>.txt` and
/// `<name>.json` at finish.
#[derive(Debug)]
pub struct AggregateFScoreSink {
    name: String,
    output_dir: PathBuf,
    counts: FMeasureCounts,
    documents: usize,
    report: Option<FScoreReport>,
}

impl AggregateFScoreSink {
    /// Sink writing `<output_dir>/<name>.{txt,json}`.
    pub fn new(name: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            output_dir: output_dir.into(),
            counts: FMeasureCounts::default(),
            documents: 0,
            report: None,
        }
    }

    /// Counts accumulated so far.
    #[must_use]
    pub fn counts(&self) -> FMeasureCounts {
        self.counts
    }

    /// The report written at finish.
    #[must_use]
    pub fn report(&self) -> Option<&FScoreReport> {
        self.report.as_ref()
    }
}

impl<T: Ord + Clone> Inspector<Alignment<T>> for AggregateFScoreSink {
    fn inspect(&mut self, alignment: &Alignment<T>) -> Result<()> {
        self.counts += alignment.counts();
        self.documents += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.documents == 0 {
            return Err(Error::finish_before_inspect(&self.name));
        }
        let report = FScoreReport::new(&self.name, self.documents, self.counts);
        write_artifact(
            &self.output_dir.join(format!("{}.txt", self.name)),
            &report.to_text(),
        )?;
        write_artifact(
            &self.output_dir.join(format!("{}.json", self.name)),
            &serde_json::to_string_pretty(&report)?,
        )?;
        log::info!("{}: {}", self.name, self.counts);
        self.report = Some(report);
        Ok(())
    }
}
