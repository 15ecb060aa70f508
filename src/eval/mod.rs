//! Scoring network and the statistics wired into it.
//!
//! # Overview
//!
//! | Module | Provides |
//! |--------|----------|
//! | [`network`] | [`Inspector`], [`Transform`], [`InspectionNode`], [`EvalPair`], [`Shared`] |
//! | [`aligner`] | [`EquivalenceAligner`] producing [`Alignment`]s |
//! | [`fscore`] | [`AggregateFScoreSink`] |
//! | [`bootstrap`] | [`BootstrapBreakdownSink`] |
//! | [`error_log`] | [`ErrorLoggerSink`] |
//! | [`linking`] | [`LinkingScorer`] and pairwise linking F-measure |
//! | [`types`] | [`FMeasureCounts`], [`MetricWithVariance`] |
//!
//! Every sink must see at least one item before it is finished, and writes
//! its artifacts only from `finish`.
//!
//! # Example
//!
//! ```rust
//! use eal_scorer::eval::{Alignment, FMeasureCounts};
//! use std::collections::BTreeSet;
//!
//! let gold: BTreeSet<&str> = ["a", "b"].into_iter().collect();
//! let system: BTreeSet<&str> = ["b", "c"].into_iter().collect();
//! let alignment = Alignment::of(&gold, &system);
//! assert_eq!(alignment.counts(), FMeasureCounts::new(1, 1, 1));
//! ```

pub mod aligner;
pub mod bootstrap;
pub mod error_log;
pub mod fscore;
pub mod linking;
pub mod network;
pub mod types;

pub use aligner::{Alignment, EquivalenceAligner};
pub use bootstrap::{BootstrapBreakdownSink, BootstrapReport, CategoryBreakdown};
pub use error_log::ErrorLoggerSink;
pub use fscore::{AggregateFScoreSink, FScoreReport};
pub use linking::{
    linked_items, linked_pairs, restrict_to_linking, score_linking, LinkingScorer, Partition,
};
pub use network::{
    transform_both, EvalPair, InspectionNode, Inspector, MapTransform, PairTransform, Shared,
    Transform,
};
pub use types::{FMeasureCounts, MetricWithVariance};

use crate::{Error, Result};
use std::fs;
use std::path::Path;

/// Write a report file, creating its directory.
pub(crate) fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| Error::write(path, e))
}
