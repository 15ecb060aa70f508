//! Equivalence alignment of gold and system item sets.

use super::network::{EvalPair, Transform};
use super::types::FMeasureCounts;
use crate::Result;
use std::collections::BTreeSet;

/// Partition of one document's gold and system items.
///
/// The three sets are pairwise disjoint and their union is the union of the
/// inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment<T> {
    /// In gold and system (true positives)
    pub matched: BTreeSet<T>,
    /// Only in gold (false negatives)
    pub gold_only: BTreeSet<T>,
    /// Only in system (false positives)
    pub system_only: BTreeSet<T>,
}

impl<T: Ord + Clone> Alignment<T> {
    /// Align two sets by value equality.
    #[must_use]
    pub fn of(gold: &BTreeSet<T>, system: &BTreeSet<T>) -> Self {
        Self {
            matched: gold.intersection(system).cloned().collect(),
            gold_only: gold.difference(system).cloned().collect(),
            system_only: system.difference(gold).cloned().collect(),
        }
    }

    /// Counts of the three partitions.
    #[must_use]
    pub fn counts(&self) -> FMeasureCounts {
        FMeasureCounts::new(
            self.matched.len(),
            self.system_only.len(),
            self.gold_only.len(),
        )
    }

    /// Whether there are no items at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty() && self.gold_only.is_empty() && self.system_only.is_empty()
    }
}

/// Transform node producing an [`Alignment`] from a gold/system set pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct EquivalenceAligner;

impl<T: Ord + Clone> Transform<EvalPair<BTreeSet<T>, BTreeSet<T>>, Alignment<T>>
    for EquivalenceAligner
{
    fn apply(&mut self, input: &EvalPair<BTreeSet<T>, BTreeSet<T>>) -> Result<Alignment<T>> {
        Ok(Alignment::of(&input.key, &input.test))
    }
}
