//! Pairwise linking F-measure.
//!
//! A partition links two items iff they share a subset. Gold and system
//! partitions are each turned into their set of linked unordered pairs, and
//! those pair sets are scored like any other gold/system sets:
//!
//! ```text
//! gold   {{a, b}, {c}}  ->  {(a,b)}
//! system {{a, b, c}}    ->  {(a,b), (a,c), (b,c)}
//! TP=1 FP=2 FN=0        ->  P=1/3 R=1 F1=0.5
//! ```

use super::network::{EvalPair, Inspector};
use super::types::FMeasureCounts;
use super::write_artifact;
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::path::PathBuf;

/// A set of item groups.
pub type Partition<T> = BTreeSet<BTreeSet<T>>;

/// Unordered pairs `(a, b)` with `a < b` placed in the same subset.
#[must_use]
pub fn linked_pairs<T: Ord + Clone>(partition: &Partition<T>) -> BTreeSet<(T, T)> {
    let mut pairs = BTreeSet::new();
    for subset in partition {
        let items: Vec<&T> = subset.iter().collect();
        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                pairs.insert(((*a).clone(), (*b).clone()));
            }
        }
    }
    pairs
}

/// Every item placed in some subset.
#[must_use]
pub fn linked_items<T: Ord>(partition: &Partition<T>) -> BTreeSet<&T> {
    partition.iter().flatten().collect()
}

/// Pairwise counts of `system` against `gold`.
#[must_use]
pub fn score_linking<T: Ord + Clone>(gold: &Partition<T>, system: &Partition<T>) -> FMeasureCounts {
    let gold_pairs = linked_pairs(gold);
    let system_pairs = linked_pairs(system);
    let true_positives = gold_pairs.intersection(&system_pairs).count();
    FMeasureCounts::new(
        true_positives,
        system_pairs.len() - true_positives,
        gold_pairs.len() - true_positives,
    )
}

/// Restrict the gold partition to items the system linked at all.
///
/// Items the system never produced are already charged by argument scoring
/// and must not cost linking recall too. Emptied gold subsets are dropped.
#[must_use]
pub fn restrict_to_linking<T: Ord + Clone>(
    pair: &EvalPair<Partition<T>, Partition<T>>,
) -> EvalPair<Partition<T>, Partition<T>> {
    let system_items = linked_items(&pair.test);
    let key = pair
        .key
        .iter()
        .map(|subset| {
            subset
                .iter()
                .filter(|item| system_items.contains(item))
                .cloned()
                .collect::<BTreeSet<T>>()
        })
        .filter(|subset| !subset.is_empty())
        .collect();
    EvalPair::of(key, pair.test.clone())
}

/// Accumulates pairwise linking counts across documents and writes
/// `<output_dir>/linkingF.txt` at finish.
#[derive(Debug)]
pub struct LinkingScorer {
    output_path: PathBuf,
    counts: FMeasureCounts,
    documents: usize,
}

impl LinkingScorer {
    /// Scorer writing to `<output_dir>/linkingF.txt`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::outputting_to(output_dir.into().join("linkingF.txt"))
    }

    /// Scorer writing to an explicit path.
    pub fn outputting_to(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            counts: FMeasureCounts::default(),
            documents: 0,
        }
    }

    /// Counts accumulated so far.
    #[must_use]
    pub fn counts(&self) -> FMeasureCounts {
        self.counts
    }
}

impl<T: Ord + Clone + Display> Inspector<EvalPair<Partition<T>, Partition<T>>> for LinkingScorer {
    fn inspect(&mut self, item: &EvalPair<Partition<T>, Partition<T>>) -> Result<()> {
        let system_items = linked_items(&item.test);
        if let Some(missing) = item.key.iter().flatten().find(|x| !system_items.contains(x)) {
            return Err(Error::linking_precondition(format!(
                "gold linking contains {} which the system linking lacks",
                missing
            )));
        }
        self.counts += score_linking(&item.key, &item.test);
        self.documents += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.documents == 0 {
            return Err(Error::finish_before_inspect("linking scorer"));
        }
        let text = format!(
            "Linking over {} documents\n{}\n",
            self.documents, self.counts
        );
        write_artifact(&self.output_path, &text)?;
        log::info!("linking: {}", self.counts);
        Ok(())
    }
}
