//! Property-based tests for scoring invariants.
//!
//! These hold for every input, not just the hand-picked scenarios.

use eal_scorer::ere::{Entity, EntityMention, GoldDocument};
use eal_scorer::eval::{
    restrict_to_linking, score_linking, Alignment, BootstrapBreakdownSink, EvalPair,
    FMeasureCounts, Inspector, Partition,
};
use eal_scorer::extract::{SystemExtractor, SystemInput};
use eal_scorer::response::{DocumentSystemOutput, Response, ResponseLinking, ResponseSet};
use eal_scorer::types::{DocLevelEventArg, Linking};
use eal_scorer::CharSpan;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

fn item_set() -> impl Strategy<Value = BTreeSet<u8>> {
    prop::collection::btree_set(0u8..40, 0..20)
}

fn partition() -> impl Strategy<Value = Vec<BTreeSet<u8>>> {
    prop::collection::vec(prop::collection::btree_set(0u8..30, 0..6), 0..6)
}

/// Groups plus a permutation of their indices.
fn partition_and_order() -> impl Strategy<Value = (Vec<BTreeSet<u8>>, Vec<usize>)> {
    partition().prop_flat_map(|groups| {
        let order: Vec<usize> = (0..groups.len()).collect();
        (Just(groups), Just(order).prop_shuffle())
    })
}

fn entity_span(item: u8) -> CharSpan {
    let start = usize::from(item) * 10;
    CharSpan::new(start, start + 5)
}

/// One entity per possible item, entity `E<n>` at `entity_span(n)`.
fn gold_entities() -> Arc<GoldDocument> {
    let doc = (0u8..30).fold(GoldDocument::new("d1"), |doc, item| {
        doc.with_entity(Entity::new(
            format!("E{}", item),
            vec![EntityMention::new(format!("m{}", item), entity_span(item))],
        ))
    });
    Arc::new(doc)
}

fn atom(item: u8) -> DocLevelEventArg {
    DocLevelEventArg::new("d1", "Conflict.Attack", "Attacker", format!("E{}", item))
}

/// System linking extracted from response sets listed in `order`.
fn extracted_linking(groups: &[BTreeSet<u8>], order: &[usize]) -> Linking {
    let mut responses = Vec::new();
    let mut sets = Vec::new();
    for &g in order {
        let ids: Vec<String> = groups[g]
            .iter()
            .map(|item| format!("g{}r{}", g, item))
            .collect();
        for (id, &item) in ids.iter().zip(&groups[g]) {
            let span = entity_span(item);
            responses.push(Response::new(id.clone(), "Conflict.Attack", "Attacker", span));
        }
        sets.push(ResponseSet::new(format!("s{}", g), ids));
    }
    let output = DocumentSystemOutput::new("d1", responses, ResponseLinking::new(sets));
    SystemExtractor::default()
        .extract(&SystemInput::new(gold_entities(), output))
        .unwrap()
        .linking
}

proptest! {
    #[test]
    fn alignment_partitions_are_disjoint_and_cover_union(gold in item_set(), system in item_set()) {
        let a = Alignment::of(&gold, &system);
        prop_assert!(a.matched.is_disjoint(&a.gold_only));
        prop_assert!(a.matched.is_disjoint(&a.system_only));
        prop_assert!(a.gold_only.is_disjoint(&a.system_only));

        let union: BTreeSet<u8> = gold.union(&system).copied().collect();
        let covered: BTreeSet<u8> = a
            .matched
            .iter()
            .chain(&a.gold_only)
            .chain(&a.system_only)
            .copied()
            .collect();
        prop_assert_eq!(covered, union);
    }

    #[test]
    fn f1_is_bounded_and_defined(tp in 0usize..50, fp in 0usize..50, fn_ in 0usize..50) {
        let counts = FMeasureCounts::new(tp, fp, fn_);
        for value in [counts.precision(), counts.recall(), counts.f1()] {
            prop_assert!(value.is_finite());
            prop_assert!((0.0..=1.0).contains(&value));
        }
        if tp == 0 {
            prop_assert_eq!(counts.f1(), 0.0);
        }
    }

    #[test]
    fn linking_score_ignores_subset_order(
        gold in partition(),
        (system, order) in partition_and_order(),
    ) {
        let gold: Linking = gold
            .iter()
            .map(|group| group.iter().map(|&item| atom(item)).collect())
            .collect();
        let listed: Vec<usize> = (0..system.len()).collect();
        let as_listed = extracted_linking(&system, &listed);
        let permuted = extracted_linking(&system, &order);
        prop_assert_eq!(&as_listed, &permuted);
        prop_assert_eq!(score_linking(&gold, &as_listed), score_linking(&gold, &permuted));
    }

    #[test]
    fn restriction_only_filters(gold in partition(), system in partition()) {
        let pair = EvalPair::of(
            gold.into_iter().collect::<Partition<u8>>(),
            system.into_iter().collect::<Partition<u8>>(),
        );
        let restricted = restrict_to_linking(&pair);
        let system_items: BTreeSet<u8> = pair.test.iter().flatten().copied().collect();
        let before: BTreeSet<u8> = pair.key.iter().flatten().copied().collect();
        let after: BTreeSet<u8> = restricted.key.iter().flatten().copied().collect();
        prop_assert!(after.is_subset(&before));
        prop_assert!(after.is_subset(&system_items));
        prop_assert_eq!(restricted.test, pair.test);
    }

    #[test]
    fn bootstrap_is_deterministic(
        docs in prop::collection::vec((item_set(), item_set()), 1..6),
        seed in any::<u64>(),
    ) {
        let run = |docs: &[(BTreeSet<u8>, BTreeSet<u8>)]| {
            let dir = tempfile::tempdir().unwrap();
            let mut sink = BootstrapBreakdownSink::new(
                "Parity",
                dir.path(),
                |x: &u8| (x % 3).to_string(),
                30,
                seed,
            );
            for (gold, system) in docs {
                sink.inspect(&Alignment::of(gold, system)).unwrap();
            }
            sink.finish().unwrap();
            sink.report().cloned()
        };
        prop_assert_eq!(run(&docs), run(&docs));
    }

    #[test]
    fn banned_roles_are_removed_everywhere(roles in prop::collection::vec(
        prop::sample::select(vec!["Attacker", "Target", "Time", "Place", "Crime"]),
        1..10,
    )) {
        let responses: Vec<Response> = roles
            .iter()
            .enumerate()
            .map(|(i, role)| {
                Response::new(format!("r{}", i), "Conflict.Attack", *role, CharSpan::new(i, i + 1))
            })
            .collect();
        let ids: Vec<String> = responses.iter().map(|r| r.id.clone()).collect();
        let output = DocumentSystemOutput::new(
            "d1",
            responses,
            ResponseLinking::new(vec![ResponseSet::new("s1", ids)]),
        );
        let banned: BTreeSet<String> = ["Time", "Crime"].iter().map(|r| r.to_string()).collect();
        let filtered = output.without_roles(&banned);
        prop_assert!(filtered.responses.iter().all(|r| !banned.contains(&r.role)));
        prop_assert!(filtered.validate().is_ok());
    }
}
