//! Property-based tests for ordering and determinism guarantees

use canopy::registry::{SharedRootRegistry, TreeRegistry};
use canopy::tree::{ElementRule, LabelRule, TreeDefinitionBuilder};
use canopy::types::PIGGYBAG_TREE_ID;
use canopy::{merge_results, CompositionEngine, CompositionResult, Element, Identifier, Piggybag, Position};
use proptest::prelude::*;
use std::sync::Arc;

fn position_strategy() -> impl Strategy<Value = Position> {
    prop_oneof![Just(Position::Top), Just(Position::Bottom)]
}

fn results_strategy() -> impl Strategy<Value = Vec<CompositionResult>> {
    prop::collection::vec((position_strategy(), -3i32..3), 0..24).prop_map(|keys| {
        keys.into_iter()
            .enumerate()
            .map(|(i, (position, priority))| CompositionResult {
                elements: vec![Element::new(i.to_string(), format!("result {}", i))],
                position,
                position_priority: priority,
            })
            .collect()
    })
}

fn sequence(result: &CompositionResult) -> usize {
    result.elements[0].id.parse().unwrap()
}

/// Merged output is a sorted, stable permutation of the input
#[test]
fn test_merge_ordering_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&results_strategy(), |results| {
            let merged = merge_results(results.clone());
            assert_eq!(merged.len(), results.len());

            for pair in merged.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                assert!(a.position <= b.position);
                if a.position == b.position {
                    assert!(a.position_priority >= b.position_priority);
                    if a.position_priority == b.position_priority {
                        // Stable: equal keys keep input order
                        assert!(sequence(a) < sequence(b));
                    }
                }
            }

            let mut seen: Vec<usize> = merged.iter().map(sequence).collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..results.len()).collect::<Vec<_>>());

            // Merging is idempotent
            assert_eq!(merge_results(merged.clone()), merged);
            Ok(())
        })
        .unwrap();
}

/// `parents[i]` picks the parent of node `i + 1` among the nodes declared before it
fn shape_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<prop::sample::Index>(), 0..16).prop_map(|picks| {
        picks
            .into_iter()
            .enumerate()
            .map(|(i, pick)| pick.index(i + 1))
            .collect()
    })
}

fn rule(node: usize) -> Arc<dyn ElementRule> {
    Arc::new(LabelRule::new(format!("Node {}", node)))
}

fn engine_for(parents: &[usize]) -> CompositionEngine {
    let mut builder = TreeDefinitionBuilder::new("T", "n0", rule(0));
    for (i, parent) in parents.iter().enumerate() {
        builder = builder.child(format!("n{}", parent), format!("n{}", i + 1), rule(i + 1));
    }
    let mut registry = TreeRegistry::new();
    registry.register(builder.build().unwrap()).unwrap();
    CompositionEngine::new("console", Arc::new(registry), Arc::new(SharedRootRegistry::empty()))
}

/// Expanding any node yields exactly its declared children, every time
#[test]
fn test_expand_children_matches_shape_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&shape_strategy(), |parents| {
            let engine = engine_for(&parents);
            let mut bag = Piggybag::new();
            bag.insert(PIGGYBAG_TREE_ID.to_string(), "T".to_string());

            for node in 0..=parents.len() {
                let identifier = Identifier::simple(format!("n{}", node));
                let expected: Vec<String> = parents
                    .iter()
                    .enumerate()
                    .filter(|(_, parent)| **parent == node)
                    .map(|(i, _)| format!("T/n{}", i + 1))
                    .collect();

                let first = engine.expand_children(&identifier, &bag).unwrap();
                let ids: Vec<String> = first.iter().map(|e| e.id.clone()).collect();
                assert_eq!(ids, expected);
                assert_eq!(engine.expand_children(&identifier, &bag).unwrap(), first);
            }
            Ok(())
        })
        .unwrap();
}
