//! Property-based tests for the checking protocol.
//!
//! Any closed certificate is accepted regardless of partition count, thread
//! count and strategy; removing a boundary state from its owner is always
//! rejected.

mod helpers;

use std::sync::Arc;

use proptest::prelude::*;
use reachcert_check::prelude::*;
use reachcert_check::PartitionLayout;
use reachcert_partition::{Partitioning, PartitioningHeuristic};

use helpers::{checker, config, counter, explore, interleaved};

fn heuristic() -> impl Strategy<Value = PartitioningHeuristic> {
    prop_oneof![
        Just(PartitioningHeuristic::Random),
        Just(PartitioningHeuristic::BreadthFirst),
        Just(PartitioningHeuristic::DepthFirst),
        Just(PartitioningHeuristic::BestImprovementFirst),
        Just(PartitioningHeuristic::FiducciaMattheyses),
        Just(PartitioningHeuristic::Multilevel),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // ========================================================================
    // Soundness of acceptance
    // ========================================================================

    #[test]
    fn prop_closed_certificate_is_accepted(
        limit in 1i64..25,
        max_elements in 1usize..12,
        threads in 1usize..6,
        heuristic in heuristic(),
    ) {
        let program = interleaved(limit);
        let reached = explore(&program);
        let outcome = checker(&program, config(threads, max_elements, heuristic))
            .check_certificate(&reached)
            .unwrap();
        prop_assert!(outcome.is_accepted(), "{:?}", outcome.verdict);
        prop_assert_eq!(outcome.statistics.added_states, 0);
    }

    #[test]
    fn prop_reached_set_strategy_accepts(
        limit in 1i64..40,
        threads in 1usize..9,
        dynamic in any::<bool>(),
    ) {
        let program = interleaved(limit);
        let reached = explore(&program);
        let distribution = if dynamic { LoadDistribution::Dynamic } else { LoadDistribution::Static };
        let config = CheckerConfig::new()
            .threads(threads)
            .strategy(CheckStrategy::ReachedSet)
            .load_distribution(distribution);
        let outcome = checker(&program, config).check_certificate(&reached).unwrap();
        prop_assert!(outcome.is_accepted(), "{:?}", outcome.verdict);
    }

    // ========================================================================
    // Deleted boundary state
    // ========================================================================

    #[test]
    fn prop_deleted_boundary_state_is_rejected(
        limit in 2i64..20,
        split_seed in any::<usize>(),
        threads in 1usize..4,
    ) {
        let program = counter(limit);
        let reached = explore(&program);
        let n = reached.len();
        let split = 1 + split_seed % (n - 1);

        let assignment: Vec<usize> = (0..n).map(|i| usize::from(i >= split)).collect();
        let partitioning = Partitioning::from_assignment(&assignment, 2);
        let mut layout = PartitionLayout::compute(&reached, &partitioning).unwrap();
        let removed = reached.states()[split];
        prop_assert_eq!(&layout.partitions[0].boundary, &vec![removed]);
        layout.partitions[1].own.retain(|state| *state != removed);

        let outcome = checker(&program, CheckerConfig::new().threads(threads))
            .check_layout(Arc::new(layout))
            .unwrap();
        let is_uncovered = matches!(outcome.rejection(), Some(Rejection::UncoveredObligation { .. }));
        prop_assert!(is_uncovered, "{:?}", outcome.verdict);
    }
}
