//! Integration tests for the partitioned strategy.
//!
//! Valid certificates must be accepted for any partition count, thread count
//! and partitioning heuristic; layouts persisted to disk must check the same
//! as freshly computed ones.

mod helpers;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::sync::Arc;

use reachcert_check::interval::IntervalState;
use reachcert_check::prelude::*;
use reachcert_check::PartitionLayout;
use reachcert_partition::PartitioningHeuristic;

use helpers::{checker, config, counter, explore, interleaved};

// ---------------------------------------------------------------------------
// Acceptance across configurations
// ---------------------------------------------------------------------------

#[test]
fn test_valid_certificate_single_partition() {
    let program = interleaved(30);
    let reached = explore(&program);
    let outcome = checker(&program, config(1, 1_000, PartitioningHeuristic::Random))
        .check_certificate(&reached)
        .unwrap();

    assert!(outcome.is_accepted(), "{:?}", outcome.verdict);
    assert_eq!(outcome.statistics.partitions, 1);
    assert_eq!(outcome.statistics.obligations, 0);
    assert_eq!(outcome.statistics.added_states, 0);
    assert_eq!(outcome.statistics.certificate_states, reached.len());
}

#[test]
fn test_valid_certificate_any_partition_and_thread_count() {
    let program = interleaved(30);
    let reached = explore(&program);

    for max_elements in [64, 20, 7, 1] {
        for threads in [1, 2, 4, 16] {
            let outcome = checker(&program, config(threads, max_elements, PartitioningHeuristic::Random))
                .check_certificate(&reached)
                .unwrap();
            assert!(
                outcome.is_accepted(),
                "max_elements={max_elements} threads={threads}: {:?}",
                outcome.verdict
            );
            assert_eq!(outcome.statistics.added_states, 0);
        }
    }
}

#[test]
fn test_valid_certificate_every_heuristic() {
    let program = interleaved(20);
    let reached = explore(&program);

    for heuristic in [
        PartitioningHeuristic::Random,
        PartitioningHeuristic::BreadthFirst,
        PartitioningHeuristic::DepthFirst,
        PartitioningHeuristic::BestFirst,
        PartitioningHeuristic::BestImprovementFirst,
        PartitioningHeuristic::FiducciaMattheyses,
        PartitioningHeuristic::Multilevel,
    ] {
        let outcome = checker(&program, config(4, 8, heuristic))
            .check_certificate(&reached)
            .unwrap();
        assert!(outcome.is_accepted(), "{heuristic:?}: {:?}", outcome.verdict);
        assert!(outcome.statistics.partitions >= 2, "{heuristic:?}");
    }
}

#[test]
fn test_optimal_heuristic_on_small_certificate() {
    let program = counter(5);
    let reached = explore(&program);
    assert!(reached.len() <= reachcert_partition::OPTIMAL_NODE_LIMIT);

    let outcome = checker(&program, config(2, 3, PartitioningHeuristic::Optimal))
        .check_certificate(&reached)
        .unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(outcome.statistics.partitions, 3);
}

#[test]
fn test_cross_partition_successors_become_obligations() {
    let program = counter(10);
    let reached = explore(&program);
    let outcome = checker(&program, config(3, 4, PartitioningHeuristic::BreadthFirst))
        .check_certificate(&reached)
        .unwrap();

    assert!(outcome.is_accepted());
    // A chain split into three runs has two cut edges
    assert_eq!(outcome.statistics.obligations, 2);
    assert_eq!(outcome.statistics.successor_computations, reached.len());
}

#[test]
fn test_checker_is_reusable_after_rejection() {
    let program = counter(6);
    let reached = explore(&program);
    let checker = checker(&program, config(2, 3, PartitioningHeuristic::Random));

    let broken = ReachedSet::new(reached.states()[1..].to_vec(), Vec::new(), 0).unwrap();
    assert!(!checker.check_certificate(&broken).unwrap().is_accepted());
    assert!(checker.check_certificate(&reached).unwrap().is_accepted());
}

// ---------------------------------------------------------------------------
// Persisted layouts
// ---------------------------------------------------------------------------

#[test]
fn test_layout_file_round_trip() {
    let program = interleaved(15);
    let reached = explore(&program);
    let checker = checker(&program, config(3, 6, PartitioningHeuristic::Multilevel));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("certificate.rcpl");
    checker
        .write_certificate(&reached, BufWriter::new(File::create(&path).unwrap()))
        .unwrap();

    let layout: PartitionLayout<IntervalState> =
        PartitionLayout::read_from(BufReader::new(File::open(&path).unwrap())).unwrap();
    assert_eq!(layout.total_state_count, reached.len());
    assert_eq!(layout.own_state_count(), reached.len());

    let outcome = checker.check_layout(Arc::new(layout)).unwrap();
    assert!(outcome.is_accepted(), "{:?}", outcome.verdict);
}

#[test]
fn test_statistics_serialize() {
    let program = counter(4);
    let reached = explore(&program);
    let outcome = checker(&program, config(2, 2, PartitioningHeuristic::Random))
        .check_certificate(&reached)
        .unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["verdict"], "accepted");
    assert_eq!(json["statistics"]["certificate_states"], reached.len());
}
