//! Seeded partitioning improved by pairwise Fiduccia–Mattheyses

use std::collections::BTreeSet;

use tracing::debug;

use super::GlobalPartitioner;
use crate::error::Result;
use crate::graph::WeightedGraph;
use crate::partitioning::Partitioning;
use crate::refine::{check_balance, FiducciaMattheyses};

/// Default cap on refinement rounds over all partition pairs
const DEFAULT_MAX_ROUNDS: usize = 8;

/// Runs a seed heuristic, then two-way FM on every pair of partitions that
/// share a cut edge, until a round yields no gain
pub struct FiducciaMattheysesPartitioner {
    seed: Box<dyn GlobalPartitioner>,
    balance: f64,
    max_rounds: usize,
}

impl FiducciaMattheysesPartitioner {
    /// Create a partitioner refining the output of `seed`
    ///
    /// # Errors
    ///
    /// [`crate::PartitionError::InvalidBalance`] for a criterion below 1.0.
    pub fn new(seed: Box<dyn GlobalPartitioner>, balance_criterion: f64) -> Result<Self> {
        check_balance(balance_criterion)?;
        Ok(Self {
            seed,
            balance: balance_criterion,
            max_rounds: DEFAULT_MAX_ROUNDS,
        })
    }

    /// Cap the number of rounds over all partition pairs
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }
}

/// Partition pairs `(a, b)`, `a < b`, connected by at least one edge
fn adjacent_pairs(graph: &WeightedGraph, partitioning: &Partitioning) -> BTreeSet<(usize, usize)> {
    let assignment = partitioning.assignment(graph.num_nodes());
    graph
        .edges()
        .filter_map(|e| {
            let (a, b) = (assignment[e.source], assignment[e.target]);
            match a.cmp(&b) {
                std::cmp::Ordering::Less => Some((a, b)),
                std::cmp::Ordering::Greater => Some((b, a)),
                std::cmp::Ordering::Equal => None,
            }
        })
        .collect()
}

impl GlobalPartitioner for FiducciaMattheysesPartitioner {
    fn name(&self) -> &'static str {
        "fiduccia-mattheyses"
    }

    fn split(&self, k: usize, graph: &WeightedGraph) -> Result<Partitioning> {
        let mut partitioning = self.seed.compute_partitioning(k, graph)?;
        let fm = FiducciaMattheyses::new(graph, self.balance)?;

        for round in 0..self.max_rounds {
            let mut round_gain = 0;
            for (a, b) in adjacent_pairs(graph, &partitioning) {
                round_gain += fm.improve_partitioning(&mut partitioning, a, b)?;
            }
            debug!(round, gain = round_gain, seed = self.seed.name(), "fm round");
            if round_gain <= 0 {
                break;
            }
        }
        Ok(partitioning)
    }
}
