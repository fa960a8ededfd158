//! Multilevel partitioning: coarsen, partition, uncoarsen with refinement
//!
//! ```text
//! G0 ──match──▶ G1 ──match──▶ … ──▶ Gc   (coarsening, stack of levels)
//!                                    │
//!                              initial partition
//!                                    │
//! G0 ◀─refine── G1 ◀─refine── … ◀───┘   (retransform + k-way refinement)
//! ```

use tracing::debug;

use crate::error::Result;
use crate::global::GlobalPartitioner;
use crate::graph::WeightedGraph;
use crate::matching::{Matching, MatchingGenerator};
use crate::partitioning::Partitioning;
use crate::refine::KWayRefiner;

/// Default multiple of `k` below which coarsening stops
pub const DEFAULT_COARSEN_FACTOR: usize = 8;

/// Expand a partitioning of a contracted graph to the graph it came from
///
/// Each supernode is replaced by its constituents; partition order and count
/// are preserved.
pub fn retransform_partitioning(matching: &Matching, coarse: &Partitioning) -> Partitioning {
    let constituents = matching.constituents();
    let parts = coarse
        .parts()
        .iter()
        .map(|part| {
            part.iter()
                .filter_map(|&supernode| constituents.get(supernode))
                .flatten()
                .copied()
                .collect()
        })
        .collect();
    Partitioning::new(parts)
}

/// Multilevel partitioner combining a matching, an initial heuristic and a
/// k-way refiner
pub struct MultilevelPartitioner {
    matching: Box<dyn MatchingGenerator>,
    initial: Box<dyn GlobalPartitioner>,
    refiner: KWayRefiner,
    coarsen_factor: usize,
}

impl MultilevelPartitioner {
    /// Create a multilevel partitioner
    pub fn new(
        matching: Box<dyn MatchingGenerator>,
        initial: Box<dyn GlobalPartitioner>,
        refiner: KWayRefiner,
    ) -> Self {
        Self {
            matching,
            initial,
            refiner,
            coarsen_factor: DEFAULT_COARSEN_FACTOR,
        }
    }

    /// Stop coarsening once the graph has at most `factor × k` nodes
    pub fn with_coarsen_factor(mut self, factor: usize) -> Self {
        self.coarsen_factor = factor.max(1);
        self
    }

    /// Contract until the threshold is met or a matching no longer shrinks
    /// the graph
    fn coarsen(&self, graph: &WeightedGraph, k: usize) -> Vec<(Matching, WeightedGraph)> {
        let threshold = self.coarsen_factor.saturating_mul(k);
        let mut levels: Vec<(Matching, WeightedGraph)> = Vec::new();
        loop {
            let current = levels.last().map_or(graph, |(_, g)| g);
            if current.num_nodes() <= threshold {
                break;
            }
            let matching = self.matching.compute_matching(current);
            if matching.supernode_count() >= current.num_nodes() {
                break;
            }
            let coarse = current.contract(&matching);
            levels.push((matching, coarse));
        }
        levels
    }
}

impl GlobalPartitioner for MultilevelPartitioner {
    fn name(&self) -> &'static str {
        "multilevel"
    }

    fn split(&self, k: usize, graph: &WeightedGraph) -> Result<Partitioning> {
        let levels = self.coarsen(graph, k);
        let coarsest = levels.last().map_or(graph, |(_, g)| g);
        debug!(
            levels = levels.len(),
            nodes = graph.num_nodes(),
            coarsest = coarsest.num_nodes(),
            initial = self.initial.name(),
            "coarsened graph"
        );

        let mut partitioning = self.initial.compute_partitioning(k, coarsest)?;
        partitioning.ensure_parts(k);
        self.refiner.refine(coarsest, &mut partitioning);

        for level in (0..levels.len()).rev() {
            let finer = if level == 0 { graph } else { &levels[level - 1].1 };
            partitioning = retransform_partitioning(&levels[level].0, &partitioning);
            self.refiner.refine(finer, &mut partitioning);
        }

        partitioning.remove_empty();
        Ok(partitioning)
    }
}
