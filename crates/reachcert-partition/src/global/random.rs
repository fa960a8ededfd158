//! Random balanced partitioning

use rand::prelude::*;
use rand::rngs::StdRng;

use super::{fill_in_order, GlobalPartitioner};
use crate::error::Result;
use crate::graph::{NodeIndex, WeightedGraph};
use crate::partitioning::Partitioning;

/// Deals a seeded random permutation of the nodes into balanced partitions
///
/// No quality guarantee. Used as a fast default and as the seed for
/// refinement-based heuristics.
#[derive(Debug, Clone)]
pub struct RandomPartitioner {
    seed: u64,
}

impl RandomPartitioner {
    /// Create a partitioner with a fixed seed
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl Default for RandomPartitioner {
    fn default() -> Self {
        Self::new(0)
    }
}

impl GlobalPartitioner for RandomPartitioner {
    fn name(&self) -> &'static str {
        "random"
    }

    fn split(&self, k: usize, graph: &WeightedGraph) -> Result<Partitioning> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut order: Vec<NodeIndex> = (0..graph.num_nodes()).collect();
        order.shuffle(&mut rng);
        Ok(fill_in_order(&order, k, graph))
    }
}
