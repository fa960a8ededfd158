//! Exhaustive partitioning for tiny graphs

use super::GlobalPartitioner;
use crate::error::{PartitionError, Result};
use crate::graph::{NodeIndex, WeightedGraph};
use crate::partitioning::{cut_size, Partitioning};

/// Largest graph the exhaustive search accepts (9! permutations)
pub const OPTIMAL_NODE_LIMIT: usize = 9;

/// Enumerates every node permutation, chunks it into count-balanced parts
/// and keeps the one with the smallest weighted cut
///
/// Meant as ground truth for tests of the other heuristics.
#[derive(Debug, Clone, Default)]
pub struct OptimalPartitioner;

impl OptimalPartitioner {
    /// Create the exhaustive partitioner
    pub fn new() -> Self {
        Self
    }
}

/// Partition index of every permutation position
fn chunk_layout(n: usize, k: usize) -> Vec<usize> {
    let base = n / k;
    let extra = n % k;
    (0..k)
        .flat_map(|part| {
            let size = base + usize::from(part < extra);
            std::iter::repeat(part).take(size)
        })
        .collect()
}

impl GlobalPartitioner for OptimalPartitioner {
    fn name(&self) -> &'static str {
        "optimal"
    }

    fn split(&self, k: usize, graph: &WeightedGraph) -> Result<Partitioning> {
        let n = graph.num_nodes();
        if n > OPTIMAL_NODE_LIMIT {
            return Err(PartitionError::GraphTooLarge {
                nodes: n,
                limit: OPTIMAL_NODE_LIMIT,
            });
        }

        let layout = chunk_layout(n, k);
        let mut perm: Vec<NodeIndex> = (0..n).collect();
        let mut assignment = vec![0; n];

        let mut evaluate = |perm: &[NodeIndex], best: &mut Option<(u64, Vec<usize>)>| {
            for (position, &node) in perm.iter().enumerate() {
                assignment[node] = layout[position];
            }
            let cut = cut_size(graph, &assignment);
            if best.as_ref().map_or(true, |(best_cut, _)| cut < *best_cut) {
                *best = Some((cut, assignment.clone()));
            }
        };

        // Heap's algorithm, iterative form
        let mut best = None;
        let mut counters = vec![0; n];
        evaluate(&perm, &mut best);
        let mut i = 1;
        while i < n {
            if counters[i] < i {
                if i % 2 == 0 {
                    perm.swap(0, i);
                } else {
                    perm.swap(counters[i], i);
                }
                evaluate(&perm, &mut best);
                counters[i] += 1;
                i = 1;
            } else {
                counters[i] = 0;
                i += 1;
            }
        }

        let (_, assignment) = best.unwrap_or_else(|| (0, vec![0; n]));
        Ok(Partitioning::from_assignment(&assignment, k))
    }
}
