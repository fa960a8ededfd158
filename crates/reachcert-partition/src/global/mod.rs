//! Global partitioning heuristics
//!
//! Every heuristic implements [`GlobalPartitioner`]. Implementations only
//! provide [`GlobalPartitioner::split`]; the provided
//! [`GlobalPartitioner::compute_partitioning`] enforces the preconditions and
//! handles the trivial cases (`k == 1`, `k ≥ |nodes|`) without running the
//! heuristic.
//!
//! | Heuristic | Module | Quality |
//! |-----------|--------|---------|
//! | [`RandomPartitioner`] | `random` | none, fast seed |
//! | [`ExplorationPartitioner`] | `exploration` | locality of BFS/DFS order |
//! | [`BestFirstPartitioner`] | `best_first` | priority-driven growth |
//! | [`OptimalPartitioner`] | `optimal` | exact, tiny graphs only |
//! | [`FiducciaMattheysesPartitioner`] | `fm` | pairwise FM refinement |

use tracing::debug;

use crate::error::{PartitionError, Result};
use crate::graph::{NodeIndex, Weight, WeightedGraph};
use crate::partitioning::Partitioning;

mod best_first;
mod exploration;
mod fm;
mod optimal;
mod random;

pub use best_first::{BestFirstPartitioner, Evaluation};
pub use exploration::{ExplorationOrder, ExplorationPartitioner};
pub use fm::FiducciaMattheysesPartitioner;
pub use optimal::{OptimalPartitioner, OPTIMAL_NODE_LIMIT};
pub use random::RandomPartitioner;

/// Produces an initial k-way partitioning of a graph
pub trait GlobalPartitioner: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Partition a non-empty graph into `k` parts, `1 < k < |nodes|`
    ///
    /// The result must cover every node exactly once. Partitions may be
    /// empty; callers drop them where needed.
    fn split(&self, k: usize, graph: &WeightedGraph) -> Result<Partitioning>;

    /// Partition a graph into at most `k` parts
    ///
    /// # Errors
    ///
    /// [`PartitionError::InvalidPartitionCount`] for `k == 0` and
    /// [`PartitionError::EmptyGraph`] for a graph without nodes.
    fn compute_partitioning(&self, k: usize, graph: &WeightedGraph) -> Result<Partitioning> {
        if k == 0 {
            return Err(PartitionError::InvalidPartitionCount(k));
        }
        let n = graph.num_nodes();
        if n == 0 {
            return Err(PartitionError::EmptyGraph);
        }
        if k == 1 {
            return Ok(Partitioning::single(n));
        }
        if k >= n {
            return Ok(Partitioning::singletons(n));
        }

        let partitioning = self.split(k, graph)?;
        debug_assert!(partitioning.validate(n).is_ok(), "{} broke the cover invariant", self.name());
        debug!(
            heuristic = self.name(),
            k,
            nodes = n,
            cut = partitioning.cut_size(graph),
            "computed partitioning"
        );
        Ok(partitioning)
    }
}

/// Per-partition weight target for a balanced k-way split
pub(crate) fn target_weight(graph: &WeightedGraph, k: usize) -> Weight {
    graph.total_node_weight().div_ceil(k as Weight).max(1)
}

/// Fill partitions in the given node order, moving on once the target is met
pub(crate) fn fill_in_order(order: &[NodeIndex], k: usize, graph: &WeightedGraph) -> Partitioning {
    let target = target_weight(graph, k);
    let mut assignment = vec![0; graph.num_nodes()];
    let mut current = 0;
    let mut current_weight = 0;

    for &node in order {
        if current_weight >= target && current + 1 < k {
            current += 1;
            current_weight = 0;
        }
        assignment[node] = current;
        current_weight += graph.node_weight(node);
    }
    Partitioning::from_assignment(&assignment, k)
}
