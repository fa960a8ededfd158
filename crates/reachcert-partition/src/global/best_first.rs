//! Best-first partitioning with pluggable evaluation functions

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use super::{target_weight, GlobalPartitioner};
use crate::error::Result;
use crate::graph::{NodeIndex, WeightedGraph};
use crate::partitioning::Partitioning;

const UNASSIGNED: usize = usize::MAX;

/// Priority function for frontier nodes; lower priorities are expanded first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evaluation {
    /// Priority grows with discovery depth
    BreadthFirst,
    /// Priority shrinks with discovery depth
    DepthFirst,
    /// Weight of successors outside the current partition minus own weight
    BestImprovementFirst,
}

impl Evaluation {
    fn priority(
        self,
        graph: &WeightedGraph,
        assignment: &[usize],
        current: usize,
        node: NodeIndex,
        depth: usize,
    ) -> i64 {
        match self {
            Evaluation::BreadthFirst => depth as i64,
            Evaluation::DepthFirst => -(depth as i64),
            Evaluation::BestImprovementFirst => {
                let outside: u64 = graph
                    .successors(node)
                    .iter()
                    .filter(|&&(t, _)| assignment[t] != current)
                    .map(|&(t, _)| graph.node_weight(t))
                    .sum();
                outside as i64 - graph.node_weight(node) as i64
            }
        }
    }
}

/// Frontier entry ordered so the max-heap pops the minimal priority,
/// breaking ties by the higher node index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    priority: Reverse<i64>,
    node: NodeIndex,
    depth: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.priority, self.node, self.depth).cmp(&(other.priority, other.node, other.depth))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Grows partitions from a priority-ordered frontier of successors
///
/// The frontier survives partition switches, so a partition that fills up
/// hands its pending candidates to the next one. When the frontier runs dry
/// the lowest unassigned node seeds it again.
#[derive(Debug, Clone)]
pub struct BestFirstPartitioner {
    evaluation: Evaluation,
}

impl BestFirstPartitioner {
    /// Create a partitioner with the given evaluation function
    pub fn new(evaluation: Evaluation) -> Self {
        Self { evaluation }
    }

    /// The configured evaluation function
    pub fn evaluation(&self) -> Evaluation {
        self.evaluation
    }
}

impl Default for BestFirstPartitioner {
    fn default() -> Self {
        Self::new(Evaluation::BestImprovementFirst)
    }
}

impl GlobalPartitioner for BestFirstPartitioner {
    fn name(&self) -> &'static str {
        match self.evaluation {
            Evaluation::BreadthFirst => "best-first/breadth",
            Evaluation::DepthFirst => "best-first/depth",
            Evaluation::BestImprovementFirst => "best-improvement-first",
        }
    }

    fn split(&self, k: usize, graph: &WeightedGraph) -> Result<Partitioning> {
        let n = graph.num_nodes();
        let target = target_weight(graph, k);
        let mut assignment = vec![UNASSIGNED; n];
        let mut frontier = BinaryHeap::new();
        let mut current = 0;
        let mut current_weight = 0;
        let mut next_seed = 0;

        for _ in 0..n {
            let (node, depth) = loop {
                match frontier.pop() {
                    Some(Candidate { node, depth, .. }) if assignment[node] == UNASSIGNED => {
                        break (node, depth)
                    }
                    Some(_) => continue,
                    None => {
                        while assignment[next_seed] != UNASSIGNED {
                            next_seed += 1;
                        }
                        break (next_seed, 0);
                    }
                }
            };

            if current_weight >= target && current + 1 < k {
                current += 1;
                current_weight = 0;
            }
            assignment[node] = current;
            current_weight += graph.node_weight(node);

            for &(succ, _) in graph.successors(node) {
                if assignment[succ] == UNASSIGNED {
                    let priority =
                        self.evaluation
                            .priority(graph, &assignment, current, succ, depth + 1);
                    frontier.push(Candidate {
                        priority: Reverse(priority),
                        node: succ,
                        depth: depth + 1,
                    });
                }
            }
        }

        Ok(Partitioning::from_assignment(&assignment, k))
    }
}
