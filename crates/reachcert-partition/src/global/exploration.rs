//! Exploration-order partitioning (breadth-first / depth-first)

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{fill_in_order, GlobalPartitioner};
use crate::error::Result;
use crate::graph::{NodeIndex, WeightedGraph};
use crate::partitioning::Partitioning;

/// Traversal order used to grow partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationOrder {
    /// Level by level along successor edges
    Breadth,
    /// Deepest successor first
    Depth,
}

/// Grows partitions along a BFS or DFS order over successor edges
///
/// The traversal starts at node 0 and restarts at the lowest unvisited node
/// whenever it runs dry, so disconnected certificates are covered too.
#[derive(Debug, Clone)]
pub struct ExplorationPartitioner {
    order: ExplorationOrder,
}

impl ExplorationPartitioner {
    /// Create a partitioner for the given traversal order
    pub fn new(order: ExplorationOrder) -> Self {
        Self { order }
    }

    /// Breadth-first partitioner
    pub fn breadth_first() -> Self {
        Self::new(ExplorationOrder::Breadth)
    }

    /// Depth-first partitioner
    pub fn depth_first() -> Self {
        Self::new(ExplorationOrder::Depth)
    }

    /// Node visiting order for the configured traversal
    pub fn visiting_order(&self, graph: &WeightedGraph) -> Vec<NodeIndex> {
        match self.order {
            ExplorationOrder::Breadth => breadth_first_order(graph),
            ExplorationOrder::Depth => depth_first_order(graph),
        }
    }
}

fn breadth_first_order(graph: &WeightedGraph) -> Vec<NodeIndex> {
    let n = graph.num_nodes();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut queue = VecDeque::new();

    for root in 0..n {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        queue.push_back(root);
        while let Some(node) = queue.pop_front() {
            order.push(node);
            for &(succ, _) in graph.successors(node) {
                if !visited[succ] {
                    visited[succ] = true;
                    queue.push_back(succ);
                }
            }
        }
    }
    order
}

fn depth_first_order(graph: &WeightedGraph) -> Vec<NodeIndex> {
    let n = graph.num_nodes();
    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut stack = Vec::new();

    for root in 0..n {
        if visited[root] {
            continue;
        }
        stack.push(root);
        while let Some(node) = stack.pop() {
            if visited[node] {
                continue;
            }
            visited[node] = true;
            order.push(node);
            // Reverse so the lowest successor is explored first
            for &(succ, _) in graph.successors(node).iter().rev() {
                if !visited[succ] {
                    stack.push(succ);
                }
            }
        }
    }
    order
}

impl GlobalPartitioner for ExplorationPartitioner {
    fn name(&self) -> &'static str {
        match self.order {
            ExplorationOrder::Breadth => "breadth-first",
            ExplorationOrder::Depth => "depth-first",
        }
    }

    fn split(&self, k: usize, graph: &WeightedGraph) -> Result<Partitioning> {
        let order = self.visiting_order(graph);
        Ok(fill_in_order(&order, k, graph))
    }
}
