//! Partitionings of a weighted graph
//!
//! A [`Partitioning`] is an ordered list of node sets that, before empty
//! partitions are removed, covers every node exactly once.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{PartitionError, Result};
use crate::graph::{NodeIndex, Weight, WeightedGraph};

/// Ordered list of disjoint node sets
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Partitioning {
    parts: Vec<BTreeSet<NodeIndex>>,
}

impl Partitioning {
    /// Wrap a list of partitions without validation
    pub fn new(parts: Vec<BTreeSet<NodeIndex>>) -> Self {
        Self { parts }
    }

    /// `k` empty partitions
    pub fn empty(k: usize) -> Self {
        Self {
            parts: vec![BTreeSet::new(); k],
        }
    }

    /// One partition holding all `num_nodes` nodes
    pub fn single(num_nodes: usize) -> Self {
        Self {
            parts: vec![(0..num_nodes).collect()],
        }
    }

    /// Every node in its own partition
    pub fn singletons(num_nodes: usize) -> Self {
        Self {
            parts: (0..num_nodes).map(|v| BTreeSet::from([v])).collect(),
        }
    }

    /// Build from a node → partition assignment with `k` partitions
    pub fn from_assignment(assignment: &[usize], k: usize) -> Self {
        let mut parts = vec![BTreeSet::new(); k];
        for (node, &part) in assignment.iter().enumerate() {
            parts[part].insert(node);
        }
        Self { parts }
    }

    /// Node → partition assignment for a partitioning of `num_nodes` nodes
    ///
    /// Nodes that are not covered map to `usize::MAX`.
    pub fn assignment(&self, num_nodes: usize) -> Vec<usize> {
        let mut assignment = vec![usize::MAX; num_nodes];
        for (index, part) in self.parts.iter().enumerate() {
            for &node in part {
                if node < num_nodes {
                    assignment[node] = index;
                }
            }
        }
        assignment
    }

    /// The partitions
    pub fn parts(&self) -> &[BTreeSet<NodeIndex>] {
        &self.parts
    }

    /// Mutable access to a single partition
    pub fn part_mut(&mut self, index: usize) -> Option<&mut BTreeSet<NodeIndex>> {
        self.parts.get_mut(index)
    }

    /// Consume into the list of partitions
    pub fn into_parts(self) -> Vec<BTreeSet<NodeIndex>> {
        self.parts
    }

    /// Number of partitions
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Whether there are no partitions
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Total number of nodes across all partitions
    pub fn num_nodes(&self) -> usize {
        self.parts.iter().map(BTreeSet::len).sum()
    }

    /// Move a node between partitions
    pub fn move_node(&mut self, node: NodeIndex, from: usize, to: usize) {
        if self.parts[from].remove(&node) {
            self.parts[to].insert(node);
        }
    }

    /// Check that the partitions exactly cover `0..num_nodes`, pairwise disjoint
    pub fn validate(&self, num_nodes: usize) -> Result<()> {
        let mut seen = vec![false; num_nodes];
        for (index, part) in self.parts.iter().enumerate() {
            for &node in part {
                if node >= num_nodes {
                    return Err(PartitionError::InvalidPartitioning(format!(
                        "partition {index} contains node {node} outside 0..{num_nodes}"
                    )));
                }
                if seen[node] {
                    return Err(PartitionError::InvalidPartitioning(format!(
                        "node {node} appears in more than one partition"
                    )));
                }
                seen[node] = true;
            }
        }
        if let Some(missing) = seen.iter().position(|&s| !s) {
            return Err(PartitionError::InvalidPartitioning(format!(
                "node {missing} is not assigned to any partition"
            )));
        }
        Ok(())
    }

    /// Sum of node weights per partition
    pub fn part_weights(&self, graph: &WeightedGraph) -> Vec<Weight> {
        self.parts
            .iter()
            .map(|part| part.iter().map(|&v| graph.node_weight(v)).sum())
            .collect()
    }

    /// Total weight of directed edges whose endpoints lie in different partitions
    pub fn cut_size(&self, graph: &WeightedGraph) -> Weight {
        cut_size(graph, &self.assignment(graph.num_nodes()))
    }

    /// Successors of a partition's nodes that lie outside it
    pub fn boundary(&self, graph: &WeightedGraph, part: usize) -> Result<BTreeSet<NodeIndex>> {
        let nodes = self.parts.get(part).ok_or(PartitionError::InvalidPartition {
            index: part,
            len: self.parts.len(),
        })?;
        Ok(nodes
            .iter()
            .flat_map(|&v| graph.successors(v).iter().map(|&(t, _)| t))
            .filter(|t| !nodes.contains(t))
            .collect())
    }

    /// Pad with empty partitions until there are at least `k`
    pub fn ensure_parts(&mut self, k: usize) {
        if self.parts.len() < k {
            self.parts.resize_with(k, BTreeSet::new);
        }
    }

    /// Drop partitions without nodes, preserving order
    pub fn remove_empty(&mut self) {
        self.parts.retain(|part| !part.is_empty());
    }
}

/// Cut size of a node → partition assignment
pub fn cut_size(graph: &WeightedGraph, assignment: &[usize]) -> Weight {
    graph
        .edges()
        .filter(|e| assignment[e.source] != assignment[e.target])
        .map(|e| e.weight)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(n: usize) -> WeightedGraph {
        WeightedGraph::from_edges(n, (0..n - 1).map(|i| (i, i + 1, 1))).unwrap()
    }

    #[test]
    fn test_assignment_round_trip() {
        let p = Partitioning::from_assignment(&[0, 1, 0, 2], 3);
        assert_eq!(p.len(), 3);
        assert_eq!(p.assignment(4), vec![0, 1, 0, 2]);
        assert!(p.validate(4).is_ok());
    }

    #[test]
    fn test_validate_detects_duplicates_and_omissions() {
        let dup = Partitioning::new(vec![BTreeSet::from([0, 1]), BTreeSet::from([1, 2])]);
        assert!(matches!(dup.validate(3), Err(PartitionError::InvalidPartitioning(_))));

        let missing = Partitioning::new(vec![BTreeSet::from([0]), BTreeSet::from([2])]);
        assert!(matches!(missing.validate(3), Err(PartitionError::InvalidPartitioning(_))));

        let outside = Partitioning::new(vec![BTreeSet::from([0, 5])]);
        assert!(outside.validate(1).is_err());
    }

    #[test]
    fn test_cut_size_and_boundary() {
        let g = path(4);
        let p = Partitioning::from_assignment(&[0, 0, 1, 1], 2);
        assert_eq!(p.cut_size(&g), 1);
        assert_eq!(p.boundary(&g, 0).unwrap(), BTreeSet::from([2]));
        assert!(p.boundary(&g, 1).unwrap().is_empty());
        assert!(p.boundary(&g, 2).is_err());
    }

    #[test]
    fn test_remove_empty_and_move() {
        let mut p = Partitioning::from_assignment(&[0, 0, 2], 3);
        p.move_node(1, 0, 2);
        assert_eq!(p.parts()[2], BTreeSet::from([1, 2]));
        p.remove_empty();
        assert_eq!(p.len(), 2);
        assert!(p.validate(3).is_ok());
    }

    #[test]
    fn test_part_weights() {
        let g = path(3);
        let p = Partitioning::from_assignment(&[0, 1, 1], 2);
        assert_eq!(p.part_weights(&g), vec![1, 2]);
    }
}
