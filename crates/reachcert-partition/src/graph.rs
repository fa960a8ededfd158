//! Weighted graph representation for certificate partitioning
//!
//! Provides an immutable, index-based adjacency structure optimized for:
//! - O(deg(v)) successor, predecessor and neighbor iteration
//! - Integer node weights (estimated checking cost)
//! - Integer edge weights (number of collapsed parallel edges)
//!
//! Graphs are built once through [`GraphBuilder`]. Multilevel coarsening
//! produces a new, smaller graph via [`WeightedGraph::contract`] instead of
//! mutating in place.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PartitionError, Result};
use crate::matching::Matching;

/// Index of a node in the certificate node table
pub type NodeIndex = usize;

/// Integer weight of a node or edge
pub type Weight = u64;

/// A directed, weighted edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source node of the edge
    pub source: NodeIndex,
    /// Target node of the edge
    pub target: NodeIndex,
    /// Weight of the edge
    pub weight: Weight,
}

impl Edge {
    /// Create a new edge
    pub fn new(source: NodeIndex, target: NodeIndex, weight: Weight) -> Self {
        Self { source, target, weight }
    }
}

/// Statistics about a weighted graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    /// Number of nodes
    pub num_nodes: usize,
    /// Number of distinct directed edges
    pub num_edges: usize,
    /// Sum of all node weights
    pub total_node_weight: Weight,
    /// Sum of all edge weights
    pub total_edge_weight: Weight,
    /// Maximum undirected degree
    pub max_degree: usize,
}

/// Incremental builder for [`WeightedGraph`]
///
/// Edges with identical endpoints are merged by summing their weights.
/// Self-loops carry no cut information and are ignored.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    node_weights: Vec<Weight>,
    edges: HashMap<(NodeIndex, NodeIndex), Weight>,
}

impl GraphBuilder {
    /// Create a builder for `num_nodes` nodes of weight 1
    pub fn new(num_nodes: usize) -> Self {
        Self {
            node_weights: vec![1; num_nodes],
            edges: HashMap::new(),
        }
    }

    /// Create a builder with explicit node weights
    pub fn with_node_weights(node_weights: Vec<Weight>) -> Self {
        Self {
            node_weights,
            edges: HashMap::new(),
        }
    }

    /// Number of nodes the builder was created for
    pub fn num_nodes(&self) -> usize {
        self.node_weights.len()
    }

    /// Overwrite the weight of a single node
    pub fn set_node_weight(&mut self, node: NodeIndex, weight: Weight) -> Result<()> {
        self.check_node(node)?;
        self.node_weights[node] = weight;
        Ok(())
    }

    /// Add (or union) a directed edge
    pub fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, weight: Weight) -> Result<()> {
        self.check_node(source)?;
        self.check_node(target)?;
        if source != target {
            *self.edges.entry((source, target)).or_insert(0) += weight;
        }
        Ok(())
    }

    /// Add (or union) a batch of directed edges
    pub fn add_edges<I>(&mut self, edges: I) -> Result<()>
    where
        I: IntoIterator<Item = (NodeIndex, NodeIndex, Weight)>,
    {
        for (source, target, weight) in edges {
            self.add_edge(source, target, weight)?;
        }
        Ok(())
    }

    fn check_node(&self, node: NodeIndex) -> Result<()> {
        if node >= self.node_weights.len() {
            return Err(PartitionError::InvalidNode {
                index: node,
                num_nodes: self.node_weights.len(),
            });
        }
        Ok(())
    }

    /// Freeze the builder into an immutable graph
    pub fn build(self) -> WeightedGraph {
        let n = self.node_weights.len();
        let mut outgoing: Vec<Vec<(NodeIndex, Weight)>> = vec![Vec::new(); n];
        let mut incoming: Vec<Vec<(NodeIndex, Weight)>> = vec![Vec::new(); n];
        let mut undirected: Vec<HashMap<NodeIndex, Weight>> = vec![HashMap::new(); n];

        for (&(u, v), &w) in &self.edges {
            outgoing[u].push((v, w));
            incoming[v].push((u, w));
            *undirected[u].entry(v).or_insert(0) += w;
            *undirected[v].entry(u).or_insert(0) += w;
        }

        // Sorted adjacency keeps every heuristic deterministic
        for list in outgoing.iter_mut().chain(incoming.iter_mut()) {
            list.sort_unstable();
        }
        let neighbors = undirected
            .into_iter()
            .map(|map| {
                let mut list: Vec<_> = map.into_iter().collect();
                list.sort_unstable();
                list
            })
            .collect();

        let total_node_weight = self.node_weights.iter().sum();
        WeightedGraph {
            node_weights: self.node_weights,
            outgoing,
            incoming,
            neighbors,
            num_edges: self.edges.len(),
            total_node_weight,
        }
    }
}

/// Immutable weighted directed graph over dense node indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedGraph {
    node_weights: Vec<Weight>,
    outgoing: Vec<Vec<(NodeIndex, Weight)>>,
    incoming: Vec<Vec<(NodeIndex, Weight)>>,
    /// Undirected view: weight = w(u→v) + w(v→u)
    neighbors: Vec<Vec<(NodeIndex, Weight)>>,
    num_edges: usize,
    total_node_weight: Weight,
}

impl WeightedGraph {
    /// Build a graph of unit-weight nodes from an edge list
    pub fn from_edges<I>(num_nodes: usize, edges: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeIndex, NodeIndex, Weight)>,
    {
        let mut builder = GraphBuilder::new(num_nodes);
        builder.add_edges(edges)?;
        Ok(builder.build())
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.node_weights.len()
    }

    /// Number of distinct directed edges
    pub fn num_edges(&self) -> usize {
        self.num_edges
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.node_weights.is_empty()
    }

    /// Weight of a node
    pub fn node_weight(&self, node: NodeIndex) -> Weight {
        self.node_weights[node]
    }

    /// All node weights, indexed by node
    pub fn node_weights(&self) -> &[Weight] {
        &self.node_weights
    }

    /// Sum of all node weights
    pub fn total_node_weight(&self) -> Weight {
        self.total_node_weight
    }

    /// Outgoing edges as `(target, weight)`
    pub fn successors(&self, node: NodeIndex) -> &[(NodeIndex, Weight)] {
        &self.outgoing[node]
    }

    /// Incoming edges as `(source, weight)`
    pub fn predecessors(&self, node: NodeIndex) -> &[(NodeIndex, Weight)] {
        &self.incoming[node]
    }

    /// Undirected neighbors with combined weight of both directions
    pub fn neighbors(&self, node: NodeIndex) -> &[(NodeIndex, Weight)] {
        &self.neighbors[node]
    }

    /// Weight of the directed edge `source → target` (0 if absent)
    pub fn edge_weight(&self, source: NodeIndex, target: NodeIndex) -> Weight {
        self.outgoing[source]
            .binary_search_by_key(&target, |&(t, _)| t)
            .map(|pos| self.outgoing[source][pos].1)
            .unwrap_or(0)
    }

    /// Sum of the combined weights of all undirected neighbors
    pub fn weighted_degree(&self, node: NodeIndex) -> Weight {
        self.neighbors[node].iter().map(|&(_, w)| w).sum()
    }

    /// Iterate over all directed edges
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.outgoing.iter().enumerate().flat_map(|(source, list)| {
            list.iter()
                .map(move |&(target, weight)| Edge::new(source, target, weight))
        })
    }

    /// Compute summary statistics
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            num_nodes: self.num_nodes(),
            num_edges: self.num_edges,
            total_node_weight: self.total_node_weight,
            total_edge_weight: self.edges().map(|e| e.weight).sum(),
            max_degree: self.neighbors.iter().map(Vec::len).max().unwrap_or(0),
        }
    }

    /// Contract the graph along a matching
    ///
    /// Supernode weight is the sum of its constituents' weights; supernode
    /// edges are the union of constituent edges, excluding the self-loops the
    /// contraction creates.
    pub fn contract(&self, matching: &Matching) -> WeightedGraph {
        let mut weights = vec![0; matching.supernode_count()];
        for node in 0..self.num_nodes() {
            weights[matching.supernode_of(node)] += self.node_weights[node];
        }

        let mut builder = GraphBuilder::with_node_weights(weights);
        for edge in self.edges() {
            let source = matching.supernode_of(edge.source);
            let target = matching.supernode_of(edge.target);
            // Indices come from a total matching over this graph
            if source != target {
                *builder.edges.entry((source, target)).or_insert(0) += edge.weight;
            }
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> WeightedGraph {
        // 0 → 1, 0 → 2, 1 → 3, 2 → 3
        WeightedGraph::from_edges(4, vec![(0, 1, 1), (0, 2, 1), (1, 3, 1), (2, 3, 1)]).unwrap()
    }

    #[test]
    fn test_adjacency() {
        let g = diamond();
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_edges(), 4);
        assert_eq!(g.successors(0), &[(1, 1), (2, 1)]);
        assert_eq!(g.predecessors(3), &[(1, 1), (2, 1)]);
        assert_eq!(g.neighbors(1), &[(0, 1), (3, 1)]);
        assert_eq!(g.total_node_weight(), 4);
    }

    #[test]
    fn test_parallel_edges_are_unioned() {
        let g = WeightedGraph::from_edges(2, vec![(0, 1, 1), (0, 1, 2), (1, 0, 4)]).unwrap();
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.edge_weight(0, 1), 3);
        assert_eq!(g.edge_weight(1, 0), 4);
        assert_eq!(g.neighbors(0), &[(1, 7)]);
        assert_eq!(g.weighted_degree(1), 7);
    }

    #[test]
    fn test_self_loops_ignored() {
        let g = WeightedGraph::from_edges(2, vec![(0, 0, 5), (0, 1, 1)]).unwrap();
        assert_eq!(g.num_edges(), 1);
        assert_eq!(g.edge_weight(0, 0), 0);
    }

    #[test]
    fn test_invalid_node_rejected() {
        let err = WeightedGraph::from_edges(2, vec![(0, 2, 1)]).unwrap_err();
        assert_eq!(err, PartitionError::InvalidNode { index: 2, num_nodes: 2 });
    }

    #[test]
    fn test_contract() {
        let g = diamond();
        // {0,1} → 0, {2,3} → 1
        let matching = Matching::from_mapping(vec![0, 0, 1, 1]);
        let c = g.contract(&matching);

        assert_eq!(c.num_nodes(), 2);
        assert_eq!(c.node_weight(0), 2);
        assert_eq!(c.node_weight(1), 2);
        // 0→2 and 1→3 both become 0→1
        assert_eq!(c.edge_weight(0, 1), 2);
        assert_eq!(c.edge_weight(1, 0), 0);
        assert_eq!(c.total_node_weight(), g.total_node_weight());
    }

    #[test]
    fn test_stats() {
        let stats = diamond().stats();
        assert_eq!(stats.num_nodes, 4);
        assert_eq!(stats.num_edges, 4);
        assert_eq!(stats.total_edge_weight, 4);
        assert_eq!(stats.max_degree, 2);
    }
}
