//! # reachcert-partition
//!
//! Balanced graph partitioning for the dependency graphs of reachability
//! certificates. Partitions are the unit of work for parallel certificate
//! re-validation, so two qualities matter: balance (similar checking cost per
//! partition) and a small cut (few cross-partition obligations).
//!
//! ## Heuristics
//!
//! - **Random**: seeded shuffle dealt into balanced parts
//! - **Exploration**: breadth- or depth-first growth along successor edges
//! - **Best-first**: priority frontier with pluggable [`Evaluation`]
//! - **Optimal**: exhaustive search for graphs of at most nine nodes
//! - **Fiduccia–Mattheyses**: pairwise two-way refinement of a seed
//! - **Multilevel**: coarsen by matching, partition, refine while expanding
//!
//! ## Quick Start
//!
//! ```rust
//! use reachcert_partition::prelude::*;
//!
//! let graph = WeightedGraph::from_edges(6, vec![
//!     (0, 1, 1), (1, 2, 1), (2, 0, 1),
//!     (3, 4, 1), (4, 5, 1), (5, 3, 1),
//!     (2, 3, 1),
//! ]).unwrap();
//!
//! let config = PartitionerConfig::new(PartitioningHeuristic::Optimal);
//! let partitioner = build_partitioner(&config).unwrap();
//! let partitioning = partitioner.compute_partitioning(2, &graph).unwrap();
//!
//! assert!(partitioning.validate(graph.num_nodes()).is_ok());
//! assert_eq!(partitioning.cut_size(&graph), 1);
//! ```
//!
//! ## Architecture
//!
//! - [`graph`]: immutable weighted adjacency and contraction
//! - [`partitioning`]: the partitioning type and its metrics
//! - [`matching`]: matching generators for coarsening
//! - [`global`]: global heuristics behind [`GlobalPartitioner`]
//! - [`refine`]: two-way FM and k-way refinement
//! - [`multilevel`]: the multilevel orchestrator
//! - [`factory`]: configuration-driven heuristic selection

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod factory;
pub mod global;
pub mod graph;
pub mod matching;
pub mod multilevel;
pub mod partitioning;
pub mod refine;

pub use error::{PartitionError, Result};
pub use factory::{build_partitioner, BoxedPartitioner, MatchingKind, PartitionerConfig, PartitioningHeuristic};
pub use global::{
    BestFirstPartitioner, Evaluation, ExplorationOrder, ExplorationPartitioner,
    FiducciaMattheysesPartitioner, GlobalPartitioner, OptimalPartitioner, RandomPartitioner,
    OPTIMAL_NODE_LIMIT,
};
pub use graph::{Edge, GraphBuilder, GraphStats, NodeIndex, Weight, WeightedGraph};
pub use matching::{HeavyEdgeMatching, Matching, MatchingGenerator, RandomMatching};
pub use multilevel::{retransform_partitioning, MultilevelPartitioner};
pub use partitioning::Partitioning;
pub use refine::{FiducciaMattheyses, GainFunction, KWayRefiner};

/// Commonly used types
pub mod prelude {
    pub use crate::factory::{build_partitioner, PartitionerConfig, PartitioningHeuristic};
    pub use crate::global::GlobalPartitioner;
    pub use crate::graph::{GraphBuilder, NodeIndex, Weight, WeightedGraph};
    pub use crate::partitioning::Partitioning;
    pub use crate::{PartitionError, Result};
}
