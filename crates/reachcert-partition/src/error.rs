//! Error types for graph partitioning

use thiserror::Error;

/// Result type for partitioning operations
pub type Result<T> = std::result::Result<T, PartitionError>;

/// Errors that can occur while building graphs or computing partitionings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PartitionError {
    /// Graph has no nodes
    #[error("Graph is empty")]
    EmptyGraph,

    /// Requested partition count is not positive
    #[error("Invalid partition count: {0} (must be at least 1)")]
    InvalidPartitionCount(usize),

    /// Node index outside the node table
    #[error("Invalid node index {index} for graph with {num_nodes} nodes")]
    InvalidNode {
        /// Offending node index
        index: usize,
        /// Size of the node table
        num_nodes: usize,
    },

    /// Balance criterion outside its valid range
    #[error("Invalid balance criterion: {0} (must be finite and at least 1.0)")]
    InvalidBalance(f64),

    /// Graph is too large for an exhaustive heuristic
    #[error("Graph with {nodes} nodes exceeds the exhaustive search limit of {limit}")]
    GraphTooLarge {
        /// Number of nodes in the graph
        nodes: usize,
        /// Maximum number of nodes the heuristic accepts
        limit: usize,
    },

    /// Partitioning violates the disjoint-cover invariant
    #[error("Invalid partitioning: {0}")]
    InvalidPartitioning(String),

    /// Heuristic configuration is inconsistent
    #[error("Invalid partitioner configuration: {0}")]
    InvalidConfig(String),

    /// Partition index out of range
    #[error("Invalid partition index {index} for partitioning with {len} partitions")]
    InvalidPartition {
        /// Offending partition index
        index: usize,
        /// Number of partitions
        len: usize,
    },
}

impl PartitionError {
    /// Check if the error stems from caller-supplied parameters
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PartitionError::InvalidPartitionCount(_)
                | PartitionError::InvalidBalance(_)
                | PartitionError::GraphTooLarge { .. }
                | PartitionError::InvalidConfig(_)
        )
    }
}
