//! Statistics collected during a check

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Work and timing statistics of a single check
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckStatistics {
    /// Number of partitions checked (1 for the reached-set strategy)
    pub partitions: usize,
    /// Worker threads used
    pub threads: usize,
    /// States in the original certificate
    pub certificate_states: usize,
    /// States recomputation had to add
    pub added_states: usize,
    /// Successor computations performed
    pub successor_computations: usize,
    /// Obligations checked in the global phase
    pub obligations: usize,
    /// Time spent computing the partitioning
    pub partitioning_time: Duration,
    /// Time spent in the parallel phase
    pub checking_time: Duration,
    /// Time spent in the global phase
    pub global_time: Duration,
}

impl CheckStatistics {
    /// Wall time of all phases
    pub fn total_time(&self) -> Duration {
        self.partitioning_time + self.checking_time + self.global_time
    }
}
