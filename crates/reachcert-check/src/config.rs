//! Checker configuration

use reachcert_partition::PartitionerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CheckError, Result};

/// How the parallel phase is organized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStrategy {
    /// One task per partition on a fixed worker pool
    #[default]
    Partitioned,
    /// Barrier-synchronized workers over the whole state table
    ReachedSet,
}

/// How barrier-synchronized workers claim states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadDistribution {
    /// Claim the next state from a shared atomic counter
    #[default]
    Dynamic,
    /// Each worker owns a fixed index range
    Static,
}

/// Configuration of a [`crate::CertificateChecker`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Worker threads
    pub threads: usize,
    /// Organization of the parallel phase
    pub strategy: CheckStrategy,
    /// State claiming for [`CheckStrategy::ReachedSet`]
    pub load_distribution: LoadDistribution,
    /// Upper bound on states per partition; determines the partition count
    pub max_elements_per_partition: usize,
    /// Heuristic used to partition certificates
    pub partitioner: PartitionerConfig,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            threads: std::thread::available_parallelism().map_or(1, |n| n.get()),
            strategy: CheckStrategy::Partitioned,
            load_distribution: LoadDistribution::Dynamic,
            max_elements_per_partition: 1_000,
            partitioner: PartitionerConfig::default(),
        }
    }
}

impl CheckerConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the worker thread count
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the checking strategy
    pub fn strategy(mut self, strategy: CheckStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the load distribution
    pub fn load_distribution(mut self, load_distribution: LoadDistribution) -> Self {
        self.load_distribution = load_distribution;
        self
    }

    /// Set the maximum number of states per partition
    pub fn max_elements_per_partition(mut self, max: usize) -> Self {
        self.max_elements_per_partition = max;
        self
    }

    /// Set the partitioner configuration
    pub fn partitioner(mut self, partitioner: PartitionerConfig) -> Self {
        self.partitioner = partitioner;
        self
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(CheckError::Config("threads must be at least 1".into()));
        }
        if self.max_elements_per_partition == 0 {
            return Err(CheckError::Config(
                "max_elements_per_partition must be at least 1".into(),
            ));
        }
        self.partitioner.validate()?;
        Ok(())
    }

    /// Partition count for a certificate of `states` states
    pub fn partition_count(&self, states: usize) -> usize {
        states.div_ceil(self.max_elements_per_partition.max(1)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_count() {
        let config = CheckerConfig::new().max_elements_per_partition(10);
        assert_eq!(config.partition_count(0), 1);
        assert_eq!(config.partition_count(10), 1);
        assert_eq!(config.partition_count(11), 2);
        assert_eq!(config.partition_count(95), 10);
    }

    #[test]
    fn test_validate() {
        assert!(CheckerConfig::new().validate().is_ok());
        assert!(CheckerConfig::new().threads(0).validate().is_err());
        assert!(CheckerConfig::new().max_elements_per_partition(0).validate().is_err());

        let bad = CheckerConfig::new().partitioner(PartitionerConfig::default().balance(0.1));
        assert!(bad.validate().unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CheckerConfig = serde_json::from_str(
            r#"{"threads": 3, "strategy": "reached_set", "load_distribution": "static"}"#,
        )
        .unwrap();
        assert_eq!(config.threads, 3);
        assert_eq!(config.strategy, CheckStrategy::ReachedSet);
        assert_eq!(config.load_distribution, LoadDistribution::Static);
        assert_eq!(config.max_elements_per_partition, 1_000);
    }
}
