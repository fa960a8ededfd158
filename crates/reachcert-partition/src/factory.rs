//! Heuristic selection from configuration
//!
//! [`PartitionerConfig`] is a plain serde struct; [`build_partitioner`]
//! turns it into a boxed [`GlobalPartitioner`] through a single match.

use serde::{Deserialize, Serialize};

use crate::error::{PartitionError, Result};
use crate::global::{
    BestFirstPartitioner, Evaluation, ExplorationPartitioner, FiducciaMattheysesPartitioner,
    GlobalPartitioner, OptimalPartitioner, RandomPartitioner,
};
use crate::matching::{HeavyEdgeMatching, MatchingGenerator, RandomMatching};
use crate::multilevel::{MultilevelPartitioner, DEFAULT_COARSEN_FACTOR};
use crate::refine::{check_balance, GainFunction, KWayRefiner};

/// A boxed, thread-safe global partitioner
pub type BoxedPartitioner = Box<dyn GlobalPartitioner + Send + Sync>;

/// Global partitioning heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitioningHeuristic {
    /// Seeded random balanced split
    #[default]
    Random,
    /// Breadth-first exploration order
    BreadthFirst,
    /// Depth-first exploration order
    DepthFirst,
    /// Best-first frontier with the configured evaluation
    BestFirst,
    /// Best-first frontier preferring nodes that grow the cut least
    BestImprovementFirst,
    /// Exhaustive search (tiny graphs only)
    Optimal,
    /// Initial heuristic refined by pairwise Fiduccia–Mattheyses
    FiducciaMattheyses,
    /// Coarsen, partition with the initial heuristic, refine while expanding
    Multilevel,
}

impl PartitioningHeuristic {
    /// Whether the heuristic wraps another heuristic
    pub fn is_composite(self) -> bool {
        matches!(
            self,
            PartitioningHeuristic::FiducciaMattheyses | PartitioningHeuristic::Multilevel
        )
    }
}

/// Matching generator used for multilevel coarsening
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingKind {
    /// Random unmatched neighbor
    Random,
    /// Heaviest edge to an unmatched neighbor
    #[default]
    HeavyEdge,
}

/// Partitioner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionerConfig {
    /// Global heuristic
    pub heuristic: PartitioningHeuristic,
    /// Evaluation function of [`PartitioningHeuristic::BestFirst`]
    pub evaluation: Evaluation,
    /// Seed heuristic of the composite heuristics
    pub initial_heuristic: PartitioningHeuristic,
    /// Matching generator for multilevel coarsening
    pub matching: MatchingKind,
    /// Gain function of the k-way refiner
    pub gain: GainFunction,
    /// Balance criterion, at least 1.0
    pub balance: f64,
    /// Seed for all randomized components
    pub seed: u64,
    /// Maximum k-way refinement rounds per level
    pub max_refinement_rounds: usize,
    /// Rounds without gain before k-way refinement stops
    pub refinement_patience: usize,
    /// Coarsening stops at `coarsen_factor × k` nodes
    pub coarsen_factor: usize,
}

impl Default for PartitionerConfig {
    fn default() -> Self {
        Self {
            heuristic: PartitioningHeuristic::Random,
            evaluation: Evaluation::BreadthFirst,
            initial_heuristic: PartitioningHeuristic::BestImprovementFirst,
            matching: MatchingKind::HeavyEdge,
            gain: GainFunction::EdgeCut,
            balance: 1.5,
            seed: 0,
            max_refinement_rounds: 10,
            refinement_patience: 2,
            coarsen_factor: DEFAULT_COARSEN_FACTOR,
        }
    }
}

impl PartitionerConfig {
    /// Configuration for a heuristic with default parameters
    pub fn new(heuristic: PartitioningHeuristic) -> Self {
        Self {
            heuristic,
            ..Self::default()
        }
    }

    /// Set the seed heuristic of composite heuristics
    pub fn initial_heuristic(mut self, heuristic: PartitioningHeuristic) -> Self {
        self.initial_heuristic = heuristic;
        self
    }

    /// Set the best-first evaluation function
    pub fn evaluation(mut self, evaluation: Evaluation) -> Self {
        self.evaluation = evaluation;
        self
    }

    /// Set the matching generator
    pub fn matching(mut self, matching: MatchingKind) -> Self {
        self.matching = matching;
        self
    }

    /// Set the k-way gain function
    pub fn gain(mut self, gain: GainFunction) -> Self {
        self.gain = gain;
        self
    }

    /// Set the balance criterion
    pub fn balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the multilevel coarsening factor
    pub fn coarsen_factor(mut self, factor: usize) -> Self {
        self.coarsen_factor = factor;
        self
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<()> {
        check_balance(self.balance)?;
        if self.initial_heuristic.is_composite() {
            return Err(PartitionError::InvalidConfig(format!(
                "initial heuristic {:?} must not be composite",
                self.initial_heuristic
            )));
        }
        if self.coarsen_factor == 0 {
            return Err(PartitionError::InvalidConfig(
                "coarsen_factor must be at least 1".to_string(),
            ));
        }
        if self.max_refinement_rounds == 0 || self.refinement_patience == 0 {
            return Err(PartitionError::InvalidConfig(
                "refinement rounds and patience must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn refiner(&self) -> KWayRefiner {
        KWayRefiner::new(self.gain)
            .with_balance(self.balance)
            .with_max_rounds(self.max_refinement_rounds)
            .with_patience(self.refinement_patience)
            .with_seed(self.seed)
    }

    fn matching_generator(&self) -> Box<dyn MatchingGenerator> {
        match self.matching {
            MatchingKind::Random => Box::new(RandomMatching::new(self.seed)),
            MatchingKind::HeavyEdge => Box::new(HeavyEdgeMatching::new(self.seed)),
        }
    }
}

fn build_simple(heuristic: PartitioningHeuristic, config: &PartitionerConfig) -> Result<BoxedPartitioner> {
    let partitioner: BoxedPartitioner = match heuristic {
        PartitioningHeuristic::Random => Box::new(RandomPartitioner::new(config.seed)),
        PartitioningHeuristic::BreadthFirst => Box::new(ExplorationPartitioner::breadth_first()),
        PartitioningHeuristic::DepthFirst => Box::new(ExplorationPartitioner::depth_first()),
        PartitioningHeuristic::BestFirst => Box::new(BestFirstPartitioner::new(config.evaluation)),
        PartitioningHeuristic::BestImprovementFirst => {
            Box::new(BestFirstPartitioner::new(Evaluation::BestImprovementFirst))
        }
        PartitioningHeuristic::Optimal => Box::new(OptimalPartitioner::new()),
        PartitioningHeuristic::FiducciaMattheyses | PartitioningHeuristic::Multilevel => {
            return Err(PartitionError::InvalidConfig(format!(
                "{heuristic:?} cannot seed another heuristic"
            )))
        }
    };
    Ok(partitioner)
}

/// Build the partitioner a configuration describes
///
/// # Errors
///
/// Any error of [`PartitionerConfig::validate`].
pub fn build_partitioner(config: &PartitionerConfig) -> Result<BoxedPartitioner> {
    config.validate()?;
    let partitioner: BoxedPartitioner = match config.heuristic {
        PartitioningHeuristic::FiducciaMattheyses => Box::new(
            FiducciaMattheysesPartitioner::new(
                build_simple(config.initial_heuristic, config)?,
                config.balance,
            )?
            .with_max_rounds(config.max_refinement_rounds),
        ),
        PartitioningHeuristic::Multilevel => Box::new(
            MultilevelPartitioner::new(
                config.matching_generator(),
                build_simple(config.initial_heuristic, config)?,
                config.refiner(),
            )
            .with_coarsen_factor(config.coarsen_factor),
        ),
        simple => build_simple(simple, config)?,
    };
    Ok(partitioner)
}
