//! # reachcert-check
//!
//! Parallel re-validation of reachability certificates. A certificate (the
//! [`ReachedSet`] of an earlier analysis run) is accepted when replaying the
//! analysis' successor computation and coverage test shows it is closed, it
//! covers the initial state, and it satisfies the safety property.
//!
//! ## Protocol
//!
//! 1. The certificate's dependency graph is split into balanced partitions
//!    with a [`reachcert_partition`] heuristic.
//! 2. Every partition is checked independently by a [`PartitionChecker`] on a
//!    bounded worker pool. Successors that only boundary states cover become
//!    must-be-covered obligations; results are published into a
//!    [`SharedAggregate`] under a single lock.
//! 3. After every partition has published, the global phase confirms the
//!    initial state, the obligations and the property over the aggregate.
//!
//! The first failing worker raises the [`ShutdownNotifier`] so the others
//! stop early. Computation errors and soundness violations end as
//! [`Verdict::Rejected`], never as `Err`.
//!
//! ## Strategies
//!
//! - [`CheckStrategy::Partitioned`]: the protocol above
//! - [`CheckStrategy::ReachedSet`]: barrier-synchronized workers over the
//!   whole state table, without partitioning
//!
//! ## Modules
//!
//! - [`analysis`]: collaborator traits
//! - [`reached`]: the certificate model
//! - [`layout`]: partition layout and its persisted format
//! - [`partition_checker`]: single-partition closure check
//! - [`shared`]: aggregate, abort flag and semaphore
//! - [`global`]: the global phase
//! - [`checker`]: the [`CertificateChecker`] entry point
//! - [`interval`]: interval analysis of guarded counter programs

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod analysis;
pub mod checker;
pub mod config;
pub mod error;
pub mod global;
mod index;
pub mod interval;
pub mod layout;
pub mod outcome;
pub mod partition_checker;
pub mod reached;
pub mod shared;
pub mod stats;
mod strategy;

pub use analysis::{Analysis, PropertyChecker};
pub use checker::CertificateChecker;
pub use config::{CheckStrategy, CheckerConfig, LoadDistribution};
pub use error::{AnalysisError, CheckError, Result};
pub use global::verify_global;
pub use layout::{PartitionBlock, PartitionLayout, LAYOUT_MAGIC, LAYOUT_VERSION};
pub use outcome::{CheckOutcome, Rejection, Verdict};
pub use partition_checker::{PartitionChecker, PartitionResult};
pub use reached::ReachedSet;
pub use shared::{Aggregate, PartitionContribution, Semaphore, SharedAggregate, ShutdownNotifier, ShutdownReason};
pub use stats::CheckStatistics;

/// Commonly used types
pub mod prelude {
    pub use crate::analysis::{Analysis, PropertyChecker};
    pub use crate::checker::CertificateChecker;
    pub use crate::config::{CheckStrategy, CheckerConfig, LoadDistribution};
    pub use crate::outcome::{CheckOutcome, Rejection, Verdict};
    pub use crate::reached::ReachedSet;
    pub use crate::{CheckError, Result};
}
