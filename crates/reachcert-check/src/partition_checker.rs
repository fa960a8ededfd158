//! Closure check of a single partition
//!
//! The local certificate starts as the partition's own states. Every
//! certificate state gets its successors recomputed; a successor is
//!
//! 1. covered by the local certificate at its location: nothing to do,
//! 2. covered only with help of the boundary states: a must-be-covered
//!    obligation for the global phase,
//! 3. otherwise: appended to the certificate and queued.
//!
//! The bound is checked before the worklist starts, after every append and
//! once more before the contribution is handed back. Exceeding it means
//! recomputation diverged from the supplied certificate, and the partition
//! fails.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::analysis::Analysis;
use crate::index::{covered_by, LocationIndex};
use crate::layout::PartitionBlock;
use crate::outcome::Rejection;
use crate::shared::{PartitionContribution, SharedAggregate, ShutdownNotifier};

/// Result of checking one partition
#[derive(Debug, Clone)]
pub enum PartitionResult<S> {
    /// Closure holds locally; publish the contribution
    Completed(PartitionContribution<S>),
    /// The partition failed
    Rejected(Rejection),
}

/// Sequential closure check of one partition
pub struct PartitionChecker<'a, A: Analysis> {
    partition: usize,
    analysis: &'a A,
    precision: &'a A::Precision,
    block: &'a PartitionBlock<A::State>,
    bound: usize,
    shared: &'a SharedAggregate<A::State, A::Location>,
    shutdown: &'a ShutdownNotifier,
}

impl<'a, A: Analysis> PartitionChecker<'a, A> {
    /// Create a checker for partition `partition`
    ///
    /// `bound` is the size of the original certificate; `shared` provides
    /// the number of states other partitions already published.
    pub fn new(
        partition: usize,
        analysis: &'a A,
        precision: &'a A::Precision,
        block: &'a PartitionBlock<A::State>,
        bound: usize,
        shared: &'a SharedAggregate<A::State, A::Location>,
        shutdown: &'a ShutdownNotifier,
    ) -> Self {
        Self {
            partition,
            analysis,
            precision,
            block,
            bound,
            shared,
            shutdown,
        }
    }

    fn computation(&self, err: impl ToString) -> PartitionResult<A::State> {
        PartitionResult::Rejected(Rejection::Computation {
            partition: Some(self.partition),
            message: err.to_string(),
        })
    }

    /// Overflow when `len` local states plus everything already published
    /// exceed the bound
    fn overflow(&self, len: usize) -> Option<PartitionResult<A::State>> {
        let states = len + self.shared.published_count();
        (states > self.bound).then(|| {
            PartitionResult::Rejected(Rejection::Overflow {
                partition: Some(self.partition),
                states,
                bound: self.bound,
            })
        })
    }

    /// Run the closure check
    pub fn check(self) -> PartitionResult<A::State> {
        let analysis = self.analysis;
        let mut certificate: Vec<A::State> = self.block.own.clone();
        let mut local = LocationIndex::build(analysis, &certificate);
        let boundary_index = LocationIndex::build(analysis, &self.block.boundary);
        let own_count = certificate.len();
        if let Some(overflow) = self.overflow(own_count) {
            return overflow;
        }

        let mut worklist: VecDeque<usize> = (0..own_count).collect();
        let mut must_be_covered = Vec::new();
        let mut successor_computations = 0;

        while let Some(current) = worklist.pop_front() {
            if self.shutdown.is_set() {
                debug!(partition = self.partition, "partition check aborted");
                return PartitionResult::Rejected(Rejection::Cancelled);
            }

            let successors = match analysis.successors(&certificate[current], self.precision) {
                Ok(successors) => successors,
                Err(err) => return self.computation(err),
            };
            successor_computations += 1;

            for successor in successors {
                let location = analysis.location(&successor);
                let candidates = local.at(&location);
                match covered_by(analysis, self.precision, &successor, &certificate, candidates) {
                    Ok(true) => continue,
                    Ok(false) => {}
                    Err(err) => return self.computation(err),
                }

                let external = boundary_index.at(&location);
                if !external.is_empty() {
                    let mut combined: Vec<&A::State> =
                        candidates.iter().map(|&i| &certificate[i]).collect();
                    combined.extend(external.iter().map(|&i| &self.block.boundary[i]));
                    match analysis.is_covered(&successor, &combined, self.precision) {
                        Ok(true) => {
                            trace!(partition = self.partition, ?successor, "boundary obligation");
                            must_be_covered.push(successor);
                            continue;
                        }
                        Ok(false) => {}
                        Err(err) => return self.computation(err),
                    }
                }

                let added = certificate.len();
                certificate.push(successor);
                local.insert(location, added);
                worklist.push_back(added);

                if let Some(overflow) = self.overflow(certificate.len()) {
                    return overflow;
                }
            }
        }

        if let Some(overflow) = self.overflow(certificate.len()) {
            return overflow;
        }

        debug!(
            partition = self.partition,
            own = own_count,
            added = certificate.len() - own_count,
            obligations = must_be_covered.len(),
            "partition closed"
        );
        PartitionResult::Completed(PartitionContribution {
            partition: self.partition,
            certificate,
            own_count,
            must_be_covered,
            successor_computations,
        })
    }
}
