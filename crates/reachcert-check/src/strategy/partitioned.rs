//! Fixed worker pool over static partitions
//!
//! One task per partition runs on a bounded rayon pool. A finished task
//! publishes its contribution and releases one permit; a failing task sets
//! the abort flag and releases the full count, so the coordinator waiting on
//! the semaphore is never left behind. Once every permit is back the
//! coordinator checks the aggregated size against the original certificate.

use std::sync::Arc;

use rayon::ThreadPoolBuilder;
use tracing::{debug, info, warn};

use super::PhaseResult;
use crate::analysis::Analysis;
use crate::error::{CheckError, Result};
use crate::layout::PartitionLayout;
use crate::outcome::Rejection;
use crate::partition_checker::{PartitionChecker, PartitionResult};
use crate::shared::{Semaphore, SharedAggregate, ShutdownNotifier};

/// Abort the whole check: record, raise the flag, release every waiter
fn fail<S, L: Eq + std::hash::Hash>(
    shared: &SharedAggregate<S, L>,
    shutdown: &ShutdownNotifier,
    semaphore: &Semaphore,
    permits: usize,
    rejection: Rejection,
) {
    warn!(%rejection, "partition check failed");
    shared.reject(rejection);
    shutdown.signal_violation();
    semaphore.release(permits);
}

/// Check every partition of a layout on a pool of `threads` workers
pub(crate) fn run<A: Analysis + 'static>(
    analysis: Arc<A>,
    layout: Arc<PartitionLayout<A::State>>,
    threads: usize,
    shutdown: &ShutdownNotifier,
) -> Result<PhaseResult<A::State, A::Location>> {
    let count = layout.partition_count();
    let shared: Arc<SharedAggregate<A::State, A::Location>> = Arc::new(SharedAggregate::new());
    let semaphore = Arc::new(Semaphore::new(0));
    let precision = Arc::new(analysis.initial_precision());

    let pool = {
        let shared = Arc::clone(&shared);
        let semaphore = Arc::clone(&semaphore);
        let shutdown = shutdown.clone();
        ThreadPoolBuilder::new()
            .num_threads(threads.clamp(1, count.max(1)))
            .thread_name(|i| format!("reachcert-check-{i}"))
            .panic_handler(move |_| {
                fail(
                    &shared,
                    &shutdown,
                    &semaphore,
                    count,
                    Rejection::Computation {
                        partition: None,
                        message: "worker panicked".into(),
                    },
                );
            })
            .build()
            .map_err(|e| CheckError::Config(format!("failed to build worker pool: {e}")))?
    };

    info!(partitions = count, threads = pool.current_num_threads(), "starting partition checks");
    for partition in 0..count {
        let analysis = Arc::clone(&analysis);
        let precision = Arc::clone(&precision);
        let layout = Arc::clone(&layout);
        let shared = Arc::clone(&shared);
        let semaphore = Arc::clone(&semaphore);
        let shutdown = shutdown.clone();

        pool.spawn(move || {
            if shutdown.is_set() {
                semaphore.release(1);
                return;
            }
            let checker = PartitionChecker::new(
                partition,
                analysis.as_ref(),
                precision.as_ref(),
                &layout.partitions[partition],
                layout.total_state_count,
                shared.as_ref(),
                &shutdown,
            );
            match checker.check() {
                PartitionResult::Completed(contribution) => {
                    let locations = contribution
                        .certificate
                        .iter()
                        .map(|state| analysis.location(state))
                        .collect();
                    shared.publish(contribution, locations);
                    semaphore.release(1);
                }
                PartitionResult::Rejected(Rejection::Cancelled) => {
                    shared.reject(Rejection::Cancelled);
                    semaphore.release(1);
                }
                PartitionResult::Rejected(rejection) => {
                    fail(&shared, &shutdown, &semaphore, count, rejection);
                }
            }
        });
    }

    semaphore.acquire(count);

    if let Some(rejection) = shared.rejection() {
        if rejection == Rejection::Cancelled {
            info!("partition checks cancelled");
        }
        return Ok(Err(rejection));
    }
    if shutdown.is_set() {
        info!("partition checks cancelled");
        return Ok(Err(Rejection::Cancelled));
    }
    let aggregate = shared.take();
    // Partitions only see what was published before their last check
    if aggregate.certificate.len() > layout.total_state_count {
        let rejection = Rejection::Overflow {
            partition: None,
            states: aggregate.certificate.len(),
            bound: layout.total_state_count,
        };
        warn!(%rejection, "aggregated certificate exceeds the original");
        return Ok(Err(rejection));
    }
    debug!(
        states = aggregate.certificate.len(),
        obligations = aggregate.must_be_covered.len(),
        "all partitions published"
    );
    Ok(Ok(aggregate))
}
