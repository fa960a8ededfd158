//! Barrier-synchronized workers over the whole state table
//!
//! Phase 1 indexes every state by location. The barrier leader freezes the
//! index, and phase 2 checks that each state's successors are covered by the
//! states at their location. Workers claim states from a shared counter
//! ([`LoadDistribution::Dynamic`]) or a fixed range
//! ([`LoadDistribution::Static`]). A worker that sees the abort flag stops
//! claiming but still passes both barriers, and so does a worker whose
//! analysis panicked.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Barrier, OnceLock};
use std::thread;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::PhaseResult;
use crate::analysis::Analysis;
use crate::config::LoadDistribution;
use crate::index::{covered_by, LocationIndex};
use crate::outcome::Rejection;
use crate::reached::ReachedSet;
use crate::shared::{Aggregate, ShutdownNotifier};

/// Indices claimed by one worker
struct Claims<'a> {
    counter: Option<&'a AtomicUsize>,
    next: usize,
    end: usize,
}

impl<'a> Claims<'a> {
    fn new(
        distribution: LoadDistribution,
        counter: &'a AtomicUsize,
        worker: usize,
        workers: usize,
        len: usize,
    ) -> Self {
        match distribution {
            LoadDistribution::Dynamic => Self {
                counter: Some(counter),
                next: 0,
                end: len,
            },
            LoadDistribution::Static => Self {
                counter: None,
                next: worker * len / workers,
                end: (worker + 1) * len / workers,
            },
        }
    }
}

impl Iterator for Claims<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let index = match self.counter {
            Some(counter) => counter.fetch_add(1, Ordering::Relaxed),
            None => {
                let index = self.next;
                self.next += 1;
                index
            }
        };
        (index < self.end).then_some(index)
    }
}

/// Shared state of one run
struct Run<'a, A: Analysis> {
    analysis: &'a A,
    precision: A::Precision,
    states: &'a [A::State],
    distribution: LoadDistribution,
    workers: usize,
    shutdown: &'a ShutdownNotifier,
    barrier: Barrier,
    building: Mutex<LocationIndex<A::Location>>,
    frozen: OnceLock<LocationIndex<A::Location>>,
    indexing: AtomicUsize,
    checking: AtomicUsize,
    successor_computations: AtomicUsize,
    rejection: Mutex<Option<Rejection>>,
}

impl<A: Analysis> Run<'_, A> {
    fn fail(&self, rejection: Rejection) {
        warn!(%rejection, "reached-set check failed");
        let mut slot = self.rejection.lock();
        if slot.is_none() {
            *slot = Some(rejection);
        }
        self.shutdown.signal_violation();
    }

    fn claims<'s>(&'s self, counter: &'s AtomicUsize, worker: usize) -> Claims<'s> {
        Claims::new(self.distribution, counter, worker, self.workers, self.states.len())
    }

    /// Run `phase`, turning a panic into a rejection so the barriers are
    /// still reached
    fn guarded(&self, phase: impl FnOnce()) {
        if panic::catch_unwind(AssertUnwindSafe(phase)).is_err() {
            self.fail(Rejection::Computation {
                partition: None,
                message: "worker panicked".into(),
            });
        }
    }

    fn worker(&self, worker: usize) {
        self.guarded(|| self.index_claimed(worker));

        if self.barrier.wait().is_leader() {
            let index = std::mem::take(&mut *self.building.lock());
            let _ = self.frozen.set(index);
        }
        self.barrier.wait();

        self.guarded(|| self.check_claimed(worker));
    }

    /// Phase 1: publish the location of every claimed state
    fn index_claimed(&self, worker: usize) {
        let mut located = Vec::new();
        for i in self.claims(&self.indexing, worker) {
            if self.shutdown.is_set() {
                break;
            }
            located.push((self.analysis.location(&self.states[i]), i));
        }
        let mut building = self.building.lock();
        for (location, i) in located {
            building.insert(location, i);
        }
    }

    /// Phase 2: every successor must be covered at its location
    fn check_claimed(&self, worker: usize) {
        let Some(index) = self.frozen.get() else {
            return;
        };
        let mut computations = 0;
        for i in self.claims(&self.checking, worker) {
            if self.shutdown.is_set() {
                break;
            }
            let successors = match self.analysis.successors(&self.states[i], &self.precision) {
                Ok(successors) => successors,
                Err(err) => {
                    self.fail(Rejection::Computation {
                        partition: None,
                        message: err.to_string(),
                    });
                    break;
                }
            };
            computations += 1;

            for successor in successors {
                let candidates = index.at(&self.analysis.location(&successor));
                match covered_by(self.analysis, &self.precision, &successor, self.states, candidates) {
                    Ok(true) => {}
                    Ok(false) => {
                        self.fail(Rejection::UncoveredObligation {
                            partition: None,
                            state: format!("{successor:?}"),
                        });
                        break;
                    }
                    Err(err) => {
                        self.fail(Rejection::Computation {
                            partition: None,
                            message: err.to_string(),
                        });
                        break;
                    }
                }
            }
        }
        self.successor_computations
            .fetch_add(computations, Ordering::Relaxed);
        debug!(worker, computations, "reached-set worker finished");
    }
}

/// Check a whole certificate with `threads` barrier-synchronized workers
pub(crate) fn run<A: Analysis>(
    analysis: &A,
    reached: &ReachedSet<A::State>,
    threads: usize,
    distribution: LoadDistribution,
    shutdown: &ShutdownNotifier,
) -> PhaseResult<A::State, A::Location> {
    let workers = threads.clamp(1, reached.len().max(1));
    let run = Run {
        analysis,
        precision: analysis.initial_precision(),
        states: reached.states(),
        distribution,
        workers,
        shutdown,
        barrier: Barrier::new(workers),
        building: Mutex::new(LocationIndex::default()),
        frozen: OnceLock::new(),
        indexing: AtomicUsize::new(0),
        checking: AtomicUsize::new(0),
        successor_computations: AtomicUsize::new(0),
        rejection: Mutex::new(None),
    };

    info!(states = reached.len(), workers, ?distribution, "starting reached-set check");
    thread::scope(|scope| {
        for worker in 0..workers {
            let run = &run;
            scope.spawn(move || run.worker(worker));
        }
    });

    if let Some(rejection) = run.rejection.lock().take() {
        return Err(rejection);
    }
    if shutdown.is_set() {
        info!("reached-set check cancelled");
        return Err(Rejection::Cancelled);
    }

    let successor_computations = run.successor_computations.load(Ordering::Relaxed);
    let index = run.frozen.into_inner().unwrap_or_default();
    Ok(Aggregate {
        certificate: reached.states().to_vec(),
        own_index: index.clone(),
        index,
        must_be_covered: Vec::new(),
        successor_computations,
        added_states: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_claims_partition_the_range() {
        let counter = AtomicUsize::new(0);
        let mut all: Vec<usize> = (0..3)
            .flat_map(|w| Claims::new(LoadDistribution::Static, &counter, w, 3, 10).collect::<Vec<_>>())
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_dynamic_claims_share_a_counter() {
        let counter = AtomicUsize::new(0);
        let mut a = Claims::new(LoadDistribution::Dynamic, &counter, 0, 2, 3);
        let mut b = Claims::new(LoadDistribution::Dynamic, &counter, 1, 2, 3);
        assert_eq!(a.next(), Some(0));
        assert_eq!(b.next(), Some(1));
        assert_eq!(a.next(), Some(2));
        assert_eq!(b.next(), None);
    }
}
