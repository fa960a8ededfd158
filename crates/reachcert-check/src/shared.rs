//! Shared state of a parallel check
//!
//! - [`SharedAggregate`]: the only state several workers mutate. One mutex
//!   guards the aggregated certificate, its location index and the
//!   must-be-covered obligations together.
//! - [`ShutdownNotifier`]: the cooperative abort flag.
//! - [`Semaphore`]: counting gate between workers and the coordinator.

use std::hash::Hash;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::index::LocationIndex;
use crate::outcome::Rejection;

/// A partition's published result
#[derive(Debug, Clone)]
pub struct PartitionContribution<S> {
    /// Partition index
    pub partition: usize,
    /// Own states followed by the states recomputation added
    pub certificate: Vec<S>,
    /// Number of own states at the front of `certificate`
    pub own_count: usize,
    /// Successors covered only with help of the boundary
    pub must_be_covered: Vec<S>,
    /// Number of successor computations performed
    pub successor_computations: usize,
}

impl<S> PartitionContribution<S> {
    /// States recomputation added beyond the partition's own states
    pub fn added_states(&self) -> usize {
        self.certificate.len() - self.own_count
    }
}

/// Everything published by all partitions
#[derive(Debug)]
pub struct Aggregate<S, L> {
    /// Union of all partition certificates
    pub certificate: Vec<S>,
    pub(crate) index: LocationIndex<L>,
    /// Positions of the partitions' own states only
    pub(crate) own_index: LocationIndex<L>,
    /// Obligations collected from every partition
    pub must_be_covered: Vec<S>,
    /// Sum of successor computations
    pub successor_computations: usize,
    /// Sum of states added by recomputation
    pub added_states: usize,
}

impl<S, L: Eq + Hash> Default for Aggregate<S, L> {
    fn default() -> Self {
        Self {
            certificate: Vec::new(),
            index: LocationIndex::default(),
            own_index: LocationIndex::default(),
            must_be_covered: Vec::new(),
            successor_computations: 0,
            added_states: 0,
        }
    }
}

/// Mutex-guarded aggregate with a lock-free count of published states
#[derive(Debug)]
pub struct SharedAggregate<S, L> {
    inner: Mutex<Aggregate<S, L>>,
    published: AtomicUsize,
    rejection: Mutex<Option<Rejection>>,
}

impl<S, L: Eq + Hash> Default for SharedAggregate<S, L> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Aggregate::default()),
            published: AtomicUsize::new(0),
            rejection: Mutex::new(None),
        }
    }
}

impl<S, L: Eq + Hash> SharedAggregate<S, L> {
    /// Create an empty aggregate
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a contribution
    ///
    /// `locations` must hold the location of every certificate state, in
    /// order. It is computed by the caller so the lock covers only the append.
    pub fn publish(&self, contribution: PartitionContribution<S>, locations: Vec<L>)
    where
        L: Clone,
    {
        let added = contribution.added_states();
        let count = contribution.certificate.len();
        let own_count = contribution.own_count;
        {
            let mut inner = self.inner.lock();
            let offset = inner.certificate.len();
            for (i, location) in locations.into_iter().enumerate() {
                if i < own_count {
                    inner.own_index.insert(location.clone(), offset + i);
                }
                inner.index.insert(location, offset + i);
            }
            inner.certificate.extend(contribution.certificate);
            inner.must_be_covered.extend(contribution.must_be_covered);
            inner.successor_computations += contribution.successor_computations;
            inner.added_states += added;
        }
        self.published.fetch_add(count, Ordering::AcqRel);
    }

    /// Certificate states published so far
    pub fn published_count(&self) -> usize {
        self.published.load(Ordering::Acquire)
    }

    /// Record a rejection; the first one wins
    pub fn reject(&self, rejection: Rejection) {
        let mut slot = self.rejection.lock();
        if slot.is_none() {
            *slot = Some(rejection);
        }
    }

    /// The recorded rejection, if any
    pub fn rejection(&self) -> Option<Rejection> {
        self.rejection.lock().clone()
    }

    /// Take the aggregate out, leaving an empty one behind
    pub fn take(&self) -> Aggregate<S, L> {
        std::mem::take(&mut *self.inner.lock())
    }
}

/// Why a check was aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// A worker found a violation or failed
    Violation,
    /// Someone outside the check asked it to stop
    Requested,
}

#[derive(Debug, Default)]
struct ShutdownInner {
    flag: AtomicBool,
    reason: Mutex<Option<ShutdownReason>>,
}

/// Shared abort flag, cheap to clone
///
/// A [`child`](Self::child) sees its parent's shutdown, but its own
/// shutdown stays local.
#[derive(Debug, Clone, Default)]
pub struct ShutdownNotifier {
    inner: Arc<ShutdownInner>,
    parent: Option<Arc<ShutdownInner>>,
}

impl ShutdownNotifier {
    /// Create an unset notifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh notifier that also observes this one
    pub fn child(&self) -> Self {
        Self {
            inner: Arc::default(),
            parent: Some(Arc::clone(&self.inner)),
        }
    }

    /// Ask the check to stop
    pub fn request_shutdown(&self) {
        self.set(ShutdownReason::Requested);
    }

    /// Abort because of a violation
    pub fn signal_violation(&self) {
        self.set(ShutdownReason::Violation);
    }

    fn set(&self, reason: ShutdownReason) {
        let mut slot = self.inner.reason.lock();
        if slot.is_none() {
            *slot = Some(reason);
        }
        self.inner.flag.store(true, Ordering::Release);
    }

    /// Whether the flag is set here or on the parent
    pub fn is_set(&self) -> bool {
        self.inner.flag.load(Ordering::Acquire)
            || self
                .parent
                .as_ref()
                .is_some_and(|parent| parent.flag.load(Ordering::Acquire))
    }

    /// Reason of the first shutdown
    pub fn reason(&self) -> Option<ShutdownReason> {
        let own = *self.inner.reason.lock();
        own.or_else(|| self.parent.as_ref().and_then(|parent| *parent.reason.lock()))
    }
}

/// Counting semaphore over a mutex and a condition variable
#[derive(Debug, Default)]
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    /// Create a semaphore with `permits` initial permits
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Add `n` permits and wake waiters
    pub fn release(&self, n: usize) {
        let mut permits = self.permits.lock();
        *permits += n;
        self.available.notify_all();
    }

    /// Block until `n` permits are available, then take them
    pub fn acquire(&self, n: usize) {
        let mut permits = self.permits.lock();
        while *permits < n {
            self.available.wait(&mut permits);
        }
        *permits -= n;
    }

    /// Permits currently available
    pub fn available_permits(&self) -> usize {
        *self.permits.lock()
    }
}
