//! Shared helpers for the reachcert-check integration tests.
//!
//! Provides small guarded counter programs, failing and panicking analysis
//! wrappers and checker constructors used across the test modules.

#![allow(dead_code)]

use std::collections::BTreeSet;

use reachcert_check::interval::{
    Interval, IntervalAnalysis, IntervalProgram, IntervalProperty, IntervalState, Transition,
};
use reachcert_check::prelude::*;
use reachcert_check::AnalysisError;
use reachcert_partition::{PartitionerConfig, PartitioningHeuristic};

// ---------------------------------------------------------------------------
// Programs
// ---------------------------------------------------------------------------

/// `x` counts from 0 to `limit` at location 0, then moves to location 1.
pub fn counter(limit: i64) -> IntervalProgram {
    IntervalProgram {
        initial_location: 0,
        initial_value: Interval::point(0),
        transitions: vec![
            Transition { from: 0, to: 0, guard: Interval::new(0, limit - 1), delta: 1 },
            Transition { from: 0, to: 1, guard: Some(Interval::point(limit)), delta: 0 },
        ],
        error_locations: BTreeSet::from([9]),
    }
}

/// Two interleaved loops: location 0 counts up, location 1 mirrors it and
/// jumps two steps ahead back into location 0.
pub fn interleaved(limit: i64) -> IntervalProgram {
    let guard = Interval::new(0, limit - 1);
    IntervalProgram {
        initial_location: 0,
        initial_value: Interval::point(0),
        transitions: vec![
            Transition { from: 0, to: 0, guard, delta: 1 },
            Transition { from: 0, to: 1, guard, delta: 0 },
            Transition { from: 1, to: 0, guard, delta: 2 },
            Transition { from: 0, to: 2, guard: Some(Interval::point(limit)), delta: 0 },
        ],
        error_locations: BTreeSet::from([9]),
    }
}

/// Location 0 branches to 1 and 2, which both join at 3.
pub fn diamond() -> IntervalProgram {
    let step = |from, to| Transition { from, to, guard: None, delta: 0 };
    IntervalProgram {
        initial_location: 0,
        initial_value: Interval::point(0),
        transitions: vec![step(0, 1), step(0, 2), step(1, 3), step(2, 3)],
        error_locations: BTreeSet::from([9]),
    }
}

/// `x` increments forever at location 0.
pub fn unbounded() -> IntervalProgram {
    IntervalProgram {
        initial_location: 0,
        initial_value: Interval::point(0),
        transitions: vec![Transition { from: 0, to: 0, guard: None, delta: 1 }],
        error_locations: BTreeSet::new(),
    }
}

pub fn at(location: u32, value: i64) -> IntervalState {
    IntervalState::new(location, Interval::point(value))
}

/// Closed certificate of a program
pub fn explore(program: &IntervalProgram) -> ReachedSet<IntervalState> {
    ReachedSet::explore(&program.analysis(), 10_000).unwrap()
}

// ---------------------------------------------------------------------------
// Checkers
// ---------------------------------------------------------------------------

pub fn config(threads: usize, max_elements: usize, heuristic: PartitioningHeuristic) -> CheckerConfig {
    CheckerConfig::new()
        .threads(threads)
        .max_elements_per_partition(max_elements)
        .partitioner(PartitionerConfig::new(heuristic).seed(7))
}

pub fn checker(
    program: &IntervalProgram,
    config: CheckerConfig,
) -> CertificateChecker<IntervalAnalysis, IntervalProperty> {
    CertificateChecker::new(program.analysis(), program.property(), config).unwrap()
}

// ---------------------------------------------------------------------------
// Failing analysis
// ---------------------------------------------------------------------------

/// Interval analysis whose transfer relation fails on one state
pub struct FailingAnalysis {
    pub inner: IntervalAnalysis,
    pub fail_on: IntervalState,
}

impl Analysis for FailingAnalysis {
    type State = IntervalState;
    type Precision = ();
    type Location = u32;

    fn initial_state(&self) -> IntervalState {
        self.inner.initial_state()
    }

    fn initial_precision(&self) {}

    fn successors(
        &self,
        state: &IntervalState,
        precision: &(),
    ) -> std::result::Result<Vec<IntervalState>, AnalysisError> {
        if *state == self.fail_on {
            return Err(AnalysisError::Transfer(format!("cannot step from {}", state.value)));
        }
        self.inner.successors(state, precision)
    }

    fn is_covered(
        &self,
        state: &IntervalState,
        candidates: &[&IntervalState],
        precision: &(),
    ) -> std::result::Result<bool, AnalysisError> {
        self.inner.is_covered(state, candidates, precision)
    }

    fn location(&self, state: &IntervalState) -> u32 {
        state.location
    }
}

// ---------------------------------------------------------------------------
// Panicking analysis
// ---------------------------------------------------------------------------

/// Interval analysis that panics when asked for one state's location
pub struct PanickingAnalysis {
    pub inner: IntervalAnalysis,
    pub panic_on: IntervalState,
}

impl Analysis for PanickingAnalysis {
    type State = IntervalState;
    type Precision = ();
    type Location = u32;

    fn initial_state(&self) -> IntervalState {
        self.inner.initial_state()
    }

    fn initial_precision(&self) {}

    fn successors(
        &self,
        state: &IntervalState,
        precision: &(),
    ) -> std::result::Result<Vec<IntervalState>, AnalysisError> {
        self.inner.successors(state, precision)
    }

    fn is_covered(
        &self,
        state: &IntervalState,
        candidates: &[&IntervalState],
        precision: &(),
    ) -> std::result::Result<bool, AnalysisError> {
        self.inner.is_covered(state, candidates, precision)
    }

    fn location(&self, state: &IntervalState) -> u32 {
        assert_ne!(*state, self.panic_on, "no location for {}", state.value);
        state.location
    }
}
