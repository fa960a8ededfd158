//! Interval analysis over guarded counter programs
//!
//! A program is a set of locations joined by transitions. Each transition
//! may restrict the counter to a guard interval and then adds a constant.
//! States are `(location, interval)`; a state is covered when the union of
//! the candidate intervals at its location contains its interval.
//!
//! ```
//! use reachcert_check::interval::IntervalProgram;
//!
//! let program = IntervalProgram::from_json(
//!     r#"{
//!         "initial_location": 0,
//!         "initial_value": {"lo": 0, "hi": 0},
//!         "transitions": [{"from": 0, "to": 0, "guard": {"lo": 0, "hi": 2}, "delta": 1}],
//!         "error_locations": [7]
//!     }"#,
//! )
//! .unwrap();
//! assert_eq!(program.transitions.len(), 1);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::{Analysis, PropertyChecker};
use crate::error::{AnalysisError, CheckError, Result};

/// Closed integer interval `[lo, hi]`, never empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound
    pub lo: i64,
    /// Upper bound
    pub hi: i64,
}

impl Interval {
    /// `[lo, hi]`, `None` when `lo > hi`
    pub fn new(lo: i64, hi: i64) -> Option<Self> {
        (lo <= hi).then_some(Self { lo, hi })
    }

    /// The single value `v`
    pub fn point(v: i64) -> Self {
        Self { lo: v, hi: v }
    }

    /// Whether `other` lies inside `self`
    pub fn contains(&self, other: &Interval) -> bool {
        self.lo <= other.lo && other.hi <= self.hi
    }

    /// Intersection
    pub fn meet(&self, other: &Interval) -> Option<Self> {
        Self::new(self.lo.max(other.lo), self.hi.min(other.hi))
    }

    /// Add `delta` to both bounds, saturating at the `i64` range
    pub fn shift(&self, delta: i64) -> Self {
        Self {
            lo: self.lo.saturating_add(delta),
            hi: self.hi.saturating_add(delta),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// Abstract state: a location and the counter's interval there
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntervalState {
    /// Program location
    pub location: u32,
    /// Counter value
    pub value: Interval,
}

impl IntervalState {
    /// State at `location` with counter `value`
    pub fn new(location: u32, value: Interval) -> Self {
        Self { location, value }
    }
}

/// Guarded transition `from -> to` adding `delta`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Source location
    pub from: u32,
    /// Target location
    pub to: u32,
    /// Values allowed to take the transition; all values when absent
    #[serde(default)]
    pub guard: Option<Interval>,
    /// Constant added to the counter
    #[serde(default)]
    pub delta: i64,
}

/// A guarded counter program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalProgram {
    /// Entry location
    pub initial_location: u32,
    /// Counter value at entry
    pub initial_value: Interval,
    /// All transitions
    pub transitions: Vec<Transition>,
    /// Locations that must be unreachable
    #[serde(default)]
    pub error_locations: BTreeSet<u32>,
}

impl IntervalProgram {
    /// Parse and validate a program
    pub fn from_json(json: &str) -> Result<Self> {
        let program: Self = serde_json::from_str(json)?;
        program.validate()?;
        Ok(program)
    }

    /// Read a program from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Reject empty intervals, which deserialization lets through
    pub fn validate(&self) -> Result<()> {
        let check = |what: &str, interval: &Interval| {
            if interval.lo > interval.hi {
                Err(CheckError::Format(format!("{what} {interval} is empty")))
            } else {
                Ok(())
            }
        };
        check("initial value", &self.initial_value)?;
        for transition in &self.transitions {
            if let Some(guard) = &transition.guard {
                check("guard", guard)?;
            }
        }
        Ok(())
    }

    /// Analysis of this program
    pub fn analysis(&self) -> IntervalAnalysis {
        IntervalAnalysis {
            program: self.clone(),
        }
    }

    /// Property that no error location is reached
    pub fn property(&self) -> IntervalProperty {
        IntervalProperty {
            error_locations: self.error_locations.clone(),
        }
    }
}

/// [`Analysis`] over an [`IntervalProgram`]
#[derive(Debug, Clone)]
pub struct IntervalAnalysis {
    program: IntervalProgram,
}

impl IntervalAnalysis {
    /// The analysed program
    pub fn program(&self) -> &IntervalProgram {
        &self.program
    }
}

impl Analysis for IntervalAnalysis {
    type State = IntervalState;
    type Precision = ();
    type Location = u32;

    fn initial_state(&self) -> IntervalState {
        IntervalState::new(self.program.initial_location, self.program.initial_value)
    }

    fn initial_precision(&self) {}

    fn successors(&self, state: &IntervalState, _: &()) -> std::result::Result<Vec<IntervalState>, AnalysisError> {
        Ok(self
            .program
            .transitions
            .iter()
            .filter(|t| t.from == state.location)
            .filter_map(|t| {
                let value = match &t.guard {
                    Some(guard) => state.value.meet(guard)?,
                    None => state.value,
                };
                Some(IntervalState::new(t.to, value.shift(t.delta)))
            })
            .collect())
    }

    fn is_covered(
        &self,
        state: &IntervalState,
        candidates: &[&IntervalState],
        _: &(),
    ) -> std::result::Result<bool, AnalysisError> {
        let mut intervals: Vec<Interval> = candidates
            .iter()
            .filter(|c| c.location == state.location)
            .map(|c| c.value)
            .collect();
        if intervals.iter().any(|i| i.contains(&state.value)) {
            return Ok(true);
        }

        // Sweep the union left to right; i128 keeps `hi + 1` exact
        intervals.sort_unstable_by_key(|i| i.lo);
        let target_hi = i128::from(state.value.hi);
        let mut reached = i128::from(state.value.lo);
        for interval in intervals {
            if i128::from(interval.hi) < reached {
                continue;
            }
            if i128::from(interval.lo) > reached {
                break;
            }
            reached = i128::from(interval.hi) + 1;
            if reached > target_hi {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn location(&self, state: &IntervalState) -> u32 {
        state.location
    }
}

/// No state may sit at an error location
#[derive(Debug, Clone, Default)]
pub struct IntervalProperty {
    error_locations: BTreeSet<u32>,
}

impl PropertyChecker<IntervalState> for IntervalProperty {
    fn satisfies_property(&self, states: &[IntervalState]) -> bool {
        states
            .iter()
            .all(|s| !self.error_locations.contains(&s.location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(location: u32, lo: i64, hi: i64) -> IntervalState {
        IntervalState::new(location, Interval::new(lo, hi).unwrap())
    }

    fn counter(limit: i64) -> IntervalProgram {
        IntervalProgram {
            initial_location: 0,
            initial_value: Interval::point(0),
            transitions: vec![
                Transition { from: 0, to: 0, guard: Interval::new(0, limit - 1), delta: 1 },
                Transition { from: 0, to: 1, guard: Some(Interval::point(limit)), delta: 0 },
            ],
            error_locations: BTreeSet::from([2]),
        }
    }

    #[test]
    fn test_interval_ops() {
        let a = Interval::new(0, 10).unwrap();
        assert!(Interval::new(3, 2).is_none());
        assert_eq!(a.meet(&Interval::new(5, 20).unwrap()), Interval::new(5, 10));
        assert_eq!(a.meet(&Interval::point(11)), None);
        assert_eq!(Interval::point(i64::MAX).shift(1), Interval::point(i64::MAX));
        assert!(a.contains(&Interval::point(10)));
    }

    #[test]
    fn test_successors_respect_guards() {
        let analysis = counter(3).analysis();
        assert_eq!(analysis.successors(&at(0, 0, 0), &()).unwrap(), vec![at(0, 1, 1)]);
        assert_eq!(analysis.successors(&at(0, 3, 3), &()).unwrap(), vec![at(1, 3, 3)]);
        assert_eq!(
            analysis.successors(&at(0, 2, 5), &()).unwrap(),
            vec![at(0, 3, 3), at(1, 3, 3)]
        );
        assert!(analysis.successors(&at(1, 3, 3), &()).unwrap().is_empty());
    }

    #[test]
    fn test_set_coverage() {
        let analysis = counter(3).analysis();
        let (a, b, c) = (at(0, 0, 2), at(0, 3, 5), at(1, 0, 10));
        assert!(analysis.is_covered(&at(0, 1, 4), &[&b, &a], &()).unwrap());
        assert!(!analysis.is_covered(&at(0, 1, 6), &[&a, &b], &()).unwrap());
        // Wrong location never covers
        assert!(!analysis.is_covered(&at(0, 1, 1), &[&c], &()).unwrap());
        assert!(!analysis.is_covered(&at(0, 1, 1), &[], &()).unwrap());

        let edge = at(0, i64::MAX - 1, i64::MAX);
        let halves = [at(0, i64::MAX - 1, i64::MAX - 1), at(0, i64::MAX, i64::MAX)];
        assert!(analysis.is_covered(&edge, &[&halves[0], &halves[1]], &()).unwrap());
    }

    #[test]
    fn test_property() {
        let property = counter(3).property();
        assert!(property.satisfies_property(&[at(0, 0, 0), at(1, 3, 3)]));
        assert!(!property.satisfies_property(&[at(2, 0, 0)]));
    }

    #[test]
    fn test_from_json_rejects_empty_guard() {
        let err = IntervalProgram::from_json(
            r#"{"initial_location": 0, "initial_value": {"lo": 0, "hi": 0},
                "transitions": [{"from": 0, "to": 1, "guard": {"lo": 4, "hi": 1}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, CheckError::Format(_)));
    }
}
