//! Location multimap over a state table

use std::collections::HashMap;
use std::hash::Hash;

use crate::analysis::Analysis;
use crate::error::AnalysisError;

/// Location → indices of the states at that location
#[derive(Debug, Clone)]
pub(crate) struct LocationIndex<L> {
    map: HashMap<L, Vec<usize>>,
}

impl<L: Eq + Hash> Default for LocationIndex<L> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<L: Eq + Hash> LocationIndex<L> {
    /// Index every state of a table
    pub(crate) fn build<A>(analysis: &A, states: &[A::State]) -> Self
    where
        A: Analysis<Location = L>,
    {
        let mut index = Self::default();
        for (i, state) in states.iter().enumerate() {
            index.insert(analysis.location(state), i);
        }
        index
    }

    pub(crate) fn insert(&mut self, location: L, state: usize) {
        self.map.entry(location).or_default().push(state);
    }

    pub(crate) fn at(&self, location: &L) -> &[usize] {
        self.map.get(location).map_or(&[], Vec::as_slice)
    }
}

/// Coverage of `state` by the indexed states at `location`
///
/// An empty candidate set never covers.
pub(crate) fn covered_by<A: Analysis>(
    analysis: &A,
    precision: &A::Precision,
    state: &A::State,
    states: &[A::State],
    candidates: &[usize],
) -> Result<bool, AnalysisError> {
    if candidates.is_empty() {
        return Ok(false);
    }
    let refs: Vec<&A::State> = candidates.iter().map(|&i| &states[i]).collect();
    analysis.is_covered(state, &refs, precision)
}
