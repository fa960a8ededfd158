//! Collaborator contracts: the program analysis and the property checker
//!
//! The checker never inspects states itself. It replays successor
//! computation and coverage through [`Analysis`] and decides safety through
//! [`PropertyChecker`].

use std::fmt::Debug;
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::AnalysisError;

/// Transfer relation, coverage test and location extraction of an analysis
pub trait Analysis: Send + Sync {
    /// Abstract state
    type State: Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static;
    /// Analysis precision passed to the transfer relation
    type Precision: Clone + Debug + Send + Sync + 'static;
    /// Program location used to group coverage candidates
    type Location: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// State the analysis starts from
    fn initial_state(&self) -> Self::State;

    /// Precision the analysis starts with
    fn initial_precision(&self) -> Self::Precision;

    /// Abstract successors of a state
    fn successors(
        &self,
        state: &Self::State,
        precision: &Self::Precision,
    ) -> Result<Vec<Self::State>, AnalysisError>;

    /// Whether `state` is subsumed by the candidates (all at its location)
    fn is_covered(
        &self,
        state: &Self::State,
        candidates: &[&Self::State],
        precision: &Self::Precision,
    ) -> Result<bool, AnalysisError>;

    /// Location key of a state
    fn location(&self, state: &Self::State) -> Self::Location;
}

/// Safety property over a set of states
pub trait PropertyChecker<S>: Send + Sync {
    /// Whether the states satisfy the property
    fn satisfies_property(&self, states: &[S]) -> bool;
}

impl<S, F> PropertyChecker<S> for F
where
    F: Fn(&[S]) -> bool + Send + Sync,
{
    fn satisfies_property(&self, states: &[S]) -> bool {
        self(states)
    }
}
