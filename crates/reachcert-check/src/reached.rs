//! The reached set: a certificate as a state table plus dependency edges
//!
//! An edge `(i, j)` records that state `j` covers one of the successors of
//! state `i`. The edge list is what partitioning works on; the checker itself
//! only needs the states.

use std::collections::VecDeque;

use reachcert_partition::{GraphBuilder, NodeIndex, WeightedGraph};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analysis::Analysis;
use crate::error::{CheckError, Result};
use crate::index::{covered_by, LocationIndex};

/// A reachability certificate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReachedSet<S> {
    states: Vec<S>,
    edges: Vec<(NodeIndex, NodeIndex)>,
    initial: NodeIndex,
}

impl<S> ReachedSet<S> {
    /// Assemble a certificate, checking every index is in range
    pub fn new(states: Vec<S>, edges: Vec<(NodeIndex, NodeIndex)>, initial: NodeIndex) -> Result<Self> {
        let n = states.len();
        if n == 0 {
            return Err(CheckError::InvalidCertificate("certificate has no states".into()));
        }
        if initial >= n {
            return Err(CheckError::InvalidCertificate(format!(
                "initial state {initial} outside 0..{n}"
            )));
        }
        if let Some(&(u, v)) = edges.iter().find(|&&(u, v)| u >= n || v >= n) {
            return Err(CheckError::InvalidCertificate(format!(
                "edge ({u}, {v}) outside 0..{n}"
            )));
        }
        Ok(Self { states, edges, initial })
    }

    /// Re-run the index checks of [`ReachedSet::new`], e.g. after deserializing
    pub fn validated(self) -> Result<Self> {
        Self::new(self.states, self.edges, self.initial)
    }

    /// Number of states
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the certificate has no states
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All states
    pub fn states(&self) -> &[S] {
        &self.states
    }

    /// All dependency edges
    pub fn edges(&self) -> &[(NodeIndex, NodeIndex)] {
        &self.edges
    }

    /// Index of the initial state
    pub fn initial(&self) -> NodeIndex {
        self.initial
    }

    /// Targets of the dependency edges leaving `state`
    pub fn successors_of(&self, state: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.edges
            .iter()
            .filter(move |&&(u, _)| u == state)
            .map(|&(_, v)| v)
    }

    /// Dependency graph with unit node and edge weights
    pub fn to_weighted_graph(&self) -> Result<WeightedGraph> {
        let mut builder = GraphBuilder::new(self.states.len());
        builder.add_edges(self.edges.iter().map(|&(u, v)| (u, v, 1)))?;
        Ok(builder.build())
    }

    /// Drop a state, remapping indices and removing its edges
    ///
    /// Produces deliberately broken certificates for negative tests.
    pub fn without_state(&self, removed: NodeIndex) -> Result<Self>
    where
        S: Clone,
    {
        if removed == self.initial || removed >= self.states.len() {
            return Err(CheckError::InvalidCertificate(format!(
                "cannot remove state {removed}"
            )));
        }
        let remap = |i: NodeIndex| if i > removed { i - 1 } else { i };
        let states = self
            .states
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != removed)
            .map(|(_, s)| s.clone())
            .collect();
        let edges = self
            .edges
            .iter()
            .filter(|&&(u, v)| u != removed && v != removed)
            .map(|&(u, v)| (remap(u), remap(v)))
            .collect();
        Self::new(states, edges, remap(self.initial))
    }
}

impl<S: Clone> ReachedSet<S> {
    /// Build a closed certificate by worklist exploration
    ///
    /// A successor covered by a single known state gets an edge to it; one
    /// covered only by the set of states at its location gets an edge to
    /// each of them; anything else becomes a new state.
    ///
    /// # Errors
    ///
    /// [`CheckError::ExplorationLimit`] once more than `max_states` states
    /// would be needed, and [`CheckError::Analysis`] if the analysis fails.
    pub fn explore<A>(analysis: &A, max_states: usize) -> Result<Self>
    where
        A: Analysis<State = S>,
    {
        let precision = analysis.initial_precision();
        let initial = analysis.initial_state();
        let mut index = LocationIndex::default();
        index.insert(analysis.location(&initial), 0);

        let mut states = vec![initial];
        let mut edges = Vec::new();
        let mut worklist = VecDeque::from([0]);

        while let Some(current) = worklist.pop_front() {
            for successor in analysis.successors(&states[current], &precision)? {
                let location = analysis.location(&successor);
                let candidates = index.at(&location).to_vec();

                let mut single = None;
                for &candidate in &candidates {
                    if analysis.is_covered(&successor, &[&states[candidate]], &precision)? {
                        single = Some(candidate);
                        break;
                    }
                }
                if let Some(candidate) = single {
                    edges.push((current, candidate));
                    continue;
                }
                if covered_by(analysis, &precision, &successor, &states, &candidates)? {
                    edges.extend(candidates.iter().map(|&candidate| (current, candidate)));
                    continue;
                }

                if states.len() >= max_states {
                    return Err(CheckError::ExplorationLimit { limit: max_states });
                }
                let added = states.len();
                states.push(successor);
                index.insert(location, added);
                edges.push((current, added));
                worklist.push_back(added);
            }
            debug!(state = current, total = states.len(), "explored state");
        }

        edges.sort_unstable();
        edges.dedup();
        info!(states = states.len(), edges = edges.len(), "exploration finished");
        Self::new(states, edges, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates_indices() {
        assert!(ReachedSet::new(vec![1, 2], vec![(0, 1)], 0).is_ok());
        assert!(ReachedSet::<u8>::new(vec![], vec![], 0).is_err());
        assert!(ReachedSet::new(vec![1, 2], vec![(0, 2)], 0).is_err());
        assert!(ReachedSet::new(vec![1, 2], vec![], 2).is_err());
    }

    #[test]
    fn test_graph_and_successors() {
        let reached = ReachedSet::new(vec!['a', 'b', 'c'], vec![(0, 1), (0, 2), (2, 2)], 0).unwrap();
        assert_eq!(reached.successors_of(0).collect::<Vec<_>>(), vec![1, 2]);
        let graph = reached.to_weighted_graph().unwrap();
        assert_eq!(graph.num_nodes(), 3);
        // The self-loop carries no cut information
        assert_eq!(graph.num_edges(), 2);
    }

    #[test]
    fn test_without_state_remaps() {
        let reached = ReachedSet::new(vec!['a', 'b', 'c'], vec![(0, 1), (1, 2), (0, 2)], 0).unwrap();
        let smaller = reached.without_state(1).unwrap();
        assert_eq!(smaller.states(), &['a', 'c']);
        assert_eq!(smaller.edges(), &[(0, 1)]);
        assert!(reached.without_state(0).is_err());
    }
}
