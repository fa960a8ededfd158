//! Two-way Fiduccia–Mattheyses refinement
//!
//! Improves the cut between a fixed pair of partitions `(A, B)`. Each pass
//! moves every node at most once, always taking the highest-gain move the
//! balance criterion allows, then rolls back to the best prefix of the move
//! sequence. Passes repeat until one yields no positive gain.

use tracing::trace;

use super::buckets::GainBuckets;
use crate::error::{PartitionError, Result};
use crate::graph::{NodeIndex, Weight, WeightedGraph};
use crate::partitioning::Partitioning;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    A,
    B,
}

impl Side {
    fn other(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// Weight ratio `max / min`; infinite when one side is empty
pub(crate) fn balance_ratio(a: Weight, b: Weight) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi == 0 {
        1.0
    } else if lo == 0 {
        f64::INFINITY
    } else {
        hi as f64 / lo as f64
    }
}

/// Check a balance criterion is usable
pub(crate) fn check_balance(balance: f64) -> Result<()> {
    if !balance.is_finite() || balance < 1.0 {
        return Err(PartitionError::InvalidBalance(balance));
    }
    Ok(())
}

/// Two-way Fiduccia–Mattheyses refiner for a graph
#[derive(Debug, Clone)]
pub struct FiducciaMattheyses<'g> {
    graph: &'g WeightedGraph,
    balance: f64,
}

struct PassState {
    side: Vec<Option<Side>>,
    weight_a: Weight,
    weight_b: Weight,
}

impl PassState {
    fn ratio_after(&self, from: Side, w: Weight) -> f64 {
        match from {
            Side::A => balance_ratio(self.weight_a - w, self.weight_b + w),
            Side::B => balance_ratio(self.weight_a + w, self.weight_b - w),
        }
    }

    fn apply(&mut self, node: NodeIndex, from: Side, w: Weight) {
        self.side[node] = Some(from.other());
        match from {
            Side::A => {
                self.weight_a -= w;
                self.weight_b += w;
            }
            Side::B => {
                self.weight_b -= w;
                self.weight_a += w;
            }
        }
    }

    fn ratio(&self) -> f64 {
        balance_ratio(self.weight_a, self.weight_b)
    }
}

impl<'g> FiducciaMattheyses<'g> {
    /// Create a refiner with a balance criterion of at least 1.0
    pub fn new(graph: &'g WeightedGraph, balance_criterion: f64) -> Result<Self> {
        check_balance(balance_criterion)?;
        Ok(Self {
            graph,
            balance: balance_criterion,
        })
    }

    /// The balance criterion `max(|A|, |B|) / min(|A|, |B|)` moves respect
    pub fn balance_criterion(&self) -> f64 {
        self.balance
    }

    /// Refine partitions `a` and `b` in place
    ///
    /// Returns the total gain `g` of all passes; the cut between the two
    /// partitions (and of the whole partitioning) shrinks by exactly `g`.
    ///
    /// # Errors
    ///
    /// [`PartitionError::InvalidPartition`] if either index is out of range
    /// or both name the same partition.
    pub fn improve_partitioning(
        &self,
        partitioning: &mut Partitioning,
        a: usize,
        b: usize,
    ) -> Result<i64> {
        let len = partitioning.len();
        for index in [a, b] {
            if index >= len {
                return Err(PartitionError::InvalidPartition { index, len });
            }
        }
        if a == b {
            return Err(PartitionError::InvalidPartition { index: b, len });
        }

        let mut total = 0;
        loop {
            let gain = self.pass(partitioning, a, b);
            total += gain;
            if gain <= 0 {
                break;
            }
        }
        Ok(total)
    }

    fn pass(&self, partitioning: &mut Partitioning, a: usize, b: usize) -> i64 {
        let graph = self.graph;
        let mut state = PassState {
            side: vec![None; graph.num_nodes()],
            weight_a: 0,
            weight_b: 0,
        };
        for &v in &partitioning.parts()[a] {
            state.side[v] = Some(Side::A);
            state.weight_a += graph.node_weight(v);
        }
        for &v in &partitioning.parts()[b] {
            state.side[v] = Some(Side::B);
            state.weight_b += graph.node_weight(v);
        }

        let members: Vec<NodeIndex> = partitioning.parts()[a]
            .iter()
            .chain(partitioning.parts()[b].iter())
            .copied()
            .collect();
        if members.is_empty() {
            return 0;
        }

        let max_gain = members
            .iter()
            .map(|&v| graph.weighted_degree(v) as i64)
            .max()
            .unwrap_or(0);
        let mut buckets = GainBuckets::new(graph.num_nodes(), max_gain);
        for &v in &members {
            buckets.insert(v, self.initial_gain(&state, v));
        }

        let initial_ratio = state.ratio();
        let mut moves: Vec<(NodeIndex, Side)> = Vec::with_capacity(members.len());
        // (balanced, gain, prefix length) of the best prefix so far
        let mut best = (initial_ratio <= self.balance, 0i64, 0usize);
        let mut cumulative = 0i64;

        while !buckets.is_empty() {
            let current_ratio = state.ratio();
            let candidate = buckets.select(|v| match state.side[v] {
                Some(from) => {
                    let ratio = state.ratio_after(from, graph.node_weight(v));
                    ratio <= self.balance || ratio < current_ratio
                }
                None => false,
            });
            let Some((node, gain)) = candidate else {
                break;
            };
            let Some(from) = state.side[node] else {
                break;
            };

            buckets.remove(node);
            state.apply(node, from, graph.node_weight(node));
            moves.push((node, from));
            cumulative += gain;

            for &(u, w) in graph.neighbors(node) {
                if !buckets.contains(u) {
                    continue;
                }
                let delta = 2 * w as i64;
                match state.side[u] {
                    Some(side) if side == from => buckets.adjust(u, delta),
                    Some(_) => buckets.adjust(u, -delta),
                    None => {}
                }
            }

            let balanced = state.ratio() <= self.balance;
            let candidate_key = (balanced, cumulative);
            if candidate_key > (best.0, best.1) {
                best = (balanced, cumulative, moves.len());
            }
        }

        let (_, best_gain, best_len) = best;
        for &(node, from) in &moves[..best_len] {
            let (source, target) = match from {
                Side::A => (a, b),
                Side::B => (b, a),
            };
            partitioning.move_node(node, source, target);
        }

        trace!(
            nodes = members.len(),
            moves = moves.len(),
            kept = best_len,
            gain = best_gain,
            "fm pass"
        );
        best_gain
    }

    fn initial_gain(&self, state: &PassState, v: NodeIndex) -> i64 {
        let own = state.side[v];
        self.graph
            .neighbors(v)
            .iter()
            .filter_map(|&(u, w)| state.side[u].map(|side| (side, w as i64)))
            .map(|(side, w)| if Some(side) == own { -w } else { w })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_clusters() -> WeightedGraph {
        // Dense {0,1,2} and {3,4,5}, joined by 2 → 3
        WeightedGraph::from_edges(
            6,
            vec![
                (0, 1, 1),
                (1, 2, 1),
                (2, 0, 1),
                (3, 4, 1),
                (4, 5, 1),
                (5, 3, 1),
                (2, 3, 1),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_balance_ratio() {
        assert_eq!(balance_ratio(3, 3), 1.0);
        assert_eq!(balance_ratio(2, 4), 2.0);
        assert_eq!(balance_ratio(0, 4), f64::INFINITY);
        assert_eq!(balance_ratio(0, 0), 1.0);
    }

    #[test]
    fn test_rejects_invalid_balance() {
        let g = two_clusters();
        assert_eq!(
            FiducciaMattheyses::new(&g, 0.5).unwrap_err(),
            PartitionError::InvalidBalance(0.5)
        );
        assert!(FiducciaMattheyses::new(&g, f64::NAN).is_err());
    }

    #[test]
    fn test_improves_interleaved_partitioning() {
        let g = two_clusters();
        let mut p = Partitioning::from_assignment(&[0, 1, 0, 1, 0, 1], 2);
        let before = p.cut_size(&g);
        let fm = FiducciaMattheyses::new(&g, 2.0).unwrap();
        let gain = fm.improve_partitioning(&mut p, 0, 1).unwrap();

        assert_eq!(gain, 4);
        assert_eq!(p.cut_size(&g) as i64, before as i64 - gain);
        assert_eq!(p.cut_size(&g), 1);
        assert!(p.validate(6).is_ok());
        let weights = p.part_weights(&g);
        assert_eq!(weights, vec![3, 3]);
    }

    #[test]
    fn test_optimal_partitioning_is_kept() {
        let g = two_clusters();
        let mut p = Partitioning::from_assignment(&[0, 0, 0, 1, 1, 1], 2);
        let fm = FiducciaMattheyses::new(&g, 1.0).unwrap();
        assert_eq!(fm.improve_partitioning(&mut p, 0, 1).unwrap(), 0);
        assert_eq!(p, Partitioning::from_assignment(&[0, 0, 0, 1, 1, 1], 2));
    }

    #[test]
    fn test_leaves_other_partitions_alone() {
        let g = two_clusters();
        let mut p = Partitioning::from_assignment(&[0, 1, 0, 1, 2, 2], 3);
        let fm = FiducciaMattheyses::new(&g, 2.0).unwrap();
        let before = p.cut_size(&g) as i64;
        let gain = fm.improve_partitioning(&mut p, 0, 1).unwrap();
        assert_eq!(p.cut_size(&g) as i64, before - gain);
        assert_eq!(p.parts()[2].iter().copied().collect::<Vec<_>>(), vec![4, 5]);
    }

    #[test]
    fn test_invalid_partition_indices() {
        let g = two_clusters();
        let mut p = Partitioning::from_assignment(&[0, 0, 0, 1, 1, 1], 2);
        let fm = FiducciaMattheyses::new(&g, 1.0).unwrap();
        assert!(fm.improve_partitioning(&mut p, 0, 2).is_err());
        assert!(fm.improve_partitioning(&mut p, 1, 1).is_err());
    }
}
