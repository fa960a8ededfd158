//! Gain bucket structure for Fiduccia–Mattheyses passes

use crate::graph::NodeIndex;

/// Nodes bucketed by integer gain in `[-max_gain, max_gain]`
///
/// Insertion, removal and gain updates are O(1). The highest non-empty
/// bucket is tracked so selection starts at the best gain.
#[derive(Debug, Clone)]
pub(crate) struct GainBuckets {
    offset: i64,
    buckets: Vec<Vec<NodeIndex>>,
    /// `(bucket, position)` of each contained node
    slots: Vec<Option<(usize, usize)>>,
    top: usize,
    len: usize,
}

impl GainBuckets {
    /// Buckets for nodes `0..num_nodes` with gains bounded by `max_gain`
    pub(crate) fn new(num_nodes: usize, max_gain: i64) -> Self {
        let max_gain = max_gain.max(0);
        Self {
            offset: max_gain,
            buckets: vec![Vec::new(); (2 * max_gain + 1) as usize],
            slots: vec![None; num_nodes],
            top: 0,
            len: 0,
        }
    }

    fn bucket_of(&self, gain: i64) -> usize {
        (gain + self.offset).clamp(0, 2 * self.offset) as usize
    }

    fn gain_of_bucket(&self, bucket: usize) -> i64 {
        bucket as i64 - self.offset
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn contains(&self, node: NodeIndex) -> bool {
        self.slots[node].is_some()
    }

    /// Current gain of a contained node
    pub(crate) fn gain(&self, node: NodeIndex) -> Option<i64> {
        self.slots[node].map(|(bucket, _)| self.gain_of_bucket(bucket))
    }

    pub(crate) fn insert(&mut self, node: NodeIndex, gain: i64) {
        if self.contains(node) {
            self.remove(node);
        }
        let bucket = self.bucket_of(gain);
        self.slots[node] = Some((bucket, self.buckets[bucket].len()));
        self.buckets[bucket].push(node);
        self.top = self.top.max(bucket);
        self.len += 1;
    }

    pub(crate) fn remove(&mut self, node: NodeIndex) -> bool {
        let Some((bucket, position)) = self.slots[node].take() else {
            return false;
        };
        let list = &mut self.buckets[bucket];
        list.swap_remove(position);
        if let Some(&moved) = list.get(position) {
            self.slots[moved] = Some((bucket, position));
        }
        self.len -= 1;
        while self.top > 0 && self.buckets[self.top].is_empty() {
            self.top -= 1;
        }
        true
    }

    /// Shift a contained node's gain by `delta`
    pub(crate) fn adjust(&mut self, node: NodeIndex, delta: i64) {
        if let Some(gain) = self.gain(node) {
            self.insert(node, gain + delta);
        }
    }

    /// Highest-gain node accepted by `allowed`, scanning buckets top-down
    ///
    /// Among accepted nodes of equal gain the highest node index wins.
    pub(crate) fn select<F>(&self, mut allowed: F) -> Option<(NodeIndex, i64)>
    where
        F: FnMut(NodeIndex) -> bool,
    {
        if self.is_empty() {
            return None;
        }
        (0..=self.top).rev().find_map(|bucket| {
            self.buckets[bucket]
                .iter()
                .copied()
                .filter(|&node| allowed(node))
                .max()
                .map(|node| (node, self.gain_of_bucket(bucket)))
        })
    }
}
