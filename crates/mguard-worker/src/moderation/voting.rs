//! Keyframe vote aggregation.
//!
//! A video label is true when it fired on enough sampled frames, either as
//! an absolute count or as a share of the frames evaluated.

use std::collections::BTreeMap;

/// Vote thresholds.
///
/// A label with zero hits never passes, even with `min_hits == 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VotePolicy {
    min_hits: u32,
    min_ratio: f64,
}

impl Default for VotePolicy {
    fn default() -> Self {
        Self {
            min_hits: 3,
            min_ratio: 0.667,
        }
    }
}

impl VotePolicy {
    pub fn new(min_hits: u32, min_ratio: f64) -> Self {
        Self {
            min_hits,
            min_ratio,
        }
    }

    pub fn min_hits(&self) -> u32 {
        self.min_hits
    }

    pub fn min_ratio(&self) -> f64 {
        self.min_ratio
    }

    /// Decide one label. The ratio test allows half a permille of slack so
    /// that 2 of 3 frames clears the default 0.667.
    pub fn decide(&self, hits: u32, total: u32) -> bool {
        if hits == 0 {
            return false;
        }
        if hits >= self.min_hits {
            return true;
        }
        let ratio = if total == 0 {
            0.0
        } else {
            f64::from(hits) / f64::from(total)
        };
        ratio + RATIO_SLACK >= self.min_ratio
    }
}

const RATIO_SLACK: f64 = 0.0005;

/// Per-key hit counters for one video.
#[derive(Debug, Clone, Default)]
pub struct FrameVoteTally<K: Ord> {
    hits: BTreeMap<K, u32>,
    frames: u32,
}

impl<K: Ord + Clone> FrameVoteTally<K> {
    pub fn new() -> Self {
        Self {
            hits: BTreeMap::new(),
            frames: 0,
        }
    }

    /// Make `key` part of the final result even if it never fires.
    pub fn register(&mut self, key: K) {
        self.hits.entry(key).or_insert(0);
    }

    /// Record one evaluated frame and the keys that fired on it.
    pub fn record_frame<I>(&mut self, fired: I)
    where
        I: IntoIterator<Item = K>,
    {
        self.frames += 1;
        for key in fired {
            *self.hits.entry(key).or_insert(0) += 1;
        }
    }

    pub fn frames_evaluated(&self) -> u32 {
        self.frames
    }

    pub fn hits(&self, key: &K) -> u32 {
        self.hits.get(key).copied().unwrap_or(0)
    }

    /// Consume the tally into one boolean per key.
    pub fn finalize(self, policy: &VotePolicy) -> BTreeMap<K, bool> {
        let total = self.frames;
        self.hits
            .into_iter()
            .map(|(key, hits)| (key, policy.decide(hits, total)))
            .collect()
    }
}

/// Aggregate per-frame results in one call.
pub fn aggregate<K, F>(frames: &[F], policy: &VotePolicy) -> BTreeMap<K, bool>
where
    K: Ord + Clone,
    F: AsRef<[K]>,
{
    let mut tally = FrameVoteTally::new();
    for fired in frames {
        tally.record_frame(fired.as_ref().iter().cloned());
    }
    tally.finalize(policy)
}
