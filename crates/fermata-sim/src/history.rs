use std::collections::BTreeMap;

/// Recorded per-tick input, replayed during playback instead of live device
/// input.
///
/// Payloads are opaque to this core: the input bridge owns their encoding,
/// exactly as the external serializer owns snapshot payloads. The history is
/// bounded to the rewind window — inputs older than the oldest reachable tick
/// can never be replayed and are pruned.
#[derive(Debug, Default)]
pub struct InputHistory {
    frames: BTreeMap<u64, Vec<Vec<u8>>>,
    window_ticks: u64,
}

impl InputHistory {
    /// Create an empty history bounded to `window_ticks`.
    pub fn new(window_ticks: u64) -> Self {
        Self {
            frames: BTreeMap::new(),
            window_ticks,
        }
    }

    /// Record one input payload against `tick`. Multiple payloads per tick
    /// keep their arrival order.
    pub fn record(&mut self, tick: u64, payload: Vec<u8>) {
        self.frames.entry(tick).or_default().push(payload);
    }

    /// The recorded payloads for `tick`, in arrival order.
    pub fn frames_for(&self, tick: u64) -> &[Vec<u8>] {
        self.frames.get(&tick).map_or(&[], Vec::as_slice)
    }

    /// Drop recordings that have fallen out of the rewind window behind
    /// `current_tick`.
    pub fn prune(&mut self, current_tick: u64) {
        let horizon = current_tick.saturating_sub(self.window_ticks);
        self.frames = self.frames.split_off(&horizon);
    }

    /// Discard recordings after `tick`. Used when the timeline branches:
    /// the original continuation's inputs no longer describe this timeline.
    pub fn truncate_after(&mut self, tick: u64) -> usize {
        let discarded = self.frames.range(tick + 1..).count();
        self.frames.retain(|&t, _| t <= tick);
        discarded
    }

    /// Number of ticks with at least one recorded payload.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True if nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_preserve_arrival_order() {
        let mut history = InputHistory::new(100);
        history.record(5, vec![1]);
        history.record(5, vec![2]);
        history.record(6, vec![3]);
        assert_eq!(history.frames_for(5), &[vec![1], vec![2]]);
        assert_eq!(history.frames_for(6), &[vec![3]]);
        assert!(history.frames_for(7).is_empty());
    }

    #[test]
    fn prune_drops_ticks_behind_the_window() {
        let mut history = InputHistory::new(10);
        for tick in 0..30 {
            history.record(tick, vec![tick as u8]);
        }
        history.prune(30);
        assert!(history.frames_for(19).is_empty());
        assert_eq!(history.frames_for(20), &[vec![20]]);
        assert_eq!(history.len(), 10);
    }

    #[test]
    fn truncate_after_discards_the_abandoned_branch() {
        let mut history = InputHistory::new(100);
        for tick in 0..10 {
            history.record(tick, vec![tick as u8]);
        }
        let discarded = history.truncate_after(4);
        assert_eq!(discarded, 5);
        assert_eq!(history.frames_for(4), &[vec![4]]);
        assert!(history.frames_for(5).is_empty());
    }

    #[test]
    fn empty_history() {
        let mut history = InputHistory::new(10);
        assert!(history.is_empty());
        assert_eq!(history.truncate_after(100), 0);
        history.prune(1000);
    }
}
