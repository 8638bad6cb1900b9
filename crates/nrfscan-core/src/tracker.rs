//! Per-channel activity tracking.
//!
//! Each channel keeps a short ring of recent detections (the "peak level"
//! shown as bar fill, which decays as old hits fall out) and an unbounded
//! running total.

/// Depth of the per-channel detection history.
pub const CACHE_MAX: usize = 5;

/// Fixed-capacity FIFO of the most recent detections for one channel.
///
/// Always holds exactly [`CACHE_MAX`] entries; it starts out all `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct History {
    entries: [bool; CACHE_MAX],
    /// Index of the oldest entry.
    head: usize,
}

impl History {
    /// Append a reading, evicting the oldest.
    pub fn push(&mut self, detected: bool) {
        self.entries[self.head] = detected;
        self.head = (self.head + 1) % CACHE_MAX;
    }

    /// Number of detections currently in the window.
    pub fn peak_level(&self) -> usize {
        self.entries.iter().filter(|&&hit| hit).count()
    }

    pub fn len(&self) -> usize {
        CACHE_MAX
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..CACHE_MAX).map(move |i| self.entries[(self.head + i) % CACHE_MAX])
    }
}

/// Result of recording one tick for a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activity {
    /// Detections within the history window, `0..=CACHE_MAX`.
    pub peak_level: usize,
    /// Detections since the scan started.
    pub total: u64,
}

/// Scan state for every channel of one run.
#[derive(Debug, Clone)]
pub struct ActivityTracker {
    history: Vec<History>,
    totals: Vec<u64>,
}

impl ActivityTracker {
    pub fn new(channel_count: usize) -> Self {
        Self {
            history: vec![History::default(); channel_count],
            totals: vec![0; channel_count],
        }
    }

    /// Record one reading for `channel` and return its updated activity.
    ///
    /// Panics if `channel` is outside the tracked range.
    pub fn record(&mut self, channel: usize, detected: bool) -> Activity {
        self.history[channel].push(detected);
        if detected {
            self.totals[channel] += 1;
        }
        self.activity(channel)
    }

    pub fn activity(&self, channel: usize) -> Activity {
        Activity {
            peak_level: self.history[channel].peak_level(),
            total: self.totals[channel],
        }
    }

    pub fn history(&self, channel: usize) -> &History {
        &self.history[channel]
    }

    pub fn total(&self, channel: usize) -> u64 {
        self.totals[channel]
    }

    pub fn totals(&self) -> &[u64] {
        &self.totals
    }

    pub fn channel_count(&self) -> usize {
        self.totals.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_starts_empty_of_hits() {
        let history = History::default();
        assert_eq!(history.len(), CACHE_MAX);
        assert_eq!(history.peak_level(), 0);
        assert!(history.iter().all(|hit| !hit));
    }

    #[test]
    fn history_evicts_oldest() {
        let mut history = History::default();
        history.push(true);
        for _ in 0..CACHE_MAX - 1 {
            history.push(false);
        }
        assert_eq!(history.peak_level(), 1);
        history.push(false);
        assert_eq!(history.peak_level(), 0, "first hit should have aged out");
    }

    #[test]
    fn history_iterates_oldest_first() {
        let mut history = History::default();
        for hit in [true, false, true, true, false, true] {
            history.push(hit);
        }
        let entries: Vec<bool> = history.iter().collect();
        assert_eq!(entries, vec![false, true, true, false, true]);
    }

    #[test]
    fn length_is_constant_after_many_pushes() {
        let mut history = History::default();
        for i in 0..37 {
            history.push(i % 3 == 0);
            assert_eq!(history.iter().count(), CACHE_MAX);
        }
    }

    #[test]
    fn peak_level_stays_in_range() {
        let mut tracker = ActivityTracker::new(4);
        for i in 0..50 {
            let activity = tracker.record(i % 4, i % 2 == 0);
            assert!(activity.peak_level <= CACHE_MAX);
            assert_eq!(
                activity.peak_level,
                tracker.history(i % 4).iter().filter(|&h| h).count()
            );
        }
    }

    #[test]
    fn totals_count_every_detection() {
        let mut tracker = ActivityTracker::new(2);
        let mut previous = 0;
        for (i, hit) in [true, false, true, true, false, false, true].into_iter().enumerate() {
            let activity = tracker.record(1, hit);
            let expected = previous + u64::from(hit);
            assert_eq!(activity.total, expected, "tick {i}");
            previous = activity.total;
        }
        assert_eq!(tracker.total(1), 4);
        assert_eq!(tracker.total(0), 0);
    }

    #[test]
    fn peak_scenario_with_prior_total() {
        let mut tracker = ActivityTracker::new(1);
        tracker.record(0, true);
        tracker.record(0, true);
        for _ in 0..CACHE_MAX {
            tracker.record(0, false);
        }
        assert_eq!(tracker.total(0), 2);

        let mut last = Activity::default();
        for hit in [true, false, true, true, false] {
            last = tracker.record(0, hit);
        }
        assert_eq!(last.peak_level, 3);
        assert_eq!(last.total, 4);
    }

    #[test]
    fn channels_do_not_share_history() {
        let mut tracker = ActivityTracker::new(3);
        tracker.record(1, true);
        assert_eq!(tracker.activity(0).peak_level, 0);
        assert_eq!(tracker.activity(1).peak_level, 1);
        assert_eq!(tracker.activity(2).peak_level, 0);
    }

    #[test]
    fn independent_trackers() {
        let mut a = ActivityTracker::new(2);
        let b = ActivityTracker::new(2);
        a.record(0, true);
        assert_eq!(a.total(0), 1);
        assert_eq!(b.total(0), 0);
    }
}
