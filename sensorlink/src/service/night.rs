//! Night-mode change tracking.
//!
//! Poll ticks only report night mode when it changes relative to the last
//! value actually sent, and only after the peer has asked for night data
//! once. Until that first explicit emission every change is swallowed.

/// Current and last-emitted night-mode state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NightModeTracker {
    is_night: bool,
    previous: bool,
    first_run: bool,
}

impl NightModeTracker {
    pub fn new() -> Self {
        Self {
            is_night: false,
            previous: false,
            first_run: true,
        }
    }

    pub fn is_night(&self) -> bool {
        self.is_night
    }

    pub fn previous(&self) -> bool {
        self.previous
    }

    pub fn is_first_run(&self) -> bool {
        self.first_run
    }

    /// Record the current value without deciding anything.
    pub fn set(&mut self, is_night: bool) {
        self.is_night = is_night;
    }

    /// Record a poll reading. Returns `true` when an event must be sent.
    ///
    /// On `true`, `previous` already holds the new value.
    pub fn observe(&mut self, is_night: bool) -> bool {
        self.is_night = is_night;
        if self.is_night != self.previous && !self.first_run {
            self.previous = self.is_night;
            return true;
        }
        false
    }

    /// Note that an event carrying [`is_night`](Self::is_night) was sent.
    ///
    /// The first call establishes the baseline for later comparisons.
    pub fn mark_emitted(&mut self) {
        if self.first_run {
            self.first_run = false;
            self.previous = self.is_night;
        }
    }
}

impl Default for NightModeTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changes_swallowed_before_first_emission() {
        let mut tracker = NightModeTracker::new();
        assert!(!tracker.observe(true));
        assert!(!tracker.observe(false));
        assert!(!tracker.observe(true));
        assert!(tracker.is_first_run());
    }

    #[test]
    fn test_first_emission_sets_baseline() {
        let mut tracker = NightModeTracker::new();
        tracker.set(true);
        tracker.mark_emitted();

        assert!(!tracker.is_first_run());
        assert!(tracker.previous());
        // Same value: nothing to report.
        assert!(!tracker.observe(true));
        assert!(tracker.observe(false));
        assert!(!tracker.previous());
    }

    #[test]
    fn test_later_emissions_do_not_move_baseline() {
        let mut tracker = NightModeTracker::new();
        tracker.mark_emitted();
        assert!(!tracker.previous());

        // Explicit re-send while state says night but baseline says day.
        tracker.set(true);
        tracker.mark_emitted();
        assert!(!tracker.previous());
        assert!(tracker.observe(true));
    }

    /// Every boolean reading sequence, with the first emission happening
    /// after `k` readings: a tick reports iff the reading differs from the
    /// last emitted value and the first emission already happened.
    #[test]
    fn test_emits_iff_differs_from_last_emitted_over_all_sequences() {
        const LEN: u32 = 7;

        for bits in 0..(1u32 << LEN) {
            let readings: Vec<bool> = (0..LEN).map(|i| bits & (1 << i) != 0).collect();

            for emit_after in 0..=LEN as usize {
                let mut tracker = NightModeTracker::new();
                let mut last_emitted: Option<bool> = None;

                for (i, &reading) in readings.iter().enumerate() {
                    if i == emit_after {
                        tracker.mark_emitted();
                        last_emitted = Some(tracker.is_night());
                    }

                    let expected = matches!(last_emitted, Some(prev) if prev != reading);
                    let emitted = tracker.observe(reading);
                    assert_eq!(
                        emitted, expected,
                        "readings {:?}, first emission before tick {}, tick {}",
                        readings, emit_after, i
                    );
                    if emitted {
                        last_emitted = Some(reading);
                    }
                }
            }
        }
    }
}
