use std::collections::HashSet;

/// In-memory run state: the seen-set and lifetime counters.
///
/// The seen-set holds ids of listings already notified this process run. It
/// is empty at startup and grows monotonically; there is no eviction and no
/// persistence, so a restart re-notifies listings still inside the time
/// window. The listing universe is bounded by the time frame in practice, so
/// the unbounded growth is an accepted limitation.
pub struct WatchState {
    seen: HashSet<String>,
    pub cycles: u64,
    pub notified: u64,
    pub send_failures: u64,
}

impl WatchState {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
            cycles: 0,
            notified: 0,
            send_failures: 0,
        }
    }

    pub fn is_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Record a listing as notified. Called only after a successful send, so
    /// a listing is notified at most once per process lifetime.
    pub fn mark_seen(&mut self, id: &str) {
        self.seen.insert(id.to_string());
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

impl Default for WatchState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seen_set_starts_empty_and_grows() {
        let mut state = WatchState::new();
        assert!(!state.is_seen("111"));
        assert_eq!(state.seen_count(), 0);

        state.mark_seen("111");
        assert!(state.is_seen("111"));
        assert_eq!(state.seen_count(), 1);

        // Re-marking is a no-op
        state.mark_seen("111");
        assert_eq!(state.seen_count(), 1);
    }
}
