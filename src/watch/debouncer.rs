//! Editor-save debouncing.
//!
//! Editors emit bursts of events for one save. The debouncer holds a
//! single pending path; a new event replaces it and restarts the quiet
//! period, so a burst collapses into one recompilation of the last
//! written path.

use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Quiet period before a pending change is acted on.
pub const DEBOUNCE: Duration = Duration::from_millis(100);

/// Idle poll interval when nothing is pending.
const IDLE: Duration = Duration::from_secs(86400);

#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<PathBuf>,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change. The newest path wins; the quiet period restarts.
    pub fn note(&mut self, path: PathBuf) {
        self.pending = Some(path);
        self.last_event = Some(Instant::now());
    }

    /// Take the pending path if the quiet period has elapsed.
    pub fn take_if_ready(&mut self) -> Option<PathBuf> {
        let last = self.last_event?;
        if last.elapsed() < DEBOUNCE {
            return None;
        }
        self.last_event = None;
        self.pending.take()
    }

    /// How long the event loop may sleep before checking again.
    pub fn sleep_duration(&self) -> Duration {
        match self.last_event {
            None => IDLE,
            Some(last) => DEBOUNCE
                .saturating_sub(last.elapsed())
                .max(Duration::from_millis(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_not_ready_before_quiet_period() {
        let mut debouncer = Debouncer::new();
        debouncer.note(PathBuf::from("a.md"));
        assert!(debouncer.take_if_ready().is_none());
    }

    #[test]
    fn test_ready_after_quiet_period() {
        let mut debouncer = Debouncer::new();
        debouncer.note(PathBuf::from("a.md"));
        sleep(DEBOUNCE + Duration::from_millis(20));
        assert_eq!(debouncer.take_if_ready(), Some(PathBuf::from("a.md")));
        // Taking drains the pending state
        assert!(debouncer.take_if_ready().is_none());
    }

    #[test]
    fn test_burst_collapses_to_latest_path() {
        let mut debouncer = Debouncer::new();
        debouncer.note(PathBuf::from("first.md"));
        debouncer.note(PathBuf::from("second.md"));
        sleep(DEBOUNCE + Duration::from_millis(20));
        assert_eq!(debouncer.take_if_ready(), Some(PathBuf::from("second.md")));
    }

    #[test]
    fn test_sleep_duration_tracks_pending() {
        let mut debouncer = Debouncer::new();
        assert!(debouncer.sleep_duration() >= Duration::from_secs(3600));
        debouncer.note(PathBuf::from("a.md"));
        assert!(debouncer.sleep_duration() <= DEBOUNCE);
    }
}
