use std::time::{Duration, Instant};

/// Fixed-rate timer polled from the egui frame loop.
///
/// Missed ticks are coalesced: a frame that arrives several intervals late
/// fires once and the schedule restarts from that frame.
#[derive(Debug, Clone)]
pub struct FixedTicker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Start ticking; the first tick is one interval after `now`. Starting a
    /// running ticker keeps its schedule.
    pub fn start(&mut self, now: Instant) {
        if self.next_due.is_none() {
            self.next_due = Some(now + self.interval);
        }
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Returns true when a tick is due at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        let next = due + self.interval;
        self.next_due = Some(if next <= now { now + self.interval } else { next });
        true
    }

    /// Time left until the next tick, if running.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_does_not_fire_until_started() {
        let t0 = Instant::now();
        let mut ticker = FixedTicker::new(50 * MS);
        assert!(!ticker.poll(t0 + 500 * MS));
        assert!(ticker.time_until_due(t0).is_none());
    }

    #[test]
    fn test_fires_on_interval() {
        let t0 = Instant::now();
        let mut ticker = FixedTicker::new(200 * MS);
        ticker.start(t0);
        assert!(!ticker.poll(t0 + 199 * MS));
        assert!(ticker.poll(t0 + 200 * MS));
        assert!(!ticker.poll(t0 + 250 * MS));
        assert_eq!(ticker.time_until_due(t0 + 250 * MS), Some(150 * MS));
        assert!(ticker.poll(t0 + 400 * MS));
    }

    #[test]
    fn test_late_frames_coalesce() {
        let t0 = Instant::now();
        let mut ticker = FixedTicker::new(50 * MS);
        ticker.start(t0);
        assert!(ticker.poll(t0 + 1000 * MS));
        assert!(!ticker.poll(t0 + 1010 * MS));
        assert!(ticker.poll(t0 + 1050 * MS));
    }

    #[test]
    fn test_stop_and_restart() {
        let t0 = Instant::now();
        let mut ticker = FixedTicker::new(50 * MS);
        ticker.start(t0);
        ticker.stop();
        assert!(ticker.time_until_due(t0).is_none());
        assert!(!ticker.poll(t0 + 100 * MS));
        ticker.start(t0 + 100 * MS);
        ticker.start(t0 + 120 * MS);
        assert!(ticker.poll(t0 + 150 * MS));
    }
}
