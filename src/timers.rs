//! One deadline per concern, polled by the event loop.
//!
//! Scheduling a concern replaces its pending deadline, so every reschedule
//! is also a cancellation of the stale callback. Clearing the table drops
//! every outstanding deadline at once (layout reset, shutdown).

use std::time::{Duration, Instant};

use crate::action::Action;

pub const PREVIEW_DELAY: Duration = Duration::from_millis(250);
pub const RANDOM_TICK_INTERVAL: Duration = Duration::from_millis(150);
pub const LOCK_FLASH_DURATION: Duration = Duration::from_millis(350);

#[derive(Debug, Default)]
pub struct Timers {
    preview: Option<(Instant, usize)>,
    random: Option<Instant>,
    lock_flash: Option<Instant>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_preview(&mut self, now: Instant, slot: usize) {
        self.preview = Some((now + PREVIEW_DELAY, slot));
    }

    pub fn cancel_preview(&mut self) {
        self.preview = None;
    }

    pub fn schedule_random_tick(&mut self, now: Instant) {
        self.random = Some(now + RANDOM_TICK_INTERVAL);
    }

    pub fn schedule_lock_flash(&mut self, now: Instant) {
        self.lock_flash = Some(now + LOCK_FLASH_DURATION);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// How long the event loop may block before the next deadline.
    pub fn poll_timeout(&self, now: Instant) -> Option<Duration> {
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    fn next_deadline(&self) -> Option<Instant> {
        let mut next: Option<Instant> = None;
        for deadline in [
            self.preview.map(|(at, _)| at),
            self.random,
            self.lock_flash,
        ]
        .into_iter()
        .flatten()
        {
            next = Some(match next {
                Some(current) => current.min(deadline),
                None => deadline,
            });
        }
        next
    }

    /// Take every expired deadline and turn it into its completion action,
    /// earliest first.
    pub fn fire_due(&mut self, now: Instant) -> Vec<Action> {
        let mut due: Vec<(Instant, Action)> = Vec::new();

        if let Some((at, slot)) = self.preview {
            if at <= now {
                self.preview = None;
                due.push((at, Action::PreviewElapsed(slot)));
            }
        }
        if let Some(at) = self.random {
            if at <= now {
                self.random = None;
                due.push((at, Action::RandomTick));
            }
        }
        if let Some(at) = self.lock_flash {
            if at <= now {
                self.lock_flash = None;
                due.push((at, Action::LockFlashElapsed));
            }
        }

        due.sort_by_key(|&(at, _)| at);
        due.into_iter().map(|(_, action)| action).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_fires_before_its_deadline() {
        let now = Instant::now();
        let mut timers = Timers::new();
        timers.schedule_preview(now, 3);
        assert!(timers.fire_due(now + Duration::from_millis(200)).is_empty());
        assert_eq!(
            timers.fire_due(now + PREVIEW_DELAY),
            vec![Action::PreviewElapsed(3)]
        );
        // Consumed: a later poll returns nothing.
        assert!(timers.fire_due(now + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn rescheduling_replaces_the_pending_preview() {
        let now = Instant::now();
        let mut timers = Timers::new();
        timers.schedule_preview(now, 0);
        timers.schedule_preview(now + Duration::from_millis(100), 1);

        // The first candidate's window has passed, but its deadline was
        // replaced: only the second candidate ever fires.
        assert!(timers.fire_due(now + Duration::from_millis(260)).is_empty());
        assert_eq!(
            timers.fire_due(now + Duration::from_millis(100) + PREVIEW_DELAY),
            vec![Action::PreviewElapsed(1)]
        );
    }

    #[test]
    fn cancel_drops_the_pending_preview() {
        let now = Instant::now();
        let mut timers = Timers::new();
        timers.schedule_preview(now, 2);
        timers.cancel_preview();
        assert!(timers.fire_due(now + Duration::from_secs(1)).is_empty());
    }

    #[test]
    fn clear_drops_every_concern() {
        let now = Instant::now();
        let mut timers = Timers::new();
        timers.schedule_preview(now, 1);
        timers.schedule_random_tick(now);
        timers.schedule_lock_flash(now);
        timers.clear();
        assert!(timers.fire_due(now + Duration::from_secs(1)).is_empty());
        assert_eq!(timers.poll_timeout(now), None);
    }

    #[test]
    fn expired_deadlines_fire_earliest_first() {
        let now = Instant::now();
        let mut timers = Timers::new();
        timers.schedule_preview(now, 5);
        timers.schedule_random_tick(now);
        let fired = timers.fire_due(now + Duration::from_secs(1));
        assert_eq!(
            fired,
            vec![Action::RandomTick, Action::PreviewElapsed(5)]
        );
    }

    #[test]
    fn poll_timeout_tracks_the_nearest_deadline() {
        let now = Instant::now();
        let mut timers = Timers::new();
        assert_eq!(timers.poll_timeout(now), None);
        timers.schedule_preview(now, 0);
        timers.schedule_random_tick(now);
        assert_eq!(timers.poll_timeout(now), Some(RANDOM_TICK_INTERVAL));
        // Past-due deadlines report a zero timeout rather than underflowing.
        assert_eq!(
            timers.poll_timeout(now + Duration::from_secs(2)),
            Some(Duration::ZERO)
        );
    }
}
