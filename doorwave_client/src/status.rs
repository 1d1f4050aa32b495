//! Status effects.
//!
//! One time-bounded modifier exists today: the dance lockout, which
//! suppresses door interaction. The tracker stores a single absolute
//! deadline and expires lazily; readers recompute freshness on every
//! check, and overlapping lockouts simply overwrite the deadline.

use std::time::{Duration, Instant};

/// Tracks the movement-interaction lockout.
#[derive(Debug, Default)]
pub struct StatusEffects {
    locked_until: Option<Instant>,
}

impl StatusEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) a lockout lasting `duration` from `now`.
    pub fn lock_for(&mut self, now: Instant, duration: Duration) {
        self.locked_until = Some(now + duration);
    }

    /// Whether the lockout is active at `now`. The deadline itself is
    /// exclusive: at exactly `locked_until` the effect has expired.
    pub fn is_locked(&self, now: Instant) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlocked_by_default() {
        let effects = StatusEffects::new();
        assert!(!effects.is_locked(Instant::now()));
    }

    #[test]
    fn locked_for_the_full_window_then_expires() {
        let t0 = Instant::now();
        let mut effects = StatusEffects::new();
        effects.lock_for(t0, Duration::from_millis(2000));

        assert!(effects.is_locked(t0));
        assert!(effects.is_locked(t0 + Duration::from_millis(1999)));
        assert!(!effects.is_locked(t0 + Duration::from_millis(2000)));
        assert!(!effects.is_locked(t0 + Duration::from_millis(5000)));
    }

    #[test]
    fn overlapping_lockouts_overwrite() {
        let t0 = Instant::now();
        let mut effects = StatusEffects::new();
        effects.lock_for(t0, Duration::from_millis(5000));
        // A shorter lockout arriving later replaces the longer one; no
        // stacking, no max-of-two.
        effects.lock_for(t0 + Duration::from_millis(100), Duration::from_millis(200));

        assert!(effects.is_locked(t0 + Duration::from_millis(250)));
        assert!(!effects.is_locked(t0 + Duration::from_millis(300)));
    }
}
