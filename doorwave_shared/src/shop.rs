//! Shop window.
//!
//! The server opens a timed purchase window by sending its absolute close
//! time. The client polls the deadline; there is no server-side countdown
//! traffic. The window's own UI timer is the one collaborator allowed a
//! dedicated cancellable interval (see the client binary).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A purchase window closing at an absolute epoch-millisecond deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopWindow {
    pub ends_at_ms: u64,
}

impl ShopWindow {
    pub fn new(ends_at_ms: u64) -> Self {
        Self { ends_at_ms }
    }

    /// Time left until close, saturating at zero.
    pub fn remaining(&self, now_ms: u64) -> Duration {
        Duration::from_millis(self.ends_at_ms.saturating_sub(now_ms))
    }

    pub fn is_open(&self, now_ms: u64) -> bool {
        now_ms < self.ends_at_ms
    }

    /// Countdown label shown while the window is open.
    pub fn label(&self, now_ms: u64) -> String {
        format!("Closes in {:.1}s", self.remaining(now_ms).as_secs_f64())
    }
}

/// Current wall clock as epoch milliseconds.
pub fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_saturates_at_zero() {
        let shop = ShopWindow::new(1_000);
        assert_eq!(shop.remaining(400), Duration::from_millis(600));
        assert_eq!(shop.remaining(1_000), Duration::ZERO);
        assert_eq!(shop.remaining(5_000), Duration::ZERO);
    }

    #[test]
    fn open_flips_exactly_at_deadline() {
        let shop = ShopWindow::new(1_000);
        assert!(shop.is_open(999));
        assert!(!shop.is_open(1_000));
        assert!(!shop.is_open(1_001));
    }

    #[test]
    fn label_shows_tenths() {
        let shop = ShopWindow::new(2_500);
        assert_eq!(shop.label(1_000), "Closes in 1.5s");
        assert_eq!(shop.label(9_000), "Closes in 0.0s");
    }
}
