//! Frame-rate throttling for pointer moves.
//!
//! Moves arriving faster than the frame interval are coalesced: the latest
//! position replaces any pending one and is released once the interval has
//! elapsed. Nothing is dropped, only superseded.

use egui::Pos2;
use std::time::{Duration, Instant};

/// ~60 Hz
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone)]
pub struct PointerThrottle {
    interval: Duration,
    last_applied: Option<Instant>,
    pending: Option<Pos2>,
}

impl Default for PointerThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

impl PointerThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_applied: None,
            pending: None,
        }
    }

    /// Record a pointer position. Returns the position to apply now, if the
    /// frame interval has elapsed since the last applied one.
    pub fn offer(&mut self, pos: Pos2, now: Instant) -> Option<Pos2> {
        self.pending = Some(pos);
        self.poll(now)
    }

    /// Release the pending position if it is due.
    pub fn poll(&mut self, now: Instant) -> Option<Pos2> {
        let due = self
            .last_applied
            .map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if !due {
            return None;
        }
        let pos = self.pending.take()?;
        self.last_applied = Some(now);
        Some(pos)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn reset(&mut self) {
        self.last_applied = None;
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_first_offer_applies_immediately() {
        let mut throttle = PointerThrottle::default();
        let now = Instant::now();
        assert_eq!(throttle.offer(pos2(1.0, 1.0), now), Some(pos2(1.0, 1.0)));
        assert!(!throttle.has_pending());
    }

    #[test]
    fn test_moves_within_interval_coalesce_to_latest() {
        let mut throttle = PointerThrottle::new(Duration::from_millis(16));
        let start = Instant::now();
        throttle.offer(pos2(0.0, 0.0), start);

        assert_eq!(throttle.offer(pos2(0.0, 5.0), start + Duration::from_millis(4)), None);
        assert_eq!(throttle.offer(pos2(0.0, 9.0), start + Duration::from_millis(8)), None);
        assert!(throttle.has_pending());

        let applied = throttle.poll(start + Duration::from_millis(17));
        assert_eq!(applied, Some(pos2(0.0, 9.0)));
        assert!(!throttle.has_pending());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut throttle = PointerThrottle::default();
        let start = Instant::now();
        throttle.offer(pos2(0.0, 0.0), start);
        throttle.offer(pos2(1.0, 0.0), start);
        throttle.reset();
        assert!(!throttle.has_pending());
        assert_eq!(throttle.offer(pos2(2.0, 0.0), start), Some(pos2(2.0, 0.0)));
    }
}
