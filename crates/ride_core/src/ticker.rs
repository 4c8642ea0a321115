//! Minimum-interval gates for the per-node control loops.
//!
//! Each timed concern (status polls, motion ticks, position broadcasts) owns
//! its own `Ticker`, so the loop cadence stays independent of every action
//! cadence. Timestamps are caller-supplied milliseconds, which keeps the
//! machines deterministic under test.

#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    interval_ms: u64,
    last_fired: Option<u64>,
}

impl Ticker {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fired: None,
        }
    }

    /// True when at least one interval has elapsed since the last fire.
    /// Fires immediately on the first call and re-arms on every fire.
    pub fn ready(&mut self, now_ms: u64) -> bool {
        match self.last_fired {
            Some(last) if now_ms.saturating_sub(last) < self.interval_ms => false,
            _ => {
                self.last_fired = Some(now_ms);
                true
            }
        }
    }

    /// Forget the last fire so the next `ready` call fires immediately.
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_immediately_then_respects_interval() {
        let mut ticker = Ticker::new(1000);
        assert!(ticker.ready(0));
        assert!(!ticker.ready(500));
        assert!(!ticker.ready(999));
        assert!(ticker.ready(1000));
        assert!(!ticker.ready(1999));
        assert!(ticker.ready(2500));
    }

    #[test]
    fn reset_rearms_for_an_immediate_fire() {
        let mut ticker = Ticker::new(1000);
        assert!(ticker.ready(0));
        ticker.reset();
        assert!(ticker.ready(1));
    }
}
