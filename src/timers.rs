//! RAII phase timing for dispatch measurements.

use std::time::{Duration, Instant};

/// Adds the time between creation and drop to a `Duration` slot.
///
/// Early returns and `?` still record, since the slot is updated on drop.
///
/// ```rust,ignore
/// let mut routing = Duration::ZERO;
/// {
///     let _timer = PhaseTimer::new(&mut routing);
///     // resolve the chain
/// }
/// ```
pub struct PhaseTimer<'a> {
    start: Instant,
    slot: &'a mut Duration,
}

impl<'a> PhaseTimer<'a> {
    pub fn new(slot: &'a mut Duration) -> Self {
        Self {
            start: Instant::now(),
            slot,
        }
    }
}

impl Drop for PhaseTimer<'_> {
    fn drop(&mut self) {
        *self.slot += self.start.elapsed();
    }
}

/// Milliseconds as `f64`, the unit phase metrics are reported in.
pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed_early_return(slot: &mut Duration, fail: bool) -> Result<(), ()> {
        let _timer = PhaseTimer::new(slot);
        std::thread::sleep(Duration::from_millis(2));
        if fail {
            return Err(());
        }
        Ok(())
    }

    #[test]
    fn test_records_on_early_return() {
        let mut slot = Duration::ZERO;
        assert!(timed_early_return(&mut slot, true).is_err());
        assert!(slot >= Duration::from_millis(2));
    }

    #[test]
    fn test_accumulates_across_timers() {
        let mut slot = Duration::ZERO;
        for _ in 0..3 {
            let _ = timed_early_return(&mut slot, false);
        }
        assert!(slot >= Duration::from_millis(6));
    }

    #[test]
    fn test_as_millis_f64() {
        assert_eq!(as_millis_f64(Duration::from_millis(250)), 250.0);
    }
}
