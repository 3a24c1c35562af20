//! Precision sleeping and the process-wide OS timer resolution.
//!
//! `PrecisionSleeper` blocks in two phases: one coarse `thread::sleep` that
//! stops short of the deadline by a safety margin, then a yielding spin until
//! the deadline has passed. The coarse phase keeps CPU usage low, the spin
//! phase absorbs the scheduler's wake-up jitter.
//!
//! `TimerResolution` raises the OS timer granularity (Windows `timeBeginPeriod`)
//! for as long as at least one guard is alive.

use std::{
    thread,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

pub const DEFAULT_COARSE_THRESHOLD: Duration = Duration::from_millis(2);
pub const DEFAULT_SAFETY_MARGIN: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrecisionSleeper {
    coarse_threshold: Duration,
    safety_margin: Duration,
}

impl Default for PrecisionSleeper {
    fn default() -> Self {
        Self {
            coarse_threshold: DEFAULT_COARSE_THRESHOLD,
            safety_margin: DEFAULT_SAFETY_MARGIN,
        }
    }
}

impl PrecisionSleeper {
    /// `safety_margin` is capped at `coarse_threshold`.
    pub fn new(coarse_threshold: Duration, safety_margin: Duration) -> Self {
        Self {
            coarse_threshold,
            safety_margin: safety_margin.min(coarse_threshold),
        }
    }

    #[inline]
    pub fn coarse_threshold(&self) -> Duration {
        self.coarse_threshold
    }

    #[inline]
    pub fn safety_margin(&self) -> Duration {
        self.safety_margin
    }

    /// Sleeps for `ms` milliseconds. Non-positive and NaN durations return
    /// immediately without yielding.
    pub fn sleep_ms(&self, ms: f64) {
        if ms.is_nan() || ms <= 0.0 {
            return;
        }
        let Ok(d) = Duration::try_from_secs_f64(ms / 1000.0) else {
            return;
        };
        self.sleep(d);
    }

    pub fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        let Some(deadline) = Instant::now().checked_add(d) else {
            log::warn!("sleep of {d:?} has no representable deadline, skipped");
            return;
        };
        self.sleep_until(deadline);
    }

    /// Blocks until `Instant::now() >= deadline`. Not cancellable.
    pub fn sleep_until(&self, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }

        if remaining > self.coarse_threshold {
            thread::sleep(remaining - self.safety_margin);
        }

        spin_until(deadline);
    }
}

/// Yielding busy-wait until `deadline`.
#[inline]
pub fn spin_until(deadline: Instant) {
    while Instant::now() < deadline {
        thread::yield_now();
    }
}

// ===============================
// OS timer resolution
// ===============================

struct ResolutionState {
    holders: usize,
    granted: Option<u32>,
}

static RESOLUTION: Mutex<ResolutionState> = parking_lot::const_mutex(ResolutionState {
    holders: 0,
    granted: None,
});

/// Scoped hold on a finer OS timer period.
///
/// The first guard requests the period from the OS, the last guard dropped
/// releases it. Requests from later guards share the first one's period.
/// Failure to obtain the period is not an error: the guard is created anyway
/// and `is_active` reports `false`.
#[must_use = "the timer resolution is released when the guard is dropped"]
#[derive(Debug)]
pub struct TimerResolution {
    active: bool,
}

impl TimerResolution {
    pub fn acquire(period_ms: u32) -> Self {
        Self::acquire_with(period_ms, platform::begin)
    }

    fn acquire_with(period_ms: u32, begin: impl FnOnce(u32) -> bool) -> Self {
        let mut state = RESOLUTION.lock();
        state.holders += 1;

        if state.holders == 1 {
            let period = period_ms.max(1);
            if begin(period) {
                log::debug!("timer resolution set to {period} ms");
                state.granted = Some(period);
            } else {
                log::warn!(
                    "timer resolution of {period} ms unavailable; sleeping with default granularity"
                );
            }
        }

        Self { active: state.granted.is_some() }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Number of live guards in the process.
    pub fn holders() -> usize {
        RESOLUTION.lock().holders
    }

    fn release_with(end: impl FnOnce(u32)) {
        let mut state = RESOLUTION.lock();
        state.holders = state.holders.saturating_sub(1);

        if state.holders == 0 {
            if let Some(period) = state.granted.take() {
                end(period);
                log::debug!("timer resolution released");
            }
        }
    }
}

impl Drop for TimerResolution {
    fn drop(&mut self) {
        Self::release_with(platform::end);
    }
}

#[cfg(windows)]
mod platform {
    use windows_sys::Win32::Media::{timeBeginPeriod, timeEndPeriod, TIMERR_NOERROR};

    pub fn begin(period_ms: u32) -> bool {
        // SAFETY: plain winmm call with a value argument; paired with `end`.
        unsafe { timeBeginPeriod(period_ms) == TIMERR_NOERROR }
    }

    pub fn end(period_ms: u32) {
        // SAFETY: only called for a period previously granted by `begin`.
        unsafe {
            timeEndPeriod(period_ms);
        }
    }
}

#[cfg(not(windows))]
mod platform {
    // Timer slack on unix-like systems is already fine-grained.
    pub fn begin(_period_ms: u32) -> bool {
        true
    }

    pub fn end(_period_ms: u32) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn non_positive_durations_return_immediately() {
        let sleeper = PrecisionSleeper::default();
        for ms in [0.0, -5.0, f64::NAN] {
            let t0 = Instant::now();
            sleeper.sleep_ms(ms);
            assert!(t0.elapsed() < Duration::from_micros(100), "{ms} took {:?}", t0.elapsed());
        }
    }

    #[test]
    fn sleep_reaches_deadline_with_small_overshoot() {
        let sleeper = PrecisionSleeper::default();
        let t0 = Instant::now();
        sleeper.sleep_ms(50.0);
        let elapsed = t0.elapsed();

        assert!(elapsed >= Duration::from_millis(50));
        // Quiescent systems land well under 55 ms; CI boxes get some headroom.
        assert!(elapsed < Duration::from_millis(80), "overshoot: {elapsed:?}");
    }

    #[test]
    #[ignore = "timing-sensitive; run on a quiet machine"]
    fn sleep_overshoot_stays_under_five_ms() {
        let sleeper = PrecisionSleeper::default();
        let t0 = Instant::now();
        sleeper.sleep_ms(50.0);
        let elapsed = t0.elapsed();

        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_millis(55), "overshoot: {elapsed:?}");
    }

    #[test]
    fn unrepresentable_deadline_does_not_panic() {
        let sleeper = PrecisionSleeper::default();
        let t0 = Instant::now();
        sleeper.sleep(Duration::from_secs(u64::MAX / 2));
        sleeper.sleep_ms(1e22);
        assert!(t0.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn short_sleep_spins_only() {
        let sleeper = PrecisionSleeper::default();
        let t0 = Instant::now();
        sleeper.sleep(Duration::from_micros(500));
        assert!(t0.elapsed() >= Duration::from_micros(500));
    }

    #[test]
    fn past_deadline_is_a_no_op() {
        let sleeper = PrecisionSleeper::default();
        let deadline = Instant::now();
        thread::sleep(Duration::from_millis(1));
        let t0 = Instant::now();
        sleeper.sleep_until(deadline);
        assert!(t0.elapsed() < Duration::from_millis(1));
    }

    #[test]
    fn margin_never_exceeds_threshold() {
        let s = PrecisionSleeper::new(Duration::from_millis(1), Duration::from_millis(5));
        assert_eq!(s.safety_margin(), Duration::from_millis(1));
    }

    // Guards share global state; everything touching it lives in one test.
    #[test]
    fn resolution_is_acquired_once_and_released_once() {
        let begins = Cell::new(0u32);
        let ends = Cell::new(0u32);

        let outer = TimerResolution::acquire_with(1, |_| {
            begins.set(begins.get() + 1);
            true
        });
        let inner = TimerResolution::acquire_with(1, |_| {
            begins.set(begins.get() + 1);
            true
        });
        assert!(outer.is_active());
        assert!(inner.is_active());
        assert_eq!(begins.get(), 1);
        assert_eq!(TimerResolution::holders(), 2);

        // Route the release through the counting hook instead of `Drop`.
        std::mem::forget(inner);
        TimerResolution::release_with(|_| ends.set(ends.get() + 1));
        assert_eq!(ends.get(), 0);

        std::mem::forget(outer);
        TimerResolution::release_with(|_| ends.set(ends.get() + 1));
        assert_eq!(ends.get(), 1);
        assert_eq!(TimerResolution::holders(), 0);

        let degraded = TimerResolution::acquire_with(1, |_| false);
        assert!(!degraded.is_active());
        drop(degraded);
        assert_eq!(TimerResolution::holders(), 0);

        let real = TimerResolution::acquire(1);
        drop(real);
        assert_eq!(TimerResolution::holders(), 0);
    }
}
