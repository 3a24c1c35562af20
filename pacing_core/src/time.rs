use std::{
    cell::Cell,
    rc::Rc,
    sync::OnceLock,
    time::Instant,
};

/// Monotonic seconds since an arbitrary, fixed epoch.
///
/// Only differences between two readings are meaningful.
pub trait TimeSource {
    fn now(&self) -> f64;
}

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Reads `Instant` against a single process-wide epoch.
///
/// The epoch is anchored by the first reading anywhere in the process, so two
/// `MonotonicTime` values always agree. Wall-clock adjustments do not affect it.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicTime;

impl MonotonicTime {
    pub fn new() -> Self {
        EPOCH.get_or_init(Instant::now);
        Self
    }

    /// The instant all readings are relative to.
    pub fn epoch() -> Instant {
        *EPOCH.get_or_init(Instant::now)
    }
}

impl TimeSource for MonotonicTime {
    #[inline]
    fn now(&self) -> f64 {
        Self::epoch().elapsed().as_secs_f64()
    }
}

/// Manually driven time, shared between clones.
///
/// Used for deterministic stepping (replays, tests). Time never goes backwards:
/// negative advances and earlier `set` values are ignored.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    t: Rc<Cell<f64>>,
}

impl ManualTime {
    pub fn new(start_sec: f64) -> Self {
        Self { t: Rc::new(Cell::new(start_sec.max(0.0))) }
    }

    pub fn advance(&self, secs: f64) {
        if secs > 0.0 {
            self.t.set(self.t.get() + secs);
        }
    }

    pub fn set(&self, secs: f64) {
        if secs > self.t.get() {
            self.t.set(secs);
        }
    }
}

impl TimeSource for ManualTime {
    #[inline]
    fn now(&self) -> f64 {
        self.t.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_readings_never_decrease() {
        let src = MonotonicTime::new();
        let mut prev = src.now();
        for _ in 0..1000 {
            let t = src.now();
            assert!(t >= prev);
            prev = t;
        }
    }

    #[test]
    fn monotonic_instances_share_epoch() {
        let a = MonotonicTime::new();
        let b = MonotonicTime;
        let ta = a.now();
        let tb = b.now();
        assert!(tb >= ta);
        assert!(tb - ta < 0.5);
    }

    #[test]
    fn manual_time_is_shared_and_monotonic() {
        let t = ManualTime::new(1.0);
        let view = t.clone();

        t.advance(0.5);
        assert_eq!(view.now(), 1.5);

        t.advance(-3.0);
        t.set(0.2);
        assert_eq!(view.now(), 1.5);

        t.set(4.0);
        assert_eq!(view.now(), 4.0);
    }
}
