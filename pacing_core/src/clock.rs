use crate::time::{MonotonicTime, TimeSource};

pub const DEFAULT_MAX_DELTA_SEC: f64 = 1.0;
pub const DEFAULT_TIME_STEP_SEC: f64 = 0.050;

/// Clock for one time domain (game or render).
///
/// Delta contract: `delta_time` is `new current_time - previous current_time`,
/// clamped to `[0, max_delta]`. The clamped value is cached and also reflected
/// in `start_time - last_time`, so both ways of reading the delta agree.
///
/// While paused, `update_time` does nothing; `step_forward` moves the clock by
/// one `time_step` and records a pending step for the frame loop to consume.
#[derive(Debug, Clone)]
pub struct SimClock<S: TimeSource = MonotonicTime> {
    source: S,

    current_time: f64,
    last_time: f64,
    start_time: f64,
    delta_time: f64,

    max_delta: f64,
    time_step: f64,
    paused: bool,
    pending_steps: u32,
}

impl SimClock<MonotonicTime> {
    pub fn monotonic() -> Self {
        Self::new(MonotonicTime::new())
    }
}

impl<S: TimeSource> SimClock<S> {
    pub fn new(source: S) -> Self {
        let now = source.now();
        Self {
            source,
            current_time: now,
            last_time: now,
            start_time: now,
            delta_time: 0.0,
            max_delta: DEFAULT_MAX_DELTA_SEC,
            time_step: DEFAULT_TIME_STEP_SEC,
            paused: false,
            pending_steps: 0,
        }
    }

    pub fn update_time(&mut self) {
        if self.paused {
            return;
        }

        self.last_time = self.current_time;
        self.current_time = self.source.now();
        self.start_time = self.current_time;

        let raw = (self.current_time - self.last_time).max(0.0);
        self.delta_time = raw.min(self.max_delta);

        if self.start_time - self.last_time > self.max_delta {
            self.last_time = self.start_time - self.max_delta;
        }
    }

    /// Advances `start_time` and `last_time` by one `time_step`.
    ///
    /// Meant for frame-by-frame stepping while paused. Calling it on a running
    /// clock double-advances time for one frame.
    pub fn step_forward(&mut self) {
        self.start_time += self.time_step;
        self.last_time += self.time_step;
        self.pending_steps = self.pending_steps.saturating_add(1);
    }

    /// Game time produced by `step_forward` since the previous call.
    pub fn take_stepped_time(&mut self) -> f64 {
        let steps = std::mem::take(&mut self.pending_steps);
        steps as f64 * self.time_step
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes the clock. `current_time` is re-anchored so the time spent
    /// paused does not show up as the next delta.
    pub fn unpause(&mut self) {
        if self.paused {
            self.paused = false;
            self.current_time = self.source.now();
        }
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    #[inline]
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    #[inline]
    pub fn last_time(&self) -> f64 {
        self.last_time
    }

    #[inline]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    #[inline]
    pub fn max_delta(&self) -> f64 {
        self.max_delta
    }

    /// Non-positive or non-finite values are ignored.
    pub fn set_max_delta(&mut self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            self.max_delta = secs;
        }
    }

    #[inline]
    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    pub fn set_time_step(&mut self, secs: f64) {
        if secs.is_finite() && secs > 0.0 {
            self.time_step = secs;
        }
    }

    /// Raw reading of the underlying source.
    #[inline]
    pub fn now(&self) -> f64 {
        self.source.now()
    }
}
