/// Fixed-timestep lag accumulator.
///
/// Each call adds the frame's delta to `lag` and drains it in whole steps.
/// The remainder carries over, so the simulation runs at a fixed step while
/// the number of ticks per frame varies. There is no cap on ticks per call;
/// the caller bounds the input (clock `max_delta`) or the output (frame loop).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedStepAccumulator {
    lag: f64,
}

/// Relative slack that absorbs float residue when deltas are chunked.
const STEP_EPSILON: f64 = 1e-9;

impl FixedStepAccumulator {
    pub fn new() -> Self {
        Self { lag: 0.0 }
    }

    /// Adds `delta_sec` and returns how many `step_sec` ticks to run.
    ///
    /// Negative, NaN and infinite deltas count as zero. A non-positive or NaN
    /// step yields no ticks and leaves the lag untouched. Counts beyond
    /// `u32::MAX` saturate.
    pub fn tick(&mut self, delta_sec: f64, step_sec: f64) -> u32 {
        if step_sec.is_nan() || step_sec <= 0.0 {
            return 0;
        }

        if delta_sec.is_finite() && delta_sec > 0.0 {
            let lag = self.lag + delta_sec;
            if lag.is_finite() {
                self.lag = lag;
            }
        }

        let slack = step_sec * STEP_EPSILON;
        let mut n = ((self.lag + slack) / step_sec).floor();
        if n >= 1.0 {
            self.lag -= n * step_sec;
        } else {
            n = 0.0;
        }
        // Division rounding can leave exactly one more step behind.
        if self.lag + slack >= step_sec {
            self.lag -= step_sec;
            n += 1.0;
        }

        if self.lag < 0.0 {
            self.lag = 0.0;
        } else if self.lag >= step_sec {
            self.lag %= step_sec;
        }
        // Float-to-int `as` saturates.
        n as u32
    }

    #[inline]
    pub fn lag(&self) -> f64 {
        self.lag
    }

    /// Interpolation factor `lag / step` in `[0, 1)`.
    pub fn alpha(&self, step_sec: f64) -> f64 {
        if step_sec > 0.0 {
            (self.lag / step_sec).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn reset(&mut self) {
        self.lag = 0.0;
    }
}
