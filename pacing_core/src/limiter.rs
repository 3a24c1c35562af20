use std::time::{Duration, Instant};

use crate::sleep::{spin_until, PrecisionSleeper};

/// Caps the render rate at a target frame duration.
///
/// `begin_frame` marks the start, `end_frame` sleeps for what is left of the
/// budget and then spins on the measured elapsed time, since neither phase of
/// the sleeper is trusted to land exactly on the deadline.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    target: Option<Duration>,
    sleeper: PrecisionSleeper,
    frame_start: Instant,
}

impl FrameLimiter {
    /// `target_fps <= 0` (or non-finite) disables limiting.
    pub fn new(target_fps: f64, sleeper: PrecisionSleeper) -> Self {
        Self {
            target: frame_time_for(target_fps),
            sleeper,
            frame_start: Instant::now(),
        }
    }

    pub fn uncapped() -> Self {
        Self::new(0.0, PrecisionSleeper::default())
    }

    pub fn set_target_fps(&mut self, target_fps: f64) {
        self.target = frame_time_for(target_fps);
    }

    #[inline]
    pub fn target_frame_time(&self) -> Option<Duration> {
        self.target
    }

    #[inline]
    pub fn sleeper(&self) -> &PrecisionSleeper {
        &self.sleeper
    }

    pub fn begin_frame(&mut self) {
        self.frame_start = Instant::now();
    }

    #[inline]
    pub fn frame_elapsed(&self) -> Duration {
        self.frame_start.elapsed()
    }

    /// Waits out the rest of the frame budget and returns the achieved frame
    /// duration. Frames already over budget return immediately.
    pub fn end_frame(&mut self) -> Duration {
        let Some(target) = self.target else {
            return self.frame_elapsed();
        };

        let elapsed = self.frame_elapsed();
        if elapsed < target {
            self.sleeper.sleep(target - elapsed);
            spin_until(self.frame_start + target);
        }

        self.frame_elapsed()
    }
}

fn frame_time_for(fps: f64) -> Option<Duration> {
    if fps.is_finite() && fps > 0.0 {
        Duration::try_from_secs_f64(1.0 / fps).ok()
    } else {
        None
    }
}
