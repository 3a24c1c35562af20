use crate::{
    clock::SimClock,
    config::TimingConfig,
    stats::StatsAggregator,
    time::{MonotonicTime, TimeSource},
};

/// The game clock, render clock and statistics for one application.
///
/// Constructed once and passed by reference to whatever needs timing.
#[derive(Debug)]
pub struct TimingContext<S: TimeSource = MonotonicTime> {
    pub game_clock: SimClock<S>,
    pub render_clock: SimClock<S>,
    pub stats: StatsAggregator,
}

impl TimingContext<MonotonicTime> {
    pub fn monotonic() -> Self {
        Self::new(MonotonicTime::new())
    }
}

impl<S: TimeSource + Clone> TimingContext<S> {
    pub fn new(source: S) -> Self {
        Self {
            game_clock: SimClock::new(source.clone()),
            render_clock: SimClock::new(source),
            stats: StatsAggregator::new(),
        }
    }

    pub fn from_config(cfg: &TimingConfig, source: S) -> Self {
        let mut ctx = Self::new(source);
        for clock in [&mut ctx.game_clock, &mut ctx.render_clock] {
            clock.set_max_delta(cfg.max_delta_sec());
            clock.set_time_step(cfg.manual_step_sec());
        }
        ctx
    }
}

impl<S: TimeSource> TimingContext<S> {
    /// Render clock first, then the game clock.
    pub fn update_clocks(&mut self) {
        self.render_clock.update_time();
        self.game_clock.update_time();
    }
}
