use crate::{
    accumulator::FixedStepAccumulator,
    config::TimingConfig,
    context::TimingContext,
    hooks::FrameHooks,
    limiter::FrameLimiter,
    phase::FrameStage,
    signals::ExitSignal,
    telemetry::TelemetryReporter,
    time::{MonotonicTime, TimeSource},
};

pub const FRAME_TICKS_COUNTER: &str = "frame_ticks";
pub const TOTAL_TICKS_COUNTER: &str = "total_ticks";
pub const TOTAL_FRAMES_COUNTER: &str = "total_frames";
pub const DROPPED_TICKS_COUNTER: &str = "total_dropped_ticks";

pub const FIXED_UPDATE_TIMER: &str = "fixed_update";
pub const RENDER_TIMER: &str = "render";

/// Per-frame snapshot handed to `FrameHooks::render`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
    /// Render clock delta for this frame (clamped).
    pub dt_sec: f64,
    /// Sum of render deltas since the loop started.
    pub t_sec: f64,

    /// Simulation ticks run during this frame.
    pub ticks: u32,
    /// Total simulation ticks run so far, including this frame's.
    pub fixed_tick: u64,
    pub fixed_step_sec: f64,
    /// Interpolation factor in `[0, 1)` between the last two simulation states.
    pub fixed_alpha: f64,
}

/// What hooks get to touch during a frame.
pub struct FrameContext<'a, S: TimeSource = MonotonicTime> {
    pub timing: &'a mut TimingContext<S>,
    pub exit_requested: &'a mut bool,
}

/// Drives one iteration at a time in a fixed order:
/// begin → poll events → update clocks → fixed ticks → render → limit →
/// record stats → end.
///
/// Ticks come from the game clock's delta (or its manual steps while paused).
/// `max_ticks_per_frame` bounds catch-up; surplus ticks are dropped.
pub struct FrameLoop<S: TimeSource + Clone = MonotonicTime> {
    timing: TimingContext<S>,
    accumulator: FixedStepAccumulator,
    limiter: FrameLimiter,
    telemetry: TelemetryReporter,

    tick_step: f64,
    max_ticks_per_frame: u32,

    game_time_since_tick: f64,
    t_sec: f64,
    frame_index: u64,
    fixed_tick: u64,

    exit_requested: bool,
    started: bool,
}

impl FrameLoop<MonotonicTime> {
    pub fn from_config(cfg: &TimingConfig) -> Self {
        Self::with_source(cfg, MonotonicTime::new())
    }
}

impl<S: TimeSource + Clone> FrameLoop<S> {
    pub fn with_source(cfg: &TimingConfig, source: S) -> Self {
        Self {
            timing: TimingContext::from_config(cfg, source),
            accumulator: FixedStepAccumulator::new(),
            limiter: FrameLimiter::new(cfg.frame.target_fps, cfg.sleeper()),
            telemetry: TelemetryReporter::new(cfg.telemetry.enabled, cfg.telemetry_period()),
            tick_step: cfg.tick_step_sec(),
            max_ticks_per_frame: cfg.sim.max_ticks_per_frame,
            game_time_since_tick: 0.0,
            t_sec: 0.0,
            frame_index: 0,
            fixed_tick: 0,
            exit_requested: false,
            started: false,
        }
    }

    pub fn with_limiter(mut self, limiter: FrameLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_telemetry(mut self, telemetry: TelemetryReporter) -> Self {
        self.telemetry = telemetry;
        self
    }

    #[inline]
    pub fn timing(&self) -> &TimingContext<S> {
        &self.timing
    }

    #[inline]
    pub fn timing_mut(&mut self) -> &mut TimingContext<S> {
        &mut self.timing
    }

    #[inline]
    pub fn accumulator(&self) -> &FixedStepAccumulator {
        &self.accumulator
    }

    #[inline]
    pub fn tick_step(&self) -> f64 {
        self.tick_step
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    #[inline]
    pub fn fixed_tick(&self) -> u64 {
        self.fixed_tick
    }

    #[inline]
    pub fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    #[inline]
    pub fn is_exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Calls `on_start` once and re-anchors both clocks so that setup time is
    /// not reported as the first delta.
    pub fn start<H: FrameHooks<S> + ?Sized>(&mut self, hooks: &mut H) {
        if self.started {
            return;
        }
        self.started = true;

        let mut ctx = FrameContext {
            timing: &mut self.timing,
            exit_requested: &mut self.exit_requested,
        };
        hooks.on_start(&mut ctx);

        self.timing.update_clocks();
        self.timing.game_clock.take_stepped_time();
        self.accumulator.reset();
        log::debug!("frame loop started, tick step {:.4}s", self.tick_step);
    }

    pub fn shutdown<H: FrameHooks<S> + ?Sized>(&mut self, hooks: &mut H) {
        if !self.started {
            return;
        }
        self.started = false;

        let mut ctx = FrameContext {
            timing: &mut self.timing,
            exit_requested: &mut self.exit_requested,
        };
        hooks.on_shutdown(&mut ctx);
        log::debug!(
            "frame loop stopped after {} frames, {} ticks",
            self.frame_index,
            self.fixed_tick
        );
    }

    /// Runs until `exit` fires or a hook requests exit. Returns frames run.
    pub fn run<H: FrameHooks<S> + ?Sized>(&mut self, hooks: &mut H, exit: &ExitSignal) -> u64 {
        self.run_while(hooks, |_| !exit.is_exit_requested())
    }

    /// Runs at most `frames` iterations (fewer if a hook requests exit).
    pub fn run_frames<H: FrameHooks<S> + ?Sized>(&mut self, hooks: &mut H, frames: u64) -> u64 {
        self.run_while(hooks, |done| done < frames)
    }

    fn run_while<H, F>(&mut self, hooks: &mut H, mut keep_going: F) -> u64
    where
        H: FrameHooks<S> + ?Sized,
        F: FnMut(u64) -> bool,
    {
        self.start(hooks);

        let mut done = 0u64;
        while !self.exit_requested && keep_going(done) {
            self.run_frame(hooks);
            done += 1;
        }

        self.shutdown(hooks);
        done
    }

    /// One full iteration.
    pub fn run_frame<H: FrameHooks<S> + ?Sized>(&mut self, hooks: &mut H) -> FrameInfo {
        if !self.started {
            self.start(hooks);
        }

        enter_stage::<S, _>(hooks, FrameStage::BeginFrame);
        self.limiter.begin_frame();
        self.timing.stats.reset_frame_counters();

        enter_stage::<S, _>(hooks, FrameStage::PollEvents);
        {
            let mut ctx = FrameContext {
                timing: &mut self.timing,
                exit_requested: &mut self.exit_requested,
            };
            hooks.poll_events(&mut ctx);
        }

        enter_stage::<S, _>(hooks, FrameStage::UpdateClocks);
        self.timing.update_clocks();
        let game_dt = if self.timing.game_clock.is_paused() {
            self.timing.game_clock.take_stepped_time()
        } else {
            self.timing.game_clock.delta_time()
        };
        let render_dt = self.timing.render_clock.delta_time();

        let ticks = self.drain_ticks(game_dt);
        self.game_time_since_tick += game_dt;

        {
            let step = self.tick_step;
            let mut ctx = FrameContext {
                timing: &mut self.timing,
                exit_requested: &mut self.exit_requested,
            };
            if ticks > 0 {
                ctx.timing.stats.start_timer(FIXED_UPDATE_TIMER);
                for _ in 0..ticks {
                    enter_stage::<S, _>(hooks, FrameStage::FixedUpdate);
                    hooks.fixed_update(step, &mut ctx);
                }
                ctx.timing.stats.end_timer(FIXED_UPDATE_TIMER);
            }
        }
        self.fixed_tick += u64::from(ticks);

        self.t_sec += render_dt;
        let info = FrameInfo {
            frame_index: self.frame_index,
            dt_sec: render_dt,
            t_sec: self.t_sec,
            ticks,
            fixed_tick: self.fixed_tick,
            fixed_step_sec: self.tick_step,
            fixed_alpha: self.accumulator.alpha(self.tick_step),
        };

        enter_stage::<S, _>(hooks, FrameStage::Render);
        {
            let mut ctx = FrameContext {
                timing: &mut self.timing,
                exit_requested: &mut self.exit_requested,
            };
            ctx.timing.stats.start_timer(RENDER_TIMER);
            hooks.render(&info, &mut ctx);
            ctx.timing.stats.end_timer(RENDER_TIMER);
        }

        enter_stage::<S, _>(hooks, FrameStage::LimitFrame);
        let achieved = self.limiter.end_frame();

        enter_stage::<S, _>(hooks, FrameStage::RecordStats);
        self.record_stats(achieved.as_secs_f64(), ticks);
        self.telemetry.maybe_report(&self.timing.stats);

        enter_stage::<S, _>(hooks, FrameStage::EndFrame);
        self.frame_index += 1;
        info
    }

    fn drain_ticks(&mut self, game_dt: f64) -> u32 {
        let ticks = self.accumulator.tick(game_dt, self.tick_step);
        let cap = self.max_ticks_per_frame;
        if cap == 0 || ticks <= cap {
            return ticks;
        }

        let dropped = ticks - cap;
        self.accumulator.reset();
        self.timing
            .stats
            .add_to_counter(DROPPED_TICKS_COUNTER, i64::from(dropped));
        log::warn!("tick cap reached: ran {cap}, dropped {dropped} (spiral prevented)");
        cap
    }

    fn record_stats(&mut self, frame_sec: f64, ticks: u32) {
        let stats = &mut self.timing.stats;
        stats.record_frame(frame_sec);

        if ticks > 0 {
            let per_tick = self.game_time_since_tick / f64::from(ticks);
            for _ in 0..ticks {
                stats.record_update(per_tick);
            }
            self.game_time_since_tick = 0.0;
        }

        stats.set_counter(FRAME_TICKS_COUNTER, i64::from(ticks));
        stats.add_to_counter(TOTAL_TICKS_COUNTER, i64::from(ticks));
        stats.increment_counter(TOTAL_FRAMES_COUNTER);
    }
}

fn enter_stage<S, H>(hooks: &mut H, stage: FrameStage)
where
    S: TimeSource,
    H: FrameHooks<S> + ?Sized,
{
    log::trace!(target: "pacing::frame", "{}", stage.as_str());
    hooks.on_stage(stage);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::ManualTime;

    /// Advances manual time by a fixed amount during every render.
    struct Advance {
        time: ManualTime,
        per_frame: f64,
        fixed_steps: Vec<f64>,
    }

    impl FrameHooks<ManualTime> for Advance {
        fn fixed_update(&mut self, step_sec: f64, _ctx: &mut FrameContext<'_, ManualTime>) {
            self.fixed_steps.push(step_sec);
        }

        fn render(&mut self, _frame: &FrameInfo, _ctx: &mut FrameContext<'_, ManualTime>) {
            self.time.advance(self.per_frame);
        }
    }

    fn headless(cfg: &TimingConfig, time: &ManualTime) -> FrameLoop<ManualTime> {
        FrameLoop::with_source(cfg, time.clone())
            .with_limiter(FrameLimiter::uncapped())
            .with_telemetry(TelemetryReporter::disabled())
    }

    #[test]
    fn ticks_follow_game_time_not_frame_count() {
        let cfg = TimingConfig::default();
        let time = ManualTime::new(0.0);
        let mut lp = headless(&cfg, &time);
        let mut hooks = Advance { time: time.clone(), per_frame: 0.01, fixed_steps: Vec::new() };

        // 100 frames of 10 ms = 1 s of game time = 20 ticks at 20 Hz. The first
        // frame sees no delta, so the last render's advance is not yet counted.
        lp.run_frames(&mut hooks, 101);

        assert_eq!(lp.fixed_tick(), 20);
        assert_eq!(hooks.fixed_steps.len(), 20);
        assert!(hooks.fixed_steps.iter().all(|s| (*s - 0.05).abs() < 1e-12));
        assert_eq!(lp.timing().stats.counter(TOTAL_FRAMES_COUNTER), 101);
        assert_eq!(lp.timing().stats.counter(TOTAL_TICKS_COUNTER), 20);
        assert!((lp.timing().stats.ups() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn cap_drops_surplus_ticks() {
        let mut cfg = TimingConfig::default();
        cfg.sim.max_ticks_per_frame = 4;
        let time = ManualTime::new(0.0);
        let mut lp = headless(&cfg, &time);
        let mut hooks = Advance { time: time.clone(), per_frame: 0.0, fixed_steps: Vec::new() };

        lp.start(&mut hooks);
        time.advance(0.5);
        let info = lp.run_frame(&mut hooks);

        assert_eq!(info.ticks, 4);
        assert_eq!(lp.accumulator().lag(), 0.0);
        assert_eq!(lp.timing().stats.counter(DROPPED_TICKS_COUNTER), 6);
    }

    #[test]
    fn stall_is_clamped_before_ticks_are_drained() {
        let mut cfg = TimingConfig::default();
        cfg.frame.max_delta_ms = 100;
        let time = ManualTime::new(0.0);
        let mut lp = headless(&cfg, &time);
        let mut hooks = Advance { time: time.clone(), per_frame: 0.0, fixed_steps: Vec::new() };

        lp.start(&mut hooks);
        time.advance(5.0);
        let info = lp.run_frame(&mut hooks);

        assert!(info.dt_sec <= 0.1);
        assert_eq!(info.ticks, 2);
    }

    #[test]
    fn paused_game_clock_only_advances_by_steps() {
        let cfg = TimingConfig::default();
        let time = ManualTime::new(0.0);
        let mut lp = headless(&cfg, &time);
        let mut hooks = Advance { time: time.clone(), per_frame: 0.05, fixed_steps: Vec::new() };

        lp.start(&mut hooks);
        lp.timing_mut().game_clock.pause();
        lp.run_frames(&mut hooks, 10);
        assert_eq!(lp.fixed_tick(), 0);

        lp.timing_mut().game_clock.step_forward();
        let info = lp.run_frame(&mut hooks);
        assert_eq!(info.ticks, 1);
        assert!(info.dt_sec > 0.0);
    }

    #[test]
    fn frame_counters_reset_each_frame() {
        let cfg = TimingConfig::default();
        let time = ManualTime::new(0.0);
        let mut lp = headless(&cfg, &time);
        let mut hooks = Advance { time: time.clone(), per_frame: 0.0, fixed_steps: Vec::new() };

        lp.start(&mut hooks);
        time.advance(0.1);
        lp.run_frame(&mut hooks);
        assert_eq!(lp.timing().stats.counter(FRAME_TICKS_COUNTER), 2);

        lp.run_frame(&mut hooks);
        assert_eq!(lp.timing().stats.counter(FRAME_TICKS_COUNTER), 0);
        assert_eq!(lp.timing().stats.counter(TOTAL_TICKS_COUNTER), 2);
    }

    #[test]
    fn alpha_reflects_leftover_lag() {
        let cfg = TimingConfig::default();
        let time = ManualTime::new(0.0);
        let mut lp = headless(&cfg, &time);
        let mut hooks = Advance { time: time.clone(), per_frame: 0.0, fixed_steps: Vec::new() };

        lp.start(&mut hooks);
        time.advance(0.075);
        let info = lp.run_frame(&mut hooks);
        assert_eq!(info.ticks, 1);
        assert!((info.fixed_alpha - 0.5).abs() < 1e-9);
    }
}
