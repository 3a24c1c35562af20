use crate::{
    frame::{FrameContext, FrameInfo},
    phase::FrameStage,
    time::{MonotonicTime, TimeSource},
};

/// Application side of the frame loop.
///
/// The loop owns timing; the hooks own events, simulation and rendering.
/// Simulation only ever sees the fixed step.
pub trait FrameHooks<S: TimeSource = MonotonicTime> {
    fn on_start(&mut self, _ctx: &mut FrameContext<'_, S>) {}

    /// Once per iteration, before any delta is read.
    fn poll_events(&mut self, _ctx: &mut FrameContext<'_, S>) {}

    /// Once per simulation tick.
    fn fixed_update(&mut self, _step_sec: f64, _ctx: &mut FrameContext<'_, S>) {}

    fn render(&mut self, _frame: &FrameInfo, _ctx: &mut FrameContext<'_, S>) {}

    fn on_shutdown(&mut self, _ctx: &mut FrameContext<'_, S>) {}

    /// Observes every stage as it begins.
    fn on_stage(&mut self, _stage: FrameStage) {}
}
