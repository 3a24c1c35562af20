//! Frame pacing and timing core.
//!
//! Renders at a bounded rate while the simulation advances at a fixed,
//! independent step. The pieces, leaves first:
//!
//! - [`time`]: monotonic and manual time sources
//! - [`clock`]: `SimClock`, clamped deltas with pause and single-stepping
//! - [`sleep`]: precision sleep and the scoped OS timer resolution
//! - [`accumulator`]: fixed-step lag accumulator
//! - [`limiter`]: frame rate cap
//! - [`stats`]: rolling FPS/UPS and named debug values
//! - [`frame`]: the loop that ties them together in a fixed order

pub mod accumulator;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod frame;
pub mod hooks;
pub mod limiter;
pub mod logging;
pub mod phase;
pub mod signals;
pub mod sleep;
pub mod stats;
pub mod telemetry;
pub mod time;

pub use accumulator::FixedStepAccumulator;
pub use clock::SimClock;
pub use config::TimingConfig;
pub use context::TimingContext;
pub use error::{TimingError, TimingResult};
pub use frame::{FrameContext, FrameInfo, FrameLoop};
pub use hooks::FrameHooks;
pub use limiter::FrameLimiter;
pub use phase::FrameStage;
pub use signals::ExitSignal;
pub use sleep::{PrecisionSleeper, TimerResolution};
pub use stats::StatsAggregator;
pub use telemetry::TelemetryReporter;
pub use time::{ManualTime, MonotonicTime, TimeSource};
