use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::info;

use pacing_core::{
    frame::{FrameContext, FrameInfo},
    logging::{init_logging, LoggingConfig},
    ExitSignal, FrameHooks, FrameLoop, TimerResolution, TimingConfig,
};

/// A value bouncing between two walls, integrated at the fixed step.
struct BouncingWorld {
    pos: f64,
    vel: f64,
    prev_pos: f64,
    bounces: u64,
    max_frames: Option<u64>,
}

impl BouncingWorld {
    const WALL: f64 = 10.0;

    fn new(max_frames: Option<u64>) -> Self {
        Self { pos: 0.0, vel: 4.0, prev_pos: 0.0, bounces: 0, max_frames }
    }
}

impl FrameHooks for BouncingWorld {
    fn on_start(&mut self, ctx: &mut FrameContext<'_>) {
        ctx.timing.stats.set_debug_string("world", "bouncing");
        info!("demo started");
    }

    fn fixed_update(&mut self, step_sec: f64, ctx: &mut FrameContext<'_>) {
        self.prev_pos = self.pos;
        self.pos += self.vel * step_sec;

        if self.pos.abs() > Self::WALL {
            self.pos = self.pos.clamp(-Self::WALL, Self::WALL);
            self.vel = -self.vel;
            self.bounces += 1;
            ctx.timing.stats.increment_counter("bounces");
        }
    }

    fn render(&mut self, frame: &FrameInfo, ctx: &mut FrameContext<'_>) {
        let shown = self.prev_pos + (self.pos - self.prev_pos) * frame.fixed_alpha;
        ctx.timing.stats.set_metric("position", shown);
        ctx.timing.stats.increment_counter("frame_draw_calls");

        if let Some(max) = self.max_frames {
            if frame.frame_index + 1 >= max {
                *ctx.exit_requested = true;
            }
        }
    }

    fn on_shutdown(&mut self, ctx: &mut FrameContext<'_>) {
        ctx.timing
            .stats
            .report_memory_usage("world", std::mem::size_of::<Self>());
        info!("demo stopped after {} bounces", self.bounces);
    }
}

struct Args {
    config: Option<PathBuf>,
    frames: Option<u64>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args { config: None, frames: None };
    let mut it = std::env::args().skip(1);

    while let Some(a) = it.next() {
        match a.as_str() {
            "--frames" => {
                let v = it.next().context("--frames needs a value")?;
                args.frames = Some(v.parse().with_context(|| format!("bad frame count '{v}'"))?);
            }
            "-h" | "--help" => {
                println!("usage: pacing_demo [CONFIG.toml] [--frames N]");
                std::process::exit(0);
            }
            other if other.starts_with('-') => bail!("unknown flag '{other}'"),
            path => args.config = Some(PathBuf::from(path)),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::from_env())?;
    let args = parse_args()?;

    let cfg = match &args.config {
        Some(path) => TimingConfig::load_toml(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => TimingConfig::default(),
    };
    info!(
        "target {} fps, {} Hz simulation",
        cfg.frame.target_fps, cfg.sim.tick_rate_hz
    );

    let exit = ExitSignal::new();
    exit.install_ctrlc_handler()?;

    let _resolution = cfg
        .sleep
        .high_resolution_timer
        .then(|| TimerResolution::acquire(cfg.sleep.timer_period_ms));

    let mut frame_loop = FrameLoop::from_config(&cfg);
    let mut world = BouncingWorld::new(args.frames);
    let frames = frame_loop.run(&mut world, &exit);

    info!("ran {frames} frames, {} ticks", frame_loop.fixed_tick());
    for line in frame_loop.timing().stats.snapshot_lines() {
        info!("{line}");
    }
    Ok(())
}
