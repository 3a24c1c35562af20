use std::{
    io::Write,
    sync::atomic::{AtomicBool, Ordering},
};

use env_logger::{Builder, WriteStyle};
use log::LevelFilter;

use crate::error::{TimingError, TimingResult};

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: LevelFilter,
    pub colors: bool,
    pub include_target: bool,
}

impl LoggingConfig {
    /// `PACING_LOG` (level), `PACING_LOG_COLORS` and `PACING_LOG_MODULE`
    /// (`0` disables).
    pub fn from_env() -> Self {
        let level = std::env::var("PACING_LOG")
            .ok()
            .and_then(|v| v.parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::Info);
        let colors = std::env::var("PACING_LOG_COLORS")
            .map(|v| v != "0")
            .unwrap_or(true);
        let include_target = std::env::var("PACING_LOG_MODULE")
            .map(|v| v != "0")
            .unwrap_or(true);

        Self { level, colors, include_target }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Installs the global `env_logger` backend. Later calls are no-ops.
pub fn init_logging(config: LoggingConfig) -> TimingResult<()> {
    if INITIALIZED.swap(true, Ordering::AcqRel) {
        return Ok(());
    }

    let mut builder = Builder::new();
    builder.filter_level(config.level);
    builder.write_style(if config.colors { WriteStyle::Auto } else { WriteStyle::Never });

    let include_target = config.include_target;
    builder.format(move |buf, record| {
        let style = buf.default_level_style(record.level());
        if include_target {
            writeln!(
                buf,
                "[{style}{:<5}{style:#}] {:<24} {}",
                record.level(),
                record.target(),
                record.args()
            )
        } else {
            writeln!(buf, "[{style}{:<5}{style:#}] {}", record.level(), record.args())
        }
    });

    builder.try_init().map_err(|e| {
        INITIALIZED.store(false, Ordering::Release);
        TimingError::Logger(e.to_string())
    })?;

    log::debug!("logging initialized at {}", config.level);
    Ok(())
}
