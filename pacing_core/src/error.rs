use thiserror::Error;

/// Errors surfaced by the timing core.
///
/// Timing itself does not fail: sleeping, clocks and statistics degrade or
/// no-op instead. What remains is setup (configuration, logger, signal hook).
#[derive(Debug, Error)]
pub enum TimingError {
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("logger init failed: {0}")]
    Logger(String),

    #[error("ctrl-c handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

impl TimingError {
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

pub type TimingResult<T> = Result<T, TimingError>;
