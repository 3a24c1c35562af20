use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    error::{TimingError, TimingResult},
    sleep::PrecisionSleeper,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub sim: SimConfig,
    #[serde(default)]
    pub sleep: SleepConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl TimingConfig {
    pub fn load_toml(path: impl AsRef<Path>) -> TimingResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> TimingResult<Self> {
        let cfg: TimingConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> TimingResult<()> {
        let fps = self.frame.target_fps;
        if !fps.is_finite() || fps < 0.0 {
            return Err(TimingError::invalid(format!(
                "frame.target_fps must be >= 0 (0 = uncapped), got {fps}"
            )));
        }
        if self.frame.max_delta_ms == 0 {
            return Err(TimingError::invalid("frame.max_delta_ms must be > 0"));
        }

        let hz = self.sim.tick_rate_hz;
        if !hz.is_finite() || hz <= 0.0 {
            return Err(TimingError::invalid(format!(
                "sim.tick_rate_hz must be > 0, got {hz}"
            )));
        }
        if self.sim.manual_step_ms == 0 {
            return Err(TimingError::invalid("sim.manual_step_ms must be > 0"));
        }

        if self.sleep.safety_margin_us > self.sleep.coarse_threshold_us {
            return Err(TimingError::invalid(format!(
                "sleep.safety_margin_us ({}) exceeds sleep.coarse_threshold_us ({})",
                self.sleep.safety_margin_us, self.sleep.coarse_threshold_us
            )));
        }

        if self.telemetry.period_ms == 0 {
            return Err(TimingError::invalid("telemetry.period_ms must be > 0"));
        }
        Ok(())
    }

    #[inline]
    pub fn tick_step_sec(&self) -> f64 {
        1.0 / self.sim.tick_rate_hz
    }

    #[inline]
    pub fn max_delta_sec(&self) -> f64 {
        self.frame.max_delta_ms as f64 / 1000.0
    }

    #[inline]
    pub fn manual_step_sec(&self) -> f64 {
        self.sim.manual_step_ms as f64 / 1000.0
    }

    /// `None` when uncapped.
    pub fn target_frame_time(&self) -> Option<Duration> {
        let fps = self.frame.target_fps;
        if fps > 0.0 {
            Duration::try_from_secs_f64(1.0 / fps).ok()
        } else {
            None
        }
    }

    pub fn sleeper(&self) -> PrecisionSleeper {
        PrecisionSleeper::new(
            Duration::from_micros(self.sleep.coarse_threshold_us),
            Duration::from_micros(self.sleep.safety_margin_us),
        )
    }

    #[inline]
    pub fn telemetry_period(&self) -> Duration {
        Duration::from_millis(self.telemetry.period_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// 0 disables the frame limiter.
    #[serde(default = "default_target_fps")]
    pub target_fps: f64,
    #[serde(default = "default_max_delta_ms")]
    pub max_delta_ms: u32,
}

fn default_target_fps() -> f64 { 240.0 }
fn default_max_delta_ms() -> u32 { 1000 }

impl Default for FrameConfig {
    fn default() -> Self {
        Self { target_fps: default_target_fps(), max_delta_ms: default_max_delta_ms() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default = "default_tick_rate_hz")]
    pub tick_rate_hz: f64,
    /// 0 = no cap.
    #[serde(default)]
    pub max_ticks_per_frame: u32,
    /// Game time added per `step_forward` while paused.
    #[serde(default = "default_manual_step_ms")]
    pub manual_step_ms: u32,
}

fn default_tick_rate_hz() -> f64 { 20.0 }
fn default_manual_step_ms() -> u32 { 50 }

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: default_tick_rate_hz(),
            max_ticks_per_frame: 0,
            manual_step_ms: default_manual_step_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepConfig {
    #[serde(default = "default_coarse_threshold_us")]
    pub coarse_threshold_us: u64,
    #[serde(default = "default_safety_margin_us")]
    pub safety_margin_us: u64,
    #[serde(default = "default_timer_period_ms")]
    pub timer_period_ms: u32,
    #[serde(default = "default_true")]
    pub high_resolution_timer: bool,
}

fn default_coarse_threshold_us() -> u64 { 2000 }
fn default_safety_margin_us() -> u64 { 1000 }
fn default_timer_period_ms() -> u32 { 1 }
fn default_true() -> bool { true }

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            coarse_threshold_us: default_coarse_threshold_us(),
            safety_margin_us: default_safety_margin_us(),
            timer_period_ms: default_timer_period_ms(),
            high_resolution_timer: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

fn default_period_ms() -> u64 { 1000 }

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { enabled: true, period_ms: default_period_ms() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = TimingConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, TimingConfig::default());
        assert_eq!(cfg.frame.target_fps, 240.0);
        assert!((cfg.tick_step_sec() - 0.05).abs() < 1e-12);
        assert_eq!(cfg.max_delta_sec(), 1.0);
        assert_eq!(cfg.sleeper(), PrecisionSleeper::default());
    }

    #[test]
    fn partial_sections_fill_in_defaults() {
        let cfg = TimingConfig::from_toml_str(
            r#"
            [frame]
            target_fps = 60.0

            [sim]
            max_ticks_per_frame = 8
            "#,
        )
        .unwrap();

        assert_eq!(cfg.frame.target_fps, 60.0);
        assert_eq!(cfg.frame.max_delta_ms, 1000);
        assert_eq!(cfg.sim.tick_rate_hz, 20.0);
        assert_eq!(cfg.sim.max_ticks_per_frame, 8);
        assert!(cfg.telemetry.enabled);
    }

    #[test]
    fn serialized_defaults_parse_back() {
        let text = toml::to_string(&TimingConfig::default()).unwrap();
        let cfg = TimingConfig::from_toml_str(&text).unwrap();
        assert_eq!(cfg, TimingConfig::default());
    }

    #[test]
    fn zero_fps_means_uncapped() {
        let cfg = TimingConfig::from_toml_str("[frame]\ntarget_fps = 0.0\n").unwrap();
        assert_eq!(cfg.target_frame_time(), None);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad = [
            "[frame]\ntarget_fps = -1.0\n",
            "[frame]\nmax_delta_ms = 0\n",
            "[sim]\ntick_rate_hz = 0.0\n",
            "[sim]\nmanual_step_ms = 0\n",
            "[sleep]\nsafety_margin_us = 5000\n",
            "[telemetry]\nperiod_ms = 0\n",
        ];
        for text in bad {
            let err = TimingConfig::from_toml_str(text).unwrap_err();
            assert!(matches!(err, TimingError::InvalidConfig(_)), "{text}: {err}");
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = TimingConfig::from_toml_str("[frame\n").unwrap_err();
        assert!(matches!(err, TimingError::ConfigParse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = TimingConfig::load_toml("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, TimingError::Io(_)));
    }
}
