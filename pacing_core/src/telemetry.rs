use std::time::{Duration, Instant};

use crate::stats::StatsAggregator;

const LOG_TARGET: &str = "pacing::telemetry";

/// Logs the stats snapshot on a slow cadence instead of every frame.
///
/// Nothing is emitted while the aggregator's debug display is hidden.
#[derive(Debug, Clone)]
pub struct TelemetryReporter {
    enabled: bool,
    period: Duration,
    last: Instant,
}

impl TelemetryReporter {
    pub fn new(enabled: bool, period: Duration) -> Self {
        Self {
            enabled,
            period: period.max(Duration::from_millis(250)),
            last: Instant::now(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, Duration::from_secs(1))
    }

    #[inline]
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Emits `stats.snapshot_lines()` if a period has passed since the last
    /// report. Returns whether anything was emitted.
    pub fn maybe_report(&mut self, stats: &StatsAggregator) -> bool {
        self.maybe_report_at(stats, Instant::now())
    }

    fn maybe_report_at(&mut self, stats: &StatsAggregator, now: Instant) -> bool {
        if !self.enabled || !stats.is_debug_visible() {
            return false;
        }
        if now.saturating_duration_since(self.last) < self.period {
            return false;
        }

        self.last = now;
        let lines = stats.snapshot_lines();
        log::info!(target: LOG_TARGET, "{}", lines.join(" | "));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_period() {
        let stats = StatsAggregator::new();
        let mut rep = TelemetryReporter::new(true, Duration::from_secs(1));
        let t0 = rep.last;

        assert!(!rep.maybe_report_at(&stats, t0 + Duration::from_millis(500)));
        assert!(rep.maybe_report_at(&stats, t0 + Duration::from_millis(1000)));
        assert!(!rep.maybe_report_at(&stats, t0 + Duration::from_millis(1500)));
        assert!(rep.maybe_report_at(&stats, t0 + Duration::from_millis(2100)));
    }

    #[test]
    fn hidden_or_disabled_stays_silent() {
        let mut stats = StatsAggregator::new();
        let mut rep = TelemetryReporter::new(true, Duration::from_secs(1));
        let later = rep.last + Duration::from_secs(10);

        stats.set_debug_visible(false);
        assert!(!rep.maybe_report_at(&stats, later));

        stats.set_debug_visible(true);
        rep.set_enabled(false);
        assert!(!rep.maybe_report_at(&stats, later));

        assert!(!TelemetryReporter::disabled().maybe_report(&stats));
    }

    #[test]
    fn period_has_a_floor() {
        let rep = TelemetryReporter::new(true, Duration::from_millis(1));
        assert_eq!(rep.period(), Duration::from_millis(250));
    }
}
