//! Rolling performance statistics and ad-hoc debug values.
//!
//! Frame and update durations go into fixed-size rings; FPS and UPS are the
//! reciprocals of the ring averages. Everything else is a named value that a
//! display layer pulls through `snapshot_lines`.

use std::{collections::HashMap, time::Instant};

/// Samples kept for the FPS and UPS averages.
pub const SAMPLE_COUNT: usize = 60;

/// Counters starting with this prefix are zeroed by `reset_frame_counters`.
pub const FRAME_COUNTER_PREFIX: &str = "frame_";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Fixed-capacity ring of durations in seconds.
#[derive(Debug, Clone)]
pub struct SampleRing<const N: usize> {
    samples: [f64; N],
    cursor: usize,
    filled: bool,
}

impl<const N: usize> Default for SampleRing<N> {
    fn default() -> Self {
        Self { samples: [0.0; N], cursor: 0, filled: false }
    }
}

impl<const N: usize> SampleRing<N> {
    pub fn push(&mut self, sample: f64) {
        if N == 0 {
            return;
        }
        self.samples[self.cursor] = sample;
        self.cursor = (self.cursor + 1) % N;
        if self.cursor == 0 {
            self.filled = true;
        }
    }

    /// Samples that count towards the average. Slots never written are
    /// excluded until the ring wraps once.
    #[inline]
    pub fn len(&self) -> usize {
        if self.filled {
            N
        } else {
            self.cursor
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn average(&self) -> Option<f64> {
        let n = self.len();
        if n == 0 {
            return None;
        }
        let total: f64 = self.samples[..n].iter().sum();
        Some(total / n as f64)
    }
}

#[derive(Debug, Clone)]
pub struct StatsAggregator {
    frame_times: SampleRing<SAMPLE_COUNT>,
    fps: f64,
    frame_time_ms: f64,
    average_frame_time: f64,

    update_times: SampleRing<SAMPLE_COUNT>,
    ups: f64,
    average_update_time: f64,

    counters: HashMap<String, i64>,
    metrics: HashMap<String, f64>,
    debug_strings: HashMap<String, String>,
    memory_usage: HashMap<String, usize>,

    active_timers: HashMap<String, Instant>,
    timer_results: HashMap<String, f64>,

    debug_visible: bool,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            frame_times: SampleRing::default(),
            fps: 0.0,
            frame_time_ms: 0.0,
            average_frame_time: 0.0,
            update_times: SampleRing::default(),
            ups: 0.0,
            average_update_time: 0.0,
            counters: HashMap::new(),
            metrics: HashMap::new(),
            debug_strings: HashMap::new(),
            memory_usage: HashMap::new(),
            active_timers: HashMap::new(),
            timer_results: HashMap::new(),
            debug_visible: true,
        }
    }

    // ===============================
    // Frame / update rates
    // ===============================

    pub fn record_frame(&mut self, delta_sec: f64) {
        self.frame_times.push(delta_sec);
        self.frame_time_ms = delta_sec * 1000.0;

        if let Some(avg) = self.frame_times.average() {
            self.average_frame_time = avg;
            // A zero average leaves the last valid FPS in place.
            if avg > 0.0 {
                self.fps = 1.0 / avg;
            }
        }
    }

    pub fn record_update(&mut self, delta_sec: f64) {
        self.update_times.push(delta_sec);

        if let Some(avg) = self.update_times.average() {
            self.average_update_time = avg;
            if avg > 0.0 {
                self.ups = 1.0 / avg;
            }
        }
    }

    /// Frames per second over the last `SAMPLE_COUNT` frames; 0 before any data.
    #[inline]
    pub fn fps(&self) -> f64 {
        self.fps
    }

    #[inline]
    pub fn ups(&self) -> f64 {
        self.ups
    }

    /// Duration of the most recent frame.
    #[inline]
    pub fn frame_time_ms(&self) -> f64 {
        self.frame_time_ms
    }

    #[inline]
    pub fn average_frame_time(&self) -> f64 {
        self.average_frame_time
    }

    #[inline]
    pub fn average_update_time(&self) -> f64 {
        self.average_update_time
    }

    // ===============================
    // Named values
    // ===============================

    pub fn increment_counter(&mut self, name: &str) {
        *self.counters.entry(name.to_owned()).or_insert(0) += 1;
    }

    pub fn add_to_counter(&mut self, name: &str, amount: i64) {
        *self.counters.entry(name.to_owned()).or_insert(0) += amount;
    }

    pub fn set_counter(&mut self, name: &str, value: i64) {
        self.counters.insert(name.to_owned(), value);
    }

    pub fn counter(&self, name: &str) -> i64 {
        self.counters.get(name).copied().unwrap_or(0)
    }

    pub fn set_metric(&mut self, name: &str, value: f64) {
        self.metrics.insert(name.to_owned(), value);
    }

    pub fn metric(&self, name: &str) -> f64 {
        self.metrics.get(name).copied().unwrap_or(0.0)
    }

    pub fn set_debug_string(&mut self, name: &str, value: impl Into<String>) {
        self.debug_strings.insert(name.to_owned(), value.into());
    }

    pub fn debug_string(&self, name: &str) -> &str {
        self.debug_strings.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn report_memory_usage(&mut self, category: &str, bytes: usize) {
        self.memory_usage.insert(category.to_owned(), bytes);
    }

    pub fn memory_usage(&self, category: &str) -> usize {
        self.memory_usage.get(category).copied().unwrap_or(0)
    }

    /// Zeroes every counter named with `FRAME_COUNTER_PREFIX`.
    pub fn reset_frame_counters(&mut self) {
        for (_, v) in self
            .counters
            .iter_mut()
            .filter(|(k, _)| k.starts_with(FRAME_COUNTER_PREFIX))
        {
            *v = 0;
        }
    }

    // ===============================
    // Interval timers
    // ===============================

    /// Starts (or restarts) the timer `name`.
    pub fn start_timer(&mut self, name: &str) {
        self.active_timers.insert(name.to_owned(), Instant::now());
    }

    /// Stores the elapsed time of a running timer and stops it. Unknown names
    /// are ignored and keep their previous result.
    pub fn end_timer(&mut self, name: &str) {
        if let Some(started) = self.active_timers.remove(name) {
            let ms = started.elapsed().as_secs_f64() * 1000.0;
            self.timer_results.insert(name.to_owned(), ms);
        }
    }

    /// Last completed duration of `name` in milliseconds, 0 if never completed.
    pub fn timer_ms(&self, name: &str) -> f64 {
        self.timer_results.get(name).copied().unwrap_or(0.0)
    }

    pub fn is_timer_running(&self, name: &str) -> bool {
        self.active_timers.contains_key(name)
    }

    // ===============================
    // Display
    // ===============================

    pub fn set_debug_visible(&mut self, visible: bool) {
        self.debug_visible = visible;
    }

    pub fn toggle_debug_visible(&mut self) {
        self.debug_visible = !self.debug_visible;
    }

    #[inline]
    pub fn is_debug_visible(&self) -> bool {
        self.debug_visible
    }

    /// Human-readable `key: value` lines.
    ///
    /// The rate lines come first in a fixed order. The named groups follow
    /// (counters, metrics, strings, memory, timers); order inside a group is
    /// unspecified.
    pub fn snapshot_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(
            3 + self.counters.len()
                + self.metrics.len()
                + self.debug_strings.len()
                + self.memory_usage.len()
                + self.timer_results.len(),
        );

        lines.push(format!("FPS: {:.1}", self.fps));
        lines.push(format!("Frame Time: {:.2}ms", self.frame_time_ms));
        lines.push(format!("UPS: {:.1}", self.ups));

        lines.extend(self.counters.iter().map(|(k, v)| format!("{k}: {v}")));
        lines.extend(self.metrics.iter().map(|(k, v)| format!("{k}: {v:.2}")));
        lines.extend(self.debug_strings.iter().map(|(k, v)| format!("{k}: {v}")));
        lines.extend(
            self.memory_usage
                .iter()
                .map(|(k, v)| format!("{k} Memory: {:.1}MB", *v as f64 / BYTES_PER_MB)),
        );
        lines.extend(
            self.timer_results
                .iter()
                .map(|(k, v)| format!("{k} Time: {v:.2}ms")),
        );

        lines
    }
}
