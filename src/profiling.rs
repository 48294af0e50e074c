//! Pipeline counters and tick timing for one display.
//!
//! Updated by [`MonitorDisplay::tick`](crate::monitor::MonitorDisplay::tick)
//! and readable at any time, e.g. from a debug page provider.
//!
//! # Usage
//!
//! ```ignore
//! let start = Instant::now();
//! let plan = scheduler.tick(part_count, mutable);
//! // ... refresh stages ...
//! metrics.record_tick(&plan, start.elapsed());
//! ```

use std::time::{Duration, Instant};

use crate::compositor::{BackgroundOutcome, ComposeReport};
use crate::scheduler::RefreshPlan;

/// Stage counters and tick timing.
#[derive(Clone, Debug)]
pub struct PipelineMetrics {
    /// Ticks since startup.
    pub ticks: u64,
    /// Snapshot rebuilds requested.
    pub data_refreshes: u64,
    /// Page text renders.
    pub text_renders: u64,
    /// Composites.
    pub draws: u64,
    /// Ticks that ran everything because of a forced refresh.
    pub forced_refreshes: u64,
    pub glyphs_drawn: u64,
    /// Characters without a glyph in the atlas.
    pub glyphs_skipped: u64,
    /// Composites that fell back to a flat fill.
    pub background_fallbacks: u64,

    // Tick timing (microseconds)
    /// Last tick duration.
    pub tick_time_us: u32,
    pub tick_time_min_us: u32,
    pub tick_time_max_us: u32,
    tick_time_avg_us: f32,

    start_time: Instant,
}

impl PipelineMetrics {
    /// Exponential moving average alpha.
    const EMA_ALPHA: f32 = 0.1;

    pub fn new() -> Self {
        Self {
            ticks: 0,
            data_refreshes: 0,
            text_renders: 0,
            draws: 0,
            forced_refreshes: 0,
            glyphs_drawn: 0,
            glyphs_skipped: 0,
            background_fallbacks: 0,
            tick_time_us: 0,
            tick_time_min_us: u32::MAX,
            tick_time_max_us: 0,
            tick_time_avg_us: 0.0,
            start_time: Instant::now(),
        }
    }

    /// Count the stages in `plan` and fold in the tick duration.
    pub fn record_tick(
        &mut self,
        plan: &RefreshPlan,
        elapsed: Duration,
    ) {
        self.data_refreshes += u64::from(plan.data);
        self.text_renders += u64::from(plan.text);
        self.draws += u64::from(plan.draw);
        self.forced_refreshes += u64::from(plan.forced);

        let us = u32::try_from(elapsed.as_micros()).unwrap_or(u32::MAX);
        self.tick_time_us = us;
        self.tick_time_min_us = self.tick_time_min_us.min(us);
        self.tick_time_max_us = self.tick_time_max_us.max(us);
        if self.ticks == 0 {
            self.tick_time_avg_us = us as f32;
        } else {
            self.tick_time_avg_us = Self::EMA_ALPHA.mul_add(us as f32, (1.0 - Self::EMA_ALPHA) * self.tick_time_avg_us);
        }
        self.ticks += 1;
    }

    /// Fold in the result of one composite.
    pub fn record_compose(
        &mut self,
        report: &ComposeReport,
    ) {
        self.glyphs_drawn += report.glyphs_drawn as u64;
        self.glyphs_skipped += report.glyphs_skipped as u64;
        if report.background == BackgroundOutcome::Fallback {
            self.background_fallbacks += 1;
        }
    }

    /// Smoothed tick duration.
    #[inline]
    pub const fn tick_time_avg_us(&self) -> u32 { self.tick_time_avg_us as u32 }

    #[inline]
    pub fn uptime(&self) -> Duration { self.start_time.elapsed() }

    /// Uptime as `HH:MM:SS`.
    pub fn uptime_string(&self) -> String {
        let secs = self.uptime().as_secs();
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_metrics() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.ticks, 0);
        assert_eq!(metrics.tick_time_min_us, u32::MAX);
        assert_eq!(metrics.tick_time_max_us, 0);
    }

    #[test]
    fn test_record_tick_counts_stages() {
        let mut metrics = PipelineMetrics::new();
        metrics.record_tick(&RefreshPlan::FULL, Duration::from_micros(300));
        metrics.record_tick(
            &RefreshPlan {
                draw: true,
                ..RefreshPlan::default()
            },
            Duration::from_micros(100),
        );
        metrics.record_tick(&RefreshPlan::default(), Duration::from_micros(200));

        assert_eq!(metrics.ticks, 3);
        assert_eq!(metrics.data_refreshes, 1);
        assert_eq!(metrics.text_renders, 1);
        assert_eq!(metrics.draws, 2);
        assert_eq!(metrics.forced_refreshes, 1);
        assert_eq!(metrics.tick_time_us, 200);
        assert_eq!(metrics.tick_time_min_us, 100);
        assert_eq!(metrics.tick_time_max_us, 300);
        assert!(metrics.tick_time_avg_us() > 100 && metrics.tick_time_avg_us() <= 300);
    }

    #[test]
    fn test_record_compose() {
        let mut metrics = PipelineMetrics::new();
        metrics.record_compose(&ComposeReport {
            background: BackgroundOutcome::Fallback,
            glyphs_drawn: 10,
            glyphs_skipped: 2,
        });
        metrics.record_compose(&ComposeReport::default());
        assert_eq!(metrics.glyphs_drawn, 10);
        assert_eq!(metrics.glyphs_skipped, 2);
        assert_eq!(metrics.background_fallbacks, 1);
    }

    #[test]
    fn test_uptime_string_format() {
        let metrics = PipelineMetrics::new();
        let uptime = metrics.uptime_string();
        assert_eq!(uptime.len(), 8);
        assert!(uptime.starts_with("00:00:"));
    }
}
