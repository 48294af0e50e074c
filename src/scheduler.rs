//! Per-display refresh cadence.
//!
//! The render pipeline has three stages with different costs:
//!
//! | Stage | Work | Default cadence |
//! |-------|------|-----------------|
//! | data | rebuild the telemetry snapshot | every 10 ticks |
//! | text | render the page text into the screen buffer | every 5 ticks |
//! | draw | composite background and glyphs | every 2 ticks |
//!
//! Each stage counts down independently. A forced refresh (page change,
//! vessel part count change, first frame) makes all three due on the next
//! tick and restarts every countdown.

use crate::log_info;

/// Default ticks between snapshot rebuilds.
pub const DEFAULT_DATA_RATE: u32 = 10;
/// Default ticks between text renders.
pub const DEFAULT_TEXT_RATE: u32 = 5;
/// Default ticks between composites.
pub const DEFAULT_DRAW_RATE: u32 = 2;

/// Ticks between refreshes of each stage, at least 1.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RefreshRates {
    pub data: u32,
    pub text: u32,
    pub draw: u32,
}

impl RefreshRates {
    /// Rates clamped to a minimum of 1.
    pub const fn new(
        data: u32,
        text: u32,
        draw: u32,
    ) -> Self {
        Self {
            data: if data == 0 { 1 } else { data },
            text: if text == 0 { 1 } else { text },
            draw: if draw == 0 { 1 } else { draw },
        }
    }
}

impl Default for RefreshRates {
    fn default() -> Self { Self::new(DEFAULT_DATA_RATE, DEFAULT_TEXT_RATE, DEFAULT_DRAW_RATE) }
}

/// Which stages run this tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RefreshPlan {
    pub data: bool,
    pub text: bool,
    pub draw: bool,
    /// All stages are due because of a forced refresh.
    pub forced: bool,
}

impl RefreshPlan {
    /// Every stage due.
    pub const FULL: Self = Self {
        data: true,
        text: true,
        draw: true,
        forced: true,
    };

    #[inline]
    pub const fn is_idle(&self) -> bool { !self.data && !self.text && !self.draw }
}

/// Countdown state machine for one display.
#[derive(Clone, Debug)]
pub struct RefreshScheduler {
    rates: RefreshRates,
    data_countdown: u32,
    text_countdown: u32,
    draw_countdown: u32,
    force_pending: bool,
    first_render_complete: bool,
    last_part_count: Option<usize>,
}

impl RefreshScheduler {
    pub const fn new(rates: RefreshRates) -> Self {
        Self {
            rates,
            data_countdown: rates.data,
            text_countdown: rates.text,
            draw_countdown: rates.draw,
            force_pending: false,
            first_render_complete: false,
            last_part_count: None,
        }
    }

    #[inline]
    pub const fn rates(&self) -> RefreshRates { self.rates }

    /// Make every stage due on the next tick.
    ///
    /// Also clears the first-render latch so the next page gets a full
    /// render even mid-countdown.
    pub const fn force_refresh(&mut self) {
        self.force_pending = true;
        self.first_render_complete = false;
    }

    #[inline]
    pub const fn is_force_pending(&self) -> bool { self.force_pending }

    #[inline]
    pub const fn first_render_complete(&self) -> bool { self.first_render_complete }

    /// Advance one tick and decide which stages run.
    pub fn tick(
        &mut self,
        part_count: usize,
        page_mutable: bool,
    ) -> RefreshPlan {
        if self.last_part_count.is_some_and(|last| last != part_count) {
            log_info!("Part count changed to {}, forcing refresh", part_count);
            self.force_pending = true;
        }
        self.last_part_count = Some(part_count);

        self.data_countdown = self.data_countdown.saturating_sub(1);
        self.text_countdown = self.text_countdown.saturating_sub(1);
        self.draw_countdown = self.draw_countdown.saturating_sub(1);

        if self.force_pending || !self.first_render_complete {
            self.data_countdown = self.rates.data;
            self.text_countdown = self.rates.text;
            self.draw_countdown = self.rates.draw;
            self.force_pending = false;
            self.first_render_complete = true;
            return RefreshPlan::FULL;
        }

        let data = expire(&mut self.data_countdown, self.rates.data);
        let draw = expire(&mut self.draw_countdown, self.rates.draw);
        let text = expire(&mut self.text_countdown, self.rates.text) || (page_mutable && draw);
        RefreshPlan {
            data,
            text,
            draw,
            forced: false,
        }
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self { Self::new(RefreshRates::default()) }
}

/// Due when the countdown reached zero; restarts it.
const fn expire(
    countdown: &mut u32,
    rate: u32,
) -> bool {
    if *countdown == 0 {
        *countdown = rate;
        true
    } else {
        false
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn run(
        scheduler: &mut RefreshScheduler,
        ticks: usize,
    ) -> Vec<RefreshPlan> {
        (0..ticks).map(|_| scheduler.tick(5, false)).collect()
    }

    #[test]
    fn test_rates_clamped() {
        assert_eq!(RefreshRates::new(0, 0, 3), RefreshRates { data: 1, text: 1, draw: 3 });
    }

    #[test]
    fn test_first_tick_is_full() {
        let mut s = RefreshScheduler::default();
        assert_eq!(s.tick(5, false), RefreshPlan::FULL, "First tick should refresh everything");
        assert!(s.first_render_complete());
    }

    #[test]
    fn test_independent_cadences() {
        let mut s = RefreshScheduler::new(RefreshRates::new(4, 3, 2));
        s.tick(5, false);
        let plans = run(&mut s, 12);
        let due = |f: fn(&RefreshPlan) -> bool| plans.iter().enumerate().filter(|(_, p)| f(p)).map(|(i, _)| i + 1).collect::<Vec<_>>();
        assert_eq!(due(|p| p.data), vec![4, 8, 12]);
        assert_eq!(due(|p| p.text), vec![3, 6, 9, 12]);
        assert_eq!(due(|p| p.draw), vec![2, 4, 6, 8, 10, 12]);
        assert!(plans.iter().all(|p| !p.forced));
    }

    #[test]
    fn test_rate_one_is_every_tick() {
        let mut s = RefreshScheduler::new(RefreshRates::new(1, 1, 1));
        s.tick(5, false);
        assert!(run(&mut s, 5).iter().all(|p| p.data && p.text && p.draw));
    }

    #[test]
    fn test_force_refresh_mid_countdown() {
        let mut s = RefreshScheduler::default();
        s.tick(5, false);
        s.tick(5, false);
        s.force_refresh();
        assert!(s.is_force_pending());
        assert!(!s.first_render_complete());
        assert_eq!(s.tick(5, false), RefreshPlan::FULL, "Forced tick should refresh everything");
        assert!(!s.is_force_pending());

        // Countdowns restart from the forced tick.
        let plans = run(&mut s, 2);
        assert!(!plans[0].draw);
        assert!(plans[1].draw);
    }

    #[test]
    fn test_part_count_change_forces() {
        let mut s = RefreshScheduler::default();
        s.tick(5, false);
        assert!(s.tick(5, false).is_idle());
        assert_eq!(s.tick(4, false), RefreshPlan::FULL, "Staging should force a refresh");
        assert!(s.tick(4, false).is_idle());
    }

    #[test]
    fn test_mutable_page_text_follows_draw() {
        let mut s = RefreshScheduler::new(RefreshRates::new(10, 5, 2));
        s.tick(5, true);
        s.tick(5, true);
        let plan = s.tick(5, true);
        assert!(plan.draw);
        assert!(plan.text, "Mutable page text should refresh with each draw");

        let mut s = RefreshScheduler::new(RefreshRates::new(10, 5, 2));
        s.tick(5, false);
        s.tick(5, false);
        let plan = s.tick(5, false);
        assert!(plan.draw);
        assert!(!plan.text, "Static page text keeps its own cadence");
    }
}

#[cfg(test)]
mod scheduler_proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn each_stage_fires_once_per_rate(data in 1u32..8, text in 1u32..8, draw in 1u32..8) {
            let mut s = RefreshScheduler::new(RefreshRates::new(data, text, draw));
            s.tick(1, false);
            let ticks = data * text * draw;
            let mut counts = [0u32; 3];
            for _ in 0..ticks {
                let plan = s.tick(1, false);
                counts[0] += u32::from(plan.data);
                counts[1] += u32::from(plan.text);
                counts[2] += u32::from(plan.draw);
            }
            prop_assert_eq!(counts, [ticks / data, ticks / text, ticks / draw]);
        }

        #[test]
        fn forced_tick_is_always_full(warmup in 0usize..20) {
            let mut s = RefreshScheduler::default();
            for _ in 0..warmup {
                s.tick(3, true);
            }
            s.force_refresh();
            prop_assert_eq!(s.tick(3, true), RefreshPlan::FULL);
        }
    }
}
