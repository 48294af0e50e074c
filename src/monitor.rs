//! One display instance and its per-tick pipeline.
//!
//! `MonitorDisplay` owns everything that belongs to a single screen: the page
//! registry, the refresh scheduler, the compositor and the character grid.
//! The host calls [`MonitorDisplay::tick`] once per simulation frame:
//!
//! ```text
//! scheduler.tick ──► hub.refresh (data) ──► page text (text) ──► compose (draw)
//! ```
//!
//! Stages that are not due are skipped entirely, so the pixel target is left
//! untouched on ticks without a draw. Page changes from buttons or direct
//! selection force a full refresh on the following tick.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::colors::from_rgb888;
use crate::compositor::font::FontAtlas;
use crate::compositor::{BackgroundServices, ScreenCompositor};
use crate::config::DisplayConfig;
use crate::error::{MonitorError, PageError};
use crate::log_info;
use crate::pages::{LoadContext, Page, PageChange, PageRegistry, PageText};
use crate::persistence::PersistentStore;
use crate::profiling::PipelineMetrics;
use crate::providers::{ContentProviders, ScreenSize};
use crate::scheduler::{RefreshPlan, RefreshScheduler};
use crate::screen::ScreenBuffer;
use crate::snapshot::{Snapshot, SnapshotHub};
use crate::telemetry::VesselState;

/// A configured display.
#[derive(Debug)]
pub struct MonitorDisplay {
    registry: PageRegistry,
    rejected: Vec<PageError>,
    scheduler: RefreshScheduler,
    compositor: ScreenCompositor,
    screen: ScreenBuffer,
    snapshot: Option<Arc<Snapshot>>,
    providers: ContentProviders,
    pixel_size: Size,
    metrics: PipelineMetrics,
}

impl MonitorDisplay {
    /// Validate `config`, load its pages and restore the active page.
    ///
    /// Rejected page definitions are logged and kept in
    /// [`rejected_pages`](Self::rejected_pages); only a config without a
    /// single usable page fails.
    pub fn new(
        config: &DisplayConfig,
        base_dir: Option<&Path>,
        providers: ContentProviders,
        store: &dyn PersistentStore,
    ) -> Result<Self, MonitorError> {
        config.validate()?;
        let ctx = LoadContext {
            base_dir,
            providers: &providers,
        };
        let report = PageRegistry::load(&config.id, &config.pages, &ctx, store)?;
        let compositor = ScreenCompositor::new(
            FontAtlas::for_choice(config.font),
            from_rgb888(config.text_color),
            from_rgb888(config.empty_color),
        );
        log_info!("{}: {}x{} cells", config.id, config.columns, config.rows);

        Ok(Self {
            registry: report.registry,
            rejected: report.rejected,
            scheduler: RefreshScheduler::new(config.refresh_rates()),
            compositor,
            screen: ScreenBuffer::new(config.columns, config.rows),
            snapshot: None,
            providers,
            pixel_size: Size::new(config.pixel_width, config.pixel_height),
            metrics: PipelineMetrics::new(),
        })
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Run one frame of the pipeline and report which stages ran.
    pub fn tick<D, B>(
        &mut self,
        frame: u64,
        hub: &mut SnapshotHub,
        vessel: &VesselState,
        target: &mut D,
        backgrounds: &mut B,
    ) -> RefreshPlan
    where
        D: DrawTarget<Color = Rgb565>,
        B: BackgroundServices<D> + ?Sized,
    {
        let start = Instant::now();
        let plan = self
            .scheduler
            .tick(vessel.part_count(), self.registry.active().is_mutable());

        if plan.data || self.snapshot.is_none() {
            self.snapshot = Some(hub.refresh(frame, vessel));
        }

        if plan.text {
            if let Some(snapshot) = &self.snapshot {
                let size = ScreenSize {
                    columns: self.screen.columns(),
                    rows: self.screen.rows(),
                };
                let text = page_text(self.registry.active(), &mut self.providers, snapshot, size);
                self.screen.fill_from_text(&text);
            }
        }

        if plan.draw {
            let report = self
                .compositor
                .compose(self.registry.active(), &self.screen, target, backgrounds);
            self.metrics.record_compose(&report);
        }

        self.metrics.record_tick(&plan, start.elapsed());
        plan
    }

    // =========================================================================
    // Page Changes
    // =========================================================================

    /// Make page `index` active.
    pub fn select_page(
        &mut self,
        index: usize,
        store: &mut dyn PersistentStore,
    ) -> Option<PageChange> {
        let change = self.registry.select(index, store);
        self.after_change(change)
    }

    /// Handle a press of the button bound as `binding`.
    pub fn press_button(
        &mut self,
        binding: &str,
        store: &mut dyn PersistentStore,
    ) -> Option<PageChange> {
        let change = self.registry.press_button(binding, store);
        self.after_change(change)
    }

    pub fn next_page(
        &mut self,
        store: &mut dyn PersistentStore,
    ) -> Option<PageChange> {
        let change = self.registry.next(store);
        self.after_change(change)
    }

    pub fn previous_page(
        &mut self,
        store: &mut dyn PersistentStore,
    ) -> Option<PageChange> {
        let change = self.registry.previous(store);
        self.after_change(change)
    }

    fn after_change(
        &mut self,
        change: Option<PageChange>,
    ) -> Option<PageChange> {
        if change.is_some() {
            self.scheduler.force_refresh();
        }
        change
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn display_id(&self) -> &str { self.registry.display_id() }

    #[inline]
    pub fn active_page(&self) -> &Page { self.registry.active() }

    #[inline]
    pub const fn registry(&self) -> &PageRegistry { &self.registry }

    /// Definitions skipped at load time.
    pub fn rejected_pages(&self) -> &[PageError] { &self.rejected }

    #[inline]
    pub const fn screen(&self) -> &ScreenBuffer { &self.screen }

    /// Snapshot used by the last text render.
    pub fn snapshot(&self) -> Option<&Snapshot> { self.snapshot.as_deref() }

    #[inline]
    pub const fn scheduler(&self) -> &RefreshScheduler { &self.scheduler }

    #[inline]
    pub const fn metrics(&self) -> &PipelineMetrics { &self.metrics }

    /// Pixel size the host target is expected to have.
    #[inline]
    pub const fn pixel_size(&self) -> Size { self.pixel_size }
}

/// Text of `page` for one text refresh.
fn page_text(
    page: &Page,
    providers: &mut ContentProviders,
    snapshot: &Snapshot,
    size: ScreenSize,
) -> String {
    match &page.text {
        PageText::Template(template) => template.render(snapshot),
        PageText::Provider(name) => providers.produce(name, snapshot, size).unwrap_or_default(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
