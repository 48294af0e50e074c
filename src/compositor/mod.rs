//! Pixel composition of one page: background, then text.
//!
//! # Backgrounds
//!
//! | Page background | Service call | On `false` |
//! |-----------------|--------------|------------|
//! | camera | [`BackgroundServices::camera_frame`] | flat fill |
//! | texture | [`BackgroundServices::blit_texture`] | flat fill |
//! | handler | [`BackgroundServices::run_handler`] | flat fill |
//! | none | | flat fill |
//!
//! The flat fill uses the display's empty color, so a missing camera or
//! texture shows as a plain screen with readable text on top.
//!
//! # Text
//!
//! The target is divided into a `columns` x `rows` grid and each glyph is
//! centered in its cell. Spaces are not drawn. Characters the atlas has no
//! glyph for are skipped and logged once per code.

pub mod font;

use std::collections::BTreeSet;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use crate::log_warn;
use crate::pages::{Background, CameraSpec, Page};
use crate::screen::ScreenBuffer;

use self::font::FontAtlas;

// =============================================================================
// Background Services
// =============================================================================

/// Host hooks that paint page backgrounds.
///
/// Each hook returns `true` when it painted the whole target. The defaults
/// paint nothing, which makes the compositor fall back to a flat fill.
pub trait BackgroundServices<D: DrawTarget<Color = Rgb565>> {
    fn camera_frame(
        &mut self,
        _camera: &CameraSpec,
        _target: &mut D,
    ) -> bool {
        false
    }

    fn blit_texture(
        &mut self,
        _name: &str,
        _target: &mut D,
    ) -> bool {
        false
    }

    fn run_handler(
        &mut self,
        _name: &str,
        _target: &mut D,
    ) -> bool {
        false
    }
}

/// Host without any background sources.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoBackgrounds;

impl<D: DrawTarget<Color = Rgb565>> BackgroundServices<D> for NoBackgrounds {}

/// Paints a background onto the target; `true` on success.
pub type BackgroundPainter<D> = Box<dyn FnMut(&mut D) -> bool>;

/// Camera feed painter.
pub type CameraPainter<D> = Box<dyn FnMut(&CameraSpec, &mut D) -> bool>;

/// Named background painters registered by the host.
pub struct HandlerTable<D> {
    handlers: Vec<(String, BackgroundPainter<D>)>,
    textures: Vec<(String, BackgroundPainter<D>)>,
    camera: Option<CameraPainter<D>>,
}

impl<D> HandlerTable<D> {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            textures: Vec::new(),
            camera: None,
        }
    }

    /// Register a `background = "handler"` painter.
    pub fn handler(
        mut self,
        name: impl Into<String>,
        painter: impl FnMut(&mut D) -> bool + 'static,
    ) -> Self {
        self.handlers.push((name.into(), Box::new(painter)));
        self
    }

    /// Register a `background = "texture"` painter.
    pub fn texture(
        mut self,
        name: impl Into<String>,
        painter: impl FnMut(&mut D) -> bool + 'static,
    ) -> Self {
        self.textures.push((name.into(), Box::new(painter)));
        self
    }

    /// Register the camera feed.
    pub fn camera(
        mut self,
        painter: impl FnMut(&CameraSpec, &mut D) -> bool + 'static,
    ) -> Self {
        self.camera = Some(Box::new(painter));
        self
    }
}

impl<D> Default for HandlerTable<D> {
    fn default() -> Self { Self::new() }
}

fn run_named<D>(
    table: &mut [(String, BackgroundPainter<D>)],
    name: &str,
    target: &mut D,
) -> bool {
    table
        .iter_mut()
        .find(|(n, _)| n == name)
        .is_some_and(|(_, painter)| painter(target))
}

impl<D: DrawTarget<Color = Rgb565>> BackgroundServices<D> for HandlerTable<D> {
    fn camera_frame(
        &mut self,
        camera: &CameraSpec,
        target: &mut D,
    ) -> bool {
        self.camera.as_mut().is_some_and(|painter| painter(camera, target))
    }

    fn blit_texture(
        &mut self,
        name: &str,
        target: &mut D,
    ) -> bool {
        run_named(&mut self.textures, name, target)
    }

    fn run_handler(
        &mut self,
        name: &str,
        target: &mut D,
    ) -> bool {
        run_named(&mut self.handlers, name, target)
    }
}

// =============================================================================
// Compositor
// =============================================================================

/// How the background of one composite was produced.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BackgroundOutcome {
    /// Page has no background: flat fill.
    #[default]
    Flat,
    /// The background service painted it.
    Painted,
    /// The service failed: flat fill instead.
    Fallback,
}

/// Counters from one [`ScreenCompositor::compose`] call.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ComposeReport {
    pub background: BackgroundOutcome,
    pub glyphs_drawn: usize,
    pub glyphs_skipped: usize,
}

/// Draws a page and its text buffer onto a target.
#[derive(Debug)]
pub struct ScreenCompositor {
    atlas: FontAtlas,
    text_color: Rgb565,
    empty_color: Rgb565,
    reported_codes: BTreeSet<char>,
    in_fallback: bool,
}

impl ScreenCompositor {
    pub fn new(
        atlas: FontAtlas,
        text_color: Rgb565,
        empty_color: Rgb565,
    ) -> Self {
        Self {
            atlas,
            text_color,
            empty_color,
            reported_codes: BTreeSet::new(),
            in_fallback: false,
        }
    }

    #[inline]
    pub const fn atlas(&self) -> &FontAtlas { &self.atlas }

    /// Paint the background, then every non-space glyph of `screen`.
    pub fn compose<D, B>(
        &mut self,
        page: &Page,
        screen: &ScreenBuffer,
        target: &mut D,
        backgrounds: &mut B,
    ) -> ComposeReport
    where
        D: DrawTarget<Color = Rgb565>,
        B: BackgroundServices<D> + ?Sized,
    {
        let mut report = ComposeReport {
            background: self.paint_background(page, target, backgrounds),
            ..ComposeReport::default()
        };

        let area = target.bounding_box();
        let columns = screen.columns().max(1) as u32;
        let rows = screen.rows().max(1) as u32;
        let cell = Size::new(area.size.width / columns, area.size.height / rows);
        let glyph = self.atlas.glyph_size();
        let inset = Point::new(
            (cell.width.saturating_sub(glyph.width) / 2) as i32,
            (cell.height.saturating_sub(glyph.height) / 2) as i32,
        );

        for (column, row, c) in screen.cells() {
            if c == ' ' {
                continue;
            }
            let Some(index) = self.atlas.glyph_index(c) else {
                report.glyphs_skipped += 1;
                if self.reported_codes.insert(c) {
                    log_warn!("No glyph for U+{:04X}", u32::from(c));
                }
                continue;
            };
            let top_left = area.top_left
                + Point::new((column as u32 * cell.width) as i32, (row as u32 * cell.height) as i32)
                + inset;
            self.atlas.draw_glyph(index, top_left, self.text_color, target).ok();
            report.glyphs_drawn += 1;
        }
        report
    }

    fn paint_background<D, B>(
        &mut self,
        page: &Page,
        target: &mut D,
        backgrounds: &mut B,
    ) -> BackgroundOutcome
    where
        D: DrawTarget<Color = Rgb565>,
        B: BackgroundServices<D> + ?Sized,
    {
        let painted = match &page.background {
            Background::None => {
                target.clear(self.empty_color).ok();
                self.in_fallback = false;
                return BackgroundOutcome::Flat;
            }
            Background::Camera(camera) => backgrounds.camera_frame(camera, target),
            Background::Texture(name) => backgrounds.blit_texture(name, target),
            Background::Handler(name) => backgrounds.run_handler(name, target),
        };
        if painted {
            self.in_fallback = false;
            return BackgroundOutcome::Painted;
        }
        if !self.in_fallback {
            log_warn!("Background of page {} unavailable", page.name);
            self.in_fallback = true;
        }
        target.clear(self.empty_color).ok();
        BackgroundOutcome::Fallback
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::{AMBER, BLACK, GREEN, RED};
    use crate::framebuffer::FrameBuffer;
    use crate::pages::PageText;
    use crate::template::Template;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    fn page(background: Background) -> Page {
        Page {
            index: 0,
            name: "test".into(),
            text: PageText::Template(Template::default()),
            background,
            button: None,
            is_default: false,
        }
    }

    fn compositor() -> ScreenCompositor { ScreenCompositor::new(FontAtlas::ascii(), AMBER, BLACK) }

    #[test]
    fn test_flat_fill_and_glyphs() {
        let mut fb = FrameBuffer::new(60, 20, RED);
        let mut screen = ScreenBuffer::new(10, 2);
        screen.fill_from_text("AB C\n  x");
        let report = compositor().compose(&page(Background::None), &screen, &mut fb, &mut NoBackgrounds);
        assert_eq!(report.background, BackgroundOutcome::Flat);
        assert_eq!(report.glyphs_drawn, 4);
        assert_eq!(report.glyphs_skipped, 0);
        assert_eq!(fb.count(RED), 0, "Flat fill covers the old frame");
        assert!(fb.count(AMBER) > 0);
    }

    #[test]
    fn test_glyph_lands_in_its_cell() {
        let mut fb = FrameBuffer::new(60, 40, BLACK);
        let mut screen = ScreenBuffer::new(2, 2);
        screen.fill_from_text("\n X");
        compositor().compose(&page(Background::None), &screen, &mut fb, &mut NoBackgrounds);
        // Cell (1, 1) spans x 30..60, y 20..40.
        for (i, p) in fb.pixels().iter().enumerate() {
            if *p == AMBER {
                let (x, y) = (i % 60, i / 60);
                assert!(x >= 30 && y >= 20, "ink at {x},{y} outside its cell");
            }
        }
        assert!(fb.count(AMBER) > 0);
    }

    #[test]
    fn test_missing_background_falls_back() {
        let mut fb = FrameBuffer::new(12, 10, RED);
        let screen = ScreenBuffer::new(2, 1);
        let camera = Background::Camera(CameraSpec {
            transform: "NavCam".into(),
            fov: None,
        });
        let mut c = compositor();
        for bg in [camera, Background::Texture("grid".into()), Background::Handler("horizon".into())] {
            fb.clear(RED).ok();
            let report = c.compose(&page(bg), &screen, &mut fb, &mut NoBackgrounds);
            assert_eq!(report.background, BackgroundOutcome::Fallback);
            assert_eq!(fb.count(BLACK), 120, "Fallback leaves a flat empty-color fill");
        }
    }

    #[test]
    fn test_handler_table_paints() {
        let mut fb = FrameBuffer::new(12, 10, BLACK);
        let screen = ScreenBuffer::new(2, 1);
        let mut table = HandlerTable::new()
            .handler("green", |t: &mut FrameBuffer| t.clear(GREEN).is_ok())
            .texture("half", |t: &mut FrameBuffer| {
                Rectangle::new(Point::zero(), Size::new(6, 10))
                    .into_styled(PrimitiveStyle::with_fill(RED))
                    .draw(t)
                    .is_ok()
            })
            .camera(|cam: &CameraSpec, t: &mut FrameBuffer| cam.transform == "Dock" && t.clear(RED).is_ok());

        let mut c = compositor();
        let report = c.compose(&page(Background::Handler("green".into())), &screen, &mut fb, &mut table);
        assert_eq!(report.background, BackgroundOutcome::Painted);
        assert_eq!(fb.count(GREEN), 120);

        c.compose(&page(Background::Texture("half".into())), &screen, &mut fb, &mut table);
        assert_eq!(fb.count(RED), 60);

        let dock = Background::Camera(CameraSpec {
            transform: "Dock".into(),
            fov: Some(30.0),
        });
        let report = c.compose(&page(dock), &screen, &mut fb, &mut table);
        assert_eq!(report.background, BackgroundOutcome::Painted);

        let report = c.compose(&page(Background::Handler("nope".into())), &screen, &mut fb, &mut table);
        assert_eq!(report.background, BackgroundOutcome::Fallback);
    }

    #[test]
    fn test_unmapped_glyphs_skipped_and_counted() {
        let mut fb = FrameBuffer::new(60, 10, BLACK);
        let mut screen = ScreenBuffer::new(10, 1);
        screen.fill_from_text("A°\tB°");
        let mut c = compositor();
        let report = c.compose(&page(Background::None), &screen, &mut fb, &mut NoBackgrounds);
        assert_eq!(report.glyphs_drawn, 2);
        assert_eq!(report.glyphs_skipped, 3);
        assert_eq!(c.reported_codes.len(), 2, "Each code is reported once");
    }

    #[test]
    fn test_latin1_draws_degree_sign() {
        let mut fb = FrameBuffer::new(60, 10, BLACK);
        let mut screen = ScreenBuffer::new(10, 1);
        screen.fill_from_text("12°");
        let mut c = ScreenCompositor::new(FontAtlas::latin1(), AMBER, BLACK);
        let report = c.compose(&page(Background::None), &screen, &mut fb, &mut NoBackgrounds);
        assert_eq!(report.glyphs_drawn, 3);
        assert_eq!(report.glyphs_skipped, 0);
    }
}
