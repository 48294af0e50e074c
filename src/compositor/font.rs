//! Fixed-width glyph atlases.
//!
//! Glyphs are cut straight out of an `embedded_graphics` `MonoFont` image
//! instead of going through its text renderer, so the character grid is
//! exact and unmapped codes are detected instead of drawn as `?`.
//!
//! | Choice | Font | Layout |
//! |--------|------|--------|
//! | `latin1` (default) | `iso_8859_1::FONT_6X10` | printable ASCII + 0xA0..=0xFF |
//! | `ascii` | `ascii::FONT_6X10` | printable ASCII |
//! | `profont` | `PROFONT_12_POINT` | printable ASCII |
//!
//! Atlas layout: glyph 0 is the space (0x20). The printable ASCII block
//! holds 95 glyphs (0x20..=0x7E; there is no DEL glyph). In the Latin-1
//! atlas the 0xA0..=0xFF block follows directly, skipping the unpopulated
//! 0x7F..=0x9F range.

use embedded_graphics::image::{Image, ImageDrawableExt};
use embedded_graphics::mono_font::{MonoFont, ascii, iso_8859_1};
use embedded_graphics::pixelcolor::{BinaryColor, Rgb565};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use profont::PROFONT_12_POINT;
use serde::Deserialize;

/// First code in the atlas.
const FIRST_CODE: u32 = 0x20;
/// Glyphs in the printable ASCII block.
const ASCII_GLYPHS: usize = 95;
/// First code of the Latin-1 upper block.
const LATIN1_HIGH_START: u32 = 0xA0;
/// Glyphs in the Latin-1 upper block.
const LATIN1_HIGH_GLYPHS: usize = 96;

/// Which atlas a display uses.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontChoice {
    #[default]
    Latin1,
    Ascii,
    Profont,
}

/// Code-to-glyph layout of an atlas.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GlyphLayout {
    Ascii,
    Latin1,
}

/// A bitmap font with a known glyph layout.
#[derive(Clone, Copy)]
pub struct FontAtlas {
    font: &'static MonoFont<'static>,
    layout: GlyphLayout,
    glyph_count: usize,
}

impl FontAtlas {
    /// Latin-1 6x10.
    pub fn latin1() -> Self { Self::with_layout(&iso_8859_1::FONT_6X10, GlyphLayout::Latin1) }

    /// ASCII 6x10.
    pub fn ascii() -> Self { Self::with_layout(&ascii::FONT_6X10, GlyphLayout::Ascii) }

    /// ProFont 12pt, ASCII only.
    pub fn profont() -> Self { Self::with_layout(&PROFONT_12_POINT, GlyphLayout::Ascii) }

    pub fn for_choice(choice: FontChoice) -> Self {
        match choice {
            FontChoice::Latin1 => Self::latin1(),
            FontChoice::Ascii => Self::ascii(),
            FontChoice::Profont => Self::profont(),
        }
    }

    /// Wrap `font`, trusting it to hold every glyph `layout` names.
    ///
    /// The glyph count is capped by the cells the font image actually has.
    pub fn with_layout(
        font: &'static MonoFont<'static>,
        layout: GlyphLayout,
    ) -> Self {
        let wanted = match layout {
            GlyphLayout::Ascii => ASCII_GLYPHS,
            GlyphLayout::Latin1 => ASCII_GLYPHS + LATIN1_HIGH_GLYPHS,
        };
        let image = font.image.size();
        let cell = font.character_size;
        let capacity = if cell.width == 0 || cell.height == 0 {
            0
        } else {
            (image.width / cell.width) as usize * (image.height / cell.height) as usize
        };
        Self {
            font,
            layout,
            glyph_count: wanted.min(capacity),
        }
    }

    #[inline]
    pub const fn layout(&self) -> GlyphLayout { self.layout }

    #[inline]
    pub const fn glyph_count(&self) -> usize { self.glyph_count }

    /// Glyph cell size in pixels.
    #[inline]
    pub const fn glyph_size(&self) -> Size { self.font.character_size }

    /// Atlas index for `c`, `None` when the atlas has no glyph for it.
    pub fn glyph_index(
        &self,
        c: char,
    ) -> Option<usize> {
        let code = u32::from(c);
        let index = match (self.layout, code) {
            (_, FIRST_CODE..=0x7E) => (code - FIRST_CODE) as usize,
            (GlyphLayout::Latin1, LATIN1_HIGH_START..=0xFF) => ASCII_GLYPHS + (code - LATIN1_HIGH_START) as usize,
            _ => return None,
        };
        (index < self.glyph_count).then_some(index)
    }

    /// Draw glyph `index` with its top-left corner at `top_left`.
    ///
    /// Only set pixels are written; the background shows through.
    pub fn draw_glyph<D>(
        &self,
        index: usize,
        top_left: Point,
        color: Rgb565,
        target: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let cell = self.font.character_size;
        let per_row = (self.font.image.size().width / cell.width.max(1)).max(1) as usize;
        let origin = Point::new(
            ((index % per_row) as u32 * cell.width) as i32,
            ((index / per_row) as u32 * cell.height) as i32,
        );
        let glyph = self.font.image.sub_image(&Rectangle::new(origin, cell));
        Image::new(&glyph, top_left).draw(&mut GlyphInk { target, color })
    }
}

impl core::fmt::Debug for FontAtlas {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("FontAtlas")
            .field("layout", &self.layout)
            .field("glyph_count", &self.glyph_count)
            .field("glyph_size", &self.font.character_size)
            .finish()
    }
}

/// Draws the `On` pixels of a binary glyph in one color.
struct GlyphInk<'a, D> {
    target: &'a mut D,
    color: Rgb565,
}

impl<D: DrawTarget<Color = Rgb565>> Dimensions for GlyphInk<'_, D> {
    fn bounding_box(&self) -> Rectangle { self.target.bounding_box() }
}

impl<D: DrawTarget<Color = Rgb565>> DrawTarget for GlyphInk<'_, D> {
    type Color = BinaryColor;
    type Error = D::Error;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let color = self.color;
        self.target.draw_iter(
            pixels
                .into_iter()
                .filter(|Pixel(_, c)| c.is_on())
                .map(|Pixel(p, _)| Pixel(p, color)),
        )
    }
}
