//! Owned RGB565 framebuffer implementing `DrawTarget`.
//!
//! This is the render target a host hands to the compositor when it has no
//! display of its own: it keeps one `Rgb565` per pixel and can hand the
//! frame out as big-endian bytes, the wire order SPI panels expect.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

/// Row-major RGB565 pixel buffer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb565>,
}

impl FrameBuffer {
    /// Buffer of `width` x `height` filled with `color`.
    pub fn new(
        width: u32,
        height: u32,
        color: Rgb565,
    ) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    /// Color at `(x, y)`, `None` outside the buffer.
    pub fn pixel(
        &self,
        x: i32,
        y: i32,
    ) -> Option<Rgb565> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn pixels(&self) -> &[Rgb565] { &self.pixels }

    /// Number of pixels with exactly `color`.
    pub fn count(
        &self,
        color: Rgb565,
    ) -> usize {
        self.pixels.iter().filter(|p| **p == color).count()
    }

    /// Frame as big-endian RGB565 bytes.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|c| RawU16::from(*c).into_inner().to_be_bytes())
            .collect()
    }

    #[inline]
    fn index(
        &self,
        x: i32,
        y: i32,
    ) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size { Size::new(self.width, self.height) }
}

impl DrawTarget for FrameBuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(i) = self.index(point.x, point.y) {
                self.pixels[i] = color;
            }
        }
        Ok(())
    }

    fn fill_contiguous<I>(
        &mut self,
        area: &Rectangle,
        colors: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Self::Color>,
    {
        // Colors cover the whole area in row order, even the clipped part.
        let points = area.points();
        self.draw_iter(points.zip(colors).map(|(p, c)| Pixel(p, c)))
    }

    fn fill_solid(
        &mut self,
        area: &Rectangle,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        let drawable_area = area.intersection(&self.bounding_box());
        if drawable_area.size == Size::zero() {
            return Ok(());
        }
        let x_start = drawable_area.top_left.x as usize;
        let width = drawable_area.size.width as usize;
        for y in drawable_area.rows() {
            let row_start = y as usize * self.width as usize + x_start;
            self.pixels[row_start..row_start + width].fill(color);
        }
        Ok(())
    }

    fn clear(
        &mut self,
        color: Self::Color,
    ) -> Result<(), Self::Error> {
        self.pixels.fill(color);
        Ok(())
    }
}
