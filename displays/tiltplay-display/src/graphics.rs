//! `embedded-graphics` integration
//!
//! Lets games use the embedded-graphics text and primitive styles on top of
//! the native rasterizer. Out-of-range pixels are dropped like everywhere
//! else in the framebuffer.

use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::geometry::{OriginDimensions, Size};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::Pixel;

use crate::framebuffer::FrameBuffer;

impl<const W: usize, const PAGES: usize> OriginDimensions for FrameBuffer<W, PAGES> {
    fn size(&self) -> Size {
        Size::new(W as u32, (PAGES * 8) as u32)
    }
}

impl<const W: usize, const PAGES: usize> DrawTarget for FrameBuffer<W, PAGES> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        FrameBuffer::clear(self, color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mono_font::ascii::FONT_6X10;
    use embedded_graphics::mono_font::MonoTextStyle;
    use embedded_graphics::prelude::*;
    use embedded_graphics::text::{Baseline, Text};

    type Small = FrameBuffer<32, 4>;

    #[test]
    fn test_size_matches_geometry() {
        let fb = Small::new();
        assert_eq!(fb.size(), Size::new(32, 32));
    }

    #[test]
    fn test_text_lands_in_top_left_cell() {
        let mut fb = Small::new();
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        Text::with_baseline("H", Point::zero(), style, Baseline::Top)
            .draw(&mut fb)
            .unwrap();

        let mut lit = 0;
        for y in 0..32 {
            for x in 0..32 {
                if fb.pixel(x, y) == Some(BinaryColor::On) {
                    assert!(x < 6 && y < 10, "glyph pixel at ({}, {})", x, y);
                    lit += 1;
                }
            }
        }
        assert!(lit > 0);
    }

    #[test]
    fn test_text_off_screen_is_dropped() {
        let mut fb = Small::new();
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        Text::new("offscreen", Point::new(100, 100), style)
            .draw(&mut fb)
            .unwrap();
        assert!(fb.pages().iter().all(|p| p.iter().all(|b| *b == 0)));
    }

    #[test]
    fn test_draw_target_clear() {
        let mut fb = Small::new();
        DrawTarget::clear(&mut fb, BinaryColor::On).unwrap();
        assert_eq!(fb.pixel(31, 31), Some(BinaryColor::On));
    }
}
