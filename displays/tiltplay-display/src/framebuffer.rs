//! Page-packed 1-bit framebuffer and drawing primitives
//!
//! All coordinates are signed so shapes can hang off any edge of the screen;
//! pixels outside `[0, W) x [0, H)` are silently dropped.

use core::ops::RangeInclusive;

use embedded_graphics::geometry::Point;
use embedded_graphics::pixelcolor::BinaryColor;
use heapless::Vec;

use crate::backend::{DisplayError, DisplayTransport};

/// Maximum number of vertices accepted by [`FrameBuffer::fill_polygon`]
pub const MAX_POLYGON_VERTICES: usize = 32;

/// Monochrome framebuffer, `W` columns by `PAGES * 8` rows
///
/// Byte `x` of page `p` holds rows `8p..8p+8` of column `x`, bit 0 on top.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer<const W: usize, const PAGES: usize> {
    buffer: [[u8; W]; PAGES],
}

impl<const W: usize, const PAGES: usize> Default for FrameBuffer<W, PAGES> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const PAGES: usize> core::fmt::Debug for FrameBuffer<W, PAGES> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("width", &W)
            .field("height", &Self::HEIGHT)
            .finish()
    }
}

#[inline]
fn apply(byte: &mut u8, mask: u8, color: BinaryColor) {
    match color {
        BinaryColor::On => *byte |= mask,
        BinaryColor::Off => *byte &= !mask,
    }
}

/// Steps `k` in `0..=|delta|` whose coordinate `start + k * signum(delta)`
/// lies in `[0, limit)`
fn visible_steps(start: i64, delta: i64, limit: usize) -> RangeInclusive<i64> {
    let limit = limit as i64;
    let (lo, hi) = if delta >= 0 {
        (-start, limit - 1 - start)
    } else {
        (start - limit + 1, start)
    };
    lo.max(0)..=hi.min(delta.abs())
}

/// Minor-axis offset after `k` major-axis steps, rounded half up
fn minor_offset(k: i64, major: i64, minor: i64) -> i64 {
    if major == 0 {
        return 0;
    }
    let (k, major, minor) = (i128::from(k), i128::from(major), i128::from(minor));
    ((2 * k * minor + major) / (2 * major)) as i64
}

impl<const W: usize, const PAGES: usize> FrameBuffer<W, PAGES> {
    /// Width in pixels
    pub const WIDTH: usize = W;

    /// Height in pixels
    pub const HEIGHT: usize = PAGES * 8;

    /// Create a blank (all off) framebuffer
    pub const fn new() -> Self {
        Self {
            buffer: [[0; W]; PAGES],
        }
    }

    /// Width in pixels
    pub fn width(&self) -> usize {
        W
    }

    /// Height in pixels
    pub fn height(&self) -> usize {
        Self::HEIGHT
    }

    /// Raw bytes of one page
    pub fn page(&self, page: usize) -> Option<&[u8; W]> {
        self.buffer.get(page)
    }

    /// All pages, top to bottom
    pub fn pages(&self) -> &[[u8; W]; PAGES] {
        &self.buffer
    }

    fn fill_bytes(&mut self, color: BinaryColor) {
        let value = match color {
            BinaryColor::On => 0xFF,
            BinaryColor::Off => 0x00,
        };
        for page in self.buffer.iter_mut() {
            page.fill(value);
        }
    }

    /// Set every pixel to `color`
    pub fn clear(&mut self, color: BinaryColor) {
        self.fill_bytes(color);
    }

    /// Invert every pixel
    pub fn invert(&mut self) {
        for page in self.buffer.iter_mut() {
            for byte in page.iter_mut() {
                *byte = !*byte;
            }
        }
    }

    #[inline]
    fn in_bounds(x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < W as i64 && y < Self::HEIGHT as i64
    }

    fn plot(&mut self, x: i64, y: i64, color: BinaryColor) {
        if !Self::in_bounds(x, y) {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        apply(&mut self.buffer[y / 8][x], 1 << (y % 8), color);
    }

    fn span(&mut self, x: i64, y: i64, len: i64, color: BinaryColor) {
        if len <= 0 || y < 0 || y >= Self::HEIGHT as i64 {
            return;
        }
        let start = x.max(0);
        let end = x.saturating_add(len).min(W as i64);
        if start >= end {
            return;
        }

        let y = y as usize;
        let mask = 1 << (y % 8);
        for byte in &mut self.buffer[y / 8][start as usize..end as usize] {
            apply(byte, mask, color);
        }
    }

    /// Set a single pixel; out-of-range coordinates are ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, color: BinaryColor) {
        self.plot(x.into(), y.into(), color);
    }

    /// Read a single pixel back
    pub fn pixel(&self, x: i32, y: i32) -> Option<BinaryColor> {
        if !Self::in_bounds(x.into(), y.into()) {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        let lit = self.buffer[y / 8][x] & (1 << (y % 8)) != 0;
        Some(BinaryColor::from(lit))
    }

    /// Horizontal run of `len` pixels starting at `(x, y)`
    pub fn hline(&mut self, x: i32, y: i32, len: i32, color: BinaryColor) {
        self.span(x.into(), y.into(), len.into(), color);
    }

    /// Vertical run of `len` pixels starting at `(x, y)`
    pub fn vline(&mut self, x: i32, y: i32, len: i32, color: BinaryColor) {
        if len <= 0 || x < 0 || x as usize >= W {
            return;
        }
        let start = y.max(0);
        let end = y.saturating_add(len).min(Self::HEIGHT as i32);
        for row in start..end {
            self.set_pixel(x, row, color);
        }
    }

    /// Straight line between two points, both ends inclusive
    ///
    /// Each step along the major axis rounds the minor coordinate to the
    /// nearest pixel (Bresenham's pixel choice). Only steps whose major
    /// coordinate lands on the buffer are visited.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: BinaryColor) {
        let (x0, y0) = (i64::from(x0), i64::from(y0));
        let (dx, dy) = (i64::from(x1) - x0, i64::from(y1) - y0);
        let (ax, ay) = (dx.abs(), dy.abs());

        if ax >= ay {
            for k in visible_steps(x0, dx, W) {
                let y = y0 + dy.signum() * minor_offset(k, ax, ay);
                self.plot(x0 + dx.signum() * k, y, color);
            }
        } else {
            for k in visible_steps(y0, dy, Self::HEIGHT) {
                let x = x0 + dx.signum() * minor_offset(k, ay, ax);
                self.plot(x, y0 + dy.signum() * k, color);
            }
        }
    }

    /// Rectangle outline
    pub fn rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: BinaryColor) {
        if width <= 0 || height <= 0 {
            return;
        }
        self.hline(x, y, width, color);
        self.hline(x, y.saturating_add(height - 1), width, color);
        self.vline(x, y, height, color);
        self.vline(x.saturating_add(width - 1), y, height, color);
    }

    /// Filled rectangle
    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, color: BinaryColor) {
        if height <= 0 {
            return;
        }
        for row in y.max(0)..y.saturating_add(height).min(Self::HEIGHT as i32) {
            self.hline(x, row, width, color);
        }
    }

    /// Midpoint circle of radius `r` centred on `(x0, y0)`
    ///
    /// Outline mode plots the 8 octant-symmetric points of each step; filled
    /// mode draws the 4 horizontal spans they bound instead.
    pub fn circle(&mut self, x0: i32, y0: i32, r: i32, color: BinaryColor, filled: bool) {
        if r < 0 {
            return;
        }
        let (cx, cy, r) = (i64::from(x0), i64::from(y0), i64::from(r));
        if cx + r < 0 || cy + r < 0 || cx - r >= W as i64 || cy - r >= Self::HEIGHT as i64 {
            return;
        }

        let (mut x, mut y) = (r, 0);
        let mut err = 1 - r;

        while x >= y {
            if filled {
                self.span(cx - x, cy + y, 2 * x + 1, color);
                self.span(cx - x, cy - y, 2 * x + 1, color);
                self.span(cx - y, cy + x, 2 * y + 1, color);
                self.span(cx - y, cy - x, 2 * y + 1, color);
            } else {
                for (px, py) in [
                    (x, y),
                    (-x, y),
                    (x, -y),
                    (-x, -y),
                    (y, x),
                    (-y, x),
                    (y, -x),
                    (-y, -x),
                ] {
                    self.plot(cx + px, cy + py, color);
                }
            }

            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x + 1);
            }
        }
    }

    /// Triangle through three vertices
    pub fn triangle(&mut self, p0: Point, p1: Point, p2: Point, color: BinaryColor, filled: bool) {
        if filled {
            self.scan_fill(&[p0, p1, p2], color);
        } else {
            self.line(p0.x, p0.y, p1.x, p1.y, color);
            self.line(p1.x, p1.y, p2.x, p2.y, color);
            self.line(p2.x, p2.y, p0.x, p0.y, color);
        }
    }

    /// Even-odd scanline fill of a closed polygon
    ///
    /// Edges run between consecutive points and from the last point back to
    /// the first. Scanlines are half-open at the top: a row is filled where
    /// it crosses an edge with one end strictly above it. Each span runs from
    /// one intersection up to, not including, the next.
    pub fn fill_polygon(&mut self, points: &[Point], color: BinaryColor) -> Result<(), DisplayError> {
        if points.len() > MAX_POLYGON_VERTICES {
            return Err(DisplayError::BufferOverflow);
        }
        self.scan_fill(points, color);
        Ok(())
    }

    fn scan_fill(&mut self, points: &[Point], color: BinaryColor) {
        let (Some(min_y), Some(max_y)) = (
            points.iter().map(|p| p.y).min(),
            points.iter().map(|p| p.y).max(),
        ) else {
            return;
        };

        // Rows off-screen cannot contribute pixels
        let first = i64::from(min_y).max(0);
        let last = i64::from(max_y).min(Self::HEIGHT as i64 - 1);

        for y in first..=last {
            let mut nodes: Vec<i64, MAX_POLYGON_VERTICES> = Vec::new();
            let mut j = points.len() - 1;
            for i in 0..points.len() {
                let (pi, pj) = (points[i], points[j]);
                let (yi, yj) = (i64::from(pi.y), i64::from(pj.y));
                if (yi < y && yj >= y) || (yj < y && yi >= y) {
                    let (xi, xj) = (i128::from(pi.x), i128::from(pj.x));
                    let x = xi + i128::from(y - yi) * (xj - xi) / i128::from(yj - yi);
                    // One node per edge at most, and edges == points.len()
                    let _ = nodes.push(x as i64);
                }
                j = i;
            }

            nodes.sort_unstable();
            for span in nodes.chunks_exact(2) {
                self.span(span[0], y, span[1] - span[0], color);
            }
        }
    }

    /// Copy a 1bpp bitmap onto the framebuffer
    ///
    /// Rows are row-major and MSB-first, each padded to a whole byte. Both
    /// set and clear bits are written. Rows missing from a short slice are
    /// skipped.
    pub fn blit_bitmap(&mut self, x: i32, y: i32, bitmap: &[u8], width: u32, height: u32) {
        let stride = width.div_ceil(8) as usize;
        if stride == 0 {
            return;
        }

        let (x, y) = (i64::from(x), i64::from(y));
        for (j, row) in bitmap.chunks_exact(stride).take(height as usize).enumerate() {
            for i in 0..width as usize {
                let lit = (row[i / 8] >> (7 - i % 8)) & 1 == 1;
                self.plot(x + i as i64, y + j as i64, BinaryColor::from(lit));
            }
        }
    }

    /// Stream every page to the display, top to bottom
    pub fn flush<T: DisplayTransport>(&self, transport: &mut T) -> Result<(), DisplayError> {
        for (page, data) in self.buffer.iter().enumerate() {
            transport.write_page(page as u8, data)?;
        }
        Ok(())
    }
}
