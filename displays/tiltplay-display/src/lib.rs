//! 1-bit rasterizer for Tiltplay
//!
//! This crate provides:
//! - [`FrameBuffer`]: a page-packed monochrome framebuffer with the drawing
//!   primitives games use (pixels, lines, circles, triangles, polygons,
//!   bitmaps)
//! - [`DisplayTransport`]: the seam a display controller driver implements so
//!   [`FrameBuffer::flush`] can stream pages to it
//! - an `embedded-graphics` `DrawTarget` implementation, which is how text
//!   gets rendered
//!
//! # Memory layout
//!
//! ```text
//!            column x →
//! page 0   [b0 b1 b2 ... b(W-1)]   rows 0..8   (bit 0 = row 0)
//! page 1   [b0 b1 b2 ... b(W-1)]   rows 8..16
//!   ...
//! ```
//!
//! Nothing reaches the screen until `flush` is called. There is no second
//! buffer; flushing mid-draw shows a partial frame.

#![no_std]
#![deny(unsafe_code)]

pub mod backend;
pub mod framebuffer;
mod graphics;

// Re-export key types
pub use backend::{DisplayError, DisplayTransport};
pub use embedded_graphics::geometry::Point;
pub use embedded_graphics::pixelcolor::BinaryColor;
pub use framebuffer::{FrameBuffer, MAX_POLYGON_VERTICES};

/// SH1107 panel width in pixels
pub const PANEL_WIDTH: usize = 128;

/// SH1107 panel height in pixels
pub const PANEL_HEIGHT: usize = 128;

/// Number of 8-pixel pages on the panel
pub const PANEL_PAGES: usize = PANEL_HEIGHT / 8;

/// Framebuffer matching the device's 128x128 panel
pub type Frame = FrameBuffer<PANEL_WIDTH, PANEL_PAGES>;
