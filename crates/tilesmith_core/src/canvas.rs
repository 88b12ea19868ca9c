//! The write interface pixel tools paint through

use crate::color::Rgba;
use crate::surface::{CompositeMode, PixelSurface};

/// Anything a brush or fill can paint on.
///
/// Coordinates are in the layer's own pixel space. Reads see committed pixels
/// only; writes go to an overlay until flushed.
pub trait PixelCanvas {
    /// Width and height in pixels
    fn size(&self) -> (u32, u32);

    /// Committed pixel at (x, y), or None outside the canvas
    fn pixel(&self, x: i32, y: i32) -> Option<Rgba>;

    /// Write an uncommitted pixel. Out-of-bounds writes are ignored.
    fn set_overlay_pixel(&mut self, x: i32, y: i32, color: Rgba);

    /// Commit pending pixels using `mode`
    fn flush_overlay_with(&mut self, mode: CompositeMode);

    /// Drop pending pixels
    fn clear_overlay(&mut self);

    /// Declare how pending pixels will be committed so previews match
    fn set_overlay_mode(&mut self, _mode: CompositeMode) {}

    fn flush_overlay(&mut self) {
        self.flush_overlay_with(CompositeMode::SourceOver);
    }
}

impl PixelCanvas for PixelSurface {
    fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.get_pixel(x, y)
    }

    fn set_overlay_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        PixelSurface::set_overlay_pixel(self, x, y, color);
    }

    fn flush_overlay_with(&mut self, mode: CompositeMode) {
        PixelSurface::flush_overlay_with(self, mode);
    }

    fn clear_overlay(&mut self) {
        PixelSurface::clear_overlay(self);
    }

    fn set_overlay_mode(&mut self, mode: CompositeMode) {
        PixelSurface::set_overlay_mode(self, mode);
    }
}
