//! Pixel storage with a non-destructive overlay
//!
//! A [`PixelSurface`] owns two equally sized buffers: the committed base pixels
//! and an overlay used for in-progress strokes. The overlay is empty except while
//! a stroke is running; it is either flushed onto the base or discarded.

use std::collections::HashMap;

use crate::color::Rgba;
use crate::image::ImageBuffer;
use crate::TilesetError;

/// How overlay pixels are merged into the base on flush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Standard source-over alpha compositing
    #[default]
    SourceOver,
    /// Every base pixel under a visible overlay pixel becomes transparent
    Erase,
}

/// RGBA pixel store plus an overlay of identical size
#[derive(Debug, Clone)]
pub struct PixelSurface {
    base: ImageBuffer,
    overlay: ImageBuffer,
    overlay_dirty: bool,
    /// How the pending overlay will be merged, used when previewing it
    overlay_mode: CompositeMode,
}

impl PixelSurface {
    /// Create a fully transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            base: ImageBuffer::new(width, height),
            overlay: ImageBuffer::new(width, height),
            overlay_dirty: false,
            overlay_mode: CompositeMode::SourceOver,
        }
    }

    /// Create a surface from raw RGBA bytes
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self, TilesetError> {
        Ok(Self {
            base: ImageBuffer::from_rgba_bytes(width, height, bytes)?,
            overlay: ImageBuffer::new(width, height),
            overlay_dirty: false,
            overlay_mode: CompositeMode::SourceOver,
        })
    }

    pub fn width(&self) -> u32 {
        self.base.width()
    }

    pub fn height(&self) -> u32 {
        self.base.height()
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width() as i32 && y < self.height() as i32
    }

    /// Committed pixels
    pub fn base(&self) -> &ImageBuffer {
        &self.base
    }

    /// In-progress pixels
    pub fn overlay(&self) -> &ImageBuffer {
        &self.overlay
    }

    /// Whether the overlay holds pixels not yet flushed or cleared
    pub fn has_overlay(&self) -> bool {
        self.overlay_dirty
    }

    pub fn get_pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.base.get(x, y)
    }

    /// Write a base pixel immediately. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        self.base.set(x, y, color);
    }

    pub fn get_overlay_pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.overlay.get(x, y)
    }

    /// Write an overlay pixel. Out-of-bounds writes are ignored.
    pub fn set_overlay_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if self.in_bounds(x, y) {
            self.overlay.set(x, y, color);
            self.overlay_dirty = true;
        }
    }

    pub fn overlay_mode(&self) -> CompositeMode {
        self.overlay_mode
    }

    /// Set how the pending overlay previews. Reset when the overlay is
    /// flushed or cleared.
    pub fn set_overlay_mode(&mut self, mode: CompositeMode) {
        self.overlay_mode = mode;
    }

    /// Base pixel with the overlay applied in the pending mode
    pub fn get_preview_pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        let base = self.base.get(x, y)?;
        let top = self.overlay.get(x, y)?;
        Some(preview_pixel(self.overlay_mode, top, base))
    }

    /// Read a region of base pixels with the overlay applied in the pending mode
    pub fn preview_region(&self, x: i32, y: i32, width: u32, height: u32) -> ImageBuffer {
        let mut out = self.base.region(x, y, width, height);
        if !self.overlay_dirty {
            return out;
        }
        let overlay = self.overlay.region(x, y, width, height);
        match self.overlay_mode {
            CompositeMode::SourceOver => out.composite(&overlay, 0, 0),
            CompositeMode::Erase => {
                for oy in 0..height as i32 {
                    for ox in 0..width as i32 {
                        if overlay.get(ox, oy).is_some_and(|p| !p.is_transparent()) {
                            out.set(ox, oy, Rgba::TRANSPARENT);
                        }
                    }
                }
            }
        }
        out
    }

    /// Source-over composite the overlay onto the base, then clear it
    pub fn flush_overlay(&mut self) {
        self.flush_overlay_with(CompositeMode::SourceOver);
    }

    /// Merge the overlay into the base using `mode`, then clear it
    pub fn flush_overlay_with(&mut self, mode: CompositeMode) {
        if !self.overlay_dirty {
            self.clear_overlay();
            return;
        }
        let (width, height) = (self.width() as i32, self.height() as i32);
        for y in 0..height {
            for x in 0..width {
                let Some(top) = self.overlay.get(x, y) else {
                    continue;
                };
                if top.is_transparent() {
                    continue;
                }
                match mode {
                    CompositeMode::SourceOver => {
                        if let Some(dst) = self.base.get(x, y) {
                            self.base.set(x, y, top.over(dst));
                        }
                    }
                    CompositeMode::Erase => self.base.set(x, y, Rgba::TRANSPARENT),
                }
            }
        }
        tracing::trace!(?mode, "flushed overlay");
        self.clear_overlay();
    }

    /// Discard the overlay without committing
    pub fn clear_overlay(&mut self) {
        self.overlay_mode = CompositeMode::SourceOver;
        if self.overlay_dirty {
            self.overlay.clear();
            self.overlay_dirty = false;
        }
    }

    /// Colors present in the base, ranked by occurrence count (descending).
    /// Ties keep the order of first appearance.
    pub fn get_unique_colors(&self) -> Vec<(Rgba, usize)> {
        let mut counts: HashMap<Rgba, (usize, usize)> = HashMap::new();
        for (i, &p) in self.base.pixels().iter().enumerate() {
            counts.entry(p).or_insert((0, i)).0 += 1;
        }
        let mut ranked: Vec<(Rgba, usize, usize)> = counts
            .into_iter()
            .map(|(color, (count, first))| (color, count, first))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked
            .into_iter()
            .map(|(color, count, _)| (color, count))
            .collect()
    }

    /// Raw RGBA bytes of the base
    pub fn get_surface_bytes(&self) -> Vec<u8> {
        self.base.to_rgba_bytes()
    }

    /// Replace the base with raw RGBA bytes of the same dimensions.
    /// Any pending overlay is discarded.
    pub fn put_surface_bytes(&mut self, bytes: &[u8]) -> Result<(), TilesetError> {
        self.base = ImageBuffer::from_rgba_bytes(self.width(), self.height(), bytes)?;
        self.clear_overlay();
        Ok(())
    }

    /// Replace the base image wholesale; dimensions must match
    pub fn put_image(&mut self, image: &ImageBuffer) -> Result<(), TilesetError> {
        if image.width() != self.width() || image.height() != self.height() {
            return Err(TilesetError::PixelDataLength {
                expected: (self.width() * self.height() * 4) as usize,
                actual: (image.width() * image.height() * 4) as usize,
            });
        }
        self.base = image.clone();
        self.clear_overlay();
        Ok(())
    }
}

fn preview_pixel(mode: CompositeMode, top: Rgba, base: Rgba) -> Rgba {
    match mode {
        CompositeMode::SourceOver => top.over(base),
        CompositeMode::Erase if !top.is_transparent() => Rgba::TRANSPARENT,
        CompositeMode::Erase => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_round_trip() {
        let mut surface = PixelSurface::new(8, 8);
        let colors = [Rgba::RED, Rgba::new(1, 2, 3, 4), Rgba::TRANSPARENT];
        for (i, color) in colors.iter().enumerate() {
            let (x, y) = (i as i32 * 3, 7 - i as i32);
            surface.set_pixel(x, y, *color);
            assert_eq!(surface.get_pixel(x, y), Some(*color));
        }
    }

    #[test]
    fn test_out_of_bounds_is_noop() {
        let mut surface = PixelSurface::new(4, 4);
        surface.set_pixel(-1, 0, Rgba::RED);
        surface.set_pixel(4, 4, Rgba::RED);
        surface.set_overlay_pixel(10, 0, Rgba::RED);
        assert_eq!(surface.get_pixel(-1, 0), None);
        assert!(!surface.has_overlay());
        assert!(!surface.base().has_visible_pixels());
    }

    #[test]
    fn test_overlay_isolation() {
        let mut surface = PixelSurface::new(4, 4);
        surface.set_pixel(1, 1, Rgba::BLUE);
        surface.set_overlay_pixel(1, 1, Rgba::RED);
        surface.set_overlay_pixel(2, 2, Rgba::GREEN);
        assert_eq!(surface.get_pixel(1, 1), Some(Rgba::BLUE));
        assert_eq!(surface.get_pixel(2, 2), Some(Rgba::TRANSPARENT));
        assert_eq!(surface.get_preview_pixel(1, 1), Some(Rgba::RED));

        surface.flush_overlay();
        assert_eq!(surface.get_pixel(1, 1), Some(Rgba::RED));
        assert_eq!(surface.get_pixel(2, 2), Some(Rgba::GREEN));
        assert!(!surface.has_overlay());
    }

    #[test]
    fn test_flush_opaque_overlay_then_clear_keeps_base() {
        let mut surface = PixelSurface::new(3, 3);
        for y in 0..3 {
            for x in 0..3 {
                surface.set_pixel(x, y, Rgba::new(9, 9, 9, 100));
                surface.set_overlay_pixel(x, y, Rgba::new(x as u8 * 50, y as u8 * 50, 7, 255));
            }
        }
        surface.flush_overlay();
        surface.clear_overlay();
        for y in 0..3 {
            for x in 0..3 {
                assert_eq!(
                    surface.get_pixel(x, y),
                    Some(Rgba::new(x as u8 * 50, y as u8 * 50, 7, 255))
                );
            }
        }
    }

    #[test]
    fn test_flush_skips_transparent_overlay_pixels() {
        let mut surface = PixelSurface::new(2, 1);
        surface.set_pixel(0, 0, Rgba::BLUE);
        surface.set_overlay_pixel(0, 0, Rgba::new(255, 0, 0, 0));
        surface.flush_overlay();
        assert_eq!(surface.get_pixel(0, 0), Some(Rgba::BLUE));
    }

    #[test]
    fn test_clear_overlay_discards_stroke() {
        let mut surface = PixelSurface::new(2, 2);
        surface.set_overlay_pixel(0, 0, Rgba::RED);
        surface.clear_overlay();
        surface.flush_overlay();
        assert_eq!(surface.get_pixel(0, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_erase_flush_clears_base_under_overlay() {
        let mut surface = PixelSurface::new(2, 1);
        surface.set_pixel(0, 0, Rgba::RED);
        surface.set_pixel(1, 0, Rgba::RED);
        surface.set_overlay_pixel(1, 0, Rgba::WHITE);
        surface.flush_overlay_with(CompositeMode::Erase);
        assert_eq!(surface.get_pixel(0, 0), Some(Rgba::RED));
        assert_eq!(surface.get_pixel(1, 0), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_erase_overlay_previews_as_transparent() {
        let mut surface = PixelSurface::new(3, 1);
        for x in 0..3 {
            surface.set_pixel(x, 0, Rgba::BLUE);
        }
        surface.set_overlay_mode(CompositeMode::Erase);
        surface.set_overlay_pixel(1, 0, Rgba::WHITE);
        assert_eq!(surface.get_preview_pixel(1, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(surface.get_preview_pixel(0, 0), Some(Rgba::BLUE));

        let preview = surface.preview_region(0, 0, 3, 1);
        assert_eq!(preview.get(0, 0), Some(Rgba::BLUE));
        assert_eq!(preview.get(1, 0), Some(Rgba::TRANSPARENT));
        assert_eq!(preview.get(2, 0), Some(Rgba::BLUE));

        surface.clear_overlay();
        assert_eq!(surface.overlay_mode(), CompositeMode::SourceOver);
        assert_eq!(surface.get_preview_pixel(1, 0), Some(Rgba::BLUE));
    }

    #[test]
    fn test_unique_colors_ranked_by_count() {
        let mut surface = PixelSurface::new(3, 2);
        surface.set_pixel(0, 0, Rgba::RED);
        surface.set_pixel(1, 0, Rgba::GREEN);
        surface.set_pixel(2, 0, Rgba::GREEN);
        let colors = surface.get_unique_colors();
        assert_eq!(
            colors,
            vec![(Rgba::TRANSPARENT, 3), (Rgba::GREEN, 2), (Rgba::RED, 1)]
        );
    }

    #[test]
    fn test_surface_bytes_round_trip() {
        let mut surface = PixelSurface::new(2, 2);
        surface.set_pixel(1, 0, Rgba::new(1, 2, 3, 4));
        let bytes = surface.get_surface_bytes();
        assert_eq!(&bytes[4..8], &[1, 2, 3, 4]);

        let mut other = PixelSurface::new(2, 2);
        other.put_surface_bytes(&bytes).unwrap();
        assert_eq!(other.get_pixel(1, 0), Some(Rgba::new(1, 2, 3, 4)));
        assert!(other.put_surface_bytes(&bytes[..4]).is_err());
    }
}
