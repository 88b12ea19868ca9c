//! Plain RGBA pixel buffers

use crate::color::Rgba;
use crate::TilesetError;

/// A width x height grid of RGBA pixels, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl ImageBuffer {
    /// Create a fully transparent buffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::TRANSPARENT; (width * height) as usize],
        }
    }

    /// Create a buffer from raw RGBA bytes (4 bytes per pixel, row-major)
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> Result<Self, TilesetError> {
        let expected = (width * height * 4) as usize;
        if bytes.len() != expected {
            return Err(TilesetError::PixelDataLength {
                expected,
                actual: bytes.len(),
            });
        }
        let pixels = bytes
            .chunks_exact(4)
            .map(|c| Rgba::new(c[0], c[1], c[2], c[3]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Flatten into raw RGBA bytes
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_array()).collect()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as u32 * self.width + x as u32) as usize)
    }

    /// Get the pixel at (x, y), or None when outside the buffer
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set the pixel at (x, y); writes outside the buffer are ignored
    pub fn set(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Reset every pixel to transparent
    pub fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
    }

    /// Copy a rectangular region into a new buffer.
    /// Source pixels outside this buffer read as transparent.
    pub fn region(&self, x: i32, y: i32, width: u32, height: u32) -> ImageBuffer {
        let mut out = ImageBuffer::new(width, height);
        for dy in 0..height as i32 {
            for dx in 0..width as i32 {
                if let Some(p) = self.get(x + dx, y + dy) {
                    out.set(dx, dy, p);
                }
            }
        }
        out
    }

    /// Overwrite pixels with `src` placed at (x, y), clipping at the edges
    pub fn blit(&mut self, src: &ImageBuffer, x: i32, y: i32) {
        for sy in 0..src.height as i32 {
            for sx in 0..src.width as i32 {
                if let Some(p) = src.get(sx, sy) {
                    self.set(x + sx, y + sy, p);
                }
            }
        }
    }

    /// Source-over composite `src` onto this buffer at (x, y)
    pub fn composite(&mut self, src: &ImageBuffer, x: i32, y: i32) {
        for sy in 0..src.height as i32 {
            for sx in 0..src.width as i32 {
                let Some(top) = src.get(sx, sy) else {
                    continue;
                };
                if let Some(i) = self.index(x + sx, y + sy) {
                    self.pixels[i] = top.over(self.pixels[i]);
                }
            }
        }
    }

    /// Whether any pixel has non-zero alpha
    pub fn has_visible_pixels(&self) -> bool {
        self.pixels.iter().any(|p| !p.is_transparent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_rejects_wrong_length() {
        let result = ImageBuffer::from_rgba_bytes(2, 2, &[0; 15]);
        assert_eq!(
            result,
            Err(TilesetError::PixelDataLength {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn test_region_and_blit() {
        let mut image = ImageBuffer::new(4, 4);
        image.set(2, 2, Rgba::RED);
        let region = image.region(2, 2, 2, 2);
        assert_eq!(region.get(0, 0), Some(Rgba::RED));
        assert_eq!(region.get(1, 1), Some(Rgba::TRANSPARENT));

        let mut target = ImageBuffer::new(3, 3);
        target.blit(&region, 2, 2);
        assert_eq!(target.get(2, 2), Some(Rgba::RED));
    }

    #[test]
    fn test_out_of_bounds_access() {
        let mut image = ImageBuffer::new(2, 2);
        image.set(-1, 0, Rgba::RED);
        image.set(2, 0, Rgba::RED);
        assert_eq!(image.get(-1, 0), None);
        assert!(!image.has_visible_pixels());
    }
}
