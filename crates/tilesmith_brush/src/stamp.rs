//! Circular brush stamp

use tilesmith_core::{PixelCanvas, Rgba, MAX_BRUSH_DIAMETER};

/// Integer offsets covered by a circular brush of `diameter` pixels.
///
/// An offset `(dx, dy)` is covered when `dx² + dy² <= (diameter / 2)²`.
/// The diameter is clamped to `1..=MAX_BRUSH_DIAMETER`.
pub fn circle_offsets(diameter: u32) -> Vec<(i32, i32)> {
    let diameter = diameter.clamp(1, MAX_BRUSH_DIAMETER);
    let radius = diameter as f64 / 2.0;
    let reach = (diameter / 2) as i32;
    let mut offsets = Vec::new();
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let (dx64, dy64) = (i64::from(dx), i64::from(dy));
            if ((dx64 * dx64 + dy64 * dy64) as f64) <= radius * radius {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Stamp a filled circle centered on the pixel containing (x, y) into the
/// canvas overlay. Centers that are not finite, or too far outside the canvas
/// for the circle to reach it, stamp nothing.
pub fn stamp_circle<C>(canvas: &mut C, x: f64, y: f64, diameter: u32, color: Rgba)
where
    C: PixelCanvas + ?Sized,
{
    if !reaches_canvas(canvas.size(), x, y, diameter) {
        return;
    }
    let cx = x.floor() as i32;
    let cy = y.floor() as i32;
    for (dx, dy) in circle_offsets(diameter) {
        canvas.set_overlay_pixel(cx + dx, cy + dy, color);
    }
}

/// Whether a circle of `diameter` centered at (x, y) can touch a canvas of `size`
fn reaches_canvas(size: (u32, u32), x: f64, y: f64, diameter: u32) -> bool {
    if !x.is_finite() || !y.is_finite() {
        return false;
    }
    let pad = f64::from(diameter.clamp(1, MAX_BRUSH_DIAMETER) / 2) + 1.0;
    let (w, h) = (f64::from(size.0), f64::from(size.1));
    (-pad..=w + pad).contains(&x) && (-pad..=h + pad).contains(&y)
}
