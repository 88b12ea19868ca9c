//! Flood fill and closed-path fill

use tilesmith_core::{PixelCanvas, Rgba};

/// 4-connected flood fill from (x, y) into the canvas overlay.
///
/// Expands over committed pixels exactly equal to the seed color. Returns the
/// number of pixels written; filling with the seed's own color writes nothing.
pub fn flood_fill<C>(canvas: &mut C, x: i32, y: i32, color: Rgba) -> usize
where
    C: PixelCanvas + ?Sized,
{
    let Some(target) = canvas.pixel(x, y) else {
        return 0;
    };
    if target == color {
        return 0;
    }

    let (width, height) = canvas.size();
    let (w, h) = (width as i32, height as i32);
    // Visited doubles as the fill mask
    let mut visited = vec![false; (width * height) as usize];
    let mut stack = vec![(x, y)];
    visited[(y * w + x) as usize] = true;
    let mut written = 0;

    while let Some((px, py)) = stack.pop() {
        canvas.set_overlay_pixel(px, py, color);
        written += 1;

        for (nx, ny) in [(px - 1, py), (px + 1, py), (px, py - 1), (px, py + 1)] {
            if nx < 0 || ny < 0 || nx >= w || ny >= h {
                continue;
            }
            let idx = (ny * w + nx) as usize;
            if !visited[idx] && canvas.pixel(nx, ny) == Some(target) {
                visited[idx] = true;
                stack.push((nx, ny));
            }
        }
    }

    tracing::trace!(x, y, written, "flood fill");
    written
}

/// Even-odd test of a point against a closed polygon
pub fn point_in_polygon(x: f64, y: f64, points: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let mut j = points.len().wrapping_sub(1);
    for i in 0..points.len() {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Fill the interior of the closed path through `points` into the canvas
/// overlay, sampling each pixel at its center. Returns the pixels written.
pub fn fill_polygon<C>(canvas: &mut C, points: &[(f64, f64)], color: Rgba) -> usize
where
    C: PixelCanvas + ?Sized,
{
    if points.len() < 3 {
        return 0;
    }
    let (width, height) = canvas.size();
    let (min_x, min_y, max_x, max_y) = points.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(x0, y0, x1, y1), &(x, y)| (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
    );
    let x_start = (min_x.floor() as i32).max(0);
    let y_start = (min_y.floor() as i32).max(0);
    let x_end = (max_x.ceil() as i32).min(width as i32 - 1);
    let y_end = (max_y.ceil() as i32).min(height as i32 - 1);

    let mut written = 0;
    for py in y_start..=y_end {
        for px in x_start..=x_end {
            if point_in_polygon(px as f64 + 0.5, py as f64 + 0.5, points) {
                canvas.set_overlay_pixel(px, py, color);
                written += 1;
            }
        }
    }
    written
}
