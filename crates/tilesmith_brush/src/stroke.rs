//! Pencil strokes
//!
//! A stroke starts on pointer-down, stamps along the interpolated pointer path
//! into the overlay, and is committed with exactly one flush on pointer-up. A
//! stroke that is held still for long enough instead closes its path and fills
//! it. Cancelling a stroke discards the overlay.

use std::time::Duration;

use tilesmith_core::{CompositeMode, PixelCanvas, Rgba, MAX_BRUSH_DIAMETER};

use crate::fill::fill_polygon;
use crate::stamp::stamp_circle;

/// Overlay color used to mark pixels for erasing
pub const ERASE_MASK: Rgba = Rgba::WHITE;

/// Color and size for one stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSettings {
    pub color: Rgba,
    pub diameter: u32,
    pub erase: bool,
}

impl BrushSettings {
    fn overlay_color(&self) -> Rgba {
        if self.erase {
            ERASE_MASK
        } else {
            self.color
        }
    }

    fn composite_mode(&self) -> CompositeMode {
        if self.erase {
            CompositeMode::Erase
        } else {
            CompositeMode::SourceOver
        }
    }
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: Rgba::WHITE,
            diameter: 1,
            erase: false,
        }
    }
}

/// Where a stroke is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    /// Pointer pressed, not yet moved
    Down { x: f64, y: f64 },
    /// Pointer moving; `last` is where the previous stamp landed
    Dragging { last_x: f64, last_y: f64 },
}

/// Freehand pencil. One instance per editing session.
#[derive(Debug, Clone, Default)]
pub struct PencilTool {
    state: StrokeState,
    settings: BrushSettings,
    /// Pointer samples of the current stroke
    path: Vec<(f64, f64)>,
}

impl PencilTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    /// Whether a stroke is in progress
    pub fn is_active(&self) -> bool {
        self.state != StrokeState::Idle
    }

    pub fn path(&self) -> &[(f64, f64)] {
        &self.path
    }

    /// Start a stroke and stamp once. Ignored while a stroke is already running
    /// or when the position is not finite.
    pub fn pointer_down<C>(&mut self, canvas: &mut C, x: f64, y: f64, settings: BrushSettings) -> bool
    where
        C: PixelCanvas + ?Sized,
    {
        if self.is_active() || !x.is_finite() || !y.is_finite() {
            return false;
        }
        self.settings = settings;
        canvas.set_overlay_mode(settings.composite_mode());
        stamp_circle(canvas, x, y, settings.diameter, settings.overlay_color());
        self.path.clear();
        self.path.push((x, y));
        self.state = StrokeState::Down { x, y };
        tracing::trace!(x, y, erase = settings.erase, "stroke started");
        true
    }

    /// Continue the stroke, stamping at every unit step between the last stamp
    /// and (x, y). Only the steps that can touch the canvas are stamped.
    pub fn pointer_move<C>(&mut self, canvas: &mut C, x: f64, y: f64) -> bool
    where
        C: PixelCanvas + ?Sized,
    {
        let (mut cx, mut cy) = match self.state {
            StrokeState::Idle => return false,
            StrokeState::Down { x, y } => (x, y),
            StrokeState::Dragging { last_x, last_y } => (last_x, last_y),
        };
        if !x.is_finite() || !y.is_finite() {
            return false;
        }

        let diameter = self.settings.diameter;
        let color = self.settings.overlay_color();
        stamp_circle(canvas, x, y, diameter, color);

        let (dx, dy) = (x - cx, y - cy);
        let distance = dx.hypot(dy);
        if distance >= 1.0 {
            let (ux, uy) = (dx / distance, dy / distance);
            let steps = distance.floor();
            let size = canvas.size();
            if let Some((first, last)) = visible_steps(size, diameter, (cx, cy), (ux, uy), steps) {
                for k in first..=last {
                    let k = k as f64;
                    stamp_circle(canvas, cx + ux * k, cy + uy * k, diameter, color);
                }
            }
            cx += ux * steps;
            cy += uy * steps;
        }

        self.path.push((x, y));
        self.state = StrokeState::Dragging {
            last_x: cx,
            last_y: cy,
        };
        true
    }

    /// Commit the stroke with a single flush
    pub fn pointer_up<C>(&mut self, canvas: &mut C) -> bool
    where
        C: PixelCanvas + ?Sized,
    {
        if !self.is_active() {
            return false;
        }
        canvas.flush_overlay_with(self.settings.composite_mode());
        self.finish();
        tracing::trace!("stroke committed");
        true
    }

    /// Close the traced path, fill its interior and commit, if the pointer has
    /// been held for at least `delay`
    pub fn pointer_hold<C>(&mut self, canvas: &mut C, held: Duration, delay: Duration) -> bool
    where
        C: PixelCanvas + ?Sized,
    {
        if !self.is_active() || held < delay {
            return false;
        }
        let filled = fill_polygon(canvas, &self.path, self.settings.overlay_color());
        canvas.flush_overlay_with(self.settings.composite_mode());
        self.finish();
        tracing::trace!(filled, "stroke closed and filled");
        true
    }

    /// Abandon the stroke without committing anything
    pub fn cancel<C>(&mut self, canvas: &mut C)
    where
        C: PixelCanvas + ?Sized,
    {
        if self.is_active() {
            canvas.clear_overlay();
            self.finish();
            tracing::trace!("stroke cancelled");
        }
    }

    fn finish(&mut self) {
        self.state = StrokeState::Idle;
        self.path.clear();
    }
}

/// Range of unit steps `1..=steps` along `start + unit * k` that pass within
/// brush reach of the canvas
fn visible_steps(
    size: (u32, u32),
    diameter: u32,
    start: (f64, f64),
    unit: (f64, f64),
    steps: f64,
) -> Option<(u64, u64)> {
    let pad = f64::from(diameter.clamp(1, MAX_BRUSH_DIAMETER) / 2) + 1.0;
    let (mut lo, mut hi) = (1.0_f64, steps);
    for (p, d, extent) in [
        (start.0, unit.0, f64::from(size.0)),
        (start.1, unit.1, f64::from(size.1)),
    ] {
        let (min, max) = (-pad, extent + pad);
        if d == 0.0 {
            if p < min || p > max {
                return None;
            }
            continue;
        }
        let (a, b) = ((min - p) / d, (max - p) / d);
        lo = lo.max(a.min(b));
        hi = hi.min(a.max(b));
    }
    (lo <= hi).then(|| (lo.ceil() as u64, hi.floor() as u64))
}
