//! Painting tools for tilesmith
//!
//! Tools draw into the overlay of a [`PixelCanvas`](tilesmith_core::PixelCanvas)
//! and commit with a single flush when the gesture ends. [`ToolSession`] holds
//! the per-session tool state and routes pointer events to an [`EditTarget`].
//!
//! ```rust,ignore
//! use tilesmith_brush::{PointerEvent, ToolSession};
//! use tilesmith_core::{PixelSurface, Rgba};
//!
//! let mut surface = PixelSurface::new(16, 16);
//! let mut session = ToolSession::default();
//! session.set_color(Rgba::RED);
//! session.pointer_down(&mut surface, PointerEvent::primary(2.0, 2.0));
//! session.pointer_move(&mut surface, PointerEvent::primary(10.0, 2.0));
//! session.pointer_up(&mut surface, PointerEvent::primary(10.0, 2.0));
//! ```

pub mod fill;
pub mod session;
pub mod stamp;
pub mod stroke;
pub mod terrain_tool;

pub use fill::{fill_polygon, flood_fill, point_in_polygon};
pub use session::{EditTarget, EditorTool, PointerButton, PointerEvent, ToolSession};
pub use stamp::{circle_offsets, stamp_circle};
pub use stroke::{BrushSettings, PencilTool, StrokeState, ERASE_MASK};
pub use terrain_tool::{TerrainCanvas, TerrainTool};

pub use tilesmith_core;
