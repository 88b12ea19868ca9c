//! tilesmith - pixel-art tileset editing
//!
//! A [`TilesetDocument`] owns a source tile atlas, the combo banks composed
//! from it and the autotiled terrains painted over those banks. Any layer can
//! be painted with a [`ToolSession`]; edits propagate to every derived layer
//! before the call returns.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tilesmith::prelude::*;
//!
//! let mut document = TilesetDocument::four_by_four_plus("grass", EditorConfig::default())?;
//! document.put_surface_bytes(&png_rgba)?;
//!
//! let mut session = ToolSession::new(document.config());
//! session.set_color(Rgba::rgb(40, 160, 60));
//! let source = document.source_layer();
//! document.pointer_down(&mut session, source, PointerEvent::primary(3.0, 3.0))?;
//! document.pointer_up(&mut session, source, PointerEvent::primary(3.0, 3.0))?;
//!
//! for event in document.drain_events() {
//!     // redraw the changed layer
//! }
//! ```

mod document;
mod history;
mod layer_canvas;

pub use document::{DocumentEvent, TilesetDocument};
pub use history::SnapshotHistory;
pub use layer_canvas::LayerCanvas;

// Re-export the component crates
pub use tilesmith_autotile;
pub use tilesmith_brush;
pub use tilesmith_core;

/// Prelude for common imports
pub mod prelude {
    pub use crate::{DocumentEvent, LayerCanvas, TilesetDocument};
    pub use tilesmith_autotile::{
        BankLayout, ComboTile, ComboTileBank, NeighborMask, TerrainGrid, TerrainResolver,
    };
    pub use tilesmith_brush::{EditTarget, EditorTool, PointerButton, PointerEvent, ToolSession};
    pub use tilesmith_core::{
        load_config, EditorConfig, LayerId, LayerType, PixelCanvas, Rgba, TileAtlas,
        TilePosition, TilesetError,
    };
}
