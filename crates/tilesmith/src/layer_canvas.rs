//! Brush-engine view of a document layer
//!
//! Every layer paints into the one atlas overlay. Source writes land on the
//! atlas directly, bank writes go through the entry under the pointer (and its
//! inner corners), and terrain writes go through the bank entry the cell
//! resolves to. Flushing commits the atlas overlay and rebuilds every layer.

use tilesmith_brush::{EditTarget, TerrainCanvas};
use tilesmith_core::{CompositeMode, LayerId, LayerType, PixelCanvas, Rgba};

use crate::document::{LayerSlot, TilesetDocument};

/// A mutable handle on one layer of a [`TilesetDocument`]
pub struct LayerCanvas<'a> {
    document: &'a mut TilesetDocument,
    layer: LayerId,
    slot: LayerSlot,
    /// Overlay written since the derived layers were last rebuilt
    preview_stale: bool,
    /// Any pixel written through this handle
    written: bool,
}

impl<'a> LayerCanvas<'a> {
    pub(crate) fn new(document: &'a mut TilesetDocument, layer: LayerId, slot: LayerSlot) -> Self {
        Self {
            document,
            layer,
            slot,
            preview_stale: false,
            written: false,
        }
    }

    pub fn layer(&self) -> LayerId {
        self.layer
    }

    pub(crate) fn preview_stale(&self) -> bool {
        self.preview_stale
    }

    pub(crate) fn written(&self) -> bool {
        self.written
    }
}

impl PixelCanvas for LayerCanvas<'_> {
    fn size(&self) -> (u32, u32) {
        self.document.slot_size(self.slot)
    }

    fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.document.get_pixel(self.layer, x, y)
    }

    fn set_overlay_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        let document = &mut *self.document;
        let written = match self.slot {
            LayerSlot::Source => {
                let surface = document.atlas.surface_mut();
                let inside = surface.in_bounds(x, y);
                surface.set_overlay_pixel(x, y, color);
                inside
            }
            LayerSlot::Bank(i) => match document.banks.get(i) {
                Some(bank) => bank.set_overlay_pixel(&mut document.atlas, x, y, color),
                None => false,
            },
            LayerSlot::Terrain(t) => {
                let Some(terrain) = document.terrains.get(t) else {
                    return;
                };
                let Some((resolved, ox, oy)) = terrain.resolver.resolve_pixel(x, y) else {
                    return;
                };
                match terrain
                    .banks
                    .get(resolved.bank)
                    .and_then(|&b| document.banks.get(b))
                {
                    Some(bank) => bank.set_tile_overlay_pixel(
                        &mut document.atlas,
                        resolved.position,
                        ox,
                        oy,
                        color,
                    ),
                    None => false,
                }
            }
        };
        if written {
            self.preview_stale = true;
            self.written = true;
        }
    }

    fn flush_overlay_with(&mut self, mode: CompositeMode) {
        self.document.atlas.surface_mut().flush_overlay_with(mode);
        self.document.dirty = true;
        self.preview_stale = false;
        let source = self.document.source_layer();
        self.document.propagate(source);
    }

    fn set_overlay_mode(&mut self, mode: CompositeMode) {
        self.document.atlas.surface_mut().set_overlay_mode(mode);
    }

    fn clear_overlay(&mut self) {
        self.document.atlas.surface_mut().clear_overlay();
        self.preview_stale = false;
        let source = self.document.source_layer();
        self.document.propagate(source);
    }
}

impl TerrainCanvas for LayerCanvas<'_> {
    fn cell_at(&self, x: f64, y: f64) -> Option<(i32, i32)> {
        let LayerSlot::Terrain(t) = self.slot else {
            return None;
        };
        self.document
            .terrains
            .get(t)?
            .resolver
            .cell_at_pixel(x.floor() as i32, y.floor() as i32)
    }

    fn set_cell(&mut self, x: i32, y: i32, value: Option<usize>) -> bool {
        let LayerSlot::Terrain(t) = self.slot else {
            return false;
        };
        let changed = self
            .document
            .terrains
            .get_mut(t)
            .is_some_and(|terrain| terrain.resolver.grid_mut().set(x, y, value));
        if changed {
            self.document.dirty = true;
        }
        changed
    }

    fn commit_terrain(&mut self) {
        self.document.propagate(self.layer);
    }
}

impl EditTarget for LayerCanvas<'_> {
    fn layer_type(&self) -> LayerType {
        self.slot.layer_type()
    }

    fn as_terrain(&mut self) -> Option<&mut dyn TerrainCanvas> {
        match self.slot {
            LayerSlot::Terrain(_) => Some(self),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilesmith_core::{EditorConfig, TilePosition};

    fn document() -> TilesetDocument {
        let config = EditorConfig {
            tile_size: 4,
            terrain_columns: 3,
            terrain_rows: 3,
            ..Default::default()
        };
        TilesetDocument::four_by_four_plus("canvas", config).unwrap()
    }

    #[test]
    fn test_layer_types_and_sizes() {
        let mut document = document();
        let canvas = document.canvas(LayerId(2)).unwrap();
        assert_eq!(canvas.layer_type(), LayerType::Combos);
        assert_eq!(canvas.size(), (48, 16));
        assert!(document.canvas(LayerId(7)).is_err());
    }

    #[test]
    fn test_bank_write_follows_inner_corner() {
        let mut document = document();
        let donor = document.atlas().corner_donor().unwrap();
        {
            // Godot entry (1, 0) takes its bottom-right quadrant from the donor
            let mut canvas = document.canvas(LayerId(2)).unwrap();
            canvas.set_overlay_pixel(4 + 3, 3, Rgba::RED);
            assert!(canvas.preview_stale());
            canvas.flush_overlay();
        }
        let (dx, dy) = document.atlas().tile_origin(donor);
        assert_eq!(
            document.get_pixel(LayerId(0), dx + 3, dy + 3),
            Some(Rgba::RED)
        );
        // Nominal tile untouched
        assert_eq!(document.get_pixel(LayerId(0), 7, 3), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_terrain_write_needs_occupied_cell() {
        let mut document = document();
        let terrain = LayerId(3);
        {
            let mut canvas = document.canvas(terrain).unwrap();
            canvas.set_overlay_pixel(1, 1, Rgba::RED);
            assert!(!canvas.preview_stale());
        }
        document.set_terrain_cell(terrain, 0, 0, Some(0)).unwrap();
        {
            let mut canvas = document.canvas(terrain).unwrap();
            canvas.set_overlay_pixel(1, 1, Rgba::RED);
            assert!(canvas.preview_stale());
            canvas.flush_overlay();
        }
        // An island resolves to the 4x4 bank's tile at (0, 3)
        let (x, y) = document.atlas().tile_origin(TilePosition::new(0, 3));
        assert_eq!(document.get_pixel(LayerId(0), x + 1, y + 1), Some(Rgba::RED));
        assert_eq!(document.get_pixel(terrain, 1, 1), Some(Rgba::RED));
    }

    #[test]
    fn test_terrain_canvas_only_on_terrain() {
        let mut document = document();
        let mut canvas = document.canvas(LayerId(0)).unwrap();
        assert!(canvas.as_terrain().is_none());
        assert_eq!(canvas.cell_at(1.0, 1.0), None);
        assert!(!canvas.set_cell(0, 0, Some(0)));

        let mut canvas = document.canvas(LayerId(3)).unwrap();
        assert_eq!(canvas.cell_at(5.0, 9.5), Some((1, 2)));
        assert_eq!(canvas.cell_at(12.0, 0.0), None);
        assert!(canvas.as_terrain().is_some());
    }
}
