//! Combo tile banks
//!
//! A bank is a fixed grid of combo tiles. Each entry points at a tile in the
//! source atlas, carries the neighbor mask it stands for and the quadrants that
//! should come from the corner donor. The bank keeps a composed image of every
//! entry, rebuilt in full whenever the atlas changes.

use tilesmith_core::{CornerSet, ImageBuffer, Rgba, TileAtlas, TilePosition, TilesetError};
use uuid::Uuid;

use crate::layouts::BankLayout;
use crate::mask::NeighborMask;

/// An atlas tile tagged with a neighbor mask and inner corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboTile {
    pub source_position: TilePosition,
    pub neighbor_mask: NeighborMask,
    pub inner_corners: CornerSet,
}

/// A fixed table of combo tiles plus its composed image
#[derive(Debug, Clone)]
pub struct ComboTileBank {
    pub id: Uuid,
    pub name: String,
    tile_size: u32,
    columns: u32,
    rows: u32,
    /// Row-major
    tiles: Vec<ComboTile>,
    composed: Option<ImageBuffer>,
}

impl ComboTileBank {
    /// Build a bank from a layout. Every source position must exist in `atlas`.
    pub fn from_layout(layout: &BankLayout, atlas: &TileAtlas) -> Result<Self, TilesetError> {
        let (columns, rows) = layout.dimensions()?;
        let tiles = layout.combo_tiles()?;
        if let Some(tile) = tiles.iter().find(|t| !atlas.contains(t.source_position)) {
            return Err(TilesetError::TileOutOfRange {
                x: tile.source_position.x,
                y: tile.source_position.y,
            });
        }

        let mut bank = Self {
            id: Uuid::new_v4(),
            name: layout.name.clone(),
            tile_size: atlas.tile_size(),
            columns,
            rows,
            tiles,
            composed: None,
        };
        bank.render_full(atlas);
        Ok(bank)
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Composed image size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (self.columns * self.tile_size, self.rows * self.tile_size)
    }

    pub fn tiles(&self) -> &[ComboTile] {
        &self.tiles
    }

    pub fn get_tile(&self, position: TilePosition) -> Option<&ComboTile> {
        if position.x >= self.columns || position.y >= self.rows {
            return None;
        }
        self.tiles
            .get((position.y * self.columns + position.x) as usize)
    }

    /// Bank positions and masks in table order
    pub fn candidates(&self) -> Vec<(TilePosition, NeighborMask)> {
        self.tiles
            .iter()
            .enumerate()
            .map(|(i, tile)| {
                let i = i as u32;
                (
                    TilePosition::new(i % self.columns, i / self.columns),
                    tile.neighbor_mask,
                )
            })
            .collect()
    }

    /// Committed image of one entry
    pub fn get_tile_image(&self, atlas: &TileAtlas, position: TilePosition) -> Option<ImageBuffer> {
        let tile = self.get_tile(position)?;
        atlas.get_tile_image(tile.source_position, tile.inner_corners)
    }

    /// Image of one entry including any stroke in progress on the atlas
    pub fn get_tile_preview(
        &self,
        atlas: &TileAtlas,
        position: TilePosition,
    ) -> Option<ImageBuffer> {
        let tile = self.get_tile(position)?;
        atlas.get_tile_preview(tile.source_position, tile.inner_corners)
    }

    /// Recompose every entry into the cached image
    pub fn render_full(&mut self, atlas: &TileAtlas) {
        let (width, height) = self.pixel_size();
        let mut composed = ImageBuffer::new(width, height);
        for y in 0..self.rows {
            for x in 0..self.columns {
                let position = TilePosition::new(x, y);
                if let Some(image) = self.get_tile_preview(atlas, position) {
                    composed.blit(
                        &image,
                        (x * self.tile_size) as i32,
                        (y * self.tile_size) as i32,
                    );
                }
            }
        }
        tracing::debug!(bank = %self.name, width, height, "rendered combo bank");
        self.composed = Some(composed);
    }

    /// The composed image from the last [`render_full`](Self::render_full)
    pub fn composed(&self) -> Option<&ImageBuffer> {
        self.composed.as_ref()
    }

    /// Composed pixel at (x, y)
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.composed.as_ref()?.get(x, y)
    }

    /// Bank entry and tile-local offset under a composed-image pixel
    pub fn tile_at_pixel(&self, x: i32, y: i32) -> Option<(TilePosition, u32, u32)> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        let position = TilePosition::new(x / self.tile_size, y / self.tile_size);
        self.get_tile(position)?;
        Some((position, x % self.tile_size, y % self.tile_size))
    }

    /// Write an overlay pixel of one entry through to the atlas, following its
    /// inner corners. Returns false if nothing was written.
    pub fn set_tile_overlay_pixel(
        &self,
        atlas: &mut TileAtlas,
        position: TilePosition,
        ox: u32,
        oy: u32,
        color: Rgba,
    ) -> bool {
        match self.get_tile(position) {
            Some(tile) => {
                atlas.set_tile_overlay_pixel(tile.source_position, ox, oy, color, tile.inner_corners)
            }
            None => false,
        }
    }

    /// Write an overlay pixel at composed-image coordinates through to the atlas
    pub fn set_overlay_pixel(&self, atlas: &mut TileAtlas, x: i32, y: i32, color: Rgba) -> bool {
        match self.tile_at_pixel(x, y) {
            Some((position, ox, oy)) => self.set_tile_overlay_pixel(atlas, position, ox, oy, color),
            None => false,
        }
    }
}
