//! Autotile resolution of a terrain grid against combo banks

use tilesmith_core::{ImageBuffer, TilePosition, TilesetError};
use uuid::Uuid;

use crate::combo::ComboTileBank;
use crate::mask::NeighborMask;
use crate::terrain::TerrainGrid;

/// The bank entry chosen for a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTile {
    /// Index into the resolver's banks
    pub bank: usize,
    /// Entry position inside that bank
    pub position: TilePosition,
    /// Neighbor mask of the cell it was chosen for
    pub mask: NeighborMask,
}

/// Resolves terrain cells to bank entries and keeps the composed terrain image.
///
/// Each bank's candidates are flattened once at construction, in table order.
/// The first candidate whose mask matches wins.
#[derive(Debug, Clone)]
pub struct TerrainResolver {
    pub id: Uuid,
    pub name: String,
    tile_size: u32,
    grid: TerrainGrid,
    candidates: Vec<Vec<(TilePosition, NeighborMask)>>,
    composed: ImageBuffer,
}

impl TerrainResolver {
    /// Create a resolver over `banks`, which must share one tile size
    pub fn new(
        name: String,
        banks: &[&ComboTileBank],
        columns: u32,
        rows: u32,
    ) -> Result<Self, TilesetError> {
        let first = banks.first().ok_or(TilesetError::NoSources)?;
        let tile_size = first.tile_size();
        if let Some(other) = banks.iter().find(|b| b.tile_size() != tile_size) {
            return Err(TilesetError::SizeMismatch {
                expected: tile_size,
                found: other.tile_size(),
            });
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            tile_size,
            grid: TerrainGrid::new(columns, rows),
            candidates: banks.iter().map(|b| b.candidates()).collect(),
            composed: ImageBuffer::new(columns * tile_size, rows * tile_size),
        })
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn bank_count(&self) -> usize {
        self.candidates.len()
    }

    pub fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    /// Mutable grid access. Call [`render`](Self::render) after changing it.
    pub fn grid_mut(&mut self) -> &mut TerrainGrid {
        &mut self.grid
    }

    /// Composed image size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            self.grid.columns() * self.tile_size,
            self.grid.rows() * self.tile_size,
        )
    }

    /// Grid cell under a composed-image pixel
    pub fn cell_at_pixel(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        if x < 0 || y < 0 {
            return None;
        }
        let cell = (x / self.tile_size as i32, y / self.tile_size as i32);
        self.grid.in_range(cell.0, cell.1).then_some(cell)
    }

    /// Pick the bank entry for cell (x, y).
    ///
    /// Empty cells, cells painted with an unknown bank and cells no candidate
    /// matches all resolve to None.
    pub fn resolve(&self, x: i32, y: i32) -> Option<ResolvedTile> {
        let bank = self.grid.get(x, y)?;
        let mask = self.grid.neighbor_mask(x, y);
        let found = self
            .candidates
            .get(bank)?
            .iter()
            .find(|(_, candidate)| mask.matches(*candidate));
        match found {
            Some((position, _)) => Some(ResolvedTile {
                bank,
                position: *position,
                mask,
            }),
            None => {
                tracing::trace!(x, y, bank, mask = mask.bits(), "no matching combo tile");
                None
            }
        }
    }

    /// Resolve the cell under a composed-image pixel and return the tile-local
    /// offset. Painting is only possible on occupied cells.
    pub fn resolve_pixel(&self, x: i32, y: i32) -> Option<(ResolvedTile, u32, u32)> {
        let (cx, cy) = self.cell_at_pixel(x, y)?;
        let resolved = self.resolve(cx, cy)?;
        if !resolved.mask.is_occupied() {
            return None;
        }
        let size = self.tile_size as i32;
        Some((resolved, (x % size) as u32, (y % size) as u32))
    }

    /// Recompose the terrain image. `tile_image` supplies the picture of a
    /// bank entry; cells without one stay transparent.
    pub fn render<F>(&mut self, tile_image: F)
    where
        F: Fn(&ResolvedTile) -> Option<ImageBuffer>,
    {
        let (width, height) = self.pixel_size();
        let mut composed = ImageBuffer::new(width, height);
        let size = self.tile_size as i32;
        for y in 0..self.grid.rows() as i32 {
            for x in 0..self.grid.columns() as i32 {
                let Some(resolved) = self.resolve(x, y) else {
                    continue;
                };
                if let Some(image) = tile_image(&resolved) {
                    composed.blit(&image, x * size, y * size);
                }
            }
        }
        tracing::debug!(terrain = %self.name, width, height, "rendered terrain");
        self.composed = composed;
    }

    /// Render straight from the banks' composed images
    pub fn render_from_banks(&mut self, banks: &[&ComboTileBank]) {
        let size = self.tile_size;
        self.render(|resolved| {
            let bank = banks.get(resolved.bank)?;
            let composed = bank.composed()?;
            Some(composed.region(
                (resolved.position.x * size) as i32,
                (resolved.position.y * size) as i32,
                size,
                size,
            ))
        });
    }

    pub fn composed(&self) -> &ImageBuffer {
        &self.composed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layouts::{four_by_four_plus, godot_3x3_minimal, BankLayout, LayoutEntry};
    use crate::mask::neighbors::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use tilesmith_core::{CornerSet, InnerCorner, Rgba, TileAtlas};

    fn painted_atlas(tile_size: u32) -> TileAtlas {
        let mut atlas = TileAtlas::four_by_four_plus(tile_size).unwrap();
        for ty in 0..4 {
            for tx in 0..5 {
                let color = Rgba::rgb(tx as u8 * 50, ty as u8 * 60, 10);
                for oy in 0..tile_size {
                    for ox in 0..tile_size {
                        let shade = Rgba::new(color.r, color.g, (ox * 16 + oy) as u8, 255);
                        atlas.set_tile_pixel(TilePosition::new(tx, ty), ox, oy, shade, CornerSet::EMPTY);
                    }
                }
            }
        }
        atlas
    }

    fn fill(resolver: &mut TerrainResolver, cells: &[(i32, i32)], bank: usize) {
        for &(x, y) in cells {
            resolver.grid_mut().set(x, y, Some(bank));
        }
    }

    #[test]
    fn test_requires_sources() {
        let result = TerrainResolver::new("Terrain".to_string(), &[], 4, 4);
        assert_eq!(result.unwrap_err(), TilesetError::NoSources);
    }

    #[test]
    fn test_size_mismatch_is_fatal() {
        let small = painted_atlas(4);
        let large = painted_atlas(8);
        let a = ComboTileBank::from_layout(&four_by_four_plus(), &small).unwrap();
        let b = ComboTileBank::from_layout(&four_by_four_plus(), &large).unwrap();
        let result = TerrainResolver::new("Terrain".to_string(), &[&a, &b], 4, 4);
        assert_eq!(
            result.unwrap_err(),
            TilesetError::SizeMismatch {
                expected: 4,
                found: 8
            }
        );
    }

    #[test]
    fn test_isolated_cell_picks_island() {
        let atlas = painted_atlas(4);
        let blob = ComboTileBank::from_layout(&four_by_four_plus(), &atlas).unwrap();
        let mut resolver = TerrainResolver::new("Terrain".to_string(), &[&blob], 3, 3).unwrap();
        fill(&mut resolver, &[(1, 1)], 0);

        let resolved = resolver.resolve(1, 1).unwrap();
        assert_eq!(resolved.mask.bits(), 0b1_0000_0000);
        assert_eq!(resolved.position, TilePosition::new(0, 3));
        assert_eq!(
            blob.get_tile(resolved.position).unwrap().neighbor_mask,
            NeighborMask::ISLAND
        );
    }

    #[test]
    fn test_full_cross_picks_interior_with_all_corners() {
        let atlas = painted_atlas(4);
        let godot = ComboTileBank::from_layout(&godot_3x3_minimal(), &atlas).unwrap();
        let mut resolver = TerrainResolver::new("Terrain".to_string(), &[&godot], 3, 3).unwrap();
        fill(&mut resolver, &[(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)], 0);

        let resolved = resolver.resolve(1, 1).unwrap();
        assert_eq!(resolved.mask.bits(), 0b1_1111_0000);
        let tile = godot.get_tile(resolved.position).unwrap();
        assert_eq!(tile.source_position, TilePosition::new(2, 1));
        assert_eq!(tile.inner_corners, CornerSet::from_corners(InnerCorner::ALL));
    }

    #[test]
    fn test_full_block_picks_plain_interior() {
        let atlas = painted_atlas(4);
        let godot = ComboTileBank::from_layout(&godot_3x3_minimal(), &atlas).unwrap();
        let mut resolver = TerrainResolver::new("Terrain".to_string(), &[&godot], 3, 3).unwrap();
        let block: Vec<(i32, i32)> = (0..3).flat_map(|y| (0..3).map(move |x| (x, y))).collect();
        fill(&mut resolver, &block, 0);

        let resolved = resolver.resolve(1, 1).unwrap();
        assert_eq!(resolved.mask, NeighborMask::FULL);
        let tile = godot.get_tile(resolved.position).unwrap();
        assert_eq!(tile.source_position, TilePosition::new(2, 1));
        assert!(tile.inner_corners.is_empty());
    }

    #[test]
    fn test_irrelevant_diagonals_do_not_affect_choice() {
        let atlas = painted_atlas(4);
        let layout = BankLayout {
            name: "Corner".to_string(),
            rows: vec![vec![
                LayoutEntry::new(1, 2).with_mask(SELF | TOP | RIGHT | TOP_RIGHT | BOTTOM_LEFT | TOP_LEFT),
            ]],
        };
        let bank = ComboTileBank::from_layout(&layout, &atlas).unwrap();
        let mut resolver = TerrainResolver::new("Terrain".to_string(), &[&bank], 3, 3).unwrap();
        // Top and right occupied, plus the top-right diagonal; nothing below or left
        fill(&mut resolver, &[(1, 1), (1, 0), (2, 1), (2, 0)], 0);

        let resolved = resolver.resolve(1, 1).unwrap();
        assert_eq!(resolved.position, TilePosition::new(0, 0));

        // Without the top-right diagonal the relevant bit no longer matches
        resolver.grid_mut().set(2, 0, None);
        assert!(resolver.resolve(1, 1).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let atlas = painted_atlas(4);
        let layout = BankLayout {
            name: "Duplicates".to_string(),
            rows: vec![vec![LayoutEntry::new(0, 3), LayoutEntry::new(1, 3).with_mask(SELF)]],
        };
        let bank = ComboTileBank::from_layout(&layout, &atlas).unwrap();
        let mut resolver = TerrainResolver::new("Terrain".to_string(), &[&bank], 1, 1).unwrap();
        fill(&mut resolver, &[(0, 0)], 0);
        assert_eq!(resolver.resolve(0, 0).unwrap().position, TilePosition::new(0, 0));
    }

    #[test]
    fn test_unmatched_and_empty_cells_render_nothing() {
        let atlas = painted_atlas(4);
        let layout = BankLayout {
            name: "Islands".to_string(),
            rows: vec![vec![LayoutEntry::new(0, 3)]],
        };
        let bank = ComboTileBank::from_layout(&layout, &atlas).unwrap();
        let mut resolver = TerrainResolver::new("Terrain".to_string(), &[&bank], 4, 1).unwrap();
        fill(&mut resolver, &[(0, 0), (2, 0), (3, 0)], 0);
        resolver.render_from_banks(&[&bank]);

        let composed = resolver.composed();
        // Cell 0 is an island, cells 2 and 3 touch each other and have no candidate
        assert!(composed.region(0, 0, 4, 4).has_visible_pixels());
        assert!(!composed.region(4, 0, 4, 4).has_visible_pixels());
        assert!(!composed.region(8, 0, 8, 4).has_visible_pixels());
        assert!(resolver.resolve(2, 0).is_none());
    }

    #[test]
    fn test_unknown_bank_index_is_empty() {
        let atlas = painted_atlas(4);
        let bank = ComboTileBank::from_layout(&four_by_four_plus(), &atlas).unwrap();
        let mut resolver = TerrainResolver::new("Terrain".to_string(), &[&bank], 1, 1).unwrap();
        fill(&mut resolver, &[(0, 0)], 3);
        assert!(resolver.resolve(0, 0).is_none());
    }

    #[test]
    fn test_render_is_deterministic() {
        let atlas = painted_atlas(4);
        let blob = ComboTileBank::from_layout(&four_by_four_plus(), &atlas).unwrap();
        let godot = ComboTileBank::from_layout(&godot_3x3_minimal(), &atlas).unwrap();
        let banks = [&blob, &godot];
        let mut resolver = TerrainResolver::new("Terrain".to_string(), &banks, 8, 8).unwrap();
        resolver
            .grid_mut()
            .randomize(&mut SmallRng::seed_from_u64(42), 2, 0.75);

        resolver.render_from_banks(&banks);
        let first = resolver.composed().to_rgba_bytes();
        resolver.render_from_banks(&banks);
        assert_eq!(resolver.composed().to_rgba_bytes(), first);
    }

    #[test]
    fn test_resolve_pixel_requires_occupied_cell() {
        let atlas = painted_atlas(4);
        let blob = ComboTileBank::from_layout(&four_by_four_plus(), &atlas).unwrap();
        let mut resolver = TerrainResolver::new("Terrain".to_string(), &[&blob], 2, 1).unwrap();
        fill(&mut resolver, &[(1, 0)], 0);

        assert!(resolver.resolve_pixel(1, 1).is_none());
        let (resolved, ox, oy) = resolver.resolve_pixel(6, 3).unwrap();
        assert_eq!(resolved.position, TilePosition::new(0, 3));
        assert_eq!((ox, oy), (2, 3));
        assert!(resolver.resolve_pixel(-1, 0).is_none());
        assert!(resolver.resolve_pixel(8, 0).is_none());
    }
}
