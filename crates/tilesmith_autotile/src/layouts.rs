//! Combo bank layouts
//!
//! A layout is a grid of entries, each pointing at a tile of the 4x4 blob art
//! with optional inner corners. Layouts can be built in code or loaded from
//! JSON:
//!
//! ```json
//! { "name": "Custom", "rows": [[{ "x": 0, "y": 3 }, { "x": 2, "y": 1, "corners": ["tl"] }]] }
//! ```

use serde::{Deserialize, Serialize};
use tilesmith_core::{CornerSet, TilePosition, TilesetError};

use crate::combo::ComboTile;
use crate::mask::{neighbors::*, NeighborMask};

/// One entry of a bank layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    /// Source tile column in the atlas
    pub x: u32,
    /// Source tile row in the atlas
    pub y: u32,
    /// Inner corner tags ("tl", "tr", "bl", "br")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub corners: Vec<String>,
    /// Explicit neighbor mask. When absent the mask is derived from the
    /// source tile and the inner corners.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<u16>,
}

impl LayoutEntry {
    pub fn new(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            corners: Vec::new(),
            mask: None,
        }
    }

    pub fn with_corners(mut self, corners: &[&str]) -> Self {
        self.corners = corners.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_mask(mut self, mask: u16) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Resolve tags and mask into a combo tile
    pub fn to_combo_tile(&self) -> Result<ComboTile, TilesetError> {
        let source_position = TilePosition::new(self.x, self.y);
        let inner_corners = CornerSet::from_tags(&self.corners)?;
        let neighbor_mask = match self.mask {
            Some(bits) => NeighborMask::from_bits(bits),
            None => blob_mask(source_position).without_corners(inner_corners),
        };
        Ok(ComboTile {
            source_position,
            neighbor_mask,
            inner_corners,
        })
    }
}

/// A named grid of layout entries, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankLayout {
    pub name: String,
    pub rows: Vec<Vec<LayoutEntry>>,
}

impl BankLayout {
    /// Parse a layout from JSON
    pub fn from_json(json: &str) -> Result<Self, TilesetError> {
        let layout: BankLayout =
            serde_json::from_str(json).map_err(|e| TilesetError::ParseError(e.to_string()))?;
        layout.dimensions()?;
        Ok(layout)
    }

    pub fn to_json(&self) -> Result<String, TilesetError> {
        serde_json::to_string_pretty(self).map_err(|e| TilesetError::ParseError(e.to_string()))
    }

    /// Columns and rows; every row must have the same non-zero length
    pub fn dimensions(&self) -> Result<(u32, u32), TilesetError> {
        let columns = self.rows.first().map(Vec::len).unwrap_or(0);
        if columns == 0 {
            return Err(TilesetError::InvalidLayout(format!(
                "layout '{}' has no entries",
                self.name
            )));
        }
        if let Some(row) = self.rows.iter().position(|r| r.len() != columns) {
            return Err(TilesetError::InvalidLayout(format!(
                "row {} of layout '{}' has {} entries, expected {}",
                row,
                self.name,
                self.rows[row].len(),
                columns
            )));
        }
        Ok((columns as u32, self.rows.len() as u32))
    }

    /// Build the combo tiles, row-major
    pub fn combo_tiles(&self) -> Result<Vec<ComboTile>, TilesetError> {
        self.dimensions()?;
        self.rows
            .iter()
            .flatten()
            .map(LayoutEntry::to_combo_tile)
            .collect()
    }
}

/// Neighbor mask drawn by each tile of the 4x4 blob art, indexed `[y][x]`
const BLOB_MASKS: [[u16; 4]; 4] = [
    [
        SELF | BOTTOM,
        SELF | RIGHT | BOTTOM | BOTTOM_RIGHT,
        SELF | LEFT | RIGHT | BOTTOM | BOTTOM_LEFT | BOTTOM_RIGHT,
        SELF | LEFT | BOTTOM | BOTTOM_LEFT,
    ],
    [
        SELF | TOP | BOTTOM,
        SELF | TOP | RIGHT | BOTTOM | TOP_RIGHT | BOTTOM_RIGHT,
        ALL,
        SELF | TOP | LEFT | BOTTOM | TOP_LEFT | BOTTOM_LEFT,
    ],
    [
        SELF | TOP,
        SELF | TOP | RIGHT | TOP_RIGHT,
        SELF | TOP | LEFT | RIGHT | TOP_LEFT | TOP_RIGHT,
        SELF | TOP | LEFT | TOP_LEFT,
    ],
    [
        SELF,
        SELF | RIGHT,
        SELF | LEFT | RIGHT,
        SELF | LEFT,
    ],
];

/// Mask of a tile of the 4x4 blob art. Tiles outside it never match.
pub fn blob_mask(position: TilePosition) -> NeighborMask {
    BLOB_MASKS
        .get(position.y as usize)
        .and_then(|row| row.get(position.x as usize))
        .map(|bits| NeighborMask::from_bits(*bits))
        .unwrap_or(NeighborMask::EMPTY)
}

/// The plain 4x4 blob bank: 16 tiles in their atlas positions
pub fn four_by_four_plus() -> BankLayout {
    let rows = (0..4)
        .map(|y| {
            (0..4)
                .map(|x| LayoutEntry::new(x, y).with_mask(BLOB_MASKS[y as usize][x as usize]))
                .collect()
        })
        .collect();
    BankLayout {
        name: "4x4".to_string(),
        rows,
    }
}

type GodotEntry = (u32, u32, &'static [&'static str]);

/// Godot "3x3 minimal" export template, 12 x 4
const GODOT_TILES: [[GodotEntry; 12]; 4] = [
    [
        (0, 0, &[]),
        (1, 0, &["br"]),
        (2, 0, &["bl", "br"]),
        (3, 0, &["bl"]),
        (2, 1, &["bl", "tr", "br"]),
        (2, 0, &["bl"]),
        (2, 0, &["br"]),
        (2, 1, &["bl", "tl", "br"]),
        (1, 0, &[]),
        (2, 1, &["tl", "bl"]),
        (2, 0, &[]),
        (3, 0, &[]),
    ],
    [
        (0, 1, &[]),
        (1, 1, &["br", "tr"]),
        (2, 1, &["bl", "br", "tr", "tl"]),
        (3, 1, &["tl", "bl"]),
        (1, 1, &["tr"]),
        (2, 1, &["tl"]),
        (2, 1, &["tr"]),
        (3, 1, &["tl"]),
        (1, 1, &[]),
        (2, 1, &["tl", "br"]),
        (4, 1, &[]),
        (2, 1, &["tr", "br"]),
    ],
    [
        (0, 2, &[]),
        (1, 2, &["tr"]),
        (2, 2, &["tr", "br"]),
        (3, 2, &["tl"]),
        (1, 1, &["br"]),
        (2, 1, &["bl"]),
        (2, 1, &["br"]),
        (3, 1, &["bl"]),
        (2, 1, &["tl", "bl"]),
        (2, 1, &[]),
        (2, 1, &["tr", "bl"]),
        (3, 1, &[]),
    ],
    [
        (0, 3, &[]),
        (1, 3, &[]),
        (2, 3, &[]),
        (3, 3, &[]),
        (2, 1, &["bl", "tr", "br"]),
        (2, 2, &["tl"]),
        (2, 2, &["tr"]),
        (2, 1, &["tl", "tr", "bl"]),
        (1, 2, &[]),
        (2, 2, &[]),
        (2, 1, &["bl", "br"]),
        (3, 2, &[]),
    ],
];

/// The 48-tile Godot "3x3 minimal" bank built from the 4x4 blob art
pub fn godot_3x3_minimal() -> BankLayout {
    let rows = GODOT_TILES
        .iter()
        .map(|row| {
            row.iter()
                .map(|(x, y, corners)| LayoutEntry::new(*x, *y).with_corners(corners))
                .collect()
        })
        .collect();
    BankLayout {
        name: "Godot".to_string(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilesmith_core::InnerCorner;

    #[test]
    fn test_builtin_layout_dimensions() {
        assert_eq!(four_by_four_plus().dimensions().unwrap(), (4, 4));
        assert_eq!(godot_3x3_minimal().dimensions().unwrap(), (12, 4));
        assert_eq!(godot_3x3_minimal().combo_tiles().unwrap().len(), 48);
    }

    #[test]
    fn test_blob_masks() {
        assert_eq!(blob_mask(TilePosition::new(0, 3)), NeighborMask::ISLAND);
        assert_eq!(blob_mask(TilePosition::new(2, 1)), NeighborMask::FULL);
        assert_eq!(blob_mask(TilePosition::new(4, 1)), NeighborMask::EMPTY);
    }

    #[test]
    fn test_godot_masks_drop_corner_diagonals() {
        let tiles = godot_3x3_minimal().combo_tiles().unwrap();
        // Row 1, column 2: interior tile with all four inner corners
        let cross = &tiles[12 + 2];
        assert_eq!(cross.source_position, TilePosition::new(2, 1));
        assert_eq!(cross.inner_corners.len(), 4);
        assert_eq!(cross.neighbor_mask.bits(), SIDES);

        // Row 0, column 1: top-left of a block with a bottom-right corner
        let corner = &tiles[1];
        assert!(corner.inner_corners.contains(InnerCorner::BottomRight));
        assert_eq!(corner.neighbor_mask.bits(), SELF | RIGHT | BOTTOM);

        // Filler tile outside the blob art never matches an occupied cell
        let filler = &tiles[12 + 10];
        assert!(!filler.neighbor_mask.is_occupied());
    }

    #[test]
    fn test_layout_from_json() {
        let layout = BankLayout::from_json(
            r#"{
                "name": "Tiny",
                "rows": [[{ "x": 0, "y": 3 }, { "x": 2, "y": 1, "corners": ["tl", "br"] }]]
            }"#,
        )
        .unwrap();
        let tiles = layout.combo_tiles().unwrap();
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles[0].neighbor_mask, NeighborMask::ISLAND);
        assert_eq!(
            tiles[1].neighbor_mask.bits(),
            SIDES | TOP_RIGHT | BOTTOM_LEFT
        );
    }

    #[test]
    fn test_invalid_corner_tag() {
        let layout = BankLayout::from_json(
            r#"{ "name": "Bad", "rows": [[{ "x": 0, "y": 0, "corners": ["middle"] }]] }"#,
        )
        .unwrap();
        assert_eq!(
            layout.combo_tiles().unwrap_err(),
            TilesetError::InvalidCornerTag("middle".to_string())
        );
    }

    #[test]
    fn test_ragged_layout_rejected() {
        let layout = BankLayout {
            name: "Ragged".to_string(),
            rows: vec![
                vec![LayoutEntry::new(0, 0), LayoutEntry::new(1, 0)],
                vec![LayoutEntry::new(0, 1)],
            ],
        };
        assert!(matches!(
            layout.dimensions(),
            Err(TilesetError::InvalidLayout(_))
        ));
        assert!(matches!(
            BankLayout::from_json(r#"{ "name": "Empty", "rows": [] }"#),
            Err(TilesetError::InvalidLayout(_))
        ));
    }
}
