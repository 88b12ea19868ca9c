//! Tile-addressed view of a pixel surface, with inner-corner donors

use serde::{Deserialize, Serialize};

use crate::color::Rgba;
use crate::image::ImageBuffer;
use crate::surface::PixelSurface;
use crate::TilesetError;

/// Column/row index of a tile in an atlas grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePosition {
    pub x: u32,
    pub y: u32,
}

impl TilePosition {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for TilePosition {
    fn from((x, y): (u32, u32)) -> Self {
        Self::new(x, y)
    }
}

/// One quadrant of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InnerCorner {
    #[serde(rename = "tl")]
    TopLeft,
    #[serde(rename = "tr")]
    TopRight,
    #[serde(rename = "bl")]
    BottomLeft,
    #[serde(rename = "br")]
    BottomRight,
}

impl InnerCorner {
    pub const ALL: [InnerCorner; 4] = [
        InnerCorner::TopLeft,
        InnerCorner::TopRight,
        InnerCorner::BottomLeft,
        InnerCorner::BottomRight,
    ];

    /// Parse a short tag ("tl", "tr", "bl", "br")
    pub fn from_tag(tag: &str) -> Result<Self, TilesetError> {
        match tag {
            "tl" => Ok(InnerCorner::TopLeft),
            "tr" => Ok(InnerCorner::TopRight),
            "bl" => Ok(InnerCorner::BottomLeft),
            "br" => Ok(InnerCorner::BottomRight),
            other => Err(TilesetError::InvalidCornerTag(other.to_string())),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            InnerCorner::TopLeft => "tl",
            InnerCorner::TopRight => "tr",
            InnerCorner::BottomLeft => "bl",
            InnerCorner::BottomRight => "br",
        }
    }

    /// Quadrant that contains tile-local offset (ox, oy)
    pub fn containing(ox: u32, oy: u32, tile_size: u32) -> Self {
        let half = tile_size / 2;
        match (ox < half, oy < half) {
            (true, true) => InnerCorner::TopLeft,
            (false, true) => InnerCorner::TopRight,
            (true, false) => InnerCorner::BottomLeft,
            (false, false) => InnerCorner::BottomRight,
        }
    }

    /// Tile-local pixel offset of this quadrant's top-left pixel
    pub fn origin(self, tile_size: u32) -> (u32, u32) {
        let half = tile_size / 2;
        match self {
            InnerCorner::TopLeft => (0, 0),
            InnerCorner::TopRight => (half, 0),
            InnerCorner::BottomLeft => (0, half),
            InnerCorner::BottomRight => (half, half),
        }
    }

    fn bit(self) -> u8 {
        match self {
            InnerCorner::TopLeft => 1 << 0,
            InnerCorner::TopRight => 1 << 1,
            InnerCorner::BottomLeft => 1 << 2,
            InnerCorner::BottomRight => 1 << 3,
        }
    }
}

/// A set of inner corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CornerSet(u8);

impl CornerSet {
    pub const EMPTY: CornerSet = CornerSet(0);

    pub fn from_corners(corners: impl IntoIterator<Item = InnerCorner>) -> Self {
        corners.into_iter().fold(Self::EMPTY, Self::with)
    }

    /// Parse a list of corner tags, failing on the first unknown one
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Result<Self, TilesetError> {
        let mut set = Self::EMPTY;
        for tag in tags {
            set = set.with(InnerCorner::from_tag(tag.as_ref())?);
        }
        Ok(set)
    }

    pub fn with(self, corner: InnerCorner) -> Self {
        CornerSet(self.0 | corner.bit())
    }

    pub fn contains(self, corner: InnerCorner) -> bool {
        self.0 & corner.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = InnerCorner> {
        InnerCorner::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<InnerCorner> for CornerSet {
    fn from_iter<I: IntoIterator<Item = InnerCorner>>(iter: I) -> Self {
        Self::from_corners(iter)
    }
}

/// A pixel surface divided into square tiles of `tile_size` pixels.
///
/// An atlas may reserve one tile as the corner donor. Tiles that declare inner
/// corners read (and write) those quadrants from the donor instead of their
/// own region.
#[derive(Debug, Clone)]
pub struct TileAtlas {
    tile_size: u32,
    columns: u32,
    rows: u32,
    corner_donor: Option<TilePosition>,
    surface: PixelSurface,
}

impl TileAtlas {
    /// Create a transparent atlas of `columns` x `rows` tiles
    pub fn new(tile_size: u32, columns: u32, rows: u32) -> Result<Self, TilesetError> {
        if tile_size == 0 || tile_size % 2 != 0 {
            return Err(TilesetError::InvalidTileSize(tile_size));
        }
        Ok(Self {
            tile_size,
            columns,
            rows,
            corner_donor: None,
            surface: PixelSurface::new(columns * tile_size, rows * tile_size),
        })
    }

    /// Create an atlas over raw RGBA bytes. Partial tiles at the right and
    /// bottom edges are not addressable.
    pub fn from_rgba_bytes(
        tile_size: u32,
        width: u32,
        height: u32,
        bytes: &[u8],
    ) -> Result<Self, TilesetError> {
        if tile_size == 0 || tile_size % 2 != 0 {
            return Err(TilesetError::InvalidTileSize(tile_size));
        }
        Ok(Self {
            tile_size,
            columns: width / tile_size,
            rows: height / tile_size,
            corner_donor: None,
            surface: PixelSurface::from_rgba_bytes(width, height, bytes)?,
        })
    }

    /// The 5x4 "4x4 plus" atlas: a 4x4 blob tileset with the corner donor at (4, 0)
    pub fn four_by_four_plus(tile_size: u32) -> Result<Self, TilesetError> {
        Self::new(tile_size, 5, 4)?.with_corner_donor(TilePosition::new(4, 0))
    }

    /// Reserve `donor` as the inner-corner source tile
    pub fn with_corner_donor(mut self, donor: TilePosition) -> Result<Self, TilesetError> {
        if !self.contains(donor) {
            return Err(TilesetError::TileOutOfRange {
                x: donor.x,
                y: donor.y,
            });
        }
        self.corner_donor = Some(donor);
        Ok(self)
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

    pub fn corner_donor(&self) -> Option<TilePosition> {
        self.corner_donor
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut PixelSurface {
        &mut self.surface
    }

    /// Check if a tile position is inside the grid
    pub fn contains(&self, pos: TilePosition) -> bool {
        pos.x < self.columns && pos.y < self.rows
    }

    /// Tile under a surface pixel
    pub fn tile_position_at_pixel(&self, x: i32, y: i32) -> Option<TilePosition> {
        if x < 0 || y < 0 {
            return None;
        }
        let pos = TilePosition::new(x as u32 / self.tile_size, y as u32 / self.tile_size);
        self.contains(pos).then_some(pos)
    }

    /// Surface pixel coordinates of a tile's top-left pixel
    pub fn tile_origin(&self, pos: TilePosition) -> (i32, i32) {
        (
            (pos.x * self.tile_size) as i32,
            (pos.y * self.tile_size) as i32,
        )
    }

    /// Without a donor slot corner requests cannot be honoured
    fn usable_corners(&self, corners: CornerSet) -> CornerSet {
        if !corners.is_empty() && self.corner_donor.is_none() {
            tracing::warn!(?corners, "inner corners requested on an atlas without a donor");
            return CornerSet::EMPTY;
        }
        corners
    }

    /// Map a tile-local pixel to surface coordinates, following inner corners
    /// to the donor tile
    pub fn resolve_tile_pixel(
        &self,
        pos: TilePosition,
        ox: u32,
        oy: u32,
        corners: CornerSet,
    ) -> Option<(i32, i32)> {
        if !self.contains(pos) || ox >= self.tile_size || oy >= self.tile_size {
            return None;
        }
        let quadrant = InnerCorner::containing(ox, oy, self.tile_size);
        let tile = match self.corner_donor {
            Some(donor) if corners.contains(quadrant) => donor,
            _ => pos,
        };
        let (tx, ty) = self.tile_origin(tile);
        Some((tx + ox as i32, ty + oy as i32))
    }

    pub fn get_tile_pixel(
        &self,
        pos: TilePosition,
        ox: u32,
        oy: u32,
        corners: CornerSet,
    ) -> Option<Rgba> {
        let (x, y) = self.resolve_tile_pixel(pos, ox, oy, corners)?;
        self.surface.get_pixel(x, y)
    }

    /// Write a base pixel at a tile-local offset. Returns false if nothing was written.
    pub fn set_tile_pixel(
        &mut self,
        pos: TilePosition,
        ox: u32,
        oy: u32,
        color: Rgba,
        corners: CornerSet,
    ) -> bool {
        match self.resolve_tile_pixel(pos, ox, oy, corners) {
            Some((x, y)) => {
                self.surface.set_pixel(x, y, color);
                true
            }
            None => false,
        }
    }

    /// Write an overlay pixel at a tile-local offset. Returns false if nothing was written.
    pub fn set_tile_overlay_pixel(
        &mut self,
        pos: TilePosition,
        ox: u32,
        oy: u32,
        color: Rgba,
        corners: CornerSet,
    ) -> bool {
        match self.resolve_tile_pixel(pos, ox, oy, corners) {
            Some((x, y)) => {
                self.surface.set_overlay_pixel(x, y, color);
                true
            }
            None => false,
        }
    }

    /// The committed image of a tile with `corners` replaced by donor quadrants
    pub fn get_tile_image(&self, pos: TilePosition, corners: CornerSet) -> Option<ImageBuffer> {
        self.compose_tile(pos, corners, |x, y, w, h| self.surface.base().region(x, y, w, h))
    }

    /// Like [`get_tile_image`](Self::get_tile_image) but with the pending
    /// overlay composited on top
    pub fn get_tile_preview(&self, pos: TilePosition, corners: CornerSet) -> Option<ImageBuffer> {
        self.compose_tile(pos, corners, |x, y, w, h| {
            self.surface.preview_region(x, y, w, h)
        })
    }

    fn compose_tile<F>(&self, pos: TilePosition, corners: CornerSet, read: F) -> Option<ImageBuffer>
    where
        F: Fn(i32, i32, u32, u32) -> ImageBuffer,
    {
        if !self.contains(pos) {
            return None;
        }
        let size = self.tile_size;
        let (tx, ty) = self.tile_origin(pos);
        let mut image = read(tx, ty, size, size);

        let corners = self.usable_corners(corners);
        if let Some(donor) = self.corner_donor {
            let (dx, dy) = self.tile_origin(donor);
            let half = size / 2;
            for corner in corners.iter() {
                let (qx, qy) = corner.origin(size);
                let quadrant = read(dx + qx as i32, dy + qy as i32, half, half);
                image.blit(&quadrant, qx as i32, qy as i32);
            }
        }
        Some(image)
    }
}
