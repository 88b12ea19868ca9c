//! Core data structures for tilesmith
//!
//! This crate provides the fundamental types for editing a pixel-art tileset:
//! - `PixelSurface` - RGBA pixel store with a non-destructive overlay
//! - `TileAtlas` - Fixed-size tile grid over a surface, with inner-corner donors
//! - `Layer` - A node in the layer dependency graph (source, combos, terrain)
//! - `PixelCanvas` - The write interface brushes and fills paint through
//! - `EditorConfig` - User-tunable settings loaded from TOML

mod atlas;
mod canvas;
mod color;
mod config;
mod image;
mod layer;
mod surface;

pub use atlas::{CornerSet, InnerCorner, TileAtlas, TilePosition};
pub use canvas::PixelCanvas;
pub use color::Rgba;
pub use config::{load_config, parse_config, EditorConfig, MAX_BRUSH_DIAMETER};
pub use image::ImageBuffer;
pub use layer::{Capabilities, Layer, LayerGraph, LayerId, LayerSource, LayerType};
pub use surface::{CompositeMode, PixelSurface};

use thiserror::Error;

/// Errors raised when constructing or loading tileset structures.
///
/// Out-of-bounds pixel writes and unmatched autotile cells are not errors; they
/// are silently skipped or reported as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TilesetError {
    #[error("tile size {0} must be a positive even number")]
    InvalidTileSize(u32),
    #[error("invalid inner corner tag '{0}'")]
    InvalidCornerTag(String),
    #[error("tile size mismatch: expected {expected}, found {found}")]
    SizeMismatch { expected: u32, found: u32 },
    #[error("pixel data has {actual} bytes, expected {expected}")]
    PixelDataLength { expected: usize, actual: usize },
    #[error("tile position ({x}, {y}) is outside the atlas")]
    TileOutOfRange { x: u32, y: u32 },
    #[error("invalid bank layout: {0}")]
    InvalidLayout(String),
    #[error("a terrain layer needs at least one combo bank")]
    NoSources,
    #[error("unknown layer {0}")]
    UnknownLayer(usize),
    #[error("layer {layer} is a {found:?} layer, expected {expected:?}")]
    WrongLayerKind {
        layer: usize,
        expected: LayerType,
        found: LayerType,
    },
    #[error("{tool} is not supported by a {layer:?} layer")]
    UnsupportedTool { tool: String, layer: LayerType },
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("IO error: {0}")]
    IoError(String),
}
