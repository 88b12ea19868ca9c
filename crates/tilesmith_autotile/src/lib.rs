//! Combo tile banks and autotile resolution
//!
//! This crate turns a sparse terrain grid into tiles picked from one or more
//! combo banks, each a fixed table of atlas tiles tagged with the neighbor
//! pattern they draw.
//!
//! # Features
//! - 9-bit neighbor masks with diagonal relevance
//! - "4x4 plus" and Godot "3x3 minimal" bank layouts, or custom JSON layouts
//! - First-match candidate resolution in table order
//! - Terrain grid resize and seeded randomization
//!
//! # Example
//!
//! ```rust,ignore
//! use tilesmith_autotile::{layouts, ComboTileBank, TerrainResolver};
//! use tilesmith_core::TileAtlas;
//!
//! let atlas = TileAtlas::four_by_four_plus(16)?;
//! let godot = ComboTileBank::from_layout(&layouts::godot_3x3_minimal(), &atlas)?;
//!
//! let mut terrain = TerrainResolver::new("Terrain".to_string(), &[&godot], 8, 8)?;
//! terrain.grid_mut().set(3, 3, Some(0));
//! terrain.render_from_banks(&[&godot]);
//! ```

pub mod combo;
pub mod layouts;
pub mod mask;
pub mod resolver;
pub mod terrain;

// Re-export main types at crate root
pub use combo::{ComboTile, ComboTileBank};
pub use layouts::{blob_mask, BankLayout, LayoutEntry};
pub use mask::{neighbors, NeighborMask};
pub use resolver::{ResolvedTile, TerrainResolver};
pub use terrain::TerrainGrid;

// Re-export tilesmith_core
pub use tilesmith_core;
