//! Editor settings loaded from TOML

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::TilesetError;

/// Largest brush diameter the editor accepts
pub const MAX_BRUSH_DIAMETER: u32 = 256;

/// User-tunable editor settings. Missing keys take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Tile edge in pixels (positive and even)
    pub tile_size: u32,
    /// Initial pencil diameter
    pub brush_diameter: u32,
    /// Idle time before a held stroke closes and fills its path
    pub fill_hold_delay_ms: u64,
    /// Maximum number of undo snapshots
    pub undo_limit: usize,
    /// Probability a cell is occupied when a terrain grid is randomized
    pub terrain_fill_ratio: f64,
    pub terrain_columns: u32,
    pub terrain_rows: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tile_size: 16,
            brush_diameter: 1,
            fill_hold_delay_ms: 600,
            undo_limit: 100,
            terrain_fill_ratio: 0.75,
            terrain_columns: 8,
            terrain_rows: 8,
        }
    }
}

impl EditorConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), TilesetError> {
        if self.tile_size == 0 || self.tile_size % 2 != 0 {
            return Err(TilesetError::InvalidTileSize(self.tile_size));
        }
        if !(1..=MAX_BRUSH_DIAMETER).contains(&self.brush_diameter) {
            return Err(TilesetError::ValidationError(format!(
                "brush_diameter {} is outside 1..={MAX_BRUSH_DIAMETER}",
                self.brush_diameter
            )));
        }
        if !(0.0..=1.0).contains(&self.terrain_fill_ratio) {
            return Err(TilesetError::ValidationError(format!(
                "terrain_fill_ratio {} is outside 0..=1",
                self.terrain_fill_ratio
            )));
        }
        Ok(())
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> Result<String, TilesetError> {
        toml::to_string_pretty(self).map_err(|e| TilesetError::ParseError(e.to_string()))
    }
}

/// Load editor settings from a TOML file
pub fn load_config(path: &Path) -> Result<EditorConfig, TilesetError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| TilesetError::IoError(e.to_string()))?;

    parse_config(&content)
}

/// Parse editor settings from a TOML string
pub fn parse_config(content: &str) -> Result<EditorConfig, TilesetError> {
    let config: EditorConfig =
        toml::from_str(content).map_err(|e| TilesetError::ParseError(e.to_string()))?;

    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.undo_limit, 100);
        assert_eq!(config.fill_hold_delay_ms, 600);
    }

    #[test]
    fn test_partial_config() {
        let config = parse_config(
            r#"
tile_size = 8
brush_diameter = 3
terrain_columns = 12
"#,
        )
        .unwrap();
        assert_eq!(config.tile_size, 8);
        assert_eq!(config.brush_diameter, 3);
        assert_eq!(config.terrain_columns, 12);
        assert_eq!(config.terrain_rows, 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert_eq!(
            parse_config("tile_size = 15").unwrap_err(),
            TilesetError::InvalidTileSize(15)
        );
        assert!(matches!(
            parse_config("terrain_fill_ratio = 1.5"),
            Err(TilesetError::ValidationError(_))
        ));
        assert!(matches!(
            parse_config("brush_diameter = 100000"),
            Err(TilesetError::ValidationError(_))
        ));
        assert!(parse_config("brush_diameter = 256").is_ok());
        assert!(matches!(
            parse_config("tile_size = \"big\""),
            Err(TilesetError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "undo_limit = 5").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.undo_limit, 5);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            load_config(&missing),
            Err(TilesetError::IoError(_))
        ));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EditorConfig {
            brush_diameter: 4,
            ..Default::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(parse_config(&text).unwrap(), config);
    }
}
