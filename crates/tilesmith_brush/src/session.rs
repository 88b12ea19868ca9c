//! Per-session tool state
//!
//! A [`ToolSession`] owns the active tool, color, brush size and terrain bank
//! for one editing session, and routes pointer events to whichever layer the
//! caller is editing.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tilesmith_core::{
    Capabilities, EditorConfig, LayerType, PixelCanvas, PixelSurface, Rgba, TilesetError,
    MAX_BRUSH_DIAMETER,
};

use crate::fill::flood_fill;
use crate::stroke::{BrushSettings, PencilTool};
use crate::terrain_tool::{TerrainCanvas, TerrainTool};

/// Tools available to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EditorTool {
    #[default]
    Pencil,
    Eraser,
    Fill,
    Terrain,
}

impl EditorTool {
    /// Returns true if a layer with `capabilities` accepts this tool
    pub fn is_supported(self, capabilities: Capabilities) -> bool {
        match self {
            EditorTool::Pencil | EditorTool::Eraser => capabilities.pencil,
            EditorTool::Fill => capabilities.fill,
            EditorTool::Terrain => capabilities.terrain,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EditorTool::Pencil => "Pencil",
            EditorTool::Eraser => "Eraser",
            EditorTool::Fill => "Fill",
            EditorTool::Terrain => "Terrain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// A pointer sample in layer pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub button: PointerButton,
    /// Erase modifier for terrain painting
    pub shift: bool,
}

impl PointerEvent {
    pub fn primary(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            button: PointerButton::Primary,
            shift: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// A layer the session can edit
pub trait EditTarget: PixelCanvas {
    fn layer_type(&self) -> LayerType;

    fn capabilities(&self) -> Capabilities {
        self.layer_type().capabilities()
    }

    /// Terrain access for layers that support terrain painting
    fn as_terrain(&mut self) -> Option<&mut dyn TerrainCanvas> {
        None
    }
}

impl EditTarget for PixelSurface {
    fn layer_type(&self) -> LayerType {
        LayerType::Source
    }
}

/// Tool state for one editing session
#[derive(Debug, Clone)]
pub struct ToolSession {
    tool: EditorTool,
    color: Rgba,
    diameter: u32,
    bank: usize,
    fill_hold_delay: Duration,
    pencil: PencilTool,
    terrain: TerrainTool,
}

impl Default for ToolSession {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl ToolSession {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            tool: EditorTool::Pencil,
            color: Rgba::WHITE,
            diameter: config.brush_diameter.clamp(1, MAX_BRUSH_DIAMETER),
            bank: 0,
            fill_hold_delay: Duration::from_millis(config.fill_hold_delay_ms),
            pencil: PencilTool::new(),
            terrain: TerrainTool::new(),
        }
    }

    pub fn tool(&self) -> EditorTool {
        self.tool
    }

    /// Activate `tool` for a layer of type `layer`, refusing tools the layer
    /// does not support
    pub fn select_tool(&mut self, tool: EditorTool, layer: LayerType) -> Result<(), TilesetError> {
        if !tool.is_supported(layer.capabilities()) {
            return Err(TilesetError::UnsupportedTool {
                tool: tool.name().to_string(),
                layer,
            });
        }
        self.tool = tool;
        Ok(())
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    pub fn diameter(&self) -> u32 {
        self.diameter
    }

    pub fn set_diameter(&mut self, diameter: u32) {
        self.diameter = diameter.clamp(1, MAX_BRUSH_DIAMETER);
    }

    /// Bank index the terrain tool paints with
    pub fn bank(&self) -> usize {
        self.bank
    }

    pub fn set_bank(&mut self, bank: usize) {
        self.bank = bank;
    }

    pub fn fill_hold_delay(&self) -> Duration {
        self.fill_hold_delay
    }

    /// Whether a pencil stroke or terrain drag is in progress
    pub fn is_active(&self) -> bool {
        self.pencil.is_active() || self.terrain.is_active()
    }

    fn brush(&self) -> BrushSettings {
        BrushSettings {
            color: self.color,
            diameter: self.diameter,
            erase: self.tool == EditorTool::Eraser,
        }
    }

    /// Returns true if the event changed anything
    pub fn pointer_down<T>(&mut self, target: &mut T, event: PointerEvent) -> bool
    where
        T: EditTarget + ?Sized,
    {
        if event.button != PointerButton::Primary || self.is_active() {
            return false;
        }
        if !self.tool.is_supported(target.capabilities()) {
            tracing::warn!(
                tool = self.tool.name(),
                layer = ?target.layer_type(),
                "tool not supported by layer"
            );
            return false;
        }
        match self.tool {
            EditorTool::Pencil | EditorTool::Eraser => {
                let brush = self.brush();
                self.pencil.pointer_down(target, event.x, event.y, brush)
            }
            // Fill runs on release
            EditorTool::Fill => false,
            EditorTool::Terrain => match target.as_terrain() {
                Some(terrain) => {
                    self.terrain
                        .pointer_down(terrain, event.x, event.y, self.bank, event.shift)
                }
                None => false,
            },
        }
    }

    pub fn pointer_move<T>(&mut self, target: &mut T, event: PointerEvent) -> bool
    where
        T: EditTarget + ?Sized,
    {
        if self.pencil.is_active() {
            return self.pencil.pointer_move(target, event.x, event.y);
        }
        if self.terrain.is_active() {
            if let Some(terrain) = target.as_terrain() {
                return self.terrain.pointer_move(terrain, event.x, event.y, event.shift);
            }
        }
        false
    }

    pub fn pointer_up<T>(&mut self, target: &mut T, event: PointerEvent) -> bool
    where
        T: EditTarget + ?Sized,
    {
        if self.pencil.is_active() {
            return self.pencil.pointer_up(target);
        }
        if self.terrain.is_active() {
            return self.terrain.pointer_up();
        }
        if self.tool == EditorTool::Fill
            && event.button == PointerButton::Primary
            && self.tool.is_supported(target.capabilities())
        {
            let written = flood_fill(
                target,
                event.x.floor() as i32,
                event.y.floor() as i32,
                self.color,
            );
            if written > 0 {
                target.flush_overlay();
                return true;
            }
        }
        false
    }

    /// Report how long the pointer has been held still. Once the fill delay has
    /// passed, a pencil stroke closes and fills its path.
    pub fn pointer_hold<T>(&mut self, target: &mut T, held: Duration) -> bool
    where
        T: EditTarget + ?Sized,
    {
        self.pencil.pointer_hold(target, held, self.fill_hold_delay)
    }

    /// Abandon whatever is in progress without committing pixels
    pub fn cancel<T>(&mut self, target: &mut T)
    where
        T: EditTarget + ?Sized,
    {
        self.pencil.cancel(target);
        self.terrain.pointer_up();
    }
}
