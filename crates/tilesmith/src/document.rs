//! Tileset documents
//!
//! A [`TilesetDocument`] owns one source atlas plus every combo bank and
//! terrain built on top of it. Layers are nodes of a [`LayerGraph`]: changing
//! a layer rebuilds it and everything downstream before returning, and queues
//! one [`DocumentEvent`] per rebuilt layer for the presentation side.

use std::time::Duration;

use rand::Rng;
use tilesmith_autotile::layouts::{four_by_four_plus, godot_3x3_minimal};
use tilesmith_autotile::{BankLayout, ComboTileBank, TerrainGrid, TerrainResolver};
use tilesmith_brush::{EditorTool, PointerButton, PointerEvent, ToolSession};
use tilesmith_core::{
    CornerSet, EditorConfig, ImageBuffer, Layer, LayerGraph, LayerId, LayerType, Rgba, TileAtlas,
    TilePosition, TilesetError,
};
use uuid::Uuid;

use crate::history::SnapshotHistory;
use crate::layer_canvas::LayerCanvas;

/// Change notifications drained by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentEvent {
    /// The composed surface of a layer was rebuilt
    LayerChanged(LayerId),
}

/// Where a layer's data lives inside the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LayerSlot {
    Source,
    Bank(usize),
    Terrain(usize),
}

impl LayerSlot {
    pub(crate) fn layer_type(self) -> LayerType {
        match self {
            LayerSlot::Source => LayerType::Source,
            LayerSlot::Bank(_) => LayerType::Combos,
            LayerSlot::Terrain(_) => LayerType::Terrain,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct TerrainLayer {
    pub(crate) resolver: TerrainResolver,
    /// Document bank indices, in resolver bank order
    pub(crate) banks: Vec<usize>,
}

/// One tileset being edited
#[derive(Debug, Clone)]
pub struct TilesetDocument {
    pub id: Uuid,
    pub name: String,
    config: EditorConfig,
    graph: LayerGraph,
    source: LayerId,
    pub(crate) atlas: TileAtlas,
    pub(crate) slots: Vec<LayerSlot>,
    pub(crate) banks: Vec<ComboTileBank>,
    pub(crate) terrains: Vec<TerrainLayer>,
    events: Vec<DocumentEvent>,
    history: SnapshotHistory,
    /// Source bytes from the last pixel-tool pointer-down, kept once the
    /// gesture writes something
    pending_snapshot: Option<Vec<u8>>,
    pub(crate) dirty: bool,
}

impl TilesetDocument {
    /// Create a document over `atlas`, whose tile size must match the config
    pub fn new(
        name: impl Into<String>,
        config: EditorConfig,
        atlas: TileAtlas,
    ) -> Result<Self, TilesetError> {
        config.validate()?;
        if atlas.tile_size() != config.tile_size {
            return Err(TilesetError::SizeMismatch {
                expected: config.tile_size,
                found: atlas.tile_size(),
            });
        }

        let name = name.into();
        let mut graph = LayerGraph::new();
        let source = graph.add_layer(Layer::new_source_layer(name.clone()))?;
        tracing::info!(
            document = %name,
            tile_size = atlas.tile_size(),
            columns = atlas.columns(),
            rows = atlas.rows(),
            "created tileset document"
        );

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            history: SnapshotHistory::new(config.undo_limit),
            config,
            graph,
            source,
            atlas,
            slots: vec![LayerSlot::Source],
            banks: Vec::new(),
            terrains: Vec::new(),
            events: Vec::new(),
            pending_snapshot: None,
            dirty: false,
        })
    }

    /// A "4x4 plus" document: the 5x4 atlas, the 4x4 and Godot banks, and a
    /// terrain painted from both
    pub fn four_by_four_plus(
        name: impl Into<String>,
        config: EditorConfig,
    ) -> Result<Self, TilesetError> {
        let atlas = TileAtlas::four_by_four_plus(config.tile_size)?;
        let mut document = Self::new(name, config, atlas)?;
        let blob = document.add_combo_bank(&four_by_four_plus())?;
        let godot = document.add_combo_bank(&godot_3x3_minimal())?;
        document.add_terrain("Terrain", &[blob, godot])?;
        Ok(document)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn atlas(&self) -> &TileAtlas {
        &self.atlas
    }

    pub fn graph(&self) -> &LayerGraph {
        &self.graph
    }

    /// The layer holding the atlas pixels
    pub fn source_layer(&self) -> LayerId {
        self.source
    }

    pub fn layer(&self, id: LayerId) -> Result<&Layer, TilesetError> {
        self.graph.layer(id)
    }

    pub fn layer_type(&self, id: LayerId) -> Result<LayerType, TilesetError> {
        Ok(self.slot(id)?.layer_type())
    }

    pub(crate) fn slot(&self, id: LayerId) -> Result<LayerSlot, TilesetError> {
        self.slots
            .get(id.0)
            .copied()
            .ok_or(TilesetError::UnknownLayer(id.0))
    }

    /// Pixel size of a layer's composed surface
    pub fn layer_size(&self, id: LayerId) -> Result<(u32, u32), TilesetError> {
        Ok(self.slot_size(self.slot(id)?))
    }

    pub(crate) fn slot_size(&self, slot: LayerSlot) -> (u32, u32) {
        match slot {
            LayerSlot::Source => (self.atlas.surface().width(), self.atlas.surface().height()),
            LayerSlot::Bank(i) => self.banks.get(i).map_or((0, 0), |b| b.pixel_size()),
            LayerSlot::Terrain(t) => self
                .terrains
                .get(t)
                .map_or((0, 0), |terrain| terrain.resolver.pixel_size()),
        }
    }

    /// Mark document as modified
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if the source pixels or terrain changed since the last save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    // ========================================================================
    // Layer construction
    // ========================================================================

    /// Add a combo bank over the source atlas
    pub fn add_combo_bank(&mut self, layout: &BankLayout) -> Result<LayerId, TilesetError> {
        let bank = ComboTileBank::from_layout(layout, &self.atlas)?;
        let id = self
            .graph
            .add_layer(Layer::new_combos_layer(layout.name.clone(), self.source))?;
        self.slots.push(LayerSlot::Bank(self.banks.len()));
        self.banks.push(bank);
        tracing::debug!(layer = id.0, bank = %layout.name, "added combo bank");
        Ok(id)
    }

    /// Add a terrain layer resolved against the given combo bank layers. The
    /// grid starts empty at the configured size.
    pub fn add_terrain(
        &mut self,
        name: impl Into<String>,
        banks: &[LayerId],
    ) -> Result<LayerId, TilesetError> {
        let name = name.into();
        let mut indices = Vec::with_capacity(banks.len());
        for &id in banks {
            indices.push(self.bank_index(id)?);
        }
        let refs: Vec<&ComboTileBank> = indices.iter().filter_map(|&i| self.banks.get(i)).collect();
        let mut resolver = TerrainResolver::new(
            name.clone(),
            &refs,
            self.config.terrain_columns,
            self.config.terrain_rows,
        )?;
        resolver.render_from_banks(&refs);

        let id = self
            .graph
            .add_layer(Layer::new_terrain_layer(name, banks.to_vec()))?;
        self.slots.push(LayerSlot::Terrain(self.terrains.len()));
        self.terrains.push(TerrainLayer {
            resolver,
            banks: indices,
        });
        tracing::debug!(layer = id.0, banks = banks.len(), "added terrain");
        Ok(id)
    }

    fn bank_index(&self, id: LayerId) -> Result<usize, TilesetError> {
        match self.slot(id)? {
            LayerSlot::Bank(i) => Ok(i),
            other => Err(TilesetError::WrongLayerKind {
                layer: id.0,
                expected: LayerType::Combos,
                found: other.layer_type(),
            }),
        }
    }

    fn terrain_index(&self, id: LayerId) -> Result<usize, TilesetError> {
        match self.slot(id)? {
            LayerSlot::Terrain(t) => Ok(t),
            other => Err(TilesetError::WrongLayerKind {
                layer: id.0,
                expected: LayerType::Terrain,
                found: other.layer_type(),
            }),
        }
    }

    pub fn bank(&self, id: LayerId) -> Result<&ComboTileBank, TilesetError> {
        let index = self.bank_index(id)?;
        self.banks.get(index).ok_or(TilesetError::UnknownLayer(id.0))
    }

    pub fn resolver(&self, id: LayerId) -> Result<&TerrainResolver, TilesetError> {
        let index = self.terrain_index(id)?;
        self.terrains
            .get(index)
            .map(|terrain| &terrain.resolver)
            .ok_or(TilesetError::UnknownLayer(id.0))
    }

    // ========================================================================
    // Invalidation
    // ========================================================================

    /// Rebuild `layer` and every layer that depends on it, even if nothing
    /// changed (e.g. after bulk-loading pixels)
    pub fn invalidate(&mut self, layer: LayerId) -> Result<(), TilesetError> {
        self.slot(layer)?;
        self.propagate(layer);
        Ok(())
    }

    pub(crate) fn propagate(&mut self, root: LayerId) {
        let order = self.graph.invalidation_order(root);
        tracing::debug!(root = root.0, layers = order.len(), "invalidating");
        for id in order {
            self.rebuild(id);
            self.events.push(DocumentEvent::LayerChanged(id));
        }
    }

    fn rebuild(&mut self, id: LayerId) {
        match self.slots.get(id.0).copied() {
            Some(LayerSlot::Bank(i)) => {
                if let Some(bank) = self.banks.get_mut(i) {
                    bank.render_full(&self.atlas);
                }
            }
            Some(LayerSlot::Terrain(t)) => {
                if let Some(terrain) = self.terrains.get_mut(t) {
                    let refs: Vec<&ComboTileBank> = terrain
                        .banks
                        .iter()
                        .filter_map(|&b| self.banks.get(b))
                        .collect();
                    terrain.resolver.render_from_banks(&refs);
                }
            }
            Some(LayerSlot::Source) | None => {}
        }
    }

    /// Take every change notification queued since the last call
    pub fn drain_events(&mut self) -> Vec<DocumentEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Pixel of a layer's composed surface. Source reads committed pixels.
    pub fn get_pixel(&self, layer: LayerId, x: i32, y: i32) -> Option<Rgba> {
        match self.slots.get(layer.0)? {
            LayerSlot::Source => self.atlas.surface().get_pixel(x, y),
            LayerSlot::Bank(i) => self.banks.get(*i)?.pixel(x, y),
            LayerSlot::Terrain(t) => self.terrains.get(*t)?.resolver.composed().get(x, y),
        }
    }

    /// Committed image of the tile at `position` of a layer. For a terrain
    /// this is the bank entry its cell resolves to.
    pub fn get_tile_image(&self, layer: LayerId, position: TilePosition) -> Option<ImageBuffer> {
        match self.slots.get(layer.0)? {
            LayerSlot::Source => self.atlas.get_tile_image(position, CornerSet::EMPTY),
            LayerSlot::Bank(i) => self.banks.get(*i)?.get_tile_image(&self.atlas, position),
            LayerSlot::Terrain(t) => {
                let terrain = self.terrains.get(*t)?;
                let resolved = terrain
                    .resolver
                    .resolve(position.x as i32, position.y as i32)?;
                let bank = self.banks.get(*terrain.banks.get(resolved.bank)?)?;
                bank.get_tile_image(&self.atlas, resolved.position)
            }
        }
    }

    /// Colors of the source atlas ranked by count. Every layer shares them.
    pub fn get_unique_colors(&self, layer: LayerId) -> Result<Vec<(Rgba, usize)>, TilesetError> {
        self.slot(layer)?;
        Ok(self.atlas.surface().get_unique_colors())
    }

    /// Committed source atlas bytes, for persisting
    pub fn get_surface_bytes(&self) -> Vec<u8> {
        self.atlas.surface().get_surface_bytes()
    }

    /// Replace the source atlas pixels and rebuild every layer
    pub fn put_surface_bytes(&mut self, bytes: &[u8]) -> Result<(), TilesetError> {
        self.atlas.surface_mut().put_surface_bytes(bytes)?;
        self.dirty = true;
        tracing::info!(document = %self.name, bytes = bytes.len(), "loaded source pixels");
        self.propagate(self.source);
        Ok(())
    }

    /// Composed RGBA bytes of any layer
    pub fn export_layer_bytes(&self, layer: LayerId) -> Result<Vec<u8>, TilesetError> {
        Ok(match self.slot(layer)? {
            LayerSlot::Source => self.get_surface_bytes(),
            LayerSlot::Bank(i) => self
                .banks
                .get(i)
                .and_then(|bank| bank.composed())
                .map(ImageBuffer::to_rgba_bytes)
                .unwrap_or_default(),
            LayerSlot::Terrain(t) => self
                .terrains
                .get(t)
                .map(|terrain| terrain.resolver.composed().to_rgba_bytes())
                .unwrap_or_default(),
        })
    }

    // ========================================================================
    // Terrain
    // ========================================================================

    pub fn terrain_grid(&self, layer: LayerId) -> Result<&TerrainGrid, TilesetError> {
        Ok(self.resolver(layer)?.grid())
    }

    fn edit_terrain<F, T>(&mut self, layer: LayerId, edit: F) -> Result<T, TilesetError>
    where
        F: FnOnce(&mut TerrainResolver) -> T,
    {
        let index = self.terrain_index(layer)?;
        let terrain = self
            .terrains
            .get_mut(index)
            .ok_or(TilesetError::UnknownLayer(layer.0))?;
        Ok(edit(&mut terrain.resolver))
    }

    /// Set one cell to a bank index or empty. Re-renders only on change.
    pub fn set_terrain_cell(
        &mut self,
        layer: LayerId,
        x: i32,
        y: i32,
        value: Option<usize>,
    ) -> Result<bool, TilesetError> {
        let changed = self.edit_terrain(layer, |resolver| resolver.grid_mut().set(x, y, value))?;
        if changed {
            self.dirty = true;
            self.propagate(layer);
        }
        Ok(changed)
    }

    pub fn clear_terrain(&mut self, layer: LayerId) -> Result<(), TilesetError> {
        self.edit_terrain(layer, |resolver| resolver.grid_mut().clear())?;
        self.dirty = true;
        self.propagate(layer);
        Ok(())
    }

    /// Resize the grid, keeping existing cells centred
    pub fn resize_terrain(
        &mut self,
        layer: LayerId,
        columns: u32,
        rows: u32,
    ) -> Result<(), TilesetError> {
        self.edit_terrain(layer, |resolver| resolver.grid_mut().resize(columns, rows))?;
        self.dirty = true;
        self.propagate(layer);
        Ok(())
    }

    /// Fill the grid randomly at the configured fill ratio
    pub fn randomize_terrain<R: Rng + ?Sized>(
        &mut self,
        layer: LayerId,
        rng: &mut R,
    ) -> Result<(), TilesetError> {
        let fill_ratio = self.config.terrain_fill_ratio;
        self.edit_terrain(layer, |resolver| {
            let bank_count = resolver.bank_count();
            resolver.grid_mut().randomize(rng, bank_count, fill_ratio);
        })?;
        self.dirty = true;
        self.propagate(layer);
        Ok(())
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// A paintable view of any layer for the brush engine
    pub fn canvas(&mut self, layer: LayerId) -> Result<LayerCanvas<'_>, TilesetError> {
        let slot = self.slot(layer)?;
        Ok(LayerCanvas::new(self, layer, slot))
    }

    fn dispatch<F>(&mut self, layer: LayerId, f: F) -> Result<bool, TilesetError>
    where
        F: FnOnce(&mut LayerCanvas<'_>) -> bool,
    {
        let mut canvas = self.canvas(layer)?;
        let changed = f(&mut canvas);
        let (written, stale) = (canvas.written(), canvas.preview_stale());
        if written {
            if let Some(snapshot) = self.pending_snapshot.take() {
                self.history.push(snapshot);
            }
        }
        // Show the in-progress overlay in every derived layer
        if stale {
            self.propagate(self.source);
        }
        Ok(changed)
    }

    /// Drop the pointer-down snapshot once the gesture ended without writing
    fn end_gesture(&mut self, session: &ToolSession) {
        if !session.is_active() {
            self.pending_snapshot = None;
        }
    }

    /// Route a pointer-down to `session`. Pixel tools snapshot the source
    /// first; the snapshot is recorded for undo when the gesture writes.
    pub fn pointer_down(
        &mut self,
        session: &mut ToolSession,
        layer: LayerId,
        event: PointerEvent,
    ) -> Result<bool, TilesetError> {
        let capabilities = self.layer_type(layer)?.capabilities();
        if event.button == PointerButton::Primary
            && !session.is_active()
            && session.tool() != EditorTool::Terrain
            && session.tool().is_supported(capabilities)
        {
            self.pending_snapshot = Some(self.get_surface_bytes());
        }
        self.dispatch(layer, |canvas| session.pointer_down(canvas, event))
    }

    pub fn pointer_move(
        &mut self,
        session: &mut ToolSession,
        layer: LayerId,
        event: PointerEvent,
    ) -> Result<bool, TilesetError> {
        self.dispatch(layer, |canvas| session.pointer_move(canvas, event))
    }

    pub fn pointer_up(
        &mut self,
        session: &mut ToolSession,
        layer: LayerId,
        event: PointerEvent,
    ) -> Result<bool, TilesetError> {
        let result = self.dispatch(layer, |canvas| session.pointer_up(canvas, event));
        self.end_gesture(session);
        result
    }

    pub fn pointer_hold(
        &mut self,
        session: &mut ToolSession,
        layer: LayerId,
        held: Duration,
    ) -> Result<bool, TilesetError> {
        let result = self.dispatch(layer, |canvas| session.pointer_hold(canvas, held));
        self.end_gesture(session);
        result
    }

    /// Abandon the current stroke and drop its overlay
    pub fn cancel(&mut self, session: &mut ToolSession, layer: LayerId) -> Result<(), TilesetError> {
        self.dispatch(layer, |canvas| {
            session.cancel(canvas);
            false
        })?;
        self.end_gesture(session);
        Ok(())
    }

    // ========================================================================
    // History
    // ========================================================================

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Restore the source pixels saved by the newest pointer-down
    pub fn undo(&mut self) -> Result<bool, TilesetError> {
        let Some(snapshot) = self.history.pop() else {
            return Ok(false);
        };
        self.atlas.surface_mut().put_surface_bytes(&snapshot)?;
        self.dirty = true;
        tracing::debug!(remaining = self.history.len(), "undo");
        self.propagate(self.source);
        Ok(true)
    }
}
