//! Layer types and the layer dependency graph

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::TilesetError;

/// Index of a layer in its [`LayerGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LayerId(pub usize);

/// Where a layer's pixels come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerSource {
    /// The layer owns its pixel surface
    Direct,
    /// Derived from one layer below (combo banks read the source atlas)
    Single(LayerId),
    /// Derived from several layers below (a terrain reads its banks)
    Multi(Vec<LayerId>),
}

impl LayerSource {
    /// Layers this one reads from
    pub fn inputs(&self) -> &[LayerId] {
        match self {
            LayerSource::Direct => &[],
            LayerSource::Single(id) => std::slice::from_ref(id),
            LayerSource::Multi(ids) => ids,
        }
    }
}

/// A layer in the document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub source: LayerSource,
}

impl Layer {
    /// Create the source atlas layer
    pub fn new_source_layer(name: String) -> Self {
        Self {
            name,
            visible: true,
            source: LayerSource::Direct,
        }
    }

    /// Create a combo bank layer drawing from `source`
    pub fn new_combos_layer(name: String, source: LayerId) -> Self {
        Self {
            name,
            visible: true,
            source: LayerSource::Single(source),
        }
    }

    /// Create a terrain layer drawing from one or more combo banks
    pub fn new_terrain_layer(name: String, banks: Vec<LayerId>) -> Self {
        Self {
            name,
            visible: true,
            source: LayerSource::Multi(banks),
        }
    }

    /// Get the type of this layer
    pub fn layer_type(&self) -> LayerType {
        match &self.source {
            LayerSource::Direct => LayerType::Source,
            LayerSource::Single(_) => LayerType::Combos,
            LayerSource::Multi(_) => LayerType::Terrain,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.layer_type().capabilities()
    }
}

/// The type of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerType {
    Source,
    Combos,
    Terrain,
}

impl LayerType {
    /// Operations an editing session may run against this kind of layer
    pub fn capabilities(self) -> Capabilities {
        match self {
            LayerType::Source | LayerType::Combos => Capabilities {
                pencil: true,
                fill: true,
                terrain: false,
            },
            LayerType::Terrain => Capabilities {
                pencil: true,
                fill: false,
                terrain: true,
            },
        }
    }
}

/// Editing operations supported by a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub pencil: bool,
    pub fill: bool,
    pub terrain: bool,
}

/// Layers plus the reverse "dependents" edges used for invalidation.
///
/// A layer may only read from layers added before it, so ascending id order
/// is always a valid rebuild order.
#[derive(Debug, Clone, Default)]
pub struct LayerGraph {
    layers: Vec<Layer>,
    dependents: Vec<Vec<LayerId>>,
}

impl LayerGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer, recording it as a dependent of each of its inputs
    pub fn add_layer(&mut self, layer: Layer) -> Result<LayerId, TilesetError> {
        if let LayerSource::Multi(ids) = &layer.source {
            if ids.is_empty() {
                return Err(TilesetError::NoSources);
            }
        }
        if let Some(missing) = layer.source.inputs().iter().find(|id| id.0 >= self.layers.len()) {
            return Err(TilesetError::UnknownLayer(missing.0));
        }

        let id = LayerId(self.layers.len());
        for input in layer.source.inputs() {
            if !self.dependents[input.0].contains(&id) {
                self.dependents[input.0].push(id);
            }
        }
        self.layers.push(layer);
        self.dependents.push(Vec::new());
        Ok(id)
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.get_mut(id.0)
    }

    /// Look up a layer, failing with [`TilesetError::UnknownLayer`]
    pub fn layer(&self, id: LayerId) -> Result<&Layer, TilesetError> {
        self.get(id).ok_or(TilesetError::UnknownLayer(id.0))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers.iter().enumerate().map(|(i, l)| (LayerId(i), l))
    }

    /// Layers that read directly from `id`
    pub fn dependents(&self, id: LayerId) -> &[LayerId] {
        self.dependents.get(id.0).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `root` followed by every layer that transitively depends on it, in
    /// rebuild order
    pub fn invalidation_order(&self, root: LayerId) -> Vec<LayerId> {
        if root.0 >= self.layers.len() {
            return Vec::new();
        }
        let mut seen = BTreeSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if seen.insert(id) {
                stack.extend(self.dependents(id).iter().copied());
            }
        }
        seen.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> (LayerGraph, LayerId, LayerId, LayerId, LayerId) {
        let mut graph = LayerGraph::new();
        let source = graph
            .add_layer(Layer::new_source_layer("Source".to_string()))
            .unwrap();
        let blob = graph
            .add_layer(Layer::new_combos_layer("4x4".to_string(), source))
            .unwrap();
        let godot = graph
            .add_layer(Layer::new_combos_layer("Godot".to_string(), source))
            .unwrap();
        let terrain = graph
            .add_layer(Layer::new_terrain_layer("Terrain".to_string(), vec![blob, godot]))
            .unwrap();
        (graph, source, blob, godot, terrain)
    }

    #[test]
    fn test_layer_types_and_capabilities() {
        let (graph, source, blob, _, terrain) = sample_graph();
        assert_eq!(graph.get(source).unwrap().layer_type(), LayerType::Source);
        assert_eq!(graph.get(blob).unwrap().layer_type(), LayerType::Combos);
        assert_eq!(graph.get(terrain).unwrap().layer_type(), LayerType::Terrain);

        let caps = graph.get(terrain).unwrap().capabilities();
        assert!(caps.pencil && caps.terrain && !caps.fill);
        let caps = graph.get(blob).unwrap().capabilities();
        assert!(caps.pencil && caps.fill && !caps.terrain);
    }

    #[test]
    fn test_invalidation_order_is_transitive() {
        let (graph, source, blob, godot, terrain) = sample_graph();
        assert_eq!(
            graph.invalidation_order(source),
            vec![source, blob, godot, terrain]
        );
        assert_eq!(graph.invalidation_order(godot), vec![godot, terrain]);
        assert_eq!(graph.invalidation_order(terrain), vec![terrain]);
        assert!(graph.invalidation_order(LayerId(42)).is_empty());
    }

    #[test]
    fn test_add_layer_validates_inputs() {
        let mut graph = LayerGraph::new();
        assert_eq!(
            graph
                .add_layer(Layer::new_combos_layer("Bank".to_string(), LayerId(0)))
                .unwrap_err(),
            TilesetError::UnknownLayer(0)
        );
        assert_eq!(
            graph
                .add_layer(Layer::new_terrain_layer("Terrain".to_string(), Vec::new()))
                .unwrap_err(),
            TilesetError::NoSources
        );
        assert!(graph.is_empty());
    }
}
