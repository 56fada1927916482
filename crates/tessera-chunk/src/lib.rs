//! Per-chunk model layers: dense slot ledger plus compacting instance buffer.
#![forbid(unsafe_code)]

pub mod layer;
pub mod slotmap;

use hashbrown::HashMap;
use tessera_models::ModelTemplate;
use tessera_world::{ChunkCoord, MapLayout};

pub use layer::{LayerOccupancy, ModelLayer, instance_origin};
pub use slotmap::DenseSlotMap;

/// Model layers owned by one chunk, keyed by model id.
#[derive(Clone, Debug, Default)]
pub struct ChunkModels {
    layers: HashMap<u32, ModelLayer>,
}

impl ChunkModels {
    #[inline]
    pub fn get(&self, model_id: u32) -> Option<&ModelLayer> {
        self.layers.get(&model_id)
    }

    #[inline]
    pub fn get_mut(&mut self, model_id: u32) -> Option<&mut ModelLayer> {
        self.layers.get_mut(&model_id)
    }

    /// Layer for `model_id`, created on first use with room for every tile.
    pub fn layer_mut(
        &mut self,
        model_id: u32,
        template: &ModelTemplate,
        capacity: usize,
    ) -> &mut ModelLayer {
        self.layers.entry(model_id).or_insert_with(|| {
            log::trace!(target: "models", "new layer for model {} ({} slots)", model_id, capacity);
            ModelLayer::new(model_id, template, capacity)
        })
    }

    /// Drops an emptied layer; returns whether it existed.
    pub fn drop_layer(&mut self, model_id: u32) -> bool {
        self.layers.remove(&model_id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &ModelLayer)> {
        self.layers.iter().map(|(&id, l)| (id, l))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn instance_count(&self) -> usize {
        self.layers.values().map(|l| l.len()).sum()
    }
}

/// Arena of chunk model storage indexed by chunk index.
#[derive(Clone, Debug)]
pub struct ModelArena {
    layout: MapLayout,
    chunks: Vec<ChunkModels>,
}

impl ModelArena {
    pub fn new(layout: MapLayout) -> Self {
        Self {
            layout,
            chunks: vec![ChunkModels::default(); layout.chunk_count()],
        }
    }

    #[inline]
    pub fn layout(&self) -> &MapLayout {
        &self.layout
    }

    #[inline]
    pub fn chunk(&self, c: ChunkCoord) -> &ChunkModels {
        &self.chunks[self.layout.chunk_index(c)]
    }

    #[inline]
    pub fn chunk_mut(&mut self, c: ChunkCoord) -> &mut ChunkModels {
        let i = self.layout.chunk_index(c);
        &mut self.chunks[i]
    }

    pub fn layer(&self, c: ChunkCoord, model_id: u32) -> Option<&ModelLayer> {
        self.chunk(c).get(model_id)
    }

    pub fn instance_count(&self) -> usize {
        self.chunks.iter().map(|c| c.instance_count()).sum()
    }
}
