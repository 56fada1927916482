//! Map session runtime: owns terrain and model state, executes controller
//! commands and keeps the renderer's meshes in sync.
#![forbid(unsafe_code)]

mod command;
mod renderer;

use std::error::Error;
use std::time::Instant;

use hashbrown::HashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tessera_chunk::{ModelArena, ModelLayer};
use tessera_edit::{EditContext, EditReport, place_model, place_model_random, remove_models};
use tessera_geom::TileRect;
use tessera_mesh_cpu::{
    MeshBuffer, TerrainBuildStats, TerrainChunk, TerrainParams, build_all_chunks, build_skirt,
};
use tessera_models::ModelCatalog;
use tessera_world::{
    ChunkCoord, HeightField, MapConfig, MapLayout, TileGrid, generate_height_field,
};

pub use command::{Command, CommandOutcome};
pub use renderer::{InMemoryRenderer, MeshHandle, RegisteredMesh, RendererRegistry};

/// Identifies one registered mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKey {
    Terrain(ChunkCoord),
    Model(ChunkCoord, u32),
    Skirt,
}

/// Everything derived from one terrain generation.
pub struct MapState {
    pub layout: MapLayout,
    pub field: HeightField,
    pub grid: TileGrid,
    pub terrain: Vec<TerrainChunk>,
    pub models: ModelArena,
    pub skirt: MeshBuffer,
    pub stats: TerrainBuildStats,
}

impl MapState {
    #[inline]
    pub fn terrain_chunk(&self, c: ChunkCoord) -> &TerrainChunk {
        &self.terrain[self.layout.chunk_index(c)]
    }
}

pub struct Runtime<R: RendererRegistry> {
    config: MapConfig,
    catalog: ModelCatalog,
    renderer: R,
    pool: ThreadPool,
    map: Option<MapState>,
    handles: HashMap<MeshKey, MeshHandle>,
    scatter_rng: ChaCha8Rng,
}

impl<R: RendererRegistry> Runtime<R> {
    /// `threads == 0` lets rayon pick.
    pub fn new(
        config: MapConfig,
        catalog: ModelCatalog,
        renderer: R,
        threads: usize,
    ) -> Result<Self, Box<dyn Error>> {
        config.validate()?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("tessera-mesh-{i}"))
            .build()?;
        let mut scatter_rng = ChaCha8Rng::seed_from_u64(config.seed);
        scatter_rng.set_stream(1);
        Ok(Self {
            config,
            catalog,
            renderer,
            pool,
            map: None,
            handles: HashMap::new(),
            scatter_rng,
        })
    }

    /// Settings of the last generation. `chunk_width` is always the
    /// configured one; the current map's effective width is in its layout.
    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    #[inline]
    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    #[inline]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[inline]
    pub fn map(&self) -> Option<&MapState> {
        self.map.as_ref()
    }

    #[inline]
    pub fn handle(&self, key: MeshKey) -> Option<MeshHandle> {
        self.handles.get(&key).copied()
    }

    pub fn layer(&self, c: ChunkCoord, model_id: u32) -> Option<&ModelLayer> {
        self.map.as_ref()?.models.layer(c, model_id)
    }

    /// Executes one command. Commands that cannot apply are dropped with a
    /// reason and leave all state untouched.
    pub fn apply(&mut self, cmd: Command) -> CommandOutcome {
        let t0 = Instant::now();
        let name = cmd.name();
        let outcome = match cmd {
            Command::GenerateTerrain {
                map_size,
                max_height,
                roughness,
                max_depth,
            } => self.generate(map_size, max_height, roughness, max_depth),
            Command::PlaceModel { rect, model_id } => self.place(rect, model_id),
            Command::RemoveModel { rect } => self.remove(rect),
            Command::PlaceModelRandom { model_id, percent } => self.scatter(model_id, percent),
        };
        match &outcome {
            CommandOutcome::Applied => log::info!(
                target: "commands",
                "{} applied in {:.2} ms",
                name,
                t0.elapsed().as_secs_f64() * 1000.0
            ),
            CommandOutcome::Dropped { reason } => {
                log::warn!(target: "commands", "{} dropped: {}", name, reason)
            }
        }
        outcome
    }

    fn generate(
        &mut self,
        map_size: u32,
        max_height: i32,
        roughness: f32,
        max_depth: i32,
    ) -> CommandOutcome {
        let cfg = MapConfig {
            tile_dim: [map_size, map_size],
            chunk_width: self.config.chunk_width.min(map_size.max(1)),
            max_height,
            max_depth,
            roughness,
            ..self.config.clone()
        };
        let layout = match cfg.layout() {
            Ok(l) => l,
            Err(e) => return CommandOutcome::dropped(e.to_string()),
        };
        let field = match generate_height_field(&cfg) {
            Ok(f) => f,
            Err(e) => return CommandOutcome::dropped(e.to_string()),
        };
        let params = TerrainParams {
            tile_width: cfg.tile_width as f32,
            max_level: cfg.max_level(),
        };
        let mut grid = TileGrid::new(layout);
        let (terrain, stats) = self
            .pool
            .install(|| build_all_chunks(&layout, &field, params, &mut grid));
        let skirt = build_skirt(&layout, &field, params);
        log::info!(
            target: "terrain",
            "generated {}x{} tiles in {} chunk(s); {} catalog miss(es)",
            layout.tiles_x,
            layout.tiles_y,
            layout.chunk_count(),
            stats.misses
        );

        self.release_all();
        let terrain_layout = TerrainChunk::attribute_layout();
        for chunk in &terrain {
            let mesh = chunk.mesh();
            let h = self
                .renderer
                .register(&mesh.vertices, &mesh.indices, &terrain_layout);
            self.handles.insert(MeshKey::Terrain(chunk.coord), h);
        }
        let h = self
            .renderer
            .register(&skirt.vertices, &skirt.indices, &terrain_layout);
        self.handles.insert(MeshKey::Skirt, h);

        // The clamp above is per map; the configured chunk width stays.
        self.config = MapConfig {
            chunk_width: self.config.chunk_width,
            ..cfg
        };
        self.map = Some(MapState {
            layout,
            field,
            grid,
            terrain,
            models: ModelArena::new(layout),
            skirt,
            stats,
        });
        CommandOutcome::Applied
    }

    fn check_edit(&self, rect: Option<TileRect>, model_id: Option<u32>) -> Result<(), String> {
        let Some(map) = self.map.as_ref() else {
            return Err("no terrain generated yet".into());
        };
        if let Some(id) = model_id {
            if self.catalog.get(id).is_none() {
                return Err(format!(
                    "unknown model id {} ({} in catalog)",
                    id,
                    self.catalog.len()
                ));
            }
        }
        if let Some(r) = rect {
            if r.is_empty() {
                return Err(format!("empty rect {:?}", r));
            }
            if r.intersect(&map.layout.map_rect()).is_none() {
                return Err(format!("rect {:?} misses the map", r));
            }
        }
        Ok(())
    }

    fn place(&mut self, rect: TileRect, model_id: u32) -> CommandOutcome {
        if let Err(reason) = self.check_edit(Some(rect), Some(model_id)) {
            return CommandOutcome::dropped(reason);
        }
        self.edit(|ctx, grid, arena| place_model(ctx, grid, arena, rect, model_id))
    }

    fn remove(&mut self, rect: TileRect) -> CommandOutcome {
        if let Err(reason) = self.check_edit(Some(rect), None) {
            return CommandOutcome::dropped(reason);
        }
        self.edit(|ctx, grid, arena| remove_models(ctx, grid, arena, rect))
    }

    fn scatter(&mut self, model_id: u32, percent: f32) -> CommandOutcome {
        if !(percent.is_finite() && (0.0..=100.0).contains(&percent)) {
            return CommandOutcome::dropped(format!("percent {} outside [0, 100]", percent));
        }
        if let Err(reason) = self.check_edit(None, Some(model_id)) {
            return CommandOutcome::dropped(reason);
        }
        let mut rng = std::mem::replace(&mut self.scatter_rng, ChaCha8Rng::seed_from_u64(0));
        let outcome = self.edit(|ctx, grid, arena| {
            place_model_random(ctx, grid, arena, model_id, percent, &mut rng)
        });
        self.scatter_rng = rng;
        outcome
    }

    fn edit<F>(&mut self, f: F) -> CommandOutcome
    where
        F: FnOnce(&EditContext<'_>, &mut TileGrid, &mut ModelArena) -> EditReport,
    {
        let Some(map) = self.map.as_mut() else {
            return CommandOutcome::dropped("no terrain generated yet");
        };
        let ctx = EditContext {
            layout: &map.layout,
            catalog: &self.catalog,
            tile_width: self.config.tile_width as f32,
            max_depth: self.config.max_depth,
        };
        let report = f(&ctx, &mut map.grid, &mut map.models);
        log::info!(
            target: "models",
            "placed={} removed={} underwater={} layers={}",
            report.placed,
            report.removed,
            report.skipped_underwater,
            report.touched.len()
        );
        for &(chunk, model_id) in &report.touched {
            sync_layer(
                &mut self.renderer,
                &mut self.handles,
                &mut map.models,
                &self.catalog,
                chunk,
                model_id,
            );
        }
        CommandOutcome::Applied
    }

    fn release_all(&mut self) {
        let mut keys: Vec<(MeshKey, MeshHandle)> = self.handles.drain().collect();
        keys.sort();
        for (_, h) in keys {
            self.renderer.unregister(h);
        }
    }
}

/// Re-registers a changed layer; an emptied layer is dropped and its mesh
/// released.
fn sync_layer<R: RendererRegistry>(
    renderer: &mut R,
    handles: &mut HashMap<MeshKey, MeshHandle>,
    models: &mut ModelArena,
    catalog: &ModelCatalog,
    chunk: ChunkCoord,
    model_id: u32,
) {
    let key = MeshKey::Model(chunk, model_id);
    if let Some(old) = handles.remove(&key) {
        renderer.unregister(old);
    }
    let Some(layer) = models.layer(chunk, model_id) else {
        return;
    };
    if layer.occupancy().is_empty() {
        models.chunk_mut(chunk).drop_layer(model_id);
        log::debug!(
            target: "models",
            "chunk ({}, {}) model {} emptied",
            chunk.cx,
            chunk.cy,
            model_id
        );
        return;
    }
    let Some(template) = catalog.get(model_id) else {
        return;
    };
    let h = renderer.register(layer.live_vertices(), layer.live_indices(), &template.layout);
    handles.insert(key, h);
}
