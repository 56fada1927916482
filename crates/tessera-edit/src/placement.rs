//! Model placement and removal over tile rectangles, one chunk at a time.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use tessera_chunk::{ModelArena, instance_origin};
use tessera_geom::{TilePos, TileRect};
use tessera_models::ModelCatalog;
use tessera_world::{ChunkCoord, MapLayout, TileGrid};

use crate::dispatch::{ChunkRect, split_rect};

/// Read-only inputs shared by every edit.
#[derive(Clone, Copy)]
pub struct EditContext<'a> {
    pub layout: &'a MapLayout,
    pub catalog: &'a ModelCatalog,
    pub tile_width: f32,
    /// Tiles whose terrain level is below this are underwater.
    pub max_depth: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditReport {
    pub placed: usize,
    pub removed: usize,
    pub skipped_underwater: usize,
    /// Layers whose buffers changed and need re-registration.
    pub touched: BTreeSet<(ChunkCoord, u32)>,
}

impl EditReport {
    pub fn merge(&mut self, other: EditReport) {
        self.placed += other.placed;
        self.removed += other.removed;
        self.skipped_underwater += other.skipped_underwater;
        self.touched.extend(other.touched);
    }
}

/// Tiles queued for removal per model id, flushed once a chunk is done.
#[derive(Debug, Default)]
pub struct RemovalBatches {
    per_model: BTreeMap<u32, Vec<usize>>,
}

impl RemovalBatches {
    #[inline]
    pub fn queue(&mut self, model_id: u32, tile_index: usize) {
        self.per_model.entry(model_id).or_default().push(tile_index);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.per_model.is_empty()
    }

    /// Removes every queued tile from its layer in `chunk`.
    pub fn flush(&mut self, arena: &mut ModelArena, chunk: ChunkCoord, report: &mut EditReport) {
        for (model_id, tiles) in std::mem::take(&mut self.per_model) {
            let Some(layer) = arena.chunk_mut(chunk).get_mut(model_id) else {
                continue;
            };
            let mut n = 0;
            for t in tiles {
                if layer.remove(t) {
                    n += 1;
                }
            }
            if n > 0 {
                report.removed += n;
                report.touched.insert((chunk, model_id));
            }
        }
    }
}

fn place_in_chunk<F: FnMut(TilePos) -> bool>(
    ctx: &EditContext<'_>,
    grid: &mut TileGrid,
    arena: &mut ModelArena,
    part: ChunkRect,
    model_id: u32,
    mut want: F,
    report: &mut EditReport,
) {
    let Some(template) = ctx.catalog.get(model_id) else {
        return;
    };
    let capacity = ctx.layout.chunk_tile_count();
    let tag = model_id + 1;
    let mut batches = RemovalBatches::default();
    for p in part.rect.tiles() {
        if !want(p) {
            continue;
        }
        let rec = *grid.get(p);
        if rec.terrain_level < ctx.max_depth {
            report.skipped_underwater += 1;
            continue;
        }
        if rec.model_type == tag {
            continue;
        }
        let tile_index = ctx.layout.tile_index(p);
        if let Some(old) = rec.model_id() {
            batches.queue(old, tile_index);
        }
        grid.get_mut(p).model_type = tag;
        let layer = arena
            .chunk_mut(part.chunk)
            .layer_mut(model_id, template, capacity);
        if layer.contains(tile_index) {
            continue;
        }
        layer.insert(tile_index, instance_origin(p, &rec, ctx.tile_width), template);
        report.placed += 1;
        report.touched.insert((part.chunk, model_id));
    }
    batches.flush(arena, part.chunk, report);
}

fn remove_in_chunk(
    ctx: &EditContext<'_>,
    grid: &mut TileGrid,
    arena: &mut ModelArena,
    part: ChunkRect,
    report: &mut EditReport,
) {
    let mut batches = RemovalBatches::default();
    for p in part.rect.tiles() {
        let rec = grid.get_mut(p);
        if let Some(old) = rec.model_id() {
            rec.model_type = 0;
            batches.queue(old, ctx.layout.tile_index(p));
        }
    }
    batches.flush(arena, part.chunk, report);
}

/// Places `model_id` on every dry tile of `rect`, replacing other models.
pub fn place_model(
    ctx: &EditContext<'_>,
    grid: &mut TileGrid,
    arena: &mut ModelArena,
    rect: TileRect,
    model_id: u32,
) -> EditReport {
    let mut report = EditReport::default();
    let parts = split_rect(ctx.layout, rect);
    log::debug!(target: "models", "place model {} over {:?} in {} chunk(s)", model_id, rect, parts.len());
    for part in parts {
        place_in_chunk(ctx, grid, arena, part, model_id, |_| true, &mut report);
    }
    report
}

/// Clears every model in `rect`.
pub fn remove_models(
    ctx: &EditContext<'_>,
    grid: &mut TileGrid,
    arena: &mut ModelArena,
    rect: TileRect,
) -> EditReport {
    let mut report = EditReport::default();
    let parts = split_rect(ctx.layout, rect);
    log::debug!(target: "models", "clear models over {:?} in {} chunk(s)", rect, parts.len());
    for part in parts {
        remove_in_chunk(ctx, grid, arena, part, &mut report);
    }
    report
}

/// Scatters `model_id` over the whole map: each tile, in scan order, draws
/// once from `rng` and is placed on when the draw is under `percent / 100`.
pub fn place_model_random<R: Rng>(
    ctx: &EditContext<'_>,
    grid: &mut TileGrid,
    arena: &mut ModelArena,
    model_id: u32,
    percent: f32,
    rng: &mut R,
) -> EditReport {
    let chance = (percent / 100.0).clamp(0.0, 1.0);
    let mut report = EditReport::default();
    for part in split_rect(ctx.layout, ctx.layout.map_rect()) {
        place_in_chunk(
            ctx,
            grid,
            arena,
            part,
            model_id,
            |_| rng.random::<f32>() < chance,
            &mut report,
        );
    }
    report
}
