//! Positional terrain writes into a chunk's fixed-size buffer.

use rayon::prelude::*;
use tessera_geom::{TilePos, TileRect, Vec3};
use tessera_world::{ChunkCoord, HeightField, MapLayout, TileGrid};

use crate::catalog::{INDICES_PER_TILE, VERTS_PER_TILE, catalog};
use crate::classify::{TileClass, classify_tile};
use crate::layout::{AttributeLayout, MeshBuffer};

/// pos(3) + normal(3) + uv(3)
pub const TERRAIN_FLOATS_PER_VERTEX: usize = 9;
const FLOATS_PER_TILE: usize = VERTS_PER_TILE * TERRAIN_FLOATS_PER_VERTEX;

#[derive(Clone, Copy, Debug)]
pub struct TerrainParams {
    pub tile_width: f32,
    pub max_level: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerrainBuildStats {
    pub tiles: usize,
    pub misses: usize,
}

impl TerrainBuildStats {
    #[inline]
    pub fn merge(&mut self, other: TerrainBuildStats) {
        self.tiles += other.tiles;
        self.misses += other.misses;
    }
}

/// Result of one rect write: per-tile classes to fold back into the grid.
#[derive(Debug, Default)]
pub struct TerrainWrite {
    pub classes: Vec<(TilePos, TileClass)>,
    pub stats: TerrainBuildStats,
}

impl TerrainWrite {
    pub fn apply_to(&self, grid: &mut TileGrid) {
        for &(p, c) in &self.classes {
            let r = grid.get_mut(p);
            r.terrain_level = c.base;
            r.terrain_height = c.height;
            r.terrain_type = c.shape;
        }
    }
}

/// One chunk's terrain layer. Every tile owns a fixed slot, so the buffer is
/// always fully sized and never compacts.
#[derive(Clone, Debug)]
pub struct TerrainChunk {
    pub coord: ChunkCoord,
    chunk_width: usize,
    mesh: MeshBuffer,
}

impl TerrainChunk {
    pub fn new(coord: ChunkCoord, chunk_width: usize) -> Self {
        let tiles = chunk_width * chunk_width;
        Self {
            coord,
            chunk_width,
            mesh: MeshBuffer::zeroed(tiles * FLOATS_PER_TILE, tiles * INDICES_PER_TILE),
        }
    }

    #[inline]
    pub fn mesh(&self) -> &MeshBuffer {
        &self.mesh
    }

    #[inline]
    pub fn attribute_layout() -> AttributeLayout {
        AttributeLayout::pos_norm_uv3()
    }

    /// Vertex floats of one slot.
    #[inline]
    pub fn slot_vertices(&self, slot: usize) -> &[f32] {
        &self.mesh.vertices[slot * FLOATS_PER_TILE..(slot + 1) * FLOATS_PER_TILE]
    }

    /// Classifies and writes every tile of `rect` (map coordinates, fully
    /// inside this chunk). Rows of the chunk are written in parallel.
    pub fn write_rect(
        &mut self,
        layout: &MapLayout,
        field: &HeightField,
        params: TerrainParams,
        rect: TileRect,
    ) -> TerrainWrite {
        debug_assert!(
            layout.chunk_rect(self.coord).intersect(&rect) == Some(rect) || rect.is_empty(),
            "rect {:?} leaves chunk {:?}",
            rect,
            self.coord
        );
        if rect.is_empty() {
            return TerrainWrite::default();
        }
        let cw = self.chunk_width;
        let origin = layout.chunk_rect(self.coord);
        let lx0 = (rect.x - origin.x) as usize;
        let lx1 = lx0 + rect.w as usize;
        let ly0 = (rect.y - origin.y) as usize;
        let ly1 = ly0 + rect.h as usize;

        let rows: Vec<Vec<(TilePos, TileClass)>> = self
            .mesh
            .vertices
            .par_chunks_mut(cw * FLOATS_PER_TILE)
            .zip(self.mesh.indices.par_chunks_mut(cw * INDICES_PER_TILE))
            .enumerate()
            .filter(|(lx, _)| (lx0..lx1).contains(lx))
            .map(|(lx, (vrow, irow))| {
                let mut out = Vec::with_capacity(ly1 - ly0);
                for ly in ly0..ly1 {
                    let p = TilePos::new(origin.x + lx as i32, origin.y + ly as i32);
                    let class = classify_tile(field, p, params.max_level);
                    let slot = lx * cw + ly;
                    write_tile(
                        &mut vrow[ly * FLOATS_PER_TILE..(ly + 1) * FLOATS_PER_TILE],
                        &mut irow[ly * INDICES_PER_TILE..(ly + 1) * INDICES_PER_TILE],
                        p,
                        class,
                        slot,
                        params.tile_width,
                    );
                    out.push((p, class));
                }
                out
            })
            .collect();

        let classes: Vec<_> = rows.into_iter().flatten().collect();
        let misses = classes.iter().filter(|(_, c)| !c.matched).count();
        if misses > 0 {
            log::debug!(
                target: "terrain",
                "chunk ({}, {}) {} tile(s) fell back to flat",
                self.coord.cx,
                self.coord.cy,
                misses
            );
        }
        TerrainWrite {
            stats: TerrainBuildStats {
                tiles: classes.len(),
                misses,
            },
            classes,
        }
    }
}

fn write_tile(
    verts: &mut [f32],
    idx: &mut [u32],
    p: TilePos,
    class: TileClass,
    slot: usize,
    tile_width: f32,
) {
    let shape = catalog().get(class.shape);
    let offset = Vec3::new(p.x as f32, class.base as f32, p.y as f32);
    for v in 0..VERTS_PER_TILE {
        let pos = (shape.positions[v] + offset) * tile_width;
        let out = &mut verts[v * TERRAIN_FLOATS_PER_VERTEX..(v + 1) * TERRAIN_FLOATS_PER_VERTEX];
        out[0..3].copy_from_slice(&pos.to_array());
        out[3..6].copy_from_slice(&shape.normals[v].to_array());
        out[6..9].copy_from_slice(&shape.uvs[v].to_array());
    }
    let base = (slot * VERTS_PER_TILE) as u32;
    for (dst, &i) in idx.iter_mut().zip(shape.indices.iter()) {
        *dst = i + base;
    }
}

/// Builds every chunk's terrain over the whole map, chunks in parallel, and
/// refreshes the tile grid.
pub fn build_all_chunks(
    layout: &MapLayout,
    field: &HeightField,
    params: TerrainParams,
    grid: &mut TileGrid,
) -> (Vec<TerrainChunk>, TerrainBuildStats) {
    let cw = layout.chunk_width as usize;
    let coords: Vec<ChunkCoord> = layout.chunks().collect();
    let built: Vec<(TerrainChunk, TerrainWrite)> = coords
        .into_par_iter()
        .map(|c| {
            let mut chunk = TerrainChunk::new(c, cw);
            let write = chunk.write_rect(layout, field, params, layout.chunk_rect(c));
            (chunk, write)
        })
        .collect();
    let mut stats = TerrainBuildStats::default();
    let mut chunks = Vec::with_capacity(built.len());
    for (chunk, write) in built {
        write.apply_to(grid);
        stats.merge(write.stats);
        chunks.push(chunk);
    }
    (chunks, stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_field() -> HeightField {
        // 2x2 tiles; height rises with y
        let s = vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 0.0, 1.0, 2.0];
        HeightField::from_samples(2, s)
    }

    #[test]
    fn writes_translated_scaled_quads() {
        let layout = MapLayout::new(2, 2, 2);
        let field = ramp_field();
        let params = TerrainParams {
            tile_width: 4.0,
            max_level: 3,
        };
        let mut chunk = TerrainChunk::new(ChunkCoord::new(0, 0), 2);
        let w = chunk.write_rect(&layout, &field, params, TileRect::new(0, 0, 2, 2));
        assert_eq!(w.stats, TerrainBuildStats { tiles: 4, misses: 0 });

        // tile (1,1): corners at levels 1,1,2,2 -> ramp 0 on base 1, slot 3
        let (p, c) = w.classes[3];
        assert_eq!(p, TilePos::new(1, 1));
        assert_eq!((c.base, c.shape), (1, 3));
        let v = chunk.slot_vertices(3);
        assert_eq!(&v[0..3], &[4.0, 4.0, 4.0]);
        assert_eq!(&v[18..21], &[8.0, 8.0, 8.0]);
        assert_eq!(&v[6..9], &[0.0, 0.0, 0.0]);
        assert_eq!(&chunk.mesh().indices[18..24], &[12, 14, 13, 12, 15, 14]);
    }

    #[test]
    fn rewriting_is_idempotent() {
        let layout = MapLayout::new(2, 2, 2);
        let field = ramp_field();
        let params = TerrainParams {
            tile_width: 1.0,
            max_level: 3,
        };
        let mut chunk = TerrainChunk::new(ChunkCoord::new(0, 0), 2);
        chunk.write_rect(&layout, &field, params, TileRect::new(0, 0, 2, 2));
        let before = chunk.mesh().clone();
        chunk.write_rect(&layout, &field, params, TileRect::new(1, 0, 1, 2));
        assert_eq!(chunk.mesh(), &before);
    }

    #[test]
    fn build_all_updates_grid() {
        let layout = MapLayout::new(2, 2, 1);
        let field = ramp_field();
        let mut grid = TileGrid::new(layout);
        let params = TerrainParams {
            tile_width: 1.0,
            max_level: 3,
        };
        let (chunks, stats) = build_all_chunks(&layout, &field, params, &mut grid);
        assert_eq!(chunks.len(), 4);
        assert_eq!(stats.tiles, 4);
        let r = grid.get(TilePos::new(0, 1));
        assert_eq!((r.terrain_level, r.terrain_type, r.terrain_height), (1, 3, 0.5));
    }
}
