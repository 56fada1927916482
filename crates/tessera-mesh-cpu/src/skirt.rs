//! Vertical ground wall around the map edge, from one tile below zero up to
//! the normalized edge height.

use tessera_geom::{TilePos, Vec3};
use tessera_world::{HeightField, MapLayout};

use crate::catalog::VERTS_PER_TILE;
use crate::layout::MeshBuffer;
use crate::terrain::{TERRAIN_FLOATS_PER_VERTEX, TerrainParams};

const SKIRT_UVS: [[f32; 3]; VERTS_PER_TILE] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
];

#[inline]
pub fn skirt_quad_count(layout: &MapLayout) -> usize {
    2 * (layout.tiles_x + layout.tiles_y) as usize
}

pub fn build_skirt(layout: &MapLayout, field: &HeightField, params: TerrainParams) -> MeshBuffer {
    let quads = skirt_quad_count(layout);
    let mut mesh = MeshBuffer {
        vertices: Vec::with_capacity(quads * VERTS_PER_TILE * TERRAIN_FLOATS_PER_VERTEX),
        indices: Vec::with_capacity(quads * 6),
    };
    let (tx, ty) = (layout.tiles_x, layout.tiles_y);
    let south = Vec3::new(0.0, 0.0, -1.0);
    let north = Vec3::new(0.0, 0.0, 1.0);
    let west = Vec3::new(-1.0, 0.0, 0.0);
    let east = Vec3::new(1.0, 0.0, 0.0);
    for i in 0..tx {
        push_wall(&mut mesh, field, params, TilePos::new(i, 0), TilePos::new(i + 1, 0), south);
        push_wall(&mut mesh, field, params, TilePos::new(i + 1, ty), TilePos::new(i, ty), north);
    }
    for i in 0..ty {
        push_wall(&mut mesh, field, params, TilePos::new(0, i + 1), TilePos::new(0, i), west);
        push_wall(&mut mesh, field, params, TilePos::new(tx, i), TilePos::new(tx, i + 1), east);
    }
    mesh
}

fn push_wall(
    mesh: &mut MeshBuffer,
    field: &HeightField,
    params: TerrainParams,
    a: TilePos,
    b: TilePos,
    normal: Vec3,
) {
    let tw = params.tile_width;
    let base = (mesh.vertices.len() / TERRAIN_FLOATS_PER_VERTEX) as u32;
    let top_a = field.level_at(a, params.max_level) as f32;
    let top_b = field.level_at(b, params.max_level) as f32;
    let corners = [
        Vec3::new(a.x as f32, -1.0, a.y as f32),
        Vec3::new(b.x as f32, -1.0, b.y as f32),
        Vec3::new(b.x as f32, top_b, b.y as f32),
        Vec3::new(a.x as f32, top_a, a.y as f32),
    ];
    for (c, uv) in corners.iter().zip(SKIRT_UVS.iter()) {
        mesh.vertices.extend_from_slice(&(*c * tw).to_array());
        mesh.vertices.extend_from_slice(&normal.to_array());
        mesh.vertices.extend_from_slice(uv);
    }
    mesh.indices
        .extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_quad_per_edge_tile() {
        let layout = MapLayout::new(4, 4, 2);
        let field = HeightField::new(4);
        let params = TerrainParams {
            tile_width: 2.0,
            max_level: 3,
        };
        let mesh = build_skirt(&layout, &field, params);
        assert_eq!(skirt_quad_count(&layout), 16);
        assert_eq!(mesh.vertices.len(), 16 * 4 * TERRAIN_FLOATS_PER_VERTEX);
        assert_eq!(mesh.indices.len(), 16 * 6);
        assert_eq!(&mesh.indices[6..12], &[4, 6, 5, 4, 7, 6]);
        // first wall starts one tile below ground at the origin
        assert_eq!(&mesh.vertices[0..3], &[0.0, -2.0, 0.0]);
    }

    #[test]
    fn walls_reach_edge_levels() {
        let layout = MapLayout::new(1, 1, 1);
        let field = HeightField::from_samples(1, vec![0.0, 0.0, 1.0, 1.0]);
        let params = TerrainParams {
            tile_width: 1.0,
            max_level: 2,
        };
        let mesh = build_skirt(&layout, &field, params);
        // south wall: a=(0,0) level 0, b=(1,0) level 1
        let top_b = &mesh.vertices[2 * TERRAIN_FLOATS_PER_VERTEX..2 * TERRAIN_FLOATS_PER_VERTEX + 3];
        assert_eq!(top_b, &[1.0, 1.0, 0.0]);
        let top_a = &mesh.vertices[3 * TERRAIN_FLOATS_PER_VERTEX..3 * TERRAIN_FLOATS_PER_VERTEX + 3];
        assert_eq!(top_a, &[0.0, 0.0, 0.0]);
    }
}
