//! Static table of the 19 tile shapes, keyed by canonical corner pattern.
//!
//! Corner order everywhere is SW `(x,y)`, SE `(x+1,y)`, NE `(x+1,y+1)`,
//! NW `(x,y+1)`. Template positions live in the unit tile; the builder
//! translates and scales them.

use std::collections::HashMap;
use std::sync::OnceLock;

use tessera_geom::Vec3;

pub const SHAPE_COUNT: usize = 19;
pub const VERTS_PER_TILE: usize = 4;
pub const INDICES_PER_TILE: usize = 6;
pub const FLAT: u8 = 0;

pub type CornerKey = [u8; 4];

const DEFAULT_TRIS: [u32; INDICES_PER_TILE] = [0, 2, 1, 0, 3, 2];
const ALT_TRIS: [u32; INDICES_PER_TILE] = [0, 3, 1, 1, 3, 2];

const UVS: [Vec3; VERTS_PER_TILE] = [
    Vec3::new(0.0, 0.0, 0.0),
    Vec3::new(1.0, 0.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(0.0, 1.0, 0.0),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Flat,
    Saddle,
    Ramp,
    SingleHigh,
    TripleHigh,
    Steep,
}

const SHAPES: [(ShapeKind, CornerKey); SHAPE_COUNT] = [
    (ShapeKind::Flat, [0, 0, 0, 0]),
    (ShapeKind::Saddle, [0, 1, 0, 1]),
    (ShapeKind::Saddle, [1, 0, 1, 0]),
    (ShapeKind::Ramp, [0, 0, 1, 1]),
    (ShapeKind::Ramp, [1, 1, 0, 0]),
    (ShapeKind::Ramp, [0, 1, 1, 0]),
    (ShapeKind::Ramp, [1, 0, 0, 1]),
    (ShapeKind::SingleHigh, [1, 0, 0, 0]),
    (ShapeKind::SingleHigh, [0, 0, 1, 0]),
    (ShapeKind::SingleHigh, [0, 1, 0, 0]),
    (ShapeKind::SingleHigh, [0, 0, 0, 1]),
    (ShapeKind::TripleHigh, [1, 1, 0, 1]),
    (ShapeKind::TripleHigh, [0, 1, 1, 1]),
    (ShapeKind::TripleHigh, [1, 1, 1, 0]),
    (ShapeKind::TripleHigh, [1, 0, 1, 1]),
    (ShapeKind::Steep, [2, 1, 0, 1]),
    (ShapeKind::Steep, [1, 2, 1, 0]),
    (ShapeKind::Steep, [0, 1, 2, 1]),
    (ShapeKind::Steep, [1, 0, 1, 2]),
];

#[derive(Clone, Debug, PartialEq)]
pub struct TileShape {
    pub id: u8,
    pub kind: ShapeKind,
    pub key: CornerKey,
    pub positions: [Vec3; VERTS_PER_TILE],
    pub normals: [Vec3; VERTS_PER_TILE],
    pub uvs: [Vec3; VERTS_PER_TILE],
    pub indices: [u32; INDICES_PER_TILE],
}

impl TileShape {
    fn build(id: u8, kind: ShapeKind, key: CornerKey) -> Self {
        let k = key.map(f32::from);
        let positions = [
            Vec3::new(0.0, k[0], 0.0),
            Vec3::new(1.0, k[1], 0.0),
            Vec3::new(1.0, k[2], 1.0),
            Vec3::new(0.0, k[3], 1.0),
        ];
        // Split along the diagonal that keeps the raised corners on one fold.
        let alt = match kind {
            ShapeKind::Saddle | ShapeKind::SingleHigh => key[0] == 1 || key[2] == 1,
            ShapeKind::TripleHigh => key[0] == 0 || key[2] == 0,
            ShapeKind::Flat | ShapeKind::Ramp | ShapeKind::Steep => false,
        };
        Self {
            id,
            kind,
            key,
            positions,
            normals: [Vec3::UP; VERTS_PER_TILE],
            uvs: UVS,
            indices: if alt { ALT_TRIS } else { DEFAULT_TRIS },
        }
    }

    /// Mean corner offset above the tile's base level.
    #[inline]
    pub fn mean_height(&self) -> f32 {
        self.key.iter().map(|&v| f32::from(v)).sum::<f32>() / 4.0
    }
}

pub struct ShapeCatalog {
    shapes: Vec<TileShape>,
    by_key: HashMap<CornerKey, u8>,
}

impl ShapeCatalog {
    fn new() -> Self {
        let shapes: Vec<TileShape> = SHAPES
            .iter()
            .enumerate()
            .map(|(i, &(kind, key))| TileShape::build(i as u8, kind, key))
            .collect();
        let by_key = shapes.iter().map(|s| (s.key, s.id)).collect();
        Self { shapes, by_key }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    #[inline]
    pub fn get(&self, id: u8) -> &TileShape {
        &self.shapes[id as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileShape> {
        self.shapes.iter()
    }

    /// Exact, order-sensitive match of a canonical corner pattern.
    pub fn lookup(&self, canonical: [i32; 4]) -> Option<u8> {
        let mut key = [0u8; 4];
        for (dst, &v) in key.iter_mut().zip(canonical.iter()) {
            *dst = u8::try_from(v).ok().filter(|&b| b <= 2)?;
        }
        self.by_key.get(&key).copied()
    }
}

pub fn catalog() -> &'static ShapeCatalog {
    static CATALOG: OnceLock<ShapeCatalog> = OnceLock::new();
    CATALOG.get_or_init(ShapeCatalog::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pattern_resolves_to_its_own_entry() {
        let c = catalog();
        assert_eq!(c.len(), SHAPE_COUNT);
        for s in c.iter() {
            let key = s.key.map(i32::from);
            assert_eq!(c.lookup(key), Some(s.id));
        }
    }

    #[test]
    fn shapes_carry_four_vertices_and_two_triangles() {
        for s in catalog().iter() {
            assert_eq!(s.uvs, UVS);
            assert!(s.normals.iter().all(|&n| n == Vec3::UP));
            assert!(s.indices.iter().all(|&i| (i as usize) < VERTS_PER_TILE));
            for (v, &k) in s.positions.iter().zip(s.key.iter()) {
                assert_eq!(v.y, f32::from(k));
            }
        }
    }

    #[test]
    fn triangle_split_per_kind() {
        let c = catalog();
        assert_eq!(c.get(0).indices, DEFAULT_TRIS);
        // saddle with raised SW/NE uses the alternate split
        assert_eq!(c.get(2).indices, ALT_TRIS);
        assert_eq!(c.get(1).indices, DEFAULT_TRIS);
        assert_eq!(c.get(7).indices, ALT_TRIS);
        assert_eq!(c.get(9).indices, DEFAULT_TRIS);
        // triple-high with a low SW or NE
        assert_eq!(c.get(12).indices, ALT_TRIS);
        assert_eq!(c.get(14).indices, DEFAULT_TRIS);
        assert_eq!(c.get(15).indices, DEFAULT_TRIS);
    }

    #[test]
    fn unknown_patterns_miss() {
        let c = catalog();
        assert_eq!(c.lookup([1, 1, 1, 1]), None);
        assert_eq!(c.lookup([3, 0, 0, 0]), None);
        assert_eq!(c.lookup([0, 2, 0, 0]), None);
        assert_eq!(c.lookup([-1, 0, 0, 0]), None);
    }
}
