use tessera_geom::TilePos;
use tessera_world::HeightField;

use crate::catalog::{FLAT, catalog};

/// Classification of a single tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileClass {
    /// Lowest normalized corner level.
    pub base: i32,
    pub shape: u8,
    /// Mean canonical corner offset above `base`.
    pub height: f32,
    /// False when the corner pattern had no catalog entry and fell back to flat.
    pub matched: bool,
}

/// Normalized levels of the SW, SE, NE and NW corners of tile `p`.
#[inline]
pub fn corner_levels(field: &HeightField, p: TilePos, max_level: i32) -> [i32; 4] {
    [p, p.east(), p.north_east(), p.north()].map(|c| field.level_at(c, max_level))
}

pub fn classify_levels(levels: [i32; 4]) -> TileClass {
    let base = levels.iter().copied().min().unwrap_or(0);
    let canonical = levels.map(|l| l - base);
    let height = canonical.iter().sum::<i32>() as f32 / 4.0;
    match catalog().lookup(canonical) {
        Some(shape) => TileClass {
            base,
            shape,
            height,
            matched: true,
        },
        None => TileClass {
            base,
            shape: FLAT,
            height,
            matched: false,
        },
    }
}

#[inline]
pub fn classify_tile(field: &HeightField, p: TilePos, max_level: i32) -> TileClass {
    classify_levels(corner_levels(field, p, max_level))
}
