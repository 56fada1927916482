use tessera_geom::{TilePos, TileRect};

use crate::layout::MapLayout;

/// Per-tile state. `model_type` is 0 for an empty tile, otherwise the
/// occupying model id plus one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TileRecord {
    pub terrain_level: i32,
    pub terrain_height: f32,
    pub terrain_type: u8,
    pub model_type: u32,
}

impl TileRecord {
    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.model_type != 0
    }

    /// Model id currently on the tile, if any.
    #[inline]
    pub fn model_id(&self) -> Option<u32> {
        self.model_type.checked_sub(1)
    }
}

#[derive(Clone, Debug)]
pub struct TileGrid {
    layout: MapLayout,
    records: Vec<TileRecord>,
}

impl TileGrid {
    pub fn new(layout: MapLayout) -> Self {
        Self {
            layout,
            records: vec![TileRecord::default(); layout.tile_count()],
        }
    }

    #[inline]
    pub fn layout(&self) -> &MapLayout {
        &self.layout
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn get(&self, p: TilePos) -> &TileRecord {
        &self.records[self.layout.tile_index(p)]
    }

    #[inline]
    pub fn get_mut(&mut self, p: TilePos) -> &mut TileRecord {
        let i = self.layout.tile_index(p);
        &mut self.records[i]
    }

    #[inline]
    pub fn records(&self) -> &[TileRecord] {
        &self.records
    }

    /// Number of tiles in `rect` (clipped to the map) carrying a model.
    pub fn occupied_in(&self, rect: &TileRect) -> usize {
        match rect.intersect(&self.layout.map_rect()) {
            Some(r) => r.tiles().filter(|&p| self.get(p).is_occupied()).count(),
            None => 0,
        }
    }

    /// Clears model occupancy on every tile, keeping terrain.
    pub fn clear_models(&mut self) {
        for r in &mut self.records {
            r.model_type = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_type_encodes_id_plus_one() {
        let mut r = TileRecord::default();
        assert_eq!(r.model_id(), None);
        r.model_type = 6;
        assert!(r.is_occupied());
        assert_eq!(r.model_id(), Some(5));
    }

    #[test]
    fn occupied_in_clips_to_map() {
        let mut g = TileGrid::new(MapLayout::new(8, 8, 4));
        g.get_mut(TilePos::new(0, 0)).model_type = 1;
        g.get_mut(TilePos::new(7, 7)).model_type = 2;
        assert_eq!(g.occupied_in(&TileRect::new(-4, -4, 20, 20)), 2);
        assert_eq!(g.occupied_in(&TileRect::new(1, 1, 2, 2)), 0);
        g.clear_models();
        assert_eq!(g.occupied_in(&g.layout().map_rect()), 0);
    }
}
