use tessera_geom::{TilePos, Vec3};
use tessera_mesh_cpu::MeshBuffer;
use tessera_models::ModelTemplate;
use tessera_world::TileRecord;

use crate::slotmap::DenseSlotMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerOccupancy {
    Empty,
    Populated,
}

impl LayerOccupancy {
    #[inline]
    pub fn is_empty(self) -> bool {
        matches!(self, LayerOccupancy::Empty)
    }
}

/// World-space anchor of a model on tile `p`: tile centre, resting on the
/// tile's mean surface height.
#[inline]
pub fn instance_origin(p: TilePos, rec: &TileRecord, tile_width: f32) -> Vec3 {
    Vec3::new(
        p.x as f32 * tile_width + tile_width / 2.0,
        (rec.terrain_level as f32 + rec.terrain_height) * tile_width,
        p.y as f32 * tile_width + tile_width / 2.0,
    )
}

/// Instances of one model inside one chunk. Slot `s` owns vertex floats
/// `[s * fpi, (s + 1) * fpi)` and an index block equal to the template's
/// indices shifted by `s * vertex_count`.
#[derive(Clone, Debug)]
pub struct ModelLayer {
    pub model_id: u32,
    capacity: usize,
    floats_per_instance: usize,
    indices_per_instance: usize,
    ledger: DenseSlotMap<usize>,
    mesh: MeshBuffer,
}

impl ModelLayer {
    /// Pre-sizes the buffer for `capacity` instances so it never grows.
    pub fn new(model_id: u32, template: &ModelTemplate, capacity: usize) -> Self {
        let fpi = template.floats_per_instance();
        Self {
            model_id,
            capacity,
            floats_per_instance: fpi,
            indices_per_instance: template.index_count,
            ledger: DenseSlotMap::with_capacity(capacity),
            mesh: MeshBuffer::zeroed(capacity * fpi, capacity * template.index_count),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ledger.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn occupancy(&self) -> LayerOccupancy {
        if self.ledger.is_empty() {
            LayerOccupancy::Empty
        } else {
            LayerOccupancy::Populated
        }
    }

    #[inline]
    pub fn contains(&self, tile_index: usize) -> bool {
        self.ledger.contains(&tile_index)
    }

    #[inline]
    pub fn ledger(&self) -> &DenseSlotMap<usize> {
        &self.ledger
    }

    #[inline]
    pub fn slot_vertices(&self, slot: usize) -> &[f32] {
        let f = self.floats_per_instance;
        &self.mesh.vertices[slot * f..(slot + 1) * f]
    }

    /// Vertex floats of the live range.
    #[inline]
    pub fn live_vertices(&self) -> &[f32] {
        &self.mesh.vertices[..self.len() * self.floats_per_instance]
    }

    #[inline]
    pub fn live_indices(&self) -> &[u32] {
        &self.mesh.indices[..self.len() * self.indices_per_instance]
    }

    /// Appends an instance of `template` translated by `origin`.
    pub fn insert(&mut self, tile_index: usize, origin: Vec3, template: &ModelTemplate) -> usize {
        assert!(
            self.len() < self.capacity,
            "model layer {} full at {} instances",
            self.model_id,
            self.capacity
        );
        debug_assert_eq!(template.floats_per_instance(), self.floats_per_instance);
        let slot = self.ledger.insert(tile_index);

        let f = self.floats_per_instance;
        let stride = template.stride();
        let pos = template.position_offset();
        let dst = &mut self.mesh.vertices[slot * f..(slot + 1) * f];
        dst.copy_from_slice(&template.vertices);
        for v in dst.chunks_exact_mut(stride) {
            v[pos] += origin.x;
            v[pos + 1] += origin.y;
            v[pos + 2] += origin.z;
        }

        let n = self.indices_per_instance;
        let shift = (slot * template.vertex_count) as u32;
        for (d, &i) in self.mesh.indices[slot * n..(slot + 1) * n]
            .iter_mut()
            .zip(template.indices.iter())
        {
            *d = i + shift;
        }
        slot
    }

    /// Swap-removes the instance on `tile_index`; the last instance's vertex
    /// block fills the hole. Index blocks are positional and stay put.
    pub fn remove(&mut self, tile_index: usize) -> bool {
        let f = self.floats_per_instance;
        let vertices = &mut self.mesh.vertices;
        self.ledger
            .remove(&tile_index, |from, to| {
                vertices.copy_within(from * f..(from + 1) * f, to * f);
            })
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_models::default_layout;

    fn stick() -> ModelTemplate {
        ModelTemplate::new(
            "stick",
            default_layout(),
            vec![
                0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0,
            ],
            vec![0, 1, 1],
        )
        .unwrap()
    }

    #[test]
    fn insert_translates_positions_and_shifts_indices() {
        let t = stick();
        let mut l = ModelLayer::new(0, &t, 4);
        l.insert(7, Vec3::new(2.0, 0.0, 0.0), &t);
        let slot = l.insert(9, Vec3::new(10.0, 5.0, 20.0), &t);
        assert_eq!(slot, 1);
        let v = l.slot_vertices(1);
        assert_eq!(&v[0..3], &[10.0, 5.0, 20.0]);
        assert_eq!(&v[8..11], &[10.0, 6.0, 20.0]);
        // normals untouched
        assert_eq!(&v[3..6], &[0.0, 1.0, 0.0]);
        assert_eq!(l.live_indices(), &[0, 1, 1, 2, 3, 3]);
        assert_eq!(l.occupancy(), LayerOccupancy::Populated);
    }

    #[test]
    fn remove_compacts_live_range() {
        let t = stick();
        let mut l = ModelLayer::new(0, &t, 4);
        for (i, tile) in [3usize, 4, 5].into_iter().enumerate() {
            l.insert(tile, Vec3::new(i as f32, 0.0, 0.0), &t);
        }
        let last = l.slot_vertices(2).to_vec();
        assert!(l.remove(3));
        assert_eq!(l.len(), 2);
        assert_eq!(l.slot_vertices(0), &last[..]);
        assert_eq!(l.ledger().slot_of(&5), Some(0));
        assert_eq!(l.live_vertices().len(), 2 * 16);
        assert!(!l.remove(3));
        assert!(l.remove(5));
        assert!(l.remove(4));
        assert!(l.occupancy().is_empty());
    }

    #[test]
    fn origin_sits_on_tile_centre() {
        let rec = TileRecord {
            terrain_level: 2,
            terrain_height: 0.5,
            ..TileRecord::default()
        };
        let o = instance_origin(TilePos::new(3, 1), &rec, 4.0);
        assert_eq!(o, Vec3::new(14.0, 10.0, 6.0));
    }
}
