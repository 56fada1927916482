use proptest::prelude::*;
use tessera_chunk::{DenseSlotMap, ModelLayer};
use tessera_geom::Vec3;
use tessera_models::{ModelTemplate, default_layout};

#[derive(Clone, Debug)]
enum Op {
    Insert(usize),
    Remove(usize),
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![(0usize..16).prop_map(Op::Insert), (0usize..16).prop_map(Op::Remove)],
        0..80,
    )
}

fn quad() -> ModelTemplate {
    let mut v = Vec::new();
    for i in 0..4 {
        v.extend_from_slice(&[i as f32, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    }
    ModelTemplate::new("quad", default_layout(), v, vec![0, 2, 1, 0, 3, 2]).unwrap()
}

proptest! {
    // Forward and inverse maps stay exact inverses over 0..len
    #[test]
    fn maps_stay_inverse(ops in ops()) {
        let mut m = DenseSlotMap::new();
        let mut model = std::collections::BTreeSet::new();
        for op in ops {
            match op {
                Op::Insert(k) => if model.insert(k) { m.insert(k); },
                Op::Remove(k) => {
                    let was = model.remove(&k);
                    prop_assert_eq!(m.remove(&k, |_, _| {}).is_some(), was);
                }
            }
            prop_assert!(m.is_consistent());
            prop_assert_eq!(m.len(), model.len());
            for slot in 0..m.len() {
                let k = m.key_at(slot).unwrap();
                prop_assert_eq!(m.slot_of(&k), Some(slot));
            }
            prop_assert_eq!(m.key_at(m.len()), None);
        }
    }

    // Each live slot carries exactly the geometry inserted for its tile
    #[test]
    fn layer_payload_follows_its_tile(ops in ops()) {
        let t = quad();
        let mut layer = ModelLayer::new(0, &t, 16);
        let origin = |tile: usize| Vec3::new(0.0, tile as f32 * 3.0, 0.0);
        for op in ops {
            match op {
                Op::Insert(k) => if !layer.contains(k) { layer.insert(k, origin(k), &t); },
                Op::Remove(k) => { layer.remove(k); }
            }
            for (slot, tile) in layer.ledger().iter() {
                let v = layer.slot_vertices(slot);
                prop_assert_eq!(v[1], tile as f32 * 3.0);
                prop_assert_eq!(v[0], 0.0);
                prop_assert_eq!(v[8], 1.0);
            }
            let idx = layer.live_indices();
            prop_assert_eq!(idx.len(), layer.len() * 6);
            prop_assert!(idx.iter().all(|&i| (i as usize) < layer.len() * 4));
        }
    }
}
