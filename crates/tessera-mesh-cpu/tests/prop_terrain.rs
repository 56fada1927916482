use proptest::prelude::*;
use tessera_mesh_cpu::{
    SHAPE_COUNT, TERRAIN_FLOATS_PER_VERTEX, TerrainParams, build_all_chunks, catalog,
};
use tessera_world::{MapConfig, TileGrid, generate_height_field};

fn cfg(seed: u64, max_height: i32) -> MapConfig {
    MapConfig {
        tile_dim: [16, 16],
        chunk_width: 8,
        max_height,
        seed,
        ..MapConfig::default()
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // Each slot's indices point only at that slot's four vertices
    #[test]
    fn indices_stay_inside_their_slot(seed in any::<u64>(), max_height in 1i32..6) {
        let cfg = cfg(seed, max_height);
        let layout = cfg.layout().unwrap();
        let field = generate_height_field(&cfg).unwrap();
        let params = TerrainParams { tile_width: cfg.tile_width as f32, max_level: cfg.max_level() };
        let mut grid = TileGrid::new(layout);
        let (chunks, stats) = build_all_chunks(&layout, &field, params, &mut grid);
        prop_assert_eq!(stats.tiles, layout.tile_count());
        for chunk in &chunks {
            for (i, &ix) in chunk.mesh().indices.iter().enumerate() {
                let slot = (i / 6) as u32;
                prop_assert!(ix >= slot * 4 && ix < slot * 4 + 4);
            }
        }
        for r in grid.records() {
            prop_assert!((r.terrain_type as usize) < SHAPE_COUNT);
            prop_assert!(r.terrain_level >= 0 && r.terrain_level < cfg.max_level());
        }
    }

    // Same seed gives identical tile records and buffers
    #[test]
    fn terrain_is_deterministic(seed in any::<u64>()) {
        let cfg = cfg(seed, 4);
        let layout = cfg.layout().unwrap();
        let params = TerrainParams { tile_width: 4.0, max_level: cfg.max_level() };
        let run = || {
            let field = generate_height_field(&cfg).unwrap();
            let mut grid = TileGrid::new(layout);
            let (chunks, _) = build_all_chunks(&layout, &field, params, &mut grid);
            let verts: Vec<Vec<f32>> = chunks.iter().map(|c| c.mesh().vertices.clone()).collect();
            (grid.records().to_vec(), verts)
        };
        prop_assert_eq!(run(), run());
    }

    // Matched tiles sit at base + catalog key on every corner
    #[test]
    fn vertex_heights_follow_shape_keys(seed in any::<u64>()) {
        let cfg = cfg(seed, 3);
        let layout = cfg.layout().unwrap();
        let field = generate_height_field(&cfg).unwrap();
        let params = TerrainParams { tile_width: 1.0, max_level: cfg.max_level() };
        let mut grid = TileGrid::new(layout);
        let (chunks, _) = build_all_chunks(&layout, &field, params, &mut grid);
        for chunk in &chunks {
            for p in layout.chunk_rect(chunk.coord).tiles() {
                let rec = grid.get(p);
                let shape = catalog().get(rec.terrain_type);
                let v = chunk.slot_vertices(layout.slot_in_chunk(p));
                for (corner, &k) in shape.key.iter().enumerate() {
                    let y = v[corner * TERRAIN_FLOATS_PER_VERTEX + 1];
                    prop_assert_eq!(y, (rec.terrain_level + i32::from(k)) as f32);
                }
            }
        }
    }
}
