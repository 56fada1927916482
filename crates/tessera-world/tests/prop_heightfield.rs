use proptest::prelude::*;
use tessera_world::{MapConfig, generate_height_field, normalize_height};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Same seed, same samples
    #[test]
    fn generation_is_deterministic(seed in any::<u64>(), pow in 1u32..6) {
        let side = 1u32 << pow;
        let cfg = MapConfig { tile_dim: [side, side], chunk_width: side, seed, ..MapConfig::default() };
        let a = generate_height_field(&cfg).unwrap();
        let b = generate_height_field(&cfg).unwrap();
        prop_assert_eq!(a.samples(), b.samples());
        prop_assert_eq!(a.samples().len(), ((side + 1) * (side + 1)) as usize);
    }

    // Every sample lands on a level in [0, max_level)
    #[test]
    fn levels_stay_in_range(seed in any::<u64>(), max_level in 1i32..10) {
        let cfg = MapConfig { tile_dim: [16, 16], chunk_width: 8, seed, ..MapConfig::default() };
        let f = generate_height_field(&cfg).unwrap();
        for &h in f.samples() {
            let l = normalize_height(h, f.min(), f.max(), max_level);
            prop_assert!((0..max_level).contains(&l));
        }
        prop_assert_eq!(normalize_height(f.max(), f.min(), f.max(), max_level), max_level - 1);
        prop_assert_eq!(normalize_height(f.min(), f.min(), f.max(), max_level), 0);
    }
}
