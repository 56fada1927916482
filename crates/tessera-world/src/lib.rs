//! Map configuration, chunk layout, height synthesis and per-tile state.
#![forbid(unsafe_code)]

pub mod config;
pub mod heightfield;
pub mod layout;
pub mod tiles;

pub use config::{ConfigError, MapConfig, load_map_config_from_path, load_map_config_from_str};
pub use heightfield::{
    HeightField, Jitter, SeededJitter, generate_diamond_square, normalize_height,
};
pub use layout::{ChunkCoord, MapLayout};
pub use tiles::{TileGrid, TileRecord};

/// Builds a fresh height field for `cfg` from its seed.
pub fn generate_height_field(cfg: &MapConfig) -> Result<HeightField, ConfigError> {
    cfg.validate()?;
    let mut field = HeightField::new(cfg.tile_dim[0] as usize);
    let mut jitter = SeededJitter::new(cfg.seed);
    generate_diamond_square(&mut field, cfg.roughness, &mut jitter);
    Ok(field)
}
