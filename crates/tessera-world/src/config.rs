use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::layout::MapLayout;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MapConfig {
    /// Tile count along x and y.
    #[serde(default = "default_tile_dim")]
    pub tile_dim: [u32; 2],
    /// World units per tile edge.
    #[serde(default = "default_tile_width")]
    pub tile_width: u32,
    /// Tiles per chunk edge.
    #[serde(default = "default_chunk_width")]
    pub chunk_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: i32,
    #[serde(default = "default_max_depth")]
    pub max_depth: i32,
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_tile_dim() -> [u32; 2] {
    [32, 32]
}
fn default_tile_width() -> u32 {
    4
}
fn default_chunk_width() -> u32 {
    32
}
fn default_max_height() -> i32 {
    4
}
fn default_max_depth() -> i32 {
    1
}
fn default_roughness() -> f32 {
    0.25
}
fn default_seed() -> u64 {
    34543
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_dim: default_tile_dim(),
            tile_width: default_tile_width(),
            chunk_width: default_chunk_width(),
            max_height: default_max_height(),
            max_depth: default_max_depth(),
            roughness: default_roughness(),
            seed: default_seed(),
        }
    }
}

impl MapConfig {
    /// Number of discrete terrain levels a normalized height maps into.
    #[inline]
    pub fn max_level(&self) -> i32 {
        self.max_height + self.max_depth
    }

    /// Checks everything generation depends on. Nothing is allocated for a
    /// config that fails here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let [tx, ty] = self.tile_dim;
        if tx == 0 || ty == 0 {
            return Err(ConfigError::EmptyMap);
        }
        if self.chunk_width == 0 || tx % self.chunk_width != 0 || ty % self.chunk_width != 0 {
            return Err(ConfigError::ChunkWidthMismatch {
                tile_dim: self.tile_dim,
                chunk_width: self.chunk_width,
            });
        }
        if tx != ty || !tx.is_power_of_two() {
            return Err(ConfigError::NotPowerOfTwoSquare {
                tile_dim: self.tile_dim,
            });
        }
        if self.tile_width == 0 {
            return Err(ConfigError::ZeroTileWidth);
        }
        if self.max_height < 0 || self.max_depth < 0 || self.max_level() < 1 {
            return Err(ConfigError::InvalidLevels {
                max_height: self.max_height,
                max_depth: self.max_depth,
            });
        }
        if !(self.roughness.is_finite() && self.roughness > 0.0) {
            return Err(ConfigError::InvalidRoughness(self.roughness));
        }
        Ok(())
    }

    pub fn layout(&self) -> Result<MapLayout, ConfigError> {
        self.validate()?;
        Ok(MapLayout::new(
            self.tile_dim[0] as i32,
            self.tile_dim[1] as i32,
            self.chunk_width as i32,
        ))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    EmptyMap,
    ChunkWidthMismatch { tile_dim: [u32; 2], chunk_width: u32 },
    NotPowerOfTwoSquare { tile_dim: [u32; 2] },
    ZeroTileWidth,
    InvalidLevels { max_height: i32, max_depth: i32 },
    InvalidRoughness(f32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyMap => write!(f, "map has no tiles"),
            ConfigError::ChunkWidthMismatch {
                tile_dim,
                chunk_width,
            } => write!(
                f,
                "tile dimension {}x{} is not divisible by chunk width {}",
                tile_dim[0], tile_dim[1], chunk_width
            ),
            ConfigError::NotPowerOfTwoSquare { tile_dim } => write!(
                f,
                "diamond-square needs a square power-of-two map, got {}x{}",
                tile_dim[0], tile_dim[1]
            ),
            ConfigError::ZeroTileWidth => write!(f, "tile width must be positive"),
            ConfigError::InvalidLevels {
                max_height,
                max_depth,
            } => write!(
                f,
                "invalid level range: max_height={} max_depth={}",
                max_height, max_depth
            ),
            ConfigError::InvalidRoughness(r) => write!(f, "roughness must be > 0, got {}", r),
        }
    }
}

impl Error for ConfigError {}

pub fn load_map_config_from_path(path: &Path) -> Result<MapConfig, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg = load_map_config_from_str(&s)?;
    Ok(cfg)
}

pub fn load_map_config_from_str(s: &str) -> Result<MapConfig, Box<dyn Error>> {
    let cfg: MapConfig = toml::from_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}
