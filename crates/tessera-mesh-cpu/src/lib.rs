//! CPU terrain meshing: tile-shape catalog, corner classification, chunk
//! terrain buffers and the map-edge skirt.
#![forbid(unsafe_code)]

pub mod catalog;
pub mod classify;
pub mod layout;
pub mod skirt;
pub mod terrain;

pub use catalog::{
    CornerKey, FLAT, INDICES_PER_TILE, SHAPE_COUNT, ShapeCatalog, ShapeKind, TileShape,
    VERTS_PER_TILE, catalog,
};
pub use classify::{TileClass, classify_levels, classify_tile, corner_levels};
pub use layout::{AttributeLayout, MeshBuffer, Semantic, VertexAttribute};
pub use skirt::{build_skirt, skirt_quad_count};
pub use terrain::{
    TERRAIN_FLOATS_PER_VERTEX, TerrainBuildStats, TerrainChunk, TerrainParams, TerrainWrite,
    build_all_chunks,
};
