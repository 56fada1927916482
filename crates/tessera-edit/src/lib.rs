//! Rectangle edits: chunk dispatch and model placement/removal.
#![forbid(unsafe_code)]

pub mod dispatch;
pub mod placement;

pub use dispatch::{ChunkRect, split_rect};
pub use placement::{
    EditContext, EditReport, RemovalBatches, place_model, place_model_random, remove_models,
};
