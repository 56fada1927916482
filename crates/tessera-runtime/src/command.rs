use std::fmt;

use tessera_geom::TileRect;

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Regenerates a square map of `map_size` tiles per side.
    GenerateTerrain {
        map_size: u32,
        max_height: i32,
        roughness: f32,
        max_depth: i32,
    },
    PlaceModel {
        rect: TileRect,
        model_id: u32,
    },
    RemoveModel {
        rect: TileRect,
    },
    /// Scatters a model over the whole map, `percent` in `[0, 100]`.
    PlaceModelRandom {
        model_id: u32,
        percent: f32,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::GenerateTerrain { .. } => "GenerateTerrain",
            Command::PlaceModel { .. } => "PlaceModel",
            Command::RemoveModel { .. } => "RemoveModel",
            Command::PlaceModelRandom { .. } => "PlaceModelRandom",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    Dropped { reason: String },
}

impl CommandOutcome {
    pub(crate) fn dropped(reason: impl Into<String>) -> Self {
        CommandOutcome::Dropped {
            reason: reason.into(),
        }
    }

    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Applied => write!(f, "applied"),
            CommandOutcome::Dropped { reason } => write!(f, "dropped: {}", reason),
        }
    }
}
