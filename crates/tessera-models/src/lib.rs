//! Placeable model templates and the catalog they are looked up in.
#![forbid(unsafe_code)]

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use hashbrown::HashMap;
use serde::Deserialize;
use tessera_mesh_cpu::{AttributeLayout, Semantic, VertexAttribute};

/// Immutable per-instance geometry. Vertices are interleaved per `layout`.
#[derive(Clone, Debug, PartialEq)]
pub struct ModelTemplate {
    pub name: String,
    pub vertex_count: usize,
    pub index_count: usize,
    pub layout: AttributeLayout,
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl ModelTemplate {
    pub fn new(
        name: impl Into<String>,
        layout: AttributeLayout,
        vertices: Vec<f32>,
        indices: Vec<u32>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        let stride = layout.floats_per_vertex();
        // Instances translate three position floats in place.
        if let Some(a) = layout.attributes.iter().find(|a| {
            !(1..=4).contains(&a.dimension) || (a.semantic == Semantic::Position && a.dimension != 3)
        }) {
            return Err(ModelError::BadAttribute {
                name,
                semantic: a.semantic,
                dimension: a.dimension,
            });
        }
        if layout.offset_of(Semantic::Position).is_none() {
            return Err(ModelError::MissingPosition { name });
        }
        if stride == 0 || vertices.len() % stride != 0 {
            return Err(ModelError::RaggedVertices {
                name,
                floats: vertices.len(),
                stride,
            });
        }
        let vertex_count = vertices.len() / stride;
        if vertex_count == 0 {
            return Err(ModelError::Empty { name });
        }
        if let Some(&bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(ModelError::IndexOutOfRange {
                name,
                index: bad,
                vertex_count,
            });
        }
        Ok(Self {
            name,
            vertex_count,
            index_count: indices.len(),
            layout,
            vertices,
            indices,
        })
    }

    #[inline]
    pub fn floats_per_instance(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.layout.floats_per_vertex()
    }

    /// Float offset of the position attribute inside a vertex.
    #[inline]
    pub fn position_offset(&self) -> usize {
        self.layout.offset_of(Semantic::Position).unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModelError {
    MissingPosition { name: String },
    BadAttribute { name: String, semantic: Semantic, dimension: u8 },
    RaggedVertices { name: String, floats: usize, stride: usize },
    Empty { name: String },
    IndexOutOfRange { name: String, index: u32, vertex_count: usize },
    DuplicateName(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::MissingPosition { name } => {
                write!(f, "model '{}' has no position attribute", name)
            }
            ModelError::BadAttribute {
                name,
                semantic,
                dimension,
            } => write!(
                f,
                "model '{}': {:?} attribute cannot have {} component(s)",
                name, semantic, dimension
            ),
            ModelError::RaggedVertices {
                name,
                floats,
                stride,
            } => write!(
                f,
                "model '{}': {} vertex floats is not a multiple of stride {}",
                name, floats, stride
            ),
            ModelError::Empty { name } => write!(f, "model '{}' has no vertices", name),
            ModelError::IndexOutOfRange {
                name,
                index,
                vertex_count,
            } => write!(
                f,
                "model '{}': index {} out of range for {} vertices",
                name, index, vertex_count
            ),
            ModelError::DuplicateName(n) => write!(f, "duplicate model name '{}'", n),
        }
    }
}

impl Error for ModelError {}

#[derive(Clone, Debug, Default)]
pub struct ModelCatalog {
    models: Vec<ModelTemplate>,
    by_name: HashMap<String, u32>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a template; its id is its position in the catalog.
    pub fn push(&mut self, model: ModelTemplate) -> Result<u32, ModelError> {
        if self.by_name.contains_key(&model.name) {
            return Err(ModelError::DuplicateName(model.name));
        }
        let id = self.models.len() as u32;
        self.by_name.insert(model.name.clone(), id);
        self.models.push(model);
        Ok(id)
    }

    #[inline]
    pub fn get(&self, id: u32) -> Option<&ModelTemplate> {
        self.models.get(id as usize)
    }

    pub fn id_by_name(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &ModelTemplate)> {
        self.models.iter().enumerate().map(|(i, m)| (i as u32, m))
    }

    pub fn from_toml_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: ModelsConfig = toml::from_str(s)?;
        let mut catalog = ModelCatalog::new();
        for def in cfg.models {
            let layout = def.layout.unwrap_or_else(default_layout);
            let model = ModelTemplate::new(def.name, layout, def.vertices, def.indices)?;
            catalog.push(model)?;
        }
        log::info!(target: "models", "loaded {} model template(s)", catalog.len());
        Ok(catalog)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// A few primitive props, used when no catalog file is given.
    pub fn builtin() -> Self {
        let mut c = ModelCatalog::new();
        for m in [marker(), crate_box(), pyramid()] {
            if let Err(e) = c.push(m) {
                log::error!(target: "models", "builtin model rejected: {}", e);
            }
        }
        c
    }
}

/// Position(3), normal(3), uv(2).
pub fn default_layout() -> AttributeLayout {
    AttributeLayout {
        attributes: vec![
            VertexAttribute {
                semantic: Semantic::Position,
                dimension: 3,
            },
            VertexAttribute {
                semantic: Semantic::Normal,
                dimension: 3,
            },
            VertexAttribute {
                semantic: Semantic::TexCoord0,
                dimension: 2,
            },
        ],
    }
}

// --- Config ---

#[derive(Deserialize)]
struct ModelsConfig {
    #[serde(default)]
    models: Vec<ModelDef>,
}

#[derive(Deserialize)]
struct ModelDef {
    name: String,
    #[serde(default)]
    layout: Option<AttributeLayout>,
    vertices: Vec<f32>,
    indices: Vec<u32>,
}

// --- Builtins ---

fn build(name: &str, verts: &[[f32; 8]], indices: &[u32]) -> ModelTemplate {
    let vertices: Vec<f32> = verts.iter().flatten().copied().collect();
    let vertex_count = verts.len();
    ModelTemplate {
        name: name.to_string(),
        vertex_count,
        index_count: indices.len(),
        layout: default_layout(),
        vertices,
        indices: indices.to_vec(),
    }
}

fn marker() -> ModelTemplate {
    let h = 0.25;
    build(
        "marker",
        &[
            [-h, 0.01, -h, 0.0, 1.0, 0.0, 0.0, 0.0],
            [h, 0.01, -h, 0.0, 1.0, 0.0, 1.0, 0.0],
            [h, 0.01, h, 0.0, 1.0, 0.0, 1.0, 1.0],
            [-h, 0.01, h, 0.0, 1.0, 0.0, 0.0, 1.0],
        ],
        &[0, 2, 1, 0, 3, 2],
    )
}

fn crate_box() -> ModelTemplate {
    let h = 0.4;
    let n = 0.577_35;
    let mut verts = Vec::with_capacity(8);
    for &y in &[0.0f32, 2.0 * h] {
        for &(x, z) in &[(-h, -h), (h, -h), (h, h), (-h, h)] {
            let ny = if y == 0.0 { -n } else { n };
            let (nx, nz) = (x.signum() * n, z.signum() * n);
            let (u, v) = (if x < 0.0 { 0.0 } else { 1.0 }, if z < 0.0 { 0.0 } else { 1.0 });
            verts.push([x, y, z, nx, ny, nz, u, v]);
        }
    }
    build(
        "crate",
        &verts,
        &[
            0, 1, 2, 0, 2, 3, // bottom
            4, 6, 5, 4, 7, 6, // top
            0, 4, 5, 0, 5, 1, // south
            1, 5, 6, 1, 6, 2, // east
            2, 6, 7, 2, 7, 3, // north
            3, 7, 4, 3, 4, 0, // west
        ],
    )
}

fn pyramid() -> ModelTemplate {
    let h = 0.5;
    build(
        "pyramid",
        &[
            [-h, 0.0, -h, -0.5, 0.5, -0.5, 0.0, 0.0],
            [h, 0.0, -h, 0.5, 0.5, -0.5, 1.0, 0.0],
            [h, 0.0, h, 0.5, 0.5, 0.5, 1.0, 1.0],
            [-h, 0.0, h, -0.5, 0.5, 0.5, 0.0, 1.0],
            [0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.5, 0.5],
        ],
        &[0, 4, 1, 1, 4, 2, 2, 4, 3, 3, 4, 0, 0, 1, 2, 0, 2, 3],
    )
}
