use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Semantic {
    Position,
    Normal,
    Tangent,
    Color,
    TexCoord0,
    TexCoord1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct VertexAttribute {
    pub semantic: Semantic,
    /// Float components of this attribute (1..=4).
    pub dimension: u8,
}

/// Interleaved float vertex format, attributes in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AttributeLayout {
    pub attributes: Vec<VertexAttribute>,
}

impl AttributeLayout {
    /// Position, normal and a 3-component UV; the terrain format.
    pub fn pos_norm_uv3() -> Self {
        Self {
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
                    dimension: 3,
                },
            ],
        }
    }

    #[inline]
    pub fn floats_per_vertex(&self) -> usize {
        self.attributes.iter().map(|a| a.dimension as usize).sum()
    }

    /// Float offset of `semantic` inside one vertex.
    pub fn offset_of(&self, semantic: Semantic) -> Option<usize> {
        let mut off = 0;
        for a in &self.attributes {
            if a.semantic == semantic {
                return Some(off);
            }
            off += a.dimension as usize;
        }
        None
    }
}

/// Flat interleaved vertex floats plus `u32` triangle indices.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshBuffer {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshBuffer {
    pub fn zeroed(vertex_floats: usize, index_count: usize) -> Self {
        Self {
            vertices: vec![0.0; vertex_floats],
            indices: vec![0; index_count],
        }
    }
}
