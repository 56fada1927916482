use hashbrown::HashMap;
use tessera_mesh_cpu::AttributeLayout;

/// Opaque handle returned by a renderer for a registered mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u64);

/// Where finished buffers go. Buffers are never updated in place: a changed
/// mesh is unregistered and registered again.
pub trait RendererRegistry {
    fn register(&mut self, vertices: &[f32], indices: &[u32], layout: &AttributeLayout)
    -> MeshHandle;
    fn unregister(&mut self, handle: MeshHandle);
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegisteredMesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
    pub layout: AttributeLayout,
}

/// Keeps copies of registered buffers; used headless and in tests.
#[derive(Debug, Default)]
pub struct InMemoryRenderer {
    next: u64,
    meshes: HashMap<MeshHandle, RegisteredMesh>,
    pub registrations: u64,
    pub unregistrations: u64,
}

impl InMemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, h: MeshHandle) -> Option<&RegisteredMesh> {
        self.meshes.get(&h)
    }

    #[inline]
    pub fn live(&self) -> usize {
        self.meshes.len()
    }

    pub fn total_vertex_floats(&self) -> usize {
        self.meshes.values().map(|m| m.vertices.len()).sum()
    }
}

impl RendererRegistry for InMemoryRenderer {
    fn register(
        &mut self,
        vertices: &[f32],
        indices: &[u32],
        layout: &AttributeLayout,
    ) -> MeshHandle {
        self.next += 1;
        let h = MeshHandle(self.next);
        self.meshes.insert(
            h,
            RegisteredMesh {
                vertices: vertices.to_vec(),
                indices: indices.to_vec(),
                layout: layout.clone(),
            },
        );
        self.registrations += 1;
        h
    }

    fn unregister(&mut self, handle: MeshHandle) {
        if self.meshes.remove(&handle).is_some() {
            self.unregistrations += 1;
        } else {
            log::warn!(target: "commands", "unregister of unknown mesh {:?}", handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_unique_and_release() {
        let mut r = InMemoryRenderer::new();
        let l = AttributeLayout::pos_norm_uv3();
        let a = r.register(&[0.0; 9], &[0, 0, 0], &l);
        let b = r.register(&[1.0; 9], &[0, 0, 0], &l);
        assert_ne!(a, b);
        assert_eq!(r.live(), 2);
        r.unregister(a);
        r.unregister(a);
        assert_eq!((r.live(), r.unregistrations), (1, 1));
        assert_eq!(r.get(b).map(|m| m.vertices[0]), Some(1.0));
    }
}
