//! CPU-side mesh buffers: the skinned input mesh and the baked output mesh.
//!
//! Buffers are plain vectors rather than GPU handles; the artifacts here go
//! to an asset sink, never to a device. Optional channels (normals,
//! tangents, uvs, colors) are empty vectors when the source mesh lacks
//! them, and are copied through the bake verbatim.

use glam::{Vec2, Vec3, Vec4};
use uuid::Uuid;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }
}

/// Up to four bone influences for one vertex, as loaded (unsorted).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexBoneWeights {
    pub indices: [u16; 4],
    pub weights: [f32; 4],
}

/// A skinned mesh as loaded from the source model.
#[derive(Debug, Clone)]
pub struct SkinnedMeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec4>,
    pub uvs: Vec<Vec2>,
    pub colors: Vec<Vec4>,
    pub indices: Vec<u32>,
    pub bounds: BoundingBox,
    /// One entry per vertex.
    pub bone_weights: Vec<VertexBoneWeights>,
}

impl SkinnedMeshData {
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// The repacked output mesh: source geometry plus two extra 4-component
/// vertex attributes carrying weight-sorted (bone index, weight) pairs.
///
/// In the source environment these bind to UV channel slots; any two free
/// vertex-attribute channels work.
#[derive(Debug, Clone)]
pub struct BakedMesh {
    pub uuid: Uuid,
    pub name: String,

    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec4>,
    pub uvs: Vec<Vec2>,
    pub colors: Vec<Vec4>,
    pub indices: Vec<u32>,
    pub bounds: BoundingBox,

    /// Per vertex: (index0, weight0, index1, weight1), heaviest pair first.
    pub bone_index_weights_01: Vec<Vec4>,
    /// Per vertex: (index2, weight2, index3, weight3).
    pub bone_index_weights_23: Vec<Vec4>,
}

impl BakedMesh {
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}
