//! Vertex repacking tests
//!
//! Tests for:
//! - Descending weight order across both output records
//! - Preservation of the per-vertex (index, weight) multiset and weight sum
//! - Stable ordering of exact weight ties
//! - Verbatim geometry copy

use glam::{Vec2, Vec3, Vec4};

use skinbake::mesh::{BoundingBox, SkinnedMeshData, VertexBoneWeights};
use skinbake::bake_skinned_mesh;

fn weights(indices: [u16; 4], weights: [f32; 4]) -> VertexBoneWeights {
    VertexBoneWeights { indices, weights }
}

fn mesh_with(bone_weights: Vec<VertexBoneWeights>) -> SkinnedMeshData {
    let n = bone_weights.len();
    let positions: Vec<Vec3> = (0..n).map(|i| Vec3::splat(i as f32)).collect();
    let bounds = BoundingBox::from_points(&positions);
    SkinnedMeshData {
        name: "test_mesh".to_string(),
        positions,
        normals: vec![Vec3::Y; n],
        tangents: vec![Vec4::new(1.0, 0.0, 0.0, 1.0); n],
        uvs: vec![Vec2::new(0.25, 0.75); n],
        colors: vec![Vec4::ONE; n],
        indices: (0..n as u32).collect(),
        bounds,
        bone_weights,
    }
}

/// Flattens a vertex's two packed records back into (index, weight) pairs.
fn unpack(a: Vec4, b: Vec4) -> [(u16, f32); 4] {
    [
        (a.x as u16, a.y),
        (a.z as u16, a.w),
        (b.x as u16, b.y),
        (b.z as u16, b.w),
    ]
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn weights_are_sorted_descending() {
    let mesh = mesh_with(vec![
        weights([0, 1, 2, 3], [0.1, 0.6, 0.2, 0.1]),
        weights([4, 5, 6, 7], [0.7, 0.1, 0.1, 0.1]),
        weights([8, 9, 10, 11], [0.05, 0.15, 0.3, 0.5]),
    ]);

    let baked = bake_skinned_mesh(&mesh);

    for vertex in 0..3 {
        let pairs = unpack(
            baked.bone_index_weights_01[vertex],
            baked.bone_index_weights_23[vertex],
        );
        for pair in pairs.windows(2) {
            assert!(
                pair[0].1 >= pair[1].1,
                "vertex {vertex}: {pairs:?} not descending"
            );
        }
    }

    // Spot-check the first vertex: (0.6, 0.2, 0.1, 0.1) with indices along.
    let pairs = unpack(baked.bone_index_weights_01[0], baked.bone_index_weights_23[0]);
    assert_eq!(pairs[0], (1, 0.6));
    assert_eq!(pairs[1], (2, 0.2));
    assert_eq!(pairs[2], (0, 0.1));
    assert_eq!(pairs[3], (3, 0.1));
}

#[test]
fn exact_ties_keep_input_order() {
    let mesh = mesh_with(vec![weights([7, 2, 9, 3], [0.4, 0.4, 0.1, 0.1])]);
    let baked = bake_skinned_mesh(&mesh);

    let pairs = unpack(baked.bone_index_weights_01[0], baked.bone_index_weights_23[0]);
    assert_eq!(pairs[0], (7, 0.4));
    assert_eq!(pairs[1], (2, 0.4));
    assert_eq!(pairs[2], (9, 0.1));
    assert_eq!(pairs[3], (3, 0.1));
}

// ============================================================================
// Preservation
// ============================================================================

#[test]
fn multiset_and_weight_sum_are_preserved() {
    let inputs = vec![
        weights([0, 1, 2, 3], [0.1, 0.6, 0.2, 0.1]),
        weights([12, 4, 30, 7], [0.25, 0.25, 0.25, 0.25]),
        weights([5, 0, 0, 0], [1.0, 0.0, 0.0, 0.0]),
    ];
    let mesh = mesh_with(inputs.clone());
    let baked = bake_skinned_mesh(&mesh);

    for (vertex, input) in inputs.iter().enumerate() {
        let mut expected: Vec<(u16, f32)> = input
            .indices
            .iter()
            .zip(input.weights.iter())
            .map(|(&i, &w)| (i, w))
            .collect();
        let mut got = unpack(
            baked.bone_index_weights_01[vertex],
            baked.bone_index_weights_23[vertex],
        )
        .to_vec();

        let key = |p: &(u16, f32)| (p.0, p.1.to_bits());
        expected.sort_by_key(key);
        got.sort_by_key(key);
        assert_eq!(expected, got, "vertex {vertex} multiset changed");

        let sum_in: f32 = input.weights.iter().sum();
        let sum_out = baked.bone_index_weights_01[vertex].y
            + baked.bone_index_weights_01[vertex].w
            + baked.bone_index_weights_23[vertex].y
            + baked.bone_index_weights_23[vertex].w;
        assert!((sum_in - sum_out).abs() < 1e-6);
    }
}

// ============================================================================
// Geometry copy
// ============================================================================

#[test]
fn geometry_is_copied_verbatim() {
    let mesh = mesh_with(vec![
        weights([0, 1, 2, 3], [0.4, 0.3, 0.2, 0.1]),
        weights([1, 2, 3, 0], [0.9, 0.1, 0.0, 0.0]),
    ]);
    let baked = bake_skinned_mesh(&mesh);

    assert_eq!(baked.positions, mesh.positions);
    assert_eq!(baked.normals, mesh.normals);
    assert_eq!(baked.tangents, mesh.tangents);
    assert_eq!(baked.uvs, mesh.uvs);
    assert_eq!(baked.colors, mesh.colors);
    assert_eq!(baked.indices, mesh.indices);
    assert_eq!(baked.bounds, mesh.bounds);
    assert_eq!(baked.name, mesh.name);
    assert_eq!(baked.vertex_count(), mesh.vertex_count());
}
