//! Hierarchy Compositor: turns per-bone local matrices into skinning
//! matrices, in place.
//!
//! The frame's matrix slice is both input and output: on entry it holds each
//! bone's local TRS matrix, on exit each bone's skinning matrix
//! (`world * inverse_bind`). Children must be visited while the slot still
//! holds the uncorrected world matrix, so the bind correction is written
//! only after recursion returns. The slice belongs to exactly one frame;
//! frames never share it.

use glam::Mat4;

use crate::errors::{BakeError, Result};
use crate::skeleton::Skeleton;

/// Composites one frame of local matrices into skinning matrices.
///
/// Pre-order over the bone tree from the root with an identity parent
/// world. Each bone's result depends only on its ancestor chain; sibling
/// order does not matter. `matrices` must have exactly one entry per bone.
pub fn compose_skinning_matrices(skeleton: &Skeleton, matrices: &mut [Mat4]) -> Result<()> {
    if matrices.len() != skeleton.bone_count() {
        return Err(BakeError::BoneCountMismatch {
            expected: skeleton.bone_count(),
            got: matrices.len(),
        });
    }

    compose_subtree(skeleton, skeleton.root(), Mat4::IDENTITY, matrices);
    Ok(())
}

fn compose_subtree(skeleton: &Skeleton, bone: usize, parent_world: Mat4, matrices: &mut [Mat4]) {
    let world = parent_world * matrices[bone];

    for &child in skeleton.children(bone) {
        compose_subtree(skeleton, child, world, matrices);
    }

    matrices[bone] = world * skeleton.inverse_bind(bone);
}
