//! The two bake entry points.
//!
//! `bake_matrix_texture` runs the full texture pipeline: sample each bone's
//! local curves per frame, composite the hierarchy in place, and pack the
//! skinning matrices into a palette texture. `bake_skinned_mesh` is the
//! independent mesh pipeline: a pure repack of per-vertex bone weights into
//! two extra vertex attributes. Both run to completion or fail outright;
//! there are no partial artifacts and no retries.

use std::cmp::Ordering;

use glam::{Mat4, Vec4};
use half::f16;
use uuid::Uuid;

use crate::compositor::compose_skinning_matrices;
use crate::errors::{BakeError, Result};
use crate::mesh::{BakedMesh, SkinnedMeshData};
use crate::sampler::CurveSampler;
use crate::skeleton::Skeleton;
use crate::texture::{MatrixPaletteTexture, PIXELS_PER_MATRIX, palette_texture_size};
use crate::animation::AnimationClip;

/// Sampling rate used when the caller does not specify one.
pub const DEFAULT_TARGET_FPS: f32 = 30.0;

/// The frame instants a bake at `target_fps` visits: `t = k / target_fps`
/// for integer `k` while `t < duration`.
///
/// Integer stepping keeps the half-open bound exact; a `duration` of 1.0 at
/// 30 fps yields exactly 30 frames (t = 0, 1/30, .., 29/30). Frame count is
/// derived from this same rule, so texture capacity always matches what the
/// pack loop emits.
///
/// Non-finite inputs yield no frames; an infinite or NaN bound would never
/// stop the loop.
#[must_use]
pub fn frame_times(duration: f32, target_fps: f32) -> Vec<f32> {
    let mut times = Vec::new();
    if !duration.is_finite() || !target_fps.is_finite() || target_fps <= 0.0 {
        return times;
    }
    for k in 0u32.. {
        let t = k as f32 / target_fps;
        if t >= duration {
            break;
        }
        times.push(t);
    }
    times
}

/// Bakes `clip` against `skeleton` into a matrix palette texture.
///
/// Time-major, then bone-index-major: for each frame, each bone emits 3
/// RGBA16F texels holding rows 0..3 of its skinning matrix. Texels past the
/// payload stay zero.
pub fn bake_matrix_texture(
    skeleton: &Skeleton,
    clip: &AnimationClip,
    target_fps: f32,
) -> Result<MatrixPaletteTexture> {
    // NaN and +inf durations are constructible from malformed keyframe
    // times; both would make the frame loop unbounded.
    if !clip.duration.is_finite() || clip.duration <= 0.0 {
        return Err(BakeError::EmptyClip(format!(
            "clip '{}' has duration {}",
            clip.name, clip.duration
        )));
    }

    let times = frame_times(clip.duration, target_fps);
    if times.is_empty() {
        return Err(BakeError::EmptyClip(format!(
            "clip '{}' yields no frames at {target_fps} fps",
            clip.name
        )));
    }

    let bone_count = skeleton.bone_count();
    let frame_count = times.len();
    let pixel_count = (bone_count * frame_count) as u32 * PIXELS_PER_MATRIX;
    let (width, height) = palette_texture_size(pixel_count);

    let mut pixels = vec![f16::ZERO; (width * height * 4) as usize];
    let mut sampler = CurveSampler::new(clip, skeleton);
    let mut matrices = vec![Mat4::IDENTITY; bone_count];
    let mut cursor = 0usize;

    for &t in &times {
        for (bone, slot) in matrices.iter_mut().enumerate() {
            *slot = sampler.local_matrix(bone, t)?;
        }

        compose_skinning_matrices(skeleton, &mut matrices)?;

        for matrix in &matrices {
            for row in 0..3 {
                let r: Vec4 = matrix.row(row);
                pixels[cursor] = f16::from_f32(r.x);
                pixels[cursor + 1] = f16::from_f32(r.y);
                pixels[cursor + 2] = f16::from_f32(r.z);
                pixels[cursor + 3] = f16::from_f32(r.w);
                cursor += 4;
            }
        }
    }

    log::info!(
        "baked '{}': pixels_per_frame = {}, frame_count = {}",
        clip.name,
        bone_count as u32 * PIXELS_PER_MATRIX,
        frame_count
    );

    Ok(MatrixPaletteTexture::new(
        &clip.name,
        width,
        height,
        pixels,
        bone_count as u32,
        frame_count as u32,
    ))
}

/// Repacks `mesh` for palette-texture skinning.
///
/// Geometry is copied verbatim. Each vertex's four (bone index, weight)
/// pairs are stable-sorted by descending weight and split across two Vec4
/// attributes; the pair multiset and the weight sum are unchanged, only the
/// order moves. Exact weight ties keep their input order.
#[must_use]
pub fn bake_skinned_mesh(mesh: &SkinnedMeshData) -> BakedMesh {
    let mut bone_index_weights_01 = Vec::with_capacity(mesh.vertex_count());
    let mut bone_index_weights_23 = Vec::with_capacity(mesh.vertex_count());

    for vertex in &mesh.bone_weights {
        let mut pairs: [(u16, f32); 4] = [
            (vertex.indices[0], vertex.weights[0]),
            (vertex.indices[1], vertex.weights[1]),
            (vertex.indices[2], vertex.weights[2]),
            (vertex.indices[3], vertex.weights[3]),
        ];
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        bone_index_weights_01.push(Vec4::new(
            f32::from(pairs[0].0),
            pairs[0].1,
            f32::from(pairs[1].0),
            pairs[1].1,
        ));
        bone_index_weights_23.push(Vec4::new(
            f32::from(pairs[2].0),
            pairs[2].1,
            f32::from(pairs[3].0),
            pairs[3].1,
        ));
    }

    BakedMesh {
        uuid: Uuid::new_v4(),
        name: mesh.name.clone(),
        positions: mesh.positions.clone(),
        normals: mesh.normals.clone(),
        tangents: mesh.tangents.clone(),
        uvs: mesh.uvs.clone(),
        colors: mesh.colors.clone(),
        indices: mesh.indices.clone(),
        bounds: mesh.bounds,
        bone_index_weights_01,
        bone_index_weights_23,
    }
}
