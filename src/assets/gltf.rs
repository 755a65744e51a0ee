//! glTF input loading.
//!
//! Pulls the three bake inputs out of a .gltf/.glb file: the skeleton
//! (skin 0 defines bone order, parent links, and inverse bind matrices),
//! the animation clips (channels targeting joints become typed tracks), and
//! the first skinned primitive's vertex buffers.

use std::path::Path;

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::animation::{
    AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta,
};
use crate::errors::{BakeError, Result};
use crate::mesh::{BoundingBox, SkinnedMeshData, VertexBoneWeights};
use crate::skeleton::{BoneDesc, Skeleton};

/// Everything the two bake pipelines consume.
#[derive(Debug)]
pub struct LoadedModel {
    pub skeleton: Skeleton,
    pub clips: Vec<AnimationClip>,
    pub mesh: SkinnedMeshData,
}

/// Loads skeleton, clips, and skinned mesh from one glTF file.
pub fn load_model(path: &Path) -> Result<LoadedModel> {
    let (document, buffers, _images) = gltf::import(path)?;

    let skeleton = load_skeleton(&document, &buffers, path)?;
    let clips = load_clips(&document, &buffers, &skeleton);
    let mesh = load_skinned_mesh(&document, &buffers)?;

    Ok(LoadedModel {
        skeleton,
        clips,
        mesh,
    })
}

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

fn load_skeleton(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    path: &Path,
) -> Result<Skeleton> {
    let skin = document
        .skins()
        .next()
        .ok_or_else(|| BakeError::MissingSkin(path.display().to_string()))?;

    let joints: Vec<gltf::Node> = skin.joints().collect();
    if joints.is_empty() {
        return Err(BakeError::MissingSkin(format!(
            "skin in {} has no joints",
            path.display()
        )));
    }

    let reader = skin.reader(|buffer| Some(&*buffers[buffer.index()]));
    let ibms: Vec<Mat4> = match reader.read_inverse_bind_matrices() {
        Some(iter) => iter.map(|m| Mat4::from_cols_array_2d(&m)).collect(),
        None => vec![Mat4::IDENTITY; joints.len()],
    };

    // Joint order defines bone indices. Parent links come from the node
    // graph, restricted to nodes that are themselves joints.
    let joint_by_node: FxHashMap<usize, usize> = joints
        .iter()
        .enumerate()
        .map(|(joint, node)| (node.index(), joint))
        .collect();

    let mut parents: Vec<Option<usize>> = vec![None; joints.len()];
    for (joint, node) in joints.iter().enumerate() {
        for child in node.children() {
            if let Some(&child_joint) = joint_by_node.get(&child.index()) {
                parents[child_joint] = Some(joint);
            }
        }
    }

    let descs: Vec<BoneDesc> = joints
        .iter()
        .enumerate()
        .map(|(joint, node)| BoneDesc {
            name: node_name(node),
            parent: parents[joint],
            inverse_bind: ibms.get(joint).copied().unwrap_or(Mat4::IDENTITY),
        })
        .collect();

    let name = skin.name().unwrap_or("Skeleton");
    Skeleton::new(name, descs)
}

fn load_clips(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    skeleton: &Skeleton,
) -> Vec<AnimationClip> {
    // Channels are matched to bones through the same path convention the
    // skeleton derives, so resolution later is exact.
    let mut path_by_node: FxHashMap<usize, &str> = FxHashMap::default();
    if let Some(skin) = document.skins().next() {
        for (node, bone) in skin.joints().zip(skeleton.bones()) {
            path_by_node.insert(node.index(), bone.path.as_str());
        }
    }

    let mut clips = Vec::new();

    for (anim_index, anim) in document.animations().enumerate() {
        let mut tracks = Vec::new();

        for channel in anim.channels() {
            let target = channel.target();
            let Some(&bone_path) = path_by_node.get(&target.node().index()) else {
                // Animates a node outside the skinned hierarchy.
                continue;
            };

            let reader = channel.reader(|buffer| Some(&*buffers[buffer.index()]));
            let Some(times) = reader.read_inputs().map(|iter| iter.collect::<Vec<f32>>()) else {
                continue;
            };

            let interpolation = match channel.sampler().interpolation() {
                gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                gltf::animation::Interpolation::Step => InterpolationMode::Step,
                gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
            };

            let Some(outputs) = reader.read_outputs() else {
                continue;
            };

            let track = match outputs {
                gltf::animation::util::ReadOutputs::Translations(iter) => Track {
                    meta: TrackMeta {
                        bone_path: bone_path.to_string(),
                        target: TargetPath::Translation,
                    },
                    data: TrackData::Vector3(KeyframeTrack::new(
                        times,
                        iter.map(Vec3::from_array).collect(),
                        interpolation,
                    )),
                },
                gltf::animation::util::ReadOutputs::Rotations(iter) => Track {
                    meta: TrackMeta {
                        bone_path: bone_path.to_string(),
                        target: TargetPath::Rotation,
                    },
                    data: TrackData::Quaternion(KeyframeTrack::new(
                        times,
                        iter.into_f32().map(Quat::from_array).collect(),
                        interpolation,
                    )),
                },
                gltf::animation::util::ReadOutputs::Scales(iter) => Track {
                    meta: TrackMeta {
                        bone_path: bone_path.to_string(),
                        target: TargetPath::Scale,
                    },
                    data: TrackData::Vector3(KeyframeTrack::new(
                        times,
                        iter.map(Vec3::from_array).collect(),
                        interpolation,
                    )),
                },
                // Morph target weights are not part of a skinning bake.
                gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => continue,
            };

            tracks.push(track);
        }

        let name = anim
            .name()
            .map_or_else(|| format!("Clip_{anim_index}"), str::to_string);
        clips.push(AnimationClip::new(name, tracks));
    }

    clips
}

fn load_skinned_mesh(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<SkinnedMeshData> {
    for mesh in document.meshes() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&*buffers[buffer.index()]));

            let (Some(joints), Some(weights)) = (reader.read_joints(0), reader.read_weights(0))
            else {
                continue;
            };

            let positions: Vec<Vec3> = reader
                .read_positions()
                .ok_or_else(|| {
                    BakeError::GltfError(format!(
                        "skinned primitive of mesh '{}' has no positions",
                        mesh.name().unwrap_or("Mesh")
                    ))
                })?
                .map(Vec3::from_array)
                .collect();

            let bone_weights: Vec<VertexBoneWeights> = joints
                .into_u16()
                .zip(weights.into_f32())
                .map(|(indices, weights)| VertexBoneWeights { indices, weights })
                .collect();

            let normals: Vec<Vec3> = reader
                .read_normals()
                .map(|iter| iter.map(Vec3::from_array).collect())
                .unwrap_or_default();
            let tangents: Vec<Vec4> = reader
                .read_tangents()
                .map(|iter| iter.map(Vec4::from_array).collect())
                .unwrap_or_default();
            let uvs: Vec<Vec2> = reader
                .read_tex_coords(0)
                .map(|iter| iter.into_f32().map(Vec2::from_array).collect())
                .unwrap_or_default();
            let colors: Vec<Vec4> = reader
                .read_colors(0)
                .map(|iter| iter.into_rgba_f32().map(Vec4::from_array).collect())
                .unwrap_or_default();

            let indices: Vec<u32> = reader
                .read_indices()
                .map(|iter| iter.into_u32().collect())
                .unwrap_or_else(|| (0..positions.len() as u32).collect());

            let bounds = BoundingBox::from_points(&positions);

            return Ok(SkinnedMeshData {
                name: mesh.name().unwrap_or("Mesh").to_string(),
                positions,
                normals,
                tangents,
                uvs,
                colors,
                indices,
                bounds,
                bone_weights,
            });
        }
    }

    Err(BakeError::GltfError(
        "no skinned primitive (JOINTS_0/WEIGHTS_0) found".to_string(),
    ))
}
