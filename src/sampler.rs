//! Curve Sampler: evaluates a clip's per-bone transform curves.
//!
//! Track lookup happens once, at construction: each track's bone path is
//! matched against the skeleton's bone paths and the result is a typed
//! per-bone channel table. Sampling itself never touches a string. Tracks
//! whose path matches no bone animate nodes outside the skinned hierarchy
//! and are ignored.

use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::{AnimationClip, KeyframeCursor, KeyframeTrack, TargetPath, TrackData};
use crate::errors::{BakeError, Result};
use crate::skeleton::Skeleton;

/// A sampled rotation shorter than this is considered degenerate.
const MIN_ROTATION_LENGTH_SQ: f32 = 1e-12;

#[derive(Default, Clone, Copy)]
struct BoneChannels<'clip> {
    translation: Option<&'clip KeyframeTrack<Vec3>>,
    rotation: Option<&'clip KeyframeTrack<Quat>>,
    scale: Option<&'clip KeyframeTrack<Vec3>>,
}

#[derive(Default, Clone)]
struct BoneCursors {
    translation: KeyframeCursor,
    rotation: KeyframeCursor,
    scale: KeyframeCursor,
}

/// Samples per-bone local TRS matrices from one clip against one skeleton.
///
/// Holds per-channel keyframe cursors, so one sampler serves one forward
/// sweep through the clip; build a fresh sampler per bake.
pub struct CurveSampler<'clip> {
    channels: Vec<BoneChannels<'clip>>,
    cursors: Vec<BoneCursors>,
}

impl<'clip> CurveSampler<'clip> {
    /// Resolves `(bone path, channel)` to tracks for every bone.
    #[must_use]
    pub fn new(clip: &'clip AnimationClip, skeleton: &Skeleton) -> Self {
        let bone_by_path: FxHashMap<&str, usize> = skeleton
            .bones()
            .iter()
            .enumerate()
            .map(|(i, bone)| (bone.path.as_str(), i))
            .collect();

        let mut channels = vec![BoneChannels::default(); skeleton.bone_count()];

        for track in &clip.tracks {
            let Some(&bone) = bone_by_path.get(track.meta.bone_path.as_str()) else {
                continue;
            };
            let slot = &mut channels[bone];
            match (track.meta.target, &track.data) {
                (TargetPath::Translation, TrackData::Vector3(t)) => slot.translation = Some(t),
                (TargetPath::Scale, TrackData::Vector3(t)) => slot.scale = Some(t),
                (TargetPath::Rotation, TrackData::Quaternion(t)) => slot.rotation = Some(t),
                // Mistyped track data for the target; nothing to sample.
                _ => {}
            }
        }

        let cursors = vec![BoneCursors::default(); skeleton.bone_count()];
        Self { channels, cursors }
    }

    /// Returns `bone`'s local TRS matrix at `time`.
    ///
    /// Absent channels evaluate to their identity (translation zero,
    /// rotation identity, scale one). The sampled rotation is renormalized;
    /// a (near-)zero-length rotation aborts with
    /// [`BakeError::DegenerateRotation`].
    pub fn local_matrix(&mut self, bone: usize, time: f32) -> Result<Mat4> {
        let channels = &self.channels[bone];
        let cursors = &mut self.cursors[bone];

        let translation = channels
            .translation
            .map_or(Vec3::ZERO, |t| t.sample_with_cursor(time, &mut cursors.translation));

        let raw_rotation = channels
            .rotation
            .map_or(Quat::IDENTITY, |t| t.sample_with_cursor(time, &mut cursors.rotation));
        if raw_rotation.length_squared() < MIN_ROTATION_LENGTH_SQ {
            return Err(BakeError::DegenerateRotation { bone, time });
        }
        let rotation = raw_rotation.normalize();

        let scale = channels
            .scale
            .map_or(Vec3::ONE, |t| t.sample_with_cursor(time, &mut cursors.scale));

        Ok(Mat4::from_scale_rotation_translation(scale, rotation, translation))
    }
}
