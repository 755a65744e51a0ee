use glam::{Quat, Vec3};

use crate::animation::binding::TargetPath;
use crate::animation::tracks::KeyframeTrack;

/// Identifies what a track animates: which bone (by hierarchy path) and
/// which local-transform channel.
#[derive(Debug, Clone)]
pub struct TrackMeta {
    /// Slash-joined bone path relative to the skeleton root, matching
    /// [`crate::skeleton::Bone::path`].
    pub bone_path: String,
    pub target: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

/// One animated channel: metadata plus keyframe data.
#[derive(Debug, Clone)]
pub struct Track {
    pub meta: TrackMeta,
    pub data: TrackData,
}

impl Track {
    fn end_time(&self) -> f32 {
        match &self.data {
            TrackData::Vector3(track) => track.times.last().copied().unwrap_or(0.0),
            TrackData::Quaternion(track) => track.times.last().copied().unwrap_or(0.0),
        }
    }
}

/// A named set of per-bone-path transform curves plus a total duration.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Builds a clip whose duration is the latest keyframe of any track.
    #[must_use]
    pub fn new(name: String, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(Track::end_time)
            .fold(0.0_f32, f32::max);

        Self {
            name,
            duration,
            tracks,
        }
    }
}
