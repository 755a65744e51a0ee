pub mod binding;
pub mod clip;
pub mod tracks;
pub mod values;

pub use binding::TargetPath;
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
