#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

//! Offline skeletal-animation baking for GPU-driven skinning.
//!
//! Two independent pipelines over one input model (skeleton + bind pose +
//! mesh):
//!
//! - clip + skeleton → [`sampler::CurveSampler`] →
//!   [`compositor::compose_skinning_matrices`] →
//!   [`baker::bake_matrix_texture`] → [`assets::AssetSink`]
//! - mesh + bone weights → [`baker::bake_skinned_mesh`] →
//!   [`assets::AssetSink`]
//!
//! Everything is synchronous, single-threaded, in-memory batch work; a bake
//! either completes or fails outright.

pub mod animation;
pub mod assets;
pub mod baker;
pub mod compositor;
pub mod errors;
pub mod mesh;
pub mod sampler;
pub mod skeleton;
pub mod texture;

pub use animation::{AnimationClip, InterpolationMode, KeyframeTrack, TargetPath, Track, TrackData, TrackMeta};
pub use assets::{AssetSink, FileAssetSink, LoadedModel, load_model};
pub use baker::{DEFAULT_TARGET_FPS, bake_matrix_texture, bake_skinned_mesh, frame_times};
pub use compositor::compose_skinning_matrices;
pub use errors::{BakeError, Result};
pub use mesh::{BakedMesh, BoundingBox, SkinnedMeshData, VertexBoneWeights};
pub use sampler::CurveSampler;
pub use skeleton::{Bone, BoneDesc, Skeleton};
pub use texture::{MatrixPaletteTexture, PIXELS_PER_MATRIX, TextureSampler, palette_texture_size};
