//! Error Types
//!
//! All public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, BakeError>`. A bake is one-shot: any error aborts
//! the current bake and leaves previously produced artifacts untouched.

use thiserror::Error;

/// The main error type for the baker.
#[derive(Error, Debug)]
pub enum BakeError {
    // ========================================================================
    // Input validation
    // ========================================================================
    /// The skeleton's bone tree is structurally invalid (bad parent link,
    /// zero or multiple roots, unreachable bone).
    #[error("Malformed skeleton: {0}")]
    MalformedSkeleton(String),

    /// A per-frame matrix buffer does not match the skeleton's bone count.
    #[error("Bone count mismatch: expected {expected}, got {got}")]
    BoneCountMismatch {
        /// Bone count of the skeleton
        expected: usize,
        /// Length of the supplied buffer
        got: usize,
    },

    /// The clip has no duration or produces no frames at the target rate.
    #[error("Empty animation clip: {0}")]
    EmptyClip(String),

    // ========================================================================
    // Sampling
    // ========================================================================
    /// A sampled rotation had (near-)zero length. The palette has no way to
    /// flag corrupt entries to the GPU, so the whole bake aborts.
    #[error("Degenerate rotation sampled for bone {bone} at t={time}")]
    DegenerateRotation {
        /// Index of the offending bone
        bone: usize,
        /// Sample time in seconds
        time: f32,
    },

    // ========================================================================
    // Asset loading
    // ========================================================================
    /// The input model carries no skin.
    #[error("Model has no skin: {0}")]
    MissingSkin(String),

    /// glTF parsing or decoding error.
    #[error("glTF error: {0}")]
    GltfError(String),

    // ========================================================================
    // Persistence
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Descriptor serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<gltf::Error> for BakeError {
    fn from(err: gltf::Error) -> Self {
        BakeError::GltfError(err.to_string())
    }
}

/// Alias for `Result<T, BakeError>`.
pub type Result<T> = std::result::Result<T, BakeError>;
