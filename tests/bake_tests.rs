//! Texture bake pipeline tests
//!
//! Tests for:
//! - palette_texture_size alternating power-of-two growth and minimality
//! - frame_times half-open bound (t = k/fps while t < duration)
//! - Texel encode/decode round-trip within f16 precision
//! - Hierarchy composition order along an ancestor chain
//! - Identity bind pose pass-through
//! - Degenerate rotation and malformed skeleton failures

use glam::{Mat4, Quat, Vec3};

use skinbake::animation::binding::TargetPath;
use skinbake::animation::clip::{AnimationClip, Track, TrackData, TrackMeta};
use skinbake::animation::tracks::{InterpolationMode, KeyframeTrack};
use skinbake::skeleton::{BoneDesc, Skeleton};
use skinbake::texture::PIXELS_PER_MATRIX;
use skinbake::{
    BakeError, bake_matrix_texture, compose_skinning_matrices, frame_times, palette_texture_size,
};

/// f16 has 11 significand bits; values used in these tests are exactly
/// representable, so a loose absolute tolerance is enough.
const F16_EPSILON: f32 = 1e-3;

fn mat_approx(a: Mat4, b: Mat4, eps: f32) -> bool {
    a.to_cols_array()
        .iter()
        .zip(b.to_cols_array().iter())
        .all(|(x, y)| (x - y).abs() < eps)
}

fn bone(name: &str, parent: Option<usize>) -> BoneDesc {
    BoneDesc {
        name: name.to_string(),
        parent,
        inverse_bind: Mat4::IDENTITY,
    }
}

fn vec3_track(path: &str, target: TargetPath, times: Vec<f32>, values: Vec<Vec3>) -> Track {
    Track {
        meta: TrackMeta {
            bone_path: path.to_string(),
            target,
        },
        data: TrackData::Vector3(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
    }
}

fn quat_track(path: &str, times: Vec<f32>, values: Vec<Quat>) -> Track {
    Track {
        meta: TrackMeta {
            bone_path: path.to_string(),
            target: TargetPath::Rotation,
        },
        data: TrackData::Quaternion(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
    }
}

// ============================================================================
// Texture sizing
// ============================================================================

#[test]
fn texture_size_grows_width_first() {
    assert_eq!(palette_texture_size(1), (1, 1));
    assert_eq!(palette_texture_size(2), (2, 1));
    assert_eq!(palette_texture_size(3), (2, 2));
    assert_eq!(palette_texture_size(4), (2, 2));
    assert_eq!(palette_texture_size(5), (4, 2));
    assert_eq!(palette_texture_size(9), (4, 4));
}

#[test]
fn texture_size_is_minimal_power_of_two_capacity() {
    for pixel_count in 1u32..=4096 {
        let (w, h) = palette_texture_size(pixel_count);
        assert!(w.is_power_of_two() && h.is_power_of_two());
        assert!(w * h >= pixel_count, "{pixel_count}: {w}x{h} too small");
        // One growth step earlier must not have sufficed.
        if w * h > 1 {
            assert!(
                w * h / 2 < pixel_count,
                "{pixel_count}: {w}x{h} not minimal"
            );
        }
        // Alternating growth keeps the pair square or one doubling apart.
        assert!(w == h || w == h * 2);
    }
}

#[test]
fn texture_size_survives_u32_capacity_overflow() {
    // 65536 x 65536 texels: the capacity is 2^32, one past u32::MAX.
    assert_eq!(palette_texture_size(u32::MAX), (65536, 65536));
}

// ============================================================================
// Frame stepping
// ============================================================================

#[test]
fn thirty_fps_one_second_is_thirty_frames() {
    let times = frame_times(1.0, 30.0);
    assert_eq!(times.len(), 30);
    assert_eq!(times[0], 0.0);
    assert!((times[29] - 29.0 / 30.0).abs() < 1e-6);
}

#[test]
fn frame_bound_is_half_open() {
    // Duration exactly on a frame boundary excludes that frame.
    assert_eq!(frame_times(0.5, 30.0).len(), 15);
    // A hair past the boundary includes it.
    assert_eq!(frame_times(0.51, 30.0).len(), 16);
}

#[test]
fn non_positive_fps_yields_no_frames() {
    assert!(frame_times(1.0, 0.0).is_empty());
    assert!(frame_times(1.0, -30.0).is_empty());
}

#[test]
fn non_finite_bounds_yield_no_frames() {
    // `t < inf` holds for every finite t and every NaN comparison is
    // false; either would keep the step loop running forever.
    assert!(frame_times(f32::INFINITY, 30.0).is_empty());
    assert!(frame_times(f32::NAN, 30.0).is_empty());
    assert!(frame_times(1.0, f32::INFINITY).is_empty());
    assert!(frame_times(1.0, f32::NAN).is_empty());
}

// ============================================================================
// Packing round-trip
// ============================================================================

#[test]
fn packed_matrix_round_trips_through_texels() {
    // Single bone, constant f16-exact TRS: the palette entry must decode
    // back to the same affine matrix, bottom row restored as (0,0,0,1).
    let skeleton = Skeleton::new("rig", vec![bone("root", None)]).unwrap();
    let translation = Vec3::new(1.5, -2.25, 0.5);
    let scale = Vec3::new(2.0, 1.0, 0.25);

    let clip = AnimationClip::new(
        "pose".to_string(),
        vec![
            vec3_track("root", TargetPath::Translation, vec![0.0, 1.0], vec![translation; 2]),
            vec3_track("root", TargetPath::Scale, vec![0.0, 1.0], vec![scale; 2]),
        ],
    );

    let texture = bake_matrix_texture(&skeleton, &clip, 30.0).unwrap();
    let expected = Mat4::from_scale_rotation_translation(scale, Quat::IDENTITY, translation);

    let decoded = texture.matrix(0, 0);
    assert!(
        mat_approx(decoded, expected, F16_EPSILON),
        "decoded {decoded:?} vs {expected:?}"
    );

    // Implicit affine row.
    assert_eq!(decoded.row(3).to_array(), [0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn texels_are_time_major_then_bone_major() {
    // Two bones, one translated; frame 0 and frame 1 identical. The second
    // frame's texels must start exactly bone_count * 3 texels in.
    let skeleton = Skeleton::new("rig", vec![bone("root", None), bone("a", Some(0))]).unwrap();
    let clip = AnimationClip::new(
        "pose".to_string(),
        vec![vec3_track(
            "a",
            TargetPath::Translation,
            vec![0.0, 1.0],
            vec![Vec3::new(3.0, 0.0, 0.0); 2],
        )],
    );

    let texture = bake_matrix_texture(&skeleton, &clip, 2.0).unwrap();
    assert_eq!(texture.frame_count, 2);
    assert_eq!(texture.pixels_per_frame(), 2 * PIXELS_PER_MATRIX);

    for frame in 0..2 {
        let root = texture.matrix(frame, 0);
        let a = texture.matrix(frame, 1);
        assert!(mat_approx(root, Mat4::IDENTITY, F16_EPSILON));
        assert!(mat_approx(
            a,
            Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)),
            F16_EPSILON
        ));
    }
}

// ============================================================================
// Hierarchy composition
// ============================================================================

#[test]
fn ancestor_translation_applies_once() {
    // root -> a -> b, identity locals except a pure translation at a.
    // b's skinning matrix must equal that translation applied once,
    // verifying parent-then-local multiplication order.
    let skeleton = Skeleton::new(
        "chain",
        vec![bone("root", None), bone("a", Some(0)), bone("b", Some(1))],
    )
    .unwrap();

    let shift = Vec3::new(0.0, 5.0, 0.0);
    let clip = AnimationClip::new(
        "shift".to_string(),
        vec![vec3_track("a", TargetPath::Translation, vec![0.0, 1.0], vec![shift; 2])],
    );

    let texture = bake_matrix_texture(&skeleton, &clip, 30.0).unwrap();
    let expected = Mat4::from_translation(shift);

    assert!(mat_approx(texture.matrix(0, 1), expected, F16_EPSILON));
    assert!(mat_approx(texture.matrix(0, 2), expected, F16_EPSILON));
    assert!(mat_approx(texture.matrix(0, 0), Mat4::IDENTITY, F16_EPSILON));
}

#[test]
fn identity_bind_pose_passes_world_through() {
    // With identity inverse bind poses the packed matrix is the raw world
    // matrix: scale at the root propagates to the child unchanged.
    let skeleton = Skeleton::new("rig", vec![bone("root", None), bone("a", Some(0))]).unwrap();
    let clip = AnimationClip::new(
        "grow".to_string(),
        vec![vec3_track(
            "root",
            TargetPath::Scale,
            vec![0.0, 1.0],
            vec![Vec3::splat(2.0); 2],
        )],
    );

    let texture = bake_matrix_texture(&skeleton, &clip, 30.0).unwrap();
    let expected = Mat4::from_scale(Vec3::splat(2.0));

    assert!(mat_approx(texture.matrix(0, 0), expected, F16_EPSILON));
    assert!(mat_approx(texture.matrix(0, 1), expected, F16_EPSILON));
}

#[test]
fn bind_pose_correction_is_applied_after_recursion() {
    // Give the child a non-identity inverse bind pose. The child's palette
    // entry picks it up; the parent world fed into the child must not.
    let ibm = Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0));
    let skeleton = Skeleton::new(
        "rig",
        vec![
            bone("root", None),
            BoneDesc {
                name: "a".to_string(),
                parent: Some(0),
                inverse_bind: ibm,
            },
        ],
    )
    .unwrap();

    let shift = Vec3::new(2.0, 0.0, 0.0);
    let clip = AnimationClip::new(
        "shift".to_string(),
        vec![vec3_track("root", TargetPath::Translation, vec![0.0, 1.0], vec![shift; 2])],
    );

    let texture = bake_matrix_texture(&skeleton, &clip, 30.0).unwrap();
    let world = Mat4::from_translation(shift);

    assert!(mat_approx(texture.matrix(0, 0), world, F16_EPSILON));
    assert!(mat_approx(texture.matrix(0, 1), world * ibm, F16_EPSILON));
}

// ============================================================================
// Missing channels and failures
// ============================================================================

#[test]
fn missing_channels_default_to_identity() {
    // No tracks at all for bone "a": its local transform is identity, so
    // with identity binds its palette entry is the parent's world.
    let skeleton = Skeleton::new("rig", vec![bone("root", None), bone("a", Some(0))]).unwrap();
    let clip = AnimationClip::new(
        "idle".to_string(),
        vec![vec3_track(
            "root",
            TargetPath::Translation,
            vec![0.0, 1.0],
            vec![Vec3::X; 2],
        )],
    );

    let texture = bake_matrix_texture(&skeleton, &clip, 30.0).unwrap();
    assert!(mat_approx(
        texture.matrix(0, 1),
        Mat4::from_translation(Vec3::X),
        F16_EPSILON
    ));
}

#[test]
fn degenerate_rotation_aborts_bake() {
    let skeleton = Skeleton::new("rig", vec![bone("root", None)]).unwrap();
    let zero = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
    let clip = AnimationClip::new(
        "bad".to_string(),
        vec![quat_track("root", vec![0.0, 1.0], vec![zero; 2])],
    );

    let err = bake_matrix_texture(&skeleton, &clip, 30.0).unwrap_err();
    assert!(matches!(err, BakeError::DegenerateRotation { bone: 0, .. }));
}

#[test]
fn empty_clip_is_rejected() {
    let skeleton = Skeleton::new("rig", vec![bone("root", None)]).unwrap();
    let clip = AnimationClip::new("empty".to_string(), vec![]);
    assert!(matches!(
        bake_matrix_texture(&skeleton, &clip, 30.0),
        Err(BakeError::EmptyClip(_))
    ));
}

#[test]
fn non_finite_duration_is_rejected() {
    // A +inf keyframe time propagates into the clip duration through the
    // max fold; NaN is reachable by writing the public field directly.
    let skeleton = Skeleton::new("rig", vec![bone("root", None)]).unwrap();
    let mut clip = AnimationClip::new(
        "runaway".to_string(),
        vec![vec3_track(
            "root",
            TargetPath::Translation,
            vec![0.0, f32::INFINITY],
            vec![Vec3::X; 2],
        )],
    );
    assert!(clip.duration.is_infinite());
    assert!(matches!(
        bake_matrix_texture(&skeleton, &clip, 30.0),
        Err(BakeError::EmptyClip(_))
    ));

    clip.duration = f32::NAN;
    assert!(matches!(
        bake_matrix_texture(&skeleton, &clip, 30.0),
        Err(BakeError::EmptyClip(_))
    ));
}

#[test]
fn wrong_length_matrix_buffer_is_rejected() {
    let skeleton = Skeleton::new("rig", vec![bone("root", None), bone("a", Some(0))]).unwrap();

    let mut short = vec![Mat4::IDENTITY; 1];
    let err = compose_skinning_matrices(&skeleton, &mut short).unwrap_err();
    assert!(matches!(err, BakeError::BoneCountMismatch { expected: 2, got: 1 }));

    let mut long = vec![Mat4::IDENTITY; 3];
    let err = compose_skinning_matrices(&skeleton, &mut long).unwrap_err();
    assert!(matches!(err, BakeError::BoneCountMismatch { expected: 2, got: 3 }));
}

#[test]
fn malformed_skeletons_are_rejected() {
    // Two roots.
    assert!(Skeleton::new("rig", vec![bone("a", None), bone("b", None)]).is_err());
    // Parent out of range.
    assert!(Skeleton::new("rig", vec![bone("a", Some(5))]).is_err());
    // Cycle: unreachable from any root.
    assert!(Skeleton::new(
        "rig",
        vec![bone("root", None), bone("a", Some(2)), bone("b", Some(1))]
    )
    .is_err());
    // No bones.
    assert!(Skeleton::new("rig", vec![]).is_err());
}

#[test]
fn texture_capacity_fits_payload() {
    let bones: Vec<BoneDesc> = (0..7)
        .map(|i| bone(&format!("b{i}"), if i == 0 { None } else { Some(i - 1) }))
        .collect();
    let skeleton = Skeleton::new("rig", bones).unwrap();
    let clip = AnimationClip::new(
        "idle".to_string(),
        vec![vec3_track("b0", TargetPath::Translation, vec![0.0, 1.1], vec![Vec3::X; 2])],
    );

    let texture = bake_matrix_texture(&skeleton, &clip, 30.0).unwrap();
    let payload = texture.frame_count * texture.bone_count * PIXELS_PER_MATRIX;
    assert!(texture.width * texture.height >= payload);
    assert_eq!(
        texture.pixels.len(),
        (texture.width * texture.height * 4) as usize
    );
}
