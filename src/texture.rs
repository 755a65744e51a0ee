//! The matrix palette texture artifact.
//!
//! Each skinning matrix occupies 3 consecutive RGBA16F texels carrying the
//! matrix's first three rows; the affine bottom row (0,0,0,1) is implicit.
//! Texels are laid out frame-major, then bone-index-major. The descriptor
//! pins point filtering, clamped addressing, and a single mip level: every
//! texel must map to exactly one exact value, any interpolation corrupts
//! the palette.

use glam::{Mat4, Vec4};
use half::f16;
use uuid::Uuid;
use wgpu::{AddressMode, FilterMode, TextureFormat};

/// Texels per encoded matrix (rows 0..3 of the affine transform).
pub const PIXELS_PER_MATRIX: u32 = 3;

/// Smallest power-of-two texture dimensions holding `pixel_count` texels.
///
/// Starts at 1x1 and doubles width and height alternately, width first,
/// until capacity suffices. Both dimensions stay powers of two and the
/// capacity is minimal over that growth sequence.
#[must_use]
pub fn palette_texture_size(pixel_count: u32) -> (u32, u32) {
    let mut width = 1u32;
    let mut height = 1u32;
    let mut grow_width = true;

    // Capacity in u64: 65536x65536 already overflows a u32 product.
    while u64::from(width) * u64::from(height) < u64::from(pixel_count) {
        if grow_width {
            width *= 2;
        } else {
            height *= 2;
        }
        grow_width = !grow_width;
    }

    (width, height)
}

/// Sampler state the palette texture must be bound with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureSampler {
    pub address_mode_u: AddressMode,
    pub address_mode_v: AddressMode,
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    pub mipmap_filter: FilterMode,
}

impl TextureSampler {
    /// Point filtering, clamped addressing: exact texel fetches only.
    #[must_use]
    pub fn nearest_clamp() -> Self {
        Self {
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            mipmap_filter: FilterMode::Nearest,
        }
    }
}

/// A baked matrix palette: immutable once packed.
///
/// `bone_count` and `frame_count` are the metadata a skinning shader needs
/// to compute texel offsets (`frame * bone_count * 3 + bone * 3`).
#[derive(Debug)]
pub struct MatrixPaletteTexture {
    pub uuid: Uuid,
    pub name: String,

    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub sampler: TextureSampler,
    pub mip_level_count: u32,

    /// RGBA16F texel data, `width * height * 4` components.
    pub pixels: Vec<f16>,

    pub bone_count: u32,
    pub frame_count: u32,
}

impl MatrixPaletteTexture {
    /// Wraps a packed pixel buffer. `pixels` must hold exactly
    /// `width * height` RGBA texels.
    #[must_use]
    pub fn new(name: &str, width: u32, height: u32, pixels: Vec<f16>, bone_count: u32, frame_count: u32) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        Self {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            width,
            height,
            format: TextureFormat::Rgba16Float,
            sampler: TextureSampler::nearest_clamp(),
            mip_level_count: 1,
            pixels,
            bone_count,
            frame_count,
        }
    }

    /// Texels holding one frame's matrices.
    #[inline]
    #[must_use]
    pub fn pixels_per_frame(&self) -> u32 {
        self.bone_count * PIXELS_PER_MATRIX
    }

    /// Raw little-endian pixel payload for persistence.
    #[must_use]
    pub fn pixel_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// One RGBA texel by flat index, widened to f32.
    #[must_use]
    pub fn texel(&self, index: u32) -> [f32; 4] {
        let base = (index * 4) as usize;
        [
            self.pixels[base].to_f32(),
            self.pixels[base + 1].to_f32(),
            self.pixels[base + 2].to_f32(),
            self.pixels[base + 3].to_f32(),
        ]
    }

    /// Decodes the skinning matrix stored for `(frame, bone)`, restoring
    /// the implicit bottom row.
    #[must_use]
    pub fn matrix(&self, frame: u32, bone: u32) -> Mat4 {
        let first = frame * self.pixels_per_frame() + bone * PIXELS_PER_MATRIX;
        let rows = [
            Vec4::from_array(self.texel(first)),
            Vec4::from_array(self.texel(first + 1)),
            Vec4::from_array(self.texel(first + 2)),
            Vec4::new(0.0, 0.0, 0.0, 1.0),
        ];
        Mat4::from_cols_array(&[
            rows[0].x, rows[1].x, rows[2].x, rows[3].x,
            rows[0].y, rows[1].y, rows[2].y, rows[3].y,
            rows[0].z, rows[1].z, rows[2].z, rows[3].z,
            rows[0].w, rows[1].w, rows[2].w, rows[3].w,
        ])
    }
}
