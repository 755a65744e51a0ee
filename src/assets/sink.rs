//! Asset persistence.
//!
//! The bakers hand finished artifacts to an [`AssetSink`] in one transfer;
//! the sink owns them from there. [`FileAssetSink`] writes each artifact as
//! a JSON descriptor plus a raw little-endian binary payload, and refreshes
//! an `asset_index.json` in its root after every store so downstream tooling
//! sees a consistent index.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::mesh::BakedMesh;
use crate::texture::MatrixPaletteTexture;

/// Accepts finished bake artifacts for persistence.
pub trait AssetSink {
    fn store_texture(&mut self, texture: &MatrixPaletteTexture, name: &str) -> Result<()>;
    fn store_mesh(&mut self, mesh: &BakedMesh, name: &str) -> Result<()>;
}

// ============================================================================
// Descriptors
// ============================================================================

#[derive(Debug, Serialize)]
struct TextureDescriptor<'a> {
    kind: &'static str,
    name: &'a str,
    uuid: String,
    width: u32,
    height: u32,
    format: &'static str,
    filter: &'static str,
    address_mode: &'static str,
    mip_level_count: u32,
    bone_count: u32,
    frame_count: u32,
    pixels_per_frame: u32,
    buffer: String,
    byte_length: usize,
}

#[derive(Debug, Serialize)]
struct BufferView {
    name: &'static str,
    format: &'static str,
    byte_offset: usize,
    byte_length: usize,
}

#[derive(Debug, Serialize)]
struct MeshDescriptor<'a> {
    kind: &'static str,
    name: &'a str,
    uuid: String,
    vertex_count: usize,
    index_count: usize,
    bounds_min: [f32; 3],
    bounds_max: [f32; 3],
    buffer: String,
    views: Vec<BufferView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    name: String,
    kind: String,
    descriptor: String,
    buffer: String,
}

// ============================================================================
// Filesystem sink
// ============================================================================

/// Writes artifacts under one root directory.
pub struct FileAssetSink {
    root: PathBuf,
    entries: Vec<IndexEntry>,
}

const INDEX_FILE: &str = "asset_index.json";

impl FileAssetSink {
    /// Opens (and creates if needed) a sink rooted at `root`. An existing
    /// index is picked up so repeated invocations accumulate entries.
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let index_path = root.join(INDEX_FILE);
        let entries = if index_path.is_file() {
            serde_json::from_slice(&fs::read(&index_path)?)?
        } else {
            Vec::new()
        };

        Ok(Self { root, entries })
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record(&mut self, entry: IndexEntry) -> Result<()> {
        self.entries.retain(|e| e.name != entry.name || e.kind != entry.kind);
        self.entries.push(entry);
        self.refresh_index()
    }

    /// Rewrites the asset index from the current entry list.
    fn refresh_index(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(self.root.join(INDEX_FILE), json)?;
        Ok(())
    }
}

impl AssetSink for FileAssetSink {
    fn store_texture(&mut self, texture: &MatrixPaletteTexture, name: &str) -> Result<()> {
        // Filenames carry the kind: a texture and a mesh stored under the
        // same name must not clobber each other's files.
        let buffer_file = format!("{name}.tex.bin");
        let descriptor_file = format!("{name}.tex.json");

        let payload = texture.pixel_bytes();
        fs::write(self.root.join(&buffer_file), payload)?;

        let descriptor = TextureDescriptor {
            kind: "matrix_palette_texture",
            name: &texture.name,
            uuid: texture.uuid.to_string(),
            width: texture.width,
            height: texture.height,
            format: "rgba16float",
            filter: "nearest",
            address_mode: "clamp_to_edge",
            mip_level_count: texture.mip_level_count,
            bone_count: texture.bone_count,
            frame_count: texture.frame_count,
            pixels_per_frame: texture.pixels_per_frame(),
            buffer: buffer_file.clone(),
            byte_length: payload.len(),
        };
        fs::write(
            self.root.join(&descriptor_file),
            serde_json::to_vec_pretty(&descriptor)?,
        )?;

        self.record(IndexEntry {
            name: name.to_string(),
            kind: "matrix_palette_texture".to_string(),
            descriptor: descriptor_file,
            buffer: buffer_file,
        })
    }

    fn store_mesh(&mut self, mesh: &BakedMesh, name: &str) -> Result<()> {
        let buffer_file = format!("{name}.mesh.bin");
        let descriptor_file = format!("{name}.mesh.json");

        let mut payload: Vec<u8> = Vec::new();
        let mut views: Vec<BufferView> = Vec::new();

        let mut push_view = |payload: &mut Vec<u8>, name: &'static str, format: &'static str, bytes: &[u8]| {
            if bytes.is_empty() {
                return;
            }
            views.push(BufferView {
                name,
                format,
                byte_offset: payload.len(),
                byte_length: bytes.len(),
            });
            payload.extend_from_slice(bytes);
        };

        push_view(&mut payload, "position", "float32x3", bytemuck::cast_slice(&mesh.positions));
        push_view(&mut payload, "normal", "float32x3", bytemuck::cast_slice(&mesh.normals));
        push_view(&mut payload, "tangent", "float32x4", bytemuck::cast_slice(&mesh.tangents));
        push_view(&mut payload, "uv", "float32x2", bytemuck::cast_slice(&mesh.uvs));
        push_view(&mut payload, "color", "float32x4", bytemuck::cast_slice(&mesh.colors));
        push_view(&mut payload, "indices", "uint32", bytemuck::cast_slice(&mesh.indices));
        push_view(
            &mut payload,
            "bone_index_weights_01",
            "float32x4",
            bytemuck::cast_slice(&mesh.bone_index_weights_01),
        );
        push_view(
            &mut payload,
            "bone_index_weights_23",
            "float32x4",
            bytemuck::cast_slice(&mesh.bone_index_weights_23),
        );

        fs::write(self.root.join(&buffer_file), &payload)?;

        let descriptor = MeshDescriptor {
            kind: "baked_skinned_mesh",
            name: &mesh.name,
            uuid: mesh.uuid.to_string(),
            vertex_count: mesh.vertex_count(),
            index_count: mesh.indices.len(),
            bounds_min: mesh.bounds.min.to_array(),
            bounds_max: mesh.bounds.max.to_array(),
            buffer: buffer_file.clone(),
            views,
        };
        fs::write(
            self.root.join(&descriptor_file),
            serde_json::to_vec_pretty(&descriptor)?,
        )?;

        self.record(IndexEntry {
            name: name.to_string(),
            kind: "baked_skinned_mesh".to_string(),
            descriptor: descriptor_file,
            buffer: buffer_file,
        })
    }
}
