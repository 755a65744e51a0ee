pub mod gltf;
pub mod sink;

pub use gltf::{LoadedModel, load_model};
pub use sink::{AssetSink, FileAssetSink};
