use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use skinbake::{AssetSink as _, DEFAULT_TARGET_FPS, FileAssetSink};

#[derive(Parser, Debug)]
#[command(name = "skinbake", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bake an animation clip into a matrix palette texture.
    BakeTexture(BakeTextureArgs),
    /// Repack a skinned mesh's bone weights into vertex attributes.
    BakeMesh(BakeMeshArgs),
}

#[derive(Parser, Debug)]
struct BakeTextureArgs {
    /// Input model (.gltf / .glb) with a skin and at least one animation.
    model: PathBuf,

    /// Clip to bake, by name. Defaults to the first clip.
    #[arg(long)]
    clip: Option<String>,

    /// Sampling rate in frames per second.
    #[arg(long, default_value_t = DEFAULT_TARGET_FPS)]
    fps: f32,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Artifact name. Defaults to the clip name.
    #[arg(long)]
    name: Option<String>,
}

#[derive(Parser, Debug)]
struct BakeMeshArgs {
    /// Input model (.gltf / .glb) with a skinned mesh.
    model: PathBuf,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Artifact name. Defaults to the mesh name.
    #[arg(long)]
    name: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::BakeTexture(args) => cmd_bake_texture(args),
        Command::BakeMesh(args) => cmd_bake_mesh(args),
    }
}

fn cmd_bake_texture(args: BakeTextureArgs) -> anyhow::Result<()> {
    let model = skinbake::load_model(&args.model)
        .with_context(|| format!("loading {}", args.model.display()))?;

    let clip = match &args.clip {
        Some(wanted) => model
            .clips
            .iter()
            .find(|c| c.name == *wanted)
            .with_context(|| format!("model has no clip named '{wanted}'"))?,
        None => model
            .clips
            .first()
            .context("model has no animation clips")?,
    };

    let texture = skinbake::bake_matrix_texture(&model.skeleton, clip, args.fps)?;

    let name = args.name.as_deref().unwrap_or(&clip.name);
    let mut sink = FileAssetSink::new(&args.out)?;
    sink.store_texture(&texture, name)?;

    println!(
        "{}: {}x{} rgba16float, {} bones, {} frames -> {}",
        name,
        texture.width,
        texture.height,
        texture.bone_count,
        texture.frame_count,
        args.out.display()
    );
    Ok(())
}

fn cmd_bake_mesh(args: BakeMeshArgs) -> anyhow::Result<()> {
    let model = skinbake::load_model(&args.model)
        .with_context(|| format!("loading {}", args.model.display()))?;

    let baked = skinbake::bake_skinned_mesh(&model.mesh);

    let name = args.name.clone().unwrap_or_else(|| baked.name.clone());
    let mut sink = FileAssetSink::new(&args.out)?;
    sink.store_mesh(&baked, &name)?;

    println!(
        "{}: {} vertices, {} indices -> {}",
        name,
        baked.vertex_count(),
        baked.indices.len(),
        args.out.display()
    );
    Ok(())
}
