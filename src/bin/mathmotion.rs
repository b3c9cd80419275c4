use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use mathmotion::{
    CpuBackend, FrameIndex, FrameRange, PreparedAssetStore, RenderSettings, RenderThreading,
    RenderToMp4Opts, render_frame, render_to_mp4_with_stats, scenes,
};

/// Background cleared behind every scene.
const BG_RGBA: [u8; 4] = [18, 20, 28, 255];

#[derive(Parser, Debug)]
#[command(name = "mathmotion", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the built-in scenes.
    List,
    /// Render a single frame of a scene as a PNG.
    Frame(FrameArgs),
    /// Render a scene to MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Scene name (see `mathmotion list`).
    #[arg(long)]
    scene: String,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Directory fonts are resolved against.
    #[arg(long, default_value = ".")]
    assets_root: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Scene name (see `mathmotion list`).
    #[arg(long)]
    scene: String,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Directory fonts are resolved against.
    #[arg(long, default_value = ".")]
    assets_root: PathBuf,

    /// Overwrite output if it already exists.
    #[arg(long, default_value_t = true)]
    overwrite: bool,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size (parallel mode only).
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Skip re-rendering frames whose content repeats (parallel mode only).
    #[arg(long, default_value_t = false)]
    static_frame_elision: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::List => cmd_list(),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_list() -> anyhow::Result<()> {
    for scene in scenes::all() {
        println!("{:<26} {}", scene.name, scene.summary);
    }
    Ok(())
}

fn scene_by_name(name: &str) -> anyhow::Result<scenes::SceneDef> {
    scenes::by_name(name).ok_or_else(|| {
        let names: Vec<&str> = scenes::all().iter().map(|s| s.name).collect();
        anyhow::anyhow!("unknown scene '{name}' (available: {})", names.join(", "))
    })
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = scene_by_name(&args.scene)?;
    let comp = (scene.build)()?;
    let assets = PreparedAssetStore::prepare(&comp, &args.assets_root)?;

    let mut backend = CpuBackend::new(RenderSettings {
        clear_rgba: Some(BG_RGBA),
    });
    let frame = render_frame(&comp, FrameIndex(args.frame), &mut backend, &assets)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let scene = scene_by_name(&args.scene)?;
    let comp = (scene.build)()?;
    let assets = PreparedAssetStore::prepare(&comp, &args.assets_root)?;

    let mut backend = CpuBackend::new(RenderSettings {
        clear_rgba: Some(BG_RGBA),
    });

    let opts = RenderToMp4Opts {
        range: FrameRange::new(FrameIndex(0), comp.duration)?,
        bg_rgba: BG_RGBA,
        overwrite: args.overwrite,
        threading: RenderThreading {
            parallel: args.parallel,
            chunk_size: args.chunk_size,
            threads: args.threads,
            static_frame_elision: args.static_frame_elision,
        },
    };
    let stats = render_to_mp4_with_stats(&comp, &args.out, opts, &mut backend, &assets)?;

    eprintln!(
        "wrote {} ({} frames, {} rendered, {} elided)",
        args.out.display(),
        stats.frames_total,
        stats.frames_rendered,
        stats.frames_elided
    );
    Ok(())
}
