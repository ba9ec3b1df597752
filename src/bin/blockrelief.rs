use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "blockrelief", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a still image as a block-relief PNG.
    Frame(FrameArgs),
    /// Render a video as a block-relief MP4 (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct Overrides {
    /// JSON config file; missing keys keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output scale factor.
    #[arg(long)]
    scale: Option<u32>,

    /// Variance below which a region stops splitting.
    #[arg(long)]
    threshold: Option<u32>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input image (any format the `image` crate decodes).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input video.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Worker thread count (default: available parallelism minus one).
    #[arg(long)]
    workers: Option<usize>,

    /// Keep an existing output file and fail instead of replacing it.
    #[arg(long)]
    no_overwrite: bool,

    #[command(flatten)]
    overrides: Overrides,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load_config(o: &Overrides) -> anyhow::Result<blockrelief::ReliefConfig> {
    let mut cfg = match &o.config {
        Some(path) => blockrelief::ReliefConfig::from_json_path(path)?,
        None => blockrelief::ReliefConfig::default(),
    };
    if let Some(scale) = o.scale {
        cfg.render.scale = scale;
    }
    if let Some(threshold) = o.threshold {
        cfg.split.variance_threshold = threshold;
    }
    Ok(cfg)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.overrides)?;
    cfg.validate()?;

    let img = image::open(&args.in_path)
        .with_context(|| format!("decode image '{}'", args.in_path.display()))?
        .to_rgb8();
    let (width, height) = img.dimensions();
    let input = blockrelief::FrameRgb::new(width, height, img.into_raw())?;

    let renderer = blockrelief::ReliefRenderer::new(cfg.split, cfg.render);
    let frame = renderer.render(&input)?;

    write_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn write_png(path: &Path, frame: &blockrelief::FrameRgb) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgb8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(&args.overrides)?;
    if args.workers.is_some() {
        cfg.threading.workers = args.workers;
    }
    cfg.validate()?;

    let cancel = blockrelief::CancelToken::new();
    cancel.install_interrupt_handler()?;

    let mut source = blockrelief::FfmpegSource::open(&args.in_path)?;
    let mut sink_opts = blockrelief::FfmpegSinkOpts::new(&args.out);
    sink_opts.overwrite = !args.no_overwrite;
    let mut sink = blockrelief::FfmpegSink::new(sink_opts);
    let renderer = blockrelief::ReliefRenderer::new(cfg.split, cfg.render);

    let stats = blockrelief::run_pipeline(
        &mut source,
        &mut sink,
        &renderer,
        &cfg.threading,
        &cancel,
    )?;

    tracing::info!(
        workers = stats.workers,
        frames = stats.frames_emitted,
        cancelled = stats.cancelled,
        "render finished"
    );
    if stats.cancelled {
        eprintln!(
            "interrupted: wrote {} frames to {}",
            stats.frames_emitted,
            args.out.display()
        );
    } else {
        eprintln!("wrote {}", args.out.display());
    }
    Ok(())
}
