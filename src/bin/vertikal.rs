use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vertikal::pipeline::batch::collect_inputs;
use vertikal::{
    Batch, BatchConfig, BatchWorker, Canvas, FfmpegIo, FontResolver, MaskBuilder, TemplateAsset,
    TextLayoutEngine,
};

#[derive(Parser, Debug)]
#[command(name = "vertikal", version)]
struct Cli {
    /// Log at debug level (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process a batch of clips (requires `ffmpeg` on PATH).
    Run(RunArgs),
    /// Write the chroma-key mask of a template as a grayscale PNG.
    Mask(MaskArgs),
    /// Print how a caption wraps and where it lands.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Batch configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Input clips or folders of clips.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct MaskArgs {
    /// Template image or GIF.
    #[arg(long)]
    template: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Canvas width.
    #[arg(long, default_value_t = 1080)]
    width: u32,

    /// Canvas height.
    #[arg(long, default_value_t = 1920)]
    height: u32,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Caption text.
    #[arg(long)]
    text: String,

    /// Font size in pixels.
    #[arg(long, default_value_t = 60)]
    size: u32,

    /// Font family or font file.
    #[arg(long, default_value = "Arial")]
    font: String,

    /// Vertical placement, 0..=100.
    #[arg(long, default_value_t = 50.0)]
    y_percent: f32,

    /// Canvas width.
    #[arg(long, default_value_t = 1080)]
    width: u32,

    /// Canvas height.
    #[arg(long, default_value_t = 1920)]
    height: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Mask(args) => cmd_mask(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "vertikal=debug" } else { "vertikal=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let settings = BatchConfig::from_path(&args.config)?
        .validate()
        .with_context(|| format!("invalid batch config '{}'", args.config.display()))?;
    let inputs = collect_inputs(&args.inputs)?;

    let fonts = FontResolver::system();
    let batch = Batch::prepare(settings, inputs, &fonts, &mut rand::thread_rng())
        .context("batch rejected before processing")?;

    let worker = BatchWorker::spawn(batch, Arc::new(FfmpegIo))?;
    for p in worker.progress().iter() {
        eprintln!("[{}/{}] {}", p.current, p.total, p.name);
    }
    let report = worker.join()?;

    for failure in &report.failures {
        eprintln!("failed: {} ({}): {}", failure.name, failure.stage, failure.reason);
    }
    for output in &report.outputs {
        eprintln!("wrote {}", output.display());
    }
    eprintln!("{}", report.summary());
    if report.successful == 0 && report.total > 0 {
        anyhow::bail!("no video was processed");
    }
    Ok(())
}

fn cmd_mask(args: MaskArgs) -> anyhow::Result<()> {
    let canvas = Canvas::new(args.width, args.height)?;
    let template = TemplateAsset::load(&args.template, canvas)?;
    let first = template
        .frames()
        .first()
        .context("template has no frames")?;
    let mask = MaskBuilder::default().build(&first.image, template.path())?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    mask.to_preview()
        .save(&args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "{} key pixels of {} ({} template frames); wrote {}",
        mask.true_count(),
        mask.len(),
        template.frame_count(),
        args.out.display()
    );
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let canvas = Canvas::new(args.width, args.height)?;
    let fonts = FontResolver::system();
    let engine = TextLayoutEngine::from_resolver(&fonts, &args.font, canvas);
    let lines = engine.layout(&args.text, args.size, engine.max_width());
    let block_h = TextLayoutEngine::block_height(lines.len(), args.size);
    let y = engine.anchor_y(block_h, args.y_percent);

    println!(
        "face: {}",
        if engine.typeface().is_builtin() { "built-in" } else { "outline" }
    );
    for line in &lines {
        println!("{:>7.1}px  {}", line.width(), line.text());
    }
    println!("block: {block_h}px at y={y} (max width {}px)", engine.max_width());
    Ok(())
}
