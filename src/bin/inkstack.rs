use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "inkstack", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a frame range as numbered PNGs.
    Sequence(SequenceArgs),
    /// Flatten every visible layer, fully revealed, into one PNG.
    Snapshot(SnapshotArgs),
    /// Write one layer's strokes to a stroke file.
    ExportStrokes(ExportStrokesArgs),
    /// Append a stroke file to one layer and save the document.
    ImportStrokes(ImportStrokesArgs),
    /// Print a layer and stroke summary.
    Info(InfoArgs),
}

#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Canvas width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Clip duration in frames (animated parameters are sampled against it).
    #[arg(long, default_value_t = 150)]
    duration: u64,

    /// Background color as `RRGGBB` or `RRGGBBAA` hex; transparent when omitted.
    #[arg(long)]
    background: Option<String>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct SequenceArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// First frame (inclusive).
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Last frame (exclusive); defaults to the clip duration.
    #[arg(long)]
    end: Option<u64>,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,

    /// File name prefix.
    #[arg(long, default_value = "frame_")]
    prefix: String,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,
}

#[derive(Args, Debug)]
struct ExportStrokesArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Layer index (0 = top).
    #[arg(long, default_value_t = 0)]
    layer: usize,

    /// Output stroke file.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ImportStrokesArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Stroke file to append.
    #[arg(long)]
    strokes: PathBuf,

    /// Target layer index (0 = top).
    #[arg(long, default_value_t = 0)]
    layer: usize,

    /// Output document; defaults to overwriting the input.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Sequence(args) => cmd_sequence(args),
        Command::Snapshot(args) => cmd_snapshot(args),
        Command::ExportStrokes(args) => cmd_export_strokes(args),
        Command::ImportStrokes(args) => cmd_import_strokes(args),
        Command::Info(args) => cmd_info(args),
    }
}

fn load_shape(path: &Path) -> anyhow::Result<inkstack::InkShape> {
    inkstack::InkShape::from_path(path)
        .with_context(|| format!("load ink document '{}'", path.display()))
}

fn session_opts(args: &OutputArgs) -> anyhow::Result<inkstack::InkSessionOpts> {
    let background = args
        .background
        .as_deref()
        .map(parse_hex_rgba)
        .transpose()?;
    Ok(inkstack::InkSessionOpts {
        canvas: inkstack::Canvas {
            width: args.width,
            height: args.height,
        },
        fps: inkstack::Fps::new(args.fps, 1)?,
        duration: args.duration,
        compositor: inkstack::CompositorOpts::default(),
        raster: inkstack::CpuRasterizerOpts::default().with_clear_rgba(background),
    })
}

fn parse_hex_rgba(s: &str) -> anyhow::Result<[u8; 4]> {
    let hex = s.trim().trim_start_matches('#');
    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        anyhow::bail!("background must be RRGGBB or RRGGBBAA hex, got '{s}'");
    }
    let byte = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .with_context(|| format!("invalid hex in background '{s}'"))
    };
    let a = if hex.len() == 8 { byte(6)? } else { 255 };
    Ok([byte(0)?, byte(2)?, byte(4)?, a])
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let shape = load_shape(&args.in_path)?;
    let mut sess = inkstack::InkSession::new(shape, session_opts(&args.output)?)?;
    let frame = sess.render_frame(inkstack::FrameIndex(args.frame))?;
    inkstack::write_png(&frame, &args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sequence(args: SequenceArgs) -> anyhow::Result<()> {
    let shape = load_shape(&args.in_path)?;
    let opts = session_opts(&args.output)?;
    let range = inkstack::FrameRange::new(
        inkstack::FrameIndex(args.start),
        inkstack::FrameIndex(args.end.unwrap_or(opts.duration)),
    )?;
    let mut sess = inkstack::InkSession::new(shape, opts)?;
    let mut sink = inkstack::PngSequenceSink::new(&args.out_dir, args.prefix);
    let stats = sess.render_range(range, &mut sink)?;

    tracing::info!(
        frames = stats.frames_total,
        reused = stats.frames_reused,
        "sequence rendered"
    );
    eprintln!(
        "wrote {} frames to {}",
        sink.written().len(),
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_snapshot(args: SnapshotArgs) -> anyhow::Result<()> {
    let shape = load_shape(&args.in_path)?;
    let mut raster = inkstack::CpuRasterizer::default();
    let canvas = inkstack::Canvas {
        width: args.width,
        height: args.height,
    };
    let frame = inkstack::render_snapshot(&mut raster, canvas, &shape.layers)?;
    inkstack::write_png(&frame, &args.out)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn editor_at(shape: inkstack::InkShape, layer: usize) -> anyhow::Result<inkstack::Editor> {
    let mut editor = inkstack::Editor::new(
        shape.layers,
        inkstack::Settings::default(),
        inkstack::EditorOpts::default(),
    );
    let id = editor
        .stack()
        .id_at(layer)
        .with_context(|| format!("layer index {layer} out of range"))?;
    editor.select_layer(Some(id))?;
    Ok(editor)
}

fn cmd_export_strokes(args: ExportStrokesArgs) -> anyhow::Result<()> {
    let shape = load_shape(&args.in_path)?;
    let editor = editor_at(shape, args.layer)?;
    if !editor.export_strokes_to(&args.out)? {
        anyhow::bail!("no layer selected");
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_import_strokes(args: ImportStrokesArgs) -> anyhow::Result<()> {
    let shape = load_shape(&args.in_path)?;
    let mut editor = editor_at(shape.clone(), args.layer)?;
    if !editor.import_strokes_from(&args.strokes)? {
        anyhow::bail!(
            "could not import '{}' (invalid file or locked layer)",
            args.strokes.display()
        );
    }

    let out = args.out.unwrap_or(args.in_path);
    let updated = inkstack::InkShape {
        layers: editor.stack().to_layers(),
        ..shape
    };
    updated
        .save(&out)
        .with_context(|| format!("save ink document '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let shape = load_shape(&args.in_path)?;
    let (strokes, points) = shape.counts();
    println!("layers: {}", shape.layers.len());
    println!("strokes: {strokes}");
    println!("points: {points}");
    println!(
        "visible points: {}",
        inkstack::total_visible_points(&shape.layers)
    );
    for (i, layer) in shape.layers.iter().enumerate() {
        println!(
            "  [{i}] {} strokes={} opacity={:.2}{}{}",
            layer.name,
            layer.strokes.len(),
            layer.opacity(),
            if layer.visible { "" } else { " hidden" },
            if layer.locked { " locked" } else { "" },
        );
    }
    Ok(())
}
